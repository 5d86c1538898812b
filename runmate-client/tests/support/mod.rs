#![allow(dead_code)]

use runmate_client::{ClientConfig, SessionRuntime};
use runmate_core::testing::RecordingTransport;
use runmate_core::{Phase, SessionSnapshot, WireEvent};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const TEST_ENDPOINT: &str = "tcp://127.0.0.1:4000/matching";

pub fn init_test_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new("debug"))
        .with(fmt::layer().with_test_writer())
        .try_init();
}

/// Runtime over a recording transport, plus the sender that plays the relay
pub struct Harness {
    pub runtime: SessionRuntime,
    pub transport: RecordingTransport,
    pub relay: mpsc::UnboundedSender<WireEvent>,
}

impl Harness {
    pub fn start() -> Self {
        Self::with_config(ClientConfig::new(TEST_ENDPOINT))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        init_test_tracing();
        let transport = RecordingTransport::new();
        let (relay, inbound) = mpsc::unbounded_channel();
        let runtime = SessionRuntime::spawn(transport.clone(), inbound, &config);
        Self {
            runtime,
            transport,
            relay,
        }
    }

    pub fn send(&self, event: &str, args: Vec<Value>) {
        self.relay
            .send(WireEvent::new(event, args))
            .expect("runtime inbound channel closed");
    }

    pub async fn wait_for_phase(&self, phase: Phase) -> SessionSnapshot {
        wait_for(self.runtime.subscribe(), |s| s.phase == phase).await
    }
}

pub async fn wait_for(
    mut rx: watch::Receiver<SessionSnapshot>,
    predicate: impl FnMut(&SessionSnapshot) -> bool,
) -> SessionSnapshot {
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(predicate))
        .await
        .expect("timed out waiting for snapshot")
        .expect("runtime stopped")
        .clone()
}

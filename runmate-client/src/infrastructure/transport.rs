use futures::{SinkExt, StreamExt};
use runmate_core::{OutboundEvent, RelayEndpoint, Transport, TransportError, WireEvent};
use serde_json::json;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::codec::{Framed, LinesCodec};

const MAX_FRAME_LENGTH: usize = 64 * 1024;

type Subscriptions = Arc<Mutex<HashSet<&'static str>>>;

/// Relay transport speaking newline-delimited JSON over TCP.
///
/// Each frame is one `{"event": ..., "args": [...]}` object. Connection
/// lifecycle is reported through the inbound channel as `connect`,
/// `connectError`, `connectTimeout` and `disconnect` events. Only subscribed
/// event names are ever delivered.
///
/// Every link gets its own subscription set. A released link keeps running
/// until it notices its closed outbound channel, but with its set cleared it
/// can no longer deliver into the next link's cycle.
#[derive(Debug)]
pub struct JsonLinesTransport {
    inbound_tx: mpsc::UnboundedSender<WireEvent>,
    /// Subscriptions of the current link
    subscriptions: Subscriptions,
    connect_timeout: Duration,

    outbound_tx: Option<mpsc::UnboundedSender<WireEvent>>,
    /// Link waiting for its subscriptions before dialing
    pending: Option<PendingLink>,
    task: Option<JoinHandle<()>>,
}

#[derive(Debug)]
struct PendingLink {
    addr: String,
    outbound_rx: mpsc::UnboundedReceiver<WireEvent>,
}

impl JsonLinesTransport {
    /// Transport plus the receiver its inbound events arrive on
    pub fn channel(connect_timeout: Duration) -> (Self, mpsc::UnboundedReceiver<WireEvent>) {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let transport = Self {
            inbound_tx,
            subscriptions: Arc::default(),
            connect_timeout,
            outbound_tx: None,
            pending: None,
            task: None,
        };
        (transport, inbound_rx)
    }

    fn start_link(&mut self) {
        let Some(PendingLink { addr, outbound_rx }) = self.pending.take() else {
            return;
        };

        let inbound = Inbound {
            tx: self.inbound_tx.clone(),
            subscriptions: Arc::clone(&self.subscriptions),
        };
        if let Some(old) = self.task.take() {
            old.abort();
        }
        self.task = Some(tokio::spawn(run_link(
            addr,
            outbound_rx,
            inbound,
            self.connect_timeout,
        )));
    }
}

impl Transport for JsonLinesTransport {
    fn connect(&mut self, endpoint: &RelayEndpoint) -> Result<(), TransportError> {
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(TransportError::Unavailable("no tokio runtime".into()));
        }
        if self.outbound_tx.is_some() {
            return Ok(());
        }

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        self.outbound_tx = Some(outbound_tx);
        self.subscriptions = Arc::default();
        self.pending = Some(PendingLink {
            addr: endpoint.socket_addr(),
            outbound_rx,
        });

        tracing::debug!(
            addr = %endpoint.socket_addr(),
            namespace = endpoint.namespace(),
            "Relay link prepared"
        );
        Ok(())
    }

    fn subscribe(&mut self, events: &[&'static str]) -> Result<(), TransportError> {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(events.iter().copied());
        self.start_link();
        Ok(())
    }

    fn unsubscribe_all(&mut self) {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn emit(&mut self, event: &OutboundEvent) -> Result<(), TransportError> {
        let tx = self.outbound_tx.as_ref().ok_or(TransportError::NotConnected)?;
        tx.send(event.to_wire())
            .map_err(|_| TransportError::Send("relay link closed".into()))
    }

    fn disconnect(&mut self) {
        // Closing the outbound channel ends the link task after it flushed
        // what was already emitted
        self.outbound_tx = None;
        self.pending = None;
        self.task = None;
    }
}

impl Drop for JsonLinesTransport {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Delivery side of the link, filtered by the current subscriptions
struct Inbound {
    tx: mpsc::UnboundedSender<WireEvent>,
    subscriptions: Subscriptions,
}

impl Inbound {
    /// Send while holding the lock: once `unsubscribe_all` returns, nothing
    /// more from this link can enter the channel
    fn deliver(&self, wire: WireEvent) {
        let subscriptions = self
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !subscriptions.contains(wire.event.as_str()) {
            tracing::trace!(event = %wire.event, "Unsubscribed event discarded");
            return;
        }
        let _ = self.tx.send(wire);
    }
}

async fn run_link(
    addr: String,
    mut outbound: mpsc::UnboundedReceiver<WireEvent>,
    inbound: Inbound,
    connect_timeout: Duration,
) {
    let stream = match tokio::time::timeout(connect_timeout, TcpStream::connect(&addr)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => {
            tracing::warn!(%addr, error = %e, "Relay connect failed");
            inbound.deliver(WireEvent::new("connectError", vec![json!(e.to_string())]));
            return;
        }
        Err(_) => {
            tracing::warn!(%addr, ?connect_timeout, "Relay connect timed out");
            inbound.deliver(WireEvent::bare("connectTimeout"));
            return;
        }
    };

    tracing::debug!(%addr, "Relay link established");
    inbound.deliver(WireEvent::bare("connect"));

    let mut framed = Framed::new(stream, LinesCodec::new_with_max_length(MAX_FRAME_LENGTH));

    loop {
        tokio::select! {
            outgoing = outbound.recv() => match outgoing {
                Some(wire) => match serde_json::to_string(&wire) {
                    Ok(line) => {
                        if let Err(e) = framed.send(line).await {
                            tracing::warn!(%addr, error = %e, "Relay send failed");
                            inbound.deliver(WireEvent::bare("disconnect"));
                            return;
                        }
                    }
                    Err(e) => tracing::error!(event = %wire.event, error = %e, "Failed to encode frame"),
                },
                None => {
                    tracing::debug!(%addr, "Relay link closed locally");
                    break;
                }
            },

            incoming = framed.next() => match incoming {
                Some(Ok(line)) => match serde_json::from_str::<WireEvent>(&line) {
                    Ok(wire) => inbound.deliver(wire),
                    Err(e) => tracing::warn!(error = %e, "Malformed relay frame: {line}"),
                },
                Some(Err(e)) => {
                    tracing::warn!(%addr, error = %e, "Relay receive failed");
                    inbound.deliver(WireEvent::bare("disconnect"));
                    return;
                }
                None => {
                    tracing::info!(%addr, "Relay closed the link");
                    inbound.deliver(WireEvent::bare("disconnect"));
                    return;
                }
            },
        }
    }

    let _ = SinkExt::<String>::close(&mut framed).await;
}

use cucumber::World;
use runmate_core::testing::RecordingTransport;
use runmate_core::{
    JoinOutcome, Notification, ResultCode, SessionError, SessionListener, SessionMachine,
    Transition, WireEvent, DEFAULT_RELAY_ENDPOINT,
};
use std::sync::{Arc, Mutex};

/// One notification, tagged with the listener that received it
#[derive(Debug, Clone, PartialEq)]
pub struct Received {
    pub listener: String,
    pub code: ResultCode,
    pub notification: Notification,
}

type Inbox = Arc<Mutex<Vec<Received>>>;

#[derive(Debug, World)]
pub struct SessionWorld {
    /// Session state machine (the system under test)
    pub machine: SessionMachine<RecordingTransport>,

    /// Shares its log with the transport owned by `machine`
    pub transport: RecordingTransport,

    /// Every notification delivered, in order
    pub inbox: Inbox,

    pub last_join: Option<JoinOutcome>,
    pub last_error: Option<SessionError>,
    pub last_transition: Option<Transition>,

    /// (events sent, notifications delivered) at the last checkpoint
    pub checkpoint: Option<(usize, usize)>,
}

impl Default for SessionWorld {
    fn default() -> Self {
        let transport = RecordingTransport::new();
        Self {
            machine: SessionMachine::new(transport.clone(), DEFAULT_RELAY_ENDPOINT),
            transport,
            inbox: Arc::default(),
            last_join: None,
            last_error: None,
            last_transition: None,
            checkpoint: None,
        }
    }
}

impl SessionWorld {
    /// Listener that records into the shared inbox under `name`
    pub fn listener(&self, name: &str) -> Box<dyn SessionListener> {
        let inbox = Arc::clone(&self.inbox);
        let name = name.to_string();
        Box::new(move |code: ResultCode, notification: Notification| {
            inbox.lock().unwrap().push(Received {
                listener: name.clone(),
                code,
                notification,
            });
        })
    }

    /// Feed one relay frame to the machine
    pub fn deliver(&mut self, wire: WireEvent) -> Transition {
        let transition = self.machine.handle_wire(&wire);
        self.last_transition = Some(transition);
        transition
    }

    /// Store the outcome of an outbound command
    pub fn record(&mut self, result: runmate_core::Result<()>) {
        self.last_error = result.err();
    }

    pub fn received(&self) -> Vec<Received> {
        self.inbox.lock().unwrap().clone()
    }

    pub fn received_by(&self, listener: &str) -> Vec<Received> {
        self.received()
            .into_iter()
            .filter(|r| r.listener == listener)
            .collect()
    }

    /// Remember the traffic so far
    pub fn take_checkpoint(&mut self) {
        self.checkpoint = Some((self.transport.emitted().len(), self.received().len()));
    }

    /// Events sent since the checkpoint
    pub fn sent_since_checkpoint(&self) -> Vec<WireEvent> {
        let (sent, _) = self.checkpoint.expect("No checkpoint taken");
        self.transport.emitted().into_iter().skip(sent).collect()
    }

    /// Notifications delivered since the checkpoint
    pub fn received_since_checkpoint(&self) -> Vec<Received> {
        let (_, received) = self.checkpoint.expect("No checkpoint taken");
        self.received().into_iter().skip(received).collect()
    }

    /// Last event handed to the transport (panics if none)
    pub fn last_sent(&self) -> WireEvent {
        self.transport
            .emitted()
            .pop()
            .expect("Nothing was sent to the relay")
    }
}

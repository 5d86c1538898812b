use crate::application::runtime::{CommandQueue, QueueError, QueuedCommand};
use crate::application::{CommandOutcome, SessionCommand, SessionMachine, Transition};
use crate::error::SessionError;
use crate::protocol::{Transport, WireEvent};

/// Outcome of one queued command, in submission order
#[derive(Debug, Clone, PartialEq)]
pub struct CommandReport {
    pub command: &'static str,
    pub result: Result<CommandOutcome, SessionError>,
}

/// Session loop - runs queued commands against the machine in batches
#[derive(Debug)]
pub struct SessionLoop<T: Transport> {
    machine: SessionMachine<T>,

    /// Inbound command queue
    inbound: CommandQueue,

    /// Per-command results (caller drains this)
    reports: Vec<CommandReport>,

    /// Max commands to process per poll
    batch_size: usize,
}

impl<T: Transport> SessionLoop<T> {
    pub fn new(machine: SessionMachine<T>, batch_size: usize, max_queue_size: usize) -> Self {
        Self {
            machine,
            inbound: CommandQueue::new(max_queue_size),
            reports: Vec::new(),
            batch_size: batch_size.max(1),
        }
    }

    /// Submit a command (non-blocking)
    pub fn submit(&mut self, cmd: impl Into<QueuedCommand>) -> Result<(), QueueError> {
        self.inbound.push(cmd)
    }

    /// Process up to `batch_size` commands
    /// Returns number of commands processed
    ///
    /// Stops early after a command that releases the relay link, so the
    /// caller can discard inbound events still buffered from that cycle
    /// before the next command opens a new one.
    pub fn poll(&mut self) -> usize {
        let mut processed = 0;
        let cycle = self.machine.cycle();

        while processed < self.batch_size {
            let Some(QueuedCommand { command: cmd, listener }) = self.inbound.pop() else {
                break;
            };
            if let Some(listener) = listener {
                self.machine.bind_listener(listener);
            }
            let command = cmd.name();
            let result = self.machine.execute(cmd);
            self.reports.push(CommandReport { command, result });
            processed += 1;

            if self.machine.cycle() != cycle {
                break;
            }
        }

        processed
    }

    /// Inbound relay events bypass the queue and run to completion immediately
    pub fn handle_wire(&mut self, wire: &WireEvent) -> Transition {
        self.machine.handle_wire(wire)
    }

    /// Drain all command results (caller's responsibility)
    pub fn drain_reports(&mut self) -> Vec<CommandReport> {
        std::mem::take(&mut self.reports)
    }

    pub fn pending(&self) -> usize {
        self.inbound.len()
    }

    pub fn machine(&self) -> &SessionMachine<T> {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut SessionMachine<T> {
        &mut self.machine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{JoinOutcome, Notification, ResultCode};
    use crate::domain::{Phase, RunParameters};
    use crate::protocol::DEFAULT_RELAY_ENDPOINT;
    use crate::testing::RecordingTransport;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn session_loop(batch_size: usize) -> (SessionLoop<RecordingTransport>, RecordingTransport) {
        let transport = RecordingTransport::new();
        let machine = SessionMachine::new(transport.clone(), DEFAULT_RELAY_ENDPOINT);
        (SessionLoop::new(machine, batch_size, 100), transport)
    }

    fn join() -> SessionCommand {
        SessionCommand::Join {
            credential: "tok1".into(),
            parameters: RunParameters::new(600, 1, 0).unwrap(),
        }
    }

    #[test]
    fn test_submit_and_poll() {
        let (mut loop_, transport) = session_loop(10);

        loop_.submit(join()).unwrap();
        assert_eq!(loop_.poll(), 1);

        let reports = loop_.drain_reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].command, "join");
        assert_eq!(
            reports[0].result,
            Ok(CommandOutcome::Joined(JoinOutcome::Started))
        );
        assert_eq!(transport.emitted_names(), vec!["joinRoom"]);
    }

    #[test]
    fn test_batch_processing() {
        let (mut loop_, _transport) = session_loop(3);

        for km in 0..5 {
            loop_
                .submit(SessionCommand::ReportProgress { km })
                .unwrap();
        }

        assert_eq!(loop_.poll(), 3);
        assert_eq!(loop_.drain_reports().len(), 3);
        assert_eq!(loop_.pending(), 2);

        assert_eq!(loop_.poll(), 2);
        assert_eq!(loop_.drain_reports().len(), 2);
    }

    #[test]
    fn test_rejected_commands_reported_in_order() {
        let (mut loop_, transport) = session_loop(10);

        loop_.submit(join()).unwrap();
        loop_.submit(SessionCommand::ReportProgress { km: 3 }).unwrap();
        loop_.submit(join()).unwrap();
        loop_.poll();

        let reports = loop_.drain_reports();
        assert!(reports[0].result.is_ok());
        assert!(matches!(
            reports[1].result,
            Err(SessionError::ProtocolViolation {
                command: "reportProgress",
                phase: Phase::AwaitingRoom
            })
        ));
        assert_eq!(
            reports[2].result,
            Ok(CommandOutcome::Joined(JoinOutcome::Rebound))
        );
        assert_eq!(transport.emitted_names(), vec!["joinRoom"]);
    }

    #[test]
    fn test_inbound_bypasses_queue() {
        let (mut loop_, _transport) = session_loop(10);
        loop_.submit(join()).unwrap();
        loop_.poll();

        loop_.submit(SessionCommand::Cancel).unwrap();
        loop_.handle_wire(&WireEvent::new("roomCreated", vec![json!("room42")]));
        loop_.poll();

        assert_eq!(loop_.machine().room_id().unwrap().as_str(), "room42");
        let reports = loop_.drain_reports();
        assert_eq!(
            reports.last().map(|r| r.result.clone()),
            Some(Ok(CommandOutcome::Sent {
                event: "stopMatching"
            }))
        );
    }

    #[test]
    fn test_poll_stops_after_release() {
        let (mut loop_, transport) = session_loop(10);
        loop_.submit(join()).unwrap();
        loop_.poll();

        loop_.submit(SessionCommand::Shutdown).unwrap();
        loop_.submit(join()).unwrap();

        assert_eq!(loop_.poll(), 1);
        assert_eq!(loop_.machine().phase(), Phase::Closed);
        assert_eq!(loop_.machine().cycle(), 1);

        assert_eq!(loop_.poll(), 1);
        assert_eq!(loop_.machine().phase(), Phase::AwaitingRoom);
        assert_eq!(transport.connect_count(), 2);
    }

    #[test]
    fn test_queued_listener_bound_when_command_runs() {
        let (mut loop_, _transport) = session_loop(10);
        let received: Arc<Mutex<Vec<ResultCode>>> = Arc::default();
        let sink = Arc::clone(&received);

        loop_
            .submit(
                QueuedCommand::new(join()).with_listener(Box::new(
                    move |code: ResultCode, _: Notification| sink.lock().unwrap().push(code),
                )),
            )
            .unwrap();
        assert!(!loop_.machine().dispatcher().is_bound());

        loop_.poll();
        loop_.handle_wire(&WireEvent::new("timeLeft", vec![json!(30)]));

        assert!(loop_.machine().dispatcher().is_bound());
        assert_eq!(*received.lock().unwrap(), vec![ResultCode::TimeRemaining]);
    }

    #[test]
    fn test_refused_command_keeps_current_listener() {
        let transport = RecordingTransport::new();
        let machine = SessionMachine::new(transport, DEFAULT_RELAY_ENDPOINT);
        let mut loop_ = SessionLoop::new(machine, 10, 1);

        loop_.submit(join()).unwrap();
        let refused = loop_.submit(
            QueuedCommand::new(SessionCommand::ConfirmReady)
                .with_listener(Box::new(|_: ResultCode, _: Notification| {})),
        );

        assert_eq!(refused, Err(QueueError::Full { max: 1 }));
        loop_.poll();
        assert_eq!(loop_.machine().dispatcher().generation(), 0);
    }
}

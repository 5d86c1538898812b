use crate::application::{
    Notification, NotificationDispatcher, SessionCommand, SessionListener, SessionSnapshot,
};
use crate::domain::{
    Credential, LinkState, Phase, RoomAssignment, RoomId, RunParameters, RunReport, Session,
};
use crate::error::{Result, SessionError};
use crate::protocol::{
    InboundEvent, OutboundEvent, RelayEndpoint, Transport, WireEvent, INBOUND_EVENTS,
};
use std::fmt;

/// What a `join` request did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// New cycle started, `joinRoom` sent
    Started,
    /// Already matching or running: only the listener was replaced
    Rebound,
}

/// Result of executing a queued command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Opened,
    Joined(JoinOutcome),
    /// Outbound event sent to the relay
    Sent { event: &'static str },
    ShutDown,
}

/// Effect of one inbound event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Precondition met; `from == to` for events that keep the phase
    Applied { from: Phase, to: Phase },
    /// Precondition not met for the current phase
    Ignored,
    /// Subscriptions are released, event discarded
    Dropped,
    /// Payload failed to decode or contradicts session state
    Rejected,
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied { .. })
    }
}

/// Client side of the relay session protocol.
///
/// Owns the session, the transport and the listener. Inbound events run to
/// completion one at a time; every outbound send happens from inside a
/// command or an inbound handler.
pub struct SessionMachine<T: Transport> {
    transport: T,
    endpoint: String,

    dispatcher: NotificationDispatcher,
    session: Session,
    link: LinkState,

    /// Transport connect issued and not yet torn down
    connected: bool,
    /// Inbound event table registered on the transport
    subscribed: bool,
    /// Bumped on every release; events read before it belong to a finished cycle
    cycle: u64,
}

impl<T: Transport> SessionMachine<T> {
    /// Machine for `endpoint`; the address is validated on first connect
    pub fn new(transport: T, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            dispatcher: NotificationDispatcher::new(),
            session: Session::new(),
            link: LinkState::Offline,
            connected: false,
            subscribed: false,
            cycle: 0,
        }
    }

    // Queries

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    pub fn room_id(&self) -> Option<&RoomId> {
        self.session.room_id()
    }

    pub fn link(&self) -> LinkState {
        self.link
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// How many times the relay link has been released
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(&self.session, self.link)
    }

    // Connection lifecycle

    /// Open the transport and register the inbound table, once.
    ///
    /// Returns `false` when already connected. A malformed endpoint fails
    /// with `SessionError::Configuration` and is not retried.
    pub fn connect(&mut self) -> Result<bool> {
        if self.connected {
            return Ok(false);
        }

        let endpoint = RelayEndpoint::parse(&self.endpoint).map_err(|e| {
            tracing::error!(endpoint = %self.endpoint, error = %e, "Invalid relay endpoint");
            SessionError::Configuration(e)
        })?;

        self.transport.connect(&endpoint)?;
        self.connected = true;
        self.link = LinkState::Connecting;

        if let Err(e) = self.transport.subscribe(&INBOUND_EVENTS) {
            self.transport.disconnect();
            self.connected = false;
            self.link = LinkState::Offline;
            return Err(e.into());
        }
        self.subscribed = true;

        tracing::info!(
            endpoint = %endpoint,
            namespace = endpoint.namespace(),
            "🔗 Connecting to relay"
        );
        Ok(true)
    }

    /// Named connect: opens the link without joining (`Idle -> Connecting`)
    pub fn open(&mut self) -> Result<()> {
        self.connect()?;
        if self.phase().accepts_join() {
            self.session.set_phase(Phase::Connecting);
        }
        Ok(())
    }

    /// Process teardown: release subscriptions, disconnect, close
    pub fn shutdown(&mut self) {
        if self.release("shutdown") {
            return;
        }
        if !self.phase().is_closed() {
            self.session.close();
        }
    }

    /// Unsubscribe first, then disconnect. `false` if nothing was held.
    fn release(&mut self, reason: &'static str) -> bool {
        if !self.connected && !self.subscribed {
            return false;
        }

        let from = self.phase();
        if self.subscribed {
            self.transport.unsubscribe_all();
            self.subscribed = false;
        }
        if self.connected {
            self.transport.disconnect();
            self.connected = false;
        }
        self.link = LinkState::Offline;
        self.cycle += 1;
        self.session.close();

        tracing::info!(
            session = %self.session.id(),
            %from,
            reason,
            "🔌 Session closed, relay released"
        );
        true
    }

    // External operations

    /// Bind the listener used for all further notifications
    pub fn bind_listener(&mut self, listener: Box<dyn SessionListener>) {
        self.dispatcher.bind(listener);
    }

    /// Bind `listener` and start matchmaking.
    ///
    /// Outside `Idle`/`Connecting`/`Closed` only the listener is replaced.
    pub fn join(
        &mut self,
        credential: Credential,
        parameters: RunParameters,
        listener: Box<dyn SessionListener>,
    ) -> Result<JoinOutcome> {
        self.bind_listener(listener);
        self.start_matching(credential, parameters)
    }

    /// Join with whatever listener is currently bound
    pub fn start_matching(
        &mut self,
        credential: Credential,
        parameters: RunParameters,
    ) -> Result<JoinOutcome> {
        let phase = self.phase();
        if !phase.accepts_join() {
            tracing::debug!(
                session = %self.session.id(),
                %phase,
                "Join while matching, listener rebound only"
            );
            return Ok(JoinOutcome::Rebound);
        }

        self.connect()?;

        self.transport.emit(&OutboundEvent::JoinRoom {
            credential: credential.clone(),
            parameters,
        })?;
        self.session.begin(credential, parameters);

        tracing::info!(
            session = %self.session.id(),
            duration_seconds = parameters.duration_seconds(),
            gender_filter = parameters.gender_filter(),
            lead_time_seconds = parameters.lead_time_seconds(),
            "🏃 Joining matchmaking"
        );
        Ok(JoinOutcome::Started)
    }

    /// Ask the relay to stop matchmaking; teardown follows the relay's `leaveRoom`
    pub fn cancel(&mut self) -> Result<()> {
        let room_id = self.require_room("cancel")?;
        self.send(OutboundEvent::StopMatching { room_id })
    }

    pub fn confirm_ready(&mut self) -> Result<()> {
        self.require_phase("confirmReady", &[Phase::Ready])?;
        let room_id = self.require_room("confirmReady")?;
        self.send(OutboundEvent::ReadyToRun { room_id })
    }

    pub fn report_progress(&mut self, km: u32) -> Result<()> {
        self.require_phase("reportProgress", &[Phase::Running])?;
        let room_id = self.require_room("reportProgress")?;
        self.send(OutboundEvent::KmPassed { room_id, km })
    }

    /// Early termination
    pub fn report_stop(&mut self, report: RunReport) -> Result<()> {
        self.require_phase("reportStop", &[Phase::Running])?;
        let room_id = self.require_room("reportStop")?;
        self.send(OutboundEvent::StopRunning { room_id, report })
    }

    pub fn report_finish(&mut self, report: RunReport) -> Result<()> {
        self.require_phase("reportFinish", &[Phase::Running])?;
        let room_id = self.require_room("reportFinish")?;
        self.send(OutboundEvent::EndRunning { room_id, report })
    }

    pub fn report_complete(&mut self) -> Result<()> {
        self.require_phase(
            "reportComplete",
            &[Phase::Running, Phase::AwaitingComparison],
        )?;
        let room_id = self.require_room("reportComplete")?;
        self.send(OutboundEvent::RunComplete { room_id })
    }

    /// Execute a queued command
    pub fn execute(&mut self, command: SessionCommand) -> Result<CommandOutcome> {
        let outcome = match command {
            SessionCommand::Open => {
                self.open()?;
                CommandOutcome::Opened
            }
            SessionCommand::Join {
                credential,
                parameters,
            } => CommandOutcome::Joined(self.start_matching(credential, parameters)?),
            SessionCommand::Cancel => {
                self.cancel()?;
                CommandOutcome::Sent {
                    event: "stopMatching",
                }
            }
            SessionCommand::ConfirmReady => {
                self.confirm_ready()?;
                CommandOutcome::Sent {
                    event: "readyToRun",
                }
            }
            SessionCommand::ReportProgress { km } => {
                self.report_progress(km)?;
                CommandOutcome::Sent { event: "kmPassed" }
            }
            SessionCommand::ReportStop(report) => {
                self.report_stop(report)?;
                CommandOutcome::Sent {
                    event: "stopRunning",
                }
            }
            SessionCommand::ReportFinish(report) => {
                self.report_finish(report)?;
                CommandOutcome::Sent {
                    event: "endRunning",
                }
            }
            SessionCommand::ReportComplete => {
                self.report_complete()?;
                CommandOutcome::Sent {
                    event: "runComplete",
                }
            }
            SessionCommand::Shutdown => {
                self.shutdown();
                CommandOutcome::ShutDown
            }
        };
        Ok(outcome)
    }

    fn require_phase(&self, command: &'static str, allowed: &[Phase]) -> Result<()> {
        let phase = self.phase();
        if allowed.contains(&phase) {
            return Ok(());
        }
        tracing::warn!(session = %self.session.id(), command, %phase, "Command rejected");
        Err(SessionError::ProtocolViolation { command, phase })
    }

    fn require_room(&self, command: &'static str) -> Result<RoomId> {
        self.session.room_id().cloned().ok_or_else(|| {
            tracing::warn!(session = %self.session.id(), command, "Command needs a room");
            SessionError::MissingRoom { command }
        })
    }

    fn send(&mut self, event: OutboundEvent) -> Result<()> {
        match self.transport.emit(&event) {
            Ok(()) => {
                tracing::debug!(
                    session = %self.session.id(),
                    event = event.name(),
                    room = ?event.room_id().map(RoomId::as_str),
                    "📤 Sent"
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    session = %self.session.id(),
                    event = event.name(),
                    error = %e,
                    "Send failed"
                );
                Err(e.into())
            }
        }
    }

    /// Sends issued by inbound handlers; failures are logged, never retried
    fn send_in_handler(&mut self, event: OutboundEvent) {
        let _ = self.send(event);
    }

    fn notify(&mut self, notification: Notification) {
        self.dispatcher.dispatch(notification);
    }

    // Inbound

    /// Decode and apply a raw inbound event
    pub fn handle_wire(&mut self, wire: &WireEvent) -> Transition {
        if !self.subscribed {
            tracing::debug!(event = %wire.event, "Not subscribed, inbound event dropped");
            return Transition::Dropped;
        }

        match InboundEvent::decode(wire) {
            Ok(event) => self.handle_inbound(event),
            Err(e) => {
                tracing::warn!(
                    session = %self.session.id(),
                    phase = %self.phase(),
                    error = %e,
                    "Protocol violation in inbound event"
                );
                Transition::Rejected
            }
        }
    }

    /// Apply a typed inbound event to the current phase
    pub fn handle_inbound(&mut self, event: InboundEvent) -> Transition {
        if !self.subscribed {
            if event.is_lifecycle() {
                tracing::trace!(event = event.name(), "Link event after release dropped");
            } else {
                tracing::debug!(event = event.name(), "Not subscribed, inbound event dropped");
            }
            return Transition::Dropped;
        }

        let from = self.phase();
        let name = event.name();
        let applied = match (event, from) {
            (InboundEvent::Connect, _) => {
                self.link = LinkState::Online;
                tracing::info!(session = %self.session.id(), "✅ Relay link up");
                true
            }
            (InboundEvent::Disconnect, _) => {
                self.link = LinkState::Connecting;
                tracing::info!(session = %self.session.id(), "Relay link lost");
                true
            }
            (InboundEvent::ConnectTimeout, _) if self.link != LinkState::Online => {
                tracing::warn!(session = %self.session.id(), "Relay connect timed out");
                self.notify(Notification::ConnectionTimeout);
                true
            }
            (InboundEvent::ConnectError { reason }, _) => {
                tracing::warn!(session = %self.session.id(), ?reason, "Relay connect error");
                self.notify(Notification::ConnectionError { reason });
                true
            }
            (InboundEvent::Start, _) => {
                tracing::debug!(session = %self.session.id(), "Relay start");
                true
            }
            (InboundEvent::JoinRoomEcho, _) => {
                tracing::debug!(session = %self.session.id(), "Relay acknowledged join");
                true
            }

            (InboundEvent::RoomCreated { room_id }, Phase::AwaitingRoom) => {
                match self.session.assign_room(room_id.clone()) {
                    Ok(RoomAssignment::Assigned) => {
                        tracing::info!(session = %self.session.id(), room = %room_id, "🏠 Room created");
                        self.send_in_handler(OutboundEvent::StartCount {
                            room_id: room_id.clone(),
                        });
                        self.notify(Notification::RoomAssigned { room_id });
                        true
                    }
                    Ok(RoomAssignment::Unchanged) => {
                        tracing::debug!(session = %self.session.id(), room = %room_id, "Duplicate roomCreated");
                        false
                    }
                    Err(conflict) => return self.reject(name, &conflict),
                }
            }
            (InboundEvent::TimeLeft { seconds }, Phase::AwaitingRoom | Phase::AwaitingOpponent) => {
                self.notify(Notification::TimeRemaining { seconds });
                true
            }
            (InboundEvent::TimeOver, phase) if !phase.is_closed() => {
                self.release("timeOver");
                true
            }
            (InboundEvent::StopCount, Phase::AwaitingRoom) => {
                match self.session.room_id().cloned() {
                    Some(room_id) => self.send_in_handler(OutboundEvent::LeaveRoom { room_id }),
                    None => tracing::warn!(
                        session = %self.session.id(),
                        "stopCount before any room was assigned, leaveRoom not sent"
                    ),
                }
                true
            }
            (InboundEvent::LeaveRoom, _) => {
                self.release("leaveRoom");
                true
            }
            (InboundEvent::RoomFull { room_id }, Phase::AwaitingRoom) => {
                if let Err(conflict) = self.session.assign_room(room_id.clone()) {
                    return self.reject(name, &conflict);
                }
                self.session.set_phase(Phase::AwaitingOpponent);
                tracing::info!(session = %self.session.id(), room = %room_id, "Room full, requesting opponent");
                self.send_in_handler(OutboundEvent::OpponentInfo { room_id });
                true
            }
            (InboundEvent::OpponentInfo { room_id, opponent }, Phase::AwaitingOpponent) => {
                if let Err(conflict) = self.session.assign_room(room_id) {
                    return self.reject(name, &conflict);
                }
                tracing::info!(
                    session = %self.session.id(),
                    opponent = %opponent.name,
                    level = opponent.level,
                    "🤝 Paired with opponent"
                );
                self.session.pair(opponent.clone());
                self.notify(Notification::OpponentInfo(opponent));
                true
            }

            (InboundEvent::LetsRun, Phase::Ready) => {
                self.session.set_phase(Phase::Running);
                tracing::info!(session = %self.session.id(), "🏁 Run started");
                self.notify(Notification::RunStart);
                true
            }
            (InboundEvent::OpponentNotReady, Phase::Ready) => {
                tracing::debug!(session = %self.session.id(), "Opponent not ready yet");
                true
            }
            (InboundEvent::KmPassed, Phase::Running) => {
                tracing::debug!(session = %self.session.id(), "Opponent passed a kilometre");
                true
            }
            (InboundEvent::StopRunning, Phase::Running) => {
                if let Some(room_id) = self.session.room_id().cloned() {
                    self.send_in_handler(OutboundEvent::LeaveRoom { room_id });
                }
                true
            }
            (InboundEvent::OpponentStopped, Phase::Running) => {
                tracing::info!(session = %self.session.id(), "Opponent stopped running");
                true
            }
            (InboundEvent::EndRunning, Phase::Running) => {
                self.session.set_phase(Phase::AwaitingComparison);
                true
            }
            (InboundEvent::CompareResult, Phase::AwaitingComparison) => {
                self.release("compareResult");
                true
            }

            (InboundEvent::Error { message }, _) => {
                tracing::warn!(session = %self.session.id(), ?message, "Relay reported an error");
                true
            }

            (_, phase) => {
                tracing::debug!(session = %self.session.id(), event = name, %phase, "Inbound event ignored");
                false
            }
        };

        if applied {
            Transition::Applied {
                from,
                to: self.phase(),
            }
        } else {
            Transition::Ignored
        }
    }

    fn reject(&self, event: &'static str, reason: &dyn fmt::Display) -> Transition {
        tracing::warn!(
            session = %self.session.id(),
            event,
            %reason,
            "Protocol violation in inbound event"
        );
        Transition::Rejected
    }
}

impl<T: Transport> fmt::Debug for SessionMachine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionMachine")
            .field("endpoint", &self.endpoint)
            .field("session", &self.session)
            .field("link", &self.link)
            .field("connected", &self.connected)
            .field("subscribed", &self.subscribed)
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

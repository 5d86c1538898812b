use crate::application::ClientConfig;
use crate::error::{ClientError, Result};
use crate::infrastructure::JsonLinesTransport;
use runmate_core::{
    CommandOutcome, Credential, QueuedCommand, RunParameters, RunReport, SessionCommand,
    SessionListener, SessionLoop, SessionMachine, SessionSnapshot, Transport, WireEvent,
};
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

type Reply = oneshot::Sender<Result<CommandOutcome>>;

/// A caller request, marshalled onto the runtime task
struct Request {
    command: SessionCommand,
    /// Bound right before `command` executes
    listener: Option<Box<dyn SessionListener>>,
    reply: Reply,
}

/// Cloneable entry point into a running session.
///
/// Every call is serialized onto the runtime task, so concurrent callers can
/// never open a second transport or interleave inside an inbound handler.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Request>,
}

impl SessionHandle {
    async fn request(
        &self,
        command: SessionCommand,
        listener: Option<Box<dyn SessionListener>>,
    ) -> Result<CommandOutcome> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request {
                command,
                listener,
                reply,
            })
            .await
            .map_err(|_| ClientError::RuntimeClosed)?;
        rx.await.map_err(|_| ClientError::RuntimeClosed)?
    }

    /// Run any session command
    pub async fn execute(&self, command: SessionCommand) -> Result<CommandOutcome> {
        self.request(command, None).await
    }

    /// Connect to the relay without joining
    pub async fn open(&self) -> Result<CommandOutcome> {
        self.execute(SessionCommand::Open).await
    }

    /// Bind `listener` and join matchmaking.
    ///
    /// While a session is already matching or running this only replaces
    /// the listener (`JoinOutcome::Rebound`).
    pub async fn join(
        &self,
        credential: impl Into<Credential>,
        parameters: RunParameters,
        listener: impl SessionListener + 'static,
    ) -> Result<CommandOutcome> {
        let command = SessionCommand::Join {
            credential: credential.into(),
            parameters,
        };
        self.request(command, Some(Box::new(listener))).await
    }

    pub async fn cancel(&self) -> Result<CommandOutcome> {
        self.execute(SessionCommand::Cancel).await
    }

    pub async fn confirm_ready(&self) -> Result<CommandOutcome> {
        self.execute(SessionCommand::ConfirmReady).await
    }

    /// Confirm readiness and route further notifications to `listener`
    /// (the run screen usually takes over from the matchmaking one)
    pub async fn confirm_ready_with(
        &self,
        listener: impl SessionListener + 'static,
    ) -> Result<CommandOutcome> {
        self.request(SessionCommand::ConfirmReady, Some(Box::new(listener)))
            .await
    }

    pub async fn report_progress(&self, km: u32) -> Result<CommandOutcome> {
        self.execute(SessionCommand::ReportProgress { km }).await
    }

    pub async fn report_stop(&self, report: RunReport) -> Result<CommandOutcome> {
        self.execute(SessionCommand::ReportStop(report)).await
    }

    pub async fn report_finish(&self, report: RunReport) -> Result<CommandOutcome> {
        self.execute(SessionCommand::ReportFinish(report)).await
    }

    pub async fn report_complete(&self) -> Result<CommandOutcome> {
        self.execute(SessionCommand::ReportComplete).await
    }

    /// Tear the session down (the runtime keeps running and may join again)
    pub async fn close(&self) -> Result<CommandOutcome> {
        self.execute(SessionCommand::Shutdown).await
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Background runtime owning the one session machine of the process
pub struct SessionRuntime {
    handle: SessionHandle,

    /// Receive state snapshots (latest always available)
    state_rx: watch::Receiver<SessionSnapshot>,

    task: Option<JoinHandle<()>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    shutdown_timeout: Duration,
}

impl SessionRuntime {
    /// Spawn the runtime over a JSON-lines TCP transport
    pub fn connect(config: &ClientConfig) -> Self {
        let (transport, inbound) = JsonLinesTransport::channel(config.connect_timeout);
        Self::spawn(transport, inbound, config)
    }

    /// Spawn the runtime over `transport`; `inbound` carries its relay events
    pub fn spawn<T>(
        transport: T,
        inbound: mpsc::UnboundedReceiver<WireEvent>,
        config: &ClientConfig,
    ) -> Self
    where
        T: Transport + Send + 'static,
    {
        let (tx, requests) = mpsc::channel::<Request>(config.command_buffer.max(1));
        let (state_tx, state_rx) = watch::channel(SessionSnapshot::default());
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let machine = SessionMachine::new(transport, config.endpoint.clone());
        let session_loop = SessionLoop::new(machine, config.batch_size, config.queue_size);

        let task = tokio::spawn(run_session(
            session_loop,
            requests,
            inbound,
            state_tx,
            shutdown_rx,
        ));

        Self {
            handle: SessionHandle { tx },
            state_rx,
            task: Some(task),
            shutdown_tx: Some(shutdown_tx),
            shutdown_timeout: config.shutdown_timeout,
        }
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Latest snapshot (never blocks)
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state_rx.borrow().clone()
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state_rx.clone()
    }

    /// Release the relay and stop the runtime task.
    ///
    /// Waits up to the configured shutdown timeout, then aborts the task.
    pub async fn shutdown(&mut self) {
        tracing::debug!("SessionRuntime: shutdown requested");

        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(mut task) = self.task.take() {
            match tokio::time::timeout(self.shutdown_timeout, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!("Session task terminated with join error: {e}"),
                Err(_) => {
                    tracing::warn!("Session task did not exit within timeout; aborting");
                    task.abort();
                    let _ = task.await;
                }
            }
        }
    }
}

impl fmt::Debug for SessionRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRuntime")
            .field("snapshot", &*self.state_rx.borrow())
            .field("running", &self.task.is_some())
            .finish()
    }
}

impl Drop for SessionRuntime {
    fn drop(&mut self) {
        // No executor to await a graceful shutdown here
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run_session<T: Transport>(
    mut session_loop: SessionLoop<T>,
    mut requests: mpsc::Receiver<Request>,
    mut inbound: mpsc::UnboundedReceiver<WireEvent>,
    state_tx: watch::Sender<SessionSnapshot>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut replies: VecDeque<Reply> = VecDeque::new();
    let mut inbound_open = true;

    tracing::info!("🚀 SessionRuntime started");

    loop {
        tokio::select! {
            _ = &mut shutdown_rx => {
                session_loop.machine_mut().shutdown();
                publish(&session_loop, &state_tx);
                break;
            }

            request = requests.recv() => match request {
                Some(request) => {
                    accept(&mut session_loop, &mut replies, request);
                    while let Ok(request) = requests.try_recv() {
                        accept(&mut session_loop, &mut replies, request);
                    }
                    process(&mut session_loop, &mut replies, &mut inbound);
                }
                None => {
                    tracing::debug!("All session handles dropped");
                    session_loop.machine_mut().shutdown();
                    publish(&session_loop, &state_tx);
                    break;
                }
            },

            wire = inbound.recv(), if inbound_open => match wire {
                Some(wire) => {
                    let cycle = session_loop.machine().cycle();
                    let transition = session_loop.handle_wire(&wire);
                    tracing::trace!(event = %wire.event, ?transition, "Inbound processed");
                    if session_loop.machine().cycle() != cycle {
                        discard_stale(&mut inbound);
                    }
                }
                None => {
                    tracing::debug!("Transport inbound channel closed");
                    inbound_open = false;
                }
            },
        }

        publish(&session_loop, &state_tx);
    }

    tracing::info!("SessionRuntime stopped");
}

fn accept<T: Transport>(
    session_loop: &mut SessionLoop<T>,
    replies: &mut VecDeque<Reply>,
    request: Request,
) {
    let Request {
        command,
        listener,
        reply,
    } = request;

    let queued = match listener {
        Some(listener) => QueuedCommand::new(command).with_listener(listener),
        None => QueuedCommand::new(command),
    };

    match session_loop.submit(queued) {
        Ok(()) => replies.push_back(reply),
        Err(e) => {
            tracing::warn!("Failed to submit command: {e}");
            let _ = reply.send(Err(e.into()));
        }
    }
}

fn process<T: Transport>(
    session_loop: &mut SessionLoop<T>,
    replies: &mut VecDeque<Reply>,
    inbound: &mut mpsc::UnboundedReceiver<WireEvent>,
) {
    while session_loop.pending() > 0 {
        let cycle = session_loop.machine().cycle();
        let processed = session_loop.poll();
        tracing::debug!("SessionRuntime processed {} commands", processed);

        for report in session_loop.drain_reports() {
            if let Some(reply) = replies.pop_front() {
                let _ = reply.send(report.result.map_err(ClientError::from));
            }
        }

        if session_loop.machine().cycle() != cycle {
            discard_stale(inbound);
        }
    }
}

/// Drop inbound events buffered before the relay link was released.
///
/// The transport stops delivering on `unsubscribe_all`, so anything still
/// queued here was read by the released link and must not reach the next
/// session.
fn discard_stale(inbound: &mut mpsc::UnboundedReceiver<WireEvent>) {
    let mut discarded = 0usize;
    while let Ok(wire) = inbound.try_recv() {
        tracing::debug!(event = %wire.event, "Event from a released link discarded");
        discarded += 1;
    }
    if discarded > 0 {
        tracing::info!(discarded, "Stale inbound events dropped after release");
    }
}

fn publish<T: Transport>(session_loop: &SessionLoop<T>, state_tx: &watch::Sender<SessionSnapshot>) {
    let snapshot = session_loop.machine().snapshot();
    state_tx.send_if_modified(|current| {
        if *current == snapshot {
            return false;
        }
        *current = snapshot;
        true
    });
}

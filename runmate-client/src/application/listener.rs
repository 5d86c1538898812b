use runmate_core::{Notification, ResultCode, SessionListener};
use tokio::sync::mpsc;

/// Forwards notifications into a tokio channel
#[derive(Debug, Clone)]
pub struct ChannelListener {
    tx: mpsc::UnboundedSender<(ResultCode, Notification)>,
}

impl ChannelListener {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(ResultCode, Notification)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl SessionListener for ChannelListener {
    fn on_notification(&mut self, code: ResultCode, notification: Notification) {
        if self.tx.send((code, notification)).is_err() {
            tracing::debug!(code = code.as_i32(), "Notification receiver gone");
        }
    }
}

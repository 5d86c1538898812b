use crate::application::{Notification, ResultCode};
use std::fmt;

/// External target for session notifications
pub trait SessionListener: Send {
    fn on_notification(&mut self, code: ResultCode, notification: Notification);
}

impl<F> SessionListener for F
where
    F: FnMut(ResultCode, Notification) + Send,
{
    fn on_notification(&mut self, code: ResultCode, notification: Notification) {
        self(code, notification)
    }
}

/// Routes notifications to the single bound listener.
///
/// Last bind wins. Nothing is queued: a notification with no listener
/// bound is dropped.
#[derive(Default)]
pub struct NotificationDispatcher {
    listener: Option<Box<dyn SessionListener>>,
    generation: u64,
    delivered: u64,
    dropped: u64,
}

impl NotificationDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current listener
    pub fn bind(&mut self, listener: Box<dyn SessionListener>) {
        self.listener = Some(listener);
        self.generation += 1;
        tracing::debug!(generation = self.generation, "Listener bound");
    }

    pub fn is_bound(&self) -> bool {
        self.listener.is_some()
    }

    /// Deliver to the bound listener; `false` if it was dropped
    pub fn dispatch(&mut self, notification: Notification) -> bool {
        let code = notification.code();
        match self.listener.as_mut() {
            Some(listener) => {
                tracing::debug!(code = code.as_i32(), "📨 Dispatching notification");
                listener.on_notification(code, notification);
                self.delivered += 1;
                true
            }
            None => {
                tracing::debug!(code = code.as_i32(), "No listener bound, notification dropped");
                self.dropped += 1;
                false
            }
        }
    }

    /// How many times a listener has been bound
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("bound", &self.is_bound())
            .field("generation", &self.generation)
            .field("delivered", &self.delivered)
            .field("dropped", &self.dropped)
            .finish()
    }
}

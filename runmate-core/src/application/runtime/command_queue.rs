use crate::application::{SessionCommand, SessionListener};
use std::collections::VecDeque;
use std::fmt;

/// A command waiting for the session loop.
///
/// The optional listener replaces the bound one right before the command
/// executes, so a command refused at the queue never rebinds anything.
pub struct QueuedCommand {
    pub command: SessionCommand,
    pub listener: Option<Box<dyn SessionListener>>,
}

impl QueuedCommand {
    pub fn new(command: SessionCommand) -> Self {
        Self {
            command,
            listener: None,
        }
    }

    pub fn with_listener(mut self, listener: Box<dyn SessionListener>) -> Self {
        self.listener = Some(listener);
        self
    }
}

impl From<SessionCommand> for QueuedCommand {
    fn from(command: SessionCommand) -> Self {
        Self::new(command)
    }
}

impl fmt::Debug for QueuedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedCommand")
            .field("command", &self.command)
            .field("rebinds_listener", &self.listener.is_some())
            .finish()
    }
}

/// Bounded FIFO in front of the session machine.
///
/// Synchronous and runtime-agnostic; the async facade feeds it from its
/// request channel and the loop drains it in batches.
#[derive(Debug)]
pub struct CommandQueue {
    queue: VecDeque<QueuedCommand>,
    max_size: usize,
}

impl CommandQueue {
    pub fn new(max_size: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Refused once `max_size` commands are waiting
    pub fn push(&mut self, cmd: impl Into<QueuedCommand>) -> Result<(), QueueError> {
        if self.queue.len() >= self.max_size {
            return Err(QueueError::Full { max: self.max_size });
        }
        self.queue.push_back(cmd.into());
        Ok(())
    }

    pub fn pop(&mut self) -> Option<QueuedCommand> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("Queue is full (max size: {max})")]
    Full { max: usize },
}

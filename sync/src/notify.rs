//! Toast-style outcome signals for mutations.

use todo_core::ApiError;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            title: "Success".to_string(),
            message: message.into(),
        }
    }

    /// Prefers the server's own message, falling back to a per-operation
    /// description.
    pub fn failure(kind: MutationKind, error: &ApiError) -> Self {
        let message = error
            .server_message()
            .map(str::to_string)
            .unwrap_or_else(|| kind.failure_message().to_string());
        Self {
            level: Level::Failure,
            title: "Error".to_string(),
            message,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
    Toggle,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::Create => "create",
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
            MutationKind::Toggle => "toggle",
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            MutationKind::Create => "Failed to create todo",
            MutationKind::Update | MutationKind::Toggle => "Failed to update todo",
            MutationKind::Delete => "Failed to delete todo",
        }
    }
}

pub fn created_message() -> &'static str {
    "Todo created successfully!"
}

pub fn updated_message() -> &'static str {
    "Todo updated successfully!"
}

pub fn deleted_message() -> &'static str {
    "Todo deleted successfully!"
}

pub fn toggled_message(completed: bool) -> String {
    let state = if completed { "completed" } else { "incomplete" };
    format!("Todo marked as {state}!")
}

/// Receives every terminal mutation outcome.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Forwards notifications to a channel the presentation layer drains.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            debug!("notification dropped, receiver is gone");
        }
    }
}

/// Writes notifications to the log. Useful for headless hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            Level::Success => info!(title = %notification.title, "{}", notification.message),
            Level::Failure => warn!(title = %notification.title, "{}", notification.message),
        }
    }
}

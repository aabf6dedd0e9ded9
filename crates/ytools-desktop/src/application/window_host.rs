//! Window host abstraction.
//!
//! The desktop shell owns the webview windows and the event bus between them.
//! The application layer only needs three things from it: the labels of the
//! open windows, a way to deliver a named event to one window, and a way for
//! a window to receive a named event.
//!
//! A listener is a plain channel receiver; dropping it unsubscribes.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

/// Error type for window host operations.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("window {0:?} is not open")]
    WindowNotFound(String),

    #[error("failed to enumerate windows: {0}")]
    Enumerate(String),

    #[error("failed to deliver {event} to window {label:?}: {reason}")]
    Emit {
        label: String,
        event: String,
        reason: String,
    },
}

/// Receives the payloads of one event on one window.
pub type EventReceiver = mpsc::UnboundedReceiver<Value>;

#[async_trait]
pub trait WindowHost: Send + Sync {
    /// Labels of every open window, including the caller's.
    async fn window_labels(&self) -> Result<Vec<String>, HostError>;

    /// Delivers `event` with `payload` to the window named `label`.
    async fn emit_to(&self, label: &str, event: &str, payload: Value) -> Result<(), HostError>;

    /// Subscribes window `label` to `event`.
    async fn listen(&self, label: &str, event: &str) -> Result<EventReceiver, HostError>;
}

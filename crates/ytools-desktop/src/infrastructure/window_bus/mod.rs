//! In-process window registry and event bus.
//!
//! Stands in for the webview shell when the app runs headless and in tests.
//! Windows are plain labels; listeners are channel senders keyed by window
//! and event name.  Listeners whose receiver has been dropped are pruned on
//! the next emit to their window.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

use crate::application::window_host::{EventReceiver, HostError, WindowHost};

struct Listener {
    event: String,
    sender: mpsc::UnboundedSender<Value>,
}

/// Window host backed by in-memory channels.
#[derive(Default)]
pub struct InProcessWindowHost {
    windows: Mutex<BTreeMap<String, Vec<Listener>>>,
}

impl InProcessWindowHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host with the given windows already open.
    pub fn with_windows<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let host = Self::new();
        for label in labels {
            host.open_window(label);
        }
        host
    }

    /// Registers a window.  Opening an open window is a no-op.
    pub fn open_window(&self, label: impl Into<String>) {
        let label = label.into();
        debug!("window {label} opened");
        self.lock().entry(label).or_default();
    }

    /// Removes a window and drops its listeners.
    pub fn close_window(&self, label: &str) {
        if self.lock().remove(label).is_some() {
            debug!("window {label} closed");
        }
    }

    /// Number of live listeners on `label`.
    pub fn listener_count(&self, label: &str) -> usize {
        self.lock().get(label).map_or(0, |listeners| {
            listeners.iter().filter(|l| !l.sender.is_closed()).count()
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Vec<Listener>>> {
        // A poisoned registry is still structurally valid.
        self.windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl WindowHost for InProcessWindowHost {
    async fn window_labels(&self) -> Result<Vec<String>, HostError> {
        Ok(self.lock().keys().cloned().collect())
    }

    async fn emit_to(&self, label: &str, event: &str, payload: Value) -> Result<(), HostError> {
        let mut windows = self.lock();
        let listeners = windows
            .get_mut(label)
            .ok_or_else(|| HostError::WindowNotFound(label.to_string()))?;

        listeners.retain(|listener| {
            if listener.event != event {
                return !listener.sender.is_closed();
            }
            listener.sender.send(payload.clone()).is_ok()
        });
        Ok(())
    }

    async fn listen(&self, label: &str, event: &str) -> Result<EventReceiver, HostError> {
        let mut windows = self.lock();
        let listeners = windows
            .get_mut(label)
            .ok_or_else(|| HostError::WindowNotFound(label.to_string()))?;

        let (sender, receiver) = mpsc::unbounded_channel();
        listeners.push(Listener {
            event: event.to_string(),
            sender,
        });
        Ok(receiver)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_window_labels_are_sorted() {
        let host = InProcessWindowHost::with_windows(["search", "main"]);

        let labels = host.window_labels().await.unwrap();

        assert_eq!(labels, vec!["main".to_string(), "search".to_string()]);
    }

    #[tokio::test]
    async fn test_emit_reaches_only_matching_event_listeners() {
        // Arrange
        let host = InProcessWindowHost::with_windows(["main"]);
        let mut theme = host.listen("main", "theme-changed").await.unwrap();
        let mut other = host.listen("main", "note-saved").await.unwrap();

        // Act
        host.emit_to("main", "theme-changed", json!("dark"))
            .await
            .unwrap();

        // Assert
        assert_eq!(theme.try_recv().unwrap(), json!("dark"));
        assert!(other.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_emit_to_closed_window_fails() {
        let host = InProcessWindowHost::with_windows(["main", "search"]);
        host.close_window("search");

        let result = host.emit_to("search", "theme-changed", json!("dark")).await;

        assert!(matches!(result, Err(HostError::WindowNotFound(label)) if label == "search"));
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_pruned_on_emit() {
        // Arrange
        let host = InProcessWindowHost::with_windows(["main"]);
        let receiver = host.listen("main", "theme-changed").await.unwrap();
        drop(receiver);

        // Act
        host.emit_to("main", "theme-changed", json!("light"))
            .await
            .unwrap();

        // Assert
        assert_eq!(host.listener_count("main"), 0);
    }

    #[tokio::test]
    async fn test_listen_on_unknown_window_fails() {
        let host = InProcessWindowHost::new();
        assert!(host.listen("ghost", "theme-changed").await.is_err());
    }
}

//! Process-wide view of the host's light/dark preference.
//!
//! The host reports the preference through a [`ColorSchemeSource`].  A single
//! listener task is installed per [`SystemPreference`], and every theme
//! manager reads the shared value through a `watch` channel, so adding
//! windows never adds listeners.

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use tracing::{debug, warn};

/// Host capability reporting the "prefers dark" media query.
pub trait ColorSchemeSource: Send + Sync {
    /// Current preference.
    fn prefers_dark(&self) -> bool;
    /// Every subsequent change of the preference.
    fn subscribe(&self) -> broadcast::Receiver<bool>;
}

/// Shared reactive "system prefers dark" flag.
pub struct SystemPreference {
    value: watch::Sender<bool>,
}

impl SystemPreference {
    /// Reads the current preference and starts following `source`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn install(source: &dyn ColorSchemeSource) -> Self {
        let (value, _) = watch::channel(source.prefers_dark());
        let mut changes = source.subscribe();
        let updates = value.clone();

        tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(prefers_dark) => {
                        debug!("system colour scheme changed: prefers dark = {prefers_dark}");
                        updates.send_replace(prefers_dark);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("missed {skipped} colour scheme changes");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        Self { value }
    }

    /// A preference that never changes.
    pub fn fixed(prefers_dark: bool) -> Self {
        let (value, _) = watch::channel(prefers_dark);
        Self { value }
    }

    pub fn prefers_dark(&self) -> bool {
        *self.value.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.value.subscribe()
    }
}

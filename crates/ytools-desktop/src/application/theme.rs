//! Per-window theme state and cross-window theme synchronisation.
//!
//! Each webview window owns one [`ThemeManager`].  The manager holds the
//! window's reactive theme mode and derives from it (together with the shared
//! [`SystemPreference`]) whether the window is dark and which palette applies.
//!
//! # How a change travels
//!
//! ```text
//! window A: change_theme(Dark)
//!   ├─ local mode := Dark              (synchronous, never rolled back)
//!   ├─ persister task writes "theme"   (once the initial load has completed)
//!   └─ emit "theme-changed" = "dark" to every open window (best effort)
//!
//! window B: listener receives "dark"
//!   └─ local mode := Dark              (no re-broadcast)
//! ```
//!
//! The persister watches the mode channel, so received changes are written
//! through too.  Before the initial load completes nothing is written, which
//! keeps the stored value from being overwritten by the default.

use std::sync::{Arc, Weak};

use serde::Serialize;
use serde_json::Value;
use tokio::sync::{watch, OnceCell};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use ytools_core::{BaseTheme, PaletteKind, ThemeMode, ThemeOverrides, THEME_CHANGED_EVENT};

use super::config_store::ConfigStore;
use super::system_preference::SystemPreference;
use super::window_host::{EventReceiver, WindowHost};

// ── Broadcast ─────────────────────────────────────────────────────────────────

/// Which windows a theme change reached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BroadcastReport {
    pub delivered: Vec<String>,
    pub failed: Vec<String>,
    /// The window list itself could not be read; nothing was sent.
    pub enumeration_failed: bool,
}

impl BroadcastReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && !self.enumeration_failed
    }
}

/// Sends `theme-changed` with `mode` to every open window.
///
/// Never fails.  A window that cannot be reached is logged and recorded in
/// the report; the remaining windows are still tried.
pub async fn broadcast_theme(host: &dyn WindowHost, mode: ThemeMode) -> BroadcastReport {
    let mut report = BroadcastReport::default();

    let labels = match host.window_labels().await {
        Ok(labels) => labels,
        Err(e) => {
            error!("failed to broadcast theme change: {e}");
            report.enumeration_failed = true;
            return report;
        }
    };

    let payload = Value::String(mode.as_str().to_string());
    for label in labels {
        match host
            .emit_to(&label, THEME_CHANGED_EVENT, payload.clone())
            .await
        {
            Ok(()) => report.delivered.push(label),
            Err(e) => {
                error!("failed to notify window {label} of theme change: {e}");
                report.failed.push(label);
            }
        }
    }
    report
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// Everything a window needs to render its current theme.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSnapshot {
    pub mode: ThemeMode,
    pub is_dark: bool,
    pub base_theme: BaseTheme,
    pub palette: PaletteKind,
    pub overrides: &'static ThemeOverrides,
    pub loaded: bool,
}

// ── Manager ───────────────────────────────────────────────────────────────────

struct ThemeInner {
    window: String,
    config: Arc<ConfigStore>,
    host: Arc<dyn WindowHost>,
    system: Arc<SystemPreference>,
    mode: watch::Sender<ThemeMode>,
    loaded: watch::Sender<bool>,
    /// Last mode handed to the store, whether or not the write succeeded.
    written: watch::Sender<Option<ThemeMode>>,
    load_once: OnceCell<()>,
}

impl ThemeInner {
    fn apply(&self, mode: ThemeMode) {
        self.mode.send_replace(mode);
    }
}

/// Theme state of one window.  Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ThemeManager {
    inner: Arc<ThemeInner>,
}

impl ThemeManager {
    /// Creates the manager for `window` with mode `system` and not loaded.
    pub fn new(
        window: impl Into<String>,
        config: Arc<ConfigStore>,
        host: Arc<dyn WindowHost>,
        system: Arc<SystemPreference>,
    ) -> Self {
        let (mode, _) = watch::channel(ThemeMode::default());
        let (loaded, _) = watch::channel(false);
        let (written, _) = watch::channel(None);
        Self {
            inner: Arc::new(ThemeInner {
                window: window.into(),
                config,
                host,
                system,
                mode,
                loaded,
                written,
                load_once: OnceCell::new(),
            }),
        }
    }

    pub fn window(&self) -> &str {
        &self.inner.window
    }

    /// Reads the persisted mode and starts writing changes through.
    ///
    /// Runs at most once; later calls return immediately.  A failed read
    /// keeps the current mode and still marks the manager loaded.
    pub async fn load(&self) {
        self.inner
            .load_once
            .get_or_init(|| async {
                match self.inner.config.theme().await {
                    Ok(mode) => {
                        debug!("window {} loaded theme {mode}", self.inner.window);
                        self.inner.apply(mode);
                    }
                    Err(e) => error!("failed to load theme for window {}: {e}", self.inner.window),
                }
                self.inner.written.send_replace(Some(self.mode()));
                self.inner.loaded.send_replace(true);
                spawn_persister(self.inner.mode.subscribe(), Arc::downgrade(&self.inner));
            })
            .await;
    }

    pub fn is_loaded(&self) -> bool {
        *self.inner.loaded.borrow()
    }

    pub fn mode(&self) -> ThemeMode {
        *self.inner.mode.borrow()
    }

    pub fn is_dark(&self) -> bool {
        self.mode().is_dark(self.inner.system.prefers_dark())
    }

    pub fn base_theme(&self) -> BaseTheme {
        self.mode().base_theme(self.inner.system.prefers_dark())
    }

    pub fn palette(&self) -> &'static ThemeOverrides {
        self.mode().palette(self.inner.system.prefers_dark())
    }

    pub fn snapshot(&self) -> ThemeSnapshot {
        let mode = self.mode();
        let prefers_dark = self.inner.system.prefers_dark();
        ThemeSnapshot {
            mode,
            is_dark: mode.is_dark(prefers_dark),
            base_theme: mode.base_theme(prefers_dark),
            palette: mode.palette_kind(prefers_dark),
            overrides: mode.palette(prefers_dark),
            loaded: self.is_loaded(),
        }
    }

    /// Waits until the current mode has been handed to the store.
    ///
    /// Returns at once when the manager is not loaded, since nothing is
    /// written before then.  The mode is re-read on every write, so a change
    /// arriving while waiting moves the target instead of stranding it.
    pub async fn flush(&self) {
        if !self.is_loaded() {
            return;
        }
        let inner = &self.inner;
        let mut written = inner.written.subscribe();
        // The sender lives as long as `self`.
        let _ = written
            .wait_for(|mode| *mode == Some(*inner.mode.borrow()))
            .await;
    }

    /// Observes every mode change of this window.
    pub fn subscribe(&self) -> watch::Receiver<ThemeMode> {
        self.inner.mode.subscribe()
    }

    /// Switches this window to `mode` and tells every other window.
    ///
    /// The local change is applied before any notification and is kept
    /// whatever the broadcast outcome.
    pub async fn change_theme(&self, mode: ThemeMode) -> BroadcastReport {
        self.inner.apply(mode);
        info!("window {} switched theme to {mode}", self.inner.window);
        broadcast_theme(self.inner.host.as_ref(), mode).await
    }

    /// Starts applying `theme-changed` events sent to this window.
    ///
    /// A failed subscription is logged and yields a detached listener.
    pub async fn attach(&self) -> ThemeListener {
        let events = match self
            .inner
            .host
            .listen(&self.inner.window, THEME_CHANGED_EVENT)
            .await
        {
            Ok(events) => events,
            Err(e) => {
                error!(
                    "failed to listen for theme changes on window {}: {e}",
                    self.inner.window
                );
                return ThemeListener { task: None };
            }
        };

        let task = tokio::spawn(apply_remote_changes(events, Arc::downgrade(&self.inner)));
        ThemeListener { task: Some(task) }
    }
}

async fn apply_remote_changes(mut events: EventReceiver, manager: Weak<ThemeInner>) {
    while let Some(payload) = events.recv().await {
        let Some(state) = manager.upgrade() else {
            break;
        };
        match serde_json::from_value::<ThemeMode>(payload) {
            Ok(mode) => {
                debug!("window {} received theme {mode}", state.window);
                state.apply(mode);
            }
            Err(e) => warn!("ignoring malformed theme-changed payload: {e}"),
        }
    }
}

fn spawn_persister(mut modes: watch::Receiver<ThemeMode>, manager: Weak<ThemeInner>) {
    tokio::spawn(async move {
        // Ends when the owning manager is dropped.
        while modes.changed().await.is_ok() {
            let mode = *modes.borrow_and_update();
            let Some(state) = manager.upgrade() else {
                break;
            };
            if let Err(e) = state.config.set_theme(mode).await {
                error!("failed to save theme {mode}: {e}");
            }
            state.written.send_replace(Some(mode));
        }
    });
}

/// Subscription created by [`ThemeManager::attach`].
///
/// Dropping the listener detaches it.
pub struct ThemeListener {
    task: Option<JoinHandle<()>>,
}

impl ThemeListener {
    /// Stops receiving theme changes.  Safe to call more than once.
    pub fn detach(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_attached(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for ThemeListener {
    fn drop(&mut self) {
        self.detach();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

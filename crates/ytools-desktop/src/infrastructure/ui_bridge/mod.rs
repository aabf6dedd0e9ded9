//! Command bridge: exposes application-layer operations to the webview UI.
//!
//! Every command function here takes the shared [`AppState`] and delegates to
//! the application layer.  The webview shell is the only consumer of this
//! module; it must NOT be imported by the application or domain layers.
//!
//! # How commands reach Rust (for beginners)
//!
//! The frontend calls a command by name:
//!
//! ```js
//! const result = await invoke("change_theme", { window: "main", mode: "dark" });
//! ```
//!
//! The shell routes `"change_theme"` to [`change_theme`], hands it the
//! `AppState`, and serialises the return value to JSON for the frontend.
//!
//! # `CommandResult<T>` wrapper
//!
//! All commands return `CommandResult<T>` rather than `Result<T, E>`.  This
//! ensures every command response has the same shape:
//! `{ success: bool, data: T | null, error: string | null }`.
//! The frontend can always safely read `result.success` without a try/catch
//! around the `invoke` call.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use ytools_core::{resolve_location, AppConfig, ThemeMode, View};

use crate::application::context::AppContext;
use crate::application::theme::{BroadcastReport, ThemeListener, ThemeManager, ThemeSnapshot};

// ── Shared application state ──────────────────────────────────────────────────

struct MountedWindow {
    theme: ThemeManager,
    // Held for its Drop: unmounting detaches the listener.
    _listener: ThemeListener,
}

/// State shared between commands.
///
/// The window map is behind an async Tokio mutex because commands run
/// concurrently on the async runtime.
pub struct AppState {
    pub context: AppContext,
    windows: Mutex<BTreeMap<String, MountedWindow>>,
}

impl AppState {
    pub fn new(context: AppContext) -> Arc<Self> {
        Arc::new(Self {
            context,
            windows: Mutex::new(BTreeMap::new()),
        })
    }

    /// Sets up theme state for window `label`: load, then listen.
    ///
    /// Mounting an already mounted window returns its existing manager.
    pub async fn mount_window(&self, label: &str) -> ThemeManager {
        let mut windows = self.windows.lock().await;
        if let Some(mounted) = windows.get(label) {
            return mounted.theme.clone();
        }

        let theme = self.context.theme_manager(label);
        theme.load().await;
        let listener = theme.attach().await;
        windows.insert(
            label.to_string(),
            MountedWindow {
                theme: theme.clone(),
                _listener: listener,
            },
        );
        info!("window {label} mounted with theme {}", theme.mode());
        theme
    }

    /// Tears down window `label`.  Unknown labels are ignored.
    pub async fn unmount_window(&self, label: &str) {
        if self.windows.lock().await.remove(label).is_some() {
            info!("window {label} unmounted");
        }
    }

    /// Waits until every mounted window's theme has reached the store.
    pub async fn flush_themes(&self) {
        let themes: Vec<ThemeManager> = self
            .windows
            .lock()
            .await
            .values()
            .map(|mounted| mounted.theme.clone())
            .collect();
        for theme in themes {
            theme.flush().await;
        }
    }

    async fn theme(&self, label: &str) -> Option<ThemeManager> {
        self.windows
            .lock()
            .await
            .get(label)
            .map(|mounted| mounted.theme.clone())
    }
}

/// Unified response wrapper used by commands.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResult<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

impl<T: Serialize, E: std::fmt::Display> From<Result<T, E>> for CommandResult<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(e.to_string()),
        }
    }
}

// ── Settings commands ─────────────────────────────────────────────────────────

/// Returns every setting, defaults filled in.
///
/// # Example (frontend)
/// ```ts
/// const config = await invoke<AppConfig>('get_config');
/// ```
pub async fn get_config(state: Arc<AppState>) -> CommandResult<AppConfig> {
    state.context.config.config().await.into()
}

pub async fn update_font_size(state: Arc<AppState>, size: u32) -> CommandResult<()> {
    if size == 0 {
        return CommandResult::err("font size must be positive");
    }
    state.context.config.set_font_size(size).await.into()
}

pub async fn update_font_family(state: Arc<AppState>, family: String) -> CommandResult<()> {
    state.context.config.set_font_family(&family).await.into()
}

pub async fn update_line_height(state: Arc<AppState>, height: f64) -> CommandResult<()> {
    if !height.is_finite() || height <= 0.0 {
        return CommandResult::err(format!("invalid line height: {height}"));
    }
    state.context.config.set_line_height(height).await.into()
}

pub async fn update_auto_start(state: Arc<AppState>, enabled: bool) -> CommandResult<()> {
    state.context.config.set_auto_start(enabled).await.into()
}

pub async fn add_search_directory(state: Arc<AppState>, directory: String) -> CommandResult<()> {
    state.context.config.add_search_directory(&directory).await.into()
}

pub async fn remove_search_directory(state: Arc<AppState>, directory: String) -> CommandResult<()> {
    state
        .context
        .config
        .remove_search_directory(&directory)
        .await
        .into()
}

pub async fn add_note(state: Arc<AppState>, path: String) -> CommandResult<()> {
    state.context.config.add_note(&path).await.into()
}

pub async fn remove_note(state: Arc<AppState>, path: String) -> CommandResult<()> {
    state.context.config.remove_note(&path).await.into()
}

/// Restores every setting to its default and returns the result.
pub async fn reset_config(state: Arc<AppState>) -> CommandResult<AppConfig> {
    if let Err(e) = state.context.config.reset().await {
        return CommandResult::err(format!("failed to reset settings: {e}"));
    }
    get_config(state).await
}

// ── Theme commands ────────────────────────────────────────────────────────────

/// Current theme of window `window`.
pub async fn get_theme(state: Arc<AppState>, window: String) -> CommandResult<ThemeSnapshot> {
    match state.theme(&window).await {
        Some(theme) => CommandResult::ok(theme.snapshot()),
        None => CommandResult::err(format!("window {window:?} is not mounted")),
    }
}

/// Switches window `window` to `mode` and broadcasts the change.
///
/// Succeeds once the local change is applied, even if some windows could not
/// be notified; the report lists them.
pub async fn change_theme(
    state: Arc<AppState>,
    window: String,
    mode: String,
) -> CommandResult<BroadcastReport> {
    let mode: ThemeMode = match mode.parse() {
        Ok(mode) => mode,
        Err(e) => return CommandResult::err(format!("{e}")),
    };
    match state.theme(&window).await {
        Some(theme) => CommandResult::ok(theme.change_theme(mode).await),
        None => CommandResult::err(format!("window {window:?} is not mounted")),
    }
}

// ── Routing ───────────────────────────────────────────────────────────────────

/// Resolves the view for a window location such as `index.html#/search`.
pub async fn resolve_route(location: String) -> CommandResult<View> {
    match resolve_location(&location) {
        Some(view) => CommandResult::ok(view),
        None => CommandResult::err(format!("no view for {location:?}")),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Process-wide application context.
//!
//! Built once at start-up and shared by every window: one config store, one
//! window host, one system-preference listener, and the dialog helpers.
//! Per-window state (the theme manager) is created from it on demand.

use std::sync::Arc;

use super::config_store::ConfigStore;
use super::dialogs::{DialogSurface, Dialogs};
use super::system_preference::{ColorSchemeSource, SystemPreference};
use super::theme::ThemeManager;
use super::window_host::WindowHost;

pub struct AppContext {
    pub config: Arc<ConfigStore>,
    pub host: Arc<dyn WindowHost>,
    pub system: Arc<SystemPreference>,
    pub dialogs: Dialogs,
    /// Held so the source's change channel outlives the listener.
    color_scheme: Arc<dyn ColorSchemeSource>,
}

impl AppContext {
    /// Wires the context and installs the system-preference listener.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        config: Arc<ConfigStore>,
        host: Arc<dyn WindowHost>,
        color_scheme: Arc<dyn ColorSchemeSource>,
        dialogs: Arc<dyn DialogSurface>,
    ) -> Self {
        Self {
            config,
            host,
            system: Arc::new(SystemPreference::install(color_scheme.as_ref())),
            dialogs: Dialogs::new(dialogs),
            color_scheme,
        }
    }

    /// Creates the theme manager for window `label`.
    pub fn theme_manager(&self, label: &str) -> ThemeManager {
        ThemeManager::new(
            label,
            Arc::clone(&self.config),
            Arc::clone(&self.host),
            Arc::clone(&self.system),
        )
    }

    /// The host colour-scheme source the system preference follows.
    pub fn color_scheme(&self) -> &dyn ColorSchemeSource {
        self.color_scheme.as_ref()
    }
}

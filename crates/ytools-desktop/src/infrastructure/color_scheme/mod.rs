//! Host colour-scheme sources.
//!
//! The webview shell reports `prefers-color-scheme` changes; headless runs
//! have no such signal, so [`ManualColorScheme`] holds a value that is set
//! explicitly (from the environment at start-up, or by tests).

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::broadcast;

use crate::application::system_preference::ColorSchemeSource;

/// Environment variable overriding the detected preference (`dark`/`light`).
pub const COLOR_SCHEME_ENV: &str = "YTOOLS_COLOR_SCHEME";

/// Colour-scheme source whose value is set by hand.
pub struct ManualColorScheme {
    prefers_dark: AtomicBool,
    changes: broadcast::Sender<bool>,
}

impl ManualColorScheme {
    pub fn new(prefers_dark: bool) -> Self {
        let (changes, _) = broadcast::channel(8);
        Self {
            prefers_dark: AtomicBool::new(prefers_dark),
            changes,
        }
    }

    /// Source initialised from the environment.
    pub fn from_env() -> Self {
        Self::new(detect_prefers_dark(
            std::env::var(COLOR_SCHEME_ENV).ok().as_deref(),
            std::env::var("GTK_THEME").ok().as_deref(),
        ))
    }

    /// Updates the preference and notifies subscribers if it changed.
    pub fn set(&self, prefers_dark: bool) {
        if self.prefers_dark.swap(prefers_dark, Ordering::AcqRel) != prefers_dark {
            let _ = self.changes.send(prefers_dark);
        }
    }
}

impl ColorSchemeSource for ManualColorScheme {
    fn prefers_dark(&self) -> bool {
        self.prefers_dark.load(Ordering::Acquire)
    }

    fn subscribe(&self) -> broadcast::Receiver<bool> {
        self.changes.subscribe()
    }
}

/// An explicit `YTOOLS_COLOR_SCHEME` wins; otherwise a GTK theme variant
/// ending in `:dark` or `-dark` counts as dark.
fn detect_prefers_dark(explicit: Option<&str>, gtk_theme: Option<&str>) -> bool {
    match explicit.map(str::trim) {
        Some(value) if value.eq_ignore_ascii_case("dark") => return true,
        Some(value) if value.eq_ignore_ascii_case("light") => return false,
        _ => {}
    }
    gtk_theme.is_some_and(|theme| {
        let theme = theme.to_ascii_lowercase();
        theme.ends_with(":dark") || theme.ends_with("-dark")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_setting_wins_over_gtk_theme() {
        assert!(!detect_prefers_dark(Some("light"), Some("Adwaita:dark")));
        assert!(detect_prefers_dark(Some("DARK"), None));
    }

    #[test]
    fn test_gtk_dark_variant_is_detected() {
        assert!(detect_prefers_dark(None, Some("Adwaita:dark")));
        assert!(detect_prefers_dark(None, Some("Arc-Dark")));
        assert!(!detect_prefers_dark(None, Some("Adwaita")));
        assert!(!detect_prefers_dark(None, None));
    }

    #[test]
    fn test_set_notifies_only_on_change() {
        // Arrange
        let source = ManualColorScheme::new(false);
        let mut changes = source.subscribe();

        // Act
        source.set(false);
        source.set(true);

        // Assert
        assert!(changes.try_recv().unwrap());
        assert!(changes.try_recv().is_err());
        assert!(source.prefers_dark());
    }
}

//! The persisted settings record and its storage keys.
//!
//! The settings store is a flat JSON object.  Every field of [`AppConfig`]
//! lives under its own camelCase key so that individual settings can be read
//! and written without touching the rest of the document:
//!
//! ```json
//! {
//!   "fontSize": 16,
//!   "fontFamily": "Consolas, 'Courier New', monospace",
//!   "lineHeight": 1.6,
//!   "autoStart": false,
//!   "searchDirectories": [],
//!   "defaultNotesLocation": "/home/me/.config/com.ytools.app/.ytools",
//!   "notes": [],
//!   "theme": "system",
//!   "_migrated": true
//! }
//! ```
//!
//! # Defaults
//!
//! Every field has a default that is used whenever the key is absent.  The
//! `#[serde(default = "...")]` attributes below apply the same defaults when a
//! whole record is deserialised, so a partially populated document still
//! produces a fully populated [`AppConfig`].

use serde::{Deserialize, Serialize};

use super::theme::ThemeMode;

// ── Storage keys ──────────────────────────────────────────────────────────────

/// Key of [`AppConfig::font_size`].
pub const KEY_FONT_SIZE: &str = "fontSize";
/// Key of [`AppConfig::font_family`].
pub const KEY_FONT_FAMILY: &str = "fontFamily";
/// Key of [`AppConfig::line_height`].
pub const KEY_LINE_HEIGHT: &str = "lineHeight";
/// Key of [`AppConfig::auto_start`].
pub const KEY_AUTO_START: &str = "autoStart";
/// Key of [`AppConfig::search_directories`].
pub const KEY_SEARCH_DIRECTORIES: &str = "searchDirectories";
/// Key of [`AppConfig::default_notes_location`].
pub const KEY_DEFAULT_NOTES_LOCATION: &str = "defaultNotesLocation";
/// Key of [`AppConfig::notes`].
pub const KEY_NOTES: &str = "notes";
/// Key of [`AppConfig::theme`].
pub const KEY_THEME: &str = "theme";
/// Reserved key holding the "legacy migration already attempted" flag.
pub const KEY_MIGRATED: &str = "_migrated";

/// Every key owned by [`AppConfig`], in declaration order.
pub const CONFIG_KEYS: [&str; 8] = [
    KEY_FONT_SIZE,
    KEY_FONT_FAMILY,
    KEY_LINE_HEIGHT,
    KEY_AUTO_START,
    KEY_SEARCH_DIRECTORIES,
    KEY_DEFAULT_NOTES_LOCATION,
    KEY_NOTES,
    KEY_THEME,
];

// ── Default values ────────────────────────────────────────────────────────────

pub const DEFAULT_FONT_SIZE: u32 = 16;
pub const DEFAULT_FONT_FAMILY: &str = "Consolas, 'Courier New', monospace";
pub const DEFAULT_LINE_HEIGHT: f64 = 1.6;
pub const DEFAULT_AUTO_START: bool = false;

fn default_font_size() -> u32 {
    DEFAULT_FONT_SIZE
}
fn default_font_family() -> String {
    DEFAULT_FONT_FAMILY.to_string()
}
fn default_line_height() -> f64 {
    DEFAULT_LINE_HEIGHT
}

// ── Config schema ─────────────────────────────────────────────────────────────

/// User settings shared by every window of the application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Editor font size in pixels.
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    /// CSS font-family list used by the editor.
    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// Editor line height multiplier.
    #[serde(default = "default_line_height")]
    pub line_height: f64,
    /// Whether the application registers itself to start on login.
    #[serde(default)]
    pub auto_start: bool,
    /// Directories scanned by workspace search, in user order.
    #[serde(default)]
    pub search_directories: Vec<String>,
    /// Folder new notes are created in.  Empty until the store has been
    /// initialised for the first time.
    #[serde(default)]
    pub default_notes_location: String,
    /// Absolute paths of every known note, in user order.
    #[serde(default)]
    pub notes: Vec<String>,
    /// Selected theme mode.
    #[serde(default)]
    pub theme: ThemeMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            font_size: default_font_size(),
            font_family: default_font_family(),
            line_height: default_line_height(),
            auto_start: DEFAULT_AUTO_START,
            search_directories: Vec::new(),
            default_notes_location: String::new(),
            notes: Vec::new(),
            theme: ThemeMode::default(),
        }
    }
}

/// Settings file written by releases that predate the key-value store.
///
/// Only the fields that are carried forward are modelled; anything else in
/// the file is ignored.  Old releases wrote the font size as any JSON number,
/// so it is read as `f64`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct LegacyConfig {
    #[serde(default)]
    pub font_size: Option<f64>,
}

impl LegacyConfig {
    /// Font size worth carrying forward, rounded to whole points.
    ///
    /// Zero, negative and non-finite sizes are treated as unset.
    pub fn migratable_font_size(&self) -> Option<u32> {
        let size = self.font_size.filter(|size| size.is_finite())?.round();
        if size < 1.0 {
            return None;
        }
        // `as` saturates at u32::MAX.
        Some(size as u32)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

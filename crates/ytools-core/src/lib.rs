//! # ytools-core
//!
//! Shared domain library for the YTools note/search utility.
//!
//! It defines what the settings layer is made of, with zero dependencies on
//! OS APIs, the webview host, or an async runtime:
//!
//! - **`domain::config`** – the [`AppConfig`] settings record, its flat
//!   storage keys, defaults, and the shape of the legacy settings file.
//!
//! - **`domain::theme`** – [`ThemeMode`] and the pure derivation from a mode
//!   (plus the host's light/dark preference) to a base theme and a static
//!   palette of UI overrides.
//!
//! - **`domain::routes`** – the hash-history route table mapping URL
//!   fragments to [`View`]s.
//!
//! - **`domain::dialog`** – message and prompt vocabulary used by the dialog
//!   helpers.

pub mod domain;

pub use domain::config::{AppConfig, LegacyConfig};
pub use domain::dialog::{MessageKind, PromptKind, PromptRequest, PromptResponse};
pub use domain::routes::{resolve, resolve_location, Route, View, ROUTES};
pub use domain::theme::{
    BaseTheme, ParseThemeModeError, PaletteKind, ThemeMode, ThemeOverrides, THEME_CHANGED_EVENT,
};

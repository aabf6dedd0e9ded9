//! Domain entities for YTools.
//!
//! Pure data and rules with no infrastructure dependencies: nothing in here
//! touches the file system, the async runtime, or the webview host, so every
//! module can be tested in isolation on any platform.

/// Persisted settings record and its storage keys.
pub mod config;

/// Dialog kinds, titles, and prompt responses.
pub mod dialog;

/// Hash-history view routes.
pub mod routes;

/// Theme modes, effective darkness, and palette tables.
pub mod theme;

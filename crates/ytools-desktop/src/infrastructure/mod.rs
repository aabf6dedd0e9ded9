//! Infrastructure layer for the desktop shell.
//!
//! Contains the adapters behind the application-layer traits: the JSON
//! settings file, the legacy settings reader, the in-process window bus, the
//! colour-scheme source, dialog surfaces, and the UI command bridge.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `ytools_core`, but MUST NOT be imported by the `application` or domain
//! layers.

pub mod color_scheme;
pub mod dialog;
pub mod storage;
pub mod ui_bridge;
pub mod window_bus;

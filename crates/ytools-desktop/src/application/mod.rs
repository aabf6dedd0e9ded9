//! Application layer for the YTools desktop shell.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure data and rules in `ytools-core`) and the infrastructure (files,
//! windows, the terminal).
//!
//! Code in this layer:
//!
//! - **Orchestrates** domain types to fulfil a user goal (e.g., "switch every
//!   open window to the dark theme").
//! - **Depends on abstractions** (traits such as [`config_store::KeyValueStore`]
//!   and [`window_host::WindowHost`]) rather than concrete implementations, so
//!   the infrastructure can be swapped without changing this code.
//! - **Performs no file system access and talks to no real windows**.
//!
//! # Sub-modules
//!
//! - **`config_store`** – lazily opened, typed settings store with defaults.
//! - **`migrate`** – one-time import of the legacy settings file.
//! - **`theme`** – per-window theme state and cross-window broadcast.
//! - **`system_preference`** – shared "prefers dark" flag with one listener.
//! - **`window_host`** – the window enumeration and event bus seam.
//! - **`dialogs`** – message and prompt helpers.
//! - **`context`** – the process-wide wiring of all of the above.

pub mod config_store;
pub mod context;
pub mod dialogs;
pub mod migrate;
pub mod system_preference;
pub mod theme;
pub mod window_host;

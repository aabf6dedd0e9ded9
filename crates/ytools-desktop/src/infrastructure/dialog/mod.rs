//! Dialog surfaces.
//!
//! - [`console::ConsoleDialogSurface`] – terminal rendering for headless runs.
//! - [`mock::ScriptedDialogSurface`] – records messages and replays scripted
//!   prompt answers; used by integration tests.

pub mod console;
pub mod mock;

//! YTools settings runner: entry point.
//!
//! Wires the settings store, the in-process window bus, and the dialog
//! surface together and runs one settings command headless.  The webview
//! shell links the same library and calls the `ui_bridge` commands instead.
//!
//! # Usage
//!
//! ```text
//! ytools [OPTIONS] <COMMAND>
//!
//! Commands:
//!   show                 Print every setting as JSON
//!   theme                Print the theme snapshot of each window
//!   set-theme <MODE>     Switch all windows to light|dark|system|cyberpunk
//!   set-font-size <PX>   Change the editor font size
//!   add-note <PATH>      Remember a note file
//!   remove-note <PATH>   Forget a note file
//!   reset                Restore defaults (asks for confirmation)
//!   route <LOCATION>     Print the view a window location resolves to
//!
//! Options:
//!   --config-dir <DIR>   Settings directory [env: YTOOLS_CONFIG_DIR]
//!   --window <LABEL>     Open window label, repeatable [default: main]
//!   --yes                Skip the reset confirmation
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ytools_desktop::application::config_store::ConfigStore;
use ytools_desktop::application::context::AppContext;
use ytools_desktop::application::migrate::{LegacyConfigSource, NoLegacyConfig};
use ytools_desktop::infrastructure::color_scheme::ManualColorScheme;
use ytools_desktop::infrastructure::dialog::console::ConsoleDialogSurface;
use ytools_desktop::infrastructure::storage::json_store::JsonStoreOpener;
use ytools_desktop::infrastructure::storage::legacy::LegacyConfigFile;
use ytools_desktop::infrastructure::storage::paths::StorePaths;
use ytools_desktop::infrastructure::ui_bridge::{self, AppState, CommandResult};
use ytools_desktop::infrastructure::window_bus::InProcessWindowHost;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// YTools settings and theme runner.
#[derive(Debug, Parser)]
#[command(name = "ytools", about = "Inspect and change YTools settings", version)]
struct Cli {
    /// Settings directory.  Defaults to the platform config directory.
    #[arg(long, env = "YTOOLS_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Labels of the open windows.  The first one issues commands.
    #[arg(long = "window", default_value = "main")]
    windows: Vec<String>,

    /// Answer the reset confirmation with OK.
    #[arg(long)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every setting as JSON.
    Show,
    /// Print the theme snapshot of each window.
    Theme,
    /// Switch every window to MODE.
    SetTheme { mode: String },
    /// Change the editor font size.
    SetFontSize { size: u32 },
    /// Remember a note file.
    AddNote { path: String },
    /// Forget a note file.
    RemoveNote { path: String },
    /// Restore every setting to its default.
    Reset,
    /// Print the view LOCATION resolves to.
    Route { location: String },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_result<T: Serialize>(result: CommandResult<T>) -> anyhow::Result<()> {
    print_json(&result)?;
    if result.success {
        Ok(())
    } else {
        anyhow::bail!(result.error.unwrap_or_default())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging.  Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // ── Wiring ────────────────────────────────────────────────────────────────
    let paths = match &cli.config_dir {
        Some(dir) => StorePaths::new(dir, dirs::home_dir().as_deref()),
        None => StorePaths::platform().context("failed to locate settings directory")?,
    };
    info!("using settings store {}", paths.store_file.display());

    let legacy: Arc<dyn LegacyConfigSource> = match &paths.legacy_file {
        Some(path) => Arc::new(LegacyConfigFile::new(path)),
        None => Arc::new(NoLegacyConfig),
    };
    let config = Arc::new(ConfigStore::new(
        Arc::new(JsonStoreOpener::new(&paths.store_file)),
        legacy,
        paths.default_notes_location.to_string_lossy(),
    ));
    config.init().await;

    let host = Arc::new(InProcessWindowHost::with_windows(cli.windows.iter().cloned()));
    let context = AppContext::new(
        Arc::clone(&config),
        host,
        Arc::new(ManualColorScheme::from_env()),
        Arc::new(ConsoleDialogSurface::stdio()),
    );
    let state = AppState::new(context);
    for label in &cli.windows {
        state.mount_window(label).await;
    }
    let active = cli
        .windows
        .first()
        .cloned()
        .unwrap_or_else(|| "main".to_string());

    // ── Command ───────────────────────────────────────────────────────────────
    let outcome = match cli.command {
        Command::Show => print_result(ui_bridge::get_config(Arc::clone(&state)).await),
        Command::Theme => {
            let mut snapshots = Vec::new();
            for label in &cli.windows {
                snapshots.push(ui_bridge::get_theme(Arc::clone(&state), label.clone()).await);
            }
            print_json(&snapshots)
        }
        Command::SetTheme { mode } => {
            print_result(ui_bridge::change_theme(Arc::clone(&state), active, mode).await)
        }
        Command::SetFontSize { size } => {
            print_result(ui_bridge::update_font_size(Arc::clone(&state), size).await)
        }
        Command::AddNote { path } => {
            print_result(ui_bridge::add_note(Arc::clone(&state), path).await)
        }
        Command::RemoveNote { path } => {
            print_result(ui_bridge::remove_note(Arc::clone(&state), path).await)
        }
        Command::Reset => {
            let dialogs = &state.context.dialogs;
            let confirmed = cli.yes
                || dialogs
                    .confirm("Restore every setting to its default?", Some("Reset settings"))
                    .await
                    .context("failed to ask for confirmation")?;
            if confirmed {
                let result = ui_bridge::reset_config(Arc::clone(&state)).await;
                if result.success {
                    dialogs.success("Settings restored to defaults.", None).await?;
                }
                print_result(result)
            } else {
                dialogs.info("Reset cancelled.", None).await?;
                Ok(())
            }
        }
        Command::Route { location } => print_result(ui_bridge::resolve_route(location).await),
    };

    // Persist anything the debounced auto-save has not written yet.
    state.flush_themes().await;
    config
        .flush()
        .await
        .context("failed to save settings")?;
    info!("settings saved");
    outcome
}

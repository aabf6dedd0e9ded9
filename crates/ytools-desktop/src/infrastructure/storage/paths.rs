//! Platform locations of the settings store, the legacy file, and notes.
//!
//! | file                 | Linux                                      |
//! |----------------------|--------------------------------------------|
//! | settings store       | `~/.config/com.ytools.app/config.json`     |
//! | legacy settings      | `~/.ytools/config.json`                    |
//! | default notes folder | `~/.config/com.ytools.app/.ytools`         |
//!
//! On Windows the store lives under `%APPDATA%`, on macOS under
//! `~/Library/Application Support`; both come from [`dirs::config_dir`].

use std::path::{Path, PathBuf};

use crate::application::config_store::StoreError;

/// Application identifier; names the per-user config directory.
pub const APP_IDENTIFIER: &str = "com.ytools.app";

/// File name of the key-value settings store.
pub const STORE_FILE_NAME: &str = "config.json";

/// Folder holding notes by default, and the legacy settings file.
pub const DATA_DIR_NAME: &str = ".ytools";

/// Resolved file locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    pub app_config_dir: PathBuf,
    pub store_file: PathBuf,
    /// `None` when the home directory is unknown.
    pub legacy_file: Option<PathBuf>,
    pub default_notes_location: PathBuf,
}

impl StorePaths {
    /// Locations for the current user.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoPlatformConfigDir`] when the platform config
    /// base directory cannot be determined from the environment.
    pub fn platform() -> Result<Self, StoreError> {
        let base = dirs::config_dir().ok_or(StoreError::NoPlatformConfigDir)?;
        Ok(Self::new(&base.join(APP_IDENTIFIER), dirs::home_dir().as_deref()))
    }

    /// Locations rooted at an explicit config directory.
    pub fn new(app_config_dir: &Path, home_dir: Option<&Path>) -> Self {
        Self {
            app_config_dir: app_config_dir.to_path_buf(),
            store_file: app_config_dir.join(STORE_FILE_NAME),
            legacy_file: home_dir.map(|home| home.join(DATA_DIR_NAME).join(STORE_FILE_NAME)),
            default_notes_location: app_config_dir.join(DATA_DIR_NAME),
        }
    }
}

//! One-time import of the legacy settings file.
//!
//! Earlier releases kept settings in `~/.ytools/config.json` with snake_case
//! keys.  On the first open of the current store the legacy `font_size` is
//! copied over and the `_migrated` flag is set.  Once the flag is set the
//! legacy file is never read again.
//!
//! The flag is set even when the legacy file is unreadable or malformed: a
//! broken legacy file would otherwise be retried on every launch.

use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, info, warn};

use ytools_core::domain::config::{KEY_FONT_SIZE, KEY_MIGRATED};
use ytools_core::LegacyConfig;

use super::config_store::{KeyValueStore, StoreError};

/// Error type for reading the legacy settings file.
#[derive(Debug, Error)]
pub enum LegacyConfigError {
    #[error("I/O error reading legacy config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("legacy config at {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Where legacy settings come from.
#[async_trait]
pub trait LegacyConfigSource: Send + Sync {
    /// Returns `Ok(None)` when there is no legacy file.
    async fn load(&self) -> Result<Option<LegacyConfig>, LegacyConfigError>;
}

/// Source used when no legacy location exists (e.g. no home directory).
pub struct NoLegacyConfig;

#[async_trait]
impl LegacyConfigSource for NoLegacyConfig {
    async fn load(&self) -> Result<Option<LegacyConfig>, LegacyConfigError> {
        Ok(None)
    }
}

/// Result of a migration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// The flag was already set; nothing was read.
    AlreadyMigrated,
    /// No legacy file was found.
    NoLegacyFile,
    /// The legacy file was read.  `font_size` is the value copied, if any.
    Migrated { font_size: Option<u32> },
    /// The legacy file or the flag could not be read.
    Skipped,
}

/// Runs the legacy import if it has not run before.
///
/// Never fails: every error is logged and reflected in the outcome.
pub async fn migrate_legacy_config(
    store: &dyn KeyValueStore,
    legacy: &dyn LegacyConfigSource,
) -> MigrationOutcome {
    match store.get(KEY_MIGRATED).await {
        Ok(Some(Value::Bool(true))) => return MigrationOutcome::AlreadyMigrated,
        Ok(_) => {}
        Err(e) => {
            warn!("could not read migration flag, skipping legacy import: {e}");
            return MigrationOutcome::Skipped;
        }
    }

    let outcome = match legacy.load().await {
        Ok(None) => MigrationOutcome::NoLegacyFile,
        Ok(Some(cfg)) => {
            let font_size = cfg.migratable_font_size();
            if let Some(size) = font_size {
                if let Err(e) = store.set(KEY_FONT_SIZE, Value::from(size)).await {
                    error!("failed to copy legacy font size: {e}");
                }
            }
            info!("legacy settings imported");
            MigrationOutcome::Migrated { font_size }
        }
        Err(e) => {
            error!("legacy settings import failed: {e}");
            MigrationOutcome::Skipped
        }
    };

    if let Err(e) = mark_migrated(store).await {
        error!("failed to record legacy migration: {e}");
    }
    outcome
}

async fn mark_migrated(store: &dyn KeyValueStore) -> Result<(), StoreError> {
    store.set(KEY_MIGRATED, Value::Bool(true)).await?;
    store.save().await
}

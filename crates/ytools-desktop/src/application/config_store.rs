//! ConfigStore: typed accessors over the persistent key-value settings store.
//!
//! The backing store is opened lazily on the first accessor call and at most
//! once per `ConfigStore`.  Concurrent first calls converge on the same
//! instance through a [`tokio::sync::OnceCell`]: one caller runs the open,
//! the others await it.
//!
//! Opening the store also prepares it:
//!
//! 1. the legacy settings file is migrated (once, see [`super::migrate`]);
//! 2. an empty `defaultNotesLocation` is filled with the platform default.
//!
//! Failures in either step are logged and do not fail the open.
//!
//! # Reads never return "absent"
//!
//! Every getter falls back to the field's default from
//! [`ytools_core::domain::config`] when the key is missing, `null`, or holds
//! a value of the wrong JSON type.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use ytools_core::domain::config::{
    AppConfig, DEFAULT_AUTO_START, DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, DEFAULT_LINE_HEIGHT,
    KEY_AUTO_START, KEY_DEFAULT_NOTES_LOCATION, KEY_FONT_FAMILY, KEY_FONT_SIZE, KEY_LINE_HEIGHT,
    KEY_MIGRATED, KEY_NOTES, KEY_SEARCH_DIRECTORIES, KEY_THEME,
};
use ytools_core::ThemeMode;

use super::migrate::{migrate_legacy_config, LegacyConfigSource};

/// Error type for settings store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing store at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store file is not valid JSON.
    #[error("store file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The store file is valid JSON but its root is not an object.
    #[error("store file {0} does not contain a JSON object")]
    NotAnObject(PathBuf),

    /// A value could not be serialised.
    #[error("failed to serialize store value: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// A write observed on the store.  `value` is `None` when the key was removed.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyChange {
    pub key: String,
    pub value: Option<Value>,
}

/// Durable JSON key-value store.
///
/// Implementations persist writes on their own (debounced); [`save`] forces
/// an immediate write.
///
/// [`save`]: KeyValueStore::save
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the raw value under `key`, or `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    /// Stores `value` under `key` and schedules persistence.
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
    /// Removes every key and schedules persistence.
    async fn clear(&self) -> Result<(), StoreError>;
    /// Writes the current contents to durable storage now.
    async fn save(&self) -> Result<(), StoreError>;
    /// Subscribes to every subsequent write.
    fn subscribe(&self) -> broadcast::Receiver<KeyChange>;
}

/// Opens the backing store.  Called at most once per [`ConfigStore`].
#[async_trait]
pub trait StoreOpener: Send + Sync {
    async fn open(&self) -> Result<Arc<dyn KeyValueStore>, StoreError>;
}

/// Typed view of the settings store.
pub struct ConfigStore {
    opener: Arc<dyn StoreOpener>,
    legacy: Arc<dyn LegacyConfigSource>,
    default_notes_location: String,
    store: OnceCell<Arc<dyn KeyValueStore>>,
}

impl ConfigStore {
    /// Creates a config store.  Nothing is opened until first use.
    ///
    /// `default_notes_location` is written to `defaultNotesLocation` when the
    /// store is first opened with that field empty.
    pub fn new(
        opener: Arc<dyn StoreOpener>,
        legacy: Arc<dyn LegacyConfigSource>,
        default_notes_location: impl Into<String>,
    ) -> Self {
        Self {
            opener,
            legacy,
            default_notes_location: default_notes_location.into(),
            store: OnceCell::new(),
        }
    }

    /// Opens and prepares the store eagerly.
    ///
    /// Failures are logged, not returned; later accessor calls retry the open.
    pub async fn init(&self) {
        if let Err(e) = self.handle().await {
            error!("failed to initialize config store: {e}");
        }
    }

    /// Forces pending writes to disk.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be opened or written.
    pub async fn flush(&self) -> Result<(), StoreError> {
        self.handle().await?.save().await
    }

    async fn handle(&self) -> Result<&Arc<dyn KeyValueStore>, StoreError> {
        self.store
            .get_or_try_init(|| async {
                let store = self.opener.open().await?;
                self.prepare(store.as_ref()).await;
                Ok(store)
            })
            .await
    }

    async fn prepare(&self, store: &dyn KeyValueStore) {
        migrate_legacy_config(store, self.legacy.as_ref()).await;

        if let Err(e) = self.ensure_notes_location(store).await {
            error!("failed to set default notes location: {e}");
        }
    }

    async fn ensure_notes_location(&self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        let current = store.get(KEY_DEFAULT_NOTES_LOCATION).await?;
        let is_empty = current
            .as_ref()
            .and_then(Value::as_str)
            .map_or(true, str::is_empty);
        if !is_empty || self.default_notes_location.is_empty() {
            return Ok(());
        }

        store
            .set(
                KEY_DEFAULT_NOTES_LOCATION,
                Value::String(self.default_notes_location.clone()),
            )
            .await?;
        store.save().await?;
        info!("default notes location set to {}", self.default_notes_location);
        Ok(())
    }

    async fn read<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T, StoreError> {
        let store = self.handle().await?;
        match store.get(key).await? {
            None | Some(Value::Null) => Ok(default),
            Some(value) => match serde_json::from_value(value) {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!("ignoring malformed value for {key}: {e}");
                    Ok(default)
                }
            },
        }
    }

    async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let store = self.handle().await?;
        let value = serde_json::to_value(value).map_err(StoreError::Serialize)?;
        store.set(key, value).await
    }

    // ── Typed accessors ───────────────────────────────────────────────────────

    pub async fn font_size(&self) -> Result<u32, StoreError> {
        self.read(KEY_FONT_SIZE, DEFAULT_FONT_SIZE).await
    }

    pub async fn set_font_size(&self, size: u32) -> Result<(), StoreError> {
        self.write(KEY_FONT_SIZE, &size).await
    }

    pub async fn font_family(&self) -> Result<String, StoreError> {
        self.read(KEY_FONT_FAMILY, DEFAULT_FONT_FAMILY.to_string())
            .await
    }

    pub async fn set_font_family(&self, family: &str) -> Result<(), StoreError> {
        self.write(KEY_FONT_FAMILY, family).await
    }

    pub async fn line_height(&self) -> Result<f64, StoreError> {
        self.read(KEY_LINE_HEIGHT, DEFAULT_LINE_HEIGHT).await
    }

    pub async fn set_line_height(&self, height: f64) -> Result<(), StoreError> {
        self.write(KEY_LINE_HEIGHT, &height).await
    }

    pub async fn auto_start(&self) -> Result<bool, StoreError> {
        self.read(KEY_AUTO_START, DEFAULT_AUTO_START).await
    }

    pub async fn set_auto_start(&self, enabled: bool) -> Result<(), StoreError> {
        self.write(KEY_AUTO_START, &enabled).await
    }

    pub async fn search_directories(&self) -> Result<Vec<String>, StoreError> {
        self.read(KEY_SEARCH_DIRECTORIES, Vec::new()).await
    }

    pub async fn set_search_directories(&self, directories: &[String]) -> Result<(), StoreError> {
        self.write(KEY_SEARCH_DIRECTORIES, directories).await
    }

    /// Appends `directory` unless it is already listed.
    pub async fn add_search_directory(&self, directory: &str) -> Result<(), StoreError> {
        let mut directories = self.search_directories().await?;
        if !directories.iter().any(|d| d == directory) {
            directories.push(directory.to_string());
            self.set_search_directories(&directories).await?;
        }
        Ok(())
    }

    pub async fn remove_search_directory(&self, directory: &str) -> Result<(), StoreError> {
        let mut directories = self.search_directories().await?;
        directories.retain(|d| d != directory);
        self.set_search_directories(&directories).await
    }

    pub async fn default_notes_location(&self) -> Result<String, StoreError> {
        self.read(KEY_DEFAULT_NOTES_LOCATION, String::new()).await
    }

    pub async fn set_default_notes_location(&self, location: &str) -> Result<(), StoreError> {
        self.write(KEY_DEFAULT_NOTES_LOCATION, location).await
    }

    pub async fn notes(&self) -> Result<Vec<String>, StoreError> {
        self.read(KEY_NOTES, Vec::new()).await
    }

    pub async fn set_notes(&self, notes: &[String]) -> Result<(), StoreError> {
        self.write(KEY_NOTES, notes).await
    }

    /// Appends `path` unless it is already listed.
    pub async fn add_note(&self, path: &str) -> Result<(), StoreError> {
        let mut notes = self.notes().await?;
        if !notes.iter().any(|n| n == path) {
            notes.push(path.to_string());
            self.set_notes(&notes).await?;
        }
        Ok(())
    }

    pub async fn remove_note(&self, path: &str) -> Result<(), StoreError> {
        let mut notes = self.notes().await?;
        notes.retain(|n| n != path);
        self.set_notes(&notes).await
    }

    /// Persisted theme mode.  An unknown mode name reads as the default.
    pub async fn theme(&self) -> Result<ThemeMode, StoreError> {
        self.read(KEY_THEME, ThemeMode::default()).await
    }

    pub async fn set_theme(&self, mode: ThemeMode) -> Result<(), StoreError> {
        self.write(KEY_THEME, &mode).await
    }

    /// Whether the one-time legacy migration has been attempted.
    pub async fn is_migrated(&self) -> Result<bool, StoreError> {
        self.read(KEY_MIGRATED, false).await
    }

    // ── Aggregate operations ──────────────────────────────────────────────────

    /// Reads every field concurrently into a fully populated record.
    pub async fn config(&self) -> Result<AppConfig, StoreError> {
        let (
            font_size,
            font_family,
            line_height,
            auto_start,
            search_directories,
            default_notes_location,
            notes,
            theme,
        ) = tokio::try_join!(
            self.font_size(),
            self.font_family(),
            self.line_height(),
            self.auto_start(),
            self.search_directories(),
            self.default_notes_location(),
            self.notes(),
            self.theme(),
        )?;

        Ok(AppConfig {
            font_size,
            font_family,
            line_height,
            auto_start,
            search_directories,
            default_notes_location,
            notes,
            theme,
        })
    }

    /// Clears the store and writes every default back.
    ///
    /// The migration flag stays set so the legacy file is not imported again.
    pub async fn reset(&self) -> Result<(), StoreError> {
        let store = self.handle().await?;
        store.clear().await?;

        let defaults = serde_json::to_value(AppConfig::default()).map_err(StoreError::Serialize)?;
        if let Value::Object(fields) = defaults {
            for (key, value) in fields {
                store.set(&key, value).await?;
            }
        }
        store.set(KEY_MIGRATED, Value::Bool(true)).await?;
        store.save().await?;
        info!("settings reset to defaults");
        Ok(())
    }

    /// Calls `callback` with every font size subsequently written to the store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be opened.
    pub async fn watch_font_size<F>(&self, callback: F) -> Result<KeyWatch, StoreError>
    where
        F: Fn(u32) + Send + 'static,
    {
        let mut changes = self.handle().await?.subscribe();
        let task = tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(change) if change.key == KEY_FONT_SIZE => {
                        if let Some(size) = change
                            .value
                            .and_then(|value| serde_json::from_value::<u32>(value).ok())
                        {
                            callback(size);
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("font size watcher skipped {skipped} store changes");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        Ok(KeyWatch { task: Some(task) })
    }
}

/// Handle returned by [`ConfigStore::watch_font_size`].
///
/// Dropping the handle stops the watcher.
pub struct KeyWatch {
    task: Option<JoinHandle<()>>,
}

impl KeyWatch {
    /// Stops the watcher.  Safe to call more than once.
    pub fn unlisten(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_listening(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for KeyWatch {
    fn drop(&mut self) {
        self.unlisten();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::application::migrate::{LegacyConfigError, NoLegacyConfig};
    use ytools_core::LegacyConfig;

    // ── Test doubles ──────────────────────────────────────────────────────────

    /// In-memory store that counts how often it was opened.
    struct MemoryStore {
        entries: Mutex<BTreeMap<String, Value>>,
        changes: broadcast::Sender<KeyChange>,
        saves: AtomicUsize,
    }

    impl MemoryStore {
        fn with(entries: &[(&str, Value)]) -> Arc<Self> {
            let (changes, _) = broadcast::channel(16);
            Arc::new(Self {
                entries: Mutex::new(
                    entries
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.clone()))
                        .collect(),
                ),
                changes,
                saves: AtomicUsize::new(0),
            })
        }

        fn raw(&self, key: &str) -> Option<Value> {
            self.entries.lock().unwrap().get(key).cloned()
        }
    }

    #[async_trait]
    impl KeyValueStore for MemoryStore {
        async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
            Ok(self.raw(key))
        }

        async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.clone());
            let _ = self.changes.send(KeyChange {
                key: key.to_string(),
                value: Some(value),
            });
            Ok(())
        }

        async fn clear(&self) -> Result<(), StoreError> {
            self.entries.lock().unwrap().clear();
            Ok(())
        }

        async fn save(&self) -> Result<(), StoreError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn subscribe(&self) -> broadcast::Receiver<KeyChange> {
            self.changes.subscribe()
        }
    }

    struct CountingOpener {
        store: Arc<MemoryStore>,
        opens: AtomicUsize,
    }

    #[async_trait]
    impl StoreOpener for CountingOpener {
        async fn open(&self) -> Result<Arc<dyn KeyValueStore>, StoreError> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            // Give concurrent callers a chance to race the open.
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok(self.store.clone())
        }
    }

    struct FailingOpener;

    #[async_trait]
    impl StoreOpener for FailingOpener {
        async fn open(&self) -> Result<Arc<dyn KeyValueStore>, StoreError> {
            Err(StoreError::NoPlatformConfigDir)
        }
    }

    struct FixedLegacy(Option<LegacyConfig>);

    #[async_trait]
    impl LegacyConfigSource for FixedLegacy {
        async fn load(&self) -> Result<Option<LegacyConfig>, LegacyConfigError> {
            Ok(self.0.clone())
        }
    }

    fn make_store(entries: &[(&str, Value)]) -> (ConfigStore, Arc<MemoryStore>, Arc<CountingOpener>) {
        let memory = MemoryStore::with(entries);
        let opener = Arc::new(CountingOpener {
            store: memory.clone(),
            opens: AtomicUsize::new(0),
        });
        let config = ConfigStore::new(opener.clone(), Arc::new(NoLegacyConfig), "/home/me/.ytools");
        (config, memory, opener)
    }

    // ── Defaults ──────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_fresh_store_reads_documented_defaults() {
        // Arrange
        let (config, _, _) = make_store(&[]);

        // Act
        let cfg = config.config().await.expect("config");

        // Assert
        assert_eq!(cfg.font_size, 16);
        assert_eq!(cfg.font_family, DEFAULT_FONT_FAMILY);
        assert!((cfg.line_height - 1.6).abs() < f64::EPSILON);
        assert!(!cfg.auto_start);
        assert!(cfg.search_directories.is_empty());
        assert!(cfg.notes.is_empty());
        assert_eq!(cfg.theme, ThemeMode::System);
    }

    #[tokio::test]
    async fn test_malformed_value_reads_as_default() {
        let (config, _, _) = make_store(&[
            (KEY_FONT_SIZE, json!("large")),
            (KEY_THEME, json!("solarized")),
        ]);

        assert_eq!(config.font_size().await.unwrap(), DEFAULT_FONT_SIZE);
        assert_eq!(config.theme().await.unwrap(), ThemeMode::System);
    }

    #[tokio::test]
    async fn test_null_value_reads_as_default() {
        let (config, _, _) = make_store(&[(KEY_AUTO_START, Value::Null)]);
        assert!(!config.auto_start().await.unwrap());
    }

    // ── Initialisation ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_concurrent_first_use_opens_store_once() {
        // Arrange
        let (config, _, opener) = make_store(&[]);

        // Act
        let (a, b, c) = tokio::join!(config.font_size(), config.theme(), config.notes());

        // Assert
        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(opener.opens.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_first_use_marks_migration_and_sets_notes_location() {
        // Arrange
        let (config, memory, _) = make_store(&[]);

        // Act
        config.init().await;

        // Assert
        assert_eq!(memory.raw(KEY_MIGRATED), Some(json!(true)));
        assert_eq!(
            config.default_notes_location().await.unwrap(),
            "/home/me/.ytools"
        );
    }

    #[tokio::test]
    async fn test_existing_notes_location_is_kept() {
        let (config, _, _) = make_store(&[(KEY_DEFAULT_NOTES_LOCATION, json!("/data/notes"))]);
        assert_eq!(config.default_notes_location().await.unwrap(), "/data/notes");
    }

    #[tokio::test]
    async fn test_first_use_migrates_legacy_font_size() {
        // Arrange
        let memory = MemoryStore::with(&[]);
        let opener = Arc::new(CountingOpener {
            store: memory.clone(),
            opens: AtomicUsize::new(0),
        });
        let legacy = Arc::new(FixedLegacy(Some(LegacyConfig { font_size: Some(20.0) })));
        let config = ConfigStore::new(opener, legacy, "");

        // Act
        let size = config.font_size().await.expect("font size");

        // Assert
        assert_eq!(size, 20);
        assert!(config.is_migrated().await.unwrap());
    }

    #[tokio::test]
    async fn test_open_failure_is_returned_by_accessors_and_swallowed_by_init() {
        let config = ConfigStore::new(Arc::new(FailingOpener), Arc::new(NoLegacyConfig), "");

        config.init().await;
        let result = config.font_size().await;

        assert!(matches!(result, Err(StoreError::NoPlatformConfigDir)));
    }

    // ── Writes ────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_set_theme_round_trips_every_mode() {
        let (config, _, _) = make_store(&[]);
        for mode in ThemeMode::ALL {
            config.set_theme(mode).await.unwrap();
            assert_eq!(config.theme().await.unwrap(), mode);
        }
    }

    #[tokio::test]
    async fn test_setters_write_camel_case_keys() {
        // Arrange
        let (config, memory, _) = make_store(&[]);

        // Act
        config.set_font_family("Fira Code").await.unwrap();
        config.set_line_height(1.8).await.unwrap();
        config.set_auto_start(true).await.unwrap();
        config.set_theme(ThemeMode::Cyberpunk).await.unwrap();

        // Assert
        assert_eq!(memory.raw(KEY_FONT_FAMILY), Some(json!("Fira Code")));
        assert_eq!(memory.raw(KEY_LINE_HEIGHT), Some(json!(1.8)));
        assert_eq!(memory.raw(KEY_AUTO_START), Some(json!(true)));
        assert_eq!(memory.raw(KEY_THEME), Some(json!("cyberpunk")));
    }

    #[tokio::test]
    async fn test_add_search_directory_skips_duplicates() {
        let (config, _, _) = make_store(&[]);

        config.add_search_directory("/work").await.unwrap();
        config.add_search_directory("/notes").await.unwrap();
        config.add_search_directory("/work").await.unwrap();

        assert_eq!(
            config.search_directories().await.unwrap(),
            vec!["/work".to_string(), "/notes".to_string()]
        );
    }

    #[tokio::test]
    async fn test_remove_note_keeps_order_of_the_rest() {
        let (config, _, _) = make_store(&[(KEY_NOTES, json!(["/a.md", "/b.md", "/c.md"]))]);

        config.remove_note("/b.md").await.unwrap();
        config.remove_note("/missing.md").await.unwrap();

        assert_eq!(
            config.notes().await.unwrap(),
            vec!["/a.md".to_string(), "/c.md".to_string()]
        );
    }

    #[tokio::test]
    async fn test_reset_restores_defaults_and_keeps_migration_flag() {
        // Arrange
        let (config, memory, _) = make_store(&[]);
        config.set_font_size(22).await.unwrap();
        config.add_note("/a.md").await.unwrap();
        memory
            .set("custom", json!("leftover"))
            .await
            .unwrap();

        // Act
        config.reset().await.expect("reset");

        // Assert
        assert_eq!(config.config().await.unwrap().font_size, 16);
        assert!(config.notes().await.unwrap().is_empty());
        assert_eq!(memory.raw("custom"), None);
        assert_eq!(memory.raw(KEY_MIGRATED), Some(json!(true)));
        assert!(memory.saves.load(Ordering::SeqCst) >= 1);
    }

    // ── Watching ──────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_watch_font_size_reports_new_sizes_until_unlisten() {
        // Arrange
        let (config, _, _) = make_store(&[]);
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut watch = config
            .watch_font_size(move |size| {
                let _ = tx.send(size);
            })
            .await
            .expect("watch");

        // Act
        config.set_font_family("Menlo").await.unwrap();
        config.set_font_size(18).await.unwrap();

        // Assert
        let received = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timely callback");
        assert_eq!(received, Some(18));

        watch.unlisten();
        watch.unlisten();
        assert!(!watch.is_listening());
    }
}

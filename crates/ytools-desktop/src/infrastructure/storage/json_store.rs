//! JSON file backed key-value store.
//!
//! The whole file is one JSON object mapping keys to values:
//!
//! ```json
//! {
//!   "fontSize": 16,
//!   "theme": "dark",
//!   "_migrated": true
//! }
//! ```
//!
//! Keys this version does not know are kept in memory and written back
//! untouched.
//!
//! # Auto-save
//!
//! Writes update memory immediately and schedule a save after a short
//! debounce, so a burst of writes costs one disk write.  Saves go through a
//! temporary file and a rename, so a crash mid-save never leaves a truncated
//! store behind.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error};

use crate::application::config_store::{KeyChange, KeyValueStore, StoreError, StoreOpener};

/// Delay between the first unsaved write and the automatic save.
pub const AUTO_SAVE_DELAY: Duration = Duration::from_millis(100);

const CHANGE_CHANNEL_CAPACITY: usize = 64;

pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<Map<String, Value>>,
    changes: broadcast::Sender<KeyChange>,
    save_pending: AtomicBool,
    save_lock: Mutex<()>,
    auto_save_delay: Duration,
    this: Weak<JsonFileStore>,
}

impl JsonFileStore {
    /// Loads the store at `path`.  A missing file yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] for file-system errors other than "not
    /// found", [`StoreError::Parse`] for malformed JSON, and
    /// [`StoreError::NotAnObject`] when the root value is not an object.
    pub async fn open(path: &Path, auto_save_delay: Duration) -> Result<Arc<Self>, StoreError> {
        let entries = match tokio::fs::read_to_string(path).await {
            Ok(content) => match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(map)) => map,
                Ok(_) => return Err(StoreError::NotAnObject(path.to_path_buf())),
                Err(source) => {
                    return Err(StoreError::Parse {
                        path: path.to_path_buf(),
                        source,
                    })
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        debug!("opened settings store {} ({} keys)", path.display(), entries.len());

        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Ok(Arc::new_cyclic(|this| Self {
            path: path.to_path_buf(),
            entries: Mutex::new(entries),
            changes,
            save_pending: AtomicBool::new(false),
            save_lock: Mutex::new(()),
            auto_save_delay,
            this: this.clone(),
        }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn schedule_save(&self) {
        if self.save_pending.swap(true, Ordering::AcqRel) {
            return;
        }
        let this = self.this.clone();
        let delay = self.auto_save_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(store) = this.upgrade() else {
                return;
            };
            store.save_pending.store(false, Ordering::Release);
            if let Err(e) = store.save().await {
                error!("failed to auto-save settings: {e}");
            }
        });
    }

    fn notify(&self, key: &str, value: Option<Value>) {
        // No subscribers is not an error.
        let _ = self.changes.send(KeyChange {
            key: key.to_string(),
            value,
        });
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.clone());
        self.notify(key, Some(value));
        self.schedule_save();
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let removed = std::mem::take(&mut *self.entries.lock().await);
        for key in removed.keys() {
            self.notify(key, None);
        }
        self.schedule_save();
        Ok(())
    }

    async fn save(&self) -> Result<(), StoreError> {
        let _guard = self.save_lock.lock().await;
        let snapshot = Value::Object(self.entries.lock().await.clone());
        let content = serde_json::to_string_pretty(&snapshot).map_err(StoreError::Serialize)?;

        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| StoreError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|source| StoreError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;
        debug!("saved settings store {}", self.path.display());
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<KeyChange> {
        self.changes.subscribe()
    }
}

/// Opens a [`JsonFileStore`] at a fixed path.
pub struct JsonStoreOpener {
    path: PathBuf,
    auto_save_delay: Duration,
}

impl JsonStoreOpener {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            auto_save_delay: AUTO_SAVE_DELAY,
        }
    }
}

#[async_trait]
impl StoreOpener for JsonStoreOpener {
    async fn open(&self) -> Result<Arc<dyn KeyValueStore>, StoreError> {
        let store: Arc<dyn KeyValueStore> =
            JsonFileStore::open(&self.path, self.auto_save_delay).await?;
        Ok(store)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;
    use uuid::Uuid;

    use super::*;

    fn temp_store_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("ytools_store_{}", Uuid::new_v4()))
            .join("config.json")
    }

    fn read_file(path: &Path) -> Value {
        let content = std::fs::read_to_string(path).expect("store file written");
        serde_json::from_str(&content).expect("valid JSON")
    }

    fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[tokio::test]
    async fn test_missing_file_opens_empty() {
        let store = JsonFileStore::open(&temp_store_path(), AUTO_SAVE_DELAY)
            .await
            .expect("open");

        assert_eq!(store.get("fontSize").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_then_reopen_preserves_values_and_unknown_keys() {
        // Arrange
        let path = temp_store_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"windowState": {"w": 800}}"#).unwrap();
        let store = JsonFileStore::open(&path, AUTO_SAVE_DELAY).await.unwrap();

        // Act
        store.set("fontSize", json!(20)).await.unwrap();
        store.save().await.expect("save");
        let reopened = JsonFileStore::open(&path, AUTO_SAVE_DELAY).await.unwrap();

        // Assert
        assert_eq!(reopened.get("fontSize").await.unwrap(), Some(json!(20)));
        assert_eq!(
            reopened.get("windowState").await.unwrap(),
            Some(json!({"w": 800}))
        );
        cleanup(&path);
    }

    #[tokio::test]
    async fn test_write_is_auto_saved_after_delay() {
        // Arrange
        let path = temp_store_path();
        let store = JsonFileStore::open(&path, Duration::from_millis(50))
            .await
            .unwrap();

        // Act
        store.set("theme", json!("dark")).await.unwrap();
        store.set("fontSize", json!(14)).await.unwrap();

        // Assert
        tokio::time::timeout(Duration::from_secs(2), async {
            while !path.exists() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("auto-save happened");
        let saved = read_file(&path);
        assert_eq!(saved["theme"], "dark");
        assert_eq!(saved["fontSize"], 14);
        cleanup(&path);
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_error() {
        let path = temp_store_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();

        let result = JsonFileStore::open(&path, AUTO_SAVE_DELAY).await;

        assert!(matches!(result, Err(StoreError::Parse { .. })));
        cleanup(&path);
    }

    #[tokio::test]
    async fn test_non_object_root_is_rejected() {
        let path = temp_store_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let result = JsonFileStore::open(&path, AUTO_SAVE_DELAY).await;

        assert!(matches!(result, Err(StoreError::NotAnObject(_))));
        cleanup(&path);
    }

    #[tokio::test]
    async fn test_subscribers_see_sets_and_clears() {
        // Arrange
        let store = JsonFileStore::open(&temp_store_path(), Duration::from_secs(60))
            .await
            .unwrap();
        let mut changes = store.subscribe();

        // Act
        store.set("notes", json!(["/a.md"])).await.unwrap();
        store.clear().await.unwrap();

        // Assert
        assert_eq!(
            changes.recv().await.unwrap(),
            KeyChange {
                key: "notes".to_string(),
                value: Some(json!(["/a.md"]))
            }
        );
        assert_eq!(
            changes.recv().await.unwrap(),
            KeyChange {
                key: "notes".to_string(),
                value: None
            }
        );
        assert_eq!(store.get("notes").await.unwrap(), None);
    }
}

//! Reader for the pre-store settings file (`~/.ytools/config.json`).

use std::path::PathBuf;

use async_trait::async_trait;

use ytools_core::LegacyConfig;

use crate::application::migrate::{LegacyConfigError, LegacyConfigSource};

/// Legacy settings file at a fixed path.
pub struct LegacyConfigFile {
    path: PathBuf,
}

impl LegacyConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl LegacyConfigSource for LegacyConfigFile {
    async fn load(&self) -> Result<Option<LegacyConfig>, LegacyConfigError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(LegacyConfigError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| LegacyConfigError::Parse {
                path: self.path.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("ytools_legacy_{}", Uuid::new_v4()))
            .join(name)
    }

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let source = LegacyConfigFile::new(temp_file("config.json"));
        assert_eq!(source.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reads_snake_case_font_size_and_ignores_other_keys() {
        // Arrange
        let path = temp_file("config.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"font_size": 18, "window_width": 900}"#).unwrap();

        // Act
        let loaded = LegacyConfigFile::new(&path).load().await;

        // Assert
        assert_eq!(
            loaded.unwrap(),
            Some(LegacyConfig {
                font_size: Some(18.0)
            })
        );
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_error() {
        let path = temp_file("config.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "font_size = 18").unwrap();

        let result = LegacyConfigFile::new(&path).load().await;

        assert!(matches!(result, Err(LegacyConfigError::Parse { .. })));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}

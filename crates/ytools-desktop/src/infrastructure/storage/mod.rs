//! Storage infrastructure: settings file persistence.
//!
//! - **`json_store`** – the JSON key-value store file with debounced saves.
//! - **`legacy`** – reader for the settings file of earlier releases.
//! - **`paths`** – platform locations of both files and of the notes folder.
//!
//! Keeping file-system concerns here means the application layer only ever
//! sees the [`KeyValueStore`](crate::application::config_store::KeyValueStore)
//! and [`LegacyConfigSource`](crate::application::migrate::LegacyConfigSource)
//! traits.

pub mod json_store;
pub mod legacy;
pub mod paths;

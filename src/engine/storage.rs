// engine/storage.rs — JSON document persistence.
// One pretty-printed JSON file per record family under the data directory.
// This is the only layer that touches the filesystem; the store and ledger
// flush through it explicitly; there is no implicit write-behind.

use crate::atoms::error::EngineResult;
use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

/// Handle on the data directory. Constructed from the config context and
/// passed into components, never a global.
pub struct Storage {
    data_dir: PathBuf,
}

impl Storage {
    /// Bind to a data directory, creating it if needed.
    pub fn open(data_dir: impl Into<PathBuf>) -> EngineResult<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;
        info!("[storage] Using data directory {:?}", data_dir);
        Ok(Self { data_dir })
    }

    pub fn path_of(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(file_name)
    }

    /// Load a JSON document. A missing file is not an error: it loads as
    /// the type's default (empty store, zeroed metrics).
    pub fn load_json<T: DeserializeOwned + Default>(&self, file_name: &str) -> EngineResult<T> {
        let path = self.path_of(file_name);
        if !path.exists() {
            return Ok(T::default());
        }
        let raw = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write a JSON document, replacing any previous content.
    pub fn save_json<T: Serialize>(&self, file_name: &str, value: &T) -> EngineResult<()> {
        let path = self.path_of(file_name);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)?;
        Ok(())
    }
}

/// Days elapsed between two instants, as a fraction.
pub fn days_between(earlier: chrono::DateTime<chrono::Utc>, later: chrono::DateTime<chrono::Utc>) -> f64 {
    (later - earlier).num_seconds() as f64 / crate::atoms::constants::SECONDS_PER_DAY
}

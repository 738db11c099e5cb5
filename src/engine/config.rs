// engine/config.rs — Engine configuration context.
// One explicit config object constructed at startup and passed into the
// components that need it. There is no ambient module state — the data
// directory, scoring weights, and signature template all travel through
// this struct.

use crate::atoms::constants::DEFAULT_SIGNATURE_CHUNKS;
use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::types::ScoringWeights;
use crate::engine::storage::Storage;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoloConfig {
    /// Directory holding the persisted JSON documents.
    pub data_dir: PathBuf,
    /// Importance scoring weights. The defaults sum to 1.0.
    pub weights: ScoringWeights,
    /// Active literal-chunk template for stealth signatures.
    pub signature_chunks: Vec<String>,
}

impl Default for RoloConfig {
    fn default() -> Self {
        Self {
            data_dir: dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".rolo"),
            weights: ScoringWeights::default(),
            signature_chunks: DEFAULT_SIGNATURE_CHUNKS
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

impl RoloConfig {
    /// Load from a `rolo.toml` file, or fall back to defaults when no path
    /// is given. A named-but-missing file is an error; defaults are only
    /// for the no-config case.
    pub fn load(path: Option<&Path>) -> EngineResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path)?;
        let config: RoloConfig = toml::from_str(&raw)
            .map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))?;
        if config.signature_chunks.is_empty() {
            return Err(EngineError::Config(
                "signature_chunks must contain at least one literal chunk".into(),
            ));
        }
        info!("[config] Loaded {}", path.display());
        Ok(config)
    }

    /// Open the storage context for this configuration.
    pub fn storage(&self) -> EngineResult<Storage> {
        Storage::open(&self.data_dir)
    }
}

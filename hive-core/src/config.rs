//! Search configuration, loadable from JSON

use crate::eval::Heuristics;
use crate::zobrist::DEFAULT_KEY_SEED;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default search depth in plies
pub const DEFAULT_DEPTH: u32 = 2;

/// Default number of transposition buckets
pub const DEFAULT_TT_SIZE: usize = 1 << 16;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Fixed search depth in plies
    pub depth: u32,
    /// Transposition table buckets
    pub tt_size: usize,
    /// Evaluation weights
    pub heuristics: Heuristics,
    /// Seed for the key table when none is loaded from disk
    pub key_seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            tt_size: DEFAULT_TT_SIZE,
            heuristics: Heuristics::default(),
            key_seed: DEFAULT_KEY_SEED,
        }
    }
}

impl SearchConfig {
    pub fn with_depth(depth: u32) -> Self {
        Self {
            depth,
            ..Default::default()
        }
    }

    /// Load from JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        Ok(config)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

//! RocksDB binding configuration.

use serde::{Deserialize, Serialize};

/// Tuning knobs for [`RocksTabularStore`](crate::RocksTabularStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RocksConfig {
    /// Shared LRU block cache size in bytes.
    pub block_cache_size: usize,
    /// `max_open_files` passed to RocksDB; -1 keeps all files open.
    pub max_open_files: i32,
}

impl Default for RocksConfig {
    fn default() -> Self {
        Self {
            block_cache_size: 64 * 1024 * 1024,
            max_open_files: 512,
        }
    }
}

//! Collision-safe allocation of new table paths.
//!
//! Candidate paths are `prefix_suffix` with a random alphanumeric suffix.
//! Contention degrades gracefully: every exhausted retry budget grows the
//! suffix length (never shrinks it), widening the name space instead of
//! failing. Allocation only gives up once the length exceeds the configured
//! maximum.
//!
//! Each allocator instance owns its suffix-length state and its RNG; there
//! is no process-wide counter, so behavior is deterministic under a seeded
//! allocator and independent allocators do not interfere.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::distr::Alphanumeric;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use matrixgrid_core::config::AllocatorConfig;
use matrixgrid_core::error::{AllocError, Result};
use matrixgrid_core::traits::TabularStore;

struct AllocState {
    suffix_len: usize,
    rng: SmallRng,
}

/// Generates collision-free table paths with adaptive retry.
pub struct NameAllocator {
    store: Arc<dyn TabularStore>,
    config: AllocatorConfig,
    state: Mutex<AllocState>,
}

impl NameAllocator {
    /// Allocator with default config and OS-seeded randomness.
    pub fn new(store: Arc<dyn TabularStore>) -> Self {
        Self::with_config(store, AllocatorConfig::default())
    }

    /// Allocator with explicit config.
    pub fn with_config(store: Arc<dyn TabularStore>, config: AllocatorConfig) -> Self {
        let suffix_len = config.initial_suffix_len;
        Self {
            store,
            config,
            state: Mutex::new(AllocState {
                suffix_len,
                rng: SmallRng::from_os_rng(),
            }),
        }
    }

    /// Deterministic allocator for tests.
    pub fn with_seed(store: Arc<dyn TabularStore>, config: AllocatorConfig, seed: u64) -> Self {
        let suffix_len = config.initial_suffix_len;
        Self {
            store,
            config,
            state: Mutex::new(AllocState {
                suffix_len,
                rng: SmallRng::seed_from_u64(seed),
            }),
        }
    }

    /// Produce a path under `prefix` that no existing table uses.
    ///
    /// The existence check happens here; the caller is expected to create
    /// the table promptly, and table creation itself rejects duplicates, so
    /// a lost race surfaces as an error rather than a clobbered table.
    ///
    /// # Errors
    /// * [`AllocError::Exhausted`] once the suffix length exceeds
    ///   `max_suffix_len` with the retry budget spent.
    /// * Store errors from the existence probe propagate unchanged.
    pub fn allocate(&self, prefix: &str) -> Result<String> {
        let mut state = self.state.lock();
        // A zero budget would underflow below; one try per length is the floor.
        let per_length = self.config.retry_budget.max(1);
        let mut budget = per_length;

        while state.suffix_len <= self.config.max_suffix_len {
            let suffix_len = state.suffix_len;
            let suffix = Self::draw_suffix(&mut state.rng, suffix_len);
            let path = format!("{prefix}_{suffix}");
            if !self.store.table_exists(&path)? {
                return Ok(path);
            }

            budget -= 1;
            if budget == 0 {
                // Widen the name space; the length is monotonic.
                state.suffix_len += 1;
                budget = per_length;
                debug!(
                    prefix = %prefix,
                    suffix_len = state.suffix_len,
                    "name contention, growing suffix"
                );
            }
        }

        Err(AllocError::Exhausted {
            prefix: prefix.to_string(),
            max_suffix_len: self.config.max_suffix_len,
        }
        .into())
    }

    /// Current suffix length (grows under contention, never shrinks).
    pub fn suffix_len(&self) -> usize {
        self.state.lock().suffix_len
    }

    fn draw_suffix(rng: &mut SmallRng, len: usize) -> String {
        (0..len)
            .map(|_| (rng.sample(Alphanumeric) as char).to_ascii_lowercase())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matrixgrid_core::stubs::MemStore;
    use matrixgrid_core::types::TableSchema;
    use std::collections::HashSet;

    fn tiny_config() -> AllocatorConfig {
        AllocatorConfig {
            initial_suffix_len: 1,
            retry_budget: 3,
            max_suffix_len: 2,
        }
    }

    #[test]
    fn allocated_paths_carry_prefix_and_suffix() {
        let store = Arc::new(MemStore::new());
        let alloc = NameAllocator::new(store);
        let path = alloc.allocate("matrix").unwrap();
        assert!(path.starts_with("matrix_"));
        let suffix = &path["matrix_".len()..];
        assert_eq!(suffix.len(), AllocatorConfig::default().initial_suffix_len);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn no_two_live_resources_share_a_path() {
        let store: Arc<MemStore> = Arc::new(MemStore::new());
        let alloc = NameAllocator::new(store.clone());

        let mut seen = HashSet::new();
        for _ in 0..100 {
            let path = alloc.allocate("m").unwrap();
            // Simulate prompt creation, as the resource layer does.
            store.create_table(&TableSchema::matrix(&path)).unwrap();
            assert!(seen.insert(path));
        }
    }

    #[test]
    fn contention_grows_suffix_monotonically() {
        let store: Arc<MemStore> = Arc::new(MemStore::new());
        // Occupy the entire one-character lowercase-alphanumeric space.
        for c in "abcdefghijklmnopqrstuvwxyz0123456789".chars() {
            store
                .create_table(&TableSchema::matrix(format!("m_{c}")))
                .unwrap();
        }
        let alloc = NameAllocator::with_seed(store, tiny_config(), 7);

        let path = alloc.allocate("m").unwrap();
        assert_eq!(path.len(), "m_".len() + 2, "suffix had to grow: {path}");
        assert_eq!(alloc.suffix_len(), 2);

        // The grown length sticks for the next allocation.
        let next = alloc.allocate("m").unwrap();
        assert_eq!(next.len(), "m_".len() + 2);
    }

    #[test]
    fn exhaustion_at_max_length_is_an_error() {
        let store: Arc<MemStore> = Arc::new(MemStore::new());
        let chars = "abcdefghijklmnopqrstuvwxyz0123456789";
        for a in chars.chars() {
            store
                .create_table(&TableSchema::matrix(format!("m_{a}")))
                .unwrap();
            for b in chars.chars() {
                store
                    .create_table(&TableSchema::matrix(format!("m_{a}{b}")))
                    .unwrap();
            }
        }
        let alloc = NameAllocator::with_seed(store, tiny_config(), 11);
        let err = alloc.allocate("m").unwrap_err();
        assert!(matches!(
            err,
            matrixgrid_core::MatrixError::Alloc(AllocError::Exhausted { .. })
        ));
    }

    #[test]
    fn seeded_allocators_are_deterministic() {
        let mk = || {
            let store = Arc::new(MemStore::new());
            NameAllocator::with_seed(store, AllocatorConfig::default(), 42)
        };
        assert_eq!(mk().allocate("m").unwrap(), mk().allocate("m").unwrap());
    }
}

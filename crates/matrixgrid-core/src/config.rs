//! Configuration for naming and deletion retry behavior.
//!
//! Plain `Default`-able structs; the defaults live in [`defaults`] so tests
//! and callers reference one named constant instead of a magic number.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default values for [`AllocatorConfig`] and [`RetryConfig`].
pub mod defaults {
    use std::time::Duration;

    /// Initial random-suffix length for new table paths.
    pub const SUFFIX_LEN: usize = 5;

    /// Collisions tolerated per suffix length before the length grows.
    pub const RETRY_BUDGET: u32 = 10;

    /// Hard ceiling on the suffix length; beyond it allocation gives up.
    pub const MAX_SUFFIX_LEN: usize = 16;

    /// Prefix used for resources the manager names on its own (transpose
    /// destinations).
    pub const TABLE_PREFIX: &str = "matrix";

    /// Attempts at disabling a table before deletion.
    pub const DISABLE_ATTEMPTS: u32 = 5;

    /// First backoff between disable attempts; doubles per attempt.
    pub const DISABLE_BACKOFF: Duration = Duration::from_millis(50);

    /// Backoff ceiling.
    pub const DISABLE_BACKOFF_MAX: Duration = Duration::from_secs(1);
}

/// Tuning for collision-safe name allocation.
///
/// The allocator owns its suffix-length state; contention degrades into a
/// larger name space instead of failing immediately. The length only grows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatorConfig {
    /// Starting suffix length.
    pub initial_suffix_len: usize,
    /// Collisions tolerated before the suffix length is increased.
    pub retry_budget: u32,
    /// Maximum suffix length; exceeding it is `AllocError::Exhausted`.
    pub max_suffix_len: usize,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            initial_suffix_len: defaults::SUFFIX_LEN,
            retry_budget: defaults::RETRY_BUDGET,
            max_suffix_len: defaults::MAX_SUFFIX_LEN,
        }
    }
}

/// Bounded retry with exponential backoff for transient disable failures.
///
/// Replaces unbounded spinning: after `max_attempts` the transient error is
/// surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts before the last error is surfaced.
    pub max_attempts: u32,
    /// Sleep after the first failed attempt; doubles each retry.
    pub initial_backoff: Duration,
    /// Ceiling on the backoff.
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::DISABLE_ATTEMPTS,
            initial_backoff: defaults::DISABLE_BACKOFF,
            max_backoff: defaults::DISABLE_BACKOFF_MAX,
        }
    }
}

impl RetryConfig {
    /// A config that never sleeps, for tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Backoff to sleep after the given zero-based failed attempt.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.min(16);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

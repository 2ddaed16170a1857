//! Trait seams toward the external collaborators.
//!
//! Three systems sit outside this workspace: the distributed column-family
//! store, the distributed batch-job framework, and the filesystem holding
//! job scratch space. Each is bound behind an object-safe `Send + Sync`
//! trait so the manager can be exercised against in-memory stubs, the local
//! RocksDB binding, or a real cluster without changing a line above the
//! seam.
//!
//! All methods block the calling thread; this layer introduces no worker
//! threads, cancellation, or timeouts of its own.

use std::path::Path;

use crate::error::{JobError, StoreError};
use crate::job::JobSpec;
use crate::types::{RowUpdate, ScannedCell, TableSchema};

/// A table-oriented column-family store.
///
/// Tables are created with a fixed set of families and administered through
/// an enable/disable/delete cycle: deletion requires the table disabled
/// first, and disabling may fail transiently
/// ([`StoreError::TransientRegion`]); callers retry that variant with
/// bounded backoff.
///
/// The surface is deliberately plain get/put with a batched commit and no
/// compare-and-swap. Read-modify-write sequences built on it (the reference
/// counter) are best-effort; see the refcount module docs.
pub trait TabularStore: Send + Sync {
    /// Whether a table exists under `table`.
    fn table_exists(&self, table: &str) -> Result<bool, StoreError>;

    /// Create a table with the given schema, enabled.
    ///
    /// # Errors
    /// * [`StoreError::TableExists`] if the path is taken.
    fn create_table(&self, schema: &TableSchema) -> Result<(), StoreError>;

    /// Delete a disabled table and all of its cells.
    ///
    /// # Errors
    /// * [`StoreError::MissingTable`] if the table does not exist.
    /// * [`StoreError::TableEnabled`] if it has not been disabled.
    fn delete_table(&self, table: &str) -> Result<(), StoreError>;

    /// Re-enable a disabled table.
    fn enable_table(&self, table: &str) -> Result<(), StoreError>;

    /// Administratively disable a table.
    ///
    /// # Errors
    /// * [`StoreError::TransientRegion`] for retryable region-level
    ///   failures; anything else is final.
    fn disable_table(&self, table: &str) -> Result<(), StoreError>;

    /// Whether the table is currently enabled.
    fn is_table_enabled(&self, table: &str) -> Result<bool, StoreError>;

    /// Read one cell. `Ok(None)` means the cell is absent.
    fn get(
        &self,
        table: &str,
        row: &[u8],
        family: &str,
        qualifier: &[u8],
    ) -> Result<Option<Vec<u8>>, StoreError>;

    /// Write one cell.
    fn put(
        &self,
        table: &str,
        row: &[u8],
        family: &str,
        qualifier: &[u8],
        value: &[u8],
    ) -> Result<(), StoreError>;

    /// Atomically write all cells of a batched row update.
    fn commit(&self, table: &str, update: RowUpdate) -> Result<(), StoreError>;

    /// Scan every cell of the given families, ordered by row key.
    ///
    /// Scan jobs and the local runner are the only consumers; point access
    /// goes through [`get`](TabularStore::get).
    fn scan(&self, table: &str, families: &[&str]) -> Result<Vec<ScannedCell>, StoreError>;
}

/// The batch-job execution substrate.
///
/// `submit` blocks until the described job reaches a terminal state and
/// returns `Err` exactly when that state is failure. Worker scheduling and
/// per-task fault tolerance belong to the substrate, never to callers.
pub trait JobRunner: Send + Sync {
    /// Run `spec` to completion.
    fn submit(&self, spec: &JobSpec) -> Result<(), JobError>;
}

/// Filesystem scratch space for job output.
pub trait ScratchSpace: Send + Sync {
    /// Read the single scalar record a reduce stage left under `dir`.
    ///
    /// # Errors
    /// * [`JobError::MissingResult`] if no record exists.
    fn read_scalar(&self, dir: &Path) -> Result<f64, JobError>;

    /// Recursively remove `dir`. Removing an absent tree is not an error.
    fn delete_tree(&self, dir: &Path) -> Result<(), JobError>;

    /// Whether `dir` exists.
    fn exists(&self, dir: &Path) -> bool;
}

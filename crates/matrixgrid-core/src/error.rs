//! Error taxonomy for matrixgrid.
//!
//! Sub-errors per concern (naming, store, jobs) unified into [`MatrixError`]
//! via `From` implementations. Naming and storage failures are fatal and
//! surfaced immediately; job failures propagate unchanged from the batch
//! substrate, with no operation-level retry above it.

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, MatrixError>;

/// Failures while allocating a collision-free resource name.
#[derive(Debug, Error)]
pub enum AllocError {
    /// The retry budget was exhausted at the maximum suffix length.
    ///
    /// Repeated contention grows the suffix; hitting the configured maximum
    /// means the name space under this prefix is effectively saturated.
    #[error("name allocation exhausted for prefix '{prefix}' at suffix length {max_suffix_len}")]
    Exhausted {
        /// Prefix all attempted names shared.
        prefix: String,
        /// Configured maximum suffix length that was reached.
        max_suffix_len: usize,
    },
}

/// Failures reported by a [`TabularStore`](crate::traits::TabularStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store connection or admin operation failed.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Retryable region-level failure while disabling a table.
    ///
    /// Callers retry these with bounded backoff; any other variant is final.
    #[error("transient region error on table '{table}': {message}")]
    TransientRegion {
        /// Table being disabled.
        table: String,
        /// Underlying store message.
        message: String,
    },

    /// The named table does not exist.
    #[error("table '{0}' does not exist")]
    MissingTable(String),

    /// A table with this name already exists.
    #[error("table '{0}' already exists")]
    TableExists(String),

    /// Deletion was attempted while the table is still enabled.
    #[error("table '{0}' is enabled; disable it before deletion")]
    TableEnabled(String),

    /// The family is not part of the table's schema.
    #[error("table '{table}' has no family '{family}'")]
    MissingFamily {
        /// Table addressed by the operation.
        table: String,
        /// Unknown family name.
        family: String,
    },

    /// A stored cell could not be decoded (wrong width, bad tag).
    #[error("corrupt cell: {0}")]
    Corrupt(String),

    /// Underlying I/O failure.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures from the batch-job substrate or its scratch space.
#[derive(Debug, Error)]
pub enum JobError {
    /// The submitted job reached a failed terminal state.
    #[error("job '{job}' failed: {message}")]
    Failed {
        /// Human-readable job name.
        job: String,
        /// Failure detail from the substrate.
        message: String,
    },

    /// The job succeeded but the scalar result record is absent.
    #[error("job result record missing at {path}")]
    MissingResult {
        /// Expected location of the result record.
        path: PathBuf,
    },

    /// Scratch-space I/O failure.
    #[error("scratch I/O error: {0}")]
    Scratch(#[from] std::io::Error),
}

/// Unified error type for the matrixgrid workspace.
///
/// All sub-errors convert into this type via `#[from]`, so call sites
/// compose with `?` regardless of which layer failed.
#[derive(Debug, Error)]
pub enum MatrixError {
    /// Name allocation failure.
    #[error(transparent)]
    Alloc(#[from] AllocError),

    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Batch-job failure, propagated unchanged from the substrate.
    #[error(transparent)]
    Job(#[from] JobError),

    /// A mandatory metadata cell is absent.
    ///
    /// Dimension cells (`rows`, `columns`) and the `type` tag are mandatory;
    /// the reference cell is the only optional metadata field (absent reads
    /// as zero).
    #[error("mandatory metadata cell '{field}' missing on table '{table}'")]
    MissingMetadata {
        /// Qualifier of the absent cell.
        field: &'static str,
        /// Table whose metadata row was read.
        table: String,
    },

    /// Operation attempted on a handle that already reached `Closed`.
    #[error("matrix '{path}' is closed")]
    Closed {
        /// Path of the closed resource.
        path: String,
    },

    /// The alias is already bound to a different resource.
    #[error("alias '{alias}' is already bound to '{bound_to}'")]
    AliasTaken {
        /// Requested alias.
        alias: String,
        /// Path the alias currently resolves to.
        bound_to: String,
    },

    /// The stored `type` tag names no known matrix variant.
    #[error("unknown matrix variant tag '{0}'")]
    UnknownVariant(String),
}

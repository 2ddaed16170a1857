//! Batch-job descriptions.
//!
//! A [`JobSpec`] is the complete, immutable description handed to the
//! substrate: input path, output location, and the roles to run. Every
//! parameter a job needs travels inside the spec; there is no out-of-band
//! slot a caller must set before submitting.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which scalar reduction a norm job computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormKind {
    /// One-norm: maximum column absolute sum.
    One,
    /// Infinity-norm: maximum row absolute sum.
    Infinity,
    /// Max-value norm: largest absolute cell value.
    MaxValue,
    /// Frobenius norm: square root of the sum of squared cells.
    Frobenius,
}

impl NormKind {
    /// Short tag used in job names and scratch directory names.
    pub fn tag(&self) -> &'static str {
        match self {
            NormKind::One => "norm1",
            NormKind::Infinity => "norm_infinity",
            NormKind::MaxValue => "norm_maxvalue",
            NormKind::Frobenius => "norm_frobenius",
        }
    }
}

/// Immutable description of one batch job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JobSpec {
    /// Scan-reduce over the input's data cells down to a single scalar,
    /// written as one record under `output_dir`.
    Norm {
        /// Source table path.
        input: String,
        /// Scratch directory receiving the scalar record.
        output_dir: PathBuf,
        /// Which reduction to run.
        kind: NormKind,
    },

    /// Row-by-row copy of the copied families from `source` into `dest`.
    ///
    /// With `scale` set, every numeric data cell is multiplied during the
    /// copy; cells of the other families pass through unchanged.
    CellCopy {
        /// Source table path.
        source: String,
        /// Destination table path.
        dest: String,
        /// Optional scaling factor for numeric data cells.
        scale: Option<f64>,
    },

    /// Two-stage transpose: stage 1 emits each source data cell keyed by
    /// its transposed coordinate, stage 2 writes the emitted cells into
    /// `dest`. The source table is never written.
    Transpose {
        /// Source table path.
        source: String,
        /// Destination table path (same variant, swapped dimensions).
        dest: String,
    },
}

impl JobSpec {
    /// Human-readable job name for logs and error messages.
    pub fn name(&self) -> String {
        match self {
            JobSpec::Norm { input, kind, .. } => format!("{} {}", kind.tag(), input),
            JobSpec::CellCopy {
                source,
                dest,
                scale: Some(a),
            } => format!("set {dest} <- {a} * {source}"),
            JobSpec::CellCopy { source, dest, .. } => format!("set {dest} <- {source}"),
            JobSpec::Transpose { source, dest } => format!("transpose {dest} <- {source}"),
        }
    }
}

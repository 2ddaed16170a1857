//! Job orchestration over open matrix resources.
//!
//! The orchestrator owns the scratch-space lifecycle around every norm job:
//! it derives a fresh job directory, clears any stale leftover under the
//! same name, submits, reads the scalar record back, and removes the
//! directory whether the job succeeded or failed. Copy and transpose jobs
//! write straight into destination tables and need no scratch.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use matrixgrid_core::config::defaults;
use matrixgrid_core::error::Result;
use matrixgrid_core::job::{JobSpec, NormKind};
use matrixgrid_core::traits::{JobRunner, ScratchSpace, TabularStore};

use crate::allocator::NameAllocator;
use crate::resource::MatrixResource;

/// Runs norm, copy, and transpose jobs against open resources.
pub struct JobOrchestrator {
    store: Arc<dyn TabularStore>,
    runner: Arc<dyn JobRunner>,
    scratch: Arc<dyn ScratchSpace>,
    scratch_root: PathBuf,
}

impl JobOrchestrator {
    /// Orchestrator wiring a store, a job runner, and a scratch space
    /// rooted at `scratch_root`.
    pub fn new(
        store: Arc<dyn TabularStore>,
        runner: Arc<dyn JobRunner>,
        scratch: Arc<dyn ScratchSpace>,
        scratch_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            runner,
            scratch,
            scratch_root: scratch_root.into(),
        }
    }

    /// One-norm: maximum column absolute sum.
    pub fn norm1(&self, m: &MatrixResource) -> Result<f64> {
        self.norm(m, NormKind::One)
    }

    /// Infinity-norm: maximum row absolute sum.
    pub fn norm_infinity(&self, m: &MatrixResource) -> Result<f64> {
        self.norm(m, NormKind::Infinity)
    }

    /// Max-value norm: largest absolute cell value.
    pub fn norm_maxvalue(&self, m: &MatrixResource) -> Result<f64> {
        self.norm(m, NormKind::MaxValue)
    }

    /// Frobenius norm: square root of the sum of squared cells.
    pub fn norm_frobenius(&self, m: &MatrixResource) -> Result<f64> {
        self.norm(m, NormKind::Frobenius)
    }

    fn norm(&self, m: &MatrixResource, kind: NormKind) -> Result<f64> {
        m.ensure_open()?;
        let job_dir = self.scratch_root.join(format!(
            "{}_tmp_{}_{}",
            m.variant().tag(),
            kind.tag(),
            Utc::now().timestamp_millis(),
        ));
        // A crashed earlier run may have left a tree under the same name.
        if self.scratch.exists(&job_dir) {
            self.scratch.delete_tree(&job_dir)?;
        }
        let out_dir = job_dir.join("out");
        let spec = JobSpec::Norm {
            input: m.path().to_string(),
            output_dir: out_dir.clone(),
            kind,
        };
        info!(job = %spec.name(), "submitting norm job");

        let submitted = self.runner.submit(&spec);
        let value = submitted.and_then(|()| self.scratch.read_scalar(&out_dir));
        // Scratch comes down on the failure path too; the job error is what
        // the caller needs to see.
        self.cleanup(&job_dir);
        Ok(value?)
    }

    fn cleanup(&self, dir: &Path) {
        if let Err(error) = self.scratch.delete_tree(dir) {
            warn!(dir = %dir.display(), %error, "failed to remove job scratch");
        }
    }

    /// Copy every cell of the copied families from `source` into `dest`.
    ///
    /// Dimension metadata and the reference count of `dest` are untouched.
    pub fn set(&self, dest: &MatrixResource, source: &MatrixResource) -> Result<()> {
        self.copy(dest, source, None)
    }

    /// Copy as [`set`](Self::set), scaling every numeric data cell by
    /// `alpha` during the copy.
    pub fn set_scaled(&self, dest: &MatrixResource, alpha: f64, source: &MatrixResource) -> Result<()> {
        self.copy(dest, source, Some(alpha))
    }

    fn copy(&self, dest: &MatrixResource, source: &MatrixResource, scale: Option<f64>) -> Result<()> {
        source.ensure_open()?;
        dest.ensure_open()?;
        let spec = JobSpec::CellCopy {
            source: source.path().to_string(),
            dest: dest.path().to_string(),
            scale,
        };
        info!(job = %spec.name(), "submitting copy job");
        self.runner.submit(&spec)?;
        Ok(())
    }

    /// Transpose `m` into a freshly allocated resource of the same variant
    /// with swapped dimensions, and return the new open handle.
    ///
    /// The source is never written. If the job fails, the half-built
    /// destination is closed (best effort) before the error surfaces.
    pub fn transpose(
        &self,
        m: &MatrixResource,
        allocator: &NameAllocator,
    ) -> Result<MatrixResource> {
        m.ensure_open()?;
        let (rows, columns) = (m.rows()?, m.columns()?);
        let mut dest = MatrixResource::create(
            self.store.clone(),
            allocator,
            defaults::TABLE_PREFIX,
            m.variant(),
            columns,
            rows,
        )?;
        let spec = JobSpec::Transpose {
            source: m.path().to_string(),
            dest: dest.path().to_string(),
        };
        info!(job = %spec.name(), "submitting transpose job");
        match self.runner.submit(&spec) {
            Ok(()) => Ok(dest),
            Err(e) => {
                if let Err(close_err) = dest.close() {
                    warn!(table = dest.path(), %close_err, "failed to release half-built transpose destination");
                }
                Err(e.into())
            }
        }
    }
}

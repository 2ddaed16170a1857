//! In-process job runner.
//!
//! Executes every [`JobSpec`] against the store on the calling thread:
//! scan-reduce for norms, row-grouped batched writes for copies, and the
//! two-stage emit-then-write shape for transpose. Cluster deployments swap
//! in a [`JobRunner`] that submits to the real substrate instead.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use matrixgrid_core::error::{JobError, Result};
use matrixgrid_core::job::{JobSpec, NormKind};
use matrixgrid_core::layout::{self, families};
use matrixgrid_core::traits::{JobRunner, TabularStore};
use matrixgrid_core::types::RowUpdate;

use super::scratch::FsScratch;

/// [`JobRunner`] that executes jobs in-process against a [`TabularStore`].
pub struct LocalJobRunner {
    store: Arc<dyn TabularStore>,
}

impl LocalJobRunner {
    /// Runner over `store`.
    pub fn new(store: Arc<dyn TabularStore>) -> Self {
        Self { store }
    }

    fn run(&self, spec: &JobSpec) -> Result<()> {
        match spec {
            JobSpec::Norm {
                input,
                output_dir,
                kind,
            } => {
                let value = self.reduce_norm(input, *kind)?;
                FsScratch::write_scalar(output_dir, value)?;
                Ok(())
            }
            JobSpec::CellCopy {
                source,
                dest,
                scale,
            } => self.copy_cells(source, dest, *scale),
            JobSpec::Transpose { source, dest } => self.transpose(source, dest),
        }
    }

    fn reduce_norm(&self, input: &str, kind: NormKind) -> Result<f64> {
        let cells = self.store.scan(input, &[families::DATA])?;
        match kind {
            NormKind::One => {
                // Maximum column absolute sum.
                let mut sums: BTreeMap<u32, f64> = BTreeMap::new();
                for cell in &cells {
                    if layout::is_reserved_row(&cell.row) {
                        continue;
                    }
                    let column = layout::decode_index(&cell.qualifier)?;
                    *sums.entry(column).or_insert(0.0) +=
                        layout::decode_f64(&cell.value)?.abs();
                }
                Ok(sums.values().fold(0.0, |acc, s| acc.max(*s)))
            }
            NormKind::Infinity => {
                // Maximum row absolute sum.
                let mut sums: BTreeMap<u32, f64> = BTreeMap::new();
                for cell in &cells {
                    if layout::is_reserved_row(&cell.row) {
                        continue;
                    }
                    let row = layout::decode_index(&cell.row)?;
                    *sums.entry(row).or_insert(0.0) +=
                        layout::decode_f64(&cell.value)?.abs();
                }
                Ok(sums.values().fold(0.0, |acc, s| acc.max(*s)))
            }
            NormKind::MaxValue => {
                let mut max = 0.0_f64;
                for cell in &cells {
                    if layout::is_reserved_row(&cell.row) {
                        continue;
                    }
                    max = max.max(layout::decode_f64(&cell.value)?.abs());
                }
                Ok(max)
            }
            NormKind::Frobenius => {
                let mut sum = 0.0_f64;
                for cell in &cells {
                    if layout::is_reserved_row(&cell.row) {
                        continue;
                    }
                    let v = layout::decode_f64(&cell.value)?;
                    sum += v * v;
                }
                Ok(sum.sqrt())
            }
        }
    }

    fn copy_cells(&self, source: &str, dest: &str, scale: Option<f64>) -> Result<()> {
        let cells = self.store.scan(source, &families::COPIED)?;
        let mut rows: BTreeMap<Vec<u8>, RowUpdate> = BTreeMap::new();
        for cell in cells {
            let value = match scale {
                // Only numeric data cells are scaled; attribute, alias, and
                // block cells pass through byte for byte.
                Some(alpha) if cell.family == families::DATA => {
                    layout::encode_f64(layout::decode_f64(&cell.value)? * alpha).to_vec()
                }
                _ => cell.value,
            };
            rows.entry(cell.row.clone())
                .or_insert_with(|| RowUpdate::new(cell.row.clone()))
                .cells
                .push((cell.family, cell.qualifier, value));
        }
        for (_, update) in rows {
            self.store.commit(dest, update)?;
        }
        Ok(())
    }

    fn transpose(&self, source: &str, dest: &str) -> Result<()> {
        // Stage 1: emit each data cell keyed by its transposed coordinate.
        let cells = self.store.scan(source, &[families::DATA])?;
        let mut emitted: BTreeMap<u32, Vec<(u32, Vec<u8>)>> = BTreeMap::new();
        for cell in cells {
            if layout::is_reserved_row(&cell.row) {
                continue;
            }
            let row = layout::decode_index(&cell.row)?;
            let column = layout::decode_index(&cell.qualifier)?;
            emitted.entry(column).or_default().push((row, cell.value));
        }

        // Stage 2: write the emitted cells, one batched update per row.
        for (row, columns) in emitted {
            let mut update = RowUpdate::new(layout::row_key(row).to_vec());
            for (column, value) in columns {
                update = update.put(families::DATA, layout::column_qualifier(column).to_vec(), value);
            }
            self.store.commit(dest, update)?;
        }
        Ok(())
    }
}

impl JobRunner for LocalJobRunner {
    fn submit(&self, spec: &JobSpec) -> std::result::Result<(), JobError> {
        info!(job = %spec.name(), "running local job");
        self.run(spec).map_err(|e| JobError::Failed {
            job: spec.name(),
            message: e.to_string(),
        })
    }
}

//! End-to-end orchestration over the in-memory store and the local runner.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use matrixgrid::{FsScratch, JobOrchestrator, LocalJobRunner, MatrixResource, NameAllocator};
use matrixgrid_core::config::AllocatorConfig;
use matrixgrid_core::error::{JobError, MatrixError};
use matrixgrid_core::job::JobSpec;
use matrixgrid_core::stubs::MemStore;
use matrixgrid_core::traits::{JobRunner, TabularStore};
use matrixgrid_core::types::MatrixVariant;

struct Fixture {
    store: Arc<MemStore>,
    allocator: NameAllocator,
    orchestrator: JobOrchestrator,
    scratch_root: TempDir,
}

fn fixture() -> Fixture {
    let store: Arc<MemStore> = Arc::new(MemStore::new());
    let allocator = NameAllocator::with_seed(store.clone(), AllocatorConfig::default(), 7);
    let scratch_root = TempDir::new().unwrap();
    let orchestrator = JobOrchestrator::new(
        store.clone(),
        Arc::new(LocalJobRunner::new(store.clone())),
        Arc::new(FsScratch::new()),
        scratch_root.path(),
    );
    Fixture {
        store,
        allocator,
        orchestrator,
        scratch_root,
    }
}

// | 1 -2 |
// | 0  4 |
// |-3  0 |
fn sample_matrix(f: &Fixture) -> MatrixResource {
    let m = MatrixResource::create(
        f.store.clone(),
        &f.allocator,
        "m",
        MatrixVariant::Dense,
        3,
        2,
    )
    .unwrap();
    m.set_cell(0, 0, 1.0).unwrap();
    m.set_cell(0, 1, -2.0).unwrap();
    m.set_cell(1, 1, 4.0).unwrap();
    m.set_cell(2, 0, -3.0).unwrap();
    m
}

fn is_empty_dir(dir: &Path) -> bool {
    fs::read_dir(dir).unwrap().next().is_none()
}

#[test]
fn all_four_norms_on_a_known_matrix() {
    let f = fixture();
    let m = sample_matrix(&f);

    assert_eq!(f.orchestrator.norm1(&m).unwrap(), 6.0);
    assert_eq!(f.orchestrator.norm_infinity(&m).unwrap(), 4.0);
    assert_eq!(f.orchestrator.norm_maxvalue(&m).unwrap(), 4.0);
    let expected = (1.0_f64 + 4.0 + 16.0 + 9.0).sqrt();
    assert_eq!(f.orchestrator.norm_frobenius(&m).unwrap(), expected);
}

#[test]
fn norm_scratch_is_removed_on_success() {
    let f = fixture();
    let m = sample_matrix(&f);
    f.orchestrator.norm1(&m).unwrap();
    assert!(is_empty_dir(f.scratch_root.path()));
}

/// Runner that produces output and then reports failure, the shape of a
/// job whose final task attempt dies after the reduce stage wrote.
struct FailingRunner;

impl JobRunner for FailingRunner {
    fn submit(&self, spec: &JobSpec) -> Result<(), JobError> {
        if let JobSpec::Norm { output_dir, .. } = spec {
            FsScratch::write_scalar(output_dir, 1.0).unwrap();
        }
        Err(JobError::Failed {
            job: spec.name(),
            message: "task attempt limit reached".into(),
        })
    }
}

#[test]
fn norm_scratch_is_removed_on_failure_too() {
    let f = fixture();
    let m = sample_matrix(&f);
    let scratch_root = TempDir::new().unwrap();
    let orchestrator = JobOrchestrator::new(
        f.store.clone(),
        Arc::new(FailingRunner),
        Arc::new(FsScratch::new()),
        scratch_root.path(),
    );

    let err = orchestrator.norm1(&m).unwrap_err();
    assert!(matches!(err, MatrixError::Job(JobError::Failed { .. })));
    assert!(is_empty_dir(scratch_root.path()));
}

#[test]
fn set_copies_cells_and_labels() {
    let f = fixture();
    let source = sample_matrix(&f);
    source.set_row_label(0, "first").unwrap();
    source.set_column_label(1, "weight").unwrap();

    let dest = MatrixResource::create(
        f.store.clone(),
        &f.allocator,
        "m",
        MatrixVariant::Dense,
        3,
        2,
    )
    .unwrap();
    f.orchestrator.set(&dest, &source).unwrap();

    for row in 0..3 {
        for column in 0..2 {
            assert_eq!(
                dest.get(row, column).unwrap(),
                source.get(row, column).unwrap()
            );
        }
    }
    assert_eq!(dest.row_label(0).unwrap(), Some("first".into()));
    assert_eq!(dest.column_label(1).unwrap(), Some("weight".into()));
    // Destination identity is preserved by the copy.
    assert_eq!(dest.reference_count().unwrap(), 1);
}

#[test]
fn set_scaled_multiplies_data_cells_only() {
    let f = fixture();
    let source = sample_matrix(&f);
    source.set_row_label(2, "bias").unwrap();

    let dest = MatrixResource::create(
        f.store.clone(),
        &f.allocator,
        "m",
        MatrixVariant::Dense,
        3,
        2,
    )
    .unwrap();
    f.orchestrator.set_scaled(&dest, -0.5, &source).unwrap();

    assert_eq!(dest.get(0, 0).unwrap(), -0.5);
    assert_eq!(dest.get(0, 1).unwrap(), 1.0);
    assert_eq!(dest.get(1, 1).unwrap(), -2.0);
    assert_eq!(dest.get(2, 0).unwrap(), 1.5);
    assert_eq!(dest.row_label(2).unwrap(), Some("bias".into()));
}

#[test]
fn transpose_returns_swapped_handle_and_leaves_source_alone() {
    let f = fixture();
    let source = sample_matrix(&f);

    let mut transposed = f.orchestrator.transpose(&source, &f.allocator).unwrap();
    assert_eq!(transposed.rows().unwrap(), 2);
    assert_eq!(transposed.columns().unwrap(), 3);
    assert_eq!(transposed.variant(), MatrixVariant::Dense);
    assert_ne!(transposed.path(), source.path());

    for row in 0..3 {
        for column in 0..2 {
            assert_eq!(
                transposed.get(column, row).unwrap(),
                source.get(row, column).unwrap()
            );
        }
    }

    // Source untouched.
    assert_eq!(source.rows().unwrap(), 3);
    assert_eq!(source.get(2, 0).unwrap(), -3.0);
    assert_eq!(source.reference_count().unwrap(), 1);

    // The result is a normal owned resource.
    let path = transposed.path().to_string();
    transposed.close().unwrap();
    assert!(!f.store.table_exists(&path).unwrap());
}

#[test]
fn failed_transpose_releases_the_destination() {
    let f = fixture();
    let source = sample_matrix(&f);
    let before = f.store.table_count();

    let orchestrator = JobOrchestrator::new(
        f.store.clone(),
        Arc::new(FailingRunner),
        Arc::new(FsScratch::new()),
        f.scratch_root.path(),
    );
    assert!(orchestrator.transpose(&source, &f.allocator).is_err());
    assert_eq!(f.store.table_count(), before);
}

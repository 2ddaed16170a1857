//! Full resource lifecycle against the RocksDB store binding.

use std::sync::Arc;

use tempfile::TempDir;

use matrixgrid::{FsScratch, JobOrchestrator, LocalJobRunner, MatrixResource, NameAllocator};
use matrixgrid_core::config::AllocatorConfig;
use matrixgrid_core::traits::TabularStore;
use matrixgrid_core::types::MatrixVariant;
use matrixgrid_storage::RocksTabularStore;

#[test]
fn lifecycle_and_jobs_over_rocksdb() {
    let db_dir = TempDir::new().unwrap();
    let scratch_root = TempDir::new().unwrap();
    let store: Arc<dyn TabularStore> =
        Arc::new(RocksTabularStore::open(db_dir.path().join("db")).unwrap());
    let allocator = NameAllocator::with_seed(store.clone(), AllocatorConfig::default(), 42);
    let orchestrator = JobOrchestrator::new(
        store.clone(),
        Arc::new(LocalJobRunner::new(store.clone())),
        Arc::new(FsScratch::new()),
        scratch_root.path(),
    );

    let m = MatrixResource::create(
        store.clone(),
        &allocator,
        "m",
        MatrixVariant::Dense,
        2,
        2,
    )
    .unwrap();
    m.set_cell(0, 0, 3.0).unwrap();
    m.set_cell(0, 1, -4.0).unwrap();
    m.set_cell(1, 0, 1.0).unwrap();

    assert_eq!(orchestrator.norm_frobenius(&m).unwrap(), 26.0_f64.sqrt());
    assert_eq!(orchestrator.norm_maxvalue(&m).unwrap(), 4.0);

    let mut transposed = orchestrator.transpose(&m, &allocator).unwrap();
    assert_eq!(transposed.get(1, 0).unwrap(), -4.0);

    // Alias survives the last close; an unaliased resource does not.
    m.save("checkpoint").unwrap();
    let aliased_path = m.path().to_string();
    let transposed_path = transposed.path().to_string();

    let mut m = m;
    m.close().unwrap();
    transposed.close().unwrap();

    assert!(store.table_exists(&aliased_path).unwrap());
    assert!(!store.table_exists(&transposed_path).unwrap());

    let reopened = MatrixResource::open_alias(store, "checkpoint").unwrap();
    assert_eq!(reopened.get(0, 1).unwrap(), -4.0);
    assert_eq!(reopened.rows().unwrap(), 2);
}

#[test]
fn resources_survive_reopening_the_database() {
    let db_dir = TempDir::new().unwrap();
    let path;
    {
        let store: Arc<dyn TabularStore> =
            Arc::new(RocksTabularStore::open(db_dir.path().join("db")).unwrap());
        let allocator = NameAllocator::with_seed(store.clone(), AllocatorConfig::default(), 9);
        let m = MatrixResource::create(
            store.clone(),
            &allocator,
            "m",
            MatrixVariant::Sparse,
            8,
            8,
        )
        .unwrap();
        m.set_cell(7, 7, 0.25).unwrap();
        path = m.path().to_string();
    }

    let store: Arc<dyn TabularStore> =
        Arc::new(RocksTabularStore::open(db_dir.path().join("db")).unwrap());
    let m = MatrixResource::open(store, &path).unwrap();
    assert_eq!(m.variant(), MatrixVariant::Sparse);
    assert_eq!(m.get(7, 7).unwrap(), 0.25);
    assert_eq!(m.get(0, 0).unwrap(), 0.0);
}

//! Client-side manager for matrix resources stored in a distributed
//! column-family store.
//!
//! The pieces compose around the [`TabularStore`] seam from
//! `matrixgrid-core`:
//!
//! * [`NameAllocator`] hands out collision-checked table paths.
//! * [`MatrixResource`] is the open handle: creation, metadata, cells,
//!   labels, reference counting, aliases, and close-time reclamation.
//! * [`AliasRegistry`] binds human-chosen names that keep a resource alive.
//! * [`JobOrchestrator`] runs norm, copy, and transpose jobs through a
//!   [`JobRunner`], with [`LocalJobRunner`] executing them in-process.
//!
//! [`TabularStore`]: matrixgrid_core::traits::TabularStore
//! [`JobRunner`]: matrixgrid_core::traits::JobRunner

pub mod alias;
pub mod allocator;
pub mod jobs;
pub mod orchestrator;
pub mod refcount;
pub mod resource;

pub use alias::AliasRegistry;
pub use allocator::NameAllocator;
pub use jobs::{FsScratch, LocalJobRunner};
pub use orchestrator::JobOrchestrator;
pub use refcount::ReferenceCounter;
pub use resource::MatrixResource;

//! Core types and trait seams for the matrixgrid resource manager.
//!
//! A matrix is a named resource inside a shared, table-oriented
//! column-family store. This crate defines everything the manager and its
//! backends agree on:
//!
//! - the persisted layout (families, reserved rows, cell encodings) in
//!   [`layout`],
//! - the data model ([`types`]) and job descriptions ([`job`]),
//! - the error taxonomy ([`error`]),
//! - configuration ([`config`]),
//! - the [`TabularStore`], [`JobRunner`], and [`ScratchSpace`] trait seams
//!   ([`traits`]),
//! - in-memory stubs for tests ([`stubs`]).
//!
//! The store and the batch-job substrate are external collaborators; this
//! workspace binds to them behind traits and never implements either engine.

pub mod config;
pub mod error;
pub mod job;
pub mod layout;
pub mod stubs;
pub mod traits;
pub mod types;

pub use error::{AllocError, JobError, MatrixError, Result, StoreError};
pub use job::{JobSpec, NormKind};
pub use traits::{JobRunner, ScratchSpace, TabularStore};
pub use types::{MatrixVariant, RowUpdate, ScannedCell, TableSchema};

//! In-memory stub implementations of the trait seams, for tests.
//!
//! Everything here trades fidelity for determinism: no persistence, full
//! scans, plain maps behind locks. Production deployments bind the traits
//! to a real store instead.

mod mem_store;

pub use mem_store::MemStore;

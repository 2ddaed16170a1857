//! Job execution support: filesystem scratch space and the local runner.

mod local;
mod scratch;

pub use local::LocalJobRunner;
pub use scratch::{FsScratch, RESULT_FILE};

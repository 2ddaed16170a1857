//! Local RocksDB binding of the `TabularStore` trait.
//!
//! A single-node stand-in for the distributed column-family store: one
//! RocksDB database, one column family per `(table, family)` pair, and a
//! catalog column family recording table existence and enabled/disabled
//! state. The manager above the trait cannot tell it apart from a cluster:
//! this crate binds an engine, it does not implement one.

mod column_families;
mod config;
mod keys;
mod rocks_store;

pub use column_families::CATALOG_CF;
pub use config::RocksConfig;
pub use rocks_store::RocksTabularStore;

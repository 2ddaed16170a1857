//! Column family naming and option builders.
//!
//! Each matrix table maps to one column family per schema family, named
//! `table/family`. Table names never contain `/` (allocator suffixes are
//! alphanumeric, reserved tables start with `!`), so the mapping is
//! unambiguous. The catalog CF holds one entry per table with its enabled
//! state and family list.

use rocksdb::{BlockBasedOptions, Cache, Options};
use serde::{Deserialize, Serialize};

/// Catalog column family: table name -> [`CatalogEntry`] (JSON).
pub const CATALOG_CF: &str = "!catalog";

/// Separator between table and family in a CF name.
pub const CF_SEPARATOR: char = '/';

/// Per-table bookkeeping stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Administrative enabled/disabled state.
    pub enabled: bool,
    /// Families the table was created with, in schema order.
    pub families: Vec<String>,
}

/// Compose the CF name for a `(table, family)` pair.
pub fn cf_name(table: &str, family: &str) -> String {
    format!("{table}{CF_SEPARATOR}{family}")
}

/// Options for data-bearing cell CFs.
///
/// Point lookups dominate (metadata reads, single-cell get/put); scans only
/// happen in jobs. Shared block cache, bloom filter, LZ4.
pub fn cell_cf_options(cache: &Cache) -> Options {
    let mut block_opts = BlockBasedOptions::default();
    block_opts.set_block_cache(cache);
    block_opts.set_bloom_filter(10.0, false);
    block_opts.set_cache_index_and_filter_blocks(true);

    let mut opts = Options::default();
    opts.set_block_based_table_factory(&block_opts);
    opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
    opts.create_if_missing(true);
    opts
}

/// Options for the catalog CF (tiny, point lookups only).
pub fn catalog_cf_options(cache: &Cache) -> Options {
    let mut block_opts = BlockBasedOptions::default();
    block_opts.set_block_cache(cache);
    block_opts.set_bloom_filter(10.0, false);

    let mut opts = Options::default();
    opts.set_block_based_table_factory(&block_opts);
    opts.set_compression_type(rocksdb::DBCompressionType::None);
    opts.create_if_missing(true);
    opts
}

//! `RocksTabularStore`: the RocksDB-backed store binding.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rocksdb::{BoundColumnFamily, Cache, ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, DB};
use tracing::{debug, info};

use matrixgrid_core::error::StoreError;
use matrixgrid_core::traits::TabularStore;
use matrixgrid_core::types::{RowUpdate, ScannedCell, TableSchema};

use crate::column_families::{
    catalog_cf_options, cell_cf_options, cf_name, CatalogEntry, CATALOG_CF,
};
use crate::config::RocksConfig;
use crate::keys::{decode_cell_key, encode_cell_key};

fn store_err(e: rocksdb::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

/// RocksDB-backed [`TabularStore`].
///
/// Thread-safe: RocksDB handles concurrent cell reads and writes; table
/// admin operations (create/delete, catalog read-modify-write) serialize on
/// an internal lock so concurrent creates of the same path cannot interleave.
pub struct RocksTabularStore {
    db: DB,
    // Shared block cache, kept alive for the DB lifetime and reused when
    // new column families are created.
    cache: Cache,
    admin: Mutex<()>,
    path: String,
}

impl RocksTabularStore {
    /// Open (or create) a database at `path` with default configuration.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::open_with_config(path, RocksConfig::default())
    }

    /// Open (or create) a database at `path`.
    ///
    /// Re-opens every column family recorded in an existing database, so
    /// tables survive process restarts.
    pub fn open_with_config<P: AsRef<Path>>(
        path: P,
        config: RocksConfig,
    ) -> Result<Self, StoreError> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let cache = Cache::new_lru_cache(config.block_cache_size);

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);
        db_opts.set_max_open_files(config.max_open_files);

        // A fresh database lists no column families.
        let existing = DB::list_cf(&db_opts, &path_str).unwrap_or_default();
        let mut descriptors: Vec<ColumnFamilyDescriptor> = existing
            .iter()
            .map(|name| {
                let opts = if name == CATALOG_CF {
                    catalog_cf_options(&cache)
                } else {
                    cell_cf_options(&cache)
                };
                ColumnFamilyDescriptor::new(name, opts)
            })
            .collect();
        if !existing.iter().any(|n| n == CATALOG_CF) {
            descriptors.push(ColumnFamilyDescriptor::new(
                CATALOG_CF,
                catalog_cf_options(&cache),
            ));
        }

        let db = DB::open_cf_descriptors(&db_opts, &path_str, descriptors).map_err(store_err)?;
        info!(path = %path_str, "opened tabular store");

        Ok(Self {
            db,
            cache,
            admin: Mutex::new(()),
            path: path_str,
        })
    }

    /// Filesystem path of the database.
    pub fn path(&self) -> &str {
        &self.path
    }

    fn catalog(&self) -> Result<Arc<BoundColumnFamily<'_>>, StoreError> {
        self.db
            .cf_handle(CATALOG_CF)
            .ok_or_else(|| StoreError::Unavailable("catalog column family missing".to_string()))
    }

    fn read_entry(&self, table: &str) -> Result<Option<CatalogEntry>, StoreError> {
        let catalog = self.catalog()?;
        match self.db.get_cf(&catalog, table.as_bytes()).map_err(store_err)? {
            None => Ok(None),
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| StoreError::Corrupt(format!("catalog entry for '{table}': {e}"))),
        }
    }

    fn write_entry(&self, table: &str, entry: &CatalogEntry) -> Result<(), StoreError> {
        let catalog = self.catalog()?;
        let bytes = serde_json::to_vec(entry)
            .map_err(|e| StoreError::Unavailable(format!("catalog encode: {e}")))?;
        self.db
            .put_cf(&catalog, table.as_bytes(), bytes)
            .map_err(store_err)
    }

    fn require_entry(&self, table: &str) -> Result<CatalogEntry, StoreError> {
        self.read_entry(table)?
            .ok_or_else(|| StoreError::MissingTable(table.to_string()))
    }

    /// Resolve the CF holding cells of `(table, family)`, with precise
    /// errors when either half is unknown.
    fn cell_cf(&self, table: &str, family: &str) -> Result<Arc<BoundColumnFamily<'_>>, StoreError> {
        if let Some(cf) = self.db.cf_handle(&cf_name(table, family)) {
            return Ok(cf);
        }
        let entry = self.require_entry(table)?;
        if entry.families.iter().any(|f| f == family) {
            Err(StoreError::Unavailable(format!(
                "column family '{}' vanished",
                cf_name(table, family)
            )))
        } else {
            Err(StoreError::MissingFamily {
                table: table.to_string(),
                family: family.to_string(),
            })
        }
    }
}

impl TabularStore for RocksTabularStore {
    fn table_exists(&self, table: &str) -> Result<bool, StoreError> {
        Ok(self.read_entry(table)?.is_some())
    }

    fn create_table(&self, schema: &TableSchema) -> Result<(), StoreError> {
        let _guard = self.admin.lock();
        if self.read_entry(&schema.path)?.is_some() {
            return Err(StoreError::TableExists(schema.path.clone()));
        }
        for family in &schema.families {
            let opts = cell_cf_options(&self.cache);
            self.db
                .create_cf(cf_name(&schema.path, family), &opts)
                .map_err(store_err)?;
        }
        self.write_entry(
            &schema.path,
            &CatalogEntry {
                enabled: true,
                families: schema.families.clone(),
            },
        )?;
        info!(table = %schema.path, families = schema.families.len(), "created table");
        Ok(())
    }

    fn delete_table(&self, table: &str) -> Result<(), StoreError> {
        let _guard = self.admin.lock();
        let entry = self.require_entry(table)?;
        if entry.enabled {
            return Err(StoreError::TableEnabled(table.to_string()));
        }
        for family in &entry.families {
            self.db.drop_cf(&cf_name(table, family)).map_err(store_err)?;
        }
        let catalog = self.catalog()?;
        self.db
            .delete_cf(&catalog, table.as_bytes())
            .map_err(store_err)?;
        info!(table = %table, "deleted table");
        Ok(())
    }

    fn enable_table(&self, table: &str) -> Result<(), StoreError> {
        let _guard = self.admin.lock();
        let mut entry = self.require_entry(table)?;
        entry.enabled = true;
        self.write_entry(table, &entry)
    }

    fn disable_table(&self, table: &str) -> Result<(), StoreError> {
        let _guard = self.admin.lock();
        let mut entry = self.require_entry(table)?;
        entry.enabled = false;
        self.write_entry(table, &entry)?;
        debug!(table = %table, "disabled table");
        Ok(())
    }

    fn is_table_enabled(&self, table: &str) -> Result<bool, StoreError> {
        Ok(self.require_entry(table)?.enabled)
    }

    fn get(
        &self,
        table: &str,
        row: &[u8],
        family: &str,
        qualifier: &[u8],
    ) -> Result<Option<Vec<u8>>, StoreError> {
        let cf = self.cell_cf(table, family)?;
        self.db
            .get_cf(&cf, encode_cell_key(row, qualifier))
            .map_err(store_err)
    }

    fn put(
        &self,
        table: &str,
        row: &[u8],
        family: &str,
        qualifier: &[u8],
        value: &[u8],
    ) -> Result<(), StoreError> {
        let cf = self.cell_cf(table, family)?;
        self.db
            .put_cf(&cf, encode_cell_key(row, qualifier), value)
            .map_err(store_err)
    }

    fn commit(&self, table: &str, update: RowUpdate) -> Result<(), StoreError> {
        let mut batch = WriteBatch::default();
        for (family, qualifier, value) in &update.cells {
            let cf = self.cell_cf(table, family)?;
            batch.put_cf(&cf, encode_cell_key(&update.row, qualifier), value);
        }
        self.db.write(batch).map_err(store_err)
    }

    fn scan(&self, table: &str, families: &[&str]) -> Result<Vec<ScannedCell>, StoreError> {
        let mut cells = Vec::new();
        for family in families {
            let cf = self.cell_cf(table, family)?;
            for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
                let (key, value) = item.map_err(store_err)?;
                let (row, qualifier) = decode_cell_key(&key)?;
                cells.push(ScannedCell {
                    row,
                    family: (*family).to_string(),
                    qualifier,
                    value: value.to_vec(),
                });
            }
        }
        // Per-CF iteration orders by encoded key; re-establish global row
        // order across families.
        cells.sort_by(|a, b| {
            (&a.row, &a.family, &a.qualifier).cmp(&(&b.row, &b.family, &b.qualifier))
        });
        Ok(cells)
    }
}

//! In-memory `TabularStore` for unit and integration tests.
//!
//! A thread-safe map of tables, each a sorted map of cells. Failure
//! injection covers the one retryable path the manager must handle:
//! transient region errors while disabling a table.

use std::collections::{BTreeMap, HashMap};

use parking_lot::{Mutex, RwLock};

use crate::error::StoreError;
use crate::traits::TabularStore;
use crate::types::{RowUpdate, ScannedCell, TableSchema};

type CellKey = (Vec<u8>, String, Vec<u8>);

#[derive(Debug, Default)]
struct MemTable {
    enabled: bool,
    families: Vec<String>,
    cells: BTreeMap<CellKey, Vec<u8>>,
}

/// In-memory, thread-safe [`TabularStore`].
///
/// Cells are kept in row-key order so `scan` matches the ordering contract
/// of a real column-family store.
#[derive(Debug, Default)]
pub struct MemStore {
    tables: RwLock<HashMap<String, MemTable>>,
    // table -> remaining number of disable calls that fail transiently
    transient_disables: Mutex<HashMap<String, u32>>,
}

impl MemStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` `disable_table` calls on `table` fail with
    /// [`StoreError::TransientRegion`].
    pub fn inject_transient_disable(&self, table: &str, count: u32) {
        self.transient_disables
            .lock()
            .insert(table.to_string(), count);
    }

    /// Number of tables currently present.
    pub fn table_count(&self) -> usize {
        self.tables.read().len()
    }

    fn check_family(table: &MemTable, name: &str, family: &str) -> Result<(), StoreError> {
        if table.families.iter().any(|f| f == family) {
            Ok(())
        } else {
            Err(StoreError::MissingFamily {
                table: name.to_string(),
                family: family.to_string(),
            })
        }
    }
}

impl TabularStore for MemStore {
    fn table_exists(&self, table: &str) -> Result<bool, StoreError> {
        Ok(self.tables.read().contains_key(table))
    }

    fn create_table(&self, schema: &TableSchema) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        if tables.contains_key(&schema.path) {
            return Err(StoreError::TableExists(schema.path.clone()));
        }
        tables.insert(
            schema.path.clone(),
            MemTable {
                enabled: true,
                families: schema.families.clone(),
                cells: BTreeMap::new(),
            },
        );
        Ok(())
    }

    fn delete_table(&self, table: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        match tables.get(table) {
            None => Err(StoreError::MissingTable(table.to_string())),
            Some(t) if t.enabled => Err(StoreError::TableEnabled(table.to_string())),
            Some(_) => {
                tables.remove(table);
                Ok(())
            }
        }
    }

    fn enable_table(&self, table: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        let t = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::MissingTable(table.to_string()))?;
        t.enabled = true;
        Ok(())
    }

    fn disable_table(&self, table: &str) -> Result<(), StoreError> {
        {
            let mut injected = self.transient_disables.lock();
            if let Some(remaining) = injected.get_mut(table) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(StoreError::TransientRegion {
                        table: table.to_string(),
                        message: "injected region split".to_string(),
                    });
                }
            }
        }
        let mut tables = self.tables.write();
        let t = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::MissingTable(table.to_string()))?;
        t.enabled = false;
        Ok(())
    }

    fn is_table_enabled(&self, table: &str) -> Result<bool, StoreError> {
        self.tables
            .read()
            .get(table)
            .map(|t| t.enabled)
            .ok_or_else(|| StoreError::MissingTable(table.to_string()))
    }

    fn get(
        &self,
        table: &str,
        row: &[u8],
        family: &str,
        qualifier: &[u8],
    ) -> Result<Option<Vec<u8>>, StoreError> {
        let tables = self.tables.read();
        let t = tables
            .get(table)
            .ok_or_else(|| StoreError::MissingTable(table.to_string()))?;
        Self::check_family(t, table, family)?;
        let key = (row.to_vec(), family.to_string(), qualifier.to_vec());
        Ok(t.cells.get(&key).cloned())
    }

    fn put(
        &self,
        table: &str,
        row: &[u8],
        family: &str,
        qualifier: &[u8],
        value: &[u8],
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        let t = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::MissingTable(table.to_string()))?;
        Self::check_family(t, table, family)?;
        t.cells.insert(
            (row.to_vec(), family.to_string(), qualifier.to_vec()),
            value.to_vec(),
        );
        Ok(())
    }

    fn commit(&self, table: &str, update: RowUpdate) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        let t = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::MissingTable(table.to_string()))?;
        for (family, _, _) in &update.cells {
            Self::check_family(t, table, family)?;
        }
        for (family, qualifier, value) in update.cells {
            t.cells.insert((update.row.clone(), family, qualifier), value);
        }
        Ok(())
    }

    fn scan(&self, table: &str, families: &[&str]) -> Result<Vec<ScannedCell>, StoreError> {
        let tables = self.tables.read();
        let t = tables
            .get(table)
            .ok_or_else(|| StoreError::MissingTable(table.to_string()))?;
        Ok(t.cells
            .iter()
            .filter(|((_, family, _), _)| families.iter().any(|f| f == family))
            .map(|((row, family, qualifier), value)| ScannedCell {
                row: row.clone(),
                family: family.clone(),
                qualifier: qualifier.clone(),
                value: value.clone(),
            })
            .collect())
    }
}

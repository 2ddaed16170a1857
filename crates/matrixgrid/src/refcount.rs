//! Persisted reference counting on a resource's metadata record.
//!
//! The count is a plain read-modify-write pair against the shared store:
//! read the current value (absent reads as zero), adjust by one with a
//! floor of zero on decrement, write back. The store surface offers no
//! compare-and-swap, so two processes adjusting the same counter
//! concurrently can both observe the same pre-image and write a lost
//! update, and two closers may both observe zero and race toward deletion.
//! Owners of a shared resource coordinate handle lifetime themselves; the
//! alias mechanism protects resources whose ownership is diffuse.

use matrixgrid_core::error::Result;
use matrixgrid_core::layout::{self, families, qualifiers, rows};
use matrixgrid_core::traits::TabularStore;

/// Read-modify-write reference counting for one table.
pub struct ReferenceCounter<'a> {
    store: &'a dyn TabularStore,
    table: &'a str,
}

impl<'a> ReferenceCounter<'a> {
    /// Counter over `table`'s metadata record.
    pub fn new(store: &'a dyn TabularStore, table: &'a str) -> Self {
        Self { store, table }
    }

    /// Current reference count; an absent cell reads as zero.
    pub fn get(&self) -> Result<i32> {
        let cell = self
            .store
            .get(self.table, rows::METADATA, families::META, qualifiers::REFERENCE)?;
        match cell {
            None => Ok(0),
            Some(bytes) => Ok(layout::decode_i32(&bytes)?),
        }
    }

    /// Overwrite the count.
    pub fn set(&self, reference: i32) -> Result<()> {
        self.store.put(
            self.table,
            rows::METADATA,
            families::META,
            qualifiers::REFERENCE,
            &layout::encode_i32(reference),
        )?;
        Ok(())
    }

    /// Add one owner and return the new count.
    pub fn increment_and_get(&self) -> Result<i32> {
        let reference = self.get()? + 1;
        self.set(reference)?;
        Ok(reference)
    }

    /// Remove one owner and return the new count, floored at zero.
    pub fn decrement_and_get(&self) -> Result<i32> {
        let current = self.get()?;
        let reference = if current > 0 { current - 1 } else { 0 };
        self.set(reference)?;
        Ok(reference)
    }

    /// Whether an alias cell protects this table from deletion.
    pub fn has_alias(&self) -> Result<bool> {
        Ok(self
            .store
            .get(self.table, rows::METADATA, families::META, qualifiers::ALIASNAME)?
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matrixgrid_core::stubs::MemStore;
    use matrixgrid_core::types::TableSchema;

    fn store_with_table(path: &str) -> MemStore {
        let store = MemStore::new();
        store.create_table(&TableSchema::matrix(path)).unwrap();
        store
    }

    #[test]
    fn absent_reference_reads_zero() {
        let store = store_with_table("m_a");
        let counter = ReferenceCounter::new(&store, "m_a");
        assert_eq!(counter.get().unwrap(), 0);
    }

    #[test]
    fn increment_decrement_arithmetic() {
        let store = store_with_table("m_a");
        let counter = ReferenceCounter::new(&store, "m_a");

        counter.set(1).unwrap();
        assert_eq!(counter.increment_and_get().unwrap(), 2);
        assert_eq!(counter.increment_and_get().unwrap(), 3);
        assert_eq!(counter.decrement_and_get().unwrap(), 2);
        assert_eq!(counter.get().unwrap(), 2);
    }

    #[test]
    fn decrement_floors_at_zero() {
        let store = store_with_table("m_a");
        let counter = ReferenceCounter::new(&store, "m_a");
        assert_eq!(counter.decrement_and_get().unwrap(), 0);
        assert_eq!(counter.decrement_and_get().unwrap(), 0);
        assert_eq!(counter.get().unwrap(), 0);
    }

    #[test]
    fn refcount_property_holds() {
        // After create (reference = 1), N increments and K decrements yield
        // max(0, 1 + N - K).
        for (n, k) in [(0u32, 0u32), (3, 1), (2, 3), (0, 1), (4, 5)] {
            let store = store_with_table("m_a");
            let counter = ReferenceCounter::new(&store, "m_a");
            counter.set(1).unwrap();
            for _ in 0..n {
                counter.increment_and_get().unwrap();
            }
            for _ in 0..k {
                counter.decrement_and_get().unwrap();
            }
            let expected = (1 + n as i32 - k as i32).max(0);
            assert_eq!(counter.get().unwrap(), expected, "N={n} K={k}");
        }
    }

    #[test]
    fn alias_cell_presence() {
        let store = store_with_table("m_a");
        let counter = ReferenceCounter::new(&store, "m_a");
        assert!(!counter.has_alias().unwrap());

        store
            .put("m_a", rows::METADATA, families::META, qualifiers::ALIASNAME, b"shared")
            .unwrap();
        assert!(counter.has_alias().unwrap());
    }
}

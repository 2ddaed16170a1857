//! Alias bindings: human-chosen secondary names for matrix resources.
//!
//! Bindings live in a reserved registry table outside the individual
//! resource, so an alias survives every handle and keeps the resource alive
//! regardless of its reference count. One alias per resource; rebinding an
//! alias that already resolves to a different path is an error, never a
//! silent steal.

use std::sync::Arc;

use matrixgrid_core::error::{MatrixError, Result, StoreError};
use matrixgrid_core::layout::families;
use matrixgrid_core::traits::TabularStore;
use matrixgrid_core::types::TableSchema;

/// Reserved table holding alias -> path rows.
pub const REGISTRY_TABLE: &str = "!aliases";

const PATH_QUALIFIER: &[u8] = b"path";

/// Persistent alias -> path registry.
pub struct AliasRegistry {
    store: Arc<dyn TabularStore>,
}

impl AliasRegistry {
    /// Registry over `store`, creating the reserved table on first use.
    pub fn new(store: Arc<dyn TabularStore>) -> Self {
        Self { store }
    }

    fn ensure_registry(&self) -> Result<()> {
        if !self.store.table_exists(REGISTRY_TABLE)? {
            let schema = TableSchema {
                path: REGISTRY_TABLE.to_string(),
                families: vec![families::ALIAS.to_string()],
            };
            match self.store.create_table(&schema) {
                Ok(()) => {}
                // Another client won the creation race; the registry exists.
                Err(StoreError::TableExists(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Bind `alias` to `path`.
    ///
    /// Binding the same pair again is a no-op.
    ///
    /// # Errors
    /// * [`MatrixError::AliasTaken`] if the alias resolves to another path.
    pub fn bind(&self, alias: &str, path: &str) -> Result<()> {
        self.ensure_registry()?;
        if let Some(bound_to) = self.resolve(alias)? {
            if bound_to != path {
                return Err(MatrixError::AliasTaken {
                    alias: alias.to_string(),
                    bound_to,
                });
            }
            return Ok(());
        }
        self.store.put(
            REGISTRY_TABLE,
            alias.as_bytes(),
            families::ALIAS,
            PATH_QUALIFIER,
            path.as_bytes(),
        )?;
        Ok(())
    }

    /// Path an alias resolves to, if bound.
    pub fn resolve(&self, alias: &str) -> Result<Option<String>> {
        if !self.store.table_exists(REGISTRY_TABLE)? {
            return Ok(None);
        }
        let cell = self
            .store
            .get(REGISTRY_TABLE, alias.as_bytes(), families::ALIAS, PATH_QUALIFIER)?;
        Ok(cell.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matrixgrid_core::stubs::MemStore;

    #[test]
    fn bind_and_resolve() {
        let store = Arc::new(MemStore::new());
        let registry = AliasRegistry::new(store);
        assert_eq!(registry.resolve("weights").unwrap(), None);

        registry.bind("weights", "m_abcde").unwrap();
        assert_eq!(registry.resolve("weights").unwrap(), Some("m_abcde".into()));
    }

    #[test]
    fn rebinding_same_pair_is_idempotent() {
        let store = Arc::new(MemStore::new());
        let registry = AliasRegistry::new(store);
        registry.bind("weights", "m_abcde").unwrap();
        registry.bind("weights", "m_abcde").unwrap();
    }

    #[test]
    fn alias_steal_is_rejected() {
        let store = Arc::new(MemStore::new());
        let registry = AliasRegistry::new(store);
        registry.bind("weights", "m_abcde").unwrap();

        let err = registry.bind("weights", "m_other").unwrap_err();
        assert!(matches!(
            err,
            MatrixError::AliasTaken { bound_to, .. } if bound_to == "m_abcde"
        ));
    }

    #[test]
    fn registry_table_is_created_lazily() {
        let store: Arc<MemStore> = Arc::new(MemStore::new());
        let registry = AliasRegistry::new(store.clone());
        assert!(!store.table_exists(REGISTRY_TABLE).unwrap());
        registry.bind("a", "m_x").unwrap();
        assert!(store.table_exists(REGISTRY_TABLE).unwrap());
    }
}

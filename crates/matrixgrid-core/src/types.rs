//! Data model shared by the manager and its backends.

use serde::{Deserialize, Serialize};

use crate::error::MatrixError;
use crate::layout::families;

/// Concrete matrix variant, chosen explicitly at creation time and carried
/// on the handle.
///
/// The tag is persisted in the write-once `type` metadata cell; `open`
/// parses it back exactly once. No operation infers the variant from a
/// reduction result or any other stored string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatrixVariant {
    /// Dense row storage: every column of every row may hold a cell.
    Dense,
    /// Sparse row storage: absent cells read as zero.
    Sparse,
}

impl MatrixVariant {
    /// Stable tag persisted in the `type` cell.
    pub fn tag(&self) -> &'static str {
        match self {
            MatrixVariant::Dense => "dense",
            MatrixVariant::Sparse => "sparse",
        }
    }

    /// Parse a stored tag. Unknown tags fail fast.
    pub fn from_tag(tag: &[u8]) -> Result<Self, MatrixError> {
        match tag {
            b"dense" => Ok(MatrixVariant::Dense),
            b"sparse" => Ok(MatrixVariant::Sparse),
            other => Err(MatrixError::UnknownVariant(
                String::from_utf8_lossy(other).into_owned(),
            )),
        }
    }
}

/// Schema of a matrix table: its path plus the families to define.
///
/// Creation is all-or-nothing; the existence check in the resource layer
/// gates the entire family-definition step, so a failed create leaves no
/// partial schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Unique table path.
    pub path: String,
    /// Family names to define, in order.
    pub families: Vec<String>,
}

impl TableSchema {
    /// The standard matrix schema with all fixed families.
    pub fn matrix(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            families: families::ALL.iter().map(|f| (*f).to_string()).collect(),
        }
    }
}

/// A batched multi-cell commit against a single row.
///
/// Mirrors the store's batched commit surface: cells accumulate and are
/// written atomically by [`TabularStore::commit`](crate::traits::TabularStore::commit).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowUpdate {
    /// Row key the update targets.
    pub row: Vec<u8>,
    /// `(family, qualifier, value)` cells to write.
    pub cells: Vec<(String, Vec<u8>, Vec<u8>)>,
}

impl RowUpdate {
    /// Start an update for `row`.
    pub fn new(row: impl Into<Vec<u8>>) -> Self {
        Self {
            row: row.into(),
            cells: Vec::new(),
        }
    }

    /// Queue one cell write.
    pub fn put(
        mut self,
        family: &str,
        qualifier: impl Into<Vec<u8>>,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        self.cells
            .push((family.to_string(), qualifier.into(), value.into()));
        self
    }

    /// Whether the update carries no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// One cell produced by a table scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedCell {
    /// Row key.
    pub row: Vec<u8>,
    /// Family the cell belongs to.
    pub family: String,
    /// Qualifier within the family.
    pub qualifier: Vec<u8>,
    /// Stored value.
    pub value: Vec<u8>,
}

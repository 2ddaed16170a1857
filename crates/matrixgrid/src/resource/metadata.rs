//! Metadata, cell, and label access on an open resource.
//!
//! Absent-cell policy, applied uniformly: dimension cells are mandatory
//! (an absent `rows` or `columns` cell is an error; both fields follow the
//! same rule), numeric data cells read as zero (a sparse row simply has no cell
//! for most columns, and dense writers populate what they mean to), and
//! labels are genuinely optional.

use matrixgrid_core::error::{MatrixError, Result};
use matrixgrid_core::layout::{self, families, qualifiers, rows};
use matrixgrid_core::types::RowUpdate;

use super::MatrixResource;

impl MatrixResource {
    fn metadata_u32(&self, qualifier: &'static [u8], field: &'static str) -> Result<u32> {
        self.ensure_open()?;
        let cell = self
            .store()
            .get(self.path(), rows::METADATA, families::META, qualifier)?
            .ok_or(MatrixError::MissingMetadata {
                field,
                table: self.path().to_string(),
            })?;
        Ok(layout::decode_u32(&cell)?)
    }

    /// Row count. Mandatory metadata; absent is an error.
    pub fn rows(&self) -> Result<u32> {
        self.metadata_u32(qualifiers::ROWS, "rows")
    }

    /// Column count. Mandatory metadata; absent is an error.
    pub fn columns(&self) -> Result<u32> {
        self.metadata_u32(qualifiers::COLUMNS, "columns")
    }

    /// Overwrite both dimension cells in one batched commit.
    pub fn set_dimension(&self, rows_count: u32, columns_count: u32) -> Result<()> {
        self.ensure_open()?;
        let update = RowUpdate::new(rows::METADATA)
            .put(families::META, qualifiers::ROWS, layout::encode_u32(rows_count))
            .put(
                families::META,
                qualifiers::COLUMNS,
                layout::encode_u32(columns_count),
            );
        self.store().commit(self.path(), update)?;
        Ok(())
    }

    /// Read one numeric cell; an absent cell reads as zero.
    pub fn get(&self, row: u32, column: u32) -> Result<f64> {
        self.ensure_open()?;
        let cell = self.store().get(
            self.path(),
            &layout::row_key(row),
            families::DATA,
            &layout::column_qualifier(column),
        )?;
        match cell {
            None => Ok(0.0),
            Some(bytes) => Ok(layout::decode_f64(&bytes)?),
        }
    }

    /// Write one numeric cell.
    pub fn set_cell(&self, row: u32, column: u32, value: f64) -> Result<()> {
        self.ensure_open()?;
        self.store().put(
            self.path(),
            &layout::row_key(row),
            families::DATA,
            &layout::column_qualifier(column),
            &layout::encode_f64(value),
        )?;
        Ok(())
    }

    /// Accumulate into one numeric cell (read-modify-write).
    pub fn add(&self, row: u32, column: u32, value: f64) -> Result<()> {
        let current = self.get(row, column)?;
        self.set_cell(row, column, current + value)
    }

    /// Label attached to a row, if any.
    pub fn row_label(&self, row: u32) -> Result<Option<String>> {
        self.ensure_open()?;
        let cell = self.store().get(
            self.path(),
            &layout::row_key(row),
            families::ATTR,
            qualifiers::LABEL,
        )?;
        Ok(cell.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Attach a label to a row.
    pub fn set_row_label(&self, row: u32, label: &str) -> Result<()> {
        self.ensure_open()?;
        self.store().put(
            self.path(),
            &layout::row_key(row),
            families::ATTR,
            qualifiers::LABEL,
            label.as_bytes(),
        )?;
        Ok(())
    }

    /// Label attached to a column, if any. Column labels live in the
    /// dedicated index row.
    pub fn column_label(&self, column: u32) -> Result<Option<String>> {
        self.ensure_open()?;
        let cell = self.store().get(
            self.path(),
            rows::CINDEX,
            families::ATTR,
            &layout::column_qualifier(column),
        )?;
        Ok(cell.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Attach a label to a column.
    pub fn set_column_label(&self, column: u32, label: &str) -> Result<()> {
        self.ensure_open()?;
        self.store().put(
            self.path(),
            rows::CINDEX,
            families::ATTR,
            &layout::column_qualifier(column),
            label.as_bytes(),
        )?;
        Ok(())
    }
}

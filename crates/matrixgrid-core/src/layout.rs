//! Persisted layout of a matrix table.
//!
//! Row key -> family:qualifier -> value, with everything the manager and the
//! backends must agree on in one place:
//!
//! | Row | Family | Qualifier | Value |
//! |-----|--------|-----------|-------|
//! | `!metadata` | `meta` | `rows` / `columns` | u32 BE |
//! | `!metadata` | `meta` | `reference` | i32 BE |
//! | `!metadata` | `meta` | `aliasname` | bytes (optional) |
//! | `!metadata` | `meta` | `type` | variant tag, write-once |
//! | row index (u32 BE) | `data` | column index (u32 BE) | f64 BE |
//! | row index (u32 BE) | `attr` | `label` | row label |
//! | `!cindex` | `attr` | column index (u32 BE) | column label |
//!
//! Reserved row keys start with `!`, which no 4-byte big-endian row index of
//! a matrix below 2^29 rows can produce as its first byte.

use crate::error::StoreError;

/// Column family names. Every matrix table defines all of them at creation.
pub mod families {
    /// Metadata record (dimensions, reference count, alias, type).
    pub const META: &str = "meta";
    /// Numeric data cells keyed by column index.
    pub const DATA: &str = "data";
    /// Row/column attribute cells (labels).
    pub const ATTR: &str = "attr";
    /// Alias marker cells.
    pub const ALIAS: &str = "alias";
    /// Temporary block data used by blocked multiplication jobs.
    pub const BLOCK: &str = "block";
    /// Eigenvalue scratch (reserved for decomposition jobs).
    pub const EI: &str = "ei";
    /// Eigenvector column scratch (reserved for decomposition jobs).
    pub const EICOL: &str = "eicol";
    /// Eigenvector scratch (reserved for decomposition jobs).
    pub const EIVEC: &str = "eivec";

    /// All families of a matrix table, in schema order.
    pub const ALL: &[&str] = &[META, DATA, ATTR, ALIAS, BLOCK, EI, EICOL, EIVEC];

    /// Families copied by the cell-copy (`set`) job.
    pub const COPIED: &[&str] = &[DATA, ATTR, ALIAS, BLOCK];
}

/// Reserved row keys.
pub mod rows {
    /// The single metadata record of a table.
    pub const METADATA: &[u8] = b"!metadata";
    /// The per-column label index row.
    pub const CINDEX: &[u8] = b"!cindex";
}

/// Metadata and attribute qualifiers.
pub mod qualifiers {
    /// Row count, u32 BE. Mandatory after creation.
    pub const ROWS: &[u8] = b"rows";
    /// Column count, u32 BE. Mandatory after creation.
    pub const COLUMNS: &[u8] = b"columns";
    /// Reference count, i32 BE. Absent reads as zero.
    pub const REFERENCE: &[u8] = b"reference";
    /// Bound alias name. Absent means unprotected.
    pub const ALIASNAME: &[u8] = b"aliasname";
    /// Variant tag, written exactly once at creation.
    pub const TYPE: &[u8] = b"type";
    /// Label cell under the attribute family.
    pub const LABEL: &[u8] = b"label";
}

/// Encode a row index as its 4-byte big-endian row key.
#[inline]
pub fn row_key(row: u32) -> [u8; 4] {
    row.to_be_bytes()
}

/// Encode a column index as its 4-byte big-endian data qualifier.
#[inline]
pub fn column_qualifier(column: u32) -> [u8; 4] {
    column.to_be_bytes()
}

/// Decode a 4-byte big-endian row key or column qualifier.
pub fn decode_index(bytes: &[u8]) -> Result<u32, StoreError> {
    let arr: [u8; 4] = bytes
        .try_into()
        .map_err(|_| StoreError::Corrupt(format!("index cell has width {}", bytes.len())))?;
    Ok(u32::from_be_bytes(arr))
}

/// Encode an unsigned metadata integer (dimensions).
#[inline]
pub fn encode_u32(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

/// Decode an unsigned metadata integer.
pub fn decode_u32(bytes: &[u8]) -> Result<u32, StoreError> {
    let arr: [u8; 4] = bytes
        .try_into()
        .map_err(|_| StoreError::Corrupt(format!("u32 cell has width {}", bytes.len())))?;
    Ok(u32::from_be_bytes(arr))
}

/// Encode a signed metadata integer (reference count).
#[inline]
pub fn encode_i32(value: i32) -> [u8; 4] {
    value.to_be_bytes()
}

/// Decode a signed metadata integer.
pub fn decode_i32(bytes: &[u8]) -> Result<i32, StoreError> {
    let arr: [u8; 4] = bytes
        .try_into()
        .map_err(|_| StoreError::Corrupt(format!("i32 cell has width {}", bytes.len())))?;
    Ok(i32::from_be_bytes(arr))
}

/// Encode a numeric data cell.
#[inline]
pub fn encode_f64(value: f64) -> [u8; 8] {
    value.to_be_bytes()
}

/// Decode a numeric data cell.
pub fn decode_f64(bytes: &[u8]) -> Result<f64, StoreError> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| StoreError::Corrupt(format!("f64 cell has width {}", bytes.len())))?;
    Ok(f64::from_be_bytes(arr))
}

/// Whether a row key is one of the reserved (non-data) rows.
#[inline]
pub fn is_reserved_row(row: &[u8]) -> bool {
    row.first() == Some(&b'!')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn family_names_unique_and_complete() {
        let set: HashSet<_> = families::ALL.iter().collect();
        assert_eq!(set.len(), families::ALL.len());
        assert_eq!(families::ALL.len(), 8);
        for f in families::COPIED {
            assert!(families::ALL.contains(f));
        }
        assert!(!families::COPIED.contains(&families::META));
    }

    #[test]
    fn reserved_rows_carry_marker_byte() {
        assert!(is_reserved_row(rows::METADATA));
        assert!(is_reserved_row(rows::CINDEX));
        assert!(!is_reserved_row(&row_key(0)));
        assert!(!is_reserved_row(&row_key(u32::MAX)));
    }

    #[test]
    fn index_roundtrip() {
        for i in [0u32, 1, 255, 65_536, u32::MAX] {
            assert_eq!(decode_index(&row_key(i)).unwrap(), i);
            assert_eq!(decode_index(&column_qualifier(i)).unwrap(), i);
        }
    }

    #[test]
    fn row_keys_sort_in_index_order() {
        // Big-endian keys keep scan order aligned with row order.
        assert!(row_key(1) < row_key(2));
        assert!(row_key(255) < row_key(256));
    }

    #[test]
    fn integer_roundtrip() {
        assert_eq!(decode_u32(&encode_u32(7)).unwrap(), 7);
        assert_eq!(decode_i32(&encode_i32(-1)).unwrap(), -1);
        assert_eq!(decode_i32(&encode_i32(i32::MAX)).unwrap(), i32::MAX);
    }

    #[test]
    fn float_roundtrip() {
        for v in [0.0f64, -3.5, f64::MAX, f64::MIN_POSITIVE] {
            assert_eq!(decode_f64(&encode_f64(v)).unwrap(), v);
        }
    }

    #[test]
    fn wrong_width_is_corrupt() {
        assert!(matches!(decode_u32(b"abc"), Err(StoreError::Corrupt(_))));
        assert!(matches!(decode_f64(b"abcd"), Err(StoreError::Corrupt(_))));
        assert!(matches!(decode_index(&[]), Err(StoreError::Corrupt(_))));
    }
}

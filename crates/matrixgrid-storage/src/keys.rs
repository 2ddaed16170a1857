//! Cell key encoding inside a `(table, family)` column family.
//!
//! A cell is addressed by `(row, qualifier)`. Row keys are binary (4-byte
//! big-endian indices as well as reserved `!`-prefixed keys), so the two
//! parts are joined with an explicit length prefix instead of a separator
//! byte: `[row_len: u16 BE][row][qualifier]`.

use matrixgrid_core::error::StoreError;

/// Encode a `(row, qualifier)` pair into one RocksDB key.
pub fn encode_cell_key(row: &[u8], qualifier: &[u8]) -> Vec<u8> {
    debug_assert!(row.len() <= u16::MAX as usize);
    let mut key = Vec::with_capacity(2 + row.len() + qualifier.len());
    key.extend_from_slice(&(row.len() as u16).to_be_bytes());
    key.extend_from_slice(row);
    key.extend_from_slice(qualifier);
    key
}

/// Split a RocksDB key back into `(row, qualifier)`.
pub fn decode_cell_key(key: &[u8]) -> Result<(Vec<u8>, Vec<u8>), StoreError> {
    if key.len() < 2 {
        return Err(StoreError::Corrupt(format!(
            "cell key too short: {} bytes",
            key.len()
        )));
    }
    let row_len = u16::from_be_bytes([key[0], key[1]]) as usize;
    if key.len() < 2 + row_len {
        return Err(StoreError::Corrupt(format!(
            "cell key claims row of {} bytes in a {}-byte key",
            row_len,
            key.len()
        )));
    }
    let row = key[2..2 + row_len].to_vec();
    let qualifier = key[2 + row_len..].to_vec();
    Ok((row, qualifier))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_binary_safe() {
        let cases: &[(&[u8], &[u8])] = &[
            (b"!metadata", b"rows"),
            (&[0, 0, 0, 1], &[0, 0, 0, 0]),
            (&[0xff, 0x00, 0xff, 0x00], b""),
            (b"", b"q"),
        ];
        for (row, qual) in cases {
            let key = encode_cell_key(row, qual);
            let (r, q) = decode_cell_key(&key).unwrap();
            assert_eq!(&r, row);
            assert_eq!(&q, qual);
        }
    }

    #[test]
    fn keys_with_same_row_share_prefix() {
        let a = encode_cell_key(&[0, 0, 0, 1], &[0, 0, 0, 0]);
        let b = encode_cell_key(&[0, 0, 0, 1], &[0, 0, 0, 9]);
        assert_eq!(a[..6], b[..6]);
    }

    #[test]
    fn truncated_key_is_corrupt() {
        assert!(matches!(decode_cell_key(&[0]), Err(StoreError::Corrupt(_))));
        let mut key = encode_cell_key(b"!metadata", b"rows");
        key.truncate(4);
        assert!(matches!(decode_cell_key(&key), Err(StoreError::Corrupt(_))));
    }
}

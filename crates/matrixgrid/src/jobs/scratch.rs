//! Filesystem scratch space for job output.
//!
//! A reduce stage with a single reducer leaves exactly one scalar record
//! under its output directory, in the file named by [`RESULT_FILE`]: eight
//! big-endian bytes of one `f64`.

use std::fs;
use std::io;
use std::path::Path;

use matrixgrid_core::error::JobError;
use matrixgrid_core::traits::ScratchSpace;

/// File name of the single-reducer scalar record.
pub const RESULT_FILE: &str = "reduce-out";

/// [`ScratchSpace`] over the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsScratch;

impl FsScratch {
    /// New scratch handle.
    pub fn new() -> Self {
        Self
    }

    /// Write the scalar record a norm job produces. Used by runners that
    /// execute reduce stages in-process.
    pub fn write_scalar(dir: &Path, value: f64) -> Result<(), JobError> {
        fs::create_dir_all(dir)?;
        fs::write(dir.join(RESULT_FILE), value.to_be_bytes())?;
        Ok(())
    }
}

impl ScratchSpace for FsScratch {
    fn read_scalar(&self, dir: &Path) -> Result<f64, JobError> {
        let path = dir.join(RESULT_FILE);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(JobError::MissingResult { path })
            }
            Err(e) => return Err(e.into()),
        };
        let arr: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
            JobError::Scratch(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("scalar record has {} bytes", bytes.len()),
            ))
        })?;
        Ok(f64::from_be_bytes(arr))
    }

    fn delete_tree(&self, dir: &Path) -> Result<(), JobError> {
        match fs::remove_dir_all(dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, dir: &Path) -> bool {
        dir.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn scalar_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("job/out");
        FsScratch::write_scalar(&dir, -12.75).unwrap();
        assert_eq!(FsScratch::new().read_scalar(&dir).unwrap(), -12.75);
    }

    #[test]
    fn missing_record_is_reported() {
        let tmp = TempDir::new().unwrap();
        let err = FsScratch::new().read_scalar(tmp.path()).unwrap_err();
        assert!(matches!(err, JobError::MissingResult { .. }));
    }

    #[test]
    fn delete_tree_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("job");
        FsScratch::write_scalar(&dir.join("out"), 1.0).unwrap();

        let scratch = FsScratch::new();
        assert!(scratch.exists(&dir));
        scratch.delete_tree(&dir).unwrap();
        assert!(!scratch.exists(&dir));
        // Absent tree: still Ok.
        scratch.delete_tree(&dir).unwrap();
    }
}

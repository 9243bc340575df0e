pub mod csv;
pub mod dump;
pub mod exporter;
pub mod normalize;
pub mod width;
pub mod workbook;

use crate::error::{ExportError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes an artifact to a sibling `.tmp` path and renames it into place, so
/// an interrupted run never leaves a truncated file at the final path.
pub(crate) fn persist_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = temp_path(path);
    fs::write(&tmp, bytes).map_err(|e| ExportError::serialization(path, e))?;
    fs::rename(&tmp, path).map_err(|e| ExportError::serialization(path, e))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".tmp");
    PathBuf::from(os)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persist_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop_orders.csv");
        persist_bytes(&path, b"id,name\n").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"id,name\n");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn persist_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop_orders.csv");
        persist_bytes(&path, b"first").unwrap();
        persist_bytes(&path, b"second").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second");
    }
}

//! Atomic file writer so a crash never leaves a half-written results file

use crate::error::StorageResult;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes to `<path>.tmp` and renames over `path` on commit
pub struct AtomicWriter {
    temp_path: PathBuf,
    final_path: PathBuf,
    file: File,
}

impl AtomicWriter {
    /// Create a new atomic writer for the given path
    pub fn new<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let final_path = path.as_ref().to_path_buf();

        if let Some(parent) = final_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = Self::temp_path(&final_path);
        let file = File::create(&temp_path)?;

        Ok(Self {
            temp_path,
            final_path,
            file,
        })
    }

    /// Append bytes to the pending file
    pub fn write(&mut self, data: &[u8]) -> StorageResult<()> {
        self.file.write_all(data)?;
        Ok(())
    }

    /// Flush, sync and rename into place
    pub fn commit(mut self) -> StorageResult<()> {
        self.file.flush()?;
        self.file.sync_all()?;

        fs::rename(&self.temp_path, &self.final_path)?;

        Ok(())
    }

    fn temp_path(final_path: &Path) -> PathBuf {
        let mut temp = final_path.as_os_str().to_owned();
        temp.push(".tmp");
        PathBuf::from(temp)
    }
}

impl Drop for AtomicWriter {
    fn drop(&mut self) {
        // No-op after a successful commit: the temp file has been renamed away
        let _ = fs::remove_file(&self.temp_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_commit_writes_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("results.json");

        let mut writer = AtomicWriter::new(&path).unwrap();
        writer.write(b"[]").unwrap();
        writer.commit().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
        assert!(!temp_dir.path().join("results.json.tmp").exists());
    }

    #[test]
    fn test_creates_parent_dir() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data/nested/results.json");

        let mut writer = AtomicWriter::new(&path).unwrap();
        writer.write(b"[]").unwrap();
        writer.commit().unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_drop_without_commit_leaves_original() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("results.json");
        fs::write(&path, b"[1]").unwrap();

        {
            let mut writer = AtomicWriter::new(&path).unwrap();
            writer.write(b"[2]").unwrap();
        }

        assert_eq!(fs::read_to_string(&path).unwrap(), "[1]");
        assert!(!temp_dir.path().join("results.json.tmp").exists());
    }
}

//! File-system access used by transfers.

use std::io;
use std::path::Path;

/// Reads and writes whole files.
pub trait FileStore: Send + Sync {
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replaces `path` with `data`, creating parent directories.
    fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool;
}

/// [`FileStore`] backed by the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileStore;

impl FileStore for LocalFileStore {
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, data)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

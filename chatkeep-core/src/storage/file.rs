//! File-backed session storage

use std::path::{Path, PathBuf};

use super::SessionStorage;
use crate::utils::safe_filename;

/// Session storage keeping one `<key>.json` file per slot in a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create a file storage rooted at `dir`; the directory is created lazily
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Directory holding the slot files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", safe_filename(key)))
    }
}

impl SessionStorage for FileStorage {
    fn get_item(&self, key: &str) -> crate::Result<Option<String>> {
        let path = self.slot_path(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(crate::Error::StorageRead(format!(
                "{}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> crate::Result<()> {
        let path = self.slot_path(key);
        std::fs::create_dir_all(&self.dir)
            .and_then(|_| std::fs::write(&path, value))
            .map_err(|e| crate::Error::StorageWrite(format!("{}: {}", path.display(), e)))
    }

    fn remove_item(&self, key: &str) -> crate::Result<()> {
        let path = self.slot_path(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(crate::Error::StorageWrite(format!(
                "{}: {}",
                path.display(),
                e
            ))),
        }
    }
}

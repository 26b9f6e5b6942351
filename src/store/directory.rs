//! on-disk store rooted at a base directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::store::error::{StoreError, StoreResult};
use crate::store::path::{FilePattern, RelativePath};
use crate::store::FileStore;

/// A [`FileStore`] backed by a directory on the local filesystem.
///
/// Text is written as UTF-8 without a byte-order mark.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    base: PathBuf,
}

impl DirectoryStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn full(&self, path: &RelativePath) -> PathBuf {
        path.to_path_buf(&self.base)
    }

    /// walk `folder`, yielding entries relative to it and keeping only those `keep` accepts
    fn walk<F>(&self, folder: Option<&RelativePath>, recursive: bool, keep: F) -> StoreResult<Vec<RelativePath>>
    where
        F: Fn(&walkdir::DirEntry) -> bool,
    {
        let folder = folder.cloned().unwrap_or_default();
        let root = self.full(&folder);
        if !root.is_dir() {
            return Ok(Vec::new());
        }

        let walker = WalkDir::new(&root)
            .min_depth(1)
            .max_depth(if recursive { usize::MAX } else { 1 })
            .sort_by_file_name();

        let mut found = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| {
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
                StoreError::io(&folder, source)
            })?;

            if !keep(&entry) {
                continue;
            }

            // walkdir only yields paths under root, so the strip cannot fail
            if let Ok(relative) = entry.path().strip_prefix(&root) {
                found.push(RelativePath::from_path(relative)?);
            }
        }

        found.sort();
        Ok(found)
    }
}

impl FileStore for DirectoryStore {
    fn read_text(&self, path: &RelativePath) -> StoreResult<String> {
        let bytes = fs::read(self.full(path)).map_err(|e| StoreError::io(path, e))?;
        String::from_utf8(bytes).map_err(|_| StoreError::InvalidUtf8 { path: path.clone() })
    }

    fn write_text(&self, path: &RelativePath, contents: &str) -> StoreResult<()> {
        let full = self.full(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(&path.without_last(), e))?;
        }
        fs::write(&full, contents).map_err(|e| StoreError::io(path, e))?;
        trace!(path = %path, bytes = contents.len(), "wrote file");
        Ok(())
    }

    fn exists(&self, path: &RelativePath) -> bool {
        !path.is_root() && self.full(path).is_file()
    }

    fn delete(&self, path: &RelativePath) -> StoreResult<()> {
        fs::remove_file(self.full(path)).map_err(|e| StoreError::io(path, e))?;
        debug!(path = %path, "deleted file");
        Ok(())
    }

    fn list_files(
        &self,
        pattern: &FilePattern,
        folder: Option<&RelativePath>,
        recursive: bool,
    ) -> StoreResult<Vec<RelativePath>> {
        self.walk(folder, recursive, |entry| {
            entry.file_type().is_file() && entry.file_name().to_str().is_some_and(|name| pattern.matches(name))
        })
    }

    fn list_folders(&self, folder: Option<&RelativePath>, recursive: bool) -> StoreResult<Vec<RelativePath>> {
        self.walk(folder, recursive, |entry| entry.file_type().is_dir())
    }

    fn folder_exists(&self, path: &RelativePath) -> bool {
        self.full(path).is_dir()
    }

    fn delete_folder(&self, path: &RelativePath) -> StoreResult<()> {
        let full = self.full(path);
        if !full.is_dir() {
            return Err(StoreError::FolderNotFound(path.clone()));
        }
        fs::remove_dir_all(&full).map_err(|e| StoreError::io(path, e))?;
        debug!(path = %path, "deleted folder");
        Ok(())
    }

    fn describe(&self) -> String {
        self.base.display().to_string()
    }
}

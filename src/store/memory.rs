//! in-process store, used for tests and for staging a tree before it hits disk.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::store::error::{StoreError, StoreResult};
use crate::store::path::{FilePattern, RelativePath};
use crate::store::FileStore;

/// A [`FileStore`] holding everything in memory.
///
/// Cloning is cheap and clones share the same contents, so a test can hand one
/// clone to a writer and inspect another afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    files: RwLock<BTreeMap<RelativePath, String>>,
    /// folders that exist independently of any file inside them
    folders: RwLock<BTreeSet<RelativePath>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// build a store from `(path, contents)` pairs
    pub fn with_files<'a, I>(files: I) -> StoreResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let store = Self::new();
        for (path, contents) in files {
            store.write_text(&RelativePath::new(path)?, contents)?;
        }
        Ok(store)
    }

    /// create an empty folder (and its ancestors)
    pub fn create_folder(&self, path: &RelativePath) {
        let mut folders = self.inner.folders.write();
        add_with_ancestors(&mut folders, path);
    }

    /// snapshot of every file path, sorted
    pub fn file_paths(&self) -> Vec<RelativePath> {
        self.inner.files.read().keys().cloned().collect()
    }

    pub fn file_count(&self) -> usize {
        self.inner.files.read().len()
    }

    fn all_folders(&self) -> BTreeSet<RelativePath> {
        let mut all = self.inner.folders.read().clone();
        for file in self.inner.files.read().keys() {
            add_with_ancestors(&mut all, &file.without_last());
        }
        all
    }
}

fn add_with_ancestors(folders: &mut BTreeSet<RelativePath>, path: &RelativePath) {
    let mut current = path.clone();
    while !current.is_root() {
        let parent = current.without_last();
        folders.insert(current);
        current = parent;
    }
}

/// `candidate` relative to `folder`, if it sits below it at an allowed depth
fn relative_within(candidate: &RelativePath, folder: &RelativePath, recursive: bool) -> Option<RelativePath> {
    let rest = candidate.strip_prefix(folder)?;
    if rest.is_root() || (!recursive && rest.len() != 1) {
        return None;
    }
    Some(rest)
}

impl FileStore for MemoryStore {
    fn read_text(&self, path: &RelativePath) -> StoreResult<String> {
        self.inner
            .files
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.clone()))
    }

    fn write_text(&self, path: &RelativePath, contents: &str) -> StoreResult<()> {
        if path.is_root() {
            return Err(StoreError::NotFound(path.clone()));
        }
        self.inner.files.write().insert(path.clone(), contents.to_string());
        self.create_folder(&path.without_last());
        Ok(())
    }

    fn exists(&self, path: &RelativePath) -> bool {
        self.inner.files.read().contains_key(path)
    }

    fn delete(&self, path: &RelativePath) -> StoreResult<()> {
        if self.inner.files.write().remove(path).is_none() {
            return Err(StoreError::NotFound(path.clone()));
        }
        // the folder stays behind, like on disk
        self.create_folder(&path.without_last());
        Ok(())
    }

    fn list_files(
        &self,
        pattern: &FilePattern,
        folder: Option<&RelativePath>,
        recursive: bool,
    ) -> StoreResult<Vec<RelativePath>> {
        let folder = folder.cloned().unwrap_or_default();
        let files = self.inner.files.read();
        Ok(files
            .keys()
            .filter(|path| path.file_name().is_some_and(|name| pattern.matches(name)))
            .filter_map(|path| relative_within(path, &folder, recursive))
            .collect())
    }

    fn list_folders(&self, folder: Option<&RelativePath>, recursive: bool) -> StoreResult<Vec<RelativePath>> {
        let folder = folder.cloned().unwrap_or_default();
        Ok(self
            .all_folders()
            .iter()
            .filter_map(|path| relative_within(path, &folder, recursive))
            .collect())
    }

    fn folder_exists(&self, path: &RelativePath) -> bool {
        path.is_root() || self.all_folders().contains(path)
    }

    fn delete_folder(&self, path: &RelativePath) -> StoreResult<()> {
        if !self.folder_exists(path) {
            return Err(StoreError::FolderNotFound(path.clone()));
        }
        self.inner.files.write().retain(|file, _| !file.starts_with(path));
        self.inner.folders.write().retain(|folder| !folder.starts_with(path));
        // deleting `a/b` must leave `a` in place even if nothing else is in it
        self.create_folder(&path.without_last());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

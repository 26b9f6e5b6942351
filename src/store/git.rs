//! read-only store over a committed git tree.
//!
//! lets a definition be read straight out of history (`HEAD~3`, a tag, a
//! branch) without checking it out. Writes are rejected with
//! [`StoreError::ReadOnly`].

use std::path::{Path, PathBuf};

use git2::{ObjectType, Oid, Repository, Tree, TreeWalkMode, TreeWalkResult};
use parking_lot::Mutex;
use tracing::debug;

use crate::store::error::{StoreError, StoreResult};
use crate::store::path::{FilePattern, RelativePath};
use crate::store::FileStore;

/// A [`FileStore`] view of one tree in a git repository, optionally scoped to a sub-folder.
///
/// The revision is resolved once at open time, so the view is a stable
/// snapshot even if the branch moves afterwards.
pub struct GitRevisionStore {
    repo: Mutex<Repository>,
    tree: Oid,
    base: RelativePath,
    location: PathBuf,
    revision: String,
}

impl GitRevisionStore {
    /// open `revision` (anything `git rev-parse` accepts) in the repository at `path`
    pub fn open(path: impl AsRef<Path>, revision: &str) -> StoreResult<Self> {
        let path = path.as_ref();
        let repo = Repository::open(path)?;
        let tree = repo.revparse_single(revision)?.peel_to_tree()?.id();
        debug!(repo = %path.display(), revision, tree = %tree, "opened revision");

        Ok(Self {
            repo: Mutex::new(repo),
            tree,
            base: RelativePath::root(),
            location: path.to_path_buf(),
            revision: revision.to_string(),
        })
    }

    /// scope the store to a sub-folder of the tree
    pub fn at(mut self, base: RelativePath) -> Self {
        self.base = base;
        self
    }

    /// id of the tree this store reads from
    pub fn tree_id(&self) -> Oid {
        self.tree
    }

    fn git_path(&self, path: &RelativePath) -> PathBuf {
        PathBuf::from(self.base.join(path).to_string())
    }

    fn entry_kind(&self, path: &RelativePath) -> Option<ObjectType> {
        let full = self.base.join(path);
        if full.is_root() {
            return Some(ObjectType::Tree);
        }
        let repo = self.repo.lock();
        let root = repo.find_tree(self.tree).ok()?;
        let entry = root.get_path(&self.git_path(path)).ok()?;
        entry.kind()
    }

    /// entries below `folder` relative to it, with their object kinds
    fn entries(&self, folder: Option<&RelativePath>, recursive: bool) -> StoreResult<Vec<(RelativePath, ObjectType)>> {
        let folder = folder.cloned().unwrap_or_default();
        let repo = self.repo.lock();

        let Some(tree) = subtree(&repo, self.tree, &self.base.join(&folder))? else {
            return Ok(Vec::new());
        };

        let mut found = Vec::new();
        if recursive {
            tree.walk(TreeWalkMode::PreOrder, |dir, entry| {
                if let (Some(name), Some(kind)) = (entry.name(), entry.kind()) {
                    if let Ok(path) = RelativePath::new(format!("{dir}{name}")) {
                        found.push((path, kind));
                    }
                }
                TreeWalkResult::Ok
            })?;
        } else {
            for entry in tree.iter() {
                if let (Some(name), Some(kind)) = (entry.name(), entry.kind()) {
                    found.push((RelativePath::new(name)?, kind));
                }
            }
        }

        found.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(found)
    }

    fn read_only(&self, path: &RelativePath) -> StoreError {
        StoreError::ReadOnly(path.clone())
    }
}

/// look up the tree at `folder`, `None` if it is missing or not a tree
fn subtree<'repo>(repo: &'repo Repository, root: Oid, folder: &RelativePath) -> StoreResult<Option<Tree<'repo>>> {
    let root = repo.find_tree(root)?;
    if folder.is_root() {
        return Ok(Some(root));
    }

    let lookup = root.get_path(Path::new(&folder.to_string()));
    let found = match lookup {
        Ok(entry) if entry.kind() == Some(ObjectType::Tree) => Some(repo.find_tree(entry.id())?),
        Ok(_) => None,
        Err(e) if e.code() == git2::ErrorCode::NotFound => None,
        Err(e) => return Err(e.into()),
    };
    Ok(found)
}

impl FileStore for GitRevisionStore {
    fn read_text(&self, path: &RelativePath) -> StoreResult<String> {
        let repo = self.repo.lock();
        let root = repo.find_tree(self.tree)?;

        let entry = match root.get_path(&self.git_path(path)) {
            Ok(entry) if entry.kind() == Some(ObjectType::Blob) => entry,
            Ok(_) => return Err(StoreError::NotFound(path.clone())),
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Err(StoreError::NotFound(path.clone())),
            Err(e) => return Err(e.into()),
        };

        let blob = repo.find_blob(entry.id())?;
        String::from_utf8(blob.content().to_vec()).map_err(|_| StoreError::InvalidUtf8 { path: path.clone() })
    }

    fn write_text(&self, path: &RelativePath, _contents: &str) -> StoreResult<()> {
        Err(self.read_only(path))
    }

    fn exists(&self, path: &RelativePath) -> bool {
        !path.is_root() && self.entry_kind(path) == Some(ObjectType::Blob)
    }

    fn delete(&self, path: &RelativePath) -> StoreResult<()> {
        Err(self.read_only(path))
    }

    fn list_files(
        &self,
        pattern: &FilePattern,
        folder: Option<&RelativePath>,
        recursive: bool,
    ) -> StoreResult<Vec<RelativePath>> {
        Ok(self
            .entries(folder, recursive)?
            .into_iter()
            .filter(|(path, kind)| {
                *kind == ObjectType::Blob && path.file_name().is_some_and(|name| pattern.matches(name))
            })
            .map(|(path, _)| path)
            .collect())
    }

    fn list_folders(&self, folder: Option<&RelativePath>, recursive: bool) -> StoreResult<Vec<RelativePath>> {
        Ok(self
            .entries(folder, recursive)?
            .into_iter()
            .filter(|(_, kind)| *kind == ObjectType::Tree)
            .map(|(path, _)| path)
            .collect())
    }

    fn folder_exists(&self, path: &RelativePath) -> bool {
        self.entry_kind(path) == Some(ObjectType::Tree)
    }

    fn delete_folder(&self, path: &RelativePath) -> StoreResult<()> {
        Err(self.read_only(path))
    }

    fn describe(&self) -> String {
        if self.base.is_root() {
            format!("{}@{}", self.location.display(), self.revision)
        } else {
            format!("{}@{}:{}", self.location.display(), self.revision, self.base)
        }
    }
}

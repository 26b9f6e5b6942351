//! file store layer for report definitions
//!
//! this module provides the abstraction every reader and writer talks to. The
//! upper layers (document tree, reader, writer) only ever see [`RelativePath`]s
//! and the [`FileStore`] trait, and never touch `std::fs` or git directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      FileStore (trait)                      │
//! │   read/write text, enumerate files & folders, delete        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!        ┌─────────────────────┼─────────────────────┐
//!        │                     │                     │
//!        ▼                     ▼                     ▼
//!  ┌─────────────┐       ┌─────────────┐       ┌─────────────┐
//!  │  Directory  │       │   Memory    │       │ GitRevision │
//!  │  (on disk)  │       │ (in-process)│       │ (read-only) │
//!  └─────────────┘       └─────────────┘       └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use reportdef::store::{DirectoryStore, FileStore, RelativePath};
//!
//! let store = DirectoryStore::new("./MyReport.Report/definition");
//! let text = store.read_text(&RelativePath::new("report.json")?)?;
//! for page in store.list_folders(Some(&RelativePath::new("pages")?), false)? {
//!     println!("{page}");
//! }
//! ```

mod directory;
mod error;
mod git;
mod memory;
mod path;

pub use directory::DirectoryStore;
pub use error::{StoreError, StoreResult};
pub use git::GitRevisionStore;
pub use memory::MemoryStore;
pub use path::{FilePattern, InvalidPathError, RelativePath};

/// A text-file store addressed by [`RelativePath`]s under one fixed base.
///
/// All paths passed in and returned are relative: enumeration results are
/// relative to the folder being enumerated, everything else to the store base.
pub trait FileStore: Send + Sync {
    /// read a whole file as UTF-8 text, failing with [`StoreError::NotFound`] if absent
    fn read_text(&self, path: &RelativePath) -> StoreResult<String>;

    /// create or replace a file, creating parent folders as needed
    fn write_text(&self, path: &RelativePath, contents: &str) -> StoreResult<()>;

    /// check whether a file exists
    fn exists(&self, path: &RelativePath) -> bool;

    /// delete a single file
    fn delete(&self, path: &RelativePath) -> StoreResult<()>;

    /// list files whose name matches `pattern` under `folder` (the base when `None`).
    ///
    /// A missing folder yields an empty list.
    fn list_files(
        &self,
        pattern: &FilePattern,
        folder: Option<&RelativePath>,
        recursive: bool,
    ) -> StoreResult<Vec<RelativePath>>;

    /// list sub-folders of `folder` (the base when `None`). A missing folder yields an empty list.
    fn list_folders(&self, folder: Option<&RelativePath>, recursive: bool) -> StoreResult<Vec<RelativePath>>;

    /// check whether a folder exists; the root always exists
    fn folder_exists(&self, path: &RelativePath) -> bool;

    /// delete a folder together with everything below it
    fn delete_folder(&self, path: &RelativePath) -> StoreResult<()>;

    /// human readable location, used in log output
    fn describe(&self) -> String;
}

/// name prefix of version-control metadata entries that reconciliation must never touch
pub const VCS_PREFIX: &str = ".git";

/// check if a path lives inside version-control metadata (`.git/`, `.gitignore`, ...)
pub fn is_vcs_path(path: &RelativePath) -> bool {
    path.first().is_some_and(|first| first.starts_with(VCS_PREFIX))
}

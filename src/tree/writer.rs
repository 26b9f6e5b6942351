//! serialize a [`DefinitionTree`] into a store and reconcile the file set.
//!
//! a write runs in three steps, each callable on its own:
//!
//! 1. [`TreeWriter::plan`] snapshots every file already under the target
//!    (version-control metadata excluded). These are the deletion candidates.
//! 2. [`TreeWriter::execute`] writes every document and strikes each written
//!    path from the candidates. Any failure aborts here.
//! 3. [`TreeWriter::apply`] deletes the remaining candidates and prunes empty
//!    folders. Failures in this step are logged and skipped.
//!
//! deletions only happen once every write has succeeded, so a failed write
//! never costs a file. Files already written stay written.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::document::{Doc, DocumentError, DocumentKind};
use crate::store::{is_vcs_path, FilePattern, FileStore, RelativePath};
use crate::tree::error::{TreeError, TreeResult};
use crate::tree::DefinitionTree;

/// Write options.
///
/// ```ignore
/// let options = WriteOptions::new().overwrite(false).pretty(false);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// allow writing into a target that already holds files
    pub overwrite: bool,
    /// reset every document's `$schema` to its kind's default
    pub update_schemas: bool,
    /// indent the JSON output
    pub pretty: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            overwrite: true,
            update_schemas: true,
            pretty: true,
        }
    }
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn update_schemas(mut self, update: bool) -> Self {
        self.update_schemas = update;
        self
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

/// The deletion candidates of a pending write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WritePlan {
    candidates: BTreeSet<RelativePath>,
}

impl WritePlan {
    /// files that will be deleted unless the write produces them
    pub fn candidates(&self) -> &BTreeSet<RelativePath> {
        &self.candidates
    }

    /// mark `path` as produced by the write
    pub fn keep(&mut self, path: &RelativePath) -> bool {
        self.candidates.remove(path)
    }
}

/// Outcome of the deletion step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// orphan files that were deleted
    pub deleted: BTreeSet<RelativePath>,
    /// folders removed because nothing was left in them, shallowest first
    pub removed_folders: Vec<RelativePath>,
}

/// Outcome of a complete write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub written: BTreeSet<RelativePath>,
    pub deleted: BTreeSet<RelativePath>,
    pub removed_folders: Vec<RelativePath>,
}

/// Writes definition trees into a [`FileStore`].
pub struct TreeWriter<'a> {
    store: &'a dyn FileStore,
    options: WriteOptions,
}

impl<'a> TreeWriter<'a> {
    pub fn new(store: &'a dyn FileStore) -> Self {
        Self {
            store,
            options: WriteOptions::default(),
        }
    }

    pub fn with_options(mut self, options: WriteOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &WriteOptions {
        &self.options
    }

    /// plan, execute, then apply
    #[instrument(skip_all, fields(store = %self.store.describe(), overwrite = self.options.overwrite))]
    pub fn write(&self, tree: &mut DefinitionTree) -> TreeResult<WriteReport> {
        let mut plan = self.plan()?;
        let written = self.execute(tree, &mut plan)?;
        let reconciliation = self.apply(plan);

        debug!(
            written = written.len(),
            deleted = reconciliation.deleted.len(),
            removed_folders = reconciliation.removed_folders.len(),
            "wrote definition"
        );

        Ok(WriteReport {
            written,
            deleted: reconciliation.deleted,
            removed_folders: reconciliation.removed_folders,
        })
    }

    /// snapshot the files currently under the target.
    ///
    /// Fails with [`TreeError::DestinationNotEmpty`] when the target holds files
    /// and overwriting is disabled. Nothing is touched either way.
    pub fn plan(&self) -> TreeResult<WritePlan> {
        let candidates: BTreeSet<RelativePath> = self
            .store
            .list_files(&FilePattern::any(), None, true)?
            .into_iter()
            .filter(|path| !is_vcs_path(path))
            .collect();

        if !self.options.overwrite && !candidates.is_empty() {
            return Err(TreeError::DestinationNotEmpty {
                files: candidates.len(),
            });
        }

        debug!(existing = candidates.len(), "planned write");
        Ok(WritePlan { candidates })
    }

    /// write every document of `tree`, depth-first, returning the paths written
    pub fn execute(&self, tree: &mut DefinitionTree, plan: &mut WritePlan) -> TreeResult<BTreeSet<RelativePath>> {
        let mut written = BTreeSet::new();

        self.emit(&mut tree.version, plan, &mut written)?;
        self.emit(&mut tree.report, plan, &mut written)?;
        if let Some(extensions) = tree.report_extensions.as_mut() {
            self.emit(extensions, plan, &mut written)?;
        }

        if let Some(metadata) = tree.bookmarks.metadata_mut() {
            self.emit(metadata, plan, &mut written)?;
        }
        for bookmark in tree.bookmarks.iter_mut() {
            self.emit(bookmark, plan, &mut written)?;
        }

        if let Some(metadata) = tree.pages.metadata_mut() {
            self.emit(metadata, plan, &mut written)?;
        }
        for page in tree.pages.iter_mut() {
            page.reattach();
            self.emit(page, plan, &mut written)?;

            for visual in page.visuals_mut().iter_mut() {
                visual.reattach();
                self.emit(visual, plan, &mut written)?;

                let mobile_path = visual.default_mobile_path();
                if let Some(mobile) = visual.mobile_state_mut() {
                    if mobile.path().is_none() {
                        mobile.set_path(mobile_path);
                    }
                    self.emit(mobile, plan, &mut written)?;
                }
            }
        }

        Ok(written)
    }

    /// delete the candidates left in `plan`, then prune empty folders
    pub fn apply(&self, plan: WritePlan) -> Reconciliation {
        let mut deleted = BTreeSet::new();

        for path in plan.candidates {
            if !self.store.exists(&path) {
                continue;
            }
            match self.store.delete(&path) {
                Ok(()) => {
                    debug!(path = %path, "deleted orphan");
                    deleted.insert(path);
                }
                Err(e) => warn!(path = %path, error = %e, "failed to delete orphan"),
            }
        }

        let removed_folders = self.remove_empty_folders();
        Reconciliation {
            deleted,
            removed_folders,
        }
    }

    fn emit<K: DocumentKind>(
        &self,
        doc: &mut Doc<K>,
        plan: &mut WritePlan,
        written: &mut BTreeSet<RelativePath>,
    ) -> TreeResult<()> {
        if doc.path().is_none() {
            let path = doc
                .content()
                .default_path()
                .ok_or(DocumentError::MissingPath { kind: K::KIND })?;
            doc.set_path(Some(path));
        }
        if self.options.update_schemas {
            doc.refresh_schema();
        }

        let target = doc.effective_path()?;
        let payload = doc.to_json()?;
        self.store.write_text(&target, &self.render(&payload)?)?;
        debug!(path = %target, kind = K::KIND, "wrote document");

        doc.set_raw_json(Some(payload));
        plan.keep(&target);
        written.insert(target);
        Ok(())
    }

    fn render(&self, payload: &Map<String, Value>) -> TreeResult<String> {
        let text = if self.options.pretty {
            serde_json::to_string_pretty(payload)
        } else {
            serde_json::to_string(payload)
        };
        text.map_err(|e| DocumentError::from(e).into())
    }

    /// remove folders with no files left below them, shallowest first so a
    /// chain of empty folders goes in one delete
    fn remove_empty_folders(&self) -> Vec<RelativePath> {
        let folders = match self.store.list_folders(None, true) {
            Ok(folders) => folders,
            Err(e) => {
                warn!(error = %e, "could not enumerate folders, skipping cleanup");
                return Vec::new();
            }
        };

        let any = FilePattern::any();
        let mut removed: Vec<RelativePath> = Vec::new();

        for folder in folders {
            if is_vcs_path(&folder) || removed.iter().any(|gone| folder.starts_with(gone)) {
                continue;
            }
            match self.store.list_files(&any, Some(&folder), true) {
                Ok(files) if files.is_empty() => match self.store.delete_folder(&folder) {
                    Ok(()) => {
                        debug!(folder = %folder, "removed empty folder");
                        removed.push(folder);
                    }
                    Err(e) => warn!(folder = %folder, error = %e, "failed to remove empty folder"),
                },
                Ok(_) => {}
                Err(e) => warn!(folder = %folder, error = %e, "could not inspect folder"),
            }
        }

        removed
    }
}

//! populate a [`DefinitionTree`] from a store.
//!
//! absent files are tolerated: the slot keeps its default and the miss is
//! logged and reported. A file that exists but doesn't parse aborts the read.
//! Item folders without their primary file are not documents and are skipped.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::document::names;
use crate::document::{Doc, DocumentKind, Page, Report, VersionMetadata, VisualContainer};
use crate::store::{FilePattern, FileStore, RelativePath, StoreError};
use crate::tree::error::{TreeError, TreeResult};
use crate::tree::DefinitionTree;

/// What a read found and what it had to leave out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadReport {
    /// every document file read, in read order
    pub read: Vec<RelativePath>,
    /// expected singleton or metadata files that were absent
    pub missing: Vec<RelativePath>,
    /// item folders without a primary file
    pub skipped: Vec<RelativePath>,
}

/// Reads definition trees out of a [`FileStore`].
pub struct TreeReader {
    store: Arc<dyn FileStore>,
}

impl TreeReader {
    pub fn new(store: Arc<dyn FileStore>) -> Self {
        Self { store }
    }

    pub fn read(&self) -> TreeResult<DefinitionTree> {
        self.read_with_report().map(|(tree, _)| tree)
    }

    #[instrument(skip(self), fields(store = %self.store.describe()))]
    pub fn read_with_report(&self) -> TreeResult<(DefinitionTree, ReadReport)> {
        let mut tree = DefinitionTree::new();
        let mut report = ReadReport::default();
        let root = RelativePath::root();

        let version_file = RelativePath::known(names::VERSION_FILE);
        match self.load::<VersionMetadata>(&root, &version_file, &mut report)? {
            Some(doc) => tree.version = doc,
            None => missing(&version_file, &mut report, true),
        }

        let report_file = RelativePath::known(names::REPORT_FILE);
        match self.load::<Report>(&root, &report_file, &mut report)? {
            Some(doc) => tree.report = doc,
            None => missing(&report_file, &mut report, true),
        }

        let extensions_file = RelativePath::known(names::REPORT_EXTENSIONS_FILE);
        tree.report_extensions = self.load(&root, &extensions_file, &mut report)?;
        if tree.report_extensions.is_none() {
            missing(&extensions_file, &mut report, false);
        }

        self.read_bookmarks(&mut tree, &mut report)?;
        self.read_pages(&mut tree, &mut report)?;

        debug!(
            read = report.read.len(),
            missing = report.missing.len(),
            skipped = report.skipped.len(),
            "read definition"
        );

        tree.set_source(Arc::clone(&self.store));
        Ok((tree, report))
    }

    /// read one document of kind `K` at `folder/file`.
    ///
    /// The document's own path is set to `file`, relative to `folder`; `None` if
    /// the file doesn't exist.
    pub fn read_document<K: DocumentKind>(&self, folder: &RelativePath, file: &RelativePath) -> TreeResult<Option<Doc<K>>> {
        let full = folder.join(file);
        let text = match self.store.read_text(&full) {
            Ok(text) => text,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let malformed = |source| TreeError::MalformedPayload {
            path: full.clone(),
            source,
        };
        let value: Value = serde_json::from_str(&text).map_err(malformed)?;
        let doc = Doc::<K>::from_json(value).map_err(malformed)?.at(file.clone());

        debug!(path = %full, kind = K::KIND, "read document");
        Ok(Some(doc))
    }

    /// [`TreeReader::read_document`], recording the read
    fn load<K: DocumentKind>(
        &self,
        folder: &RelativePath,
        file: &RelativePath,
        report: &mut ReadReport,
    ) -> TreeResult<Option<Doc<K>>> {
        let doc = self.read_document::<K>(folder, file)?;
        if doc.is_some() {
            report.read.push(folder.join(file));
        }
        Ok(doc)
    }

    fn read_bookmarks(&self, tree: &mut DefinitionTree, report: &mut ReadReport) -> TreeResult<()> {
        let folder = tree.bookmarks.effective_path()?;

        let metadata_file = RelativePath::known(names::BOOKMARKS_METADATA_FILE);
        let metadata = self.load(&folder, &metadata_file, report)?;
        if metadata.is_none() {
            missing(&folder.join(&metadata_file), report, false);
        }
        tree.bookmarks.set_metadata(metadata);

        let pattern = FilePattern::new(names::BOOKMARK_PATTERN).map_err(StoreError::from)?;
        for file in self.store.list_files(&pattern, Some(&folder), false)? {
            if let Some(bookmark) = self.load(&folder, &file, report)? {
                tree.bookmarks.push(bookmark);
            }
        }
        Ok(())
    }

    fn read_pages(&self, tree: &mut DefinitionTree, report: &mut ReadReport) -> TreeResult<()> {
        let folder = tree.pages.effective_path()?;

        let metadata_file = RelativePath::known(names::PAGES_METADATA_FILE);
        let metadata = self.load(&folder, &metadata_file, report)?;
        if metadata.is_none() {
            missing(&folder.join(&metadata_file), report, false);
        }
        tree.pages.set_metadata(metadata);

        for page_folder in self.store.list_folders(Some(&folder), false)? {
            let primary = item_file(&page_folder, names::PAGE_FILE);
            let Some(page) = self.load::<Page>(&folder, &primary, report)? else {
                skipped(folder.join(&page_folder), report);
                continue;
            };

            let page = tree.pages.push(page);
            let visuals_folder = page.visuals().effective_path()?;

            for visual_folder in self.store.list_folders(Some(&visuals_folder), false)? {
                let primary = item_file(&visual_folder, names::VISUAL_FILE);
                let Some(mut visual) = self.load::<VisualContainer>(&visuals_folder, &primary, report)? else {
                    skipped(visuals_folder.join(&visual_folder), report);
                    continue;
                };

                let companion = item_file(&visual_folder, names::VISUAL_MOBILE_FILE);
                let mobile = self.load(&visuals_folder, &companion, report)?;
                visual.set_mobile_state(mobile);
                page.visuals_mut().push(visual);
            }
        }
        Ok(())
    }
}

fn missing(path: &RelativePath, report: &mut ReadReport, expected: bool) {
    if expected {
        warn!(path = %path, "expected file not found, keeping default");
    } else {
        debug!(path = %path, "optional file not present");
    }
    report.missing.push(path.clone());
}

fn skipped(folder: RelativePath, report: &mut ReadReport) {
    warn!(folder = %folder, "folder has no primary document, skipping");
    report.skipped.push(folder);
}

/// path of an item's file relative to its collection folder
fn item_file(item_folder: &RelativePath, file: &'static str) -> RelativePath {
    item_folder.join(&RelativePath::known(file))
}

//! the definition tree and the engines that move it to and from a store.
//!
//! ```text
//!   FileStore ──TreeReader──▶ DefinitionTree ──TreeWriter──▶ FileStore
//!                                                 plan    (snapshot existing files)
//!                                                 execute (write every document)
//!                                                 apply   (delete orphans, prune folders)
//! ```

mod error;
mod reader;
mod writer;

#[cfg(test)]
pub(crate) mod fixtures;

use std::fmt;
use std::sync::Arc;

pub use error::{TreeError, TreeResult};
pub use reader::{ReadReport, TreeReader};
pub use writer::{Reconciliation, TreeWriter, WriteOptions, WritePlan, WriteReport};

use crate::document::names;
use crate::document::{
    Bookmark, BookmarksMetadata, Doc, DocumentCollectionWithMetadata, Page, PagesMetadata, Report, ReportExtension,
    VersionMetadata,
};
use crate::store::{FileStore, RelativePath};

/// The aggregate root of a report definition.
///
/// The tree owns every document in it. A tree produced by [`TreeReader`]
/// remembers the store it came from so it can be written back in place.
pub struct DefinitionTree {
    pub version: Doc<VersionMetadata>,
    pub report: Doc<Report>,
    pub report_extensions: Option<Doc<ReportExtension>>,
    pub bookmarks: DocumentCollectionWithMetadata<Bookmark, BookmarksMetadata>,
    pub pages: DocumentCollectionWithMetadata<Page, PagesMetadata>,
    source: Option<Arc<dyn FileStore>>,
}

impl Default for DefinitionTree {
    fn default() -> Self {
        Self {
            version: Doc::new(VersionMetadata::default()),
            report: Doc::new(Report::default()),
            report_extensions: None,
            bookmarks: DocumentCollectionWithMetadata::new(RelativePath::known(names::BOOKMARKS_FOLDER)),
            pages: DocumentCollectionWithMetadata::new(RelativePath::known(names::PAGES_FOLDER)),
            source: None,
        }
    }
}

impl DefinitionTree {
    /// an empty definition, not bound to any store
    pub fn new() -> Self {
        Self::default()
    }

    /// read a definition from `store`
    pub fn read_from(store: Arc<dyn FileStore>) -> TreeResult<Self> {
        TreeReader::new(store).read()
    }

    /// the store this tree was read from, if any
    pub fn source(&self) -> Option<&Arc<dyn FileStore>> {
        self.source.as_ref()
    }

    pub(crate) fn set_source(&mut self, store: Arc<dyn FileStore>) {
        self.source = Some(store);
    }

    /// write the tree to `store`
    pub fn write_to(&mut self, store: &dyn FileStore, options: WriteOptions) -> TreeResult<WriteReport> {
        TreeWriter::new(store).with_options(options).write(self)
    }

    /// write the tree back to the store it was read from
    pub fn write_back(&mut self, options: WriteOptions) -> TreeResult<WriteReport> {
        let source = self.source.clone().ok_or(TreeError::NoSourceStore)?;
        TreeWriter::new(source.as_ref()).with_options(options).write(self)
    }

    /// look a page up by its name
    pub fn page(&self, name: &str) -> Option<&Doc<Page>> {
        self.pages.find(|page| page.name == name).ok()
    }

    pub fn page_mut(&mut self, name: &str) -> Option<&mut Doc<Page>> {
        self.pages.find_mut(|page| page.name == name).ok()
    }

    /// number of documents in the tree, counting every file it would write
    pub fn document_count(&self) -> usize {
        let singletons = 2 + usize::from(self.report_extensions.is_some());
        let bookmarks = self.bookmarks.len() + usize::from(self.bookmarks.metadata().is_some());
        let pages = self.pages.len() + usize::from(self.pages.metadata().is_some());
        let visuals: usize = self
            .pages
            .iter()
            .flat_map(|page| page.visuals().iter())
            .map(|visual| 1 + usize::from(visual.mobile_state().is_some()))
            .sum();
        singletons + bookmarks + pages + visuals
    }
}

impl fmt::Debug for DefinitionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefinitionTree")
            .field("version", &self.version)
            .field("report", &self.report)
            .field("report_extensions", &self.report_extensions)
            .field("bookmarks", &self.bookmarks)
            .field("pages", &self.pages)
            .field("source", &self.source.as_ref().map(|s| s.describe()))
            .finish()
    }
}

/// Trees compare by content; where they were read from does not matter.
impl PartialEq for DefinitionTree {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.report == other.report
            && self.report_extensions == other.report_extensions
            && self.bookmarks == other.bookmarks
            && self.pages == other.pages
    }
}

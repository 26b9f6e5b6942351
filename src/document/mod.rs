//! the document model: nodes, typed documents over raw JSON, and collections.
//!
//! ```text
//! DefinitionTree
//!   ├── Doc<VersionMetadata>            version.json
//!   ├── Doc<Report>                     report.json
//!   ├── Doc<ReportExtension>?           reportExtensions.json
//!   ├── bookmarks/                      DocumentCollectionWithMetadata<Bookmark, BookmarksMetadata>
//!   │     ├── bookmarks.json
//!   │     └── <name>.bookmark.json
//!   └── pages/                          DocumentCollectionWithMetadata<Page, PagesMetadata>
//!         ├── pages.json
//!         └── <page>/page.json          Doc<Page>  (anchors children at its folder)
//!               └── visuals/            DocumentCollection<VisualContainer>
//!                     └── <visual>/visual.json
//!                           └── mobile.json   (companion, resolves in the visuals folder)
//! ```

mod annotation;
mod collection;
mod doc;
mod error;
mod kinds;
pub mod names;
mod node;

pub use annotation::{Annotated, Annotation};
pub use collection::{DocumentCollection, DocumentCollectionWithMetadata};
pub use doc::{Doc, DocumentKind, SCHEMA_KEY};
pub use error::{DocumentError, DocumentResult};
pub use kinds::{
    is_report_schema, Bookmark, BookmarkGroup, BookmarkItem, BookmarkReference, BookmarksMetadata, Page,
    PagesMetadata, Report, ReportExtension, VersionMetadata, VisualContainer, VisualMobileState, VisualPosition,
};
pub use node::{ChildAnchor, Node};

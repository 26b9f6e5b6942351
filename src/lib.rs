//! reportdef - a typed document tree for folder-based report definitions
//!
//! A report definition is a folder of JSON files: a version marker, the report
//! itself, bookmarks and pages, each page owning its visuals. This crate reads
//! such a folder into a [`DefinitionTree`] of typed documents, lets callers
//! edit it, and writes it back so that the folder mirrors the tree exactly.
//! Properties the types do not model survive the round trip untouched.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use reportdef::store::DirectoryStore;
//! use reportdef::tree::{DefinitionTree, WriteOptions};
//!
//! let store = Arc::new(DirectoryStore::new("./Sales.Report/definition"));
//! let mut tree = DefinitionTree::read_from(store).unwrap();
//! tree.page_mut("overview").unwrap().display_name = Some("Summary".into());
//! tree.write_back(WriteOptions::default()).unwrap();
//! ```

pub mod document;
pub mod resolve;
pub mod store;
pub mod tree;

pub use document::{Doc, DocumentKind};
pub use store::{FileStore, RelativePath};
pub use tree::{DefinitionTree, TreeReader, TreeWriter, WriteOptions};

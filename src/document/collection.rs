//! ordered groups of sibling documents under one folder

use std::ops::{Deref, DerefMut};

use tracing::trace;

use crate::document::doc::{Doc, DocumentKind};
use crate::document::error::{DocumentError, DocumentResult};
use crate::document::node::{ChildAnchor, Node};
use crate::store::RelativePath;

/// An insertion-ordered collection of documents of one kind.
///
/// The collection is a node itself: its path is the folder its items resolve
/// against, and every item pushed into it is parented to it.
#[derive(Debug)]
pub struct DocumentCollection<K> {
    node: Node,
    items: Vec<Doc<K>>,
}

impl<K: DocumentKind> DocumentCollection<K> {
    pub fn new(path: RelativePath) -> Self {
        Self {
            node: Node::with_path("collection", ChildAnchor::Path, path),
            items: Vec::new(),
        }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn path(&self) -> Option<RelativePath> {
        self.node.path()
    }

    pub fn effective_path(&self) -> DocumentResult<RelativePath> {
        self.node.effective_path()
    }

    /// append a document, making this collection its parent
    pub fn push(&mut self, doc: Doc<K>) -> &mut Doc<K> {
        doc.node.set_parent(&self.node);
        trace!(kind = K::KIND, count = self.items.len() + 1, "added document to collection");
        self.items.push(doc);
        let last = self.items.len() - 1;
        &mut self.items[last]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Doc<K>> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Doc<K>> {
        self.items.iter_mut()
    }

    pub fn get(&self, index: usize) -> Option<&Doc<K>> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Doc<K>> {
        self.items.get_mut(index)
    }

    /// the first document matching `predicate`
    pub fn find<P>(&self, predicate: P) -> DocumentResult<&Doc<K>>
    where
        P: Fn(&Doc<K>) -> bool,
    {
        self.items
            .iter()
            .find(|doc| predicate(doc))
            .ok_or(DocumentError::NotFoundInCollection { kind: K::KIND })
    }

    pub fn find_mut<P>(&mut self, predicate: P) -> DocumentResult<&mut Doc<K>>
    where
        P: Fn(&Doc<K>) -> bool,
    {
        self.items
            .iter_mut()
            .find(|doc| predicate(doc))
            .ok_or(DocumentError::NotFoundInCollection { kind: K::KIND })
    }

    /// take the document at `index` out of the collection, unlinking it
    pub fn remove(&mut self, index: usize) -> Option<Doc<K>> {
        if index >= self.items.len() {
            return None;
        }
        let doc = self.items.remove(index);
        doc.node.clear_parent();
        Some(doc)
    }

    pub fn retain<P>(&mut self, predicate: P)
    where
        P: Fn(&Doc<K>) -> bool,
    {
        self.items.retain(|doc| predicate(doc));
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<'a, K> IntoIterator for &'a DocumentCollection<K> {
    type Item = &'a Doc<K>;
    type IntoIter = std::slice::Iter<'a, Doc<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<'a, K> IntoIterator for &'a mut DocumentCollection<K> {
    type Item = &'a mut Doc<K>;
    type IntoIter = std::slice::IterMut<'a, Doc<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter_mut()
    }
}

impl<K: PartialEq> PartialEq for DocumentCollection<K> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node && self.items == other.items
    }
}

/// A [`DocumentCollection`] plus one optional metadata document.
///
/// The metadata is parented to the collection node, so its file resolves
/// inside the collection's folder rather than next to any item.
#[derive(Debug)]
pub struct DocumentCollectionWithMetadata<K, M> {
    documents: DocumentCollection<K>,
    metadata: Option<Doc<M>>,
}

impl<K: DocumentKind, M: DocumentKind> DocumentCollectionWithMetadata<K, M> {
    pub fn new(path: RelativePath) -> Self {
        Self {
            documents: DocumentCollection::new(path),
            metadata: None,
        }
    }

    pub fn metadata(&self) -> Option<&Doc<M>> {
        self.metadata.as_ref()
    }

    pub fn metadata_mut(&mut self) -> Option<&mut Doc<M>> {
        self.metadata.as_mut()
    }

    /// replace the metadata document, parenting the new one to the collection
    pub fn set_metadata(&mut self, metadata: Option<Doc<M>>) -> Option<Doc<M>> {
        if let Some(doc) = &metadata {
            doc.node.set_parent(&self.documents.node);
        }
        std::mem::replace(&mut self.metadata, metadata)
    }
}

impl<K, M> Deref for DocumentCollectionWithMetadata<K, M> {
    type Target = DocumentCollection<K>;

    fn deref(&self) -> &Self::Target {
        &self.documents
    }
}

impl<K, M> DerefMut for DocumentCollectionWithMetadata<K, M> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.documents
    }
}

impl<K: PartialEq, M: PartialEq> PartialEq for DocumentCollectionWithMetadata<K, M> {
    fn eq(&self, other: &Self) -> bool {
        self.documents == other.documents && self.metadata == other.metadata
    }
}

//! tree membership: own path plus a non-owning parent link.
//!
//! ownership in a definition is strictly top-down. A [`DefinitionTree`] owns its
//! collections, collections own their documents, and a document owns any
//! nested collection or companion. The upward link is a [`Weak`] handle used only
//! for path lookup, so dropping the tree drops everything.
//!
//! [`DefinitionTree`]: crate::tree::DefinitionTree

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::document::error::{DocumentError, DocumentResult};
use crate::store::RelativePath;

/// How the children of a node compose their paths with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildAnchor {
    /// children resolve below this node's effective path (collections, plain documents)
    Path,
    /// children resolve below the folder holding this node's file (an item owning a sub-collection)
    Folder,
    /// children resolve against this node's own parent (a companion lives next to its owner,
    /// in the owner's collection folder)
    Grandparent,
}

/// The tree-membership capability shared by documents and collections.
///
/// A `Node` is not `Clone`: each one has exactly one owner, and the only other
/// references to it are the weak parent links of its children.
pub struct Node {
    cell: Arc<NodeCell>,
}

struct NodeCell {
    kind: &'static str,
    anchor: ChildAnchor,
    path: RwLock<Option<RelativePath>>,
    parent: RwLock<Weak<NodeCell>>,
}

impl Node {
    pub fn new(kind: &'static str, anchor: ChildAnchor) -> Self {
        Self {
            cell: Arc::new(NodeCell {
                kind,
                anchor,
                path: RwLock::new(None),
                parent: RwLock::new(Weak::new()),
            }),
        }
    }

    pub fn with_path(kind: &'static str, anchor: ChildAnchor, path: RelativePath) -> Self {
        let node = Self::new(kind, anchor);
        node.set_path(Some(path));
        node
    }

    pub fn kind(&self) -> &'static str {
        self.cell.kind
    }

    pub fn anchor(&self) -> ChildAnchor {
        self.cell.anchor
    }

    /// the node's own path contribution, if assigned
    pub fn path(&self) -> Option<RelativePath> {
        self.cell.path.read().clone()
    }

    pub fn set_path(&self, path: Option<RelativePath>) {
        *self.cell.path.write() = path;
    }

    /// make `parent` this node's parent, replacing any previous link
    pub fn set_parent(&self, parent: &Node) {
        *self.cell.parent.write() = Arc::downgrade(&parent.cell);
    }

    pub fn clear_parent(&self) {
        *self.cell.parent.write() = Weak::new();
    }

    /// the parent node, if linked and still alive
    pub fn parent(&self) -> Option<Node> {
        self.cell.parent.read().upgrade().map(|cell| Node { cell })
    }

    pub fn is_child_of(&self, other: &Node) -> bool {
        self.parent().is_some_and(|parent| Arc::ptr_eq(&parent.cell, &other.cell))
    }

    /// resolve this node's store-relative location by walking the parent chain.
    ///
    /// Fails with [`DocumentError::MissingPath`] if this node or any ancestor
    /// that contributes to the result has no path.
    pub fn effective_path(&self) -> DocumentResult<RelativePath> {
        let own = self.path().ok_or(DocumentError::MissingPath { kind: self.kind() })?;
        self.resolve(&own)
    }

    /// compose `own` with the parent chain as if it were this node's path
    pub(crate) fn resolve(&self, own: &RelativePath) -> DocumentResult<RelativePath> {
        let Some(parent) = self.parent() else {
            return Ok(own.clone());
        };

        match parent.anchor() {
            ChildAnchor::Path => Ok(parent.effective_path()?.join(own)),
            ChildAnchor::Folder => Ok(parent.effective_path()?.without_last().join(own)),
            ChildAnchor::Grandparent => match parent.parent() {
                Some(grandparent) => Ok(grandparent.effective_path()?.join(own)),
                None => Ok(own.clone()),
            },
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // parent links are left out, the chain is cyclic through the owners
        f.debug_struct("Node")
            .field("kind", &self.cell.kind)
            .field("path", &*self.cell.path.read())
            .field("has_parent", &self.parent().is_some())
            .finish()
    }
}

/// Nodes compare by their own path only, never by position in a tree.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.path() == other.path()
    }
}

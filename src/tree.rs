//! Discourse dependency forests
//!
//! A document's records are turned into an arena of nodes. Children are
//! stored as arena indices, in the order their records appeared, and every
//! record whose head is 0 starts a separate tree. A negative head attaches
//! the node nowhere: it is neither a root nor anyone's child.

use crate::rsd::Record;
use rustc_hash::{FxBuildHasher, FxHashMap};
use thiserror::Error;

/// Identifier of a discourse unit, as written in the file
pub type NodeId = u32;

/// Head field of a record: 0 for a root, negative for a detached node
pub type Head = i64;

/// Error while linking records into a forest
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForestError {
    #[error("node {id} has head {head}, which is not a node in this document")]
    DanglingHead { id: NodeId, head: Head },

    #[error("node {id} appears more than once")]
    DuplicateId { id: NodeId },
}

/// A discourse unit in a dependency forest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    /// Governing node, 0 for a root, negative when detached
    pub head: Head,
    /// Arena indices of the dependents, in record order
    pub children: Vec<usize>,
}

impl Node {
    pub fn new(id: NodeId, head: Head) -> Self {
        Self {
            id,
            head,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// All trees of one document
#[derive(Debug, Clone, Default)]
pub struct Forest {
    nodes: Vec<Node>,
    roots: Vec<usize>,
    index: FxHashMap<NodeId, usize>,
}

impl Forest {
    /// Link records into trees.
    ///
    /// Heads are resolved through an identifier map, so identifiers need
    /// not be dense or sorted. A head that names no record is an error, as
    /// is an identifier used twice. Nodes with a negative head are kept
    /// but left unlinked.
    pub fn build(records: &[Record]) -> Result<Self, ForestError> {
        let mut index: FxHashMap<NodeId, usize> =
            FxHashMap::with_capacity_and_hasher(records.len(), FxBuildHasher);
        let mut nodes = Vec::with_capacity(records.len());

        for (idx, record) in records.iter().enumerate() {
            if index.insert(record.id, idx).is_some() {
                return Err(ForestError::DuplicateId { id: record.id });
            }
            nodes.push(Node::new(record.id, record.head));
        }

        let mut roots = Vec::new();
        for idx in 0..nodes.len() {
            let Node { id, head, .. } = nodes[idx];
            if head == 0 {
                roots.push(idx);
                continue;
            }
            if head < 0 {
                continue;
            }
            let parent = NodeId::try_from(head)
                .ok()
                .and_then(|head| index.get(&head).copied())
                .ok_or(ForestError::DanglingHead { id, head })?;
            nodes[parent].children.push(idx);
        }

        Ok(Self {
            nodes,
            roots,
            index,
        })
    }

    /// Get a node by arena index
    ///
    /// Panics if `idx` did not come from this forest.
    #[inline]
    pub fn node(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    #[inline]
    pub fn children(&self, idx: usize) -> &[usize] {
        &self.nodes[idx].children
    }

    /// Arena indices of the tree roots, in record order
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Arena index of the node with identifier `id`
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth-first pre-order walk over every tree, roots in order and
    /// children left to right
    pub fn iter_preorder(&self) -> Preorder<'_> {
        Preorder {
            forest: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }
}

/// Pre-order iterator over arena indices, see [`Forest::iter_preorder`]
pub struct Preorder<'f> {
    forest: &'f Forest,
    stack: Vec<usize>,
}

impl Iterator for Preorder<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let idx = self.stack.pop()?;
        self.stack
            .extend(self.forest.children(idx).iter().rev().copied());
        Some(idx)
    }
}

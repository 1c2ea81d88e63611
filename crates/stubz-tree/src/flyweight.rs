//! Flyweight read-only navigation.
//!
//! Tooling that only reads structure walks a tree through `FlyweightTree`:
//! children are written into a caller-owned buffer that is reused across
//! calls, so a full traversal allocates no per-node arrays. Neither
//! implementation mutates node state; `TreeView` expands a chameleon only
//! when its children are actually requested.

use crate::error::ExpandError;
use crate::light::{LightNodeId, LightTree};
use crate::tree::{NodeIndex, SyntaxTree};
use crate::SyntaxKind;
use std::borrow::Cow;
use stubz_common::limits::FLYWEIGHT_INITIAL_CAPACITY;

pub trait FlyweightTree {
    type Node: Copy + Eq;

    fn root(&self) -> Self::Node;

    /// Turn a node into a handle usable with the other methods.
    fn prepare(&self, node: Self::Node) -> Self::Node {
        node
    }

    /// Write the children of `node` into `buffer[..count]`, in source order,
    /// and return `count`. Slots past `count` hold stale entries.
    fn children(&self, node: Self::Node, buffer: &mut Vec<Self::Node>)
    -> Result<usize, ExpandError>;

    /// Hand a buffer back after use. Reserved for pooled buffers.
    fn dispose(&self, _nodes: &mut Vec<Self::Node>, _count: usize) {}

    fn kind(&self, node: Self::Node) -> Option<SyntaxKind>;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    fn node_text(&self, node: Self::Node) -> Cow<'_, str>;
}

/// Store `node` at `slot`, growing the buffer by half when it is full.
///
/// The buffer is never shrunk.
pub fn put_slot<N: Copy>(buffer: &mut Vec<N>, slot: usize, node: N) {
    if let Some(existing) = buffer.get_mut(slot) {
        *existing = node;
        return;
    }
    if buffer.len() == buffer.capacity() {
        let grow = (buffer.capacity() / 2).max(FLYWEIGHT_INITIAL_CAPACITY);
        buffer.reserve_exact(grow);
    }
    buffer.push(node);
}

impl FlyweightTree for LightTree {
    type Node = LightNodeId;

    fn root(&self) -> LightNodeId {
        LightTree::root(self)
    }

    fn children(
        &self,
        node: LightNodeId,
        buffer: &mut Vec<LightNodeId>,
    ) -> Result<usize, ExpandError> {
        let mut count = 0;
        for child in LightTree::children(self, node) {
            put_slot(buffer, count, child);
            count += 1;
        }
        Ok(count)
    }

    fn kind(&self, node: LightNodeId) -> Option<SyntaxKind> {
        LightTree::kind(self, node)
    }

    fn parent(&self, node: LightNodeId) -> Option<LightNodeId> {
        Some(LightTree::parent(self, node)).filter(|p| p.is_some())
    }

    fn node_text(&self, node: LightNodeId) -> Cow<'_, str> {
        Cow::Borrowed(LightTree::node_text(self, node))
    }
}

/// Flyweight view over a `SyntaxTree`.
#[derive(Clone, Copy)]
pub struct TreeView<'a> {
    tree: &'a SyntaxTree,
}

impl<'a> TreeView<'a> {
    pub fn new(tree: &'a SyntaxTree) -> TreeView<'a> {
        TreeView { tree }
    }

    pub fn tree(&self) -> &'a SyntaxTree {
        self.tree
    }
}

impl FlyweightTree for TreeView<'_> {
    type Node = NodeIndex;

    fn root(&self) -> NodeIndex {
        self.tree.root()
    }

    fn children(&self, node: NodeIndex, buffer: &mut Vec<NodeIndex>) -> Result<usize, ExpandError> {
        let mut count = 0;
        let mut child = self.tree.first_child(node)?;
        while child.is_some() {
            put_slot(buffer, count, child);
            count += 1;
            child = self.tree.next_sibling(child);
        }
        Ok(count)
    }

    fn kind(&self, node: NodeIndex) -> Option<SyntaxKind> {
        self.tree.kind(node)
    }

    fn parent(&self, node: NodeIndex) -> Option<NodeIndex> {
        Some(self.tree.parent(node)).filter(|p| p.is_some())
    }

    fn node_text(&self, node: NodeIndex) -> Cow<'_, str> {
        match self.tree.token_text(node) {
            Some(text) => Cow::Borrowed(text),
            None => Cow::Owned(self.tree.text(node)),
        }
    }
}

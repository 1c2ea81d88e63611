//! The node arena and the chameleon expansion engine.
//!
//! Nodes are addressed by `NodeIndex` and stored in an append-only arena.
//! Parent and sibling links are atomics written once when a subtree is
//! attached. The only lock is the private per-node body lock, which guards
//! the collapsed/expanded state of that one node.
//!
//! A chameleon starts `Collapsed { text }`. The first structural access
//! (`first_child`, `last_child`, `children`, `add_children`) takes the node
//! lock, runs the injected `ChameleonParser` on the text, allocates the
//! returned subtree and swaps the body to `Expanded`. Concurrent callers
//! block on the same lock and find the node already expanded, so the parser
//! runs once per node. The `ExpansionListener` is notified after the lock
//! is released.

use crate::arena::SlotArena;
use crate::error::{EventError, ExpandError};
use crate::green::{GreenNode, ParseEvent};
use crate::lock_order::NodeLockGuard;
use crate::SyntaxKind;
use smallvec::SmallVec;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{trace, warn};

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// Handle of a node inside one `SyntaxTree`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self == NodeIndex::NONE
    }

    #[inline]
    pub fn is_some(self) -> bool {
        self != NodeIndex::NONE
    }
}

/// Parses the raw text of a collapsed chameleon into its children.
///
/// Implementations must not touch the tree that owns the node: the call is
/// made while that node's expansion lock is held.
pub trait ChameleonParser: Send + Sync {
    fn parse(&self, kind: SyntaxKind, text: &str) -> Result<Vec<GreenNode>, ExpandError>;
}

/// Notified after a chameleon has been expanded, with no node lock held.
pub trait ExpansionListener: Send + Sync {
    fn subtree_expanded(&self, tree: &SyntaxTree, node: NodeIndex);
}

enum Body {
    Collapsed { text: Arc<str> },
    Expanded { first: NodeIndex, last: NodeIndex },
}

/// What an expansion found, reported once the node lock is gone.
enum Outcome {
    Expanded,
    Empty { text_len: usize },
    LengthMismatch { expected: usize, produced: usize },
}

struct Node {
    kind: SyntaxKind,
    parent: AtomicU32,
    prev: AtomicU32,
    next: AtomicU32,
    token: Option<Arc<str>>,
    body: Mutex<Body>,
}

impl Node {
    fn new(kind: SyntaxKind, token: Option<Arc<str>>, body: Body) -> Node {
        Node {
            kind,
            parent: AtomicU32::new(NodeIndex::NONE.0),
            prev: AtomicU32::new(NodeIndex::NONE.0),
            next: AtomicU32::new(NodeIndex::NONE.0),
            token,
            body: Mutex::new(body),
        }
    }

    fn link(cell: &AtomicU32) -> NodeIndex {
        NodeIndex(cell.load(Ordering::Acquire))
    }
}

const EMPTY: Body = Body::Expanded {
    first: NodeIndex::NONE,
    last: NodeIndex::NONE,
};

pub struct SyntaxTree {
    id: u64,
    nodes: SlotArena<Node>,
    root: NodeIndex,
    parser: Arc<dyn ChameleonParser>,
    listener: Option<Arc<dyn ExpansionListener>>,
    verify_lengths: bool,
}

impl SyntaxTree {
    pub fn from_green(root: &GreenNode, parser: Arc<dyn ChameleonParser>) -> SyntaxTree {
        let mut tree = SyntaxTree {
            id: NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed),
            nodes: SlotArena::new(),
            root: NodeIndex::NONE,
            parser,
            listener: None,
            verify_lengths: true,
        };
        tree.root = tree.alloc(root);
        tree
    }

    /// Build a tree from parser events, collapsing every lazy element.
    pub fn from_events(
        text: &str,
        events: &[ParseEvent],
        parser: Arc<dyn ChameleonParser>,
    ) -> Result<SyntaxTree, EventError> {
        let mut roots = GreenNode::from_events(text, events, true)?;
        if roots.len() != 1 {
            return Err(EventError::RootCount { count: roots.len() });
        }
        let root = roots.remove(0);
        Ok(SyntaxTree::from_green(&root, parser))
    }

    pub fn with_listener(mut self, listener: Arc<dyn ExpansionListener>) -> SyntaxTree {
        self.listener = Some(listener);
        self
    }

    /// Toggle the text-length check run after every expansion.
    pub fn with_length_verification(mut self, verify: bool) -> SyntaxTree {
        self.verify_lengths = verify;
        self
    }

    /// Process-unique identity of this tree.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    /// Number of nodes allocated so far, including expanded chameleon content.
    pub fn len(&self) -> usize {
        self.nodes.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    fn slot(&self, idx: NodeIndex) -> Option<&Node> {
        if idx.is_none() {
            return None;
        }
        self.nodes.get(idx.0)
    }

    pub fn kind(&self, idx: NodeIndex) -> Option<SyntaxKind> {
        self.slot(idx).map(|n| n.kind)
    }

    pub fn parent(&self, idx: NodeIndex) -> NodeIndex {
        self.slot(idx)
            .map_or(NodeIndex::NONE, |n| Node::link(&n.parent))
    }

    pub fn next_sibling(&self, idx: NodeIndex) -> NodeIndex {
        self.slot(idx).map_or(NodeIndex::NONE, |n| Node::link(&n.next))
    }

    pub fn prev_sibling(&self, idx: NodeIndex) -> NodeIndex {
        self.slot(idx).map_or(NodeIndex::NONE, |n| Node::link(&n.prev))
    }

    /// Text of a token node.
    pub fn token_text(&self, idx: NodeIndex) -> Option<&str> {
        self.slot(idx)?.token.as_deref()
    }

    /// True while a chameleon still holds raw text instead of children.
    pub fn is_collapsed(&self, idx: NodeIndex) -> bool {
        self.slot(idx).is_some_and(|n| {
            matches!(*NodeLockGuard::lock(&n.body), Body::Collapsed { .. })
        })
    }

    /// First child, expanding the node if it is collapsed.
    pub fn first_child(&self, idx: NodeIndex) -> Result<NodeIndex, ExpandError> {
        self.ensure_expanded(idx)?;
        Ok(self.child_bounds(idx).0)
    }

    /// Last child, expanding the node if it is collapsed.
    pub fn last_child(&self, idx: NodeIndex) -> Result<NodeIndex, ExpandError> {
        self.ensure_expanded(idx)?;
        Ok(self.child_bounds(idx).1)
    }

    /// Children in source order, expanding the node if it is collapsed.
    pub fn children(&self, idx: NodeIndex) -> Result<SmallVec<[NodeIndex; 8]>, ExpandError> {
        let mut out = SmallVec::new();
        let mut child = self.first_child(idx)?;
        while child.is_some() {
            out.push(child);
            child = self.next_sibling(child);
        }
        Ok(out)
    }

    /// First child if the node is already expanded; never expands.
    pub fn first_child_if_expanded(&self, idx: NodeIndex) -> Option<NodeIndex> {
        let node = self.slot(idx)?;
        match *NodeLockGuard::lock(&node.body) {
            Body::Collapsed { .. } => None,
            Body::Expanded { first, .. } => Some(first),
        }
    }

    fn child_bounds(&self, idx: NodeIndex) -> (NodeIndex, NodeIndex) {
        let Some(node) = self.slot(idx) else {
            return (NodeIndex::NONE, NodeIndex::NONE);
        };
        match *NodeLockGuard::lock(&node.body) {
            Body::Collapsed { .. } => (NodeIndex::NONE, NodeIndex::NONE),
            Body::Expanded { first, last } => (first, last),
        }
    }

    /// Length of the node's text. Never expands.
    pub fn text_length(&self, idx: NodeIndex) -> u32 {
        let Some(node) = self.slot(idx) else {
            return 0;
        };
        if let Some(token) = &node.token {
            return token.len() as u32;
        }
        let first = match &*NodeLockGuard::lock(&node.body) {
            Body::Collapsed { text } => return text.len() as u32,
            Body::Expanded { first, .. } => *first,
        };
        let mut total = 0;
        let mut child = first;
        while child.is_some() {
            total += self.text_length(child);
            child = self.next_sibling(child);
        }
        total
    }

    /// Source text of the node. Never expands.
    pub fn text(&self, idx: NodeIndex) -> String {
        let mut out = String::with_capacity(self.text_length(idx) as usize);
        self.write_text(idx, &mut out);
        out
    }

    fn write_text(&self, idx: NodeIndex, out: &mut String) {
        let Some(node) = self.slot(idx) else {
            return;
        };
        if let Some(token) = &node.token {
            out.push_str(token);
            return;
        }
        let first = match &*NodeLockGuard::lock(&node.body) {
            Body::Collapsed { text } => {
                out.push_str(text);
                return;
            }
            Body::Expanded { first, .. } => *first,
        };
        let mut child = first;
        while child.is_some() {
            self.write_text(child, out);
            child = self.next_sibling(child);
        }
    }

    /// Expand a collapsed chameleon. A no-op for any other node.
    ///
    /// On parser failure the error is returned to this caller and the node
    /// stays collapsed.
    pub fn ensure_expanded(&self, idx: NodeIndex) -> Result<(), ExpandError> {
        let Some(node) = self.slot(idx) else {
            return Ok(());
        };
        let (outcome, children) = {
            let mut body = NodeLockGuard::lock(&node.body);
            let text = match &*body {
                Body::Collapsed { text } => Arc::clone(text),
                Body::Expanded { .. } => return Ok(()),
            };

            let children = self.parser.parse(node.kind, &text)?;

            let outcome = if children.is_empty() && !text.is_empty() {
                Outcome::Empty {
                    text_len: text.len(),
                }
            } else {
                let produced: usize = children.iter().map(|c| c.text_len() as usize).sum();
                if self.verify_lengths && produced != text.len() {
                    Outcome::LengthMismatch {
                        expected: text.len(),
                        produced,
                    }
                } else {
                    Outcome::Expanded
                }
            };

            let (first, last) = self.alloc_chain(&children);
            self.adopt(idx, first);
            *body = Body::Expanded { first, last };
            (outcome, children.len())
        };

        // Logged with the node lock released: subscribers may take their own locks.
        match outcome {
            Outcome::Empty { text_len } => warn!(
                node = idx.0,
                kind = ?node.kind,
                text_len,
                "chameleon parser produced no children for non-empty text"
            ),
            Outcome::LengthMismatch { expected, produced } => warn!(
                node = idx.0,
                kind = ?node.kind,
                expected,
                produced,
                "chameleon expansion changed text length"
            ),
            Outcome::Expanded => {}
        }
        trace!(node = idx.0, kind = ?node.kind, children, "expanded chameleon");

        if let Some(listener) = &self.listener {
            listener.subtree_expanded(self, idx);
        }
        Ok(())
    }

    /// Append children, expanding the node first if it is collapsed.
    pub fn add_children(&self, idx: NodeIndex, children: &[GreenNode]) -> Result<(), ExpandError> {
        self.ensure_expanded(idx)?;
        self.raw_add_children(idx, children);
        Ok(())
    }

    /// Append children to an already expanded composite node.
    ///
    /// # Panics
    ///
    /// When `idx` is a token, or a chameleon that still holds its text. Both
    /// mean the caller bypassed the expansion path.
    pub fn raw_add_children(&self, idx: NodeIndex, children: &[GreenNode]) {
        let Some(node) = self.slot(idx) else {
            return;
        };
        assert!(
            node.token.is_none(),
            "raw_add_children on token node {} ({:?})",
            idx.0,
            node.kind
        );
        let mut body = NodeLockGuard::lock(&node.body);
        let Body::Expanded { first, last } = &mut *body else {
            panic!(
                "raw_add_children on collapsed chameleon {} ({:?}); it must be expanded first",
                idx.0, node.kind
            );
        };

        let (new_first, new_last) = self.alloc_chain(children);
        if new_first.is_none() {
            return;
        }
        self.adopt(idx, new_first);
        if let Some(old_last) = self.slot(*last) {
            old_last.next.store(new_first.0, Ordering::Release);
            if let Some(head) = self.slot(new_first) {
                head.prev.store(last.0, Ordering::Release);
            }
        } else {
            *first = new_first;
        }
        *last = new_last;
    }

    fn push(&self, node: Node) -> NodeIndex {
        NodeIndex(self.nodes.push(node))
    }

    // Children are allocated before their parent so no node is ever locked
    // while the subtree is being built.
    fn alloc(&self, green: &GreenNode) -> NodeIndex {
        match green {
            GreenNode::Token { kind, text } => {
                self.push(Node::new(*kind, Some(Arc::clone(text)), EMPTY))
            }
            GreenNode::Lazy { kind, text } => self.push(Node::new(
                *kind,
                None,
                Body::Collapsed {
                    text: Arc::clone(text),
                },
            )),
            GreenNode::Composite { kind, children } => {
                let (first, last) = self.alloc_chain(children);
                let idx = self.push(Node::new(*kind, None, Body::Expanded { first, last }));
                self.adopt(idx, first);
                idx
            }
        }
    }

    fn alloc_chain(&self, children: &[GreenNode]) -> (NodeIndex, NodeIndex) {
        let mut first = NodeIndex::NONE;
        let mut prev = NodeIndex::NONE;
        for child in children {
            let idx = self.alloc(child);
            match (self.slot(prev), self.slot(idx)) {
                (Some(prev_node), Some(node)) => {
                    prev_node.next.store(idx.0, Ordering::Release);
                    node.prev.store(prev.0, Ordering::Release);
                }
                _ => first = idx,
            }
            prev = idx;
        }
        (first, prev)
    }

    fn adopt(&self, parent: NodeIndex, first: NodeIndex) {
        let mut child = first;
        while let Some(node) = self.slot(child) {
            node.parent.store(parent.0, Ordering::Release);
            child = Node::link(&node.next);
        }
    }
}

impl std::fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("id", &self.id)
            .field("root", &self.root)
            .field("nodes", &self.len())
            .finish()
    }
}

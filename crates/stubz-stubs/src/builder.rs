//! Stub tree builders.
//!
//! Both builders walk the syntax depth-first. Nodes whose kind has an element
//! type become stubs under the nearest enclosing stub; every other composite
//! is transparent. The full path reads a `SyntaxTree` (expanding chameleons
//! it descends into), the fast path reads a `LightTree`. Both feed the same
//! element types, so they agree on every stub.

use crate::element_type::{StubElementType, registry};
use crate::error::IndexError;
use crate::stub::{FileStub, StubData, StubId, StubTree};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use stubz_common::limits::MAX_STUB_DEPTH;
use stubz_tree::{ExpandError, FlyweightTree, LightTree, SyntaxTree, TreeView};
use tracing::{debug, warn};

/// Polled once per visited node; a cancelled walk yields
/// `IndexError::Cancelled` and no stub tree.
pub trait Cancellation: Sync {
    fn is_cancelled(&self) -> bool;
}

pub struct NeverCancel;

impl Cancellation for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Shared flag, typically flipped when the file being indexed is invalidated.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> CancellationToken {
        CancellationToken::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

impl Cancellation for CancellationToken {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Build the stub tree of a full syntax tree.
pub fn build_stub_tree(
    tree: &SyntaxTree,
    cancel: &dyn Cancellation,
) -> Result<StubTree, IndexError> {
    let view = TreeView::new(tree);
    let stubs = Walker::new(&view, cancel, |element_type, node, stubs, parent| {
        element_type.create_stub(tree, node, stubs, parent)
    })
    .run()?;
    debug!(tree = tree.id(), stubs = stubs.len(), "built stub tree");
    Ok(stubs)
}

/// Build the stub tree of a light pre-parse tree.
pub fn build_light_stub_tree(
    tree: &LightTree,
    cancel: &dyn Cancellation,
) -> Result<StubTree, IndexError> {
    let stubs = Walker::new(tree, cancel, |element_type, node, stubs, parent| {
        Ok(element_type.create_stub_light(tree, node, stubs, parent))
    })
    .run()?;
    debug!(stubs = stubs.len(), "built light stub tree");
    Ok(stubs)
}

struct Walker<'a, T: FlyweightTree, F> {
    tree: &'a T,
    cancel: &'a dyn Cancellation,
    create: F,
    stubs: StubTree,
    /// One child buffer per depth, reused across siblings.
    buffers: Vec<Vec<T::Node>>,
}

impl<'a, T, F> Walker<'a, T, F>
where
    T: FlyweightTree,
    F: Fn(&dyn StubElementType, T::Node, &StubTree, StubId) -> Result<StubData, ExpandError>,
{
    fn new(tree: &'a T, cancel: &'a dyn Cancellation, create: F) -> Self {
        Walker {
            tree,
            cancel,
            create,
            stubs: StubTree::new(FileStub::default()),
            buffers: Vec::new(),
        }
    }

    fn run(mut self) -> Result<StubTree, IndexError> {
        let root = self.tree.prepare(self.tree.root());
        self.walk(root, StubId::ROOT, 0)?;
        Ok(self.stubs)
    }

    fn walk(&mut self, node: T::Node, parent: StubId, depth: u32) -> Result<(), IndexError> {
        if self.cancel.is_cancelled() {
            return Err(IndexError::Cancelled);
        }
        let Some(kind) = self.tree.kind(node) else {
            return Ok(());
        };
        if kind.is_token() {
            return Ok(());
        }
        if depth >= MAX_STUB_DEPTH {
            warn!(depth, ?kind, "stub builder depth limit reached, subtree skipped");
            return Ok(());
        }

        let mut stub_parent = parent;
        if let Some(element_type) = registry().for_syntax(kind) {
            let data = (self.create)(element_type, node, &self.stubs, parent)?;
            match data {
                StubData::File(file) => {
                    // Only the root file node carries file-level data.
                    if depth == 0 {
                        self.stubs.set_file(file);
                    }
                }
                data => stub_parent = self.stubs.add(parent, data),
            }
        }

        let level = depth as usize;
        if self.buffers.len() <= level {
            self.buffers.resize_with(level + 1, Vec::new);
        }
        let mut buffer = std::mem::take(&mut self.buffers[level]);
        let count = self.tree.children(node, &mut buffer)?;
        for &child in &buffer[..count] {
            self.walk(child, stub_parent, depth + 1)?;
        }
        self.tree.dispose(&mut buffer, count);
        self.buffers[level] = buffer;
        Ok(())
    }
}

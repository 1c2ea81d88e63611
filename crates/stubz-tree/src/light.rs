//! Light pre-parse tree.
//!
//! A flat, immutable arena of `(kind, text range, links)` records over one
//! shared source string. It is what the indexing fast path walks: no per-node
//! locks, no text copies, no laziness.

use crate::error::EventError;
use crate::green::ParseEvent;
use crate::SyntaxKind;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LightNodeId(pub u32);

impl LightNodeId {
    pub const NONE: LightNodeId = LightNodeId(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self == LightNodeId::NONE
    }

    #[inline]
    pub fn is_some(self) -> bool {
        self != LightNodeId::NONE
    }
}

#[derive(Clone, Debug)]
struct LightNode {
    kind: SyntaxKind,
    start: u32,
    end: u32,
    parent: LightNodeId,
    first_child: LightNodeId,
    next_sibling: LightNodeId,
}

#[derive(Clone, Debug)]
pub struct LightTree {
    text: Arc<str>,
    nodes: Vec<LightNode>,
    root: LightNodeId,
}

impl LightTree {
    /// Build from parser events. The events must describe exactly one root.
    pub fn from_events(text: &str, events: &[ParseEvent]) -> Result<LightTree, EventError> {
        let mut nodes: Vec<LightNode> = Vec::with_capacity(events.len());
        // (node, last child appended so far)
        let mut open: Vec<(LightNodeId, LightNodeId)> = Vec::new();
        let mut roots = 0usize;
        let mut offset = 0u32;

        for (index, event) in events.iter().enumerate() {
            match *event {
                ParseEvent::Start(kind) => {
                    let id = Self::append(&mut nodes, &mut open, &mut roots, kind, offset, offset);
                    open.push((id, LightNodeId::NONE));
                }
                ParseEvent::Token(kind, len) => {
                    let end = offset as usize + len as usize;
                    if text.get(offset as usize..end).is_none() {
                        return Err(EventError::TextOverrun {
                            offset: offset as usize,
                            len,
                        });
                    }
                    Self::append(&mut nodes, &mut open, &mut roots, kind, offset, end as u32);
                    offset = end as u32;
                }
                ParseEvent::Finish => {
                    let (id, _) = open.pop().ok_or(EventError::UnbalancedFinish { index })?;
                    nodes[id.0 as usize].end = offset;
                }
            }
        }

        if !open.is_empty() {
            return Err(EventError::Unfinished { open: open.len() });
        }
        if offset as usize != text.len() {
            return Err(EventError::TextNotConsumed {
                consumed: offset as usize,
                total: text.len(),
            });
        }
        if roots != 1 {
            return Err(EventError::RootCount { count: roots });
        }

        Ok(LightTree {
            text: Arc::from(text),
            nodes,
            root: LightNodeId(0),
        })
    }

    fn append(
        nodes: &mut Vec<LightNode>,
        open: &mut [(LightNodeId, LightNodeId)],
        roots: &mut usize,
        kind: SyntaxKind,
        start: u32,
        end: u32,
    ) -> LightNodeId {
        let id = LightNodeId(nodes.len() as u32);
        let parent = open.last().map_or(LightNodeId::NONE, |(p, _)| *p);
        nodes.push(LightNode {
            kind,
            start,
            end,
            parent,
            first_child: LightNodeId::NONE,
            next_sibling: LightNodeId::NONE,
        });
        match open.last_mut() {
            Some((parent, last)) => {
                if last.is_some() {
                    nodes[last.0 as usize].next_sibling = id;
                } else {
                    nodes[parent.0 as usize].first_child = id;
                }
                *last = id;
            }
            None => *roots += 1,
        }
        id
    }

    pub fn root(&self) -> LightNodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn source(&self) -> &str {
        &self.text
    }

    #[inline]
    fn node(&self, id: LightNodeId) -> Option<&LightNode> {
        self.nodes.get(id.0 as usize)
    }

    pub fn kind(&self, id: LightNodeId) -> Option<SyntaxKind> {
        self.node(id).map(|n| n.kind)
    }

    pub fn parent(&self, id: LightNodeId) -> LightNodeId {
        self.node(id).map_or(LightNodeId::NONE, |n| n.parent)
    }

    pub fn first_child(&self, id: LightNodeId) -> LightNodeId {
        self.node(id).map_or(LightNodeId::NONE, |n| n.first_child)
    }

    pub fn next_sibling(&self, id: LightNodeId) -> LightNodeId {
        self.node(id).map_or(LightNodeId::NONE, |n| n.next_sibling)
    }

    pub fn children(&self, id: LightNodeId) -> LightChildren<'_> {
        LightChildren {
            tree: self,
            next: self.first_child(id),
        }
    }

    /// Source text covered by the node.
    pub fn node_text(&self, id: LightNodeId) -> &str {
        self.node(id)
            .and_then(|n| self.text.get(n.start as usize..n.end as usize))
            .unwrap_or("")
    }

    pub fn first_child_of_kind(&self, id: LightNodeId, kind: SyntaxKind) -> LightNodeId {
        self.children(id)
            .find(|&child| self.kind(child) == Some(kind))
            .unwrap_or(LightNodeId::NONE)
    }
}

pub struct LightChildren<'a> {
    tree: &'a LightTree,
    next: LightNodeId,
}

impl Iterator for LightChildren<'_> {
    type Item = LightNodeId;

    fn next(&mut self) -> Option<LightNodeId> {
        if self.next.is_none() {
            return None;
        }
        let current = self.next;
        self.next = self.tree.next_sibling(current);
        Some(current)
    }
}

//! Parser output: flat parse events and detached ("green") subtrees.
//!
//! The grammar lives outside this crate. A parser reports what it recognised
//! as a flat `ParseEvent` stream over the source text; both the full
//! `SyntaxTree` and the `LightTree` are built from the same events, which is
//! what makes the two indexing paths comparable.

use crate::error::EventError;
use crate::SyntaxKind;
use std::sync::Arc;

/// One step of a pre-order walk emitted by a parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseEvent {
    /// Open a composite element.
    Start(SyntaxKind),
    /// A token covering the next `len` bytes of text.
    Token(SyntaxKind, u32),
    /// Close the innermost open element.
    Finish,
}

/// A detached subtree, not yet attached to any arena.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GreenNode {
    Token {
        kind: SyntaxKind,
        text: Arc<str>,
    },
    Composite {
        kind: SyntaxKind,
        children: Vec<GreenNode>,
    },
    /// A chameleon kept as raw text.
    Lazy {
        kind: SyntaxKind,
        text: Arc<str>,
    },
}

impl GreenNode {
    pub fn token(kind: SyntaxKind, text: &str) -> GreenNode {
        GreenNode::Token {
            kind,
            text: Arc::from(text),
        }
    }

    pub fn composite(kind: SyntaxKind, children: Vec<GreenNode>) -> GreenNode {
        GreenNode::Composite { kind, children }
    }

    pub fn lazy(kind: SyntaxKind, text: &str) -> GreenNode {
        GreenNode::Lazy {
            kind,
            text: Arc::from(text),
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        match self {
            GreenNode::Token { kind, .. }
            | GreenNode::Composite { kind, .. }
            | GreenNode::Lazy { kind, .. } => *kind,
        }
    }

    pub fn text_len(&self) -> u32 {
        match self {
            GreenNode::Token { text, .. } | GreenNode::Lazy { text, .. } => text.len() as u32,
            GreenNode::Composite { children, .. } => children.iter().map(GreenNode::text_len).sum(),
        }
    }

    pub fn write_text(&self, out: &mut String) {
        match self {
            GreenNode::Token { text, .. } | GreenNode::Lazy { text, .. } => out.push_str(text),
            GreenNode::Composite { children, .. } => {
                for child in children {
                    child.write_text(out);
                }
            }
        }
    }

    /// Build the top-level nodes described by `events` over `text`.
    ///
    /// With `collapse_lazy`, every element whose kind is lazy becomes a
    /// `GreenNode::Lazy` holding its source slice; the events inside it are
    /// skipped.
    pub fn from_events(
        text: &str,
        events: &[ParseEvent],
        collapse_lazy: bool,
    ) -> Result<Vec<GreenNode>, EventError> {
        let mut roots = Vec::new();
        let mut stack: Vec<(SyntaxKind, Vec<GreenNode>)> = Vec::new();
        let mut collapsing: Option<(SyntaxKind, usize, u32)> = None;
        let mut offset = 0usize;

        for (index, event) in events.iter().enumerate() {
            if let Some((kind, start, nesting)) = collapsing.as_mut() {
                match *event {
                    ParseEvent::Start(_) => *nesting += 1,
                    ParseEvent::Token(_, len) => {
                        slice_at(text, offset, len)?;
                        offset += len as usize;
                    }
                    ParseEvent::Finish if *nesting > 0 => *nesting -= 1,
                    ParseEvent::Finish => {
                        let node = GreenNode::lazy(*kind, &text[*start..offset]);
                        collapsing = None;
                        push_node(&mut stack, &mut roots, node);
                    }
                }
                continue;
            }

            match *event {
                ParseEvent::Start(kind) if collapse_lazy && kind.is_lazy() => {
                    collapsing = Some((kind, offset, 0));
                }
                ParseEvent::Start(kind) => stack.push((kind, Vec::new())),
                ParseEvent::Token(kind, len) => {
                    let token = slice_at(text, offset, len)?;
                    offset += len as usize;
                    push_node(&mut stack, &mut roots, GreenNode::token(kind, token));
                }
                ParseEvent::Finish => {
                    let (kind, children) =
                        stack.pop().ok_or(EventError::UnbalancedFinish { index })?;
                    push_node(&mut stack, &mut roots, GreenNode::composite(kind, children));
                }
            }
        }

        let open = stack.len() + usize::from(collapsing.is_some());
        if open > 0 {
            return Err(EventError::Unfinished { open });
        }
        if offset != text.len() {
            return Err(EventError::TextNotConsumed {
                consumed: offset,
                total: text.len(),
            });
        }
        Ok(roots)
    }
}

fn slice_at(text: &str, offset: usize, len: u32) -> Result<&str, EventError> {
    text.get(offset..offset + len as usize)
        .ok_or(EventError::TextOverrun { offset, len })
}

fn push_node(
    stack: &mut [(SyntaxKind, Vec<GreenNode>)],
    roots: &mut Vec<GreenNode>,
    node: GreenNode,
) {
    match stack.last_mut() {
        Some((_, children)) => children.push(node),
        None => roots.push(node),
    }
}

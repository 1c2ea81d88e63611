//! Shared helpers for stubz-tree integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use stubz_tree::{ChameleonParser, ExpandError, GreenNode, SyntaxKind, SyntaxTree};

/// What the instrumented parser does when invoked.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Split text into word, brace and whitespace tokens.
    Tokens,
    /// Return nothing.
    Empty,
    /// Fail with a parse error.
    Fail,
    /// Return tokens that cover only half of the text.
    Truncate,
}

/// Chameleon parser that counts its invocations.
pub struct CountingParser {
    pub calls: AtomicUsize,
    pub behavior: Behavior,
    pub delay: Duration,
}

impl CountingParser {
    pub fn new(behavior: Behavior) -> Arc<CountingParser> {
        Arc::new(CountingParser {
            calls: AtomicUsize::new(0),
            behavior,
            delay: Duration::ZERO,
        })
    }

    pub fn slow(delay: Duration) -> Arc<CountingParser> {
        Arc::new(CountingParser {
            calls: AtomicUsize::new(0),
            behavior: Behavior::Tokens,
            delay,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ChameleonParser for CountingParser {
    fn parse(&self, kind: SyntaxKind, text: &str) -> Result<Vec<GreenNode>, ExpandError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        match self.behavior {
            Behavior::Tokens => Ok(tokenize(text)),
            Behavior::Empty => Ok(Vec::new()),
            Behavior::Fail => Err(ExpandError::Parse {
                kind,
                message: "unbalanced braces".to_string(),
            }),
            Behavior::Truncate => {
                let half = &text[..text.len() / 2];
                Ok(tokenize(half))
            }
        }
    }
}

/// Split into `{`, `}`, whitespace runs and everything-else runs.
pub fn tokenize(text: &str) -> Vec<GreenNode> {
    let mut out = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    while start < bytes.len() {
        let b = bytes[start];
        let (kind, end) = match b {
            b'{' => (SyntaxKind::LBrace, start + 1),
            b'}' => (SyntaxKind::RBrace, start + 1),
            b' ' | b'\n' | b'\t' => {
                let mut end = start;
                while end < bytes.len() && matches!(bytes[end], b' ' | b'\n' | b'\t') {
                    end += 1;
                }
                (SyntaxKind::Whitespace, end)
            }
            _ => {
                let mut end = start;
                while end < bytes.len() && !matches!(bytes[end], b'{' | b'}' | b' ' | b'\n' | b'\t')
                {
                    end += 1;
                }
                (SyntaxKind::Other, end)
            }
        };
        out.push(GreenNode::token(kind, &text[start..end]));
        start = end;
    }
    out
}

/// `class A { <lazy body> }` with the body collapsed.
pub fn class_with_body(body: &str) -> GreenNode {
    GreenNode::composite(
        SyntaxKind::File,
        vec![GreenNode::composite(
            SyntaxKind::Class,
            vec![
                GreenNode::token(SyntaxKind::ClassKeyword, "class"),
                GreenNode::token(SyntaxKind::Whitespace, " "),
                GreenNode::token(SyntaxKind::Identifier, "A"),
                GreenNode::token(SyntaxKind::Whitespace, " "),
                GreenNode::lazy(SyntaxKind::CodeBlock, body),
            ],
        )],
    )
}

pub fn tree_with_body(body: &str, parser: Arc<CountingParser>) -> SyntaxTree {
    SyntaxTree::from_green(&class_with_body(body), parser)
}

/// Index of the collapsed code block in `tree_with_body`.
pub fn code_block(tree: &SyntaxTree) -> stubz_tree::NodeIndex {
    let class = tree.first_child(tree.root()).unwrap();
    tree.last_child(class).unwrap()
}

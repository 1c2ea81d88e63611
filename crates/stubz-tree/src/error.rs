use crate::SyntaxKind;
use thiserror::Error;

/// Malformed event stream handed to a tree builder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("`Finish` event at index {index} has no matching `Start`")]
    UnbalancedFinish { index: usize },
    #[error("{open} element(s) still open at end of events")]
    Unfinished { open: usize },
    #[error("token of length {len} at offset {offset} runs past the text or splits a character")]
    TextOverrun { offset: usize, len: u32 },
    #[error("events consumed {consumed} of {total} bytes of text")]
    TextNotConsumed { consumed: usize, total: usize },
    #[error("expected a single root element, found {count}")]
    RootCount { count: usize },
}

/// Failure reported while expanding a chameleon node.
///
/// The node stays collapsed, so a later access retries the expansion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    #[error("failed to parse lazy {kind:?}: {message}")]
    Parse { kind: SyntaxKind, message: String },
    #[error(transparent)]
    Events(#[from] EventError),
}

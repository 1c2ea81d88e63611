use crate::kind::StubKind;
use stubz_tree::ExpandError;
use thiserror::Error;

/// Failure to decode a stored stub tree.
///
/// Always scoped to one file: the caller treats that file as not indexed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("stub stream ended unexpectedly")]
    UnexpectedEof,
    #[error("stub stream does not start with the stub magic")]
    BadMagic,
    #[error("stub stream version {found} does not match current version {expected}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("unknown stub kind tag {0}")]
    UnknownStubKind(u8),
    #[error("stub kind {found:?} where {expected:?} was expected")]
    KindMismatch { expected: StubKind, found: StubKind },
    #[error("name reference {0} points past the name table")]
    BadNameRef(u32),
    #[error("null name where the format requires one")]
    MissingName,
    #[error("stored name is not valid UTF-8")]
    InvalidUtf8,
    #[error("{0} trailing bytes after the stub tree")]
    TrailingBytes(usize),
    #[error("variable-length integer overflows u32")]
    VarIntOverflow,
    #[error("stub tree nests deeper than {0}")]
    TooDeep(u32),
    #[error("stub tree root must be a file stub")]
    RootNotFile,
    #[error("file stub below the root")]
    NestedFileStub,
}

/// Failure to index one file.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("indexing cancelled")]
    Cancelled,
    #[error(transparent)]
    Expand(#[from] ExpandError),
    #[error("persistent store failure: {0}")]
    Store(String),
    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

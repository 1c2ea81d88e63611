//! Stub trees: compact, persistable skeletons of a file's declarations.
//!
//! A stub tree is built either from a full `SyntaxTree` or straight from a
//! `LightTree`, serialized through the binary codec, and mined for index
//! occurrences. Lookups later deserialize it on any thread and only promote
//! it to full declarations when a caller needs more than names and flags.

pub mod kind;
pub use kind::StubKind;

pub mod flags;
pub use flags::{ClassFlags, FieldFlags, FileFlags, ImportFlags, MethodFlags};

pub mod stub;
pub use stub::{
    AnnotationStub, ClassStub, FieldStub, FileStub, ImportStub, MethodStub, StubData, StubId,
    StubTree,
};

pub mod names;

mod scan;

pub mod error;
pub use error::{DecodeError, IndexError};

pub mod codec;
pub use codec::{StubInputStream, StubOutputStream};

pub mod sink;
pub use sink::{IndexKey, IndexSink, IndexValue, Occurrence, OccurrenceCollector, index_stub_tree};

pub mod element_type;
pub use element_type::{StubElementType, StubRegistry, registry, type_for_class};

pub mod builder;
pub use builder::{Cancellation, CancellationToken, NeverCancel, build_light_stub_tree, build_stub_tree};

pub mod serializer;
pub use serializer::{deserialize_stub_tree, serialize_stub_tree};

pub mod index;
pub use index::{FileId, StubIndex, StubLocation};

pub mod store;
pub use store::{MemoryStore, PersistentStore, StagedStubTree, StubIndexWriter};

pub mod config;
pub use config::IndexerConfig;

pub mod indexer;
pub use indexer::Indexer;

pub mod decl;
pub use decl::{
    AnnotationDecl, ClassDecl, DeclOrigin, Declaration, DeclarationCache, ImportDecl, MemberDecl,
    StubOrNode, instantiate,
};

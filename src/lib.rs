//! stubz: lazily expanded syntax trees and persistent stub indexes.
//!
//! The work is split across three crates, re-exported here:
//!
//! - [`stubz_common`]: interning, the qualified-name hash, limits
//! - [`stubz_tree`]: the chameleon syntax tree, the light pre-parse tree and
//!   flyweight views over both
//! - [`stubz_stubs`]: stub trees, their codec, the index and the indexer
//!
//! This crate adds configuration loading and tracing setup.

pub use stubz_common;
pub use stubz_stubs;
pub use stubz_tree;

pub use stubz_stubs::{
    Cancellation, CancellationToken, Declaration, DeclarationCache, FileId, IndexError,
    IndexKey, Indexer, IndexerConfig, MemoryStore, NeverCancel, PersistentStore, StubIndex,
    StubKind, StubTree, build_light_stub_tree, build_stub_tree, deserialize_stub_tree,
    instantiate, serialize_stub_tree,
};
pub use stubz_tree::{
    ChameleonParser, ExpandError, ExpansionListener, LightTree, ParseEvent, SyntaxKind,
    SyntaxTree,
};

pub mod config;
pub use config::{load_indexer_config, open_indexer, parse_indexer_config};

pub mod tracing_config;
pub use tracing_config::init_tracing;

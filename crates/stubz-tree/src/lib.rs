//! Syntax trees whose subtrees may stay unparsed until first use.
//!
//! - `SyntaxKind`: closed set of element and token kinds
//! - `ParseEvent` / `GreenNode`: the neutral output of an external parser
//! - `SyntaxTree`: concurrent node arena with chameleon (lazy) expansion
//! - `LightTree`: cheap read-only pre-parse tree used by the indexing fast path
//! - `FlyweightTree`: buffer-reusing read-only navigation over either tree

pub mod kind;
pub use kind::SyntaxKind;

pub mod green;
pub use green::{GreenNode, ParseEvent};

mod arena;

pub mod lock_order;

pub mod error;
pub use error::ExpandError;

pub mod tree;
pub use tree::{ChameleonParser, ExpansionListener, NodeIndex, SyntaxTree};

pub mod light;
pub use light::{LightNodeId, LightTree};

pub mod flyweight;
pub use flyweight::{FlyweightTree, TreeView};

#[cfg(test)]
#[path = "tests/arena_tests.rs"]
mod arena_tests;

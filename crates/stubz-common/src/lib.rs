//! Common types and utilities shared by the stubz crates.
//!
//! - String interning (`Atom`, `ShardedInterner`)
//! - The stable 32-bit name hash used by the fully-qualified-name index
//! - Centralized limits and format constants

// String interning for short names stored in secondary indices
pub mod interner;
pub use interner::{Atom, ShardedInterner};

// Stable name hashing for the FQN index
pub mod hash;
pub use hash::name_hash;

// Centralized limits and format constants
pub mod limits;

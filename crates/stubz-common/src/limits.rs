//! Centralized limits and format constants.

// =============================================================================
// Tree limits
// =============================================================================

/// Maximum nesting depth the stub builders descend into.
///
/// Deeper declaration nesting is treated as malformed input: the builder
/// stops descending and the subtree contributes no stubs. Real sources stay
/// far below this.
pub const MAX_STUB_DEPTH: u32 = 512;

/// Initial slot count for flyweight child buffers.
pub const FLYWEIGHT_INITIAL_CAPACITY: usize = 8;

/// Smallest bucket in the segmented node arena, as a power of two.
pub const ARENA_FIRST_BUCKET_BITS: u32 = 6;

/// Number of geometric buckets in the segmented node arena.
///
/// With a first bucket of 64 slots this covers the whole `u32` index space.
pub const ARENA_BUCKET_COUNT: usize = 27;

// =============================================================================
// Stub stream format
// =============================================================================

/// Magic bytes opening every serialized stub tree.
pub const STUB_MAGIC: [u8; 4] = *b"STUB";

/// Version of the stream layout itself (header, varints, name table).
///
/// Bumped whenever the framing changes. Element types add their own versions
/// on top of this to form the cumulative version stored in the header.
pub const STUB_FORMAT_VERSION: u32 = 17;

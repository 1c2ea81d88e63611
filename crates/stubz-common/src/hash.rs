//! Stable 32-bit name hashing.
//!
//! The fully-qualified-name index stores a hash instead of the name itself.
//! The hash must be identical across runs, platforms and processes because it
//! is persisted, so `std::hash` (randomly seeded) and `FxHasher` (word-size
//! dependent) are not usable here.

/// Hash a name as `h = 31 * h + unit` over its UTF-16 code units.
///
/// Collisions are expected; lookups verify candidates against the real name.
pub fn name_hash(name: &str) -> i32 {
    name.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

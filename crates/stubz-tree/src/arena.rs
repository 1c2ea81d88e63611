//! Append-only slot storage that never moves an element.
//!
//! Slots live in geometrically growing buckets (64, 128, 256, ...), each
//! created on first use. Appending is a single `fetch_add` plus a one-time
//! slot initialisation, so a thread holding a node's expansion lock can
//! allocate the new subtree without touching any tree-wide lock.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};
use stubz_common::limits::{ARENA_BUCKET_COUNT, ARENA_FIRST_BUCKET_BITS};

pub(crate) struct SlotArena<T> {
    buckets: [OnceLock<Box<[OnceLock<T>]>>; ARENA_BUCKET_COUNT],
    len: AtomicU32,
}

impl<T> SlotArena<T> {
    pub(crate) fn new() -> Self {
        SlotArena {
            buckets: std::array::from_fn(|_| OnceLock::new()),
            len: AtomicU32::new(0),
        }
    }

    /// Store `value` and return its index. Indices are never reused.
    pub(crate) fn push(&self, value: T) -> u32 {
        let index = self.len.fetch_add(1, Ordering::AcqRel);
        let (bucket, offset) = locate(index);
        let slots = self.buckets[bucket].get_or_init(|| {
            (0..bucket_size(bucket))
                .map(|_| OnceLock::new())
                .collect::<Vec<_>>()
                .into_boxed_slice()
        });
        // Each index is handed out exactly once, so the slot is still empty.
        let _ = slots[offset].set(value);
        index
    }

    pub(crate) fn get(&self, index: u32) -> Option<&T> {
        let (bucket, offset) = locate(index);
        self.buckets.get(bucket)?.get()?.get(offset)?.get()
    }

    /// Number of indices handed out so far.
    pub(crate) fn len(&self) -> u32 {
        self.len.load(Ordering::Acquire)
    }
}

#[inline]
pub(crate) fn locate(index: u32) -> (usize, usize) {
    let shifted = u64::from(index) + (1u64 << ARENA_FIRST_BUCKET_BITS);
    let bucket = (63 - shifted.leading_zeros()) - ARENA_FIRST_BUCKET_BITS;
    let offset = shifted - (1u64 << (bucket + ARENA_FIRST_BUCKET_BITS));
    (bucket as usize, offset as usize)
}

#[inline]
fn bucket_size(bucket: usize) -> usize {
    1usize << (bucket as u32 + ARENA_FIRST_BUCKET_BITS)
}

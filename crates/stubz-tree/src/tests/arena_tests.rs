use crate::arena::{SlotArena, locate};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_locate_bucket_boundaries() {
    assert_eq!(locate(0), (0, 0));
    assert_eq!(locate(63), (0, 63));
    assert_eq!(locate(64), (1, 0));
    assert_eq!(locate(191), (1, 127));
    assert_eq!(locate(192), (2, 0));
    let (bucket, _) = locate(u32::MAX);
    assert!(bucket < stubz_common::limits::ARENA_BUCKET_COUNT);
}

#[test]
fn test_push_and_get() {
    let arena = SlotArena::new();
    for i in 0..1000u32 {
        assert_eq!(arena.push(i * 2), i);
    }
    assert_eq!(arena.len(), 1000);
    assert_eq!(arena.get(0), Some(&0));
    assert_eq!(arena.get(999), Some(&1998));
    assert_eq!(arena.get(1000), None);
}

#[test]
fn test_concurrent_push_hands_out_unique_indices() {
    let arena = Arc::new(SlotArena::new());
    let num_threads = 8;
    let barrier = Arc::new(Barrier::new(num_threads));

    let handles: Vec<_> = (0..num_threads)
        .map(|t| {
            let arena = Arc::clone(&arena);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..500)
                    .map(|i| (arena.push((t, i)), (t, i)))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen = std::collections::HashSet::new();
    for handle in handles {
        for (index, value) in handle.join().unwrap() {
            assert!(seen.insert(index));
            assert_eq!(arena.get(index), Some(&value));
        }
    }
    assert_eq!(arena.len() as usize, num_threads * 500);
}

//! Concurrent demand on chameleon nodes.
//!
//! Many threads race to expand the same nodes; the instrumented parser
//! verifies each node is parsed exactly once and every thread observes the
//! same subtree.

mod support;

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use stubz_tree::{FlyweightTree, GreenNode, NodeIndex, SyntaxKind, SyntaxTree, TreeView};
use support::{CountingParser, code_block, tree_with_body};

#[test]
fn test_concurrent_first_access_expands_once() {
    let parser = CountingParser::slow(Duration::from_millis(20));
    let tree = Arc::new(tree_with_body("{ a b c }", parser.clone()));
    let block = code_block(&tree);
    let num_threads = 16;
    let barrier = Arc::new(Barrier::new(num_threads));

    let handles: Vec<_> = (0..num_threads)
        .map(|_| {
            let tree = Arc::clone(&tree);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                tree.children(block).unwrap().to_vec()
            })
        })
        .collect();

    let results: Vec<Vec<NodeIndex>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(parser.calls(), 1);
    assert!(!results[0].is_empty());
    for children in &results[1..] {
        assert_eq!(children, &results[0]);
    }
}

#[test]
fn test_concurrent_mixed_accessors_expand_once() {
    let parser = CountingParser::slow(Duration::from_millis(10));
    let tree = Arc::new(tree_with_body("{ x }", parser.clone()));
    let block = code_block(&tree);
    let num_threads = 12;
    let barrier = Arc::new(Barrier::new(num_threads));

    let handles: Vec<_> = (0..num_threads)
        .map(|t| {
            let tree = Arc::clone(&tree);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                match t % 3 {
                    0 => tree.first_child(block).unwrap(),
                    1 => tree.last_child(block).unwrap(),
                    _ => {
                        tree.ensure_expanded(block).unwrap();
                        tree.first_child(block).unwrap()
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap().is_some());
    }
    assert_eq!(parser.calls(), 1);
    assert_eq!(tree.text(block), "{ x }");
}

fn many_blocks(count: usize) -> GreenNode {
    let classes = (0..count)
        .map(|i| {
            GreenNode::composite(
                SyntaxKind::Class,
                vec![
                    GreenNode::token(SyntaxKind::Identifier, &format!("C{}", i)),
                    GreenNode::lazy(SyntaxKind::CodeBlock, &format!("{{ body{} }}", i)),
                ],
            )
        })
        .collect();
    GreenNode::composite(SyntaxKind::File, classes)
}

#[test]
fn test_concurrent_traversals_expand_each_block_once() {
    let blocks = 64;
    let parser = CountingParser::new(support::Behavior::Tokens);
    let tree = Arc::new(SyntaxTree::from_green(&many_blocks(blocks), parser.clone()));
    let num_threads = 8;
    let barrier = Arc::new(Barrier::new(num_threads));

    let handles: Vec<_> = (0..num_threads)
        .map(|_| {
            let tree = Arc::clone(&tree);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let view = TreeView::new(&tree);
                let mut stack = vec![view.root()];
                let mut buffer = Vec::new();
                let mut tokens = 0usize;
                while let Some(node) = stack.pop() {
                    let count = view.children(node, &mut buffer).unwrap();
                    if count == 0 && view.kind(node).is_some_and(SyntaxKind::is_token) {
                        tokens += 1;
                    }
                    stack.extend_from_slice(&buffer[..count]);
                    view.dispose(&mut buffer, count);
                }
                tokens
            })
        })
        .collect();

    let counts: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(parser.calls(), blocks);
    for count in &counts[1..] {
        assert_eq!(count, &counts[0]);
    }
    for (i, class) in tree.children(tree.root()).unwrap().into_iter().enumerate() {
        let block = tree.last_child(class).unwrap();
        assert_eq!(tree.text(block), format!("{{ body{} }}", i));
    }
}

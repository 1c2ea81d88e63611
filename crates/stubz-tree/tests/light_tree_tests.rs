use stubz_tree::error::EventError;
use stubz_tree::{LightNodeId, LightTree, ParseEvent, SyntaxKind};

fn import_events() -> (&'static str, Vec<ParseEvent>) {
    let text = "import a.B;";
    let events = vec![
        ParseEvent::Start(SyntaxKind::File),
        ParseEvent::Start(SyntaxKind::ImportStatement),
        ParseEvent::Token(SyntaxKind::ImportKeyword, 6),
        ParseEvent::Token(SyntaxKind::Whitespace, 1),
        ParseEvent::Start(SyntaxKind::JavaCodeReference),
        ParseEvent::Token(SyntaxKind::Identifier, 1),
        ParseEvent::Token(SyntaxKind::Dot, 1),
        ParseEvent::Token(SyntaxKind::Identifier, 1),
        ParseEvent::Finish,
        ParseEvent::Token(SyntaxKind::Semicolon, 1),
        ParseEvent::Finish,
        ParseEvent::Finish,
    ];
    (text, events)
}

#[test]
fn test_light_tree_structure() {
    let (text, events) = import_events();
    let tree = LightTree::from_events(text, &events).unwrap();

    let root = tree.root();
    assert_eq!(tree.kind(root), Some(SyntaxKind::File));
    assert_eq!(tree.node_text(root), text);
    assert_eq!(tree.parent(root), LightNodeId::NONE);

    let import = tree.first_child(root);
    assert_eq!(tree.kind(import), Some(SyntaxKind::ImportStatement));
    assert_eq!(tree.parent(import), root);

    let reference = tree.first_child_of_kind(import, SyntaxKind::JavaCodeReference);
    assert_eq!(tree.node_text(reference), "a.B");
    assert_eq!(tree.children(reference).count(), 3);
    assert_eq!(
        tree.first_child_of_kind(import, SyntaxKind::Class),
        LightNodeId::NONE
    );
    assert_eq!(tree.len(), 9);
}

#[test]
fn test_light_tree_rejects_malformed_events() {
    let err = LightTree::from_events("ab", &[ParseEvent::Finish]).unwrap_err();
    assert_eq!(err, EventError::UnbalancedFinish { index: 0 });

    let err = LightTree::from_events("ab", &[ParseEvent::Start(SyntaxKind::File)]).unwrap_err();
    assert_eq!(err, EventError::Unfinished { open: 1 });

    let err = LightTree::from_events(
        "ab",
        &[
            ParseEvent::Start(SyntaxKind::File),
            ParseEvent::Token(SyntaxKind::Identifier, 5),
            ParseEvent::Finish,
        ],
    )
    .unwrap_err();
    assert_eq!(err, EventError::TextOverrun { offset: 0, len: 5 });

    let err = LightTree::from_events(
        "abc",
        &[
            ParseEvent::Start(SyntaxKind::File),
            ParseEvent::Token(SyntaxKind::Identifier, 2),
            ParseEvent::Finish,
        ],
    )
    .unwrap_err();
    assert_eq!(err, EventError::TextNotConsumed { consumed: 2, total: 3 });
}

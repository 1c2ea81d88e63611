//! Shared helpers for stubz-stubs integration tests.

#![allow(dead_code)]

pub mod java;

pub use java::{JavaBlockParser, light_tree, parse_events, syntax_tree, syntax_tree_with};

use stubz_stubs::{StubData, StubId, StubKind, StubTree};

/// A compilation unit touching every stub kind.
pub const SAMPLE: &str = r#"package a.b;

import java.util.List;
import static java.util.Collections.*;

/** Outer type.
 * @deprecated use Other */
public class Outer extends Base implements Runnable {
    private static final long serialVersionUID = 1L;
    @Deprecated
    private List<String> names;

    public Outer() {
        this.names = null;
    }

    public void run() {
        Runnable r = new Runnable() {
            public void run() { }
        };
        Comparable<String> c = outer.new Inner() { };
        class Local { }
    }

    static int sum(int... values) { return 0; }

    public static class Inner {
        interface Deep { void go(); }
    }
}

enum Color {
    RED,
    GREEN { int shade() { return 1; } },
    BLUE(3);

    Color() {}
    Color(int x) {}
}

@interface Marker {
    String value() default "x";
}
"#;

/// Small sources exercising one feature each.
pub const SOURCES: &[&str] = &[
    SAMPLE,
    "class A {}",
    "",
    "package p;\nclass A { void f() { new java.util.Comparator<String>() { public int compare(String a, String b) { return 0; } }; } }",
    "import a.*;\n@Deprecated\nclass Old { @java.lang.Deprecated void m() {} /** @deprecated */ int f; }",
    "package x.y;\nclass A { class B { void f() { new Object() { class C { class D {} } }; } } }",
    "enum E { ONE { void f() { new Runnable() { public void run() {} }; } }, TWO }",
    "package q;\n// comment\n/* block */ interface I { @A(1) @b.B(x = \"(\") void f(String... xs); }",
];

pub fn ids_of_kind(stubs: &StubTree, kind: StubKind) -> Vec<StubId> {
    stubs.ids().filter(|&id| stubs.kind(id) == Some(kind)).collect()
}

/// First class-like stub with the given simple name.
pub fn class_named(stubs: &StubTree, name: &str) -> StubId {
    stubs
        .ids()
        .find(|&id| stubs.class(id).is_some() && stubs.get_id(id) == Some(name))
        .unwrap_or_else(|| panic!("no class named {name}"))
}

pub fn member_named(stubs: &StubTree, kind: StubKind, name: &str) -> StubId {
    stubs
        .ids()
        .find(|&id| stubs.kind(id) == Some(kind) && stubs.get_id(id) == Some(name))
        .unwrap_or_else(|| panic!("no {kind:?} named {name}"))
}

pub fn data(stubs: &StubTree, id: StubId) -> &StubData {
    stubs.data(id).expect("stub exists")
}

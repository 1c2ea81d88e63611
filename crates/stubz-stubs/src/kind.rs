//! Stub kinds.

use serde::Serialize;
use stubz_tree::SyntaxKind;

/// Kind tag of a stub.
///
/// The tag is written before each stub's payload, so a reader always knows
/// which element type decodes what follows. Values are part of the stored
/// format: append new kinds, never renumber.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum StubKind {
    File = 0,
    ImportList = 1,
    Import = 2,
    Class = 3,
    AnonymousClass = 4,
    EnumConstantInitializer = 5,
    Method = 6,
    Field = 7,
    Annotation = 8,
}

impl StubKind {
    pub const COUNT: usize = 9;

    pub const ALL: [StubKind; StubKind::COUNT] = [
        StubKind::File,
        StubKind::ImportList,
        StubKind::Import,
        StubKind::Class,
        StubKind::AnonymousClass,
        StubKind::EnumConstantInitializer,
        StubKind::Method,
        StubKind::Field,
        StubKind::Annotation,
    ];

    pub fn from_u8(raw: u8) -> Option<StubKind> {
        StubKind::ALL.get(raw as usize).copied()
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// All three class kinds share the class payload.
    pub fn is_class(self) -> bool {
        matches!(
            self,
            StubKind::Class | StubKind::AnonymousClass | StubKind::EnumConstantInitializer
        )
    }

    /// The stub kind a syntax node produces, if it produces one.
    ///
    /// Enum constants are stubbed as fields. Every other node kind is
    /// transparent: the builder descends through it without emitting a stub.
    pub fn for_syntax(kind: SyntaxKind) -> Option<StubKind> {
        Some(match kind {
            SyntaxKind::File => StubKind::File,
            SyntaxKind::ImportList => StubKind::ImportList,
            SyntaxKind::ImportStatement | SyntaxKind::ImportStaticStatement => StubKind::Import,
            SyntaxKind::Class => StubKind::Class,
            SyntaxKind::AnonymousClass => StubKind::AnonymousClass,
            SyntaxKind::EnumConstantInitializer => StubKind::EnumConstantInitializer,
            SyntaxKind::Method => StubKind::Method,
            SyntaxKind::Field | SyntaxKind::EnumConstant => StubKind::Field,
            SyntaxKind::Annotation => StubKind::Annotation,
            _ => return None,
        })
    }
}

//! Element and token kinds.
//!
//! The set is closed: the engine only needs the declaration-level shape of a
//! Java-like language. Everything a grammar produces that the stub layer does
//! not care about can be tagged `Statement`, `Expression` or `Other`.

/// Kind tag carried by every node of both tree representations.
#[repr(u16)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SyntaxKind {
    // Composite elements
    File = 0,
    PackageStatement,
    ImportList,
    ImportStatement,
    ImportStaticStatement,
    Class,
    AnonymousClass,
    EnumConstant,
    EnumConstantInitializer,
    Method,
    Field,
    ModifierList,
    Annotation,
    DocComment,
    JavaCodeReference,
    Type,
    ExtendsList,
    ParameterList,
    Parameter,
    NewExpression,
    /// Method or initializer body. The chameleon kind.
    CodeBlock,
    Statement,
    Expression,

    // Tokens
    Identifier = 100,
    PackageKeyword,
    ImportKeyword,
    StaticKeyword,
    ClassKeyword,
    InterfaceKeyword,
    EnumKeyword,
    ExtendsKeyword,
    ImplementsKeyword,
    NewKeyword,
    ModifierKeyword,
    At,
    Dot,
    Comma,
    Semicolon,
    Asterisk,
    Ellipsis,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Lt,
    Gt,
    Eq,
    Whitespace,
    Comment,
    DocCommentText,
    Other,
}

const COMPOSITE_KINDS: [SyntaxKind; 23] = [
    SyntaxKind::File,
    SyntaxKind::PackageStatement,
    SyntaxKind::ImportList,
    SyntaxKind::ImportStatement,
    SyntaxKind::ImportStaticStatement,
    SyntaxKind::Class,
    SyntaxKind::AnonymousClass,
    SyntaxKind::EnumConstant,
    SyntaxKind::EnumConstantInitializer,
    SyntaxKind::Method,
    SyntaxKind::Field,
    SyntaxKind::ModifierList,
    SyntaxKind::Annotation,
    SyntaxKind::DocComment,
    SyntaxKind::JavaCodeReference,
    SyntaxKind::Type,
    SyntaxKind::ExtendsList,
    SyntaxKind::ParameterList,
    SyntaxKind::Parameter,
    SyntaxKind::NewExpression,
    SyntaxKind::CodeBlock,
    SyntaxKind::Statement,
    SyntaxKind::Expression,
];

const TOKEN_KINDS: [SyntaxKind; 28] = [
    SyntaxKind::Identifier,
    SyntaxKind::PackageKeyword,
    SyntaxKind::ImportKeyword,
    SyntaxKind::StaticKeyword,
    SyntaxKind::ClassKeyword,
    SyntaxKind::InterfaceKeyword,
    SyntaxKind::EnumKeyword,
    SyntaxKind::ExtendsKeyword,
    SyntaxKind::ImplementsKeyword,
    SyntaxKind::NewKeyword,
    SyntaxKind::ModifierKeyword,
    SyntaxKind::At,
    SyntaxKind::Dot,
    SyntaxKind::Comma,
    SyntaxKind::Semicolon,
    SyntaxKind::Asterisk,
    SyntaxKind::Ellipsis,
    SyntaxKind::LParen,
    SyntaxKind::RParen,
    SyntaxKind::LBrace,
    SyntaxKind::RBrace,
    SyntaxKind::Lt,
    SyntaxKind::Gt,
    SyntaxKind::Eq,
    SyntaxKind::Whitespace,
    SyntaxKind::Comment,
    SyntaxKind::DocCommentText,
    SyntaxKind::Other,
];

impl SyntaxKind {
    #[inline]
    pub fn is_token(self) -> bool {
        (self as u16) >= SyntaxKind::Identifier as u16
    }

    /// Kinds whose contents are kept as raw text until first structural access.
    #[inline]
    pub fn is_lazy(self) -> bool {
        self == SyntaxKind::CodeBlock
    }

    /// Whitespace and comments, skipped when extracting reference text.
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, SyntaxKind::Whitespace | SyntaxKind::Comment)
    }

    /// Any declaration that becomes a class stub.
    #[inline]
    pub fn is_class_like(self) -> bool {
        matches!(
            self,
            SyntaxKind::Class | SyntaxKind::AnonymousClass | SyntaxKind::EnumConstantInitializer
        )
    }

    pub fn from_raw(raw: u16) -> Option<SyntaxKind> {
        if raw < SyntaxKind::Identifier as u16 {
            COMPOSITE_KINDS.get(raw as usize).copied()
        } else {
            TOKEN_KINDS
                .get((raw - SyntaxKind::Identifier as u16) as usize)
                .copied()
        }
    }
}

//! Miniature Java pre-parser for tests.
//!
//! Covers the declaration shapes the stub builders care about: package and
//! imports, classes/interfaces/enums/annotation types, members, enum
//! constants with bodies, local classes and anonymous classes inside code
//! blocks. Code blocks are the chameleon kind; `JavaBlockParser` re-parses a
//! collapsed block from its own text and produces exactly the events the
//! whole-file parse produced for it.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use stubz_tree::{ChameleonParser, ExpandError, GreenNode, LightTree, ParseEvent, SyntaxKind, SyntaxTree};

#[derive(Clone, Copy, Debug)]
struct Lexed {
    kind: SyntaxKind,
    start: usize,
    len: usize,
}

fn keyword(word: &str) -> SyntaxKind {
    match word {
        "package" => SyntaxKind::PackageKeyword,
        "import" => SyntaxKind::ImportKeyword,
        "static" => SyntaxKind::StaticKeyword,
        "class" => SyntaxKind::ClassKeyword,
        "interface" => SyntaxKind::InterfaceKeyword,
        "enum" => SyntaxKind::EnumKeyword,
        "extends" => SyntaxKind::ExtendsKeyword,
        "implements" => SyntaxKind::ImplementsKeyword,
        "new" => SyntaxKind::NewKeyword,
        "public" | "private" | "protected" | "final" | "abstract" | "native" | "synchronized"
        | "transient" | "volatile" | "default" | "strictfp" => SyntaxKind::ModifierKeyword,
        _ => SyntaxKind::Identifier,
    }
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b'$'
}

fn is_ident_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'$'
}

fn lex(text: &str) -> Vec<Lexed> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let start = i;
        let rest = &text[i..];
        let c = bytes[i];
        let kind = if c.is_ascii_whitespace() {
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            SyntaxKind::Whitespace
        } else if rest.starts_with("/*") {
            let doc = rest.starts_with("/**") && !rest.starts_with("/**/");
            i = match rest[2..].find("*/") {
                Some(end) => start + 2 + end + 2,
                None => bytes.len(),
            };
            if doc {
                SyntaxKind::DocCommentText
            } else {
                SyntaxKind::Comment
            }
        } else if rest.starts_with("//") {
            i = match rest.find('\n') {
                Some(end) => start + end,
                None => bytes.len(),
            };
            SyntaxKind::Comment
        } else if is_ident_start(c) {
            while i < bytes.len() && is_ident_continue(bytes[i]) {
                i += 1;
            }
            keyword(&text[start..i])
        } else if c.is_ascii_digit() {
            while i < bytes.len() && is_ident_continue(bytes[i]) {
                i += 1;
            }
            SyntaxKind::Other
        } else if c == b'"' || c == b'\'' {
            i += 1;
            while i < bytes.len() && bytes[i] != c && bytes[i] != b'\n' {
                if bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            i = (i + 1).min(bytes.len());
            SyntaxKind::Other
        } else if rest.starts_with("...") {
            i += 3;
            SyntaxKind::Ellipsis
        } else {
            i += rest.chars().next().map_or(1, char::len_utf8);
            match c {
                b'@' => SyntaxKind::At,
                b'.' => SyntaxKind::Dot,
                b',' => SyntaxKind::Comma,
                b';' => SyntaxKind::Semicolon,
                b'*' => SyntaxKind::Asterisk,
                b'(' => SyntaxKind::LParen,
                b')' => SyntaxKind::RParen,
                b'{' => SyntaxKind::LBrace,
                b'}' => SyntaxKind::RBrace,
                b'<' => SyntaxKind::Lt,
                b'>' => SyntaxKind::Gt,
                b'=' => SyntaxKind::Eq,
                _ => SyntaxKind::Other,
            }
        };
        tokens.push(Lexed {
            kind,
            start,
            len: i - start,
        });
    }
    tokens
}

struct Parser<'t> {
    text: &'t str,
    tokens: Vec<Lexed>,
    pos: usize,
    events: Vec<ParseEvent>,
    last: Option<SyntaxKind>,
}

impl<'t> Parser<'t> {
    fn new(text: &'t str) -> Self {
        Parser {
            text,
            tokens: lex(text),
            pos: 0,
            events: Vec::new(),
            last: None,
        }
    }

    fn nth(&self, n: usize) -> Option<SyntaxKind> {
        self.tokens[self.pos..]
            .iter()
            .filter(|t| !t.kind.is_trivia())
            .nth(n)
            .map(|t| t.kind)
    }

    fn current(&self) -> Option<SyntaxKind> {
        self.nth(0)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == Some(kind)
    }

    fn at_text(&self, s: &str) -> bool {
        self.tokens[self.pos..]
            .iter()
            .find(|t| !t.kind.is_trivia())
            .is_some_and(|t| &self.text[t.start..t.start + t.len] == s)
    }

    fn flush_trivia(&mut self) {
        while let Some(token) = self.tokens.get(self.pos) {
            if !token.kind.is_trivia() {
                break;
            }
            self.events.push(ParseEvent::Token(token.kind, token.len as u32));
            self.pos += 1;
        }
    }

    fn bump(&mut self) {
        self.flush_trivia();
        if let Some(token) = self.tokens.get(self.pos) {
            self.events.push(ParseEvent::Token(token.kind, token.len as u32));
            self.last = Some(token.kind);
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn start(&mut self) -> usize {
        self.flush_trivia();
        self.events.push(ParseEvent::Start(SyntaxKind::Other));
        self.events.len() - 1
    }

    fn finish(&mut self, marker: usize, kind: SyntaxKind) {
        self.events[marker] = ParseEvent::Start(kind);
        self.events.push(ParseEvent::Finish);
    }

    fn parse_file(mut self) -> Vec<ParseEvent> {
        self.events.push(ParseEvent::Start(SyntaxKind::File));
        if self.at(SyntaxKind::PackageKeyword) {
            let package = self.start();
            self.bump();
            self.parse_reference(false);
            self.eat(SyntaxKind::Semicolon);
            self.finish(package, SyntaxKind::PackageStatement);
        }
        let imports = self.start();
        while self.at(SyntaxKind::ImportKeyword) {
            self.parse_import();
        }
        self.finish(imports, SyntaxKind::ImportList);
        while let Some(kind) = self.current() {
            if self.at_member_start(kind) {
                self.parse_member();
            } else {
                self.bump();
            }
        }
        self.flush_trivia();
        self.events.push(ParseEvent::Finish);
        self.events
    }

    fn parse_block_text(mut self) -> Vec<ParseEvent> {
        if self.eat(SyntaxKind::LBrace) {
            self.parse_block_contents();
        }
        while self.current().is_some() {
            self.bump();
        }
        self.flush_trivia();
        self.events
    }

    fn parse_import(&mut self) {
        let import = self.start();
        self.bump();
        let kind = if self.eat(SyntaxKind::StaticKeyword) {
            SyntaxKind::ImportStaticStatement
        } else {
            SyntaxKind::ImportStatement
        };
        self.parse_reference(false);
        if self.at(SyntaxKind::Dot) && self.nth(1) == Some(SyntaxKind::Asterisk) {
            self.bump();
            self.bump();
        }
        self.eat(SyntaxKind::Semicolon);
        self.finish(import, kind);
    }

    fn parse_reference(&mut self, type_args: bool) {
        let reference = self.start();
        self.eat(SyntaxKind::Identifier);
        while self.at(SyntaxKind::Dot) && self.nth(1) == Some(SyntaxKind::Identifier) {
            self.bump();
            self.bump();
        }
        if type_args && self.at(SyntaxKind::Lt) {
            self.parse_angle_brackets();
        }
        self.finish(reference, SyntaxKind::JavaCodeReference);
    }

    fn parse_angle_brackets(&mut self) {
        let mut depth = 0usize;
        while let Some(kind) = self.current() {
            self.bump();
            match kind {
                SyntaxKind::Lt => depth += 1,
                SyntaxKind::Gt => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    fn parse_type(&mut self) {
        let ty = self.start();
        self.parse_reference(true);
        while self.at_text("[") {
            self.bump();
            if self.at_text("]") {
                self.bump();
            }
        }
        self.finish(ty, SyntaxKind::Type);
    }

    fn at_member_start(&self, kind: SyntaxKind) -> bool {
        matches!(
            kind,
            SyntaxKind::DocCommentText
                | SyntaxKind::At
                | SyntaxKind::ModifierKeyword
                | SyntaxKind::StaticKeyword
                | SyntaxKind::ClassKeyword
                | SyntaxKind::InterfaceKeyword
                | SyntaxKind::EnumKeyword
                | SyntaxKind::Identifier
        )
    }

    fn parse_modifier_list(&mut self) {
        let modifiers = self.start();
        loop {
            match self.current() {
                Some(SyntaxKind::At) if self.nth(1) != Some(SyntaxKind::InterfaceKeyword) => {
                    self.parse_annotation();
                }
                Some(SyntaxKind::ModifierKeyword | SyntaxKind::StaticKeyword) => self.bump(),
                _ => break,
            }
        }
        self.finish(modifiers, SyntaxKind::ModifierList);
    }

    fn parse_annotation(&mut self) {
        let annotation = self.start();
        self.bump();
        self.parse_reference(false);
        if self.at(SyntaxKind::LParen) {
            self.parse_arguments();
        }
        self.finish(annotation, SyntaxKind::Annotation);
    }

    fn parse_member(&mut self) {
        let member = self.start();
        if self.at(SyntaxKind::DocCommentText) {
            let doc = self.start();
            self.bump();
            self.finish(doc, SyntaxKind::DocComment);
        }
        self.parse_modifier_list();
        match self.current() {
            Some(SyntaxKind::ClassKeyword | SyntaxKind::InterfaceKeyword | SyntaxKind::EnumKeyword) => {
                self.parse_class_rest(member);
            }
            Some(SyntaxKind::At) => self.parse_class_rest(member),
            Some(SyntaxKind::Identifier) if self.nth(1) == Some(SyntaxKind::LParen) => {
                self.bump();
                self.parse_parameter_list();
                self.parse_method_tail();
                self.finish(member, SyntaxKind::Method);
            }
            Some(SyntaxKind::Identifier) => {
                self.parse_type();
                self.eat(SyntaxKind::Identifier);
                if self.at(SyntaxKind::LParen) {
                    self.parse_parameter_list();
                    self.parse_method_tail();
                    self.finish(member, SyntaxKind::Method);
                } else {
                    if self.eat(SyntaxKind::Eq) {
                        self.parse_expression();
                    }
                    self.eat(SyntaxKind::Semicolon);
                    self.finish(member, SyntaxKind::Field);
                }
            }
            Some(SyntaxKind::LBrace) => {
                self.parse_code_block();
                self.finish(member, SyntaxKind::Statement);
            }
            _ => self.finish(member, SyntaxKind::Statement),
        }
    }

    fn parse_class_rest(&mut self, member: usize) {
        let is_enum = self.at(SyntaxKind::EnumKeyword);
        if self.eat(SyntaxKind::At) {
            self.eat(SyntaxKind::InterfaceKeyword);
        } else {
            self.bump();
        }
        self.eat(SyntaxKind::Identifier);
        if self.at(SyntaxKind::Lt) {
            self.parse_angle_brackets();
        }
        if self.at(SyntaxKind::ExtendsKeyword) || self.at(SyntaxKind::ImplementsKeyword) {
            let extends = self.start();
            while self.eat(SyntaxKind::ExtendsKeyword) || self.eat(SyntaxKind::ImplementsKeyword) {
                loop {
                    self.parse_reference(true);
                    if !self.eat(SyntaxKind::Comma) {
                        break;
                    }
                }
            }
            self.finish(extends, SyntaxKind::ExtendsList);
        }
        self.parse_class_body(is_enum);
        self.finish(member, SyntaxKind::Class);
    }

    fn parse_class_body(&mut self, is_enum: bool) {
        if !self.eat(SyntaxKind::LBrace) {
            return;
        }
        if is_enum {
            self.parse_enum_constants();
        }
        while let Some(kind) = self.current() {
            match kind {
                SyntaxKind::RBrace => {
                    self.bump();
                    break;
                }
                kind if self.at_member_start(kind) => self.parse_member(),
                _ => self.bump(),
            }
        }
    }

    fn parse_enum_constants(&mut self) {
        loop {
            let annotated = self.at(SyntaxKind::At);
            let named = self.at(SyntaxKind::Identifier)
                && matches!(
                    self.nth(1),
                    Some(
                        SyntaxKind::Comma
                            | SyntaxKind::Semicolon
                            | SyntaxKind::LParen
                            | SyntaxKind::LBrace
                            | SyntaxKind::RBrace
                    )
                );
            if !annotated && !named {
                break;
            }
            let constant = self.start();
            if annotated {
                self.parse_modifier_list();
            }
            self.eat(SyntaxKind::Identifier);
            if self.at(SyntaxKind::LParen) {
                self.parse_arguments();
            }
            if self.at(SyntaxKind::LBrace) {
                let body = self.start();
                self.parse_class_body(false);
                self.finish(body, SyntaxKind::EnumConstantInitializer);
            }
            self.finish(constant, SyntaxKind::EnumConstant);
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        self.eat(SyntaxKind::Semicolon);
    }

    fn parse_parameter_list(&mut self) {
        let list = self.start();
        self.bump();
        while let Some(kind) = self.current() {
            if kind == SyntaxKind::RParen {
                break;
            }
            let parameter = self.start();
            self.parse_modifier_list();
            self.parse_type();
            self.eat(SyntaxKind::Ellipsis);
            self.eat(SyntaxKind::Identifier);
            self.finish(parameter, SyntaxKind::Parameter);
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        self.eat(SyntaxKind::RParen);
        self.finish(list, SyntaxKind::ParameterList);
    }

    fn parse_method_tail(&mut self) {
        while let Some(kind) = self.current() {
            match kind {
                SyntaxKind::LBrace => {
                    self.parse_code_block();
                    return;
                }
                SyntaxKind::Semicolon => {
                    self.bump();
                    return;
                }
                SyntaxKind::RBrace => return,
                _ => self.bump(),
            }
        }
    }

    fn parse_code_block(&mut self) {
        let block = self.start();
        self.bump();
        self.parse_block_contents();
        self.finish(block, SyntaxKind::CodeBlock);
    }

    /// Everything after `{` up to and including the matching `}`.
    fn parse_block_contents(&mut self) {
        while let Some(kind) = self.current() {
            match kind {
                SyntaxKind::RBrace => {
                    self.bump();
                    return;
                }
                SyntaxKind::LBrace => self.parse_code_block(),
                SyntaxKind::ClassKeyword | SyntaxKind::InterfaceKeyword | SyntaxKind::EnumKeyword
                    if self.last != Some(SyntaxKind::Dot) =>
                {
                    self.parse_member();
                }
                _ => {
                    if !self.parse_new_if_present() {
                        self.bump();
                    }
                }
            }
        }
    }

    fn parse_new_if_present(&mut self) -> bool {
        if self.at(SyntaxKind::NewKeyword) {
            self.parse_new_expression(false);
            true
        } else if self.at(SyntaxKind::Identifier)
            && self.nth(1) == Some(SyntaxKind::Dot)
            && self.nth(2) == Some(SyntaxKind::NewKeyword)
        {
            self.parse_new_expression(true);
            true
        } else {
            false
        }
    }

    fn parse_new_expression(&mut self, qualified: bool) {
        let expression = self.start();
        if qualified {
            self.bump();
            self.bump();
        }
        self.bump();
        let body = self.start();
        if self.at(SyntaxKind::Identifier) {
            self.parse_reference(true);
        }
        if self.at(SyntaxKind::LParen) {
            self.parse_arguments();
        }
        if self.at(SyntaxKind::LBrace) {
            self.parse_class_body(false);
            self.finish(body, SyntaxKind::AnonymousClass);
        } else {
            self.finish(body, SyntaxKind::Expression);
        }
        self.finish(expression, SyntaxKind::NewExpression);
    }

    fn parse_arguments(&mut self) {
        self.bump();
        while let Some(kind) = self.current() {
            match kind {
                SyntaxKind::RParen => {
                    self.bump();
                    return;
                }
                SyntaxKind::LParen => self.parse_arguments(),
                SyntaxKind::LBrace => self.parse_code_block(),
                _ => {
                    if !self.parse_new_if_present() {
                        self.bump();
                    }
                }
            }
        }
    }

    fn parse_expression(&mut self) {
        while let Some(kind) = self.current() {
            match kind {
                SyntaxKind::Semicolon | SyntaxKind::RBrace => return,
                SyntaxKind::LParen => self.parse_arguments(),
                SyntaxKind::LBrace => self.parse_code_block(),
                _ => {
                    if !self.parse_new_if_present() {
                        self.bump();
                    }
                }
            }
        }
    }
}

/// Parse events for a whole compilation unit.
pub fn parse_events(text: &str) -> Vec<ParseEvent> {
    Parser::new(text).parse_file()
}

pub fn light_tree(text: &str) -> LightTree {
    LightTree::from_events(text, &parse_events(text)).expect("mini parser emits well-formed events")
}

/// Chameleon parser for code blocks, counting how often it runs.
#[derive(Default)]
pub struct JavaBlockParser {
    calls: AtomicUsize,
}

impl JavaBlockParser {
    pub fn new() -> Arc<JavaBlockParser> {
        Arc::new(JavaBlockParser::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ChameleonParser for JavaBlockParser {
    fn parse(&self, kind: SyntaxKind, text: &str) -> Result<Vec<GreenNode>, ExpandError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let events = Parser::new(text).parse_block_text();
        GreenNode::from_events(text, &events, true).map_err(|err| ExpandError::Parse {
            kind,
            message: err.to_string(),
        })
    }
}

pub fn syntax_tree_with(text: &str, parser: Arc<JavaBlockParser>) -> SyntaxTree {
    SyntaxTree::from_events(text, &parse_events(text), parser)
        .expect("mini parser emits well-formed events")
}

pub fn syntax_tree(text: &str) -> SyntaxTree {
    syntax_tree_with(text, JavaBlockParser::new())
}

//! Child scans shared by the full and light stub paths.
//!
//! Everything here is generic over `FlyweightTree`, so a declaration read
//! from a `SyntaxTree` and one read from a `LightTree` go through the very
//! same code and produce equal stubs.

use crate::flags::{ClassFlags, FieldFlags, ImportFlags, MethodFlags};
use crate::kind::StubKind;
use crate::names;
use crate::stub::{
    AnnotationStub, ClassStub, FieldStub, FileStub, ImportStub, MethodStub, StubId, StubTree,
};
use std::sync::Arc;
use stubz_tree::{ExpandError, FlyweightTree, SyntaxKind};

/// Child lists read into pooled buffers, so one declaration scan reuses the
/// same few arrays no matter how deep it looks.
struct Scanner<'t, T: FlyweightTree> {
    tree: &'t T,
    pool: Vec<Vec<T::Node>>,
}

/// Children of one node: `nodes[..count]`.
struct Children<N> {
    nodes: Vec<N>,
    count: usize,
}

impl<N: Copy> Children<N> {
    fn as_slice(&self) -> &[N] {
        &self.nodes[..self.count]
    }
}

impl<'t, T: FlyweightTree> Scanner<'t, T> {
    fn new(tree: &'t T) -> Self {
        Scanner {
            tree,
            pool: Vec::new(),
        }
    }

    fn children(&mut self, node: T::Node) -> Result<Children<T::Node>, ExpandError> {
        let mut nodes = self.pool.pop().unwrap_or_default();
        let count = self.tree.children(node, &mut nodes)?;
        Ok(Children { nodes, count })
    }

    fn recycle(&mut self, mut children: Children<T::Node>) {
        self.tree.dispose(&mut children.nodes, children.count);
        self.pool.push(children.nodes);
    }

    fn first_of_kind(&self, nodes: &[T::Node], kind: SyntaxKind) -> Option<T::Node> {
        nodes.iter().copied().find(|&n| self.tree.kind(n) == Some(kind))
    }

    fn has_child_of_kind(&mut self, node: T::Node, kind: SyntaxKind) -> Result<bool, ExpandError> {
        let children = self.children(node)?;
        let found = self.first_of_kind(children.as_slice(), kind).is_some();
        self.recycle(children);
        Ok(found)
    }

    /// Token text under `node` with whitespace and comments dropped.
    fn significant_text(&mut self, node: T::Node) -> Result<String, ExpandError> {
        let mut out = String::new();
        let mut pending = self.pool.pop().unwrap_or_default();
        pending.clear();
        pending.push(node);
        let mut result = Ok(());
        while let Some(current) = pending.pop() {
            match self.tree.kind(current) {
                Some(kind) if kind.is_trivia() => {}
                Some(kind) if kind.is_token() => out.push_str(&self.tree.node_text(current)),
                _ => match self.children(current) {
                    Ok(children) => {
                        pending.extend(children.as_slice().iter().rev());
                        self.recycle(children);
                    }
                    Err(err) => {
                        result = Err(err);
                        break;
                    }
                },
            }
        }
        pending.clear();
        self.pool.push(pending);
        result.map(|()| out)
    }

    fn text_arc(&self, node: T::Node) -> Arc<str> {
        Arc::from(self.tree.node_text(node).as_ref())
    }

    fn modifier_list_deprecates(&mut self, modifiers: T::Node) -> Result<bool, ExpandError> {
        let children = self.children(modifiers)?;
        let mut deprecated = Ok(false);
        for &child in children.as_slice() {
            if self.tree.kind(child) != Some(SyntaxKind::Annotation) {
                continue;
            }
            match self.annotation_deprecates(child) {
                Ok(false) => {}
                other => {
                    deprecated = other;
                    break;
                }
            }
        }
        self.recycle(children);
        deprecated
    }

    fn annotation_deprecates(&mut self, annotation: T::Node) -> Result<bool, ExpandError> {
        let parts = self.children(annotation)?;
        let reference = self.first_of_kind(parts.as_slice(), SyntaxKind::JavaCodeReference);
        self.recycle(parts);
        match reference {
            Some(reference) => Ok(names::is_deprecated_annotation(
                &self.significant_text(reference)?,
            )),
            None => Ok(false),
        }
    }
}

/// Class stub whose parent stub is `parent`.
pub(crate) fn class_stub<T: FlyweightTree>(
    tree: &T,
    node: T::Node,
    kind: StubKind,
    stubs: &StubTree,
    parent: StubId,
) -> Result<ClassStub, ExpandError> {
    let enum_const = kind == StubKind::EnumConstantInitializer;
    let anonymous = enum_const || kind == StubKind::AnonymousClass;

    let mut flags = ClassFlags::empty();
    flags.set(ClassFlags::ANONYMOUS, anonymous);
    flags.set(ClassFlags::ENUM_CONSTANT_INITIALIZER, enum_const);
    let mut name: Option<Arc<str>> = None;
    let mut base_ref: Option<Arc<str>> = None;

    let mut scan = Scanner::new(tree);
    let children = scan.children(node)?;
    for &child in children.as_slice() {
        match tree.kind(child) {
            Some(SyntaxKind::DocComment) => {
                if names::doc_comment_deprecates(&tree.node_text(child)) {
                    flags |= ClassFlags::DEPRECATED_BY_COMMENT;
                }
            }
            Some(SyntaxKind::ModifierList) => {
                if scan.modifier_list_deprecates(child)? {
                    flags |= ClassFlags::DEPRECATED_BY_ANNOTATION;
                }
            }
            Some(SyntaxKind::At) => flags |= ClassFlags::ANNOTATION_TYPE,
            Some(SyntaxKind::InterfaceKeyword) => flags |= ClassFlags::INTERFACE,
            Some(SyntaxKind::EnumKeyword) => flags |= ClassFlags::ENUM,
            Some(SyntaxKind::Identifier) if !anonymous && name.is_none() => {
                name = Some(scan.text_arc(child));
            }
            Some(SyntaxKind::JavaCodeReference) if anonymous && !enum_const && base_ref.is_none() => {
                base_ref = Some(Arc::from(scan.significant_text(child)?));
            }
            _ => {}
        }
    }
    scan.recycle(children);

    if enum_const {
        // Taken from the enclosing enum's stub, not from the tree.
        base_ref = enclosing_class(stubs, parent)
            .and_then(|class| stubs.get_id(class))
            .map(Arc::from);
    } else if anonymous && in_qualified_new(&mut scan, node)? {
        flags |= ClassFlags::ANONYMOUS_IN_QUALIFIED_NEW;
    }

    let qualified_name = if anonymous {
        None
    } else {
        name.as_deref()
            .and_then(|name| qualified_name(stubs, parent, name))
            .map(Arc::from)
    };

    Ok(ClassStub {
        flags,
        name,
        qualified_name,
        base_class_reference: base_ref,
        source_file_name: None,
    })
}

fn enclosing_class(stubs: &StubTree, parent: StubId) -> Option<StubId> {
    if stubs.class(parent).is_some() {
        Some(parent)
    } else {
        stubs.parent_class(parent)
    }
}

/// Qualified name of a named class declared directly under `parent`.
fn qualified_name(stubs: &StubTree, parent: StubId, name: &str) -> Option<String> {
    match stubs.kind(parent)? {
        StubKind::File => Some(names::top_level_qualified_name(stubs.package_name(), name)),
        kind if kind.is_class() => stubs
            .class_qualified_name(parent)
            .map(|outer| format!("{outer}.{name}")),
        _ => None,
    }
}

/// `outer.new Inner() { .. }`: a dot precedes `new` in the enclosing
/// new-expression.
fn in_qualified_new<T: FlyweightTree>(
    scan: &mut Scanner<'_, T>,
    node: T::Node,
) -> Result<bool, ExpandError> {
    let Some(parent) = scan.tree.parent(node) else {
        return Ok(false);
    };
    if scan.tree.kind(parent) != Some(SyntaxKind::NewExpression) {
        return Ok(false);
    }
    scan.has_child_of_kind(parent, SyntaxKind::Dot)
}

pub(crate) fn method_stub<T: FlyweightTree>(
    tree: &T,
    node: T::Node,
    stubs: &StubTree,
    parent: StubId,
) -> Result<MethodStub, ExpandError> {
    let mut flags = MethodFlags::empty();
    let mut name = None;
    let mut return_type = None;

    let mut scan = Scanner::new(tree);
    let children = scan.children(node)?;
    for &child in children.as_slice() {
        match tree.kind(child) {
            Some(SyntaxKind::DocComment) => {
                if names::doc_comment_deprecates(&tree.node_text(child)) {
                    flags |= MethodFlags::DEPRECATED;
                }
            }
            Some(SyntaxKind::ModifierList) => {
                if scan.modifier_list_deprecates(child)? {
                    flags |= MethodFlags::DEPRECATED_ANNOTATION;
                }
            }
            Some(SyntaxKind::Type) if return_type.is_none() => {
                return_type = Some(Arc::from(scan.significant_text(child)?));
            }
            Some(SyntaxKind::Identifier) if name.is_none() => name = Some(scan.text_arc(child)),
            Some(SyntaxKind::ParameterList) => {
                if last_parameter_is_varargs(&mut scan, child)? {
                    flags |= MethodFlags::VARARGS;
                }
            }
            _ => {}
        }
    }
    scan.recycle(children);

    flags.set(MethodFlags::CONSTRUCTOR, return_type.is_none());
    if stubs.class(parent).is_some_and(|c| c.is_annotation_type()) {
        flags |= MethodFlags::ANNOTATION_METHOD;
    }

    Ok(MethodStub {
        flags,
        name,
        return_type,
    })
}

fn last_parameter_is_varargs<T: FlyweightTree>(
    scan: &mut Scanner<'_, T>,
    parameters: T::Node,
) -> Result<bool, ExpandError> {
    let children = scan.children(parameters)?;
    let last = children
        .as_slice()
        .iter()
        .rev()
        .copied()
        .find(|&n| scan.tree.kind(n) == Some(SyntaxKind::Parameter));
    scan.recycle(children);
    match last {
        Some(last) => scan.has_child_of_kind(last, SyntaxKind::Ellipsis),
        None => Ok(false),
    }
}

pub(crate) fn field_stub<T: FlyweightTree>(
    tree: &T,
    node: T::Node,
) -> Result<FieldStub, ExpandError> {
    let mut flags = FieldFlags::empty();
    flags.set(
        FieldFlags::ENUM_CONSTANT,
        tree.kind(node) == Some(SyntaxKind::EnumConstant),
    );
    let mut name = None;
    let mut type_text = None;

    let mut scan = Scanner::new(tree);
    let children = scan.children(node)?;
    for &child in children.as_slice() {
        match tree.kind(child) {
            Some(SyntaxKind::DocComment) => {
                if names::doc_comment_deprecates(&tree.node_text(child)) {
                    flags |= FieldFlags::DEPRECATED;
                }
            }
            Some(SyntaxKind::ModifierList) => {
                if scan.modifier_list_deprecates(child)? {
                    flags |= FieldFlags::DEPRECATED_ANNOTATION;
                }
            }
            Some(SyntaxKind::Type) if type_text.is_none() => {
                type_text = Some(Arc::from(scan.significant_text(child)?));
            }
            Some(SyntaxKind::Identifier) if name.is_none() => name = Some(scan.text_arc(child)),
            Some(SyntaxKind::Eq) => flags |= FieldFlags::HAS_INITIALIZER,
            _ => {}
        }
    }
    scan.recycle(children);

    Ok(FieldStub {
        flags,
        name,
        type_text,
    })
}

pub(crate) fn import_stub<T: FlyweightTree>(
    tree: &T,
    node: T::Node,
) -> Result<ImportStub, ExpandError> {
    let mut flags = ImportFlags::empty();
    flags.set(
        ImportFlags::STATIC,
        tree.kind(node) == Some(SyntaxKind::ImportStaticStatement),
    );
    let mut reference = None;

    let mut scan = Scanner::new(tree);
    let children = scan.children(node)?;
    for &child in children.as_slice() {
        match tree.kind(child) {
            Some(SyntaxKind::JavaCodeReference) if reference.is_none() => {
                reference = Some(Arc::from(scan.significant_text(child)?));
            }
            Some(SyntaxKind::Asterisk) => flags |= ImportFlags::ON_DEMAND,
            _ => {}
        }
    }
    scan.recycle(children);

    Ok(ImportStub { flags, reference })
}

pub(crate) fn annotation_stub<T: FlyweightTree>(tree: &T, node: T::Node) -> AnnotationStub {
    AnnotationStub {
        text: Scanner::new(tree).text_arc(node),
    }
}

pub(crate) fn file_stub<T: FlyweightTree>(tree: &T, node: T::Node) -> Result<FileStub, ExpandError> {
    let mut scan = Scanner::new(tree);
    let children = scan.children(node)?;
    let statement = scan.first_of_kind(children.as_slice(), SyntaxKind::PackageStatement);
    scan.recycle(children);

    let mut package_name: Arc<str> = Arc::from("");
    if let Some(statement) = statement {
        let parts = scan.children(statement)?;
        let reference = scan.first_of_kind(parts.as_slice(), SyntaxKind::JavaCodeReference);
        scan.recycle(parts);
        if let Some(reference) = reference {
            package_name = Arc::from(scan.significant_text(reference)?);
        }
    }
    Ok(FileStub {
        flags: Default::default(),
        package_name,
    })
}

#[cfg(test)]
#[path = "tests/scan_tests.rs"]
mod scan_tests;

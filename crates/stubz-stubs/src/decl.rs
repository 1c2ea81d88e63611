//! Declarations: what callers get when stub-level data is not enough.
//!
//! `instantiate` is the single dispatch point from a stub (or a syntax node)
//! to a concrete declaration. A node is first turned into the stub the
//! builders would produce for it, so both origins yield equal data.

use crate::element_type::registry;
use crate::flags::{ClassFlags, FieldFlags, ImportFlags, MethodFlags};
use crate::kind::StubKind;
use crate::stub::{ClassStub, FileStub, StubData, StubId, StubTree};
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex, PoisonError};
use stubz_tree::lock_order::BroaderLockScope;
use stubz_tree::{ExpandError, ExpansionListener, NodeIndex, SyntaxTree};
use tracing::{trace, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeclOrigin {
    Stub(StubId),
    Node { tree: u64, node: NodeIndex },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDecl {
    pub origin: DeclOrigin,
    pub flags: ClassFlags,
    pub name: Option<Arc<str>>,
    pub qualified_name: Option<Arc<str>>,
    pub base_class_reference: Option<Arc<str>>,
    pub source_file_name: Option<Arc<str>>,
}

impl ClassDecl {
    fn new(origin: DeclOrigin, stub: ClassStub) -> ClassDecl {
        ClassDecl {
            origin,
            flags: stub.flags,
            name: stub.name,
            qualified_name: stub.qualified_name,
            base_class_reference: stub.base_class_reference,
            source_file_name: stub.source_file_name,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberDecl {
    pub origin: DeclOrigin,
    pub name: Option<Arc<str>>,
    /// Return type of a method or declared type of a field.
    pub type_text: Option<Arc<str>>,
    pub deprecated: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportDecl {
    pub origin: DeclOrigin,
    pub flags: ImportFlags,
    pub reference: Option<Arc<str>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationDecl {
    pub origin: DeclOrigin,
    pub text: Arc<str>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Declaration {
    Class(ClassDecl),
    AnonymousClass(ClassDecl),
    EnumConstantInitializer(ClassDecl),
    /// A class read from compiled output.
    CompiledClass(ClassDecl),
    Method(MemberDecl),
    Field(MemberDecl),
    Import(ImportDecl),
    ImportList(DeclOrigin),
    Annotation(AnnotationDecl),
}

impl Declaration {
    pub fn origin(&self) -> DeclOrigin {
        match self {
            Declaration::Class(c)
            | Declaration::AnonymousClass(c)
            | Declaration::EnumConstantInitializer(c)
            | Declaration::CompiledClass(c) => c.origin,
            Declaration::Method(m) | Declaration::Field(m) => m.origin,
            Declaration::Import(i) => i.origin,
            Declaration::ImportList(origin) => *origin,
            Declaration::Annotation(a) => a.origin,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Declaration::Class(c)
            | Declaration::AnonymousClass(c)
            | Declaration::EnumConstantInitializer(c)
            | Declaration::CompiledClass(c) => c.name.as_deref(),
            Declaration::Method(m) | Declaration::Field(m) => m.name.as_deref(),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassDecl> {
        match self {
            Declaration::Class(c)
            | Declaration::AnonymousClass(c)
            | Declaration::EnumConstantInitializer(c)
            | Declaration::CompiledClass(c) => Some(c),
            _ => None,
        }
    }
}

#[derive(Clone, Copy)]
pub enum StubOrNode<'a> {
    Stub(&'a StubTree, StubId),
    Node(&'a SyntaxTree, NodeIndex),
}

/// Concrete declaration for a stub or syntax node.
///
/// `Ok(None)` for file stubs and for nodes that declare nothing.
pub fn instantiate(source: StubOrNode<'_>) -> Result<Option<Declaration>, ExpandError> {
    match source {
        StubOrNode::Stub(stubs, id) => Ok(stubs
            .data(id)
            .cloned()
            .and_then(|data| declaration(data, DeclOrigin::Stub(id), stubs.is_compiled()))),
        StubOrNode::Node(tree, node) => {
            let origin = DeclOrigin::Node {
                tree: tree.id(),
                node,
            };
            Ok(node_stub(tree, node)?.and_then(|data| declaration(data, origin, false)))
        }
    }
}

fn declaration(data: StubData, origin: DeclOrigin, compiled: bool) -> Option<Declaration> {
    let kind = data.kind();
    Some(match data {
        StubData::File(_) => return None,
        StubData::ImportList => Declaration::ImportList(origin),
        StubData::Import(import) => Declaration::Import(ImportDecl {
            origin,
            flags: import.flags,
            reference: import.reference,
        }),
        StubData::Class(class) => {
            let decl = ClassDecl::new(origin, class);
            match kind {
                StubKind::AnonymousClass => Declaration::AnonymousClass(decl),
                StubKind::EnumConstantInitializer => Declaration::EnumConstantInitializer(decl),
                _ if compiled => Declaration::CompiledClass(decl),
                _ => Declaration::Class(decl),
            }
        }
        StubData::Method(method) => Declaration::Method(MemberDecl {
            origin,
            deprecated: method
                .flags
                .intersects(MethodFlags::DEPRECATED | MethodFlags::DEPRECATED_ANNOTATION),
            name: method.name,
            type_text: method.return_type,
        }),
        StubData::Field(field) => Declaration::Field(MemberDecl {
            origin,
            deprecated: field
                .flags
                .intersects(FieldFlags::DEPRECATED | FieldFlags::DEPRECATED_ANNOTATION),
            name: field.name,
            type_text: field.type_text,
        }),
        StubData::Annotation(annotation) => Declaration::Annotation(AnnotationDecl {
            origin,
            text: annotation.text,
        }),
    })
}

/// The stub the builders would create for `node`, with the stubs of its
/// declaring ancestors as context.
fn node_stub(tree: &SyntaxTree, node: NodeIndex) -> Result<Option<StubData>, ExpandError> {
    let registry = registry();
    let Some(element_type) = tree.kind(node).and_then(|k| registry.for_syntax(k)) else {
        return Ok(None);
    };

    let mut ancestors = Vec::new();
    let mut current = tree.parent(node);
    while current.is_some() {
        ancestors.push(current);
        current = tree.parent(current);
    }

    let mut stubs = StubTree::new(FileStub::default());
    let mut parent = StubId::ROOT;
    for &ancestor in ancestors.iter().rev() {
        let Some(ancestor_type) = tree.kind(ancestor).and_then(|k| registry.for_syntax(k)) else {
            continue;
        };
        match ancestor_type.create_stub(tree, ancestor, &stubs, parent)? {
            StubData::File(file) => {
                if ancestor == tree.root() {
                    stubs.set_file(file);
                }
            }
            data => parent = stubs.add(parent, data),
        }
    }
    element_type.create_stub(tree, node, &stubs, parent).map(Some)
}

/// Process-wide cache of declarations created for syntax nodes.
///
/// Entries are keyed by tree id and are not released when a `SyntaxTree` is
/// dropped. Whoever unloads a file must call [`DeclarationCache::invalidate_tree`]
/// first, or the entries stay for the life of the cache.
///
/// The cache lock is a broader lock: it is never taken while a node
/// expansion lock is held, and no node lock is taken while it is held.
#[derive(Default)]
pub struct DeclarationCache {
    entries: Mutex<FxHashMap<(u64, NodeIndex), Arc<Declaration>>>,
}

impl DeclarationCache {
    pub fn new() -> DeclarationCache {
        DeclarationCache::default()
    }

    fn with_entries<R>(
        &self,
        f: impl FnOnce(&mut FxHashMap<(u64, NodeIndex), Arc<Declaration>>) -> R,
    ) -> R {
        let _scope = BroaderLockScope::enter("declaration cache");
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut entries)
    }

    pub fn get(&self, tree: &SyntaxTree, node: NodeIndex) -> Option<Arc<Declaration>> {
        self.with_entries(|entries| entries.get(&(tree.id(), node)).cloned())
    }

    /// Cached declaration of `node`, creating it on first request.
    pub fn get_or_instantiate(
        &self,
        tree: &SyntaxTree,
        node: NodeIndex,
    ) -> Result<Option<Arc<Declaration>>, ExpandError> {
        if let Some(existing) = self.get(tree, node) {
            return Ok(Some(existing));
        }
        // Built outside the cache lock: instantiation reads node state.
        let Some(decl) = instantiate(StubOrNode::Node(tree, node))? else {
            return Ok(None);
        };
        let decl = Arc::new(decl);
        Ok(Some(self.with_entries(|entries| {
            entries.entry((tree.id(), node)).or_insert(decl).clone()
        })))
    }

    /// Drop every declaration of `tree`. Required before the tree is unloaded.
    pub fn invalidate_tree(&self, tree: &SyntaxTree) {
        let id = tree.id();
        self.with_entries(|entries| entries.retain(|(tree_id, _), _| *tree_id != id));
    }

    pub fn len(&self) -> usize {
        self.with_entries(|entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ExpansionListener for DeclarationCache {
    fn subtree_expanded(&self, tree: &SyntaxTree, node: NodeIndex) {
        let mut created = Vec::new();
        let mut stack: Vec<NodeIndex> = tree.first_child_if_expanded(node).into_iter().collect();
        while let Some(current) = stack.pop() {
            if current.is_none() {
                continue;
            }
            stack.push(tree.next_sibling(current));
            let Some(kind) = tree.kind(current) else {
                continue;
            };
            if kind.is_token() {
                continue;
            }
            if StubKind::for_syntax(kind).is_some_and(|k| k != StubKind::File) {
                match instantiate(StubOrNode::Node(tree, current)) {
                    Ok(Some(decl)) => created.push((current, Arc::new(decl))),
                    Ok(None) => {}
                    Err(err) => {
                        warn!(node = current.0, error = %err, "declaration not created");
                    }
                }
            }
            // Collapsed chameleons stay collapsed; they report on their own expansion.
            if let Some(first) = tree.first_child_if_expanded(current) {
                stack.push(first);
            }
        }

        trace!(node = node.0, declarations = created.len(), "declarations cached");
        let id = tree.id();
        self.with_entries(|entries| {
            for (decl_node, decl) in created {
                entries.entry((id, decl_node)).or_insert(decl);
            }
        });
    }
}

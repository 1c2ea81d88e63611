//! Stub payloads and the stub tree arena.
//!
//! A `StubTree` is an append-only arena: the root is always the file stub,
//! every other stub has exactly one parent, and children keep insertion order,
//! which the builders make equal to source order.

use crate::flags::{ClassFlags, FieldFlags, FileFlags, ImportFlags, MethodFlags};
use crate::kind::StubKind;
use smallvec::SmallVec;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StubId(pub u32);

impl StubId {
    pub const ROOT: StubId = StubId(0);
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileStub {
    pub flags: FileFlags,
    /// Empty for the default package.
    pub package_name: Arc<str>,
}

/// Payload shared by ordinary classes, anonymous classes and enum constant
/// initializers. Which of the three a stub is follows from its flags.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassStub {
    pub flags: ClassFlags,
    pub name: Option<Arc<str>>,
    /// `None` whenever an enclosing qualified name is unknown.
    pub qualified_name: Option<Arc<str>>,
    /// Anonymous kinds only: the text of the instantiated type reference.
    pub base_class_reference: Option<Arc<str>>,
    /// Set for classes read from compiled output.
    pub source_file_name: Option<Arc<str>>,
}

impl ClassStub {
    pub fn is_anonymous(&self) -> bool {
        self.flags.contains(ClassFlags::ANONYMOUS)
    }

    pub fn is_enum_constant_initializer(&self) -> bool {
        self.flags.contains(ClassFlags::ENUM_CONSTANT_INITIALIZER)
    }

    pub fn is_interface(&self) -> bool {
        self.flags.contains(ClassFlags::INTERFACE)
    }

    pub fn is_enum(&self) -> bool {
        self.flags.contains(ClassFlags::ENUM)
    }

    pub fn is_annotation_type(&self) -> bool {
        self.flags.contains(ClassFlags::ANNOTATION_TYPE)
    }

    pub fn is_deprecated(&self) -> bool {
        self.flags.is_deprecated()
    }

    pub fn kind(&self) -> StubKind {
        crate::element_type::type_for_class(self.is_anonymous(), self.is_enum_constant_initializer())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportStub {
    pub flags: ImportFlags,
    /// Imported reference without the trailing `.*` of on-demand imports.
    pub reference: Option<Arc<str>>,
}

impl ImportStub {
    pub fn is_static(&self) -> bool {
        self.flags.contains(ImportFlags::STATIC)
    }

    pub fn is_on_demand(&self) -> bool {
        self.flags.contains(ImportFlags::ON_DEMAND)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MethodStub {
    pub flags: MethodFlags,
    pub name: Option<Arc<str>>,
    /// `None` for constructors.
    pub return_type: Option<Arc<str>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldStub {
    pub flags: FieldFlags,
    pub name: Option<Arc<str>>,
    /// `None` for enum constants.
    pub type_text: Option<Arc<str>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationStub {
    /// Raw annotation source, `@` included.
    pub text: Arc<str>,
}

impl AnnotationStub {
    /// Simple name of the annotation type, parsed from the raw text.
    pub fn short_name(&self) -> &str {
        crate::names::annotation_short_name(&self.text)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StubData {
    File(FileStub),
    ImportList,
    Import(ImportStub),
    Class(ClassStub),
    Method(MethodStub),
    Field(FieldStub),
    Annotation(AnnotationStub),
}

impl StubData {
    pub fn kind(&self) -> StubKind {
        match self {
            StubData::File(_) => StubKind::File,
            StubData::ImportList => StubKind::ImportList,
            StubData::Import(_) => StubKind::Import,
            StubData::Class(class) => class.kind(),
            StubData::Method(_) => StubKind::Method,
            StubData::Field(_) => StubKind::Field,
            StubData::Annotation(_) => StubKind::Annotation,
        }
    }

    /// Identity string of the stub: its name, when the kind has one.
    pub fn get_id(&self) -> Option<&str> {
        match self {
            StubData::Class(class) => class.name.as_deref(),
            StubData::Method(method) => method.name.as_deref(),
            StubData::Field(field) => field.name.as_deref(),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassStub> {
        match self {
            StubData::Class(class) => Some(class),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct StubNode {
    parent: Option<StubId>,
    children: SmallVec<[StubId; 4]>,
    data: StubData,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StubTree {
    stubs: Vec<StubNode>,
}

impl StubTree {
    pub fn new(file: FileStub) -> StubTree {
        StubTree {
            stubs: vec![StubNode {
                parent: None,
                children: SmallVec::new(),
                data: StubData::File(file),
            }],
        }
    }

    pub fn root(&self) -> StubId {
        StubId::ROOT
    }

    pub fn len(&self) -> usize {
        self.stubs.len()
    }

    /// A stub tree always holds at least its file stub.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Append `data` as the last child of `parent`.
    ///
    /// Panics if `parent` is not a stub of this tree.
    pub fn add(&mut self, parent: StubId, data: StubData) -> StubId {
        assert!(
            (parent.0 as usize) < self.stubs.len(),
            "stub parent {} out of range",
            parent.0
        );
        let id = StubId(self.stubs.len() as u32);
        self.stubs.push(StubNode {
            parent: Some(parent),
            children: SmallVec::new(),
            data,
        });
        self.stubs[parent.0 as usize].children.push(id);
        id
    }

    /// Replace the file stub at the root.
    pub(crate) fn set_file(&mut self, file: FileStub) {
        if let Some(root) = self.stubs.first_mut() {
            root.data = StubData::File(file);
        }
    }

    #[inline]
    fn node(&self, id: StubId) -> Option<&StubNode> {
        self.stubs.get(id.0 as usize)
    }

    pub fn data(&self, id: StubId) -> Option<&StubData> {
        self.node(id).map(|n| &n.data)
    }

    pub fn kind(&self, id: StubId) -> Option<StubKind> {
        self.data(id).map(StubData::kind)
    }

    pub fn parent(&self, id: StubId) -> Option<StubId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: StubId) -> &[StubId] {
        self.node(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Every stub id, parents before children.
    pub fn ids(&self) -> impl Iterator<Item = StubId> + '_ {
        (0..self.stubs.len() as u32).map(StubId)
    }

    pub fn get_id(&self, id: StubId) -> Option<&str> {
        self.data(id).and_then(StubData::get_id)
    }

    pub fn file(&self) -> &FileStub {
        match self.stubs.first().map(|n| &n.data) {
            Some(StubData::File(file)) => file,
            _ => unreachable!("stub tree root is always a file stub"),
        }
    }

    pub fn package_name(&self) -> &str {
        &self.file().package_name
    }

    pub fn is_compiled(&self) -> bool {
        self.file().flags.contains(FileFlags::COMPILED)
    }

    pub fn class(&self, id: StubId) -> Option<&ClassStub> {
        self.data(id).and_then(StubData::as_class)
    }

    pub fn class_qualified_name(&self, id: StubId) -> Option<&str> {
        self.class(id).and_then(|c| c.qualified_name.as_deref())
    }

    /// Nearest class-like ancestor of `id`, not counting `id` itself.
    pub fn parent_class(&self, id: StubId) -> Option<StubId> {
        let mut current = self.parent(id);
        while let Some(candidate) = current {
            if self.class(candidate).is_some() {
                return Some(candidate);
            }
            current = self.parent(candidate);
        }
        None
    }
}

//! Stub element types and the closed registry.
//!
//! One descriptor per stub kind knows how to create, encode, decode and index
//! stubs of that kind. The registry is a fixed table indexed by `StubKind`,
//! built once on first use.

use crate::codec::{StubInputStream, StubOutputStream};
use crate::error::DecodeError;
use crate::flags::{ClassFlags, FieldFlags, FileFlags, ImportFlags, MethodFlags};
use crate::kind::StubKind;
use crate::names;
use crate::scan;
use crate::sink::{IndexKey, IndexSink, IndexValue};
use crate::stub::{
    AnnotationStub, ClassStub, FieldStub, FileStub, ImportStub, MethodStub, StubData, StubId,
    StubTree,
};
use once_cell::sync::Lazy;
use stubz_common::limits::STUB_FORMAT_VERSION;
use stubz_common::name_hash;
use stubz_tree::{ExpandError, LightNodeId, LightTree, NodeIndex, SyntaxKind, SyntaxTree, TreeView};

/// Class-like stub kind for the given shape.
pub fn type_for_class(anonymous: bool, enum_constant_initializer: bool) -> StubKind {
    match (anonymous, enum_constant_initializer) {
        (_, true) => StubKind::EnumConstantInitializer,
        (true, false) => StubKind::AnonymousClass,
        (false, false) => StubKind::Class,
    }
}

pub trait StubElementType: Send + Sync {
    fn kind(&self) -> StubKind;

    /// Stable identifier of the element type, e.g. `java.CLASS`.
    fn external_id(&self) -> &'static str;

    /// Bumped whenever this type's payload layout or contents change.
    fn version(&self) -> u32 {
        0
    }

    /// Stub for a node of a full syntax tree. Chameleons below `node` are
    /// expanded when the scan needs them.
    fn create_stub(
        &self,
        tree: &SyntaxTree,
        node: NodeIndex,
        stubs: &StubTree,
        parent: StubId,
    ) -> Result<StubData, ExpandError>;

    /// Stub for a node of a light tree. Equal to what `create_stub` yields
    /// for the same source.
    fn create_stub_light(
        &self,
        tree: &LightTree,
        node: LightNodeId,
        stubs: &StubTree,
        parent: StubId,
    ) -> StubData;

    fn serialize(&self, stub: &StubData, out: &mut StubOutputStream);

    fn deserialize(
        &self,
        input: &mut StubInputStream<'_>,
        stubs: &StubTree,
        parent: StubId,
    ) -> Result<StubData, DecodeError>;

    fn index_stub(&self, stub: &StubData, sink: &mut dyn IndexSink);
}

/// Light trees never expand, so the shared scans cannot fail on them.
fn light<T>(result: Result<T, ExpandError>, fallback: impl FnOnce() -> T) -> T {
    result.unwrap_or_else(|_| fallback())
}

// =============================================================================
// File
// =============================================================================

pub struct FileElementType;

impl StubElementType for FileElementType {
    fn kind(&self) -> StubKind {
        StubKind::File
    }

    fn external_id(&self) -> &'static str {
        "java.FILE"
    }

    fn version(&self) -> u32 {
        1
    }

    fn create_stub(
        &self,
        tree: &SyntaxTree,
        node: NodeIndex,
        _stubs: &StubTree,
        _parent: StubId,
    ) -> Result<StubData, ExpandError> {
        scan::file_stub(&TreeView::new(tree), node).map(StubData::File)
    }

    fn create_stub_light(
        &self,
        tree: &LightTree,
        node: LightNodeId,
        _stubs: &StubTree,
        _parent: StubId,
    ) -> StubData {
        StubData::File(light(scan::file_stub(tree, node), FileStub::default))
    }

    fn serialize(&self, stub: &StubData, out: &mut StubOutputStream) {
        let StubData::File(file) = stub else {
            debug_assert!(false, "file element type given {:?}", stub.kind());
            return;
        };
        out.write_u8(file.flags.bits());
        out.write_name(Some(&file.package_name));
    }

    fn deserialize(
        &self,
        input: &mut StubInputStream<'_>,
        _stubs: &StubTree,
        _parent: StubId,
    ) -> Result<StubData, DecodeError> {
        let flags = FileFlags::from_bits_retain(input.read_u8()?);
        let package_name = input.read_required_name()?;
        Ok(StubData::File(FileStub {
            flags,
            package_name,
        }))
    }

    fn index_stub(&self, _stub: &StubData, _sink: &mut dyn IndexSink) {}
}

// =============================================================================
// Imports
// =============================================================================

pub struct ImportListElementType;

impl StubElementType for ImportListElementType {
    fn kind(&self) -> StubKind {
        StubKind::ImportList
    }

    fn external_id(&self) -> &'static str {
        "java.IMPORT_LIST"
    }

    fn create_stub(
        &self,
        _tree: &SyntaxTree,
        _node: NodeIndex,
        _stubs: &StubTree,
        _parent: StubId,
    ) -> Result<StubData, ExpandError> {
        Ok(StubData::ImportList)
    }

    fn create_stub_light(
        &self,
        _tree: &LightTree,
        _node: LightNodeId,
        _stubs: &StubTree,
        _parent: StubId,
    ) -> StubData {
        StubData::ImportList
    }

    // No payload, not even a flag byte.
    fn serialize(&self, _stub: &StubData, _out: &mut StubOutputStream) {}

    fn deserialize(
        &self,
        _input: &mut StubInputStream<'_>,
        _stubs: &StubTree,
        _parent: StubId,
    ) -> Result<StubData, DecodeError> {
        Ok(StubData::ImportList)
    }

    fn index_stub(&self, _stub: &StubData, _sink: &mut dyn IndexSink) {}
}

pub struct ImportElementType;

impl StubElementType for ImportElementType {
    fn kind(&self) -> StubKind {
        StubKind::Import
    }

    fn external_id(&self) -> &'static str {
        "java.IMPORT_STATEMENT"
    }

    fn version(&self) -> u32 {
        1
    }

    fn create_stub(
        &self,
        tree: &SyntaxTree,
        node: NodeIndex,
        _stubs: &StubTree,
        _parent: StubId,
    ) -> Result<StubData, ExpandError> {
        scan::import_stub(&TreeView::new(tree), node).map(StubData::Import)
    }

    fn create_stub_light(
        &self,
        tree: &LightTree,
        node: LightNodeId,
        _stubs: &StubTree,
        _parent: StubId,
    ) -> StubData {
        StubData::Import(light(scan::import_stub(tree, node), ImportStub::default))
    }

    fn serialize(&self, stub: &StubData, out: &mut StubOutputStream) {
        let StubData::Import(import) = stub else {
            debug_assert!(false, "import element type given {:?}", stub.kind());
            return;
        };
        out.write_u8(import.flags.bits());
        out.write_name(import.reference.as_deref());
    }

    fn deserialize(
        &self,
        input: &mut StubInputStream<'_>,
        _stubs: &StubTree,
        _parent: StubId,
    ) -> Result<StubData, DecodeError> {
        let flags = ImportFlags::from_bits_retain(input.read_u8()?);
        let reference = input.read_name()?;
        Ok(StubData::Import(ImportStub { flags, reference }))
    }

    fn index_stub(&self, _stub: &StubData, _sink: &mut dyn IndexSink) {}
}

// =============================================================================
// Classes
// =============================================================================

/// Shared by the three class-like kinds; `kind` picks which one.
pub struct ClassElementType {
    kind: StubKind,
}

impl StubElementType for ClassElementType {
    fn kind(&self) -> StubKind {
        self.kind
    }

    fn external_id(&self) -> &'static str {
        match self.kind {
            StubKind::AnonymousClass => "java.ANONYMOUS_CLASS",
            StubKind::EnumConstantInitializer => "java.ENUM_CONSTANT_INITIALIZER",
            _ => "java.CLASS",
        }
    }

    fn version(&self) -> u32 {
        3
    }

    fn create_stub(
        &self,
        tree: &SyntaxTree,
        node: NodeIndex,
        stubs: &StubTree,
        parent: StubId,
    ) -> Result<StubData, ExpandError> {
        scan::class_stub(&TreeView::new(tree), node, self.kind, stubs, parent).map(StubData::Class)
    }

    fn create_stub_light(
        &self,
        tree: &LightTree,
        node: LightNodeId,
        stubs: &StubTree,
        parent: StubId,
    ) -> StubData {
        StubData::Class(light(
            scan::class_stub(tree, node, self.kind, stubs, parent),
            ClassStub::default,
        ))
    }

    fn serialize(&self, stub: &StubData, out: &mut StubOutputStream) {
        let StubData::Class(class) = stub else {
            debug_assert!(false, "class element type given {:?}", stub.kind());
            return;
        };
        out.write_u8(class.flags.bits());
        if class.is_anonymous() {
            out.write_name(class.base_class_reference.as_deref());
        } else {
            out.write_name(class.name.as_deref());
            out.write_name(class.qualified_name.as_deref());
            out.write_name(class.source_file_name.as_deref());
        }
    }

    fn deserialize(
        &self,
        input: &mut StubInputStream<'_>,
        _stubs: &StubTree,
        _parent: StubId,
    ) -> Result<StubData, DecodeError> {
        let flags = ClassFlags::from_bits_retain(input.read_u8()?);
        let mut class = ClassStub {
            flags,
            ..ClassStub::default()
        };
        let found = class.kind();
        if found != self.kind {
            return Err(DecodeError::KindMismatch {
                expected: self.kind,
                found,
            });
        }
        if class.is_anonymous() {
            class.base_class_reference = input.read_name()?;
        } else {
            class.name = input.read_name()?;
            class.qualified_name = input.read_name()?;
            class.source_file_name = input.read_name()?;
        }
        Ok(StubData::Class(class))
    }

    fn index_stub(&self, stub: &StubData, sink: &mut dyn IndexSink) {
        let Some(class) = stub.as_class() else {
            return;
        };
        if class.is_anonymous() {
            if let Some(base) = class.base_class_reference.as_deref() {
                sink.name_occurrence(IndexKey::AnonymousBaseRef, names::short_class_name(base));
            }
            return;
        }
        if let Some(name) = class.name.as_deref() {
            sink.name_occurrence(IndexKey::ShortClassName, name);
        }
        // Only classes with a known qualified name reach the FQN index.
        if let Some(qualified) = class.qualified_name.as_deref() {
            sink.occurrence(
                IndexKey::FullClassNameHash,
                IndexValue::Hash(name_hash(qualified)),
            );
        }
    }
}

// =============================================================================
// Members
// =============================================================================

pub struct MethodElementType;

impl StubElementType for MethodElementType {
    fn kind(&self) -> StubKind {
        StubKind::Method
    }

    fn external_id(&self) -> &'static str {
        "java.METHOD"
    }

    fn version(&self) -> u32 {
        2
    }

    fn create_stub(
        &self,
        tree: &SyntaxTree,
        node: NodeIndex,
        stubs: &StubTree,
        parent: StubId,
    ) -> Result<StubData, ExpandError> {
        scan::method_stub(&TreeView::new(tree), node, stubs, parent).map(StubData::Method)
    }

    fn create_stub_light(
        &self,
        tree: &LightTree,
        node: LightNodeId,
        stubs: &StubTree,
        parent: StubId,
    ) -> StubData {
        StubData::Method(light(
            scan::method_stub(tree, node, stubs, parent),
            MethodStub::default,
        ))
    }

    fn serialize(&self, stub: &StubData, out: &mut StubOutputStream) {
        let StubData::Method(method) = stub else {
            debug_assert!(false, "method element type given {:?}", stub.kind());
            return;
        };
        out.write_u8(method.flags.bits());
        out.write_name(method.name.as_deref());
        out.write_name(method.return_type.as_deref());
    }

    fn deserialize(
        &self,
        input: &mut StubInputStream<'_>,
        _stubs: &StubTree,
        _parent: StubId,
    ) -> Result<StubData, DecodeError> {
        let flags = MethodFlags::from_bits_retain(input.read_u8()?);
        let name = input.read_name()?;
        let return_type = input.read_name()?;
        Ok(StubData::Method(MethodStub {
            flags,
            name,
            return_type,
        }))
    }

    fn index_stub(&self, stub: &StubData, sink: &mut dyn IndexSink) {
        if let StubData::Method(MethodStub {
            name: Some(name), ..
        }) = stub
        {
            sink.name_occurrence(IndexKey::MethodName, name);
        }
    }
}

pub struct FieldElementType;

impl StubElementType for FieldElementType {
    fn kind(&self) -> StubKind {
        StubKind::Field
    }

    fn external_id(&self) -> &'static str {
        "java.FIELD"
    }

    fn version(&self) -> u32 {
        2
    }

    fn create_stub(
        &self,
        tree: &SyntaxTree,
        node: NodeIndex,
        _stubs: &StubTree,
        _parent: StubId,
    ) -> Result<StubData, ExpandError> {
        scan::field_stub(&TreeView::new(tree), node).map(StubData::Field)
    }

    fn create_stub_light(
        &self,
        tree: &LightTree,
        node: LightNodeId,
        _stubs: &StubTree,
        _parent: StubId,
    ) -> StubData {
        StubData::Field(light(scan::field_stub(tree, node), FieldStub::default))
    }

    fn serialize(&self, stub: &StubData, out: &mut StubOutputStream) {
        let StubData::Field(field) = stub else {
            debug_assert!(false, "field element type given {:?}", stub.kind());
            return;
        };
        out.write_u8(field.flags.bits());
        out.write_name(field.name.as_deref());
        out.write_name(field.type_text.as_deref());
    }

    fn deserialize(
        &self,
        input: &mut StubInputStream<'_>,
        _stubs: &StubTree,
        _parent: StubId,
    ) -> Result<StubData, DecodeError> {
        let flags = FieldFlags::from_bits_retain(input.read_u8()?);
        let name = input.read_name()?;
        let type_text = input.read_name()?;
        Ok(StubData::Field(FieldStub {
            flags,
            name,
            type_text,
        }))
    }

    fn index_stub(&self, stub: &StubData, sink: &mut dyn IndexSink) {
        if let StubData::Field(FieldStub {
            name: Some(name), ..
        }) = stub
        {
            sink.name_occurrence(IndexKey::FieldName, name);
        }
    }
}

// =============================================================================
// Annotations
// =============================================================================

pub struct AnnotationElementType;

impl StubElementType for AnnotationElementType {
    fn kind(&self) -> StubKind {
        StubKind::Annotation
    }

    fn external_id(&self) -> &'static str {
        "java.ANNOTATION"
    }

    fn version(&self) -> u32 {
        1
    }

    fn create_stub(
        &self,
        tree: &SyntaxTree,
        node: NodeIndex,
        _stubs: &StubTree,
        _parent: StubId,
    ) -> Result<StubData, ExpandError> {
        Ok(StubData::Annotation(scan::annotation_stub(
            &TreeView::new(tree),
            node,
        )))
    }

    fn create_stub_light(
        &self,
        tree: &LightTree,
        node: LightNodeId,
        _stubs: &StubTree,
        _parent: StubId,
    ) -> StubData {
        StubData::Annotation(scan::annotation_stub(tree, node))
    }

    // Flag-less: the raw text is the whole payload.
    fn serialize(&self, stub: &StubData, out: &mut StubOutputStream) {
        let StubData::Annotation(annotation) = stub else {
            debug_assert!(false, "annotation element type given {:?}", stub.kind());
            return;
        };
        out.write_name(Some(&annotation.text));
    }

    fn deserialize(
        &self,
        input: &mut StubInputStream<'_>,
        _stubs: &StubTree,
        _parent: StubId,
    ) -> Result<StubData, DecodeError> {
        let text = input.read_required_name()?;
        Ok(StubData::Annotation(AnnotationStub { text }))
    }

    fn index_stub(&self, stub: &StubData, sink: &mut dyn IndexSink) {
        if let StubData::Annotation(annotation) = stub {
            let short = annotation.short_name();
            if !short.is_empty() {
                sink.name_occurrence(IndexKey::AnnotationName, short);
            }
        }
    }
}

// =============================================================================
// Registry
// =============================================================================

static FILE: FileElementType = FileElementType;
static IMPORT_LIST: ImportListElementType = ImportListElementType;
static IMPORT: ImportElementType = ImportElementType;
static CLASS: ClassElementType = ClassElementType {
    kind: StubKind::Class,
};
static ANONYMOUS_CLASS: ClassElementType = ClassElementType {
    kind: StubKind::AnonymousClass,
};
static ENUM_CONSTANT_INITIALIZER: ClassElementType = ClassElementType {
    kind: StubKind::EnumConstantInitializer,
};
static METHOD: MethodElementType = MethodElementType;
static FIELD: FieldElementType = FieldElementType;
static ANNOTATION: AnnotationElementType = AnnotationElementType;

static REGISTRY: Lazy<StubRegistry> = Lazy::new(StubRegistry::build);

/// The process-wide element type table.
pub fn registry() -> &'static StubRegistry {
    &REGISTRY
}

pub struct StubRegistry {
    types: [&'static dyn StubElementType; StubKind::COUNT],
}

impl StubRegistry {
    fn build() -> StubRegistry {
        let types: [&'static dyn StubElementType; StubKind::COUNT] = [
            &FILE,
            &IMPORT_LIST,
            &IMPORT,
            &CLASS,
            &ANONYMOUS_CLASS,
            &ENUM_CONSTANT_INITIALIZER,
            &METHOD,
            &FIELD,
            &ANNOTATION,
        ];
        for (index, element_type) in types.iter().enumerate() {
            assert_eq!(
                element_type.kind().index(),
                index,
                "element type table out of order at {index}"
            );
        }
        StubRegistry { types }
    }

    #[inline]
    pub fn get(&self, kind: StubKind) -> &'static dyn StubElementType {
        self.types[kind.index()]
    }

    /// Element type stubbing nodes of `kind`, if any.
    pub fn for_syntax(&self, kind: SyntaxKind) -> Option<&'static dyn StubElementType> {
        StubKind::for_syntax(kind).map(|k| self.get(k))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static dyn StubElementType> + '_ {
        self.types.iter().copied()
    }

    /// Version stored in every serialized tree: the stream layout version plus
    /// each element type's version plus `salt`.
    pub fn cumulative_version(&self, salt: u32) -> u32 {
        self.types
            .iter()
            .fold(STUB_FORMAT_VERSION, |acc, t| acc.wrapping_add(t.version()))
            .wrapping_add(salt)
    }
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod registry_tests;

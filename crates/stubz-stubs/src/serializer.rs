//! Whole-tree stub streams.
//!
//! Layout: `"STUB"`, the cumulative version as `u32` LE, then the stubs in
//! pre-order, each as `[kind u8][payload][child count varint]`. The kind tag
//! tells the reader which element type decodes the payload.

use crate::codec::{StubInputStream, StubOutputStream};
use crate::element_type::registry;
use crate::error::DecodeError;
use crate::kind::StubKind;
use crate::stub::{StubData, StubId, StubTree};
use stubz_common::limits::{MAX_STUB_DEPTH, STUB_MAGIC};

pub fn serialize_stub_tree(stubs: &StubTree, version: u32) -> Vec<u8> {
    let mut out = StubOutputStream::with_capacity(64 + stubs.len() * 16);
    out.write_bytes(&STUB_MAGIC);
    out.write_u32_le(version);
    write_stub(stubs, stubs.root(), &mut out);
    out.into_bytes()
}

fn write_stub(stubs: &StubTree, id: StubId, out: &mut StubOutputStream) {
    let Some(data) = stubs.data(id) else {
        return;
    };
    let kind = data.kind();
    out.write_u8(kind as u8);
    registry().get(kind).serialize(data, out);
    let children = stubs.children(id);
    out.write_varint(children.len() as u32);
    for &child in children {
        write_stub(stubs, child, out);
    }
}

/// Decode a stub tree written with the same cumulative `version`.
///
/// A pure function of its input: the same bytes may be decoded on any number
/// of threads at once.
pub fn deserialize_stub_tree(bytes: &[u8], version: u32) -> Result<StubTree, DecodeError> {
    let mut input = StubInputStream::new(bytes);
    if input.read_bytes(STUB_MAGIC.len()).map_err(|_| DecodeError::BadMagic)? != STUB_MAGIC {
        return Err(DecodeError::BadMagic);
    }
    let found = input.read_u32_le()?;
    if found != version {
        return Err(DecodeError::VersionMismatch {
            expected: version,
            found,
        });
    }

    if read_kind(&mut input)? != StubKind::File {
        return Err(DecodeError::RootNotFile);
    }
    let mut stubs = StubTree::new(Default::default());
    match registry()
        .get(StubKind::File)
        .deserialize(&mut input, &stubs, StubId::ROOT)?
    {
        StubData::File(file) => stubs.set_file(file),
        _ => return Err(DecodeError::RootNotFile),
    }
    read_children(&mut input, &mut stubs, StubId::ROOT, 1)?;

    match input.remaining() {
        0 => Ok(stubs),
        extra => Err(DecodeError::TrailingBytes(extra)),
    }
}

fn read_kind(input: &mut StubInputStream<'_>) -> Result<StubKind, DecodeError> {
    let tag = input.read_u8()?;
    StubKind::from_u8(tag).ok_or(DecodeError::UnknownStubKind(tag))
}

fn read_children(
    input: &mut StubInputStream<'_>,
    stubs: &mut StubTree,
    parent: StubId,
    depth: u32,
) -> Result<(), DecodeError> {
    let count = input.read_varint()?;
    if count > 0 && depth >= MAX_STUB_DEPTH {
        return Err(DecodeError::TooDeep(MAX_STUB_DEPTH));
    }
    for _ in 0..count {
        let kind = read_kind(input)?;
        if kind == StubKind::File {
            return Err(DecodeError::NestedFileStub);
        }
        let data = registry().get(kind).deserialize(input, stubs, parent)?;
        let id = stubs.add(parent, data);
        read_children(input, stubs, id, depth + 1)?;
    }
    Ok(())
}

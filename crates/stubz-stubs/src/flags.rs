//! Packed flag sets stored as the first byte of a stub payload.
//!
//! Bit positions are part of the stored format.

use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ClassFlags: u8 {
        const DEPRECATED_BY_COMMENT = 1 << 0;
        const INTERFACE = 1 << 1;
        const ENUM = 1 << 2;
        const ENUM_CONSTANT_INITIALIZER = 1 << 3;
        const ANONYMOUS = 1 << 4;
        const ANNOTATION_TYPE = 1 << 5;
        const ANONYMOUS_IN_QUALIFIED_NEW = 1 << 6;
        const DEPRECATED_BY_ANNOTATION = 1 << 7;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ImportFlags: u8 {
        const ON_DEMAND = 1 << 0;
        const STATIC = 1 << 1;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MethodFlags: u8 {
        const CONSTRUCTOR = 1 << 0;
        const VARARGS = 1 << 1;
        const ANNOTATION_METHOD = 1 << 2;
        const DEPRECATED = 1 << 3;
        const DEPRECATED_ANNOTATION = 1 << 4;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct FieldFlags: u8 {
        const ENUM_CONSTANT = 1 << 0;
        const DEPRECATED = 1 << 1;
        const DEPRECATED_ANNOTATION = 1 << 2;
        const HAS_INITIALIZER = 1 << 3;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct FileFlags: u8 {
        /// Stubs were produced from compiled output rather than source.
        const COMPILED = 1 << 0;
    }
}

impl ClassFlags {
    pub fn is_deprecated(self) -> bool {
        self.intersects(ClassFlags::DEPRECATED_BY_COMMENT | ClassFlags::DEPRECATED_BY_ANNOTATION)
    }
}

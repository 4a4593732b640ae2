use bitflags::bitflags;

#[allow(non_snake_case, dead_code, missing_docs)]
/// All the possible element types in a type signature, as defined by ECMA-335 II.23.1.16
pub mod ELEMENT_TYPE {
    //Marks end of a list
    pub const END: u8 = 0x00;
    pub const VOID: u8 = 0x01;
    pub const BOOLEAN: u8 = 0x02;
    pub const CHAR: u8 = 0x03;
    pub const I1: u8 = 0x04;
    pub const U1: u8 = 0x05;
    pub const I2: u8 = 0x06;
    pub const U2: u8 = 0x07;
    pub const I4: u8 = 0x08;
    pub const U4: u8 = 0x09;
    pub const I8: u8 = 0x0a;
    pub const U8: u8 = 0x0b;
    pub const R4: u8 = 0x0c;
    pub const R8: u8 = 0x0d;
    pub const STRING: u8 = 0x0e;
    // Followed by type
    pub const PTR: u8 = 0x0f;
    // Followed by type
    pub const BYREF: u8 = 0x10;
    // Followed by TypeDef or TypeRef token
    pub const VALUETYPE: u8 = 0x11;
    // Followed by TypeDef or TypeRef token
    pub const CLASS: u8 = 0x12;
    // Generic parameter in a generic type definition, represented as number
    pub const VAR: u8 = 0x13;
    // type rank boundsCount bound1 … loCount lo1 …
    pub const ARRAY: u8 = 0x14;
    // Generic type instantiation. Followed by type type-arg-count type-1 ... type-n
    pub const GENERICINST: u8 = 0x15;
    pub const TYPEDBYREF: u8 = 0x16;
    // System.IntPtr
    pub const I: u8 = 0x18;
    // System.UIntPtr
    pub const U: u8 = 0x19;
    // Followed by full method signature
    pub const FNPTR: u8 = 0x1b;
    // System.Object
    pub const OBJECT: u8 = 0x1c;
    // Single-dim array with 0 lower bound
    pub const SZARRAY: u8 = 0x1d;
    // Generic parameter in a generic method definition,represented as number
    pub const MVAR: u8 = 0x1e;
    // Required modifier : followed by a TypeDef or TypeRef token
    pub const CMOD_REQD: u8 = 0x1f;
    // Optional modifier : followed by a TypeDef or TypeRef token
    pub const CMOD_OPT: u8 = 0x20;
    // Implemented within the CLI
    pub const INTERNAL: u8 = 0x21;
    // Or’d with following element types
    pub const MODIFIER: u8 = 0x40;
    // Sentinel for vararg method signature
    pub const SENTINEL: u8 = 0x41;
    // Denotes a local variable that points at a pinned object
    pub const PINNED: u8 = 0x45;
}

/// Returns the C# keyword used to display a primitive element type, or `None` if `tag` is not
/// a primitive.
///
/// ```rust
/// use dotstack::metadata::typesystem::{primitive_name, ELEMENT_TYPE};
///
/// assert_eq!(primitive_name(ELEMENT_TYPE::I4), Some("int"));
/// assert_eq!(primitive_name(ELEMENT_TYPE::CLASS), None);
/// ```
#[must_use]
pub fn primitive_name(tag: u8) -> Option<&'static str> {
    let name = match tag {
        ELEMENT_TYPE::VOID => "void",
        ELEMENT_TYPE::BOOLEAN => "bool",
        ELEMENT_TYPE::CHAR => "char",
        ELEMENT_TYPE::I1 => "sbyte",
        ELEMENT_TYPE::U1 => "byte",
        ELEMENT_TYPE::I2 => "short",
        ELEMENT_TYPE::U2 => "ushort",
        ELEMENT_TYPE::I4 => "int",
        ELEMENT_TYPE::U4 => "uint",
        ELEMENT_TYPE::I8 => "long",
        ELEMENT_TYPE::U8 => "ulong",
        ELEMENT_TYPE::R4 => "float",
        ELEMENT_TYPE::R8 => "double",
        ELEMENT_TYPE::STRING => "string",
        ELEMENT_TYPE::OBJECT => "object",
        ELEMENT_TYPE::I => "nint",
        ELEMENT_TYPE::U => "nuint",
        _ => return None,
    };

    Some(name)
}

/// The in-memory size of one element of `tag` when stored inline, e.g. in an array body.
///
/// References (strings, objects, arrays, pointers) occupy one pointer. Value types have no
/// intrinsic size and need the class layout, so `None` is returned for them as well as for
/// tags that cannot appear as array elements.
#[must_use]
pub fn element_size(tag: u8) -> Option<usize> {
    let size = match tag {
        ELEMENT_TYPE::BOOLEAN | ELEMENT_TYPE::I1 | ELEMENT_TYPE::U1 => 1,
        ELEMENT_TYPE::CHAR | ELEMENT_TYPE::I2 | ELEMENT_TYPE::U2 => 2,
        ELEMENT_TYPE::I4 | ELEMENT_TYPE::U4 | ELEMENT_TYPE::R4 => 4,
        ELEMENT_TYPE::I8 | ELEMENT_TYPE::U8 | ELEMENT_TYPE::R8 => 8,
        ELEMENT_TYPE::I
        | ELEMENT_TYPE::U
        | ELEMENT_TYPE::STRING
        | ELEMENT_TYPE::CLASS
        | ELEMENT_TYPE::OBJECT
        | ELEMENT_TYPE::SZARRAY
        | ELEMENT_TYPE::ARRAY
        | ELEMENT_TYPE::PTR
        | ELEMENT_TYPE::BYREF => std::mem::size_of::<usize>(),
        _ => return None,
    };

    Some(size)
}

/// Bitmask for the visibility bits of [`TypeAttributes`]
pub const TYPE_VISIBILITY_MASK: u32 = 0x0000_0007;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// `TypeDef` flags, as returned alongside the type name by the metadata import
    pub struct TypeAttributes: u32 {
        /// Class is public scope
        const PUBLIC = 0x0000_0001;
        /// Class is nested with public visibility
        const NESTED_PUBLIC = 0x0000_0002;
        /// Class is nested with private visibility
        const NESTED_PRIVATE = 0x0000_0003;
        /// Class is nested with family visibility
        const NESTED_FAMILY = 0x0000_0004;
        /// Class is nested with assembly visibility
        const NESTED_ASSEMBLY = 0x0000_0005;
        /// Class is nested with family and assembly visibility
        const NESTED_FAM_AND_ASSEM = 0x0000_0006;
        /// Class is nested with family or assembly visibility
        const NESTED_FAM_OR_ASSEM = 0x0000_0007;
        /// Type is an interface
        const INTERFACE = 0x0000_0020;
        /// Class is abstract
        const ABSTRACT = 0x0000_0080;
        /// Class is sealed
        const SEALED = 0x0000_0100;
    }
}

impl TypeAttributes {
    /// Returns `true` if the visibility bits mark this type as nested inside another type
    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.bits() & TYPE_VISIBILITY_MASK >= 2
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Flags of the leading calling-convention byte of a method signature
    pub struct CallingConvention: u8 {
        /// Method takes generic parameters, followed by the generic parameter count
        const GENERIC = 0x10;
        /// Method has an implicit `this` argument
        const HASTHIS = 0x20;
        /// The `this` argument is explicitly listed in the parameter list
        const EXPLICITTHIS = 0x40;
    }
}

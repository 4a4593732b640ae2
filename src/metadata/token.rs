use std::fmt;
use std::hash::{Hash, Hasher};

use strum::{Display, EnumIter, FromRepr};

/// The metadata tables a token can point into that the tracer cares about.
///
/// The discriminant is the table id stored in the high byte of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, FromRepr)]
#[repr(u8)]
pub enum TokenTable {
    /// `TypeRef` (0x01), a reference to a type defined in another module
    TypeRef = 0x01,
    /// `TypeDef` (0x02), a type defined in this module
    TypeDef = 0x02,
    /// `MethodDef` (0x06)
    MethodDef = 0x06,
    /// `Param` (0x08)
    Param = 0x08,
    /// `MemberRef` (0x0A)
    MemberRef = 0x0A,
    /// `TypeSpec` (0x1B), a type described by a signature blob
    TypeSpec = 0x1B,
    /// `MethodSpec` (0x2B)
    MethodSpec = 0x2B,
}

/// A metadata token representing a reference to a metadata table entry.
///
/// Tokens in .NET metadata consist of a 32-bit value where:
/// - The high byte (bits 24-31) indicates the table type
/// - The low 24 bits (bits 0-23) indicate the row index within that table
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Token(pub u32);

impl Token {
    /// Creates a new token from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Creates a token for `row` in `table`
    #[must_use]
    pub fn from_parts(table: TokenTable, row: u32) -> Self {
        Token((u32::from(table as u8) << 24) | (row & 0x00FF_FFFF))
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Extracts the table type from the token (high byte)
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// The known table this token points into, if any
    #[must_use]
    pub fn kind(&self) -> Option<TokenTable> {
        TokenTable::from_repr(self.table())
    }

    /// Extracts the row index from the token (low 24 bits)
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Returns true if this is a null token (value 0)
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

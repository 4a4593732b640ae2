//! Forward-only byte cursor over signature blobs.
//!
//! [`Parser`] is the cursor the signature decoder walks. It never reads outside the blob it
//! was created over: every read is bounds-checked and fails with
//! [`crate::Error::OutOfBounds`] instead of touching memory past the declared length, which
//! is what lets the decoder fail closed on truncated or malformed metadata.
//!
//! Besides fixed-width reads it understands the ECMA-335 II.23.2 compressed encodings used
//! throughout signatures: compressed unsigned/signed integers and `TypeDefOrRefOrSpecEncoded`
//! tokens.
//!
//! ```rust
//! use dotstack::Parser;
//!
//! // HASTHIS, 1 parameter, returns void, takes a string
//! let blob = [0x20, 0x01, 0x01, 0x0E];
//! let mut parser = Parser::new(&blob);
//! assert_eq!(parser.read_le::<u8>()?, 0x20);
//! assert_eq!(parser.read_compressed_uint()?, 1);
//! assert_eq!(parser.read_le::<u8>()?, 0x01);
//! # Ok::<(), dotstack::Error>(())
//! ```

use crate::{
    file::io::{read_le_at, CilIO},
    metadata::token::Token,
    Result,
};

/// A bounds-checked cursor over a byte slice. The cursor only moves forward.
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`Parser`] over `data`, positioned at its first byte.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns `true` if there is more data available to parse.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Read a type `T` from the current position in little-endian format and advance the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length.
    pub fn read_le<T: CilIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Read a compressed unsigned integer as defined in ECMA-335 II.23.2.
    ///
    /// - Values 0-127: 1 byte (0xxxxxxx)
    /// - Values 128-16383: 2 bytes (10xxxxxx xxxxxxxx)
    /// - Values 16384-536870911: 4 bytes (110xxxxx xxxxxxxx xxxxxxxx xxxxxxxx)
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length or
    /// [`crate::Error::Malformed`] for an invalid leading byte.
    pub fn read_compressed_uint(&mut self) -> Result<u32> {
        let first = u32::from(self.read_le::<u8>()?);

        if first & 0x80 == 0 {
            return Ok(first);
        }

        if first & 0xC0 == 0x80 {
            let second = u32::from(self.read_le::<u8>()?);
            return Ok(((first & 0x3F) << 8) | second);
        }

        if first & 0xE0 == 0xC0 {
            let mut value = first & 0x1F;
            for _ in 0..3 {
                value = (value << 8) | u32::from(self.read_le::<u8>()?);
            }
            return Ok(value);
        }

        Err(malformed_error!("Invalid compressed uint - {}", first))
    }

    /// Read a compressed signed integer as defined in ECMA-335 II.23.2.
    ///
    /// The value is stored rotated: the sign lives in the least significant bit. The width
    /// of the encoding decides how many bits take part in the rotation.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length or
    /// [`crate::Error::Malformed`] for invalid encoding.
    pub fn read_compressed_int(&mut self) -> Result<i32> {
        let start = self.position;
        let raw = self.read_compressed_uint()?;
        let bits = match self.position - start {
            1 => 6,
            2 => 13,
            _ => 28,
        };

        let magnitude = (raw >> 1) as i32;
        if raw & 1 == 0 {
            Ok(magnitude)
        } else {
            Ok(magnitude - (1 << bits))
        }
    }

    /// Read a compressed token as defined in ECMA-335 II.23.2.8 (`TypeDefOrRefOrSpecEncoded`).
    ///
    /// | Tag | Table    | Token Prefix |
    /// |-----|----------|--------------|
    /// | 0x0 | TypeDef  | 0x0200_0000  |
    /// | 0x1 | TypeRef  | 0x0100_0000  |
    /// | 0x2 | TypeSpec | 0x1B00_0000  |
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length or
    /// [`crate::Error::Malformed`] if the reserved tag 0x3 is encountered.
    pub fn read_compressed_token(&mut self) -> Result<Token> {
        let compressed = self.read_compressed_uint()?;

        let table: u32 = match compressed & 0x3 {
            0x0 => 0x0200_0000,
            0x1 => 0x0100_0000,
            0x2 => 0x1B00_0000,
            _ => return Err(malformed_error!("Invalid compressed token - {}", compressed)),
        };

        Ok(Token::new(table | (compressed >> 2)))
    }
}

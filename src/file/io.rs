//! Little-endian primitive decoding shared by the signature cursor and the memory views.
//!
//! The [`CilIO`] trait describes every fixed-width primitive that can be pulled out of a
//! byte buffer. Signature blobs use it through [`crate::file::parser::Parser`], and the
//! foreign memory views (see [`crate::memory`]) use it to turn a copied-out byte window
//! into a typed value, so that the unsafe part of a memory read is only ever a byte copy.
//!
//! All supported runtimes run on little-endian hosts (x86, x64, arm64), which is why only
//! the little-endian direction is provided.

use crate::Result;

/// Endian-aware conversion between a primitive and its fixed-size byte representation.
///
/// Each implementation defines a `Bytes` associated type for the exact byte array
/// needed by that type (e.g. `[u8; 4]` for `u32`).
pub trait CilIO: Sized + Copy {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;

    /// Write T to a byte buffer in little-endian
    fn to_le_bytes(self) -> Self::Bytes;
}

macro_rules! impl_cilio {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CilIO for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn to_le_bytes(self) -> Self::Bytes {
                    <$ty>::to_le_bytes(self)
                }
            }
        )*
    };
}

impl_cilio!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64, usize, isize);

/// Safely reads a value of type `T` in little-endian byte order at `offset`, advancing the
/// offset by the size of `T`.
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if the buffer does not hold enough bytes.
///
/// # Examples
///
/// ```rust,ignore
/// use dotstack::file::io::read_le_at;
///
/// let data = [0x01, 0x00, 0x02, 0x00];
/// let mut offset = 0;
/// assert_eq!(read_le_at::<u16>(&data, &mut offset)?, 1);
/// assert_eq!(read_le_at::<u16>(&data, &mut offset)?, 2);
/// assert_eq!(offset, 4);
/// ```
pub fn read_le_at<T: CilIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(out_of_bounds_error!());
    };
    if end > data.len() {
        return Err(out_of_bounds_error!());
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(out_of_bounds_error!());
    };

    *offset = end;
    Ok(T::from_le_bytes(read))
}

/// Reads a value of type `T` from the start of `data`.
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if the buffer is shorter than `T`.
pub fn read_le<T: CilIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0;
    read_le_at(data, &mut offset)
}

/// Writes `value` in little-endian byte order at `offset`, advancing the offset.
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if the buffer is too small.
pub fn write_le_at<T: CilIO>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()> {
    let bytes = value.to_le_bytes();
    let bytes = bytes.as_ref();
    let Some(end) = offset.checked_add(bytes.len()) else {
        return Err(out_of_bounds_error!());
    };
    if end > data.len() {
        return Err(out_of_bounds_error!());
    }

    data[*offset..end].copy_from_slice(bytes);
    *offset = end;
    Ok(())
}

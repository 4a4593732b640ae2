use widestring::U16String;

use crate::{
    file::io::{read_le, write_le_at, CilIO},
    Error, Result,
};

/// Largest primitive a typed read supports (`u64` / `f64`)
const MAX_PRIMITIVE_SIZE: usize = 8;

/// An untrusted view of foreign memory.
///
/// [`MemoryView::read_bytes`] is the only primitive an implementation provides: it copies a
/// window of bytes out of the target. All typed reads are built on top of it via
/// [`CilIO`], so the argument reader never casts raw addresses itself.
pub trait MemoryView: Send + Sync {
    /// Copy `buf.len()` bytes starting at `address` into `buf`
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidAddress`] if the view refuses the read.
    fn read_bytes(&self, address: usize, buf: &mut [u8]) -> Result<()>;
}

impl dyn MemoryView + '_ {
    /// Read a little-endian primitive at `address`
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidAddress`] if the view refuses the read.
    pub fn read_at<T: CilIO>(&self, address: usize) -> Result<T> {
        let mut buf = [0u8; MAX_PRIMITIVE_SIZE];
        let window = &mut buf[..std::mem::size_of::<T>()];
        self.read_bytes(address, window)?;
        read_le::<T>(window)
    }

    /// Read a pointer-sized value at `address`
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidAddress`] if the view refuses the read.
    pub fn read_pointer_at(&self, address: usize) -> Result<usize> {
        self.read_at::<usize>(address)
    }

    /// Read `count` UTF-16 code units starting at `address`
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidAddress`] if the view refuses the read.
    pub fn read_u16_units(&self, address: usize, count: usize) -> Result<Vec<u16>> {
        let Some(size) = count.checked_mul(2) else {
            return Err(Error::InvalidAddress(address));
        };

        let mut bytes = vec![0u8; size];
        self.read_bytes(address, &mut bytes)?;

        Ok(bytes
            .chunks_exact(2)
            .map(|unit| u16::from_le_bytes([unit[0], unit[1]]))
            .collect())
    }
}

/// Reads the memory of the current process.
///
/// The tracer runs inside the traced process, so argument addresses handed out by the
/// runtime are plain pointers into our own address space. The only checks performed are
/// against the null page and address overflow; validity of the range is guaranteed by the
/// runtime's argument-range metadata for the call being traced.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessMemory;

impl MemoryView for ProcessMemory {
    fn read_bytes(&self, address: usize, buf: &mut [u8]) -> Result<()> {
        if address == 0 || address.checked_add(buf.len()).is_none() {
            return Err(Error::InvalidAddress(address));
        }

        // SAFETY: the address is non-null and the range does not wrap. The caller obtained
        // it from the runtime's argument ranges or from an object layout the runtime
        // described, which keeps it valid for the duration of the enter callback. The
        // destination is a distinct, exclusively borrowed buffer.
        unsafe {
            std::ptr::copy_nonoverlapping(address as *const u8, buf.as_mut_ptr(), buf.len());
        }

        Ok(())
    }
}

/// A bounds-checked in-memory address space, starting at a fixed base address.
///
/// Used to stage argument slots, strings and arrays at realistic looking addresses without
/// touching real process memory.
///
/// ```rust
/// use dotstack::memory::{BufferMemory, MemoryView};
///
/// let mut memory = BufferMemory::new(0x1000, 64);
/// memory.write(0x1008, 42u32)?;
///
/// let view: &dyn MemoryView = &memory;
/// assert_eq!(view.read_at::<u32>(0x1008)?, 42);
/// assert!(view.read_at::<u32>(0x0FFE).is_err());
/// # Ok::<(), dotstack::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct BufferMemory {
    base: usize,
    bytes: Vec<u8>,
}

impl BufferMemory {
    /// Create `size` zeroed bytes mapped at `base`
    #[must_use]
    pub fn new(base: usize, size: usize) -> Self {
        BufferMemory {
            base,
            bytes: vec![0; size],
        }
    }

    /// First mapped address
    #[must_use]
    pub fn base(&self) -> usize {
        self.base
    }

    /// One past the last mapped address
    #[must_use]
    pub fn end(&self) -> usize {
        self.base + self.bytes.len()
    }

    fn range(&self, address: usize, len: usize) -> Result<std::ops::Range<usize>> {
        let start = address
            .checked_sub(self.base)
            .ok_or(Error::InvalidAddress(address))?;
        let end = start
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(Error::InvalidAddress(address))?;

        Ok(start..end)
    }

    /// Store a little-endian primitive at `address`
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidAddress`] if the value does not fit the mapping.
    pub fn write<T: CilIO>(&mut self, address: usize, value: T) -> Result<()> {
        let range = self.range(address, std::mem::size_of::<T>())?;
        let mut offset = 0;
        write_le_at(&mut self.bytes[range], &mut offset, value)
    }

    /// Store raw bytes at `address`
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidAddress`] if the bytes do not fit the mapping.
    pub fn write_bytes(&mut self, address: usize, data: &[u8]) -> Result<()> {
        let range = self.range(address, data.len())?;
        self.bytes[range].copy_from_slice(data);
        Ok(())
    }

    /// Store `text` as UTF-16 code units at `address`, returning the number of units written
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidAddress`] if the text does not fit the mapping.
    pub fn write_utf16(&mut self, address: usize, text: &str) -> Result<usize> {
        let units = U16String::from_str(text);
        let bytes: Vec<u8> = units
            .as_slice()
            .iter()
            .flat_map(|unit| unit.to_le_bytes())
            .collect();

        self.write_bytes(address, &bytes)?;
        Ok(units.len())
    }
}

impl MemoryView for BufferMemory {
    fn read_bytes(&self, address: usize, buf: &mut [u8]) -> Result<()> {
        let range = self.range(address, buf.len())?;
        buf.copy_from_slice(&self.bytes[range]);
        Ok(())
    }
}

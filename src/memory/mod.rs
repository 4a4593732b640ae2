//! Foreign memory access and argument value rendering.
//!
//! - [`MemoryView`] - the audited boundary every raw read goes through
//! - [`ProcessMemory`] - reads the current process, used when hosted inside the runtime
//! - [`BufferMemory`] - a bounds-checked in-memory address space
//! - [`ArgumentReader`] - renders typed values found at argument addresses

mod reader;
mod view;

pub use reader::{ArgumentReader, NULL_VALUE, UNKNOWN_VALUE};
pub use view::{BufferMemory, MemoryView, ProcessMemory};

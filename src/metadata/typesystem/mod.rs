//! Element type tags and type-name resolution.
//!
//! # Key Components
//!
//! - [`ELEMENT_TYPE`]: the ECMA-335 element type tags driving both signature decoding and
//!   argument value reading
//! - [`primitive_name`] / [`element_size`]: display names and inline sizes of primitives
//! - [`TypeNameResolver`]: resolves class handles and type tokens to names such as
//!   `Outer+Inner<T>` or `Dictionary<string, int>`
//! - [`TypeAttributes`] / [`CallingConvention`]: the flag sets the resolver and the method
//!   signature decoder inspect

mod base;
mod resolver;

pub use base::{
    element_size, primitive_name, CallingConvention, TypeAttributes, ELEMENT_TYPE,
    TYPE_VISIBILITY_MASK,
};
pub(crate) use resolver::array_suffix;
pub use resolver::{strip_arity, TypeNameResolver};

/// Maximum nesting depth for type-name resolution and signature decoding
pub const MAX_RECURSION_DEPTH: usize = 50;

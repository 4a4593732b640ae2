//! Signature decoding.
//!
//! Signatures are decoded straight into display text: the tracer never needs the structure
//! of a type, only its name. [`SignatureDecoder`] handles single types, [`MethodSignature`]
//! the `MethodDef` blob with its parameter list.

mod decoder;
mod method;

pub use decoder::{GenericContext, SignatureDecoder};
pub use method::{MethodSignature, ParamMeta};

//! Runtime metadata access and name decoding.
//!
//! This module turns the opaque handles and binary signatures delivered by the host runtime
//! into source-level names.
//!
//! # Key Components
//!
//! - [`provider`] - The [`provider::RuntimeMetadata`] query capability and its data records
//! - [`token`] - Metadata table row references
//! - [`typesystem`] - Element type tags and the type-name resolver
//! - [`signatures`] - Type and method signature decoding
//!
//! # Examples
//!
//! ```rust,ignore
//! use dotstack::metadata::signatures::{GenericContext, MethodSignature};
//!
//! let context = GenericContext::default();
//! let signature = MethodSignature::decode(runtime, module, method_token, &context)?;
//! println!("{}", signature.render("Program"));
//! ```

/// The host query capability and the identifiers it is keyed by
pub mod provider;
/// Implementation of method and type signatures
pub mod signatures;
/// Implementation of metadata tokens
pub mod token;
/// Element types and type-name resolution
pub mod typesystem;

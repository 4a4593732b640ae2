// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
//#![deny(unsafe_code)]
// - 'memory/view.rs' copies foreign process memory through a raw pointer

//! # dotstack
//!
//! An in-process call stack tracer for the .NET runtime. `dotstack` consumes the function
//! enter/leave/tailcall and thread lifecycle notifications a profiling host delivers, keeps
//! an accurate managed call stack for every thread, and can write all stacks out as text at
//! any moment.
//!
//! ## Features
//!
//! - **Per-thread stacks** - Sharded thread store; handlers on different threads rarely contend
//! - **Desync repair** - Lost or reordered leave events are repaired by truncation and counted
//! - **Readable frames** - Full signatures such as `int Outer+Inner<T>.Run(string s)`,
//!   decoded once per function from ECMA-335 signature blobs
//! - **Argument capture** - Optional rendering of primitive, string, object and array arguments
//!
//! ## Quick Start
//!
//! The host glue implements [`metadata::provider::RuntimeMetadata`] over the runtime's
//! profiling and metadata APIs and forwards events to a [`StackManager`]:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use dotstack::prelude::*;
//!
//! let manager = StackManager::new(Arc::new(host), TracerConfig::from_env());
//!
//! // From the host's event callbacks
//! manager.thread_created(thread);
//! manager.function_enter(function, call);
//! manager.function_leave(function, call);
//!
//! // Whenever a picture is needed
//! manager.dump("stacks.txt")?;
//! for thread in manager.snapshot_all() {
//!     println!("{}: {} frames", thread.thread_id, thread.frames.len());
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`stack`] - The [`StackManager`], thread store, function cache and dumps
//! - [`metadata`] - Tokens, element types, signature decoding and type naming
//! - [`memory`] - Foreign memory reads and argument value rendering
//! - [`callback`] - The host event surface with no-op defaults
//! - [`config`] - [`TracerConfig`] and its environment overlay
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Error Handling
//!
//! Event handlers never fail. Lookups that cannot be answered degrade to empty names or
//! the `<?>` / `<NULL>` placeholders, and stack mismatches are repaired and counted. Only
//! [`StackManager::dump`] returns an error, for I/O failures.

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use dotstack::prelude::*;
///
/// let config = TracerConfig::default().with_max_array_elements(8);
/// assert!(!config.capture_arguments);
/// ```
pub mod prelude;

/// The host event surface
pub mod callback;

/// Tracer configuration
pub mod config;

/// Foreign memory access and argument value rendering.
///
/// All raw reads of the traced process go through [`memory::MemoryView`]; the
/// [`memory::ArgumentReader`] renders values on top of it without ever casting addresses
/// itself.
pub mod memory;

/// Runtime metadata: the host query capability, tokens, element types and signatures.
///
/// # Key Components
///
/// - [`metadata::provider`] - The [`metadata::provider::RuntimeMetadata`] host capability
/// - [`metadata::token`] - Metadata tokens
/// - [`metadata::typesystem`] - Element type tags and the type name resolver
/// - [`metadata::signatures`] - Signature blob decoding
///
/// # Examples
///
/// ```rust
/// use dotstack::metadata::token::Token;
///
/// let token = Token::new(0x0200_0005);
/// assert_eq!(token.table(), 0x02);
/// assert_eq!(token.row(), 5);
/// ```
pub mod metadata;

/// Call stack tracking
pub mod stack;

/// `dotstack` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `dotstack` Error type
///
/// None of its variants ever reach the host's event callbacks.
pub use error::Error;

/// The call stack tracer. See [`stack::StackManager`].
pub use stack::StackManager;

/// Tracer configuration. See [`config::TracerConfig`].
pub use config::TracerConfig;

/// Low-level blob decoding utilities.
///
/// The [`Parser`] is the forward-only cursor signature decoding runs on; [`CilIO`] is
/// implemented by every primitive it and the memory view can read.
///
/// # Example
///
/// ```rust
/// use dotstack::Parser;
///
/// let blob = [0x81, 0x23];
/// let mut parser = Parser::new(&blob);
/// assert_eq!(parser.read_compressed_uint()?, 0x123);
/// # Ok::<(), dotstack::Error>(())
/// ```
pub use file::{io::CilIO, parser::Parser};

//! # dotstack Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the dotstack library. Import this module to get quick access to everything a host
//! integration needs.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dotstack operations
pub use crate::Error;

/// The result type used throughout dotstack
pub use crate::Result;

/// Tracer configuration
pub use crate::config::TracerConfig;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// The call stack tracer
pub use crate::stack::StackManager;

/// Host event surface
pub use crate::callback::{ProfilerCallback, TransitionReason};

// ================================================================================================
// Host Capabilities
// ================================================================================================

/// Runtime query capability and its records
pub use crate::metadata::provider::{
    ArgumentRange, ArrayClass, ArrayObject, ClassInfo, FunctionLocation, MethodProps,
    ModuleInfo, RuntimeMetadata, StringLayout, TypeDefProps,
};

/// Runtime handle aliases
pub use crate::metadata::provider::{
    AssemblyId, CallInfo, ClassId, FrameInfo, FunctionId, ModuleId, ObjectId, OsThreadId,
    ThreadId,
};

/// Metadata token type for referencing table entries
pub use crate::metadata::token::Token;

/// Foreign memory access
pub use crate::memory::{BufferMemory, MemoryView, ProcessMemory};

// ================================================================================================
// Stack State
// ================================================================================================

/// Frames and snapshots
pub use crate::stack::{FunctionInfo, StackFrame, ThreadStackSnapshot};

// ================================================================================================
// Type System and Signatures
// ================================================================================================

/// Element type tags and naming
pub use crate::metadata::typesystem::{TypeNameResolver, ELEMENT_TYPE};

/// Method signature decoding
pub use crate::metadata::signatures::{GenericContext, MethodSignature};

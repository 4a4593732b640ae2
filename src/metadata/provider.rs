//! The host runtime's query capability.
//!
//! Everything the tracer knows about the managed process comes through [`RuntimeMetadata`]:
//! profiler-style queries keyed by opaque runtime handles (functions, classes, modules,
//! objects) and metadata-import-style queries keyed by a module plus a [`Token`]. The trait
//! is the seam between this crate and the host glue that bridges a real runtime; tests
//! provide an in-memory implementation.
//!
//! Every query returns [`crate::Result`]. A failing or empty query is reported as
//! [`crate::Error::Unavailable`] and callers degrade at the smallest possible scope.

use crate::{metadata::token::Token, Result};

/// Opaque, runtime-stable identifier of a method
pub type FunctionId = usize;
/// Identifier of a managed (logical) thread
pub type ThreadId = usize;
/// Identifier of a loaded class, including instantiated generic and array classes
pub type ClassId = usize;
/// Identifier of a loaded module
pub type ModuleId = usize;
/// Identifier of a loaded assembly
pub type AssemblyId = usize;
/// Address of a managed object
pub type ObjectId = usize;
/// Operating system thread id a managed thread is scheduled on
pub type OsThreadId = u32;
/// Opaque per-call handle delivered with enter/leave/tailcall events
pub type CallInfo = usize;
/// Opaque frame handle obtained from a [`CallInfo`]
pub type FrameInfo = usize;

/// Where a function lives, as reported by the runtime
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionLocation {
    /// Declaring class; `0` when the runtime could not associate one without frame context
    pub class_id: ClassId,
    /// Module defining the method
    pub module_id: ModuleId,
    /// `MethodDef` token of the method
    pub method_token: Token,
    /// Concrete method-level generic arguments of this instantiation
    pub type_args: Vec<ClassId>,
}

/// One contiguous argument range of the current call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArgumentRange {
    /// Address of the first byte of the argument
    pub start: usize,
    /// Length of the argument in bytes
    pub length: usize,
}

/// Name and owning assembly of a module
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleInfo {
    /// Module name, usually the file name
    pub name: String,
    /// Assembly the module belongs to
    pub assembly_id: AssemblyId,
}

/// Metadata identity of a loaded class
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassInfo {
    /// Module defining the class
    pub module_id: ModuleId,
    /// `TypeDef` token; null for classes without a definition row, such as arrays
    pub type_token: Token,
    /// Concrete generic arguments of this instantiation
    pub type_args: Vec<ClassId>,
}

/// Shape of an array class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArrayClass {
    /// Element type tag of the array elements
    pub element_type: u8,
    /// Class of the elements; `0` for primitive element types
    pub element_class: ClassId,
    /// Number of dimensions
    pub rank: u32,
}

/// Layout of one array instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArrayObject {
    /// Number of elements per dimension
    pub dimension_sizes: Vec<u32>,
    /// Lower bound per dimension
    pub lower_bounds: Vec<i32>,
    /// Address of the first element
    pub elements: usize,
}

/// Where the length and character buffer live inside a managed string object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringLayout {
    /// Offset of the `u32` character count
    pub length_offset: usize,
    /// Offset of the first UTF-16 code unit
    pub buffer_offset: usize,
}

/// Properties of a `TypeDef` row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeDefProps {
    /// Simple name, including any generic arity marker (e.g. ``List`1``)
    pub name: String,
    /// Raw `TypeAttributes` flags
    pub flags: u32,
}

/// Properties of a `MethodDef` row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodProps {
    /// Method name
    pub name: String,
    /// `TypeDef` token of the declaring type
    pub class_token: Token,
    /// Raw method signature blob
    pub signature: Vec<u8>,
}

/// Query capability of the host runtime.
///
/// Implementations are shared by every thread that delivers events, so they must be
/// `Send + Sync` and must not block.
pub trait RuntimeMetadata: Send + Sync {
    /// The managed thread the caller is currently executing on
    ///
    /// # Errors
    /// Returns [`crate::Error::Unavailable`] when no managed thread is associated.
    fn current_thread_id(&self) -> Result<ThreadId>;

    /// Resolves the frame handle of a specific call
    ///
    /// # Errors
    /// Returns [`crate::Error::Unavailable`] if the runtime cannot provide it.
    fn frame_info(&self, function: FunctionId, call: CallInfo) -> Result<FrameInfo>;

    /// Argument ranges of a specific call, in declaration order including `this`
    ///
    /// # Errors
    /// Returns [`crate::Error::Unavailable`] if argument information is not available.
    fn argument_ranges(&self, function: FunctionId, call: CallInfo) -> Result<Vec<ArgumentRange>>;

    /// Declaring class, module and token of a function, optionally using frame context
    ///
    /// # Errors
    /// Returns [`crate::Error::Unavailable`] for unknown functions.
    fn function_info(&self, function: FunctionId, frame: Option<FrameInfo>)
        -> Result<FunctionLocation>;

    /// Name and assembly of a module
    ///
    /// # Errors
    /// Returns [`crate::Error::Unavailable`] for unknown modules.
    fn module_info(&self, module: ModuleId) -> Result<ModuleInfo>;

    /// Name of an assembly
    ///
    /// # Errors
    /// Returns [`crate::Error::Unavailable`] for unknown assemblies.
    fn assembly_name(&self, assembly: AssemblyId) -> Result<String>;

    /// Module, token and generic arguments of a class
    ///
    /// # Errors
    /// Returns [`crate::Error::Unavailable`] for unknown classes.
    fn class_info(&self, class: ClassId) -> Result<ClassInfo>;

    /// The concrete class of a managed object
    ///
    /// # Errors
    /// Returns [`crate::Error::Unavailable`] if the object cannot be classified.
    fn class_from_object(&self, object: ObjectId) -> Result<ClassId>;

    /// Array shape of `class`, or `None` if it is not an array class
    ///
    /// # Errors
    /// Returns [`crate::Error::Unavailable`] for unknown classes.
    fn array_class(&self, class: ClassId) -> Result<Option<ArrayClass>>;

    /// Dimensions and element address of an array instance of the given rank
    ///
    /// # Errors
    /// Returns [`crate::Error::Unavailable`] if the object is not an array of that rank.
    fn array_object(&self, object: ObjectId, rank: u32) -> Result<ArrayObject>;

    /// Instance size of a value-type class, in bytes
    ///
    /// # Errors
    /// Returns [`crate::Error::Unavailable`] if the layout is not known.
    fn class_size(&self, class: ClassId) -> Result<usize>;

    /// Layout of managed string objects
    ///
    /// # Errors
    /// Returns [`crate::Error::Unavailable`] if the runtime does not expose it.
    fn string_layout(&self) -> Result<StringLayout>;

    /// Name and flags of a `TypeDef`
    ///
    /// # Errors
    /// Returns [`crate::Error::Unavailable`] for unknown tokens.
    fn type_def_props(&self, module: ModuleId, token: Token) -> Result<TypeDefProps>;

    /// `TypeDef` token of the type enclosing a nested type
    ///
    /// # Errors
    /// Returns [`crate::Error::Unavailable`] if `token` is not nested.
    fn enclosing_class(&self, module: ModuleId, token: Token) -> Result<Token>;

    /// Simple name of a `TypeRef`
    ///
    /// # Errors
    /// Returns [`crate::Error::Unavailable`] for unknown tokens.
    fn type_ref_name(&self, module: ModuleId, token: Token) -> Result<String>;

    /// Signature blob of a `TypeSpec`
    ///
    /// # Errors
    /// Returns [`crate::Error::Unavailable`] for unknown tokens.
    fn type_spec_blob(&self, module: ModuleId, token: Token) -> Result<Vec<u8>>;

    /// Declared generic parameter names of a `TypeDef`, in order
    ///
    /// # Errors
    /// Returns [`crate::Error::Unavailable`] for unknown tokens.
    fn generic_param_names(&self, module: ModuleId, token: Token) -> Result<Vec<String>>;

    /// Name, declaring type and signature of a `MethodDef`
    ///
    /// # Errors
    /// Returns [`crate::Error::Unavailable`] for unknown tokens.
    fn method_props(&self, module: ModuleId, token: Token) -> Result<MethodProps>;

    /// Declared parameter names of a `MethodDef` as `(sequence, name)` pairs.
    ///
    /// Sequence `0` is the return value; parameters start at `1`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Unavailable`] for unknown tokens.
    fn param_names(&self, module: ModuleId, token: Token) -> Result<Vec<(u32, String)>>;
}

//! The host event surface.
//!
//! A runtime profiling host delivers a large set of notifications, most of which a stack
//! tracer has no use for. [`ProfilerCallback`] models the whole set with no-op defaults so
//! that an implementation only overrides what it consumes. [`StackManager`] overrides the
//! function and thread lifecycle events.
//!
//! # Examples
//!
//! ```rust,ignore
//! use dotstack::callback::ProfilerCallback;
//!
//! fn deliver(callback: &dyn ProfilerCallback, function: usize, call: usize) {
//!     callback.function_enter(function, call);
//!     callback.function_leave(function, call);
//! }
//! ```

use strum::{Display, FromRepr};

use crate::{
    metadata::provider::{
        AssemblyId, CallInfo, ClassId, FunctionId, ModuleId, ObjectId, OsThreadId, ThreadId,
    },
    stack::StackManager,
};

/// Why execution crossed the managed/unmanaged boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, FromRepr)]
#[repr(u32)]
pub enum TransitionReason {
    /// Control enters the callee
    Call = 0,
    /// Control returns to the caller
    Return = 1,
}

/// Host notifications, each defaulting to a no-op.
///
/// All methods may be called concurrently from any managed thread.
#[allow(unused_variables)]
pub trait ProfilerCallback: Send + Sync {
    /// A function was entered
    fn function_enter(&self, function: FunctionId, call: CallInfo) {}
    /// A function is about to return
    fn function_leave(&self, function: FunctionId, call: CallInfo) {}
    /// The current function is replaced by a tail call
    fn function_tailcall(&self, function: FunctionId, call: CallInfo) {}

    /// A managed thread was created
    fn thread_created(&self, thread: ThreadId) {}
    /// A managed thread was destroyed
    fn thread_destroyed(&self, thread: ThreadId) {}
    /// A managed thread was scheduled on an OS thread
    fn thread_assigned_to_os_thread(&self, thread: ThreadId, os_thread: OsThreadId) {}
    /// A managed thread was named; the name is UTF-16
    fn thread_name_changed(&self, thread: ThreadId, name: &[u16]) {}

    /// Execution moved from unmanaged into managed code.
    ///
    /// A regular enter event follows, so the transition itself has no frame effect.
    fn unmanaged_to_managed_transition(&self, function: FunctionId, reason: TransitionReason) {}
    /// Execution moved from managed into unmanaged code
    fn managed_to_unmanaged_transition(&self, function: FunctionId, reason: TransitionReason) {}

    /// Loading of an assembly finished
    fn assembly_load_finished(&self, assembly: AssemblyId) {}
    /// Unloading of an assembly started
    fn assembly_unload_started(&self, assembly: AssemblyId) {}
    /// Loading of a module finished
    fn module_load_finished(&self, module: ModuleId) {}
    /// Unloading of a module started
    fn module_unload_started(&self, module: ModuleId) {}
    /// A module was attached to its assembly
    fn module_attached_to_assembly(&self, module: ModuleId, assembly: AssemblyId) {}
    /// Loading of a class finished
    fn class_load_finished(&self, class: ClassId) {}
    /// Unloading of a class started
    fn class_unload_started(&self, class: ClassId) {}
    /// A function is about to be unloaded
    fn function_unload_started(&self, function: FunctionId) {}

    /// JIT compilation of a function started
    fn jit_compilation_started(&self, function: FunctionId, safe_to_block: bool) {}
    /// JIT compilation of a function finished
    fn jit_compilation_finished(&self, function: FunctionId, safe_to_block: bool) {}

    /// An exception was thrown
    fn exception_thrown(&self, exception: ObjectId) {}
    /// The unwinder entered a function
    fn exception_unwind_function_enter(&self, function: FunctionId) {}
    /// The unwinder left the current function
    fn exception_unwind_function_leave(&self) {}
    /// A catch clause is about to run
    fn exception_catcher_enter(&self, function: FunctionId, exception: ObjectId) {}
    /// A catch clause finished
    fn exception_catcher_leave(&self) {}

    /// The runtime started suspending threads
    fn runtime_suspend_started(&self) {}
    /// The runtime resumed threads
    fn runtime_resume_finished(&self) {}
    /// A garbage collection started
    fn garbage_collection_started(&self) {}
    /// A garbage collection finished
    fn garbage_collection_finished(&self) {}
    /// An object was allocated
    fn object_allocated(&self, object: ObjectId, class: ClassId) {}

    /// The host is shutting down
    fn shutdown(&self) {}
}

impl ProfilerCallback for StackManager {
    fn function_enter(&self, function: FunctionId, call: CallInfo) {
        StackManager::function_enter(self, function, call);
    }

    fn function_leave(&self, function: FunctionId, call: CallInfo) {
        StackManager::function_leave(self, function, call);
    }

    fn function_tailcall(&self, function: FunctionId, call: CallInfo) {
        StackManager::function_tailcall(self, function, call);
    }

    fn thread_created(&self, thread: ThreadId) {
        StackManager::thread_created(self, thread);
    }

    fn thread_destroyed(&self, thread: ThreadId) {
        StackManager::thread_destroyed(self, thread);
    }

    fn thread_assigned_to_os_thread(&self, thread: ThreadId, os_thread: OsThreadId) {
        StackManager::thread_assigned_to_os_thread(self, thread, os_thread);
    }

    fn thread_name_changed(&self, thread: ThreadId, name: &[u16]) {
        StackManager::thread_name_changed(self, thread, name);
    }
}

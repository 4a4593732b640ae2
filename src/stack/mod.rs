//! Call stack tracking.
//!
//! The [`StackManager`] consumes enter/leave/tailcall and thread lifecycle events and keeps
//! one [`ThreadStack`] per managed thread in a sharded [`ThreadStore`]. Display metadata of
//! each function is built once and shared through the [`FunctionInfoCache`].
//!
//! # Key Components
//!
//! - [`StackManager`] - Event handlers, snapshots and dumps
//! - [`ThreadStore`] - Thread id to stack state map, split into independently locked buckets
//! - [`ThreadStack`] - Frames plus desync counters of one thread
//! - [`FunctionInfoCache`] - Insert-only function metadata cache
//!
//! # Desynchronization
//!
//! Leave events that do not match the top frame are repaired by truncating to the nearest
//! matching frame, or ignored when no frame matches. Both cases are counted per thread and
//! visible in every [`ThreadStackSnapshot`].

mod arguments;
mod cache;
mod dump;
mod frame;
mod manager;
mod store;

pub use arguments::capture_arguments;
pub use cache::{build_function_info, FunctionInfoCache};
pub use frame::{
    FunctionInfo, LeaveOutcome, StackFrame, ThreadStack, ThreadStackSnapshot, ThreadStackState,
};
pub use manager::StackManager;
pub use store::ThreadStore;

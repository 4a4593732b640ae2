use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::metadata::provider::{FunctionId, OsThreadId, ThreadId};

/// Display metadata of a function, built once per [`FunctionId`] and shared by every frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionInfo {
    /// Name of the defining module
    pub module_name: String,
    /// Name of the defining assembly
    pub assembly_name: String,
    /// Display name of the declaring type, e.g. `Outer+Inner<T>`
    pub type_name: String,
    /// Full signature, e.g. `int Outer+Inner<T>.Run(string s)`
    pub method_signature: String,
}

impl fmt::Display for FunctionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ModuleName = {}", self.module_name)?;
        writeln!(f, "AssemblyName = {}", self.assembly_name)?;
        writeln!(f, "TypeName = {}", self.type_name)?;
        write!(f, "MethodSignature = {}", self.method_signature)
    }
}

/// One active invocation on a thread's call stack
#[derive(Debug, Clone)]
pub struct StackFrame {
    /// The function this frame executes
    pub function_id: FunctionId,
    /// Shared display metadata of the function
    pub function_info: Arc<FunctionInfo>,
    /// Rendered arguments (`<type> <name> = <value>`), empty unless argument capture is on
    pub arguments: Vec<String>,
}

/// What a leave event did to a stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The stack was empty, nothing happened
    Empty,
    /// The top frame matched and was popped
    Popped,
    /// The function was found below the top; it and everything above it was discarded
    Repaired {
        /// Number of frames removed
        discarded: usize,
    },
    /// The function is not on the stack; nothing was removed
    NotFound,
}

/// Frames and desync counters of one managed thread.
///
/// Frames are only ever pushed to or truncated from the tail.
#[derive(Debug, Default)]
pub struct ThreadStack {
    frames: Vec<StackFrame>,
    /// Leave events for functions not on the stack
    pub desync_not_found: u64,
    /// Leave events that matched below the top of the stack
    pub desync_found_not_top: u64,
    /// Frames removed by tail calls
    pub tailcall_pops: u64,
    /// OS thread the managed thread currently runs on
    pub os_thread_id: OsThreadId,
    /// Managed thread name
    pub name: String,
}

impl ThreadStack {
    /// An empty stack with room for `capacity` frames
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        ThreadStack {
            frames: Vec::with_capacity(capacity),
            ..ThreadStack::default()
        }
    }

    /// Active frames, oldest first
    #[must_use]
    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    /// Number of active frames
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Push a frame for an entered function
    pub fn push(&mut self, frame: StackFrame) {
        self.frames.push(frame);
    }

    /// Pop the frame of a returning function.
    ///
    /// If `function` is not on top, the stack is searched from the top down. A match at
    /// index `i` truncates the stack to length `i`; no match leaves the stack untouched.
    /// Both cases are counted.
    pub fn leave(&mut self, function: FunctionId) -> LeaveOutcome {
        let Some(top) = self.frames.last() else {
            return LeaveOutcome::Empty;
        };

        if top.function_id == function {
            self.frames.pop();
            return LeaveOutcome::Popped;
        }

        match self
            .frames
            .iter()
            .rposition(|frame| frame.function_id == function)
        {
            Some(index) => {
                let discarded = self.frames.len() - index;
                self.frames.truncate(index);
                self.desync_found_not_top += 1;
                LeaveOutcome::Repaired { discarded }
            }
            None => {
                self.desync_not_found += 1;
                LeaveOutcome::NotFound
            }
        }
    }

    /// Pop the caller's frame for a tail call, regardless of which function is called.
    ///
    /// Returns `false` on an empty stack.
    pub fn tailcall(&mut self) -> bool {
        if self.frames.pop().is_some() {
            self.tailcall_pops += 1;
            true
        } else {
            false
        }
    }
}

/// A thread's stack behind its own lock.
///
/// Owned by the [`crate::stack::ThreadStore`]; handed out as `Arc` so a bucket lock never has
/// to be held while the stack is mutated.
#[derive(Debug)]
pub struct ThreadStackState {
    thread_id: ThreadId,
    stack: Mutex<ThreadStack>,
}

impl ThreadStackState {
    /// Create the state of `thread_id` with pre-reserved frame capacity
    #[must_use]
    pub fn new(thread_id: ThreadId, capacity: usize) -> Self {
        ThreadStackState {
            thread_id,
            stack: Mutex::new(ThreadStack::with_capacity(capacity)),
        }
    }

    /// The managed thread this state belongs to
    #[must_use]
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Lock the stack for mutation
    pub fn lock(&self) -> MutexGuard<'_, ThreadStack> {
        lock!(self.stack)
    }

    /// Copy out the current state
    #[must_use]
    pub fn snapshot(&self) -> ThreadStackSnapshot {
        with_lock!(self.stack, |stack: &mut ThreadStack| ThreadStackSnapshot {
            thread_id: self.thread_id,
            os_thread_id: stack.os_thread_id,
            name: stack.name.clone(),
            desync_not_found: stack.desync_not_found,
            desync_found_not_top: stack.desync_found_not_top,
            tailcall_pops: stack.tailcall_pops,
            frames: stack.frames.clone(),
        })
    }
}

/// A copy of one thread's stack taken at a single point in time
#[derive(Debug, Clone)]
pub struct ThreadStackSnapshot {
    /// Managed thread id
    pub thread_id: ThreadId,
    /// OS thread id, `0` if never assigned
    pub os_thread_id: OsThreadId,
    /// Thread name, empty if never named
    pub name: String,
    /// See [`ThreadStack::desync_not_found`]
    pub desync_not_found: u64,
    /// See [`ThreadStack::desync_found_not_top`]
    pub desync_found_not_top: u64,
    /// See [`ThreadStack::tailcall_pops`]
    pub tailcall_pops: u64,
    /// Frames, oldest first
    pub frames: Vec<StackFrame>,
}

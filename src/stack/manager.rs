use std::sync::Arc;

use log::{trace, warn};
use widestring::U16Str;

use crate::{
    config::TracerConfig,
    memory::{MemoryView, ProcessMemory},
    metadata::provider::{CallInfo, FunctionId, OsThreadId, RuntimeMetadata, ThreadId},
    stack::{
        arguments::capture_arguments, cache::build_function_info, FunctionInfoCache,
        LeaveOutcome, StackFrame, ThreadStackSnapshot, ThreadStore,
    },
};

/// Tracks the managed call stack of every thread from enter/leave/tailcall events.
///
/// The manager owns all tracer state: the per-thread stacks and the function metadata
/// cache. Handlers are safe to call concurrently from any number of threads and never
/// fail; problems degrade to empty names, placeholder values or desync counters.
///
/// # Examples
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use dotstack::prelude::*;
///
/// let manager = StackManager::new(Arc::new(host), TracerConfig::from_env());
/// manager.function_enter(function, call);
/// manager.function_leave(function, call);
/// manager.dump("stacks.txt")?;
/// ```
pub struct StackManager {
    runtime: Arc<dyn RuntimeMetadata>,
    memory: Arc<dyn MemoryView>,
    config: TracerConfig,
    functions: FunctionInfoCache,
    threads: ThreadStore,
}

impl StackManager {
    /// Create a manager that reads argument values from the current process
    #[must_use]
    pub fn new(runtime: Arc<dyn RuntimeMetadata>, config: TracerConfig) -> Self {
        Self::with_memory(runtime, Arc::new(ProcessMemory), config)
    }

    /// Create a manager reading argument values through `memory`
    #[must_use]
    pub fn with_memory(
        runtime: Arc<dyn RuntimeMetadata>,
        memory: Arc<dyn MemoryView>,
        config: TracerConfig,
    ) -> Self {
        StackManager {
            threads: ThreadStore::new(config.initial_frame_capacity),
            functions: FunctionInfoCache::new(),
            runtime,
            memory,
            config,
        }
    }

    /// The active configuration
    #[must_use]
    pub fn config(&self) -> &TracerConfig {
        &self.config
    }

    fn current_thread(&self) -> Option<ThreadId> {
        self.runtime
            .current_thread_id()
            .ok()
            .filter(|thread| *thread != 0)
    }

    /// A function was entered on the current thread.
    ///
    /// Metadata and argument values are resolved before the thread's stack is locked.
    pub fn function_enter(&self, function: FunctionId, call: CallInfo) {
        let Some(thread) = self.current_thread() else {
            return;
        };

        let function_info = self.functions.get_or_build(function, || {
            build_function_info(self.runtime.as_ref(), function, call)
        });

        let arguments = if self.config.capture_arguments {
            capture_arguments(
                self.runtime.as_ref(),
                self.memory.as_ref(),
                &self.config,
                function,
                call,
            )
        } else {
            Vec::new()
        };

        self.threads.get_or_create(thread).lock().push(StackFrame {
            function_id: function,
            function_info,
            arguments,
        });
    }

    /// A function returned on the current thread.
    ///
    /// The matching frame is popped. If it is not on top, the stack is repaired by
    /// discarding everything above the nearest matching frame; if it is not on the stack
    /// at all, nothing is removed.
    pub fn function_leave(&self, function: FunctionId, _call: CallInfo) {
        let Some(thread) = self.current_thread() else {
            return;
        };
        let Some(state) = self.threads.get(thread) else {
            return;
        };

        let mut stack = state.lock();
        match stack.leave(function) {
            LeaveOutcome::Repaired { discarded } => {
                let count = stack.desync_found_not_top;
                if self.config.should_log_desync(count) {
                    warn!(
                        "Thread {}: leave of 0x{:X} below the top discarded {} frames ({} repairs)",
                        thread, function, discarded, count
                    );
                }
            }
            LeaveOutcome::NotFound => {
                let count = stack.desync_not_found;
                if self.config.should_log_desync(count) {
                    warn!(
                        "Thread {}: leave of 0x{:X} not on a stack of depth {} ({} misses)",
                        thread,
                        function,
                        stack.depth(),
                        count
                    );
                }
            }
            LeaveOutcome::Popped | LeaveOutcome::Empty => {}
        }
    }

    /// The current function is replaced by a tail call; its frame is popped unconditionally
    pub fn function_tailcall(&self, _function: FunctionId, _call: CallInfo) {
        let Some(thread) = self.current_thread() else {
            return;
        };

        if let Some(state) = self.threads.get(thread) {
            state.lock().tailcall();
        }
    }

    /// A managed thread was created
    pub fn thread_created(&self, thread: ThreadId) {
        self.threads.get_or_create(thread);
    }

    /// A managed thread was destroyed; its stack is discarded
    pub fn thread_destroyed(&self, thread: ThreadId) {
        if let Some(state) = self.threads.remove(thread) {
            trace!(
                "Thread {} destroyed with {} frames",
                thread,
                state.lock().depth()
            );
        }
    }

    /// A managed thread was scheduled on an OS thread
    pub fn thread_assigned_to_os_thread(&self, thread: ThreadId, os_thread: OsThreadId) {
        self.threads.get_or_create(thread).lock().os_thread_id = os_thread;
    }

    /// A managed thread was named; `name` is UTF-16 and converted lossily
    pub fn thread_name_changed(&self, thread: ThreadId, name: &[u16]) {
        let name = U16Str::from_slice(name).to_string_lossy();
        self.threads.get_or_create(thread).lock().name = name;
    }

    /// Copies of every thread's stack, ordered by thread id.
    ///
    /// Threads are locked one at a time, so the result is not a single atomic picture of
    /// the whole process.
    #[must_use]
    pub fn snapshot_all(&self) -> Vec<ThreadStackSnapshot> {
        let mut snapshots: Vec<_> = self
            .threads
            .states()
            .iter()
            .map(|state| state.snapshot())
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.thread_id);
        snapshots
    }

    /// A copy of one thread's stack, if the thread is tracked
    #[must_use]
    pub fn snapshot(&self, thread: ThreadId) -> Option<ThreadStackSnapshot> {
        self.threads.get(thread).map(|state| state.snapshot())
    }

    /// Number of functions with cached metadata
    #[must_use]
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Number of tracked threads
    #[must_use]
    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }
}

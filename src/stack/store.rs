use std::{
    hash::{Hash, Hasher},
    sync::{Arc, RwLock},
};

use log::trace;
use rustc_hash::{FxHashMap, FxHasher};

use crate::{
    config::THREAD_BUCKETS,
    metadata::provider::ThreadId,
    stack::ThreadStackState,
};

type Bucket = RwLock<FxHashMap<ThreadId, Arc<ThreadStackState>>>;

/// Per-thread stack states, sharded into [`THREAD_BUCKETS`] buckets by thread id.
///
/// Each bucket has its own reader/writer lock, taken only to look up, insert or erase a
/// state. Frame mutations lock the state itself, so threads in the same bucket only
/// contend on the brief map lookup.
pub struct ThreadStore {
    buckets: [Bucket; THREAD_BUCKETS],
    initial_capacity: usize,
}

impl ThreadStore {
    /// Create an empty store; new thread states reserve `initial_capacity` frames
    #[must_use]
    pub fn new(initial_capacity: usize) -> Self {
        ThreadStore {
            buckets: std::array::from_fn(|_| RwLock::new(FxHashMap::default())),
            initial_capacity,
        }
    }

    fn bucket(&self, thread: ThreadId) -> &Bucket {
        let mut hasher = FxHasher::default();
        thread.hash(&mut hasher);
        &self.buckets[(hasher.finish() % THREAD_BUCKETS as u64) as usize]
    }

    /// The state of `thread`, if it exists
    #[must_use]
    pub fn get(&self, thread: ThreadId) -> Option<Arc<ThreadStackState>> {
        read_lock!(self.bucket(thread)).get(&thread).cloned()
    }

    /// The state of `thread`, created with an empty stack if absent.
    ///
    /// Lookup runs under the shared lock; creation re-checks under the exclusive lock so
    /// racing creators end up with the same state.
    pub fn get_or_create(&self, thread: ThreadId) -> Arc<ThreadStackState> {
        let bucket = self.bucket(thread);

        if let Some(state) = read_lock!(bucket).get(&thread) {
            return Arc::clone(state);
        }

        let mut stacks = write_lock!(bucket);
        let state = stacks.entry(thread).or_insert_with(|| {
            trace!("Tracking managed thread {}", thread);
            Arc::new(ThreadStackState::new(thread, self.initial_capacity))
        });
        Arc::clone(state)
    }

    /// Erase the state of `thread`, discarding any frames still on it
    pub fn remove(&self, thread: ThreadId) -> Option<Arc<ThreadStackState>> {
        write_lock!(self.bucket(thread)).remove(&thread)
    }

    /// All current states, one bucket at a time
    #[must_use]
    pub fn states(&self) -> Vec<Arc<ThreadStackState>> {
        let mut states = Vec::new();
        for bucket in &self.buckets {
            states.extend(read_lock!(bucket).values().cloned());
        }
        states
    }

    /// Number of tracked threads
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets
            .iter()
            .map(|bucket| read_lock!(bucket).len())
            .sum()
    }

    /// Returns `true` if no thread is tracked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

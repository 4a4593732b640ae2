#![allow(unused_macros)]

// Poisoned guards are recovered: a panicking handler never leaves a frame vector or map
// half-written.

/// Helper macro for locking items
///
/// ```rust, ignore
///  let mut data = lock!(my_mutex);
///  data.some_field = 42;
/// ```
macro_rules! lock {
    ($lock:expr) => {
        $lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    };
}

/// Helper macro for reading locked items
///
/// ```rust, ignore
///  let data = read_lock!(my_rwlock);
///  println!("{}", data.len());
/// ```
macro_rules! read_lock {
    ($rwlock:expr) => {
        $rwlock
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    };
}

/// Helper macro for writing to locked items
///
/// ```rust, ignore
///  let mut data = write_lock!(my_rwlock);
///  data.insert(key, value);
/// ```
macro_rules! write_lock {
    ($rwlock:expr) => {
        $rwlock
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    };
}

/// Helper macro for running a closure against a locked item
///
/// ```rust, ignore
///  let depth = with_lock!(state, |stack| stack.frames.len());
/// ```
macro_rules! with_lock {
    ($lock:expr, $closure:expr) => {{
        let mut guard = lock!($lock);
        $closure(&mut *guard)
    }};
}

//! Configuration for the stack tracer.
//!
//! [`TracerConfig`] controls whether argument values are decoded on function entry and the
//! caps that bound the cost of doing so. The defaults keep the hot path lean: arguments
//! are not captured unless explicitly enabled.

use std::str::FromStr;

use log::warn;

/// Number of shards the per-thread stack store is split into
pub const THREAD_BUCKETS: usize = 64;

/// Environment variable enabling argument capture (`1`/`true`/`yes`/`on`)
pub const ENV_CAPTURE_ARGS: &str = "DOTSTACK_CAPTURE_ARGS";
/// Environment variable overriding [`TracerConfig::max_array_elements`]
pub const ENV_MAX_ARRAY_ELEMENTS: &str = "DOTSTACK_MAX_ARRAY_ELEMENTS";
/// Environment variable overriding [`TracerConfig::max_argument_depth`]
pub const ENV_MAX_ARGUMENT_DEPTH: &str = "DOTSTACK_MAX_ARGUMENT_DEPTH";

/// Configuration for the [`crate::StackManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracerConfig {
    /// Decode argument values on function entry (default: false).
    pub capture_arguments: bool,

    /// Maximum number of array elements rendered before `...` (default: 16).
    pub max_array_elements: usize,

    /// Nesting depth at which argument values render as `<?>` (default: 3).
    ///
    /// The top-level argument is depth 0, array elements are one level deeper than their array.
    pub max_argument_depth: usize,

    /// Maximum number of UTF-16 units read from a managed string (default: 4096).
    pub max_string_chars: usize,

    /// Every n-th desync of a kind on a thread is logged (default: 1024, power of two).
    pub desync_log_interval: u64,

    /// Frames reserved up front for a new thread stack (default: 256).
    pub initial_frame_capacity: usize,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            capture_arguments: false,
            max_array_elements: 16,
            max_argument_depth: 3,
            max_string_chars: 4096,
            desync_log_interval: 1024,
            initial_frame_capacity: 256,
        }
    }
}

impl TracerConfig {
    /// Creates a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration with argument capture turned on.
    #[must_use]
    pub fn with_arguments() -> Self {
        Self {
            capture_arguments: true,
            ..Self::default()
        }
    }

    /// Default configuration overlaid with the `DOTSTACK_*` environment variables.
    ///
    /// Unparseable values are ignored with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().overlay(|name| std::env::var(name).ok())
    }

    /// Overlay settings provided by `lookup`, keyed by environment variable name.
    #[must_use]
    pub fn overlay<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_CAPTURE_ARGS) {
            match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.capture_arguments = true,
                "0" | "false" | "no" | "off" => self.capture_arguments = false,
                other => warn!("Ignoring {}={}: expected a boolean", ENV_CAPTURE_ARGS, other),
            }
        }

        if let Some(value) = parse_var::<usize, _>(&lookup, ENV_MAX_ARRAY_ELEMENTS) {
            self.max_array_elements = value;
        }

        if let Some(value) = parse_var::<usize, _>(&lookup, ENV_MAX_ARGUMENT_DEPTH) {
            self.max_argument_depth = value;
        }

        self
    }

    /// Set whether argument values are captured.
    #[must_use]
    pub fn with_capture_arguments(mut self, enabled: bool) -> Self {
        self.capture_arguments = enabled;
        self
    }

    /// Set the maximum number of rendered array elements.
    #[must_use]
    pub fn with_max_array_elements(mut self, count: usize) -> Self {
        self.max_array_elements = count;
        self
    }

    /// Set the argument nesting depth cap.
    #[must_use]
    pub fn with_max_argument_depth(mut self, depth: usize) -> Self {
        self.max_argument_depth = depth;
        self
    }

    /// Set the desync log interval, rounded up to a power of two.
    #[must_use]
    pub fn with_desync_log_interval(mut self, interval: u64) -> Self {
        self.desync_log_interval = interval.max(1).next_power_of_two();
        self
    }

    /// `true` if the `count`-th desync should be logged.
    #[must_use]
    pub fn should_log_desync(&self, count: u64) -> bool {
        count & (self.desync_log_interval.max(1) - 1) == 0
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(name)?;
    match value.trim().parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("Ignoring {}={}: not a number", name, value);
            None
        }
    }
}

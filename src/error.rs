use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds
    };
}

macro_rules! unavailable_error {
    ($fmt:expr $(, $arg:expr)* $(,)?) => {
        crate::Error::Unavailable(format!($fmt $(, $arg)*))
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// produce internally.
///
/// None of these errors ever reach the host runtime: event handlers swallow them and degrade
/// to empty strings, placeholder values or counters. They exist so that the decoding layers can
/// use `?` and so that [`crate::StackManager::dump`] can report I/O failures.
///
/// # Error Categories
///
/// ## Decoding Errors
/// - [`Error::Malformed`] - Signature or layout data that does not follow the expected grammar
/// - [`Error::OutOfBounds`] - A read would have gone past the end of a signature blob
/// - [`Error::Empty`] - An empty blob where data was required
/// - [`Error::RecursionLimit`] - Nested type data exceeded the recursion cap
///
/// ## Host Errors
/// - [`Error::Unavailable`] - A metadata or runtime query failed or returned nothing
/// - [`Error::InvalidAddress`] - The foreign memory view refused a read
///
/// ## I/O
/// - [`Error::FileError`] - Writing a dump failed
///
/// # Examples
///
/// ```rust
/// use dotstack::Error;
///
/// fn describe(err: &Error) -> &'static str {
///     match err {
///         Error::Malformed { .. } | Error::OutOfBounds => "bad signature",
///         Error::Unavailable(_) => "host query failed",
///         _ => "other",
///     }
/// }
/// # assert_eq!(describe(&Error::OutOfBounds), "bad signature");
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The data is damaged and could not be decoded.
    ///
    /// The error includes the source location where the malformation was detected for
    /// debugging purposes.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while decoding a blob.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// Recursion limit reached.
    ///
    /// Nested signatures, generic arguments and array elements are decoded recursively. The
    /// associated value shows the recursion limit that was reached.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// A query against the host runtime failed or returned no data.
    #[error("Runtime query failed - {0}")]
    Unavailable(String),

    /// The memory view refused to read from this address.
    #[error("Refused to read foreign memory at 0x{0:X}")]
    InvalidAddress(usize),

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),
}

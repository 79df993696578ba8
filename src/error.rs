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

/// The generic Error type, which covers every failure a mapper can report.
///
/// A top-level [`crate::Mapper::read`] or [`crate::Mapper::write`] call always yields exactly one
/// of these, no matter how deeply the failing mapper was nested. Composite mappers never wrap the
/// error of a child, they return it as-is.
///
/// # Error Categories
///
/// ## Stream Errors
/// - [`Error::Io`] - Propagated verbatim from the underlying reader or writer, including
///   end-of-input (`std::io::ErrorKind::UnexpectedEof`)
///
/// ## Construction Errors
/// - [`Error::NilTarget`] - The mapper was built for an absent target
///
/// ## Structural Errors
/// - [`Error::UnbalancedTable`] - Table columns disagree with the declared row count
/// - [`Error::OutOfBounds`] - A column writer ran past the end of its column
/// - [`Error::LengthOverflow`] - A length does not fit the wire or the platform
/// - [`Error::UnknownTag`] - Unrecognized discriminant in a caller-defined variant dispatch
/// - [`Error::Malformed`] - Wire data that can not be decoded (bad text, varint overflow)
///
/// ## Caller Errors
/// - [`Error::Validation`] - Business-rule violations raised by hooks
/// - [`Error::Panic`] - A panic contained by [`crate::on_panic`]
/// - [`Error::LockError`] - A guarded target was poisoned
///
/// # Examples
///
/// ```rust
/// use binmap::{byte, Endian, Error, Mapper};
///
/// let mut value = 0u8;
/// let mut input: &[u8] = &[];
/// let result = byte(&mut value).read(&mut input, Endian::Big);
/// match result {
///     Err(Error::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
///     other => panic!("unexpected result: {other:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// Stream error.
    ///
    /// Wraps errors of the reader or writer handed to a mapper. End-of-input surfaces here as
    /// `std::io::ErrorKind::UnexpectedEof`.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// The mapper was constructed without a target.
    ///
    /// Returned by both directions of the [`crate::Nil`] sentinel, before any I/O is attempted.
    #[error("nil read source or write target")]
    NilTarget,

    /// A data table column does not have the declared number of rows.
    ///
    /// Raised before a single byte of the table is written.
    ///
    /// # Fields
    ///
    /// * `column` - Index of the first offending column, in declaration order
    /// * `expected` - The row count the table declared
    /// * `actual` - The length the column actually has
    #[error("unbalanced data table - column {column} has {actual} rows, expected {expected}")]
    UnbalancedTable {
        /// Index of the offending column
        column: usize,
        /// Declared row count
        expected: u64,
        /// Actual column length
        actual: usize,
    },

    /// A writer ran past the end of the collection it was declared over.
    #[error("Out of Bound write would have occurred!")]
    OutOfBounds,

    /// A length or count does not fit into its declared width.
    ///
    /// Occurs when a collection has more entries than a 32-bit length prefix can express, or
    /// when a count read from the wire exceeds what the platform can index.
    #[error("Length {0} exceeds the maximum of its size type")]
    LengthOverflow(u64),

    /// Unrecognized discriminant or version tag.
    ///
    /// Meant for caller-defined variant dispatch built with [`crate::from_fns`] or
    /// [`crate::any`].
    #[error("Unknown variant tag - {0}")]
    UnknownTag(u64),

    /// The wire data is damaged and could not be decoded.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A business rule was violated.
    ///
    /// Raised by validation and normalization hooks.
    #[error("Validation failed - {0}")]
    Validation(String),

    /// A panic occurred during a read or write and was contained by a fault boundary.
    ///
    /// # Fields
    ///
    /// * `message` - The panic payload, when it was a string
    /// * `handler` - The error produced by the boundary's fault handler, if it produced one
    #[error(
        "panic during read or write{}{}",
        .message.as_ref().map(|m| format!(" ({m})")).unwrap_or_default(),
        .handler.as_ref().map(|e| format!(": {e}")).unwrap_or_default()
    )]
    Panic {
        /// The panic payload, when it was a string
        message: Option<String>,
        /// The fault handler's error
        handler: Option<Box<Error>>,
    },

    /// Failed to lock target.
    ///
    /// The mutex or rwlock guarding a target was poisoned by a panic in another operation.
    #[error("Failed to lock target")]
    LockError,
}

impl Error {
    /// Shorthand for building an [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Returns `true` if this is a stream error signalling end-of-input.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
    }
}

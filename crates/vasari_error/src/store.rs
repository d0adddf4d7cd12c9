//! Backing store error types.

/// Kinds of backing store errors.
///
/// An absent key is not an error; store operations report absence through
/// `Option` results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StoreErrorKind {
    /// The store could not be reached or the operation failed mid-flight
    #[display("Store unavailable: {}", _0)]
    Unavailable(String),
    /// A racing creation won; the caller should re-fetch
    #[display("Duplicate key: {}", _0)]
    DuplicateKey(String),
    /// The operation exceeded its configured deadline
    #[display("Store operation timed out: {}", _0)]
    Timeout(String),
}

/// Backing store error with location tracking.
///
/// # Examples
///
/// ```
/// use vasari_error::{StoreError, StoreErrorKind};
///
/// let err = StoreError::new(StoreErrorKind::DuplicateKey("guild 42".to_string()));
/// assert!(format!("{}", err).contains("Duplicate key"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Store Error: {} at line {} in {}", kind, line, file)]
pub struct StoreError {
    /// The kind of error that occurred
    pub kind: StoreErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StoreError {
    /// Create a new store error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StoreErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether this error is a lost creation race.
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self.kind, StoreErrorKind::DuplicateKey(_))
    }
}

//! Cache construction error types.

/// Kinds of cache errors.
///
/// These are programmer errors surfaced at construction time. Once a cache
/// is built, its bookkeeping operations cannot fail.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum CacheErrorKind {
    /// Capacity was configured as zero
    #[display("Cache capacity must be at least 1")]
    ZeroCapacity,
    /// High-water ratio outside the half-open interval (0, 1]
    #[display("High-water ratio must be in (0, 1], got {}", _0)]
    InvalidHighWaterRatio(f64),
}

/// Cache error with location tracking.
///
/// # Examples
///
/// ```
/// use vasari_error::{CacheError, CacheErrorKind};
///
/// let err = CacheError::new(CacheErrorKind::ZeroCapacity);
/// assert!(format!("{}", err).contains("at least 1"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Cache Error: {} at line {} in {}", kind, line, file)]
pub struct CacheError {
    /// The kind of error that occurred
    pub kind: CacheErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl CacheError {
    /// Create a new cache error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CacheErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

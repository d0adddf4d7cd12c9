//! Top-level error wrapper types.

use crate::{CacheError, ConfigError, StoreError};

/// This is the foundation error enum. Additional variants will be added
/// by other vasari crates as the workspace grows.
///
/// # Examples
///
/// ```
/// use vasari_error::{VasariError, ConfigError};
///
/// let cfg_err = ConfigError::new("capacity missing");
/// let err: VasariError = cfg_err.into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum VasariErrorKind {
    /// Cache construction error
    #[from(CacheError)]
    Cache(CacheError),
    /// Backing store error
    #[from(StoreError)]
    Store(StoreError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// Vasari error with kind discrimination.
///
/// # Examples
///
/// ```
/// use vasari_error::{VasariResult, ConfigError};
///
/// fn might_fail() -> VasariResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Vasari Error: {}", _0)]
pub struct VasariError(Box<VasariErrorKind>);

impl VasariError {
    /// Create a new error from a kind.
    pub fn new(kind: VasariErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &VasariErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to VasariErrorKind
impl<T> From<T> for VasariError
where
    T: Into<VasariErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Vasari operations.
///
/// # Examples
///
/// ```
/// use vasari_error::{VasariResult, StoreError, StoreErrorKind};
///
/// fn fetch_data() -> VasariResult<String> {
///     Err(StoreError::new(StoreErrorKind::Unavailable("offline".into())))?
/// }
/// ```
pub type VasariResult<T> = std::result::Result<T, VasariError>;

//! Error types for the Vasari library.
//!
//! This crate provides the foundation error types used throughout the Vasari
//! ecosystem.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error
//! handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use vasari_error::{VasariResult, StoreError, StoreErrorKind};
//!
//! fn fetch_settings() -> VasariResult<String> {
//!     Err(StoreError::new(StoreErrorKind::Unavailable(
//!         "connection pool exhausted".to_string(),
//!     )))?
//! }
//!
//! match fetch_settings() {
//!     Ok(prefix) => println!("Got: {}", prefix),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod config;
mod error;
mod store;

pub use cache::{CacheError, CacheErrorKind};
pub use config::ConfigError;
pub use error::{VasariError, VasariErrorKind, VasariResult};
pub use store::{StoreError, StoreErrorKind};

//! Core abstractions for the Vasari entity cache library.
//!
//! This crate provides the foundation contracts used across all Vasari
//! crates: the [`Entity`] identity contract, the [`Clock`] time source,
//! and tracing initialization.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod entity;
mod telemetry;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entity::Entity;
pub use telemetry::init_telemetry;

//! Utility types and functions for motionbake.
//!
//! This module contains fundamental types used throughout the library:
//! - [`Error`] / [`Result`] - Error handling
//! - [`Chrono`] - Time in seconds
//! - Math type re-exports from glam

mod error;
mod math;

pub use error::*;
pub use math::*;

//! Math type re-exports and time aliases.
//!
//! Pose data uses single-precision `glam` types; time values are
//! double-precision seconds.

// Re-export glam types used by pose samples
pub use glam::{Quat, Vec3};

/// Chrono type - time value (seconds).
pub type Chrono = f64;

//! pf-core: stable foundation for the particle field engine.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - units (opaque unit metadata carried alongside derived arrays)

pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use numeric::*;
pub use units::*;

//! Shared value types and model traits for planar vehicle simulation.

pub mod traits;

pub use traits::*;

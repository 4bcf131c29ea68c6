//! Pure domain types with minimal dependencies
//!
//! Types here carry no rendering or network dependencies so every other
//! module can share them.

pub mod annotation;
pub mod geometry;

pub use annotation::*;
pub use geometry::*;

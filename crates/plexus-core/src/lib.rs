//! # Plexus Core
//!
//! Tunable constants, particle storage and colour/style types for the ambient network
//! background.

pub mod color;
pub mod constants;
pub mod particle;
pub mod style;

pub use color::*;
pub use constants::*;
pub use particle::*;
pub use style::*;

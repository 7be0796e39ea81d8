//! # Plexus Simulation
//!
//! The real-time loop behind the network background: particle integration, proximity graph
//! construction into fixed-capacity buffers, render buffer synchronisation, pointer parallax
//! and the frame lifecycle (pause on hide, reduced-motion fallback, delta-time clamping).

pub mod engine;
pub mod graph;
pub mod grid;
pub mod parallax;
pub mod params;
pub mod scheduler;
pub mod sync;
pub mod viewport;

pub use engine::*;
pub use graph::*;
pub use grid::*;
pub use parallax::*;
pub use params::*;
pub use scheduler::*;
pub use sync::*;
pub use viewport::*;

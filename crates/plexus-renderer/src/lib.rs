//! # Plexus Renderer
//!
//! wgpu rendering of the particle network: instanced billboard points, proximity lines
//! coloured per vertex, exponential-squared fog and additive blending.

pub mod camera;
pub mod context;
pub mod error;
pub mod renderer;

pub use camera::{Camera, SceneUniform};
pub use context::GpuContext;
pub use error::RendererError;
pub use renderer::{blend_state, NetworkRenderer};

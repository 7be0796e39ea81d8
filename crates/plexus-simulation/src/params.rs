//! Simulation parameters gathered from the compile-time tunables

use plexus_core::*;
use std::time::Duration;

/// Strategy used to enumerate candidate particle pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NeighborSearch {
    /// Check every unordered pair. O(N²), fine for a few hundred particles.
    #[default]
    AllPairs,
    /// Bin particles into cells at least `max_dist` wide and only check adjacent cells.
    UniformGrid,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkParams {
    // Particles
    pub particle_count: usize,
    pub range: f32,
    pub velocity_range: f32,

    // Graph
    pub max_dist: f32,
    pub edge_colors: EdgeColorRamp,
    pub neighbor_search: NeighborSearch,

    // Camera
    /// Camera offset per unit of pointer position, x then y
    pub parallax_gain: [f32; 2],
    pub parallax_smoothing: f32,
    pub camera_distance: f32,
    pub spin_rate: f32,

    // Timing
    pub frame_interval: Duration,
    pub max_dt: f32,

    pub style: RenderStyle,
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self {
            particle_count: PARTICLE_COUNT,
            range: RANGE,
            velocity_range: VELOCITY_RANGE,
            max_dist: MAX_DIST,
            edge_colors: EdgeColorRamp::default(),
            neighbor_search: NeighborSearch::AllPairs,
            parallax_gain: [PARALLAX_GAIN_X, PARALLAX_GAIN_Y],
            parallax_smoothing: PARALLAX_SMOOTHING,
            camera_distance: CAMERA_DISTANCE,
            spin_rate: SPIN_RATE,
            frame_interval: Duration::from_secs_f32(TARGET_FRAME_INTERVAL_MS / 1000.0),
            max_dt: MAX_DT,
            style: RenderStyle::default(),
        }
    }
}

impl NetworkParams {
    /// Parameters for a static, reduced-motion rendering
    pub fn reduced_motion() -> Self {
        Self {
            particle_count: REDUCED_MOTION_PARTICLE_COUNT,
            ..Self::default()
        }
    }

    /// Pick the canonical or reduced-motion set
    pub fn for_motion_preference(reduced_motion: bool) -> Self {
        if reduced_motion {
            Self::reduced_motion()
        } else {
            Self::default()
        }
    }

    /// The simpler variant of the animation: same cloud, plainer look
    pub fn legacy() -> Self {
        Self {
            style: RenderStyle::legacy(),
            ..Self::default()
        }
    }

    /// Worst-case number of edges, `N * (N - 1) / 2`
    pub fn edge_capacity(&self) -> usize {
        self.particle_count * self.particle_count.saturating_sub(1) / 2
    }
}

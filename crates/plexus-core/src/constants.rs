//! Tunable constants for the network background
//!
//! These are fixed at compile time. Distances are in scene units, speeds in scene units per
//! normalized tick (one reference frame interval).

/// Number of particles in the cloud
pub const PARTICLE_COUNT: usize = 220;

/// Particle count used when reduced motion is requested (the cloud is static, so fewer
/// particles keep the single frame uncluttered)
pub const REDUCED_MOTION_PARTICLE_COUNT: usize = 120;

/// Edge length of the cubic domain. Coordinates live in `[-RANGE / 2, RANGE / 2]`.
pub const RANGE: f32 = 18.0;

/// Two particles are linked when their distance is strictly below this
pub const MAX_DIST: f32 = 3.4;

/// Full width of the per-axis initial velocity distribution (`±VELOCITY_RANGE / 2`)
pub const VELOCITY_RANGE: f32 = 0.02;

/// Edge colour at the threshold distance (`t = 0`)
pub const EDGE_BASE_COLOR: [f32; 3] = [0.0, 1.0, 0.8];

/// Per-channel colour added as particles approach each other (`t -> 1`)
pub const EDGE_COLOR_GAIN: [f32; 3] = [0.2, 0.0, 0.2];

/// Camera offset per unit of normalized pointer position
pub const PARALLAX_GAIN_X: f32 = 2.0;
pub const PARALLAX_GAIN_Y: f32 = 1.5;

/// Fraction of the remaining camera offset closed per normalized tick
pub const PARALLAX_SMOOTHING: f32 = 0.05;

/// Resting camera distance along +Z
pub const CAMERA_DISTANCE: f32 = 16.0;

/// Vertical field of view in degrees
pub const CAMERA_FOV_DEGREES: f32 = 65.0;

pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 100.0;

/// Scene rotation about Y, radians per normalized tick
pub const SPIN_RATE: f32 = 0.0004;

/// Reference frame interval (~60 Hz) that `dt = 1` corresponds to
pub const TARGET_FRAME_INTERVAL_MS: f32 = 16.67;

/// Upper bound on a single normalized step
pub const MAX_DT: f32 = 3.0;

// Render style
/// Point colour (sRGB hex)
pub const POINT_COLOR: u32 = 0x00ffcc;

/// Distance-attenuated point sprite size
pub const POINT_SIZE: f32 = 0.06;

pub const POINT_OPACITY: f32 = 0.9;
pub const LINE_OPACITY: f32 = 0.55;

/// Fog and clear colour (sRGB hex)
pub const FOG_COLOR: u32 = 0x06070a;

/// Exponential-squared fog density
pub const FOG_DENSITY: f32 = 0.04;

/// Highest device pixel ratio the surface is rendered at
pub const MAX_PIXEL_RATIO: f64 = 2.0;

//! Particle storage and per-frame integration

use glam::Vec3;
use rand::Rng;

/// Positions and velocities for N particles in parallel dense arrays.
///
/// A particle's identity is its index. Both arrays keep the length they were created with.
#[derive(Debug, Clone)]
pub struct ParticleStore {
    positions: Vec<[f32; 3]>,
    velocities: Vec<[f32; 3]>,
    half_extent: f32,
    frozen: bool,
}

impl ParticleStore {
    /// Create a store from explicit positions and velocities inside a cube of edge `range`.
    ///
    /// # Panics
    ///
    /// Panics if the two arrays differ in length.
    pub fn new(positions: Vec<[f32; 3]>, velocities: Vec<[f32; 3]>, range: f32) -> Self {
        assert_eq!(
            positions.len(),
            velocities.len(),
            "every particle needs exactly one velocity"
        );

        Self {
            positions,
            velocities,
            half_extent: range * 0.5,
            frozen: false,
        }
    }

    /// Scatter `count` particles uniformly through the cube, each velocity component drawn
    /// uniformly from `±velocity_range / 2`.
    pub fn random<R: Rng + ?Sized>(
        count: usize,
        range: f32,
        velocity_range: f32,
        rng: &mut R,
    ) -> Self {
        let mut positions = Vec::with_capacity(count);
        let mut velocities = Vec::with_capacity(count);

        for _ in 0..count {
            positions.push([
                (rng.random::<f32>() - 0.5) * range,
                (rng.random::<f32>() - 0.5) * range,
                (rng.random::<f32>() - 0.5) * range,
            ]);
            velocities.push([
                (rng.random::<f32>() - 0.5) * velocity_range,
                (rng.random::<f32>() - 0.5) * velocity_range,
                (rng.random::<f32>() - 0.5) * velocity_range,
            ]);
        }

        Self::new(positions, velocities, range)
    }

    /// Freeze or unfreeze positions. A frozen store still reflects velocities at the walls
    /// but never moves.
    pub fn set_frozen(&mut self, frozen: bool) {
        self.frozen = frozen;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Advance every particle by `velocity * dt`, then bounce off the domain walls.
    ///
    /// `dt` is a normalized multiplier of the reference frame interval. Positions are not
    /// corrected after crossing a wall; the velocity component is pointed back inward so the
    /// next step returns the particle into the domain.
    pub fn integrate(&mut self, dt: f32) {
        let half = self.half_extent;

        for (position, velocity) in self.positions.iter_mut().zip(self.velocities.iter_mut()) {
            if !self.frozen {
                let p = Vec3::from_array(*position) + Vec3::from_array(*velocity) * dt;
                *position = p.to_array();
            }

            for axis in 0..3 {
                if position[axis] > half && velocity[axis] > 0.0 {
                    velocity[axis] = -velocity[axis];
                } else if position[axis] < -half && velocity[axis] < 0.0 {
                    velocity[axis] = -velocity[axis];
                }
            }
        }
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn velocities(&self) -> &[[f32; 3]] {
        &self.velocities
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn half_extent(&self) -> f32 {
        self.half_extent
    }

    /// Largest per-axis speed in the store
    pub fn max_axis_speed(&self) -> f32 {
        self.velocities
            .iter()
            .flat_map(|v| v.iter())
            .fold(0.0_f32, |acc, c| acc.max(c.abs()))
    }
}

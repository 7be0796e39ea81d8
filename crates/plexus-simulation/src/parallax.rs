//! Pointer-driven camera parallax

use glam::Vec2;

/// Convert a pointer position in pixels to normalized device coordinates,
/// `x` right and `y` up, both in `[-1, 1]`.
pub fn pointer_to_ndc(x: f64, y: f64, width: u32, height: u32) -> Vec2 {
    let w = width.max(1) as f64;
    let h = height.max(1) as f64;
    let ndc_x = (x / w) * 2.0 - 1.0;
    let ndc_y = -(y / h) * 2.0 + 1.0;
    Vec2::new(ndc_x as f32, ndc_y as f32).clamp(Vec2::NEG_ONE, Vec2::ONE)
}

/// Steers the camera's XY offset toward `pointer * gain` by exponential smoothing.
///
/// The pointer sample is overwritten by every pointer event; only the latest one is used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParallaxController {
    pointer: Vec2,
    gain: Vec2,
    smoothing: f32,
    offset: Vec2,
}

impl ParallaxController {
    pub fn new(gain: [f32; 2], smoothing: f32) -> Self {
        Self {
            pointer: Vec2::ZERO,
            gain: Vec2::from_array(gain),
            smoothing,
            offset: Vec2::ZERO,
        }
    }

    /// Record the latest pointer sample (normalized, clamped to `[-1, 1]`)
    pub fn set_pointer(&mut self, ndc: Vec2) {
        self.pointer = ndc.clamp(Vec2::NEG_ONE, Vec2::ONE);
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub fn target(&self) -> Vec2 {
        self.pointer * self.gain
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Move the offset a `smoothing * dt` fraction of the way to the target.
    ///
    /// The fraction is capped at 1 so a large `dt` lands on the target instead of
    /// overshooting it.
    pub fn update(&mut self, dt: f32) -> Vec2 {
        let rate = (self.smoothing * dt).clamp(0.0, 1.0);
        self.offset += (self.target() - self.offset) * rate;
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_to_ndc() {
        assert_eq!(pointer_to_ndc(0.0, 0.0, 800, 600), Vec2::new(-1.0, 1.0));
        assert_eq!(pointer_to_ndc(800.0, 600.0, 800, 600), Vec2::new(1.0, -1.0));
        assert_eq!(pointer_to_ndc(400.0, 300.0, 800, 600), Vec2::ZERO);
        // Outside the window clamps
        assert_eq!(pointer_to_ndc(-50.0, 900.0, 800, 600), Vec2::new(-1.0, -1.0));
    }

    #[test]
    fn test_target_uses_per_axis_gain() {
        let mut parallax = ParallaxController::new([2.0, 1.5], 0.05);
        parallax.set_pointer(Vec2::new(1.0, -1.0));

        assert_eq!(parallax.target(), Vec2::new(2.0, -1.5));
    }

    #[test]
    fn test_converges_without_overshoot() {
        let mut parallax = ParallaxController::new([2.0, 1.5], 0.05);
        parallax.set_pointer(Vec2::new(1.0, 1.0));

        let mut previous = parallax.offset();
        for _ in 0..500 {
            let offset = parallax.update(1.0);
            assert!(offset.x >= previous.x && offset.x <= 2.0);
            assert!(offset.y >= previous.y && offset.y <= 1.5);
            previous = offset;
        }
        assert!((previous - Vec2::new(2.0, 1.5)).length() < 1e-3);
    }

    #[test]
    fn test_latest_pointer_sample_wins() {
        let mut parallax = ParallaxController::new([2.0, 1.5], 0.05);
        parallax.set_pointer(Vec2::new(1.0, 1.0));
        parallax.set_pointer(Vec2::new(-0.5, 0.0));

        assert_eq!(parallax.pointer(), Vec2::new(-0.5, 0.0));
        assert_eq!(parallax.target(), Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_zero_dt_holds_position() {
        let mut parallax = ParallaxController::new([2.0, 1.5], 0.05);
        parallax.set_pointer(Vec2::new(1.0, 1.0));

        assert_eq!(parallax.update(0.0), Vec2::ZERO);
    }

    #[test]
    fn test_huge_dt_lands_on_target() {
        let mut parallax = ParallaxController::new([2.0, 1.5], 0.5);
        parallax.set_pointer(Vec2::new(0.5, 0.5));

        assert_eq!(parallax.update(100.0), Vec2::new(1.0, 0.75));
    }
}

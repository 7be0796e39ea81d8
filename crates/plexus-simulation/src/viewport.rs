//! Output size and pixel density

/// Window size in physical pixels plus the host's scale factor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub scale_factor: f64,
    /// Pixel density is capped at this ratio
    pub max_pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32, scale_factor: f64, max_pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            scale_factor,
            max_pixel_ratio,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }

    /// `min(scale_factor, max_pixel_ratio)`
    pub fn pixel_ratio(&self) -> f64 {
        self.scale_factor.min(self.max_pixel_ratio).max(f64::EPSILON)
    }

    /// Render target size: the logical size at the capped pixel ratio
    pub fn surface_size(&self) -> (u32, u32) {
        let scale = self.scale_factor.max(f64::EPSILON);
        let ratio = self.pixel_ratio() / scale;
        let width = (self.width as f64 * ratio).round() as u32;
        let height = (self.height as f64 * ratio).round() as u32;
        (width.max(1), height.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_size_below_cap() {
        let viewport = Viewport::new(1920, 1080, 1.0, 2.0);

        assert_eq!(viewport.surface_size(), (1920, 1080));
        assert!((viewport.aspect() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_surface_size_is_capped() {
        // 1280x720 logical at 3x
        let viewport = Viewport::new(3840, 2160, 3.0, 2.0);

        assert_eq!(viewport.pixel_ratio(), 2.0);
        assert_eq!(viewport.surface_size(), (2560, 1440));
    }

    #[test]
    fn test_empty_viewport() {
        let viewport = Viewport::new(0, 0, 1.0, 2.0);

        assert!(viewport.is_empty());
        assert_eq!(viewport.aspect(), 1.0);
        assert_eq!(viewport.surface_size(), (1, 1));
    }
}

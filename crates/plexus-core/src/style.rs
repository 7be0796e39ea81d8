//! Render style shared between the simulation parameters and the renderer

use crate::color::hex_to_linear;
use crate::constants::*;

/// How fragments combine with what is already on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// `src * alpha + dst`, glowing overlaps
    Additive,
    /// Regular `src * alpha + dst * (1 - alpha)`
    Alpha,
}

/// Exponential-squared fog
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    /// Linear RGB
    pub color: [f32; 3],
    pub density: f32,
}

impl Fog {
    /// Fraction of fog colour at a given view depth
    pub fn factor(&self, depth: f32) -> f32 {
        let d = self.density * depth;
        1.0 - (-d * d).exp()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    /// Linear RGB
    pub point_color: [f32; 3],
    pub point_size: f32,
    pub point_opacity: f32,
    pub line_opacity: f32,
    pub fog: Option<Fog>,
    /// Clear colour, linear RGB
    pub background: [f32; 3],
    pub blend: BlendMode,
    pub max_pixel_ratio: f64,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            point_color: hex_to_linear(POINT_COLOR),
            point_size: POINT_SIZE,
            point_opacity: POINT_OPACITY,
            line_opacity: LINE_OPACITY,
            fog: Some(Fog {
                color: hex_to_linear(FOG_COLOR),
                density: FOG_DENSITY,
            }),
            background: hex_to_linear(FOG_COLOR),
            blend: BlendMode::Additive,
            max_pixel_ratio: MAX_PIXEL_RATIO,
        }
    }
}

impl RenderStyle {
    /// The plainer look: no fog and ordinary alpha blending.
    pub fn legacy() -> Self {
        Self {
            fog: None,
            blend: BlendMode::Alpha,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fog_factor_grows_with_depth() {
        let fog = Fog {
            color: [0.0; 3],
            density: 0.04,
        };

        assert_eq!(fog.factor(0.0), 0.0);
        assert!(fog.factor(10.0) < fog.factor(20.0));
        assert!(fog.factor(1000.0) <= 1.0);
    }

    #[test]
    fn test_legacy_drops_fog() {
        let legacy = RenderStyle::legacy();

        assert!(legacy.fog.is_none());
        assert_eq!(legacy.blend, BlendMode::Alpha);
        assert_eq!(legacy.point_size, RenderStyle::default().point_size);
    }
}

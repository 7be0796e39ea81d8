//! Colour helpers

/// Convert one 8-bit sRGB channel to linear.
pub fn srgb_to_linear(channel: u8) -> f32 {
    let c = channel as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Convert a `0xRRGGBB` sRGB colour to linear RGB.
pub fn hex_to_linear(hex: u32) -> [f32; 3] {
    [
        srgb_to_linear(((hex >> 16) & 0xff) as u8),
        srgb_to_linear(((hex >> 8) & 0xff) as u8),
        srgb_to_linear((hex & 0xff) as u8),
    ]
}

/// Distance-to-colour mapping for proximity edges.
///
/// `t = 1 - distance / max_dist` and each channel is `base + gain * t`, so the colour sits at
/// `base` on the threshold and moves toward `base + gain` as the particles coincide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeColorRamp {
    pub base: [f32; 3],
    pub gain: [f32; 3],
}

impl EdgeColorRamp {
    pub const fn new(base: [f32; 3], gain: [f32; 3]) -> Self {
        Self { base, gain }
    }

    /// Blend factor for a distance, clamped to `[0, 1]`.
    pub fn t_for_distance(distance: f32, max_dist: f32) -> f32 {
        (1.0 - distance / max_dist).clamp(0.0, 1.0)
    }

    pub fn color_for_distance(&self, distance: f32, max_dist: f32) -> [f32; 3] {
        let t = Self::t_for_distance(distance, max_dist);
        [
            self.base[0] + self.gain[0] * t,
            self.base[1] + self.gain[1] * t,
            self.base[2] + self.gain[2] * t,
        ]
    }
}

impl Default for EdgeColorRamp {
    fn default() -> Self {
        Self::new(
            crate::constants::EDGE_BASE_COLOR,
            crate::constants::EDGE_COLOR_GAIN,
        )
    }
}

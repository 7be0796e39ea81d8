//! Camera and scene uniform

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use plexus_core::{RenderStyle, CAMERA_DISTANCE, CAMERA_FAR, CAMERA_FOV_DEGREES, CAMERA_NEAR};

/// Scene uniform for GPU (matches `Scene` in network.wgsl)
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    // x: point_size, y: aspect, z: viewport height in pixels, w: line opacity
    pub sizing: [f32; 4],
    // xyz: point colour (linear), w: point opacity
    pub point_style: [f32; 4],
    // xyz: fog colour (linear), w: fog density (0 disables fog)
    pub fog: [f32; 4],
}

/// Perspective camera looking down -Z. Parallax moves `position`; the scene itself spins
/// about Y through `rotation_y`.
pub struct Camera {
    pub position: Vec3,
    pub rotation_y: f32,
    pub aspect: f32,
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, CAMERA_DISTANCE),
            rotation_y: 0.0,
            aspect: width.max(1) as f32 / height.max(1) as f32,
            fovy: CAMERA_FOV_DEGREES.to_radians(),
            znear: CAMERA_NEAR,
            zfar: CAMERA_FAR,
        }
    }

    pub fn build_view_matrix(&self) -> Mat4 {
        Mat4::from_translation(-self.position)
    }

    pub fn build_projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn build_view_projection_matrix(&self) -> Mat4 {
        self.build_projection_matrix() * self.build_view_matrix()
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_y(self.rotation_y)
    }

    pub fn to_uniform(&self, style: &RenderStyle, viewport_height: u32) -> SceneUniform {
        let (fog_color, fog_density) = match style.fog {
            Some(fog) => (fog.color, fog.density),
            None => (style.background, 0.0),
        };

        SceneUniform {
            view_proj: self.build_view_projection_matrix().to_cols_array_2d(),
            view: self.build_view_matrix().to_cols_array_2d(),
            model: self.model_matrix().to_cols_array_2d(),
            sizing: [
                style.point_size,
                self.aspect,
                viewport_height.max(1) as f32,
                style.line_opacity,
            ],
            point_style: [
                style.point_color[0],
                style.point_color[1],
                style.point_color[2],
                style.point_opacity,
            ],
            fog: [fog_color[0], fog_color[1], fog_color[2], fog_density],
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_uniform_size_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<SceneUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<SceneUniform>(), 240);
    }

    #[test]
    fn test_origin_projects_to_screen_center() {
        let camera = Camera::new(1920, 1080);
        let clip = camera.build_view_projection_matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip / clip.w;

        assert!(ndc.x.abs() < 1e-6 && ndc.y.abs() < 1e-6);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_parallax_shifts_view() {
        let mut camera = Camera::new(800, 800);
        camera.position.x = 2.0;
        let clip = camera.build_view_projection_matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0);

        // Moving the camera right pushes the origin left on screen.
        assert!(clip.x / clip.w < 0.0);
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut camera = Camera::new(800, 600);
        camera.resize(1000, 500);

        assert_eq!(camera.aspect, 2.0);
    }

    #[test]
    fn test_uniform_without_fog_has_zero_density() {
        let camera = Camera::new(800, 600);
        let uniform = camera.to_uniform(&RenderStyle::legacy(), 600);

        assert_eq!(uniform.fog[3], 0.0);
        assert_eq!(uniform.sizing[2], 600.0);

        let fogged = camera.to_uniform(&RenderStyle::default(), 600);
        assert!(fogged.fog[3] > 0.0);
    }
}

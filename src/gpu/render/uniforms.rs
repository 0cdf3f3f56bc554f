use bytemuck::{Pod, Zeroable};
use ultraviolet::Mat4;

use crate::gpu::scene::Camera;

/// Данные камеры для шейдеров
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub _pad0: f32,
    /// Направление взгляда: глубина для выбора каскада
    pub camera_dir: [f32; 3],
    pub _pad1: f32,
}

impl FrameUniforms {
    pub fn new() -> Self {
        Self {
            view_proj: Mat4::identity().into(),
            camera_pos: [0.0; 3],
            _pad0: 0.0,
            camera_dir: [0.0, 0.0, 1.0],
            _pad1: 0.0,
        }
    }

    pub fn update(&mut self, camera: &Camera) {
        self.view_proj = camera.view_projection_matrix().into();
        self.camera_pos = camera.position.into();
        self.camera_dir = camera.direction().into();
    }
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================
// Scene Module - Камера, меши, модели
// ============================================

mod camera;
mod mesh;
mod model;

pub use camera::{Camera, CameraController};
pub use mesh::{GpuMesh, MeshData, Vertex};
pub use model::{scene_bounds, AnimatedOverlay, ModelInstance, ModelUniform, Renderable, Scene};

// ============================================
// Resources - Общие ресурсы приложения
// ============================================

use std::sync::Arc;
use winit::window::Window;

use crate::gpu::core::{FrameClock, RendererConfig};
use crate::gpu::render::Renderer;
use crate::gpu::scene::{Camera, CameraController};

/// Все ресурсы приложения в одном месте
pub struct AppResources {
    // Window & Rendering
    pub window: Option<Arc<Window>>,
    pub renderer: Option<Renderer>,

    // Camera
    pub camera: Camera,
    pub controller: CameraController,

    // Settings
    pub config: RendererConfig,

    // Timing
    pub clock: FrameClock,

    // Input state
    pub cursor_grabbed: bool,
}

// ============================================
// Render System - Система рендеринга
// ============================================

use winit::event_loop::ActiveEventLoop;

use crate::gpu::core::AppResources;

/// Система рендеринга
pub struct RenderSystem;

impl RenderSystem {
    /// Основной рендер-пасс
    pub fn render(resources: &mut AppResources, elapsed_micros: u64, event_loop: &ActiveEventLoop) {
        let Some(renderer) = &mut resources.renderer else { return };

        renderer.update(&resources.camera, elapsed_micros);

        match renderer.render() {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost) => {
                log::warn!("Surface lost, reconfiguring");
                renderer.resize(renderer.size());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }
    }
}

// ============================================
// Init System - Инициализация приложения
// ============================================

use std::sync::Arc;
use winit::window::Window;

use crate::gpu::core::{AppResources, FrameClock, RendererConfig, Result};
use crate::gpu::render::Renderer;
use crate::gpu::scene::{Camera, CameraController};

const CAMERA_SPEED: f32 = 40.0;
const MOUSE_SENSITIVITY: f32 = 0.003;

/// Система инициализации
pub struct InitSystem;

impl InitSystem {
    /// Создать начальные ресурсы
    pub fn create_resources(config: RendererConfig) -> AppResources {
        let window = &config.window;
        let aspect = window.width as f32 / window.height.max(1) as f32;
        let camera = Camera::new(
            aspect,
            config.shadows.projection_near,
            config.shadows.projection_far,
        );

        AppResources {
            window: None,
            renderer: None,
            camera,
            controller: CameraController::new(CAMERA_SPEED, MOUSE_SENSITIVITY),
            config,
            clock: FrameClock::new(),
            cursor_grabbed: false,
        }
    }

    /// Инициализация рендеринга (вызывается при resumed)
    pub fn init_rendering(resources: &mut AppResources, window: Arc<Window>) -> Result<()> {
        let renderer = pollster::block_on(Renderer::new(window.clone(), &resources.config))?;

        resources.camera.resize(renderer.size().width, renderer.size().height);
        resources.window = Some(window);
        resources.renderer = Some(renderer);
        // Отсчёт анимации начинается с первого кадра
        resources.clock = FrameClock::new();
        Ok(())
    }
}

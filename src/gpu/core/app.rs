// ============================================
// App - Главный обработчик приложения
// ============================================

use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use crate::gpu::core::{AppResources, RendererConfig, CONFIG_FILE};
use crate::gpu::systems::{InitSystem, InputAction, InputSystem, RenderSystem, UpdateSystem};

/// Главное приложение
pub struct App {
    resources: AppResources,
}

impl App {
    pub fn new(config: RendererConfig) -> Self {
        Self {
            resources: InitSystem::create_resources(config),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.resources.window.is_some() {
            return;
        }

        let settings = &self.resources.config.window;
        let window_attrs = Window::default_attributes()
            .with_title(settings.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(settings.width, settings.height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        if let Err(e) = InitSystem::init_rendering(&mut self.resources, window) {
            log::error!("Renderer setup failed: {}", e);
            event_loop.exit();
            return;
        }

        // Захватываем курсор при старте
        InputSystem::grab_cursor(&mut self.resources, true);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.resources.renderer {
                    renderer.resize(physical_size);
                    self.resources.camera.resize(physical_size.width, physical_size.height);
                }
            }

            WindowEvent::KeyboardInput {
                event: KeyEvent {
                    physical_key: PhysicalKey::Code(keycode),
                    state,
                    ..
                },
                ..
            } => {
                if let Some(action) = InputSystem::process_keyboard(&mut self.resources, keycode, state) {
                    match action {
                        InputAction::ShadowSettingsChanged => {
                            let settings = self.resources.config.shadows.clone();
                            if let Some(renderer) = &mut self.resources.renderer {
                                renderer.set_shadow_settings(settings);
                            }
                        }
                        InputAction::SaveConfig => {
                            if let Err(e) = self.resources.config.save(CONFIG_FILE) {
                                log::warn!("Failed to save {}: {}", CONFIG_FILE, e);
                            } else {
                                log::info!("Saved {}", CONFIG_FILE);
                            }
                        }
                        InputAction::CursorToggle => {}
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                // Update
                let elapsed_micros = UpdateSystem::update(&mut self.resources);

                // Render
                RenderSystem::render(&mut self.resources, elapsed_micros, event_loop);

                if let Some(window) = &self.resources.window {
                    window.request_redraw();
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if state == ElementState::Pressed
                    && button == MouseButton::Left
                    && !self.resources.cursor_grabbed
                {
                    InputSystem::grab_cursor(&mut self.resources, true);
                }
            }

            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            InputSystem::process_mouse_motion(&mut self.resources, delta);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.resources.window {
            window.request_redraw();
        }
    }
}

/// Запуск приложения
pub fn run() {
    env_logger::init();

    let config = match RendererConfig::load(CONFIG_FILE) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to read {}: {}", CONFIG_FILE, e);
            return;
        }
    };

    log::info!("=== Controls ===");
    log::info!("WASD / arrows - Move");
    log::info!("Mouse - Look around");
    log::info!("P - Toggle cascaded shadows (PSSM)");
    log::info!("C - Toggle PCF filtering");
    log::info!("K - Show cascade splits");
    log::info!("[ / ] - Depth bias down/up");
    log::info!("; / ' - Slope-scaled bias down/up");
    log::info!("F6 - Save settings");
    log::info!("Escape - Release cursor");

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {}", e);
            return;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", e);
    }
}

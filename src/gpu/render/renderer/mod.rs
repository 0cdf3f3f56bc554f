pub mod core;
mod passes;
mod systems;

use std::sync::Arc;

use crate::gpu::animation::AnimatedTexture;
use crate::gpu::core::{RendererConfig, Result, ShadowSettings};
use crate::gpu::lighting::DepthBias;
use crate::gpu::render::depth::create_depth_texture;
use crate::gpu::scene::{Camera, Scene};

use self::core::{LightingResources, RenderComponents, RendererState};

pub struct Renderer {
    state: RendererState,
    components: RenderComponents,
    lighting: LightingResources,
    animated: AnimatedTexture,
    scene: Scene,
}

impl Renderer {
    pub async fn new(window: Arc<winit::window::Window>, config: &RendererConfig) -> Result<Self> {
        let (surface, device, queue, surface_config, size) = core::init_gpu(window).await?;
        let (components, lighting, animated, scene) =
            core::init_components(&device, &queue, &surface_config, config)?;

        log::info!(
            "Renderer ready: {}x{}, shadow map {}, {} animated layer(s)",
            size.width,
            size.height,
            lighting.shadows.resolution(),
            animated.layer_count()
        );

        Ok(Self {
            state: RendererState {
                surface,
                device,
                queue,
                config: surface_config,
                size,
            },
            components,
            lighting,
            animated,
            scene,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.state.size = new_size;
            self.state.config.width = new_size.width;
            self.state.config.height = new_size.height;
            self.state.surface.configure(&self.state.device, &self.state.config);
            self.components.depth_texture = create_depth_texture(&self.state.device, &self.state.config);
        }
    }

    /// Обновить uniform-ы, каскады и шаги поля. elapsed_micros - время с прошлого кадра
    pub fn update(&mut self, camera: &Camera, elapsed_micros: u64) {
        systems::frame::update(
            &self.state.queue,
            camera,
            elapsed_micros,
            &mut self.components,
            &mut self.lighting,
            &mut self.animated,
            &self.scene,
        );
    }

    pub fn render(&mut self) -> std::result::Result<(), wgpu::SurfaceError> {
        let output = self.state.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.state.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        // Advection pass
        self.animated.encode(&mut encoder);

        // Shadow pass
        passes::shadow::render(&mut encoder, &self.lighting.shadows, &self.scene);

        // Main 3D pass
        passes::main_pass::render(
            &mut encoder,
            &view,
            &self.components,
            &self.lighting.shadows,
            &self.animated,
            &self.scene,
        );

        self.state.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        // Адвекция отправлена: только теперь шаги и swap
        self.animated.commit();
        Ok(())
    }

    /// Применить новые настройки теней (bias пересоздаёт pipeline)
    pub fn set_shadow_settings(&mut self, settings: ShadowSettings) {
        self.lighting
            .shadows
            .set_bias(&self.state.device, DepthBias::from_settings(&settings));
        self.lighting.settings = settings;
    }

    pub fn shadow_settings(&self) -> &ShadowSettings {
        &self.lighting.settings
    }

    pub fn size(&self) -> winit::dpi::PhysicalSize<u32> {
        self.state.size
    }
}

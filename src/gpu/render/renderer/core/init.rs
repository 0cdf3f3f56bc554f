use std::sync::Arc;

use crate::gpu::animation::{AnimatedTexture, FieldInterpolation, LayerId, VectorField};
use crate::gpu::core::{RenderError, RendererConfig, Result};
use crate::gpu::lighting::{CascadedShadowMaps, DirectionalLight};
use crate::gpu::render::bind_groups::{BindGroupLayouts, FrameBindGroups};
use crate::gpu::render::depth::create_depth_texture;
use crate::gpu::render::pipelines::Pipelines;
use crate::gpu::render::uniforms::FrameUniforms;
use crate::gpu::scene::Scene;

use super::state::{LightingResources, RenderComponents};

/// Инициализация GPU устройства и surface
pub async fn init_gpu(window: Arc<winit::window::Window>) -> Result<(
    wgpu::Surface<'static>,
    Arc<wgpu::Device>,
    Arc<wgpu::Queue>,
    wgpu::SurfaceConfiguration,
    winit::dpi::PhysicalSize<u32>,
)> {
    let size = window.inner_size();
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });

    let surface = instance.create_surface(window)?;
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await?;

    log::info!("Adapter: {}", adapter.get_info().name);

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("GPU Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: wgpu::Trace::Off,
        })
        .await?;

    let device = Arc::new(device);
    let queue = Arc::new(queue);

    let surface_caps = surface.get_capabilities(&adapter);
    let surface_format = surface_caps
        .formats
        .iter()
        .find(|f| f.is_srgb())
        .copied()
        .unwrap_or(surface_caps.formats[0]);

    let config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: surface_format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode: wgpu::PresentMode::AutoVsync,
        alpha_mode: surface_caps.alpha_modes[0],
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };
    surface.configure(&device, &config);

    Ok((surface, device, queue, config, size))
}

/// Загрузка ассетов анимированной текстуры: картинка слоя и векторные поля
fn init_animation(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    config: &RendererConfig,
) -> Result<AnimatedTexture> {
    let settings = &config.animation;
    let mut animated = AnimatedTexture::new(device, queue, settings);

    let image_path = config.asset_path(&settings.layer_image);
    let image = image::open(&image_path)
        .map_err(|e| {
            log::error!("Failed to load layer image {:?}: {}", image_path, e);
            e
        })?
        .to_rgba8();
    let layer = animated.add_layer(device, queue, &image);

    for desc in &settings.fields {
        let path = config.asset_path(&desc.path);
        let field = VectorField::load(&path).map_err(|e| {
            log::error!("Failed to load vector field {:?}: {}", path, e);
            e
        })?;
        animated
            .add_field(
                device,
                queue,
                layer,
                &field,
                desc.steps,
                FieldInterpolation::from_index(desc.interpolation),
            )
            .map_err(RenderError::from)?;
    }

    Ok(animated)
}

/// Инициализация всех компонентов рендеринга
pub fn init_components(
    device: &Arc<wgpu::Device>,
    queue: &Arc<wgpu::Queue>,
    surface_config: &wgpu::SurfaceConfiguration,
    config: &RendererConfig,
) -> Result<(RenderComponents, LightingResources, AnimatedTexture, Scene)> {
    let depth_texture = create_depth_texture(device, surface_config);

    let layouts = BindGroupLayouts::new(device);
    let light = DirectionalLight::from_settings(&config.light);
    let frame = FrameBindGroups::new(device, &layouts, light.to_uniform());

    let animated = init_animation(device, queue, config)?;
    let overlay_layer = (animated.layer_count() > 0).then_some(LayerId(0));

    let shadows = CascadedShadowMaps::new(device, &config.shadows, &layouts.model);
    let pipelines = Pipelines::new(
        device,
        surface_config.format,
        &layouts,
        shadows.bind_group_layout(),
        animated.overlay_layout(),
    );

    let scene = Scene::new(device, &layouts.model, config, overlay_layer);

    let components = RenderComponents {
        pipelines,
        layouts,
        frame,
        uniforms: FrameUniforms::new(),
        depth_texture,
    };
    let lighting = LightingResources {
        light,
        shadows,
        settings: config.shadows.clone(),
    };

    Ok((components, lighting, animated, scene))
}

use std::sync::Arc;

use crate::gpu::core::ShadowSettings;
use crate::gpu::lighting::{CascadedShadowMaps, DirectionalLight};
use crate::gpu::render::bind_groups::{BindGroupLayouts, FrameBindGroups};
use crate::gpu::render::pipelines::Pipelines;
use crate::gpu::render::uniforms::FrameUniforms;

/// Основное состояние рендерера (GPU ресурсы)
pub struct RendererState {
    pub surface: wgpu::Surface<'static>,
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
}

/// Компоненты рендеринга
pub struct RenderComponents {
    pub pipelines: Pipelines,
    pub layouts: BindGroupLayouts,
    pub frame: FrameBindGroups,
    pub uniforms: FrameUniforms,
    pub depth_texture: wgpu::TextureView,
}

/// Ресурсы освещения и теней
pub struct LightingResources {
    pub light: DirectionalLight,
    pub shadows: CascadedShadowMaps,
    /// Источник near/split каскадов на каждый кадр
    pub settings: ShadowSettings,
}

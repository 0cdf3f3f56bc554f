// ============================================
// Cascaded Shadow Maps - GPU сторона теней
// ============================================
// Каскады PSSM или одна простая карта (слой 0 массива).
// Смена bias пересоздаёт pipeline глубины.

use wgpu::util::DeviceExt;

use super::shadow_map::{ShadowFrame, ShadowMapArray, ShadowUniform};
use crate::gpu::core::{ShadowSettings, CASCADE_COUNT};
use crate::gpu::scene::Vertex;

/// Uniform для shadow pass (одна матрица)
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShadowPassUniform {
    pub light_view_proj: [[f32; 4]; 4],
}

/// Константный и наклонный bias глубины
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthBias {
    pub constant: i32,
    pub slope_scale: f32,
}

impl DepthBias {
    pub fn from_settings(settings: &ShadowSettings) -> Self {
        Self {
            constant: settings.depth_bias,
            slope_scale: settings.slope_scaled_depth_bias,
        }
    }
}

pub struct CascadedShadowMaps {
    shadow_maps: ShadowMapArray,
    uniform_buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    pass_buffers: Vec<wgpu::Buffer>,
    pass_bind_groups: Vec<wgpu::BindGroup>,
    pipeline_layout: wgpu::PipelineLayout,
    shader: wgpu::ShaderModule,
    pipeline: wgpu::RenderPipeline,
    bias: DepthBias,
    /// Сколько слоёв рисовать в текущем кадре
    active_layers: usize,
}

impl CascadedShadowMaps {
    pub fn new(
        device: &wgpu::Device,
        settings: &ShadowSettings,
        model_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let shadow_maps = ShadowMapArray::new(device, settings.resolution, CASCADE_COUNT as u32);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Shadow Uniform Buffer"),
            size: std::mem::size_of::<ShadowUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Bind group layout для сэмплирования теней
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow Bind Group Layout"),
            entries: &[
                // Shadow map array
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2Array,
                        multisampled: false,
                    },
                    count: None,
                },
                // Comparison sampler
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
                // Shadow uniforms
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&shadow_maps.array_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&shadow_maps.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniform_buffer.as_entire_binding(),
                },
            ],
        });

        let pass_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow Pass Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pass_buffers: Vec<_> = (0..CASCADE_COUNT)
            .map(|i| {
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("Shadow Pass {}", i)),
                    contents: bytemuck::cast_slice(&[[[0.0f32; 4]; 4]]),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                })
            })
            .collect();

        let pass_bind_groups: Vec<_> = pass_buffers
            .iter()
            .enumerate()
            .map(|(i, buf)| {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("Shadow Pass BG {}", i)),
                    layout: &pass_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buf.as_entire_binding(),
                    }],
                })
            })
            .collect();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shadow Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shadow.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shadow PL Layout"),
            bind_group_layouts: &[&pass_layout, model_layout],
            push_constant_ranges: &[],
        });

        let bias = DepthBias::from_settings(settings);
        let pipeline = Self::create_pipeline(device, &pipeline_layout, &shader, bias);

        log::info!(
            "Shadows: {} layers @ {}x{}, bias {}/{:.3}",
            CASCADE_COUNT,
            settings.resolution,
            settings.resolution,
            bias.constant,
            bias.slope_scale
        );

        Self {
            shadow_maps,
            uniform_buffer,
            bind_group_layout,
            bind_group,
            pass_buffers,
            pass_bind_groups,
            pipeline_layout,
            shader,
            pipeline,
            bias,
            active_layers: 1,
        }
    }

    /// Pipeline глубины (только vertex shader)
    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        bias: DepthBias,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shadow Pipeline"),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                // Вид света левосторонний: грани рисуем с обеих сторон
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: wgpu::DepthBiasState {
                    constant: bias.constant,
                    slope_scale: bias.slope_scale,
                    clamp: 0.0,
                },
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        })
    }

    /// Пересоздать pipeline, если bias изменился
    pub fn set_bias(&mut self, device: &wgpu::Device, bias: DepthBias) {
        if bias == self.bias {
            return;
        }
        self.pipeline = Self::create_pipeline(device, &self.pipeline_layout, &self.shader, bias);
        self.bias = bias;
        log::debug!("Shadow pipeline rebuilt: bias {}/{:.3}", bias.constant, bias.slope_scale);
    }

    /// Загрузить матрицы кадра на GPU
    pub fn update(&mut self, queue: &wgpu::Queue, frame: &ShadowFrame, settings: &ShadowSettings) {
        let matrices = frame.pass_matrices();
        self.active_layers = frame.layer_count();
        for (buffer, matrix) in self.pass_buffers.iter().zip(matrices.iter()).take(self.active_layers) {
            let uniform = ShadowPassUniform {
                light_view_proj: (*matrix).into(),
            };
            queue.write_buffer(buffer, 0, bytemuck::cast_slice(&[uniform]));
        }

        let uniform = ShadowUniform::new(frame, settings);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    /// (view слоя, bind group матрицы) для каждого рисуемого слоя
    pub fn active_passes(&self) -> impl Iterator<Item = (&wgpu::TextureView, &wgpu::BindGroup)> {
        self.shadow_maps
            .layer_views
            .iter()
            .zip(self.pass_bind_groups.iter())
            .take(self.active_layers)
    }

    pub fn resolution(&self) -> u32 {
        self.shadow_maps.resolution
    }
}

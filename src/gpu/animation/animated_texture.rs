// ============================================
// Animated Texture - Адвекция слоёв на GPU
// ============================================
// Каждый кадр: движок считает шаги и вес, проход адвекции
// пишет source -> target со сдвигом вдоль поля, модели
// сэмплируют target с досдвигом на вес смешивания.

use bytemuck::{Pod, Zeroable};
use image::RgbaImage;
use wgpu::util::DeviceExt;

use super::engine::{FieldAdvectionEngine, FrameAdvance, LayerId};
use super::field_swapper::FieldInterpolation;
use super::ping_pong::Slot;
use super::vector_field::VectorField;
use crate::gpu::core::{AnimationSettings, FieldError};

const LAYER_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const FIELD_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

/// Один буфер пары (render target слоя)
pub struct LayerTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

/// Векторное поле в текстуре RGBA32F
pub struct FieldTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

/// Uniform прохода адвекции
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct AdvectUniform {
    pub step_count: u32,
    pub interpolation: u32,
    /// Сдвиг за шаг в текселях
    pub scale: f32,
    /// Ширина слоя
    pub width: f32,
}

/// Uniform досдвига при выборке в основном проходе
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct InterpolateUniform {
    pub blend: f32,
    pub width: f32,
    pub scale: f32,
    pub interpolation: u32,
}

/// Буферы и bind group-ы одного слоя
struct LayerBindings {
    advect_buffer: wgpu::Buffer,
    interpolate_buffer: wgpu::Buffer,
    /// [поле][слот источника]
    advect_groups: Vec<[wgpu::BindGroup; 2]>,
    /// [поле][слот приёмника]
    overlay_groups: Vec<[wgpu::BindGroup; 2]>,
}

pub struct AnimatedTexture {
    engine: FieldAdvectionEngine<LayerTarget, FieldTexture>,
    bindings: Vec<LayerBindings>,
    advect_layout: wgpu::BindGroupLayout,
    overlay_layout: wgpu::BindGroupLayout,
    pipeline: wgpu::RenderPipeline,
    layer_sampler: wgpu::Sampler,
    field_sampler: wgpu::Sampler,
    fallback_overlay: wgpu::BindGroup,
    size: u32,
    scale: f32,
    /// Кадр, ждущий отправки на GPU
    pending: Option<FrameAdvance>,
}

impl AnimatedTexture {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, settings: &AnimationSettings) -> Self {
        let texture_entry = |binding: u32, filterable: bool, visibility: wgpu::ShaderStages| {
            wgpu::BindGroupLayoutEntry {
                binding,
                visibility,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            }
        };
        let sampler_entry = |binding: u32, ty: wgpu::SamplerBindingType| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(ty),
            count: None,
        };
        let uniform_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        // Одинаковая раскладка для адвекции и для основного прохода
        let layout_entries = [
            texture_entry(0, true, wgpu::ShaderStages::FRAGMENT),
            sampler_entry(1, wgpu::SamplerBindingType::Filtering),
            texture_entry(2, false, wgpu::ShaderStages::FRAGMENT),
            sampler_entry(3, wgpu::SamplerBindingType::NonFiltering),
            uniform_entry(4),
        ];
        let advect_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Advect Layout"),
            entries: &layout_entries,
        });
        let overlay_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Overlay Layout"),
            entries: &layout_entries,
        });

        let layer_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Layer Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        // RGBA32F без фильтрации: point + wrap
        let field_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Field Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Advect Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("advect.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Advect PL Layout"),
            bind_group_layouts: &[&advect_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Advect Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: LAYER_FORMAT,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let fallback_overlay = Self::create_fallback(
            device,
            queue,
            &overlay_layout,
            &layer_sampler,
            &field_sampler,
        );

        Self {
            engine: FieldAdvectionEngine::new(settings.interval_micros()),
            bindings: Vec::new(),
            advect_layout,
            overlay_layout,
            pipeline,
            layer_sampler,
            field_sampler,
            fallback_overlay,
            size: settings.texture_size.max(1),
            scale: settings.advection_scale,
            pending: None,
        }
    }

    /// Заглушка 1x1 для моделей без анимации
    fn create_fallback(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        layer_sampler: &wgpu::Sampler,
        field_sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        let layer = create_texture(device, "Overlay Fallback", 1, 1, LAYER_FORMAT, false);
        upload(queue, &layer, 1, 1, &[255u8, 255, 255, 0], 4);
        let field = create_texture(device, "Field Fallback", 1, 1, FIELD_FORMAT, false);
        upload(queue, &field, 1, 1, bytemuck::cast_slice(&[[0.0f32; 4]]), 16);

        let uniform = InterpolateUniform {
            blend: 0.0,
            width: 1.0,
            scale: 0.0,
            interpolation: 0,
        };
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Overlay Fallback Uniform"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let layer_view = layer.create_view(&wgpu::TextureViewDescriptor::default());
        let field_view = field.create_view(&wgpu::TextureViewDescriptor::default());
        bind_group(
            device,
            "Overlay Fallback BG",
            layout,
            &layer_view,
            layer_sampler,
            &field_view,
            field_sampler,
            &buffer,
        )
    }

    /// Слой из картинки: картинка - источник, вторая текстура - приёмник
    pub fn add_layer(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, image: &RgbaImage) -> LayerId {
        let size = self.size;
        let pixels = if image.width() == size && image.height() == size {
            image.clone()
        } else {
            image::imageops::resize(image, size, size, image::imageops::FilterType::Triangle)
        };

        let index = self.bindings.len();
        let initial = create_texture(device, &format!("Layer {} A", index), size, size, LAYER_FORMAT, true);
        upload(queue, &initial, size, size, pixels.as_raw(), 4);
        let scratch = create_texture(device, &format!("Layer {} B", index), size, size, LAYER_FORMAT, true);

        let id = self.engine.add_layer(layer_target(initial), layer_target(scratch));

        let advect_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("Advect Uniform {}", index)),
            size: std::mem::size_of::<AdvectUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let interpolate_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("Interpolate Uniform {}", index)),
            size: std::mem::size_of::<InterpolateUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.bindings.push(LayerBindings {
            advect_buffer,
            interpolate_buffer,
            advect_groups: Vec::new(),
            overlay_groups: Vec::new(),
        });

        log::info!("Animated layer {}: {}x{}", index, size, size);
        id
    }

    /// Добавить векторное поле в расписание слоя
    pub fn add_field(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layer: LayerId,
        field: &VectorField,
        steps: u32,
        interpolation: FieldInterpolation,
    ) -> Result<usize, FieldError> {
        if steps == 0 {
            return Err(FieldError::ZeroSteps);
        }
        let buffers = &self
            .engine
            .layer(layer)
            .ok_or(FieldError::UnknownLayer(layer.0))?
            .buffers;
        let bindings = &self.bindings[layer.0];

        let (w, h) = (field.width(), field.height());
        let texture = create_texture(device, "Vector Field", w, h, FIELD_FORMAT, false);
        upload(queue, &texture, w, h, bytemuck::cast_slice(&field.to_rgba32f()), 16);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Адвекция читает source, основной проход - target
        let advect_groups = [Slot::A, Slot::B].map(|source| {
            bind_group(
                device,
                "Advect BG",
                &self.advect_layout,
                &buffers.slot(source).view,
                &self.layer_sampler,
                &view,
                &self.field_sampler,
                &bindings.advect_buffer,
            )
        });
        let overlay_groups = [Slot::A, Slot::B].map(|target| {
            bind_group(
                device,
                "Overlay BG",
                &self.overlay_layout,
                &buffers.slot(target).view,
                &self.layer_sampler,
                &view,
                &self.field_sampler,
                &bindings.interpolate_buffer,
            )
        });

        let resource = FieldTexture {
            texture,
            view,
            width: w,
            height: h,
        };
        let index = self.engine.add_field(layer, resource, steps, interpolation)?;
        let bindings = &mut self.bindings[layer.0];
        bindings.advect_groups.push(advect_groups);
        bindings.overlay_groups.push(overlay_groups);

        log::info!(
            "Layer {}: field {} ({}x{}, {} steps, {:?})",
            layer.0,
            index,
            w,
            h,
            steps,
            interpolation
        );
        Ok(index)
    }

    /// План кадра и загрузка uniform-ов. Состояние движка не меняется до commit
    pub fn advance(&mut self, queue: &wgpu::Queue, elapsed_micros: u64) -> FrameAdvance {
        let advance = self.engine.plan_frame(elapsed_micros);

        for (layer, bindings) in self.engine.layers().iter().zip(&self.bindings) {
            let interpolation = layer
                .fields
                .current()
                .map(|(slot, _)| slot.interpolation as u32)
                .unwrap_or(0);

            let advect = AdvectUniform {
                step_count: advance.step_count,
                interpolation,
                scale: self.scale,
                width: self.size as f32,
            };
            queue.write_buffer(&bindings.advect_buffer, 0, bytemuck::cast_slice(&[advect]));

            let interpolate = InterpolateUniform {
                blend: advance.blend_weight,
                width: self.size as f32,
                scale: self.scale,
                interpolation,
            };
            queue.write_buffer(&bindings.interpolate_buffer, 0, bytemuck::cast_slice(&[interpolate]));
        }

        self.pending = Some(advance);
        advance
    }

    /// Зафиксировать отправленный кадр: шаги полей и swap слоёв
    pub fn commit(&mut self) {
        if let Some(frame) = self.pending.take() {
            self.engine.commit_frame(&frame);
        }
    }

    /// Проход адвекции: source -> target каждого слоя
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder) {
        for (layer, bindings) in self.engine.layers().iter().zip(&self.bindings) {
            let source = layer.buffers.source_slot();
            let target = layer.buffers.target();

            let Some(cursor) = layer.fields.cursor() else {
                // Без поля слой просто копируется
                encoder.copy_texture_to_texture(
                    layer.buffers.source().texture.as_image_copy(),
                    target.texture.as_image_copy(),
                    target.texture.size(),
                );
                continue;
            };

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Advect Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bindings.advect_groups[cursor.slot][source.index()], &[]);
            pass.draw(0..3, 0..1);
        }
    }

    /// Bind group текстуры для модели (заглушка без слоя)
    pub fn overlay_bind_group(&self, layer: Option<LayerId>) -> &wgpu::BindGroup {
        layer
            .and_then(|id| {
                let entry = self.engine.layer(id)?;
                let cursor = entry.fields.cursor()?;
                let target = entry.buffers.target_slot();
                Some(&self.bindings[id.0].overlay_groups[cursor.slot][target.index()])
            })
            .unwrap_or(&self.fallback_overlay)
    }

    pub fn overlay_layout(&self) -> &wgpu::BindGroupLayout {
        &self.overlay_layout
    }

    pub fn layer_count(&self) -> usize {
        self.bindings.len()
    }
}

fn layer_target(texture: wgpu::Texture) -> LayerTarget {
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    LayerTarget { texture, view }
}

fn create_texture(
    device: &wgpu::Device,
    label: &str,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
    render_target: bool,
) -> wgpu::Texture {
    let mut usage = wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST;
    if render_target {
        usage |= wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC;
    }
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage,
        view_formats: &[],
    })
}

fn upload(queue: &wgpu::Queue, texture: &wgpu::Texture, width: u32, height: u32, data: &[u8], bytes_per_pixel: u32) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * bytes_per_pixel),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

#[allow(clippy::too_many_arguments)]
fn bind_group(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    layer_view: &wgpu::TextureView,
    layer_sampler: &wgpu::Sampler,
    field_view: &wgpu::TextureView,
    field_sampler: &wgpu::Sampler,
    uniform: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(layer_view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(layer_sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(field_view),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::Sampler(field_sampler),
            },
            wgpu::BindGroupEntry {
                binding: 4,
                resource: uniform.as_entire_binding(),
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sizes() {
        assert_eq!(std::mem::size_of::<AdvectUniform>(), 16);
        assert_eq!(std::mem::size_of::<InterpolateUniform>(), 16);
    }
}

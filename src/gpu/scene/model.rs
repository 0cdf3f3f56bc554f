// ============================================
// Model - Объекты сцены и их границы
// ============================================

use bytemuck::{Pod, Zeroable};
use ultraviolet::{Mat4, Vec3, Vec4};
use wgpu::util::DeviceExt;

use super::mesh::{GpuMesh, MeshData};
use crate::gpu::animation::LayerId;
use crate::gpu::core::{ModelDesc, RendererConfig};
use crate::gpu::lighting::{Aabb, SceneBounds};

/// Модель на CPU: трансформ, цвет, границы
#[derive(Debug, Clone)]
pub struct ModelInstance {
    pub name: String,
    pub transform: Mat4,
    pub color: Vec3,
    pub bounds: Aabb,
    pub animated: bool,
}

impl ModelInstance {
    /// Коробка из описания: перенос * масштаб единичного куба
    pub fn from_desc(desc: &ModelDesc) -> Self {
        let t = Vec3::from(desc.translation);
        let s = Vec3::from(desc.scale);
        let transform = Mat4::new(
            Vec4::new(s.x, 0.0, 0.0, 0.0),
            Vec4::new(0.0, s.y, 0.0, 0.0),
            Vec4::new(0.0, 0.0, s.z, 0.0),
            Vec4::new(t.x, t.y, t.z, 1.0),
        );
        let half = Vec3::new(s.x.abs(), s.y.abs(), s.z.abs()) * 0.5;
        Self {
            name: desc.name.clone(),
            transform,
            color: Vec3::from(desc.color),
            bounds: Aabb::from_center_half(t, half),
            animated: desc.animated,
        }
    }
}

/// Границы сцены для теней (модели + земля)
pub fn scene_bounds(models: &[ModelInstance], ground_half_extent: f32) -> SceneBounds {
    SceneBounds::new(models.iter().map(|m| m.bounds).collect(), ground_half_extent)
}

/// Данные модели для шейдера
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 3],
    /// 1 - накладывать анимированную текстуру
    pub animated: u32,
}

/// Ссылка на слой анимированной текстуры
#[derive(Debug, Clone, Copy)]
pub struct AnimatedOverlay {
    pub layer: LayerId,
}

/// Объект, готовый к отрисовке
pub struct Renderable {
    pub instance: ModelInstance,
    pub mesh: GpuMesh,
    pub overlay: Option<AnimatedOverlay>,
    pub uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl Renderable {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        instance: ModelInstance,
        mesh: GpuMesh,
        overlay: Option<AnimatedOverlay>,
    ) -> Self {
        let uniform = ModelUniform {
            model: instance.transform.into(),
            color: instance.color.into(),
            animated: overlay.is_some() as u32,
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("Model Uniform {}", instance.name)),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("Model BG {}", instance.name)),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        Self {
            instance,
            mesh,
            overlay,
            uniform_buffer,
            bind_group,
        }
    }
}

/// Сцена: модели, земля, границы
pub struct Scene {
    pub renderables: Vec<Renderable>,
    pub ground: Renderable,
    pub bounds: SceneBounds,
}

impl Scene {
    /// Собрать сцену из конфига. overlay_layer - слой для моделей с animated
    pub fn new(
        device: &wgpu::Device,
        model_layout: &wgpu::BindGroupLayout,
        config: &RendererConfig,
        overlay_layer: Option<LayerId>,
    ) -> Self {
        let instances: Vec<ModelInstance> = config.scene.iter().map(ModelInstance::from_desc).collect();
        let bounds = scene_bounds(&instances, config.ground_half_extent);
        let cube = MeshData::unit_cube();

        let renderables = instances
            .into_iter()
            .map(|instance| {
                let overlay = if instance.animated {
                    overlay_layer.map(|layer| AnimatedOverlay { layer })
                } else {
                    None
                };
                let mesh = GpuMesh::new(device, &instance.name, &cube);
                Renderable::new(device, model_layout, instance, mesh, overlay)
            })
            .collect::<Vec<_>>();

        let ground_instance = ModelInstance {
            name: "ground".to_string(),
            transform: Mat4::identity(),
            color: Vec3::new(0.55, 0.55, 0.5),
            bounds: bounds.ground,
            animated: false,
        };
        let ground_mesh = GpuMesh::new(
            device,
            "Ground",
            &MeshData::ground_plane(config.ground_half_extent, config.ground_half_extent / 15.0),
        );
        let ground = Renderable::new(device, model_layout, ground_instance, ground_mesh, None);

        log::info!(
            "Scene: {} models, ground ±{}",
            renderables.len(),
            config.ground_half_extent
        );

        Self {
            renderables,
            ground,
            bounds,
        }
    }

    /// Все объекты, включая землю
    pub fn iter(&self) -> impl Iterator<Item = &Renderable> {
        std::iter::once(&self.ground).chain(self.renderables.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_bounds_match_transform() {
        let desc = ModelDesc {
            name: "tower".to_string(),
            translation: [2.0, 10.0, -4.0],
            scale: [4.0, 20.0, 2.0],
            color: [1.0, 1.0, 1.0],
            animated: true,
        };
        let instance = ModelInstance::from_desc(&desc);
        assert_eq!(instance.bounds.min, Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(instance.bounds.max, Vec3::new(4.0, 20.0, -3.0));

        let corner = instance.transform * Vec4::new(0.5, 0.5, 0.5, 1.0);
        assert_eq!(Vec3::new(corner.x, corner.y, corner.z), instance.bounds.max);
    }

    #[test]
    fn test_scene_bounds_from_config() {
        let config = RendererConfig::default();
        let instances: Vec<ModelInstance> = config.scene.iter().map(ModelInstance::from_desc).collect();
        let bounds = scene_bounds(&instances, config.ground_half_extent);
        assert_eq!(bounds.objects.len(), config.scene.len());
        assert_eq!(bounds.ground.max, Vec3::new(750.0, 0.0, 750.0));
    }
}

// ============================================
// Shadow Map - GPU текстура глубины для теней
// ============================================

use bytemuck::{Pod, Zeroable};
use ultraviolet::Mat4;

use super::cascade::CascadeSet;
use super::simple::SimpleShadow;
use crate::gpu::core::{ShadowSettings, CASCADE_COUNT};

/// Shadow map array: все каскады в одной текстуре
pub struct ShadowMapArray {
    pub texture: wgpu::Texture,
    /// Views для рендеринга каждого слоя
    pub layer_views: Vec<wgpu::TextureView>,
    /// View для сэмплирования всего массива
    pub array_view: wgpu::TextureView,
    /// Sampler с comparison
    pub sampler: wgpu::Sampler,
    pub resolution: u32,
}

impl ShadowMapArray {
    pub fn new(device: &wgpu::Device, resolution: u32, layers: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Map Array"),
            size: wgpu::Extent3d {
                width: resolution,
                height: resolution,
                depth_or_array_layers: layers,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let layer_views: Vec<_> = (0..layers)
            .map(|i| {
                texture.create_view(&wgpu::TextureViewDescriptor {
                    label: Some(&format!("Shadow Map Layer {} View", i)),
                    format: Some(wgpu::TextureFormat::Depth32Float),
                    dimension: Some(wgpu::TextureViewDimension::D2),
                    aspect: wgpu::TextureAspect::DepthOnly,
                    base_array_layer: i,
                    array_layer_count: Some(1),
                    ..Default::default()
                })
            })
            .collect();

        let array_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Shadow Map Array View"),
            format: Some(wgpu::TextureFormat::Depth32Float),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            aspect: wgpu::TextureAspect::DepthOnly,
            base_array_layer: 0,
            array_layer_count: Some(layers),
            ..Default::default()
        });

        // Comparison sampler: аппаратный 2x2 PCF при Linear
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        Self {
            texture,
            layer_views,
            array_view,
            sampler,
            resolution,
        }
    }
}

/// Матрицы теней текущего кадра
#[derive(Debug, Clone, Copy)]
pub enum ShadowFrame {
    Cascaded(CascadeSet),
    Simple(SimpleShadow),
}

impl ShadowFrame {
    /// Сколько слоёв карты рисуется в этом кадре
    pub fn layer_count(&self) -> usize {
        match self {
            ShadowFrame::Cascaded(_) => CASCADE_COUNT,
            ShadowFrame::Simple(_) => 1,
        }
    }

    /// proj * view для каждого рисуемого слоя
    pub fn pass_matrices(&self) -> [Mat4; CASCADE_COUNT] {
        match self {
            ShadowFrame::Cascaded(set) => set.view_projections(),
            ShadowFrame::Simple(simple) => {
                let mut out = [Mat4::identity(); CASCADE_COUNT];
                out[0] = simple.view_projection();
                out
            }
        }
    }
}

/// Uniform теней для основного прохода
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ShadowUniform {
    /// uv * proj * view простой карты
    pub simple_transform: [[f32; 4]; 4],
    /// uv * proj * view каждого каскада
    pub cascade_transforms: [[[f32; 4]; 4]; CASCADE_COUNT],
    /// Дальние границы каскадов
    pub cascade_borders: [f32; CASCADE_COUNT],
    pub use_pcf: u32,
    pub use_pssm: u32,
    pub show_splits: u32,
    /// 1 / разрешение карты
    pub texel_size: f32,
}

impl ShadowUniform {
    pub fn new(frame: &ShadowFrame, settings: &ShadowSettings) -> Self {
        let identity: [[f32; 4]; 4] = Mat4::identity().into();
        let mut uniform = Self {
            simple_transform: identity,
            cascade_transforms: [identity; CASCADE_COUNT],
            cascade_borders: [0.0; CASCADE_COUNT],
            use_pcf: settings.use_pcf as u32,
            use_pssm: 0,
            show_splits: settings.effective_show_splits() as u32,
            texel_size: 1.0 / settings.resolution.max(1) as f32,
        };

        match frame {
            ShadowFrame::Cascaded(set) => {
                uniform.use_pssm = 1;
                uniform.cascade_transforms = set.shadow_transforms().map(Into::into);
                uniform.cascade_borders = set.borders();
            }
            ShadowFrame::Simple(simple) => {
                uniform.simple_transform = simple.shadow_transform().into();
                uniform.show_splits = 0;
            }
        }
        uniform
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::lighting::{CameraFrustum, CascadeShadowPlanner, SceneBounds, SimpleShadowPlanner};
    use ultraviolet::Vec3;

    #[test]
    fn test_uniform_layout() {
        // std140: матрицы + vec4 + 4 скаляра
        assert_eq!(std::mem::size_of::<ShadowUniform>(), 64 + 64 * 4 + 16 + 16);
    }

    #[test]
    fn test_simple_frame_disables_pssm_flags() {
        let mut settings = ShadowSettings::default();
        settings.show_splits = true;
        let frame = ShadowFrame::Simple(SimpleShadowPlanner::compute(
            Vec3::new(0.0, -1.0, 0.0),
            &SceneBounds::new(Vec::new(), 750.0),
        ));
        let uniform = ShadowUniform::new(&frame, &settings);
        assert_eq!(uniform.use_pssm, 0);
        assert_eq!(uniform.show_splits, 0);
        assert_eq!(uniform.use_pcf, 1);
        assert_eq!(frame.layer_count(), 1);
    }

    #[test]
    fn test_cascaded_frame_borders() {
        let mut settings = ShadowSettings::default();
        settings.use_pssm = true;
        settings.show_splits = true;
        let camera = CameraFrustum {
            position: Vec3::new(0.0, 9.0, 0.0),
            direction: Vec3::unit_z(),
            up: Vec3::unit_y(),
            right: -Vec3::unit_x(),
            aspect: 16.0 / 9.0,
        };
        let set = CascadeShadowPlanner::from_settings(&settings).compute_cascades(
            &camera,
            Vec3::new(0.3, -0.8, 0.2),
            &SceneBounds::new(Vec::new(), 750.0),
        );
        let uniform = ShadowUniform::new(&ShadowFrame::Cascaded(set), &settings);
        assert_eq!(uniform.use_pssm, 1);
        assert_eq!(uniform.show_splits, 1);
        assert_eq!(uniform.cascade_borders, set.borders());
        assert!(uniform.cascade_borders[3] > 1000.0);
    }
}

// ============================================
// Light Sources - Направленный свет
// ============================================

use bytemuck::{Pod, Zeroable};
use ultraviolet::Vec3;

use crate::gpu::core::LightSettings;

/// Сила света, которой соответствует интенсивность 1.0
const REFERENCE_STRENGTH: f32 = 500.0;

/// Направленный свет
#[derive(Clone, Copy, Debug)]
pub struct DirectionalLight {
    /// Позиция источника (для освещения в шейдере)
    pub position: Vec3,
    /// Направление света (нормализованное, от источника)
    pub direction: Vec3,
    pub color: Vec3,
    /// Относительная интенсивность (1.0 при силе 500)
    pub intensity: f32,
}

impl DirectionalLight {
    pub fn from_settings(settings: &LightSettings) -> Self {
        Self {
            position: settings.position(),
            direction: settings.direction(),
            color: Vec3::from(settings.color),
            intensity: settings.strength / REFERENCE_STRENGTH,
        }
    }

    pub fn to_uniform(&self) -> LightUniform {
        LightUniform {
            direction: self.direction.into(),
            intensity: self.intensity,
            color: self.color.into(),
            _pad: 0.0,
        }
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::from_settings(&LightSettings::default())
    }
}

/// Данные света для шейдера
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct LightUniform {
    pub direction: [f32; 3],
    pub intensity: f32,
    pub color: [f32; 3],
    pub _pad: f32,
}

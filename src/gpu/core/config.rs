// ============================================
// Config - Настройки рендерера (JSON)
// ============================================
// Все пути ассетов задаются относительно asset_root

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use ultraviolet::Vec3;

use super::error::Result;

/// Путь к конфигу по умолчанию
pub const CONFIG_FILE: &str = "pssm_field.json";

/// Количество каскадов PSSM
pub const CASCADE_COUNT: usize = 4;

/// Окно приложения
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "PSSM Shadows + Vector Field".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Настройки теней
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowSettings {
    /// Каскадные тени вместо одной карты
    pub use_pssm: bool,
    /// Сглаживание PCF
    pub use_pcf: bool,
    /// Подсветка каскадов цветом (только вместе с PSSM)
    pub show_splits: bool,
    pub depth_bias: i32,
    pub slope_scaled_depth_bias: f32,
    /// Разрешение одной карты теней
    pub resolution: u32,
    /// Длина одного среза frustum
    pub split_distance: f32,
    pub projection_near: f32,
    pub projection_far: f32,
}

impl ShadowSettings {
    /// Подсветка каскадов имеет смысл только в режиме PSSM
    pub fn effective_show_splits(&self) -> bool {
        self.use_pssm && self.show_splits
    }
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            use_pssm: false,
            use_pcf: true,
            show_splits: false,
            depth_bias: 10,
            slope_scaled_depth_bias: 2.0 * std::f32::consts::SQRT_2,
            resolution: 1024,
            split_distance: 250.0,
            projection_near: 0.1,
            projection_far: 10000.0,
        }
    }
}

/// Направленный свет в сферических координатах
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightSettings {
    pub distance: f32,
    pub theta: f32,
    pub phi: f32,
    pub color: [f32; 3],
    pub strength: f32,
}

impl LightSettings {
    /// Позиция источника: (d sinθ cosφ, d cosθ, d sinθ sinφ)
    pub fn position(&self) -> Vec3 {
        let (st, ct) = self.theta.sin_cos();
        let (sp, cp) = self.phi.sin_cos();
        Vec3::new(
            self.distance * st * cp,
            self.distance * ct,
            self.distance * st * sp,
        )
    }

    /// Направление распространения света (от источника к сцене)
    pub fn direction(&self) -> Vec3 {
        -self.position().normalized()
    }
}

impl Default for LightSettings {
    fn default() -> Self {
        Self {
            distance: 200.0,
            theta: 1.1,
            phi: 2.1,
            color: [1.0, 1.0, 1.0],
            strength: 500.0,
        }
    }
}

/// Одно векторное поле в расписании слоя
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldDesc {
    pub path: PathBuf,
    pub steps: u32,
    /// 0 - nearest, 1 - linear
    pub interpolation: u32,
}

impl Default for FieldDesc {
    fn default() -> Self {
        Self {
            path: PathBuf::from("fields/swirl.vfld"),
            steps: 1000,
            interpolation: 0,
        }
    }
}

/// Анимированная текстура
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    pub texture_size: u32,
    /// Длина одного шага адвекции, секунды
    pub frame_interval: f32,
    /// Смещение за один шаг при модуле поля 1, в текселях
    pub advection_scale: f32,
    pub layer_image: PathBuf,
    pub fields: Vec<FieldDesc>,
}

impl AnimationSettings {
    /// Интервал шага в микросекундах (минимум 1)
    pub fn interval_micros(&self) -> u64 {
        ((self.frame_interval.max(0.0) as f64) * 1_000_000.0).round().max(1.0) as u64
    }
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            texture_size: 2048,
            frame_interval: 1.0,
            advection_scale: 16.0,
            layer_image: PathBuf::from("textures/layer.png"),
            fields: vec![FieldDesc::default()],
        }
    }
}

/// Модель сцены: коробка с переносом и масштабом
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelDesc {
    pub name: String,
    pub translation: [f32; 3],
    pub scale: [f32; 3],
    pub color: [f32; 3],
    /// Накладывать анимированную текстуру
    pub animated: bool,
}

impl Default for ModelDesc {
    fn default() -> Self {
        Self {
            name: "box".to_string(),
            translation: [0.0, 0.5, 0.0],
            scale: [1.0, 1.0, 1.0],
            color: [0.8, 0.8, 0.8],
            animated: false,
        }
    }
}

/// Полная конфигурация рендерера
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub asset_root: PathBuf,
    pub window: WindowSettings,
    pub shadows: ShadowSettings,
    pub light: LightSettings,
    pub animation: AnimationSettings,
    pub scene: Vec<ModelDesc>,
    /// Полуразмер земли по X/Z
    pub ground_half_extent: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            window: WindowSettings::default(),
            shadows: ShadowSettings::default(),
            light: LightSettings::default(),
            animation: AnimationSettings::default(),
            scene: vec![
                ModelDesc {
                    name: "tower".to_string(),
                    translation: [0.0, 10.0, 30.0],
                    scale: [6.0, 20.0, 6.0],
                    color: [0.7, 0.7, 0.75],
                    animated: true,
                },
                ModelDesc {
                    name: "block".to_string(),
                    translation: [-25.0, 4.0, 60.0],
                    scale: [12.0, 8.0, 12.0],
                    color: [0.75, 0.6, 0.5],
                    animated: false,
                },
                ModelDesc {
                    name: "slab".to_string(),
                    translation: [20.0, 1.5, 15.0],
                    scale: [10.0, 3.0, 4.0],
                    color: [0.5, 0.65, 0.5],
                    animated: false,
                },
            ],
            ground_half_extent: 750.0,
        }
    }
}

impl RendererConfig {
    /// Загрузить конфиг. Нет файла - настройки по умолчанию
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("Config {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        log::info!("Loaded config {:?}: {} models", path, config.scene.len());
        Ok(config)
    }

    /// Сохранить конфиг в JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Путь ассета относительно asset_root
    pub fn asset_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.asset_root.join(relative)
    }
}

// ============================================
// Core Module - Основные компоненты и ресурсы
// ============================================

pub mod app;
mod clock;
mod config;
mod error;
mod resources;

pub use app::App;
pub use clock::FrameClock;
pub use config::{
    AnimationSettings, FieldDesc, LightSettings, ModelDesc, RendererConfig, ShadowSettings,
    WindowSettings, CASCADE_COUNT, CONFIG_FILE,
};
pub use error::{FieldError, RenderError, Result};
pub use resources::AppResources;

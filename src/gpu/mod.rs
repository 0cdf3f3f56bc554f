// ============================================
// GPU Module - Каскадные тени и анимированная текстура
// ============================================

pub mod animation;
pub mod lighting;
pub mod render;
pub mod scene;

pub mod core;
pub mod systems;

pub use self::core::app::run;

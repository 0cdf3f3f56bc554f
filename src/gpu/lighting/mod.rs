// ============================================
// Lighting Module - PSSM и простая карта теней
// ============================================
// Планировщики работают на CPU, csm загружает результат на GPU

mod bounds;
mod cascade;
mod csm;
mod light;
mod shadow_map;
mod simple;

pub use bounds::{Aabb, SceneBounds};
pub use cascade::{
    light_basis, light_view_matrix, orthographic, shadow_uv_matrix, CameraFrustum, Cascade,
    CascadeSet, CascadeShadowPlanner, CASCADE_FOV,
};
pub use csm::{CascadedShadowMaps, DepthBias};
pub use light::{DirectionalLight, LightUniform};
pub use shadow_map::{ShadowFrame, ShadowMapArray, ShadowUniform};
pub use simple::{SimpleShadow, SimpleShadowPlanner};

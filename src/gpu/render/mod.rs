// ============================================
// GPU Render Module - Тени, сцена, анимированный слой
// ============================================

mod bind_groups;
mod depth;
mod pipelines;
mod renderer;
mod uniforms;

pub use renderer::Renderer;

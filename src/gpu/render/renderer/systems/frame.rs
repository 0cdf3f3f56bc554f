use crate::gpu::animation::AnimatedTexture;
use crate::gpu::lighting::{CascadeShadowPlanner, ShadowFrame, SimpleShadowPlanner};
use crate::gpu::render::renderer::core::{LightingResources, RenderComponents};
use crate::gpu::scene::{Camera, Scene};

/// Обновление кадра: камера, тени, анимированная текстура
pub fn update(
    queue: &wgpu::Queue,
    camera: &Camera,
    elapsed_micros: u64,
    components: &mut RenderComponents,
    lighting: &mut LightingResources,
    animated: &mut AnimatedTexture,
    scene: &Scene,
) {
    // === Камера ===
    components.uniforms.update(camera);
    queue.write_buffer(
        &components.frame.uniform_buffer,
        0,
        bytemuck::cast_slice(&[components.uniforms]),
    );

    // === Свет ===
    queue.write_buffer(
        &components.frame.light_buffer,
        0,
        bytemuck::cast_slice(&[lighting.light.to_uniform()]),
    );

    // === Тени: каскады пересчитываются каждый кадр ===
    let direction = lighting.light.direction;
    let frame = if lighting.settings.use_pssm {
        // Планировщик из текущих настроек: set_shadow_settings меняет их на лету
        let planner = CascadeShadowPlanner::from_settings(&lighting.settings);
        ShadowFrame::Cascaded(planner.compute_cascades(&camera.frustum(), direction, &scene.bounds))
    } else {
        ShadowFrame::Simple(SimpleShadowPlanner::compute(direction, &scene.bounds))
    };
    lighting.shadows.update(queue, &frame, &lighting.settings);

    // === Анимированная текстура ===
    let advance = animated.advance(queue, elapsed_micros);
    if advance.step_count > 0 {
        log::debug!("Field advanced {} steps, blend {:.3}", advance.step_count, advance.blend_weight);
    }
}

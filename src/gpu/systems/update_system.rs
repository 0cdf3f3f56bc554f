// ============================================
// Update System - Обновление камеры и времени
// ============================================

use crate::gpu::core::AppResources;

/// Система обновления
pub struct UpdateSystem;

impl UpdateSystem {
    /// Основной цикл обновления. Возвращает время кадра в микросекундах
    pub fn update(resources: &mut AppResources) -> u64 {
        let elapsed_micros = resources.clock.tick();
        let dt = elapsed_micros as f32 / 1_000_000.0;

        resources.controller.update_camera(&mut resources.camera, dt);

        elapsed_micros
    }
}

// ============================================
// Field Advection Engine - Шаги адвекции и ping-pong слоёв
// ============================================
// Время кадра копится в микросекундах. Каждые interval микросекунд
// даёт один шаг поля, остаток превращается в вес смешивания.
// Swap выполняется раз в кадр для всех слоёв, даже без шагов.
// Кадр сначала планируется, а шаги и swap фиксируются только
// после того, как проход адвекции отправлен на GPU.

use super::field_swapper::{FieldInterpolation, FieldSwapper};
use super::ping_pong::PingPong;
use crate::gpu::core::FieldError;

/// Интервал шага по умолчанию: 1 секунда
pub const DEFAULT_INTERVAL_MICROS: u64 = 1_000_000;

/// Идентификатор слоя внутри движка
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(pub usize);

/// Фаза последнего кадра
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPhase {
    /// Ещё ни одного кадра
    Idle,
    /// Поля сдвинуты на n шагов, swap ещё не выполнен
    Stepping(u32),
    /// Кадр завершён swap-ом
    Swapped,
}

/// Результат кадра для шейдеров
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameAdvance {
    pub step_count: u32,
    /// Вес смешивания в [0, 1)
    pub blend_weight: f32,
    pub swapped: bool,
    /// Остаток времени после кадра
    pub leftover_micros: u64,
}

/// Слой: пара буферов и своё расписание полей
#[derive(Debug)]
pub struct AnimatedLayer<L, F> {
    pub buffers: PingPong<L>,
    pub fields: FieldSwapper<F>,
}

/// Движок адвекции. L - буфер слоя, F - ресурс поля
#[derive(Debug)]
pub struct FieldAdvectionEngine<L, F> {
    layers: Vec<AnimatedLayer<L, F>>,
    interval_micros: u64,
    leftover_micros: u64,
    phase: FieldPhase,
}

impl<L, F> FieldAdvectionEngine<L, F> {
    pub fn new(interval_micros: u64) -> Self {
        Self {
            layers: Vec::new(),
            interval_micros: interval_micros.max(1),
            leftover_micros: 0,
            phase: FieldPhase::Idle,
        }
    }

    /// Зарегистрировать слой. initial - источник первого кадра
    pub fn add_layer(&mut self, initial: L, scratch: L) -> LayerId {
        self.layers.push(AnimatedLayer {
            buffers: PingPong::new(initial, scratch),
            fields: FieldSwapper::new(),
        });
        LayerId(self.layers.len() - 1)
    }

    /// Добавить поле в расписание слоя
    pub fn add_field(
        &mut self,
        layer: LayerId,
        resource: F,
        steps: u32,
        interpolation: FieldInterpolation,
    ) -> Result<usize, FieldError> {
        let entry = self
            .layers
            .get_mut(layer.0)
            .ok_or(FieldError::UnknownLayer(layer.0))?;
        entry.fields.add_field(resource, steps, interpolation)
    }

    /// Поменять source/target у всех слоёв
    pub fn swap(&mut self) {
        for layer in &mut self.layers {
            layer.buffers.swap();
        }
        self.phase = FieldPhase::Swapped;
    }

    /// Сдвинуть курсоры всех полей на n шагов
    pub fn increment_step(&mut self, n: u32) {
        for layer in &mut self.layers {
            layer.fields.increment(n);
        }
        self.phase = FieldPhase::Stepping(n);
    }

    /// Шаги и вес кадра без изменения состояния
    pub fn plan_frame(&self, elapsed_micros: u64) -> FrameAdvance {
        let total = self.leftover_micros.saturating_add(elapsed_micros);
        let steps = total / self.interval_micros;
        let leftover_micros = total - steps * self.interval_micros;
        let blend = leftover_micros as f64 / self.interval_micros as f64;

        FrameAdvance {
            step_count: steps.min(u32::MAX as u64) as u32,
            blend_weight: (blend as f32).min(1.0 - f32::EPSILON),
            swapped: true,
            leftover_micros,
        }
    }

    /// Зафиксировать отрисованный кадр: остаток, сдвиг полей, swap
    pub fn commit_frame(&mut self, frame: &FrameAdvance) {
        self.leftover_micros = frame.leftover_micros;
        self.increment_step(frame.step_count);
        self.swap();

        log::trace!(
            "Field advance: {} steps, blend {:.3}",
            frame.step_count,
            frame.blend_weight
        );
    }

    /// Полный кадр: план и сразу фиксация
    pub fn advance_frame(&mut self, elapsed_micros: u64) -> FrameAdvance {
        let frame = self.plan_frame(elapsed_micros);
        self.commit_frame(&frame);
        frame
    }

    pub fn phase(&self) -> FieldPhase {
        self.phase
    }

    pub fn interval_micros(&self) -> u64 {
        self.interval_micros
    }

    pub fn leftover_micros(&self) -> u64 {
        self.leftover_micros
    }

    pub fn layers(&self) -> &[AnimatedLayer<L, F>] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&AnimatedLayer<L, F>> {
        self.layers.get(id.0)
    }
}

impl<L, F> Default for FieldAdvectionEngine<L, F> {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL_MICROS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::animation::ping_pong::Slot;

    fn engine_with_layer() -> (FieldAdvectionEngine<&'static str, char>, LayerId) {
        let mut engine = FieldAdvectionEngine::default();
        let layer = engine.add_layer("image", "scratch");
        engine
            .add_field(layer, 'a', 1000, FieldInterpolation::Nearest)
            .unwrap();
        (engine, layer)
    }

    #[test]
    fn test_initial_state() {
        let (engine, layer) = engine_with_layer();
        assert_eq!(engine.phase(), FieldPhase::Idle);
        assert_eq!(engine.leftover_micros(), 0);
        assert_eq!(engine.layer(layer).unwrap().fields.step(), 0);
    }

    #[test]
    fn test_whole_intervals() {
        for n in [0u32, 1, 2, 7] {
            let (mut engine, _) = engine_with_layer();
            let frame = engine.advance_frame(n as u64 * DEFAULT_INTERVAL_MICROS);
            assert_eq!(frame.step_count, n);
            assert_eq!(frame.blend_weight, 0.0);
            assert!(frame.swapped);
        }
    }

    #[test]
    fn test_fractional_carry_over() {
        let (mut engine, layer) = engine_with_layer();
        let a = engine.advance_frame(1_500_000);
        assert_eq!(a.step_count, 1);
        assert!((a.blend_weight - 0.5).abs() < 1e-6);

        let b = engine.advance_frame(1_500_000);
        assert_eq!(a.step_count + b.step_count, 3);
        assert_eq!(b.blend_weight, 0.0);
        assert_eq!(engine.layer(layer).unwrap().fields.step(), 3);
    }

    #[test]
    fn test_no_drift_against_single_call() {
        let (mut many, _) = engine_with_layer();
        let (mut single, _) = engine_with_layer();

        let frame_micros = 16_667u64;
        let frames = 10_000u64;
        let mut total_steps = 0u64;
        let mut last = None;
        for _ in 0..frames {
            let frame = many.advance_frame(frame_micros);
            total_steps += frame.step_count as u64;
            last = Some(frame);
        }

        let big = single.advance_frame(frame_micros * frames);
        assert_eq!(total_steps, big.step_count as u64);
        assert_eq!(many.leftover_micros(), single.leftover_micros());
        assert_eq!(last.map(|f| f.blend_weight), Some(big.blend_weight));
    }

    #[test]
    fn test_swap_every_frame_even_without_steps() {
        let (mut engine, layer) = engine_with_layer();
        let start = engine.layer(layer).unwrap().buffers.source_slot();

        let frame = engine.advance_frame(1_000);
        assert_eq!(frame.step_count, 0);
        assert!(frame.swapped);
        assert_eq!(engine.phase(), FieldPhase::Swapped);
        assert_eq!(engine.layer(layer).unwrap().buffers.source_slot(), start.other());
        // Источник следующего кадра - то, что записал этот
        assert_eq!(*engine.layer(layer).unwrap().buffers.source(), "scratch");

        engine.advance_frame(1_000);
        assert_eq!(engine.layer(layer).unwrap().buffers.source_slot(), start);
    }

    #[test]
    fn test_planned_frame_changes_nothing_until_commit() {
        let (mut engine, layer) = engine_with_layer();
        engine.advance_frame(500_000);

        // Кадр не отрисован: роли, курсор и остаток не трогаются
        let dropped = engine.plan_frame(2_000_000);
        assert_eq!(dropped.step_count, 2);
        assert_eq!(*engine.layer(layer).unwrap().buffers.source(), "scratch");
        assert_eq!(engine.layer(layer).unwrap().fields.step(), 0);
        assert_eq!(engine.leftover_micros(), 500_000);
        assert_eq!(engine.phase(), FieldPhase::Swapped);

        let frame = engine.plan_frame(600_000);
        assert_eq!(frame.step_count, 1);
        engine.commit_frame(&frame);
        assert_eq!(*engine.layer(layer).unwrap().buffers.source(), "image");
        assert_eq!(engine.layer(layer).unwrap().fields.step(), 1);
        assert_eq!(engine.leftover_micros(), 100_000);
    }

    #[test]
    fn test_swap_and_increment_are_independent() {
        let (mut engine, layer) = engine_with_layer();
        let second = engine.add_layer("image2", "scratch2");

        engine.swap();
        engine.swap();
        assert_eq!(engine.layer(layer).unwrap().buffers.source_slot(), Slot::A);
        assert_eq!(engine.layer(second).unwrap().buffers.source_slot(), Slot::A);
        assert_eq!(engine.layer(layer).unwrap().fields.step(), 0);

        engine.increment_step(4);
        assert_eq!(engine.phase(), FieldPhase::Stepping(4));
        assert_eq!(engine.layer(layer).unwrap().fields.step(), 4);
        assert_eq!(engine.layer(layer).unwrap().buffers.source_slot(), Slot::A);
    }

    #[test]
    fn test_field_cursor_wraps() {
        let mut engine: FieldAdvectionEngine<u8, char> = FieldAdvectionEngine::new(10);
        let layer = engine.add_layer(0, 1);
        engine.add_field(layer, 'a', 2, FieldInterpolation::Nearest).unwrap();
        engine.add_field(layer, 'b', 3, FieldInterpolation::Linear).unwrap();

        engine.advance_frame(60);
        let (slot, local) = engine.layer(layer).unwrap().fields.current().unwrap();
        assert_eq!((slot.resource, local), ('a', 1));
    }

    #[test]
    fn test_unknown_layer() {
        let mut engine: FieldAdvectionEngine<u8, char> = FieldAdvectionEngine::default();
        let err = engine.add_field(LayerId(3), 'a', 10, FieldInterpolation::Nearest);
        assert!(matches!(err, Err(FieldError::UnknownLayer(3))));
    }
}

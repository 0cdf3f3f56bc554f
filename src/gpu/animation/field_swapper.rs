// ============================================
// Field Swapper - Расписание векторных полей слоя
// ============================================
// Каждое поле действует заданное число шагов, затем следующее.
// Курсор идёт по кругу по сумме шагов всех полей.

use crate::gpu::core::FieldError;

/// Интерполяция выборки поля
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum FieldInterpolation {
    Nearest = 0,
    Linear = 1,
}

impl FieldInterpolation {
    /// Неизвестные значения трактуются как Nearest
    pub fn from_index(index: u32) -> Self {
        match index {
            1 => FieldInterpolation::Linear,
            _ => FieldInterpolation::Nearest,
        }
    }
}

/// Поле с бюджетом шагов
#[derive(Debug)]
pub struct FieldSlot<F> {
    pub resource: F,
    pub steps: u32,
    pub interpolation: FieldInterpolation,
}

/// Текущее поле и шаг внутри него
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldCursor {
    pub slot: usize,
    pub local_step: u32,
}

#[derive(Debug)]
pub struct FieldSwapper<F> {
    slots: Vec<FieldSlot<F>>,
    cursor: u64,
}

impl<F> FieldSwapper<F> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            cursor: 0,
        }
    }

    pub fn add_field(
        &mut self,
        resource: F,
        steps: u32,
        interpolation: FieldInterpolation,
    ) -> Result<usize, FieldError> {
        if steps == 0 {
            return Err(FieldError::ZeroSteps);
        }
        self.slots.push(FieldSlot {
            resource,
            steps,
            interpolation,
        });
        Ok(self.slots.len() - 1)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Сумма шагов всех полей
    pub fn total_steps(&self) -> u64 {
        self.slots.iter().map(|s| s.steps as u64).sum()
    }

    pub fn step(&self) -> u64 {
        self.cursor
    }

    /// Сдвинуть курсор на n шагов с переходом через ноль
    pub fn increment(&mut self, n: u32) {
        let total = self.total_steps();
        if total == 0 {
            return;
        }
        self.cursor = (self.cursor + n as u64 % total) % total;
    }

    pub fn cursor(&self) -> Option<FieldCursor> {
        let mut start = 0u64;
        for (slot, field) in self.slots.iter().enumerate() {
            let end = start + field.steps as u64;
            if self.cursor < end {
                return Some(FieldCursor {
                    slot,
                    local_step: (self.cursor - start) as u32,
                });
            }
            start = end;
        }
        None
    }

    /// Активное поле
    pub fn current(&self) -> Option<(&FieldSlot<F>, u32)> {
        self.cursor()
            .map(|c| (&self.slots[c.slot], c.local_step))
    }

    pub fn slots(&self) -> &[FieldSlot<F>] {
        &self.slots
    }
}

impl<F> Default for FieldSwapper<F> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_swapper() {
        let mut swapper: FieldSwapper<u8> = FieldSwapper::new();
        swapper.increment(5);
        assert_eq!(swapper.step(), 0);
        assert!(swapper.current().is_none());
    }

    #[test]
    fn test_zero_steps_rejected() {
        let mut swapper = FieldSwapper::new();
        assert!(swapper.add_field('a', 0, FieldInterpolation::Nearest).is_err());
        assert!(swapper.is_empty());
    }

    #[test]
    fn test_cursor_walks_fields_and_wraps() {
        let mut swapper = FieldSwapper::new();
        swapper.add_field('a', 3, FieldInterpolation::Nearest).unwrap();
        swapper.add_field('b', 2, FieldInterpolation::Linear).unwrap();
        assert_eq!(swapper.total_steps(), 5);

        let (slot, local) = swapper.current().unwrap();
        assert_eq!((slot.resource, local), ('a', 0));

        swapper.increment(3);
        let (slot, local) = swapper.current().unwrap();
        assert_eq!((slot.resource, local, slot.interpolation), ('b', 0, FieldInterpolation::Linear));

        swapper.increment(3);
        assert_eq!(swapper.step(), 1);
        let (slot, local) = swapper.current().unwrap();
        assert_eq!((slot.resource, local), ('a', 1));

        swapper.increment(u32::MAX);
        assert!(swapper.step() < 5);
    }

    #[test]
    fn test_interpolation_from_index() {
        assert_eq!(FieldInterpolation::from_index(0), FieldInterpolation::Nearest);
        assert_eq!(FieldInterpolation::from_index(1), FieldInterpolation::Linear);
        assert_eq!(FieldInterpolation::from_index(7), FieldInterpolation::Nearest);
    }
}

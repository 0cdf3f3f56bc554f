// ============================================
// Frame Clock - Время между кадрами в микросекундах
// ============================================

use std::time::{Duration, Instant};

/// Первый кадр получает 0, дальше - время с прошлого тика
#[derive(Debug, Default)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self { last: None }
    }

    pub fn tick(&mut self) -> u64 {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> u64 {
        let elapsed = self
            .last
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(Duration::ZERO);
        self.last = Some(now);
        elapsed.as_micros().min(u64::MAX as u128) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_is_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(), 0);
    }

    #[test]
    fn test_elapsed_micros() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.tick_at(start);
        assert_eq!(clock.tick_at(start + Duration::from_micros(16_667)), 16_667);
        assert_eq!(clock.tick_at(start + Duration::from_micros(20_000)), 3_333);
    }
}

// ============================================
// Ping-Pong - Пара буферов источник/приёмник
// ============================================

/// Роль слота в паре
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    pub fn other(self) -> Self {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Slot::A => 0,
            Slot::B => 1,
        }
    }
}

/// Два равноправных буфера: из source читаем, в target пишем
#[derive(Debug)]
pub struct PingPong<T> {
    slots: [T; 2],
    source: Slot,
}

impl<T> PingPong<T> {
    /// initial - источник первого кадра, scratch - его приёмник
    pub fn new(initial: T, scratch: T) -> Self {
        Self {
            slots: [initial, scratch],
            source: Slot::A,
        }
    }

    pub fn source_slot(&self) -> Slot {
        self.source
    }

    pub fn target_slot(&self) -> Slot {
        self.source.other()
    }

    pub fn source(&self) -> &T {
        &self.slots[self.source.index()]
    }

    pub fn target(&self) -> &T {
        &self.slots[self.target_slot().index()]
    }

    pub fn slot(&self, slot: Slot) -> &T {
        &self.slots[slot.index()]
    }

    /// Поменять роли местами
    pub fn swap(&mut self) {
        self.source = self.source.other();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_is_involution() {
        let mut pair = PingPong::new("image", "scratch");
        let (src, dst) = (pair.source_slot(), pair.target_slot());
        pair.swap();
        assert_eq!(pair.source_slot(), dst);
        assert_eq!(pair.target_slot(), src);
        pair.swap();
        assert_eq!(pair.source_slot(), src);
        assert_eq!(pair.target_slot(), dst);
    }

    #[test]
    fn test_initial_is_first_source() {
        let mut pair = PingPong::new("image", "scratch");
        assert_eq!(*pair.source(), "image");
        assert_eq!(*pair.target(), "scratch");
        pair.swap();
        assert_eq!(*pair.source(), "scratch");
        assert_eq!(*pair.target(), "image");
    }
}

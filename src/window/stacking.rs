/// Hands out strictly increasing z-index values. Seeded above the static
/// window z so the first focus always paints on top of anything unfocused.
///
/// The counter is a `u64` and never renormalizes; even at one focus per
/// millisecond the range outlives any realistic session by many orders of
/// magnitude.
#[derive(Debug, Clone, Copy)]
pub struct StackOrderAllocator {
    next: u64,
}

impl StackOrderAllocator {
    /// First value handed out, above [`super::STATIC_Z`].
    pub const BASE: u64 = 20;

    pub fn new() -> Self {
        Self { next: Self::BASE }
    }

    /// Returns the current value and advances the counter.
    pub fn next(&mut self) -> u64 {
        let value = self.next;
        self.next = self.next.saturating_add(1);
        value
    }

    pub fn peek(&self) -> u64 {
        self.next
    }
}

impl Default for StackOrderAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_are_strictly_increasing() {
        let mut alloc = StackOrderAllocator::new();
        let mut prev = alloc.next();
        assert_eq!(prev, StackOrderAllocator::BASE);
        for _ in 0..100 {
            let next = alloc.next();
            assert!(next > prev);
            prev = next;
        }
    }

    #[test]
    fn base_sits_above_static_z() {
        assert!(StackOrderAllocator::BASE > crate::window::STATIC_Z);
    }
}

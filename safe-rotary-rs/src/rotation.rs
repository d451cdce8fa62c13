//! Direction resolution and the absolute rotary position.

use core::sync::atomic::{AtomicI32, Ordering};

/// Turn direction of one accepted detent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    /// Resolve direction from the companion line sampled on the falling
    /// edge of the primary line: high means clockwise.
    pub fn from_companion(companion_high: bool) -> Self {
        if companion_high {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        }
    }

    pub fn delta(self) -> i32 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }
}

/// Running absolute knob position.
///
/// Unbounded; wraps on two's complement overflow. Every read returns a
/// whole value that the accumulator actually held.
pub struct RotationAccumulator {
    position: AtomicI32,
}

impl Default for RotationAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl RotationAccumulator {
    pub const fn new() -> Self {
        Self {
            position: AtomicI32::new(0),
        }
    }

    /// Apply one detent and return the new position.
    pub fn step(&self, direction: Direction) -> i32 {
        let delta = direction.delta();
        self.position
            .fetch_add(delta, Ordering::AcqRel)
            .wrapping_add(delta)
    }

    pub fn position(&self) -> i32 {
        self.position.load(Ordering::Acquire)
    }
}

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A position in the score, counted two ways.
///
/// - `with_repeats`: absolute position once every repeat has been expanded.
///   This is the clock playback runs on, and the only field that takes part
///   in ordering.
/// - `without_repeats`: the notated position, the same on every pass through
///   a repeated section. Loop boundaries and seeks are expressed in it.
///
/// Equality follows ordering, so two ticks at the same playback position
/// compare equal even if they were reached through different notation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default)]
pub struct Tick {
    pub with_repeats: u32,
    pub without_repeats: u32,
}

impl Tick {
    pub const ZERO: Tick = Tick {
        with_repeats: 0,
        without_repeats: 0,
    };

    pub const fn new(with_repeats: u32, without_repeats: u32) -> Self {
        Self {
            with_repeats,
            without_repeats,
        }
    }

    /// A tick in a score without repeats, where both clocks agree.
    pub const fn notated(tick: u32) -> Self {
        Self::new(tick, tick)
    }
}

impl PartialEq for Tick {
    fn eq(&self, other: &Self) -> bool {
        self.with_repeats == other.with_repeats
    }
}

impl Eq for Tick {}

impl PartialOrd for Tick {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tick {
    fn cmp(&self, other: &Self) -> Ordering {
        self.with_repeats.cmp(&other.with_repeats)
    }
}

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One point of the sustain-pedal timeline.
///
/// `tick` is a repeat-expanded position (`Tick::with_repeats`).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PedalSequenceItem {
    pub tick: u32,
    pub down: bool,
}

/// Ordered pedal timeline, consumed read-only by the sequencer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PedalSequence {
    items: Vec<PedalSequenceItem>,
}

impl PedalSequence {
    /// Wrap items that are already sorted by tick.
    pub fn new(items: Vec<PedalSequenceItem>) -> Self {
        debug_assert!(items.windows(2).all(|w| w[0].tick <= w[1].tick));
        Self { items }
    }

    /// Build a timeline from pedal marks given as `(on_tick, off_tick)` spans
    /// in playback order.
    ///
    /// - A mark starting before the previous one has ended cuts it short: any
    ///   item later than the new start is dropped.
    /// - A mark starting exactly where the previous one ends turns that
    ///   release into a press, so the pedal is re-struck rather than released.
    /// - Every mark ends with a release.
    pub fn from_spans(spans: impl IntoIterator<Item = (u32, u32)>) -> Self {
        let mut items: Vec<PedalSequenceItem> = Vec::new();
        for (on_tick, off_tick) in spans {
            while items.last().is_some_and(|item| item.tick > on_tick) {
                items.pop();
            }

            match items.last_mut() {
                Some(last) if last.tick == on_tick => last.down = true,
                _ => items.push(PedalSequenceItem {
                    tick: on_tick,
                    down: true,
                }),
            }

            items.push(PedalSequenceItem {
                tick: off_tick.max(on_tick),
                down: false,
            });
        }
        Self { items }
    }

    pub fn items(&self) -> &[PedalSequenceItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of the first item at or after `tick`.
    pub fn lower_bound(&self, tick: u32) -> usize {
        self.items.partition_point(|item| item.tick < tick)
    }

    /// Index of the first item strictly after `tick`.
    pub fn upper_bound(&self, tick: u32) -> usize {
        self.items.partition_point(|item| item.tick <= tick)
    }
}

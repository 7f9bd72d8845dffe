use std::time::Duration;

use crate::rng::Rng;
use crate::sequencing::{NoteEvent, NoteEventKind};

use super::config::DeliveryConfig;

/// Spreads the notes of a chord in time and loudness so it does not sound
/// like a machine striking every key at once.
#[derive(Debug, Clone)]
pub struct Humanizer {
    rng: Rng,
    max_delay_us: u64,
    velocity_percent: std::ops::Range<u64>,
}

impl Humanizer {
    pub fn new(config: &DeliveryConfig) -> Self {
        let low = u64::from(config.velocity_min_percent);
        let high = u64::from(config.velocity_max_percent.max(config.velocity_min_percent));
        Self {
            rng: Rng::new_with_seed(config.seed),
            max_delay_us: u64::try_from(config.max_delay.as_micros()).unwrap_or(u64::MAX),
            velocity_percent: low..high + 1,
        }
    }

    /// Split a batch into delivery slots, each an offset from now.
    ///
    /// Batches with fewer than two note-ons are left alone and come back as a
    /// single slot at offset zero. Otherwise every event gets its own slot:
    /// the order is shuffled, each event draws a delay and a velocity scale,
    /// and the delays are shifted so the earliest one fires immediately.
    /// Slots are returned sorted by offset.
    pub fn schedule(&mut self, events: Vec<NoteEvent>) -> Vec<(Duration, Vec<NoteEvent>)> {
        let note_ons = events
            .iter()
            .filter(|event| event.kind == NoteEventKind::NoteOn)
            .count();
        if note_ons < 2 {
            return vec![(Duration::ZERO, events)];
        }

        let mut events = events;
        self.rng.shuffle(&mut events);

        let mut slots: Vec<(u64, NoteEvent)> = events
            .into_iter()
            .map(|mut event| {
                let delay = self.rng.rand_range(0..self.max_delay_us.saturating_add(1));
                let percent = self.rng.rand_range(self.velocity_percent.clone());
                event.velocity = (event.velocity * percent as f32 / 100.0).clamp(0.0, 1.0);
                (delay, event)
            })
            .collect();

        let earliest = slots.iter().map(|(delay, _)| *delay).min().unwrap_or(0);
        // Stable, so equal delays keep the shuffled order
        slots.sort_by_key(|(delay, _)| *delay);

        slots
            .into_iter()
            .map(|(delay, event)| (Duration::from_micros(delay - earliest), vec![event]))
            .collect()
    }
}

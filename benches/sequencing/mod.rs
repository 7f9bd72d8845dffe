//! Benchmarks for the sequencing layer.

mod coordinator;
mod humanize;
mod voice;

pub use coordinator::bench_orchestrion;
pub use humanize::bench_humanize;
pub use voice::bench_voice;

use orchestrion::sequencing::{Chord, Gesture, Tick};

/// `count` quarter-note chords of `size` notes each, back to back.
pub fn chords(count: u32, size: u8) -> Vec<Gesture> {
    (0..count)
        .map(|i| {
            let root = 48 + (i % 24) as u8;
            let pitches = (0..size).map(|n| root + 4 * n).collect();
            Chord::new(pitches, Tick::notated(i * 480), Tick::notated((i + 1) * 480)).into()
        })
        .collect()
}

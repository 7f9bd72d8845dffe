//! Benchmarks for block rendering.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use orchestrion::synth::{GestureSynth, SynthMessage};
use rtrb::RingBuffer;

use crate::BLOCK_SIZES;

pub fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("synth/render");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // A ten-note chord held by the pedal
        let (mut tx, rx) = RingBuffer::new(64);
        let mut synth = GestureSynth::new(48_000.0, 32, rx);
        tx.push(SynthMessage::Sustain { on: true }).expect("ring");
        for note in 0..10 {
            tx.push(SynthMessage::NoteOn {
                voice: note % 3,
                note: 48 + 3 * note,
                velocity: 0.6,
            })
            .expect("ring");
        }

        group.bench_with_input(BenchmarkId::new("ten_notes", size), &size, |b, _| {
            b.iter(|| synth.render_block(black_box(&mut buffer)))
        });
    }

    group.finish();
}

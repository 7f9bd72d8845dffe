//! Benchmarks for input handling across both hands.

use std::hint::black_box;

use criterion::Criterion;
use orchestrion::orchestrion::{DeliveryConfig, LoopSettings, OrchestrionBuilder, Staff};
use orchestrion::sequencing::{InputEvent, PedalSequence};

use super::chords;

pub fn bench_orchestrion(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequencing/orchestrion");

    let right = Staff::from([(0, chords(256, 3)), (1, chords(256, 1))]);
    let left = Staff::from([(0, chords(256, 2))]);
    let pedal = PedalSequence::from_spans((0..64).map(|bar| (bar * 1920, (bar + 1) * 1920)));

    // Looping keeps the score from running out while criterion iterates
    let mut sequencer = OrchestrionBuilder::new()
        .right_hand(right)
        .left_hand(left)
        .pedal(pedal)
        .config(DeliveryConfig::exact())
        .looping(LoopSettings::new(0, 256 * 480))
        .build(|event| {
            black_box(event);
        })
        .expect("sequencer");

    group.bench_function("press_release", |b| {
        b.iter(|| {
            sequencer.on_input_event(black_box(InputEvent::note_on(60, 0.5)));
            sequencer.on_input_event(black_box(InputEvent::note_off(60)));
        })
    });

    group.bench_function("legato", |b| {
        b.iter(|| {
            sequencer.on_input_event(InputEvent::note_on(60, 0.5));
            sequencer.on_input_event(InputEvent::note_on(61, 0.5));
            sequencer.on_input_event(InputEvent::note_off(60));
            sequencer.on_input_event(InputEvent::note_off(61));
        })
    });

    group.finish();
}

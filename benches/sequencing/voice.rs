//! Benchmarks for a single voice cursor.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use orchestrion::orchestrion::VoiceSequencer;
use orchestrion::sequencing::NoteEventKind;

use super::chords;

pub fn bench_voice(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequencing/voice");

    for &length in &[64u32, 1024] {
        let mut voice = VoiceSequencer::new(0, chords(length, 3));

        // One full pass: press and release every chord, then seek back
        group.bench_with_input(BenchmarkId::new("play_through", length), &length, |b, _| {
            b.iter(|| {
                while let Some(cursor) = voice.next_tick(NoteEventKind::NoteOn) {
                    black_box(voice.on_input_event(NoteEventKind::NoteOn, 60, cursor));
                    if let Some(cursor) = voice.next_tick(NoteEventKind::NoteOff) {
                        black_box(voice.on_input_event(NoteEventKind::NoteOff, 60, cursor));
                    }
                }
                voice.go_to_tick(0);
            })
        });

        let mut voice = VoiceSequencer::new(0, chords(length, 3));
        group.bench_with_input(BenchmarkId::new("seek", length), &length, |b, &length| {
            b.iter(|| {
                black_box(voice.go_to_tick(black_box(length * 240)));
            })
        });
    }

    group.finish();
}

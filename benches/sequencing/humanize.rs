//! Benchmarks for chord humanization.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use orchestrion::orchestrion::humanize::Humanizer;
use orchestrion::orchestrion::DeliveryConfig;
use orchestrion::sequencing::{NoteEvent, NoteEventKind};

pub fn bench_humanize(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequencing/humanize");
    let mut humanizer = Humanizer::new(&DeliveryConfig::default());

    for &size in &[2u8, 10] {
        let batch: Vec<NoteEvent> = (0..size)
            .map(|n| NoteEvent {
                kind: NoteEventKind::NoteOn,
                voice: 0,
                pitch: 48 + n,
                velocity: 0.5,
            })
            .collect();

        group.bench_with_input(BenchmarkId::new("schedule", size), &batch, |b, batch| {
            b.iter(|| black_box(humanizer.schedule(batch.clone())))
        });
    }

    group.finish();
}

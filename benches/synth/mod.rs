//! Benchmarks for the reference synth.

mod render;

pub use render::bench_render;

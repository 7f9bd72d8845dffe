pub mod controller; // Computer keyboard as input device
pub mod orchestrion; // Key presses in, humanized notes out
pub mod rng;
pub mod sequencing; // Ticks, gestures and events
#[cfg(feature = "serde")]
pub mod score; // JSON score files
#[cfg(feature = "rtrb")]
pub mod synth; // Reference renderer

pub use orchestrion::{OrchestrionBuilder, OrchestrionSequencer};

/// Audio frames rendered per callback chunk.
pub const MAX_BLOCK_SIZE: usize = 2048;

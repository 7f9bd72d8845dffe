//! The interactive sequencer: key presses in, humanized notes and pedal out.

pub mod builder;
pub mod config;
pub mod delivery;
pub mod error;
pub mod humanize;
pub mod sequencer;
pub mod voice;

pub use builder::OrchestrionBuilder;
pub use config::{DeliveryConfig, LoopSettings};
pub use error::OrchestrionError;
pub use sequencer::{HandSide, OrchestrionSequencer, OutputCallback, Staff, MIDDLE_C};
pub use voice::{Transition, VoiceSequencer};

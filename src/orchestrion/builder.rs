use std::sync::Arc;

use crate::sequencing::{OutputEvent, PedalSequence};

use super::config::{DeliveryConfig, LoopSettings};
use super::error::OrchestrionError;
use super::sequencer::{OrchestrionSequencer, Staff};

/// Fluent construction of an [`OrchestrionSequencer`].
///
/// ```no_run
/// use orchestrion::orchestrion::{OrchestrionBuilder, Staff};
/// use orchestrion::sequencing::{Chord, Tick};
///
/// let mut right = Staff::new();
/// right.insert(0, vec![Chord::new(vec![60, 64, 67], Tick::ZERO, Tick::notated(480)).into()]);
///
/// let sequencer = OrchestrionBuilder::new()
///     .right_hand(right)
///     .build(|event| println!("{event:?}"))
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct OrchestrionBuilder {
    track: u32,
    right: Staff,
    left: Staff,
    pedal: PedalSequence,
    config: DeliveryConfig,
    looping: LoopSettings,
}

impl OrchestrionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track number stamped on pedal events.
    pub fn track(mut self, track: u32) -> Self {
        self.track = track;
        self
    }

    pub fn right_hand(mut self, staff: Staff) -> Self {
        self.right = staff;
        self
    }

    pub fn left_hand(mut self, staff: Staff) -> Self {
        self.left = staff;
        self
    }

    pub fn pedal(mut self, pedal: PedalSequence) -> Self {
        self.pedal = pedal;
        self
    }

    pub fn config(mut self, config: DeliveryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn looping(mut self, looping: LoopSettings) -> Self {
        self.looping = looping;
        self
    }

    /// Spawn the delivery threads and hand back a ready sequencer.
    pub fn build<F>(self, callback: F) -> Result<OrchestrionSequencer, OrchestrionError>
    where
        F: Fn(OutputEvent) + Send + Sync + 'static,
    {
        let mut sequencer = OrchestrionSequencer::new(
            self.track,
            self.right,
            self.left,
            self.pedal,
            self.config,
            Arc::new(callback),
        )?;
        sequencer.set_loop_settings(self.looping);
        Ok(sequencer)
    }
}

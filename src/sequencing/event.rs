#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of one melodic line within a hand. Emitted note events carry it
/// so the renderer can keep voices apart.
pub type VoiceId = u8;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteEventKind {
    NoteOn,
    NoteOff,
}

/// A decoded key press or release driving the sequencer.
///
/// The pitch only selects the hand (and pairs releases with presses); it is
/// never played. Velocity is normalized to 0.0..=1.0.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputEvent {
    pub kind: NoteEventKind,
    pub pitch: u8,
    pub velocity: f32,
}

impl InputEvent {
    pub fn note_on(pitch: u8, velocity: f32) -> Self {
        Self {
            kind: NoteEventKind::NoteOn,
            pitch,
            velocity,
        }
    }

    pub fn note_off(pitch: u8) -> Self {
        Self {
            kind: NoteEventKind::NoteOff,
            pitch,
            velocity: 0.0,
        }
    }
}

/// A note to sound or silence, addressed to one voice.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    pub kind: NoteEventKind,
    pub voice: VoiceId,
    pub pitch: u8,
    pub velocity: f32,
}

/// Sustain pedal change for a whole track.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PedalEvent {
    pub track: u32,
    pub on: bool,
}

/// What the sequencer hands to its output callback.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    Notes(Vec<NoteEvent>),
    Pedal(PedalEvent),
}

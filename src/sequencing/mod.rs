//! Value types shared by the sequencer, the score loader and the renderers.

pub mod event;
pub mod gesture;
pub mod pedal;
pub mod tick;

pub use event::{InputEvent, NoteEvent, NoteEventKind, OutputEvent, PedalEvent, VoiceId};
pub use gesture::{Chord, ChordView, Gesture, VoiceBlank};
pub use pedal::{PedalSequence, PedalSequenceItem};
pub use tick::Tick;

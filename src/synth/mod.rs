// Reference renderer: turns sequencer output into sound on the audio thread.
// Control arrives through an rtrb ring buffer, so the audio callback never locks.

pub mod envelope;
pub mod message;
pub mod poly;
pub mod voice;

pub use message::{forward, MessageReceiver, SynthMessage};
pub use poly::GestureSynth;

use rtrb::{Consumer, Producer};

use crate::sequencing::{NoteEventKind, OutputEvent, VoiceId};

/// Control messages crossing into the audio thread.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    NoteOn {
        voice: VoiceId,
        note: u8,
        velocity: f32,
    },
    NoteOff {
        voice: VoiceId,
        note: u8,
    },
    Sustain {
        on: bool,
    },
    AllNotesOff,
}

impl SynthMessage {
    /// Flatten one sequencer output into synth messages.
    pub fn from_output(event: &OutputEvent) -> Vec<SynthMessage> {
        match event {
            OutputEvent::Notes(notes) => notes
                .iter()
                .map(|note| match note.kind {
                    NoteEventKind::NoteOn => SynthMessage::NoteOn {
                        voice: note.voice,
                        note: note.pitch,
                        velocity: note.velocity,
                    },
                    NoteEventKind::NoteOff => SynthMessage::NoteOff {
                        voice: note.voice,
                        note: note.pitch,
                    },
                })
                .collect(),
            OutputEvent::Pedal(pedal) => vec![SynthMessage::Sustain { on: pedal.on }],
        }
    }
}

/// Push an output event into the ring. Returns how many messages did not
/// fit.
pub fn forward(tx: &mut Producer<SynthMessage>, event: &OutputEvent) -> usize {
    SynthMessage::from_output(event)
        .into_iter()
        .filter(|message| tx.push(*message).is_err())
        .count()
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

use super::envelope::Envelope;
use super::message::{MessageReceiver, SynthMessage};
use super::voice::{SynthVoice, VoiceState};

const MASTER_GAIN: f32 = 0.2;

/// Polyphonic renderer for sequencer output.
///
/// Notes are tracked per `(voice, pitch)` so two voices striking the same
/// pitch do not cut each other off. While the sustain pedal is down, key
/// releases are deferred and applied when it comes up.
pub struct GestureSynth<R: MessageReceiver> {
    voices: Vec<SynthVoice>,
    rx: R,
    sustain: bool,
    frame_counter: u64,
}

impl<R: MessageReceiver> GestureSynth<R> {
    pub fn new(sample_rate: f32, max_voices: usize, rx: R) -> Self {
        let envelope = Envelope::adsr(sample_rate, 0.005, 1.2, 0.25, 0.35);
        let voices = (0..max_voices)
            .map(|_| SynthVoice::new(sample_rate, envelope.clone()))
            .collect();

        Self {
            voices,
            rx,
            sustain: false,
            frame_counter: 0,
        }
    }

    pub fn render_block(&mut self, out: &mut [f32]) {
        while let Some(message) = self.rx.pop() {
            self.handle(message);
        }

        out.fill(0.0);
        for voice in self.voices.iter_mut().filter(|voice| !voice.is_free()) {
            voice.render_add(out);
        }
        for sample in out.iter_mut() {
            *sample *= MASTER_GAIN;
        }

        self.frame_counter += out.len() as u64;
    }

    pub fn is_sustain_down(&self) -> bool {
        self.sustain
    }

    /// Voices not yet free.
    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|voice| !voice.is_free()).count()
    }

    fn handle(&mut self, message: SynthMessage) {
        match message {
            SynthMessage::NoteOn {
                voice,
                note,
                velocity,
            } => {
                let age = self.frame_counter;
                let slot = match self.find_voice(voice, note) {
                    Some(index) => Some(index),
                    None => self.allocate_voice(),
                };
                if let Some(index) = slot {
                    self.voices[index].start(voice, note, velocity, age);
                }
            }
            SynthMessage::NoteOff { voice, note } => {
                if let Some(index) = self.find_voice(voice, note) {
                    if self.sustain {
                        self.voices[index].sustain();
                    } else {
                        self.voices[index].release();
                    }
                }
            }
            SynthMessage::Sustain { on } => {
                self.sustain = on;
                if !on {
                    for voice in &mut self.voices {
                        if voice.state() == VoiceState::Sustained {
                            voice.release();
                        }
                    }
                }
            }
            SynthMessage::AllNotesOff => {
                self.sustain = false;
                for voice in &mut self.voices {
                    voice.release();
                }
            }
        }
    }

    fn allocate_voice(&mut self) -> Option<usize> {
        if let Some(index) = self.voices.iter().position(SynthVoice::is_free) {
            return Some(index);
        }

        // Steal the oldest releasing voice, then the oldest of all
        let oldest_releasing = self
            .voices
            .iter()
            .enumerate()
            .filter(|(_, voice)| voice.state() == VoiceState::Releasing)
            .min_by_key(|(_, voice)| voice.age())
            .map(|(index, _)| index);

        oldest_releasing.or_else(|| {
            self.voices
                .iter()
                .enumerate()
                .min_by_key(|(_, voice)| voice.age())
                .map(|(index, _)| index)
        })
    }

    fn find_voice(&self, owner: u8, note: u8) -> Option<usize> {
        self.voices
            .iter()
            .position(|voice| voice.is_playing(owner, note))
    }
}

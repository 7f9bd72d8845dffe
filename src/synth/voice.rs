use crate::sequencing::VoiceId;

use super::envelope::Envelope;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Available for allocation
    Active,    // Key down
    Sustained, // Key up, held by the pedal
    Releasing, // Envelope in release phase
}

/// One sounding note: a triangle oscillator under an envelope.
#[derive(Debug, Clone)]
pub struct SynthVoice {
    owner: VoiceId,
    note: u8,
    velocity: f32,
    state: VoiceState,
    age: u64,
    sample_rate: f32,
    phase: f32,
    phase_step: f32,
    envelope: Envelope,
}

impl SynthVoice {
    pub fn new(sample_rate: f32, envelope: Envelope) -> Self {
        Self {
            owner: 0,
            note: 0,
            velocity: 0.0,
            state: VoiceState::Free,
            age: 0,
            sample_rate,
            phase: 0.0,
            phase_step: 0.0,
            envelope,
        }
    }

    pub fn start(&mut self, owner: VoiceId, note: u8, velocity: f32, age: u64) {
        self.owner = owner;
        self.note = note;
        self.velocity = velocity.clamp(0.0, 1.0);
        self.state = VoiceState::Active;
        self.age = age;
        self.phase = 0.0;
        self.phase_step = midi_to_freq(note) / self.sample_rate;
        self.envelope.note_on();
    }

    /// Key up while the pedal holds the strings.
    pub fn sustain(&mut self) {
        if self.state == VoiceState::Active {
            self.state = VoiceState::Sustained;
        }
    }

    pub fn release(&mut self) {
        if matches!(self.state, VoiceState::Active | VoiceState::Sustained) {
            self.state = VoiceState::Releasing;
            self.envelope.note_off();
        }
    }

    /// Mix this voice into `out`.
    pub fn render_add(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            let triangle = 4.0 * (self.phase - 0.5).abs() - 1.0;
            *sample += triangle * self.envelope.next_sample() * self.velocity;
            self.phase = (self.phase + self.phase_step).fract();
        }

        if self.state == VoiceState::Releasing && !self.envelope.is_active() {
            self.state = VoiceState::Free;
        }
    }

    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Free
    }

    /// Plays `note` for `owner` and has not been released.
    pub fn is_playing(&self, owner: VoiceId, note: u8) -> bool {
        self.owner == owner
            && self.note == note
            && matches!(self.state, VoiceState::Active | VoiceState::Sustained)
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }
}

fn midi_to_freq(note: u8) -> f32 {
    440.0 * 2f32.powf((f32::from(note) - 69.0) / 12.0)
}

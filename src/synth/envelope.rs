/*
Piano-ish Envelope
==================

A linear ADSR, one per synth voice. The sequencer never sends durations,
only note-on and note-off, so the envelope is driven purely by the gate:

  Level
    1.0 ┐  ╱╲
        │ ╱  ╲______________
    S   │╱                  ╲
    0.0 └────────────────────╲──→ Time
        A  D   sustain        R
                 ^ gate low (or pedal up)

A key held down decays to the sustain level and stays there. A release
starts from whatever level the envelope is at, so letting go during the
attack does not click.

Stage durations are converted to sample counts once, at construction:

    samples = seconds * sample_rate

Release snapshots its start level and interpolates down to exactly 0.0.
*/

/// Shortest stage duration, one sample at 48kHz.
pub const MIN_TIME: f32 = 1.0 / 48_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

#[derive(Debug, Clone)]
pub struct Envelope {
    attack_step: f32,
    decay_samples: f32,
    sustain_level: f32,
    release_samples: u32,

    stage: EnvelopeStage,
    level: f32,

    release_start: f32,
    release_elapsed: u32,
}

impl Envelope {
    /// Times in seconds, sustain as a level in 0.0..=1.0.
    pub fn adsr(sample_rate: f32, attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack_step: 1.0 / (attack.max(MIN_TIME) * sample_rate),
            decay_samples: decay.max(MIN_TIME) * sample_rate,
            sustain_level: sustain.clamp(0.0, 1.0),
            release_samples: (release.max(MIN_TIME) * sample_rate).round().max(1.0) as u32,

            stage: EnvelopeStage::Idle,
            level: 0.0,
            release_start: 0.0,
            release_elapsed: 0,
        }
    }

    /// Restart the attack from silence.
    pub fn note_on(&mut self) {
        self.level = 0.0;
        self.stage = EnvelopeStage::Attack;
        self.release_elapsed = 0;
    }

    pub fn note_off(&mut self) {
        if matches!(self.stage, EnvelopeStage::Idle | EnvelopeStage::Release) {
            return;
        }
        self.release_start = self.level;
        self.release_elapsed = 0;
        self.stage = EnvelopeStage::Release;
    }

    pub fn next_sample(&mut self) -> f32 {
        match self.stage {
            EnvelopeStage::Idle => self.level = 0.0,

            EnvelopeStage::Attack => {
                self.level += self.attack_step;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = EnvelopeStage::Decay;
                }
            }

            EnvelopeStage::Decay => {
                self.level -= (1.0 - self.sustain_level) / self.decay_samples;
                if self.level <= self.sustain_level {
                    self.level = self.sustain_level;
                    self.stage = EnvelopeStage::Sustain;
                }
            }

            EnvelopeStage::Sustain => self.level = self.sustain_level,

            EnvelopeStage::Release => {
                let progress = self.release_elapsed as f32 / self.release_samples as f32;
                self.level = (self.release_start * (1.0 - progress)).max(0.0);
                self.release_elapsed = self.release_elapsed.saturating_add(1);
                if self.release_elapsed >= self.release_samples {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Idle
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn run(env: &mut Envelope, samples: usize) {
        for _ in 0..samples {
            env.next_sample();
        }
    }

    #[test]
    fn held_key_settles_on_sustain() {
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.01, 0.05, 0.6, 0.2);
        env.note_on();
        run(&mut env, 70);

        assert_eq!(env.stage(), EnvelopeStage::Sustain);
        assert!((env.level() - 0.6).abs() < 1e-3);
    }

    #[test]
    fn release_during_attack_falls_to_idle() {
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.1, 0.05, 0.6, 0.03);
        env.note_on();
        run(&mut env, 20);
        let peak = env.level();
        assert!(peak < 1.0);

        env.note_off();
        assert!(env.next_sample() <= peak);
        run(&mut env, 40);
        assert_eq!(env.stage(), EnvelopeStage::Idle);
        assert_eq!(env.level(), 0.0);
    }

    #[test]
    fn note_off_while_idle_stays_idle() {
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.01, 0.05, 0.6, 0.03);
        env.note_off();
        assert!(!env.is_active());
    }
}

//! Computer keyboard as a four-key piano.
//!
//! Two letters per hand are enough to play legato: alternate them and the
//! next chord starts before the previous key is let go.

use std::collections::HashSet;

use crate::sequencing::InputEvent;

/// Velocity of every press; a typing keyboard has no dynamics.
pub const PRESS_VELOCITY: f32 = 0.5;

/// Letters and the trigger pitches they send. Pitches below middle C drive
/// the left hand.
pub const KEY_MAP: [(char, u8); 4] = [('y', 58), ('x', 59), ('k', 60), ('l', 61)];

#[derive(Debug, Clone, Default)]
pub struct KeyboardController {
    pressed: HashSet<char>,
}

impl KeyboardController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pitch_for(letter: char) -> Option<u8> {
        let letter = letter.to_ascii_lowercase();
        KEY_MAP
            .iter()
            .find(|(key, _)| *key == letter)
            .map(|(_, pitch)| *pitch)
    }

    /// `None` for unmapped letters and for auto-repeat of a letter held down.
    pub fn press(&mut self, letter: char) -> Option<InputEvent> {
        let pitch = Self::pitch_for(letter)?;
        self.pressed
            .insert(letter.to_ascii_lowercase())
            .then(|| InputEvent::note_on(pitch, PRESS_VELOCITY))
    }

    pub fn release(&mut self, letter: char) -> Option<InputEvent> {
        let pitch = Self::pitch_for(letter)?;
        self.pressed
            .remove(&letter.to_ascii_lowercase())
            .then(|| InputEvent::note_off(pitch))
    }

    /// Let go of every key still down.
    pub fn release_all(&mut self) -> Vec<InputEvent> {
        let mut letters: Vec<char> = self.pressed.drain().collect();
        letters.sort_unstable();
        letters
            .into_iter()
            .filter_map(Self::pitch_for)
            .map(InputEvent::note_off)
            .collect()
    }

    pub fn is_pressed(&self, letter: char) -> bool {
        self.pressed.contains(&letter.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencing::NoteEventKind;

    #[test]
    fn maps_letters_to_hands() {
        assert_eq!(KeyboardController::pitch_for('y'), Some(58));
        assert_eq!(KeyboardController::pitch_for('X'), Some(59));
        assert_eq!(KeyboardController::pitch_for('k'), Some(60));
        assert_eq!(KeyboardController::pitch_for('l'), Some(61));
        assert_eq!(KeyboardController::pitch_for('q'), None);
    }

    #[test]
    fn auto_repeat_is_swallowed() {
        let mut keys = KeyboardController::new();
        let first = keys.press('k').unwrap();
        assert_eq!(first.kind, NoteEventKind::NoteOn);
        assert_eq!(first.velocity, PRESS_VELOCITY);
        assert!(keys.press('k').is_none());

        let release = keys.release('k').unwrap();
        assert_eq!(release.kind, NoteEventKind::NoteOff);
        assert_eq!(release.velocity, 0.0);
        assert!(keys.release('k').is_none());
        assert!(keys.press('k').is_some());
    }

    #[test]
    fn release_all_lets_go_of_held_keys() {
        let mut keys = KeyboardController::new();
        keys.press('l');
        keys.press('y');
        let released: Vec<u8> = keys.release_all().iter().map(|event| event.pitch).collect();
        assert_eq!(released, vec![61, 58]);
        assert!(!keys.is_pressed('l'));
    }
}

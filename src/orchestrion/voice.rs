use log::trace;

use crate::sequencing::{Gesture, NoteEventKind, Tick, VoiceId};

/*
Voice Sequencer
===============

One voice of the score, played gesture by gesture. The score is a fixed list
of gestures (chords, rests, blanks); the player's key presses decide *when*
the cursor moves, never *what* is played.

The Active Range
----------------

The only mutable state is a half-open range `[begin, end)` into the gesture
list:

  gestures:  [ A ][ rest ][ B ][ C ]
               0     1      2    3

  idle at start   begin=0 end=0    nothing sounding, A is next
  A sounding      begin=0 end=1
  rest landed     begin=1 end=2    A released, the rest is "played"
  B sounding      begin=2 end=3
  finished        begin=4 end=4

`begin` is the first gesture not yet released, `end` one past the last one
started. Both only ever move forward (seeks aside), and at most one gesture
is inside the range.

Press vs. Release
-----------------

  press    Skip over rests: the player asked for sound, so the next chord
           starts. Whatever was sounding is released on the way.
  release  Release what is sounding. If the next gesture is a rest, land on
           it; if it is a chord, stop in front of it without starting it.

A release only counts if it is for the key that did the last press. With two
fingers playing legato the late release of the first key must not cut off
the chord the second key just started.

The Cursor
----------

The coordinator passes in the earliest tick any voice of the hand is waiting
for. A voice whose next gesture lies later than that simply waits, which is
how a half note in one voice outlasts two quarters in another.
*/

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Range {
    begin: usize,
    end: usize,
}

/// Pitches a voice starts and stops in response to one input event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    pub note_ons: Vec<u8>,
    pub note_offs: Vec<u8>,
}

impl Transition {
    pub fn is_empty(&self) -> bool {
        self.note_ons.is_empty() && self.note_offs.is_empty()
    }
}

/// Cursor over one voice's gestures.
pub struct VoiceSequencer {
    voice: VoiceId,
    gestures: Vec<Gesture>,
    active: Range,
    pressed_key: Option<u8>,
}

impl VoiceSequencer {
    /// `gestures` must be sorted by begin tick.
    pub fn new(voice: VoiceId, gestures: Vec<Gesture>) -> Self {
        Self {
            voice,
            gestures,
            active: Range::default(),
            pressed_key: None,
        }
    }

    pub fn voice(&self) -> VoiceId {
        self.voice
    }

    pub fn gestures(&self) -> &[Gesture] {
        &self.gestures
    }

    /// Indices of the gestures currently in the active range.
    pub fn active(&self) -> std::ops::Range<usize> {
        self.active.begin..self.active.end
    }

    /// Something (a chord or a landed rest) occupies the active range.
    pub fn is_sounding(&self) -> bool {
        self.active.begin < self.active.end
    }

    /// Every gesture has been played and released.
    pub fn is_finished(&self) -> bool {
        self.active.begin == self.gestures.len()
    }

    /// Feed one input event and report which pitches to start and stop.
    pub fn on_input_event(&mut self, kind: NoteEventKind, pitch: u8, cursor: Tick) -> Transition {
        let before = self.active;
        self.advance(kind, pitch, cursor);
        match kind {
            NoteEventKind::NoteOn => self.pressed_key = Some(pitch),
            NoteEventKind::NoteOff if self.pressed_key == Some(pitch) => self.pressed_key = None,
            NoteEventKind::NoteOff => {}
        }
        let after = self.active;

        let mut note_offs = Vec::new();
        for gesture in &self.gestures[before.begin..after.begin] {
            gesture.set_highlight(false);
            note_offs.extend_from_slice(gesture.pitches());
        }

        let note_ons: Vec<u8> = self.gestures[before.end..after.end]
            .iter()
            .flat_map(|gesture| gesture.pitches().iter().copied())
            .collect();

        // A pitch struck again right away keeps sounding instead of being cut
        note_offs.retain(|pitch| !note_ons.contains(pitch));

        if after.begin < after.end {
            let current = &self.gestures[after.end - 1];
            current.set_highlight(true);
            current.scroll_to_you();
        }

        Transition {
            note_ons,
            note_offs,
        }
    }

    /// Release everything and park in front of the first chord at or after
    /// the notated position `tick`. Returns the pitches that were sounding.
    pub fn go_to_tick(&mut self, tick: u32) -> Vec<u8> {
        let mut note_offs = Vec::new();
        for gesture in &self.gestures[self.active.begin..self.active.end] {
            gesture.set_highlight(false);
            note_offs.extend_from_slice(gesture.pitches());
        }

        // Notated ticks are unsorted once repeats are unrolled; first pass wins
        let index = self
            .gestures
            .iter()
            .position(|gesture| !gesture.is_silent() && gesture.begin_tick().without_repeats >= tick)
            .unwrap_or(self.gestures.len());

        self.active = Range {
            begin: index,
            end: index,
        };
        self.pressed_key = None;
        note_offs
    }

    /// The tick this voice waits for before it reacts to `kind`, or `None`
    /// once there is nothing left to start or release.
    pub fn next_tick(&self, kind: NoteEventKind) -> Option<Tick> {
        let next = self.next_begin(kind);
        match self.gestures.get(next) {
            Some(gesture) => Some(gesture.begin_tick()),
            None => self.release_tick(),
        }
    }

    /// Begin tick of the earliest unreleased gesture, when it matters for the
    /// pedal: a chord, or the very last gesture so a trailing rest cannot hold
    /// the pedal timeline back forever.
    pub fn tick_for_pedal(&self) -> Option<Tick> {
        let begin = self.active.begin;
        let gesture = self.gestures.get(begin)?;
        (gesture.is_chord() || begin + 1 == self.gestures.len()).then(|| gesture.begin_tick())
    }

    /// Begin tick of the earliest unreleased gesture.
    pub fn current_tick(&self) -> Option<Tick> {
        self.gestures.get(self.active.begin).map(Gesture::begin_tick)
    }

    fn next_begin(&self, kind: NoteEventKind) -> usize {
        let mut index = self.active.end;
        if kind == NoteEventKind::NoteOn {
            while index < self.gestures.len() && self.gestures[index].is_silent() {
                index += 1;
            }
        }
        index
    }

    /// When the current range may be dropped after the last gesture has been
    /// started: at the next (silent) gesture, or at the end of the score.
    fn release_tick(&self) -> Option<Tick> {
        match self.gestures.get(self.active.end) {
            Some(gesture) => Some(gesture.begin_tick()),
            None if self.is_sounding() => self.gestures.last().map(Gesture::end_tick),
            None => None,
        }
    }

    fn advance(&mut self, kind: NoteEventKind, pitch: u8, cursor: Tick) {
        if kind == NoteEventKind::NoteOff && self.pressed_key != Some(pitch) {
            trace!(
                "voice {}: ignoring release of {} (holding {:?})",
                self.voice,
                pitch,
                self.pressed_key
            );
            return;
        }

        let len = self.gestures.len();
        let next = self.next_begin(kind);

        if next == len {
            if self.release_tick().map_or(true, |tick| cursor >= tick) {
                self.active = Range {
                    begin: len,
                    end: len,
                };
            }
            return;
        }

        let candidate = &self.gestures[next];
        if cursor < candidate.begin_tick() {
            // Another voice of the hand is still catching up
            return;
        }

        let opens = !(kind == NoteEventKind::NoteOff && !candidate.is_silent());
        self.active = Range {
            begin: next,
            end: if opens { next + 1 } else { next },
        };
    }
}

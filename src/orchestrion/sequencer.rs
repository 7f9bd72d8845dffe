use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, trace};

use crate::sequencing::{
    Gesture, InputEvent, NoteEvent, NoteEventKind, OutputEvent, PedalEvent, PedalSequence, Tick,
    VoiceId,
};

use super::config::{DeliveryConfig, LoopSettings};
use super::delivery::{DeliveryWorker, Scheduled};
use super::error::OrchestrionError;
use super::humanize::Humanizer;
use super::voice::VoiceSequencer;

/// Gestures of every voice of one hand, keyed and ordered by voice id.
pub type Staff = BTreeMap<VoiceId, Vec<Gesture>>;

/// Receives every note batch and pedal change, on the delivery threads.
pub type OutputCallback = Arc<dyn Fn(OutputEvent) + Send + Sync>;

/// Input pitches below this go to the left hand.
pub const MIDDLE_C: u8 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HandSide {
    Right,
    Left,
}

/// Plays a two-handed score from a stream of key presses.
///
/// Every key press moves each voice of one hand one gesture forward; which
/// notes come out is entirely up to the score. Output is delivered from two
/// background threads, one for notes and one for the pedal, so humanization
/// and pedal latency never block the caller.
///
/// Dropping the sequencer lifts the pedal if it is down, delivers everything
/// still queued and joins both threads.
pub struct OrchestrionSequencer {
    track: u32,
    right_hand: Vec<VoiceSequencer>,
    left_hand: Vec<VoiceSequencer>,
    pedal_sequence: PedalSequence,
    pedal_cursor: usize,
    pedal_down: bool,
    looping: LoopSettings,
    held_keys: HashSet<u8>,
    humanizer: Humanizer,
    pedal_delay: Duration,
    note_worker: DeliveryWorker<Vec<NoteEvent>>,
    pedal_worker: DeliveryWorker<PedalEvent>,
}

impl OrchestrionSequencer {
    pub fn new(
        track: u32,
        right: Staff,
        left: Staff,
        pedal_sequence: PedalSequence,
        config: DeliveryConfig,
        callback: OutputCallback,
    ) -> Result<Self, OrchestrionError> {
        let notes_callback = callback.clone();
        let note_worker = DeliveryWorker::spawn("notes", move |notes: Vec<NoteEvent>| {
            notes_callback(OutputEvent::Notes(notes))
        })
        .map_err(|source| OrchestrionError::Spawn {
            name: "notes",
            source,
        })?;

        let pedal_worker = DeliveryWorker::spawn("pedal", move |pedal: PedalEvent| {
            callback(OutputEvent::Pedal(pedal))
        })
        .map_err(|source| OrchestrionError::Spawn {
            name: "pedal",
            source,
        })?;

        let right_hand: Vec<VoiceSequencer> = right
            .into_iter()
            .map(|(voice, gestures)| VoiceSequencer::new(voice, gestures))
            .collect();
        let left_hand: Vec<VoiceSequencer> = left
            .into_iter()
            .map(|(voice, gestures)| VoiceSequencer::new(voice, gestures))
            .collect();

        info!(
            "track {}: {} right voice(s), {} left voice(s), {} pedal change(s)",
            track,
            right_hand.len(),
            left_hand.len(),
            pedal_sequence.len()
        );

        Ok(Self {
            track,
            right_hand,
            left_hand,
            pedal_sequence,
            pedal_cursor: 0,
            pedal_down: false,
            looping: LoopSettings::default(),
            held_keys: HashSet::new(),
            humanizer: Humanizer::new(&config),
            pedal_delay: config.pedal_delay,
            note_worker,
            pedal_worker,
        })
    }

    pub fn track(&self) -> u32 {
        self.track
    }

    pub fn right_hand(&self) -> &[VoiceSequencer] {
        &self.right_hand
    }

    pub fn left_hand(&self) -> &[VoiceSequencer] {
        &self.left_hand
    }

    /// Both hands, right first.
    pub fn voices(&self) -> impl Iterator<Item = &VoiceSequencer> {
        self.right_hand.iter().chain(self.left_hand.iter())
    }

    /// Whether the last pedal change sent was a press.
    pub fn is_pedal_down(&self) -> bool {
        self.pedal_down
    }

    pub fn loop_settings(&self) -> LoopSettings {
        self.looping
    }

    pub fn set_loop_settings(&mut self, looping: LoopSettings) {
        self.looping = looping;
    }

    pub fn set_loop_enabled(&mut self, enabled: bool) {
        self.looping.enabled = enabled;
    }

    pub fn set_loop_left(&mut self, tick: u32) {
        self.looping.left = tick;
    }

    pub fn set_loop_right(&mut self, tick: Option<u32>) {
        self.looping.right = tick;
    }

    /// Which hand an input pitch drives.
    pub fn hand_for(&self, pitch: u8) -> HandSide {
        if pitch < MIDDLE_C && !self.left_hand.is_empty() {
            HandSide::Left
        } else {
            HandSide::Right
        }
    }

    /// Begin tick of the earliest unreleased gesture in either hand.
    pub fn position(&self) -> Option<Tick> {
        self.voices().filter_map(VoiceSequencer::current_tick).min()
    }

    pub fn on_input_event(&mut self, input: InputEvent) {
        match input.kind {
            NoteEventKind::NoteOn => {
                if !self.held_keys.insert(input.pitch) {
                    trace!("key {} already held, ignoring", input.pitch);
                    return;
                }
            }
            NoteEventKind::NoteOff => {
                self.held_keys.remove(&input.pitch);
            }
        }

        let side = self.hand_for(input.pitch);
        let Some(cursor) = self.cursor_for(side, input.kind) else {
            trace!("{:?} hand has nothing left to play", side);
            return;
        };

        let mut batch = Vec::new();
        for voice in self.hand_mut(side) {
            let transition = voice.on_input_event(input.kind, input.pitch, cursor);
            let id = voice.voice();
            batch.extend(transition.note_offs.iter().map(|&pitch| NoteEvent {
                kind: NoteEventKind::NoteOff,
                voice: id,
                pitch,
                velocity: input.velocity,
            }));
            batch.extend(transition.note_ons.iter().map(|&pitch| NoteEvent {
                kind: NoteEventKind::NoteOn,
                voice: id,
                pitch,
                velocity: input.velocity,
            }));
        }
        if !batch.is_empty() {
            self.post_note_events(batch);
        }

        self.follow_pedal(input.kind);

        if self.pedal_down && self.voices().all(|voice| voice.next_tick(NoteEventKind::NoteOff).is_none()) {
            debug!("nothing left sounding, lifting pedal");
            self.post_pedal_event(false);
        }
    }

    /// Silence everything and move every voice to the first chord at or
    /// after the notated position `tick`.
    pub fn go_to_tick(&mut self, tick: u32) {
        let mut batch = Vec::new();
        for voice in self.right_hand.iter_mut().chain(self.left_hand.iter_mut()) {
            let id = voice.voice();
            batch.extend(voice.go_to_tick(tick).into_iter().map(|pitch| NoteEvent {
                kind: NoteEventKind::NoteOff,
                voice: id,
                pitch,
                velocity: 0.0,
            }));
        }
        if !batch.is_empty() {
            self.note_worker.post(Scheduled::now(batch));
        }

        if self.pedal_down {
            self.post_pedal_event(false);
        }

        let landing = self.position().map_or(tick, |position| position.with_repeats);
        self.pedal_cursor = self.pedal_sequence.lower_bound(landing);
        debug!(
            "went to tick {} (pedal cursor {}/{})",
            tick,
            self.pedal_cursor,
            self.pedal_sequence.len()
        );
    }

    /// The tick the hand waits for, wrapping around the loop when a press
    /// would step past its right bound. Wraps at most once per input.
    fn cursor_for(&mut self, side: HandSide, kind: NoteEventKind) -> Option<Tick> {
        let cursor = Self::least_next_tick(self.hand(side), kind);
        if kind != NoteEventKind::NoteOn {
            return cursor;
        }
        let Some(right) = self.looping.active_right() else {
            return cursor;
        };
        if cursor.is_some_and(|tick| tick.without_repeats < right) {
            return cursor;
        }

        info!("loop: wrapping to tick {}", self.looping.left);
        self.go_to_tick(self.looping.left);
        Self::least_next_tick(self.hand(side), kind)
    }

    fn least_next_tick(hand: &[VoiceSequencer], kind: NoteEventKind) -> Option<Tick> {
        hand.iter().filter_map(|voice| voice.next_tick(kind)).min()
    }

    fn hand(&self, side: HandSide) -> &[VoiceSequencer] {
        match side {
            HandSide::Right => &self.right_hand,
            HandSide::Left => &self.left_hand,
        }
    }

    fn hand_mut(&mut self, side: HandSide) -> &mut [VoiceSequencer] {
        match side {
            HandSide::Right => &mut self.right_hand,
            HandSide::Left => &mut self.left_hand,
        }
    }

    /// Catch the pedal timeline up with the earliest unreleased chord.
    fn follow_pedal(&mut self, kind: NoteEventKind) {
        let target = match self.voices().filter_map(VoiceSequencer::tick_for_pedal).min() {
            Some(tick) => self.pedal_sequence.upper_bound(tick.with_repeats),
            None => self.pedal_sequence.len(),
        };
        if target <= self.pedal_cursor {
            return;
        }

        let last = self.pedal_sequence.items()[target - 1];
        trace!("pedal cursor {} -> {}", self.pedal_cursor, target);
        self.pedal_cursor = target;

        let down = kind == NoteEventKind::NoteOn && last.down;
        if down || self.pedal_down {
            self.post_pedal_event(down);
        }
    }

    fn post_note_events(&mut self, events: Vec<NoteEvent>) {
        let now = Instant::now();
        let slots = self.humanizer.schedule(events);
        self.note_worker.post_all(slots.into_iter().map(|(offset, batch)| {
            if offset.is_zero() {
                Scheduled::now(batch)
            } else {
                Scheduled::at(now + offset, batch)
            }
        }));
    }

    /// Queue a pedal change. A press while the pedal is already down is
    /// preceded by an immediate release so the dampers get re-struck.
    fn post_pedal_event(&mut self, on: bool) {
        let event = PedalEvent {
            track: self.track,
            on,
        };

        if on {
            let mut entries = Vec::with_capacity(2);
            if self.pedal_down {
                entries.push(Scheduled::now(PedalEvent {
                    track: self.track,
                    on: false,
                }));
            }
            entries.push(Scheduled::at(Instant::now() + self.pedal_delay, event));
            self.pedal_worker.post_all(entries);
        } else {
            self.pedal_worker.post(Scheduled::now(event));
        }

        self.pedal_down = on;
    }
}

impl Drop for OrchestrionSequencer {
    fn drop(&mut self) {
        if self.pedal_down {
            self.post_pedal_event(false);
        }
        self.pedal_worker.shutdown();
        self.note_worker.shutdown();
    }
}

//! JSON score files.
//!
//! A score file holds notated chords per voice and hand, sustain-pedal marks
//! and the order in which notated sections are played. Extraction unrolls the
//! sections into playback order and produces exactly what the sequencer
//! consumes: a [`Staff`] per hand and a [`PedalSequence`].
//!
//! ```json
//! {
//!   "track": 0,
//!   "repeats": [[0, 1920], [0, 3840]],
//!   "right": { "0": [ { "tick": 0, "duration": 480, "pitches": [60, 64] } ] },
//!   "left":  { "0": [ { "tick": 0, "duration": 960, "pitches": [48] } ] },
//!   "pedals": [ { "tick": 0, "duration": 960 } ]
//! }
//! ```
//!
//! A chord without pitches is a rest.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::orchestrion::{HandSide, Staff};
use crate::sequencing::{Chord, ChordView, Gesture, PedalSequence, Tick, VoiceBlank, VoiceId};

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("failed to read score file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed score: {0}")]
    Json(#[from] serde_json::Error),
    #[error("score has no chords")]
    Empty,
    #[error("repeat section {index} is empty ([{begin}, {end}))")]
    EmptySection { index: usize, begin: u32, end: u32 },
    #[error("{side:?} voice {voice}: pitch {pitch} at tick {tick} is out of range")]
    PitchOutOfRange {
        side: HandSide,
        voice: VoiceId,
        tick: u32,
        pitch: u8,
    },
    #[error("{side:?} voice {voice}: chord at tick {tick} comes before the previous one")]
    Unsorted {
        side: HandSide,
        voice: VoiceId,
        tick: u32,
    },
    #[error("mark at tick {tick} ends past the last representable tick")]
    TickOverflow { tick: u32 },
}

/// One notated chord or rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordMark {
    pub tick: u32,
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pitches: Vec<u8>,
}

/// One notated sustain-pedal span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PedalMark {
    pub tick: u32,
    pub duration: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreFile {
    #[serde(default)]
    pub track: u32,
    /// Notated `[begin, end)` sections in playback order. Empty means the
    /// whole score once.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repeats: Vec<(u32, u32)>,
    #[serde(default)]
    pub right: BTreeMap<VoiceId, Vec<ChordMark>>,
    #[serde(default)]
    pub left: BTreeMap<VoiceId, Vec<ChordMark>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pedals: Vec<PedalMark>,
}

/// Address of one gesture in an extracted score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GestureKey {
    pub side: HandSide,
    pub voice: VoiceId,
    /// Index into the voice's gestures, blanks included.
    pub index: usize,
}

/// Everything the sequencer needs to play one track.
#[derive(Debug, Clone)]
pub struct ExtractedScore {
    pub track: u32,
    pub right: Staff,
    pub left: Staff,
    pub pedal: PedalSequence,
}

impl ScoreFile {
    pub fn from_json(text: &str) -> Result<Self, ScoreError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScoreError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ScoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String, ScoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ScoreError> {
        let hands = [(HandSide::Right, &self.right), (HandSide::Left, &self.left)];

        if hands
            .iter()
            .all(|(_, staff)| staff.values().all(|marks| marks.iter().all(|mark| mark.pitches.is_empty())))
        {
            return Err(ScoreError::Empty);
        }

        for (index, &(begin, end)) in self.repeats.iter().enumerate() {
            if end <= begin {
                return Err(ScoreError::EmptySection { index, begin, end });
            }
        }

        for (side, staff) in hands {
            for (&voice, marks) in staff {
                for mark in marks {
                    if let Some(&pitch) = mark.pitches.iter().find(|&&pitch| pitch > 127) {
                        return Err(ScoreError::PitchOutOfRange {
                            side,
                            voice,
                            tick: mark.tick,
                            pitch,
                        });
                    }
                }
                if let Some(pair) = marks.windows(2).find(|pair| pair[1].tick <= pair[0].tick) {
                    return Err(ScoreError::Unsorted {
                        side,
                        voice,
                        tick: pair[1].tick,
                    });
                }
            }
        }

        self.check_tick_range()
    }

    /// Every mark must end within `u32`, both notated and once repeats are
    /// unrolled.
    fn check_tick_range(&self) -> Result<(), ScoreError> {
        let marks: Vec<(u32, u32)> = self
            .right
            .values()
            .chain(self.left.values())
            .flatten()
            .map(|mark| (mark.tick, mark.duration))
            .chain(self.pedals.iter().map(|mark| (mark.tick, mark.duration)))
            .collect();

        for &(tick, duration) in &marks {
            tick.checked_add(duration).ok_or(ScoreError::TickOverflow { tick })?;
        }

        let mut offset: u32 = 0;
        for (begin, end) in self.sections() {
            for &(tick, duration) in marks.iter().filter(|(tick, _)| (begin..end).contains(tick)) {
                offset
                    .checked_add(tick - begin)
                    .and_then(|start| start.checked_add(duration))
                    .ok_or(ScoreError::TickOverflow { tick })?;
            }
            offset = offset
                .checked_add(end - begin)
                .ok_or(ScoreError::TickOverflow { tick: end })?;
        }
        Ok(())
    }

    /// Notated end of the last chord or pedal mark.
    pub fn notated_end(&self) -> u32 {
        let chords = self
            .right
            .values()
            .chain(self.left.values())
            .flatten()
            .map(|mark| mark.tick.saturating_add(mark.duration));
        let pedals = self.pedals.iter().map(|mark| mark.tick.saturating_add(mark.duration));
        chords.chain(pedals).max().unwrap_or(0)
    }

    /// The sections actually played, in order.
    pub fn sections(&self) -> Vec<(u32, u32)> {
        if self.repeats.is_empty() {
            vec![(0, self.notated_end())]
        } else {
            self.repeats.clone()
        }
    }

    pub fn extract(&self) -> Result<ExtractedScore, ScoreError> {
        self.extract_with_views(|_| None)
    }

    /// Validate and unroll the score. `view` is asked once per chord for the
    /// handle that will show it highlighted.
    pub fn extract_with_views<F>(&self, mut view: F) -> Result<ExtractedScore, ScoreError>
    where
        F: FnMut(GestureKey) -> Option<Arc<dyn ChordView>>,
    {
        self.validate()?;
        let sections = self.sections();

        let mut extract_staff = |side: HandSide, staff: &BTreeMap<VoiceId, Vec<ChordMark>>| -> Staff {
            staff
                .iter()
                .map(|(&voice, marks)| {
                    let gestures = unroll_voice(marks, &sections, |index| view(GestureKey { side, voice, index }));
                    (voice, gestures)
                })
                .collect()
        };
        let right = extract_staff(HandSide::Right, &self.right);
        let left = extract_staff(HandSide::Left, &self.left);

        let mut spans = Vec::new();
        for (offset, begin, end) in playback_offsets(&sections) {
            let mut marks: Vec<&PedalMark> = self
                .pedals
                .iter()
                .filter(|mark| (begin..end).contains(&mark.tick))
                .collect();
            marks.sort_by_key(|mark| mark.tick);
            spans.extend(marks.into_iter().map(|mark| {
                let on = offset + (mark.tick - begin);
                (on, on + mark.duration)
            }));
        }
        let pedal = PedalSequence::from_spans(spans);

        debug!(
            "extracted track {}: {} section(s), {} pedal change(s)",
            self.track,
            sections.len(),
            pedal.len()
        );

        Ok(ExtractedScore {
            track: self.track,
            right,
            left,
            pedal,
        })
    }
}

/// `(playback offset, notated begin, notated end)` per section.
fn playback_offsets(sections: &[(u32, u32)]) -> impl Iterator<Item = (u32, u32, u32)> + '_ {
    sections.iter().scan(0, |offset, &(begin, end)| {
        let start = *offset;
        *offset += end - begin;
        Some((start, begin, end))
    })
}

fn unroll_voice<F>(marks: &[ChordMark], sections: &[(u32, u32)], mut view: F) -> Vec<Gesture>
where
    F: FnMut(usize) -> Option<Arc<dyn ChordView>>,
{
    let mut gestures: Vec<Gesture> = Vec::new();
    for (offset, begin, end) in playback_offsets(sections) {
        for mark in marks.iter().filter(|mark| (begin..end).contains(&mark.tick)) {
            let start = Tick::new(offset + (mark.tick - begin), mark.tick);
            let stop = Tick::new(start.with_repeats + mark.duration, mark.tick + mark.duration);

            if let Some(previous) = gestures.last() {
                let gap_start = previous.end_tick();
                if gap_start < start {
                    gestures.push(
                        VoiceBlank {
                            begin: gap_start,
                            end: start,
                        }
                        .into(),
                    );
                }
            }

            let chord = if mark.pitches.is_empty() {
                Chord::rest(start, stop)
            } else {
                let chord = Chord::new(mark.pitches.clone(), start, stop);
                match view(gestures.len()) {
                    Some(handle) => chord.with_view(handle),
                    None => chord,
                }
            };
            gestures.push(chord.into());
        }
    }
    gestures
}

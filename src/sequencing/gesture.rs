use std::fmt;
use std::sync::Arc;

use super::tick::Tick;

/// UI-side handle attached to a chord.
///
/// The sequencer calls these synchronously on the thread that feeds it input.
/// Implementations must not block; if they touch UI state that lives on
/// another thread, marshaling is their job.
pub trait ChordView: Send + Sync {
    fn set_highlight(&self, on: bool);

    fn scroll_to_you(&self) {}
}

/// A chord or rest taken from the score.
///
/// `pitches` holds only the notes that are struck at this chord; notes tied
/// over from the previous chord are left out by the extractor. A rest has no
/// pitches and `is_chord == false`.
#[derive(Clone)]
pub struct Chord {
    is_chord: bool,
    pitches: Vec<u8>,
    begin: Tick,
    end: Tick,
    view: Option<Arc<dyn ChordView>>,
}

impl Chord {
    pub fn new(pitches: Vec<u8>, begin: Tick, end: Tick) -> Self {
        Self {
            is_chord: true,
            pitches,
            begin,
            end,
            view: None,
        }
    }

    pub fn rest(begin: Tick, end: Tick) -> Self {
        Self {
            is_chord: false,
            pitches: Vec::new(),
            begin,
            end,
            view: None,
        }
    }

    /// Attach the handle that highlights this chord on screen.
    pub fn with_view(mut self, view: Arc<dyn ChordView>) -> Self {
        self.view = Some(view);
        self
    }
}

impl fmt::Debug for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chord")
            .field("is_chord", &self.is_chord)
            .field("pitches", &self.pitches)
            .field("begin", &self.begin)
            .field("end", &self.end)
            .field("has_view", &self.view.is_some())
            .finish()
    }
}

/// Filler for a gap between two gestures of the same voice that do not touch,
/// e.g. where the voice simply stops for a while without a notated rest.
#[derive(Debug, Clone, Copy)]
pub struct VoiceBlank {
    pub begin: Tick,
    pub end: Tick,
}

/// One slot in a voice's sequence.
#[derive(Debug, Clone)]
pub enum Gesture {
    Chord(Chord),
    Blank(VoiceBlank),
}

impl Gesture {
    pub fn is_chord(&self) -> bool {
        match self {
            Gesture::Chord(chord) => chord.is_chord,
            Gesture::Blank(_) => false,
        }
    }

    pub fn pitches(&self) -> &[u8] {
        match self {
            Gesture::Chord(chord) => &chord.pitches,
            Gesture::Blank(_) => &[],
        }
    }

    /// True for rests and blanks: nothing to strike.
    pub fn is_silent(&self) -> bool {
        self.pitches().is_empty()
    }

    pub fn begin_tick(&self) -> Tick {
        match self {
            Gesture::Chord(chord) => chord.begin,
            Gesture::Blank(blank) => blank.begin,
        }
    }

    pub fn end_tick(&self) -> Tick {
        match self {
            Gesture::Chord(chord) => chord.end,
            Gesture::Blank(blank) => blank.end,
        }
    }

    pub fn set_highlight(&self, on: bool) {
        if let Gesture::Chord(Chord {
            view: Some(view), ..
        }) = self
        {
            view.set_highlight(on);
        }
    }

    pub fn scroll_to_you(&self) {
        if let Gesture::Chord(Chord {
            view: Some(view), ..
        }) = self
        {
            view.scroll_to_you();
        }
    }
}

impl From<Chord> for Gesture {
    fn from(chord: Chord) -> Self {
        Gesture::Chord(chord)
    }
}

impl From<VoiceBlank> for Gesture {
    fn from(blank: VoiceBlank) -> Self {
        Gesture::Blank(blank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct Probe {
        lit: AtomicBool,
        scrolls: AtomicUsize,
    }

    impl ChordView for Probe {
        fn set_highlight(&self, on: bool) {
            self.lit.store(on, Ordering::SeqCst);
        }

        fn scroll_to_you(&self) {
            self.scrolls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn blank_is_silent_and_not_a_chord() {
        let blank = Gesture::from(VoiceBlank {
            begin: Tick::notated(10),
            end: Tick::notated(20),
        });

        assert!(!blank.is_chord());
        assert!(blank.is_silent());
        assert_eq!(blank.begin_tick(), Tick::notated(10));
        assert_eq!(blank.end_tick(), Tick::notated(20));
    }

    #[test]
    fn rest_is_silent() {
        let rest = Gesture::from(Chord::rest(Tick::notated(0), Tick::notated(480)));
        assert!(!rest.is_chord());
        assert!(rest.is_silent());
    }

    #[test]
    fn highlight_reaches_view() {
        let probe = Arc::new(Probe::default());
        let chord = Gesture::from(
            Chord::new(vec![60, 64], Tick::notated(0), Tick::notated(480))
                .with_view(probe.clone()),
        );

        chord.set_highlight(true);
        chord.scroll_to_you();
        assert!(probe.lit.load(Ordering::SeqCst));
        assert_eq!(probe.scrolls.load(Ordering::SeqCst), 1);

        chord.set_highlight(false);
        assert!(!probe.lit.load(Ordering::SeqCst));
    }
}

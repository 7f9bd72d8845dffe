//! Highlight state shared between the sequencer's chord handles and the UI.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use orchestrion::score::GestureKey;
use orchestrion::sequencing::ChordView;

#[derive(Default)]
pub struct Board {
    lit: Mutex<HashSet<GestureKey>>,
    focus: Mutex<Option<GestureKey>>,
}

impl Board {
    /// Handle for one chord, to attach at extraction.
    pub fn marker(self: &Arc<Self>, key: GestureKey) -> Arc<dyn ChordView> {
        Arc::new(Marker {
            key,
            board: self.clone(),
        })
    }

    pub fn is_lit(&self, key: &GestureKey) -> bool {
        self.lit
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }

    /// The chord that asked to be scrolled into view last.
    pub fn focus(&self) -> Option<GestureKey> {
        *self.focus.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct Marker {
    key: GestureKey,
    board: Arc<Board>,
}

impl ChordView for Marker {
    fn set_highlight(&self, on: bool) {
        let mut lit = self
            .board
            .lit
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if on {
            lit.insert(self.key);
        } else {
            lit.remove(&self.key);
        }
    }

    fn scroll_to_you(&self) {
        *self
            .board
            .focus
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(self.key);
    }
}

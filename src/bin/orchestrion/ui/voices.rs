//! Voice rows - one strip of gestures per voice, active gesture lit

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use orchestrion::orchestrion::{HandSide, VoiceSequencer};
use orchestrion::score::GestureKey;
use orchestrion::sequencing::Gesture;
use orchestrion::OrchestrionSequencer;

use crate::board::Board;

const LABEL_WIDTH: u16 = 5;
const NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

pub fn note_name(pitch: u8) -> String {
    format!("{}{}", NAMES[usize::from(pitch % 12)], i32::from(pitch / 12) - 1)
}

pub fn render_voices(frame: &mut Frame, area: Rect, sequencer: &OrchestrionSequencer, board: &Board) {
    if area.width <= LABEL_WIDTH + 10 {
        return;
    }
    let strip_width = usize::from(area.width - LABEL_WIDTH) / 2;

    let rows = sequencer
        .right_hand()
        .iter()
        .map(|voice| (HandSide::Right, voice))
        .chain(sequencer.left_hand().iter().map(|voice| (HandSide::Left, voice)));

    let lines: Vec<Line> = rows
        .map(|(side, voice)| voice_line(side, voice, board, strip_width))
        .collect();

    frame.render_widget(Paragraph::new(lines), area);
}

fn voice_line<'a>(side: HandSide, voice: &'a VoiceSequencer, board: &Board, strip_width: usize) -> Line<'a> {
    let hand = match side {
        HandSide::Right => 'R',
        HandSide::Left => 'L',
    };
    let key = |index| GestureKey {
        side,
        voice: voice.voice(),
        index,
    };

    // Keep the current gesture in the middle of the strip
    let focus = match board.focus() {
        Some(focus) if focus.side == side && focus.voice == voice.voice() => focus.index,
        _ => voice.active().start,
    };
    let first = focus.saturating_sub(strip_width / 2);

    let mut spans = vec![Span::styled(
        format!("{hand}{:<width$}", voice.voice(), width = usize::from(LABEL_WIDTH) - 1),
        Style::default().fg(if voice.is_finished() { Color::DarkGray } else { Color::White }),
    )];

    for (index, gesture) in voice.gestures().iter().enumerate().skip(first).take(strip_width) {
        let (symbol, color) = match gesture {
            Gesture::Blank(_) => ("  ", Color::DarkGray),
            _ if gesture.is_chord() => ("● ", Color::Cyan),
            _ => ("· ", Color::DarkGray),
        };
        let style = if board.is_lit(&key(index)) {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().fg(color)
        };
        spans.push(Span::styled(symbol, style));
    }

    let sounding: Vec<String> = voice.gestures()[voice.active()]
        .iter()
        .flat_map(|gesture| gesture.pitches().iter().map(|&pitch| note_name(pitch)))
        .collect();
    if !sounding.is_empty() {
        spans.push(Span::styled(
            format!(" {}", sounding.join(" ")),
            Style::default().fg(Color::Yellow),
        ));
    }

    Line::from(spans)
}

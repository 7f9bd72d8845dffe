//! Status bar widget - shows position, pedal, loop and recent output

use std::collections::VecDeque;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use orchestrion::OrchestrionSequencer;

pub fn render_status(frame: &mut Frame, area: Rect, sequencer: &OrchestrionSequencer, recent: &VecDeque<String>) {
    let block = Block::default().title(" orchestrion ").borders(Borders::ALL);

    let position = match sequencer.position() {
        Some(tick) => format!("tick {} ({})", tick.without_repeats, tick.with_repeats),
        None => "end".to_string(),
    };

    let (pedal_symbol, pedal_color) = if sequencer.is_pedal_down() {
        ("▼ pedal", Color::Green)
    } else {
        ("▲ pedal", Color::DarkGray)
    };

    let looping = sequencer.loop_settings();
    let right = looping
        .right
        .map_or_else(|| "-".to_string(), |tick| tick.to_string());
    let loop_text = format!(
        "loop [{}, {}) {}",
        looping.left,
        right,
        if looping.active_right().is_some() { "on" } else { "off" }
    );

    let line = Line::from(vec![
        Span::styled(
            format!(" track {}  ", sequencer.track()),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(format!("{position}  "), Style::default().fg(Color::White)),
        Span::styled(format!("{pedal_symbol}  "), Style::default().fg(pedal_color)),
        Span::styled(
            loop_text,
            Style::default().fg(if looping.enabled { Color::Yellow } else { Color::DarkGray }),
        ),
    ]);

    let history = Line::from(Span::styled(
        format!(" {}", recent.iter().cloned().collect::<Vec<_>>().join("  |  ")),
        Style::default().fg(Color::Magenta),
    ));

    let paragraph = Paragraph::new(vec![line, history]).block(block);
    frame.render_widget(paragraph, area);
}

//! TUI module for orchestrion
//!
//! Shows every voice of the score with the active gesture highlighted and
//! turns key presses into sequencer input.

mod status;
mod voices;

use std::collections::VecDeque;
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};
use log::{debug, info};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    DefaultTerminal, Frame,
};
use rtrb::Consumer;

use orchestrion::controller::KeyboardController;
use orchestrion::sequencing::{NoteEventKind, OutputEvent};
use orchestrion::OrchestrionSequencer;

use super::board::Board;

use status::render_status;
use voices::render_voices;

/// Output events kept for the status line
const RECENT_EVENTS: usize = 6;

/// UI application state
pub struct UiApp {
    sequencer: OrchestrionSequencer,
    controller: KeyboardController,
    board: Arc<Board>,
    /// Ring buffer receiver for delivered sequencer output
    events_rx: Consumer<OutputEvent>,
    recent: VecDeque<String>,
    /// Terminal reports releases; otherwise every press is a tap
    releases_reported: bool,
    should_quit: bool,
}

impl UiApp {
    pub fn new(sequencer: OrchestrionSequencer, board: Arc<Board>, events_rx: Consumer<OutputEvent>) -> Self {
        Self {
            sequencer,
            controller: KeyboardController::new(),
            board,
            events_rx,
            recent: VecDeque::with_capacity(RECENT_EVENTS),
            releases_reported: false,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        self.releases_reported = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if self.releases_reported {
            execute!(
                stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        } else {
            info!("terminal does not report key releases, playing taps");
        }

        let result = self.event_loop(terminal);

        for input in self.controller.release_all() {
            self.sequencer.on_input_event(input);
        }
        if self.releases_reported {
            execute!(stdout(), PopKeyboardEnhancementFlags)?;
        }
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_events();

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    /// Drain delivered output into the recent-events list
    fn poll_events(&mut self) {
        while let Ok(event) = self.events_rx.pop() {
            if self.recent.len() == RECENT_EVENTS {
                self.recent.pop_front();
            }
            self.recent.push_back(describe(&event));
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if let KeyCode::Char(letter) = key.code {
            if KeyboardController::pitch_for(letter).is_some() {
                self.play(letter, key.kind);
                return;
            }
        }

        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Home => {
                debug!("seek to start");
                self.sequencer.go_to_tick(0);
            }
            KeyCode::Char('[') => {
                if let Some(position) = self.sequencer.position() {
                    self.sequencer.set_loop_left(position.without_repeats);
                }
            }
            KeyCode::Char(']') => {
                if let Some(position) = self.sequencer.position() {
                    self.sequencer.set_loop_right(Some(position.without_repeats));
                }
            }
            KeyCode::Char('o') => {
                let enabled = !self.sequencer.loop_settings().enabled;
                self.sequencer.set_loop_enabled(enabled);
            }
            _ => {}
        }
    }

    fn play(&mut self, letter: char, kind: KeyEventKind) {
        match kind {
            KeyEventKind::Press => {
                if let Some(input) = self.controller.press(letter) {
                    self.sequencer.on_input_event(input);
                }
                if !self.releases_reported {
                    if let Some(input) = self.controller.release(letter) {
                        self.sequencer.on_input_event(input);
                    }
                }
            }
            KeyEventKind::Release => {
                if let Some(input) = self.controller.release(letter) {
                    self.sequencer.on_input_event(input);
                }
            }
            KeyEventKind::Repeat => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Status
                Constraint::Min(4),    // Voices
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        render_status(frame, chunks[0], &self.sequencer, &self.recent);

        let voices_block = Block::default().title(" Score ").borders(Borders::ALL);
        let voices_inner = voices_block.inner(chunks[1]);
        frame.render_widget(voices_block, chunks[1]);
        render_voices(frame, voices_inner, &self.sequencer, &self.board);

        let help = Paragraph::new(
            " [Y X] left hand  [K L] right hand  [Home] start  [ [ ] ] loop bounds  [O] loop  [Esc] quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[2]);
    }
}

fn describe(event: &OutputEvent) -> String {
    match event {
        OutputEvent::Pedal(pedal) => format!("pedal {}", if pedal.on { "down" } else { "up" }),
        OutputEvent::Notes(notes) => notes
            .iter()
            .map(|note| {
                let sign = match note.kind {
                    NoteEventKind::NoteOn => '+',
                    NoteEventKind::NoteOff => '-',
                };
                format!("{sign}{}", voices::note_name(note.pitch))
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}

//! Player - wires score, sequencer, synth and UI together

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{info, warn};
use rtrb::{Producer, RingBuffer};

use orchestrion::orchestrion::{DeliveryConfig, LoopSettings, OrchestrionBuilder};
use orchestrion::score::ScoreFile;
use orchestrion::sequencing::OutputEvent;
use orchestrion::synth::{self, GestureSynth, SynthMessage};
use orchestrion::MAX_BLOCK_SIZE;

use super::board::Board;
use super::ui::UiApp;

const SYNTH_RING_SIZE: usize = 1024;
const UI_RING_SIZE: usize = 256;

/// Main application builder
pub struct Player {
    score: PathBuf,
    config: DeliveryConfig,
    looping: LoopSettings,
    audio: bool,
    polyphony: usize,
}

impl Player {
    pub fn new(score: &Path) -> Self {
        Self {
            score: score.to_path_buf(),
            config: DeliveryConfig::default(),
            looping: LoopSettings::default(),
            audio: true,
            polyphony: 32,
        }
    }

    pub fn config(mut self, config: DeliveryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn looping(mut self, looping: LoopSettings) -> Self {
        self.looping = looping;
        self
    }

    pub fn audio(mut self, audio: bool) -> Self {
        self.audio = audio;
        self
    }

    pub fn polyphony(mut self, polyphony: usize) -> Self {
        self.polyphony = polyphony.max(1);
        self
    }

    /// Run the application (takes over the terminal until Esc)
    pub fn run(self) -> EyreResult<()> {
        let board = Arc::new(Board::default());
        let score = ScoreFile::load(&self.score)
            .and_then(|file| file.extract_with_views(|key| Some(board.marker(key))))
            .wrap_err_with(|| format!("failed to load {}", self.score.display()))?;
        info!("loaded {}", self.score.display());

        // The stream must outlive the UI loop
        let (synth_tx, _stream) = if self.audio {
            let (tx, stream) = self.start_audio()?;
            (Some(Mutex::new(tx)), Some(stream))
        } else {
            (None, None)
        };

        let (ui_tx, ui_rx) = RingBuffer::<OutputEvent>::new(UI_RING_SIZE);
        let ui_tx = Mutex::new(ui_tx);

        let sequencer = OrchestrionBuilder::new()
            .track(score.track)
            .right_hand(score.right)
            .left_hand(score.left)
            .pedal(score.pedal)
            .config(self.config)
            .looping(self.looping)
            .build(move |event| {
                if let Some(tx) = &synth_tx {
                    if let Ok(mut tx) = tx.lock() {
                        let dropped = synth::forward(&mut tx, &event);
                        if dropped > 0 {
                            warn!("synth ring full, dropped {dropped} message(s)");
                        }
                    }
                }
                if let Ok(mut tx) = ui_tx.lock() {
                    // The UI only shows recent history; losing some is fine
                    let _ = tx.push(event);
                }
            })
            .wrap_err("failed to start the sequencer")?;

        let mut terminal = ratatui::init();
        let result = UiApp::new(sequencer, board, ui_rx).run(&mut terminal);
        ratatui::restore();
        result
    }

    fn start_audio(&self) -> EyreResult<(Producer<SynthMessage>, cpal::Stream)> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        info!("audio: {sample_rate} Hz, {channels} channel(s)");

        let (tx, rx) = RingBuffer::<SynthMessage>::new(SYNTH_RING_SIZE);
        let mut synth = GestureSynth::new(sample_rate, self.polyphony, rx);
        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let block = &mut render_buf[..frames_to_render];
                    synth.render_block(block);

                    // Copy to output (mono to all channels)
                    let out_off = frames_written * channels;
                    for (i, &s) in block.iter().enumerate() {
                        for ch in 0..channels {
                            data[out_off + i * channels + ch] = s;
                        }
                    }

                    frames_written += frames_to_render;
                }
            },
            |err| warn!("audio error: {err}"),
            None,
        )?;

        stream.play()?;
        Ok((tx, stream))
    }
}

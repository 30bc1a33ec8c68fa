use super::config::SynthConfig;
use super::note::NoteEvent;
use crate::audio::recorder::{RecorderError, WavRecorder};
use log::{debug, error, info};
use rustysynth::{SoundFont, Synthesizer, SynthesizerSettings};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use thiserror::Error;

/// Anything that turns MIDI note messages into stereo audio.
pub trait SoundSource: Send {
    fn note_on(&mut self, channel: u8, key: u8, velocity: u8);
    fn note_off(&mut self, channel: u8, key: u8);
    fn all_notes_off(&mut self);
    fn render(&mut self, left: &mut [f32], right: &mut [f32]);
}

impl SoundSource for Synthesizer {
    fn note_on(&mut self, channel: u8, key: u8, velocity: u8) {
        Synthesizer::note_on(self, channel as i32, key as i32, velocity as i32);
    }

    fn note_off(&mut self, channel: u8, key: u8) {
        Synthesizer::note_off(self, channel as i32, key as i32);
    }

    fn all_notes_off(&mut self) {
        self.note_off_all(false);
    }

    fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        Synthesizer::render(self, left, right);
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("couldn't open sound font {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("couldn't load sound font {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("couldn't create synthesizer: {0}")]
    Synthesizer(String),
    #[error(transparent)]
    Recorder(#[from] RecorderError),
}

/// Owns the sound source and feeds it the note events queued by the UI.
pub struct SynthEngine {
    source: Box<dyn SoundSource>,
    config: SynthConfig,
    note_receiver: Receiver<NoteEvent>,
    note_sender: Sender<NoteEvent>,
    recorder: Option<WavRecorder>,
    left: Vec<f32>,
    right: Vec<f32>,
}

impl SynthEngine {
    pub fn new(source: Box<dyn SoundSource>, config: SynthConfig) -> Self {
        let (note_tx, note_rx) = std::sync::mpsc::channel();
        Self {
            source,
            config,
            note_receiver: note_rx,
            note_sender: note_tx,
            recorder: None,
            left: Vec::new(),
            right: Vec::new(),
        }
    }

    /// Parses a SoundFont file and builds a synthesizer at `config.sample_rate`.
    pub fn load_soundfont(path: &Path, config: SynthConfig) -> Result<Self, EngineError> {
        let file = File::open(path).map_err(|source| EngineError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = BufReader::new(file);
        let sound_font = SoundFont::new(&mut reader).map_err(|e| EngineError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let sound_font = Arc::new(sound_font);

        let mut settings = SynthesizerSettings::new(config.sample_rate as i32);
        settings.maximum_polyphony = config.max_polyphony;
        settings.enable_reverb_and_chorus = config.enable_reverb_and_chorus;
        let synthesizer = Synthesizer::new(&sound_font, &settings)
            .map_err(|e| EngineError::Synthesizer(e.to_string()))?;

        info!(
            "Loaded sound font {} at {} Hz",
            path.display(),
            config.sample_rate
        );
        Ok(Self::new(Box::new(synthesizer), config))
    }

    /// Get a sender for note events that can be used by input handlers
    pub fn get_note_sender(&self) -> Sender<NoteEvent> {
        self.note_sender.clone()
    }

    pub fn start_recording(&mut self, path: &Path) -> Result<(), EngineError> {
        let recorder = WavRecorder::create(path, self.config.sample_rate)?;
        info!("Recording to {}", path.display());
        self.recorder = Some(recorder);
        Ok(())
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_some()
    }

    /// Flushes and closes the recording, if one is running.
    pub fn finish_recording(&mut self) -> Result<(), EngineError> {
        if let Some(recorder) = self.recorder.take() {
            let (path, frames) = (recorder.path().to_path_buf(), recorder.frames());
            recorder.finalize()?;
            info!("Wrote {} frames to {}", frames, path.display());
        }
        Ok(())
    }

    /// Renders one device buffer. `output` is interleaved with `channels` samples per frame.
    pub fn process(&mut self, output: &mut [f32], channels: usize) {
        self.process_note_events();

        if channels == 0 {
            return;
        }
        let frames = output.len() / channels;
        self.left.resize(frames, 0.0);
        self.right.resize(frames, 0.0);

        self.source.render(&mut self.left, &mut self.right);

        let volume = self.config.master_volume;
        for sample in self.left.iter_mut().chain(self.right.iter_mut()) {
            *sample *= volume;
        }
        apply_limiter(&mut self.left);
        apply_limiter(&mut self.right);

        for (i, frame) in output.chunks_mut(channels).enumerate() {
            if i >= frames {
                frame.fill(0.0);
                continue;
            }
            let (l, r) = (self.left[i], self.right[i]);
            match frame {
                [mono] => *mono = (l + r) * 0.5,
                [first, second, rest @ ..] => {
                    *first = l;
                    *second = r;
                    rest.fill(0.0);
                }
                [] => {}
            }
        }

        if let Some(recorder) = self.recorder.as_mut() {
            if let Err(e) = recorder.write_block(&self.left, &self.right) {
                error!("Recording stopped: {}", e);
                self.recorder = None;
            }
        }
    }

    /// Process any pending note events from the queue
    fn process_note_events(&mut self) {
        while let Ok(event) = self.note_receiver.try_recv() {
            debug!("Processing {:?}", event);
            match event {
                NoteEvent::On {
                    channel,
                    key,
                    velocity,
                } => self.source.note_on(channel, key, velocity),
                NoteEvent::Off { channel, key } => self.source.note_off(channel, key),
                NoteEvent::AllOff => self.source.all_notes_off(),
            }
        }
    }
}

/// Soft knee limiter to prevent clipping
fn apply_limiter(output: &mut [f32]) {
    for sample in output.iter_mut() {
        if sample.abs() > 0.9 {
            let excess = (sample.abs() - 0.9) / 0.1;
            let scale = 1.0 - excess * 0.1;
            *sample *= scale.max(0.0);
        }
    }
}

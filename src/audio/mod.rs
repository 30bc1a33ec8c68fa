mod cpal_backend;
pub mod recorder;

pub use self::cpal_backend::CpalBackend;

use crate::synth::engine::SynthEngine;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub type SharedEngine = Arc<Mutex<SynthEngine>>;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no output device available")]
    NoDevice,
    #[error("no output device matching {0:?}")]
    DeviceNotFound(String),
    #[error("unsupported sample format {0}")]
    UnsupportedFormat(String),
    #[error("couldn't query output devices: {0}")]
    Devices(#[from] cpal::DevicesError),
    #[error("couldn't query default output config: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),
    #[error("couldn't build output stream: {0}")]
    Build(#[from] cpal::BuildStreamError),
    #[error("couldn't start output stream: {0}")]
    Play(#[from] cpal::PlayStreamError),
    #[error("couldn't pause output stream: {0}")]
    Pause(#[from] cpal::PauseStreamError),
}

/// An output device the engine can be attached to.
pub trait AudioBackend {
    fn sample_rate(&self) -> u32;
    fn channels(&self) -> usize;
    fn start(&mut self, engine: SharedEngine) -> Result<(), AudioError>;
    fn stop(&mut self) -> Result<(), AudioError>;
}

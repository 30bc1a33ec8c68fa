use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::egui;
use env_logger::Env;
use keypiano::audio::{AudioBackend, CpalBackend};
use keypiano::config::Cli;
use keypiano::synth::engine::SynthEngine;
use keypiano::synth::note::NoteEvent;
use keypiano::ui::{KeyboardView, PianoApp};
use log::warn;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// Lets release tails ring out into the recording before the stream stops.
const RECORDING_TAIL: Duration = Duration::from_millis(500);

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let piano = cli.piano_config();

    let mut audio_backend =
        CpalBackend::open(cli.device.as_deref()).context("opening audio output")?;

    let synth_config = cli
        .synth_config()
        .with_sample_rate(audio_backend.sample_rate());
    let mut engine = SynthEngine::load_soundfont(&cli.soundfont, synth_config)
        .with_context(|| format!("couldn't load soundfont {}", cli.soundfont.display()))?;
    if let Some(path) = &cli.record {
        engine.start_recording(path)?;
    }

    let note_sender = engine.get_note_sender();
    let shutdown_sender = note_sender.clone();
    let recording = engine.is_recording();
    let synth_engine = Arc::new(Mutex::new(engine));
    audio_backend
        .start(synth_engine.clone())
        .context("starting audio output")?;

    let view = KeyboardView::new(piano.octaves, piano.lowest);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("keypiano")
            .with_inner_size(view.window_size())
            .with_resizable(false),
        ..Default::default()
    };
    let result = eframe::run_native(
        "keypiano",
        options,
        Box::new(move |_cc| Box::new(PianoApp::new(&piano, note_sender, recording))),
    );

    // The window may close without Escape; silence whatever is still sounding.
    if let Err(e) = shutdown_sender.send(NoteEvent::AllOff) {
        warn!("Error sending {:?}: {}", NoteEvent::AllOff, e);
    }
    if recording {
        std::thread::sleep(RECORDING_TAIL);
    }
    audio_backend.stop().context("stopping audio output")?;
    synth_engine
        .lock()
        .map_err(|_| anyhow!("synth engine lock poisoned"))?
        .finish_recording()?;

    result.map_err(|e| anyhow!("window error: {}", e))
}

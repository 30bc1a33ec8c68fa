use crate::input::keyboard::{DEFAULT_CHANNEL, DEFAULT_OCTAVE};
use crate::synth::config::SynthConfig;
use crate::synth::note_state::{NOTE_STOP_TIMEOUT, VISUAL_FADEOUT};
use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_SOUNDFONT: &str = "Salamander-UltraCompact-JNv3.0.sf2";

/// Play a SoundFont piano from the computer keyboard.
#[derive(Debug, Parser)]
#[command(name = "keypiano", version)]
pub struct Cli {
    /// SoundFont (.sf2) to load
    #[arg(long, env = "SOUNDFONT", default_value = DEFAULT_SOUNDFONT)]
    pub soundfont: PathBuf,

    /// Record everything played to this WAV file
    #[arg(long, env = "KEYPIANO_RECORD")]
    pub record: Option<PathBuf>,

    /// Number of octaves to show
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub octaves: u32,

    /// Lowest octave shown
    #[arg(long, default_value_t = 2, allow_negative_numbers = true)]
    pub lowest: i32,

    /// Octave played by the bottom-left key at startup
    #[arg(long, default_value_t = DEFAULT_OCTAVE as i64, value_parser = clap::value_parser!(i64).range(0..=8))]
    pub octave: i64,

    /// MIDI channel notes are sent on
    #[arg(long, default_value_t = DEFAULT_CHANNEL, value_parser = clap::value_parser!(u8).range(0..=15))]
    pub channel: u8,

    /// Note-on velocity
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u8).range(1..=127))]
    pub velocity: u8,

    /// Seconds a key stays highlighted after being pressed
    #[arg(long, default_value_t = VISUAL_FADEOUT, value_parser = parse_seconds)]
    pub fadeout: f64,

    /// Seconds between releasing a key and stopping its note
    #[arg(long, default_value_t = NOTE_STOP_TIMEOUT, value_parser = parse_seconds)]
    pub stop_timeout: f64,

    /// Master volume, 0.0 to 1.0
    #[arg(long, default_value_t = 0.8)]
    pub volume: f32,

    /// Use the first output device whose name contains this text
    #[arg(long, env = "KEYPIANO_DEVICE")]
    pub device: Option<String>,
}

fn parse_seconds(value: &str) -> Result<f64, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|e| format!("`{}` is not a number: {}", value, e))?;
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(format!("`{}` must be a positive number of seconds", value));
    }
    Ok(seconds)
}

/// Everything the UI side needs to know.
#[derive(Debug, Clone, PartialEq)]
pub struct PianoConfig {
    pub octaves: u32,
    pub lowest: i32,
    pub start_octave: i32,
    pub channel: u8,
    pub velocity: u8,
    pub fadeout: f64,
    pub stop_timeout: f64,
}

impl Default for PianoConfig {
    fn default() -> Self {
        Self {
            octaves: 5,
            lowest: 2,
            start_octave: DEFAULT_OCTAVE,
            channel: DEFAULT_CHANNEL,
            velocity: 100,
            fadeout: VISUAL_FADEOUT,
            stop_timeout: NOTE_STOP_TIMEOUT,
        }
    }
}

impl Cli {
    pub fn piano_config(&self) -> PianoConfig {
        PianoConfig {
            octaves: self.octaves,
            lowest: self.lowest,
            start_octave: self.octave as i32,
            channel: self.channel,
            velocity: self.velocity,
            fadeout: self.fadeout,
            stop_timeout: self.stop_timeout,
        }
    }

    /// Synth settings; the sample rate is filled in once the output device is known.
    pub fn synth_config(&self) -> SynthConfig {
        SynthConfig {
            master_volume: self.volume.clamp(0.0, 1.0),
            ..SynthConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_piano_config() {
        let cli = Cli::try_parse_from(["keypiano", "--soundfont", "piano.sf2"]).unwrap();
        assert_eq!(cli.soundfont, PathBuf::from("piano.sf2"));
        assert_eq!(cli.piano_config(), PianoConfig::default());
        assert_eq!(cli.synth_config().master_volume, 0.8);
    }

    #[test]
    fn overrides() {
        let cli = Cli::try_parse_from([
            "keypiano",
            "--octaves",
            "3",
            "--lowest",
            "-1",
            "--channel",
            "0",
            "--fadeout",
            "0.5",
            "--volume",
            "2.0",
            "--record",
            "take.wav",
        ])
        .unwrap();
        let piano = cli.piano_config();
        assert_eq!(piano.octaves, 3);
        assert_eq!(piano.lowest, -1);
        assert_eq!(piano.channel, 0);
        assert_eq!(piano.fadeout, 0.5);
        assert_eq!(cli.synth_config().master_volume, 1.0);
        assert_eq!(cli.record, Some(PathBuf::from("take.wav")));
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(Cli::try_parse_from(["keypiano", "--channel", "16"]).is_err());
        assert!(Cli::try_parse_from(["keypiano", "--octaves", "0"]).is_err());
        assert!(Cli::try_parse_from(["keypiano", "--velocity", "0"]).is_err());
        assert!(Cli::try_parse_from(["keypiano", "--fadeout", "-1"]).is_err());
        assert!(Cli::try_parse_from(["keypiano", "--stop-timeout", "soon"]).is_err());
    }
}

use std::cmp::Ordering;
use std::fmt;

pub const MIDI_CHANNELS: u8 = 16;

/// The twelve pitch classes of the chromatic scale, starting at C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

pub const WHITE_KEYS: [PitchClass; 7] = [
    PitchClass::C,
    PitchClass::D,
    PitchClass::E,
    PitchClass::F,
    PitchClass::G,
    PitchClass::A,
    PitchClass::B,
];

pub const BLACK_KEYS: [PitchClass; 5] = [
    PitchClass::CSharp,
    PitchClass::DSharp,
    PitchClass::FSharp,
    PitchClass::GSharp,
    PitchClass::ASharp,
];

/// Which row of the piano a pitch class sits on, with its index inside that row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    White(usize),
    Black(usize),
}

impl PitchClass {
    /// Semitones above C.
    pub fn semitone(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }

    pub fn kind(self) -> KeyKind {
        match self {
            PitchClass::C => KeyKind::White(0),
            PitchClass::D => KeyKind::White(1),
            PitchClass::E => KeyKind::White(2),
            PitchClass::F => KeyKind::White(3),
            PitchClass::G => KeyKind::White(4),
            PitchClass::A => KeyKind::White(5),
            PitchClass::B => KeyKind::White(6),
            PitchClass::CSharp => KeyKind::Black(0),
            PitchClass::DSharp => KeyKind::Black(1),
            PitchClass::FSharp => KeyKind::Black(2),
            PitchClass::GSharp => KeyKind::Black(3),
            PitchClass::ASharp => KeyKind::Black(4),
        }
    }

    pub fn is_white(self) -> bool {
        matches!(self.kind(), KeyKind::White(_))
    }
}

/// A pitch class in a specific octave. Octave 4 holds middle C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Note {
    pub pitch: PitchClass,
    pub octave: i32,
}

impl Note {
    pub fn new(pitch: PitchClass, octave: i32) -> Self {
        Self { pitch, octave }
    }

    /// MIDI key number, C4 = 60.
    pub fn midi_number(&self) -> Result<u8, NoteError> {
        let number = (self.octave + 1) * 12 + self.pitch.semitone() as i32;
        if !(0..128).contains(&number) {
            return Err(NoteError::InvalidNoteNumber(number));
        }
        Ok(number as u8)
    }
}

impl Ord for Note {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.octave, self.pitch).cmp(&(other.octave, other.pitch))
    }
}

impl PartialOrd for Note {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch.name(), self.octave)
    }
}

/// Messages sent from the UI thread to the synth engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteEvent {
    On { channel: u8, key: u8, velocity: u8 },
    Off { channel: u8, key: u8 },
    AllOff,
}

impl NoteEvent {
    pub fn note_on(note: Note, channel: u8, velocity: u8) -> Result<Self, NoteError> {
        let event = NoteEvent::On {
            channel,
            key: note.midi_number()?,
            velocity,
        };
        event.validate()?;
        Ok(event)
    }

    pub fn note_off(note: Note, channel: u8) -> Result<Self, NoteError> {
        let event = NoteEvent::Off {
            channel,
            key: note.midi_number()?,
        };
        event.validate()?;
        Ok(event)
    }

    pub fn validate(&self) -> Result<(), NoteError> {
        match *self {
            NoteEvent::On {
                channel,
                key,
                velocity,
            } => {
                check_channel(channel)?;
                check_key(key)?;
                if velocity >= 128 {
                    return Err(NoteError::InvalidVelocity(velocity));
                }
            }
            NoteEvent::Off { channel, key } => {
                check_channel(channel)?;
                check_key(key)?;
            }
            NoteEvent::AllOff => {}
        }
        Ok(())
    }
}

fn check_channel(channel: u8) -> Result<(), NoteError> {
    if channel >= MIDI_CHANNELS {
        return Err(NoteError::InvalidChannel(channel));
    }
    Ok(())
}

fn check_key(key: u8) -> Result<(), NoteError> {
    if key >= 128 {
        return Err(NoteError::InvalidNoteNumber(key as i32));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteError {
    InvalidNoteNumber(i32),
    InvalidVelocity(u8),
    InvalidChannel(u8),
}

impl fmt::Display for NoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteError::InvalidNoteNumber(n) => {
                write!(f, "Invalid MIDI note number: {}. Must be 0-127.", n)
            }
            NoteError::InvalidVelocity(v) => {
                write!(f, "Invalid MIDI velocity: {}. Must be 0-127.", v)
            }
            NoteError::InvalidChannel(c) => {
                write!(f, "Invalid MIDI channel: {}. Must be 0-15.", c)
            }
        }
    }
}

impl std::error::Error for NoteError {}

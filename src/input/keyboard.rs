use super::layout::KeyLayout;
use crate::synth::note::{Note, MIDI_CHANNELS};
use device_query::{DeviceQuery, Keycode};
use log::debug;
use std::collections::HashMap;

pub const MIN_OCTAVE: i32 = 0;
pub const MAX_OCTAVE: i32 = 8;
pub const DEFAULT_OCTAVE: i32 = 4;
pub const DEFAULT_CHANNEL: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Press(Note),
    Release(Note),
    OctaveChanged(i32),
    ChannelChanged(u8),
    Quit,
}

/// Turns the set of physically held keys into press/release edges.
pub struct KeyboardHandler {
    layout: KeyLayout,
    key_states: Vec<Keycode>,
    // The note each held key started, so a release after an octave change
    // still stops the right note.
    sounding: HashMap<Keycode, Note>,
    octave: i32,
    channel: u8,
}

impl KeyboardHandler {
    pub fn new(layout: KeyLayout, octave: i32, channel: u8) -> Self {
        Self {
            layout,
            key_states: Vec::new(),
            sounding: HashMap::new(),
            octave: octave.clamp(MIN_OCTAVE, MAX_OCTAVE),
            channel: channel.min(MIDI_CHANNELS - 1),
        }
    }

    pub fn octave(&self) -> i32 {
        self.octave
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn poll(&mut self, device: &impl DeviceQuery) -> Vec<InputEvent> {
        let keys = device.get_keys();
        self.update(&keys)
    }

    /// Diffs `keys` against the previous call and returns the resulting events.
    pub fn update(&mut self, keys: &[Keycode]) -> Vec<InputEvent> {
        let mut current: Vec<Keycode> = Vec::with_capacity(keys.len());
        for key in keys {
            if !current.contains(key) {
                current.push(*key);
            }
        }
        let mut events = Vec::new();

        for key in self.key_states.iter().filter(|k| !current.contains(k)) {
            if let Some(note) = self.sounding.remove(key) {
                debug!("Key '{:?}' released - stopping {}", key, note);
                events.push(InputEvent::Release(note));
            }
        }

        let pressed: Vec<Keycode> = current
            .iter()
            .filter(|k| !self.key_states.contains(k))
            .copied()
            .collect();
        for key in pressed {
            if let Some(binding) = self.layout.get(&key) {
                let note = Note::new(binding.pitch, self.octave + binding.octave_shift);
                debug!("Key '{:?}' pressed - playing {}", key, note);
                self.sounding.insert(key, note);
                events.push(InputEvent::Press(note));
            } else if let Some(event) = self.control(key) {
                events.push(event);
            }
        }

        self.key_states = current;
        events
    }

    fn control(&mut self, key: Keycode) -> Option<InputEvent> {
        match key {
            Keycode::Left | Keycode::Right => {
                let step = if key == Keycode::Left { -1 } else { 1 };
                let octave = (self.octave + step).clamp(MIN_OCTAVE, MAX_OCTAVE);
                if octave == self.octave {
                    return None;
                }
                self.octave = octave;
                Some(InputEvent::OctaveChanged(octave))
            }
            Keycode::Down | Keycode::Up => {
                let channel = if key == Keycode::Down {
                    self.channel.saturating_sub(1)
                } else {
                    (self.channel + 1).min(MIDI_CHANNELS - 1)
                };
                if channel == self.channel {
                    return None;
                }
                self.channel = channel;
                Some(InputEvent::ChannelChanged(channel))
            }
            Keycode::Escape => Some(InputEvent::Quit),
            _ => None,
        }
    }
}

impl Default for KeyboardHandler {
    fn default() -> Self {
        Self::new(KeyLayout::qwerty(), DEFAULT_OCTAVE, DEFAULT_CHANNEL)
    }
}

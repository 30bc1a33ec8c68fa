use super::note::Note;
use log::debug;
use std::collections::HashMap;

pub const VISUAL_FADEOUT: f64 = 0.25;
pub const NOTE_STOP_TIMEOUT: f64 = 0.03;

#[derive(Debug, Clone, Copy, PartialEq)]
struct NoteTiming {
    start: f64,
    end: Option<f64>,
}

/// A key that is still inside its fade window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Highlight {
    pub note: Note,
    /// 1.0 right after the press, falling linearly towards 0.0.
    pub intensity: f32,
}

/// What one tick of the note table produced.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TickOutput {
    pub highlights: Vec<Highlight>,
    /// Released notes whose stop timeout has passed; the synth should silence them.
    pub to_stop: Vec<Note>,
}

/// Per-note press/release timestamps, used both for fading key highlights
/// and for delaying note-off after a key is released.
#[derive(Debug)]
pub struct NoteStates {
    states: HashMap<Note, NoteTiming>,
    fadeout: f64,
    stop_timeout: f64,
}

impl NoteStates {
    pub fn new(fadeout: f64, stop_timeout: f64) -> Self {
        Self {
            states: HashMap::new(),
            fadeout,
            stop_timeout,
        }
    }

    /// Starts tracking `note`, replacing any earlier press of the same note.
    pub fn play(&mut self, note: Note, now: f64) {
        self.states.insert(
            note,
            NoteTiming {
                start: now,
                end: None,
            },
        );
    }

    pub fn release(&mut self, note: Note, now: f64) {
        match self.states.get_mut(&note) {
            Some(timing) => timing.end = Some(now),
            None => debug!("Release of untracked note {}", note),
        }
    }

    pub fn tick(&mut self, now: f64) -> TickOutput {
        let mut output = TickOutput::default();
        let (fadeout, stop_timeout) = (self.fadeout, self.stop_timeout);

        self.states.retain(|note, timing| {
            let elapsed = now - timing.start;
            if elapsed < fadeout {
                output.highlights.push(Highlight {
                    note: *note,
                    intensity: ((fadeout - elapsed) / fadeout) as f32,
                });
            }
            match timing.end {
                Some(end) if now - end > stop_timeout => {
                    output.to_stop.push(*note);
                    false
                }
                _ => true,
            }
        });

        output.highlights.sort_by(|a, b| a.note.cmp(&b.note));
        output.to_stop.sort();
        output
    }

    /// Notes still sounding or waiting for their stop timeout, lowest first.
    pub fn held(&self) -> Vec<Note> {
        let mut notes: Vec<Note> = self.states.keys().copied().collect();
        notes.sort();
        notes
    }
}

impl Default for NoteStates {
    fn default() -> Self {
        Self::new(VISUAL_FADEOUT, NOTE_STOP_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::note::PitchClass;

    fn c4() -> Note {
        Note::new(PitchClass::C, 4)
    }

    #[test]
    fn fresh_press_is_fully_lit() {
        let mut states = NoteStates::default();
        states.play(c4(), 1.0);
        let out = states.tick(1.0);
        assert_eq!(
            out.highlights,
            vec![Highlight {
                note: c4(),
                intensity: 1.0
            }]
        );
        assert!(out.to_stop.is_empty());
    }

    #[test]
    fn intensity_falls_linearly_then_disappears() {
        let mut states = NoteStates::new(0.5, 0.03);
        states.play(c4(), 0.0);
        let half = states.tick(0.25);
        assert_eq!(half.highlights.len(), 1);
        assert!((half.highlights[0].intensity - 0.5).abs() < 1e-6);

        assert!(states.tick(0.5).highlights.is_empty());
        // Still held, just no longer highlighted.
        assert_eq!(states.held(), vec![c4()]);
    }

    #[test]
    fn released_note_stops_after_timeout() {
        let mut states = NoteStates::default();
        states.play(c4(), 0.0);
        states.release(c4(), 1.0);

        assert!(states.tick(1.02).to_stop.is_empty());
        assert_eq!(states.tick(1.04).to_stop, vec![c4()]);
        assert!(states.held().is_empty());
        assert!(states.tick(2.0).to_stop.is_empty());
    }

    #[test]
    fn quick_tap_fades_and_stops_in_one_tick() {
        let mut states = NoteStates::default();
        states.play(c4(), 0.0);
        states.release(c4(), 0.01);
        let out = states.tick(0.05);
        assert_eq!(out.highlights.len(), 1);
        assert_eq!(out.to_stop, vec![c4()]);
    }

    #[test]
    fn repress_restarts_the_note() {
        let mut states = NoteStates::default();
        states.play(c4(), 0.0);
        states.release(c4(), 0.01);
        states.play(c4(), 0.02);
        let out = states.tick(1.0);
        assert!(out.to_stop.is_empty());
        assert_eq!(states.held(), vec![c4()]);
    }

    #[test]
    fn releasing_an_unknown_note_is_ignored() {
        let mut states = NoteStates::default();
        states.release(c4(), 1.0);
        assert!(states.held().is_empty());
        assert_eq!(states.tick(2.0), TickOutput::default());
    }

    #[test]
    fn held_notes_are_sorted() {
        let mut states = NoteStates::default();
        let e4 = Note::new(PitchClass::E, 4);
        let g3 = Note::new(PitchClass::G, 3);
        states.play(e4, 0.0);
        states.play(c4(), 0.0);
        states.play(g3, 0.0);
        assert_eq!(states.held(), vec![g3, c4(), e4]);
    }
}

//! Geometry and drawing of the on-screen keyboard.
//!
//! The keyboard is a row of identical octaves. Each octave is seven white keys
//! with five black keys laid over them at fixed offsets.

use crate::synth::note::{KeyKind, Note, BLACK_KEYS, WHITE_KEYS};
use crate::synth::note_state::Highlight;
use eframe::egui::{Color32, Painter, Pos2, Rect, Rounding, Stroke, Vec2};
use std::collections::HashMap;

pub const OCTAVE_WIDTH: f32 = 210.0;
pub const KEY_HEIGHT: f32 = 120.0;
pub const STATUS_HEIGHT: f32 = 20.0;

/// Left edge of each black key inside its octave, C# through A#.
const BLACK_KEY_OFFSETS: [f32; 5] = [18.0, 58.0, 115.0, 151.0, 187.0];
const BLACK_KEY_WIDTH: f32 = 19.0;
const BLACK_KEY_HEIGHT: f32 = 68.0;
const BLACK_KEY_TOP: f32 = 1.0;

pub struct KeyboardView {
    octaves: u32,
    lowest: i32,
    offsets: HashMap<Note, f32>,
}

impl KeyboardView {
    pub fn new(octaves: u32, lowest: i32) -> Self {
        Self {
            octaves: octaves.max(1),
            lowest,
            offsets: HashMap::new(),
        }
    }

    pub fn white_key_width() -> f32 {
        OCTAVE_WIDTH / WHITE_KEYS.len() as f32
    }

    /// Window size: the keys plus the status strip underneath.
    pub fn window_size(&self) -> Vec2 {
        Vec2::new(
            self.octaves as f32 * OCTAVE_WIDTH,
            KEY_HEIGHT + STATUS_HEIGHT,
        )
    }

    pub fn keys_size(&self) -> Vec2 {
        Vec2::new(self.octaves as f32 * OCTAVE_WIDTH, KEY_HEIGHT)
    }

    pub fn is_visible(&self, note: &Note) -> bool {
        note.octave >= self.lowest && note.octave < self.lowest + self.octaves as i32
    }

    /// Horizontal position of a key relative to the left edge of the keyboard.
    pub fn x_offset(&mut self, note: Note) -> f32 {
        let lowest = self.lowest;
        *self.offsets.entry(note).or_insert_with(|| {
            let octave_offset = (note.octave - lowest) as f32 * OCTAVE_WIDTH;
            match note.pitch.kind() {
                KeyKind::White(i) => i as f32 * Self::white_key_width() + octave_offset,
                KeyKind::Black(i) => BLACK_KEY_OFFSETS[i] + octave_offset,
            }
        })
    }

    pub fn key_rect(&mut self, note: Note, origin: Pos2) -> Rect {
        let x = origin.x + self.x_offset(note);
        match note.pitch.kind() {
            KeyKind::White(_) => Rect::from_min_size(
                Pos2::new(x, origin.y),
                Vec2::new(Self::white_key_width(), KEY_HEIGHT),
            ),
            KeyKind::Black(_) => Rect::from_min_size(
                Pos2::new(x, origin.y + BLACK_KEY_TOP),
                Vec2::new(BLACK_KEY_WIDTH, BLACK_KEY_HEIGHT),
            ),
        }
    }

    /// Draws every octave, then the fading highlights on top.
    pub fn paint(&mut self, painter: &Painter, origin: Pos2, highlights: &[Highlight]) {
        let visible: Vec<&Highlight> = highlights
            .iter()
            .filter(|h| self.is_visible(&h.note))
            .collect();

        for octave in self.lowest..self.lowest + self.octaves as i32 {
            for pitch in WHITE_KEYS {
                let rect = self.key_rect(Note::new(pitch, octave), origin);
                painter.rect_filled(rect, Rounding::ZERO, Color32::WHITE);
                painter.rect_stroke(rect, Rounding::ZERO, Stroke::new(1.0, Color32::from_gray(60)));
            }
        }
        for highlight in visible.iter().filter(|h| h.note.pitch.is_white()) {
            let rect = self.key_rect(highlight.note, origin).shrink(1.0);
            painter.rect_filled(rect, Rounding::ZERO, highlight_color(highlight));
        }

        for octave in self.lowest..self.lowest + self.octaves as i32 {
            for pitch in BLACK_KEYS {
                let rect = self.key_rect(Note::new(pitch, octave), origin);
                painter.rect_filled(rect, Rounding::same(1.0), Color32::BLACK);
            }
        }
        for highlight in visible.iter().filter(|h| !h.note.pitch.is_white()) {
            let rect = self.key_rect(highlight.note, origin);
            painter.rect_filled(rect, Rounding::same(1.0), highlight_color(highlight));
        }
    }
}

/// White keys are tinted by subtracting from white, black keys by adding to black.
pub fn highlight_color(highlight: &Highlight) -> Color32 {
    let intensity = highlight.intensity.clamp(0.0, 1.0);
    if highlight.note.pitch.is_white() {
        let green = (intensity * 255.0).round() as u8;
        Color32::from_rgb(255, 255 - green, 255 - 124)
    } else {
        Color32::from_rgb((intensity * 125.0).round() as u8, 0, 125)
    }
}

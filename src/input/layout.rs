use crate::synth::note::{PitchClass, BLACK_KEYS, WHITE_KEYS};
use device_query::Keycode;
use std::collections::HashMap;

/// The pitch a physical key plays, relative to the current octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub pitch: PitchClass,
    pub octave_shift: i32,
}

/// One pair of keyboard rows: the upper row plays black keys, the lower row white keys.
struct RowPair {
    black: &'static [Keycode],
    white: &'static [Keycode],
}

const QWERTY_ROWS: [RowPair; 2] = [
    RowPair {
        black: &[
            Keycode::A,
            Keycode::S,
            Keycode::D,
            Keycode::F,
            Keycode::G,
            Keycode::H,
            Keycode::J,
            Keycode::K,
            Keycode::L,
            Keycode::Semicolon,
            Keycode::Apostrophe,
            Keycode::BackSlash,
        ],
        white: &[
            Keycode::Grave,
            Keycode::Z,
            Keycode::X,
            Keycode::C,
            Keycode::V,
            Keycode::B,
            Keycode::N,
            Keycode::M,
            Keycode::Comma,
            Keycode::Dot,
            Keycode::Slash,
        ],
    },
    RowPair {
        black: &[
            Keycode::Key1,
            Keycode::Key2,
            Keycode::Key3,
            Keycode::Key4,
            Keycode::Key5,
            Keycode::Key6,
            Keycode::Key7,
            Keycode::Key8,
            Keycode::Key9,
            Keycode::Key0,
            Keycode::Minus,
            Keycode::Equal,
            Keycode::Backspace,
        ],
        white: &[
            Keycode::Tab,
            Keycode::Q,
            Keycode::W,
            Keycode::E,
            Keycode::R,
            Keycode::T,
            Keycode::Y,
            Keycode::U,
            Keycode::I,
            Keycode::O,
            Keycode::P,
            Keycode::LeftBracket,
            Keycode::RightBracket,
            Keycode::Enter,
        ],
    },
];

/// Static map from physical keys to notes, built once at startup.
#[derive(Debug, Clone)]
pub struct KeyLayout {
    bindings: HashMap<Keycode, KeyBinding>,
}

impl KeyLayout {
    /// Two piano rows over the four letter/number rows of a QWERTY keyboard.
    pub fn qwerty() -> Self {
        let mut bindings = HashMap::new();
        for (row, pair) in QWERTY_ROWS.iter().enumerate() {
            let row = row as i32;
            for (i, key) in pair.white.iter().enumerate() {
                bindings.insert(
                    *key,
                    KeyBinding {
                        pitch: WHITE_KEYS[i % WHITE_KEYS.len()],
                        octave_shift: row + (i / WHITE_KEYS.len()) as i32,
                    },
                );
            }
            for (i, key) in pair.black.iter().enumerate() {
                let mut rel = i % WHITE_KEYS.len();
                // No black key between E-F and B-C.
                if rel == 2 || rel == 6 {
                    continue;
                }
                if rel > 2 {
                    rel -= 1;
                }
                bindings.insert(
                    *key,
                    KeyBinding {
                        pitch: BLACK_KEYS[rel],
                        octave_shift: row + (i / WHITE_KEYS.len()) as i32,
                    },
                );
            }
        }
        Self { bindings }
    }

    pub fn get(&self, key: &Keycode) -> Option<KeyBinding> {
        self.bindings.get(key).copied()
    }
}

impl Default for KeyLayout {
    fn default() -> Self {
        Self::qwerty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::note::PitchClass::*;
    use pretty_assertions::assert_eq;

    fn binding(pitch: PitchClass, octave_shift: i32) -> Option<KeyBinding> {
        Some(KeyBinding {
            pitch,
            octave_shift,
        })
    }

    #[test]
    fn lower_white_row() {
        let layout = KeyLayout::qwerty();
        let keys = [
            Keycode::Grave,
            Keycode::Z,
            Keycode::X,
            Keycode::C,
            Keycode::V,
            Keycode::B,
            Keycode::N,
            Keycode::M,
            Keycode::Comma,
            Keycode::Dot,
            Keycode::Slash,
        ];
        let got: Vec<_> = keys.iter().map(|k| layout.get(k)).collect();
        assert_eq!(
            got,
            vec![
                binding(C, 0),
                binding(D, 0),
                binding(E, 0),
                binding(F, 0),
                binding(G, 0),
                binding(A, 0),
                binding(B, 0),
                binding(C, 1),
                binding(D, 1),
                binding(E, 1),
                binding(F, 1),
            ]
        );
    }

    #[test]
    fn lower_black_row_skips_gaps() {
        let layout = KeyLayout::qwerty();
        let keys = [
            Keycode::A,
            Keycode::S,
            Keycode::D,
            Keycode::F,
            Keycode::G,
            Keycode::H,
            Keycode::J,
            Keycode::K,
            Keycode::L,
            Keycode::Semicolon,
            Keycode::Apostrophe,
            Keycode::BackSlash,
        ];
        let got: Vec<_> = keys.iter().map(|k| layout.get(k)).collect();
        assert_eq!(
            got,
            vec![
                binding(CSharp, 0),
                binding(DSharp, 0),
                None,
                binding(FSharp, 0),
                binding(GSharp, 0),
                binding(ASharp, 0),
                None,
                binding(CSharp, 1),
                binding(DSharp, 1),
                None,
                binding(FSharp, 1),
                binding(GSharp, 1),
            ]
        );
    }

    #[test]
    fn upper_rows_are_one_octave_up() {
        let layout = KeyLayout::qwerty();
        assert_eq!(layout.get(&Keycode::Tab), binding(C, 1));
        assert_eq!(layout.get(&Keycode::Q), binding(D, 1));
        assert_eq!(layout.get(&Keycode::U), binding(C, 2));
        assert_eq!(layout.get(&Keycode::Enter), binding(B, 2));
        assert_eq!(layout.get(&Keycode::Key1), binding(CSharp, 1));
        assert_eq!(layout.get(&Keycode::Key3), None);
        assert_eq!(layout.get(&Keycode::Key8), binding(CSharp, 2));
        assert_eq!(layout.get(&Keycode::Key0), None);
        assert_eq!(layout.get(&Keycode::Minus), binding(FSharp, 2));
        assert_eq!(layout.get(&Keycode::Equal), binding(GSharp, 2));
        assert_eq!(layout.get(&Keycode::Backspace), binding(ASharp, 2));
    }

    #[test]
    fn control_keys_are_unmapped() {
        let layout = KeyLayout::qwerty();
        for key in [
            Keycode::Escape,
            Keycode::Left,
            Keycode::Right,
            Keycode::Up,
            Keycode::Down,
            Keycode::Space,
        ] {
            assert_eq!(layout.get(&key), None);
        }
    }

    #[test]
    fn total_mapped_keys() {
        // 11 + 14 white, 9 + 10 black.
        assert_eq!(KeyLayout::qwerty().bindings.len(), 44);
    }
}

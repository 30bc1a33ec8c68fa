pub mod app;
pub mod keyboard_view;

pub use self::app::{PianoApp, PianoSession};
pub use self::keyboard_view::KeyboardView;

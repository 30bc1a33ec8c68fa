pub mod keyboard;
pub mod layout;

pub use self::keyboard::{InputEvent, KeyboardHandler};
pub use self::layout::{KeyBinding, KeyLayout};

pub mod config;
pub mod engine;
pub mod note;
pub mod note_state;

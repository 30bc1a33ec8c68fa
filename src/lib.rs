pub mod audio;
pub mod config;
pub mod input;
pub mod synth;
pub mod ui;

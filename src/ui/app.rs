use super::keyboard_view::{KeyboardView, STATUS_HEIGHT};
use crate::config::PianoConfig;
use crate::input::{InputEvent, KeyLayout, KeyboardHandler};
use crate::synth::note::{Note, NoteError, NoteEvent};
use crate::synth::note_state::{Highlight, NoteStates};
use device_query::DeviceState;
use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense};
use log::{info, warn};
use std::collections::HashMap;
use std::sync::mpsc::Sender;

/// Input, note timing and synth messaging, independent of the window.
pub struct PianoSession {
    keyboard: KeyboardHandler,
    notes: NoteStates,
    // Channel each tracked note was started on.
    channels: HashMap<Note, u8>,
    note_sender: Sender<NoteEvent>,
    velocity: u8,
    recording: bool,
}

impl PianoSession {
    pub fn new(config: &PianoConfig, note_sender: Sender<NoteEvent>, recording: bool) -> Self {
        Self {
            keyboard: KeyboardHandler::new(
                KeyLayout::qwerty(),
                config.start_octave,
                config.channel,
            ),
            notes: NoteStates::new(config.fadeout, config.stop_timeout),
            channels: HashMap::new(),
            note_sender,
            velocity: config.velocity,
            recording,
        }
    }

    pub fn keyboard_mut(&mut self) -> &mut KeyboardHandler {
        &mut self.keyboard
    }

    /// Applies one frame of input. Returns true once quitting was requested.
    pub fn handle_events(&mut self, events: Vec<InputEvent>, now: f64) -> bool {
        let mut quit = false;
        for event in events {
            match event {
                InputEvent::Press(note) => self.press(note, now),
                InputEvent::Release(note) => self.notes.release(note, now),
                InputEvent::OctaveChanged(octave) => info!("Octave {}", octave),
                InputEvent::ChannelChanged(channel) => info!("Channel {}", channel),
                InputEvent::Quit => quit = true,
            }
        }
        if quit {
            self.send(Ok(NoteEvent::AllOff));
        }
        quit
    }

    fn press(&mut self, note: Note, now: f64) {
        let channel = self.keyboard.channel();
        match NoteEvent::note_on(note, channel, self.velocity) {
            Ok(event) => {
                self.notes.play(note, now);
                // The same note may already sound on another channel from a second key.
                if let Some(previous) = self.channels.insert(note, channel) {
                    if previous != channel {
                        self.send(NoteEvent::note_off(note, previous));
                    }
                }
                self.send(Ok(event));
            }
            Err(e) => warn!("Not playing {}: {}", note, e),
        }
    }

    /// Advances the note table, stopping notes whose release timeout passed.
    pub fn tick(&mut self, now: f64) -> Vec<Highlight> {
        let output = self.notes.tick(now);
        for note in output.to_stop {
            let channel = self
                .channels
                .remove(&note)
                .unwrap_or_else(|| self.keyboard.channel());
            self.send(NoteEvent::note_off(note, channel));
        }
        output.highlights
    }

    fn send(&self, event: Result<NoteEvent, NoteError>) {
        match event {
            Ok(event) => {
                if let Err(e) = self.note_sender.send(event) {
                    warn!("Error sending {:?}: {}", event, e);
                }
            }
            Err(e) => warn!("Dropping note event: {}", e),
        }
    }

    pub fn status_text(&self) -> String {
        let held: Vec<String> = self.notes.held().iter().map(|n| n.to_string()).collect();
        format!(
            "octave {}  channel {}{}  {}",
            self.keyboard.octave(),
            self.keyboard.channel(),
            if self.recording { "  [rec]" } else { "" },
            held.join(" ")
        )
    }
}

pub struct PianoApp {
    device_state: DeviceState,
    session: PianoSession,
    view: KeyboardView,
}

impl PianoApp {
    pub fn new(config: &PianoConfig, note_sender: Sender<NoteEvent>, recording: bool) -> Self {
        Self {
            device_state: DeviceState::new(),
            session: PianoSession::new(config, note_sender, recording),
            view: KeyboardView::new(config.octaves, config.lowest),
        }
    }
}

impl eframe::App for PianoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|i| i.time);

        let events = self.session.keyboard_mut().poll(&self.device_state);
        let quit = self.session.handle_events(events, now);
        let highlights = self.session.tick(now);
        let status = self.session.status_text();

        let view = &mut self.view;
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(Color32::WHITE))
            .show(ctx, |ui| {
                let (rect, _) = ui.allocate_exact_size(view.keys_size(), Sense::hover());
                let painter = ui.painter();
                view.paint(painter, rect.min, &highlights);
                painter.text(
                    Pos2::new(rect.left() + 4.0, rect.bottom() + STATUS_HEIGHT / 2.0),
                    Align2::LEFT_CENTER,
                    status,
                    FontId::monospace(12.0),
                    Color32::BLACK,
                );
            });

        if quit {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        } else {
            ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::note::PitchClass;
    use device_query::Keycode;
    use std::sync::mpsc::{channel, Receiver};

    fn session() -> (PianoSession, Receiver<NoteEvent>) {
        let (tx, rx) = channel();
        (PianoSession::new(&PianoConfig::default(), tx, false), rx)
    }

    fn drain(rx: &Receiver<NoteEvent>) -> Vec<NoteEvent> {
        rx.try_iter().collect()
    }

    #[test]
    fn press_plays_and_delayed_release_stops() {
        let (mut session, rx) = session();
        let c4 = Note::new(PitchClass::C, 4);

        let events = session.keyboard_mut().update(&[Keycode::Grave]);
        assert!(!session.handle_events(events, 0.0));
        assert_eq!(
            drain(&rx),
            vec![NoteEvent::On {
                channel: 8,
                key: 60,
                velocity: 100
            }]
        );
        assert_eq!(session.tick(0.0).len(), 1);

        let events = session.keyboard_mut().update(&[]);
        session.handle_events(events, 1.0);
        session.tick(1.01);
        assert!(drain(&rx).is_empty());

        session.tick(1.1);
        assert_eq!(drain(&rx), vec![NoteEvent::note_off(c4, 8).unwrap()]);
    }

    #[test]
    fn note_off_uses_the_channel_the_note_started_on() {
        let (mut session, rx) = session();
        let events = session.keyboard_mut().update(&[Keycode::Grave]);
        session.handle_events(events, 0.0);
        let events = session.keyboard_mut().update(&[Keycode::Grave, Keycode::Up]);
        session.handle_events(events, 0.1);
        let events = session.keyboard_mut().update(&[]);
        session.handle_events(events, 0.2);
        drain(&rx);

        session.tick(1.0);
        assert_eq!(drain(&rx), vec![NoteEvent::Off { channel: 8, key: 60 }]);
        assert!(session.status_text().starts_with("octave 4  channel 9"));
    }

    #[test]
    fn same_note_from_two_keys_on_two_channels_is_fully_stopped() {
        let (mut session, rx) = session();
        let c5 = Note::new(PitchClass::C, 5);
        // M and Tab both play C5.
        let events = session.keyboard_mut().update(&[Keycode::M]);
        session.handle_events(events, 0.0);
        let events = session.keyboard_mut().update(&[Keycode::M, Keycode::Up]);
        session.handle_events(events, 0.1);
        let events = session
            .keyboard_mut()
            .update(&[Keycode::M, Keycode::Up, Keycode::Tab]);
        session.handle_events(events, 0.2);
        let events = session.keyboard_mut().update(&[]);
        session.handle_events(events, 0.3);
        session.tick(2.0);

        assert_eq!(
            drain(&rx),
            vec![
                NoteEvent::note_on(c5, 8, 100).unwrap(),
                NoteEvent::note_off(c5, 8).unwrap(),
                NoteEvent::note_on(c5, 9, 100).unwrap(),
                NoteEvent::note_off(c5, 9).unwrap(),
            ]
        );
    }

    #[test]
    fn out_of_range_notes_are_skipped() {
        let (tx, rx) = channel();
        let config = PianoConfig {
            start_octave: 8,
            ..PianoConfig::default()
        };
        let mut session = PianoSession::new(&config, tx, false);
        // Enter is B two octaves up: B10 is past MIDI 127.
        let events = session.keyboard_mut().update(&[Keycode::Enter]);
        session.handle_events(events, 0.0);
        assert!(drain(&rx).is_empty());
        assert!(session.tick(0.0).is_empty());
    }

    #[test]
    fn escape_silences_everything() {
        let (mut session, rx) = session();
        let events = session.keyboard_mut().update(&[Keycode::Escape]);
        assert!(session.handle_events(events, 0.0));
        assert_eq!(drain(&rx), vec![NoteEvent::AllOff]);
    }

    #[test]
    fn status_lists_held_notes() {
        let (tx, _rx) = channel();
        let mut session = PianoSession::new(&PianoConfig::default(), tx, true);
        let events = session.keyboard_mut().update(&[Keycode::V, Keycode::Grave]);
        session.handle_events(events, 0.0);
        assert_eq!(session.status_text(), "octave 4  channel 8  [rec]  C4 G4");
    }
}

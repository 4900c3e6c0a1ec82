//! MIDI keyboard input
//!
//! Receives raw MIDI bytes in the midir callback, runs them through the
//! core [`MidiNormalizer`] and sends the surviving note activations to the
//! REPL loop over a crossbeam channel.

use anyhow::{anyhow, Result};
use chordquiz_core::midi::MidiNormalizer;
use chordquiz_core::Note;
use crossbeam_channel::Sender;
use midir::{MidiInput, MidiInputConnection, MidiInputPort};
use std::time::Duration;

const CLIENT_NAME: &str = "chordquiz";

/// Connection change, reported to the REPL loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiStatus {
    pub connected: bool,
    pub message: String,
}

/// Callback data passed to midir
struct CallbackData {
    normalizer: MidiNormalizer,
    note_tx: Sender<Note>,
}

/// The midir callback: called on the MIDI driver thread for every message
fn midi_callback(timestamp: u64, data: &[u8], callback_data: &mut CallbackData) {
    let Some(note) = callback_data.normalizer.handle(timestamp, data) else {
        return;
    };
    if callback_data.note_tx.send(note).is_err() {
        log::warn!("MIDI: note channel closed, dropping {}", note);
    }
}

/// MIDI input handle, owned by the REPL.
///
/// Holds at most one open connection.
pub struct MidiInputHandle {
    connection: Option<MidiInputConnection<CallbackData>>,
    port_name: Option<String>,
    debounce: Duration,
    note_tx: Sender<Note>,
    status_tx: Sender<MidiStatus>,
}

impl MidiInputHandle {
    pub fn new(note_tx: Sender<Note>, status_tx: Sender<MidiStatus>, debounce: Duration) -> Self {
        Self {
            connection: None,
            port_name: None,
            debounce,
            note_tx,
            status_tx,
        }
    }

    /// List available MIDI input ports.
    /// Creating the client can fail transiently on some systems, so this
    /// tries up to 3 times.
    pub fn list_ports() -> Result<Vec<String>> {
        let mut last_err = None;
        for attempt in 0..3 {
            if attempt > 0 {
                std::thread::sleep(Duration::from_millis(100));
            }
            match MidiInput::new(CLIENT_NAME) {
                Ok(midi_in) => {
                    return Ok(midi_in
                        .ports()
                        .iter()
                        .filter_map(|p| midi_in.port_name(p).ok())
                        .collect());
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(anyhow!(
            "MIDI initialization failed after 3 attempts: {:?}",
            last_err
        ))
    }

    fn find_port(midi_in: &MidiInput, port_match: &str) -> Result<(MidiInputPort, String)> {
        let needle = port_match.to_lowercase();
        midi_in
            .ports()
            .into_iter()
            .find_map(|port| {
                let name = midi_in.port_name(&port).ok()?;
                name.to_lowercase()
                    .contains(&needle)
                    .then_some((port, name))
            })
            .ok_or_else(|| anyhow!("MIDI input port '{}' not found", port_match))
    }

    /// Connect to the first input port whose name contains `port_match`
    /// (case-insensitive). Replaces any open connection. Returns the full
    /// port name.
    pub fn connect(&mut self, port_match: &str) -> Result<String> {
        let mut midi_in = MidiInput::new(CLIENT_NAME)?;
        // Clock and active sensing are dropped by the normalizer anyway
        midi_in.ignore(midir::Ignore::TimeAndActiveSense);
        let (port, name) = Self::find_port(&midi_in, port_match)?;

        self.disconnect();

        let callback_data = CallbackData {
            normalizer: MidiNormalizer::new(self.debounce),
            note_tx: self.note_tx.clone(),
        };
        let connection = midi_in
            .connect(&port, "chordquiz-input", midi_callback, callback_data)
            .map_err(|e| anyhow!("Failed to connect to '{}': {}", name, e))?;

        log::info!("MIDI: input connected to {}", name);
        self.connection = Some(connection);
        self.port_name = Some(name.clone());
        self.report(true, format!("Connected to {}", name));
        Ok(name)
    }

    /// Close the connection. Returns whether one was open.
    pub fn disconnect(&mut self) -> bool {
        let Some(connection) = self.connection.take() else {
            return false;
        };
        let _ = connection.close();
        let name = self.port_name.take().unwrap_or_default();
        log::info!("MIDI: input disconnected from {}", name);
        self.report(false, format!("Disconnected from {}", name));
        true
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn connected_port(&self) -> Option<&str> {
        self.port_name.as_deref()
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Applies to the next connection
    pub fn set_debounce(&mut self, debounce: Duration) {
        self.debounce = debounce;
    }

    fn report(&self, connected: bool, message: String) {
        let _ = self.status_tx.send(MidiStatus { connected, message });
    }
}

impl Drop for MidiInputHandle {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            let _ = connection.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_callback_forwards_debounced_note_ons() {
        let (note_tx, note_rx) = unbounded();
        let mut data = CallbackData {
            normalizer: MidiNormalizer::default(),
            note_tx,
        };

        midi_callback(0, &[0x90, 64, 100], &mut data);
        midi_callback(10_000, &[0x90, 64, 100], &mut data);
        midi_callback(20_000, &[0xFE], &mut data);
        midi_callback(30_000, &[0x80, 64, 0], &mut data);
        midi_callback(40_000, &[0x91, 67, 80], &mut data);

        let received: Vec<&str> = note_rx.try_iter().map(|n| n.name()).collect();
        assert_eq!(received, vec!["E", "G"]);
    }

    #[test]
    fn test_callback_survives_closed_channel() {
        let (note_tx, note_rx) = unbounded();
        drop(note_rx);
        let mut data = CallbackData {
            normalizer: MidiNormalizer::default(),
            note_tx,
        };
        midi_callback(0, &[0x90, 60, 100], &mut data);
    }

    #[test]
    fn test_new_handle_is_disconnected() {
        let (note_tx, _note_rx) = unbounded();
        let (status_tx, status_rx) = unbounded();
        let mut handle = MidiInputHandle::new(note_tx, status_tx, Duration::from_millis(50));

        assert!(!handle.is_connected());
        assert_eq!(handle.connected_port(), None);
        assert!(!handle.disconnect());
        assert!(status_rx.try_recv().is_err());

        handle.set_debounce(Duration::from_millis(80));
        assert_eq!(handle.debounce(), Duration::from_millis(80));
    }

    #[test]
    fn test_list_ports() {
        // May fail on machines without a MIDI backend
        match MidiInputHandle::list_ports() {
            Ok(ports) => println!("Found {} MIDI input ports", ports.len()),
            Err(e) => println!("MIDI unavailable: {}", e),
        }
    }
}

//! MIDI input normalization
//!
//! Turns raw channel-voice messages into octave-agnostic note activations.
//! Only note-ons reach the quiz: it has no notion of held notes, each
//! activation toggles a note in the answer.

use crate::theory::{Note, NOTE_NAMES};
use std::time::Duration;

/// Default minimum gap between two forwarded note-ons of the same note
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(50);

/// A parsed note message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn(Note),
    NoteOff(Note),
}

impl MidiEvent {
    /// Parse a raw MIDI message.
    ///
    /// - System messages (status >= 0xF0: clock, active sensing, ...) are dropped
    /// - Note On: 0x9n nn vv with vv > 0
    /// - Note Off: 0x8n nn vv, or 0x9n nn 00 (running-status convention)
    ///
    /// Everything else (CC, pitch bend, aftertouch, short messages) is `None`.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let (&status, rest) = data.split_first()?;
        if status >= 0xF0 {
            return None;
        }
        let &[note_number, velocity, ..] = rest else {
            return None;
        };

        let note = note_from_number(note_number);
        match status & 0xF0 {
            0x90 if velocity > 0 => Some(MidiEvent::NoteOn(note)),
            0x90 | 0x80 => Some(MidiEvent::NoteOff(note)),
            _ => None,
        }
    }
}

/// Note for a MIDI note number, octave discarded (60 -> C, 61 -> C#)
pub fn note_from_number(number: u8) -> Note {
    let index = (number % 12) as usize;
    NOTE_NAMES[index]
        .parse()
        .unwrap_or_else(|_| Note::from_pitch_class(index as u8))
}

/// Filters raw MIDI messages down to debounced note activations.
///
/// A note-on for the same note that arrives within `window` of the last
/// forwarded note-on for that note is treated as key bounce and dropped.
/// A different note is always forwarded, however fast it follows.
#[derive(Debug, Clone)]
pub struct MidiNormalizer {
    window: Duration,
    /// Timestamp (microseconds) of the last forwarded note-on, per pitch class
    last: [Option<u64>; 12],
}

impl MidiNormalizer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last: [None; 12],
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Handle one raw message stamped in microseconds (the `midir` callback
    /// timestamp). Returns the note to activate, if any.
    pub fn handle(&mut self, timestamp_us: u64, data: &[u8]) -> Option<Note> {
        match MidiEvent::parse(data)? {
            MidiEvent::NoteOn(note) => self.debounce(timestamp_us, note),
            MidiEvent::NoteOff(note) => {
                log::trace!("MIDI note off {} ignored", note);
                None
            }
        }
    }

    fn debounce(&mut self, timestamp_us: u64, note: Note) -> Option<Note> {
        let slot = &mut self.last[note.pitch_class() as usize];
        if let Some(last_stamp) = *slot {
            let gap = Duration::from_micros(timestamp_us.saturating_sub(last_stamp));
            if gap < self.window {
                log::debug!("Duplicate MIDI note on {} ignored ({:?} apart)", note, gap);
                return None;
            }
        }

        *slot = Some(timestamp_us);
        log::debug!("MIDI note on {}", note);
        Some(note)
    }

    /// Forget every forwarded note
    pub fn reset(&mut self) {
        self.last = [None; 12];
    }
}

impl Default for MidiNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: u64 = 1_000;

    #[test]
    fn test_parse_note_on_off() {
        assert_eq!(
            MidiEvent::parse(&[0x90, 60, 100]),
            Some(MidiEvent::NoteOn("C".parse().unwrap()))
        );
        // Channel bits don't matter
        assert_eq!(
            MidiEvent::parse(&[0x93, 61, 1]),
            Some(MidiEvent::NoteOn("C#".parse().unwrap()))
        );
        assert_eq!(
            MidiEvent::parse(&[0x80, 62, 64]),
            Some(MidiEvent::NoteOff("D".parse().unwrap()))
        );
        // Note on with velocity 0 is a note off
        assert_eq!(
            MidiEvent::parse(&[0x9F, 62, 0]),
            Some(MidiEvent::NoteOff("D".parse().unwrap()))
        );
    }

    #[test]
    fn test_parse_drops_system_and_other_messages() {
        assert_eq!(MidiEvent::parse(&[0xF8]), None);
        assert_eq!(MidiEvent::parse(&[0xFE]), None);
        assert_eq!(MidiEvent::parse(&[0xF0, 60, 100]), None);
        assert_eq!(MidiEvent::parse(&[0xB0, 7, 100]), None);
        assert_eq!(MidiEvent::parse(&[0xE0, 0, 64]), None);
        assert_eq!(MidiEvent::parse(&[0x90, 60]), None);
        assert_eq!(MidiEvent::parse(&[]), None);
    }

    #[test]
    fn test_note_from_number_discards_octave() {
        assert_eq!(note_from_number(60).name(), "C");
        assert_eq!(note_from_number(61).name(), "C#");
        assert_eq!(note_from_number(0).name(), "C");
        assert_eq!(note_from_number(127).name(), "G");
        assert_eq!(note_from_number(70).name(), "A#");
    }

    #[test]
    fn test_system_messages_never_forwarded() {
        let mut normalizer = MidiNormalizer::default();
        for status in 0xF0..=0xFFu8 {
            assert_eq!(normalizer.handle(0, &[status, 60, 100]), None);
        }
    }

    #[test]
    fn test_note_off_never_forwarded() {
        let mut normalizer = MidiNormalizer::default();
        assert_eq!(normalizer.handle(0, &[0x80, 60, 0]), None);
        assert_eq!(normalizer.handle(0, &[0x90, 60, 0]), None);
    }

    #[test]
    fn test_same_note_within_window_is_suppressed() {
        let mut normalizer = MidiNormalizer::default();
        assert!(normalizer.handle(0, &[0x90, 60, 100]).is_some());
        assert_eq!(normalizer.handle(20 * MS, &[0x90, 60, 100]), None);
        // Same pitch class in another octave is the same note name
        assert_eq!(normalizer.handle(30 * MS, &[0x90, 72, 100]), None);
    }

    #[test]
    fn test_same_note_after_window_is_forwarded() {
        let mut normalizer = MidiNormalizer::default();
        assert!(normalizer.handle(0, &[0x90, 60, 100]).is_some());
        assert!(normalizer.handle(50 * MS, &[0x90, 60, 100]).is_some());
    }

    #[test]
    fn test_different_notes_within_window_both_forwarded() {
        let mut normalizer = MidiNormalizer::default();
        let c = normalizer.handle(0, &[0x90, 60, 100]);
        let d = normalizer.handle(5 * MS, &[0x90, 62, 100]);
        assert_eq!(c.map(|n| n.name()), Some("C"));
        assert_eq!(d.map(|n| n.name()), Some("D"));
    }

    #[test]
    fn test_debounce_is_per_note() {
        let mut normalizer = MidiNormalizer::default();
        assert!(normalizer.handle(0, &[0x90, 60, 100]).is_some());
        assert!(normalizer.handle(5 * MS, &[0x90, 62, 100]).is_some());
        // C is still inside its own window even though D came in between
        assert_eq!(normalizer.handle(10 * MS, &[0x90, 60, 100]), None);
        assert_eq!(normalizer.handle(30 * MS, &[0x90, 62, 100]), None);
    }

    #[test]
    fn test_state_updates_only_on_forwarded_events() {
        let mut normalizer = MidiNormalizer::default();
        assert!(normalizer.handle(0, &[0x90, 60, 100]).is_some());
        // Suppressed retrigger does not extend the window
        assert_eq!(normalizer.handle(40 * MS, &[0x90, 60, 100]), None);
        assert!(normalizer.handle(60 * MS, &[0x90, 60, 100]).is_some());

        // Note offs don't touch it either
        assert_eq!(normalizer.handle(70 * MS, &[0x80, 60, 0]), None);
        assert_eq!(normalizer.handle(80 * MS, &[0x90, 60, 100]), None);
    }

    #[test]
    fn test_reset_clears_window() {
        let mut normalizer = MidiNormalizer::new(Duration::from_millis(100));
        assert!(normalizer.handle(0, &[0x90, 60, 100]).is_some());
        normalizer.reset();
        assert!(normalizer.handle(10 * MS, &[0x90, 60, 100]).is_some());
    }
}

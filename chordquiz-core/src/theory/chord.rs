use super::note::{resolve_root, Note, NOTE_NAMES};
#[cfg(feature = "colored")]
use colored::*;
use std::fmt;

/// A named interval pattern applied to a root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChordType {
    /// Lookup key, e.g. "minor7"
    pub key: &'static str,
    /// Human readable name, e.g. "Minor 7th"
    pub display_name: &'static str,
    /// Semitones above the root, starting at 0
    pub intervals: &'static [u8],
    /// Appended to the root for the chord name, e.g. "m7"
    pub suffix: &'static str,
}

pub const CHORD_TYPES: [ChordType; 8] = [
    ChordType {
        key: "major",
        display_name: "Major",
        intervals: &[0, 4, 7],
        suffix: "",
    },
    ChordType {
        key: "minor",
        display_name: "Minor",
        intervals: &[0, 3, 7],
        suffix: "m",
    },
    ChordType {
        key: "seventh",
        display_name: "Dominant 7th",
        intervals: &[0, 4, 7, 10],
        suffix: "7",
    },
    ChordType {
        key: "major7",
        display_name: "Major 7th",
        intervals: &[0, 4, 7, 11],
        suffix: "maj7",
    },
    ChordType {
        key: "minor7",
        display_name: "Minor 7th",
        intervals: &[0, 3, 7, 10],
        suffix: "m7",
    },
    ChordType {
        key: "sus4",
        display_name: "Suspended 4th",
        intervals: &[0, 5, 7],
        suffix: "sus4",
    },
    ChordType {
        key: "dim",
        display_name: "Diminished",
        intervals: &[0, 3, 6],
        suffix: "dim",
    },
    ChordType {
        key: "aug",
        display_name: "Augmented",
        intervals: &[0, 4, 8],
        suffix: "aug",
    },
];

impl ChordType {
    /// Look up a built-in chord type by key (case-insensitive)
    pub fn lookup(key: &str) -> Option<&'static ChordType> {
        let key = key.trim();
        CHORD_TYPES.iter().find(|t| t.key.eq_ignore_ascii_case(key))
    }

    /// Apply the intervals to a root. Notes come out in interval order,
    /// spelled with sharps.
    pub fn notes_from(&self, root: Note) -> Vec<Note> {
        self.intervals
            .iter()
            .map(|&interval| {
                let index = (root.pitch_class() + interval) % 12;
                // NOTE_NAMES entries always parse
                NOTE_NAMES[index as usize]
                    .parse()
                    .unwrap_or_else(|_| Note::from_pitch_class(index))
            })
            .collect()
    }
}

/// A concrete chord: its display name and its notes, root first
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chord {
    name: String,
    notes: Vec<Note>,
}

impl Chord {
    pub fn new(name: impl Into<String>, notes: Vec<Note>) -> Self {
        Chord {
            name: name.into(),
            notes,
        }
    }

    /// Build a chord from a root label and a chord type key.
    /// Returns `None` if either fails to resolve.
    pub fn build(root: &str, chord_type: &str) -> Option<Self> {
        let notes = chord_notes(root, chord_type);
        let name = chord_name(root, chord_type);
        if notes.is_empty() || name.is_empty() {
            return None;
        }
        Some(Chord { name, notes })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Notes in interval order (root first)
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn root(&self) -> Option<Note> {
        self.notes.first().copied()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Parse a chord name such as "Am", "Bbmaj7" or "F#dim".
    /// The root keeps its spelling in the name; notes come out sharp.
    pub fn from_name(name: &str) -> Option<Self> {
        let (root, suffix) = split_chord_name(name.trim())?;
        let chord_type = CHORD_TYPES
            .iter()
            .find(|t| suffix_matches(suffix, t.suffix))?;
        Self::build(root.name(), chord_type.key)
    }

    /// Comma separated note list, e.g. "C, E, G"
    pub fn note_list(&self) -> String {
        self.notes
            .iter()
            .map(|n| n.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        #[cfg(feature = "colored")]
        {
            write!(f, "{}: [{}]", self.name.bold().bright_cyan(), self.note_list())
        }

        #[cfg(not(feature = "colored"))]
        {
            write!(f, "{}: [{}]", self.name, self.note_list())
        }
    }
}

/// Notes of the chord `chord_type` built on `root`.
///
/// Empty when the chord type is unknown or the root cannot be resolved.
/// Combined labels such as "C#/Db" resolve through the sharp spelling.
pub fn chord_notes(root: &str, chord_type: &str) -> Vec<Note> {
    let Some(chord_type) = ChordType::lookup(chord_type) else {
        return Vec::new();
    };
    match resolve_root(root) {
        Some(root) => chord_type.notes_from(root),
        None => Vec::new(),
    }
}

/// Display name of a chord: the root (sharp alias for combined labels)
/// followed by the chord type suffix. Empty when the chord type is unknown.
pub fn chord_name(root: &str, chord_type: &str) -> String {
    let Some(chord_type) = ChordType::lookup(chord_type) else {
        return String::new();
    };
    let root = root.trim();
    let display_root = match root.split_once('/') {
        Some((sharp, _)) => sharp,
        None => root,
    };
    format!("{}{}", display_root, chord_type.suffix)
}

/// Split "Bbmaj7" into (Bb, "maj7")
/// Whether a typed suffix names the chord type with suffix `expected`.
///
/// Only word suffixes ("maj7", "sus4", "dim", "aug") ignore case. "M" and
/// "m" are different chords, so short suffixes must match exactly.
pub(crate) fn suffix_matches(typed: &str, expected: &str) -> bool {
    typed == expected || (expected.len() >= 3 && typed.eq_ignore_ascii_case(expected))
}

pub(crate) fn split_chord_name(name: &str) -> Option<(Note, &str)> {
    if !name.chars().next()?.is_ascii_alphabetic() {
        return None;
    }
    let root_len = match name[1..].chars().next() {
        Some('#') | Some('b') => 2,
        _ => 1,
    };
    let root = name[..root_len].parse::<Note>().ok()?;
    Some((root, &name[root_len..]))
}

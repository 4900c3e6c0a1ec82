use crate::error::QuizError;
use std::fmt;
use std::str::FromStr;

/// Chromatic note names in sharp spelling, indexed by pitch class
/// 0=C, 1=C#, 2=D, 3=D#, 4=E, 5=F, 6=F#, 7=G, 8=G#, 9=A, 10=A#, 11=B
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Root labels offered for chord selection. Black keys carry both spellings.
pub const ROOT_LABELS: [&str; 12] = [
    "C", "C#/Db", "D", "D#/Eb", "E", "F", "F#/Gb", "G", "G#/Ab", "A", "A#/Bb", "B",
];

/// Middle-octave frequencies (A4 = 440Hz), indexed by pitch class
const BASE_OCTAVE_FREQUENCIES: [f32; 12] = [
    261.63, // C4
    277.18, // C#4/Db4
    293.66, // D4
    311.13, // D#4/Eb4
    329.63, // E4
    349.23, // F4
    369.99, // F#4/Gb4
    392.00, // G4
    415.30, // G#4/Ab4
    440.00, // A4
    466.16, // A#4/Bb4
    493.88, // B4
];

/// How an accidental is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Spelling {
    Natural,
    Sharp,
    Flat,
}

/// An octave-agnostic note: a pitch class (0-11) and how it is spelled.
///
/// Equality is spelling-sensitive (`C#` != `Db`). Compare normalized notes,
/// or use [`notes_equal`](super::enharmonic::notes_equal), when the spelling
/// should not matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Note {
    pitch_class: u8,
    spelling: Spelling,
}

impl Note {
    /// Sharp-spelled note for any pitch class, wrapping modulo 12
    pub fn from_pitch_class(pitch_class: u8) -> Self {
        let pitch_class = pitch_class % 12;
        let spelling = if Self::is_natural_pitch(pitch_class) {
            Spelling::Natural
        } else {
            Spelling::Sharp
        };
        Note {
            pitch_class,
            spelling,
        }
    }

    pub fn pitch_class(&self) -> u8 {
        self.pitch_class
    }

    pub fn spelling(&self) -> Spelling {
        self.spelling
    }

    /// True for white keys
    pub fn is_natural(&self) -> bool {
        Self::is_natural_pitch(self.pitch_class)
    }

    fn is_natural_pitch(pitch_class: u8) -> bool {
        matches!(pitch_class, 0 | 2 | 4 | 5 | 7 | 9 | 11)
    }

    /// The written name of this note, e.g. "C", "F#", "Bb"
    pub fn name(&self) -> &'static str {
        match self.spelling {
            Spelling::Flat => match self.pitch_class {
                1 => "Db",
                3 => "Eb",
                6 => "Gb",
                8 => "Ab",
                10 => "Bb",
                pc => NOTE_NAMES[pc as usize],
            },
            _ => NOTE_NAMES[self.pitch_class as usize],
        }
    }

    /// Frequency of this note in the middle octave
    pub fn frequency(&self) -> f32 {
        BASE_OCTAVE_FREQUENCIES[self.pitch_class as usize]
    }
}

impl FromStr for Note {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();

        let (pitch_class, spelling) = match upper.as_str() {
            "C" => (0, Spelling::Natural),
            "D" => (2, Spelling::Natural),
            "E" => (4, Spelling::Natural),
            "F" => (5, Spelling::Natural),
            "G" => (7, Spelling::Natural),
            "A" => (9, Spelling::Natural),
            "B" => (11, Spelling::Natural),

            // 'S' is accepted as a legacy sharp sign
            "C#" | "CS" => (1, Spelling::Sharp),
            "D#" | "DS" => (3, Spelling::Sharp),
            "F#" | "FS" => (6, Spelling::Sharp),
            "G#" | "GS" => (8, Spelling::Sharp),
            "A#" | "AS" => (10, Spelling::Sharp),

            "DB" => (1, Spelling::Flat),
            "EB" => (3, Spelling::Flat),
            "GB" => (6, Spelling::Flat),
            "AB" => (8, Spelling::Flat),
            "BB" => (10, Spelling::Flat),

            _ => return Err(QuizError::UnknownRoot(s.trim().to_string())),
        };

        Ok(Note {
            pitch_class,
            spelling,
        })
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Note {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Note {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Frequency in Hz for a note name in the middle octave.
///
/// Covers the 12 sharp/natural names plus the 5 flat aliases. Anything else
/// returns `0.0`, which callers treat as "do not play".
pub fn frequency(name: &str) -> f32 {
    let pitch_class = match name {
        "C" => 0,
        "C#" | "Db" => 1,
        "D" => 2,
        "D#" | "Eb" => 3,
        "E" => 4,
        "F" => 5,
        "F#" | "Gb" => 6,
        "G" => 7,
        "G#" | "Ab" => 8,
        "A" => 9,
        "A#" | "Bb" => 10,
        "B" => 11,
        _ => {
            log::warn!("No frequency for note name {:?}", name);
            return 0.0;
        }
    };
    BASE_OCTAVE_FREQUENCIES[pitch_class]
}

/// Resolve a root given as a bare note ("D", "Eb") or a combined label
/// ("C#/Db").
///
/// A combined label always resolves through its first alias, the sharp
/// spelling.
pub fn resolve_root(label: &str) -> Option<Note> {
    let label = label.trim();
    let first = match label.split_once('/') {
        Some((sharp, _flat)) => sharp,
        None => label,
    };
    first.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_from_pitch_class() {
        let c = Note::from_pitch_class(0);
        assert_eq!(c.pitch_class(), 0);
        assert_eq!(c.name(), "C");
        assert_eq!(Note::from_pitch_class(13).name(), "C#");
    }

    #[test]
    fn test_note_parsing() {
        let cs: Note = "C#".parse().unwrap();
        assert_eq!(cs.pitch_class(), 1);
        assert_eq!(cs.spelling(), Spelling::Sharp);

        let db: Note = "Db".parse().unwrap();
        assert_eq!(db.pitch_class(), 1);
        assert_eq!(db.spelling(), Spelling::Flat);

        let bb: Note = "bb".parse().unwrap();
        assert_eq!(bb.pitch_class(), 10);

        let fs: Note = "fs".parse().unwrap();
        assert_eq!(fs.name(), "F#");

        assert!("H".parse::<Note>().is_err());
        assert!("C4".parse::<Note>().is_err());
    }

    #[test]
    fn test_note_display_keeps_spelling() {
        let db: Note = "Db".parse().unwrap();
        assert_eq!(format!("{}", db), "Db");
        assert_eq!(format!("{}", Note::from_pitch_class(1)), "C#");
    }

    #[test]
    fn test_frequency_table() {
        assert!((frequency("A") - 440.0).abs() < 0.01);
        assert_eq!(frequency("C#"), frequency("Db"));
        assert_eq!(frequency("A#"), frequency("Bb"));
        assert_eq!(frequency("H"), 0.0);
        assert_eq!(frequency("C#/Db"), 0.0);

        let a: Note = "A".parse().unwrap();
        assert!((a.frequency() - 440.0).abs() < 0.01);
    }

    #[test]
    fn test_resolve_root_prefers_sharp_alias() {
        let root = resolve_root("C#/Db").unwrap();
        assert_eq!(root.name(), "C#");

        let root = resolve_root("A#/Bb").unwrap();
        assert_eq!(root.name(), "A#");

        assert_eq!(resolve_root("Eb").unwrap().name(), "Eb");
        assert!(resolve_root("X/Y").is_none());
        assert!(resolve_root("").is_none());
    }

    #[test]
    fn test_every_root_label_resolves() {
        for (index, label) in ROOT_LABELS.iter().enumerate() {
            let note = resolve_root(label).unwrap();
            assert_eq!(note.pitch_class() as usize, index);
        }
    }
}

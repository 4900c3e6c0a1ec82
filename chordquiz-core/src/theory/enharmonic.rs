//! Enharmonic equivalence: `C#` and `Db` name the same key.
//!
//! Answers are compared as sets of pitch classes, so every note that enters
//! a comparison is first normalized to its sharp spelling.

use super::note::{Note, Spelling};

/// Sharp/flat spelling pairs. Naturals have no partner.
pub const ENHARMONIC_PAIRS: [(&str, &str); 5] = [
    ("C#", "Db"),
    ("D#", "Eb"),
    ("F#", "Gb"),
    ("G#", "Ab"),
    ("A#", "Bb"),
];

/// Map a flat spelling to its sharp partner. Every other input, including
/// names that are not notes at all, is returned unchanged.
pub fn normalize(name: &str) -> &str {
    ENHARMONIC_PAIRS
        .iter()
        .find(|(_, flat)| *flat == name)
        .map(|(sharp, _)| *sharp)
        .unwrap_or(name)
}

/// The other spelling of a note name, if it has one
pub fn enharmonic_partner(name: &str) -> Option<&'static str> {
    ENHARMONIC_PAIRS.iter().find_map(|(sharp, flat)| {
        if *sharp == name {
            Some(*flat)
        } else if *flat == name {
            Some(*sharp)
        } else {
            None
        }
    })
}

impl Note {
    /// This note spelled with a sharp (or as a natural)
    pub fn normalized(self) -> Note {
        Note::from_pitch_class(self.pitch_class())
    }

    /// The same key under its other spelling. Naturals return themselves.
    pub fn enharmonic(self) -> Note {
        match self.spelling() {
            Spelling::Natural => self,
            Spelling::Sharp => enharmonic_partner(self.name())
                .and_then(|flat| flat.parse().ok())
                .unwrap_or(self),
            Spelling::Flat => self.normalized(),
        }
    }

    /// True when both notes are the same key, whatever the spelling
    pub fn same_key(&self, other: &Note) -> bool {
        self.pitch_class() == other.pitch_class()
    }
}

/// Answer-correctness predicate.
///
/// True iff the two collections hold the same notes once normalized, with
/// duplicates counted. Order and spelling never matter.
pub fn notes_equal(a: &[Note], b: &[Note]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    sorted_normalized(a) == sorted_normalized(b)
}

fn sorted_normalized(notes: &[Note]) -> Vec<Note> {
    let mut normalized: Vec<Note> = notes.iter().map(|n| n.normalized()).collect();
    normalized.sort();
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes(names: &[&str]) -> Vec<Note> {
        names.iter().map(|n| n.parse().unwrap()).collect()
    }

    #[test]
    fn test_normalize_flats_to_sharps() {
        assert_eq!(normalize("Db"), "C#");
        assert_eq!(normalize("Eb"), "D#");
        assert_eq!(normalize("Gb"), "F#");
        assert_eq!(normalize("Ab"), "G#");
        assert_eq!(normalize("Bb"), "A#");
    }

    #[test]
    fn test_normalize_passes_through() {
        for name in ["C", "C#", "E", "A#", "B", "H", "", "C#/Db"] {
            assert_eq!(normalize(name), name);
        }
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for (sharp, flat) in ENHARMONIC_PAIRS {
            assert_eq!(normalize(normalize(flat)), normalize(flat));
            assert_eq!(normalize(normalize(sharp)), sharp);
        }

        for pc in 0..12 {
            let note = Note::from_pitch_class(pc);
            assert_eq!(note.normalized().normalized(), note.normalized());
            assert_eq!(note.enharmonic().normalized(), note.normalized());
        }
    }

    #[test]
    fn test_enharmonic_partner() {
        assert_eq!(enharmonic_partner("C#"), Some("Db"));
        assert_eq!(enharmonic_partner("Bb"), Some("A#"));
        assert_eq!(enharmonic_partner("E"), None);

        let gb: Note = "Gb".parse().unwrap();
        assert_eq!(gb.enharmonic().name(), "F#");
        let fs: Note = "F#".parse().unwrap();
        assert_eq!(fs.enharmonic().name(), "Gb");
        assert!(fs.same_key(&gb));
    }

    #[test]
    fn test_notes_equal_ignores_spelling_and_order() {
        assert!(notes_equal(
            &notes(&["Db", "F", "Ab"]),
            &notes(&["G#", "C#", "F"])
        ));
        assert!(notes_equal(
            &notes(&["G#", "C#", "F"]),
            &notes(&["Db", "F", "Ab"])
        ));
    }

    #[test]
    fn test_notes_equal_counts_duplicates() {
        assert!(!notes_equal(&notes(&["C", "E", "G"]), &notes(&["C", "E"])));
        assert!(!notes_equal(
            &notes(&["C", "C", "E"]),
            &notes(&["C", "E", "E"])
        ));
        assert!(notes_equal(&notes(&["C", "C"]), &notes(&["C", "C"])));
        assert!(notes_equal(&[], &[]));
    }
}

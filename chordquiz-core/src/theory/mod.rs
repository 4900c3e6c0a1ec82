// chordquiz-core/src/theory/mod.rs

pub mod chord;
pub mod enharmonic;
pub mod note;

pub use chord::{chord_name, chord_notes, Chord, ChordType, CHORD_TYPES};
pub use enharmonic::{normalize, notes_equal};
pub use note::{frequency, resolve_root, Note, Spelling, NOTE_NAMES, ROOT_LABELS};

//! One-octave keyboard model and its terminal rendering.
//!
//! Seven white keys and five black keys. Each key exposes its [`Note`] so
//! front ends can map user input (typed labels, clicks) back to notes.

use crate::theory::Note;
#[cfg(feature = "colored")]
use colored::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyColor {
    White,
    Black,
}

/// A key on the one-octave keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    pub note: Note,
    pub color: KeyColor,
    /// White keys: index 0-6. Black keys: the white key they sit left of (1-6).
    pub slot: u8,
}

impl Key {
    /// Display label: "C" for white keys, "C#/Db" for black keys
    pub fn label(&self) -> String {
        match self.color {
            KeyColor::White => self.note.name().to_string(),
            KeyColor::Black => format!("{}/{}", self.note.name(), self.note.enharmonic().name()),
        }
    }
}

/// How highlighted keys are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveClass {
    /// Notes of a chord being shown
    #[default]
    Active,
    /// Notes picked by the user
    Selected,
    Correct,
    Incorrect,
}

impl ActiveClass {
    #[cfg(feature = "colored")]
    fn paint(&self, label: &str) -> String {
        let label = label.bold();
        match self {
            ActiveClass::Active => label.bright_cyan().to_string(),
            ActiveClass::Selected => label.bright_yellow().to_string(),
            ActiveClass::Correct => label.bright_green().to_string(),
            ActiveClass::Incorrect => label.bright_red().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    pub active_class: ActiveClass,
    /// Whether keys respond to [`Keyboard::activate`]
    pub interactive: bool,
}

impl RenderOptions {
    pub fn interactive(active_class: ActiveClass) -> Self {
        Self {
            active_class,
            interactive: true,
        }
    }
}

/// True when `note`, under either spelling, is among `active`
pub fn is_active(note: Note, active: &[Note]) -> bool {
    active.iter().any(|a| *a == note || *a == note.enharmonic())
}

const WHITE_PITCHES: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];
/// (pitch class, slot) for C# D# F# G# A#
const BLACK_KEYS: [(u8, u8); 5] = [(1, 1), (3, 2), (6, 4), (8, 5), (10, 6)];
const CELL: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyboard {
    keys: Vec<Key>,
}

impl Keyboard {
    pub fn new() -> Self {
        let white = WHITE_PITCHES.iter().enumerate().map(|(i, &pc)| Key {
            note: Note::from_pitch_class(pc),
            color: KeyColor::White,
            slot: i as u8,
        });
        let black = BLACK_KEYS.iter().map(|&(pc, slot)| Key {
            note: Note::from_pitch_class(pc),
            color: KeyColor::Black,
            slot,
        });
        Self {
            keys: white.chain(black).collect(),
        }
    }

    /// White keys first, then black keys
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// The key that plays `note`, whatever its spelling
    pub fn key_for(&self, note: Note) -> Option<&Key> {
        self.keys.iter().find(|k| k.note.same_key(&note))
    }

    /// Resolve a typed key label ("E", "Bb", "C#/Db")
    pub fn key_by_label(&self, label: &str) -> Option<&Key> {
        let label = label.trim();
        let note = crate::theory::resolve_root(label)?;
        self.key_for(note)
    }

    /// Press a key by label. Only interactive keyboards respond.
    pub fn activate(&self, label: &str, options: &RenderOptions) -> Option<Note> {
        if !options.interactive {
            return None;
        }
        match self.key_by_label(label) {
            Some(key) => Some(key.note),
            None => {
                log::warn!("No key for {:?}", label);
                None
            }
        }
    }

    /// Two-row diagram, black keys above white keys, with `active` keys
    /// highlighted
    pub fn render(&self, active: &[Note], options: &RenderOptions) -> String {
        let mut black_row = " ".repeat(CELL / 2);
        for slot in 1..WHITE_PITCHES.len() as u8 {
            let key = self
                .keys
                .iter()
                .find(|k| k.color == KeyColor::Black && k.slot == slot);
            match key {
                Some(key) => black_row.push_str(&cell(key, active, options)),
                None => black_row.push_str(&" ".repeat(CELL)),
            }
        }

        let white_row: String = self
            .keys
            .iter()
            .filter(|k| k.color == KeyColor::White)
            .map(|key| cell(key, active, options))
            .collect();

        format!("{}\n{}", black_row.trim_end(), white_row.trim_end())
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}

fn cell(key: &Key, active: &[Note], options: &RenderOptions) -> String {
    let name = key.note.name();
    if !is_active(key.note, active) {
        return format!("{:^width$}", name, width = CELL);
    }

    #[cfg(feature = "colored")]
    {
        let padded = format!("{:^width$}", name, width = CELL);
        options.active_class.paint(&padded)
    }

    #[cfg(not(feature = "colored"))]
    {
        let _ = options;
        format!("{:^width$}", format!("[{}]", name), width = CELL)
    }
}

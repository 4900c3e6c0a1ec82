//! Chord selection: which roots and chord types are in play.
//!
//! The active chord universe is the cross product of the selected roots and
//! chord types. Quiz pools are sampled from it.

use crate::error::QuizError;
use crate::theory::{Chord, ChordType, CHORD_TYPES, ROOT_LABELS};
use std::collections::BTreeSet;

/// Build every chord for `roots` × `chord_types`.
///
/// Pairs that don't resolve (unknown root or chord type) are dropped.
/// Fails with [`QuizError::EmptySelection`] when either input is empty or
/// nothing resolves.
pub fn build_selection<R, T>(roots: &[R], chord_types: &[T]) -> Result<Vec<Chord>, QuizError>
where
    R: AsRef<str>,
    T: AsRef<str>,
{
    if roots.is_empty() || chord_types.is_empty() {
        return Err(QuizError::EmptySelection);
    }

    let mut chords = Vec::with_capacity(roots.len() * chord_types.len());
    for root in roots {
        for chord_type in chord_types {
            match Chord::build(root.as_ref(), chord_type.as_ref()) {
                Some(chord) => chords.push(chord),
                None => log::debug!(
                    "Skipping unresolvable chord {} {}",
                    root.as_ref(),
                    chord_type.as_ref()
                ),
            }
        }
    }

    if chords.is_empty() {
        return Err(QuizError::EmptySelection);
    }
    Ok(chords)
}

/// Checked roots and chord types, stored as indices into [`ROOT_LABELS`]
/// and [`CHORD_TYPES`] so iteration follows the chromatic / table order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChordSelection {
    roots: BTreeSet<usize>,
    chord_types: BTreeSet<usize>,
}

impl ChordSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything selected
    pub fn all() -> Self {
        let mut selection = Self::new();
        selection.select_all_roots();
        selection.select_all_types();
        selection
    }

    /// Build a selection from labels, e.g. `["C", "F#/Gb"]` and `["major"]`.
    /// Unknown entries are reported, not skipped.
    pub fn from_labels<R, T>(roots: &[R], chord_types: &[T]) -> Result<Self, QuizError>
    where
        R: AsRef<str>,
        T: AsRef<str>,
    {
        let mut selection = Self::new();
        for root in roots {
            selection.set_root(root.as_ref(), true)?;
        }
        for chord_type in chord_types {
            selection.set_type(chord_type.as_ref(), true)?;
        }
        Ok(selection)
    }

    fn root_index(label: &str) -> Result<usize, QuizError> {
        let label = label.trim();
        // Accept either the exact label ("C#/Db") or any spelling of the key ("Db")
        ROOT_LABELS
            .iter()
            .position(|l| l.eq_ignore_ascii_case(label))
            .or_else(|| {
                label
                    .parse::<crate::theory::Note>()
                    .ok()
                    .map(|note| note.pitch_class() as usize)
            })
            .ok_or_else(|| QuizError::UnknownRoot(label.to_string()))
    }

    fn type_index(key: &str) -> Result<usize, QuizError> {
        CHORD_TYPES
            .iter()
            .position(|t| t.key.eq_ignore_ascii_case(key.trim()))
            .ok_or_else(|| QuizError::UnknownChordType(key.trim().to_string()))
    }

    /// Check or uncheck a root
    pub fn set_root(&mut self, label: &str, selected: bool) -> Result<(), QuizError> {
        let index = Self::root_index(label)?;
        if selected {
            self.roots.insert(index);
        } else {
            self.roots.remove(&index);
        }
        Ok(())
    }

    /// Check or uncheck a chord type
    pub fn set_type(&mut self, key: &str, selected: bool) -> Result<(), QuizError> {
        let index = Self::type_index(key)?;
        if selected {
            self.chord_types.insert(index);
        } else {
            self.chord_types.remove(&index);
        }
        Ok(())
    }

    /// Flip a root; returns whether it is now selected
    pub fn toggle_root(&mut self, label: &str) -> Result<bool, QuizError> {
        let index = Self::root_index(label)?;
        if !self.roots.remove(&index) {
            self.roots.insert(index);
            return Ok(true);
        }
        Ok(false)
    }

    /// Flip a chord type; returns whether it is now selected
    pub fn toggle_type(&mut self, key: &str) -> Result<bool, QuizError> {
        let index = Self::type_index(key)?;
        if !self.chord_types.remove(&index) {
            self.chord_types.insert(index);
            return Ok(true);
        }
        Ok(false)
    }

    pub fn select_all_roots(&mut self) {
        self.roots = (0..ROOT_LABELS.len()).collect();
    }

    pub fn clear_roots(&mut self) {
        self.roots.clear();
    }

    pub fn select_all_types(&mut self) {
        self.chord_types = (0..CHORD_TYPES.len()).collect();
    }

    pub fn clear_types(&mut self) {
        self.chord_types.clear();
    }

    pub fn roots(&self) -> Vec<&'static str> {
        self.roots.iter().map(|&i| ROOT_LABELS[i]).collect()
    }

    pub fn chord_types(&self) -> Vec<&'static ChordType> {
        self.chord_types.iter().map(|&i| &CHORD_TYPES[i]).collect()
    }

    /// Number of chords the selection produces
    pub fn count(&self) -> usize {
        self.roots.len() * self.chord_types.len()
    }

    /// The active chord universe
    pub fn chords(&self) -> Result<Vec<Chord>, QuizError> {
        let type_keys: Vec<&str> = self.chord_types().iter().map(|t| t.key).collect();
        build_selection(&self.roots(), &type_keys)
    }
}

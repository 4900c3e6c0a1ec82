//! # Chordquiz Core
//!
//! Device-free core of the chord quiz: music theory tables, enharmonic
//! normalization, MIDI note normalization, chord selection, the quiz state
//! machine and the keyboard model. No audio or MIDI device dependencies.
//!
//! ## Features
//!
//! - **serde**: Serialize/deserialize notes, chords and quiz settings
//! - **colored**: Colored terminal output for chords and the keyboard
//!
//! ## Example
//!
//! ```ignore
//! use chordquiz_core::quiz::{Quiz, QuizSettings};
//! use chordquiz_core::selection::build_selection;
//!
//! let universe = build_selection(&["C", "G"], &["major", "minor"])?;
//! let mut quiz = Quiz::new(QuizSettings::default());
//! quiz.start(&universe, &mut rand::thread_rng(), std::time::Instant::now())?;
//! println!("{}", quiz.current_question().unwrap().chord);
//! ```

pub mod audio_config;
pub mod error;
pub mod keyboard;
pub mod midi;
pub mod quiz;
pub mod selection;
pub mod theory;

// Re-export commonly used types
pub use audio_config::{AudioSettings, Envelope, PlaybackPreset};
pub use error::QuizError;
pub use keyboard::{ActiveClass, Keyboard, RenderOptions};
pub use midi::{MidiEvent, MidiNormalizer};
pub use quiz::{Quiz, QuizMode, QuizSettings, Score};
pub use selection::{build_selection, ChordSelection};
pub use theory::{Chord, ChordType, Note};

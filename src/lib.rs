//! # chordquiz
//!
//! A terminal chord recognition quiz. Chords are drawn from a chosen set of
//! roots and chord types; the player either names a chord they see and hear
//! or picks its notes on a one-octave keyboard, by typing note names or
//! playing them on a MIDI keyboard.
//!
//! The quiz logic lives in `chordquiz-core`. This crate is the front end:
//!
//! - `repl`: the interactive loop, its timers and config file watching.
//! - `commands`: the command registry and every REPL command.
//! - `audio`: a `cpal` sine synthesizer for chords and single notes.
//! - `midi`: `midir` keyboard input, debounced and normalized to notes.
//! - `config`: the YAML configuration file.

pub mod audio;
pub mod commands;
pub mod config;
pub mod midi;
pub mod repl;

pub use crate::config::AppConfig;
pub use crate::repl::{start, Repl};

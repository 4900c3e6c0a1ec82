//! Command registry for REPL commands
//!
//! Commands are matched by their longest registered prefix. Lines that
//! match no command are treated as quiz input: note names in the notes
//! quiz, a chord name in the name quiz.

pub mod audio;
pub mod general;
pub mod learn;
pub mod midi;
pub mod quiz;
pub mod select;

use crate::audio::AudioPlayerHandle;
use crate::config::AppConfig;
use crate::midi::MidiInputHandle;
use crate::repl::timer::Timers;
use anyhow::Result;
use chordquiz_core::{ChordSelection, Keyboard, Note, PlaybackPreset, Quiz, Score};
use colored::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

/// Result of executing a command
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// Command executed successfully, continue REPL
    Success,
    /// Command executed, show this message
    Message(String),
    /// Exit the REPL
    Exit,
    /// Not a command, try it as quiz input
    NotACommand,
    /// Error occurred
    Error(String),
    /// Watch a config file for changes
    Watch(String),
}

/// A yes/no question waiting for the next input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    ResetScore,
}

/// State shared by all command handlers
pub struct CommandContext {
    pub quiz: Quiz,
    /// Running tally across sessions
    pub score: Score,
    pub selection: ChordSelection,
    pub config: AppConfig,
    pub config_path: PathBuf,
    pub audio: AudioPlayerHandle,
    pub midi: MidiInputHandle,
    pub keyboard: Keyboard,
    pub timers: Timers,
    pub rng: StdRng,
    pub pending: Option<Confirmation>,
}

impl CommandContext {
    /// Build the context from a loaded config.
    ///
    /// An invalid selection in the config falls back to the default one.
    pub fn new(
        config: AppConfig,
        config_path: PathBuf,
        audio: AudioPlayerHandle,
        midi: MidiInputHandle,
        timers: Timers,
    ) -> Self {
        let selection = config.selection.to_selection().unwrap_or_else(|e| {
            log::warn!("Invalid selection in config ({}), using defaults", e);
            crate::config::SelectionConfig::default()
                .to_selection()
                .unwrap_or_default()
        });
        Self {
            quiz: Quiz::new(config.quiz.settings()),
            score: Score::new(),
            selection,
            config,
            config_path,
            audio,
            midi,
            keyboard: Keyboard::new(),
            timers,
            rng: StdRng::from_entropy(),
            pending: None,
        }
    }

    /// Apply a (re)loaded config. Nothing changes if its selection is
    /// invalid.
    pub fn apply_config(&mut self, config: AppConfig) -> Result<()> {
        let selection = config.selection.to_selection()?;
        self.selection = selection;
        self.quiz.set_settings(config.quiz.settings());
        *self.audio.settings_mut() = config.audio.settings();
        self.midi.set_debounce(config.midi.debounce());
        self.config = config;
        Ok(())
    }

    /// Config with the live selection, mode and volume written back
    pub fn effective_config(&self) -> AppConfig {
        let mut config = self.config.clone();
        config.selection = crate::config::SelectionConfig::from_selection(&self.selection);
        config.quiz.set_mode(self.quiz.mode());
        config.audio.volume = self.audio.settings().volume();
        config.audio.auto_play = self.audio.settings().auto_play;
        config
    }

    /// Play a chord. Returns a warning line the first time audio fails.
    pub fn play_chord(&mut self, notes: &[Note]) -> Option<String> {
        self.audio
            .play_chord(notes, PlaybackPreset::CHORD)
            .err()
            .map(audio_warning)
    }

    pub fn play_note(&mut self, note: Note) -> Option<String> {
        self.audio
            .play_note(note, PlaybackPreset::SINGLE_NOTE)
            .err()
            .map(audio_warning)
    }
}

fn audio_warning(e: anyhow::Error) -> String {
    log::warn!("{:#}", e);
    format!("{} {:#}", "⚠".bright_yellow(), e)
}

/// A command handler function
pub type CommandHandler = fn(&str, &mut CommandContext) -> CommandResult;

/// Registry of available commands
pub struct CommandRegistry {
    /// Commands indexed by their prefix (e.g., "select roots")
    /// Sorted by prefix length descending for longest-match-first lookup
    commands: Vec<(String, CommandHandler)>,
}

impl CommandRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Register a command with its prefix
    pub fn register(&mut self, prefix: &str, handler: CommandHandler) {
        self.commands.push((prefix.to_string(), handler));
        self.commands.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    /// Execute a command, returning NotACommand if no match found
    pub fn execute(&self, input: &str, ctx: &mut CommandContext) -> CommandResult {
        for (prefix, handler) in &self.commands {
            if input == prefix || input.starts_with(&format!("{} ", prefix)) {
                let args = input[prefix.len()..].trim();
                return handler(args, ctx);
            }
        }
        CommandResult::NotACommand
    }

    /// Get all registered command prefixes
    pub fn list_commands(&self) -> Vec<&str> {
        self.commands.iter().map(|(p, _)| p.as_str()).collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a fully populated command registry with all built-in commands
pub fn create_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();

    // Quiz
    registry.register("start", quiz::cmd_start);
    registry.register("restart", quiz::cmd_restart);
    registry.register("stop", quiz::cmd_stop);
    registry.register("next", quiz::cmd_next);
    registry.register("replay", quiz::cmd_replay);
    registry.register("status", quiz::cmd_status);
    registry.register("choices", quiz::cmd_choices);
    registry.register("answer", quiz::cmd_answer);
    registry.register("key", quiz::cmd_key);
    registry.register("check", quiz::cmd_check);
    registry.register("clear", quiz::cmd_clear);
    registry.register("mode", quiz::cmd_mode);

    // Chord selection
    registry.register("select roots", select::cmd_select_roots);
    registry.register("select types", select::cmd_select_types);
    registry.register("select all", select::cmd_select_all);
    registry.register("select none", select::cmd_select_none);
    registry.register("selection", select::cmd_selection);

    // Learning
    registry.register("learn", learn::cmd_learn);
    registry.register("show", learn::cmd_show);

    // Audio
    registry.register("volume", audio::cmd_volume);
    registry.register("autoplay", audio::cmd_autoplay);

    // MIDI
    registry.register("midi devices", midi::cmd_midi_devices);
    registry.register("midi connect", midi::cmd_midi_connect);
    registry.register("midi disconnect", midi::cmd_midi_disconnect);
    registry.register("midi status", midi::cmd_midi_status);

    // General
    registry.register("score reset", general::cmd_score_reset);
    registry.register("score", general::cmd_score);
    registry.register("config save", general::cmd_config_save);
    registry.register("config", general::cmd_config);
    registry.register("help", general::cmd_help);
    registry.register("quit", general::cmd_quit);
    registry.register("exit", general::cmd_quit);
    registry.register("watch", general::cmd_watch);

    registry
}

/// Handle one input line: a pending confirmation first, then commands,
/// then quiz input
pub fn dispatch(registry: &CommandRegistry, line: &str, ctx: &mut CommandContext) -> CommandResult {
    if let Some(confirmation) = ctx.pending.take() {
        return general::confirm(confirmation, line, ctx);
    }
    match registry.execute(line, ctx) {
        CommandResult::NotACommand => quiz::handle_bare_input(line, ctx),
        result => result,
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{context, message};
    use super::*;

    #[test]
    fn test_longest_prefix_wins() {
        let registry = create_registry();
        let (mut ctx, _timers) = context(AppConfig::default());
        ctx.score.record(true);

        // "score reset" must not be taken as "score" with args "reset"
        let result = registry.execute("score reset", &mut ctx);
        assert!(message(result).contains("[y/N]"));
        assert_eq!(ctx.pending, Some(Confirmation::ResetScore));
    }

    #[test]
    fn test_prefix_needs_word_boundary() {
        let registry = create_registry();
        let (mut ctx, _timers) = context(AppConfig::default());
        assert_eq!(
            registry.execute("stopwatch", &mut ctx),
            CommandResult::NotACommand
        );
        assert_eq!(registry.execute("quit", &mut ctx), CommandResult::Exit);
        assert_eq!(registry.execute("exit now", &mut ctx), CommandResult::Exit);
    }

    #[test]
    fn test_every_command_is_listed() {
        let registry = create_registry();
        let commands = registry.list_commands();
        for name in ["start", "answer", "select roots", "midi connect", "score reset", "watch"] {
            assert!(commands.contains(&name), "{} not registered", name);
        }
        // Longest first
        assert!(commands
            .windows(2)
            .all(|w| w[0].len() >= w[1].len()));
    }

    #[test]
    fn test_dispatch_routes_confirmation_first() {
        let registry = create_registry();
        let (mut ctx, _timers) = context(AppConfig::default());
        ctx.score.record(true);
        ctx.pending = Some(Confirmation::ResetScore);

        // "help" is read as the answer to the pending question
        dispatch(&registry, "help", &mut ctx);
        assert_eq!(ctx.pending, None);
        assert_eq!(ctx.score.total, 1);
    }

    #[test]
    fn test_apply_config_rejects_bad_selection() {
        let (mut ctx, _timers) = context(AppConfig::default());
        let mut config = AppConfig::default();
        config.selection.types = vec!["power".to_string()];
        config.quiz.pool_size = 5;

        assert!(ctx.apply_config(config).is_err());
        assert_eq!(ctx.quiz.settings().pool_size, 20);
        assert_eq!(ctx.selection.count(), 24);
    }

    #[test]
    fn test_apply_config() {
        let (mut ctx, _timers) = context(AppConfig::default());
        let mut config = AppConfig::default();
        config.quiz.pool_size = 5;
        config.quiz.mode = crate::config::ModeName::Name;
        config.audio.volume = 0.2;
        config.midi.debounce_ms = 80;
        config.selection.roots = vec!["C".to_string()];

        ctx.apply_config(config).unwrap();
        assert_eq!(ctx.quiz.settings().pool_size, 5);
        assert_eq!(ctx.quiz.mode(), chordquiz_core::QuizMode::NameTheChord);
        assert!((ctx.audio.settings().volume() - 0.2).abs() < 1e-6);
        assert_eq!(ctx.midi.debounce(), std::time::Duration::from_millis(80));
        assert_eq!(ctx.selection.count(), 2);
    }
}

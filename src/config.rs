//! Configuration for chordquiz
//!
//! Stored as YAML. Every section and field is optional; anything missing
//! takes its default. The path is given on the command line and can be
//! hot-reloaded with `watch`.

use anyhow::{Context, Result};
use chordquiz_core::midi::DEFAULT_DEBOUNCE;
use chordquiz_core::quiz::{IncorrectPolicy, QuizMode, QuizSettings, Validation};
use chordquiz_core::{AudioSettings, ChordSelection, QuizError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub quiz: QuizConfig,
    pub selection: SelectionConfig,
    pub audio: AudioConfig,
    pub midi: MidiConfig,
}

/// Which quiz is played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeName {
    /// Name the chord
    Name,
    /// Select the notes
    #[default]
    Notes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    pub pool_size: usize,
    pub mode: ModeName,
    /// Only used by the notes quiz
    pub validation: Validation,
    pub advance_delay_ms: u64,
    pub clear_delay_ms: u64,
    /// Only used by the name quiz
    pub on_incorrect: IncorrectPolicy,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            pool_size: QuizSettings::DEFAULT_POOL_SIZE,
            mode: ModeName::default(),
            validation: Validation::default(),
            advance_delay_ms: QuizSettings::DEFAULT_ADVANCE_DELAY.as_millis() as u64,
            clear_delay_ms: QuizSettings::DEFAULT_CLEAR_DELAY.as_millis() as u64,
            on_incorrect: IncorrectPolicy::default(),
        }
    }
}

impl QuizConfig {
    pub fn quiz_mode(&self) -> QuizMode {
        match self.mode {
            ModeName::Name => QuizMode::NameTheChord,
            ModeName::Notes => QuizMode::SelectNotes(self.validation),
        }
    }

    pub fn settings(&self) -> QuizSettings {
        QuizSettings {
            pool_size: self.pool_size.max(1),
            mode: self.quiz_mode(),
            advance_delay: Duration::from_millis(self.advance_delay_ms),
            clear_delay: Duration::from_millis(self.clear_delay_ms),
            on_incorrect: self.on_incorrect,
        }
    }

    /// Write a mode back, keeping the validation for notes mode
    pub fn set_mode(&mut self, mode: QuizMode) {
        match mode {
            QuizMode::NameTheChord => self.mode = ModeName::Name,
            QuizMode::SelectNotes(validation) => {
                self.mode = ModeName::Notes;
                self.validation = validation;
            }
        }
    }
}

/// Initially checked roots and chord types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Root labels, e.g. "C" or "C#/Db"
    pub roots: Vec<String>,
    /// Chord type keys, e.g. "major", "minor7"
    pub types: Vec<String>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            roots: chordquiz_core::theory::ROOT_LABELS
                .iter()
                .map(|r| r.to_string())
                .collect(),
            types: vec!["major".to_string(), "minor".to_string()],
        }
    }
}

impl SelectionConfig {
    pub fn to_selection(&self) -> Result<ChordSelection, QuizError> {
        ChordSelection::from_labels(&self.roots, &self.types)
    }

    pub fn from_selection(selection: &ChordSelection) -> Self {
        Self {
            roots: selection.roots().iter().map(|r| r.to_string()).collect(),
            types: selection
                .chord_types()
                .iter()
                .map(|t| t.key.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Master volume, 0.0 - 1.0
    pub volume: f32,
    /// Play each question's chord when it comes up
    pub auto_play: bool,
    /// Open the output device at all
    pub enabled: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            volume: AudioSettings::DEFAULT_VOLUME,
            auto_play: true,
            enabled: true,
        }
    }
}

impl AudioConfig {
    /// Clamped settings
    pub fn settings(&self) -> AudioSettings {
        let mut settings = AudioSettings::new(AudioSettings::DEFAULT_VOLUME, self.auto_play);
        settings.set_volume(self.volume);
        settings
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiConfig {
    /// Debounce window for repeated note-ons of the same note
    pub debounce_ms: u64,
    /// Input port to connect to at startup (partial name match)
    pub port: Option<String>,
}

impl Default for MidiConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            port: None,
        }
    }
}

impl MidiConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Read and parse a config file, failing on any error
pub fn read_config(path: &Path) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: AppConfig = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}

/// Load the startup configuration.
///
/// A missing file gives the defaults; an unreadable or invalid one is
/// logged and also gives the defaults.
pub fn load_config(path: &Path) -> AppConfig {
    if !path.exists() {
        log::info!("Config file {} doesn't exist, using defaults", path.display());
        return AppConfig::default();
    }

    match read_config(path) {
        Ok(config) => {
            log::info!(
                "Loaded config from {}: pool size {}, mode {:?}",
                path.display(),
                config.quiz.pool_size,
                config.quiz.mode
            );
            config
        }
        Err(e) => {
            log::warn!("{:#}, using defaults", e);
            AppConfig::default()
        }
    }
}

/// Save configuration to a YAML file, creating parent directories
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
    }
    let yaml = serde_yaml::to_string(config).context("Failed to serialize config to YAML")?;
    std::fs::write(path, yaml)
        .with_context(|| format!("Failed to write config file {}", path.display()))?;
    log::info!("Saved config to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.quiz.pool_size, 20);
        assert_eq!(config.quiz.advance_delay_ms, 1000);
        assert_eq!(config.quiz.clear_delay_ms, 800);
        assert_eq!(config.midi.debounce_ms, 50);
        assert_eq!(config.audio.volume, 0.5);
        assert_eq!(config.selection.roots.len(), 12);
        assert_eq!(
            config.quiz.quiz_mode(),
            QuizMode::SelectNotes(Validation::Auto)
        );
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
quiz:
  mode: name
  on_incorrect: advance_now
selection:
  roots: ["C", "F#/Gb"]
audio:
  volume: 3.0
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.quiz.pool_size, 20);
        assert_eq!(config.quiz.quiz_mode(), QuizMode::NameTheChord);
        assert_eq!(config.quiz.settings().on_incorrect, IncorrectPolicy::AdvanceNow);
        assert_eq!(config.selection.types, vec!["major", "minor"]);
        assert_eq!(config.audio.settings().volume(), 1.0);
        assert!(config.midi.port.is_none());

        let selection = config.selection.to_selection().unwrap();
        assert_eq!(selection.count(), 4);
    }

    #[test]
    fn test_manual_validation_from_yaml() {
        let config: AppConfig =
            serde_yaml::from_str("quiz:\n  validation: manual\n  pool_size: 0\n").unwrap();
        let settings = config.quiz.settings();
        assert_eq!(settings.mode, QuizMode::SelectNotes(Validation::Manual));
        assert_eq!(settings.pool_size, 1);
    }

    #[test]
    fn test_unknown_selection_entry_is_reported() {
        let config = SelectionConfig {
            roots: vec!["C".to_string()],
            types: vec!["power".to_string()],
        };
        assert_eq!(
            config.to_selection(),
            Err(QuizError::UnknownChordType("power".to_string()))
        );
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("nope.yaml"));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_save_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("chordquiz.yaml");

        let mut config = AppConfig::default();
        config.quiz.set_mode(QuizMode::SelectNotes(Validation::Manual));
        config.midi.port = Some("Keystation".to_string());
        save_config(&config, &path).unwrap();

        assert_eq!(read_config(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "quiz: [not, a, map]").unwrap();

        assert!(read_config(&path).is_err());
        assert_eq!(load_config(&path), AppConfig::default());
    }
}

//! REPL (Read-Eval-Print Loop) for the chord quiz

use crate::audio::AudioPlayerHandle;
use crate::commands::quiz::{handle_deferred, handle_midi_note};
use crate::commands::{create_registry, dispatch, CommandContext, CommandRegistry, CommandResult};
use crate::config::{load_config, read_config};
use crate::midi::{MidiInputHandle, MidiStatus};
use crate::repl::timer::Timers;
use crate::repl::watcher::{ConfigEvent, ConfigWatcher};
use anyhow::{anyhow, Result};
use chordquiz_core::quiz::DeferredAction;
use chordquiz_core::Note;
use colored::*;
use crossbeam_channel::{unbounded, Receiver, Sender};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;

pub mod timer;
pub mod watcher;

/// Types of events the REPL loop handles
enum ReplEvent {
    Input(Result<String, ReadlineError>),
}

/// Interactive chord quiz
pub struct Repl {
    editor: Option<DefaultEditor>,
    registry: CommandRegistry,
    ctx: CommandContext,

    // Event channels
    tx_input: Sender<ReplEvent>,
    rx_input: Receiver<ReplEvent>,
    rx_notes: Receiver<Note>,
    rx_status: Receiver<MidiStatus>,
    rx_timers: Receiver<DeferredAction>,
    tx_watcher: Sender<ConfigEvent>,
    rx_watcher: Receiver<ConfigEvent>,

    // Config hot reload, created on the first `watch`
    watcher: Option<ConfigWatcher>,
}

impl Repl {
    /// Create a REPL using the config at `config_path` (defaults if missing).
    ///
    /// No device is opened here: audio opens on first playback and MIDI on
    /// `midi connect` or when the config names a port.
    pub fn new(config_path: PathBuf) -> Result<Self> {
        let editor =
            DefaultEditor::new().map_err(|e| anyhow!("Failed to create line editor: {}", e))?;
        let config = load_config(&config_path);

        let audio = if config.audio.enabled {
            AudioPlayerHandle::new(config.audio.settings())
        } else {
            log::info!("Audio disabled in config");
            AudioPlayerHandle::disabled(config.audio.settings())
        };

        let (tx_input, rx_input) = unbounded();
        let (tx_notes, rx_notes) = unbounded();
        let (tx_status, rx_status) = unbounded();
        let (tx_timers, rx_timers) = unbounded();
        let (tx_watcher, rx_watcher) = unbounded();

        let midi = MidiInputHandle::new(tx_notes, tx_status, config.midi.debounce());
        let ctx = CommandContext::new(config, config_path, audio, midi, Timers::new(tx_timers));

        Ok(Repl {
            editor: Some(editor),
            registry: create_registry(),
            ctx,
            tx_input,
            rx_input,
            rx_notes,
            rx_status,
            rx_timers,
            tx_watcher,
            rx_watcher,
            watcher: None,
        })
    }

    /// Print a command result. Returns true when the REPL should exit.
    fn handle_result(&mut self, result: CommandResult) -> bool {
        match result {
            CommandResult::Success | CommandResult::NotACommand => {}
            CommandResult::Message(msg) => {
                println!("{}", msg);
            }
            CommandResult::Exit => {
                println!("{} 🎵", "Goodbye!".bright_cyan());
                return true;
            }
            CommandResult::Error(e) => {
                println!("{} {}", "Error:".bright_red().bold(), e.red());
            }
            CommandResult::Watch(path) => self.watch(&path),
        }
        false
    }

    fn watch(&mut self, path: &str) {
        if self.watcher.is_none() {
            match ConfigWatcher::new(self.tx_watcher.clone()) {
                Ok(w) => self.watcher = Some(w),
                Err(e) => println!("{} Failed to create watcher: {}", "Error:".red(), e),
            }
        }

        if let Some(w) = &mut self.watcher {
            match w.watch_config(Path::new(path)) {
                Ok(false) => println!("Already watching {}", path.bright_green()),
                Ok(true) => println!(
                    "{} Watching {} for changes...",
                    "👀".bright_cyan(),
                    path.bright_green()
                ),
                Err(e) => println!("{} Failed to watch {}: {}", "Error:".red(), path, e),
            }
        }
    }

    fn handle_config_event(&mut self, event: ConfigEvent) {
        match event {
            ConfigEvent::Changed(path) => {
                println!("{} File changed: {}", "⚡".bright_yellow(), path.display());
                println!("{}", reload_config(&mut self.ctx, &path));
            }
            ConfigEvent::Error(e) => println!("{} Watch error: {}", "Error:".red(), e),
        }
    }

    fn print_midi_status(status: &MidiStatus) {
        if status.connected {
            println!("🎹 {}", status.message.bright_green());
        } else {
            println!("🎹 {}", status.message.yellow());
        }
    }

    /// Start the REPL loop
    pub fn run(&mut self) -> Result<()> {
        println!(
            "{} {}",
            "🎵".bright_yellow(),
            "Chord Quiz".bright_cyan().bold()
        );
        println!(
            "Type {} to begin, {} to try chords out, {} to choose which chords are asked.",
            "start".cyan(),
            "learn".cyan(),
            "select".cyan()
        );
        println!(
            "Type '{}' for more information, '{}' or {} to exit.\n",
            "help".bright_green(),
            "quit".bright_red(),
            "Ctrl+C".bright_red()
        );

        if let Some(port) = self.ctx.config.midi.port.clone() {
            if let Err(e) = self.ctx.midi.connect(&port) {
                println!("{} {:#}", "⚠ MIDI:".bright_yellow(), e);
            }
        }

        // Move editor to thread
        let mut editor = self
            .editor
            .take()
            .ok_or_else(|| anyhow!("REPL is already running"))?;
        let tx_input = self.tx_input.clone();

        thread::spawn(move || loop {
            let prompt = format!("{} ", "chordquiz>".bright_magenta().bold());
            let readline = editor.readline(&prompt);

            match readline {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if !line.is_empty() {
                        let _ = editor.add_history_entry(&line);
                    }
                    if tx_input.send(ReplEvent::Input(Ok(line))).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    let _ = tx_input.send(ReplEvent::Input(Err(err)));
                    break;
                }
            }
        });

        loop {
            crossbeam_channel::select! {
                recv(self.rx_input) -> msg => match msg {
                    Ok(ReplEvent::Input(Ok(line))) => {
                        if line.is_empty() {
                            continue;
                        }
                        let result = dispatch(&self.registry, &line, &mut self.ctx);
                        if self.handle_result(result) {
                            break;
                        }
                    }
                    Ok(ReplEvent::Input(Err(ReadlineError::Interrupted)))
                    | Ok(ReplEvent::Input(Err(ReadlineError::Eof))) => {
                        println!("{} 🎵", "Goodbye!".bright_cyan());
                        break;
                    }
                    Ok(ReplEvent::Input(Err(err))) => {
                        println!("{} {:?}", "Error:".bright_red().bold(), err);
                        break;
                    }
                    Err(_) => break, // Input thread gone
                },
                recv(self.rx_notes) -> msg => {
                    if let Ok(note) = msg {
                        let result = handle_midi_note(&mut self.ctx, note, Instant::now());
                        self.handle_result(result);
                    }
                },
                recv(self.rx_status) -> msg => {
                    if let Ok(status) = msg {
                        Self::print_midi_status(&status);
                    }
                },
                recv(self.rx_timers) -> msg => {
                    if let Ok(action) = msg {
                        if let Some(output) = handle_deferred(&mut self.ctx, &action, Instant::now()) {
                            println!("{}", output);
                        }
                    }
                },
                recv(self.rx_watcher) -> msg => {
                    if let Ok(event) = msg {
                        self.handle_config_event(event);
                    }
                },
            }
        }

        self.ctx.midi.disconnect();
        if let Err(e) = self.ctx.audio.stop() {
            log::warn!("{:#}", e);
        }
        Ok(())
    }
}

/// Re-read a config file and apply it. A broken file keeps the current
/// settings.
pub fn reload_config(ctx: &mut CommandContext, path: &Path) -> String {
    let result = read_config(path).and_then(|config| ctx.apply_config(config));
    match result {
        Ok(()) => format!("{} Reloaded config", "✓".bright_green()),
        Err(e) => format!("{} {:#}", "Error:".red(), e),
    }
}

/// Convenience function to start the REPL
pub fn start(config_path: PathBuf) -> Result<()> {
    let mut repl =
        Repl::new(config_path).map_err(|e| anyhow!("Failed to initialize REPL: {}", e))?;
    repl.run()
}

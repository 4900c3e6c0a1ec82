//! General REPL commands (help, quit, score, config, watch)

use crate::commands::{CommandContext, CommandResult, Confirmation};
use crate::config::save_config;
use colored::*;
use std::path::PathBuf;

/// Handle `help` command
pub fn cmd_help(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    print_help();
    CommandResult::Success
}

/// Handle `quit` or `exit` command
pub fn cmd_quit(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    CommandResult::Exit
}

/// Handle `watch [file]` command. Defaults to the config file.
pub fn cmd_watch(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Watch(ctx.config_path.display().to_string());
    }
    CommandResult::Watch(args.to_string())
}

/// Handle `score` command
pub fn cmd_score(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let score = &ctx.score;
    CommandResult::Message(format!(
        "📊 Score: {} / {} ({}%)   streak {}",
        score.correct,
        score.total,
        score.accuracy(),
        score.streak
    ))
}

/// Handle `score reset` command. Asks first.
pub fn cmd_score_reset(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    if ctx.score.total == 0 {
        return CommandResult::Message("Score is already empty".to_string());
    }
    ctx.pending = Some(Confirmation::ResetScore);
    CommandResult::Message(format!("Reset the score? {}", "[y/N]".bright_yellow()))
}

/// Answer a pending confirmation. Anything but yes declines.
pub fn confirm(confirmation: Confirmation, line: &str, ctx: &mut CommandContext) -> CommandResult {
    let yes = matches!(line.trim().to_lowercase().as_str(), "y" | "yes");
    match confirmation {
        Confirmation::ResetScore if yes => {
            ctx.score.reset();
            CommandResult::Message("📊 Score reset".bright_green().to_string())
        }
        Confirmation::ResetScore => CommandResult::Message("Score kept".to_string()),
    }
}

/// Handle `config` command - print the effective configuration
pub fn cmd_config(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    match serde_yaml::to_string(&ctx.effective_config()) {
        Ok(yaml) => CommandResult::Message(format!(
            "{} {}\n{}",
            "⚙ Config".bold(),
            ctx.config_path.display().to_string().dimmed(),
            yaml.trim_end()
        )),
        Err(e) => CommandResult::Error(format!("Failed to serialize config: {}", e)),
    }
}

/// Handle `config save [path]` command
pub fn cmd_config_save(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let path = if args.is_empty() {
        ctx.config_path.clone()
    } else {
        PathBuf::from(args)
    };
    let config = ctx.effective_config();
    match save_config(&config, &path) {
        Ok(()) => {
            ctx.config = config;
            CommandResult::Message(format!("💾 Saved config to {}", path.display()))
        }
        Err(e) => CommandResult::Error(format!("{:#}", e)),
    }
}

/// Print help information
fn print_help() {
    println!("{}", "🎵 Chord Quiz Help".bold());
    println!("{}", "==================".bold());
    println!();
    println!("{}", "Quiz:".green());
    println!("  {}                 - Start a quiz from the selected chords", "start".cyan());
    println!("  {} / {}        - Start over / abandon the quiz", "restart".cyan(), "stop".cyan());
    println!("  {}                  - Skip to the next question", "next".cyan());
    println!("  {}                - Play the current chord again", "replay".cyan());
    println!("  {}                - Progress, time and mode", "status".cyan());
    println!(
        "  {}   - Quiz type; manual waits for {}",
        "mode name|notes [auto|manual]".cyan(),
        "check".cyan()
    );
    println!();
    println!("{}", "Name the chord:".green());
    println!("  {}       - Answer, e.g. answer Am", "answer <name>".cyan());
    println!("  {}               - List the possible answers", "choices".cyan());
    println!("  Typing a chord name on its own also answers");
    println!();
    println!("{}", "Select the notes:".green());
    println!("  {}     - Toggle notes, e.g. key C E G", "key <notes...>".cyan());
    println!("  {} / {}         - Evaluate (manual) / empty the selection", "check".cyan(), "clear".cyan());
    println!("  Typing note names on their own, or playing them on a MIDI keyboard, also toggles");
    println!();
    println!("{}", "Chord selection:".green());
    println!(
        "  {} - Toggle roots",
        "select roots all|none|<root...>".cyan()
    );
    println!(
        "  {} - Toggle chord types",
        "select types all|none|<type...>".cyan()
    );
    println!("  {} / {}  - Everything / nothing", "select all".cyan(), "select none".cyan());
    println!("  {}             - Show the selection", "selection".cyan());
    println!();
    println!("{}", "Learn:".green());
    println!("  {}         - Chord types, or look up a chord", "learn [chord]".cyan());
    println!("  {}    - Show a chord, e.g. show F#/Gb minor7", "show <root> <type>".cyan());
    println!();
    println!("{}", "Audio and MIDI:".green());
    println!("  {}      - Master volume", "volume [0-100]".cyan());
    println!("  {}    - Play each question's chord", "autoplay [on|off]".cyan());
    println!("  {}          - List MIDI input ports", "midi devices".cyan());
    println!("  {}   - Connect a MIDI keyboard", "midi connect <port>".cyan());
    println!("  {} / {}", "midi disconnect".cyan(), "midi status".cyan());
    println!();
    println!("{}", "General:".green());
    println!("  {} / {}   - Running score / reset it", "score".cyan(), "score reset".cyan());
    println!("  {} / {} - Show / save the configuration", "config".cyan(), "config save [path]".cyan());
    println!("  {}        - Reload the config file when it changes", "watch [file]".cyan());
    println!("  {} / {}           - Leave", "quit".cyan(), "exit".cyan());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{context, message};
    use crate::config::{read_config, AppConfig};

    #[test]
    fn test_score_reset_needs_confirmation() {
        let (mut ctx, _timers) = context(AppConfig::default());
        assert_eq!(message(cmd_score_reset("", &mut ctx)), "Score is already empty");

        ctx.score.record(true);
        ctx.score.record(false);
        assert_eq!(
            message(cmd_score("", &mut ctx)),
            "📊 Score: 1 / 2 (50%)   streak 0"
        );

        cmd_score_reset("", &mut ctx);
        let pending = ctx.pending.take().unwrap();
        assert_eq!(message(confirm(pending, "n", &mut ctx)), "Score kept");
        assert_eq!(ctx.score.total, 2);

        cmd_score_reset("", &mut ctx);
        let pending = ctx.pending.take().unwrap();
        assert_eq!(message(confirm(pending, " Y ", &mut ctx)), "📊 Score reset");
        assert_eq!(ctx.score.total, 0);
    }

    #[test]
    fn test_watch_defaults_to_config_path() {
        let (mut ctx, _timers) = context(AppConfig::default());
        assert_eq!(
            cmd_watch("", &mut ctx),
            CommandResult::Watch("chordquiz.yaml".to_string())
        );
        assert_eq!(
            cmd_watch("other.yaml", &mut ctx),
            CommandResult::Watch("other.yaml".to_string())
        );
    }

    #[test]
    fn test_config_shows_live_state() {
        let (mut ctx, _timers) = context(AppConfig::default());
        ctx.selection.clear_roots();
        ctx.selection.set_root("D", true).unwrap();
        ctx.audio.settings_mut().set_volume(0.25);

        let out = message(cmd_config("", &mut ctx));
        assert!(out.contains("volume: 0.25"));
        assert!(out.contains("- D"));
    }

    #[test]
    fn test_config_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.yaml");
        let (mut ctx, _timers) = context(AppConfig::default());
        ctx.selection.toggle_type("sus4").unwrap();

        let out = message(cmd_config_save(path.to_str().unwrap(), &mut ctx));
        assert!(out.starts_with("💾 Saved config to"));

        let saved = read_config(&path).unwrap();
        assert_eq!(saved.selection.types, vec!["major", "minor", "sus4"]);
        assert_eq!(saved, ctx.config);
    }
}

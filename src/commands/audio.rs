//! Audio commands (volume, autoplay)

use crate::commands::{CommandContext, CommandResult};
use colored::*;

/// Handle `volume [0-100]` command
pub fn cmd_volume(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Message(format!(
            "🔊 Volume: {:.0}%",
            ctx.audio.settings().volume() * 100.0
        ));
    }

    match args.trim_end_matches('%').parse::<f32>() {
        Ok(vol) if (0.0..=100.0).contains(&vol) => {
            ctx.audio.settings_mut().set_volume(vol / 100.0);
            ctx.config.audio.volume = ctx.audio.settings().volume();
            CommandResult::Message(
                format!("🔊 Volume set to {:.0}%", vol)
                    .bright_green()
                    .to_string(),
            )
        }
        _ => CommandResult::Error("Invalid volume value. Use a number between 0-100".to_string()),
    }
}

/// Handle `autoplay [on|off]` command
pub fn cmd_autoplay(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let enabled = match args {
        "" => {
            let state = if ctx.audio.settings().auto_play { "on" } else { "off" };
            return CommandResult::Message(format!("Autoplay is {}", state));
        }
        "on" | "true" | "yes" => true,
        "off" | "false" | "no" => false,
        _ => return CommandResult::Error("Usage: autoplay [on|off]".to_string()),
    };

    ctx.audio.settings_mut().auto_play = enabled;
    ctx.config.audio.auto_play = enabled;
    let msg = if enabled {
        "▶ Autoplay on: each question's chord plays when it comes up"
    } else {
        "⏸ Autoplay off: use `replay` to hear the chord"
    };
    CommandResult::Message(msg.to_string())
}

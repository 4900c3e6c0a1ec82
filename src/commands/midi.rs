//! MIDI input commands

use crate::commands::{CommandContext, CommandResult};
use crate::midi::MidiInputHandle;
use colored::*;

/// Handle `midi devices` command - list available MIDI input ports
pub fn cmd_midi_devices(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    match MidiInputHandle::list_ports() {
        Ok(ports) => {
            if ports.is_empty() {
                CommandResult::Message(
                    "No MIDI input ports found. Make sure a MIDI keyboard is connected."
                        .yellow()
                        .to_string(),
                )
            } else {
                let mut output = format!("{}\n", "🎹 Available MIDI Input Ports:".bold());
                for (i, port) in ports.iter().enumerate() {
                    output.push_str(&format!("  {}. {}\n", i + 1, port.cyan()));
                }
                output.push_str(&format!(
                    "\n{} {}",
                    "Use".dimmed(),
                    "midi connect <port name>".green()
                ));
                CommandResult::Message(output)
            }
        }
        Err(e) => CommandResult::Error(format!("Failed to list MIDI ports: {}", e)),
    }
}

/// Handle `midi connect <port>` command
pub fn cmd_midi_connect(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error(
            "Usage: midi connect <port name>\nUse 'midi devices' to see available ports"
                .to_string(),
        );
    }

    match ctx.midi.connect(args) {
        // The status event reports the connection
        Ok(name) => {
            ctx.config.midi.port = Some(name);
            CommandResult::Success
        }
        Err(e) => CommandResult::Error(format!("{:#}", e)),
    }
}

/// Handle `midi disconnect` command
pub fn cmd_midi_disconnect(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    if ctx.midi.disconnect() {
        CommandResult::Success
    } else {
        CommandResult::Message("No MIDI input connected".to_string())
    }
}

/// Handle `midi status` command
pub fn cmd_midi_status(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let mut output = format!("{}\n", "🎹 MIDI Status:".bold());
    match ctx.midi.connected_port() {
        Some(name) => {
            output.push_str(&format!("  Status: {}\n", "Connected".green().bold()));
            output.push_str(&format!("  Port: {}\n", name.cyan()));
        }
        None => output.push_str(&format!("  Status: {}\n", "Not connected".yellow())),
    }
    output.push_str(&format!(
        "  Debounce: {} ms",
        ctx.midi.debounce().as_millis()
    ));
    CommandResult::Message(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{context, message};
    use crate::config::AppConfig;

    #[test]
    fn test_midi_status_disconnected() {
        let (mut ctx, _timers) = context(AppConfig::default());
        let out = message(cmd_midi_status("", &mut ctx));
        assert!(out.contains("Not connected"));
        assert!(out.contains("Debounce: 50 ms"));
    }

    #[test]
    fn test_midi_disconnect_without_connection() {
        let (mut ctx, _timers) = context(AppConfig::default());
        assert_eq!(
            message(cmd_midi_disconnect("", &mut ctx)),
            "No MIDI input connected"
        );
        assert!(matches!(cmd_midi_connect("", &mut ctx), CommandResult::Error(_)));
    }
}

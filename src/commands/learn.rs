//! Learning commands: look up a chord, see it on the keyboard and hear it

use crate::commands::{CommandContext, CommandResult};
use chordquiz_core::theory::{ChordType, CHORD_TYPES};
use chordquiz_core::{Chord, QuizError, RenderOptions};
use colored::*;

fn present(ctx: &mut CommandContext, chord: &Chord) -> CommandResult {
    let mut out = format!(
        "{}\n{}",
        chord,
        ctx.keyboard.render(chord.notes(), &RenderOptions::default())
    );
    if let Some(warning) = ctx.play_chord(chord.notes()) {
        out.push('\n');
        out.push_str(&warning);
    }
    CommandResult::Message(out)
}

/// Handle `learn [chord]` command
pub fn cmd_learn(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        let mut lines = vec![format!(
            "{} (e.g. {}, {}, {})",
            "Chord types:".bold(),
            "learn C".cyan(),
            "learn F#m7".cyan(),
            "show Bb dim".cyan()
        )];
        for chord_type in CHORD_TYPES.iter() {
            let example = format!("C{}", chord_type.suffix);
            lines.push(format!(
                "  {:<8} {:<14} {:<6} {:?}",
                chord_type.key, chord_type.display_name, example, chord_type.intervals
            ));
        }
        return CommandResult::Message(lines.join("\n"));
    }

    match Chord::from_name(args) {
        Some(chord) => present(ctx, &chord),
        None => CommandResult::Error(format!(
            "Unknown chord: {} (try a name like C, Am, G7, Bbmaj7)",
            args
        )),
    }
}

/// Handle `show <root> <type>` command
pub fn cmd_show(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let mut words = args.split_whitespace();
    let (Some(root), Some(chord_type), None) = (words.next(), words.next(), words.next()) else {
        return CommandResult::Error("Usage: show <root> <type>, e.g. show C#/Db minor7".to_string());
    };

    if ChordType::lookup(chord_type).is_none() {
        return CommandResult::Error(QuizError::UnknownChordType(chord_type.to_string()).to_string());
    }
    match Chord::build(root, chord_type) {
        Some(chord) => present(ctx, &chord),
        None => CommandResult::Error(QuizError::UnknownRoot(root.to_string()).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{context, message};
    use crate::config::AppConfig;

    #[test]
    fn test_learn_lists_types() {
        let (mut ctx, _timers) = context(AppConfig::default());
        let out = message(cmd_learn("", &mut ctx));
        assert!(out.contains("minor7"));
        assert!(out.contains("Cmaj7"));
        assert!(out.contains("[0, 4, 8]"));
    }

    #[test]
    fn test_learn_chord() {
        let (mut ctx, _timers) = context(AppConfig::default());
        let out = message(cmd_learn("Dm7", &mut ctx));
        assert!(out.starts_with("Dm7: [D, F, A, C]"));
        assert!(matches!(cmd_learn("Dpower", &mut ctx), CommandResult::Error(_)));
        // "CM" is major notation, so it must not resolve to minor
        assert!(matches!(cmd_learn("CM", &mut ctx), CommandResult::Error(_)));
        assert!(message(cmd_learn("CMAJ7", &mut ctx)).starts_with("Cmaj7: [C, E, G, B]"));
    }

    #[test]
    fn test_show() {
        let (mut ctx, _timers) = context(AppConfig::default());
        let out = message(cmd_show("G#/Ab major", &mut ctx));
        assert!(out.starts_with("G#: [G#, C, D#]"));

        assert_eq!(
            cmd_show("H major", &mut ctx),
            CommandResult::Error("unknown note or root: H".to_string())
        );
        assert_eq!(
            cmd_show("C ninth", &mut ctx),
            CommandResult::Error("unknown chord type: ninth".to_string())
        );
        assert!(matches!(cmd_show("C", &mut ctx), CommandResult::Error(_)));
    }
}

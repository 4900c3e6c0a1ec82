//! Chord selection commands (select roots/types/all/none, selection)

use crate::commands::{CommandContext, CommandResult};
use chordquiz_core::theory::{CHORD_TYPES, ROOT_LABELS};
use chordquiz_core::{ChordSelection, QuizError};
use colored::*;

/// Roots and chord types as a checklist
pub fn describe_selection(selection: &ChordSelection) -> String {
    let checked_roots = selection.roots();
    let roots: Vec<String> = ROOT_LABELS
        .iter()
        .map(|label| {
            if checked_roots.contains(label) {
                format!("[x] {}", label).bright_green().to_string()
            } else {
                format!("[ ] {}", label).dimmed().to_string()
            }
        })
        .collect();

    let checked_types: Vec<&str> = selection.chord_types().iter().map(|t| t.key).collect();
    let types: Vec<String> = CHORD_TYPES
        .iter()
        .map(|t| {
            let entry = format!("{} ({})", t.key, t.display_name);
            if checked_types.contains(&t.key) {
                format!("[x] {}", entry).bright_green().to_string()
            } else {
                format!("[ ] {}", entry).dimmed().to_string()
            }
        })
        .collect();

    format!(
        "{}\n  {}\n{}\n  {}\n{} chords selected",
        "Roots:".bold(),
        roots.join("  "),
        "Chord types:".bold(),
        types.join("\n  "),
        selection.count()
    )
}

/// Apply `all`, `none` or a list of entries to toggle
fn update<F>(
    ctx: &mut CommandContext,
    args: &str,
    usage: &str,
    all: fn(&mut ChordSelection),
    none: fn(&mut ChordSelection),
    toggle: F,
) -> CommandResult
where
    F: Fn(&mut ChordSelection, &str) -> Result<bool, QuizError>,
{
    match args {
        "" => return CommandResult::Error(usage.to_string()),
        "all" => all(&mut ctx.selection),
        "none" => none(&mut ctx.selection),
        _ => {
            // Validate everything first so a typo changes nothing
            let mut updated = ctx.selection.clone();
            for entry in args.split(|c: char| c.is_whitespace() || c == ',') {
                if entry.is_empty() {
                    continue;
                }
                if let Err(e) = toggle(&mut updated, entry) {
                    return CommandResult::Error(e.to_string());
                }
            }
            ctx.selection = updated;
        }
    }
    CommandResult::Message(describe_selection(&ctx.selection))
}

/// Handle `select roots all|none|<root...>` command
pub fn cmd_select_roots(args: &str, ctx: &mut CommandContext) -> CommandResult {
    update(
        ctx,
        args,
        "Usage: select roots all | none | <root> [root...]",
        ChordSelection::select_all_roots,
        ChordSelection::clear_roots,
        ChordSelection::toggle_root,
    )
}

/// Handle `select types all|none|<type...>` command
pub fn cmd_select_types(args: &str, ctx: &mut CommandContext) -> CommandResult {
    update(
        ctx,
        args,
        "Usage: select types all | none | <type> [type...]",
        ChordSelection::select_all_types,
        ChordSelection::clear_types,
        ChordSelection::toggle_type,
    )
}

/// Handle `select all` command
pub fn cmd_select_all(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    ctx.selection = ChordSelection::all();
    CommandResult::Message(describe_selection(&ctx.selection))
}

/// Handle `select none` command
pub fn cmd_select_none(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    ctx.selection = ChordSelection::new();
    CommandResult::Message(describe_selection(&ctx.selection))
}

/// Handle `selection` command
pub fn cmd_selection(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    CommandResult::Message(describe_selection(&ctx.selection))
}

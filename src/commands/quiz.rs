//! Quiz commands and the presentation of questions, verdicts and results

use crate::commands::{CommandContext, CommandResult};
use chordquiz_core::quiz::{
    format_elapsed, Advance, DeferredAction, DeferredKind, DeferredOutcome, FollowUp, QuizSummary,
    Validation, Verdict,
};
use chordquiz_core::{ActiveClass, Note, QuizError, QuizMode, RenderOptions};
use colored::*;
use std::time::Instant;

/// Human readable mode name
pub fn mode_label(mode: QuizMode) -> &'static str {
    match mode {
        QuizMode::NameTheChord => "name the chord",
        QuizMode::SelectNotes(Validation::Auto) => "select the notes (auto check)",
        QuizMode::SelectNotes(Validation::Manual) => "select the notes (manual check)",
    }
}

fn is_notes_mode(ctx: &CommandContext) -> bool {
    matches!(ctx.quiz.mode(), QuizMode::SelectNotes(_))
}

/// `Question n / total` and the running time
pub fn progress_line(ctx: &CommandContext, now: Instant) -> Option<String> {
    let question = ctx.quiz.current_question()?;
    Some(format!(
        "{} {} / {}   ⏱ {}   ✓ {}",
        "Question".bold(),
        question.number,
        question.total,
        format_elapsed(ctx.quiz.elapsed_secs(now)),
        ctx.quiz.correct_count()
    ))
}

/// Progress, prompt and keyboard for the current question
pub fn render_question(ctx: &CommandContext, now: Instant) -> String {
    let Some(question) = ctx.quiz.current_question() else {
        return "No quiz is running".to_string();
    };
    let mut out = progress_line(ctx, now).unwrap_or_default();
    out.push('\n');

    match ctx.quiz.mode() {
        QuizMode::NameTheChord => {
            out.push_str(&format!(
                "{}\n{}\n",
                "Which chord is this?".bright_cyan(),
                ctx.keyboard
                    .render(question.chord.notes(), &RenderOptions::default())
            ));
            out.push_str(&format!(
                "Type the chord name ({} lists the options, {} plays it again)",
                "choices".cyan(),
                "replay".cyan()
            ));
        }
        QuizMode::SelectNotes(validation) => {
            let selection = ctx.quiz.selection();
            out.push_str(&format!(
                "Select the notes of {}\n{}\n",
                question.chord.name().bold().bright_cyan(),
                ctx.keyboard.render(
                    &selection,
                    &RenderOptions::interactive(ActiveClass::Selected)
                )
            ));
            let hint = match validation {
                Validation::Auto => "Type note names or play them on your MIDI keyboard",
                Validation::Manual => "Type note names or play them, then `check`",
            };
            out.push_str(hint);
        }
    }
    out
}

/// Show a new question, playing its chord in the name quiz when
/// autoplay is on
fn present_question(ctx: &mut CommandContext, now: Instant) -> String {
    let mut out = String::new();
    if ctx.quiz.mode() == QuizMode::NameTheChord && ctx.audio.settings().auto_play {
        if let Some(notes) = ctx.quiz.current_question().map(|q| q.chord.notes().to_vec()) {
            if let Some(warning) = ctx.play_chord(&notes) {
                out.push_str(&warning);
                out.push('\n');
            }
        }
    }
    out.push_str(&render_question(ctx, now));
    out
}

pub fn finish_report(summary: &QuizSummary) -> String {
    format!(
        "{}\n  Correct:  {} / {}\n  Accuracy: {}%\n  Time:     {}\nType {} to play again",
        "🏁 Quiz complete!".bright_green().bold(),
        summary.correct,
        summary.total,
        summary.accuracy,
        format_elapsed(summary.elapsed_secs),
        "start".cyan()
    )
}

fn render_advance(ctx: &mut CommandContext, advance: Advance, now: Instant) -> String {
    match advance {
        Advance::Question(_) => present_question(ctx, now),
        Advance::Finished(summary) => finish_report(&summary),
    }
}

fn advance(ctx: &mut CommandContext, now: Instant) -> CommandResult {
    match ctx.quiz.advance(now) {
        Some(advance) => CommandResult::Message(render_advance(ctx, advance, now)),
        None => CommandResult::Error(QuizError::NotRunning.to_string()),
    }
}

/// Count the verdict, describe it and carry out its follow-up
fn report_verdict(ctx: &mut CommandContext, verdict: Verdict, now: Instant) -> String {
    ctx.score.record(verdict.is_correct);
    let chord = &verdict.chord;
    let answer = format!("[{}: {}]", chord.name(), chord.note_list());

    let mut out = if verdict.is_correct {
        format!("{} {}", "🎉 Correct!".bright_green().bold(), answer)
    } else {
        format!(
            "{} The answer is {}",
            "❌ Incorrect.".bright_red().bold(),
            answer
        )
    };

    if is_notes_mode(ctx) {
        let (notes, class) = if verdict.is_correct {
            (chord.notes().to_vec(), ActiveClass::Correct)
        } else {
            (ctx.quiz.selection(), ActiveClass::Incorrect)
        };
        out.push('\n');
        out.push_str(&ctx.keyboard.render(&notes, &RenderOptions::interactive(class)));
    }

    if verdict.is_correct && ctx.quiz.mode() == QuizMode::NameTheChord {
        if let Some(warning) = ctx.play_chord(chord.notes()) {
            out.push('\n');
            out.push_str(&warning);
        }
    }

    match verdict.follow_up {
        FollowUp::AwaitNext => {
            out.push_str(&format!("\nType {} to continue", "next".cyan()));
        }
        FollowUp::AdvanceNow => {
            if let Some(advance) = ctx.quiz.advance(now) {
                out.push('\n');
                out.push_str(&render_advance(ctx, advance, now));
            }
        }
        FollowUp::Schedule(action) => {
            if action.kind == DeferredKind::ClearSelection {
                out.push_str(&format!("\n{}", "Try again...".bright_yellow()));
            }
            ctx.timers.schedule(action);
        }
    }
    out
}

/// Run a timer that fired. Stale actions print nothing.
pub fn handle_deferred(
    ctx: &mut CommandContext,
    action: &DeferredAction,
    now: Instant,
) -> Option<String> {
    match ctx.quiz.apply_deferred(action, now) {
        DeferredOutcome::Advanced(advance) => Some(render_advance(ctx, advance, now)),
        DeferredOutcome::Cleared => Some(render_question(ctx, now)),
        DeferredOutcome::Stale => None,
    }
}

/// Toggle notes one by one. Stops at the first toggle that was evaluated.
pub fn toggle_notes(ctx: &mut CommandContext, notes: &[Note], now: Instant) -> CommandResult {
    if !is_notes_mode(ctx) {
        return CommandResult::Error(
            "Notes are only selected in the notes quiz (try `mode notes`)".to_string(),
        );
    }
    if !ctx.quiz.is_running() {
        return CommandResult::Error(format!("{} (type `start`)", QuizError::NotRunning));
    }

    let mut warnings = Vec::new();
    for &note in notes {
        let Some(toggle) = ctx.quiz.toggle_note(note) else {
            return CommandResult::Error("This question is answered, type `next`".to_string());
        };
        warnings.extend(ctx.play_note(note));
        if let Some(verdict) = toggle.verdict {
            warnings.push(report_verdict(ctx, verdict, now));
            return CommandResult::Message(warnings.join("\n"));
        }
    }

    let selection = ctx.quiz.selection();
    let names: Vec<&str> = selection.iter().map(|n| n.name()).collect();
    warnings.push(format!(
        "Selected: {}\n{}",
        if names.is_empty() { "-".to_string() } else { names.join(", ") },
        ctx.keyboard
            .render(&selection, &RenderOptions::interactive(ActiveClass::Selected))
    ));
    CommandResult::Message(warnings.join("\n"))
}

/// A note from the MIDI keyboard: toggled in the notes quiz, otherwise
/// just played
pub fn handle_midi_note(ctx: &mut CommandContext, note: Note, now: Instant) -> CommandResult {
    if is_notes_mode(ctx) && ctx.quiz.is_running() {
        return toggle_notes(ctx, &[note], now);
    }
    match ctx.play_note(note) {
        Some(warning) => CommandResult::Message(warning),
        None => CommandResult::Message(format!("🎹 {}", note)),
    }
}

/// Resolve typed key labels through the keyboard
fn parse_keys(ctx: &CommandContext, args: &str) -> Result<Vec<Note>, String> {
    let options = RenderOptions::interactive(ActiveClass::Selected);
    args.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            ctx.keyboard
                .activate(token, &options)
                .ok_or_else(|| format!("Unknown note: {}", token))
        })
        .collect()
}

/// Input that matched no command
pub fn handle_bare_input(line: &str, ctx: &mut CommandContext) -> CommandResult {
    let now = Instant::now();
    if ctx.quiz.is_running() {
        match ctx.quiz.mode() {
            QuizMode::NameTheChord => return answer(ctx, line, now),
            QuizMode::SelectNotes(_) => {
                if let Ok(notes) = parse_keys(ctx, line) {
                    return toggle_notes(ctx, &notes, now);
                }
            }
        }
    }
    CommandResult::Error(format!(
        "Unknown command: {}. Type {} for a list of commands",
        line,
        "help".bright_green()
    ))
}

fn start_quiz(ctx: &mut CommandContext, restart: bool) -> CommandResult {
    let now = Instant::now();
    let universe = match ctx.selection.chords() {
        Ok(universe) => universe,
        Err(e) => return CommandResult::Error(e.to_string()),
    };
    let started = if restart {
        ctx.quiz.restart(&universe, &mut ctx.rng, now)
    } else {
        ctx.quiz.start(&universe, &mut ctx.rng, now)
    };
    if let Err(e) = started {
        return CommandResult::Error(e.to_string());
    }

    let header = format!(
        "🎵 {} {} questions, {}, from {} chords",
        "Quiz started:".bright_green().bold(),
        ctx.quiz.settings().pool_size.max(1),
        mode_label(ctx.quiz.mode()),
        universe.len()
    );
    CommandResult::Message(format!("{}\n{}", header, present_question(ctx, now)))
}

/// Handle `start` command
pub fn cmd_start(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    start_quiz(ctx, false)
}

/// Handle `restart` command
pub fn cmd_restart(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    start_quiz(ctx, true)
}

/// Handle `stop` command
pub fn cmd_stop(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    if ctx.quiz.is_idle() {
        return CommandResult::Message("No quiz is running".to_string());
    }
    ctx.quiz.reset();
    if let Err(e) = ctx.audio.stop() {
        log::warn!("{:#}", e);
    }
    CommandResult::Message("⏹  Quiz stopped".to_string())
}

/// Handle `next` command
pub fn cmd_next(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    advance(ctx, Instant::now())
}

/// Handle `replay` command
pub fn cmd_replay(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let Some(notes) = ctx.quiz.current_question().map(|q| q.chord.notes().to_vec()) else {
        return CommandResult::Error(QuizError::NotRunning.to_string());
    };
    match ctx.play_chord(&notes) {
        Some(warning) => CommandResult::Message(warning),
        None => CommandResult::Success,
    }
}

/// Handle `status` command
pub fn cmd_status(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let now = Instant::now();
    let mut lines = vec![format!("Mode: {}", mode_label(ctx.quiz.mode()))];
    if let Some(progress) = progress_line(ctx, now) {
        lines.push(progress);
        let state = if ctx.quiz.is_answered() {
            "answered"
        } else {
            "waiting for an answer"
        };
        lines.push(format!("Current question: {}", state));
    } else if let Some(summary) = ctx.quiz.summary() {
        lines.push(finish_report(&summary));
    } else {
        lines.push("No quiz is running".to_string());
    }
    lines.push(format!(
        "Selection: {} chords, {} questions per quiz",
        ctx.selection.count(),
        ctx.quiz.settings().pool_size
    ));
    CommandResult::Message(lines.join("\n"))
}

/// Handle `choices` command
pub fn cmd_choices(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    if !ctx.quiz.is_running() {
        return CommandResult::Error(QuizError::NotRunning.to_string());
    }
    let choices: Vec<String> = ctx
        .quiz
        .choices()
        .iter()
        .map(|c| c.cyan().to_string())
        .collect();
    CommandResult::Message(format!("Choices: {}", choices.join("  ")))
}

fn answer(ctx: &mut CommandContext, name: &str, now: Instant) -> CommandResult {
    if !ctx.quiz.is_running() {
        return CommandResult::Error(QuizError::NotRunning.to_string());
    }
    match ctx.quiz.submit_answer(name) {
        Some(verdict) => CommandResult::Message(report_verdict(ctx, verdict, now)),
        None => CommandResult::Error("This question is answered, type `next`".to_string()),
    }
}

/// Handle `answer <name>` command
pub fn cmd_answer(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: answer <chord name>".to_string());
    }
    if ctx.quiz.mode() != QuizMode::NameTheChord {
        return CommandResult::Error(
            "`answer` is for the name quiz; select notes with `key`".to_string(),
        );
    }
    answer(ctx, args, Instant::now())
}

/// Handle `key <notes...>` command
pub fn cmd_key(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: key <note> [note...]".to_string());
    }
    match parse_keys(ctx, args) {
        Ok(notes) => toggle_notes(ctx, &notes, Instant::now()),
        Err(e) => CommandResult::Error(e),
    }
}

/// Handle `check` command
pub fn cmd_check(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    if !is_notes_mode(ctx) {
        return CommandResult::Error("`check` is for the notes quiz".to_string());
    }
    match ctx.quiz.check_answer() {
        Ok(verdict) => CommandResult::Message(report_verdict(ctx, verdict, Instant::now())),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `clear` command
pub fn cmd_clear(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    match ctx.quiz.clear_selection() {
        Ok(()) => CommandResult::Message(render_question(ctx, Instant::now())),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `mode [name|notes [auto|manual]]` command
pub fn cmd_mode(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let mut words = args.split_whitespace();
    let mode = match (words.next(), words.next()) {
        (None, _) => {
            return CommandResult::Message(format!(
                "Mode: {}",
                mode_label(ctx.quiz.mode())
            ))
        }
        (Some("name"), None) => QuizMode::NameTheChord,
        (Some("notes"), None) | (Some("notes"), Some("auto")) => {
            QuizMode::SelectNotes(Validation::Auto)
        }
        (Some("notes"), Some("manual")) => QuizMode::SelectNotes(Validation::Manual),
        _ => return CommandResult::Error("Usage: mode name | mode notes [auto|manual]".to_string()),
    };

    ctx.quiz.set_mode(mode);
    ctx.config.quiz.set_mode(mode);
    let mut msg = format!("Mode set to: {}", mode_label(mode).bright_green());
    if ctx.quiz.is_running() {
        msg.push_str(&format!("\n{}", render_question(ctx, Instant::now())));
    }
    CommandResult::Message(msg)
}

use super::deferred::{DeferredAction, DeferredKind, DeferredOutcome, FollowUp, QuestionTag};
use super::score::accuracy;
use crate::error::QuizError;
use crate::theory::chord::{split_chord_name, suffix_matches};
use crate::theory::{notes_equal, Chord, Note};
use rand::Rng;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

/// How answers to the notes quiz are validated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Validation {
    /// Evaluate as soon as as many notes are selected as the chord has
    #[default]
    Auto,
    /// Evaluate only on an explicit check
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizMode {
    /// Hear/see a chord, pick its name
    NameTheChord,
    /// See a chord name, select its notes
    SelectNotes(Validation),
}

impl Default for QuizMode {
    fn default() -> Self {
        QuizMode::SelectNotes(Validation::Auto)
    }
}

/// What happens after a wrong name in name-the-chord mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum IncorrectPolicy {
    /// Show the right answer and wait for `next`
    #[default]
    AwaitNext,
    /// Move on immediately
    AdvanceNow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizSettings {
    pub pool_size: usize,
    pub mode: QuizMode,
    /// Delay before moving on after a correct answer
    pub advance_delay: Duration,
    /// Delay before a wrong auto-validated selection is cleared
    pub clear_delay: Duration,
    pub on_incorrect: IncorrectPolicy,
}

impl QuizSettings {
    pub const DEFAULT_POOL_SIZE: usize = 20;
    pub const DEFAULT_ADVANCE_DELAY: Duration = Duration::from_millis(1000);
    pub const DEFAULT_CLEAR_DELAY: Duration = Duration::from_millis(800);
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            pool_size: Self::DEFAULT_POOL_SIZE,
            mode: QuizMode::default(),
            advance_delay: Self::DEFAULT_ADVANCE_DELAY,
            clear_delay: Self::DEFAULT_CLEAR_DELAY,
            on_incorrect: IncorrectPolicy::default(),
        }
    }
}

/// The question currently on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question<'a> {
    pub tag: QuestionTag,
    /// 1-based
    pub number: usize,
    pub total: usize,
    pub chord: &'a Chord,
}

/// An evaluated answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub is_correct: bool,
    /// The chord that was asked
    pub chord: Chord,
    pub follow_up: FollowUp,
}

/// Result of toggling one note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggle {
    /// Whether the note is selected after the toggle
    pub selected: bool,
    /// The whole selection, normalized and in pitch order
    pub selection: Vec<Note>,
    /// Set when the toggle completed an auto-validated attempt
    pub verdict: Option<Verdict>,
}

/// Where an advance landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Question(QuestionTag),
    Finished(QuizSummary),
}

/// Final report of a finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuizSummary {
    pub correct: u32,
    pub total: u32,
    /// Rounded percentage
    pub accuracy: u32,
    pub elapsed_secs: u64,
}

#[derive(Debug, Clone)]
struct Session {
    id: u64,
    pool: Vec<Chord>,
    index: usize,
    correct: u32,
    started: Instant,
    selection: BTreeSet<Note>,
    answered: bool,
    attempt: u32,
}

impl Session {
    fn tag(&self) -> QuestionTag {
        QuestionTag {
            session: self.id,
            index: self.index,
            attempt: self.attempt,
        }
    }

    fn chord(&self) -> &Chord {
        &self.pool[self.index]
    }

    fn selection(&self) -> Vec<Note> {
        self.selection.iter().copied().collect()
    }

    fn elapsed_secs(&self, now: Instant) -> u64 {
        now.saturating_duration_since(self.started).as_secs()
    }
}

#[derive(Debug, Clone)]
enum QuizState {
    Idle,
    Running(Session),
    Finished(QuizSummary),
}

/// Chord quiz state machine: `Idle -> Running -> Finished -> Idle`.
///
/// Every operation runs to completion and returns; time and randomness are
/// passed in. Delayed transitions come back to the caller as
/// [`FollowUp::Schedule`] and are applied with [`Quiz::apply_deferred`].
#[derive(Debug, Clone)]
pub struct Quiz {
    settings: QuizSettings,
    state: QuizState,
    sessions_started: u64,
}

impl Quiz {
    pub fn new(settings: QuizSettings) -> Self {
        Self {
            settings,
            state: QuizState::Idle,
            sessions_started: 0,
        }
    }

    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    /// Replace the settings. A running session picks up the new mode and
    /// delays from its next evaluation on; the pool size applies to the
    /// next start.
    pub fn set_settings(&mut self, settings: QuizSettings) {
        self.settings = settings;
    }

    pub fn mode(&self) -> QuizMode {
        self.settings.mode
    }

    pub fn set_mode(&mut self, mode: QuizMode) {
        self.settings.mode = mode;
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, QuizState::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, QuizState::Running(_))
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, QuizState::Finished(_))
    }

    /// Sample a new pool from `universe` and go to the first question.
    ///
    /// Chords are drawn independently and uniformly, with replacement, so a
    /// chord may repeat. An empty universe leaves the quiz untouched.
    pub fn start<R: Rng>(
        &mut self,
        universe: &[Chord],
        rng: &mut R,
        now: Instant,
    ) -> Result<QuestionTag, QuizError> {
        if universe.is_empty() {
            return Err(QuizError::EmptySelection);
        }

        let pool_size = self.settings.pool_size.max(1);
        let pool: Vec<Chord> = (0..pool_size)
            .map(|_| universe[rng.gen_range(0..universe.len())].clone())
            .collect();

        self.sessions_started += 1;
        let session = Session {
            id: self.sessions_started,
            pool,
            index: 0,
            correct: 0,
            started: now,
            selection: BTreeSet::new(),
            answered: false,
            attempt: 0,
        };
        let tag = session.tag();
        log::info!(
            "Quiz session {} started: {} questions from {} chords",
            session.id,
            pool_size,
            universe.len()
        );
        self.state = QuizState::Running(session);
        Ok(tag)
    }

    /// Back to idle, dropping any session or summary
    pub fn reset(&mut self) {
        self.state = QuizState::Idle;
    }

    pub fn restart<R: Rng>(
        &mut self,
        universe: &[Chord],
        rng: &mut R,
        now: Instant,
    ) -> Result<QuestionTag, QuizError> {
        if universe.is_empty() {
            return Err(QuizError::EmptySelection);
        }
        self.reset();
        self.start(universe, rng, now)
    }

    fn session(&self) -> Option<&Session> {
        match &self.state {
            QuizState::Running(session) => Some(session),
            _ => None,
        }
    }

    fn session_mut(&mut self) -> Option<&mut Session> {
        match &mut self.state {
            QuizState::Running(session) => Some(session),
            _ => None,
        }
    }

    pub fn current_question(&self) -> Option<Question<'_>> {
        let session = self.session()?;
        Some(Question {
            tag: session.tag(),
            number: session.index + 1,
            total: session.pool.len(),
            chord: session.chord(),
        })
    }

    pub fn current_tag(&self) -> Option<QuestionTag> {
        self.session().map(Session::tag)
    }

    /// Whether the current question has been evaluated
    pub fn is_answered(&self) -> bool {
        self.session().is_some_and(|s| s.answered)
    }

    /// Correct answers so far in the running session
    pub fn correct_count(&self) -> u32 {
        match &self.state {
            QuizState::Running(session) => session.correct,
            QuizState::Finished(summary) => summary.correct,
            QuizState::Idle => 0,
        }
    }

    /// Notes currently selected for the question
    pub fn selection(&self) -> Vec<Note> {
        self.session().map(Session::selection).unwrap_or_default()
    }

    /// Candidate names for name-the-chord: each distinct chord name in the
    /// pool, in order of first appearance
    pub fn choices(&self) -> Vec<&str> {
        let Some(session) = self.session() else {
            return Vec::new();
        };
        let mut seen = BTreeSet::new();
        session
            .pool
            .iter()
            .map(Chord::name)
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// Answer the current question with a chord name.
    ///
    /// `None` when no quiz is running or the question was already answered;
    /// a second submission never counts twice.
    pub fn submit_answer(&mut self, name: &str) -> Option<Verdict> {
        let settings = self.settings;
        let session = self.session_mut()?;
        if session.answered {
            log::debug!("Question {} already answered", session.index + 1);
            return None;
        }

        let chord = session.chord().clone();
        let is_correct = chord_names_match(name, chord.name());
        session.answered = true;
        session.attempt += 1;
        let follow_up = if is_correct {
            session.correct += 1;
            FollowUp::Schedule(DeferredAction {
                tag: session.tag(),
                kind: DeferredKind::Advance,
                delay: settings.advance_delay,
            })
        } else {
            match settings.on_incorrect {
                IncorrectPolicy::AwaitNext => FollowUp::AwaitNext,
                IncorrectPolicy::AdvanceNow => FollowUp::AdvanceNow,
            }
        };

        Some(Verdict {
            is_correct,
            chord,
            follow_up,
        })
    }

    /// Flip one note in the selection.
    ///
    /// Ignored (`None`) outside the notes quiz, when nothing is running or
    /// once the question is answered. With auto validation the toggle that
    /// brings the selection to the chord's size evaluates it.
    pub fn toggle_note(&mut self, note: Note) -> Option<Toggle> {
        let settings = self.settings;
        let QuizMode::SelectNotes(validation) = settings.mode else {
            return None;
        };
        let session = self.session_mut()?;
        if session.answered {
            return None;
        }

        let note = note.normalized();
        let selected = if session.selection.remove(&note) {
            false
        } else {
            session.selection.insert(note);
            true
        };
        let selection = session.selection();

        let verdict = if validation == Validation::Auto
            && session.selection.len() == session.chord().len()
        {
            let chord = session.chord().clone();
            let is_correct = notes_equal(&selection, chord.notes());
            session.attempt += 1;
            let kind = if is_correct {
                session.answered = true;
                session.correct += 1;
                DeferredKind::Advance
            } else {
                DeferredKind::ClearSelection
            };
            let delay = match kind {
                DeferredKind::Advance => settings.advance_delay,
                DeferredKind::ClearSelection => settings.clear_delay,
            };
            Some(Verdict {
                is_correct,
                chord,
                follow_up: FollowUp::Schedule(DeferredAction {
                    tag: session.tag(),
                    kind,
                    delay,
                }),
            })
        } else {
            None
        };

        Some(Toggle {
            selected,
            selection,
            verdict,
        })
    }

    /// Empty the selection of the current question
    pub fn clear_selection(&mut self) -> Result<(), QuizError> {
        let session = self.session_mut().ok_or(QuizError::NotRunning)?;
        session.selection.clear();
        Ok(())
    }

    /// Evaluate the selection on request (manual validation).
    ///
    /// An empty selection is refused without using up the question, and so
    /// is a check outside manual validation.
    pub fn check_answer(&mut self) -> Result<Verdict, QuizError> {
        if self.settings.mode == QuizMode::SelectNotes(Validation::Auto) {
            return Err(QuizError::CheckInAutoMode);
        }
        let session = self.session_mut().ok_or(QuizError::NotRunning)?;
        if session.answered {
            return Err(QuizError::AlreadyAnswered);
        }
        if session.selection.is_empty() {
            return Err(QuizError::NoNotesSelected);
        }

        let chord = session.chord().clone();
        let is_correct = notes_equal(&session.selection(), chord.notes());
        session.answered = true;
        session.attempt += 1;
        if is_correct {
            session.correct += 1;
        }

        Ok(Verdict {
            is_correct,
            chord,
            follow_up: FollowUp::AwaitNext,
        })
    }

    /// Move to the next question, finishing after the last one
    pub fn advance(&mut self, now: Instant) -> Option<Advance> {
        let session = self.session_mut()?;
        session.index += 1;

        if session.index >= session.pool.len() {
            let total = session.pool.len() as u32;
            let summary = QuizSummary {
                correct: session.correct,
                total,
                accuracy: accuracy(session.correct, total),
                elapsed_secs: session.elapsed_secs(now),
            };
            log::info!(
                "Quiz session {} finished: {}/{}",
                session.id,
                summary.correct,
                summary.total
            );
            self.state = QuizState::Finished(summary);
            return Some(Advance::Finished(summary));
        }

        session.selection.clear();
        session.answered = false;
        session.attempt = 0;
        Some(Advance::Question(session.tag()))
    }

    /// Run a delayed transition if it still belongs to the current question
    pub fn apply_deferred(&mut self, action: &DeferredAction, now: Instant) -> DeferredOutcome {
        if self.current_tag() != Some(action.tag) {
            log::debug!("Dropping stale {:?} for {:?}", action.kind, action.tag);
            return DeferredOutcome::Stale;
        }

        match action.kind {
            DeferredKind::Advance => match self.advance(now) {
                Some(advance) => DeferredOutcome::Advanced(advance),
                None => DeferredOutcome::Stale,
            },
            DeferredKind::ClearSelection => match self.clear_selection() {
                Ok(()) => DeferredOutcome::Cleared,
                Err(_) => DeferredOutcome::Stale,
            },
        }
    }

    /// Whole seconds since the start; frozen once finished
    pub fn elapsed_secs(&self, now: Instant) -> u64 {
        match &self.state {
            QuizState::Running(session) => session.elapsed_secs(now),
            QuizState::Finished(summary) => summary.elapsed_secs,
            QuizState::Idle => 0,
        }
    }

    pub fn summary(&self) -> Option<QuizSummary> {
        match &self.state {
            QuizState::Finished(summary) => Some(*summary),
            _ => None,
        }
    }
}

impl Default for Quiz {
    fn default() -> Self {
        Self::new(QuizSettings::default())
    }
}

/// `m:ss`, as shown next to the progress line
pub fn format_elapsed(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Compare a typed chord name with the expected one.
///
/// The root may be spelled either way ("Dbm" answers "C#m") and its letter
/// is case-insensitive. Suffixes follow `suffix_matches`, so "CM" is not "Cm".
fn chord_names_match(answer: &str, expected: &str) -> bool {
    let answer = answer.trim();
    if answer == expected {
        return true;
    }
    match (split_chord_name(answer), split_chord_name(expected)) {
        (Some((a_root, a_suffix)), Some((e_root, e_suffix))) => {
            a_root.same_key(&e_root) && suffix_matches(a_suffix, e_suffix)
        }
        _ => false,
    }
}

//! Delayed transitions the caller runs on a timer.
//!
//! The engine never sleeps. When a transition should happen later (advance
//! after a correct answer, clear a wrong selection) it hands back a
//! [`DeferredAction`] carrying the identity of the question it belongs to.
//! When the timer fires the caller passes the action to
//! [`Quiz::apply_deferred`](super::Quiz::apply_deferred), which drops it if
//! the quiz has moved on in the meantime.

use std::time::Duration;

/// Identity of one evaluation of one question.
///
/// `session` changes on every start, `index` on every advance and `attempt`
/// on every evaluated answer, so a timer scheduled for an earlier state never
/// matches the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuestionTag {
    pub session: u64,
    pub index: usize,
    pub attempt: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredKind {
    /// Move on to the next question
    Advance,
    /// Empty the note selection after a wrong auto-validated attempt
    ClearSelection,
}

/// A transition to run once `delay` has elapsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeferredAction {
    pub tag: QuestionTag,
    pub kind: DeferredKind,
    pub delay: Duration,
}

/// What the caller should do after an answer was evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    /// Wait for an explicit `next`
    AwaitNext,
    /// Call `advance` right away
    AdvanceNow,
    /// Start a single-shot timer for this action
    Schedule(DeferredAction),
}

/// Result of [`Quiz::apply_deferred`](super::Quiz::apply_deferred)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredOutcome {
    /// The quiz moved to another question (or finished)
    Advanced(super::Advance),
    /// The selection was emptied
    Cleared,
    /// The action belongs to an earlier question or session; nothing changed
    Stale,
}

use thiserror::Error;

/// Conditions reported by the theory, selection and quiz operations.
///
/// None of these leave the engine in a broken state: the operation that
/// reported the error did not take effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QuizError {
    #[error("no chords selected: choose at least one root and one chord type")]
    EmptySelection,

    #[error("unknown chord type: {0}")]
    UnknownChordType(String),

    #[error("unknown note or root: {0}")]
    UnknownRoot(String),

    #[error("no notes selected")]
    NoNotesSelected,

    #[error("answers are checked as you play in auto mode")]
    CheckInAutoMode,

    #[error("this question has already been answered")]
    AlreadyAnswered,

    #[error("no quiz is running")]
    NotRunning,
}

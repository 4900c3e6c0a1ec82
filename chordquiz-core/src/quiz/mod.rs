//! The chord quiz: session state machine, delayed transitions and score.

pub mod deferred;
pub mod score;
pub mod session;

pub use deferred::{DeferredAction, DeferredKind, DeferredOutcome, FollowUp, QuestionTag};
pub use score::{accuracy, Score};
pub use session::{
    format_elapsed, Advance, IncorrectPolicy, Question, Quiz, QuizMode, QuizSettings,
    QuizSummary, Toggle, Validation, Verdict,
};

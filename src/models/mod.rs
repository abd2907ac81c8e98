pub mod attempt;
pub mod quiz;

pub use attempt::{
    AnswerPayload, PersistedProgress, SelectedAnswer, StartAttempt, SubmissionCompleted,
    SubmissionPayload,
};
pub use quiz::{Choice, Question, Quiz, QuizSettings, SelectionType};

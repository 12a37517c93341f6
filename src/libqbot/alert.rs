use thiserror::Error;

/// A failure shown to the user. The shells render these as a red line or a modal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Alert {
    #[error("Please enter a Subject and Topic, or use the Custom Prompt.")]
    MissingInput,
    #[error("Failed to generate question. Please check backend response.")]
    InvalidResponse,
    #[error("Failed to generate valid questions. Please retry.")]
    NoValidQuestions,
    #[error("No questions to export!")]
    NothingToExport,
    #[error("Failed to save question.")]
    SaveFailed,
    #[error("Failed to delete question.")]
    DeleteFailed,
    #[error("This question has no identifier and cannot be deleted.")]
    MissingId,
    #[error("No question at position {0}.")]
    NoSuchQuestion(usize),
    #[error("Number of questions must be between {min} and {max}.")]
    QuestionCountOutOfRange { min: u32, max: u32 },
    #[error("Time duration must be between {min} and {max} minutes.")]
    DurationOutOfRange { min: u32, max: u32 },
}

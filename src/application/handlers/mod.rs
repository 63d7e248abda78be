//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod survey;

pub use survey::{
    // Commands
    ConductSurveyHandler,
    SurveyTurnCommand,
    SurveyTurnError,
    SurveyTurnResult,
    OPENING_MESSAGE,
    // Queries
    PreviewQuestionHandler,
    PreviewQuestionQuery,
};

//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Consultation turns are commands; question previews are queries.

pub mod handlers;

pub use handlers::{
    ConductSurveyHandler, PreviewQuestionHandler, PreviewQuestionQuery, SurveyTurnCommand,
    SurveyTurnError, SurveyTurnResult, OPENING_MESSAGE,
};

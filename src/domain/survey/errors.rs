//! Error types for the survey domain.

use std::path::PathBuf;
use thiserror::Error;

use super::QuestionId;

/// Errors raised while loading the question catalog.
///
/// The catalog is read once at startup; callers treat these as fatal.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read question catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse question catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors surfaced by survey queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurveyError {
    #[error("Question with ID {0} not found.")]
    QuestionNotFound(QuestionId),
}

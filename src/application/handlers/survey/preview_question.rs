//! PreviewQuestionHandler - Query handler rendering a catalog question as the
//! agent would see it, before any per-respondent tailoring.

use std::sync::Arc;

use crate::domain::survey::{format_question_for_agent, QuestionCatalog, QuestionId, SurveyError};

/// Query for a single rendered question.
#[derive(Debug, Clone, Copy)]
pub struct PreviewQuestionQuery {
    pub question_id: QuestionId,
}

/// Handler for question previews.
pub struct PreviewQuestionHandler {
    catalog: Arc<QuestionCatalog>,
}

impl PreviewQuestionHandler {
    pub fn new(catalog: Arc<QuestionCatalog>) -> Self {
        Self { catalog }
    }

    pub fn handle(&self, query: PreviewQuestionQuery) -> Result<String, SurveyError> {
        format_question_for_agent(self.catalog.get(query.question_id))
            .ok_or(SurveyError::QuestionNotFound(query.question_id))
    }
}

//! Questionnaire progress tracking.
//!
//! Every agent turn that presents a question ends with an `ID[<n>]` marker.
//! Progress is primarily carried by an explicit [`SurveyProgress`] owned by
//! the calling layer; parsing the marker out of agent text remains as the
//! fallback when no progress record is available.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::QuestionId;
use crate::domain::conversation::ConversationMessage;
use crate::domain::foundation::{SessionId, Timestamp};

static QUESTION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"ID\[(\d+)\]").expect("question marker pattern is valid"));

/// Returns the id carried by the first `ID[<n>]` marker in `text`.
///
/// A digit run that does not fit a `u32`, or whose successor would not,
/// counts as no marker.
pub fn find_question_marker(text: &str) -> Option<QuestionId> {
    QUESTION_MARKER
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse::<u32>().ok())
        .map(QuestionId::new)
        .filter(|id| id.next().is_some())
}

/// Computes the next question id from the agent's latest response.
///
/// `ID[n]` yields `n + 1`; a response without a marker means the
/// questionnaire has not started, so the answer is 1.
pub fn get_next_question_id(current_response: &str) -> u32 {
    find_question_marker(current_response)
        .and_then(|id| id.next())
        .unwrap_or(QuestionId::FIRST)
        .value()
}

/// Per-session record of which question was presented last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyProgress {
    session_id: SessionId,
    last_presented: Option<QuestionId>,
    updated_at: Timestamp,
}

impl SurveyProgress {
    /// Starts tracking a fresh session.
    pub fn new() -> Self {
        Self::for_session(SessionId::new())
    }

    pub fn for_session(session_id: SessionId) -> Self {
        Self {
            session_id,
            last_presented: None,
            updated_at: Timestamp::now(),
        }
    }

    /// Rebuilds progress for a caller that kept only the transcript.
    pub fn from_history(history: &[ConversationMessage]) -> Self {
        let mut progress = Self::new();
        if let Some(id) = last_agent_marker(history) {
            progress.record_presented(id);
        }
        progress
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn last_presented(&self) -> Option<QuestionId> {
        self.last_presented
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    /// The question that should be presented next.
    pub fn next_question_id(&self) -> QuestionId {
        self.last_presented
            .and_then(|id| id.next())
            .unwrap_or(QuestionId::FIRST)
    }

    /// Records that `id` has been presented.
    pub fn record_presented(&mut self, id: QuestionId) {
        self.last_presented = Some(id);
        self.updated_at = Timestamp::now();
    }

    /// Records the marker carried by an agent response, if any.
    ///
    /// Responses without a marker (off-topic answers, clarifications) leave
    /// the progress unchanged.
    pub fn observe_agent_response(&mut self, response: &str) -> Option<QuestionId> {
        let presented = find_question_marker(response)?;
        self.record_presented(presented);
        Some(presented)
    }

    /// True once the final question has been presented.
    pub fn is_complete(&self, final_id: QuestionId) -> bool {
        self.last_presented.is_some_and(|id| id >= final_id)
    }
}

impl Default for SurveyProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Decides which question comes next.
///
/// Explicit progress wins. Without it, the most recent agent message carrying
/// a marker is used; with no marker anywhere the questionnaire starts at 1.
pub fn resolve_next_question_id(
    progress: Option<&SurveyProgress>,
    history: &[ConversationMessage],
) -> QuestionId {
    if let Some(progress) = progress {
        return progress.next_question_id();
    }

    last_agent_marker(history)
        .and_then(|id| id.next())
        .unwrap_or(QuestionId::FIRST)
}

fn last_agent_marker(history: &[ConversationMessage]) -> Option<QuestionId> {
    history
        .iter()
        .rev()
        .filter(|m| m.is_agent())
        .find_map(|m| find_question_marker(&m.message))
}

//! ConductSurveyHandler - produces the agent's next consultation turn.
//!
//! Each call is a pure function of the supplied history and progress apart
//! from the provider call: the respondent context is re-extracted, the next
//! question is resolved and tailored, and the provider is asked to voice it.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::domain::conversation::{ContextExtractor, ConversationMessage, Sender, UserContext};
use crate::domain::survey::{
    prepare_next_question, resolve_next_question_id, turn_guidance, QuestionCatalog, QuestionId,
    SurveyAgentDefinition, SurveyProgress,
};
use crate::ports::{AIError, AIProvider, CompletionRequest, Message, RequestMetadata};

/// Sent as the first user turn when the transcript has none yet.
pub const OPENING_MESSAGE: &str = "Hello, I'm ready to start the consultation.";

/// Command for one consultation turn.
#[derive(Debug, Clone, Default)]
pub struct SurveyTurnCommand {
    /// Full transcript so far, oldest first.
    pub history: Vec<ConversationMessage>,
    /// Progress from the previous turn; rebuilt from markers when absent.
    pub progress: Option<SurveyProgress>,
}

impl SurveyTurnCommand {
    pub fn new(history: Vec<ConversationMessage>) -> Self {
        Self {
            history,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: SurveyProgress) -> Self {
        self.progress = Some(progress);
        self
    }
}

/// Outcome of one consultation turn.
#[derive(Debug, Clone)]
pub struct SurveyTurnResult {
    /// The agent's reply, verbatim.
    pub reply: String,
    /// Progress to pass back on the next turn.
    pub progress: SurveyProgress,
    /// What was known about the respondent when the turn was built.
    pub context: UserContext,
    /// Question marker found in the reply.
    pub presented: Option<QuestionId>,
    /// True once the final question has been presented.
    pub completed: bool,
    /// Provider's estimate of the prompt size sent this turn.
    pub estimated_prompt_tokens: u32,
}

#[derive(Debug, Error)]
pub enum SurveyTurnError {
    #[error("AI provider error: {0}")]
    Provider(#[from] AIError),
}

/// Handler for consultation turns.
pub struct ConductSurveyHandler {
    provider: Arc<dyn AIProvider>,
    catalog: Arc<QuestionCatalog>,
    extractor: Arc<dyn ContextExtractor>,
    definition: SurveyAgentDefinition,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl ConductSurveyHandler {
    pub fn new(
        provider: Arc<dyn AIProvider>,
        catalog: Arc<QuestionCatalog>,
        extractor: Arc<dyn ContextExtractor>,
        definition: SurveyAgentDefinition,
    ) -> Self {
        Self {
            provider,
            catalog,
            extractor,
            definition,
            max_tokens: None,
            temperature: None,
        }
    }

    /// Sets the reply length and sampling temperature sent to the provider.
    pub fn with_sampling(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = Some(max_tokens);
        self.temperature = Some(temperature);
        self
    }

    pub fn definition(&self) -> &SurveyAgentDefinition {
        &self.definition
    }

    fn final_question_id(&self) -> QuestionId {
        self.catalog.last_id().unwrap_or(QuestionId::FIRST)
    }

    pub async fn handle(&self, cmd: SurveyTurnCommand) -> Result<SurveyTurnResult, SurveyTurnError> {
        let context = self.extractor.extract(&cmd.history);
        let next_id = resolve_next_question_id(cmd.progress.as_ref(), &cmd.history);
        let mut progress = cmd
            .progress
            .unwrap_or_else(|| SurveyProgress::from_history(&cmd.history));

        let final_id = self.final_question_id();
        let prepared = prepare_next_question(&self.catalog, next_id, &context);

        tracing::info!(
            session_id = %progress.session_id(),
            next_question = %next_id,
            prepared_question = ?prepared.as_ref().map(|p| p.id.value()),
            history_len = cmd.history.len(),
            "Conducting survey turn"
        );
        if let Some(prepared) = &prepared {
            if prepared.id != next_id {
                tracing::debug!(
                    from = %next_id,
                    to = %prepared.id,
                    "Skipped questions that do not apply to respondent"
                );
            }
        }

        let system_prompt = format!(
            "{}\n\n{}",
            self.definition.instruction,
            turn_guidance(&context, prepared.as_ref(), final_id)
        );

        let mut request = CompletionRequest::new(RequestMetadata::new(
            progress.session_id(),
            Uuid::new_v4().to_string(),
        ))
        .with_system_prompt(system_prompt)
        .with_messages(to_provider_messages(&cmd.history));

        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }

        let estimated_prompt_tokens = self.estimate_prompt_tokens(&request);
        tracing::debug!(
            session_id = %progress.session_id(),
            estimated_prompt_tokens,
            messages = request.messages.len(),
            "Sending survey turn to provider"
        );

        let response = self.provider.complete(request).await?;

        let presented = progress.observe_agent_response(&response.content);
        match presented {
            Some(id) => tracing::info!(
                session_id = %progress.session_id(),
                question = %id,
                "Agent presented question"
            ),
            None if prepared.is_some() => tracing::warn!(
                session_id = %progress.session_id(),
                "Agent reply carried no question marker"
            ),
            None => {}
        }

        let completed = progress.is_complete(final_id);
        Ok(SurveyTurnResult {
            reply: response.content,
            progress,
            context,
            presented,
            completed,
            estimated_prompt_tokens,
        })
    }

    fn estimate_prompt_tokens(&self, request: &CompletionRequest) -> u32 {
        let system = request
            .system_prompt
            .as_deref()
            .map_or(0, |p| self.provider.estimate_tokens(p));
        request
            .messages
            .iter()
            .map(|m| self.provider.estimate_tokens(&m.content))
            .fold(system, u32::saturating_add)
    }
}

/// Maps the transcript onto provider roles, dropping unknown senders.
fn to_provider_messages(history: &[ConversationMessage]) -> Vec<Message> {
    let mut messages: Vec<Message> = history
        .iter()
        .filter_map(|m| match m.sender {
            Sender::User => Some(Message::user(m.message.clone())),
            Sender::Agent => Some(Message::assistant(m.message.clone())),
            Sender::Other => None,
        })
        .collect();

    if !history.iter().any(ConversationMessage::is_user) {
        messages.push(Message::user(OPENING_MESSAGE));
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::domain::conversation::KeywordContextExtractor;
    use crate::domain::survey::DEFAULT_AGENT_MODEL;
    use crate::ports::MessageRole;

    fn catalog() -> Arc<QuestionCatalog> {
        Arc::new(QuestionCatalog::bundled().unwrap())
    }

    fn handler(provider: MockAIProvider) -> ConductSurveyHandler {
        let catalog = catalog();
        let definition = SurveyAgentDefinition::new("Riva", DEFAULT_AGENT_MODEL, &catalog).unwrap();
        ConductSurveyHandler::new(
            Arc::new(provider),
            catalog,
            Arc::new(KeywordContextExtractor::new()),
            definition,
        )
        .with_sampling(512, 0.2)
    }

    mod first_turn {
        use super::*;

        #[tokio::test]
        async fn presents_question_one() {
            let mock = MockAIProvider::new()
                .with_response("G'day! Question: Which TAFE NSW campus do you work at?\n\nID[1]");
            let result = handler(mock.clone())
                .handle(SurveyTurnCommand::default())
                .await
                .unwrap();

            assert_eq!(result.presented, Some(QuestionId::new(1)));
            assert_eq!(result.progress.next_question_id(), QuestionId::new(2));
            assert!(!result.completed);

            let call = mock.last_call().unwrap();
            let system = call.system_prompt.unwrap();
            assert!(system.starts_with("You are Riva"));
            assert!(system.contains("Present question ID 1 next"));
            assert!(system.ends_with("End your response with ID[1]."));
            assert_eq!(call.max_tokens, Some(512));
            assert_eq!(call.temperature, Some(0.2));
        }

        #[tokio::test]
        async fn reports_estimated_prompt_size() {
            let mock = MockAIProvider::new();
            let result = handler(mock.clone())
                .handle(SurveyTurnCommand::default())
                .await
                .unwrap();

            let call = mock.last_call().unwrap();
            let expected = mock.estimate_tokens(call.system_prompt.as_deref().unwrap())
                + mock.estimate_tokens(OPENING_MESSAGE);
            assert_eq!(result.estimated_prompt_tokens, expected);
            assert!(result.estimated_prompt_tokens > 1000);
        }

        #[tokio::test]
        async fn sends_opening_user_turn() {
            let mock = MockAIProvider::new();
            handler(mock.clone())
                .handle(SurveyTurnCommand::default())
                .await
                .unwrap();

            let call = mock.last_call().unwrap();
            assert_eq!(call.messages.len(), 1);
            assert_eq!(call.messages[0].role, MessageRole::User);
            assert_eq!(call.messages[0].content, OPENING_MESSAGE);
        }
    }

    mod later_turns {
        use super::*;

        #[tokio::test]
        async fn resolves_from_history_markers_without_progress() {
            let mock = MockAIProvider::new().with_response("Question: ... ID[2]");
            let history = vec![
                ConversationMessage::agent("Question: Which campus? ID[1]"),
                ConversationMessage::user("Liverpool"),
            ];

            let result = handler(mock.clone())
                .handle(SurveyTurnCommand::new(history))
                .await
                .unwrap();

            assert_eq!(result.context.campus.as_deref(), Some("Liverpool"));
            assert_eq!(result.presented, Some(QuestionId::new(2)));

            let call = mock.last_call().unwrap();
            assert!(call
                .system_prompt
                .unwrap()
                .contains("Known about this staff member:\n- Campus: Liverpool"));
            let roles: Vec<MessageRole> = call.messages.iter().map(|m| m.role).collect();
            assert_eq!(roles, vec![MessageRole::Assistant, MessageRole::User]);
        }

        #[tokio::test]
        async fn explicit_progress_wins_and_is_returned() {
            let mock = MockAIProvider::new().with_response("Question: ... ID[6]");
            let mut progress = SurveyProgress::new();
            progress.record_presented(QuestionId::new(5));
            let session = progress.session_id();

            let history = vec![
                ConversationMessage::agent("ID[2]"),
                ConversationMessage::user("I teach at Granville"),
            ];
            let result = handler(mock.clone())
                .handle(SurveyTurnCommand::new(history).with_progress(progress))
                .await
                .unwrap();

            assert_eq!(result.progress.session_id(), session);
            assert_eq!(result.progress.last_presented(), Some(QuestionId::new(6)));

            let system = mock.last_call().unwrap().system_prompt.unwrap();
            assert!(system.contains("Based on your work at Granville campus"));
        }

        #[tokio::test]
        async fn skipped_questions_are_not_offered() {
            let mock = MockAIProvider::new().with_response("Question: ... ID[9]");
            let mut progress = SurveyProgress::new();
            progress.record_presented(QuestionId::new(6));

            let history = vec![ConversationMessage::user("Other TAFE NSW area")];
            let result = handler(mock.clone())
                .handle(SurveyTurnCommand::new(history).with_progress(progress))
                .await
                .unwrap();

            assert!(result.context.selected_other_tafe);
            let system = mock.last_call().unwrap().system_prompt.unwrap();
            assert!(system.contains("Present question ID 9 next"));
        }

        #[tokio::test]
        async fn off_topic_reply_keeps_progress() {
            let mock = MockAIProvider::new().with_response("HWHS stands for Health, Wellbeing and Human Services.");
            let mut progress = SurveyProgress::new();
            progress.record_presented(QuestionId::new(3));

            let result = handler(mock)
                .handle(
                    SurveyTurnCommand::new(vec![ConversationMessage::user("What is HWHS?")])
                        .with_progress(progress),
                )
                .await
                .unwrap();

            assert_eq!(result.presented, None);
            assert_eq!(result.progress.last_presented(), Some(QuestionId::new(3)));
        }
    }

    mod completion {
        use super::*;

        #[tokio::test]
        async fn final_marker_completes_consultation() {
            let mock = MockAIProvider::new().with_response("Thank you for your time... ID[74]");
            let mut progress = SurveyProgress::new();
            progress.record_presented(QuestionId::new(73));

            let result = handler(mock)
                .handle(SurveyTurnCommand::default().with_progress(progress))
                .await
                .unwrap();

            assert!(result.completed);
        }

        #[tokio::test]
        async fn past_the_end_asks_for_insights() {
            let mock = MockAIProvider::new().with_response("Here are your key insights.");
            let mut progress = SurveyProgress::new();
            progress.record_presented(QuestionId::new(74));

            let result = handler(mock.clone())
                .handle(SurveyTurnCommand::default().with_progress(progress))
                .await
                .unwrap();

            assert!(result.completed);
            let system = mock.last_call().unwrap().system_prompt.unwrap();
            assert!(system.contains("All questions up to ID[74] have been presented"));
        }
    }

    #[tokio::test]
    async fn provider_errors_propagate() {
        let mock = MockAIProvider::new().with_error(MockError::AuthenticationFailed);
        let err = handler(mock)
            .handle(SurveyTurnCommand::default())
            .await
            .unwrap_err();

        assert!(matches!(err, SurveyTurnError::Provider(AIError::AuthenticationFailed)));
    }

    #[test]
    fn unknown_senders_are_dropped() {
        let history: Vec<ConversationMessage> = serde_json::from_str(
            r#"[{"sender":"system","message":"x"},{"sender":"user","message":"Miller"}]"#,
        )
        .unwrap();
        let messages = to_provider_messages(&history);
        assert_eq!(messages, vec![Message::user("Miller")]);
    }
}

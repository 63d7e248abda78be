//! Standing instructions for the consultation agent.
//!
//! The instruction text is built once per catalog and sent as the system
//! prompt on every turn, followed by a short per-turn guidance block that
//! carries what has been learned about the respondent and the tailored next
//! question.

use crate::domain::conversation::UserContext;

use super::{CatalogError, PreparedQuestion, QuestionCatalog, QuestionId};

/// Registered name of the consultation agent.
pub const DEFAULT_AGENT_NAME: &str = "delivery_staff_agent";

/// Registered description of the consultation agent.
pub const DEFAULT_AGENT_DESCRIPTION: &str =
    "Agent to assist TAFE NSW delivery staff with strategic consultation questions";

/// Model the agent is registered against.
pub const DEFAULT_AGENT_MODEL: &str = "gemini-2.5-flash";

/// Name the assistant introduces itself with.
pub const DEFAULT_ASSISTANT_NAME: &str = "Riva";

/// Everything needed to register or drive the consultation agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyAgentDefinition {
    pub name: String,
    pub description: String,
    pub model: String,
    pub instruction: String,
}

impl SurveyAgentDefinition {
    /// Builds the definition for `catalog` with the default name and description.
    pub fn new(
        assistant_name: &str,
        model: impl Into<String>,
        catalog: &QuestionCatalog,
    ) -> Result<Self, CatalogError> {
        Ok(Self {
            name: DEFAULT_AGENT_NAME.to_string(),
            description: DEFAULT_AGENT_DESCRIPTION.to_string(),
            model: model.into(),
            instruction: build_agent_instruction(assistant_name, catalog)?,
        })
    }

    /// Overrides the registered agent name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Renders the full agent instruction, ending with the catalog as JSON.
pub fn build_agent_instruction(
    assistant_name: &str,
    catalog: &QuestionCatalog,
) -> Result<String, CatalogError> {
    let final_id = catalog.last_id().unwrap_or(QuestionId::FIRST);
    let mut text = String::new();

    text.push_str(&format!(
        "You are {name}, a virtual assistant for TAFE NSW delivery staff conducting a strategic consultation.\n\n",
        name = assistant_name
    ));

    text.push_str("IMPORTANT RULES:\n");
    text.push_str("1. Present ONLY ONE question at a time from the delivery staff questions when conducting the consultation.\n");
    text.push_str("2. If the user just started or you see no ID in the conversation, start with question ID 1.\n");
    text.push_str("3. If you see ID[X] in the previous conversation, present the question with ID X+1.\n");
    text.push_str("4. Always end your response with \"ID[current_question_number]\" when presenting a question.\n");
    text.push_str(&format!(
        "5. If the user asks any other query (not related to the consultation questions), answer helpfully and informatively as {}, using your general knowledge and context.\n",
        assistant_name
    ));
    text.push_str("6. For matrix-type questions, present all sub-questions together with their respective options, formatting as shown.\n");
    text.push_str(&format!(
        "7. When presenting the last question (ID[{}]), this triggers the insight generation process.\n\n",
        final_id
    ));

    text.push_str(FORMATTING_RULES);
    text.push_str(QUESTION_FORMATS);
    text.push_str(CONTEXT_AWARENESS);

    text.push_str("Available questions: ");
    text.push_str(&catalog.to_json()?);
    Ok(text)
}

const FORMATTING_RULES: &str = "\
CRITICAL FORMATTING RULES:
- ALWAYS put \"Options:\" on a NEW LINE after the question
- ALWAYS put each option on a NEW LINE starting with \"- \"
- NEVER put options on the same line as \"Options:\"

CORRECT FORMAT EXAMPLE:
Question: Which TAFE NSW campus do you work at?
Options:
- Bankstown
- Campbelltown
- Granville
- Liverpool
- Macquarie Fields
- Miller
- Padstow
- Wetherill Park
- Other

WRONG FORMAT (DO NOT USE):
Question: Which TAFE NSW campus do you work at? Options: - Bankstown - Campbelltown - Granville

";

const QUESTION_FORMATS: &str = "\
ENHANCED QUESTION FORMATS:

For single-select questions:
Question: [question text]
Options:
- option 1
- option 2
- option 3

For multi-select questions:
Question: [question text] (Select all that apply)
Options:
- option 1
- option 2
- option 3

For matrix questions (when relevant):
Question: [main question]

For [sub-question 1]:
Options:
- option 1
- option 2

For [sub-question 2]:
Options:
- option 1
- option 2

For open-ended questions:
Question: [question text]
Please provide your response.

ID[current_question_number]

";

const CONTEXT_AWARENESS: &str = "\
CONTEXT AWARENESS - CRITICAL:
- Remember and use information from previous user responses throughout the conversation
- Adapt questions based on user's campus, delivery areas, experience, and role
- For campus-specific questions (like strengths, improvements, capacity), ask about THEIR specific campus only
- For matrix questions about campus comparisons, transform them to focus on their campus
- Skip redundant questions when information is already known

";

/// Per-turn addendum to the system prompt.
///
/// With a prepared question the agent is told exactly what to ask next and
/// which marker to end with; without one it is told the consultation is over.
pub fn turn_guidance(
    context: &UserContext,
    next: Option<&PreparedQuestion>,
    final_id: QuestionId,
) -> String {
    let mut text = String::from("CURRENT TURN:\n");

    let facts = context.summary_lines();
    if !facts.is_empty() {
        text.push_str("Known about this staff member:\n");
        for line in facts {
            text.push_str("- ");
            text.push_str(&line);
            text.push('\n');
        }
        text.push('\n');
    }

    match next {
        Some(prepared) => {
            text.push_str(&format!(
                "Present question ID {} next, already tailored to this staff member:\n\n{}\n\nEnd your response with ID[{}].",
                prepared.id, prepared.prompt, prepared.id
            ));
            if prepared.id == final_id {
                text.push_str(" This is the last question; once answered, generate the key insights.");
            }
        }
        None => {
            text.push_str(&format!(
                "All questions up to ID[{}] have been presented. Do not present further questions; thank the staff member and summarise the key insights from their responses.",
                final_id
            ));
        }
    }

    text
}

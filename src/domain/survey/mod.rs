//! Survey domain module.
//!
//! The question catalog and everything that turns a catalog record into the
//! next thing the agent says: formatting, sequencing by `ID[n]` markers,
//! per-respondent customization and the agent's standing instructions.

mod catalog;
mod customizer;
mod errors;
mod formatter;
mod instructions;
mod question;
mod sequencer;

pub use catalog::{QuestionCatalog, BUNDLED_CATALOG_PATH};
pub use customizer::{
    customize_question_for_context, prepare_next_question, PreparedQuestion, FACILITY_OPTIONS,
    TEACHING_QUESTION_IDS,
};
pub use errors::{CatalogError, SurveyError};
pub use formatter::format_question_for_agent;
pub use instructions::{
    build_agent_instruction, turn_guidance, SurveyAgentDefinition, DEFAULT_AGENT_DESCRIPTION,
    DEFAULT_AGENT_MODEL, DEFAULT_AGENT_NAME, DEFAULT_ASSISTANT_NAME,
};
pub use question::{Question, QuestionId, QuestionType, SubQuestion};
pub use sequencer::{
    find_question_marker, get_next_question_id, resolve_next_question_id, SurveyProgress,
};

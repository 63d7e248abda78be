//! Survey handlers - consultation turns and question previews.

mod conduct_survey;
mod preview_question;

pub use conduct_survey::{
    ConductSurveyHandler, SurveyTurnCommand, SurveyTurnError, SurveyTurnResult, OPENING_MESSAGE,
};
pub use preview_question::{PreviewQuestionHandler, PreviewQuestionQuery};

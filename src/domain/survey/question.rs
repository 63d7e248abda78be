//! Question records as they appear in the consultation catalog.
//!
//! Records are immutable once loaded. Every transformation (customization,
//! filtering of matrix rows) builds a new value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Numeric identifier of a catalog question.
///
/// The catalog stores ids as strings ("12"); the `Display` form of a
/// `QuestionId` is exactly that string, which is what lookups compare against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(u32);

impl QuestionId {
    /// The first question of every consultation.
    pub const FIRST: QuestionId = QuestionId(1);

    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// The id that follows this one, or `None` past `u32::MAX`.
    pub fn next(&self) -> Option<QuestionId> {
        self.0.checked_add(1).map(QuestionId)
    }
}

impl From<u32> for QuestionId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for QuestionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Presentation shape of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    /// Pick exactly one option.
    #[default]
    Single,
    /// Pick any number of options.
    Multi,
    /// Free-text answer.
    Open,
    /// One row per sub-question, each with its own options.
    Matrix,
}

/// One row of a matrix question (a campus, a program area, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubQuestion {
    pub title: String,
    #[serde(default)]
    pub options: Vec<String>,
}

impl SubQuestion {
    pub fn new(title: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            title: title.into(),
            options,
        }
    }
}

/// A single catalog question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Numeric string, unique across the catalog.
    pub id: String,

    /// Question text shown to the respondent.
    pub question: String,

    #[serde(rename = "type", default)]
    pub question_type: QuestionType,

    #[serde(default)]
    pub options: Vec<String>,

    /// Matrix rows; empty for every other type.
    #[serde(
        rename = "subQuestions",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub sub_questions: Vec<SubQuestion>,
}

impl Question {
    /// Creates a question without matrix rows.
    pub fn new(
        id: impl Into<String>,
        question: impl Into<String>,
        question_type: QuestionType,
        options: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            question_type,
            options,
            sub_questions: Vec::new(),
        }
    }

    /// Creates a matrix question.
    pub fn matrix(
        id: impl Into<String>,
        question: impl Into<String>,
        sub_questions: Vec<SubQuestion>,
    ) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            question_type: QuestionType::Matrix,
            options: Vec::new(),
            sub_questions,
        }
    }

    /// Parses the string id. `None` when the catalog id is not numeric.
    pub fn numeric_id(&self) -> Option<QuestionId> {
        self.id.parse().ok()
    }

    pub fn is_matrix(&self) -> bool {
        self.question_type == QuestionType::Matrix
    }

    /// Returns a copy of this question carrying only the given matrix rows.
    pub fn with_sub_questions(&self, sub_questions: Vec<SubQuestion>) -> Self {
        Self {
            sub_questions,
            ..self.clone()
        }
    }

    /// Titles of the matrix rows, in catalog order.
    pub fn sub_question_titles(&self) -> Vec<String> {
        self.sub_questions.iter().map(|s| s.title.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod question_id {
        use super::*;

        #[test]
        fn display_matches_catalog_string() {
            assert_eq!(QuestionId::new(12).to_string(), "12");
        }

        #[test]
        fn parses_numeric_strings() {
            assert_eq!("57".parse::<QuestionId>().unwrap(), QuestionId::new(57));
            assert!("fifty".parse::<QuestionId>().is_err());
        }

        #[test]
        fn next_increments() {
            assert_eq!(QuestionId::new(6).next(), Some(QuestionId::new(7)));
        }

        #[test]
        fn last_representable_id_has_no_successor() {
            assert_eq!(QuestionId::new(u32::MAX).next(), None);
        }
    }

    mod serde_shape {
        use super::*;

        #[test]
        fn deserializes_matrix_with_camel_case_rows() {
            let json = r#"{
                "id": "61",
                "question": "Based on your experience with your campus, how would you rate it?",
                "type": "matrix",
                "subQuestions": [
                    {"title": "Bankstown", "options": ["Good", "Poor"]},
                    {"title": "Liverpool", "options": ["Good", "Poor"]}
                ]
            }"#;

            let q: Question = serde_json::from_str(json).unwrap();

            assert!(q.is_matrix());
            assert!(q.options.is_empty());
            assert_eq!(q.sub_questions.len(), 2);
            assert_eq!(q.sub_questions[1].title, "Liverpool");
        }

        #[test]
        fn missing_type_defaults_to_single() {
            let q: Question =
                serde_json::from_str(r#"{"id": "1", "question": "Campus?"}"#).unwrap();
            assert_eq!(q.question_type, QuestionType::Single);
            assert!(q.options.is_empty());
        }

        #[test]
        fn serializes_type_lowercase_and_omits_empty_rows() {
            let q = Question::new("6", "Programs?", QuestionType::Open, vec![]);
            let json = serde_json::to_value(&q).unwrap();

            assert_eq!(json["type"], "open");
            assert_eq!(json["options"], serde_json::json!([]));
            assert!(json.get("subQuestions").is_none());
        }
    }

    #[test]
    fn with_sub_questions_leaves_original_untouched() {
        let original = Question::matrix(
            "32",
            "Alignment?",
            vec![
                SubQuestion::new("Nursing", vec!["Yes".into()]),
                SubQuestion::new("Dental", vec!["Yes".into()]),
            ],
        );

        let filtered = original.with_sub_questions(vec![original.sub_questions[0].clone()]);

        assert_eq!(filtered.sub_questions.len(), 1);
        assert_eq!(original.sub_questions.len(), 2);
        assert_eq!(filtered.id, original.id);
    }

    #[test]
    fn numeric_id_parses_catalog_id() {
        let q = Question::new("74", "Last", QuestionType::Single, vec![]);
        assert_eq!(q.numeric_id(), Some(QuestionId::new(74)));

        let odd = Question::new("intro", "?", QuestionType::Open, vec![]);
        assert_eq!(odd.numeric_id(), None);
    }
}

//! The question catalog.
//!
//! A static, ordered collection of questions loaded once from a JSON document
//! of the form `{"questions": [...]}`. The catalog is built at startup and
//! shared read-only (typically behind an `Arc`) with every component that
//! needs it.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{CatalogError, Question, QuestionId};

/// Catalog shipped with the crate.
const BUNDLED_CATALOG: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/questions/delivery_staff.json"
));

/// Relative location of the bundled catalog inside the package.
pub const BUNDLED_CATALOG_PATH: &str = "questions/delivery_staff.json";

/// Immutable, ordered question bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCatalog {
    questions: Vec<Question>,
}

impl QuestionCatalog {
    /// Builds a catalog from already-parsed questions.
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// Parses a catalog document.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a catalog document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// The delivery staff catalog bundled at compile time.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_CATALOG)
    }

    /// Looks up a question by id.
    ///
    /// Linear scan comparing the catalog's string id with the numeric id's
    /// string form. Unknown ids yield `None`.
    pub fn get(&self, id: QuestionId) -> Option<&Question> {
        let wanted = id.to_string();
        self.questions.iter().find(|q| q.id == wanted)
    }

    /// All questions in catalog order.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Highest numeric id in the catalog: presenting it ends the consultation.
    pub fn last_id(&self) -> Option<QuestionId> {
        self.questions.iter().filter_map(Question::numeric_id).max()
    }

    /// Serializes the catalog back to its JSON document form.
    pub fn to_json(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string(self)?)
    }
}

//! Per-respondent rewriting of catalog questions.
//!
//! Rules are keyed by question id and applied before a question is handed to
//! the agent. Catalog records are never modified; every rewrite is a copy.

use std::collections::BTreeSet;

use crate::domain::conversation::{title_case, UserContext};

use super::{format_question_for_agent, Question, QuestionCatalog, QuestionId, QuestionType};

/// Teaching-practice questions skipped for staff outside HWHS.
pub const TEACHING_QUESTION_IDS: &[u32] = &[7, 8, 11, 12, 13, 16, 17, 18, 19];

/// Options offered by the campus facility questions once the campus is known.
pub const FACILITY_OPTIONS: &[&str] = &[
    "Yes",
    "No",
    "Partially",
    "Not sure",
    "Not applicable to my role",
];

const YOUR_CAMPUS: &str = "your campus's";
const SELECT_CAMPUS: &str = "Select which campus you mostly work at and then answer the following";
const YOUR_CAMPUS_EXPERIENCE: &str = "Based on your experience with your campus";

/// Tailors `question` to what is known about the respondent.
///
/// Returns `None` when the question should be skipped entirely. Questions no
/// rule applies to come back unchanged.
pub fn customize_question_for_context(
    question: &Question,
    context: &UserContext,
) -> Option<Question> {
    let Some(id) = question.numeric_id().map(|id| id.value()) else {
        return Some(question.clone());
    };
    if context.selected_other_tafe && TEACHING_QUESTION_IDS.contains(&id) {
        return None;
    }
    let campus = context.campus.as_deref().map(title_case);
    let campus = campus.as_deref();

    let rewritten = match id {
        55 | 56 => campus.and_then(|c| campus_row_choice(question, c)),
        57..=59 => campus.map(|c| campus_facility_check(question, c)),
        61..=64 => campus.and_then(|c| campus_row_rating(question, c)),
        26..=30 | 32 => filter_rows_by_area(question, &context.delivery_areas),
        6 => campus.map(|c| campus_programs(question, c)),
        _ => None,
    };

    Some(rewritten.unwrap_or_else(|| question.clone()))
}

fn campus_row_choice(question: &Question, campus: &str) -> Option<Question> {
    if !question.is_matrix() {
        return None;
    }
    Some(Question::new(
        question.id.clone(),
        question
            .question
            .replace(YOUR_CAMPUS, &format!("{} campus's", campus)),
        QuestionType::Multi,
        question.sub_question_titles(),
    ))
}

fn campus_facility_check(question: &Question, campus: &str) -> Question {
    Question::new(
        question.id.clone(),
        question.question.replace(
            SELECT_CAMPUS,
            &format!("For {} campus, please answer the following", campus),
        ),
        QuestionType::Single,
        FACILITY_OPTIONS.iter().map(|o| o.to_string()).collect(),
    )
}

fn campus_row_rating(question: &Question, campus: &str) -> Option<Question> {
    if !question.is_matrix() {
        return None;
    }
    let wanted = campus.to_lowercase();
    let row = question
        .sub_questions
        .iter()
        .find(|s| s.title.to_lowercase() == wanted)?;
    Some(Question::new(
        question.id.clone(),
        question.question.replace(
            YOUR_CAMPUS_EXPERIENCE,
            &format!("Based on your experience with {} campus", campus),
        ),
        QuestionType::Single,
        row.options.clone(),
    ))
}

/// Keeps the matrix rows whose title mentions any word of any known area.
fn filter_rows_by_area(question: &Question, areas: &BTreeSet<String>) -> Option<Question> {
    if areas.is_empty() || !question.is_matrix() {
        return None;
    }
    let words: Vec<String> = areas
        .iter()
        .flat_map(|a| a.split_whitespace())
        .map(str::to_lowercase)
        .collect();

    let rows: Vec<_> = question
        .sub_questions
        .iter()
        .filter(|s| {
            let title = s.title.to_lowercase();
            words.iter().any(|w| title.contains(w.as_str()))
        })
        .cloned()
        .collect();

    if rows.is_empty() {
        None
    } else {
        Some(question.with_sub_questions(rows))
    }
}

fn campus_programs(question: &Question, campus: &str) -> Question {
    Question::new(
        question.id.clone(),
        format!(
            "Based on your work at {} campus, what HWHS programs are currently offered there?",
            campus
        ),
        QuestionType::Open,
        Vec::new(),
    )
}

/// The next question to put to the respondent, already tailored and rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedQuestion {
    pub id: QuestionId,
    pub question: Question,
    /// Formatter output for `question`.
    pub prompt: String,
}

/// Finds the first question at or after `start` that applies to the respondent.
///
/// Skipped questions advance the search; an id missing from the catalog ends it.
pub fn prepare_next_question(
    catalog: &QuestionCatalog,
    start: QuestionId,
    context: &UserContext,
) -> Option<PreparedQuestion> {
    let mut id = start;
    loop {
        let question = catalog.get(id)?;
        match customize_question_for_context(question, context) {
            Some(question) => {
                let prompt = format_question_for_agent(Some(&question))?;
                return Some(PreparedQuestion {
                    id,
                    question,
                    prompt,
                });
            }
            None => id = id.next()?,
        }
    }
}

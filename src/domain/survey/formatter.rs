//! Renders questions as the plain-text blocks the agent presents.
//!
//! The agent reads structure from layout alone, so the exact shape is part of
//! the contract: `Options:` on its own line, one `- ` bullet per option, and a
//! blank line between matrix blocks.

use super::Question;

/// Formats a question for presentation by the agent.
///
/// Returns `None` when there is no question to format.
pub fn format_question_for_agent(question: Option<&Question>) -> Option<String> {
    let question = question?;

    if question.is_matrix() {
        return Some(format_matrix(question));
    }

    let mut formatted = format!("Question: {}\n", question.question);

    if !question.options.is_empty() {
        formatted.push_str("Options:\n");
        for option in question.options.iter().filter(|o| !o.trim().is_empty()) {
            formatted.push_str(&format!("- {}\n", option));
        }
    }

    Some(formatted.trim().to_string())
}

fn format_matrix(question: &Question) -> String {
    let mut formatted = format!("Question: {}\n\n", question.question);

    for sub in &question.sub_questions {
        formatted.push_str(&format!("For {}:\n", sub.title));
        formatted.push_str("Options:\n");
        for option in &sub.options {
            formatted.push_str(&format!("- {}\n", option));
        }
        formatted.push('\n');
    }

    formatted.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::survey::{QuestionType, SubQuestion};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn none_in_none_out() {
        assert_eq!(format_question_for_agent(None), None);
    }

    #[test]
    fn single_select_lists_options_one_per_line() {
        let q = Question::new(
            "1",
            "Which TAFE NSW campus do you work at?",
            QuestionType::Single,
            strings(&["Bankstown", "Campbelltown", "Other"]),
        );

        let text = format_question_for_agent(Some(&q)).unwrap();

        assert_eq!(
            text,
            "Question: Which TAFE NSW campus do you work at?\n\
             Options:\n\
             - Bankstown\n\
             - Campbelltown\n\
             - Other"
        );
    }

    #[test]
    fn blank_options_are_skipped() {
        let q = Question::new(
            "4",
            "Employment type?",
            QuestionType::Single,
            strings(&["Casual", "   ", "", "Permanent"]),
        );

        let text = format_question_for_agent(Some(&q)).unwrap();

        assert_eq!(text.matches("- ").count(), 2);
        assert!(text.ends_with("- Permanent"));
    }

    #[test]
    fn open_question_has_no_options_section() {
        let q = Question::new("10", "Which partners?", QuestionType::Open, vec![]);
        let text = format_question_for_agent(Some(&q)).unwrap();
        assert_eq!(text, "Question: Which partners?");
    }

    #[test]
    fn matrix_renders_one_block_per_row() {
        let q = Question::matrix(
            "61",
            "How would you rate capacity?",
            vec![
                SubQuestion::new("Bankstown", strings(&["High", "Low"])),
                SubQuestion::new("Liverpool", strings(&["High", "Low"])),
                SubQuestion::new("Miller", strings(&["High", "Low"])),
            ],
        );

        let text = format_question_for_agent(Some(&q)).unwrap();

        assert!(text.starts_with("Question: How would you rate capacity?\n\nFor Bankstown:"));
        assert_eq!(text.matches("Options:").count(), 3);
        for title in ["Bankstown", "Liverpool", "Miller"] {
            assert!(text.contains(&format!("For {}:\nOptions:\n- High\n- Low", title)));
        }
        assert!(text.contains("- Low\n\nFor Liverpool:"));
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn matrix_with_no_rows_is_just_the_question() {
        let q = Question::matrix("26", "Shortages?", vec![]);
        assert_eq!(format_question_for_agent(Some(&q)).unwrap(), "Question: Shortages?");
    }
}

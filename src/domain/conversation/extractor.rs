//! Keyword-based extraction of respondent facts from the conversation.
//!
//! Every call rescans the whole history. Only messages sent by the user are
//! considered, and all matching is case-insensitive substring matching against
//! fixed tables.

use super::context::{title_case, ExperienceBand, StaffRole, UserContext, OTHER_TAFE_AREA};
use super::message::ConversationMessage;

/// Campuses recognised in free text, in match priority order.
pub const CAMPUSES: &[&str] = &[
    "bankstown",
    "campbelltown",
    "granville",
    "liverpool",
    "macquarie fields",
    "miller",
    "padstow",
    "wetherill park",
];

/// Phrases meaning the respondent works outside HWHS.
pub const OTHER_AREA_PHRASES: &[&str] = &["other tafe", "other area", "other nsw"];

/// HWHS program-area keywords.
pub const DELIVERY_AREAS: &[&str] = &[
    "nursing",
    "aboriginal health",
    "health",
    "dental",
    "pathology",
    "childrens services",
    "children services",
    "allied health",
    "fitness",
    "sport",
    "recreation",
    "early childhood",
    "ageing",
    "disability",
    "community services",
    "counselling",
    "mental health",
    "health services",
    "youth work",
    "alcohol",
    "drugs",
];

/// Derives a [`UserContext`] from conversation history.
pub trait ContextExtractor: Send + Sync {
    fn extract(&self, history: &[ConversationMessage]) -> UserContext;
}

/// Extractor backed by the fixed keyword tables in this module.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordContextExtractor;

impl KeywordContextExtractor {
    pub fn new() -> Self {
        Self
    }

    fn apply(&self, ctx: &mut UserContext, text: &str) {
        if ctx.campus.is_none() {
            if let Some(campus) = CAMPUSES.iter().find(|c| text.contains(*c)) {
                ctx.campus = Some(title_case(campus));
            }
        }

        if OTHER_AREA_PHRASES.iter().any(|p| text.contains(p)) {
            ctx.selected_other_tafe = true;
            ctx.is_teacher = false;
            ctx.delivery_areas.insert(OTHER_TAFE_AREA.to_string());
        } else {
            for area in DELIVERY_AREAS.iter().filter(|a| text.contains(*a)) {
                ctx.delivery_areas.insert(title_case(area));
            }
        }

        if let Some(band) = ExperienceBand::detect(text) {
            ctx.experience_years = Some(band);
        }

        if let Some(role) = StaffRole::detect(text) {
            ctx.role = Some(role);
        }
    }
}

impl ContextExtractor for KeywordContextExtractor {
    fn extract(&self, history: &[ConversationMessage]) -> UserContext {
        let mut ctx = UserContext::default();
        for msg in history.iter().filter(|m| m.is_user()) {
            self.apply(&mut ctx, &msg.message.to_lowercase());
        }
        ctx
    }
}

/// Extracts context using [`KeywordContextExtractor`].
pub fn extract_user_context(history: &[ConversationMessage]) -> UserContext {
    KeywordContextExtractor.extract(history)
}

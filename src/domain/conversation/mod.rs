//! Conversation domain module.
//!
//! Holds the message history shape shared with front-ends and the
//! extraction of respondent facts from that history.

mod context;
mod extractor;
mod message;

pub use context::{title_case, ExperienceBand, StaffRole, UserContext, OTHER_TAFE_AREA};
pub use extractor::{
    extract_user_context, ContextExtractor, KeywordContextExtractor, CAMPUSES, DELIVERY_AREAS,
    OTHER_AREA_PHRASES,
};
pub use message::{ConversationMessage, Sender};

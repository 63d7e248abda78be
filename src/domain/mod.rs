//! Domain layer containing the consultation logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (session ids, timestamps)
//! - `conversation` - Message history and respondent context extraction
//! - `survey` - Question catalog, formatting, sequencing and customization

pub mod conversation;
pub mod foundation;
pub mod survey;

//! What the consultation has learned about the respondent so far.
//!
//! A [`UserContext`] is rebuilt from the full history on every turn and never
//! persisted, so it only ever reflects what the user has actually said.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Area label recorded when the respondent says they work outside HWHS.
pub const OTHER_TAFE_AREA: &str = "Other TAFE NSW area";

/// Broad role bucket inferred from the respondent's own words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    Teacher,
    Admin,
    Support,
}

impl StaffRole {
    /// Picks a role from lowercased text; teaching keywords win over admin,
    /// admin over support.
    pub fn detect(text: &str) -> Option<Self> {
        const TEACHER: &[&str] = &["teacher", "lecturer", "instructor", "educator"];
        const ADMIN: &[&str] = &["manager", "coordinator", "administrator", "head"];
        const SUPPORT: &[&str] = &["support", "assistant", "technician"];

        let any = |words: &[&str]| words.iter().any(|w| text.contains(w));
        if any(TEACHER) {
            Some(Self::Teacher)
        } else if any(ADMIN) {
            Some(Self::Admin)
        } else if any(SUPPORT) {
            Some(Self::Support)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Teacher => "teacher",
            Self::Admin => "admin",
            Self::Support => "support",
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Years of experience at TAFE NSW, bucketed the same way the questionnaire does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExperienceBand {
    #[serde(rename = "Less than 1 year")]
    LessThanOne,
    #[serde(rename = "1-3 years")]
    OneToThree,
    #[serde(rename = "4-6 years")]
    FourToSix,
    #[serde(rename = "7-10 years")]
    SevenToTen,
    #[serde(rename = "More than 10 years")]
    MoreThanTen,
}

impl ExperienceBand {
    /// Detects a band in lowercased text. Only text mentioning "year" counts.
    pub fn detect(text: &str) -> Option<Self> {
        if !text.contains("year") {
            return None;
        }

        let has = |a: &str, b: &str| text.contains(a) || text.contains(b);
        if has("less than 1", "< 1") {
            Some(Self::LessThanOne)
        } else if has("1-3", "1 - 3") {
            Some(Self::OneToThree)
        } else if has("4-6", "4 - 6") {
            Some(Self::FourToSix)
        } else if has("7-10", "7 - 10") {
            Some(Self::SevenToTen)
        } else if has("more than 10", "> 10") {
            Some(Self::MoreThanTen)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::LessThanOne => "Less than 1 year",
            Self::OneToThree => "1-3 years",
            Self::FourToSix => "4-6 years",
            Self::SevenToTen => "7-10 years",
            Self::MoreThanTen => "More than 10 years",
        }
    }
}

impl fmt::Display for ExperienceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Facts extracted from the user's messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    /// Title-cased campus name, e.g. "Macquarie Fields".
    pub campus: Option<String>,
    /// Title-cased program areas, deduplicated.
    pub delivery_areas: BTreeSet<String>,
    pub experience_years: Option<ExperienceBand>,
    pub role: Option<StaffRole>,
    /// Cleared once the respondent says they work outside HWHS.
    pub is_teacher: bool,
    /// Reserved; nothing populates it yet.
    pub specializations: BTreeSet<String>,
    pub selected_other_tafe: bool,
}

impl Default for UserContext {
    fn default() -> Self {
        Self {
            campus: None,
            delivery_areas: BTreeSet::new(),
            experience_years: None,
            role: None,
            is_teacher: true,
            specializations: BTreeSet::new(),
            selected_other_tafe: false,
        }
    }
}

impl UserContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if nothing has been learned yet.
    pub fn is_empty(&self) -> bool {
        self.campus.is_none()
            && self.delivery_areas.is_empty()
            && self.experience_years.is_none()
            && self.role.is_none()
            && !self.selected_other_tafe
    }

    /// Human-readable lines used when briefing the agent on the respondent.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(campus) = &self.campus {
            lines.push(format!("Campus: {}", campus));
        }
        if !self.delivery_areas.is_empty() {
            let areas: Vec<&str> = self.delivery_areas.iter().map(String::as_str).collect();
            lines.push(format!("Delivery areas: {}", areas.join(", ")));
        }
        if let Some(role) = self.role {
            lines.push(format!("Role: {}", role));
        }
        if let Some(band) = self.experience_years {
            lines.push(format!("Experience at TAFE NSW: {}", band));
        }
        if self.selected_other_tafe {
            lines.push("Works in another TAFE NSW area (not HWHS)".to_string());
        }
        lines
    }
}

/// Capitalizes the first letter of every alphabetic run and lowercases the rest.
///
/// `"macquarie fields"` becomes `"Macquarie Fields"`, `"o'neil"` becomes `"O'Neil"`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    mod role {
        use super::*;

        #[test]
        fn teaching_words_map_to_teacher() {
            assert_eq!(StaffRole::detect("i'm a nursing lecturer"), Some(StaffRole::Teacher));
            assert_eq!(StaffRole::detect("head teacher"), Some(StaffRole::Teacher));
        }

        #[test]
        fn admin_beats_support() {
            assert_eq!(StaffRole::detect("support coordinator"), Some(StaffRole::Admin));
        }

        #[test]
        fn support_words() {
            assert_eq!(StaffRole::detect("lab technician"), Some(StaffRole::Support));
        }

        #[test]
        fn nothing_matches() {
            assert_eq!(StaffRole::detect("bankstown"), None);
        }
    }

    mod experience {
        use super::*;

        #[test]
        fn requires_year() {
            assert_eq!(ExperienceBand::detect("4-6"), None);
            assert_eq!(ExperienceBand::detect("4-6 years"), Some(ExperienceBand::FourToSix));
        }

        #[test]
        fn accepts_spaced_ranges() {
            assert_eq!(ExperienceBand::detect("7 - 10 years"), Some(ExperienceBand::SevenToTen));
            assert_eq!(ExperienceBand::detect("1 - 3 years"), Some(ExperienceBand::OneToThree));
        }

        #[test]
        fn bounds() {
            assert_eq!(
                ExperienceBand::detect("less than 1 year"),
                Some(ExperienceBand::LessThanOne)
            );
            assert_eq!(
                ExperienceBand::detect("more than 10 years"),
                Some(ExperienceBand::MoreThanTen)
            );
        }

        #[test]
        fn labels_serialize() {
            let json = serde_json::to_string(&ExperienceBand::FourToSix).unwrap();
            assert_eq!(json, "\"4-6 years\"");
        }
    }

    mod summary {
        use super::*;

        #[test]
        fn empty_context_has_no_lines() {
            let ctx = UserContext::new();
            assert!(ctx.is_empty());
            assert!(ctx.is_teacher);
            assert!(ctx.summary_lines().is_empty());
        }

        #[test]
        fn lists_known_facts() {
            let mut ctx = UserContext::new();
            ctx.campus = Some("Liverpool".to_string());
            ctx.delivery_areas.insert("Nursing".to_string());
            ctx.delivery_areas.insert("Dental".to_string());
            ctx.role = Some(StaffRole::Teacher);

            let lines = ctx.summary_lines();
            assert_eq!(lines[0], "Campus: Liverpool");
            assert_eq!(lines[1], "Delivery areas: Dental, Nursing");
            assert_eq!(lines[2], "Role: teacher");
            assert!(!ctx.is_empty());
        }
    }

    #[test]
    fn title_case_matches_campus_names() {
        assert_eq!(title_case("macquarie fields"), "Macquarie Fields");
        assert_eq!(title_case("wetherill park"), "Wetherill Park");
        assert_eq!(title_case("childrens services"), "Childrens Services");
        assert_eq!(title_case("o'neil"), "O'Neil");
        assert_eq!(title_case(""), "");
    }
}

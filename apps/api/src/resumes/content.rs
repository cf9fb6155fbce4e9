use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Personal-info block of a resume. Every field defaults to empty so a
/// partially filled block reads back without errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub summary: String,
}

/// The five named resume sections, each an ordered list of schema-free
/// entries (entries originate from extracted documents and manual edits,
/// so their shape is not fixed here).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sections {
    pub experience: Vec<Value>,
    pub education: Vec<Value>,
    pub skills: Vec<Value>,
    pub projects: Vec<Value>,
    pub certificates: Vec<Value>,
}

impl Sections {
    pub fn is_empty(&self) -> bool {
        self.experience.is_empty()
            && self.education.is_empty()
            && self.skills.is_empty()
            && self.projects.is_empty()
            && self.certificates.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeContent {
    pub personal: PersonalInfo,
    pub sections: Sections,
}

impl ResumeContent {
    /// The empty skeleton a freshly created resume starts from: email
    /// pre-filled from the account, everything else blank.
    pub fn skeleton(email: &str) -> Self {
        ResumeContent {
            personal: PersonalInfo {
                email: email.to_string(),
                ..PersonalInfo::default()
            },
            sections: Sections::default(),
        }
    }

    /// Reads stored content for display. Missing fields and sections get
    /// defaults; a block that fails to deserialize is salvaged piecewise
    /// rather than failing the read.
    pub fn from_stored(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_else(|_| {
            let personal = value
                .get("personal")
                .and_then(|v| serde_json::from_value(v.clone()).ok())
                .unwrap_or_default();
            let sections = value
                .get("sections")
                .and_then(|v| serde_json::from_value(v.clone()).ok())
                .unwrap_or_default();
            ResumeContent { personal, sections }
        })
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_skeleton_prefills_email_only() {
        let content = ResumeContent::skeleton("ada@example.com");
        assert_eq!(content.personal.email, "ada@example.com");
        assert_eq!(content.personal.name, "");
        assert!(content.sections.is_empty());
    }

    #[test]
    fn test_skeleton_round_trips_through_json() {
        let content = ResumeContent::skeleton("ada@example.com");
        let restored = ResumeContent::from_stored(&content.to_value());
        assert_eq!(restored, content);
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let stored = json!({
            "personal": { "email": "ada@example.com" },
            "sections": { "experience": [{"role": "engineer"}] }
        });
        let content = ResumeContent::from_stored(&stored);
        assert_eq!(content.personal.email, "ada@example.com");
        assert_eq!(content.personal.phone, "");
        assert_eq!(content.sections.experience.len(), 1);
        assert!(content.sections.education.is_empty());
    }

    #[test]
    fn test_missing_sections_block_gets_defaults() {
        let stored = json!({ "personal": { "name": "Ada" } });
        let content = ResumeContent::from_stored(&stored);
        assert_eq!(content.personal.name, "Ada");
        assert!(content.sections.is_empty());
    }

    #[test]
    fn test_malformed_block_is_salvaged_piecewise() {
        // sections is the wrong shape entirely; personal should survive.
        let stored = json!({
            "personal": { "name": "Ada", "email": "ada@example.com" },
            "sections": "corrupted"
        });
        let content = ResumeContent::from_stored(&stored);
        assert_eq!(content.personal.name, "Ada");
        assert!(content.sections.is_empty());
    }

    #[test]
    fn test_non_object_content_reads_as_empty() {
        let content = ResumeContent::from_stored(&json!(null));
        assert_eq!(content, ResumeContent::default());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let stored = json!({
            "personal": { "email": "ada@example.com", "favorite_color": "mauve" },
            "legacy_field": 42
        });
        let content = ResumeContent::from_stored(&stored);
        assert_eq!(content.personal.email, "ada@example.com");
    }
}

//! Section model — the typed, hierarchical unit every pipeline stage operates on.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fragment;

/// The structural role a section plays in a resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Header,
    Summary,
    Experience,
    JobRole,
    Education,
    Skills,
    Certifications,
    Projects,
    Other,
}

impl SectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Header => "header",
            SectionKind::Summary => "summary",
            SectionKind::Experience => "experience",
            SectionKind::JobRole => "job_role",
            SectionKind::Education => "education",
            SectionKind::Skills => "skills",
            SectionKind::Certifications => "certifications",
            SectionKind::Projects => "projects",
            SectionKind::Other => "other",
        }
    }

    /// Kinds that may appear at most once per collection.
    pub fn is_singleton(&self) -> bool {
        matches!(self, SectionKind::Header | SectionKind::Summary)
    }
}

/// One section of a resume document.
///
/// `body` is a markup fragment restricted to headings, paragraphs, emphasis,
/// and bullet lists. `parent_ref` is a weak reference by id; only `JobRole`
/// sections carry one, pointing at the `Experience` section that owns them.
/// Presentation order is never stored here — it is recomputed from kind and
/// relative position on every serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub kind: SectionKind,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_ref: Option<String>,
}

impl Section {
    /// Creates a section with a fresh opaque id.
    pub fn new(kind: SectionKind, title: impl Into<String>, body: impl Into<String>) -> Self {
        Section {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            kind,
            body: body.into(),
            parent_ref: None,
        }
    }

    /// Creates a `JobRole`-style child attached to `parent_id`.
    pub fn child_of(
        kind: SectionKind,
        title: impl Into<String>,
        body: impl Into<String>,
        parent_id: &str,
    ) -> Self {
        Section {
            parent_ref: Some(parent_id.to_string()),
            ..Section::new(kind, title, body)
        }
    }

    /// Plain text of the body with all markup stripped.
    pub fn body_text(&self) -> String {
        fragment::body_text(&self.body)
    }
}

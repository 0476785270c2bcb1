//! Section type classification — maps free-form headings to section kinds.
//!
//! Pure lookup, no logging, no fallible paths: a heading either matches the
//! canonical names table, matches a synonym substring, or lands in `Other`.
//! The synonym table is data, not code — callers can swap in their own via
//! `SectionClassifier::new`, and `EngineConfig` carries one per pipeline run.

use once_cell::sync::Lazy;

use crate::models::SectionKind;

/// Canonical kind names, matched by exact equality after normalization.
const CANONICAL_NAMES: &[(&str, SectionKind)] = &[
    ("header", SectionKind::Header),
    ("summary", SectionKind::Summary),
    ("experience", SectionKind::Experience),
    ("job role", SectionKind::JobRole),
    ("education", SectionKind::Education),
    ("skills", SectionKind::Skills),
    ("certifications", SectionKind::Certifications),
    ("projects", SectionKind::Projects),
    ("other", SectionKind::Other),
];

const SUMMARY_SYNONYMS: &[&str] = &["summary", "profile", "objective", "about me", "overview"];
const EXPERIENCE_SYNONYMS: &[&str] =
    &["experience", "employment", "work history", "career history"];
const EDUCATION_SYNONYMS: &[&str] = &["education", "academic", "degree", "qualification"];
const SKILLS_SYNONYMS: &[&str] = &["skill", "competenc", "expertise", "technologies", "tech stack"];
const CERTIFICATION_SYNONYMS: &[&str] = &[
    "certification",
    "certificate",
    "license",
    "credential",
    "accreditation",
];
const PROJECT_SYNONYMS: &[&str] = &["project", "portfolio"];

static DEFAULT_CLASSIFIER: Lazy<SectionClassifier> = Lazy::new(SectionClassifier::default);

/// Ordered heading → kind lookup. Row order is significant: the first kind
/// whose synonym list hits wins, so "Project Management Experience" lands in
/// `Experience`, not `Projects`.
#[derive(Debug, Clone)]
pub struct SectionClassifier {
    table: Vec<(SectionKind, Vec<String>)>,
}

impl Default for SectionClassifier {
    fn default() -> Self {
        let row = |kind: SectionKind, synonyms: &[&str]| {
            (kind, synonyms.iter().map(|s| s.to_string()).collect())
        };
        SectionClassifier::new(vec![
            row(SectionKind::Summary, SUMMARY_SYNONYMS),
            row(SectionKind::Experience, EXPERIENCE_SYNONYMS),
            row(SectionKind::Education, EDUCATION_SYNONYMS),
            row(SectionKind::Skills, SKILLS_SYNONYMS),
            row(SectionKind::Certifications, CERTIFICATION_SYNONYMS),
            row(SectionKind::Projects, PROJECT_SYNONYMS),
        ])
    }
}

impl SectionClassifier {
    pub fn new(table: Vec<(SectionKind, Vec<String>)>) -> Self {
        SectionClassifier { table }
    }

    /// Classifies a heading. Total and deterministic: any string, however
    /// strange, yields a kind; no match means `Other`.
    pub fn classify(&self, heading: &str) -> SectionKind {
        let normalized = normalize_heading(heading);
        if normalized.is_empty() {
            return SectionKind::Other;
        }

        for (name, kind) in CANONICAL_NAMES {
            if normalized == *name {
                return *kind;
            }
        }

        for (kind, synonyms) in &self.table {
            if synonyms.iter().any(|s| normalized.contains(s.as_str())) {
                return *kind;
            }
        }

        SectionKind::Other
    }
}

/// Classifies against the default table.
pub fn classify(heading: &str) -> SectionKind {
    DEFAULT_CLASSIFIER.classify(heading)
}

/// Trim, case-fold, collapse internal whitespace, drop one trailing colon.
pub(crate) fn normalize_heading(heading: &str) -> String {
    let lowered = heading.to_lowercase();
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .strip_suffix(':')
        .unwrap_or(&collapsed)
        .trim_end()
        .to_string()
}

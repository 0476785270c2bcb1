//! Engine configuration — the heuristic tables and thresholds the pipeline
//! stages consume. All of it is plain data with sensible defaults; callers
//! that need different synonym tables or stem lists build their own value
//! and pass it to the `_with` variants.

use crate::pipeline::classify::SectionClassifier;

/// Minimum prose length (characters) before leading content is promoted to
/// an implicit summary section.
const DEFAULT_SUMMARY_MIN_CHARS: usize = 100;

/// First words that mark a heading as a responsibility bullet rather than a
/// job title ("Directed R&D:" versus "Director of R&D"). Past and present
/// participles are listed separately so matching stays a plain word lookup.
const DEFAULT_RESPONSIBILITY_STEMS: &[&str] = &[
    "led",
    "lead",
    "leads",
    "leading",
    "managed",
    "manages",
    "managing",
    "directed",
    "directs",
    "directing",
    "established",
    "establishes",
    "establishing",
    "built",
    "builds",
    "building",
    "drove",
    "drives",
    "driving",
    "oversaw",
    "oversees",
    "overseeing",
    "spearheaded",
    "spearheading",
    "launched",
    "launching",
    "coordinated",
    "coordinating",
    "delivered",
    "delivering",
];

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub classifier: SectionClassifier,
    pub responsibility_stems: Vec<String>,
    pub summary_min_chars: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            classifier: SectionClassifier::default(),
            responsibility_stems: DEFAULT_RESPONSIBILITY_STEMS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            summary_min_chars: DEFAULT_SUMMARY_MIN_CHARS,
        }
    }
}

impl EngineConfig {
    /// True when any word of `title` is a responsibility stem.
    pub fn has_responsibility_stem(&self, title: &str) -> bool {
        title
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .any(|word| {
                let word = word.to_lowercase();
                self.responsibility_stems.iter().any(|stem| *stem == word)
            })
    }
}

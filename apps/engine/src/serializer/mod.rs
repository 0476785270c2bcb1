// Serialization surface: HTML fragment, markdown text, and the typed wire
// record. Every serializer recomputes canonical order before emitting and
// none of them can fail — unknown structure degrades, it never errors.

pub mod markdown;
pub mod markup;
pub mod record;

use crate::models::{Section, SectionKind};

/// Heading depth a section's title renders at.
pub(crate) fn heading_level(kind: SectionKind) -> u8 {
    match kind {
        SectionKind::Header => 1,
        SectionKind::JobRole => 3,
        _ => 2,
    }
}

/// Title to print for a section: its own when set, the kind's display name
/// for the kinds that have one. Headers, roles, and `Other` sections with no
/// title render without a heading line rather than inventing one.
pub(crate) fn display_title(section: &Section) -> &str {
    let title = section.title.trim();
    if !title.is_empty() {
        return title;
    }
    match section.kind {
        SectionKind::Summary => "Summary",
        SectionKind::Experience => "Experience",
        SectionKind::Education => "Education",
        SectionKind::Skills => "Skills",
        SectionKind::Certifications => "Certifications",
        SectionKind::Projects => "Projects",
        SectionKind::Header | SectionKind::JobRole | SectionKind::Other => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_title_prefers_the_sections_own() {
        let section = Section::new(SectionKind::Experience, "Work History", "");
        assert_eq!(display_title(&section), "Work History");
    }

    #[test]
    fn test_display_title_falls_back_to_kind_name() {
        let section = Section::new(SectionKind::Skills, "  ", "");
        assert_eq!(display_title(&section), "Skills");
    }

    #[test]
    fn test_untitled_header_renders_no_heading() {
        let section = Section::new(SectionKind::Header, "", "<p>jane@example.com</p>");
        assert_eq!(display_title(&section), "");
    }
}

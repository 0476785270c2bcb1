//! Markdown serialization — the editable plain-text view of a collection.

use crate::fragment::{html, markdown};
use crate::models::Section;
use crate::pipeline::order::order;
use crate::serializer::{display_title, heading_level};

/// Renders a collection as a markdown document in canonical order: `#` for
/// the header, `##` for sections, `###` for job roles. Bodies convert
/// through the shared fragment tree, so the output re-tokenizes to the same
/// structure.
pub fn to_markdown_text(sections: &[Section]) -> String {
    let ordered = order(sections.to_vec());
    let mut parts: Vec<String> = Vec::new();
    for section in &ordered {
        let mut lines: Vec<String> = Vec::new();
        let title = display_title(section);
        if !title.is_empty() {
            lines.push(format!(
                "{} {}",
                "#".repeat(heading_level(section.kind) as usize),
                title
            ));
        }
        let body = markdown::render(&html::parse(&section.body));
        let body = body.trim_end();
        if !body.is_empty() {
            lines.push(body.to_string());
        }
        if !lines.is_empty() {
            parts.push(lines.join("\n\n"));
        }
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!("{}\n", parts.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SectionKind;

    #[test]
    fn test_heading_levels_track_section_kinds() {
        let header = Section::new(SectionKind::Header, "Jane Doe", "<p>jane@example.com</p>");
        let experience = Section::new(SectionKind::Experience, "Experience", "");
        let role = Section::child_of(
            SectionKind::JobRole,
            "Senior Engineer",
            "<p>Acme Corp | 2020 - Present</p>\n<ul><li>Shipped v2</li></ul>",
            &experience.id,
        );

        let text = to_markdown_text(&[role, header, experience]);
        assert_eq!(
            text,
            "# Jane Doe\n\njane@example.com\n\n## Experience\n\n### Senior Engineer\n\nAcme Corp | 2020 - Present\n\n- Shipped v2\n"
        );
    }

    #[test]
    fn test_bold_and_breaks_survive() {
        let section = Section::new(
            SectionKind::Summary,
            "Summary",
            "<p><strong>Ten years</strong> of systems work.</p>",
        );
        let text = to_markdown_text(&[section]);
        assert_eq!(text, "## Summary\n\n**Ten years** of systems work.\n");
    }

    #[test]
    fn test_folded_subheadings_render_as_h3() {
        let section = Section::new(
            SectionKind::Skills,
            "Skills",
            "<h3>Languages</h3>\n<ul><li>Python</li></ul>",
        );
        let text = to_markdown_text(&[section]);
        assert_eq!(text, "## Skills\n\n### Languages\n\n- Python\n");
    }

    #[test]
    fn test_empty_collection_renders_empty() {
        assert_eq!(to_markdown_text(&[]), "");
    }
}

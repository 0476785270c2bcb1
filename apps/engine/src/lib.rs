//! Resume document reconciliation engine.
//!
//! Turns free-form resume markup or markdown into an ordered collection of
//! typed [`Section`]s, repairs the structural damage generated documents
//! routinely carry (duplicate ids, orphaned roles, bullets promoted to
//! headings, duplicate headers), and serializes the collection back out as
//! markup, markdown, or the [`ResumeRecord`] wire shape.
//!
//! Every entry point is total: content that defies classification degrades
//! to [`SectionKind::Other`] and stays in the document, never an error.

pub mod config;
pub mod edit;
pub mod errors;
pub mod fragment;
pub mod models;
pub mod pipeline;
pub mod serializer;

pub use config::EngineConfig;
pub use edit::{add_section, merge_sections, move_section, replace_body};
pub use errors::{Anomaly, RecordError};
pub use models::{
    CertificationRecord, EducationRecord, ExperienceRecord, HeaderRecord, ResumeRecord, Section,
    SectionKind, Skills,
};
pub use pipeline::assemble::{assemble, assemble_with};
pub use pipeline::classify::{classify, SectionClassifier};
pub use pipeline::order::order;
pub use pipeline::reconcile::{reconcile, reconcile_with};
pub use pipeline::tokenize::{tokenize_markdown, tokenize_markup, Block};
pub use serializer::markdown::to_markdown_text;
pub use serializer::markup::to_markup;
pub use serializer::record::{
    from_record, record_to_json, sections_from_json, to_record, try_record_from_json,
};

use tracing::debug;

/// Parses an HTML document or fragment into a reconciled, canonically
/// ordered section collection.
pub fn from_markup(markup: &str) -> Vec<Section> {
    from_markup_with(markup, &EngineConfig::default())
}

/// [`from_markup`] with explicit configuration.
pub fn from_markup_with(markup: &str, config: &EngineConfig) -> Vec<Section> {
    let blocks = tokenize_markup(markup);
    let sections = assemble_with(&blocks, config);
    order(reconcile_with(sections, config))
}

/// Parses markdown text into a reconciled, canonically ordered section
/// collection.
pub fn from_markdown_text(text: &str) -> Vec<Section> {
    from_markdown_text_with(text, &EngineConfig::default())
}

/// [`from_markdown_text`] with explicit configuration.
pub fn from_markdown_text_with(text: &str, config: &EngineConfig) -> Vec<Section> {
    let blocks = tokenize_markdown(text);
    let sections = assemble_with(&blocks, config);
    order(reconcile_with(sections, config))
}

/// Parses raw generator output, tolerating the code fences models like to
/// wrap whole documents in.
pub fn from_model_output(raw: &str) -> Vec<Section> {
    from_model_output_with(raw, &EngineConfig::default())
}

/// [`from_model_output`] with explicit configuration.
pub fn from_model_output_with(raw: &str, config: &EngineConfig) -> Vec<Section> {
    from_markdown_text_with(strip_markdown_fences(raw), config)
}

/// Strips a ```` ```markdown ```` or bare ```` ``` ```` fence wrapped around
/// the whole document. Unfenced input passes through byte-identical.
fn strip_markdown_fences(raw: &str) -> &str {
    let text = raw.trim();
    let body = if let Some(stripped) = text.strip_prefix("```markdown") {
        stripped
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
    } else {
        return raw;
    };
    debug!("stripped code fence from model output");
    body.trim_start()
        .strip_suffix("```")
        .map(|inner| inner.trim())
        .unwrap_or(body.trim_start())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Id-free view of a collection, for comparing pipeline outputs.
    fn shape(sections: &[Section]) -> Vec<(SectionKind, String, String)> {
        sections
            .iter()
            .map(|section| (section.kind, section.title.clone(), section.body.clone()))
            .collect()
    }

    #[test]
    fn test_from_markdown_text_runs_the_full_pipeline() {
        let sections = from_markdown_text("# Jane Doe\n\njane@example.com\n\n## Skills\n\n- Rust\n");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].kind, SectionKind::Header);
        assert_eq!(sections[0].title, "Jane Doe");
        assert_eq!(sections[1].kind, SectionKind::Skills);
        assert_eq!(sections[1].body, "<ul><li>Rust</li></ul>");
    }

    #[test]
    fn test_from_markup_agrees_with_the_markdown_front_end() {
        let from_html = from_markup(
            "<h1>Jane Doe</h1><p>jane@example.com</p><h2>Skills</h2><ul><li>Rust</li></ul>",
        );
        let from_md = from_markdown_text("# Jane Doe\n\njane@example.com\n\n## Skills\n\n- Rust\n");
        assert_eq!(shape(&from_html), shape(&from_md));
    }

    #[test]
    fn test_entry_points_reconcile_and_order() {
        let sections = from_markdown_text(
            "## Education\n\nState University\n\n## Experience\n\n### Engineer\n\nAcme Corp | 2020 - Present\n",
        );
        let kinds: Vec<SectionKind> = sections.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SectionKind::Experience,
                SectionKind::JobRole,
                SectionKind::Education,
            ],
            "experience and its role come before education"
        );
        assert_eq!(
            sections[1].parent_ref.as_deref(),
            Some(sections[0].id.as_str())
        );
    }

    #[test]
    fn test_from_model_output_strips_fences() {
        let fenced = "```markdown\n# Jane Doe\n\njane@example.com\n\n## Skills\n\n- Rust\n```";
        let plain = "# Jane Doe\n\njane@example.com\n\n## Skills\n\n- Rust\n";
        assert_eq!(shape(&from_model_output(fenced)), shape(&from_markdown_text(plain)));
    }

    #[test]
    fn test_from_model_output_passes_unfenced_input_through() {
        let plain = "# Jane Doe\n\njane@example.com\n";
        assert_eq!(shape(&from_model_output(plain)), shape(&from_markdown_text(plain)));
    }

    #[test]
    fn test_strip_markdown_fences_variants() {
        assert_eq!(strip_markdown_fences("```markdown\n# Hi\n```"), "# Hi");
        assert_eq!(strip_markdown_fences("```\n# Hi\n```"), "# Hi");
        assert_eq!(
            strip_markdown_fences("```markdown\n# Hi\n"),
            "# Hi",
            "an unterminated fence still sheds its opener"
        );
        let unfenced = "# Hi\n\nSome ``` in prose.\n";
        assert_eq!(strip_markdown_fences(unfenced), unfenced, "no fence, no change");
    }
}

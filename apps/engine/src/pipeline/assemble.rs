//! Structural assembler — folds level-normalized blocks into typed sections.
//!
//! The assembler walks the block stream once and decides, per block, whether
//! it opens a new section, nests under the current one, or belongs to the
//! document header. Heading text drives classification; a handful of content
//! heuristics (contact lines, substantial prose) split the document title
//! area from an implicit summary. The walk is total: every block lands in
//! some section, worst case `Other`.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::config::EngineConfig;
use crate::errors::Anomaly;
use crate::fragment::{self, html, BlockNode, Inline};
use crate::models::{Section, SectionKind};
use crate::pipeline::tokenize::Block;

/// Matches an email address anywhere in a line.
pub(crate) static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

/// Matches phone-like digit runs, separators included.
pub(crate) static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+?\d[\d\s().\-]{6,}\d").unwrap());

/// Matches URLs and the profile hosts that show up in resume headers.
pub(crate) static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:https?://|www\.|linkedin\.com/|github\.com/)").unwrap());

/// Assembles blocks into sections using the default configuration.
pub fn assemble(blocks: &[Block]) -> Vec<Section> {
    assemble_with(blocks, &EngineConfig::default())
}

/// Assembles blocks into sections with explicit configuration.
pub fn assemble_with(blocks: &[Block], config: &EngineConfig) -> Vec<Section> {
    // A single implicit block means the document had no headings at all; it
    // becomes one header section and no summary gets mined out of it.
    let whole_document = blocks.len() == 1 && blocks[0].level == 0 && blocks[0].heading.is_empty();

    let mut assembler = Assembler::new(config);
    for block in blocks {
        match block.level {
            0 => assembler.level_zero(block, whole_document),
            1 | 2 => assembler.titled(block),
            _ => assembler.nested(block),
        }
    }
    assembler.finish()
}

struct Assembler<'a> {
    config: &'a EngineConfig,
    sections: Vec<Section>,
    /// Fold target for nested blocks: the last section opened by a heading.
    /// Job roles never take this slot, so consecutive `###` headings under
    /// one experience become sibling roles rather than nesting into each
    /// other.
    current: Option<usize>,
    has_header: bool,
}

impl<'a> Assembler<'a> {
    fn new(config: &'a EngineConfig) -> Self {
        Assembler {
            config,
            sections: Vec::new(),
            current: None,
            has_header: false,
        }
    }

    fn finish(self) -> Vec<Section> {
        self.sections
    }

    /// Document-title block: either the leading top-level heading or the
    /// implicit preamble before the first heading.
    fn level_zero(&mut self, block: &Block, whole_document: bool) {
        if !block.heading.is_empty() {
            let kind = self.config.classifier.classify(&block.heading);
            if kind != SectionKind::Other {
                // A document opening with `# Summary` is that section, not a
                // person's name.
                self.titled(block);
                return;
            }
            let (header, summary) = split_summary(html::parse(&block.content), self.config);
            let index = self.push(Section::new(
                SectionKind::Header,
                block.heading.as_str(),
                html::render(&header),
            ));
            self.current = Some(index);
            self.push_implicit_summary(summary);
            return;
        }

        if whole_document {
            let mut nodes = html::parse(&block.content);
            let title = extract_title(&mut nodes);
            let index = self.push(Section::new(
                SectionKind::Header,
                title,
                html::render(&nodes),
            ));
            self.current = Some(index);
            return;
        }

        let (mut header, summary) = split_summary(html::parse(&block.content), self.config);
        if !header.is_empty() {
            let title = extract_title(&mut header);
            let index = self.push(Section::new(
                SectionKind::Header,
                title,
                html::render(&header),
            ));
            self.current = Some(index);
        }
        self.push_implicit_summary(summary);
    }

    /// Section-opening block (levels 1 and 2).
    fn titled(&mut self, block: &Block) {
        let kind = self.config.classifier.classify(&block.heading);
        match kind {
            SectionKind::Other if block.level <= 1 && !self.has_header => {
                // An unrecognized top-level heading in a document that has no
                // header yet is read as the person's name.
                let index = self.push(Section::new(
                    SectionKind::Header,
                    block.heading.as_str(),
                    block.content.as_str(),
                ));
                self.current = Some(index);
            }
            SectionKind::Other => {
                debug!(
                    "{}",
                    Anomaly::ClassificationAmbiguous {
                        heading: block.heading.clone(),
                    }
                );
                let index = self.push(Section::new(
                    SectionKind::Other,
                    block.heading.as_str(),
                    block.content.as_str(),
                ));
                self.current = Some(index);
            }
            SectionKind::JobRole => {
                let section = match self.experience_parent() {
                    Some(parent) => Section::child_of(
                        SectionKind::JobRole,
                        block.heading.as_str(),
                        block.content.as_str(),
                        &parent,
                    ),
                    // Orphan; reconciliation reattaches or promotes it.
                    None => Section::new(
                        SectionKind::JobRole,
                        block.heading.as_str(),
                        block.content.as_str(),
                    ),
                };
                let index = self.push(section);
                self.current = Some(index);
            }
            _ => {
                let index = self.push(Section::new(
                    kind,
                    block.heading.as_str(),
                    block.content.as_str(),
                ));
                self.current = Some(index);
            }
        }
    }

    /// Nested block (level 3): a job role under an experience section, extra
    /// detail folded into whatever other section is open, or a stand-alone
    /// section when nothing is open yet.
    fn nested(&mut self, block: &Block) {
        match self.current {
            Some(index) if self.sections[index].kind == SectionKind::Experience => {
                let parent = self.sections[index].id.clone();
                self.sections.push(Section::child_of(
                    SectionKind::JobRole,
                    block.heading.as_str(),
                    block.content.as_str(),
                    &parent,
                ));
            }
            Some(index) => self.fold_into(index, block),
            None => {
                let kind = self.config.classifier.classify(&block.heading);
                if kind == SectionKind::Other && !block.heading.is_empty() {
                    debug!(
                        "{}",
                        Anomaly::ClassificationAmbiguous {
                            heading: block.heading.clone(),
                        }
                    );
                }
                let index = self.push(Section::new(
                    kind,
                    block.heading.as_str(),
                    block.content.as_str(),
                ));
                self.current = Some(index);
            }
        }
    }

    /// Appends a nested block to an open section's body as a sub-heading
    /// plus its content.
    fn fold_into(&mut self, index: usize, block: &Block) {
        let mut addition = String::new();
        if !block.heading.is_empty() {
            addition.push_str(&html::render(&[BlockNode::heading(
                3,
                block.heading.as_str(),
            )]));
        }
        if !block.content.is_empty() {
            if !addition.is_empty() {
                addition.push('\n');
            }
            addition.push_str(&block.content);
        }
        if addition.is_empty() {
            return;
        }
        let body = &mut self.sections[index].body;
        if body.is_empty() {
            *body = addition;
        } else {
            body.push('\n');
            body.push_str(&addition);
        }
    }

    fn push(&mut self, section: Section) -> usize {
        if section.kind == SectionKind::Header {
            self.has_header = true;
        }
        let index = self.sections.len();
        self.sections.push(section);
        index
    }

    fn push_implicit_summary(&mut self, nodes: Vec<BlockNode>) {
        if nodes.is_empty() {
            return;
        }
        let index = self.push(Section::new(
            SectionKind::Summary,
            "Summary",
            html::render(&nodes),
        ));
        self.current = Some(index);
    }

    /// Id of the experience section that nested roles should attach to, if
    /// the currently open section is one.
    fn experience_parent(&self) -> Option<String> {
        match self.current {
            Some(index) if self.sections[index].kind == SectionKind::Experience => {
                Some(self.sections[index].id.clone())
            }
            _ => None,
        }
    }
}

/// Splits title-area content at the first substantial prose paragraph:
/// everything before it (names, contact lines) stays with the header, the
/// prose and whatever follows becomes summary material.
fn split_summary(
    nodes: Vec<BlockNode>,
    config: &EngineConfig,
) -> (Vec<BlockNode>, Vec<BlockNode>) {
    let split = nodes.iter().position(|node| match node {
        BlockNode::Paragraph(inlines) => {
            is_substantial_prose(&fragment::inline_text(inlines), config)
        }
        _ => false,
    });
    match split {
        Some(index) => {
            let mut header = nodes;
            let summary = header.split_off(index);
            (header, summary)
        }
        None => (nodes, Vec::new()),
    }
}

fn is_substantial_prose(text: &str, config: &EngineConfig) -> bool {
    let text = text.trim();
    text.chars().count() >= config.summary_min_chars && !looks_like_contact(text)
}

/// Contact-ish lines: emails, phone numbers, URLs, or `|`-separated runs.
pub(crate) fn looks_like_contact(text: &str) -> bool {
    text.contains('|')
        || EMAIL_RE.is_match(text)
        || URL_RE.is_match(text)
        || PHONE_RE.is_match(text)
}

/// Pulls a title out of an implicit header: the first line of its first
/// paragraph. The consumed line is removed from the body nodes.
fn extract_title(nodes: &mut Vec<BlockNode>) -> String {
    match nodes.first() {
        Some(BlockNode::Paragraph(_)) => {}
        _ => return String::new(),
    }
    let mut inlines = match nodes.remove(0) {
        BlockNode::Paragraph(inlines) => inlines,
        other => {
            nodes.insert(0, other);
            return String::new();
        }
    };
    match inlines
        .iter()
        .position(|inline| matches!(inline, Inline::Break))
    {
        Some(index) => {
            let mut rest = inlines.split_off(index);
            rest.remove(0);
            fragment::trim_edges(&mut rest);
            let title = fragment::inline_text(&inlines).trim().to_string();
            if !rest.is_empty() {
                nodes.insert(0, BlockNode::Paragraph(rest));
            }
            title
        }
        None => fragment::inline_text(&inlines).trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tokenize::tokenize_markdown;

    const LONG_PROSE: &str = "Seasoned platform engineer with a decade of experience \
         scaling distributed systems and leading cross-functional delivery teams.";

    fn assembled(markdown: &str) -> Vec<Section> {
        assemble(&tokenize_markdown(markdown))
    }

    #[test]
    fn test_leading_heading_becomes_header() {
        let sections = assembled("# Jane Doe\n\njane@example.com | 555-0100\n\n## Experience\n\nAcme Corp.\n");
        assert_eq!(sections[0].kind, SectionKind::Header);
        assert_eq!(sections[0].title, "Jane Doe");
        assert!(sections[0].body.contains("jane@example.com"));
        assert_eq!(sections[1].kind, SectionKind::Experience);
    }

    #[test]
    fn test_long_prose_under_title_is_mined_as_summary() {
        let input = format!("# Jane Doe\n\njane@example.com\n\n{LONG_PROSE}\n\n## Experience\n");
        let sections = assembled(&input);
        assert_eq!(sections[0].kind, SectionKind::Header);
        assert!(!sections[0].body.contains("Seasoned"));
        assert_eq!(sections[1].kind, SectionKind::Summary);
        assert!(sections[1].body.contains("Seasoned platform engineer"));
        assert_eq!(sections[2].kind, SectionKind::Experience);
    }

    #[test]
    fn test_short_prose_stays_in_header() {
        let sections = assembled("# Jane Doe\n\nEngineer in Berlin.\n\n## Skills\n");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].kind, SectionKind::Header);
        assert!(sections[0].body.contains("Engineer in Berlin."));
        assert_eq!(sections[1].kind, SectionKind::Skills);
    }

    #[test]
    fn test_contact_heavy_line_is_never_mined_as_summary() {
        let contact = "jane@example.com | 555-0100 | linkedin.com/in/janedoe | Berlin, Germany | open to relocation anywhere";
        assert!(contact.chars().count() >= 100, "fixture must clear the prose length gate");
        let input = format!("# Jane Doe\n\n{contact}\n\n## Skills\n");
        let sections = assembled(&input);
        assert_eq!(sections[0].kind, SectionKind::Header);
        assert!(sections[0].body.contains("linkedin.com"));
        assert_eq!(sections[1].kind, SectionKind::Skills);
    }

    #[test]
    fn test_document_without_headings_is_one_header() {
        let input = format!("Jane Doe\njane@example.com\n\n{LONG_PROSE}\n");
        let sections = assembled(&input);
        assert_eq!(sections.len(), 1, "headingless document folds into a single header");
        assert_eq!(sections[0].kind, SectionKind::Header);
        assert_eq!(sections[0].title, "Jane Doe");
        assert!(sections[0].body.contains("jane@example.com"));
        assert!(sections[0].body.contains("Seasoned platform engineer"));
    }

    #[test]
    fn test_classified_leading_heading_is_not_a_header() {
        let sections = assembled("# Summary\n\nSeasoned engineer.\n");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].kind, SectionKind::Summary);
        assert_eq!(sections[0].title, "Summary");
    }

    #[test]
    fn test_preamble_prose_becomes_summary_then_title_becomes_header() {
        let input = format!("{LONG_PROSE}\n\n# Jane Doe\n\njane@example.com\n");
        let sections = assembled(&input);
        assert_eq!(sections[0].kind, SectionKind::Summary);
        assert_eq!(sections[1].kind, SectionKind::Header);
        assert_eq!(sections[1].title, "Jane Doe");
    }

    #[test]
    fn test_second_name_heading_degrades_to_other() {
        let input = "# Jane Doe\n\njane@example.com\n\n# John Smith\n\njohn@example.com\n";
        let sections = assembled(input);
        assert_eq!(sections[0].kind, SectionKind::Header);
        assert_eq!(sections[1].kind, SectionKind::Other);
        assert_eq!(sections[1].title, "John Smith");
    }

    #[test]
    fn test_synonym_headings_classify() {
        let input = "# Jane Doe\n\n## Work History\n\nAcme.\n\n## Academic Background\n\nMIT.\n\n## Technical Skills\n\n- Rust\n";
        let kinds: Vec<SectionKind> = assembled(input).iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SectionKind::Header,
                SectionKind::Experience,
                SectionKind::Education,
                SectionKind::Skills,
            ]
        );
    }

    #[test]
    fn test_unrecognized_heading_keeps_title_as_other() {
        let sections = assembled("# Jane Doe\n\n## Volunteering\n\nFood bank.\n");
        assert_eq!(sections[1].kind, SectionKind::Other);
        assert_eq!(sections[1].title, "Volunteering");
        assert!(sections[1].body.contains("Food bank."));
    }

    #[test]
    fn test_nested_headings_under_experience_become_job_roles() {
        let input = "## Experience\n\nTen years in industry.\n\n### Senior Engineer\n\nAcme Corp | 2020 - Present\n\n- Shipped v2\n\n### Engineer\n\nInitech | 2016 - 2020\n";
        let sections = assembled(input);
        assert_eq!(sections[0].kind, SectionKind::Experience);
        assert_eq!(sections[1].kind, SectionKind::JobRole);
        assert_eq!(sections[2].kind, SectionKind::JobRole);
        assert_eq!(sections[1].parent_ref.as_deref(), Some(sections[0].id.as_str()));
        assert_eq!(
            sections[2].parent_ref.as_deref(),
            Some(sections[0].id.as_str()),
            "sibling roles attach to the same experience"
        );
        assert!(sections[0].body.contains("Ten years in industry."));
        assert!(!sections[0].body.contains("Acme Corp"));
    }

    #[test]
    fn test_roles_attach_to_nearest_experience() {
        let input = "## Experience\n\n### Engineer\n\nAcme.\n\n## Employment History\n\n### Analyst\n\nInitech.\n";
        let sections = assembled(input);
        assert_eq!(sections[1].parent_ref.as_deref(), Some(sections[0].id.as_str()));
        assert_eq!(sections[3].parent_ref.as_deref(), Some(sections[2].id.as_str()));
    }

    #[test]
    fn test_nested_heading_outside_experience_folds_into_body() {
        let sections = assembled("## Skills\n\n### Languages\n\n- Python\n- SQL\n");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].kind, SectionKind::Skills);
        assert!(sections[0].body.contains("<h3>Languages</h3>"));
        assert!(sections[0].body.contains("<li>Python</li>"));
    }

    #[test]
    fn test_nested_heading_opening_document_stands_alone() {
        let sections = assembled("### Skills\n\n- Python\n");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].kind, SectionKind::Skills);
        assert!(sections[0].body.contains("<li>Python</li>"));
    }

    #[test]
    fn test_explicit_job_role_heading_binds_to_open_experience() {
        let sections = assembled("## Experience\n\n## Job Role\n\nSenior Engineer at Acme.\n");
        assert_eq!(sections[1].kind, SectionKind::JobRole);
        assert_eq!(sections[1].parent_ref.as_deref(), Some(sections[0].id.as_str()));
    }

    #[test]
    fn test_explicit_job_role_without_experience_is_orphaned() {
        let sections = assembled("## Job Role\n\nSenior Engineer at Acme.\n");
        assert_eq!(sections[0].kind, SectionKind::JobRole);
        assert!(sections[0].parent_ref.is_none());
    }

    #[test]
    fn test_empty_input_assembles_to_nothing() {
        assert!(assemble(&[]).is_empty());
    }

    #[test]
    fn test_contact_detection() {
        assert!(looks_like_contact("jane@example.com"));
        assert!(looks_like_contact("+1 (555) 010-0100"));
        assert!(looks_like_contact("www.janedoe.dev"));
        assert!(looks_like_contact("Berlin | Germany"));
        assert!(!looks_like_contact("Led a team of twelve engineers."));
    }

    #[test]
    fn test_extract_title_takes_first_line_only() {
        let mut nodes = vec![BlockNode::Paragraph(vec![
            Inline::Text("Jane Doe".to_string()),
            Inline::Break,
            Inline::Text("jane@example.com".to_string()),
        ])];
        let title = extract_title(&mut nodes);
        assert_eq!(title, "Jane Doe");
        assert_eq!(
            nodes,
            vec![BlockNode::paragraph("jane@example.com")],
            "remaining lines stay in the body"
        );
    }
}

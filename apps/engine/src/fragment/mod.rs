//! Markup fragment tree shared by every stage that touches section bodies.
//!
//! Bodies are stored as HTML fragment strings restricted to a small
//! vocabulary: headings, paragraphs, emphasis, and bullet lists. Both the
//! HTML and markdown front-ends parse into this tree, and body surgery
//! (bullet merges, summary extraction) goes parse → operate → re-render so
//! no stage ever string-munges markup directly.

pub mod html;
pub mod markdown;

/// Block-level node of a fragment. Heading levels are the raw 1–6 range;
/// ordered lists degrade to bullet lists on parse.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockNode {
    Heading { level: u8, inlines: Vec<Inline> },
    Paragraph(Vec<Inline>),
    BulletList(Vec<Vec<Inline>>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    Strong(Vec<Inline>),
    Emph(Vec<Inline>),
    Break,
}

impl BlockNode {
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        BlockNode::Heading {
            level,
            inlines: vec![Inline::Text(text.into())],
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        BlockNode::Paragraph(vec![Inline::Text(text.into())])
    }

    pub fn bullet_list<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        BlockNode::BulletList(
            items
                .into_iter()
                .map(|item| vec![Inline::Text(item.into())])
                .collect(),
        )
    }
}

/// Flattens inline content to plain text. Explicit breaks become newlines so
/// contact blocks like `email<br>phone` keep their line structure.
pub fn inline_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(text) => out.push_str(text),
            Inline::Strong(children) | Inline::Emph(children) => {
                out.push_str(&inline_text(children))
            }
            Inline::Break => out.push('\n'),
        }
    }
    out
}

/// Plain text of a whole fragment, one line per paragraph/heading/list item.
pub fn plain_text(nodes: &[BlockNode]) -> String {
    let mut lines: Vec<String> = Vec::new();
    for node in nodes {
        match node {
            BlockNode::Heading { inlines, .. } | BlockNode::Paragraph(inlines) => {
                lines.push(inline_text(inlines))
            }
            BlockNode::BulletList(items) => {
                lines.extend(items.iter().map(|item| inline_text(item)))
            }
        }
    }
    lines.join("\n")
}

/// Merges adjacent text runs so parses are canonical regardless of how the
/// source split its text nodes.
pub(crate) fn coalesce_text(inlines: Vec<Inline>) -> Vec<Inline> {
    let mut out: Vec<Inline> = Vec::with_capacity(inlines.len());
    for inline in inlines {
        match inline {
            Inline::Text(text) => {
                let extend = matches!(out.last(), Some(Inline::Text(_)));
                if extend {
                    if let Some(Inline::Text(last)) = out.last_mut() {
                        last.push_str(&text);
                    }
                } else {
                    out.push(Inline::Text(text));
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Strips leading/trailing whitespace from the edges of an inline run.
pub(crate) fn trim_edges(inlines: &mut Vec<Inline>) {
    if let Some(Inline::Text(text)) = inlines.first_mut() {
        *text = text.trim_start().to_string();
        if text.is_empty() {
            inlines.remove(0);
        }
    }
    if let Some(Inline::Text(text)) = inlines.last_mut() {
        *text = text.trim_end().to_string();
        if text.is_empty() {
            inlines.pop();
        }
    }
}

/// Pushes a single separating space unless the run already ends in one.
pub(crate) fn push_separator(out: &mut Vec<Inline>) {
    match out.last() {
        None | Some(Inline::Break) => {}
        Some(Inline::Text(text)) if text.ends_with(' ') => {}
        _ => out.push(Inline::Text(" ".to_string())),
    }
}

// ── Body-string helpers ─────────────────────────────────────────────────────
// Sections store bodies as HTML fragment strings; these wrap the
// parse → operate → render cycle. All of them tolerate arbitrary input.

/// Tag-stripped plain text of an HTML body fragment.
pub fn body_text(body: &str) -> String {
    plain_text(&html::parse(body))
}

/// Text of the first paragraph in the body, if any. Headings don't count.
pub fn first_paragraph_text(body: &str) -> Option<String> {
    html::parse(body).into_iter().find_map(|node| match node {
        BlockNode::Paragraph(inlines) => Some(inline_text(&inlines).trim().to_string()),
        _ => None,
    })
}

/// Plain-text items of every bullet list in the body, in document order.
pub fn list_items(body: &str) -> Vec<String> {
    html::parse(body)
        .iter()
        .flat_map(|node| match node {
            BlockNode::BulletList(items) => {
                items.iter().map(|item| inline_text(item)).collect::<Vec<_>>()
            }
            _ => Vec::new(),
        })
        .collect()
}

/// Appends one item to the body's last bullet list. With no list present, a
/// new single-item list is inserted right after the first paragraph (or at
/// the end when the body has no paragraph).
pub fn append_list_item(body: &str, item: &str) -> String {
    let mut blocks = html::parse(body);
    let last_list = blocks
        .iter()
        .rposition(|node| matches!(node, BlockNode::BulletList(_)));

    match last_list {
        Some(index) => {
            if let BlockNode::BulletList(items) = &mut blocks[index] {
                items.push(vec![Inline::Text(item.to_string())]);
            }
        }
        None => {
            let at = blocks
                .iter()
                .position(|node| matches!(node, BlockNode::Paragraph(_)))
                .map(|index| index + 1)
                .unwrap_or(blocks.len());
            blocks.insert(at, BlockNode::bullet_list([item]));
        }
    }
    html::render(&blocks)
}

//! HTML fragment parsing and rendering.
//!
//! Parsing runs the real html5ever tree builder, so hand-edited rich text
//! with unclosed tags, stray divs, or entity soup still walks. Everything
//! outside the allowed vocabulary is flattened to its text content rather
//! than dropped.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use super::{coalesce_text, push_separator, trim_edges, BlockNode, Inline};

/// Tags treated as inline content when they appear between blocks.
const INLINE_TAGS: &[&str] = &["strong", "b", "em", "i", "span", "a", "code", "u", "small"];

/// Parses an HTML fragment into block nodes. Never fails; unparsable or
/// unknown markup degrades to flattened text.
pub fn parse(markup: &str) -> Vec<BlockNode> {
    if markup.trim().is_empty() {
        return Vec::new();
    }

    let dom = parse_document(RcDom::default(), Default::default()).one(markup);

    let mut blocks = Vec::new();
    let mut loose: Vec<Inline> = Vec::new();
    if let Some(body) = find_element(&dom.document, "body") {
        collect_blocks(&body, &mut blocks, &mut loose);
    }
    flush_loose(&mut blocks, &mut loose);
    blocks
}

/// Renders block nodes back to a canonical HTML fragment, one block per line.
pub fn render(nodes: &[BlockNode]) -> String {
    let mut out = String::new();
    for (index, node) in nodes.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        match node {
            BlockNode::Heading { level, inlines } => {
                let level = (*level).clamp(1, 6);
                out.push_str(&format!("<h{level}>"));
                render_inlines(inlines, &mut out);
                out.push_str(&format!("</h{level}>"));
            }
            BlockNode::Paragraph(inlines) => {
                out.push_str("<p>");
                render_inlines(inlines, &mut out);
                out.push_str("</p>");
            }
            BlockNode::BulletList(items) => {
                out.push_str("<ul>");
                for item in items {
                    out.push_str("<li>");
                    render_inlines(item, &mut out);
                    out.push_str("</li>");
                }
                out.push_str("</ul>");
            }
        }
    }
    out
}

fn render_inlines(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(text) => out.push_str(&escape(text)),
            Inline::Strong(children) => {
                out.push_str("<strong>");
                render_inlines(children, out);
                out.push_str("</strong>");
            }
            Inline::Emph(children) => {
                out.push_str("<em>");
                render_inlines(children, out);
                out.push_str("</em>");
            }
            Inline::Break => out.push_str("<br>"),
        }
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

// ── DOM walking ─────────────────────────────────────────────────────────────

fn find_element(node: &Handle, tag: &str) -> Option<Handle> {
    for child in node.children.borrow().iter() {
        if element_tag(child).is_some_and(|name| name == tag) {
            return Some(child.clone());
        }
        if let Some(found) = find_element(child, tag) {
            return Some(found);
        }
    }
    None
}

fn element_tag(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref().to_string()),
        _ => None,
    }
}

fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Walks block-level children, accumulating loose inline runs (bare text,
/// stray emphasis between blocks) so they surface as paragraphs instead of
/// being lost.
fn collect_blocks(node: &Handle, blocks: &mut Vec<BlockNode>, loose: &mut Vec<Inline>) {
    for child in node.children.borrow().iter() {
        match &child.data {
            NodeData::Text { contents } => {
                let text = contents.borrow().to_string();
                if text.trim().is_empty() {
                    if !loose.is_empty() {
                        push_separator(loose);
                    }
                } else {
                    loose.push(Inline::Text(collapse_whitespace(&text)));
                }
            }
            NodeData::Element { name, .. } => {
                let tag = name.local.as_ref();
                if let Some(level) = heading_level(tag) {
                    flush_loose(blocks, loose);
                    blocks.push(BlockNode::Heading {
                        level,
                        inlines: collect_inlines(child),
                    });
                } else if tag == "p" {
                    flush_loose(blocks, loose);
                    blocks.push(BlockNode::Paragraph(collect_inlines(child)));
                } else if tag == "ul" || tag == "ol" {
                    flush_loose(blocks, loose);
                    blocks.push(BlockNode::BulletList(collect_list_items(child)));
                } else if tag == "br" {
                    loose.push(Inline::Break);
                } else if tag == "pre" {
                    flush_loose(blocks, loose);
                    let literal = raw_text(child);
                    if !literal.trim().is_empty() {
                        blocks.push(BlockNode::Paragraph(vec![Inline::Text(
                            literal.trim_end().to_string(),
                        )]));
                    }
                } else if INLINE_TAGS.contains(&tag) {
                    collect_inline_node(child, loose);
                } else {
                    // div, section, table cells, anything else: transparent container
                    collect_blocks(child, blocks, loose);
                }
            }
            _ => {}
        }
    }
}

fn collect_list_items(list: &Handle) -> Vec<Vec<Inline>> {
    let mut items = Vec::new();
    for child in list.children.borrow().iter() {
        if element_tag(child).as_deref() == Some("li") {
            let inlines = collect_inlines(child);
            if !inlines.is_empty() {
                items.push(inlines);
            }
        }
    }
    items
}

fn collect_inlines(node: &Handle) -> Vec<Inline> {
    let mut out = Vec::new();
    for child in node.children.borrow().iter() {
        collect_inline_node(child, &mut out);
    }
    let mut out = coalesce_text(out);
    trim_edges(&mut out);
    out
}

fn collect_inline_node(node: &Handle, out: &mut Vec<Inline>) {
    match &node.data {
        NodeData::Text { contents } => {
            let text = collapse_whitespace(&contents.borrow());
            if !text.is_empty() {
                out.push(Inline::Text(text));
            }
        }
        NodeData::Element { name, .. } => match name.local.as_ref() {
            "strong" | "b" => out.push(Inline::Strong(collect_inlines(node))),
            "em" | "i" => out.push(Inline::Emph(collect_inlines(node))),
            "br" => out.push(Inline::Break),
            "code" => {
                let literal = raw_text(node);
                if !literal.is_empty() {
                    out.push(Inline::Text(literal));
                }
            }
            "a" | "span" | "u" | "small" => {
                // Transparent: link and styling wrappers contribute only text.
                for child in node.children.borrow().iter() {
                    collect_inline_node(child, out);
                }
            }
            _ => {
                // Nested blocks inside a list item (or any unknown element)
                // flatten into the inline run with a separating space.
                push_separator(out);
                for child in node.children.borrow().iter() {
                    collect_inline_node(child, out);
                }
            }
        },
        _ => {}
    }
}

fn flush_loose(blocks: &mut Vec<BlockNode>, loose: &mut Vec<Inline>) {
    let mut run = coalesce_text(std::mem::take(loose));
    trim_edges(&mut run);
    if run.iter().any(|inline| !matches!(inline, Inline::Break)) {
        blocks.push(BlockNode::Paragraph(run));
    }
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_run {
                out.push(' ');
                in_run = true;
            }
        } else {
            out.push(ch);
            in_run = false;
        }
    }
    out
}

fn raw_text(node: &Handle) -> String {
    let mut out = String::new();
    append_raw_text(node, &mut out);
    out
}

fn append_raw_text(node: &Handle, out: &mut String) {
    for child in node.children.borrow().iter() {
        match &child.data {
            NodeData::Text { contents } => out.push_str(&contents.borrow()),
            NodeData::Element { .. } => append_raw_text(child, out),
            _ => {}
        }
    }
}

//! Markdown fragment parsing and rendering (comrak).
//!
//! Parsing walks the comrak AST into the shared block tree. Raw HTML blocks
//! embedded in markdown — common in generated output — are handed to the
//! HTML front-end instead of being dropped.

use comrak::nodes::{AstNode, NodeValue};
use comrak::{parse_document, Arena, ComrakOptions};

use super::{coalesce_text, html, push_separator, trim_edges, BlockNode, Inline};

/// Parses markdown into block nodes. Never fails.
pub fn parse(text: &str) -> Vec<BlockNode> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let arena = Arena::new();
    let options = ComrakOptions::default();
    let root = parse_document(&arena, text, &options);

    let mut blocks = Vec::new();
    collect_blocks(root, &mut blocks);
    blocks
}

/// Renders block nodes as plain markdown text.
pub fn render(nodes: &[BlockNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            BlockNode::Heading { level, inlines } => {
                let level = (*level).clamp(1, 6) as usize;
                out.push_str(&"#".repeat(level));
                out.push(' ');
                // Headings hold a single line; breaks flatten to spaces.
                out.push_str(&inline_markdown(inlines, " "));
                out.push_str("\n\n");
            }
            BlockNode::Paragraph(inlines) => {
                out.push_str(&inline_markdown(inlines, "\\\n"));
                out.push_str("\n\n");
            }
            BlockNode::BulletList(items) => {
                for item in items {
                    out.push_str("- ");
                    out.push_str(&inline_markdown(item, " "));
                    out.push('\n');
                }
                out.push('\n');
            }
        }
    }

    let trimmed = out.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n")
    }
}

fn inline_markdown(inlines: &[Inline], break_text: &str) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(text) => out.push_str(text),
            Inline::Strong(children) => {
                out.push_str("**");
                out.push_str(&inline_markdown(children, break_text));
                out.push_str("**");
            }
            Inline::Emph(children) => {
                out.push('*');
                out.push_str(&inline_markdown(children, break_text));
                out.push('*');
            }
            Inline::Break => out.push_str(break_text),
        }
    }
    out
}

// ── comrak AST walking ──────────────────────────────────────────────────────

fn collect_blocks<'a>(node: &'a AstNode<'a>, blocks: &mut Vec<BlockNode>) {
    for child in node.children() {
        let data = child.data.borrow();
        match &data.value {
            NodeValue::Heading(heading) => {
                blocks.push(BlockNode::Heading {
                    level: heading.level,
                    inlines: collect_inlines(child),
                });
            }
            NodeValue::Paragraph => {
                blocks.push(BlockNode::Paragraph(collect_inlines(child)));
            }
            NodeValue::List(_) => {
                // Ordered lists degrade to bullets; numbering is presentation.
                blocks.push(BlockNode::BulletList(collect_list_items(child)));
            }
            NodeValue::CodeBlock(code_block) => {
                let literal = code_block.literal.trim_end();
                if !literal.is_empty() {
                    blocks.push(BlockNode::Paragraph(vec![Inline::Text(
                        literal.to_string(),
                    )]));
                }
            }
            NodeValue::HtmlBlock(html_block) => {
                blocks.extend(html::parse(&html_block.literal));
            }
            NodeValue::ThematicBreak => {}
            _ => {
                // Block quotes and anything unexpected: transparent container.
                collect_blocks(child, blocks);
            }
        }
    }
}

fn collect_list_items<'a>(list: &'a AstNode<'a>) -> Vec<Vec<Inline>> {
    let mut items = Vec::new();
    for item in list.children() {
        let mut inlines = Vec::new();
        flatten_item(item, &mut inlines);
        let mut inlines = coalesce_text(inlines);
        trim_edges(&mut inlines);
        if !inlines.is_empty() {
            items.push(inlines);
        }
    }
    items
}

/// Flattens a list item's block children (paragraphs, nested lists) into one
/// inline run, separated by spaces.
fn flatten_item<'a>(item: &'a AstNode<'a>, out: &mut Vec<Inline>) {
    for child in item.children() {
        let data = child.data.borrow();
        match &data.value {
            NodeValue::Paragraph => {
                push_separator(out);
                out.extend(collect_inlines(child));
            }
            NodeValue::List(_) => {
                for nested in child.children() {
                    push_separator(out);
                    flatten_item(nested, out);
                }
            }
            NodeValue::CodeBlock(code_block) => {
                push_separator(out);
                out.push(Inline::Text(code_block.literal.trim_end().to_string()));
            }
            _ => {
                push_separator(out);
                out.extend(collect_inlines(child));
            }
        }
    }
}

fn collect_inlines<'a>(node: &'a AstNode<'a>) -> Vec<Inline> {
    let mut out = coalesce_text(collect_inlines_raw(node));
    trim_edges(&mut out);
    out
}

fn collect_inlines_raw<'a>(node: &'a AstNode<'a>) -> Vec<Inline> {
    let mut out = Vec::new();
    for child in node.children() {
        let data = child.data.borrow();
        match &data.value {
            NodeValue::Text(text) => out.push(Inline::Text(text.clone())),
            NodeValue::Strong => out.push(Inline::Strong(collect_inlines(child))),
            NodeValue::Emph => out.push(Inline::Emph(collect_inlines(child))),
            NodeValue::Code(code) => out.push(Inline::Text(code.literal.clone())),
            // Soft breaks keep their line structure: plain-text resumes put
            // name, phone, and email on adjacent lines of one paragraph.
            NodeValue::SoftBreak | NodeValue::LineBreak => out.push(Inline::Break),
            NodeValue::HtmlInline(raw) => {
                if raw.starts_with("<br") {
                    out.push(Inline::Break);
                }
                // Other inline tags are dropped; their text arrives as
                // separate Text nodes.
            }
            NodeValue::Link(link) => {
                let children = collect_inlines(child);
                if children.is_empty() {
                    out.push(Inline::Text(link.url.clone()));
                } else {
                    out.extend(children);
                }
            }
            _ => out.extend(collect_inlines(child)),
        }
    }
    out
}

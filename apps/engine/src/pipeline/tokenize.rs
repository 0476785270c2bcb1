//! Markup tokenizer — walks free-form input into level-normalized blocks.
//!
//! Both front-ends (HTML and markdown) parse through the shared fragment
//! tree, so one block builder serves both. Levels come out normalized:
//!
//! - 0: the document's leading title heading, or the implicit block holding
//!      content that precedes any heading (empty `heading` marks implicit);
//! - 1: any later `h1`;
//! - 2: `h2`;
//! - 3: `h3` through `h6`.
//!
//! Tokenizing never fails. Input that cannot be walked at all is preserved
//! verbatim inside a single implicit block.

use tracing::debug;

use crate::errors::Anomaly;
use crate::fragment::{self, html, markdown, BlockNode};

/// One heading-scoped slice of the document. `content` is the canonical HTML
/// fragment of everything between this heading and the next.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub level: u8,
    pub heading: String,
    pub content: String,
}

/// Tokenizes an HTML document or fragment.
pub fn tokenize_markup(markup: &str) -> Vec<Block> {
    let nodes = html::parse(markup);
    if nodes.is_empty() {
        return fallback_blocks(markup, "markup walk produced no blocks");
    }
    blocks_from_nodes(nodes)
}

/// Tokenizes markdown text.
pub fn tokenize_markdown(text: &str) -> Vec<Block> {
    let nodes = markdown::parse(text);
    if nodes.is_empty() {
        return fallback_blocks(text, "markdown walk produced no blocks");
    }
    blocks_from_nodes(nodes)
}

fn fallback_blocks(raw: &str, context: &str) -> Vec<Block> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    let anomaly = Anomaly::UnparsableFragment {
        context: context.to_string(),
    };
    debug!("{anomaly}");
    vec![Block {
        level: 0,
        heading: String::new(),
        content: html::render(&[BlockNode::paragraph(raw.trim())]),
    }]
}

fn blocks_from_nodes(nodes: Vec<BlockNode>) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();
    let mut preamble: Vec<BlockNode> = Vec::new();
    let mut current: Option<(u8, String, Vec<BlockNode>)> = None;
    let mut first_node = true;

    for node in nodes {
        match node {
            BlockNode::Heading { level, inlines } => {
                let heading = fragment::inline_text(&inlines).trim().to_string();
                let normalized = normalized_level(level, first_node);

                if let Some((lvl, head, content)) = current.take() {
                    blocks.push(make_block(lvl, head, content));
                } else if !preamble.is_empty() {
                    blocks.push(make_block(0, String::new(), std::mem::take(&mut preamble)));
                }
                current = Some((normalized, heading, Vec::new()));
            }
            other => match &mut current {
                Some((_, _, content)) => content.push(other),
                None => preamble.push(other),
            },
        }
        first_node = false;
    }

    if let Some((lvl, head, content)) = current.take() {
        blocks.push(make_block(lvl, head, content));
    } else if !preamble.is_empty() {
        blocks.push(make_block(0, String::new(), preamble));
    }

    blocks
}

fn make_block(level: u8, heading: String, content: Vec<BlockNode>) -> Block {
    Block {
        level,
        heading,
        content: html::render(&content),
    }
}

/// A leading `h1` is the document title (level 0); later `h1`s rank with
/// section headings.
fn normalized_level(raw: u8, is_leading: bool) -> u8 {
    match raw {
        1 => {
            if is_leading {
                0
            } else {
                1
            }
        }
        2 => 2,
        _ => 3,
    }
}

//! HTML serialization — sections back out as one document fragment.

use crate::fragment::{html, BlockNode};
use crate::models::Section;
use crate::pipeline::order::order;
use crate::serializer::{display_title, heading_level};

/// Renders a collection as an HTML document fragment in canonical order.
/// Bodies are already canonical fragments and embed unchanged; titles are
/// escaped on the way out.
pub fn to_markup(sections: &[Section]) -> String {
    let ordered = order(sections.to_vec());
    let mut parts: Vec<String> = Vec::new();
    for section in &ordered {
        let mut piece = String::new();
        let title = display_title(section);
        if !title.is_empty() {
            piece.push_str(&html::render(&[BlockNode::heading(
                heading_level(section.kind),
                title,
            )]));
        }
        if !section.body.is_empty() {
            if !piece.is_empty() {
                piece.push('\n');
            }
            piece.push_str(&section.body);
        }
        if !piece.is_empty() {
            parts.push(piece);
        }
    }
    parts.join("\n")
}

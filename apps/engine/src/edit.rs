//! Whole-collection edit operations.
//!
//! Each operation takes the collection by value and hands it back, so callers
//! chain them the same way they chain `reconcile` and `order`. Every operation
//! is total: an id that matches nothing leaves the collection untouched and
//! notes the miss at debug level. None of them re-establish structural
//! invariants on their own; callers re-run `reconcile` when they want roles
//! re-attached or singletons collapsed after a batch of edits.

use tracing::debug;

use crate::models::{Section, SectionKind};

/// Upserts by id: replaces the section occupying the same id in place, or
/// appends when the id is new.
pub fn add_section(mut sections: Vec<Section>, section: Section) -> Vec<Section> {
    match sections.iter().position(|existing| existing.id == section.id) {
        Some(index) => sections[index] = section,
        None => sections.push(section),
    }
    sections
}

/// Swaps the body of the section with the given id.
pub fn replace_body(mut sections: Vec<Section>, id: &str, body: &str) -> Vec<Section> {
    match sections.iter_mut().find(|section| section.id == id) {
        Some(section) => section.body = body.to_string(),
        None => debug!("replace_body: no section with id '{}'", id),
    }
    sections
}

/// Moves the section with the given id to `to_index`, clamping an
/// out-of-range index to the end of the collection.
pub fn move_section(mut sections: Vec<Section>, id: &str, to_index: usize) -> Vec<Section> {
    let from = match sections.iter().position(|section| section.id == id) {
        Some(index) => index,
        None => {
            debug!("move_section: no section with id '{}'", id);
            return sections;
        }
    };
    let section = sections.remove(from);
    let to = to_index.min(sections.len());
    sections.insert(to, section);
    sections
}

/// Folds the source section into the target: appends the source body to the
/// target body, removes the source, and re-parents the source's role children
/// onto the target when the target is an experience. Children of a
/// non-experience target keep their now-dangling ref; the next `reconcile`
/// pass re-attaches them.
pub fn merge_sections(mut sections: Vec<Section>, source_id: &str, target_id: &str) -> Vec<Section> {
    if source_id == target_id {
        debug!("merge_sections: source and target are both '{}'", source_id);
        return sections;
    }
    let source_index = match sections.iter().position(|section| section.id == source_id) {
        Some(index) => index,
        None => {
            debug!("merge_sections: no source section with id '{}'", source_id);
            return sections;
        }
    };
    let target_index = match sections.iter().position(|section| section.id == target_id) {
        Some(index) => index,
        None => {
            debug!("merge_sections: no target section with id '{}'", target_id);
            return sections;
        }
    };

    let source = sections.remove(source_index);
    let target_index = if source_index < target_index {
        target_index - 1
    } else {
        target_index
    };

    if sections[target_index].kind == SectionKind::Experience {
        for section in sections.iter_mut() {
            if section.kind == SectionKind::JobRole
                && section.parent_ref.as_deref() == Some(source.id.as_str())
            {
                section.parent_ref = Some(target_id.to_string());
            }
        }
    }

    let target = &mut sections[target_index];
    if !source.body.is_empty() {
        if !target.body.is_empty() {
            target.body.push('\n');
        }
        target.body.push_str(&source.body);
    }
    sections
}

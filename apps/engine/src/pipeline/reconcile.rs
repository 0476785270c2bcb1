//! Anomaly reconciler — repairs the structural damage heuristic assembly
//! (and LLM generators) leave behind.
//!
//! Four repairs run in a fixed sequence: duplicate ids are regenerated,
//! orphaned job roles are re-attached, mis-leveled bullets are merged back
//! into their roles, and singleton kinds are deduplicated. Each repair logs
//! a warning naming what changed. The stage is idempotent: running it twice
//! produces the same collection as running it once.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::errors::Anomaly;
use crate::fragment;
use crate::models::{Section, SectionKind};

/// Matches date-range fragments: years or an open-ended "present"/"current".
static DATE_RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:(?:19|20)\d{2}|present|current)\b").unwrap());

/// Reconciles a collection using the default configuration.
pub fn reconcile(sections: Vec<Section>) -> Vec<Section> {
    reconcile_with(sections, &EngineConfig::default())
}

/// Reconciles a collection with explicit configuration.
///
/// Orphan repair runs before bullet merging so a stray role re-attached to
/// an experience is immediately eligible for merging, not one call later.
pub fn reconcile_with(mut sections: Vec<Section>, config: &EngineConfig) -> Vec<Section> {
    regenerate_duplicate_ids(&mut sections);
    repair_orphans(&mut sections);
    merge_misleveled_bullets(&mut sections, config);
    repair_singletons(&mut sections);
    sections
}

/// First occupant keeps its id; later duplicates get fresh ones, so any
/// `parent_ref` pointing at the contested id still resolves.
fn regenerate_duplicate_ids(sections: &mut [Section]) {
    let mut seen: HashSet<String> = HashSet::new();
    for section in sections.iter_mut() {
        if seen.contains(&section.id) {
            warn!(
                "{}",
                Anomaly::StructuralAnomaly {
                    detail: format!(
                        "duplicate section id '{}' on '{}' regenerated",
                        section.id, section.title
                    ),
                }
            );
            while seen.contains(&section.id) {
                section.id = Uuid::new_v4().to_string();
            }
        }
        seen.insert(section.id.clone());
    }
}

/// Re-attaches roles whose `parent_ref` is missing or does not resolve to an
/// experience section. With no experience present at all, the first orphan
/// gets promoted under a new wrapper experience, which then adopts the rest.
fn repair_orphans(sections: &mut Vec<Section>) {
    let mut experience_ids: HashSet<String> = sections
        .iter()
        .filter(|section| section.kind == SectionKind::Experience)
        .map(|section| section.id.clone())
        .collect();
    let mut first_experience = sections
        .iter()
        .find(|section| section.kind == SectionKind::Experience)
        .map(|section| section.id.clone());

    let mut index = 0;
    while index < sections.len() {
        if sections[index].kind != SectionKind::JobRole {
            index += 1;
            continue;
        }
        let resolves = sections[index]
            .parent_ref
            .as_ref()
            .map(|parent| experience_ids.contains(parent))
            .unwrap_or(false);
        if resolves {
            index += 1;
            continue;
        }

        match first_experience.clone() {
            Some(parent) => {
                warn!(
                    "{}",
                    Anomaly::StructuralAnomaly {
                        detail: format!(
                            "orphaned job role '{}' re-attached to the first experience section",
                            sections[index].title
                        ),
                    }
                );
                sections[index].parent_ref = Some(parent);
            }
            None => {
                warn!(
                    "{}",
                    Anomaly::StructuralAnomaly {
                        detail: format!(
                            "job role '{}' without any experience section promoted under a new wrapper",
                            sections[index].title
                        ),
                    }
                );
                let wrapper = Section::new(SectionKind::Experience, "Experience", "");
                let wrapper_id = wrapper.id.clone();
                sections[index].parent_ref = Some(wrapper_id.clone());
                sections.insert(index, wrapper);
                experience_ids.insert(wrapper_id.clone());
                first_experience = Some(wrapper_id);
                index += 1;
            }
        }
        index += 1;
    }
}

/// Merges job roles that are really bullets an upstream generator promoted
/// to headings. A role B merges into the nearest preceding role A under the
/// same experience when B's title looks like a bullet (trailing `:` or a
/// responsibility stem) and B's first paragraph references A's employer or
/// date range. The merged item lands in A's bullet list and B disappears.
fn merge_misleveled_bullets(sections: &mut Vec<Section>, config: &EngineConfig) {
    let mut index = 0;
    while index < sections.len() {
        if sections[index].kind != SectionKind::JobRole
            || !is_bullet_shaped(&sections[index], config)
        {
            index += 1;
            continue;
        }
        let target = match preceding_role(sections, index) {
            Some(target) => target,
            None => {
                index += 1;
                continue;
            }
        };
        let facts = role_facts(&sections[target]);
        let lead = fragment::first_paragraph_text(&sections[index].body).unwrap_or_default();
        if !references_facts(&lead, &facts) {
            index += 1;
            continue;
        }

        warn!(
            "{}",
            Anomaly::StructuralAnomaly {
                detail: format!(
                    "mis-leveled bullet '{}' merged into role '{}'",
                    sections[index].title, sections[target].title
                ),
            }
        );
        let item = merged_item_text(&sections[index]);
        sections[target].body = fragment::append_list_item(&sections[target].body, &item);
        sections.remove(index);
    }
}

fn is_bullet_shaped(section: &Section, config: &EngineConfig) -> bool {
    let title = section.title.trim();
    title.ends_with(':') || config.has_responsibility_stem(title)
}

/// Nearest preceding role under the same experience, if any.
fn preceding_role(sections: &[Section], index: usize) -> Option<usize> {
    let parent = sections[index].parent_ref.as_deref()?;
    sections[..index].iter().rposition(|candidate| {
        candidate.kind == SectionKind::JobRole && candidate.parent_ref.as_deref() == Some(parent)
    })
}

/// Employer and date range of a role, read from its first paragraph — the
/// `Company | 2020 - Present` line both front-ends produce. Merging appends
/// to the bullet list, never this line, which keeps the facts stable. The
/// record serializer reads the same line when flattening roles.
pub(crate) struct RoleFacts {
    pub(crate) employer: Option<String>,
    pub(crate) dates: Option<String>,
}

pub(crate) fn role_facts(section: &Section) -> RoleFacts {
    let line = fragment::first_paragraph_text(&section.body).unwrap_or_default();
    let mut employer = None;
    let mut dates = None;
    for part in line.split('|').map(str::trim).filter(|part| !part.is_empty()) {
        if DATE_RANGE_RE.is_match(part) {
            if dates.is_none() {
                dates = Some(part.to_string());
            }
        } else if employer.is_none() {
            employer = Some(part.to_string());
        }
    }
    RoleFacts { employer, dates }
}

fn references_facts(text: &str, facts: &RoleFacts) -> bool {
    let haystack = text.to_lowercase();
    let hits = |needle: &Option<String>| {
        needle
            .as_deref()
            .map(|needle| haystack.contains(&needle.to_lowercase()))
            .unwrap_or(false)
    };
    hits(&facts.employer) || hits(&facts.dates)
}

/// `"Directed R&D:"` + `"Ran the robotics program."` →
/// `"Directed R&D: Ran the robotics program."`.
fn merged_item_text(section: &Section) -> String {
    let title = section.title.trim().trim_end_matches(':').trim_end();
    let detail = fragment::first_paragraph_text(&section.body).unwrap_or_default();
    if detail.is_empty() {
        title.to_string()
    } else if title.is_empty() {
        detail
    } else {
        format!("{title}: {detail}")
    }
}

/// At most one header and one summary survive: extra headers demote to
/// `Other`, extra summary bodies fold into the first.
fn repair_singletons(sections: &mut Vec<Section>) {
    let mut seen_header = false;
    for section in sections.iter_mut() {
        if section.kind != SectionKind::Header {
            continue;
        }
        if seen_header {
            warn!(
                "{}",
                Anomaly::StructuralAnomaly {
                    detail: format!("extra header '{}' demoted to other", section.title),
                }
            );
            section.kind = SectionKind::Other;
        } else {
            seen_header = true;
        }
    }

    let first_summary = match sections
        .iter()
        .position(|section| section.kind == SectionKind::Summary)
    {
        Some(index) => index,
        None => return,
    };
    let mut extra_bodies: Vec<String> = Vec::new();
    let mut index = first_summary + 1;
    while index < sections.len() {
        if sections[index].kind == SectionKind::Summary {
            warn!(
                "{}",
                Anomaly::StructuralAnomaly {
                    detail: format!(
                        "extra summary '{}' folded into the first summary",
                        sections[index].title
                    ),
                }
            );
            extra_bodies.push(sections.remove(index).body);
        } else {
            index += 1;
        }
    }
    let body = &mut sections[first_summary].body;
    for extra in extra_bodies {
        if extra.is_empty() {
            continue;
        }
        if !body.is_empty() {
            body.push('\n');
        }
        body.push_str(&extra);
    }
}

//! Wire-record serialization — sections to `ResumeRecord` and back, plus the
//! JSON boundary helpers.
//!
//! `to_record` flattens the section graph into the typed shape: job roles
//! become experience entries, education and certification lines split on
//! `|`, skills read either as a flat list or as categorized groups. The
//! reverse direction is a direct construction — records carry explicit kinds,
//! so none of the parsing heuristics run.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::errors::{Anomaly, RecordError};
use crate::fragment::{self, html, BlockNode, Inline};
use crate::models::{
    CertificationRecord, EducationRecord, ExperienceRecord, HeaderRecord, ResumeRecord, Section,
    SectionKind, Skills,
};
use crate::pipeline::assemble::{EMAIL_RE, PHONE_RE, URL_RE};
use crate::pipeline::order::order;
use crate::pipeline::reconcile::{role_facts, RoleFacts};

/// Matches a bare four-digit year.
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());

/// Flattens a collection into the wire record. Sections with no record
/// representation (`Projects`, `Other`) are omitted; everything else maps by
/// kind. Never fails.
pub fn to_record(sections: &[Section]) -> ResumeRecord {
    let ordered = order(sections.to_vec());
    let mut record = ResumeRecord::default();

    for section in &ordered {
        match section.kind {
            SectionKind::Header => {
                if record.header.is_none() {
                    record.header = Some(header_record(section));
                }
            }
            SectionKind::Summary => {
                if record.summary.is_none() {
                    let text = section.body_text();
                    if !text.is_empty() {
                        record.summary = Some(text);
                    }
                }
            }
            SectionKind::Experience => {
                let roles: Vec<&Section> = ordered
                    .iter()
                    .filter(|candidate| {
                        candidate.kind == SectionKind::JobRole
                            && candidate.parent_ref.as_deref() == Some(section.id.as_str())
                    })
                    .collect();
                if roles.is_empty() {
                    // A roleless experience carries its own employer line.
                    if let Some(entry) = experience_entry(section) {
                        record.experience.push(entry);
                    }
                } else {
                    for role in roles {
                        if let Some(entry) = experience_entry(role) {
                            record.experience.push(entry);
                        }
                    }
                }
            }
            // Attached roles are flattened with their experience above;
            // strays become entries of their own.
            SectionKind::JobRole => {
                let attached = section
                    .parent_ref
                    .as_deref()
                    .map(|parent| {
                        ordered.iter().any(|candidate| {
                            candidate.kind == SectionKind::Experience && candidate.id == parent
                        })
                    })
                    .unwrap_or(false);
                if !attached {
                    if let Some(entry) = experience_entry(section) {
                        record.experience.push(entry);
                    }
                }
            }
            SectionKind::Education => record.education.extend(triple_entries(section).map(
                |(degree, institution, year)| EducationRecord {
                    degree,
                    institution,
                    year,
                },
            )),
            SectionKind::Certifications => record.certifications.extend(
                triple_entries(section).map(|(name, issuer, year)| CertificationRecord {
                    name,
                    issuer,
                    year,
                }),
            ),
            SectionKind::Skills => {
                if record.skills.is_none() {
                    let skills = skills_from_body(&section.body);
                    if !skills.is_empty() {
                        record.skills = Some(skills);
                    }
                }
            }
            SectionKind::Projects | SectionKind::Other => {}
        }
    }

    record
}

/// Builds sections directly from a record: explicit kinds, fresh ids, roles
/// attached to one experience wrapper. Output comes back in canonical order.
pub fn from_record(record: &ResumeRecord) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();

    if let Some(header) = &record.header {
        let mut contact: Vec<&str> = Vec::new();
        if let Some(email) = &header.email {
            contact.push(email);
        }
        if let Some(phone) = &header.phone {
            contact.push(phone);
        }
        if let Some(location) = &header.location {
            contact.push(location);
        }
        let body = if contact.is_empty() {
            String::new()
        } else {
            html::render(&[BlockNode::paragraph(contact.join(" | "))])
        };
        sections.push(Section::new(SectionKind::Header, header.name.trim(), body));
    }

    if let Some(summary) = &record.summary {
        if !summary.trim().is_empty() {
            sections.push(Section::new(
                SectionKind::Summary,
                "Summary",
                html::render(&[BlockNode::paragraph(summary.trim())]),
            ));
        }
    }

    if !record.experience.is_empty() {
        let experience = Section::new(SectionKind::Experience, "Experience", "");
        let parent = experience.id.clone();
        sections.push(experience);
        for entry in &record.experience {
            let mut nodes: Vec<BlockNode> = Vec::new();
            let line = join_parts(&[&entry.company, &entry.date_range]);
            if !line.is_empty() {
                nodes.push(BlockNode::paragraph(line));
            }
            if !entry.bullets.is_empty() {
                nodes.push(BlockNode::bullet_list(entry.bullets.iter().cloned()));
            }
            sections.push(Section::child_of(
                SectionKind::JobRole,
                entry.title.trim(),
                html::render(&nodes),
                &parent,
            ));
        }
    }

    if !record.education.is_empty() {
        let items: Vec<String> = record
            .education
            .iter()
            .map(|entry| join_parts(&[&entry.degree, &entry.institution, &entry.year]))
            .collect();
        sections.push(Section::new(
            SectionKind::Education,
            "Education",
            html::render(&[BlockNode::bullet_list(items)]),
        ));
    }

    if let Some(skills) = &record.skills {
        if !skills.is_empty() {
            sections.push(Section::new(
                SectionKind::Skills,
                "Skills",
                skills_body(skills),
            ));
        }
    }

    if !record.certifications.is_empty() {
        let items: Vec<String> = record
            .certifications
            .iter()
            .map(|entry| join_parts(&[&entry.name, &entry.issuer, &entry.year]))
            .collect();
        sections.push(Section::new(
            SectionKind::Certifications,
            "Certifications",
            html::render(&[BlockNode::bullet_list(items)]),
        ));
    }

    order(sections)
}

// ── JSON boundary ───────────────────────────────────────────────────────────

/// Serializes a record to its wire JSON.
pub fn record_to_json(record: &ResumeRecord) -> String {
    serde_json::to_string(record).unwrap_or_else(|_| "{}".to_string())
}

/// Strict parse for callers that want the error.
pub fn try_record_from_json(json: &str) -> Result<ResumeRecord, RecordError> {
    Ok(serde_json::from_str(json)?)
}

/// Total parse: invalid JSON degrades to a single `Other` section holding
/// the raw text, so no input is ever lost.
pub fn sections_from_json(json: &str) -> Vec<Section> {
    match try_record_from_json(json) {
        Ok(record) => from_record(&record),
        Err(error) => {
            debug!(
                "{}",
                Anomaly::UnparsableFragment {
                    context: format!("resume record json: {error}"),
                }
            );
            vec![Section::new(
                SectionKind::Other,
                "",
                html::render(&[BlockNode::paragraph(json)]),
            )]
        }
    }
}

// ── Extraction helpers ──────────────────────────────────────────────────────

fn header_record(section: &Section) -> HeaderRecord {
    let mut header = HeaderRecord {
        name: section.title.trim().to_string(),
        email: None,
        phone: None,
        location: None,
    };

    let text = section.body_text();
    for piece in text.lines().flat_map(|line| line.split('|')) {
        let piece = piece.trim();
        if piece.is_empty() || piece == header.name {
            continue;
        }
        if let Some(found) = EMAIL_RE.find(piece) {
            if header.email.is_none() {
                header.email = Some(found.as_str().to_string());
            }
            continue;
        }
        if URL_RE.is_match(piece) {
            // The record has no field for profile links.
            continue;
        }
        if let Some(found) = PHONE_RE.find(piece) {
            if header.phone.is_none() {
                header.phone = Some(found.as_str().to_string());
            }
            continue;
        }
        if header.location.is_none() {
            header.location = Some(piece.to_string());
        }
    }

    header
}

fn experience_entry(section: &Section) -> Option<ExperienceRecord> {
    let RoleFacts { employer, dates } = role_facts(section);
    let bullets = fragment::list_items(&section.body);
    let title = section.title.trim().to_string();
    if title.is_empty() && employer.is_none() && dates.is_none() && bullets.is_empty() {
        return None;
    }
    Some(ExperienceRecord {
        title,
        company: employer.unwrap_or_default(),
        date_range: dates.unwrap_or_default(),
        bullets,
    })
}

/// One `(first, second, year)` triple per plain-text line of the body,
/// splitting each line on `|`.
fn triple_entries(section: &Section) -> impl Iterator<Item = (String, String, String)> {
    let text = section.body_text();
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let parts: Vec<&str> = line
                .split('|')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .collect();
            let year = YEAR_RE
                .find(line)
                .map(|found| found.as_str().to_string())
                .unwrap_or_default();
            let first = parts.first().copied().unwrap_or_default().to_string();
            let second = parts
                .get(1)
                .copied()
                .filter(|part| !is_year_only(part))
                .unwrap_or_default()
                .to_string();
            (first, second, year)
        })
        .collect::<Vec<_>>()
        .into_iter()
}

fn is_year_only(part: &str) -> bool {
    let part = part.trim();
    part.len() == 4 && YEAR_RE.is_match(part)
}

fn skills_from_body(body: &str) -> Skills {
    let mut by_category: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut flat: Vec<String> = Vec::new();
    let mut current: Option<String> = None;

    for node in html::parse(body) {
        match node {
            BlockNode::Heading { inlines, .. } => {
                let category = fragment::inline_text(&inlines).trim().to_string();
                if !category.is_empty() {
                    by_category.entry(category.clone()).or_default();
                    current = Some(category);
                }
            }
            BlockNode::Paragraph(inlines) => {
                if let Some((category, items)) = strong_category(&inlines) {
                    by_category.entry(category).or_default().extend(items);
                } else {
                    let items = split_items(&fragment::inline_text(&inlines));
                    push_items(&mut by_category, &mut flat, &current, items);
                }
            }
            BlockNode::BulletList(list) => {
                let items: Vec<String> = list
                    .iter()
                    .map(|item| fragment::inline_text(item).trim().to_string())
                    .filter(|item| !item.is_empty())
                    .collect();
                push_items(&mut by_category, &mut flat, &current, items);
            }
        }
    }

    if by_category.is_empty() {
        Skills::Flat(flat)
    } else {
        if !flat.is_empty() {
            // Mixed input: uncategorized items keep a bucket of their own.
            by_category.entry("general".to_string()).or_default().extend(flat);
        }
        Skills::ByCategory(by_category)
    }
}

fn push_items(
    by_category: &mut BTreeMap<String, Vec<String>>,
    flat: &mut Vec<String>,
    current: &Option<String>,
    items: Vec<String>,
) {
    if items.is_empty() {
        return;
    }
    match current {
        Some(category) => by_category
            .entry(category.clone())
            .or_default()
            .extend(items),
        None => flat.extend(items),
    }
}

/// `<p><strong>Cloud:</strong> AWS, GCP</p>` → `("Cloud", ["AWS", "GCP"])`.
fn strong_category(inlines: &[Inline]) -> Option<(String, Vec<String>)> {
    let mut iter = inlines.iter();
    let label = match iter.next()? {
        Inline::Strong(children) => fragment::inline_text(children),
        _ => return None,
    };
    let label = label.trim();
    let label = label.strip_suffix(':').unwrap_or(label).trim_end();
    if label.is_empty() {
        return None;
    }
    let tail = fragment::inline_text(iter.as_slice());
    let tail = tail.trim().trim_start_matches(':').trim_start();
    Some((label.to_string(), split_items(tail)))
}

fn split_items(text: &str) -> Vec<String> {
    text.split(|c| matches!(c, ',' | ';' | '•'))
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

fn join_parts(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}

fn skills_body(skills: &Skills) -> String {
    match skills {
        Skills::Flat(items) => html::render(&[BlockNode::bullet_list(items.iter().cloned())]),
        Skills::ByCategory(map) => {
            let mut nodes: Vec<BlockNode> = Vec::new();
            for (category, items) in map {
                nodes.push(BlockNode::heading(3, category.as_str()));
                if !items.is_empty() {
                    nodes.push(BlockNode::bullet_list(items.iter().cloned()));
                }
            }
            html::render(&nodes)
        }
    }
}

//! Canonical orderer — derives presentation order, never stores it.
//!
//! Sequence: header, summary, each experience immediately followed by its
//! job roles, education, then everything else. Within a bucket the original
//! relative order is preserved. Purely a permutation: no section is ever
//! synthesized, dropped, or edited here.

use std::collections::{HashMap, HashSet};

use crate::models::{Section, SectionKind};

/// Reorders a collection into canonical presentation sequence.
pub fn order(sections: Vec<Section>) -> Vec<Section> {
    let experience_ids: HashSet<String> = sections
        .iter()
        .filter(|section| section.kind == SectionKind::Experience)
        .map(|section| section.id.clone())
        .collect();

    let mut headers = Vec::new();
    let mut summaries = Vec::new();
    let mut experiences = Vec::new();
    let mut roles: HashMap<String, Vec<Section>> = HashMap::new();
    let mut education = Vec::new();
    let mut tail = Vec::new();

    let total = sections.len();
    for section in sections {
        match section.kind {
            SectionKind::Header => headers.push(section),
            SectionKind::Summary => summaries.push(section),
            SectionKind::Experience => experiences.push(section),
            SectionKind::JobRole => match section.parent_ref.clone() {
                Some(parent) if experience_ids.contains(&parent) => {
                    roles.entry(parent).or_default().push(section)
                }
                // Unattachable strays keep their place among the leftovers.
                _ => tail.push(section),
            },
            SectionKind::Education => education.push(section),
            _ => tail.push(section),
        }
    }

    let mut out = Vec::with_capacity(total);
    out.extend(headers);
    out.extend(summaries);
    for experience in experiences {
        let id = experience.id.clone();
        out.push(experience);
        if let Some(children) = roles.remove(&id) {
            out.extend(children);
        }
    }
    out.extend(education);
    out.extend(tail);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(sections: &[Section]) -> Vec<SectionKind> {
        sections.iter().map(|section| section.kind).collect()
    }

    #[test]
    fn test_known_kinds_order_canonically() {
        let shuffled = vec![
            Section::new(SectionKind::Skills, "Skills", ""),
            Section::new(SectionKind::Education, "Education", ""),
            Section::new(SectionKind::Summary, "Summary", ""),
            Section::new(SectionKind::Experience, "Experience", ""),
            Section::new(SectionKind::Header, "Jane Doe", ""),
        ];
        let ordered = order(shuffled);
        assert_eq!(
            kinds(&ordered),
            vec![
                SectionKind::Header,
                SectionKind::Summary,
                SectionKind::Experience,
                SectionKind::Education,
                SectionKind::Skills,
            ]
        );
    }

    #[test]
    fn test_roles_follow_their_experience() {
        let acme = Section::new(SectionKind::Experience, "Experience", "");
        let initech = Section::new(SectionKind::Experience, "Earlier Experience", "");
        let acme_role = Section::child_of(SectionKind::JobRole, "Engineer", "", &acme.id);
        let initech_role = Section::child_of(SectionKind::JobRole, "Analyst", "", &initech.id);
        let acme_id = acme.id.clone();
        let initech_id = initech.id.clone();

        // Roles arrive scattered far from their parents.
        let ordered = order(vec![initech_role, acme, initech, acme_role]);

        assert_eq!(ordered[0].id, acme_id);
        assert_eq!(ordered[1].title, "Engineer");
        assert_eq!(ordered[2].id, initech_id);
        assert_eq!(ordered[3].title, "Analyst");
    }

    #[test]
    fn test_stray_role_lands_in_the_tail() {
        let education = Section::new(SectionKind::Education, "Education", "");
        let mut stray = Section::new(SectionKind::JobRole, "Engineer", "");
        stray.parent_ref = Some("gone".to_string());

        let ordered = order(vec![stray, education]);
        assert_eq!(ordered[0].kind, SectionKind::Education);
        assert_eq!(ordered[1].kind, SectionKind::JobRole);
    }

    #[test]
    fn test_equal_kinds_keep_relative_order() {
        let rust = Section::new(SectionKind::Skills, "Technical Skills", "");
        let soft = Section::new(SectionKind::Skills, "Soft Skills", "");
        let rust_id = rust.id.clone();
        let ordered = order(vec![rust, soft]);
        assert_eq!(ordered[0].id, rust_id);
    }

    #[test]
    fn test_nothing_is_dropped_or_invented() {
        let sections = vec![
            Section::new(SectionKind::Header, "One", ""),
            Section::new(SectionKind::Header, "Two", ""),
            Section::new(SectionKind::Other, "Notes", ""),
            Section::new(SectionKind::Projects, "Projects", ""),
        ];
        let ordered = order(sections.clone());
        assert_eq!(ordered.len(), sections.len());
        for section in &sections {
            assert!(ordered.iter().any(|candidate| candidate.id == section.id));
        }
    }

    #[test]
    fn test_order_is_idempotent() {
        let sections = vec![
            Section::new(SectionKind::Education, "Education", ""),
            Section::new(SectionKind::Header, "Jane Doe", ""),
            Section::new(SectionKind::Certifications, "Certifications", ""),
        ];
        let once = order(sections);
        let twice = order(once.clone());
        assert_eq!(once, twice);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_kind() -> impl Strategy<Value = SectionKind> {
            prop_oneof![
                Just(SectionKind::Header),
                Just(SectionKind::Summary),
                Just(SectionKind::Experience),
                Just(SectionKind::JobRole),
                Just(SectionKind::Education),
                Just(SectionKind::Skills),
                Just(SectionKind::Certifications),
                Just(SectionKind::Projects),
                Just(SectionKind::Other),
            ]
        }

        fn arb_sections() -> impl Strategy<Value = Vec<Section>> {
            proptest::collection::vec((arb_kind(), 0usize..6), 0..10).prop_map(|specs| {
                let mut sections: Vec<Section> = Vec::with_capacity(specs.len());
                for (kind, parent_hint) in specs {
                    let mut section = Section::new(kind, "t", "");
                    if kind == SectionKind::JobRole {
                        // Point some roles at real experiences, leave the
                        // rest dangling.
                        section.parent_ref = sections
                            .iter()
                            .filter(|s| s.kind == SectionKind::Experience)
                            .nth(parent_hint)
                            .map(|s| s.id.clone())
                            .or(Some("dangling".to_string()));
                    }
                    sections.push(section);
                }
                sections
            })
        }

        proptest! {
            #[test]
            fn order_is_a_permutation(sections in arb_sections()) {
                let ordered = order(sections.clone());
                prop_assert_eq!(ordered.len(), sections.len());
                for section in &sections {
                    prop_assert!(ordered.iter().any(|candidate| candidate.id == section.id));
                }
            }

            #[test]
            fn attached_roles_directly_follow_their_experience(sections in arb_sections()) {
                let experience_ids: HashSet<String> = sections
                    .iter()
                    .filter(|s| s.kind == SectionKind::Experience)
                    .map(|s| s.id.clone())
                    .collect();
                let ordered = order(sections);
                for (index, section) in ordered.iter().enumerate() {
                    if section.kind != SectionKind::JobRole {
                        continue;
                    }
                    let parent = match section.parent_ref.as_deref() {
                        Some(parent) if experience_ids.contains(parent) => parent,
                        _ => continue,
                    };
                    prop_assert!(index > 0, "attached role can never come first");
                    let previous = &ordered[index - 1];
                    let follows_parent =
                        previous.kind == SectionKind::Experience && previous.id == parent;
                    let follows_sibling = previous.kind == SectionKind::JobRole
                        && previous.parent_ref.as_deref() == Some(parent);
                    prop_assert!(follows_parent || follows_sibling);
                }
            }

            #[test]
            fn order_is_idempotent(sections in arb_sections()) {
                let once = order(sections);
                let twice = order(once.clone());
                prop_assert_eq!(once, twice);
            }
        }
    }
}

//! Tests for OrgTreeEditor operations on in-memory forests

use std::collections::HashSet;

use rstest::{fixture, rstest};

use orgtree::domain::{
    filter_by_query, flatten, generate_next_id, DomainError, EditorOptions, Employee,
    EmployeeDirectory, Forest, NewOrganization, OrgTreeEditor, Organization, OrganizationNode,
    OrganizationPatch, ParentSelection,
};
use orgtree::util::testing;

fn org(id: &str, name: &str, parent: Option<&str>, manager: &str) -> Organization {
    Organization {
        organization_id: id.into(),
        organization_name: name.into(),
        parent_organization_id: parent.map(Into::into),
        manager_id: manager.into(),
        manager_first_name: String::new(),
        manager_last_name: String::new(),
        employee_count: None,
    }
}

fn node(organization: Organization, children: Vec<OrganizationNode>) -> OrganizationNode {
    OrganizationNode {
        organization,
        children,
    }
}

fn under(parent: &str, name: &str, manager: &str) -> NewOrganization {
    NewOrganization {
        organization_name: name.into(),
        manager_id: manager.into(),
        parent: ParentSelection::Organization(parent.into()),
    }
}

/// Corporate
/// ├── Engineering
/// │   ├── Development
/// │   └── QA
/// └── Design
/// Sales (second root)
#[fixture]
fn company() -> Forest {
    testing::init_test_setup();
    Forest::from_nodes(vec![
        node(
            org("ORG01", "Corporate", None, "123"),
            vec![
                node(
                    org("ORG02", "Engineering", Some("ORG01"), "124"),
                    vec![
                        node(org("ORG05", "Development", Some("ORG02"), "125"), vec![]),
                        node(org("ORG08", "QA", Some("ORG02"), "126"), vec![]),
                    ],
                ),
                node(org("ORG03", "Design", Some("ORG01"), "127"), vec![]),
            ],
        ),
        node(org("ORG04", "Sales", None, "128"), vec![]),
    ])
    .expect("valid forest")
}

#[fixture]
fn editor() -> OrgTreeEditor {
    OrgTreeEditor::new(
        EditorOptions::default(),
        EmployeeDirectory::new(vec![
            Employee {
                employee_id: "M1".into(),
                first_name: "Alice".into(),
                last_name: "Johnson".into(),
            },
            Employee {
                employee_id: "M2".into(),
                first_name: "Bob".into(),
                last_name: "Lee".into(),
            },
        ]),
    )
}

// ============================================================
// flatten / findById
// ============================================================

#[rstest]
fn given_forest_when_flattening_then_visits_each_node_once_in_preorder(company: Forest) {
    let ids: Vec<_> = flatten(&company)
        .iter()
        .map(|o| o.organization_id.clone())
        .collect();

    assert_eq!(ids, vec!["ORG01", "ORG02", "ORG05", "ORG08", "ORG03", "ORG04"]);
    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), company.len());
}

#[rstest]
fn given_forest_when_flattening_then_ancestors_precede_descendants(company: Forest) {
    let ids: Vec<_> = flatten(&company)
        .iter()
        .map(|o| o.organization_id.clone())
        .collect();
    let pos = |id: &str| ids.iter().position(|x| x == id).unwrap();

    for org in flatten(&company) {
        for child in company.children_of(&org.organization_id).unwrap() {
            assert!(pos(&org.organization_id) < pos(&child.organization_id));
        }
    }
}

#[rstest]
fn given_unknown_id_when_finding_then_not_found(company: Forest, editor: OrgTreeEditor) {
    assert_eq!(
        editor.find_by_id(&company, "ORG99").unwrap_err(),
        DomainError::not_found("ORG99")
    );
    assert_eq!(
        editor.find_by_id(&company, "ORG08").unwrap().organization_name,
        "QA"
    );
}

// ============================================================
// generateNextId
// ============================================================

#[rstest]
fn given_nested_ids_when_generating_then_uses_max_suffix_plus_one(company: Forest) {
    // ORG08 is nested two levels deep and is the maximum
    assert_eq!(generate_next_id(&company).unwrap(), "ORG009");
}

#[rstest]
fn given_generated_id_when_checking_forest_then_id_is_unused(
    company: Forest,
    editor: OrgTreeEditor,
) {
    let mut forest = company;
    for _ in 0..5 {
        let next = generate_next_id(&forest).unwrap();
        assert!(!forest.contains(&next));
        let (f, id) = editor.add(&forest, &under("ORG01", "Team", "M1")).unwrap();
        assert_eq!(id, next);
        forest = f;
    }
}

#[rstest]
fn given_deleted_non_max_id_when_generating_then_gap_is_not_reused(
    company: Forest,
    editor: OrgTreeEditor,
) {
    let forest = editor.remove(&company, "ORG05").unwrap();
    assert_eq!(generate_next_id(&forest).unwrap(), "ORG009");
}

#[rstest]
fn given_deleted_max_id_when_generating_then_max_is_reused(
    company: Forest,
    editor: OrgTreeEditor,
) {
    let forest = editor.remove(&company, "ORG08").unwrap();
    assert_eq!(generate_next_id(&forest).unwrap(), "ORG006");
}

#[test]
fn given_suffix_999_when_generating_then_id_grows_past_padding() {
    let forest = Forest::from_nodes(vec![
        node(org("ORG999", "Big", None, "M1"), vec![]),
        node(org("DEPT5000", "Ignored", None, "M1"), vec![]),
    ])
    .unwrap();
    assert_eq!(generate_next_id(&forest).unwrap(), "ORG1000");
}

// ============================================================
// add
// ============================================================

#[rstest]
fn given_valid_input_when_adding_then_node_is_findable_leaf(
    company: Forest,
    editor: OrgTreeEditor,
) {
    let (forest, id) = editor.add(&company, &under("ORG02", "Platform", "M2")).unwrap();

    let added = editor.find_by_id(&forest, &id).unwrap();
    assert_eq!(added.organization_name, "Platform");
    assert_eq!(added.manager_id, "M2");
    assert!(forest.children_of(&id).unwrap().is_empty());
    let siblings: Vec<_> = forest
        .children_of("ORG02")
        .unwrap()
        .iter()
        .map(|o| o.organization_id.clone())
        .collect();
    assert_eq!(siblings, vec!["ORG05".to_string(), "ORG08".into(), id]);
    assert_eq!(forest.len(), company.len() + 1);
}

#[rstest]
#[case::blank_name(NewOrganization { organization_name: " ".into(), manager_id: "M1".into(), parent: ParentSelection::Organization("ORG01".into()) })]
#[case::blank_manager(NewOrganization { organization_name: "Ops".into(), manager_id: "".into(), parent: ParentSelection::Organization("ORG01".into()) })]
#[case::no_parent(NewOrganization { organization_name: "Ops".into(), manager_id: "M1".into(), parent: ParentSelection::Unset })]
#[case::blank_parent(NewOrganization { organization_name: "Ops".into(), manager_id: "M1".into(), parent: ParentSelection::Organization("".into()) })]
#[case::root_not_allowed(NewOrganization { organization_name: "Ops".into(), manager_id: "M1".into(), parent: ParentSelection::Root })]
fn given_missing_field_when_adding_then_validation_error(
    company: Forest,
    editor: OrgTreeEditor,
    #[case] new: NewOrganization,
) {
    assert_eq!(
        editor.add(&company, &new).unwrap_err(),
        DomainError::missing_fields()
    );
}

#[rstest]
fn given_unknown_parent_when_adding_then_becomes_root(company: Forest, editor: OrgTreeEditor) {
    let (forest, id) = editor.add(&company, &under("ORG77", "Stray", "M1")).unwrap();

    let roots: Vec<_> = forest.roots().map(|o| o.organization_id.clone()).collect();
    assert_eq!(roots.last(), Some(&id));
    assert_eq!(forest.get(&id).unwrap().parent_organization_id, None);
}

// ============================================================
// update
// ============================================================

#[rstest]
fn given_patch_when_updating_then_only_name_and_manager_change(
    company: Forest,
    editor: OrgTreeEditor,
) {
    let patch = OrganizationPatch {
        organization_name: "Software".into(),
        manager_id: "M2".into(),
    };
    let forest = editor.update(&company, "ORG02", &patch).unwrap();

    let before = company.get("ORG02").unwrap();
    let after = forest.get("ORG02").unwrap();
    assert_eq!(after.organization_name, "Software");
    assert_eq!(after.manager_id, "M2");
    assert_eq!(after.parent_organization_id, before.parent_organization_id);
    assert_eq!(after.manager_first_name, before.manager_first_name);
    assert_eq!(
        forest.children_of("ORG02").unwrap(),
        company.children_of("ORG02").unwrap()
    );

    for org in flatten(&company) {
        if org.organization_id != "ORG02" {
            assert_eq!(forest.get(&org.organization_id), Some(org));
        }
    }
}

#[rstest]
fn given_unknown_id_when_updating_then_not_found(company: Forest, editor: OrgTreeEditor) {
    let patch = OrganizationPatch {
        organization_name: "X".into(),
        manager_id: "M1".into(),
    };
    assert_eq!(
        editor.update(&company, "ORG42", &patch).unwrap_err(),
        DomainError::not_found("ORG42")
    );
}

#[rstest]
fn given_blank_name_when_updating_then_validation_error(company: Forest, editor: OrgTreeEditor) {
    let patch = OrganizationPatch {
        organization_name: "".into(),
        manager_id: "M1".into(),
    };
    assert_eq!(
        editor.update(&company, "ORG02", &patch).unwrap_err(),
        DomainError::missing_fields()
    );
}

// ============================================================
// remove
// ============================================================

#[rstest]
fn given_leaf_when_removing_then_count_drops_by_one(company: Forest, editor: OrgTreeEditor) {
    let forest = editor.remove(&company, "ORG05").unwrap();

    assert_eq!(forest.len(), company.len() - 1);
    assert!(matches!(
        editor.find_by_id(&forest, "ORG05"),
        Err(DomainError::NotFound { .. })
    ));
    let siblings: Vec<_> = forest
        .children_of("ORG02")
        .unwrap()
        .into_iter()
        .map(|o| o.organization_id.as_str())
        .collect();
    assert_eq!(siblings, vec!["ORG08"]);
}

#[rstest]
fn given_node_with_children_when_removing_strictly_then_conflict(
    company: Forest,
    editor: OrgTreeEditor,
) {
    let err = editor.remove(&company, "ORG02").unwrap_err();
    assert!(matches!(err, DomainError::Conflict { ref id, .. } if id == "ORG02"));
}

#[rstest]
fn given_lenient_editor_when_removing_parent_then_subtree_goes(company: Forest) {
    let editor = OrgTreeEditor::new(
        EditorOptions {
            strict_remove: false,
            ..EditorOptions::default()
        },
        EmployeeDirectory::default(),
    );
    let forest = editor.remove(&company, "ORG02").unwrap();

    assert_eq!(forest.len(), 3);
    for gone in ["ORG02", "ORG05", "ORG08"] {
        assert!(!forest.contains(gone));
    }
}

#[rstest]
fn given_lenient_editor_when_removing_leaf_then_same_as_strict(
    company: Forest,
    editor: OrgTreeEditor,
) {
    let lenient = OrgTreeEditor::new(
        EditorOptions {
            strict_remove: false,
            ..EditorOptions::default()
        },
        EmployeeDirectory::default(),
    );
    assert_eq!(
        lenient.remove(&company, "ORG03").unwrap().to_nodes(),
        editor.remove(&company, "ORG03").unwrap().to_nodes()
    );
}

// ============================================================
// relocate
// ============================================================

#[rstest]
fn given_other_parent_when_relocating_then_subtree_moves(company: Forest, editor: OrgTreeEditor) {
    let forest = editor
        .relocate(&company, "ORG02", &ParentSelection::Organization("ORG04".into()))
        .unwrap();

    assert_eq!(
        forest.parent_of("ORG02").map(|o| o.organization_id.as_str()),
        Some("ORG04")
    );
    assert_eq!(
        forest.get("ORG02").unwrap().parent_organization_id.as_deref(),
        Some("ORG04")
    );
    assert_eq!(forest.children_of("ORG02").unwrap().len(), 2);
    assert_eq!(forest.children_of("ORG01").unwrap().len(), 1);
    assert_eq!(forest.len(), company.len());
}

#[rstest]
#[case::itself("ORG02")]
#[case::descendant("ORG05")]
fn given_own_subtree_when_relocating_then_conflict(
    company: Forest,
    editor: OrgTreeEditor,
    #[case] target: &str,
) {
    let err = editor
        .relocate(&company, "ORG02", &ParentSelection::Organization(target.into()))
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict { .. }));
}

#[rstest]
fn given_root_target_when_relocating_then_appended_to_roots(
    company: Forest,
    editor: OrgTreeEditor,
) {
    let forest = editor
        .relocate(&company, "ORG08", &ParentSelection::Root)
        .unwrap();
    let roots: Vec<_> = forest.roots().map(|o| o.organization_id.as_str()).collect();
    assert_eq!(roots, vec!["ORG01", "ORG04", "ORG08"]);
    assert_eq!(forest.get("ORG08").unwrap().parent_organization_id, None);
}

// ============================================================
// filterByQuery
// ============================================================

#[rstest]
fn given_empty_query_when_filtering_then_input_unchanged(company: Forest) {
    let all = flatten(&company);
    assert_eq!(filter_by_query(all.clone(), ""), all);
    assert_eq!(filter_by_query(all.clone(), "   "), all);
}

#[rstest]
#[case("eng", vec!["ORG02"])]
#[case("ORG0", vec!["ORG01", "ORG02", "ORG05", "ORG08", "ORG03", "ORG04"])]
#[case("org08", vec!["ORG08"])]
#[case("DESIGN", vec!["ORG03"])]
#[case("nothing", vec![])]
fn given_query_when_filtering_organizations_then_matches_id_or_name(
    company: Forest,
    #[case] query: &str,
    #[case] expected: Vec<&str>,
) {
    let hits: Vec<_> = filter_by_query(flatten(&company), query)
        .into_iter()
        .map(|o| o.organization_id.as_str())
        .collect();
    assert_eq!(hits, expected);
}

// ============================================================
// End-to-end scenario
// ============================================================

#[rstest]
fn given_single_root_when_editing_then_follows_documented_scenario(editor: OrgTreeEditor) {
    let forest = Forest::from_nodes(vec![node(org("ORG001", "Corporate", None, "M1"), vec![])])
        .unwrap();

    // add
    let (forest, id) = editor
        .add(&forest, &under("ORG001", "Engineering", "M2"))
        .unwrap();
    assert_eq!(id, "ORG002");
    let nodes = forest.to_nodes();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].children.len(), 1);
    let child = &nodes[0].children[0];
    assert_eq!(child.organization.organization_id, "ORG002");
    assert_eq!(child.organization.organization_name, "Engineering");
    assert_eq!(child.organization.manager_id, "M2");
    assert!(child.children.is_empty());

    assert_eq!(generate_next_id(&forest).unwrap(), "ORG003");

    // update
    let renamed = editor
        .update(
            &forest,
            "ORG002",
            &OrganizationPatch {
                organization_name: "R&D".into(),
                manager_id: "M2".into(),
            },
        )
        .unwrap();
    assert_eq!(renamed.get("ORG002").unwrap().organization_name, "R&D");
    assert_eq!(renamed.get("ORG001"), forest.get("ORG001"));

    // remove
    let restored = editor.remove(&renamed, "ORG002").unwrap();
    assert!(restored.children_of("ORG001").unwrap().is_empty());
    assert_eq!(restored.len(), 1);
}

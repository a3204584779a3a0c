//! End-to-end comparator tests on JSON dictionary documents
//!
//! These exercise the comparator the way a renderer drives it: parse two
//! versions, classify every field of a tree node, and filter.

use dictlens_core::{DiffStatus, Dictionary, EdgeDirection, FieldAttribute, RestrictionKind};
use dictlens_engine::{
    build_relation_tree, compare_dictionaries, compare_field, filter_by_text, find_field,
    match_counts, DroppedKind, LinkKind, RelationTree,
};
use pretty_assertions::assert_eq;
use serde_json::json;

const V1: &str = r#"{
    "version": "v1",
    "files": [
        {
            "name": "donor",
            "label": "Donor",
            "uniqueFields": ["donor_id"],
            "fields": [
                {"name": "donor_id", "label": "Donor ID", "valueType": "TEXT",
                 "restrictions": [{"type": "required", "config": {"acceptMissingCode": false}}]},
                {"name": "donor_sex", "label": "Sex", "valueType": "INTEGER",
                 "restrictions": [{"type": "codelist", "config": {"name": "donor.sex.v1"}}]}
            ],
            "relations": [{"other": "specimen", "fields": ["donor_id"], "otherFields": ["donor_id"]}]
        },
        {
            "name": "specimen",
            "label": "Specimen",
            "fields": [
                {"name": "donor_id", "label": "Donor ID", "valueType": "TEXT"},
                {"name": "specimen_id", "label": "Specimen ID", "valueType": "TEXT",
                 "restrictions": [{"type": "regex", "config": {"pattern": "^SP\\d+$", "examples": "SP1, SP2"}}]}
            ],
            "relations": [{"other": "sample", "fields": ["specimen_id"], "otherFields": ["specimen_id"]}]
        },
        {
            "name": "sample",
            "label": "Sample",
            "fields": [
                {"name": "specimen_id", "label": "Specimen ID", "valueType": "TEXT"}
            ]
        }
    ]
}"#;

const V2: &str = r#"{
    "version": "v2",
    "files": [
        {
            "name": "donor",
            "label": "Donor",
            "fields": [
                {"name": "donor_id", "label": "Donor ID", "valueType": "TEXT",
                 "restrictions": [{"type": "required", "config": {"acceptMissingCode": true}}]},
                {"name": "donor_sex", "label": "Sex", "valueType": "INTEGER", "controlled": true,
                 "restrictions": [{"type": "codelist", "config": {"name": "donor.sex.v1"}}]},
                {"name": "donor_age", "label": "Age", "valueType": "INTEGER"}
            ],
            "relations": [{"other": "specimen", "fields": ["donor_id"], "otherFields": ["donor_id"]}]
        },
        {
            "name": "specimen",
            "label": "Specimen",
            "fields": [
                {"name": "donor_id", "label": "Donor ID", "valueType": "TEXT"},
                {"name": "specimen_id", "label": "Specimen ID", "valueType": "TEXT",
                 "restrictions": [{"type": "regex", "config": {"pattern": "^SP\\d+$", "examples": ["SP1", "SP2"]}}]}
            ],
            "relations": [
                {"other": "sample", "fields": ["specimen_id"], "otherFields": ["specimen_id"]},
                {"other": "donor", "fields": ["donor_id"], "otherFields": ["donor_id"]}
            ]
        },
        {
            "name": "sample",
            "label": "Sample",
            "fields": [
                {"name": "specimen_id", "label": "Specimen ID", "valueType": "TEXT"}
            ]
        }
    ]
}"#;

fn load() -> (Dictionary, Dictionary) {
    (Dictionary::from_json(V1).unwrap(), Dictionary::from_json(V2).unwrap())
}

#[test]
fn example_tree_is_a_chain() {
    let (v1, _) = load();
    let tree = build_relation_tree(&v1, "donor");

    let names: Vec<&str> = tree.nodes().iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["donor", "specimen", "sample"]);
    assert_eq!(tree.tree_edges(), vec![(0, 1), (1, 2)]);
    assert!(tree.dropped_relations().is_empty());
}

#[test]
fn back_edge_is_dropped_not_followed() {
    let (_, v2) = load();
    let tree = build_relation_tree(&v2, "donor");

    assert_eq!(tree.len(), 3);
    let specimen = tree.find("specimen").unwrap();
    assert_eq!(specimen.dropped.len(), 1);
    assert_eq!(specimen.dropped[0].target, "donor");
    assert_eq!(specimen.dropped[0].kind, DroppedKind::Cross);

    let links = tree.links(&v2);
    assert_eq!(links.len(), 3);
    assert_eq!(links[2].kind, LinkKind::Dropped(DroppedKind::Cross));
    assert!(!links[2].reversed);
}

#[test]
fn tree_serializes_to_renderer_json() {
    let (_, v2) = load();
    let tree = build_relation_tree(&v2, "donor");

    let rendered = json!({
        "nodes": tree.nodes(),
        "links": tree.links(&v2),
    });

    let specimen = &rendered["nodes"][1];
    assert_eq!(specimen["name"], json!("specimen"));
    assert_eq!(specimen["depth"], json!(1));
    assert_eq!(specimen["parent"], json!(0));
    assert_eq!(specimen["children"], json!([2]));
    assert_eq!(specimen["dropped"][0]["target"], json!("donor"));
    assert_eq!(specimen["dropped"][0]["kind"], json!("cross"));
    assert_eq!(rendered["nodes"][0]["parent"], serde_json::Value::Null);

    let links = rendered["links"].as_array().unwrap();
    assert_eq!(links.len(), 3);
    assert_eq!(links[0]["kind"], json!("tree"));
    assert_eq!(
        links[0]["relations"],
        json!([{"other": "specimen", "fields": ["donor_id"], "otherFields": ["donor_id"]}])
    );
    assert_eq!(links[2]["kind"], json!({"dropped": "cross"}));
    assert_eq!(links[2]["source"], json!("specimen"));
    assert_eq!(links[2]["reversed"], json!(false));
}

#[test]
fn repeated_builds_are_identical() {
    let (_, v2) = load();
    for direction in [EdgeDirection::Forward, EdgeDirection::Reverse] {
        let first = RelationTree::build(&v2, "donor", direction);
        let second = RelationTree::build(&v2, "donor", direction);
        assert_eq!(first, second);
    }
}

#[test]
fn node_fields_classify_against_previous_version() {
    let (v1, v2) = load();
    let tree = build_relation_tree(&v2, "donor");

    let statuses: Vec<(String, DiffStatus)> = tree
        .root()
        .fields
        .iter()
        .map(|field| {
            let previous = find_field(&v1, &tree.root().name, &field.name);
            (field.name.clone(), compare_field(field, previous).status)
        })
        .collect();

    assert_eq!(
        statuses,
        vec![
            ("donor_id".to_string(), DiffStatus::Changed),
            ("donor_sex".to_string(), DiffStatus::Changed),
            ("donor_age".to_string(), DiffStatus::New),
        ]
    );

    let donor_sex = find_field(&v2, "donor", "donor_sex").unwrap();
    let result = compare_field(donor_sex, find_field(&v1, "donor", "donor_sex"));
    assert_eq!(result.diffs, vec![FieldAttribute::Controlled]);

    let donor_id = find_field(&v2, "donor", "donor_id").unwrap();
    let result = compare_field(donor_id, find_field(&v1, "donor", "donor_id"));
    assert_eq!(result.diffs, vec![FieldAttribute::Restriction(RestrictionKind::Required)]);
}

#[test]
fn legacy_example_strings_do_not_count_as_changes() {
    let (v1, v2) = load();
    let report = compare_dictionaries(&v2, Some(&v1));

    let specimen = report.file_type("specimen").unwrap();
    assert_eq!(specimen.field("specimen_id").unwrap().result.status, DiffStatus::Unchanged);
    assert_eq!(report.summary.changed_fields, 2);
    assert_eq!(report.summary.new_fields, 1);
}

#[test]
fn filtering_never_fails() {
    let (_, v2) = load();

    let everything = match_counts(&v2, &filter_by_text(""));
    assert_eq!(everything.values().sum::<usize>(), 6);

    let invalid = filter_by_text("[unterminated");
    assert!(match_counts(&v2, &invalid).is_empty());

    let regex_hits = match_counts(&v2, &filter_by_text(r"\^SP"));
    assert_eq!(regex_hits.get("specimen"), Some(&1));
}

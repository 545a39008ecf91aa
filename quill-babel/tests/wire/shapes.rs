//! Attribute vs summary-child disclosures

use crate::common::*;
use quill_babel::ir::nodes::*;
use quill_babel::{
    from_wire, normalize, serialize_canonical, serialize_legacy, to_wire, FormatRegistry,
    MarkupOptions, WireShape,
};

const WARNING: &str = "<details>\n<summary>warn</summary>\nhidden\n</details>\n";

const ATTRIBUTE_SHAPE: &str = r#"[
    { "type": "disclosure", "summary": [{ "text": "warn" }], "children": [
        { "type": "paragraph", "children": [{ "text": "hidden" }] }
    ] }
]"#;

const SUMMARY_CHILD_SHAPE: &str = r#"[
    { "type": "spoiler", "children": [
        { "type": "summary", "children": [{ "text": "warn" }] },
        { "children": [{ "text": "hidden" }] }
    ] }
]"#;

fn review() -> Document {
    Document::new(vec![
        heading(1, "Review"),
        disclosure(
            "Spoilers",
            vec![
                para("It was a dream."),
                disclosure("", vec![para("Or was it?")]),
            ],
        ),
        Block::CodeBlock(CodeBlock {
            language: None,
            literal: "quoted".to_string(),
        }),
    ])
}

#[test]
fn test_both_shapes_serialize_identically() {
    let options = MarkupOptions::default();
    let canonical = serialize_canonical(&wire(ATTRIBUTE_SHAPE), &options).unwrap();
    let legacy = serialize_legacy(&wire(SUMMARY_CHILD_SHAPE), &options).unwrap();

    assert_eq!(canonical, WARNING);
    assert_eq!(legacy, WARNING);
}

#[test]
fn test_legacy_entry_point_accepts_canonical_trees() {
    let options = MarkupOptions::default();
    assert_eq!(
        serialize_legacy(&wire(ATTRIBUTE_SHAPE), &options).unwrap(),
        WARNING
    );
}

#[test]
fn test_canonical_entry_point_on_legacy_tree_keeps_summary_in_body() {
    let output = serialize_canonical(&wire(SUMMARY_CHILD_SHAPE), &MarkupOptions::default()).unwrap();
    assert_eq!(
        output,
        "<details>\n<summary></summary>\nwarn\n\nhidden\n</details>\n"
    );
}

#[test]
fn test_typed_trees_agree_across_shapes() {
    let attribute = to_wire(&review(), WireShape::Attribute);
    let summary_child = to_wire(&review(), WireShape::SummaryChild);

    assert_eq!(from_wire(&attribute).unwrap(), review());
    assert_eq!(from_wire(&normalize(summary_child)).unwrap(), review());
}

#[test]
fn test_canonical_trees_are_left_alone() {
    let canonical = to_wire(&review(), WireShape::Attribute);
    assert_eq!(normalize(canonical.clone()), canonical);
}

#[test]
fn test_serialization_after_normalizing_is_idempotent() {
    let options = MarkupOptions::default();
    for nodes in [
        wire(SUMMARY_CHILD_SHAPE),
        wire(ATTRIBUTE_SHAPE),
        to_wire(&review(), WireShape::SummaryChild),
    ] {
        let once = normalize(nodes);
        let twice = normalize(once.clone());
        assert_eq!(
            serialize_canonical(&once, &options).unwrap(),
            serialize_canonical(&twice, &options).unwrap()
        );
    }
}

#[test]
fn test_registry_converts_legacy_json_to_markup() {
    let registry = FormatRegistry::default();
    let doc = registry.parse(SUMMARY_CHILD_SHAPE, "json-legacy").unwrap();
    assert_eq!(registry.serialize(&doc, "markup").unwrap(), WARNING);

    let json = registry.serialize(&doc, "json").unwrap();
    assert_eq!(registry.parse(&json, "json").unwrap(), doc);
}

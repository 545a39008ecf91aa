//! Disclosure blocks through the public entry points
//!
//! Serialization is compared as text, parsing as typed trees.

use crate::common::*;
use insta::assert_snapshot;
use quill_babel::ir::nodes::*;
use quill_babel::{
    parse_markup, serialize_document, BabelError, MarkupOptions, MentionDirectory,
};

fn parse(source: &str) -> Document {
    parse_markup(source, &MarkupOptions::default()).unwrap()
}

fn serialize(blocks: Vec<Block>) -> String {
    serialize_document(&Document::new(blocks), &MarkupOptions::default()).unwrap()
}

#[test]
fn test_warning_disclosure_both_ways() {
    let doc = Document::new(vec![disclosure("warn", vec![para("hidden")])]);
    let markup = "<details>\n<summary>warn</summary>\nhidden\n</details>\n";

    assert_eq!(serialize_document(&doc, &MarkupOptions::default()).unwrap(), markup);
    assert_eq!(parse(markup), doc);
}

#[test]
fn test_review_with_spoilers() {
    let output = serialize(vec![
        heading(2, "Verdict"),
        para("Worth it."),
        disclosure(
            "Ending",
            vec![
                para("The butler did it."),
                disclosure("Post-credits", vec![para("He did it again.")]),
            ],
        ),
        para("Four stars."),
    ]);
    assert_snapshot!(output, @r###"
    ## Verdict

    Worth it.

    <details>
    <summary>Ending</summary>
    The butler did it.

    <details>
    <summary>Post-credits</summary>
    He did it again.
    </details>
    </details>

    Four stars.
    "###);

    let reparsed = parse(&output);
    assert_eq!(reparsed.blocks.len(), 4);
    match &reparsed.blocks[2] {
        Block::Disclosure(outer) => match &outer.body[1] {
            Block::Disclosure(inner) => {
                assert_eq!(inner.summary, vec![text("Post-credits")]);
                assert_eq!(inner.body, vec![para("He did it again.")]);
            }
            other => panic!("expected nested disclosure, got {other:?}"),
        },
        other => panic!("expected disclosure, got {other:?}"),
    }
}

#[test]
fn test_truncated_disclosure_takes_everything_after_it() {
    let doc = parse("<details>\n<summary>S</summary>\none\n\n## two\n\n```\nthree\n```\n\nfour");

    assert_eq!(doc.blocks.len(), 1, "exactly one disclosure: {doc:?}");
    match &doc.blocks[0] {
        Block::Disclosure(disclosure) => {
            assert_eq!(disclosure.summary, vec![text("S")]);
            assert_eq!(disclosure.body.len(), 4);
            assert_eq!(disclosure.body[3], para("four"));
        }
        other => panic!("expected disclosure, got {other:?}"),
    }
}

#[test]
fn test_truncated_nested_disclosures_close_innermost_first() {
    let doc = parse("<details>\n<summary>a</summary>\n<details>\n<summary>b</summary>\ndeep");
    assert_eq!(
        doc,
        Document::new(vec![disclosure(
            "a",
            vec![disclosure("b", vec![para("deep")])]
        )])
    );
}

#[test]
fn test_stray_closers_are_ignored() {
    let doc = parse("</details>\n\ntext\n\n</details>");
    assert_eq!(doc, Document::new(vec![para("text")]));
}

#[test]
fn test_fences_are_inert() {
    let literal = "![cat](cat.png)\n[link](https://example.com)\n<details>\n<summary>no</summary>\n</details>";
    let code = Block::CodeBlock(CodeBlock {
        language: Some("md".to_string()),
        literal: literal.to_string(),
    });

    let output = serialize(vec![disclosure("code", vec![code.clone()])]);
    let reparsed = parse(&output);
    assert_eq!(reparsed, Document::new(vec![disclosure("code", vec![code])]));
}

#[test]
fn test_images_inside_disclosures() {
    let image = Block::Image(Image {
        url: "https://cdn.example.com/shots/ending.jpg".to_string(),
        alt: String::new(),
    });
    let output = serialize(vec![disclosure("Screenshot", vec![image])]);
    assert_eq!(
        output,
        "<details>\n<summary>Screenshot</summary>\n![ending.jpg](https://cdn.example.com/shots/ending.jpg)\n</details>\n"
    );

    match &parse(&output).blocks[0] {
        Block::Disclosure(disclosure) => assert_eq!(
            disclosure.body,
            vec![Block::Image(Image {
                url: "https://cdn.example.com/shots/ending.jpg".to_string(),
                alt: "ending.jpg".to_string(),
            })]
        ),
        other => panic!("expected disclosure, got {other:?}"),
    }
}

#[test]
fn test_depth_limit_in_both_directions() {
    let options = MarkupOptions::default().with_max_depth(3);

    let at_limit = serialize_document(&nested(3), &options).unwrap();
    assert_eq!(parse_markup(&at_limit, &options).unwrap(), nested(3));

    assert_eq!(
        serialize_document(&nested(4), &options),
        Err(BabelError::StructureTooDeep { limit: 3 })
    );

    let too_deep = serialize_document(&nested(4), &MarkupOptions::default()).unwrap();
    assert_eq!(
        parse_markup(&too_deep, &options),
        Err(BabelError::StructureTooDeep { limit: 3 })
    );
}

#[test]
fn test_default_depth_accepts_deep_nesting() {
    let markup = serialize_document(&nested(32), &MarkupOptions::default()).unwrap();
    assert_eq!(parse(&markup), nested(32));
    assert!(serialize_document(&nested(33), &MarkupOptions::default()).is_err());
}

#[test]
fn test_mentions_recovered_through_directory() {
    let directory: MentionDirectory = [("ann", "u-1"), ("anna", "u-2")].into_iter().collect();
    let options = MarkupOptions::default().with_mentions(directory);

    let doc = Document::new(vec![Block::Paragraph(Paragraph::new(vec![
        text("thanks "),
        Inline::Mention(Mention::new("u-2", "anna").unwrap()),
        text(" and "),
        Inline::Mention(Mention::new("u-1", "ann").unwrap()),
    ]))]);

    let markup = serialize_document(&doc, &options).unwrap();
    assert_eq!(markup, "thanks @anna and @ann\n");
    assert_eq!(parse_markup(&markup, &options).unwrap(), doc);

    // Without the directory the mention reads back as text.
    assert_eq!(
        parse(&markup),
        Document::new(vec![para("thanks @anna and @ann")])
    );
}

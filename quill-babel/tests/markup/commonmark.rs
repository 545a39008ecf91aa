//! CommonMark cross-checks
//!
//! The dialect shares headings, fences and emphasis with CommonMark. These
//! tests run serializer output through Comrak and check it reads the same.

use comrak::nodes::{AstNode, NodeValue};
use comrak::{parse_document, Arena, ComrakOptions};
use quill_babel::ir::nodes::*;
use quill_babel::{serialize_document, MarkupOptions};

fn to_comrak<'a>(blocks: Vec<Block>, arena: &'a Arena<AstNode<'a>>) -> &'a AstNode<'a> {
    let markup =
        serialize_document(&Document::new(blocks), &MarkupOptions::default()).unwrap();
    parse_document(arena, &markup, &ComrakOptions::default())
}

fn collect_text<'a>(node: &'a AstNode<'a>, out: &mut String) {
    if let NodeValue::Text(text) = &node.data.borrow().value {
        out.push_str(text);
    }
    for child in node.children() {
        collect_text(child, out);
    }
}

#[test]
fn test_heading_levels_match() {
    let arena = Arena::new();
    let root = to_comrak(
        vec![
            Block::Heading(Heading::new(1, vec![Inline::Text(Text::plain("One"))]).unwrap()),
            Block::Heading(Heading::new(4, vec![Inline::Text(Text::plain("Four"))]).unwrap()),
        ],
        &arena,
    );

    let mut levels = Vec::new();
    for child in root.children() {
        if let NodeValue::Heading(heading) = &child.data.borrow().value {
            levels.push(heading.level);
        }
        let mut text = String::new();
        collect_text(child, &mut text);
        assert!(text == "One" || text == "Four", "unexpected heading {text:?}");
    }
    assert_eq!(levels, vec![1, 4]);
}

#[test]
fn test_fence_language_and_literal_match() {
    let arena = Arena::new();
    let root = to_comrak(
        vec![Block::CodeBlock(CodeBlock {
            language: Some("rust".to_string()),
            literal: "```\nfn main() {}".to_string(),
        })],
        &arena,
    );

    let first = root.first_child().expect("a code block");
    match &first.data.borrow().value {
        NodeValue::CodeBlock(code) => {
            assert_eq!(code.info, "rust");
            assert_eq!(code.literal, "```\nfn main() {}\n");
        }
        other => panic!("expected a code block, got {other:?}"),
    };
}

#[test]
fn test_bold_and_italic_match() {
    let bold = Marks {
        bold: true,
        ..Marks::default()
    };
    let italic = Marks {
        italic: true,
        ..Marks::default()
    };
    let arena = Arena::new();
    let root = to_comrak(
        vec![Block::Paragraph(Paragraph::new(vec![
            Inline::Text(Text::new("loud", bold)),
            Inline::Text(Text::plain(" and ")),
            Inline::Text(Text::new("soft", italic)),
        ]))],
        &arena,
    );

    let paragraph = root.first_child().expect("a paragraph");
    let kinds: Vec<String> = paragraph
        .children()
        .map(|child| match &child.data.borrow().value {
            NodeValue::Strong => "strong".to_string(),
            NodeValue::Emph => "emph".to_string(),
            NodeValue::Text(text) => format!("text:{text}"),
            _ => "other".to_string(),
        })
        .collect();
    assert_eq!(kinds, vec!["strong", "text: and ", "emph"]);
}

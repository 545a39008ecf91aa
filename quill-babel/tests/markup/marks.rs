//! Inline marks, links and escaping

use crate::common::*;
use quill_babel::ir::nodes::*;
use quill_babel::{parse_markup, serialize_document, MarkupOptions};

fn round_trip(inlines: Vec<Inline>) -> (String, Document) {
    let doc = Document::new(vec![Block::Paragraph(Paragraph::new(inlines))]);
    let markup = serialize_document(&doc, &MarkupOptions::default()).unwrap();
    let parsed = parse_markup(&markup, &MarkupOptions::default()).unwrap();
    (markup, parsed)
}

#[test]
fn test_bold_strikethrough_order_is_fixed() {
    let mut first = Marks::default();
    first.bold = true;
    first.strikethrough = true;

    let mut second = Marks::default();
    second.strikethrough = true;
    second.bold = true;

    let (a, _) = round_trip(vec![marked("x", first)]);
    let (b, _) = round_trip(vec![marked("x", second)]);
    assert_eq!(a, "~~**x**~~\n");
    assert_eq!(a, b);
}

#[test]
fn test_overlapping_marks_survive() {
    let bold = Marks {
        bold: true,
        ..Marks::default()
    };
    let bold_italic = Marks {
        italic: true,
        ..bold
    };
    let italic = Marks {
        italic: true,
        ..Marks::default()
    };
    let inlines = vec![
        marked("a", bold),
        marked("b", bold_italic),
        marked("c", italic),
        text("d"),
    ];

    let (markup, parsed) = round_trip(inlines.clone());
    assert_eq!(markup, "**a_b_**_c_d\n");
    assert_eq!(
        parsed,
        Document::new(vec![Block::Paragraph(Paragraph::new(inlines))])
    );
}

#[test]
fn test_underline_is_innermost() {
    let all = Marks {
        bold: true,
        italic: true,
        strikethrough: true,
        underline: true,
    };
    let (markup, parsed) = round_trip(vec![marked("x", all)]);
    assert_eq!(markup, "~~**_<u>x</u>_**~~\n");
    assert_eq!(
        parsed,
        Document::new(vec![Block::Paragraph(Paragraph::new(vec![marked("x", all)]))])
    );
}

#[test]
fn test_delimiter_characters_in_text_are_literal() {
    let literal = r"2 * 3 = 6, snake_case, ~tilde~, [brackets], <u>tag</u> \ done";
    let (markup, parsed) = round_trip(vec![text(literal)]);
    assert!(markup.contains(r"snake\_case"), "{markup}");
    assert_eq!(parsed, Document::new(vec![para(literal)]));
}

#[test]
fn test_block_syntax_at_line_start_is_escaped() {
    let (markup, parsed) = round_trip(vec![text("# not a heading\n```not a fence")]);
    assert_eq!(markup, "\\# not a heading\n\\```not a fence\n");
    assert_eq!(
        parsed,
        Document::new(vec![para("# not a heading\n```not a fence")])
    );
}

#[test]
fn test_links_keep_children_and_url() {
    let bold = Marks {
        bold: true,
        ..Marks::default()
    };
    let inlines = vec![
        text("see "),
        Inline::Link(Link {
            url: "https://example.com/a b".to_string(),
            children: vec![text("the "), marked("docs", bold)],
        }),
    ];
    let (markup, parsed) = round_trip(inlines);
    assert_eq!(markup, "see [the **docs**](https://example.com/a%20b)\n");
    match &parsed.blocks[0] {
        Block::Paragraph(paragraph) => match &paragraph.content[1] {
            Inline::Link(link) => {
                assert_eq!(link.url, "https://example.com/a%20b");
                assert_eq!(link.children, vec![text("the "), marked("docs", bold)]);
            }
            other => panic!("expected link, got {other:?}"),
        },
        other => panic!("expected paragraph, got {other:?}"),
    }
}

#[test]
fn test_bang_before_link_does_not_make_an_image() {
    let inlines = vec![
        text("wow!"),
        Inline::Link(Link {
            url: "https://example.com".to_string(),
            children: vec![text("here")],
        }),
    ];
    let (markup, parsed) = round_trip(inlines.clone());
    assert_eq!(markup, "wow\\![here](https://example.com)\n");
    assert_eq!(
        parsed,
        Document::new(vec![Block::Paragraph(Paragraph::new(inlines))])
    );
}

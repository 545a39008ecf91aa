//! Round-trip laws over generated documents
//!
//! Text draws on every character the writer has to escape, line breaks,
//! whitespace-only lines and carriage returns. What the dialect cannot keep
//! is accounted for by `check_document`. Mentions come from a fixed
//! directory so they resolve when read back.

use proptest::prelude::*;
use quill_babel::ir::nodes::*;
use quill_babel::roundtrip::{check_document, check_markup};
use quill_babel::{MarkupOptions, MentionDirectory};

const PEOPLE: [(&str, &str); 2] = [("ann", "u-1"), ("bob lee", "u-2")];

fn options() -> MarkupOptions {
    let directory: MentionDirectory = PEOPLE.into_iter().collect();
    MarkupOptions::default().with_mentions(directory)
}

fn marks() -> impl Strategy<Value = Marks> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(bold, italic, strikethrough, underline)| Marks {
            bold,
            italic,
            strikethrough,
            underline,
        },
    )
}

fn words() -> impl Strategy<Value = String> {
    r"[a-z#`!@*_~<>\[\]\\ ]{1,8}((\n|\n[ \t]{1,2}\n|\r\n)[a-z#`!@*_~<>\[\]\\ ]{0,6}){0,2}"
}

fn text_run() -> impl Strategy<Value = Inline> {
    (words(), marks()).prop_map(|(value, marks)| Inline::Text(Text::new(value, marks)))
}

fn inline() -> impl Strategy<Value = Inline> {
    prop_oneof![
        4 => text_run(),
        1 => prop::sample::select(PEOPLE.to_vec())
            .prop_map(|(display, id)| Inline::Mention(Mention::new(id, display).unwrap())),
        1 => ("[a-z]{1,6}", prop::collection::vec(text_run(), 0..3)).prop_map(
            |(path, children)| Inline::Link(Link {
                url: format!("https://example.com/{path}"),
                children,
            })
        ),
    ]
}

fn inlines(min: usize) -> impl Strategy<Value = Vec<Inline>> {
    prop::collection::vec(inline(), min..4)
}

fn leaf_block() -> impl Strategy<Value = Block> {
    prop_oneof![
        inlines(1).prop_map(|content| Block::Paragraph(Paragraph::new(content))),
        (1i64..=6, inlines(0))
            .prop_map(|(level, content)| Block::Heading(Heading::new(level, content).unwrap())),
        (
            prop::option::of(r"[a-z` \r]{0,5}"),
            prop::collection::vec(r"[a-z`#!@\[\]() <>\r]{0,10}", 1..4)
        )
            .prop_map(|(language, lines)| Block::CodeBlock(CodeBlock {
                language,
                literal: lines.join("\n"),
            })),
        ("[a-z]{1,8}", prop::option::of(r"[a-z @_\[\]]{1,6}")).prop_map(|(name, alt)| {
            Block::Image(Image {
                url: format!("https://example.com/img/{name}.png"),
                alt: alt.unwrap_or_default(),
            })
        }),
    ]
}

fn block() -> impl Strategy<Value = Block> {
    leaf_block().prop_recursive(4, 24, 4, |inner| {
        (inlines(0), prop::collection::vec(inner, 0..4))
            .prop_map(|(summary, body)| Block::Disclosure(Disclosure::new(summary, body)))
    })
}

fn document() -> impl Strategy<Value = Document> {
    prop::collection::vec(block(), 0..6).prop_map(Document::new)
}

proptest! {
    #[test]
    fn serialized_documents_parse_back(doc in document()) {
        let report = check_document(&doc, &options()).unwrap();
        prop_assert!(report.is_stable(), "{:?}\n{}", report.divergence, report.markup);
    }

    #[test]
    fn serialized_markup_is_a_fixed_point(doc in document()) {
        let report = check_document(&doc, &options()).unwrap();
        let stable = check_markup(&report.markup, &options()).unwrap();
        prop_assert!(stable.is_stable(), "{:?}", stable.divergence);
        prop_assert_eq!(stable.markup, report.markup);
    }

    #[test]
    fn single_lines_of_delimiters_settle(line in r"[a-z *_~\\\[\]()<>u/@!#]{0,30}") {
        let report = check_markup(&line, &MarkupOptions::default()).unwrap();
        prop_assert!(report.is_stable(), "{:?}", report.divergence);
    }
}

//! Round-trip checks for the markup parser/serializer pair.
//!
//! Two laws hold for every input:
//!
//! 1. Markup stability: `serialize(parse(x))` is a fixed point, so saving a
//!    loaded document twice never changes the stored text again.
//! 2. Tree preservation: `parse(serialize(doc))` equals `doc` once both are
//!    compacted and `doc` is viewed through the dialect's lossy axes
//!    (unresolvable mentions become `@display` text, image alt text becomes
//!    the written label, heading, summary and link label newlines become
//!    spaces, whitespace-only paragraph lines and carriage returns disappear,
//!    fence info strings lose backticks and surrounding whitespace).
//!
//! The checks report the first divergence instead of panicking so the CLI can
//! print it and tests can assert on it.

use crate::error::BabelError;
use crate::formats::markup::inline::{drop_blank_lines, image_label};
use crate::formats::markup::parser::parse_from_markup;
use crate::formats::markup::serializer::{fence_info, serialize_to_markup};
use crate::formats::markup::{MarkupOptions, MentionDirectory};
use crate::ir::nodes::*;

/// Where a round trip first stopped matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Divergence {
    /// Serializing the reparsed markup changed line `line` (1-based)
    Markup {
        line: usize,
        first: String,
        second: String,
    },
    /// The reparsed tree differs at `path`
    Tree {
        path: String,
        expected: String,
        found: String,
    },
}

impl std::fmt::Display for Divergence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Divergence::Markup {
                line,
                first,
                second,
            } => write!(f, "line {line}: {first:?} became {second:?}"),
            Divergence::Tree {
                path,
                expected,
                found,
            } => write!(f, "{path}: expected {expected}, found {found}"),
        }
    }
}

/// Outcome of a round-trip check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTripReport {
    /// The markup produced by the first serialization
    pub markup: String,
    pub divergence: Option<Divergence>,
}

impl RoundTripReport {
    pub fn is_stable(&self) -> bool {
        self.divergence.is_none()
    }
}

/// Checks that `serialize(parse(text))` is a fixed point.
pub fn check_markup(text: &str, options: &MarkupOptions) -> Result<RoundTripReport, BabelError> {
    let first = serialize_to_markup(&parse_from_markup(text, options)?, options)?;
    let second = serialize_to_markup(&parse_from_markup(&first, options)?, options)?;

    let divergence = if first == second {
        None
    } else {
        Some(first_line_divergence(&first, &second))
    };
    Ok(RoundTripReport {
        markup: first,
        divergence,
    })
}

/// Checks that `parse(serialize(doc))` keeps the content of `doc`.
pub fn check_document(doc: &Document, options: &MarkupOptions) -> Result<RoundTripReport, BabelError> {
    let markup = serialize_to_markup(doc, options)?;
    let found = parse_from_markup(&markup, options)?.compact();
    let expected = lossy_view(doc, &options.mentions).compact();

    let divergence = block_divergence(&expected.blocks, &found.blocks, "blocks");
    Ok(RoundTripReport { markup, divergence })
}

fn first_line_divergence(first: &str, second: &str) -> Divergence {
    let mut left = first.lines();
    let mut right = second.lines();
    let mut line = 1;
    loop {
        match (left.next(), right.next()) {
            (Some(a), Some(b)) if a == b => line += 1,
            (a, b) => {
                return Divergence::Markup {
                    line,
                    first: a.unwrap_or_default().to_string(),
                    second: b.unwrap_or_default().to_string(),
                }
            }
        }
    }
}

fn block_divergence(expected: &[Block], found: &[Block], path: &str) -> Option<Divergence> {
    for (i, pair) in expected.iter().zip(found).enumerate() {
        let here = format!("{path}[{i}]");
        match pair {
            (a, b) if a == b => continue,
            (Block::Disclosure(a), Block::Disclosure(b)) if a.summary == b.summary => {
                return block_divergence(&a.body, &b.body, &format!("{here}.body"));
            }
            (a, b) => {
                return Some(Divergence::Tree {
                    path: here,
                    expected: format!("{a:?}"),
                    found: format!("{b:?}"),
                })
            }
        }
    }

    if expected.len() == found.len() {
        return None;
    }
    let i = expected.len().min(found.len());
    let describe = |blocks: &[Block]| {
        blocks
            .get(i)
            .map(|block| format!("{block:?}"))
            .unwrap_or_else(|| "nothing".to_string())
    };
    Some(Divergence::Tree {
        path: format!("{path}[{i}]"),
        expected: describe(expected),
        found: describe(found),
    })
}

/// The tree as markup can represent it.
fn lossy_view(doc: &Document, mentions: &MentionDirectory) -> Document {
    Document::new(lossy_blocks(&doc.blocks, mentions))
}

fn lossy_blocks(blocks: &[Block], mentions: &MentionDirectory) -> Vec<Block> {
    blocks
        .iter()
        .map(|block| match block {
            Block::Paragraph(paragraph) => Block::Paragraph(Paragraph::new(drop_blank_lines(
                &lossy_inlines(&paragraph.content, mentions, false),
            ))),
            Block::Heading(heading) => Block::Heading(Heading {
                level: heading.level,
                content: lossy_inlines(&heading.content, mentions, true),
            }),
            Block::Disclosure(disclosure) => Block::Disclosure(Disclosure::new(
                lossy_inlines(&disclosure.summary, mentions, true),
                lossy_blocks(&disclosure.body, mentions),
            )),
            Block::Image(image) => Block::Image(Image {
                url: image.url.clone(),
                alt: written_text(&image_label(image), true),
            }),
            Block::CodeBlock(code) => Block::CodeBlock(CodeBlock {
                language: fence_info(code.language.as_deref()),
                literal: code.literal.clone(),
            }),
        })
        .collect()
}

fn lossy_inlines(inlines: &[Inline], mentions: &MentionDirectory, single_line: bool) -> Vec<Inline> {
    inlines
        .iter()
        .map(|inline| match inline {
            Inline::Text(text) => Inline::Text(Text::new(
                written_text(&text.value, single_line),
                text.marks,
            )),
            Inline::Mention(mention) => {
                let as_text = || {
                    let display = written_text(&mention.display, true);
                    Inline::Text(Text::plain(format!("@{display}")))
                };
                match mentions.resolve(&mention.display) {
                    Some(user_id) => Mention::new(user_id, mention.display.clone())
                        .map(Inline::Mention)
                        .unwrap_or_else(|_| as_text()),
                    None => as_text(),
                }
            }
            Inline::Link(link) => Inline::Link(Link {
                url: link.url.clone(),
                children: lossy_inlines(&link.children, mentions, true),
            }),
        })
        .collect()
}

/// Text as the inline writer puts it on the page.
fn written_text(value: &str, single_line: bool) -> String {
    let value = value.replace('\r', "");
    if single_line {
        value.replace('\n', " ")
    } else {
        value
    }
}

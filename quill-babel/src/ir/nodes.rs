//! Core data structures for the typed document tree.
//!
//! Every consumer matches these enums exhaustively; there is no "any shape"
//! node. Wire-level leniency (missing types, legacy disclosure shapes) lives in
//! [`crate::ir::wire`] and is resolved before a tree of this module exists.

use crate::error::ValidationError;

/// Represents the root of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

/// A block-level node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(Paragraph),
    Heading(Heading),
    Disclosure(Disclosure),
    CodeBlock(CodeBlock),
    Image(Image),
}

/// An inline node. Marks live on [`Text`], not on wrapper nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(Text),
    Mention(Mention),
    Link(Link),
}

/// Represents a paragraph of inline content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    pub content: Vec<Inline>,
}

/// A heading level, guaranteed to be within 1..=6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    pub fn new(level: i64) -> Result<Self, ValidationError> {
        if (1..=6).contains(&level) {
            Ok(HeadingLevel(level as u8))
        } else {
            Err(ValidationError::HeadingLevel(level))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for HeadingLevel {
    type Error = ValidationError;

    fn try_from(level: i64) -> Result<Self, Self::Error> {
        HeadingLevel::new(level)
    }
}

/// Represents a heading with a specific level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: HeadingLevel,
    pub content: Vec<Inline>,
}

impl Heading {
    pub fn new(level: i64, content: Vec<Inline>) -> Result<Self, ValidationError> {
        Ok(Heading {
            level: HeadingLevel::new(level)?,
            content,
        })
    }
}

/// Boolean inline marks carried by a text run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
}

impl Marks {
    pub fn is_plain(&self) -> bool {
        *self == Marks::default()
    }
}

/// A run of text sharing one mark set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub value: String,
    pub marks: Marks,
}

impl Text {
    pub fn new(value: impl Into<String>, marks: Marks) -> Self {
        Text {
            value: value.into(),
            marks,
        }
    }

    pub fn plain(value: impl Into<String>) -> Self {
        Text::new(value, Marks::default())
    }
}

/// Stable user identifier of a mention; never empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            Err(ValidationError::EmptyUserId)
        } else {
            Ok(UserId(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An inline reference to a user.
///
/// Only `display` is written to markup; `user_id` survives a round trip only
/// when the parser is given a mention directory that maps the display value
/// back to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    pub user_id: UserId,
    pub display: String,
}

impl Mention {
    pub fn new(
        user_id: impl Into<String>,
        display: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Mention {
            user_id: UserId::new(user_id)?,
            display: display.into(),
        })
    }
}

/// A collapsible "spoiler" block in canonical shape.
///
/// The summary is an attribute of the node; `body` never holds a summary
/// pseudo-node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Disclosure {
    pub summary: Vec<Inline>,
    pub body: Vec<Block>,
}

/// Represents a fenced block of literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: Option<String>,
    pub literal: String,
}

/// Represents an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub url: String,
    pub alt: String,
}

/// Represents a hyperlink around inline content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub url: String,
    pub children: Vec<Inline>,
}

impl Paragraph {
    pub fn new(content: Vec<Inline>) -> Self {
        Paragraph { content }
    }

    /// A paragraph holding a single plain text run.
    pub fn from_text(text: impl Into<String>) -> Self {
        Paragraph::new(vec![Inline::Text(Text::plain(text))])
    }
}

impl Disclosure {
    pub fn new(summary: Vec<Inline>, body: Vec<Block>) -> Self {
        Disclosure { summary, body }
    }
}

impl Inline {
    /// Concatenated text as a reader would see it.
    pub fn plain_text(&self) -> String {
        match self {
            Inline::Text(text) => text.value.clone(),
            Inline::Mention(mention) => format!("@{}", mention.display),
            Inline::Link(link) => inlines_text(&link.children),
        }
    }
}

pub fn inlines_text(inlines: &[Inline]) -> String {
    inlines.iter().map(Inline::plain_text).collect()
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Document { blocks }
    }

    /// Returns the semantically equivalent tree with adjacent text runs of
    /// identical marks merged, empty runs dropped and empty paragraphs
    /// removed.
    pub fn compact(&self) -> Document {
        Document {
            blocks: compact_blocks(&self.blocks),
        }
    }
}

fn compact_blocks(blocks: &[Block]) -> Vec<Block> {
    let mut out = Vec::with_capacity(blocks.len());
    for block in blocks {
        match block {
            Block::Paragraph(paragraph) => {
                let content = compact_inlines(&paragraph.content);
                if !content.is_empty() {
                    out.push(Block::Paragraph(Paragraph { content }));
                }
            }
            Block::Heading(heading) => out.push(Block::Heading(Heading {
                level: heading.level,
                content: compact_inlines(&heading.content),
            })),
            Block::Disclosure(disclosure) => out.push(Block::Disclosure(Disclosure {
                summary: compact_inlines(&disclosure.summary),
                body: compact_blocks(&disclosure.body),
            })),
            Block::CodeBlock(_) | Block::Image(_) => out.push(block.clone()),
        }
    }
    out
}

/// Merges adjacent text runs that share a mark set and drops empty runs.
pub fn compact_inlines(inlines: &[Inline]) -> Vec<Inline> {
    let mut out: Vec<Inline> = Vec::with_capacity(inlines.len());
    for inline in inlines {
        match inline {
            Inline::Text(text) if text.value.is_empty() => {}
            Inline::Text(text) => {
                if let Some(Inline::Text(prev)) = out.last_mut() {
                    if prev.marks == text.marks {
                        prev.value.push_str(&text.value);
                        continue;
                    }
                }
                out.push(inline.clone());
            }
            Inline::Link(link) => out.push(Inline::Link(Link {
                url: link.url.clone(),
                children: compact_inlines(&link.children),
            })),
            Inline::Mention(_) => out.push(inline.clone()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_level_rejects_out_of_range() {
        assert!(HeadingLevel::new(1).is_ok());
        assert!(HeadingLevel::new(6).is_ok());
        assert_eq!(HeadingLevel::new(0), Err(ValidationError::HeadingLevel(0)));
        assert_eq!(HeadingLevel::new(7), Err(ValidationError::HeadingLevel(7)));
        assert!(Heading::new(-1, vec![]).is_err());
    }

    #[test]
    fn mention_requires_user_id() {
        assert_eq!(Mention::new("", "bob"), Err(ValidationError::EmptyUserId));
        let mention = Mention::new("u-1", "bob").unwrap();
        assert_eq!(mention.user_id.as_str(), "u-1");
    }

    #[test]
    fn compact_merges_runs_with_equal_marks() {
        let bold = Marks {
            bold: true,
            ..Marks::default()
        };
        let doc = Document::new(vec![
            Block::Paragraph(Paragraph::new(vec![
                Inline::Text(Text::new("a", bold)),
                Inline::Text(Text::plain("")),
                Inline::Text(Text::new("b", bold)),
                Inline::Text(Text::plain("c")),
            ])),
            Block::Paragraph(Paragraph::new(vec![Inline::Text(Text::plain(""))])),
        ]);

        let compacted = doc.compact();
        assert_eq!(
            compacted,
            Document::new(vec![Block::Paragraph(Paragraph::new(vec![
                Inline::Text(Text::new("ab", bold)),
                Inline::Text(Text::plain("c")),
            ]))])
        );
    }

    #[test]
    fn plain_text_includes_mentions_and_links() {
        let inlines = vec![
            Inline::Text(Text::plain("hi ")),
            Inline::Mention(Mention::new("u-1", "bob").unwrap()),
            Inline::Link(Link {
                url: "https://example.com".to_string(),
                children: vec![Inline::Text(Text::plain(" site"))],
            }),
        ];
        assert_eq!(inlines_text(&inlines), "hi @bob site");
    }
}

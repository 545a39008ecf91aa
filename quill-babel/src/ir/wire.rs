//! JSON wire shapes exchanged with the editor.
//!
//! The editor stores documents as a loosely typed node tree: text leaves carry
//! mark flags, elements carry a `type` string that may be missing (meaning
//! paragraph) and a bag of optional attributes. Two historical encodings of a
//! disclosure coexist on the wire:
//!
//! ```text
//! attribute shape:     { "type": "disclosure", "summary": "warn", "children": [ ...body ] }
//! summary-child shape: { "type": "disclosure", "children": [ { "type": "summary", ... }, ...body ] }
//! ```
//!
//! [`from_wire`] assumes the attribute shape. Trees that may be in the
//! summary-child shape must go through [`crate::common::normalize`] first.

use crate::error::{BabelError, ValidationError};
use crate::ir::nodes::{
    Block, CodeBlock, Disclosure, Document, Heading, Image, Inline, Link, Marks, Mention,
    Paragraph, Text,
};
use serde::{Deserialize, Serialize};

pub const PARAGRAPH: &str = "paragraph";
pub const HEADING: &str = "heading";
pub const MENTION: &str = "mention";
pub const DISCLOSURE: &str = "disclosure";
pub const SUMMARY: &str = "summary";
pub const CODE_BLOCK: &str = "code-block";
pub const IMAGE: &str = "image";
pub const LINK: &str = "link";

/// A node as it appears in editor JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireNode {
    Text(WireText),
    Element(WireElement),
}

/// A text leaf with its mark flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireText {
    pub text: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false", alias = "strikeThrough")]
    pub strikethrough: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
}

/// An element node; every attribute is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireElement {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<WireSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default)]
    pub children: Vec<WireNode>,
}

/// The `summary` attribute: plain text from older documents, inline nodes
/// from newer ones. The normalizer always produces `Nodes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireSummary {
    Text(String),
    Nodes(Vec<WireNode>),
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Node kinds recognized on the wire, aliases folded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Paragraph,
    /// Level carried by the type name itself (`heading-two`), if any
    Heading(Option<i64>),
    Mention,
    Disclosure,
    Summary,
    CodeBlock,
    Image,
    Link,
}

impl NodeKind {
    /// Missing and unknown types both read as paragraphs.
    pub fn from_wire(kind: Option<&str>) -> NodeKind {
        match kind.unwrap_or(PARAGRAPH) {
            HEADING => NodeKind::Heading(None),
            "heading-one" | "h1" => NodeKind::Heading(Some(1)),
            "heading-two" | "h2" => NodeKind::Heading(Some(2)),
            "heading-three" | "h3" => NodeKind::Heading(Some(3)),
            "heading-four" | "h4" => NodeKind::Heading(Some(4)),
            "heading-five" | "h5" => NodeKind::Heading(Some(5)),
            "heading-six" | "h6" => NodeKind::Heading(Some(6)),
            MENTION => NodeKind::Mention,
            DISCLOSURE | "spoiler" | "details" => NodeKind::Disclosure,
            SUMMARY => NodeKind::Summary,
            CODE_BLOCK | "code" => NodeKind::CodeBlock,
            IMAGE => NodeKind::Image,
            LINK => NodeKind::Link,
            _ => NodeKind::Paragraph,
        }
    }
}

impl WireElement {
    pub fn new(kind: &str) -> Self {
        WireElement {
            kind: Some(kind.to_string()),
            ..WireElement::default()
        }
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::from_wire(self.kind.as_deref())
    }
}

impl WireNode {
    pub fn text(value: impl Into<String>) -> Self {
        WireNode::Text(WireText {
            text: value.into(),
            ..WireText::default()
        })
    }

    pub fn as_element(&self) -> Option<&WireElement> {
        match self {
            WireNode::Element(element) => Some(element),
            WireNode::Text(_) => None,
        }
    }
}

/// Which disclosure encoding [`to_wire`] writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WireShape {
    /// Summary carried as the `summary` attribute
    #[default]
    Attribute,
    /// Summary carried as a leading `summary` child node
    SummaryChild,
}

/// Reads editor JSON (an array of top-level nodes).
pub fn parse_wire_json(source: &str) -> Result<Vec<WireNode>, BabelError> {
    Ok(serde_json::from_str(source)?)
}

/// Writes editor JSON, pretty-printed.
pub fn to_wire_json(nodes: &[WireNode]) -> Result<String, BabelError> {
    Ok(serde_json::to_string_pretty(nodes)?)
}

// ---------------------------------------------------------------------------
// wire -> typed
// ---------------------------------------------------------------------------

/// Builds a typed document from attribute-shape wire nodes.
///
/// A disclosure without a `summary` attribute gets an empty summary and keeps
/// every child as body, including a leading `summary` node, which then reads
/// as a paragraph.
pub fn from_wire(nodes: &[WireNode]) -> Result<Document, ValidationError> {
    Ok(Document::new(blocks_from_wire(nodes)?))
}

fn blocks_from_wire(nodes: &[WireNode]) -> Result<Vec<Block>, ValidationError> {
    let mut blocks = Vec::new();
    let mut loose_inlines = Vec::new();

    for node in nodes {
        let element = match node {
            WireNode::Text(text) if text.text.is_empty() => continue,
            WireNode::Text(text) => {
                loose_inlines.push(Inline::Text(text_from_wire(text)));
                continue;
            }
            WireNode::Element(element) => element,
        };

        match element.kind() {
            NodeKind::Mention | NodeKind::Link => {
                loose_inlines.extend(inlines_from_wire(std::slice::from_ref(node))?);
            }
            kind => {
                if !loose_inlines.is_empty() {
                    blocks.push(Block::Paragraph(Paragraph::new(std::mem::take(
                        &mut loose_inlines,
                    ))));
                }
                blocks.push(block_from_element(element, kind)?);
            }
        }
    }

    if !loose_inlines.is_empty() {
        blocks.push(Block::Paragraph(Paragraph::new(loose_inlines)));
    }
    Ok(blocks)
}

fn block_from_element(element: &WireElement, kind: NodeKind) -> Result<Block, ValidationError> {
    let block = match kind {
        NodeKind::Heading(named_level) => {
            let level = element.level.or(named_level).unwrap_or(1);
            Block::Heading(Heading::new(level, inlines_from_wire(&element.children)?)?)
        }
        NodeKind::Disclosure => {
            let summary = match &element.summary {
                None => Vec::new(),
                Some(WireSummary::Text(text)) if text.is_empty() => Vec::new(),
                Some(WireSummary::Text(text)) => vec![Inline::Text(Text::plain(text.clone()))],
                Some(WireSummary::Nodes(nodes)) => inlines_from_wire(nodes)?,
            };
            Block::Disclosure(Disclosure::new(
                summary,
                blocks_from_wire(&element.children)?,
            ))
        }
        NodeKind::CodeBlock => Block::CodeBlock(CodeBlock {
            language: element.language.clone().filter(|lang| !lang.is_empty()),
            literal: wire_text_content(&element.children),
        }),
        NodeKind::Image => Block::Image(Image {
            url: element.url.clone().unwrap_or_default(),
            alt: element.alt.clone().unwrap_or_default(),
        }),
        NodeKind::Paragraph | NodeKind::Summary | NodeKind::Mention | NodeKind::Link => {
            Block::Paragraph(Paragraph::new(inlines_from_wire(&element.children)?))
        }
    };
    Ok(block)
}

fn inlines_from_wire(nodes: &[WireNode]) -> Result<Vec<Inline>, ValidationError> {
    let mut inlines = Vec::new();
    for node in nodes {
        let element = match node {
            // Empty leaves only exist because the editor needs one per element.
            WireNode::Text(text) if text.text.is_empty() => continue,
            WireNode::Text(text) => {
                inlines.push(Inline::Text(text_from_wire(text)));
                continue;
            }
            WireNode::Element(element) => element,
        };

        match element.kind() {
            NodeKind::Mention => {
                let user_id = element.user_id.clone().unwrap_or_default();
                let display = element
                    .value
                    .clone()
                    .filter(|value| !value.is_empty())
                    .or_else(|| Some(wire_text_content(&element.children)))
                    .filter(|value| !value.is_empty())
                    .unwrap_or_else(|| user_id.clone());
                inlines.push(Inline::Mention(Mention::new(user_id, display)?));
            }
            NodeKind::Link => inlines.push(Inline::Link(Link {
                url: element.url.clone().unwrap_or_default(),
                children: inlines_from_wire(&element.children)?,
            })),
            NodeKind::Image => {
                let url = element.url.clone().unwrap_or_default();
                let label = element
                    .alt
                    .clone()
                    .filter(|alt| !alt.is_empty())
                    .unwrap_or_else(|| url.clone());
                inlines.push(Inline::Link(Link {
                    url,
                    children: vec![Inline::Text(Text::plain(label))],
                }));
            }
            NodeKind::CodeBlock => inlines.push(Inline::Text(Text::plain(wire_text_content(
                &element.children,
            )))),
            NodeKind::Paragraph
            | NodeKind::Heading(_)
            | NodeKind::Disclosure
            | NodeKind::Summary => inlines.extend(inlines_from_wire(&element.children)?),
        }
    }
    Ok(inlines)
}

fn text_from_wire(text: &WireText) -> Text {
    Text::new(
        text.text.clone(),
        Marks {
            bold: text.bold,
            italic: text.italic,
            strikethrough: text.strikethrough,
            underline: text.underline,
        },
    )
}

/// Concatenated text of all leaves below `nodes`.
pub fn wire_text_content(nodes: &[WireNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            WireNode::Text(text) => out.push_str(&text.text),
            WireNode::Element(element) => out.push_str(&wire_text_content(&element.children)),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// typed -> wire
// ---------------------------------------------------------------------------

/// Writes a typed document as editor JSON nodes in the requested shape.
pub fn to_wire(doc: &Document, shape: WireShape) -> Vec<WireNode> {
    doc.blocks
        .iter()
        .map(|block| block_to_wire(block, shape))
        .collect()
}

fn block_to_wire(block: &Block, shape: WireShape) -> WireNode {
    let element = match block {
        Block::Paragraph(paragraph) => WireElement {
            children: inlines_to_wire(&paragraph.content),
            ..WireElement::new(PARAGRAPH)
        },
        Block::Heading(heading) => WireElement {
            level: Some(i64::from(heading.level.get())),
            children: inlines_to_wire(&heading.content),
            ..WireElement::new(HEADING)
        },
        Block::Disclosure(disclosure) => {
            let body = disclosure.body.iter().map(|b| block_to_wire(b, shape));
            match shape {
                WireShape::Attribute => WireElement {
                    summary: Some(WireSummary::Nodes(
                        disclosure.summary.iter().map(inline_to_wire).collect(),
                    )),
                    children: body.collect(),
                    ..WireElement::new(DISCLOSURE)
                },
                WireShape::SummaryChild => {
                    let summary = WireNode::Element(WireElement {
                        children: inlines_to_wire(&disclosure.summary),
                        ..WireElement::new(SUMMARY)
                    });
                    WireElement {
                        children: std::iter::once(summary).chain(body).collect(),
                        ..WireElement::new(DISCLOSURE)
                    }
                }
            }
        }
        Block::CodeBlock(code) => WireElement {
            language: code.language.clone(),
            children: vec![WireNode::text(code.literal.clone())],
            ..WireElement::new(CODE_BLOCK)
        },
        Block::Image(image) => WireElement {
            url: Some(image.url.clone()),
            alt: Some(image.alt.clone()),
            children: vec![WireNode::text("")],
            ..WireElement::new(IMAGE)
        },
    };
    WireNode::Element(element)
}

/// Inline children for an element; the editor expects at least one leaf.
fn inlines_to_wire(inlines: &[Inline]) -> Vec<WireNode> {
    if inlines.is_empty() {
        return vec![WireNode::text("")];
    }
    inlines.iter().map(inline_to_wire).collect()
}

fn inline_to_wire(inline: &Inline) -> WireNode {
    match inline {
        Inline::Text(text) => WireNode::Text(WireText {
            text: text.value.clone(),
            bold: text.marks.bold,
            italic: text.marks.italic,
            strikethrough: text.marks.strikethrough,
            underline: text.marks.underline,
        }),
        Inline::Mention(mention) => WireNode::Element(WireElement {
            user_id: Some(mention.user_id.as_str().to_string()),
            value: Some(mention.display.clone()),
            children: vec![WireNode::text("")],
            ..WireElement::new(MENTION)
        }),
        Inline::Link(link) => WireNode::Element(WireElement {
            url: Some(link.url.clone()),
            children: inlines_to_wire(&link.children),
            ..WireElement::new(LINK)
        }),
    }
}

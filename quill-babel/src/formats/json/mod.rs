//! Editor JSON format implementation
//!
//! Two registrations share this type:
//!
//! - `json`: canonical attribute shape. Parsing assumes it; a legacy
//!   summary-child disclosure read this way keeps its summary node as a body
//!   paragraph.
//! - `json-legacy`: summary-child shape. Parsing runs the normalizer first, so
//!   it accepts either shape; serializing writes the summary as a leading
//!   child node.

use crate::common::normalize::normalize;
use crate::error::BabelError;
use crate::format::Format;
use crate::ir::nodes::Document;
use crate::ir::wire::{from_wire, parse_wire_json, to_wire, to_wire_json, WireShape};

/// Format implementation for editor JSON
#[derive(Debug, Clone, Copy)]
pub struct JsonFormat {
    shape: WireShape,
}

impl JsonFormat {
    pub fn canonical() -> Self {
        JsonFormat {
            shape: WireShape::Attribute,
        }
    }

    pub fn legacy() -> Self {
        JsonFormat {
            shape: WireShape::SummaryChild,
        }
    }

    pub fn shape(&self) -> WireShape {
        self.shape
    }
}

impl Default for JsonFormat {
    fn default() -> Self {
        JsonFormat::canonical()
    }
}

impl Format for JsonFormat {
    fn name(&self) -> &str {
        match self.shape {
            WireShape::Attribute => "json",
            WireShape::SummaryChild => "json-legacy",
        }
    }

    fn description(&self) -> &str {
        match self.shape {
            WireShape::Attribute => "Editor JSON with the summary as a disclosure attribute",
            WireShape::SummaryChild => "Editor JSON with the summary as the first disclosure child",
        }
    }

    fn file_extensions(&self) -> &[&str] {
        match self.shape {
            WireShape::Attribute => &["json"],
            WireShape::SummaryChild => &[],
        }
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Document, BabelError> {
        let nodes = parse_wire_json(source)?;
        let nodes = match self.shape {
            WireShape::Attribute => nodes,
            WireShape::SummaryChild => normalize(nodes),
        };
        Ok(from_wire(&nodes)?)
    }

    fn serialize(&self, doc: &Document) -> Result<String, BabelError> {
        to_wire_json(&to_wire(doc, self.shape))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::ir::nodes::{Block, Disclosure, Inline, Paragraph, Text};

    const LEGACY: &str = r#"[{ "type": "spoiler", "children": [
        { "type": "summary", "children": [{ "text": "S" }] },
        { "children": [{ "text": "B" }] }
    ] }]"#;

    fn expected() -> Document {
        Document::new(vec![Block::Disclosure(Disclosure::new(
            vec![Inline::Text(Text::plain("S"))],
            vec![Block::Paragraph(Paragraph::from_text("B"))],
        ))])
    }

    #[test]
    fn legacy_format_normalizes_on_parse() {
        assert_eq!(JsonFormat::legacy().parse(LEGACY).unwrap(), expected());
    }

    #[test]
    fn canonical_format_does_not_normalize() {
        let doc = JsonFormat::canonical().parse(LEGACY).unwrap();
        match &doc.blocks[0] {
            Block::Disclosure(disclosure) => {
                assert!(disclosure.summary.is_empty());
                assert_eq!(disclosure.body.len(), 2);
            }
            other => panic!("expected disclosure, got {other:?}"),
        }
    }

    #[test]
    fn both_shapes_serialize_and_read_back() {
        for format in [JsonFormat::canonical(), JsonFormat::legacy()] {
            let json = format.serialize(&expected()).unwrap();
            assert_eq!(format.parse(&json).unwrap(), expected(), "{}", format.name());
        }
    }

    #[test]
    fn invalid_input_is_reported() {
        assert!(matches!(
            JsonFormat::canonical().parse("{ not json"),
            Err(BabelError::Json(_))
        ));
        assert_eq!(
            JsonFormat::canonical().parse(r#"[{ "type": "h1", "level": 0, "children": [] }]"#),
            Err(BabelError::Validation(ValidationError::HeadingLevel(0)))
        );
    }
}

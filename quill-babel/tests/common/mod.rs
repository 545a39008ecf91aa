//! Shared builders for integration tests.

#![allow(dead_code)]

use quill_babel::ir::nodes::*;
use quill_babel::ir::wire::{parse_wire_json, WireNode};

pub fn text(value: &str) -> Inline {
    Inline::Text(Text::plain(value))
}

pub fn marked(value: &str, marks: Marks) -> Inline {
    Inline::Text(Text::new(value, marks))
}

pub fn para(value: &str) -> Block {
    Block::Paragraph(Paragraph::from_text(value))
}

pub fn heading(level: i64, value: &str) -> Block {
    Block::Heading(Heading::new(level, vec![text(value)]).unwrap())
}

pub fn disclosure(summary: &str, body: Vec<Block>) -> Block {
    let summary = if summary.is_empty() {
        vec![]
    } else {
        vec![text(summary)]
    };
    Block::Disclosure(Disclosure::new(summary, body))
}

/// `depth` disclosures nested inside each other around one paragraph.
pub fn nested(depth: usize) -> Document {
    let mut block = para("core");
    for _ in 0..depth {
        block = Block::Disclosure(Disclosure::new(vec![], vec![block]));
    }
    Document::new(vec![block])
}

pub fn wire(json: &str) -> Vec<WireNode> {
    parse_wire_json(json).unwrap()
}

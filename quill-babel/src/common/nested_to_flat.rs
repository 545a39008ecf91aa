//! Converts a nested document tree into a flat event stream.
//!
//! # The High-Level Concept
//!
//! Traversing the document in pre-order lets us emit a sequence of
//! start/content/end events that the markup serializer can write out without
//! knowing anything about nesting. Each container produces its own start/end
//! markers and then recurses into its children.
//!
//! # The Algorithm
//!
//! 1. Emit `StartDocument`.
//! 2. For each block:
//!    - Paragraphs and headings: `Start*`, one `Inline` event per inline, `End*`.
//!    - Disclosures: `StartDisclosure`, `StartSummary`, summary inlines,
//!      `EndSummary`, then the body blocks recursively, `EndDisclosure`.
//!    - Code blocks and images are leaves and become a single event.
//! 3. Emit `EndDocument`.
//!
//! Disclosures are the only blocks that nest. The walk tracks their depth and
//! refuses to go past the configured limit, which keeps the recursion bounded
//! for trees that arrive straight from an editor.
//!
//! This mirrors the reverse process performed in `flat_to_nested`.

use crate::error::BabelError;
use crate::ir::events::Event;
use crate::ir::nodes::{Block, Document};

/// Converts a document to a flat vector of `Event`s.
///
/// Fails with [`BabelError::StructureTooDeep`] when disclosures nest deeper
/// than `max_depth`.
pub fn tree_to_events(doc: &Document, max_depth: usize) -> Result<Vec<Event>, BabelError> {
    let mut events = vec![Event::StartDocument];
    walk_blocks(&doc.blocks, 0, max_depth, &mut events)?;
    events.push(Event::EndDocument);
    Ok(events)
}

fn walk_blocks(
    blocks: &[Block],
    depth: usize,
    max_depth: usize,
    events: &mut Vec<Event>,
) -> Result<(), BabelError> {
    for block in blocks {
        match block {
            Block::Paragraph(paragraph) => {
                events.push(Event::StartParagraph);
                events.extend(paragraph.content.iter().cloned().map(Event::Inline));
                events.push(Event::EndParagraph);
            }
            Block::Heading(heading) => {
                events.push(Event::StartHeading(heading.level));
                events.extend(heading.content.iter().cloned().map(Event::Inline));
                events.push(Event::EndHeading);
            }
            Block::Disclosure(disclosure) => {
                if depth >= max_depth {
                    return Err(BabelError::StructureTooDeep { limit: max_depth });
                }
                events.push(Event::StartDisclosure);
                events.push(Event::StartSummary);
                events.extend(disclosure.summary.iter().cloned().map(Event::Inline));
                events.push(Event::EndSummary);
                walk_blocks(&disclosure.body, depth + 1, max_depth, events)?;
                events.push(Event::EndDisclosure);
            }
            Block::CodeBlock(code) => events.push(Event::CodeBlock(code.clone())),
            Block::Image(image) => events.push(Event::Image(image.clone())),
        }
    }
    Ok(())
}

//! Converts a flat event stream back to a nested document tree.
//!
//! # The High-Level Concept
//!
//! A stack keeps track of the "open" containers. A `Start` event pushes a new
//! container, making it the current one; the matching `End` event pops it and
//! attaches it to its parent. Content events (inlines, code blocks, images) go
//! into whatever container is current.
//!
//! # Tolerance
//!
//! Event streams come from a line scanner over user-written markup, so they
//! are not guaranteed to be balanced:
//!
//! - A block start while a paragraph or heading is still open closes it first.
//! - `EndDocument` closes everything that is still open, innermost first.
//! - An `End` event with no matching open container is dropped.
//! - Inlines that arrive directly in a block container are wrapped in an
//!   implicit paragraph.
//!
//! ```text
//! StartDocument
//! StartDisclosure         <- opens disclosure, depth 1
//! StartSummary
//! Inline("warn")          <- summary content
//! EndSummary
//! Inline("body")          <- no paragraph open: wrapped in one
//! EndDocument             <- closes paragraph, then disclosure
//! ```
//!
//! # Depth
//!
//! Disclosures are the only containers that nest. The stack counts open
//! disclosures and a start that would exceed the limit aborts the build with
//! [`BabelError::StructureTooDeep`].

use crate::error::BabelError;
use crate::ir::events::Event;
use crate::ir::nodes::*;
use tracing::debug;

/// Represents a node being built on the stack
#[derive(Debug)]
enum StackNode {
    Document(Vec<Block>),
    Paragraph {
        content: Vec<Inline>,
    },
    Heading {
        level: HeadingLevel,
        content: Vec<Inline>,
    },
    Disclosure {
        summary: Vec<Inline>,
        body: Vec<Block>,
        in_summary: bool,
    },
}

impl StackNode {
    /// Convert to a block (used when popping from stack)
    fn into_block(self) -> Option<Block> {
        match self {
            StackNode::Document(_) => None,
            StackNode::Paragraph { content } => Some(Block::Paragraph(Paragraph { content })),
            StackNode::Heading { level, content } => {
                Some(Block::Heading(Heading { level, content }))
            }
            StackNode::Disclosure { summary, body, .. } => {
                Some(Block::Disclosure(Disclosure { summary, body }))
            }
        }
    }

    fn type_name(&self) -> &str {
        match self {
            StackNode::Document(_) => "Document",
            StackNode::Paragraph { .. } => "Paragraph",
            StackNode::Heading { .. } => "Heading",
            StackNode::Disclosure { .. } => "Disclosure",
        }
    }

    fn holds_inlines(&self) -> bool {
        matches!(
            self,
            StackNode::Paragraph { .. } | StackNode::Heading { .. }
        )
    }

    /// Add a finished block to this container
    fn add_block(&mut self, block: Block) {
        match self {
            StackNode::Document(blocks) => blocks.push(block),
            StackNode::Disclosure {
                body, in_summary, ..
            } => {
                *in_summary = false;
                body.push(block);
            }
            // Inline containers are closed before a block is attached.
            StackNode::Paragraph { .. } | StackNode::Heading { .. } => {}
        }
    }
}

struct TreeBuilder {
    stack: Vec<StackNode>,
    depth: usize,
    max_depth: usize,
}

impl TreeBuilder {
    fn new(max_depth: usize) -> Self {
        TreeBuilder {
            stack: vec![StackNode::Document(Vec::new())],
            depth: 0,
            max_depth,
        }
    }

    fn top(&mut self) -> &mut StackNode {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    /// Pops the top container and attaches it to its parent.
    fn pop(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        if let Some(node) = self.stack.pop() {
            if matches!(node, StackNode::Disclosure { .. }) {
                self.depth -= 1;
            }
            if let Some(block) = node.into_block() {
                self.top().add_block(block);
            }
        }
    }

    fn close_inline_container(&mut self) {
        if self.top().holds_inlines() {
            self.pop();
        }
    }

    /// Pops the top container if `matches` accepts it; otherwise the end event
    /// has nothing to close and is dropped.
    fn finalize_container(&mut self, event_name: &str, matches: impl Fn(&StackNode) -> bool) {
        if self.stack.len() > 1 && matches(self.top()) {
            self.pop();
        } else {
            debug!(
                "dropping unmatched {} while in {}",
                event_name,
                self.top().type_name()
            );
        }
    }

    fn add_inline(&mut self, inline: Inline) {
        match self.top() {
            StackNode::Paragraph { content } | StackNode::Heading { content, .. } => {
                content.push(inline)
            }
            StackNode::Disclosure {
                summary,
                in_summary: true,
                ..
            } => summary.push(inline),
            StackNode::Document(_) | StackNode::Disclosure { .. } => {
                self.stack.push(StackNode::Paragraph {
                    content: vec![inline],
                });
            }
        }
    }

    fn add_leaf(&mut self, block: Block) {
        self.close_inline_container();
        self.top().add_block(block);
    }

    fn open_disclosure(&mut self) -> Result<(), BabelError> {
        self.close_inline_container();
        if self.depth >= self.max_depth {
            return Err(BabelError::StructureTooDeep {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        self.stack.push(StackNode::Disclosure {
            summary: Vec::new(),
            body: Vec::new(),
            in_summary: false,
        });
        Ok(())
    }

    fn set_in_summary(&mut self, value: bool) {
        self.close_inline_container();
        match self.top() {
            StackNode::Disclosure { in_summary, .. } => *in_summary = value,
            other => debug!("summary marker outside a disclosure, in {}", other.type_name()),
        }
    }

    fn finish(mut self) -> Document {
        if self.stack.len() > 1 {
            debug!(
                "closing {} container(s) left open at end of document",
                self.stack.len() - 1
            );
        }
        while self.stack.len() > 1 {
            self.pop();
        }
        match self.stack.pop() {
            Some(StackNode::Document(blocks)) => Document::new(blocks),
            _ => Document::default(),
        }
    }
}

/// Converts a flat event stream back to a nested document.
///
/// Unbalanced streams are repaired as described in the module docs; the only
/// failure is disclosure nesting past `max_depth`.
///
/// # Example
///
/// ```ignore
/// let events = vec![
///     Event::StartDocument,
///     Event::StartHeading(HeadingLevel::new(1)?),
///     Event::Inline(Inline::Text(Text::plain("Title"))),
///     Event::EndHeading,
///     Event::EndDocument,
/// ];
/// let doc = events_to_tree(&events, 32)?;
/// ```
pub fn events_to_tree(events: &[Event], max_depth: usize) -> Result<Document, BabelError> {
    let mut builder = TreeBuilder::new(max_depth);

    for event in events {
        match event {
            Event::StartDocument => {}
            Event::EndDocument => break,
            Event::StartParagraph => {
                builder.close_inline_container();
                builder.stack.push(StackNode::Paragraph {
                    content: Vec::new(),
                });
            }
            Event::EndParagraph => builder
                .finalize_container("EndParagraph", |n| matches!(n, StackNode::Paragraph { .. })),
            Event::StartHeading(level) => {
                builder.close_inline_container();
                builder.stack.push(StackNode::Heading {
                    level: *level,
                    content: Vec::new(),
                });
            }
            Event::EndHeading => builder
                .finalize_container("EndHeading", |n| matches!(n, StackNode::Heading { .. })),
            Event::StartDisclosure => builder.open_disclosure()?,
            Event::EndDisclosure => {
                builder.close_inline_container();
                builder.finalize_container("EndDisclosure", |n| {
                    matches!(n, StackNode::Disclosure { .. })
                });
            }
            Event::StartSummary => builder.set_in_summary(true),
            Event::EndSummary => builder.set_in_summary(false),
            Event::CodeBlock(code) => builder.add_leaf(Block::CodeBlock(code.clone())),
            Event::Image(image) => builder.add_leaf(Block::Image(image.clone())),
            Event::Inline(inline) => builder.add_inline(inline.clone()),
        }
    }

    Ok(builder.finish())
}

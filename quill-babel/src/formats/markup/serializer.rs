//! Markup serialization (tree → markup)
//!
//! Pipeline: Document → Events (`nested_to_flat`) → markup text.
//!
//! The writer only ever looks at one event at a time. Block separation is
//! handled like a line printer: every block asks for one blank line before
//! itself, except the first block of the output and the first block after a
//! `<summary>` line, which follows it directly.

use super::inline::{write_image, write_inlines};
use super::MarkupOptions;
use crate::common::nested_to_flat::tree_to_events;
use crate::error::BabelError;
use crate::ir::events::Event;
use crate::ir::nodes::{CodeBlock, Document, HeadingLevel, Inline};

/// Serialize a document to markup.
pub fn serialize_to_markup(doc: &Document, options: &MarkupOptions) -> Result<String, BabelError> {
    let events = tree_to_events(doc, options.max_depth)?;
    Ok(MarkupSerializer::new().serialize(&events))
}

/// Which inline container the buffered inlines belong to.
#[derive(Debug, Clone, Copy)]
enum InlineTarget {
    Paragraph,
    Heading(HeadingLevel),
    Summary,
}

pub struct MarkupSerializer {
    output: String,
    consecutive_newlines: usize,
    /// The next block directly follows the previous line
    tight: bool,
    target: Option<InlineTarget>,
    inlines: Vec<Inline>,
}

impl Default for MarkupSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupSerializer {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            consecutive_newlines: 2, // Start as if we have blank lines
            tight: false,
            target: None,
            inlines: Vec::new(),
        }
    }

    pub fn serialize(mut self, events: &[Event]) -> String {
        for event in events {
            self.handle(event);
        }
        self.output
    }

    fn handle(&mut self, event: &Event) {
        match event {
            Event::StartDocument | Event::EndDocument => {}
            Event::StartParagraph => self.target = Some(InlineTarget::Paragraph),
            Event::StartHeading(level) => self.target = Some(InlineTarget::Heading(*level)),
            Event::StartSummary => self.target = Some(InlineTarget::Summary),
            Event::EndParagraph | Event::EndHeading | Event::EndSummary => self.finish_inlines(),
            Event::Inline(inline) => self.inlines.push(inline.clone()),
            Event::StartDisclosure => {
                self.begin_block();
                self.write_line("<details>");
            }
            Event::EndDisclosure => {
                self.tight = false;
                self.write_line("</details>");
            }
            Event::CodeBlock(code) => {
                self.begin_block();
                self.write_code_block(code);
            }
            Event::Image(image) => {
                self.begin_block();
                self.write_line(&write_image(image));
            }
        }
    }

    fn finish_inlines(&mut self) {
        let inlines = std::mem::take(&mut self.inlines);
        match self.target.take() {
            Some(InlineTarget::Paragraph) => {
                let text = write_inlines(&inlines, false);
                if text.trim().is_empty() {
                    return;
                }
                self.begin_block();
                self.write_line(&text);
            }
            Some(InlineTarget::Heading(level)) => {
                let text = write_inlines(&inlines, true);
                let hashes = "#".repeat(level.get() as usize);
                self.begin_block();
                if text.is_empty() {
                    self.write_line(&hashes);
                } else {
                    self.write_line(&format!("{hashes} {text}"));
                }
            }
            Some(InlineTarget::Summary) => {
                let text = write_inlines(&inlines, true);
                self.write_line(&format!("<summary>{text}</summary>"));
                self.tight = true;
            }
            None => {}
        }
    }

    fn write_code_block(&mut self, code: &CodeBlock) {
        let fence = "`".repeat(fence_length(&code.literal));
        let info = fence_info(code.language.as_deref()).unwrap_or_default();
        self.write_line(&format!("{fence}{info}"));
        self.write_line(&code.literal);
        self.write_line(&fence);
    }

    /// Separates the next block from what came before.
    fn begin_block(&mut self) {
        if self.tight {
            self.tight = false;
        } else if !self.output.is_empty() {
            self.ensure_blank_lines(1);
        }
    }

    fn write_line(&mut self, text: &str) {
        self.output.push_str(text);
        self.output.push('\n');
        self.consecutive_newlines = 1;
    }

    fn ensure_blank_lines(&mut self, count: usize) {
        let target_newlines = count + 1;
        while self.consecutive_newlines < target_newlines {
            self.output.push('\n');
            self.consecutive_newlines += 1;
        }
    }
}

/// The info string written after an opening fence, in the form the parser
/// reads it back: backticks and line breaks removed, whitespace trimmed.
pub fn fence_info(language: Option<&str>) -> Option<String> {
    let info: String = language?
        .chars()
        .filter(|c| !matches!(c, '`' | '\n' | '\r'))
        .collect();
    let info = info.trim();
    (!info.is_empty()).then(|| info.to_string())
}

/// Backtick fence length: at least 3, and longer than any backtick run that
/// starts a line of the literal, so no literal line can close the fence.
fn fence_length(literal: &str) -> usize {
    let longest = literal
        .lines()
        .map(|line| line.chars().take_while(|&c| c == '`').count())
        .max()
        .unwrap_or(0);
    (longest + 1).max(3)
}

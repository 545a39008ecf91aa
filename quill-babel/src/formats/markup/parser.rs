//! Markup parsing (markup → tree)
//!
//! Pipeline: markup text → line scanner → Events → `flat_to_nested` → Document
//!
//! The scanner walks the input line by line and only recognizes what the
//! serializer writes: headings, fences, image lines, `<details>` /
//! `<summary>` tags and paragraphs. It keeps no nesting state of its own
//! beyond a count of open disclosures; the tree builder owns the stack and
//! enforces the depth limit.

use super::inline::{image_line, scan_inlines};
use super::MarkupOptions;
use crate::common::flat_to_nested::events_to_tree;
use crate::error::BabelError;
use crate::ir::events::Event;
use crate::ir::nodes::{CodeBlock, Document, HeadingLevel};
use tracing::debug;

const DETAILS_CLOSE: &str = "</details>";
const SUMMARY_OPEN: &str = "<summary>";
const SUMMARY_CLOSE: &str = "</summary>";

/// Parse markup into a document.
///
/// Malformed input never fails; see the module docs of
/// [`crate::formats::markup`] for how it is repaired.
pub fn parse_from_markup(source: &str, options: &MarkupOptions) -> Result<Document, BabelError> {
    let events = markup_to_events(source, options);
    events_to_tree(&events, options.max_depth)
}

/// Scan markup into a flat event stream.
///
/// Scanning stops at the first disclosure that opens past
/// `options.max_depth`; the stream then ends right after that opener, which
/// the tree builder rejects with [`BabelError::StructureTooDeep`].
pub fn markup_to_events(source: &str, options: &MarkupOptions) -> Vec<Event> {
    let mut scanner = LineScanner {
        options,
        events: vec![Event::StartDocument],
        paragraph: Vec::new(),
        open_disclosures: 0,
        expect_summary: false,
        too_deep: false,
    };
    // Split on '\n' only; '\r' is stripped per line outside of fences.
    let mut lines = source.split('\n');
    while let Some(line) = lines.next() {
        scanner.line(line, &mut lines);
        if scanner.too_deep {
            break;
        }
    }
    scanner.flush_paragraph();
    scanner.events.push(Event::EndDocument);
    scanner.events
}

struct LineScanner<'a> {
    options: &'a MarkupOptions,
    events: Vec<Event>,
    paragraph: Vec<String>,
    open_disclosures: usize,
    /// A `<summary>` is only recognized right after `<details>`
    expect_summary: bool,
    /// Set once a disclosure opens past the depth limit
    too_deep: bool,
}

impl LineScanner<'_> {
    /// Scans one input line. Tags may share a line with whatever follows
    /// them, so the rest of the line goes round the loop again.
    fn line<'s>(&mut self, line: &'s str, rest: &mut impl Iterator<Item = &'s str>) {
        let mut current = strip_cr(line);
        while let Some(after) = self.step(current, rest) {
            if self.too_deep || after.trim().is_empty() {
                break;
            }
            current = after;
        }
    }

    /// Handles the first construct on `line` and returns the text after it
    /// when some of the line is left to scan.
    fn step<'s>(
        &mut self,
        line: &'s str,
        rest: &mut impl Iterator<Item = &'s str>,
    ) -> Option<&'s str> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            self.flush_paragraph();
            return None;
        }

        if let Some((ticks, info)) = fence_open(line) {
            self.flush_paragraph();
            self.expect_summary = false;
            self.code_block(ticks, info, rest);
            return None;
        }

        if let Some(after) = details_open(trimmed) {
            self.flush_paragraph();
            self.open_disclosure();
            return Some(after);
        }

        if let Some(after) = trimmed.strip_prefix(DETAILS_CLOSE) {
            self.flush_paragraph();
            self.close_disclosure();
            return Some(after);
        }

        if self.expect_summary {
            if let Some(after) = trimmed.strip_prefix(SUMMARY_OPEN) {
                self.flush_paragraph();
                self.expect_summary = false;
                return self.summary(after, rest);
            }
        }
        self.expect_summary = false;

        if let Some((level, content)) = heading(line) {
            self.flush_paragraph();
            self.events.push(Event::StartHeading(level));
            self.push_inlines(content);
            self.events.push(Event::EndHeading);
            return None;
        }

        match closing_suffix(line) {
            Some(before) if self.open_disclosures > 0 => {
                if !before.trim().is_empty() {
                    self.paragraph.push(before.to_string());
                }
                self.flush_paragraph();
                self.close_disclosure();
            }
            _ => self.paragraph.push(line.to_string()),
        }
        None
    }

    fn open_disclosure(&mut self) {
        self.events.push(Event::StartDisclosure);
        self.open_disclosures += 1;
        self.expect_summary = true;
        if self.open_disclosures > self.options.max_depth {
            debug!(
                limit = self.options.max_depth,
                "disclosure nesting past the limit, scanning stopped"
            );
            self.too_deep = true;
        }
    }

    fn close_disclosure(&mut self) {
        if self.open_disclosures > 0 {
            self.open_disclosures -= 1;
            self.events.push(Event::EndDisclosure);
        }
    }

    /// Collects summary text up to `</summary>`, a blank line or the end of
    /// input. Returns whatever follows the closing tag on its line.
    fn summary<'s>(
        &mut self,
        first: &'s str,
        rest: &mut impl Iterator<Item = &'s str>,
    ) -> Option<&'s str> {
        let mut text = String::new();
        let mut line = first;
        let remainder = loop {
            if let Some(end) = find_unescaped(line, SUMMARY_CLOSE) {
                text.push_str(&line[..end]);
                break Some(&line[end + SUMMARY_CLOSE.len()..]);
            }
            text.push_str(line);
            match rest.next().map(strip_cr) {
                Some(next) if !next.trim().is_empty() => {
                    text.push('\n');
                    line = next;
                }
                _ => break None,
            }
        };

        self.events.push(Event::StartSummary);
        self.push_inlines(&text);
        self.events.push(Event::EndSummary);
        remainder
    }

    /// Reads fence contents verbatim until a closing fence or end of input.
    fn code_block<'s>(&mut self, ticks: usize, info: &str, rest: &mut impl Iterator<Item = &'s str>) {
        let mut lines = Vec::new();
        for line in rest.by_ref() {
            if fence_close(line, ticks) {
                break;
            }
            lines.push(line);
        }
        let info = info.trim();
        self.events.push(Event::CodeBlock(CodeBlock {
            language: (!info.is_empty()).then(|| info.to_string()),
            literal: lines.join("\n"),
        }));
    }

    fn flush_paragraph(&mut self) {
        if self.paragraph.is_empty() {
            return;
        }
        let lines = std::mem::take(&mut self.paragraph);
        if let [only] = lines.as_slice() {
            if let Some(image) = image_line(only) {
                self.events.push(Event::Image(image));
                return;
            }
        }
        self.events.push(Event::StartParagraph);
        self.push_inlines(&lines.join("\n"));
        self.events.push(Event::EndParagraph);
    }

    fn push_inlines(&mut self, text: &str) {
        let inlines = scan_inlines(text, &self.options.mentions);
        self.events.extend(inlines.into_iter().map(Event::Inline));
    }
}

/// `<details>` or `<details attr…>` at the start of a line; returns the text
/// after the tag.
fn details_open(line: &str) -> Option<&str> {
    let after = line.strip_prefix("<details")?;
    match after.chars().next() {
        Some('>') => Some(&after[1..]),
        Some(c) if c.is_whitespace() => after.find('>').map(|end| &after[end + 1..]),
        _ => None,
    }
}

fn strip_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

fn is_escaped(before: &str) -> bool {
    before.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn find_unescaped(line: &str, pattern: &str) -> Option<usize> {
    line.match_indices(pattern)
        .map(|(index, _)| index)
        .find(|&index| !is_escaped(&line[..index]))
}

/// Text before a trailing unescaped `</details>`.
fn closing_suffix(line: &str) -> Option<&str> {
    let before = line.trim_end().strip_suffix(DETAILS_CLOSE)?;
    (!is_escaped(before)).then_some(before)
}

/// `#`×1-6 followed by a space or the end of the line.
fn heading(line: &str) -> Option<(HeadingLevel, &str)> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if hashes == 0 {
        return None;
    }
    let level = HeadingLevel::new(hashes as i64).ok()?;
    let after = &line[hashes..];
    if after.is_empty() {
        return Some((level, ""));
    }
    after.strip_prefix(' ').map(|content| (level, content))
}

/// An opening fence: three or more backticks at the start of a line and an
/// info string without backticks.
fn fence_open(line: &str) -> Option<(usize, &str)> {
    let ticks = line.chars().take_while(|&c| c == '`').count();
    if ticks < 3 {
        return None;
    }
    let info = &line[ticks..];
    (!info.contains('`')).then_some((ticks, info))
}

fn fence_close(line: &str, ticks: usize) -> bool {
    let line = line.trim_end();
    !line.is_empty() && line.chars().all(|c| c == '`') && line.len() >= ticks
}

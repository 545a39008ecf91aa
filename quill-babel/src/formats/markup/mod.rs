//! Markup format implementation
//!
//! This module implements bidirectional conversion between the document tree
//! and the stored markup dialect.
//!
//! # Element Mapping Table
//!
//! | Tree Element   | Markup                                   | Notes                                     |
//! |----------------|------------------------------------------|-------------------------------------------|
//! | Heading        | `## text`                                | Level 1-6, newlines folded to spaces      |
//! | Paragraph      | Lines of inline content                  | Empty paragraphs are not written          |
//! | Disclosure     | `<details>` / `<summary>…</summary>`     | Body follows the summary line directly    |
//! | CodeBlock      | Backtick fence with language info string | Contents never scanned                    |
//! | Image          | `![label](url)` on its own line          | Label is alt text or last path segment    |
//! | Text marks     | `~~` `**` `_` `<u>`                      | Fixed nesting order, strikethrough outer  |
//! | Mention        | `@display`                               | User id needs a mention directory to survive |
//! | Link           | `[children](url)`                        | Spaces and `)` in the url percent-encoded |
//!
//! # Lossy Conversions
//!
//! - Mentions whose display value is not in the parser's [`MentionDirectory`]
//!   come back as plain text.
//! - Empty paragraphs disappear.
//! - An image without alt text comes back with the label as its alt text.
//! - Newlines in headings, summaries, link labels and mention display values
//!   become spaces. Lines holding only whitespace inside a paragraph are
//!   dropped.
//! - Carriage returns outside code blocks are dropped.
//! - Backticks and line breaks in a code block's language are removed.
//!
//! Plain text `@` is written as `\@`, so only mentions ever read back as
//! mentions.
//!
//! # Tolerance
//!
//! Parsing never fails on malformed markup: unterminated fences and
//! disclosures close at end of input and stray closing tags are ignored. The
//! only error is [`crate::error::BabelError::StructureTooDeep`] when
//! disclosures nest past [`MarkupOptions::max_depth`].

pub mod inline;
pub mod parser;
pub mod serializer;

use crate::error::BabelError;
use crate::format::Format;
use crate::ir::nodes::{Document, Mention};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default bound on disclosure nesting, in both directions.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Side mapping from mention display values to user ids.
///
/// Markup only stores `@display`; the parser turns `@display` back into a
/// mention only when the display value is found here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MentionDirectory {
    entries: BTreeMap<String, String>,
}

impl MentionDirectory {
    pub fn insert(&mut self, display: impl Into<String>, user_id: impl Into<String>) {
        self.entries.insert(display.into(), user_id.into());
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The user id registered for a display value.
    pub fn resolve(&self, display: &str) -> Option<&str> {
        self.entries.get(display).map(String::as_str)
    }

    /// Finds the longest display value that `rest` starts with, written the
    /// way the serializer writes it. Returns the consumed length and the
    /// mention.
    pub(crate) fn longest_match(&self, rest: &str) -> Option<(usize, Mention)> {
        self.entries
            .iter()
            .filter(|(display, _)| !display.is_empty())
            .filter_map(|(display, user_id)| {
                let written = inline::escape_text(display);
                rest.starts_with(&written)
                    .then(|| (written.len(), display, user_id))
            })
            .max_by_key(|(len, _, _)| *len)
            .and_then(|(len, display, user_id)| {
                Mention::new(user_id.clone(), display.clone())
                    .ok()
                    .map(|mention| (len, mention))
            })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MentionDirectory {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut directory = MentionDirectory::default();
        for (display, user_id) in iter {
            directory.insert(display, user_id);
        }
        directory
    }
}

/// Options shared by the markup parser and serializer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupOptions {
    /// Deepest allowed disclosure nesting
    pub max_depth: usize,
    /// Display value to user id mapping used when parsing mentions
    pub mentions: MentionDirectory,
}

impl Default for MarkupOptions {
    fn default() -> Self {
        MarkupOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            mentions: MentionDirectory::default(),
        }
    }
}

impl MarkupOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_mentions(mut self, mentions: MentionDirectory) -> Self {
        self.mentions = mentions;
        self
    }
}

/// Format implementation for the stored markup dialect
#[derive(Debug, Clone, Default)]
pub struct MarkupFormat {
    options: MarkupOptions,
}

impl MarkupFormat {
    pub fn new(options: MarkupOptions) -> Self {
        MarkupFormat { options }
    }

    pub fn options(&self) -> &MarkupOptions {
        &self.options
    }
}

impl Format for MarkupFormat {
    fn name(&self) -> &str {
        "markup"
    }

    fn description(&self) -> &str {
        "Stored rich-text markup with disclosure blocks"
    }

    fn file_extensions(&self) -> &[&str] {
        &["md", "markdown", "quill"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Document, BabelError> {
        parser::parse_from_markup(source, &self.options)
    }

    fn serialize(&self, doc: &Document) -> Result<String, BabelError> {
        serializer::serialize_to_markup(doc, &self.options)
    }
}

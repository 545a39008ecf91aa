//! Treeviz formatter for document trees
//!
//! Treeviz is a visual representation of the tree, meant for debugging
//! conversions. Each node is one line:
//!
//! <prefix><connector> <icon> <label> (truncated to 30 characters)
//!
//! Example (inlines hidden):
//!
//! ```text
//! ⧉ Document (2 blocks)
//! ├─ § h2 Release notes
//! └─ ▸ Disclosure
//!   ├─ ⊤ spoilers ahead
//!   └─ ¶ the butler did it
//! ```
//!
//! Parameters:
//! - `"inlines"`: `"false"` hides inline nodes and keeps only blocks.

use super::icons::get_icon;
use crate::error::BabelError;
use crate::format::Format;
use crate::formats::markup::DEFAULT_MAX_DEPTH;
use crate::ir::nodes::{inlines_text, Block, Document, Inline, Marks};
use std::collections::HashMap;

const LABEL_WIDTH: usize = 30;

fn truncate(label: &str) -> String {
    let single_line = label.replace('\n', "↵");
    if single_line.chars().count() <= LABEL_WIDTH {
        single_line
    } else {
        let mut short: String = single_line.chars().take(LABEL_WIDTH - 1).collect();
        short.push('…');
        short
    }
}

fn marks_label(marks: &Marks) -> String {
    let mut names = Vec::new();
    if marks.strikethrough {
        names.push("strike");
    }
    if marks.bold {
        names.push("bold");
    }
    if marks.italic {
        names.push("italic");
    }
    if marks.underline {
        names.push("underline");
    }
    if names.is_empty() {
        String::new()
    } else {
        format!(" [{}]", names.join(","))
    }
}

struct TreeWriter {
    output: String,
    show_inlines: bool,
    max_depth: usize,
}

impl TreeWriter {
    fn line(&mut self, prefix: &str, is_last: bool, icon: &str, label: &str) -> String {
        let connector = if is_last { "└─" } else { "├─" };
        self.output
            .push_str(&format!("{prefix}{connector} {icon} {label}\n"));
        format!("{}{}", prefix, if is_last { "  " } else { "│ " })
    }

    fn blocks(&mut self, blocks: &[Block], prefix: &str, depth: usize) -> Result<(), BabelError> {
        let count = blocks.len();
        for (i, block) in blocks.iter().enumerate() {
            self.block(block, prefix, i == count - 1, depth)?;
        }
        Ok(())
    }

    fn block(
        &mut self,
        block: &Block,
        prefix: &str,
        is_last: bool,
        depth: usize,
    ) -> Result<(), BabelError> {
        match block {
            Block::Paragraph(paragraph) => {
                let label = truncate(&inlines_text(&paragraph.content));
                let child_prefix = self.line(prefix, is_last, get_icon("Paragraph"), &label);
                self.inlines(&paragraph.content, &child_prefix);
            }
            Block::Heading(heading) => {
                let label = format!(
                    "h{} {}",
                    heading.level.get(),
                    truncate(&inlines_text(&heading.content))
                );
                let child_prefix = self.line(prefix, is_last, get_icon("Heading"), &label);
                self.inlines(&heading.content, &child_prefix);
            }
            Block::Disclosure(disclosure) => {
                if depth >= self.max_depth {
                    return Err(BabelError::StructureTooDeep {
                        limit: self.max_depth,
                    });
                }
                let child_prefix = self.line(prefix, is_last, get_icon("Disclosure"), "Disclosure");
                let summary = truncate(&inlines_text(&disclosure.summary));
                let summary_prefix = self.line(
                    &child_prefix,
                    disclosure.body.is_empty(),
                    get_icon("Summary"),
                    &summary,
                );
                self.inlines(&disclosure.summary, &summary_prefix);
                self.blocks(&disclosure.body, &child_prefix, depth + 1)?;
            }
            Block::CodeBlock(code) => {
                let label = format!(
                    "{} {}",
                    code.language.as_deref().unwrap_or("-"),
                    truncate(&code.literal)
                );
                self.line(prefix, is_last, get_icon("CodeBlock"), &label);
            }
            Block::Image(image) => {
                self.line(prefix, is_last, get_icon("Image"), &truncate(&image.url));
            }
        }
        Ok(())
    }

    fn inlines(&mut self, inlines: &[Inline], prefix: &str) {
        if !self.show_inlines {
            return;
        }
        let count = inlines.len();
        for (i, inline) in inlines.iter().enumerate() {
            let is_last = i == count - 1;
            match inline {
                Inline::Text(text) => {
                    let label = format!("{}{}", truncate(&text.value), marks_label(&text.marks));
                    self.line(prefix, is_last, get_icon("Text"), &label);
                }
                Inline::Mention(mention) => {
                    let label = format!("{} ({})", mention.display, mention.user_id.as_str());
                    self.line(prefix, is_last, get_icon("Mention"), &truncate(&label));
                }
                Inline::Link(link) => {
                    let child_prefix =
                        self.line(prefix, is_last, get_icon("Link"), &truncate(&link.url));
                    self.inlines(&link.children, &child_prefix);
                }
            }
        }
    }
}

pub fn to_treeviz_str(doc: &Document, max_depth: usize) -> Result<String, BabelError> {
    to_treeviz_str_with_params(doc, max_depth, &HashMap::new())
}

/// Convert a document to treeviz string with optional parameters
pub fn to_treeviz_str_with_params(
    doc: &Document,
    max_depth: usize,
    params: &HashMap<String, String>,
) -> Result<String, BabelError> {
    let show_inlines = params
        .get("inlines")
        .map(|v| v.to_lowercase() != "false")
        .unwrap_or(true);

    let mut writer = TreeWriter {
        output: format!(
            "{} Document ({} blocks)\n",
            get_icon("Document"),
            doc.blocks.len()
        ),
        show_inlines,
        max_depth,
    };
    writer.blocks(&doc.blocks, "", 0)?;
    Ok(writer.output)
}

/// Format implementation for treeviz format
pub struct TreevizFormat {
    max_depth: usize,
}

impl TreevizFormat {
    pub fn new(max_depth: usize) -> Self {
        TreevizFormat { max_depth }
    }
}

impl Default for TreevizFormat {
    fn default() -> Self {
        TreevizFormat::new(DEFAULT_MAX_DEPTH)
    }
}

impl Format for TreevizFormat {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn description(&self) -> &str {
        "Visual tree representation with indentation and Unicode icons"
    }

    fn file_extensions(&self) -> &[&str] {
        &["tree", "treeviz"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, doc: &Document) -> Result<String, BabelError> {
        to_treeviz_str(doc, self.max_depth)
    }

    fn serialize_with_options(
        &self,
        doc: &Document,
        options: &HashMap<String, String>,
    ) -> Result<String, BabelError> {
        to_treeviz_str_with_params(doc, self.max_depth, options)
    }
}

//! Loading stored markup for display.
//!
//! A stored post must always render. When conversion fails the caller gets
//! the original text back untouched and can show it as-is.

use crate::formats::markup::parser::parse_from_markup;
use crate::formats::markup::MarkupOptions;
use crate::ir::nodes::Document;
use tracing::warn;

/// What the caller should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Tree(Document),
    /// Conversion failed; the stored text, unmodified
    Raw(String),
}

impl Rendered {
    pub fn is_raw(&self) -> bool {
        matches!(self, Rendered::Raw(_))
    }
}

pub fn load_for_display(text: &str, options: &MarkupOptions) -> Rendered {
    match parse_from_markup(text, options) {
        Ok(doc) => Rendered::Tree(doc),
        Err(err) => {
            warn!(error = %err, "falling back to raw text for display");
            Rendered::Raw(text.to_string())
        }
    }
}

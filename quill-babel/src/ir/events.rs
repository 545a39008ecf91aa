//! Defines the flat event stream representation of a document.

use crate::ir::nodes::{CodeBlock, HeadingLevel, Image, Inline};

/// Represents a single event in the document stream.
///
/// The markup parser produces this stream from text and the serializer
/// consumes it, so neither has to recurse over the nested tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    StartDocument,
    EndDocument,
    StartParagraph,
    EndParagraph,
    StartHeading(HeadingLevel),
    EndHeading,
    StartDisclosure,
    EndDisclosure,
    /// Opens the summary of the innermost disclosure; only inlines follow
    StartSummary,
    EndSummary,
    CodeBlock(CodeBlock),
    Image(Image),
    Inline(Inline),
}

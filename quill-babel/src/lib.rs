//! Conversion engine between rich documents and stored markup
//!
//!     User content (reviews, forum posts, comments) is edited as a structured tree and stored as
//!     text. This crate converts between the two, including nested disclosure ("spoiler") blocks,
//!     user mentions and inline marks.
//!
//!     TLDR:
//!         - Editor JSON comes in as wire nodes (./ir/wire.rs). Trees that may use the legacy
//!           summary-child disclosure shape go through the normalizer once (./common/normalize.rs);
//!           nothing downstream ever branches on the shape again.
//!         - Markup is written and read through the flat event stream, never by recursing over the
//!           tree directly.
//!         - Malformed markup is not an error. The parser always returns a best-effort tree.
//!
//! Architecture
//!
//!     This is a pure lib: it powers quill-cli but is shell agnostic, no code here prints, reads
//!     env vars or touches the filesystem.
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── roundtrip.rs            # Round-trip laws, as checks returning a report
//!     ├── cache.rs                # Memoized conversions keyed by content hash
//!     ├── display.rs              # Raw-text fallback for rendering
//!     ├── formats
//!     │   ├── markup              # Stored dialect: parser, serializer, inline scanner
//!     │   ├── json                # Editor JSON, canonical and legacy shapes
//!     │   └── treeviz             # Debugging tree view
//!     ├── ir                      # Typed tree, wire shapes, events
//!     └── common                  # Tree <-> events, legacy shape normalizer
//!
//! Testing
//!     tests
//!     └── <area>
//!         └── <testname>.rs
//!
//!     Rust does not discover tests in subdirectories by default, so tests/lib.rs includes them.
//!
//! Core Algorithms
//!
//!     Disclosures nest to arbitrary depth, so both directions go through a flat event stream
//!     (./common/nested_to_flat.rs and ./common/flat_to_nested.rs). The tree builder uses an
//!     explicit stack and both directions stop at a configurable depth with StructureTooDeep.
//!
//! Entry Points
//!
//!     Two serialization entry points exist on purpose. `serialize_canonical` assumes every
//!     disclosure carries its summary as an attribute; `serialize_legacy` normalizes first.
//!     Callers pick by where the tree came from. Feeding a legacy tree to `serialize_canonical`
//!     writes its summary node as a body paragraph.

pub mod cache;
pub mod common;
pub mod display;
pub mod error;
pub mod format;
pub mod formats;
pub mod ir;
pub mod registry;
pub mod roundtrip;

pub use cache::ConversionCache;
pub use common::normalize::normalize;
pub use display::{load_for_display, Rendered};
pub use error::{BabelError, Result, ValidationError};
pub use format::Format;
pub use formats::{MarkupOptions, MentionDirectory};
pub use ir::nodes::Document;
pub use ir::wire::{from_wire, to_wire, WireNode, WireShape};
pub use registry::FormatRegistry;

use formats::markup::{parser, serializer};

/// Serializes a typed document to markup.
pub fn serialize_document(doc: &Document, options: &MarkupOptions) -> Result<String> {
    serializer::serialize_to_markup(doc, options)
}

/// Serializes editor nodes whose disclosures already carry the summary as an
/// attribute.
pub fn serialize_canonical(nodes: &[WireNode], options: &MarkupOptions) -> Result<String> {
    let doc = from_wire(nodes)?;
    serialize_document(&doc, options)
}

/// Serializes editor nodes that may use the summary-child disclosure shape.
pub fn serialize_legacy(nodes: &[WireNode], options: &MarkupOptions) -> Result<String> {
    serialize_canonical(&normalize(nodes.to_vec()), options)
}

/// Parses stored markup. Fails only on disclosure nesting past
/// `options.max_depth`.
pub fn parse_markup(text: &str, options: &MarkupOptions) -> Result<Document> {
    parser::parse_from_markup(text, options)
}

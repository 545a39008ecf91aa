//! Rewrites legacy disclosure shapes into the canonical attribute shape.
//!
//! Older documents store a disclosure's summary as its first child:
//!
//! ```text
//! disclosure
//! ├─ summary        <- pseudo-node
//! │  └─ "warn"
//! └─ paragraph
//!    └─ "hidden"
//! ```
//!
//! Newer ones carry it as a `summary` attribute. This module is the only place
//! that knows about both; everything downstream sees the attribute shape.
//!
//! Rules, applied depth-first to every disclosure:
//!
//! 1. `summary` attribute present: keep it, normalize the body.
//! 2. First child is a `summary` node: its children become the summary
//!    attribute and it leaves the body.
//! 3. Otherwise: empty summary, the whole body stays visible.
//!
//! Elements without a `type` are filled with `paragraph` before anything else,
//! and text summaries become a one-leaf node list, so running the normalizer
//! twice changes nothing.

use crate::ir::wire::{NodeKind, WireElement, WireNode, WireSummary, PARAGRAPH};
use tracing::debug;

/// Normalizes a top-level node sequence that may contain legacy disclosures.
pub fn normalize(nodes: Vec<WireNode>) -> Vec<WireNode> {
    nodes.into_iter().map(normalize_node).collect()
}

fn normalize_node(node: WireNode) -> WireNode {
    match node {
        WireNode::Text(_) => node,
        WireNode::Element(element) => WireNode::Element(normalize_element(element)),
    }
}

fn normalize_element(mut element: WireElement) -> WireElement {
    if element.kind.is_none() {
        element.kind = Some(PARAGRAPH.to_string());
    }

    if element.kind() == NodeKind::Disclosure {
        let summary = match element.summary.take() {
            Some(summary) => canonical_summary(summary),
            None => take_summary_child(&mut element.children),
        };
        element.summary = Some(WireSummary::Nodes(normalize(summary)));
    }

    element.children = normalize(std::mem::take(&mut element.children));
    element
}

fn canonical_summary(summary: WireSummary) -> Vec<WireNode> {
    match summary {
        WireSummary::Nodes(nodes) => nodes,
        WireSummary::Text(text) if text.is_empty() => Vec::new(),
        WireSummary::Text(text) => vec![WireNode::text(text)],
    }
}

/// Removes a leading `summary` child and returns its inline content.
fn take_summary_child(children: &mut Vec<WireNode>) -> Vec<WireNode> {
    let leads_with_summary = children
        .first()
        .and_then(WireNode::as_element)
        .is_some_and(|first| first.kind() == NodeKind::Summary);

    if !leads_with_summary {
        return Vec::new();
    }

    debug!("converting legacy summary-child disclosure");
    match children.remove(0) {
        WireNode::Element(summary) => summary.children,
        WireNode::Text(_) => Vec::new(),
    }
}

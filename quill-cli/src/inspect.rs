//! Inspection views
//!
//! `quill inspect` shows a document at one of the pipeline stages:
//!
//! - `treeviz`: typed tree with Unicode icons (default)
//! - `events`: the flat event stream between tree and markup, indented by
//!   nesting
//! - `json` / `json-legacy`: editor JSON in either disclosure shape
//!
//! Views accept extra parameters via `--extra-<name> [value]`:
//!
//! - `inlines`: "false" hides inline nodes in the tree view
//!
//! Example: `quill inspect post.md treeviz --extra-inlines false`

use quill_babel::common::nested_to_flat::tree_to_events;
use quill_babel::formats::treeviz::to_treeviz_str_with_params;
use quill_babel::ir::events::Event;
use quill_babel::ir::nodes::Document;
use quill_babel::ir::wire::{to_wire, to_wire_json};
use quill_babel::{BabelError, WireShape};
use std::collections::HashMap;

/// All available inspection views
pub const AVAILABLE_VIEWS: &[&str] = &["treeviz", "events", "json", "json-legacy"];

/// Render `doc` in the named view.
pub fn render_view(
    doc: &Document,
    view: &str,
    max_depth: usize,
    extra_params: &HashMap<String, String>,
) -> Result<String, BabelError> {
    match view {
        "treeviz" => to_treeviz_str_with_params(doc, max_depth, extra_params),
        "events" => Ok(events_to_string(&tree_to_events(doc, max_depth)?)),
        "json" => to_wire_json(&to_wire(doc, WireShape::Attribute)).map(with_newline),
        "json-legacy" => to_wire_json(&to_wire(doc, WireShape::SummaryChild)).map(with_newline),
        other => Err(BabelError::NotSupported(format!("Unknown view '{other}'"))),
    }
}

fn with_newline(mut text: String) -> String {
    text.push('\n');
    text
}

fn events_to_string(events: &[Event]) -> String {
    let mut out = String::new();
    let mut indent = 0usize;
    for event in events {
        let closes = matches!(
            event,
            Event::EndDocument
                | Event::EndParagraph
                | Event::EndHeading
                | Event::EndDisclosure
                | Event::EndSummary
        );
        if closes {
            indent = indent.saturating_sub(1);
        }
        out.push_str(&"  ".repeat(indent));
        out.push_str(&format!("{event:?}"));
        out.push('\n');
        if matches!(
            event,
            Event::StartDocument
                | Event::StartParagraph
                | Event::StartHeading(_)
                | Event::StartDisclosure
                | Event::StartSummary
        ) {
            indent += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_babel::{parse_markup, MarkupOptions};

    fn doc(source: &str) -> Document {
        parse_markup(source, &MarkupOptions::default()).unwrap()
    }

    #[test]
    fn events_view_indents_by_nesting() {
        let output = render_view(
            &doc("<details>\n<summary>S</summary>\nbody\n</details>"),
            "events",
            32,
            &HashMap::new(),
        )
        .unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "StartDocument");
        assert_eq!(lines[1], "  StartDisclosure");
        assert_eq!(lines[2], "    StartSummary");
        assert!(lines[3].starts_with("      Inline("));
        assert_eq!(lines[4], "    EndSummary");
        assert_eq!(lines.last(), Some(&"EndDocument"));
    }

    #[test]
    fn json_views_use_both_shapes() {
        let doc = doc("<details>\n<summary>S</summary>\nbody\n</details>");
        let canonical = render_view(&doc, "json", 32, &HashMap::new()).unwrap();
        let legacy = render_view(&doc, "json-legacy", 32, &HashMap::new()).unwrap();

        assert!(canonical.contains("\"summary\": ["));
        assert!(legacy.contains("\"type\": \"summary\""));
        assert!(!legacy.contains("\"summary\": ["));
    }

    #[test]
    fn unknown_view_is_rejected() {
        let result = render_view(&Document::default(), "nodemap", 32, &HashMap::new());
        assert!(matches!(result, Err(BabelError::NotSupported(_))));
    }
}

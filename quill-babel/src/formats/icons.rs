//! Icon mapping for tree visualization

/// Get the Unicode icon for a given node type
///
/// Returns a single Unicode character that visually represents the node type,
/// so the tree can be scanned by shape before reading labels.
pub fn get_icon(node_type: &str) -> &'static str {
    match node_type {
        "Document" => "⧉",
        "Heading" => "§",
        "Paragraph" => "¶",
        "Disclosure" => "▸",
        "Summary" => "⊤",
        "CodeBlock" => "𝒱",
        "Image" => "▣",
        "Text" => "◦",
        "Mention" => "@",
        "Link" => "⊕",
        _ => "○",
    }
}

//! Format registry for format discovery and selection
//!
//! Formats are registered under their name and can be looked up by name or
//! by file extension.

use crate::error::BabelError;
use crate::format::Format;
use crate::formats::{JsonFormat, MarkupFormat, MarkupOptions, TreevizFormat};
use crate::ir::nodes::Document;
use std::collections::HashMap;

/// Registry of document formats
///
/// # Examples
///
/// ```ignore
/// let registry = FormatRegistry::default();
/// let doc = registry.parse(&stored_markup, "markup")?;
/// let json = registry.serialize(&doc, "json")?;
/// ```
pub struct FormatRegistry {
    formats: HashMap<String, Box<dyn Format>>,
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        FormatRegistry {
            formats: HashMap::new(),
        }
    }

    /// Register a format
    ///
    /// If a format with the same name already exists, it will be replaced.
    pub fn register<F: Format + 'static>(&mut self, format: F) {
        self.formats
            .insert(format.name().to_string(), Box::new(format));
    }

    /// Get a format by name
    pub fn get(&self, name: &str) -> Result<&dyn Format, BabelError> {
        self.formats
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| BabelError::FormatNotFound(name.to_string()))
    }

    /// Check if a format exists
    pub fn has(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// List all available format names (sorted)
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formats.keys().cloned().collect();
        names.sort();
        names
    }

    /// Detect format from filename based on file extension
    ///
    /// When several formats claim an extension the alphabetically first name
    /// wins, so detection does not depend on hash order.
    pub fn detect_format_from_filename(&self, filename: &str) -> Option<String> {
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())?;

        self.list_formats().into_iter().find(|name| {
            self.formats
                .get(name)
                .is_some_and(|format| format.file_extensions().contains(&extension))
        })
    }

    /// Parse source text using the specified format
    pub fn parse(&self, source: &str, format: &str) -> Result<Document, BabelError> {
        let fmt = self.get(format)?;
        if !fmt.supports_parsing() {
            return Err(BabelError::NotSupported(format!(
                "Format '{format}' does not support parsing"
            )));
        }
        fmt.parse(source)
    }

    /// Serialize a document using the specified format
    pub fn serialize(&self, doc: &Document, format: &str) -> Result<String, BabelError> {
        self.serialize_with_options(doc, format, &HashMap::new())
    }

    /// Serialize a document using the specified format and options
    pub fn serialize_with_options(
        &self,
        doc: &Document,
        format: &str,
        options: &HashMap<String, String>,
    ) -> Result<String, BabelError> {
        let fmt = self.get(format)?;
        if !fmt.supports_serialization() {
            return Err(BabelError::NotSupported(format!(
                "Format '{format}' does not support serialization"
            )));
        }
        fmt.serialize_with_options(doc, options)
    }

    /// Create a registry with default formats
    pub fn with_defaults() -> Self {
        Self::with_options(&MarkupOptions::default())
    }

    /// Create a registry with default formats sharing one set of markup
    /// options (depth limit and mention directory)
    pub fn with_options(options: &MarkupOptions) -> Self {
        let mut registry = Self::new();

        registry.register(MarkupFormat::new(options.clone()));
        registry.register(JsonFormat::canonical());
        registry.register(JsonFormat::legacy());
        registry.register(TreevizFormat::new(options.max_depth));

        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

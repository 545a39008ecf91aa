//! Shared configuration loader for the quill tools.
//!
//! `defaults/quill.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`QuillConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use quill_babel::{ConversionCache, MarkupOptions, MentionDirectory};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/quill.default.toml");

/// Top-level configuration consumed by quill applications.
#[derive(Debug, Clone, Deserialize)]
pub struct QuillConfig {
    pub parser: ParserConfig,
    pub cache: CacheConfig,
}

/// Knobs shared by the markup parser and serializer.
#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    pub max_depth: usize,
    #[serde(default)]
    pub mentions: Vec<MentionEntry>,
}

/// One mention directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MentionEntry {
    pub display: String,
    pub user_id: String,
}

impl From<&ParserConfig> for MarkupOptions {
    fn from(config: &ParserConfig) -> Self {
        let mentions: MentionDirectory = config
            .mentions
            .iter()
            .map(|entry| (entry.display.clone(), entry.user_id.clone()))
            .collect();
        MarkupOptions::default()
            .with_max_depth(config.max_depth)
            .with_mentions(mentions)
    }
}

impl From<ParserConfig> for MarkupOptions {
    fn from(config: ParserConfig) -> Self {
        MarkupOptions::from(&config)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    pub capacity: usize,
}

impl CacheConfig {
    /// The conversion cache this configuration asks for, if any.
    pub fn build(&self) -> Option<ConversionCache> {
        self.enabled.then(|| ConversionCache::new(self.capacity))
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<QuillConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<QuillConfig, ConfigError> {
    Loader::new().build()
}

//! Shared configuration loader for the notemark toolchain.
//!
//! `defaults/notemark.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`NotemarkConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use notemark_babel::formats::markdown::ExportRules;
use notemark_babel::shortcut::ShortcutRules;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/notemark.default.toml");

/// Optional per-project file picked up from the working directory.
pub const PROJECT_CONFIG_FILE: &str = "notemark.toml";

/// Top-level configuration consumed by notemark applications.
#[derive(Debug, Clone, Deserialize)]
pub struct NotemarkConfig {
    pub export: ExportConfig,
    pub shortcuts: ShortcutsConfig,
    pub inspect: InspectConfig,
}

/// Mirrors the knobs exposed by the Markdown exporter.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    pub unordered_marker: char,
    pub emphasis_marker: char,
    pub list_indent: usize,
    pub trailing_newline: bool,
}

impl From<&ExportConfig> for ExportRules {
    fn from(config: &ExportConfig) -> Self {
        ExportRules {
            unordered_marker: config.unordered_marker,
            emphasis_marker: config.emphasis_marker,
            list_indent: config.list_indent,
            trailing_newline: config.trailing_newline,
        }
    }
}

impl From<ExportConfig> for ExportRules {
    fn from(config: ExportConfig) -> Self {
        ExportRules::from(&config)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShortcutsConfig {
    pub block: bool,
    pub inline: bool,
    pub trigger_on_space: bool,
}

impl From<&ShortcutsConfig> for ShortcutRules {
    fn from(config: &ShortcutsConfig) -> Self {
        ShortcutRules {
            block: config.block,
            inline: config.inline,
            trigger_on_space: config.trigger_on_space,
        }
    }
}

impl From<ShortcutsConfig> for ShortcutRules {
    fn from(config: ShortcutsConfig) -> Self {
        ShortcutRules::from(&config)
    }
}

/// Controls inspect output.
#[derive(Debug, Clone, Deserialize)]
pub struct InspectConfig {
    pub treeviz: TreevizConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreevizConfig {
    pub show_runs: bool,
    pub show_line_numbers: bool,
}

impl TreevizConfig {
    /// Parameters understood by the treeviz format.
    pub fn as_options(&self) -> HashMap<String, String> {
        HashMap::from([
            ("show-runs".to_string(), self.show_runs.to_string()),
            ("show-linum".to_string(), self.show_line_numbers.to_string()),
        ])
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
    pub fn build(self) -> Result<NotemarkConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<NotemarkConfig, ConfigError> {
    Loader::new().build()
}

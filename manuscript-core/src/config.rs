//! Manuscript configuration.
//!
//! Built in code with the `with_*` methods, or loaded from a TOML file:
//!
//! ```toml
//! title = "The Perceptron"
//! subtitle = "Inception, Impact, and Legacy"
//! output_dir = "text_output"
//! schema = "literature_review"
//! autosave = true
//!
//! [author]
//! name = "John Doe"
//! properties = { email = "john@example.com" }
//!
//! [publication]
//! publisher = "ABC Publishing"
//!
//! [guidelines]
//! Style = "Formal"
//! ```

use crate::metadata::{Author, PublicationInfo};
use crate::schema::SchemaPreset;
use crate::toc::Directives;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default directory for snapshots and rendered output.
pub const DEFAULT_OUTPUT_DIR: &str = "text_output";

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Configuration for creating a manuscript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManuscriptConfig {
    /// Manuscript title; also names the snapshot and rendered files.
    pub title: String,

    pub subtitle: String,

    pub author: Option<Author>,

    pub publication: PublicationInfo,

    /// Where snapshots and rendered markdown are written.
    pub output_dir: PathBuf,

    /// Save a snapshot after every mutating command.
    pub autosave: bool,

    /// Shape of the authoring-metadata store.
    pub schema: SchemaPreset,

    /// Manuscript-wide prompt defaults.
    pub directives: Directives,
    pub guidelines: Directives,
    pub constraints: Directives,
}

impl Default for ManuscriptConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            subtitle: String::new(),
            author: None,
            publication: PublicationInfo::new(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            autosave: true,
            schema: SchemaPreset::default(),
            directives: Directives::new(),
            guidelines: Directives::new(),
            constraints: Directives::new(),
        }
    }
}

impl ManuscriptConfig {
    /// Create a config with a title and defaults for everything else.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    pub fn with_author(mut self, author: Author) -> Self {
        self.author = Some(author);
        self
    }

    /// Add one publication property (publisher, edition, ISBN, ...).
    pub fn with_publication(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.publication.set(key, value);
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_autosave(mut self, autosave: bool) -> Self {
        self.autosave = autosave;
        self
    }

    pub fn with_schema(mut self, schema: SchemaPreset) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_directive(mut self, label: impl Into<String>, text: impl Into<String>) -> Self {
        self.directives.insert(label.into(), text.into());
        self
    }

    pub fn with_guideline(mut self, label: impl Into<String>, text: impl Into<String>) -> Self {
        self.guidelines.insert(label.into(), text.into());
        self
    }

    pub fn with_constraint(mut self, label: impl Into<String>, text: impl Into<String>) -> Self {
        self.constraints.insert(label.into(), text.into());
        self
    }
}

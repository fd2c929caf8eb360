//! Authoring prompts attached to sections.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered label → text map (`"Instruction" → "Write the intro"`).
pub type Directives = IndexMap<String, String>;

/// Instructions for whoever writes a section's content.
///
/// - `directives`: what to write (questions, instructions, creative requests).
/// - `guidelines`: how to write it (role, style, format, audience).
/// - `constraints`: limits on the result (length, excluded content).
///
/// The tree treats a prompt as opaque; only its presence matters for
/// completion tracking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    #[serde(default)]
    pub directives: Directives,
    #[serde(default)]
    pub guidelines: Directives,
    #[serde(default)]
    pub constraints: Directives,
}

impl Prompt {
    pub fn new() -> Self {
        Self::default()
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

    /// Fill each empty map from `defaults`. Non-empty maps are left alone.
    pub fn inherit(&mut self, defaults: &PromptDefaults) {
        if self.directives.is_empty() {
            self.directives = defaults.directives.clone();
        }
        if self.guidelines.is_empty() {
            self.guidelines = defaults.guidelines.clone();
        }
        if self.constraints.is_empty() {
            self.constraints = defaults.constraints.clone();
        }
    }
}

/// Manuscript-wide maps copied into section prompts that leave them empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptDefaults {
    #[serde(default)]
    pub directives: Directives,
    #[serde(default)]
    pub guidelines: Directives,
    #[serde(default)]
    pub constraints: Directives,
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Prompt(directives: ")?;
        write_map(f, &self.directives)?;
        write!(f, ", guidelines: ")?;
        write_map(f, &self.guidelines)?;
        write!(f, ", constraints: ")?;
        write_map(f, &self.constraints)?;
        write!(f, ")")
    }
}

fn write_map(f: &mut impl fmt::Write, map: &Directives) -> fmt::Result {
    write!(f, "{{")?;
    for (i, (label, text)) in map.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "'{label}': '{text}'")?;
    }
    write!(f, "}}")
}

//! Author and publication details.
//!
//! Both are ordered key-value bags. Nothing in the crate interprets the
//! keys; they are printed in the rendered manuscript header.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The person credited with a manuscript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    /// Free-form properties: email, affiliation, pen name, ...
    #[serde(default)]
    pub properties: IndexMap<String, String>,
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: IndexMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Author(name: {}", self.name)?;
        for (key, value) in &self.properties {
            write!(f, ", {key}: {value}")?;
        }
        write!(f, ")")
    }
}

/// Publisher, edition, ISBN, genre, language and the like.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicationInfo {
    properties: IndexMap<String, String>,
}

impl PublicationInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// Uppercase the first character, as header labels are printed.
pub(crate) fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

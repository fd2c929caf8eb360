//! Integer-key paths addressing sections from the root.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A section address: the sequence of child keys from the root.
///
/// The empty path addresses the root itself ("before the first section"
/// when used as a cursor). Displays as dotted section numbering, `"1.2."`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionPath(Vec<u32>);

impl SectionPath {
    /// The root path.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(keys: impl Into<Vec<u32>>) -> Self {
        Self(keys.into())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of keys; also the heading depth when rendered.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn keys(&self) -> &[u32] {
        &self.0
    }

    pub fn last(&self) -> Option<u32> {
        self.0.last().copied()
    }

    /// This path extended by one key.
    pub fn child(&self, key: u32) -> Self {
        let mut keys = self.0.clone();
        keys.push(key);
        Self(keys)
    }

    /// The path with its last key dropped, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        self.0.split_last().map(|(_, rest)| Self(rest.to_vec()))
    }

    /// The first `len` keys.
    pub fn truncated(&self, len: usize) -> Self {
        Self(self.0[..len.min(self.0.len())].to_vec())
    }
}

impl From<Vec<u32>> for SectionPath {
    fn from(keys: Vec<u32>) -> Self {
        Self(keys)
    }
}

impl<const N: usize> From<[u32; N]> for SectionPath {
    fn from(keys: [u32; N]) -> Self {
        Self(keys.to_vec())
    }
}

impl fmt::Display for SectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for key in &self.0 {
            write!(f, "{key}.")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid section path '{input}': '{segment}' is not a section number")]
pub struct ParsePathError {
    pub input: String,
    pub segment: String,
}

impl FromStr for SectionPath {
    type Err = ParsePathError;

    /// Parse `"1.2."`, `"1.2"` or `""`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('.');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        trimmed
            .split('.')
            .map(|segment| {
                segment.trim().parse::<u32>().map_err(|_| ParsePathError {
                    input: s.to_string(),
                    segment: segment.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

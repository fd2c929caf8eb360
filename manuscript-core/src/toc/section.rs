//! Section nodes and the path-addressed section tree.

use super::path::SectionPath;
use super::prompt::Prompt;
use crate::schema::json_type_name;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Errors raised by tree mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TocError {
    #[error("section title must be given")]
    MissingTitle,

    #[error("a section must be a record, found {found}")]
    NotARecord { found: &'static str },

    #[error("section prompt is malformed: {0}")]
    InvalidPrompt(String),

    #[error("no section at '{0}' to insert under")]
    MissingParent(SectionPath),

    #[error("no section at '{0}'")]
    NotFound(SectionPath),
}

/// Children of a node, keyed by caller-chosen section numbers.
///
/// Iteration order is the order keys were first assigned; overwriting a key
/// keeps its position.
pub type Sections = IndexMap<u32, SectionNode>;

/// One section of the outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionNode {
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    prompt: Option<Prompt>,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated: Option<DateTime<Utc>>,
    completed: bool,
    #[serde(default)]
    content: String,
    #[serde(default)]
    summary: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    children: Sections,
}

impl SectionNode {
    fn from_draft(draft: SectionDraft, now: DateTime<Utc>) -> Self {
        let completed = draft.completed.unwrap_or(draft.prompt.is_none());
        Self {
            title: draft.title,
            prompt: draft.prompt,
            created: now,
            modified: now,
            updated: None,
            completed,
            content: draft.content,
            summary: draft.summary,
            children: Sections::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    /// When content or summary last changed.
    pub fn updated(&self) -> Option<DateTime<Utc>> {
        self.updated
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn children(&self) -> &Sections {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Replace the content and set the completion flag.
    pub fn set_content(&mut self, content: impl Into<String>, completed: bool) {
        self.content = content.into();
        self.completed = completed;
        self.touch_updated();
    }

    pub fn set_summary(&mut self, summary: impl Into<String>) {
        self.summary = summary.into();
        self.touch_updated();
    }

    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
        self.modified = Utc::now();
    }

    /// Whether this section would be listed as unfinished: it has a prompt
    /// and is not completed. Sections without prompts are headings.
    pub fn is_pending(&self) -> bool {
        self.prompt.is_some() && !self.completed
    }

    /// Completion as shown in an outline: the flag for prompted sections,
    /// otherwise the completion of every child.
    pub fn is_settled(&self) -> bool {
        if self.prompt.is_some() {
            self.completed
        } else {
            self.children.values().all(SectionNode::is_settled)
        }
    }

    fn touch_updated(&mut self) {
        let now = Utc::now();
        self.updated = Some(now);
        self.modified = now;
    }
}

/// The caller-supplied part of a new section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionDraft {
    pub title: String,
    pub prompt: Option<Prompt>,
    /// Overrides the default (`true` exactly when there is no prompt).
    pub completed: Option<bool>,
    pub content: String,
    pub summary: String,
}

impl SectionDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_prompt(mut self, prompt: Prompt) -> Self {
        self.prompt = Some(prompt);
        self
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }
}

impl TryFrom<Value> for SectionDraft {
    type Error = TocError;

    /// Build a draft from a loosely typed record such as
    /// `{"title": "Intro", "prompt": {"directives": {...}}}`.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let mut map = match value {
            Value::Object(map) => map,
            other => {
                return Err(TocError::NotARecord {
                    found: json_type_name(&other),
                })
            }
        };

        let title = match map.remove("title") {
            Some(Value::String(title)) if !title.trim().is_empty() => title,
            _ => return Err(TocError::MissingTitle),
        };
        let prompt = map
            .remove("prompt")
            .filter(|p| !p.is_null())
            .map(serde_json::from_value::<Prompt>)
            .transpose()
            .map_err(|e| TocError::InvalidPrompt(e.to_string()))?;
        let text = |v: Option<Value>| v.and_then(|v| v.as_str().map(str::to_string)).unwrap_or_default();

        Ok(Self {
            title,
            prompt,
            completed: map.remove("completed").and_then(|v| v.as_bool()),
            content: text(map.remove("content")),
            summary: text(map.remove("summary")),
        })
    }
}

/// A section that still needs writing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncompleteSection {
    pub path: SectionPath,
    pub title: String,
}

/// The outline: top-level sections plus root timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionTree {
    #[serde(default)]
    sections: Sections,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
}

impl Default for SectionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionTree {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            sections: Sections::new(),
            created: now,
            modified: now,
        }
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// Last time a top-level section was inserted.
    pub fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Total number of sections at every depth.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// The node at `path`. The root path has no node.
    pub fn get(&self, path: &SectionPath) -> Option<&SectionNode> {
        let (first, rest) = path.keys().split_first()?;
        let mut node = self.sections.get(first)?;
        for key in rest {
            node = node.children.get(key)?;
        }
        Some(node)
    }

    pub fn get_mut(&mut self, path: &SectionPath) -> Option<&mut SectionNode> {
        let (first, rest) = path.keys().split_first()?;
        let mut node = self.sections.get_mut(first)?;
        for key in rest {
            node = node.children.get_mut(key)?;
        }
        Some(node)
    }

    /// The children under `path`; the root path yields the top level.
    pub fn children_of(&self, path: &SectionPath) -> Option<&Sections> {
        if path.is_root() {
            Some(&self.sections)
        } else {
            self.get(path).map(SectionNode::children)
        }
    }

    pub fn contains(&self, path: &SectionPath) -> bool {
        self.get(path).is_some()
    }

    /// Top-level sections in insertion order.
    pub fn sections(&self) -> &Sections {
        &self.sections
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Insert (or overwrite) the section at `parent` + `key`.
    ///
    /// The parent's `modified` time is refreshed. An overwrite replaces the
    /// whole node, children included, but keeps its sibling position.
    pub fn insert(
        &mut self,
        parent: &SectionPath,
        key: u32,
        draft: SectionDraft,
    ) -> Result<&SectionNode, TocError> {
        if draft.title.trim().is_empty() {
            return Err(TocError::MissingTitle);
        }

        let now = Utc::now();
        let siblings = if parent.is_root() {
            self.modified = now;
            &mut self.sections
        } else {
            let node = self
                .get_mut(parent)
                .ok_or_else(|| TocError::MissingParent(parent.clone()))?;
            node.modified = now;
            &mut node.children
        };

        debug!(path = %parent.child(key), title = %draft.title, "inserting section");
        let node = SectionNode::from_draft(draft, now);
        let slot = match siblings.entry(key) {
            indexmap::map::Entry::Occupied(mut entry) => {
                entry.insert(node);
                entry.into_mut()
            }
            indexmap::map::Entry::Vacant(entry) => entry.insert(node),
        };
        Ok(slot)
    }

    /// Apply `f` to the node at `path`.
    pub fn update<T>(
        &mut self,
        path: &SectionPath,
        f: impl FnOnce(&mut SectionNode) -> T,
    ) -> Result<T, TocError> {
        self.get_mut(path)
            .map(f)
            .ok_or_else(|| TocError::NotFound(path.clone()))
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Every section in pre-order, siblings in insertion order.
    pub fn iter(&self) -> Preorder<'_> {
        Preorder {
            stack: vec![(SectionPath::root(), self.sections.iter())],
        }
    }

    /// Prompted, unfinished sections in ascending key order at each level.
    pub fn incomplete(&self) -> Vec<IncompleteSection> {
        let mut out = Vec::new();
        collect_incomplete(&self.sections, &SectionPath::root(), &mut out);
        out
    }
}

fn collect_incomplete(sections: &Sections, base: &SectionPath, out: &mut Vec<IncompleteSection>) {
    let mut keys: Vec<_> = sections.keys().copied().collect();
    keys.sort_unstable();
    for key in keys {
        let node = &sections[&key];
        let path = base.child(key);
        if node.is_pending() {
            out.push(IncompleteSection {
                path: path.clone(),
                title: node.title.clone(),
            });
        }
        collect_incomplete(&node.children, &path, out);
    }
}

/// Pre-order iterator over `(path, node)` pairs.
pub struct Preorder<'a> {
    stack: Vec<(SectionPath, indexmap::map::Iter<'a, u32, SectionNode>)>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = (SectionPath, &'a SectionNode);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (base, iter) = self.stack.last_mut()?;
            match iter.next() {
                Some((key, node)) => {
                    let path = base.child(*key);
                    self.stack.push((path.clone(), node.children.iter()));
                    return Some((path, node));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

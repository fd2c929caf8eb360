//! Manuscript - the controller tying outline, cursor and schema together.
//!
//! A [`Manuscript`] owns one [`SectionTree`], the navigation [`Cursor`] over
//! it and a [`SchemaStore`] for free-form authoring metadata (characters,
//! citations, ...). Callers drive it section by section:
//!
//! ```ignore
//! let mut manuscript = Manuscript::new(&ManuscriptConfig::new("Perceptron"))?;
//! manuscript.add_section(&"1".parse()?, SectionDraft::new("Introduction").with_prompt(prompt))?;
//!
//! let step = manuscript.move_to_next_and_get_prompts();
//! manuscript.set_content_at_cursor("...", true)?;
//! manuscript.save().await?;
//! ```

use crate::config::ManuscriptConfig;
use crate::metadata::{Author, PublicationInfo};
use crate::persist::{snapshot_path, PersistError, SavedManuscript};
use crate::schema::{AccessorArgs, SchemaError, SchemaStore};
use crate::toc::{
    Cursor, Directives, IncompleteSection, Prompt, PromptDefaults, SectionDraft, SectionNode,
    SectionPath, SectionTree, TocError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Errors from manuscript operations.
#[derive(Debug, Error)]
pub enum ManuscriptError {
    #[error("manuscript title cannot be empty")]
    MissingTitle,

    #[error("section error: {0}")]
    Toc(#[from] TocError),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("the cursor is not on a section; move to the next section first")]
    NoCurrentSection,

    #[error("the root path does not address a section")]
    RootPath,
}

/// Unique identifier for a manuscript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManuscriptId(pub Uuid);

impl ManuscriptId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ManuscriptId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ManuscriptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the caller should work on after advancing.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionInstructions {
    /// The section just moved to.
    pub current_index: SectionPath,

    /// Its prompt; `None` means the section is a heading to skip.
    pub current_prompt: Option<Prompt>,

    /// A preview of the following section, or `None` when there is no
    /// current prompt (so the caller moves on instead of writing).
    pub next_prompt_directives: Option<NextDirectives>,
}

/// Lookahead past the current section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextDirectives {
    /// The next section's directives (empty when it has no prompt).
    Directives(Directives),
    /// The next step wraps to the start: this is the last section.
    End,
}

impl NextDirectives {
    pub fn is_end(&self) -> bool {
        matches!(self, NextDirectives::End)
    }
}

/// A manuscript being written.
#[derive(Debug, Clone)]
pub struct Manuscript {
    id: ManuscriptId,
    title: String,
    subtitle: String,
    author: Option<Author>,
    publication: PublicationInfo,
    output_dir: PathBuf,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
    completed: bool,
    defaults: PromptDefaults,
    toc: SectionTree,
    cursor: Cursor,
    schema: SchemaStore,
}

impl Manuscript {
    /// Create an empty manuscript from configuration.
    pub fn new(config: &ManuscriptConfig) -> Result<Self, ManuscriptError> {
        if config.title.trim().is_empty() {
            return Err(ManuscriptError::MissingTitle);
        }
        let schema = config.schema.build()?;
        let now = Utc::now();
        let manuscript = Self {
            id: ManuscriptId::new(),
            title: config.title.clone(),
            subtitle: config.subtitle.clone(),
            author: config.author.clone(),
            publication: config.publication.clone(),
            output_dir: config.output_dir.clone(),
            created: now,
            updated: now,
            completed: false,
            defaults: PromptDefaults {
                directives: config.directives.clone(),
                guidelines: config.guidelines.clone(),
                constraints: config.constraints.clone(),
            },
            toc: SectionTree::new(),
            cursor: Cursor::new(),
            schema,
        };
        info!(id = %manuscript.id, title = %manuscript.title, "manuscript created");
        Ok(manuscript)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> ManuscriptId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn subtitle(&self) -> &str {
        &self.subtitle
    }

    /// `Title: Subtitle`, or just the title.
    pub fn full_title(&self) -> String {
        if self.subtitle.is_empty() {
            self.title.clone()
        } else {
            format!("{}: {}", self.title, self.subtitle)
        }
    }

    pub fn author(&self) -> Option<&Author> {
        self.author.as_ref()
    }

    pub fn publication(&self) -> &PublicationInfo {
        &self.publication
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn updated(&self) -> DateTime<Utc> {
        self.updated
    }

    /// Set by [`check_complete`](Self::check_complete) once nothing is left.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn toc(&self) -> &SectionTree {
        &self.toc
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn prompt_defaults(&self) -> &PromptDefaults {
        &self.defaults
    }

    pub fn schema(&self) -> &SchemaStore {
        &self.schema
    }

    /// Direct access to the schema store.
    ///
    /// Prefer [`invoke_accessor`](Self::invoke_accessor), which also bumps
    /// the `updated` time on writes.
    pub fn schema_mut(&mut self) -> &mut SchemaStore {
        &mut self.schema
    }

    /// Swap in a different schema store, e.g. a research preset.
    pub fn set_schema(&mut self, schema: SchemaStore) {
        self.schema = schema;
        self.touch();
    }

    pub fn set_author(&mut self, author: Author) {
        self.author = Some(author);
        self.touch();
    }

    pub fn publication_mut(&mut self) -> &mut PublicationInfo {
        &mut self.publication
    }

    pub fn set_directives(&mut self, directives: Directives) {
        self.defaults.directives = directives;
        self.touch();
    }

    pub fn set_guidelines(&mut self, guidelines: Directives) {
        self.defaults.guidelines = guidelines;
        self.touch();
    }

    pub fn set_constraints(&mut self, constraints: Directives) {
        self.defaults.constraints = constraints;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated = Utc::now();
    }

    // =========================================================================
    // Outline
    // =========================================================================

    /// Insert a section under `parent` at `key`.
    ///
    /// Empty prompt maps are filled from the manuscript-wide defaults at this
    /// point; later changes to the defaults do not reach existing sections.
    pub fn insert_section(
        &mut self,
        parent: &SectionPath,
        key: u32,
        mut draft: SectionDraft,
    ) -> Result<(), ManuscriptError> {
        if let Some(prompt) = draft.prompt.as_mut() {
            prompt.inherit(&self.defaults);
        }
        self.toc.insert(parent, key, draft)?;
        self.touch();
        Ok(())
    }

    /// Insert a section at a full path such as `1.2.`.
    pub fn add_section(&mut self, path: &SectionPath, draft: SectionDraft) -> Result<(), ManuscriptError> {
        let (parent, key) = path
            .parent()
            .zip(path.last())
            .ok_or(ManuscriptError::RootPath)?;
        self.insert_section(&parent, key, draft)
    }

    /// Insert a section from a loosely typed record (`{"title": ..}`).
    pub fn add_section_value(&mut self, path: &SectionPath, value: Value) -> Result<(), ManuscriptError> {
        let draft = SectionDraft::try_from(value)?;
        self.add_section(path, draft)
    }

    pub fn section(&self, path: &SectionPath) -> Option<&SectionNode> {
        self.toc.get(path)
    }

    /// Whether the section at `path` is completed; `false` when absent.
    pub fn is_section_complete(&self, path: &SectionPath) -> bool {
        self.toc.get(path).is_some_and(SectionNode::is_completed)
    }

    /// The prompt at `path`.
    ///
    /// A section without one is a heading: this logs an advisory notice so
    /// the caller can move on.
    pub fn prompt_at(&self, path: &SectionPath) -> Option<&Prompt> {
        let node = self.toc.get(path)?;
        let prompt = node.prompt();
        if prompt.is_none() {
            warn!(
                section = %path,
                title = node.title(),
                "section has no prompt for content generation, move on to the next section"
            );
        }
        prompt
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn current_path(&self) -> &SectionPath {
        self.cursor.current()
    }

    pub fn current_section(&self) -> Option<&SectionNode> {
        self.toc.get(self.cursor.current())
    }

    pub fn current_prompt(&self) -> Option<&Prompt> {
        self.prompt_at(self.cursor.current())
    }

    /// Where the next advance would land.
    pub fn find_next(&self) -> SectionPath {
        self.cursor.peek(&self.toc)
    }

    /// Advance one section in depth-first order, wrapping at the end.
    pub fn move_to_next(&mut self) -> SectionPath {
        self.cursor.advance(&self.toc).clone()
    }

    /// Reposition the cursor. The root path is allowed and means "before the
    /// first section".
    pub fn set_cursor(&mut self, path: SectionPath) -> Result<(), ManuscriptError> {
        if !path.is_root() && !self.toc.contains(&path) {
            return Err(TocError::NotFound(path).into());
        }
        self.cursor.set(path);
        Ok(())
    }

    /// Advance, then report the current prompt and a preview of what follows.
    pub fn move_to_next_and_get_prompts(&mut self) -> SectionInstructions {
        let current_index = self.move_to_next();
        let current_prompt = self.prompt_at(&current_index).cloned();

        let next_index = self.find_next();
        let wraps = self
            .cursor
            .start()
            .map_or(true, |start| *start == next_index);
        let next = if wraps {
            NextDirectives::End
        } else {
            NextDirectives::Directives(
                self.toc
                    .get(&next_index)
                    .and_then(SectionNode::prompt)
                    .map(|p| p.directives.clone())
                    .unwrap_or_default(),
            )
        };
        debug!(current = %current_index, next = %next_index, end = wraps, "prompts for next section");

        SectionInstructions {
            current_index,
            next_prompt_directives: current_prompt.as_ref().map(|_| next),
            current_prompt,
        }
    }

    // =========================================================================
    // Content
    // =========================================================================

    pub fn set_content(
        &mut self,
        path: &SectionPath,
        content: impl Into<String>,
        completed: bool,
    ) -> Result<(), ManuscriptError> {
        self.toc.update(path, |node| node.set_content(content, completed))?;
        self.touch();
        Ok(())
    }

    pub fn set_summary(&mut self, path: &SectionPath, summary: impl Into<String>) -> Result<(), ManuscriptError> {
        self.toc.update(path, |node| node.set_summary(summary))?;
        self.touch();
        Ok(())
    }

    pub fn set_completed(&mut self, path: &SectionPath, completed: bool) -> Result<(), ManuscriptError> {
        self.toc.update(path, |node| node.set_completed(completed))?;
        self.touch();
        Ok(())
    }

    pub fn set_content_at_cursor(&mut self, content: impl Into<String>, completed: bool) -> Result<(), ManuscriptError> {
        let path = self.cursor_section()?;
        self.set_content(&path, content, completed)
    }

    pub fn set_summary_at_cursor(&mut self, summary: impl Into<String>) -> Result<(), ManuscriptError> {
        let path = self.cursor_section()?;
        self.set_summary(&path, summary)
    }

    pub fn set_completed_at_cursor(&mut self, completed: bool) -> Result<(), ManuscriptError> {
        let path = self.cursor_section()?;
        self.set_completed(&path, completed)
    }

    fn cursor_section(&self) -> Result<SectionPath, ManuscriptError> {
        let path = self.cursor.current();
        if path.is_root() {
            return Err(ManuscriptError::NoCurrentSection);
        }
        Ok(path.clone())
    }

    /// List unfinished prompted sections; when there are none the manuscript
    /// is marked completed.
    pub fn check_complete(&mut self) -> Vec<IncompleteSection> {
        let incomplete = self.toc.incomplete();
        if incomplete.is_empty() {
            info!(title = %self.title, "all sections are completed");
            self.completed = true;
        } else {
            for section in &incomplete {
                debug!(section = %section.path, title = %section.title, "section not completed");
            }
        }
        incomplete
    }

    // =========================================================================
    // Schema
    // =========================================================================

    /// Run a textual accessor (`add_character`, `get_scenes`, ...) with
    /// positional JSON arguments.
    pub fn invoke_accessor(&mut self, accessor: &str, args: Vec<Value>) -> Result<Option<Value>, ManuscriptError> {
        let (op, _) = self.schema.resolve_accessor(accessor)?;
        let result = self.schema.invoke_positional(accessor, args)?;
        if op.is_mutating() {
            self.touch();
        }
        Ok(result)
    }

    /// Run a textual accessor with named arguments.
    pub fn invoke_accessor_with(&mut self, accessor: &str, args: AccessorArgs) -> Result<Option<Value>, ManuscriptError> {
        let (op, _) = self.schema.resolve_accessor(accessor)?;
        let result = self.schema.invoke(accessor, args)?;
        if op.is_mutating() {
            self.touch();
        }
        Ok(result)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Capture the whole manuscript as an inert, serializable value.
    pub fn to_saved(&self) -> SavedManuscript {
        SavedManuscript::new(ManuscriptState {
            id: self.id,
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            author: self.author.clone(),
            publication: self.publication.clone(),
            output_dir: self.output_dir.clone(),
            created: self.created,
            updated: self.updated,
            completed: self.completed,
            defaults: self.defaults.clone(),
            toc: self.toc.clone(),
            cursor: self.cursor.clone(),
            schema: self.schema.snapshot(),
        })
    }

    /// Adopt a loaded snapshot, re-validating the schema store.
    pub fn from_saved(saved: SavedManuscript) -> Result<Self, ManuscriptError> {
        let state = saved.state;
        if state.title.trim().is_empty() {
            return Err(ManuscriptError::MissingTitle);
        }
        let schema = SchemaStore::from_snapshot(state.schema)?;
        info!(id = %state.id, title = %state.title, "manuscript restored");
        Ok(Self {
            id: state.id,
            title: state.title,
            subtitle: state.subtitle,
            author: state.author,
            publication: state.publication,
            output_dir: state.output_dir,
            created: state.created,
            updated: state.updated,
            completed: state.completed,
            defaults: state.defaults,
            toc: state.toc,
            cursor: state.cursor,
            schema,
        })
    }

    /// Where [`save`](Self::save) writes: `<output_dir>/<title>.json`.
    pub fn snapshot_path(&self) -> PathBuf {
        snapshot_path(&self.output_dir, &self.title)
    }

    /// Write a snapshot to [`snapshot_path`](Self::snapshot_path), creating
    /// the output directory if needed.
    pub async fn save(&self) -> Result<PathBuf, PersistError> {
        let path = self.snapshot_path();
        tokio::fs::create_dir_all(&self.output_dir).await?;
        self.to_saved().save_json(&path).await?;
        Ok(path)
    }

    /// Load and adopt a snapshot file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let saved = SavedManuscript::load_json(path).await?;
        Ok(Self::from_saved(saved)?)
    }

    /// Restore the snapshot for `config`'s title if one exists, otherwise
    /// start a new manuscript.
    pub async fn open(config: &ManuscriptConfig) -> Result<Self, PersistError> {
        let path = snapshot_path(&config.output_dir, &config.title);
        if tokio::fs::try_exists(&path).await? {
            info!(path = %path.display(), "restoring manuscript from previous state");
            Self::load(&path).await
        } else {
            Ok(Self::new(config)?)
        }
    }
}

/// Every field of a [`Manuscript`], in inert form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManuscriptState {
    pub id: ManuscriptId,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub publication: PublicationInfo,
    pub output_dir: PathBuf,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub defaults: PromptDefaults,
    pub toc: SectionTree,
    #[serde(default)]
    pub cursor: Cursor,
    pub schema: crate::schema::SchemaSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{prompt, sample_manuscript};
    use serde_json::json;

    fn config() -> ManuscriptConfig {
        ManuscriptConfig::new("Test Manuscript")
    }

    #[test]
    fn test_empty_title_rejected() {
        let err = Manuscript::new(&ManuscriptConfig::new("  ")).unwrap_err();
        assert!(matches!(err, ManuscriptError::MissingTitle));
    }

    #[test]
    fn test_prompt_inherits_defaults_at_insertion() {
        let config = config().with_guideline("Style", "Formal");
        let mut manuscript = Manuscript::new(&config).unwrap();
        manuscript
            .add_section(&[1].into(), SectionDraft::new("Intro").with_prompt(prompt("Write")))
            .unwrap();

        let mut later = Directives::new();
        later.insert("Style".to_string(), "Casual".to_string());
        manuscript.set_guidelines(later);

        let stored = manuscript.section(&[1].into()).unwrap().prompt().unwrap();
        assert_eq!(stored.guidelines["Style"], "Formal");
        assert_eq!(manuscript.prompt_defaults().guidelines["Style"], "Casual");
    }

    #[test]
    fn test_add_section_at_root_rejected() {
        let mut manuscript = Manuscript::new(&config()).unwrap();
        let err = manuscript
            .add_section(&SectionPath::root(), SectionDraft::new("Nowhere"))
            .unwrap_err();
        assert!(matches!(err, ManuscriptError::RootPath));
    }

    #[test]
    fn test_is_section_complete() {
        let mut manuscript = sample_manuscript();
        // Unprompted heading, prompted section, missing path.
        assert!(manuscript.is_section_complete(&[1].into()));
        assert!(!manuscript.is_section_complete(&[1, 1].into()));
        assert!(!manuscript.is_section_complete(&[9].into()));

        manuscript.set_content(&[1, 1].into(), "done", true).unwrap();
        assert!(manuscript.is_section_complete(&[1, 1].into()));
    }

    #[test]
    fn test_move_to_next_and_get_prompts_walks_and_ends() {
        let mut manuscript = sample_manuscript();

        let step = manuscript.move_to_next_and_get_prompts();
        assert_eq!(step.current_index, SectionPath::from([1]));
        // Section 1 is a heading: the lookahead is cleared.
        assert!(step.current_prompt.is_none());
        assert!(step.next_prompt_directives.is_none());

        let step = manuscript.move_to_next_and_get_prompts();
        assert_eq!(step.current_index, SectionPath::from([1, 1]));
        assert!(step.current_prompt.is_some());
        match step.next_prompt_directives {
            Some(NextDirectives::Directives(d)) => assert_eq!(d["Instruction"], "Describe the scope"),
            other => panic!("unexpected lookahead: {other:?}"),
        }

        manuscript.move_to_next_and_get_prompts();
        let last = manuscript.move_to_next_and_get_prompts();
        assert_eq!(last.current_index, SectionPath::from([2]));
        assert_eq!(last.next_prompt_directives, Some(NextDirectives::End));
    }

    #[test]
    fn test_content_at_cursor_needs_a_section() {
        let mut manuscript = sample_manuscript();
        let err = manuscript.set_content_at_cursor("text", true).unwrap_err();
        assert!(matches!(err, ManuscriptError::NoCurrentSection));

        manuscript.set_cursor(SectionPath::from([1, 2])).unwrap();
        manuscript.set_content_at_cursor("Scope text", true).unwrap();
        manuscript.set_summary_at_cursor("About scope").unwrap();
        let node = manuscript.section(&[1, 2].into()).unwrap();
        assert_eq!(node.content(), "Scope text");
        assert_eq!(node.summary(), "About scope");
    }

    #[test]
    fn test_set_cursor_validates() {
        let mut manuscript = sample_manuscript();
        assert!(manuscript.set_cursor(SectionPath::from([9])).is_err());
        assert!(manuscript.set_cursor(SectionPath::root()).is_ok());
    }

    #[test]
    fn test_check_complete() {
        let mut manuscript = sample_manuscript();
        let pending: Vec<_> = manuscript
            .check_complete()
            .into_iter()
            .map(|s| s.path.to_string())
            .collect();
        assert_eq!(pending, vec!["1.1.", "1.2.", "2."]);
        assert!(!manuscript.is_completed());

        for path in [[1, 1], [1, 2]] {
            manuscript.set_content(&path.into(), "done", true).unwrap();
        }
        manuscript.set_completed(&[2].into(), true).unwrap();
        assert!(manuscript.check_complete().is_empty());
        assert!(manuscript.is_completed());
    }

    #[test]
    fn test_invoke_accessor() {
        let mut manuscript = Manuscript::new(&config()).unwrap();
        manuscript
            .invoke_accessor("add_character", vec![json!("Alice"), json!({"Role": "Protagonist"})])
            .unwrap();
        let all = manuscript.invoke_accessor("get_characters", vec![]).unwrap();
        assert_eq!(all, Some(json!({"Alice": {"Role": "Protagonist"}})));
    }

    #[test]
    fn test_saved_round_trip_in_memory() {
        let mut manuscript = sample_manuscript();
        manuscript.move_to_next();
        manuscript
            .invoke_accessor("add_scene", vec![json!("Chapter 1"), json!({"Setting": "Lab"})])
            .unwrap();

        let restored = Manuscript::from_saved(manuscript.to_saved()).unwrap();
        assert_eq!(restored.id(), manuscript.id());
        assert_eq!(restored.toc(), manuscript.toc());
        assert_eq!(restored.cursor(), manuscript.cursor());
        assert_eq!(restored.schema(), manuscript.schema());
    }
}

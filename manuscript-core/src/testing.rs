//! Testing utilities for manuscripts.
//!
//! This module provides tools for integration testing:
//! - Fixtures (`sample_tree`, `sample_manuscript`) with a known outline
//! - `MockWriter` standing in for whoever writes section content
//! - `TestHarness` for scripted write-through scenarios
//! - Assertion helpers for verifying section state

use crate::config::ManuscriptConfig;
use crate::manuscript::{Manuscript, NextDirectives, SectionInstructions};
use crate::toc::{Prompt, SectionDraft, SectionPath, SectionTree};

/// A prompt with a single `Instruction` directive.
pub fn prompt(instruction: &str) -> Prompt {
    Prompt::new().with_directive("Instruction", instruction)
}

/// The outline used across tests:
///
/// ```text
/// 1. Introduction        (heading, no prompt)
///   1.1. Background      "Describe the background"
///   1.2. Scope           "Describe the scope"
/// 2. Conclusion          "Summarize the findings"
/// ```
pub fn sample_tree() -> SectionTree {
    let mut tree = SectionTree::new();
    let root = SectionPath::root();
    let intro = SectionPath::from([1]);
    let steps = [
        (&root, 1, SectionDraft::new("Introduction")),
        (&intro, 1, SectionDraft::new("Background").with_prompt(prompt("Describe the background"))),
        (&intro, 2, SectionDraft::new("Scope").with_prompt(prompt("Describe the scope"))),
        (&root, 2, SectionDraft::new("Conclusion").with_prompt(prompt("Summarize the findings"))),
    ];
    for (parent, key, draft) in steps {
        if let Err(e) = tree.insert(parent, key, draft) {
            panic!("sample tree insert failed: {e}");
        }
    }
    tree
}

/// A manuscript holding the [`sample_tree`] outline, cursor at the start.
pub fn sample_manuscript() -> Manuscript {
    sample_manuscript_with(ManuscriptConfig::new("Test Manuscript"))
}

/// Like [`sample_manuscript`] but with a custom configuration.
pub fn sample_manuscript_with(config: ManuscriptConfig) -> Manuscript {
    let mut manuscript = match Manuscript::new(&config) {
        Ok(m) => m,
        Err(e) => panic!("sample manuscript creation failed: {e}"),
    };
    for (path, node) in sample_tree().iter() {
        let mut draft = SectionDraft::new(node.title());
        if let Some(p) = node.prompt() {
            draft = draft.with_prompt(p.clone());
        }
        if let Err(e) = manuscript.add_section(&path, draft) {
            panic!("sample section {path} failed: {e}");
        }
    }
    manuscript
}

/// Writes scripted content for each prompted section it is asked about.
pub struct MockWriter {
    /// Scripted content in order.
    texts: Vec<String>,
    /// Index of the next text to hand out.
    next: usize,
    /// Prompts seen so far, in order.
    seen: Vec<Prompt>,
}

impl MockWriter {
    pub fn new(texts: Vec<String>) -> Self {
        Self {
            texts,
            next: 0,
            seen: Vec::new(),
        }
    }

    /// The next scripted text for `prompt`, or a placeholder once exhausted.
    pub fn write(&mut self, prompt: &Prompt) -> String {
        self.seen.push(prompt.clone());
        match self.texts.get(self.next) {
            Some(text) => {
                self.next += 1;
                text.clone()
            }
            None => "The writer has no more scripted content.".to_string(),
        }
    }

    pub fn queue(&mut self, text: impl Into<String>) {
        self.texts.push(text.into());
    }

    pub fn prompts_seen(&self) -> &[Prompt] {
        &self.seen
    }
}

/// Test harness that walks a manuscript and fills prompted sections.
pub struct TestHarness {
    pub manuscript: Manuscript,
    pub writer: MockWriter,
}

impl TestHarness {
    /// A harness over [`sample_manuscript`].
    pub fn new() -> Self {
        Self::with_manuscript(sample_manuscript())
    }

    pub fn with_manuscript(manuscript: Manuscript) -> Self {
        Self {
            manuscript,
            writer: MockWriter::new(Vec::new()),
        }
    }

    /// Queue content for the next prompted section.
    pub fn expect_content(&mut self, text: impl Into<String>) -> &mut Self {
        self.writer.queue(text);
        self
    }

    /// Advance one section; write and complete it if it has a prompt.
    pub fn step(&mut self) -> SectionInstructions {
        let step = self.manuscript.move_to_next_and_get_prompts();
        if let Some(prompt) = &step.current_prompt {
            let text = self.writer.write(prompt);
            if let Err(e) = self.manuscript.set_content_at_cursor(text, true) {
                panic!("writing {} failed: {e}", step.current_index);
            }
        }
        step
    }

    /// Step until the lookahead reports the end, returning the visited paths.
    pub fn write_through(&mut self) -> Vec<SectionPath> {
        let mut visited = Vec::new();
        loop {
            let step = self.step();
            visited.push(step.current_index.clone());
            let ended = matches!(step.next_prompt_directives, Some(NextDirectives::End))
                || self.manuscript.cursor().at_end(self.manuscript.toc());
            if ended || self.manuscript.toc().is_empty() {
                return visited;
            }
        }
    }

    pub fn content_at(&self, path: &SectionPath) -> Option<&str> {
        self.manuscript.section(path).map(|n| n.content())
    }

    pub fn is_completed(&self, path: &SectionPath) -> bool {
        self.manuscript.is_section_complete(path)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert that the section at `path` is completed.
#[track_caller]
pub fn assert_completed(harness: &TestHarness, path: &SectionPath) {
    assert!(
        harness.is_completed(path),
        "Expected section '{path}' to be completed"
    );
}

/// Assert that the section at `path` is NOT completed.
#[track_caller]
pub fn assert_pending(harness: &TestHarness, path: &SectionPath) {
    assert!(
        !harness.is_completed(path),
        "Expected section '{path}' to NOT be completed"
    );
}

/// Assert the cursor position.
#[track_caller]
pub fn assert_cursor(harness: &TestHarness, path: &SectionPath) {
    let actual = harness.manuscript.current_path();
    assert_eq!(actual, path, "Expected cursor at '{path}', got '{actual}'");
}

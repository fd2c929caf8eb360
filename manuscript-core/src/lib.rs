//! Manuscript authoring engine.
//!
//! This crate provides:
//! - A schema-driven store for structured authoring metadata (characters,
//!   scenes, citations, ...) with per-field accessors chosen from the shape
//! - A path-addressed section tree with depth-first "resume where I left
//!   off" navigation
//! - The `Manuscript` controller tying both together
//! - Markdown rendering and JSON persistence
//!
//! # Quick Start
//!
//! ```ignore
//! use manuscript_core::{Manuscript, ManuscriptConfig, Prompt, SectionDraft};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ManuscriptConfig::new("The Perceptron")
//!         .with_guideline("Style", "Formal");
//!
//!     let mut manuscript = Manuscript::open(&config).await?;
//!     manuscript.add_section(
//!         &"1".parse()?,
//!         SectionDraft::new("Introduction")
//!             .with_prompt(Prompt::new().with_directive("Instruction", "Introduce the topic")),
//!     )?;
//!
//!     let step = manuscript.move_to_next_and_get_prompts();
//!     println!("{:?}", step.current_prompt);
//!     manuscript.set_content_at_cursor("Once upon a time...", true)?;
//!
//!     manuscript.save().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod manuscript;
pub mod metadata;
pub mod persist;
pub mod render;
pub mod schema;
pub mod testing;
pub mod toc;

// Primary public API
pub use config::{ConfigError, ManuscriptConfig};
pub use manuscript::{
    Manuscript, ManuscriptError, ManuscriptId, NextDirectives, SectionInstructions,
};
pub use metadata::{Author, PublicationInfo};
pub use persist::{PersistError, SavedManuscript};
pub use render::{generate, render_markdown, render_outline};
pub use schema::{SchemaError, SchemaPreset, SchemaStore, ShapeError};
pub use testing::TestHarness;
pub use toc::{Prompt, SectionDraft, SectionPath, SectionTree, TocError};

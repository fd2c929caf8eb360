//! Table of contents: the section tree and its navigator.
//!
//! Sections are addressed by integer-key paths from the root. Children keep
//! the order their keys were first assigned, which is also traversal order.
//!
//! ```text
//! root
//!  ├─ 1. Introduction          path [1]
//!  │   ├─ 1.1. Background      path [1, 1]
//!  │   └─ 1.2. Scope           path [1, 2]
//!  └─ 2. Methods               path [2]
//!
//! cursor: [] → [1] → [1,1] → [1,2] → [2] → [1] (wraps; start marker = [1])
//! ```

mod navigator;
mod path;
mod prompt;
mod section;

pub use navigator::{find_next, Cursor};
pub use path::{ParsePathError, SectionPath};
pub use prompt::{Directives, Prompt, PromptDefaults};
pub use section::{IncompleteSection, Preorder, SectionDraft, SectionNode, SectionTree, Sections, TocError};


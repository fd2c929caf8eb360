//! Schema-driven structured data for free-form authoring metadata.
//!
//! A caller supplies a declarative shape (characters, scenes, citations, ...)
//! and gets back a store with one family of accessors per top-level field.
//! The storage layout of each field is picked once, from its shape:
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                         SchemaStore                            │
//! │                                                                │
//! │  ShapeDescription ──validate──▶ field name → FieldKind         │
//! │                                                                │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────┐  │
//! │  │ ListField    │  │ KeyedRecordField │  │ KeyedListField   │  │
//! │  │ [item, ...]  │  │ key → record     │  │ key → [item,..]  │  │
//! │  └──────────────┘  └──────────────────┘  └──────────────────┘  │
//! │                                                                │
//! │  accessor names: get_F_schema, get_F, get_<plural>, add_F,     │
//! │                  remove_F                                      │
//! └────────────────────────────────────────────────────────────────┘
//! ```

mod accessor;
mod field;
pub mod presets;
mod shape;
mod store;

pub use accessor::{AccessorArgs, AccessorName, AccessorOp, AccessorVerb};
pub use field::{FieldData, FieldError, FieldKind, KeyedListField, KeyedRecordField, ListField};
pub use presets::{ResearchGenre, SchemaPreset};
pub(crate) use shape::json_type_name;
pub use shape::{validate, Shape, ShapeDescription, ShapeError};
pub use store::{PluralNames, SchemaError, SchemaSnapshot, SchemaStore};

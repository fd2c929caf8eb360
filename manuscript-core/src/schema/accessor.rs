//! Textual accessor names (`add_character`, `get_scenes`, ...).
//!
//! A [`SchemaStore`](super::SchemaStore) exposes one family of operations
//! per field. These names let a caller address that surface by string, the
//! way an interactive driver does.

use super::field::FieldKind;
use serde_json::Value;

/// The operation half of an accessor name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorOp {
    /// `get_F_schema`
    Schema,
    /// `get_F`
    Get,
    /// `get_<plural of F>`
    GetAll,
    /// `add_F`
    Add,
    /// `remove_F`
    Remove,
}

impl AccessorOp {
    /// Whether the operation changes stored data.
    pub fn is_mutating(&self) -> bool {
        matches!(self, AccessorOp::Add | AccessorOp::Remove)
    }
}

/// An accessor name split into its verb and the (lowercased) target.
///
/// The target is resolved against a store's fields and plural aliases by
/// [`SchemaStore::resolve_accessor`](super::SchemaStore::resolve_accessor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorName {
    pub verb: AccessorVerb,
    pub target: String,
}

/// The prefix of an accessor name, before resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorVerb {
    Get,
    Add,
    Remove,
}

impl AccessorName {
    /// Split `get_x`, `add_x` or `remove_x`. Returns `None` for anything else.
    pub fn parse(name: &str) -> Option<Self> {
        let lower = name.trim().to_lowercase();
        let (verb, target) = if let Some(rest) = lower.strip_prefix("get_") {
            (AccessorVerb::Get, rest)
        } else if let Some(rest) = lower.strip_prefix("add_") {
            (AccessorVerb::Add, rest)
        } else if let Some(rest) = lower.strip_prefix("remove_") {
            (AccessorVerb::Remove, rest)
        } else {
            return None;
        };
        if target.is_empty() {
            return None;
        }
        Some(Self {
            verb,
            target: target.to_string(),
        })
    }
}

/// Arguments for one accessor call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccessorArgs {
    pub key: Option<String>,
    pub item: Option<Value>,
    pub index: Option<usize>,
}

impl AccessorArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn item(mut self, item: Value) -> Self {
        self.item = Some(item);
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Map positional JSON arguments onto key/item/index.
    ///
    /// List fields take `[item, index?]` for add, `[index]` for get and
    /// remove, or `["key", item, index?]` when the first of several
    /// arguments is a string. Keyed fields always take `["key", ...]`.
    pub fn from_positional(op: AccessorOp, kind: FieldKind, args: Vec<Value>) -> Result<Self, String> {
        let mut args = args.into_iter().peekable();
        let mut out = Self::new();

        match (op, kind) {
            (AccessorOp::Schema | AccessorOp::GetAll, _) => {}
            (AccessorOp::Add, FieldKind::List) => {
                let first = args.next().ok_or("add needs an item")?;
                let keyed = first.is_string()
                    && args.peek().map(|v| !v.is_u64()).unwrap_or(false);
                if keyed {
                    out.key = first.as_str().map(str::to_string);
                    out.item = args.next();
                } else {
                    out.item = Some(first);
                }
                out.index = take_index(args.next())?;
            }
            (AccessorOp::Get | AccessorOp::Remove, FieldKind::List) => {
                out.index = take_index(args.next())?;
            }
            (AccessorOp::Add, _) => {
                out.key = Some(take_key(args.next())?);
                out.item = Some(args.next().ok_or("add needs an item after the key")?);
            }
            (AccessorOp::Get, _) => {
                if let Some(key) = args.next() {
                    out.key = Some(take_key(Some(key))?);
                    out.index = take_index(args.next())?;
                }
            }
            (AccessorOp::Remove, _) => {
                out.key = Some(take_key(args.next())?);
                out.index = take_index(args.next())?;
            }
        }

        if args.next().is_some() {
            return Err("too many arguments".to_string());
        }
        Ok(out)
    }
}

fn take_key(value: Option<Value>) -> Result<String, String> {
    match value {
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(format!("expected a key, found {other}")),
        None => Err("missing key".to_string()),
    }
}

fn take_index(value: Option<Value>) -> Result<Option<usize>, String> {
    match value {
        None => Ok(None),
        Some(v) => v
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| format!("expected an index, found {v}")),
    }
}

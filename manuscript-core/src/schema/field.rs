//! Per-field storage, one variant per field kind.

use super::shape::Shape;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// How a top-level field stores its data, decided once from its shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// A bare list template: an ordered sequence of items.
    List,
    /// A flat record template: one record per key.
    KeyedRecord,
    /// A record whose first nested field is a list: one list per key.
    KeyedList,
}

impl FieldKind {
    /// Inspect a field's shape.
    ///
    /// Leaf tags and empty records fall back to [`FieldKind::KeyedRecord`].
    pub fn of(shape: &Shape) -> Self {
        match shape {
            Shape::List(_) => FieldKind::List,
            Shape::Record(desc) => match desc.first() {
                Some(first) if first.is_list() => FieldKind::KeyedList,
                _ => FieldKind::KeyedRecord,
            },
            Shape::Leaf(_) => FieldKind::KeyedRecord,
        }
    }

    /// Get the display name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::List => "list",
            FieldKind::KeyedRecord => "keyed record",
            FieldKind::KeyedList => "keyed list",
        }
    }
}

/// Failures an individual field can report. Only keyed-list removal raises.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("no entry for key '{0}'")]
    MissingKey(String),

    #[error("index {index} out of range for key '{key}' (len {len})")]
    IndexOutOfRange { key: String, index: usize, len: usize },
}

/// Ordered sequence of items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListField {
    items: Vec<Value>,
}

impl ListField {
    /// Append `item`, or insert it at `index` (clamped to the length).
    pub fn push(&mut self, item: Value, index: Option<usize>) {
        match index {
            Some(i) => self.items.insert(i.min(self.items.len()), item),
            None => self.items.push(item),
        }
    }

    /// Store a bare scalar key (list-of-scalars convention).
    pub fn push_scalar(&mut self, key: &str, index: Option<usize>) {
        self.push(Value::String(key.to_string()), index);
    }

    /// Store `{key: item}` (list-of-objects convention).
    pub fn push_keyed(&mut self, key: &str, item: Value, index: Option<usize>) {
        let mut entry = Map::new();
        entry.insert(key.to_string(), item);
        self.push(Value::Object(entry), index);
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    /// Remove by position; out-of-range is a no-op.
    pub fn remove(&mut self, index: usize) -> Option<Value> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// One record per key; adding to an existing key merges field-wise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyedRecordField {
    records: IndexMap<String, Value>,
}

impl KeyedRecordField {
    /// Insert `item` at `key`, shallow-merging into an existing record.
    ///
    /// Merging only applies object-into-object; anything else replaces.
    pub fn add(&mut self, key: &str, item: Value) {
        let Some(slot) = self.records.get_mut(key) else {
            self.records.insert(key.to_string(), item);
            return;
        };
        match (slot, item) {
            (Value::Object(existing), Value::Object(update)) => {
                for (k, v) in update {
                    existing.insert(k, v);
                }
            }
            (slot, item) => *slot = item,
        }
    }

    /// The record at `key`, or an empty record when absent.
    pub fn get(&self, key: &str) -> Value {
        self.records
            .get(key)
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    /// Remove `key`; a missing key is a no-op.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.records.shift_remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    pub fn records(&self) -> &IndexMap<String, Value> {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One ordered list per key (e.g. scenes grouped by chapter).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyedListField {
    groups: IndexMap<String, Vec<Value>>,
}

impl KeyedListField {
    /// Append `item` to the list at `key`, creating the list if needed.
    pub fn add(&mut self, key: &str, item: Value) {
        self.groups.entry(key.to_string()).or_default().push(item);
    }

    pub fn group(&self, key: &str) -> Option<&[Value]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    pub fn get(&self, key: &str, index: usize) -> Option<&Value> {
        self.groups.get(key).and_then(|g| g.get(index))
    }

    /// Remove one element of the list at `key`.
    ///
    /// Unlike every other accessor this fails loudly: the key must exist
    /// and the index must be in range.
    pub fn remove_at(&mut self, key: &str, index: usize) -> Result<Value, FieldError> {
        let group = self
            .groups
            .get_mut(key)
            .ok_or_else(|| FieldError::MissingKey(key.to_string()))?;
        if index >= group.len() {
            return Err(FieldError::IndexOutOfRange {
                key: key.to_string(),
                index,
                len: group.len(),
            });
        }
        Ok(group.remove(index))
    }

    /// Drop the whole list at `key`; a missing key is a no-op.
    pub fn remove_group(&mut self, key: &str) -> Option<Vec<Value>> {
        self.groups.shift_remove(key)
    }

    pub fn groups(&self) -> &IndexMap<String, Vec<Value>> {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// The live data of one top-level field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldData {
    List(ListField),
    KeyedRecord(KeyedRecordField),
    KeyedList(KeyedListField),
}

impl FieldData {
    /// Create empty storage for a kind.
    pub fn empty(kind: FieldKind) -> Self {
        match kind {
            FieldKind::List => FieldData::List(ListField::default()),
            FieldKind::KeyedRecord => FieldData::KeyedRecord(KeyedRecordField::default()),
            FieldKind::KeyedList => FieldData::KeyedList(KeyedListField::default()),
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldData::List(_) => FieldKind::List,
            FieldData::KeyedRecord(_) => FieldKind::KeyedRecord,
            FieldData::KeyedList(_) => FieldKind::KeyedList,
        }
    }

    /// Rebuild storage of `kind` from its JSON form.
    ///
    /// Returns `None` if the value does not have the layout the kind needs.
    pub fn from_value(kind: FieldKind, value: Value) -> Option<Self> {
        match kind {
            FieldKind::List => match value {
                Value::Array(_) => serde_json::from_value(value).ok().map(FieldData::List),
                _ => None,
            },
            FieldKind::KeyedRecord => match value {
                Value::Object(_) => serde_json::from_value(value).ok().map(FieldData::KeyedRecord),
                _ => None,
            },
            FieldKind::KeyedList => serde_json::from_value(value).ok().map(FieldData::KeyedList),
        }
    }

    /// The whole container as JSON.
    pub fn to_value(&self) -> Value {
        match self {
            FieldData::List(f) => Value::Array(f.items().to_vec()),
            FieldData::KeyedRecord(f) => Value::Object(
                f.records()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            ),
            FieldData::KeyedList(f) => Value::Object(
                f.groups()
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::Array(v.clone())))
                    .collect(),
            ),
        }
    }
}

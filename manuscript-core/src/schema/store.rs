//! Schema store: a validated shape plus its live data container.

use super::accessor::{AccessorArgs, AccessorName, AccessorOp, AccessorVerb};
use super::field::{FieldData, FieldError, FieldKind};
use super::shape::{Shape, ShapeDescription, ShapeError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from schema store operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("{0}; provided data does not conform to schema")]
    Shape(#[from] ShapeError),

    #[error("unknown schema field '{0}'")]
    UnknownField(String),

    #[error("unknown accessor '{0}'")]
    UnknownAccessor(String),

    #[error("bad arguments for '{accessor}': {reason}")]
    BadArguments { accessor: String, reason: String },

    #[error("field '{field}': {source}")]
    Field {
        field: String,
        #[source]
        source: FieldError,
    },

    #[error("stored data for field '{field}' does not match its {expected} shape")]
    DataMismatch { field: String, expected: &'static str },
}

/// Plural aliases used by the "retrieve all" accessor.
pub type PluralNames = IndexMap<String, String>;

/// A shape description bound to a data container.
///
/// Every top-level field gets storage of the [`FieldKind`] its shape calls
/// for, chosen once at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SchemaSnapshot", into = "SchemaSnapshot")]
pub struct SchemaStore {
    shape: ShapeDescription,
    plural_names: PluralNames,
    fields: IndexMap<String, FieldData>,
}

impl SchemaStore {
    /// Bind storage to an already validated shape.
    ///
    /// `plural_names` overrides the default `name + "s"` alias per field;
    /// entries for unknown fields are ignored.
    pub fn new(shape: ShapeDescription, plural_names: &PluralNames) -> Self {
        let mut plurals = PluralNames::new();
        let mut fields = IndexMap::new();
        for (name, field_shape) in shape.iter() {
            let plural = plural_names
                .get(name)
                .cloned()
                .unwrap_or_else(|| format!("{name}s"));
            plurals.insert(name.to_string(), plural);

            let kind = FieldKind::of(field_shape);
            debug!(field = name, kind = kind.name(), "binding schema field");
            fields.insert(name.to_string(), FieldData::empty(kind));
        }
        let store = Self {
            shape,
            plural_names: plurals,
            fields,
        };
        for (field, plural) in store.shadowed_plurals() {
            warn!(field, plural, "plural alias is also a field name, so get_{plural} reads that field");
        }
        store
    }

    /// Validate a JSON shape description and bind storage to it.
    pub fn from_value(shape: &Value, plural_names: &PluralNames) -> Result<Self, SchemaError> {
        let shape = ShapeDescription::from_value(shape)?;
        Ok(Self::new(shape, plural_names))
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// The whole shape description.
    pub fn schema(&self) -> &ShapeDescription {
        &self.shape
    }

    /// `get_F_schema`: the shape of one field, unchanged.
    pub fn field_schema(&self, field: &str) -> Result<&Shape, SchemaError> {
        let name = self.resolve_field(field)?;
        self.shape
            .get(name)
            .ok_or_else(|| SchemaError::UnknownField(field.to_string()))
    }

    pub fn field_kind(&self, field: &str) -> Result<FieldKind, SchemaError> {
        let name = self.resolve_field(field)?;
        Ok(self.fields[name].kind())
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn plural_of(&self, field: &str) -> Result<&str, SchemaError> {
        let name = self.resolve_field(field)?;
        Ok(self.plural_names[name].as_str())
    }

    /// `(field, plural)` pairs whose plural alias is itself a field name.
    ///
    /// `get_<plural>` resolves to that other field, so these fields have no
    /// retrieve-all accessor by name; [`get_all`](Self::get_all) still works.
    pub fn shadowed_plurals(&self) -> Vec<(&str, &str)> {
        self.plural_names
            .iter()
            .filter(|(_, plural)| self.resolve_field(plural).is_ok())
            .map(|(field, plural)| (field.as_str(), plural.as_str()))
            .collect()
    }

    /// Find the declared field name for `field`, ignoring case.
    pub fn resolve_field(&self, field: &str) -> Result<&str, SchemaError> {
        self.fields
            .keys()
            .find(|name| name.eq_ignore_ascii_case(field))
            .map(String::as_str)
            .ok_or_else(|| SchemaError::UnknownField(field.to_string()))
    }

    /// Find the field whose plural alias is `plural`, ignoring case.
    pub fn resolve_plural(&self, plural: &str) -> Result<&str, SchemaError> {
        self.plural_names
            .iter()
            .find(|(_, p)| p.eq_ignore_ascii_case(plural))
            .map(|(name, _)| name.as_str())
            .ok_or_else(|| SchemaError::UnknownField(plural.to_string()))
    }

    /// Resolve a textual accessor to its operation and declared field name.
    ///
    /// Singular field names win over plural aliases, so `get_x` on a field
    /// that is also another field's plural reads that field.
    pub fn resolve_accessor(&self, name: &str) -> Result<(AccessorOp, String), SchemaError> {
        let unknown = || SchemaError::UnknownAccessor(name.to_string());
        let parsed = AccessorName::parse(name).ok_or_else(unknown)?;
        let target = parsed.target.as_str();

        let resolved = match parsed.verb {
            AccessorVerb::Add => (AccessorOp::Add, self.resolve_field(target)),
            AccessorVerb::Remove => (AccessorOp::Remove, self.resolve_field(target)),
            AccessorVerb::Get => {
                if let Ok(field) = self.resolve_field(target) {
                    (AccessorOp::Get, Ok(field))
                } else if let Some(field) = target
                    .strip_suffix("_schema")
                    .and_then(|f| self.resolve_field(f).ok())
                {
                    (AccessorOp::Schema, Ok(field))
                } else {
                    (AccessorOp::GetAll, self.resolve_plural(target))
                }
            }
        };

        match resolved {
            (op, Ok(field)) => Ok((op, field.to_string())),
            (_, Err(_)) => Err(unknown()),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// `add_F(key?, item, index?)`.
    ///
    /// List fields append `item` (or insert at `index`); a key with a null
    /// item stores the bare key, a key with an item stores `{key: item}`.
    /// Keyed fields need a key; without one the call is a no-op.
    pub fn add(
        &mut self,
        field: &str,
        key: Option<&str>,
        item: Value,
        index: Option<usize>,
    ) -> Result<(), SchemaError> {
        let name = self.resolve_field(field)?.to_string();
        let data = self.data_mut(&name)?;
        debug!(field = %name, ?key, ?index, "schema add");

        match (data, key) {
            (FieldData::List(list), None) => list.push(item, index),
            (FieldData::List(list), Some(key)) if item.is_null() => list.push_scalar(key, index),
            (FieldData::List(list), Some(key)) => list.push_keyed(key, item, index),
            (FieldData::KeyedRecord(records), Some(key)) => records.add(key, item),
            (FieldData::KeyedList(groups), Some(key)) => groups.add(key, item),
            (_, None) => warn!(field = %name, "add on a keyed field without a key ignored"),
        }
        Ok(())
    }

    /// `get_F(key?, index?)`.
    ///
    /// Misses read as `None` (or an empty record for keyed-record fields);
    /// with neither key nor index the whole container is returned.
    pub fn get(
        &self,
        field: &str,
        key: Option<&str>,
        index: Option<usize>,
    ) -> Result<Option<Value>, SchemaError> {
        let name = self.resolve_field(field)?;
        let value = match (&self.fields[name], key, index) {
            (FieldData::List(list), _, Some(i)) => list.get(i).cloned(),
            (data @ FieldData::List(_), _, None) => Some(data.to_value()),
            (FieldData::KeyedRecord(_), Some(_), Some(_)) => None,
            (FieldData::KeyedRecord(records), Some(key), None) => Some(records.get(key)),
            (FieldData::KeyedList(groups), Some(key), Some(i)) => groups.get(key, i).cloned(),
            (FieldData::KeyedList(groups), Some(key), None) => {
                groups.group(key).map(|g| Value::Array(g.to_vec()))
            }
            (data, None, _) => Some(data.to_value()),
        };
        Ok(value)
    }

    /// `get_<plural>()`: the whole container of the field with that alias.
    pub fn get_all(&self, plural: &str) -> Result<Value, SchemaError> {
        let name = self.resolve_plural(plural)?;
        Ok(self.fields[name].to_value())
    }

    /// `remove_F(key, index?)`.
    ///
    /// Silently ignores misses, except removing by index from a keyed-list
    /// field whose key is absent or whose index is out of range.
    pub fn remove(
        &mut self,
        field: &str,
        key: Option<&str>,
        index: Option<usize>,
    ) -> Result<(), SchemaError> {
        let name = self.resolve_field(field)?.to_string();
        let data = self.data_mut(&name)?;
        debug!(field = %name, ?key, ?index, "schema remove");

        match (data, key, index) {
            (FieldData::List(list), _, Some(i)) => {
                list.remove(i);
            }
            (FieldData::KeyedRecord(records), Some(key), _) => {
                records.remove(key);
            }
            (FieldData::KeyedList(groups), Some(key), Some(i)) => {
                groups
                    .remove_at(key, i)
                    .map_err(|source| SchemaError::Field {
                        field: name.clone(),
                        source,
                    })?;
            }
            (FieldData::KeyedList(groups), Some(key), None) => {
                groups.remove_group(key);
            }
            _ => debug!(field = %name, "remove without a target ignored"),
        }
        Ok(())
    }

    /// Dispatch a textual accessor with already-mapped arguments.
    ///
    /// Returns the read value for `get_*` accessors and `None` otherwise.
    pub fn invoke(&mut self, accessor: &str, args: AccessorArgs) -> Result<Option<Value>, SchemaError> {
        let (op, field) = self.resolve_accessor(accessor)?;
        match op {
            AccessorOp::Schema => Ok(Some(self.field_schema(&field)?.to_value())),
            AccessorOp::Get => self.get(&field, args.key.as_deref(), args.index),
            AccessorOp::GetAll => {
                let plural = self.plural_of(&field)?.to_string();
                self.get_all(&plural).map(Some)
            }
            AccessorOp::Add => {
                let item = args.item.unwrap_or(Value::Null);
                self.add(&field, args.key.as_deref(), item, args.index)?;
                Ok(None)
            }
            AccessorOp::Remove => {
                self.remove(&field, args.key.as_deref(), args.index)?;
                Ok(None)
            }
        }
    }

    /// Dispatch a textual accessor with positional JSON arguments.
    pub fn invoke_positional(&mut self, accessor: &str, args: Vec<Value>) -> Result<Option<Value>, SchemaError> {
        let (op, field) = self.resolve_accessor(accessor)?;
        let kind = self.field_kind(&field)?;
        let args = AccessorArgs::from_positional(op, kind, args).map_err(|reason| {
            SchemaError::BadArguments {
                accessor: accessor.to_string(),
                reason,
            }
        })?;
        self.invoke(accessor, args)
    }

    /// The whole data container as JSON, keyed by field name.
    pub fn data(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(name, data)| (name.clone(), data.to_value()))
                .collect(),
        )
    }

    fn data_mut(&mut self, name: &str) -> Result<&mut FieldData, SchemaError> {
        self.fields
            .get_mut(name)
            .ok_or_else(|| SchemaError::UnknownField(name.to_string()))
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Capture the store as an inert value.
    pub fn snapshot(&self) -> SchemaSnapshot {
        SchemaSnapshot {
            shape: self.shape.to_value(),
            plural_names: self.plural_names.clone(),
            data: self
                .fields
                .iter()
                .map(|(name, data)| (name.clone(), data.to_value()))
                .collect(),
        }
    }

    /// Rebuild a store from a snapshot, re-validating the shape and checking
    /// that each field's stored data has the layout its kind needs.
    pub fn from_snapshot(snapshot: SchemaSnapshot) -> Result<Self, SchemaError> {
        let mut store = Self::from_value(&snapshot.shape, &snapshot.plural_names)?;
        for (name, value) in snapshot.data {
            let slot = store
                .fields
                .get_mut(&name)
                .ok_or_else(|| SchemaError::UnknownField(name.clone()))?;
            let kind = slot.kind();
            *slot = FieldData::from_value(kind, value).ok_or(SchemaError::DataMismatch {
                field: name,
                expected: kind.name(),
            })?;
        }
        Ok(store)
    }
}

/// Serializable form of a [`SchemaStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    pub shape: Value,
    #[serde(default)]
    pub plural_names: PluralNames,
    #[serde(default)]
    pub data: IndexMap<String, Value>,
}

impl TryFrom<SchemaSnapshot> for SchemaStore {
    type Error = SchemaError;

    fn try_from(snapshot: SchemaSnapshot) -> Result<Self, Self::Error> {
        Self::from_snapshot(snapshot)
    }
}

impl From<SchemaStore> for SchemaSnapshot {
    fn from(store: SchemaStore) -> Self {
        store.snapshot()
    }
}

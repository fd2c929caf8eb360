//! Shape descriptions and their validator.
//!
//! A shape is a declarative description of the fields a [`SchemaStore`]
//! holds. Each field maps to one of three forms:
//!
//! - a nested record (`{"Name": {"Role": "String"}}`),
//! - a single-element list template (`["List of Strings"]`,
//!   `[{"Place": "String"}]`),
//! - a leaf type tag (`"String"`), informational only.
//!
//! [`SchemaStore`]: super::SchemaStore

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Structural errors raised while validating a shape description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("shape at '{path}' must be a mapping of field names, found {found}")]
    NotARecord { path: String, found: &'static str },

    #[error("field '{path}' must hold a list with exactly one template element, found {len}")]
    TemplateArity { path: String, len: usize },

    #[error("field '{path}' has unsupported type '{found}'")]
    UnsupportedType { path: String, found: &'static str },
}

/// One field's shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// The field is itself a record.
    Record(ShapeDescription),
    /// The field is list-valued; the box holds the single template element.
    List(Box<Shape>),
    /// A leaf type tag such as `"String"`.
    Leaf(String),
}

impl Shape {
    /// Whether this is a list template.
    pub fn is_list(&self) -> bool {
        matches!(self, Shape::List(_))
    }

    /// Convert back to the declarative JSON form.
    pub fn to_value(&self) -> Value {
        match self {
            Shape::Record(desc) => desc.to_value(),
            Shape::List(template) => Value::Array(vec![template.to_value()]),
            Shape::Leaf(tag) => Value::String(tag.clone()),
        }
    }

    fn parse(path: &str, value: &Value) -> Result<Self, ShapeError> {
        match value {
            Value::Object(map) => Ok(Shape::Record(ShapeDescription::parse_map(path, map)?)),
            Value::Array(items) => {
                if items.len() != 1 {
                    return Err(ShapeError::TemplateArity {
                        path: path.to_string(),
                        len: items.len(),
                    });
                }
                let element_path = format!("{path}[0]");
                let template = match &items[0] {
                    Value::Object(map) => {
                        Shape::Record(ShapeDescription::parse_map(&element_path, map)?)
                    }
                    Value::String(tag) => Shape::Leaf(tag.clone()),
                    other => {
                        return Err(ShapeError::UnsupportedType {
                            path: element_path,
                            found: json_type_name(other),
                        })
                    }
                };
                Ok(Shape::List(Box::new(template)))
            }
            Value::String(tag) => Ok(Shape::Leaf(tag.clone())),
            other => Err(ShapeError::UnsupportedType {
                path: path.to_string(),
                found: json_type_name(other),
            }),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

/// A validated, ordered mapping from field name to [`Shape`].
///
/// Field order is the order of the source description and is significant:
/// the first nested field decides whether a record field groups lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct ShapeDescription {
    fields: Vec<(String, Shape)>,
}

impl ShapeDescription {
    /// Validate a JSON shape description and build the typed form.
    pub fn from_value(value: &Value) -> Result<Self, ShapeError> {
        match value {
            Value::Object(map) => Self::parse_map("", map),
            other => Err(ShapeError::NotARecord {
                path: String::new(),
                found: json_type_name(other),
            }),
        }
    }

    /// Combine two descriptions; fields of `other` replace same-named fields.
    pub fn merged(mut self, other: ShapeDescription) -> Self {
        for (name, shape) in other.fields {
            match self.fields.iter_mut().find(|(n, _)| *n == name) {
                Some(slot) => slot.1 = shape,
                None => self.fields.push((name, shape)),
            }
        }
        self
    }

    fn parse_map(path: &str, map: &Map<String, Value>) -> Result<Self, ShapeError> {
        let mut fields = Vec::with_capacity(map.len());
        for (name, value) in map {
            let field_path = if path.is_empty() {
                name.clone()
            } else {
                format!("{path}.{name}")
            };
            fields.push((name.clone(), Shape::parse(&field_path, value)?));
        }
        Ok(Self { fields })
    }

    /// Look up a field's shape by exact name.
    pub fn get(&self, name: &str) -> Option<&Shape> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    /// The first field's shape, if any.
    pub fn first(&self) -> Option<&Shape> {
        self.fields.first().map(|(_, s)| s)
    }

    /// Iterate fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Shape)> {
        self.fields.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Convert back to the declarative JSON form.
    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(n, s)| (n.clone(), s.to_value()))
            .collect();
        Value::Object(map)
    }
}

impl TryFrom<Value> for ShapeDescription {
    type Error = ShapeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

impl From<ShapeDescription> for Value {
    fn from(desc: ShapeDescription) -> Self {
        desc.to_value()
    }
}

/// Check a JSON shape description without keeping the typed form.
pub fn validate(value: &Value) -> Result<(), ShapeError> {
    ShapeDescription::from_value(value).map(|_| ())
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "record",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn story_like() -> Value {
        json!({
            "Character": {"Name": {"Role": "String", "Traits": ["List of Strings"]}},
            "Scene": {"Chapter_Title": [{"Section_Title": "String", "Setting": "String"}]},
            "Place": [{"Place": "String", "Description": "String"}]
        })
    }

    #[test]
    fn test_valid_shape_parses() {
        let desc = ShapeDescription::from_value(&story_like()).unwrap();
        assert_eq!(desc.len(), 3);
        assert!(matches!(desc.get("Character"), Some(Shape::Record(_))));
        assert!(desc.get("Place").unwrap().is_list());
    }

    #[test]
    fn test_field_order_preserved() {
        let desc = ShapeDescription::from_value(&story_like()).unwrap();
        let names: Vec<_> = desc.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Character", "Scene", "Place"]);
    }

    #[test]
    fn test_round_trip_to_value() {
        let value = story_like();
        let desc = ShapeDescription::from_value(&value).unwrap();
        assert_eq!(desc.to_value(), value);
    }

    #[test]
    fn test_empty_list_rejected() {
        let err = validate(&json!({"Place": []})).unwrap_err();
        assert_eq!(
            err,
            ShapeError::TemplateArity {
                path: "Place".to_string(),
                len: 0
            }
        );
    }

    #[test]
    fn test_two_element_list_rejected_when_nested() {
        let err = validate(&json!({"Character": {"Name": {"Traits": ["a", "b"]}}})).unwrap_err();
        assert_eq!(
            err,
            ShapeError::TemplateArity {
                path: "Character.Name.Traits".to_string(),
                len: 2
            }
        );
    }

    #[test]
    fn test_unsupported_leaf_rejected() {
        let err = validate(&json!({"Count": 3})).unwrap_err();
        assert!(matches!(err, ShapeError::UnsupportedType { found: "number", .. }));

        let err = validate(&json!({"Flags": [true]})).unwrap_err();
        assert!(matches!(err, ShapeError::UnsupportedType { ref path, .. } if path == "Flags[0]"));
    }

    #[test]
    fn test_top_level_must_be_record() {
        let err = validate(&json!(["String"])).unwrap_err();
        assert!(matches!(err, ShapeError::NotARecord { found: "list", .. }));
    }

    #[test]
    fn test_merged_overrides_and_appends() {
        let base = ShapeDescription::from_value(&json!({"A": "String", "B": "String"})).unwrap();
        let genre = ShapeDescription::from_value(&json!({"B": ["String"], "C": "String"})).unwrap();
        let merged = base.merged(genre);
        let names: Vec<_> = merged.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert!(merged.get("B").unwrap().is_list());
    }

    #[test]
    fn test_serde_validates_on_deserialize() {
        let bad: Result<ShapeDescription, _> = serde_json::from_str(r#"{"X": ["a", "b"]}"#);
        assert!(bad.is_err());
        let good: ShapeDescription = serde_json::from_str(r#"{"X": ["a"]}"#).unwrap();
        assert!(good.get("X").unwrap().is_list());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn field_name() -> impl Strategy<Value = String> {
            "[A-Z][a-z]{0,6}"
        }

        /// Any well-formed field shape: leaf tag, record, or single-template list.
        fn field_shape() -> impl Strategy<Value = Value> {
            let leaf = "[A-Za-z ]{1,12}".prop_map(Value::String);
            leaf.prop_recursive(3, 24, 4, |inner| {
                prop_oneof![
                    prop::collection::vec((field_name(), inner.clone()), 0..4)
                        .prop_map(|fields| Value::Object(fields.into_iter().collect())),
                    inner
                        .prop_filter("a template is never itself a list", |v| !v.is_array())
                        .prop_map(|template| Value::Array(vec![template])),
                ]
            })
        }

        fn description() -> impl Strategy<Value = Value> {
            prop::collection::vec((field_name(), field_shape()), 1..5)
                .prop_map(|fields| Value::Object(fields.into_iter().collect()))
        }

        proptest! {
            #[test]
            fn prop_well_formed_shapes_validate(value in description()) {
                let desc = ShapeDescription::from_value(&value).unwrap();
                prop_assert_eq!(desc.to_value(), value);
            }

            #[test]
            fn prop_bad_template_arity_rejected(
                value in description(),
                len in prop_oneof![Just(0usize), 2usize..5],
            ) {
                let mut value = value;
                let templates = vec![Value::String("String".to_string()); len];
                if let Value::Object(map) = &mut value {
                    map.insert("Broken".to_string(), Value::Array(templates));
                }
                let err = validate(&value).unwrap_err();
                prop_assert_eq!(err, ShapeError::TemplateArity { path: "Broken".to_string(), len });
            }
        }
    }
}

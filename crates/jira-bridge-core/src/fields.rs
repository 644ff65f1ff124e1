//! Field projection: raw issue fields → display name/value pairs.
//!
//! Field ids are resolved against the metadata catalog from `GET /field`.
//! Values are simplified according to a small, closed set of shapes.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::adf;
use crate::types::FieldMeta;

/// Prefix Jira uses for custom field ids. Only consulted when the catalog
/// has no entry for a field, so it is a best-effort guess.
pub const CUSTOM_FIELD_PREFIX: &str = "customfield_";

/// A projected field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedField {
    pub name: String,
    pub value: Value,
    pub custom: bool,
}

/// Shape of a raw field value, checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// ADF document root (`"type": "doc"`)
    Document,
    /// User reference carrying `displayName`
    Person,
    /// Reference carrying a string `name` (status, priority, component, ...)
    Named,
    /// Array of values
    List,
    /// Anything else
    Scalar,
}

impl ValueShape {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(obj) => {
                if adf::is_document(value) {
                    Self::Document
                } else if obj.get("displayName").is_some_and(Value::is_string) {
                    Self::Person
                } else if obj.get("name").is_some_and(Value::is_string) {
                    Self::Named
                } else {
                    Self::Scalar
                }
            }
            Value::Array(_) => Self::List,
            _ => Self::Scalar,
        }
    }
}

/// Reduce a field value to its display form.
pub fn simplify(value: &Value) -> Value {
    match ValueShape::of(value) {
        ValueShape::Document => Value::String(adf::adf_to_text(Some(value))),
        ValueShape::Person => value["displayName"].clone(),
        ValueShape::Named => value["name"].clone(),
        ValueShape::List => match value {
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| match item.get("name") {
                        Some(name @ Value::String(_)) if item.is_object() => name.clone(),
                        _ => item.clone(),
                    })
                    .collect(),
            ),
            _ => value.clone(),
        },
        ValueShape::Scalar => value.clone(),
    }
}

/// Lookup table from field id to catalog entry.
pub struct FieldCatalog<'a> {
    by_id: HashMap<&'a str, &'a FieldMeta>,
}

impl<'a> FieldCatalog<'a> {
    pub fn new(fields: &'a [FieldMeta]) -> Self {
        Self {
            by_id: fields.iter().map(|f| (f.id.as_str(), f)).collect(),
        }
    }

    /// Resolve display name and custom flag for a field id.
    pub fn resolve(&self, field_id: &str) -> (String, bool) {
        match self.by_id.get(field_id) {
            Some(meta) => (meta.name.clone(), meta.custom),
            None => (
                field_id.to_string(),
                field_id.starts_with(CUSTOM_FIELD_PREFIX),
            ),
        }
    }
}

/// Project an issue's field bag through the catalog.
///
/// Null values are dropped. With `include_custom == false`, fields resolved
/// as custom are omitted.
pub fn project_fields(
    fields: &Map<String, Value>,
    catalog: &[FieldMeta],
    include_custom: bool,
) -> Map<String, Value> {
    let catalog = FieldCatalog::new(catalog);
    let mut projected = Map::new();

    for (field_id, value) in fields {
        if value.is_null() {
            continue;
        }

        let (name, custom) = catalog.resolve(field_id);
        if custom && !include_custom {
            continue;
        }

        let field = ProjectedField {
            name,
            value: simplify(value),
            custom,
        };
        if let Ok(field) = serde_json::to_value(field) {
            projected.insert(field_id.clone(), field);
        }
    }

    projected
}

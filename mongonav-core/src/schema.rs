//! Schema upload preview
//!
//! Reads a collection schema file and flattens it into the fields a condition
//! editor can offer. The file maps collection names to JSON-Schema-like
//! objects:
//!
//! ```json
//! { "users": { "type": "object", "properties": { "age": { "type": "number" } } } }
//! ```

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

use crate::query::{ConditionRow, FieldType};

/// One flattened schema field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaField {
    /// Dotted path, e.g. `preferences.theme`
    pub path: String,
    pub schema_type: String,
    pub required: bool,
    pub format: Option<String>,
    pub enum_values: Vec<JsonValue>,
    pub default: Option<JsonValue>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

impl SchemaField {
    /// Editor type for this field
    pub fn suggested_type(&self) -> FieldType {
        match self.schema_type.as_str() {
            "string" => match self.format.as_deref() {
                Some("date") | Some("date-time") => FieldType::Date,
                _ => FieldType::String,
            },
            "number" | "integer" => FieldType::Number,
            "boolean" => FieldType::Boolean,
            "object" | "array" => FieldType::Object,
            _ => FieldType::String,
        }
    }
}

/// Fields of every collection in a schema file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaPreview {
    pub collections: BTreeMap<String, Vec<SchemaField>>,
}

impl SchemaPreview {
    pub fn parse(content: &str) -> Result<Self, SchemaError> {
        let value: JsonValue =
            serde_json::from_str(content).map_err(|e| SchemaError::InvalidJson(e.to_string()))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &JsonValue) -> Result<Self, SchemaError> {
        let root = value.as_object().ok_or_else(|| {
            SchemaError::InvalidFormat("Schema must be an object keyed by collection".to_string())
        })?;

        let mut collections = BTreeMap::new();
        for (collection, definition) in root {
            let definition = definition.as_object().ok_or_else(|| {
                SchemaError::InvalidFormat(format!("Collection '{}' must be an object", collection))
            })?;

            let mut fields = Vec::new();
            if let Some(properties) = definition.get("properties") {
                collect_fields(collection, "", properties, &mut fields)?;
            }
            collections.insert(collection.clone(), fields);
        }

        Ok(Self { collections })
    }

    pub fn fields(&self, collection: &str) -> Option<&[SchemaField]> {
        self.collections.get(collection).map(Vec::as_slice)
    }

    /// One blank editor row per field of `collection`, typed from the schema
    pub fn condition_rows(&self, collection: &str) -> Vec<ConditionRow> {
        self.fields(collection)
            .unwrap_or_default()
            .iter()
            .map(|field| {
                let field_type = field.suggested_type();
                ConditionRow::new(
                    field.path.clone(),
                    field_type,
                    field_type.operators()[0],
                    "",
                )
            })
            .collect()
    }
}

fn collect_fields(
    collection: &str,
    prefix: &str,
    properties: &JsonValue,
    out: &mut Vec<SchemaField>,
) -> Result<(), SchemaError> {
    let properties = properties.as_object().ok_or_else(|| {
        SchemaError::InvalidFormat(format!(
            "'properties' of '{}' must be an object",
            if prefix.is_empty() { collection } else { prefix }
        ))
    })?;

    for (name, spec) in properties {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", prefix, name)
        };
        let empty = Map::new();
        let spec = spec.as_object().unwrap_or(&empty);

        out.push(SchemaField {
            path: path.clone(),
            schema_type: spec
                .get("type")
                .and_then(|t| t.as_str())
                .unwrap_or("string")
                .to_string(),
            required: spec.get("required").and_then(|r| r.as_bool()).unwrap_or(false),
            format: spec.get("format").and_then(|f| f.as_str()).map(str::to_string),
            enum_values: spec
                .get("enum")
                .and_then(|e| e.as_array())
                .cloned()
                .unwrap_or_default(),
            default: spec.get("default").cloned(),
            minimum: spec.get("minimum").and_then(|m| m.as_f64()),
            maximum: spec.get("maximum").and_then(|m| m.as_f64()),
        });

        if let Some(nested) = spec.get("properties") {
            collect_fields(collection, &path, nested, out)?;
        }
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid schema: {0}")]
    InvalidFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Operator;

    const USERS_SCHEMA: &str = r#"{
        "users": {
            "type": "object",
            "properties": {
                "name": { "type": "string", "required": true },
                "age": { "type": "number", "minimum": 0, "maximum": 150 },
                "status": { "type": "string", "enum": ["active", "inactive", "pending"], "default": "pending" },
                "created_at": { "type": "string", "format": "date-time" },
                "preferences": {
                    "type": "object",
                    "properties": {
                        "newsletter": { "type": "boolean", "default": false },
                        "theme": { "type": "string", "enum": ["light", "dark"] }
                    }
                }
            }
        }
    }"#;

    #[test]
    fn test_parse_flattens_nested_fields() {
        let preview = SchemaPreview::parse(USERS_SCHEMA).unwrap();
        let fields = preview.fields("users").unwrap();
        let paths: Vec<&str> = fields.iter().map(|f| f.path.as_str()).collect();

        assert!(paths.contains(&"name"));
        assert!(paths.contains(&"preferences"));
        assert!(paths.contains(&"preferences.newsletter"));
        assert!(paths.contains(&"preferences.theme"));
        assert_eq!(fields.len(), 7);
    }

    #[test]
    fn test_field_details() {
        let preview = SchemaPreview::parse(USERS_SCHEMA).unwrap();
        let fields = preview.fields("users").unwrap();
        let find = |p: &str| fields.iter().find(|f| f.path == p).unwrap();

        assert!(find("name").required);
        assert_eq!(find("age").maximum, Some(150.0));
        assert_eq!(find("status").enum_values.len(), 3);
        assert_eq!(find("status").default, Some(serde_json::json!("pending")));
        assert_eq!(find("created_at").suggested_type(), FieldType::Date);
        assert_eq!(find("preferences").suggested_type(), FieldType::Object);
        assert_eq!(find("preferences.newsletter").suggested_type(), FieldType::Boolean);
        assert_eq!(find("age").suggested_type(), FieldType::Number);
    }

    #[test]
    fn test_condition_rows() {
        let preview = SchemaPreview::parse(USERS_SCHEMA).unwrap();
        let rows = preview.condition_rows("users");
        assert_eq!(rows.len(), 7);

        let prefs = rows.iter().find(|r| r.field == "preferences").unwrap();
        assert_eq!(prefs.operator, Operator::Exists);
        assert!(rows.iter().all(|r| r.value.is_empty()));
        assert!(preview.condition_rows("missing").is_empty());
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            SchemaPreview::parse("{not json"),
            Err(SchemaError::InvalidJson(_))
        ));
        assert!(matches!(
            SchemaPreview::parse("[1, 2]"),
            Err(SchemaError::InvalidFormat(_))
        ));
        assert!(matches!(
            SchemaPreview::parse(r#"{"users": 5}"#),
            Err(SchemaError::InvalidFormat(_))
        ));
        assert!(matches!(
            SchemaPreview::parse(r#"{"users": {"properties": []}}"#),
            Err(SchemaError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_collection_without_properties() {
        let preview = SchemaPreview::parse(r#"{"logs": {"type": "object"}}"#).unwrap();
        assert_eq!(preview.fields("logs").unwrap().len(), 0);
    }
}

//! Schema descriptor model.
//!
//! Purely descriptive values produced by [`crate::schema::derive_schema`].
//! Nothing here is executable; descriptors are meant to be serialized and
//! rendered by whoever consumes them.
//!
//! # Format
//!
//! ```json
//! {
//!   "name": "Customer",
//!   "description": "Customer Schema",
//!   "fields": [
//!     { "name": "Name", "description": "Customer Name", "type": { "primitive": "TEXT" } },
//!     { "name": "Tags", "description": "Customer Tags", "type": { "array": { "primitive": "TEXT" } } }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primitive field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    #[serde(rename = "TEXT")]
    Text,
    #[serde(rename = "INTEGER")]
    Integer,
    #[serde(rename = "DECIMAL")]
    Decimal,
    #[serde(rename = "TIME")]
    Timestamp,
    #[serde(rename = "BOOL")]
    Boolean,
}

impl PrimitiveKind {
    /// Canonical upper-case label, as used in serialized schemas.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::Text => "TEXT",
            PrimitiveKind::Integer => "INTEGER",
            PrimitiveKind::Decimal => "DECIMAL",
            PrimitiveKind::Timestamp => "TIME",
            PrimitiveKind::Boolean => "BOOL",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Abstract type of a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeDescriptor {
    Primitive(PrimitiveKind),
    Array(Box<TypeDescriptor>),
    Object(ObjectDescriptor),
}

impl TypeDescriptor {
    /// Primitive kind, if this is a primitive.
    pub fn as_primitive(&self) -> Option<PrimitiveKind> {
        match self {
            TypeDescriptor::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Nested object, if this is an object.
    pub fn as_object(&self) -> Option<&ObjectDescriptor> {
        match self {
            TypeDescriptor::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Element descriptor, if this is an array.
    pub fn as_array(&self) -> Option<&TypeDescriptor> {
        match self {
            TypeDescriptor::Array(element) => Some(element),
            _ => None,
        }
    }
}

/// Schema of one record type. Field order is the record's declared order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    pub name: String,
    pub description: String,
    pub fields: Vec<FieldDescriptor>,
}

/// One field of a record schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    /// `"<OwningTypeName> <FieldName>"`
    pub description: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
}

impl ObjectDescriptor {
    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field names in declared order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ObjectDescriptor {
        ObjectDescriptor {
            name: "Subs".into(),
            description: "Subs Schema".into(),
            fields: vec![
                FieldDescriptor {
                    name: "Website".into(),
                    description: "Subs Website".into(),
                    ty: TypeDescriptor::Primitive(PrimitiveKind::Text),
                },
                FieldDescriptor {
                    name: "Visits".into(),
                    description: "Subs Visits".into(),
                    ty: TypeDescriptor::Array(Box::new(TypeDescriptor::Primitive(
                        PrimitiveKind::Timestamp,
                    ))),
                },
            ],
        }
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["fields"][0]["type"], json!({ "primitive": "TEXT" }));
        assert_eq!(
            value["fields"][1]["type"],
            json!({ "array": { "primitive": "TIME" } })
        );
        assert_eq!(value["description"], "Subs Schema");
    }

    #[test]
    fn test_field_lookup() {
        let object = sample();
        assert_eq!(object.field_names(), vec!["Website", "Visits"]);
        assert_eq!(
            object.field("Website").and_then(|f| f.ty.as_primitive()),
            Some(PrimitiveKind::Text)
        );
        assert!(object.field("Missing").is_none());
        assert!(object.field("Visits").unwrap().ty.as_array().is_some());
    }

    #[test]
    fn test_json_parses_back() {
        let object = sample();
        let parsed: ObjectDescriptor = serde_json::from_str(&object.to_json().unwrap()).unwrap();
        assert_eq!(parsed, object);
    }
}

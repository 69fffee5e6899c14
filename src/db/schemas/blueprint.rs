//! Blueprint document schema
//!
//! A blueprint is a named, reusable template of positioned form fields.
//! Contracts are materialized from a blueprint; editing a blueprint after
//! the fact never touches existing contracts.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for blueprints
pub const BLUEPRINT_COLLECTION: &str = "blueprints";

/// The four supported field types
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Date,
    Signature,
    Checkbox,
}

/// Display coordinates of a field. Semantics are display-only; no range
/// validation is applied.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct FieldPosition {
    pub x: f64,
    pub y: f64,
}

/// A single field definition within a blueprint
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FieldDef {
    /// Field type (text, date, signature, checkbox)
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Human-readable label
    pub label: String,

    /// Display position
    pub position: FieldPosition,
}

/// Blueprint document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct BlueprintDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at)
    #[serde(default)]
    pub metadata: Metadata,

    /// Blueprint name (3-100 characters, validated at the route layer)
    pub name: String,

    /// Ordered field definitions (at least one)
    pub fields: Vec<FieldDef>,
}

impl BlueprintDoc {
    /// Create a new blueprint document
    pub fn new(name: String, fields: Vec<FieldDef>) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            name,
            fields,
        }
    }
}

impl IntoIndexes for BlueprintDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "name": 1 },
            Some(
                IndexOptions::builder()
                    .name("name_index".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for BlueprintDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_serde_lowercase() {
        assert_eq!(serde_json::to_string(&FieldType::Signature).unwrap(), r#""signature""#);
        let t: FieldType = serde_json::from_str(r#""checkbox""#).unwrap();
        assert_eq!(t, FieldType::Checkbox);
        assert!(serde_json::from_str::<FieldType>(r#""dropdown""#).is_err());
    }

    #[test]
    fn test_field_def_wire_shape() {
        let json = r#"{"type":"text","label":"Party Name","position":{"x":10,"y":10}}"#;
        let field: FieldDef = serde_json::from_str(json).unwrap();
        assert_eq!(field.field_type, FieldType::Text);
        assert_eq!(field.label, "Party Name");
        assert_eq!(field.position.x, 10.0);

        // "type" key round-trips, not "field_type"
        let out = serde_json::to_string(&field).unwrap();
        assert!(out.contains(r#""type":"text""#));
        assert!(!out.contains("field_type"));
    }
}

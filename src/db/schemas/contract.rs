//! Contract document schema
//!
//! A contract is materialized from a blueprint: it carries its own deep copy
//! of the field definitions plus a mutable `value` per field, and a lifecycle
//! state that advances through the transition table in `crate::lifecycle`.
//!
//! Field values are plain strings. Checkbox values live in the three-way
//! domain `"" | "true" | "false"`: an untouched checkbox (`""`) is distinct
//! from an explicitly unchecked one (`"false"`), and nothing here collapses
//! them to booleans.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::{BlueprintDoc, FieldPosition, FieldType, Metadata};
use crate::lifecycle::{ContractState, EditabilityError, TransitionError};

/// Collection name for contracts
pub const CONTRACT_COLLECTION: &str = "contracts";

/// A field instance on a contract: the blueprint definition plus a value
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ContractField {
    /// Field type, copied verbatim from the blueprint
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Label, copied verbatim from the blueprint
    pub label: String,

    /// Position, copied verbatim from the blueprint
    pub position: FieldPosition,

    /// Current value. Empty string until first edited.
    #[serde(default)]
    pub value: String,
}

/// Contract document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ContractDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at)
    #[serde(default)]
    pub metadata: Metadata,

    /// Contract name (3-100 characters, validated at the route layer)
    pub name: String,

    /// Originating blueprint id
    #[serde(rename = "blueprintId")]
    pub blueprint_id: ObjectId,

    /// Blueprint name snapshot taken at creation, never re-synced
    #[serde(rename = "blueprintName")]
    pub blueprint_name: String,

    /// Current lifecycle state
    pub state: ContractState,

    /// Ordered field instances. The set is fixed at creation; only `value`
    /// changes afterwards, and only while the contract is editable.
    pub fields: Vec<ContractField>,
}

impl ContractDoc {
    /// Materialize a contract from a blueprint.
    ///
    /// Deep-copies the blueprint's field definitions with every value set to
    /// the empty string (checkboxes included) and fixes the initial state to
    /// `created`. The caller resolves the blueprint beforehand; an
    /// unresolvable id never reaches this constructor.
    pub fn from_blueprint(blueprint: &BlueprintDoc, name: String) -> Self {
        let fields = blueprint
            .fields
            .iter()
            .map(|def| ContractField {
                field_type: def.field_type,
                label: def.label.clone(),
                position: def.position,
                value: String::new(),
            })
            .collect();

        Self {
            _id: None,
            metadata: Metadata::new(),
            name,
            // Persisted blueprints always carry an id; a fresh one only shows
            // up in tests that materialize before inserting.
            blueprint_id: blueprint._id.unwrap_or_else(ObjectId::new),
            blueprint_name: blueprint.name.clone(),
            state: ContractState::Created,
            fields,
        }
    }

    /// Move the contract to `to` if the transition table allows it.
    ///
    /// On rejection the document is left untouched and the error carries both
    /// the current and the requested state.
    pub fn apply_transition(&mut self, to: ContractState) -> Result<(), TransitionError> {
        if !self.state.can_transition(to) {
            return Err(TransitionError {
                from: self.state,
                to,
            });
        }

        self.state = to;
        Ok(())
    }

    /// Whether field values may currently be mutated
    pub fn is_editable(&self) -> bool {
        self.state.is_editable()
    }

    /// Replace the field set wholesale.
    ///
    /// Fails without modifying the document when the contract is locked or
    /// revoked. No per-field diffing; the original system replaces the whole
    /// ordered sequence.
    pub fn update_fields(&mut self, fields: Vec<ContractField>) -> Result<(), EditabilityError> {
        if !self.is_editable() {
            return Err(EditabilityError { state: self.state });
        }

        self.fields = fields;
        Ok(())
    }
}

impl IntoIndexes for ContractDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // State powers the dashboard filters (active/pending/signed)
            (
                doc! { "state": 1 },
                Some(
                    IndexOptions::builder()
                        .name("state_index".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "blueprintId": 1 },
                Some(
                    IndexOptions::builder()
                        .name("blueprint_id_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for ContractDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::FieldDef;

    fn nda_blueprint() -> BlueprintDoc {
        let mut bp = BlueprintDoc::new(
            "NDA".to_string(),
            vec![
                FieldDef {
                    field_type: FieldType::Text,
                    label: "Party Name".to_string(),
                    position: FieldPosition { x: 10.0, y: 10.0 },
                },
                FieldDef {
                    field_type: FieldType::Checkbox,
                    label: "Accept Terms".to_string(),
                    position: FieldPosition { x: 10.0, y: 40.0 },
                },
                FieldDef {
                    field_type: FieldType::Signature,
                    label: "Signature".to_string(),
                    position: FieldPosition { x: 10.0, y: 80.0 },
                },
            ],
        );
        bp._id = Some(ObjectId::new());
        bp
    }

    #[test]
    fn test_materialize_copies_fields_with_empty_values() {
        let bp = nda_blueprint();
        let contract = ContractDoc::from_blueprint(&bp, "Acme NDA".to_string());

        assert_eq!(contract.state, ContractState::Created);
        assert_eq!(contract.name, "Acme NDA");
        assert_eq!(contract.blueprint_id, bp._id.unwrap());
        assert_eq!(contract.blueprint_name, "NDA");
        assert_eq!(contract.fields.len(), bp.fields.len());

        for (field, def) in contract.fields.iter().zip(bp.fields.iter()) {
            assert_eq!(field.field_type, def.field_type);
            assert_eq!(field.label, def.label);
            assert_eq!(field.position, def.position);
            // Every value starts empty, checkboxes included
            assert_eq!(field.value, "");
        }
    }

    #[test]
    fn test_blueprint_name_is_a_snapshot() {
        let mut bp = nda_blueprint();
        let contract = ContractDoc::from_blueprint(&bp, "Acme NDA".to_string());

        bp.name = "NDA v2".to_string();
        bp.fields.clear();

        // Later blueprint edits have zero effect on the contract
        assert_eq!(contract.blueprint_name, "NDA");
        assert_eq!(contract.fields.len(), 3);
    }

    #[test]
    fn test_apply_transition_happy_path() {
        let bp = nda_blueprint();
        let mut contract = ContractDoc::from_blueprint(&bp, "Acme NDA".to_string());

        contract.apply_transition(ContractState::Approved).unwrap();
        assert_eq!(contract.state, ContractState::Approved);

        // approved -> signed is not permitted, only sent/revoked
        let err = contract.apply_transition(ContractState::Signed).unwrap_err();
        assert_eq!(err.from, ContractState::Approved);
        assert_eq!(err.to, ContractState::Signed);
        assert_eq!(contract.state, ContractState::Approved);
    }

    #[test]
    fn test_rejected_transition_leaves_document_unchanged() {
        let bp = nda_blueprint();
        let mut contract = ContractDoc::from_blueprint(&bp, "Acme NDA".to_string());
        let before = contract.clone();

        assert!(contract.apply_transition(ContractState::Locked).is_err());
        assert_eq!(contract.state, before.state);
        assert_eq!(contract.fields, before.fields);
    }

    #[test]
    fn test_update_fields_replaces_wholesale() {
        let bp = nda_blueprint();
        let mut contract = ContractDoc::from_blueprint(&bp, "Acme NDA".to_string());

        let mut fields = contract.fields.clone();
        fields[0].value = "Acme Corp".to_string();
        fields[1].value = "false".to_string();

        contract.update_fields(fields).unwrap();
        assert_eq!(contract.fields[0].value, "Acme Corp");
        assert_eq!(contract.fields[1].value, "false");
        assert_eq!(contract.fields[2].value, "");
    }

    #[test]
    fn test_update_fields_blocked_when_locked() {
        let bp = nda_blueprint();
        let mut contract = ContractDoc::from_blueprint(&bp, "Acme NDA".to_string());
        contract.state = ContractState::Locked;
        let before = contract.fields.clone();

        let mut fields = contract.fields.clone();
        fields[0].value = "too late".to_string();

        let err = contract.update_fields(fields).unwrap_err();
        assert_eq!(err.state, ContractState::Locked);
        assert_eq!(contract.fields, before);
    }

    #[test]
    fn test_update_fields_blocked_when_revoked() {
        let bp = nda_blueprint();
        let mut contract = ContractDoc::from_blueprint(&bp, "Acme NDA".to_string());
        contract.state = ContractState::Revoked;

        assert!(contract.update_fields(vec![]).is_err());
        assert_eq!(contract.fields.len(), 3);
    }

    #[test]
    fn test_serde_round_trip_preserves_order_and_values() {
        let bp = nda_blueprint();
        let mut contract = ContractDoc::from_blueprint(&bp, "Acme NDA".to_string());
        // Untouched checkbox stays "", explicitly unchecked becomes "false"
        let mut fields = contract.fields.clone();
        fields[1].value = "false".to_string();
        contract.update_fields(fields).unwrap();
        contract._id = Some(ObjectId::new());

        let json = serde_json::to_string(&contract).unwrap();
        let back: ContractDoc = serde_json::from_str(&json).unwrap();

        assert_eq!(back.state, contract.state);
        assert_eq!(back.blueprint_id, contract.blueprint_id);
        assert_eq!(back.fields, contract.fields);
        assert_eq!(back.fields[0].value, "");
        assert_eq!(back.fields[1].value, "false");

        // Wire keys match the original API
        assert!(json.contains(r#""blueprintId""#));
        assert!(json.contains(r#""blueprintName":"NDA""#));
        assert!(json.contains(r#""state":"created""#));
    }

    #[test]
    fn test_bson_round_trip() {
        let bp = nda_blueprint();
        let mut contract = ContractDoc::from_blueprint(&bp, "Acme NDA".to_string());
        contract.metadata = Metadata::new();

        let doc = bson::to_document(&contract).unwrap();
        let back: ContractDoc = bson::from_document(doc).unwrap();
        assert_eq!(back.fields, contract.fields);
        assert_eq!(back.state, ContractState::Created);
    }

    #[test]
    fn test_missing_value_deserializes_to_empty_string() {
        let json = r#"{"type":"checkbox","label":"Accept","position":{"x":1,"y":2}}"#;
        let field: ContractField = serde_json::from_str(json).unwrap();
        assert_eq!(field.value, "");
    }
}

//! Request-shape validation
//!
//! Mirrors the checks the API applies before touching the store: name length
//! bounds, non-empty field lists, non-empty labels, and well-formed object
//! ids. Field types and states are closed enums, so unknown values are
//! already rejected during deserialization.

use bson::oid::ObjectId;
use thiserror::Error;

use crate::db::schemas::FieldDef;

/// Names must be 3-100 characters after trimming
pub const NAME_MIN: usize = 3;
/// Upper bound on name length
pub const NAME_MAX: usize = 100;

/// Malformed input shape. Surfaced synchronously; nothing is mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingName(&'static str),

    #[error("{0} must be between {NAME_MIN} and {NAME_MAX} characters")]
    NameLength(&'static str),

    #[error("Blueprint must have at least one field")]
    EmptyFields,

    #[error("Field label is required")]
    EmptyLabel,

    #[error("Invalid ID format")]
    InvalidId,
}

/// Validate a blueprint or contract name, returning the trimmed value.
pub fn validate_name(kind: &'static str, name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingName(kind));
    }
    if trimmed.chars().count() < NAME_MIN || trimmed.chars().count() > NAME_MAX {
        return Err(ValidationError::NameLength(kind));
    }
    Ok(trimmed.to_string())
}

/// Validate a blueprint's field definitions.
pub fn validate_fields(fields: &[FieldDef]) -> Result<(), ValidationError> {
    if fields.is_empty() {
        return Err(ValidationError::EmptyFields);
    }
    for field in fields {
        if field.label.trim().is_empty() {
            return Err(ValidationError::EmptyLabel);
        }
    }
    Ok(())
}

/// Parse a path or body id into an ObjectId.
pub fn parse_object_id(id: &str) -> Result<ObjectId, ValidationError> {
    ObjectId::parse_str(id).map_err(|_| ValidationError::InvalidId)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::{FieldPosition, FieldType};

    fn field(label: &str) -> FieldDef {
        FieldDef {
            field_type: FieldType::Text,
            label: label.to_string(),
            position: FieldPosition { x: 0.0, y: 0.0 },
        }
    }

    #[test]
    fn test_name_bounds() {
        assert!(validate_name("Contract name", "ab").is_err());
        assert_eq!(validate_name("Contract name", "abc").unwrap(), "abc");
        assert_eq!(validate_name("Contract name", "  Acme NDA  ").unwrap(), "Acme NDA");
        assert!(validate_name("Contract name", &"x".repeat(100)).is_ok());
        assert!(validate_name("Contract name", &"x".repeat(101)).is_err());
        assert_eq!(
            validate_name("Contract name", ""),
            Err(ValidationError::MissingName("Contract name"))
        );
        // Whitespace-only counts as missing, not short
        assert_eq!(
            validate_name("Contract name", "   "),
            Err(ValidationError::MissingName("Contract name"))
        );
    }

    #[test]
    fn test_fields_must_be_non_empty() {
        assert_eq!(validate_fields(&[]), Err(ValidationError::EmptyFields));
        assert!(validate_fields(&[field("Party Name")]).is_ok());
        assert_eq!(validate_fields(&[field("  ")]), Err(ValidationError::EmptyLabel));
    }

    #[test]
    fn test_object_id_parsing() {
        assert!(parse_object_id("not-an-id").is_err());
        assert!(parse_object_id("").is_err());
        let id = bson::oid::ObjectId::new();
        assert_eq!(parse_object_id(&id.to_hex()).unwrap(), id);
    }
}

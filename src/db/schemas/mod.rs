//! Document schemas for MongoDB collections

pub mod blueprint;
pub mod contract;
pub mod metadata;

pub use blueprint::{BlueprintDoc, FieldDef, FieldPosition, FieldType, BLUEPRINT_COLLECTION};
pub use contract::{ContractDoc, ContractField, CONTRACT_COLLECTION};
pub use metadata::Metadata;

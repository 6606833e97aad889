use crate::model::EntityKind;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("{kind} has no usable ordinal scope: {reason}")]
    MissingScopeConfiguration { kind: EntityKind, reason: String },

    #[error("Order {order} is already used by another {kind} in scope {scope}")]
    DuplicateOrderValue {
        kind: EntityKind,
        scope: Uuid,
        order: u32,
    },

    #[error("{carrier_kind} {carrier} already holds a value for attribute {attribute}")]
    DuplicateAttributeBinding {
        carrier_kind: EntityKind,
        carrier: Uuid,
        attribute: Uuid,
    },

    #[error("{kind} with {field} '{value}' already exists")]
    UniqueConstraintViolation {
        kind: EntityKind,
        field: &'static str,
        value: String,
    },

    #[error("Cannot delete {kind} {id}: still referenced by {referenced_by}.{field}")]
    ProtectedDelete {
        kind: EntityKind,
        id: Uuid,
        referenced_by: EntityKind,
        field: &'static str,
    },

    #[error("Placing {kind} {node} under {parent} would make it its own ancestor")]
    Cycle {
        kind: EntityKind,
        node: Uuid,
        parent: Uuid,
    },

    #[error("Commit conflict: {0}")]
    Conflict(String),

    #[error("{kind} not found: {key}")]
    NotFound { kind: EntityKind, key: String },

    #[error("Invalid {kind}.{field}: {reason}")]
    InvalidField {
        kind: EntityKind,
        field: &'static str,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl CatalogError {
    pub fn not_found(kind: EntityKind, key: impl ToString) -> Self {
        Self::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    pub fn invalid(kind: EntityKind, field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            kind,
            field,
            reason: reason.into(),
        }
    }

    /// Only a lost commit race may be retried by re-running the whole operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_conflicts_are_retryable() {
        assert!(CatalogError::Conflict("revision moved".into()).is_retryable());
        assert!(!CatalogError::not_found(EntityKind::Product, "x").is_retryable());
        assert!(!CatalogError::DuplicateOrderValue {
            kind: EntityKind::ProductLine,
            scope: Uuid::nil(),
            order: 1,
        }
        .is_retryable());
    }

    #[test]
    fn messages_name_the_offending_field() {
        let err = CatalogError::UniqueConstraintViolation {
            kind: EntityKind::Category,
            field: "slug",
            value: "shoes".into(),
        };
        assert_eq!(err.to_string(), "Category with slug 'shoes' already exists");

        let err = CatalogError::invalid(EntityKind::ProductLine, "sku", "cannot be empty");
        assert_eq!(err.to_string(), "Invalid ProductLine.sku: cannot be empty");
    }
}

//! # Schema Declarations
//!
//! Static facts about the catalog that do not change at runtime:
//!
//! - **Relations**: every reference field, the kind it points at, and what happens to
//!   the referencing record when the target is deleted ([`OnDelete`]).
//! - **Order fields**: which field scopes the ordinal of an ordered kind ([`OrderField`]).
//!
//! [`validate_schema`] checks these declarations against the records' persisted fields.
//! It runs once when the API is built; a failure there is a programming error and
//! must stop startup.
//!
//! ## Delete Policies
//!
//! | Policy | Effect on the referencing record |
//! |--------|----------------------------------|
//! | `Protect` | the delete is rejected while any reference exists |
//! | `Cascade` | the referencing record is deleted too (its own relations apply) |
//! | `SetNull` | the reference is cleared, the record survives |

use crate::error::{CatalogError, Result};
use crate::model::{EntityKind, ProductImage, ProductLine};
use crate::ordering::check_order_field;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    Protect,
    Cascade,
    SetNull,
}

/// A reference field from one kind to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub from: EntityKind,
    pub field: &'static str,
    pub to: EntityKind,
    pub on_delete: OnDelete,
}

impl Relation {
    const fn new(from: EntityKind, field: &'static str, to: EntityKind, on_delete: OnDelete) -> Self {
        Self {
            from,
            field,
            to,
            on_delete,
        }
    }
}

/// Registry of all references between records.
///
/// This is the single source of truth for reference checks on write and for
/// delete behavior. Adding a reference field means adding an entry here.
pub const RELATIONS: &[Relation] = &[
    // Trees
    Relation::new(EntityKind::Category, "parent", EntityKind::Category, OnDelete::Protect),
    Relation::new(EntityKind::ProductType, "parent", EntityKind::ProductType, OnDelete::Protect),
    // Products
    Relation::new(EntityKind::Product, "category", EntityKind::Category, OnDelete::SetNull),
    Relation::new(EntityKind::Product, "product_type", EntityKind::ProductType, OnDelete::Protect),
    Relation::new(EntityKind::Product, "brand", EntityKind::Brand, OnDelete::SetNull),
    // Lines and images
    Relation::new(EntityKind::ProductLine, "product", EntityKind::Product, OnDelete::Protect),
    Relation::new(EntityKind::ProductLine, "product_type", EntityKind::ProductType, OnDelete::Protect),
    Relation::new(EntityKind::ProductImage, "product_line", EntityKind::ProductLine, OnDelete::Cascade),
    // Attributes
    Relation::new(EntityKind::AttributeValue, "attribute", EntityKind::Attribute, OnDelete::Protect),
    Relation::new(EntityKind::ProductTypeAttribute, "product_type", EntityKind::ProductType, OnDelete::Cascade),
    Relation::new(EntityKind::ProductTypeAttribute, "attribute", EntityKind::Attribute, OnDelete::Protect),
    // Bindings
    Relation::new(EntityKind::ProductAttributeValue, "product", EntityKind::Product, OnDelete::Cascade),
    Relation::new(EntityKind::ProductAttributeValue, "attribute_value", EntityKind::AttributeValue, OnDelete::Protect),
    Relation::new(EntityKind::ProductLineAttributeValue, "product_line", EntityKind::ProductLine, OnDelete::Cascade),
    Relation::new(EntityKind::ProductLineAttributeValue, "attribute_value", EntityKind::AttributeValue, OnDelete::Protect),
];

/// Relations whose target is `kind`.
pub fn relations_to(kind: EntityKind) -> impl Iterator<Item = &'static Relation> {
    RELATIONS.iter().filter(move |r| r.to == kind)
}

/// Relations whose source is `kind`.
pub fn relations_from(kind: EntityKind) -> impl Iterator<Item = &'static Relation> {
    RELATIONS.iter().filter(move |r| r.from == kind)
}

/// Declares the field an ordinal is unique for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderField {
    pub unique_for_field: Option<&'static str>,
}

impl OrderField {
    pub const fn unique_for(field: &'static str) -> Self {
        Self {
            unique_for_field: Some(field),
        }
    }

    /// An order field without a scope. Fails schema validation.
    pub const fn unscoped() -> Self {
        Self {
            unique_for_field: None,
        }
    }
}

/// Checks every static declaration against the records' persisted fields.
pub fn validate_schema() -> Result<()> {
    check_order_field::<ProductLine>()?;
    check_order_field::<ProductImage>()?;

    for relation in RELATIONS {
        if !relation.from.fields().contains(&relation.field) {
            return Err(CatalogError::Config(format!(
                "relation field {} is not persisted by {}",
                relation.field, relation.from
            )));
        }
    }

    tracing::debug!(relations = RELATIONS.len(), "schema validated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_schema_is_valid() {
        validate_schema().unwrap();
    }

    #[test]
    fn category_delete_nullifies_products_but_protects_children() {
        let policies: Vec<(EntityKind, OnDelete)> = relations_to(EntityKind::Category)
            .map(|r| (r.from, r.on_delete))
            .collect();
        assert!(policies.contains(&(EntityKind::Category, OnDelete::Protect)));
        assert!(policies.contains(&(EntityKind::Product, OnDelete::SetNull)));
    }

    #[test]
    fn product_type_is_protected_by_products_and_lines() {
        let protecting: Vec<EntityKind> = relations_to(EntityKind::ProductType)
            .filter(|r| r.on_delete == OnDelete::Protect)
            .map(|r| r.from)
            .collect();
        assert!(protecting.contains(&EntityKind::Product));
        assert!(protecting.contains(&EntityKind::ProductLine));
        assert!(protecting.contains(&EntityKind::ProductType));
    }

    #[test]
    fn every_relation_field_is_persisted() {
        for relation in RELATIONS {
            assert!(
                relation.from.fields().contains(&relation.field),
                "{}.{}",
                relation.from,
                relation.field
            );
        }
    }

    #[test]
    fn relations_from_lists_outgoing_references() {
        let fields: Vec<&str> = relations_from(EntityKind::ProductLine)
            .map(|r| r.field)
            .collect();
        assert_eq!(fields, vec!["product", "product_type"]);
    }
}

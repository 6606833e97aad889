//! # Attribute Bindings
//!
//! A binding attaches one [`AttributeValue`] to a carrier (a product or a product
//! line). Bindings are first-class records with composite uniqueness on
//! `(carrier, attribute_value)`, and a carrier holds at most one value per
//! [`crate::model::Attribute`].
//!
//! [`validate_binding`] decides a write in two steps:
//!
//! 1. **Idempotence**: if the exact `(carrier, value)` pair is already bound, the write
//!    passes and the existing binding is reported. Re-saving a binding never fails.
//! 2. **One value per attribute**: otherwise, the attributes of every value already
//!    bound to the carrier are collected. If the new value's attribute is among them
//!    the write is rejected with `DuplicateAttributeBinding`.
//!
//! It must run on every create and every update, inside the transaction that commits
//! the binding, so concurrent writers cannot both pass it.

use crate::error::{CatalogError, Result};
use crate::model::{AttributeValue, EntityKind, ProductAttributeValue, ProductLineAttributeValue};
use crate::store::{Record, Transaction};
use std::collections::HashSet;
use uuid::Uuid;

/// An association record between a carrier and an attribute value.
pub trait Binding: Record {
    const CARRIER_KIND: EntityKind;

    fn bind(carrier: Uuid, attribute_value: Uuid) -> Self;
    fn carrier(&self) -> Uuid;
    fn attribute_value(&self) -> Uuid;
    fn set_attribute_value(&mut self, attribute_value: Uuid);
}

impl Binding for ProductAttributeValue {
    const CARRIER_KIND: EntityKind = EntityKind::Product;

    fn bind(carrier: Uuid, attribute_value: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            product: carrier,
            attribute_value,
        }
    }

    fn carrier(&self) -> Uuid {
        self.product
    }

    fn attribute_value(&self) -> Uuid {
        self.attribute_value
    }

    fn set_attribute_value(&mut self, attribute_value: Uuid) {
        self.attribute_value = attribute_value;
    }
}

impl Binding for ProductLineAttributeValue {
    const CARRIER_KIND: EntityKind = EntityKind::ProductLine;

    fn bind(carrier: Uuid, attribute_value: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_line: carrier,
            attribute_value,
        }
    }

    fn carrier(&self) -> Uuid {
        self.product_line
    }

    fn attribute_value(&self) -> Uuid {
        self.attribute_value
    }

    fn set_attribute_value(&mut self, attribute_value: Uuid) {
        self.attribute_value = attribute_value;
    }
}

/// Outcome of a passing validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingCheck {
    /// The exact pair is already bound by this binding.
    Existing(Uuid),
    /// No conflict; the binding may be written.
    Clear,
}

/// Validates binding `value` to `carrier`.
///
/// `ignoring` names a binding being edited: it does not count towards the carrier's
/// attribute set, since its current value is about to be replaced.
pub fn validate_binding<B: Binding>(
    txn: &Transaction,
    carrier: Uuid,
    value: &AttributeValue,
    ignoring: Option<Uuid>,
) -> Result<BindingCheck> {
    if let Some(existing) = txn
        .find::<B>(|b| b.carrier() == carrier && b.attribute_value() == value.id)
        .first()
    {
        tracing::debug!(carrier_kind = %B::CARRIER_KIND, %carrier, value = %value.id, "binding already present");
        return Ok(BindingCheck::Existing(existing.id()));
    }

    let bound_attributes: HashSet<Uuid> = txn
        .find::<B>(|b| b.carrier() == carrier && Some(b.id()) != ignoring)
        .into_iter()
        .filter_map(|b| txn.get::<AttributeValue>(b.attribute_value()).ok())
        .map(|v| v.attribute)
        .collect();

    if bound_attributes.contains(&value.attribute) {
        tracing::debug!(carrier_kind = %B::CARRIER_KIND, %carrier, attribute = %value.attribute, "binding rejected");
        return Err(CatalogError::DuplicateAttributeBinding {
            carrier_kind: B::CARRIER_KIND,
            carrier,
            attribute: value.attribute,
        });
    }
    Ok(BindingCheck::Clear)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fixtures::StoreFixture;
    use crate::store::DataStore;

    fn fixture() -> StoreFixture {
        StoreFixture::new()
            .with_product("Runner", "runner", "Shoe")
            .with_line("runner", "RUN-1", 1)
            .with_attribute("Color", &["Red", "Blue"])
            .with_attribute("Size", &["42"])
    }

    #[test]
    fn first_value_is_clear() {
        let f = fixture();
        let line = f.line("RUN-1");
        let red = f.attribute_value("Color", "Red");
        let txn = f.store.begin().unwrap();
        assert_eq!(
            validate_binding::<ProductLineAttributeValue>(&txn, line.id, &red, None).unwrap(),
            BindingCheck::Clear
        );
    }

    #[test]
    fn second_value_of_same_attribute_is_rejected() {
        let f = fixture();
        let line = f.line("RUN-1");
        let red = f.attribute_value("Color", "Red");
        let blue = f.attribute_value("Color", "Blue");
        let size = f.attribute_value("Size", "42");
        let mut txn = f.store.begin().unwrap();
        txn.create(ProductLineAttributeValue::bind(line.id, red.id))
            .unwrap();

        let err = validate_binding::<ProductLineAttributeValue>(&txn, line.id, &blue, None)
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::DuplicateAttributeBinding {
                carrier_kind: EntityKind::ProductLine,
                ..
            }
        ));
        assert_eq!(
            validate_binding::<ProductLineAttributeValue>(&txn, line.id, &size, None).unwrap(),
            BindingCheck::Clear
        );
    }

    #[test]
    fn identical_pair_is_idempotent() {
        let f = fixture();
        let line = f.line("RUN-1");
        let red = f.attribute_value("Color", "Red");
        let mut txn = f.store.begin().unwrap();
        let id = txn
            .create(ProductLineAttributeValue::bind(line.id, red.id))
            .unwrap();

        assert_eq!(
            validate_binding::<ProductLineAttributeValue>(&txn, line.id, &red, None).unwrap(),
            BindingCheck::Existing(id)
        );
    }

    #[test]
    fn edited_binding_does_not_block_itself() {
        let f = fixture();
        let line = f.line("RUN-1");
        let red = f.attribute_value("Color", "Red");
        let blue = f.attribute_value("Color", "Blue");
        let mut txn = f.store.begin().unwrap();
        let id = txn
            .create(ProductLineAttributeValue::bind(line.id, red.id))
            .unwrap();

        assert_eq!(
            validate_binding::<ProductLineAttributeValue>(&txn, line.id, &blue, Some(id))
                .unwrap(),
            BindingCheck::Clear
        );
    }

    #[test]
    fn carriers_are_independent() {
        let f = fixture().with_product("Walker", "walker", "Shoe");
        let runner = f.product("runner");
        let walker = f.product("walker");
        let red = f.attribute_value("Color", "Red");
        let blue = f.attribute_value("Color", "Blue");
        let mut txn = f.store.begin().unwrap();
        txn.create(ProductAttributeValue::bind(runner.id, red.id))
            .unwrap();

        assert_eq!(
            validate_binding::<ProductAttributeValue>(&txn, walker.id, &blue, None).unwrap(),
            BindingCheck::Clear
        );
    }
}

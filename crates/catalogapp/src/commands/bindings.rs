//! Binding attribute values to products and product lines.
//!
//! Every create and every rebind runs the one-value-per-attribute check inside the
//! committing transaction. Binding a pair that already exists returns the existing
//! binding and writes nothing.

use super::in_transaction;
use crate::binding::{validate_binding, Binding, BindingCheck};
use crate::error::{CatalogError, Result};
use crate::model::{
    Attribute, AttributeValue, EntityKind, ProductAttributeValue, ProductLineAttributeValue,
};
use crate::store::{DataStore, DeleteReport, Transaction};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Which kind of record carries the binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarrierKind {
    Product,
    ProductLine,
}

impl CarrierKind {
    pub fn entity_kind(&self) -> EntityKind {
        match self {
            CarrierKind::Product => EntityKind::Product,
            CarrierKind::ProductLine => EntityKind::ProductLine,
        }
    }
}

impl fmt::Display for CarrierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CarrierKind::Product => f.write_str("product"),
            CarrierKind::ProductLine => f.write_str("line"),
        }
    }
}

impl FromStr for CarrierKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "product" => Ok(CarrierKind::Product),
            "line" | "product_line" => Ok(CarrierKind::ProductLine),
            other => Err(format!("unknown carrier kind '{other}'")),
        }
    }
}

/// A binding as seen by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingRecord {
    pub id: Uuid,
    pub carrier_kind: CarrierKind,
    pub carrier: Uuid,
    pub attribute_value: Uuid,
    /// False when the exact pair was already bound.
    pub created: bool,
}

/// An attribute value bound to a carrier, resolved for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundValue {
    pub binding: Uuid,
    pub attribute: Attribute,
    pub value: AttributeValue,
}

fn record<B: Binding>(kind: CarrierKind, binding: &B, created: bool) -> BindingRecord {
    BindingRecord {
        id: binding.id(),
        carrier_kind: kind,
        carrier: binding.carrier(),
        attribute_value: binding.attribute_value(),
        created,
    }
}

pub fn create_binding<S: DataStore>(
    store: &S,
    carrier_kind: CarrierKind,
    carrier: Uuid,
    attribute_value: Uuid,
) -> Result<BindingRecord> {
    in_transaction(store, |txn| match carrier_kind {
        CarrierKind::Product => {
            bind::<ProductAttributeValue>(txn, carrier_kind, carrier, attribute_value)
        }
        CarrierKind::ProductLine => {
            bind::<ProductLineAttributeValue>(txn, carrier_kind, carrier, attribute_value)
        }
    })
}

fn bind<B: Binding>(
    txn: &mut Transaction,
    kind: CarrierKind,
    carrier: Uuid,
    attribute_value: Uuid,
) -> Result<BindingRecord> {
    ensure_carrier::<B>(txn, carrier)?;
    let value = txn.get::<AttributeValue>(attribute_value)?.clone();

    match validate_binding::<B>(txn, carrier, &value, None)? {
        BindingCheck::Existing(id) => {
            let existing = txn.get::<B>(id)?;
            Ok(record(kind, existing, false))
        }
        BindingCheck::Clear => {
            let binding = B::bind(carrier, value.id);
            txn.create(binding.clone())?;
            Ok(record(kind, &binding, true))
        }
    }
}

/// Points an existing binding at another value, re-running the validator.
pub fn rebind<S: DataStore>(
    store: &S,
    carrier_kind: CarrierKind,
    binding: Uuid,
    attribute_value: Uuid,
) -> Result<BindingRecord> {
    in_transaction(store, |txn| match carrier_kind {
        CarrierKind::Product => {
            rebind_in::<ProductAttributeValue>(txn, carrier_kind, binding, attribute_value)
        }
        CarrierKind::ProductLine => {
            rebind_in::<ProductLineAttributeValue>(txn, carrier_kind, binding, attribute_value)
        }
    })
}

fn rebind_in<B: Binding>(
    txn: &mut Transaction,
    kind: CarrierKind,
    id: Uuid,
    attribute_value: Uuid,
) -> Result<BindingRecord> {
    let mut binding = txn.get::<B>(id)?.clone();
    let value = txn.get::<AttributeValue>(attribute_value)?.clone();

    match validate_binding::<B>(txn, binding.carrier(), &value, Some(id))? {
        BindingCheck::Existing(existing) if existing == id => Ok(record(kind, &binding, false)),
        BindingCheck::Existing(_) => Err(CatalogError::UniqueConstraintViolation {
            kind: B::KIND,
            field: "attribute_value",
            value: value.value.clone(),
        }),
        BindingCheck::Clear => {
            binding.set_attribute_value(value.id);
            txn.update(binding.clone())?;
            Ok(record(kind, &binding, false))
        }
    }
}

pub fn delete_binding<S: DataStore>(
    store: &S,
    carrier_kind: CarrierKind,
    binding: Uuid,
) -> Result<DeleteReport> {
    in_transaction(store, |txn| match carrier_kind {
        CarrierKind::Product => txn.delete::<ProductAttributeValue>(binding),
        CarrierKind::ProductLine => txn.delete::<ProductLineAttributeValue>(binding),
    })
}

/// Values bound to a carrier, sorted by attribute name.
pub fn carrier_values<S: DataStore>(
    store: &S,
    carrier_kind: CarrierKind,
    carrier: Uuid,
) -> Result<Vec<BoundValue>> {
    let txn = store.begin()?;
    match carrier_kind {
        CarrierKind::Product => bound_values::<ProductAttributeValue>(&txn, carrier),
        CarrierKind::ProductLine => bound_values::<ProductLineAttributeValue>(&txn, carrier),
    }
}

pub(crate) fn bound_values<B: Binding>(txn: &Transaction, carrier: Uuid) -> Result<Vec<BoundValue>> {
    ensure_carrier::<B>(txn, carrier)?;
    let mut values = Vec::new();
    for binding in txn.find::<B>(|b| b.carrier() == carrier) {
        let value = txn.get::<AttributeValue>(binding.attribute_value())?;
        let attribute = txn.get::<Attribute>(value.attribute)?;
        values.push(BoundValue {
            binding: binding.id(),
            attribute: attribute.clone(),
            value: value.clone(),
        });
    }
    values.sort_by(|a, b| a.attribute.name.cmp(&b.attribute.name));
    Ok(values)
}

fn ensure_carrier<B: Binding>(txn: &Transaction, carrier: Uuid) -> Result<()> {
    if txn.tables().contains(B::CARRIER_KIND, carrier) {
        Ok(())
    } else {
        Err(CatalogError::not_found(B::CARRIER_KIND, carrier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fixtures::StoreFixture;

    fn fixture() -> StoreFixture {
        StoreFixture::new()
            .with_product("Runner", "runner", "Shoe")
            .with_line("runner", "L1", 1)
            .with_attribute("Color", &["Red", "Blue"])
            .with_attribute("Size", &["42"])
    }

    #[test]
    fn one_value_per_attribute_and_idempotent_rebind() {
        let f = fixture();
        let line = f.line("L1").id;
        let red = f.attribute_value("Color", "Red").id;
        let blue = f.attribute_value("Color", "Blue").id;

        let first = create_binding(&f.store, CarrierKind::ProductLine, line, red).unwrap();
        assert!(first.created);

        let err = create_binding(&f.store, CarrierKind::ProductLine, line, blue).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateAttributeBinding { .. }));

        let again = create_binding(&f.store, CarrierKind::ProductLine, line, red).unwrap();
        assert!(!again.created);
        assert_eq!(again.id, first.id);
        assert_eq!(
            carrier_values(&f.store, CarrierKind::ProductLine, line)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn idempotent_create_writes_nothing() {
        let f = fixture();
        let line = f.line("L1").id;
        let red = f.attribute_value("Color", "Red").id;
        create_binding(&f.store, CarrierKind::ProductLine, line, red).unwrap();
        let before = f.store.backend().revision();
        create_binding(&f.store, CarrierKind::ProductLine, line, red).unwrap();
        assert_eq!(f.store.backend().revision(), before);
    }

    #[test]
    fn rebind_switches_value_of_same_attribute() {
        let f = fixture();
        let product = f.product("runner").id;
        let red = f.attribute_value("Color", "Red").id;
        let blue = f.attribute_value("Color", "Blue").id;
        let size = f.attribute_value("Size", "42").id;

        let color = create_binding(&f.store, CarrierKind::Product, product, red).unwrap();
        let sized = create_binding(&f.store, CarrierKind::Product, product, size).unwrap();

        let moved = rebind(&f.store, CarrierKind::Product, color.id, blue).unwrap();
        assert_eq!(moved.attribute_value, blue);

        // The size binding cannot take a color while the color binding holds one.
        let err = rebind(&f.store, CarrierKind::Product, sized.id, red).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateAttributeBinding { .. }));

        let values = carrier_values(&f.store, CarrierKind::Product, product).unwrap();
        let labels: Vec<(&str, &str)> = values
            .iter()
            .map(|v| (v.attribute.name.as_str(), v.value.value.as_str()))
            .collect();
        assert_eq!(labels, vec![("Color", "Blue"), ("Size", "42")]);
    }

    #[test]
    fn bound_value_is_protected_until_unbound() {
        let f = fixture();
        let line = f.line("L1").id;
        let red = f.attribute_value("Color", "Red").id;
        let binding = create_binding(&f.store, CarrierKind::ProductLine, line, red).unwrap();

        let err = crate::commands::attributes::delete_attribute_value(&f.store, red).unwrap_err();
        assert!(matches!(err, CatalogError::ProtectedDelete { .. }));

        delete_binding(&f.store, CarrierKind::ProductLine, binding.id).unwrap();
        crate::commands::attributes::delete_attribute_value(&f.store, red).unwrap();
    }

    #[test]
    fn unknown_carrier_is_not_found() {
        let f = fixture();
        let red = f.attribute_value("Color", "Red").id;
        let err =
            create_binding(&f.store, CarrierKind::Product, Uuid::new_v4(), red).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::NotFound {
                kind: EntityKind::Product,
                ..
            }
        ));
    }

    #[test]
    fn carrier_kind_parses_cli_names() {
        assert_eq!("line".parse::<CarrierKind>(), Ok(CarrierKind::ProductLine));
        assert_eq!("product".parse::<CarrierKind>(), Ok(CarrierKind::Product));
        assert!("brand".parse::<CarrierKind>().is_err());
    }
}

//! Attributes, attribute values, and the attributes a product type offers.

use super::{in_transaction, parse_id};
use crate::error::{CatalogError, Result};
use crate::model::{Attribute, AttributeValue, EntityKind, ProductType, ProductTypeAttribute};
use crate::store::{DataStore, DeleteReport, Transaction};
use crate::validation::{validate_name, validate_value};
use uuid::Uuid;

pub fn create_attribute<S: DataStore>(
    store: &S,
    name: &str,
    description: &str,
) -> Result<Attribute> {
    validate_name(EntityKind::Attribute, name)?;
    in_transaction(store, |txn| {
        let attribute = Attribute::new(name, description);
        txn.create(attribute.clone())?;
        Ok(attribute)
    })
}

/// Adds a value under `attribute`. The same text may exist under other attributes.
pub fn create_attribute_value<S: DataStore>(
    store: &S,
    attribute: Uuid,
    value: &str,
) -> Result<AttributeValue> {
    validate_value(value)?;
    in_transaction(store, |txn| {
        let value = AttributeValue::new(attribute, value);
        txn.create(value.clone())?;
        Ok(value)
    })
}

/// Rejected while values or product types use the attribute.
pub fn delete_attribute<S: DataStore>(store: &S, id: Uuid) -> Result<DeleteReport> {
    in_transaction(store, |txn| txn.delete::<Attribute>(id))
}

/// Rejected while any binding uses the value.
pub fn delete_attribute_value<S: DataStore>(store: &S, id: Uuid) -> Result<DeleteReport> {
    in_transaction(store, |txn| txn.delete::<AttributeValue>(id))
}

/// Declares that `product_type` offers `attribute`. Linking twice is a no-op.
pub fn link_type_attribute<S: DataStore>(
    store: &S,
    product_type: Uuid,
    attribute: Uuid,
) -> Result<ProductTypeAttribute> {
    in_transaction(store, |txn| {
        let existing = txn
            .find::<ProductTypeAttribute>(|l| {
                l.product_type == product_type && l.attribute == attribute
            })
            .first()
            .map(|l| (*l).clone());
        if let Some(link) = existing {
            return Ok(link);
        }
        let link = ProductTypeAttribute {
            id: Uuid::new_v4(),
            product_type,
            attribute,
        };
        txn.create(link.clone())?;
        Ok(link)
    })
}

/// Attributes offered by a product type, by name.
pub fn type_attributes<S: DataStore>(store: &S, product_type: Uuid) -> Result<Vec<Attribute>> {
    let txn = store.begin()?;
    txn.get::<ProductType>(product_type)?;
    let mut attributes = Vec::new();
    for link in txn.find::<ProductTypeAttribute>(|l| l.product_type == product_type) {
        attributes.push(txn.get::<Attribute>(link.attribute)?.clone());
    }
    attributes.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(attributes)
}

/// Values of an attribute, by value text.
pub fn attribute_values<S: DataStore>(store: &S, attribute: Uuid) -> Result<Vec<AttributeValue>> {
    let txn = store.begin()?;
    txn.get::<Attribute>(attribute)?;
    let mut values: Vec<AttributeValue> = txn
        .find::<AttributeValue>(|v| v.attribute == attribute)
        .into_iter()
        .cloned()
        .collect();
    values.sort_by(|a, b| a.value.cmp(&b.value));
    Ok(values)
}

/// Finds an attribute by id or exact name.
pub fn lookup_attribute<S: DataStore>(store: &S, key: &str) -> Result<Attribute> {
    let txn = store.begin()?;
    find_attribute(&txn, key)
}

fn find_attribute(txn: &Transaction, key: &str) -> Result<Attribute> {
    if let Some(id) = parse_id(key) {
        if let Ok(attribute) = txn.get::<Attribute>(id) {
            return Ok(attribute.clone());
        }
    }
    txn.find::<Attribute>(|a| a.name == key)
        .first()
        .map(|a| (*a).clone())
        .ok_or_else(|| CatalogError::not_found(EntityKind::Attribute, key))
}

/// Finds the value `value` of attribute `attribute` (id or name).
pub fn lookup_attribute_value<S: DataStore>(
    store: &S,
    attribute: &str,
    value: &str,
) -> Result<AttributeValue> {
    let txn = store.begin()?;
    let attribute = find_attribute(&txn, attribute)?;
    txn.find::<AttributeValue>(|v| v.attribute == attribute.id && v.value == value)
        .first()
        .map(|v| (*v).clone())
        .ok_or_else(|| {
            CatalogError::not_found(
                EntityKind::AttributeValue,
                format!("{}={}", attribute.name, value),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tree_nodes::{delete_tree_node, TreeKind};
    use crate::store::fixtures::StoreFixture;
    use crate::store::InMemoryStore;

    #[test]
    fn values_belong_to_one_attribute() {
        let store = InMemoryStore::new();
        let color = create_attribute(&store, "Color", "Primary color").unwrap();
        let trim = create_attribute(&store, "Trim", "").unwrap();
        create_attribute_value(&store, color.id, "Red").unwrap();
        create_attribute_value(&store, trim.id, "Red").unwrap();

        let err = create_attribute_value(&store, color.id, "Red").unwrap_err();
        assert!(matches!(err, CatalogError::UniqueConstraintViolation { .. }));

        let red = lookup_attribute_value(&store, "Trim", "Red").unwrap();
        assert_eq!(red.attribute, trim.id);
        assert_eq!(attribute_values(&store, color.id).unwrap().len(), 1);
    }

    #[test]
    fn attribute_with_values_is_protected() {
        let f = StoreFixture::new().with_attribute("Color", &["Red"]);
        let color = f.attribute("Color").id;
        let err = delete_attribute(&f.store, color).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::ProtectedDelete {
                referenced_by: EntityKind::AttributeValue,
                ..
            }
        ));
        delete_attribute_value(&f.store, f.attribute_value("Color", "Red").id).unwrap();
        delete_attribute(&f.store, color).unwrap();
    }

    #[test]
    fn type_links_are_idempotent_and_cascade_with_the_type() {
        let f = StoreFixture::new()
            .with_product_type("Shoe", None)
            .with_attribute("Size", &[])
            .with_attribute("Color", &[]);
        let shoe = f.product_type("Shoe").id;
        let size = f.attribute("Size").id;
        let color = f.attribute("Color").id;

        let first = link_type_attribute(&f.store, shoe, size).unwrap();
        let again = link_type_attribute(&f.store, shoe, size).unwrap();
        assert_eq!(first.id, again.id);
        link_type_attribute(&f.store, shoe, color).unwrap();

        let names: Vec<String> = type_attributes(&f.store, shoe)
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["Color", "Size"]);

        let report = delete_tree_node(&f.store, TreeKind::ProductType, shoe).unwrap();
        assert_eq!(report.deleted.len(), 3);
    }

    #[test]
    fn empty_value_is_invalid() {
        let store = InMemoryStore::new();
        let color = create_attribute(&store, "Color", "").unwrap();
        assert!(matches!(
            create_attribute_value(&store, color.id, " ").unwrap_err(),
            CatalogError::InvalidField { field: "value", .. }
        ));
    }
}

//! Typed tables and the [`Record`] contract every persisted entity implements.

use crate::error::CatalogError;
use crate::model::{
    Attribute, AttributeValue, Brand, Category, EntityKind, Product, ProductAttributeValue,
    ProductImage, ProductLine, ProductLineAttributeValue, ProductType, ProductTypeAttribute,
};
use crate::schema::Relation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

pub type Table<R> = BTreeMap<Uuid, R>;

/// A uniqueness constraint instance carried by a record.
///
/// Two records of the same kind conflict when they share an equal key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniqueKey {
    /// A single column, e.g. `name` or `sku`.
    Field { field: &'static str, value: String },
    /// An ordinal within its sibling scope.
    Ordinal { scope: Uuid, order: u32 },
    /// A pair of references, e.g. a binding's carrier and attribute value.
    Pair {
        fields: &'static str,
        left: Uuid,
        right: Uuid,
    },
}

impl UniqueKey {
    pub fn field(field: &'static str, value: impl Into<String>) -> Self {
        Self::Field {
            field,
            value: value.into(),
        }
    }

    pub(crate) fn violation(&self, kind: EntityKind) -> CatalogError {
        match self {
            UniqueKey::Field { field, value } => CatalogError::UniqueConstraintViolation {
                kind,
                field,
                value: value.clone(),
            },
            UniqueKey::Ordinal { scope, order } => CatalogError::DuplicateOrderValue {
                kind,
                scope: *scope,
                order: *order,
            },
            UniqueKey::Pair {
                fields,
                left,
                right,
            } => CatalogError::UniqueConstraintViolation {
                kind,
                field: fields,
                value: format!("{left}/{right}"),
            },
        }
    }
}

/// A persisted entity.
///
/// `FIELDS` lists the persisted field names; schema validation checks declared scope
/// and reference fields against it. `reference` must answer for every field the
/// relation registry names with this kind as its source.
pub trait Record: Clone + fmt::Debug {
    const KIND: EntityKind;
    const FIELDS: &'static [&'static str];

    fn id(&self) -> Uuid;

    fn table(tables: &Tables) -> &Table<Self>;

    fn table_mut(tables: &mut Tables) -> &mut Table<Self>;

    fn unique_keys(&self) -> Vec<UniqueKey> {
        Vec::new()
    }

    fn reference(&self, _field: &str) -> Option<Uuid> {
        None
    }

    fn clear_reference(&mut self, _field: &str) {}
}

/// The whole catalog, one ordered map per kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tables {
    #[serde(default)]
    pub categories: Table<Category>,
    #[serde(default)]
    pub product_types: Table<ProductType>,
    #[serde(default)]
    pub brands: Table<Brand>,
    #[serde(default)]
    pub products: Table<Product>,
    #[serde(default)]
    pub product_lines: Table<ProductLine>,
    #[serde(default)]
    pub product_images: Table<ProductImage>,
    #[serde(default)]
    pub attributes: Table<Attribute>,
    #[serde(default)]
    pub attribute_values: Table<AttributeValue>,
    #[serde(default)]
    pub product_type_attributes: Table<ProductTypeAttribute>,
    #[serde(default)]
    pub product_attribute_values: Table<ProductAttributeValue>,
    #[serde(default)]
    pub product_line_attribute_values: Table<ProductLineAttributeValue>,
}

/// Runs `$body` with `$R` bound to the record type of `$kind`.
macro_rules! with_record_type {
    ($kind:expr, $R:ident => $body:expr) => {
        match $kind {
            EntityKind::Category => {
                type $R = Category;
                $body
            }
            EntityKind::ProductType => {
                type $R = ProductType;
                $body
            }
            EntityKind::Brand => {
                type $R = Brand;
                $body
            }
            EntityKind::Product => {
                type $R = Product;
                $body
            }
            EntityKind::ProductLine => {
                type $R = ProductLine;
                $body
            }
            EntityKind::ProductImage => {
                type $R = ProductImage;
                $body
            }
            EntityKind::Attribute => {
                type $R = Attribute;
                $body
            }
            EntityKind::AttributeValue => {
                type $R = AttributeValue;
                $body
            }
            EntityKind::ProductTypeAttribute => {
                type $R = ProductTypeAttribute;
                $body
            }
            EntityKind::ProductAttributeValue => {
                type $R = ProductAttributeValue;
                $body
            }
            EntityKind::ProductLineAttributeValue => {
                type $R = ProductLineAttributeValue;
                $body
            }
        }
    };
}

pub(crate) use with_record_type;

impl EntityKind {
    /// Persisted field names of this kind.
    pub fn fields(&self) -> &'static [&'static str] {
        with_record_type!(*self, R => R::FIELDS)
    }
}

impl Tables {
    pub fn contains(&self, kind: EntityKind, id: Uuid) -> bool {
        with_record_type!(kind, R => R::table(self).contains_key(&id))
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        with_record_type!(kind, R => R::table(self).len())
    }

    pub fn ids(&self, kind: EntityKind) -> Vec<Uuid> {
        with_record_type!(kind, R => R::table(self).keys().copied().collect())
    }

    /// Reference held by record `id` of `kind` through `field`.
    pub fn reference_of(&self, kind: EntityKind, id: Uuid, field: &str) -> Option<Uuid> {
        with_record_type!(kind, R => R::table(self).get(&id).and_then(|r| r.reference(field)))
    }

    /// Ids of records on the source side of `relation` that point at `target`.
    pub fn referencing(&self, relation: &Relation, target: Uuid) -> Vec<Uuid> {
        with_record_type!(relation.from, R => referencing_in::<R>(self, relation.field, target))
    }

    pub(crate) fn remove(&mut self, kind: EntityKind, id: Uuid) -> bool {
        with_record_type!(kind, R => R::table_mut(self).remove(&id).is_some())
    }

    pub(crate) fn clear_reference(&mut self, kind: EntityKind, id: Uuid, field: &str) {
        with_record_type!(kind, R => {
            if let Some(record) = R::table_mut(self).get_mut(&id) {
                record.clear_reference(field);
            }
        })
    }

    /// Every pair of records in `kind` that share a unique key.
    pub fn duplicate_keys(&self, kind: EntityKind) -> Vec<(Uuid, Uuid, CatalogError)> {
        with_record_type!(kind, R => duplicates_in::<R>(self))
    }
}

fn referencing_in<R: Record>(tables: &Tables, field: &str, target: Uuid) -> Vec<Uuid> {
    R::table(tables)
        .values()
        .filter(|record| record.reference(field) == Some(target))
        .map(Record::id)
        .collect()
}

fn duplicates_in<R: Record>(tables: &Tables) -> Vec<(Uuid, Uuid, CatalogError)> {
    let records: Vec<&R> = R::table(tables).values().collect();
    let mut found = Vec::new();
    for (i, a) in records.iter().enumerate() {
        let keys = a.unique_keys();
        for b in &records[i + 1..] {
            if let Some(key) = b.unique_keys().into_iter().find(|k| keys.contains(k)) {
                found.push((a.id(), b.id(), key.violation(R::KIND)));
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::relations_to;

    fn tables_with_child() -> (Tables, Category, Category) {
        let mut tables = Tables::default();
        let parent = Category::new("Shoes", "shoes");
        let mut child = Category::new("Sneakers", "sneakers");
        child.parent = Some(parent.id);
        tables.categories.insert(parent.id, parent.clone());
        tables.categories.insert(child.id, child.clone());
        (tables, parent, child)
    }

    #[test]
    fn dispatch_reaches_the_right_table() {
        let (tables, parent, _) = tables_with_child();
        assert!(tables.contains(EntityKind::Category, parent.id));
        assert!(!tables.contains(EntityKind::ProductType, parent.id));
        assert_eq!(tables.count(EntityKind::Category), 2);
        assert_eq!(tables.count(EntityKind::Product), 0);
    }

    #[test]
    fn referencing_follows_relation_field() {
        let (tables, parent, child) = tables_with_child();
        let relation = relations_to(EntityKind::Category)
            .find(|r| r.from == EntityKind::Category && r.field == "parent")
            .expect("category parent relation");
        assert_eq!(tables.referencing(relation, parent.id), vec![child.id]);
        assert!(tables.referencing(relation, child.id).is_empty());
    }

    #[test]
    fn clear_reference_only_touches_named_field() {
        let (mut tables, _, child) = tables_with_child();
        tables.clear_reference(EntityKind::Category, child.id, "parent");
        assert_eq!(tables.categories[&child.id].parent, None);
        assert_eq!(tables.categories[&child.id].name, "Sneakers");
    }

    #[test]
    fn duplicate_keys_reports_shared_names() {
        let (mut tables, _, _) = tables_with_child();
        let twin = Category::new("Shoes", "shoes-2");
        tables.categories.insert(twin.id, twin);
        let dups = tables.duplicate_keys(EntityKind::Category);
        assert_eq!(dups.len(), 1);
        assert!(matches!(
            dups[0].2,
            CatalogError::UniqueConstraintViolation { field: "name", .. }
        ));
    }

    #[test]
    fn tables_round_trip_through_json_with_missing_sections() {
        let tables: Tables = serde_json::from_str(r#"{"brands": {}}"#).unwrap();
        assert_eq!(tables, Tables::default());
    }
}

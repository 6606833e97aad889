//! # Transactions
//!
//! A [`Transaction`] is a private working copy of one [`Snapshot`] plus the revision it
//! was read at. Every constraint the store enforces is checked here, against the
//! working copy, before a write lands in it:
//!
//! - **References**: each reference field named in [`crate::schema::RELATIONS`] must
//!   point at an existing record (`NotFound` otherwise).
//! - **Unique keys**: a record's [`UniqueKey`]s must not be shared by another record
//!   of the same kind.
//! - **Deletes**: the relation registry decides whether dependents block the delete,
//!   are deleted along with the target, or have their reference cleared. The whole
//!   plan is computed first; a rejected delete leaves the working copy untouched.
//!
//! Nothing reaches the backend until [`crate::store::DataStore::commit`]. A stale
//! working copy can pass every check here and still lose at commit time; the
//! revision comparison there is the backstop.

use super::backend::Snapshot;
use super::tables::{Record, Tables, UniqueKey};
use crate::error::{CatalogError, Result};
use crate::model::EntityKind;
use crate::schema::{relations_from, relations_to, OnDelete};
use serde::Serialize;
use uuid::Uuid;

/// A record addressed by kind and id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordRef {
    pub kind: EntityKind,
    pub id: Uuid,
}

/// A reference cleared by a delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Nullified {
    pub record: RecordRef,
    pub field: &'static str,
}

/// What a delete did, the requested record first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    pub deleted: Vec<RecordRef>,
    pub nullified: Vec<Nullified>,
}

pub struct Transaction {
    base_revision: u64,
    tables: Tables,
    dirty: bool,
}

impl Transaction {
    pub(crate) fn new(snapshot: Snapshot) -> Self {
        Self {
            base_revision: snapshot.revision,
            tables: snapshot.tables,
            dirty: false,
        }
    }

    /// Revision of the snapshot this transaction was started from.
    pub fn base_revision(&self) -> u64 {
        self.base_revision
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub(crate) fn into_tables(self) -> Tables {
        self.tables
    }

    /// Inserts a new record after reference and uniqueness checks.
    pub fn create<R: Record>(&mut self, record: R) -> Result<Uuid> {
        let id = record.id();
        if R::table(&self.tables).contains_key(&id) {
            return Err(UniqueKey::field("id", id.to_string()).violation(R::KIND));
        }
        self.check_references(&record)?;
        self.check_unique(&record)?;

        R::table_mut(&mut self.tables).insert(id, record);
        self.dirty = true;
        Ok(id)
    }

    pub fn get<R: Record>(&self, id: Uuid) -> Result<&R> {
        R::table(&self.tables)
            .get(&id)
            .ok_or_else(|| CatalogError::not_found(R::KIND, id))
    }

    /// Records of kind `R` matching `predicate`, in id order.
    pub fn find<R: Record>(&self, predicate: impl Fn(&R) -> bool) -> Vec<&R> {
        R::table(&self.tables)
            .values()
            .filter(|record| predicate(*record))
            .collect()
    }

    /// Largest `field` value among records matching `predicate`.
    pub fn max<R: Record, T: Ord>(
        &self,
        field: impl Fn(&R) -> T,
        predicate: impl Fn(&R) -> bool,
    ) -> Option<T> {
        R::table(&self.tables)
            .values()
            .filter(|record| predicate(*record))
            .map(field)
            .max()
    }

    pub fn exists<R: Record>(&self, predicate: impl Fn(&R) -> bool) -> bool {
        R::table(&self.tables).values().any(predicate)
    }

    /// Replaces an existing record, re-running reference and uniqueness checks.
    pub fn update<R: Record>(&mut self, record: R) -> Result<()> {
        let id = record.id();
        if !R::table(&self.tables).contains_key(&id) {
            return Err(CatalogError::not_found(R::KIND, id));
        }
        self.check_references(&record)?;
        self.check_unique(&record)?;

        R::table_mut(&mut self.tables).insert(id, record);
        self.dirty = true;
        Ok(())
    }

    /// Deletes a record of kind `R`, applying every delete policy that points at it.
    pub fn delete<R: Record>(&mut self, id: Uuid) -> Result<DeleteReport> {
        self.delete_kind(R::KIND, id)
    }

    /// Untyped form of [`Transaction::delete`].
    pub fn delete_kind(&mut self, kind: EntityKind, id: Uuid) -> Result<DeleteReport> {
        if !self.tables.contains(kind, id) {
            return Err(CatalogError::not_found(kind, id));
        }
        let report = self.plan_delete(kind, id)?;

        for doomed in &report.deleted {
            self.tables.remove(doomed.kind, doomed.id);
        }
        for cleared in &report.nullified {
            self.tables
                .clear_reference(cleared.record.kind, cleared.record.id, cleared.field);
        }
        self.dirty = true;
        Ok(report)
    }

    /// Computes the full effect of a delete without touching the tables.
    fn plan_delete(&self, kind: EntityKind, id: Uuid) -> Result<DeleteReport> {
        // 1. Cascade closure
        let mut deleted = vec![RecordRef { kind, id }];
        let mut next = 0;
        while next < deleted.len() {
            let target = deleted[next];
            for relation in relations_to(target.kind) {
                if relation.on_delete != OnDelete::Cascade {
                    continue;
                }
                for dependent in self.tables.referencing(relation, target.id) {
                    let dependent = RecordRef {
                        kind: relation.from,
                        id: dependent,
                    };
                    if !deleted.contains(&dependent) {
                        deleted.push(dependent);
                    }
                }
            }
            next += 1;
        }

        // 2. Protect and SetNull against everything that survives
        let mut nullified = Vec::new();
        for target in &deleted {
            for relation in relations_to(target.kind) {
                for dependent in self.tables.referencing(relation, target.id) {
                    let dependent = RecordRef {
                        kind: relation.from,
                        id: dependent,
                    };
                    if deleted.contains(&dependent) {
                        continue;
                    }
                    match relation.on_delete {
                        OnDelete::Protect => {
                            return Err(CatalogError::ProtectedDelete {
                                kind: target.kind,
                                id: target.id,
                                referenced_by: relation.from,
                                field: relation.field,
                            });
                        }
                        OnDelete::SetNull => nullified.push(Nullified {
                            record: dependent,
                            field: relation.field,
                        }),
                        OnDelete::Cascade => {}
                    }
                }
            }
        }

        Ok(DeleteReport { deleted, nullified })
    }

    fn check_references<R: Record>(&self, record: &R) -> Result<()> {
        for relation in relations_from(R::KIND) {
            if let Some(target) = record.reference(relation.field) {
                if !self.tables.contains(relation.to, target) {
                    return Err(CatalogError::not_found(relation.to, target));
                }
            }
        }
        Ok(())
    }

    fn check_unique<R: Record>(&self, record: &R) -> Result<()> {
        let keys = record.unique_keys();
        if keys.is_empty() {
            return Ok(());
        }
        let id = record.id();
        for other in R::table(&self.tables).values() {
            if other.id() == id {
                continue;
            }
            if let Some(key) = other.unique_keys().into_iter().find(|k| keys.contains(k)) {
                return Err(key.violation(R::KIND));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Attribute, AttributeValue, Brand, Category, Product, ProductImage, ProductLine,
        ProductLineAttributeValue, ProductType,
    };
    use rust_decimal::Decimal;

    fn empty() -> Transaction {
        Transaction::new(Snapshot::default())
    }

    fn line(product: &Product, sku: &str, order: u32) -> ProductLine {
        ProductLine {
            id: Uuid::new_v4(),
            product: product.id,
            product_type: product.product_type,
            sku: sku.into(),
            price: Decimal::new(1000, 2),
            stock_qty: 1,
            is_active: true,
            order,
        }
    }

    fn with_product() -> (Transaction, Product) {
        let mut txn = empty();
        let kind = ProductType::new("Shoe");
        txn.create(kind.clone()).unwrap();
        let product = Product::new("Runner", "runner", kind.id);
        txn.create(product.clone()).unwrap();
        (txn, product)
    }

    #[test]
    fn create_rejects_dangling_reference() {
        let mut txn = empty();
        let product = Product::new("Runner", "runner", Uuid::new_v4());
        let err = txn.create(product).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::NotFound {
                kind: EntityKind::ProductType,
                ..
            }
        ));
        assert!(!txn.is_dirty());
    }

    #[test]
    fn unique_keys_are_global_per_kind() {
        let mut txn = empty();
        let mut shoes = Category::new("Shoes", "shoes");
        txn.create(shoes.clone()).unwrap();
        let mut child = Category::new("Shoes", "other");
        child.parent = Some(shoes.id);
        let err = txn.create(child).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::UniqueConstraintViolation { field: "name", .. }
        ));

        // Updating a record does not collide with itself.
        shoes.is_active = true;
        txn.update(shoes).unwrap();
    }

    #[test]
    fn ordinal_key_collision_is_duplicate_order() {
        let (mut txn, product) = with_product();
        txn.create(line(&product, "A", 1)).unwrap();
        let err = txn.create(line(&product, "B", 1)).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::DuplicateOrderValue { order: 1, .. }
        ));
    }

    #[test]
    fn find_max_and_exists_filter_records() {
        let (mut txn, product) = with_product();
        txn.create(line(&product, "A", 1)).unwrap();
        txn.create(line(&product, "B", 5)).unwrap();

        assert_eq!(
            txn.max::<ProductLine, _>(|l| l.order, |l| l.product == product.id),
            Some(5)
        );
        assert_eq!(
            txn.max::<ProductLine, _>(|l| l.order, |l| l.product == Uuid::nil()),
            None
        );
        assert_eq!(txn.find::<ProductLine>(|l| l.sku == "A").len(), 1);
        assert!(txn.exists::<ProductLine>(|l| l.sku == "B"));
    }

    #[test]
    fn update_missing_record_is_not_found() {
        let mut txn = empty();
        let err = txn.update(Brand::new("Acme")).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }));
    }

    #[test]
    fn protected_delete_leaves_everything_in_place() {
        let (mut txn, product) = with_product();
        let kept = line(&product, "A", 1);
        txn.create(kept.clone()).unwrap();

        let err = txn.delete::<Product>(product.id).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::ProtectedDelete {
                referenced_by: EntityKind::ProductLine,
                field: "product",
                ..
            }
        ));
        assert!(txn.get::<Product>(product.id).is_ok());
        assert!(txn.get::<ProductLine>(kept.id).is_ok());
    }

    #[test]
    fn cascade_removes_images_and_bindings_of_a_line() {
        let (mut txn, product) = with_product();
        let l = line(&product, "A", 1);
        txn.create(l.clone()).unwrap();
        let image = ProductImage {
            id: Uuid::new_v4(),
            product_line: l.id,
            url: "a.png".into(),
            alternative_text: String::new(),
            order: 1,
        };
        txn.create(image.clone()).unwrap();
        let color = Attribute::new("Color", "");
        txn.create(color.clone()).unwrap();
        let red = AttributeValue::new(color.id, "Red");
        txn.create(red.clone()).unwrap();
        let binding = ProductLineAttributeValue {
            id: Uuid::new_v4(),
            product_line: l.id,
            attribute_value: red.id,
        };
        txn.create(binding.clone()).unwrap();

        let report = txn.delete::<ProductLine>(l.id).unwrap();
        assert_eq!(report.deleted.len(), 3);
        assert_eq!(report.deleted[0].id, l.id);
        assert!(txn.get::<ProductImage>(image.id).is_err());
        assert!(txn.get::<ProductLineAttributeValue>(binding.id).is_err());
        assert!(txn.get::<AttributeValue>(red.id).is_ok());
    }

    #[test]
    fn set_null_clears_product_category() {
        let (mut txn, mut product) = with_product();
        let shoes = Category::new("Shoes", "shoes");
        txn.create(shoes.clone()).unwrap();
        product.category = Some(shoes.id);
        txn.update(product.clone()).unwrap();

        let report = txn.delete::<Category>(shoes.id).unwrap();
        assert_eq!(
            report.nullified,
            vec![Nullified {
                record: RecordRef {
                    kind: EntityKind::Product,
                    id: product.id,
                },
                field: "category",
            }]
        );
        assert_eq!(txn.get::<Product>(product.id).unwrap().category, None);
    }

    #[test]
    fn delete_missing_record_is_not_found() {
        let mut txn = empty();
        let err = txn.delete::<Category>(Uuid::new_v4()).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::NotFound {
                kind: EntityKind::Category,
                ..
            }
        ));
    }
}

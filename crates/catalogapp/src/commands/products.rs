//! Brands and products.

use super::{in_transaction, parse_id};
use crate::error::{CatalogError, Result};
use crate::model::{Brand, EntityKind, Product};
use crate::store::{DataStore, DeleteReport, Transaction};
use crate::validation::{slugify, validate_name, validate_slug};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    /// Derived from the name when omitted.
    pub slug: Option<String>,
    pub description: String,
    pub is_digital: bool,
    pub is_active: bool,
    pub brand: Option<Uuid>,
    pub category: Option<Uuid>,
    pub product_type: Uuid,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, product_type: Uuid) -> Self {
        Self {
            name: name.into(),
            slug: None,
            description: String::new(),
            is_digital: false,
            is_active: false,
            brand: None,
            category: None,
            product_type,
        }
    }
}

/// Field changes to a product. `None` leaves a field as it is; for the optional
/// references, `Some(None)` clears them.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub product_type: Option<Uuid>,
    pub description: Option<String>,
    pub is_digital: Option<bool>,
    pub brand: Option<Option<Uuid>>,
    pub category: Option<Option<Uuid>>,
}

pub fn create_brand<S: DataStore>(store: &S, name: &str, is_active: bool) -> Result<Brand> {
    validate_name(EntityKind::Brand, name)?;
    in_transaction(store, |txn| {
        let mut brand = Brand::new(name);
        brand.is_active = is_active;
        txn.create(brand.clone())?;
        Ok(brand)
    })
}

/// Products that named the brand keep existing without one.
pub fn delete_brand<S: DataStore>(store: &S, id: Uuid) -> Result<DeleteReport> {
    in_transaction(store, |txn| txn.delete::<Brand>(id))
}

pub fn create_product<S: DataStore>(store: &S, new: NewProduct) -> Result<Product> {
    validate_name(EntityKind::Product, &new.name)?;
    let slug = new.slug.unwrap_or_else(|| slugify(&new.name));
    validate_slug(EntityKind::Product, &slug)?;

    in_transaction(store, |txn| {
        let mut product = Product::new(new.name, slug, new.product_type);
        product.description = new.description;
        product.is_digital = new.is_digital;
        product.is_active = new.is_active;
        product.brand = new.brand;
        product.category = new.category;
        txn.create(product.clone())?;
        tracing::debug!(id = %product.id, pid = %product.pid, "product created");
        Ok(product)
    })
}

pub fn update_product<S: DataStore>(store: &S, id: Uuid, update: ProductUpdate) -> Result<Product> {
    in_transaction(store, |txn| {
        let mut product = txn.get::<Product>(id)?.clone();
        if let Some(name) = update.name {
            validate_name(EntityKind::Product, &name)?;
            product.name = name;
        }
        if let Some(slug) = update.slug {
            validate_slug(EntityKind::Product, &slug)?;
            product.slug = slug;
        }
        if let Some(product_type) = update.product_type {
            product.product_type = product_type;
        }
        if let Some(description) = update.description {
            product.description = description;
        }
        if let Some(is_digital) = update.is_digital {
            product.is_digital = is_digital;
        }
        if let Some(brand) = update.brand {
            product.brand = brand;
        }
        if let Some(category) = update.category {
            product.category = category;
        }
        txn.update(product.clone())?;
        Ok(product)
    })
}

/// Rejected while the product still has lines.
pub fn delete_product<S: DataStore>(store: &S, id: Uuid) -> Result<DeleteReport> {
    in_transaction(store, |txn| txn.delete::<Product>(id))
}

/// Finds a product by id, slug, or pid.
pub fn lookup_product<S: DataStore>(store: &S, key: &str) -> Result<Product> {
    let txn = store.begin()?;
    find_product(&txn, key)
}

pub(crate) fn find_product(txn: &Transaction, key: &str) -> Result<Product> {
    if let Some(id) = parse_id(key) {
        if let Ok(product) = txn.get::<Product>(id) {
            return Ok(product.clone());
        }
    }
    txn.find::<Product>(|p| p.slug == key || p.pid == key)
        .first()
        .map(|p| (*p).clone())
        .ok_or_else(|| CatalogError::not_found(EntityKind::Product, key))
}

/// Finds a brand by id or exact name.
pub fn lookup_brand<S: DataStore>(store: &S, key: &str) -> Result<Brand> {
    let txn = store.begin()?;
    if let Some(id) = parse_id(key) {
        if let Ok(brand) = txn.get::<Brand>(id) {
            return Ok(brand.clone());
        }
    }
    txn.find::<Brand>(|b| b.name == key)
        .first()
        .map(|b| (*b).clone())
        .ok_or_else(|| CatalogError::not_found(EntityKind::Brand, key))
}

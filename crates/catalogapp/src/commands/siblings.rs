//! Product lines and product images: the ordered sibling records.
//!
//! Lines are numbered within their product, images within their line. A payload may
//! carry an explicit ordinal; otherwise the next one in scope is assigned.

use super::{in_transaction, parse_id};
use crate::error::{CatalogError, Result};
use crate::model::{EntityKind, Product, ProductImage, ProductLine};
use crate::ordering::{assign_order, ensure_unique_order};
use crate::store::{DataStore, DeleteReport, Transaction};
use crate::validation::{validate_price, validate_sku};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewProductLine {
    pub sku: String,
    pub price: Decimal,
    pub stock_qty: i32,
    pub is_active: bool,
    /// Defaults to the owning product's type.
    pub product_type: Option<Uuid>,
    pub order: Option<u32>,
}

impl NewProductLine {
    pub fn new(sku: impl Into<String>, price: Decimal) -> Self {
        Self {
            sku: sku.into(),
            price,
            stock_qty: 0,
            is_active: true,
            product_type: None,
            order: None,
        }
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_stock(mut self, stock_qty: i32) -> Self {
        self.stock_qty = stock_qty;
        self
    }
}

#[derive(Debug, Clone)]
pub struct NewProductImage {
    pub url: String,
    pub alternative_text: String,
    pub order: Option<u32>,
}

impl NewProductImage {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alternative_text: String::new(),
            order: None,
        }
    }
}

/// What to create, and therefore which scope `scope_key` names.
#[derive(Debug, Clone)]
pub enum SiblingPayload {
    /// Scope key is the product id.
    Line(NewProductLine),
    /// Scope key is the product line id.
    Image(NewProductImage),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Sibling {
    Line(ProductLine),
    Image(ProductImage),
}

/// Field changes to a line. `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct LineUpdate {
    pub sku: Option<String>,
    pub price: Option<Decimal>,
    pub stock_qty: Option<i32>,
    pub is_active: Option<bool>,
    pub order: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct ImageUpdate {
    pub url: Option<String>,
    pub alternative_text: Option<String>,
    pub order: Option<u32>,
}

pub fn create_sibling<S: DataStore>(
    store: &S,
    payload: SiblingPayload,
    scope_key: Uuid,
) -> Result<Sibling> {
    match payload {
        SiblingPayload::Line(new) => create_line(store, scope_key, new).map(Sibling::Line),
        SiblingPayload::Image(new) => create_image(store, scope_key, new).map(Sibling::Image),
    }
}

pub fn create_line<S: DataStore>(
    store: &S,
    product: Uuid,
    new: NewProductLine,
) -> Result<ProductLine> {
    in_transaction(store, |txn| insert_line(txn, product, new))
}

fn insert_line(txn: &mut Transaction, product: Uuid, new: NewProductLine) -> Result<ProductLine> {
    validate_sku(&new.sku)?;
    validate_price(new.price)?;
    let owner = txn.get::<Product>(product)?;
    let product_type = new.product_type.unwrap_or(owner.product_type);

    let order = assign_order::<ProductLine>(txn, new.order, Some(product))?;
    let line = ProductLine {
        id: Uuid::new_v4(),
        product,
        product_type,
        sku: new.sku,
        price: new.price,
        stock_qty: new.stock_qty,
        is_active: new.is_active,
        order,
    };
    ensure_unique_order(txn, &line)?;
    txn.create(line.clone())?;
    Ok(line)
}

pub fn create_image<S: DataStore>(
    store: &S,
    product_line: Uuid,
    new: NewProductImage,
) -> Result<ProductImage> {
    in_transaction(store, |txn| {
        txn.get::<ProductLine>(product_line)?;
        let order = assign_order::<ProductImage>(txn, new.order, Some(product_line))?;
        let image = ProductImage {
            id: Uuid::new_v4(),
            product_line,
            url: new.url,
            alternative_text: new.alternative_text,
            order,
        };
        ensure_unique_order(txn, &image)?;
        txn.create(image.clone())?;
        Ok(image)
    })
}

pub fn update_product_line<S: DataStore>(
    store: &S,
    id: Uuid,
    update: LineUpdate,
) -> Result<ProductLine> {
    in_transaction(store, |txn| {
        let mut line = txn.get::<ProductLine>(id)?.clone();
        if let Some(sku) = update.sku {
            validate_sku(&sku)?;
            line.sku = sku;
        }
        if let Some(price) = update.price {
            validate_price(price)?;
            line.price = price;
        }
        if let Some(stock_qty) = update.stock_qty {
            line.stock_qty = stock_qty;
        }
        if let Some(is_active) = update.is_active {
            line.is_active = is_active;
        }
        if let Some(order) = update.order {
            line.order = order;
            ensure_unique_order(txn, &line)?;
        }
        txn.update(line.clone())?;
        Ok(line)
    })
}

pub fn update_product_image<S: DataStore>(
    store: &S,
    id: Uuid,
    update: ImageUpdate,
) -> Result<ProductImage> {
    in_transaction(store, |txn| {
        let mut image = txn.get::<ProductImage>(id)?.clone();
        if let Some(url) = update.url {
            image.url = url;
        }
        if let Some(alternative_text) = update.alternative_text {
            image.alternative_text = alternative_text;
        }
        if let Some(order) = update.order {
            image.order = order;
            ensure_unique_order(txn, &image)?;
        }
        txn.update(image.clone())?;
        Ok(image)
    })
}

/// Deletes a line together with its images and attribute bindings.
pub fn delete_product_line<S: DataStore>(store: &S, id: Uuid) -> Result<DeleteReport> {
    in_transaction(store, |txn| txn.delete::<ProductLine>(id))
}

pub fn delete_product_image<S: DataStore>(store: &S, id: Uuid) -> Result<DeleteReport> {
    in_transaction(store, |txn| txn.delete::<ProductImage>(id))
}

/// Finds a line by id or sku.
pub fn lookup_line<S: DataStore>(store: &S, key: &str) -> Result<ProductLine> {
    let txn = store.begin()?;
    if let Some(id) = parse_id(key) {
        if let Ok(line) = txn.get::<ProductLine>(id) {
            return Ok(line.clone());
        }
    }
    txn.find::<ProductLine>(|l| l.sku == key)
        .first()
        .map(|l| (*l).clone())
        .ok_or_else(|| CatalogError::not_found(EntityKind::ProductLine, key))
}

/// Lines of a product by ordinal, active or not.
pub fn product_lines<S: DataStore>(store: &S, product: Uuid) -> Result<Vec<ProductLine>> {
    let txn = store.begin()?;
    txn.get::<Product>(product)?;
    let mut lines: Vec<ProductLine> = txn
        .find::<ProductLine>(|l| l.product == product)
        .into_iter()
        .cloned()
        .collect();
    lines.sort_by_key(|l| l.order);
    Ok(lines)
}

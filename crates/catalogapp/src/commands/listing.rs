//! Active-only listings and the visibility flag.
//!
//! [`list_active`] is the one place read paths filter on `is_active`. It looks at each
//! record's own flag and nothing else: an active category under an inactive parent is
//! listed, an inactive one under an active parent is not.

use super::in_transaction;
use crate::error::{CatalogError, Result};
use crate::model::{Activatable, Brand, Category, EntityKind, Product, ProductLine, ProductType};
use crate::schema::relations_from;
use crate::store::{DataStore, Record, Transaction};
use crate::tree::{active_subset, sibling_order};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Kinds that carry a visibility flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveKind {
    Category,
    ProductType,
    Brand,
    Product,
    ProductLine,
}

impl ActiveKind {
    pub fn entity_kind(&self) -> EntityKind {
        match self {
            ActiveKind::Category => EntityKind::Category,
            ActiveKind::ProductType => EntityKind::ProductType,
            ActiveKind::Brand => EntityKind::Brand,
            ActiveKind::Product => EntityKind::Product,
            ActiveKind::ProductLine => EntityKind::ProductLine,
        }
    }
}

impl fmt::Display for ActiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.entity_kind(), f)
    }
}

impl FromStr for ActiveKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "category" | "categories" => Ok(ActiveKind::Category),
            "type" | "types" | "product_type" => Ok(ActiveKind::ProductType),
            "brand" | "brands" => Ok(ActiveKind::Brand),
            "product" | "products" => Ok(ActiveKind::Product),
            "line" | "lines" | "product_line" => Ok(ActiveKind::ProductLine),
            other => Err(format!("unknown kind '{other}'")),
        }
    }
}

/// Restricts a listing to records whose reference `field` points at `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilter {
    pub field: String,
    pub id: Uuid,
}

impl ListFilter {
    pub fn new(field: impl Into<String>, id: Uuid) -> Self {
        Self {
            field: field.into(),
            id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Listing {
    Categories(Vec<Category>),
    ProductTypes(Vec<ProductType>),
    Brands(Vec<Brand>),
    Products(Vec<Product>),
    ProductLines(Vec<ProductLine>),
}

impl Listing {
    pub fn len(&self) -> usize {
        match self {
            Listing::Categories(v) => v.len(),
            Listing::ProductTypes(v) => v.len(),
            Listing::Brands(v) => v.len(),
            Listing::Products(v) => v.len(),
            Listing::ProductLines(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Active records of `kind` matching every filter.
///
/// Trees come back in sibling order, brands and products by name, lines by product
/// and ordinal.
pub fn list_active<S: DataStore>(
    store: &S,
    kind: ActiveKind,
    filters: &[ListFilter],
) -> Result<Listing> {
    let kind_of = kind.entity_kind();
    for filter in filters {
        if !relations_from(kind_of).any(|r| r.field == filter.field) {
            return Err(CatalogError::InvalidField {
                kind: kind_of,
                field: "filter",
                reason: format!("'{}' is not a reference field of {}", filter.field, kind_of),
            });
        }
    }

    let txn = store.begin()?;
    let listing = match kind {
        ActiveKind::Category => {
            let mut nodes = active::<Category>(&txn, filters);
            nodes.sort_by(sibling_order);
            Listing::Categories(nodes)
        }
        ActiveKind::ProductType => {
            let mut nodes = active::<ProductType>(&txn, filters);
            nodes.sort_by(sibling_order);
            Listing::ProductTypes(nodes)
        }
        ActiveKind::Brand => {
            let mut brands = active::<Brand>(&txn, filters);
            brands.sort_by(|a, b| a.name.cmp(&b.name));
            Listing::Brands(brands)
        }
        ActiveKind::Product => {
            let mut products = active::<Product>(&txn, filters);
            products.sort_by(|a, b| a.name.cmp(&b.name));
            Listing::Products(products)
        }
        ActiveKind::ProductLine => {
            let mut lines = active::<ProductLine>(&txn, filters);
            lines.sort_by_key(|l| (l.product, l.order));
            Listing::ProductLines(lines)
        }
    };
    Ok(listing)
}

fn active<R: Record + Activatable>(txn: &Transaction, filters: &[ListFilter]) -> Vec<R> {
    let matching = txn
        .find::<R>(|r| {
            filters
                .iter()
                .all(|f| r.reference(&f.field) == Some(f.id))
        })
        .into_iter()
        .cloned();
    active_subset(matching)
}

/// Sets the visibility flag of one record. Returns the previous value.
pub fn set_active<S: DataStore>(store: &S, kind: ActiveKind, id: Uuid, active: bool) -> Result<bool> {
    in_transaction(store, |txn| match kind {
        ActiveKind::Category => flip::<Category>(txn, id, active),
        ActiveKind::ProductType => flip::<ProductType>(txn, id, active),
        ActiveKind::Brand => flip::<Brand>(txn, id, active),
        ActiveKind::Product => flip::<Product>(txn, id, active),
        ActiveKind::ProductLine => flip::<ProductLine>(txn, id, active),
    })
}

fn flip<R: Record + Activatable>(txn: &mut Transaction, id: Uuid, active: bool) -> Result<bool> {
    let mut record = txn.get::<R>(id)?.clone();
    let previous = record.is_active();
    if previous != active {
        record.set_active(active);
        txn.update(record)?;
    }
    Ok(previous)
}

//! # Domain Model: Catalog Records
//!
//! This module defines the persisted records of the catalog. Records are plain data:
//! they hold ids of the records they point at, never live references, and carry no
//! behavior beyond construction and display.
//!
//! ## Record Families
//!
//! | Family | Records | Notes |
//! |--------|---------|-------|
//! | Trees | [`Category`], [`ProductType`] | `parent` is an optional id of the same kind |
//! | Catalog | [`Brand`], [`Product`], [`ProductLine`], [`ProductImage`] | lines and images carry an ordinal |
//! | Attributes | [`Attribute`], [`AttributeValue`] | a value belongs to exactly one attribute |
//! | Bindings | [`ProductAttributeValue`], [`ProductLineAttributeValue`], [`ProductTypeAttribute`] | first-class association records |
//!
//! ## Visibility
//!
//! `is_active` lives on each record and means nothing beyond that record: an inactive
//! category does not hide its children, an inactive product does not hide its lines
//! from direct lookups. Read paths filter on the record's own flag only.
//!
//! ## Ordinals
//!
//! [`ProductLine::order`] is unique within its product and [`ProductImage::order`] within
//! its product line. Ordinals are assigned once at creation (see [`crate::ordering`]).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Every kind of record the store persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Category,
    ProductType,
    Brand,
    Product,
    ProductLine,
    ProductImage,
    Attribute,
    AttributeValue,
    ProductTypeAttribute,
    ProductAttributeValue,
    ProductLineAttributeValue,
}

impl EntityKind {
    pub const ALL: [EntityKind; 11] = [
        EntityKind::Category,
        EntityKind::ProductType,
        EntityKind::Brand,
        EntityKind::Product,
        EntityKind::ProductLine,
        EntityKind::ProductImage,
        EntityKind::Attribute,
        EntityKind::AttributeValue,
        EntityKind::ProductTypeAttribute,
        EntityKind::ProductAttributeValue,
        EntityKind::ProductLineAttributeValue,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Category => "Category",
            EntityKind::ProductType => "ProductType",
            EntityKind::Brand => "Brand",
            EntityKind::Product => "Product",
            EntityKind::ProductLine => "ProductLine",
            EntityKind::ProductImage => "ProductImage",
            EntityKind::Attribute => "Attribute",
            EntityKind::AttributeValue => "AttributeValue",
            EntityKind::ProductTypeAttribute => "ProductTypeAttribute",
            EntityKind::ProductAttributeValue => "ProductAttributeValue",
            EntityKind::ProductLineAttributeValue => "ProductLineAttributeValue",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Records that carry an independent visibility flag.
pub trait Activatable {
    fn is_active(&self) -> bool;
    fn set_active(&mut self, active: bool);
}

macro_rules! impl_activatable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Activatable for $ty {
                fn is_active(&self) -> bool {
                    self.is_active
                }

                fn set_active(&mut self, active: bool) {
                    self.is_active = active;
                }
            }
        )*
    };
}

impl_activatable!(Category, ProductType, Brand, Product, ProductLine);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub parent: Option<Uuid>,
    #[serde(default)]
    pub is_active: bool,
}

impl Category {
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            slug: slug.into(),
            parent: None,
            is_active: false,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductType {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub parent: Option<Uuid>,
    #[serde(default)]
    pub is_active: bool,
}

impl ProductType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            parent: None,
            is_active: false,
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
}

impl Brand {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            is_active: false,
        }
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    /// Short public identifier, generated once.
    pub pid: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_digital: bool,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub brand: Option<Uuid>,
    #[serde(default)]
    pub category: Option<Uuid>,
    pub product_type: Uuid,
}

impl Product {
    pub fn new(name: impl Into<String>, slug: impl Into<String>, product_type: Uuid) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            pid: generate_pid(&id),
            name: name.into(),
            slug: slug.into(),
            description: String::new(),
            is_digital: false,
            is_active: false,
            brand: None,
            category: None,
            product_type,
        }
    }
}

/// First ten hex digits of the record id, upper-cased.
fn generate_pid(id: &Uuid) -> String {
    id.simple().to_string()[..10].to_uppercase()
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductLine {
    pub id: Uuid,
    pub product: Uuid,
    pub product_type: Uuid,
    pub sku: String,
    pub price: Decimal,
    pub stock_qty: i32,
    #[serde(default)]
    pub is_active: bool,
    pub order: u32,
}

impl fmt::Display for ProductLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "product_line_{}", self.sku)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: Uuid,
    pub product_line: Uuid,
    pub url: String,
    #[serde(default)]
    pub alternative_text: String,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValue {
    pub id: Uuid,
    pub attribute: Uuid,
    pub value: String,
}

impl AttributeValue {
    pub fn new(attribute: Uuid, value: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            attribute,
            value: value.into(),
        }
    }
}

/// Attribute a product type offers to its products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductTypeAttribute {
    pub id: Uuid,
    pub product_type: Uuid,
    pub attribute: Uuid,
}

/// Binding of an attribute value to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAttributeValue {
    pub id: Uuid,
    pub product: Uuid,
    pub attribute_value: Uuid,
}

/// Binding of an attribute value to a product line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductLineAttributeValue {
    pub id: Uuid,
    pub product_line: Uuid,
    pub attribute_value: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_records_start_inactive() {
        let category = Category::new("Shoes", "shoes");
        assert!(!category.is_active());
        assert!(category.parent.is_none());

        let brand = Brand::new("Acme");
        assert!(!brand.is_active());
    }

    #[test]
    fn pid_is_ten_characters_derived_from_id() {
        let product = Product::new("Runner", "runner", Uuid::new_v4());
        assert_eq!(product.pid.len(), 10);
        assert!(product
            .id
            .simple()
            .to_string()
            .to_uppercase()
            .starts_with(&product.pid));
        assert!(!product.is_digital);
    }

    #[test]
    fn display_matches_catalog_labels() {
        let line = ProductLine {
            id: Uuid::new_v4(),
            product: Uuid::new_v4(),
            product_type: Uuid::new_v4(),
            sku: "SKU-1".into(),
            price: Decimal::new(1999, 2),
            stock_qty: 3,
            is_active: true,
            order: 1,
        };
        assert_eq!(line.to_string(), "product_line_SKU-1");
        assert_eq!(Category::new("test_cat", "test-cat").to_string(), "test_cat");
        assert_eq!(EntityKind::ProductLine.to_string(), "ProductLine");
    }

    #[test]
    fn set_active_flips_only_the_record() {
        let mut parent = Category::new("Shoes", "shoes");
        let mut child = Category::new("Sneakers", "sneakers");
        child.parent = Some(parent.id);
        parent.set_active(true);
        assert!(parent.is_active());
        assert!(!child.is_active());
        child.set_active(true);
        parent.set_active(false);
        assert!(child.is_active());
    }
}

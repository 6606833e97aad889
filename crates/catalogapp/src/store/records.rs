//! [`Record`] implementations for the catalog entities.
//!
//! Each impl states the persisted field names, the unique keys a record carries and
//! how to read or clear the reference fields named in [`crate::schema::RELATIONS`].

use super::tables::{Record, Table, Tables, UniqueKey};
use crate::model::{
    Attribute, AttributeValue, Brand, Category, EntityKind, Product, ProductAttributeValue,
    ProductImage, ProductLine, ProductLineAttributeValue, ProductType, ProductTypeAttribute,
};
use uuid::Uuid;

impl Record for Category {
    const KIND: EntityKind = EntityKind::Category;
    const FIELDS: &'static [&'static str] = &["id", "name", "slug", "parent", "is_active"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &Table<Self> {
        &tables.categories
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.categories
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![
            UniqueKey::field("name", &self.name),
            UniqueKey::field("slug", &self.slug),
        ]
    }

    fn reference(&self, field: &str) -> Option<Uuid> {
        match field {
            "parent" => self.parent,
            _ => None,
        }
    }

    fn clear_reference(&mut self, field: &str) {
        if field == "parent" {
            self.parent = None;
        }
    }
}

impl Record for ProductType {
    const KIND: EntityKind = EntityKind::ProductType;
    const FIELDS: &'static [&'static str] = &["id", "name", "parent", "is_active"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &Table<Self> {
        &tables.product_types
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.product_types
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::field("name", &self.name)]
    }

    fn reference(&self, field: &str) -> Option<Uuid> {
        match field {
            "parent" => self.parent,
            _ => None,
        }
    }

    fn clear_reference(&mut self, field: &str) {
        if field == "parent" {
            self.parent = None;
        }
    }
}

impl Record for Brand {
    const KIND: EntityKind = EntityKind::Brand;
    const FIELDS: &'static [&'static str] = &["id", "name", "is_active"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &Table<Self> {
        &tables.brands
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.brands
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::field("name", &self.name)]
    }
}

impl Record for Product {
    const KIND: EntityKind = EntityKind::Product;
    const FIELDS: &'static [&'static str] = &[
        "id",
        "pid",
        "name",
        "slug",
        "description",
        "is_digital",
        "is_active",
        "brand",
        "category",
        "product_type",
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &Table<Self> {
        &tables.products
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.products
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![
            UniqueKey::field("slug", &self.slug),
            UniqueKey::field("pid", &self.pid),
        ]
    }

    fn reference(&self, field: &str) -> Option<Uuid> {
        match field {
            "brand" => self.brand,
            "category" => self.category,
            "product_type" => Some(self.product_type),
            _ => None,
        }
    }

    fn clear_reference(&mut self, field: &str) {
        match field {
            "brand" => self.brand = None,
            "category" => self.category = None,
            _ => {}
        }
    }
}

impl Record for ProductLine {
    const KIND: EntityKind = EntityKind::ProductLine;
    const FIELDS: &'static [&'static str] = &[
        "id",
        "product",
        "product_type",
        "sku",
        "price",
        "stock_qty",
        "is_active",
        "order",
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &Table<Self> {
        &tables.product_lines
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.product_lines
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![
            UniqueKey::field("sku", &self.sku),
            UniqueKey::Ordinal {
                scope: self.product,
                order: self.order,
            },
        ]
    }

    fn reference(&self, field: &str) -> Option<Uuid> {
        match field {
            "product" => Some(self.product),
            "product_type" => Some(self.product_type),
            _ => None,
        }
    }
}

impl Record for ProductImage {
    const KIND: EntityKind = EntityKind::ProductImage;
    const FIELDS: &'static [&'static str] =
        &["id", "product_line", "url", "alternative_text", "order"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &Table<Self> {
        &tables.product_images
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.product_images
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::Ordinal {
            scope: self.product_line,
            order: self.order,
        }]
    }

    fn reference(&self, field: &str) -> Option<Uuid> {
        match field {
            "product_line" => Some(self.product_line),
            _ => None,
        }
    }
}

impl Record for Attribute {
    const KIND: EntityKind = EntityKind::Attribute;
    const FIELDS: &'static [&'static str] = &["id", "name", "description"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &Table<Self> {
        &tables.attributes
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.attributes
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::field("name", &self.name)]
    }
}

impl Record for AttributeValue {
    const KIND: EntityKind = EntityKind::AttributeValue;
    const FIELDS: &'static [&'static str] = &["id", "attribute", "value"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &Table<Self> {
        &tables.attribute_values
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.attribute_values
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        // The same text may appear under different attributes ("Red" color, "Red" trim).
        vec![UniqueKey::field(
            "value",
            format!("{}:{}", self.attribute, self.value),
        )]
    }

    fn reference(&self, field: &str) -> Option<Uuid> {
        match field {
            "attribute" => Some(self.attribute),
            _ => None,
        }
    }
}

impl Record for ProductTypeAttribute {
    const KIND: EntityKind = EntityKind::ProductTypeAttribute;
    const FIELDS: &'static [&'static str] = &["id", "product_type", "attribute"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &Table<Self> {
        &tables.product_type_attributes
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.product_type_attributes
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::Pair {
            fields: "product_type,attribute",
            left: self.product_type,
            right: self.attribute,
        }]
    }

    fn reference(&self, field: &str) -> Option<Uuid> {
        match field {
            "product_type" => Some(self.product_type),
            "attribute" => Some(self.attribute),
            _ => None,
        }
    }
}

impl Record for ProductAttributeValue {
    const KIND: EntityKind = EntityKind::ProductAttributeValue;
    const FIELDS: &'static [&'static str] = &["id", "product", "attribute_value"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &Table<Self> {
        &tables.product_attribute_values
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.product_attribute_values
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::Pair {
            fields: "product,attribute_value",
            left: self.product,
            right: self.attribute_value,
        }]
    }

    fn reference(&self, field: &str) -> Option<Uuid> {
        match field {
            "product" => Some(self.product),
            "attribute_value" => Some(self.attribute_value),
            _ => None,
        }
    }
}

impl Record for ProductLineAttributeValue {
    const KIND: EntityKind = EntityKind::ProductLineAttributeValue;
    const FIELDS: &'static [&'static str] = &["id", "product_line", "attribute_value"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &Table<Self> {
        &tables.product_line_attribute_values
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.product_line_attribute_values
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::Pair {
            fields: "product_line,attribute_value",
            left: self.product_line,
            right: self.attribute_value,
        }]
    }

    fn reference(&self, field: &str) -> Option<Uuid> {
        match field {
            "product_line" => Some(self.product_line),
            "attribute_value" => Some(self.attribute_value),
            _ => None,
        }
    }
}

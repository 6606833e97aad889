//! Storefront reads: one product with everything it shows, and a category's products.

use super::bindings::{bound_values, BoundValue};
use super::tree_nodes::path_of;
use crate::error::{CatalogError, Result};
use crate::model::{
    Brand, Category, EntityKind, Product, ProductAttributeValue, ProductImage, ProductLine,
    ProductLineAttributeValue, ProductType,
};
use crate::store::{DataStore, Transaction};
use crate::tree::active_subset;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDetail {
    pub product: Product,
    pub brand: Option<Brand>,
    pub category: Option<Category>,
    /// Category names from the root down, empty without a category.
    pub category_path: Vec<String>,
    pub product_type: ProductType,
    pub attributes: Vec<BoundValue>,
    pub lines: Vec<LineDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineDetail {
    pub line: ProductLine,
    pub images: Vec<ProductImage>,
    pub attributes: Vec<BoundValue>,
}

/// The active product with `slug`, with its active lines in ordinal order.
///
/// An inactive product is reported as not found. Brand and category are shown
/// whatever their own flags say.
pub fn product_detail<S: DataStore>(store: &S, slug: &str) -> Result<ProductDetail> {
    let txn = store.begin()?;
    let product = txn
        .find::<Product>(|p| p.slug == slug && p.is_active)
        .first()
        .map(|p| (*p).clone())
        .ok_or_else(|| CatalogError::not_found(EntityKind::Product, slug))?;

    let brand = match product.brand {
        Some(id) => Some(txn.get::<Brand>(id)?.clone()),
        None => None,
    };
    let (category, category_path) = match product.category {
        Some(id) => (
            Some(txn.get::<Category>(id)?.clone()),
            path_of::<Category>(&txn, id)?,
        ),
        None => (None, Vec::new()),
    };
    let product_type = txn.get::<ProductType>(product.product_type)?.clone();
    let attributes = bound_values::<ProductAttributeValue>(&txn, product.id)?;

    let mut lines = active_subset(
        txn.find::<ProductLine>(|l| l.product == product.id)
            .into_iter()
            .cloned(),
    );
    lines.sort_by_key(|l| l.order);
    let lines = lines
        .into_iter()
        .map(|line| line_detail(&txn, line))
        .collect::<Result<Vec<_>>>()?;

    Ok(ProductDetail {
        product,
        brand,
        category,
        category_path,
        product_type,
        attributes,
        lines,
    })
}

fn line_detail(txn: &Transaction, line: ProductLine) -> Result<LineDetail> {
    let mut images: Vec<ProductImage> = txn
        .find::<ProductImage>(|i| i.product_line == line.id)
        .into_iter()
        .cloned()
        .collect();
    images.sort_by_key(|i| i.order);
    let attributes = bound_values::<ProductLineAttributeValue>(txn, line.id)?;
    Ok(LineDetail {
        line,
        images,
        attributes,
    })
}

/// Active products filed directly under the category with `slug`, by name.
pub fn products_in_category<S: DataStore>(store: &S, slug: &str) -> Result<Vec<Product>> {
    let txn = store.begin()?;
    let category = txn
        .find::<Category>(|c| c.slug == slug)
        .first()
        .map(|c| c.id)
        .ok_or_else(|| CatalogError::not_found(EntityKind::Category, slug))?;
    let mut products = active_subset(
        txn.find::<Product>(|p| p.category == Some(category))
            .into_iter()
            .cloned(),
    );
    products.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(products)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::bindings::{create_binding, CarrierKind};
    use crate::commands::listing::{set_active, ActiveKind};
    use crate::commands::products::{update_product, ProductUpdate};
    use crate::commands::siblings::{create_image, NewProductImage};
    use crate::store::fixtures::StoreFixture;

    fn storefront() -> StoreFixture {
        let f = StoreFixture::new()
            .with_category("Shoes", None, true)
            .with_category("Sneakers", Some("Shoes"), true)
            .with_brand("Acme")
            .with_product("Runner", "runner", "Shoe")
            .with_line("runner", "R2", 2)
            .with_line("runner", "R1", 1)
            .with_line("runner", "R3", 3)
            .with_attribute("Color", &["Red"]);
        let runner = f.product("runner").id;
        update_product(
            &f.store,
            runner,
            ProductUpdate {
                brand: Some(Some(f.brand("Acme").id)),
                category: Some(Some(f.category("Sneakers").id)),
                ..Default::default()
            },
        )
        .unwrap();
        f
    }

    #[test]
    fn detail_shows_active_lines_in_order() {
        let f = storefront();
        set_active(&f.store, ActiveKind::ProductLine, f.line("R3").id, false).unwrap();
        let r1 = f.line("R1").id;
        create_image(&f.store, r1, NewProductImage::new("b.png")).unwrap();
        create_image(&f.store, r1, NewProductImage::new("a.png")).unwrap();
        create_binding(
            &f.store,
            CarrierKind::ProductLine,
            r1,
            f.attribute_value("Color", "Red").id,
        )
        .unwrap();

        let detail = product_detail(&f.store, "runner").unwrap();
        let skus: Vec<&str> = detail.lines.iter().map(|l| l.line.sku.as_str()).collect();
        assert_eq!(skus, vec!["R1", "R2"]);
        assert_eq!(detail.brand.map(|b| b.name), Some("Acme".to_string()));
        assert_eq!(detail.category_path, vec!["Shoes", "Sneakers"]);
        assert_eq!(detail.product_type.name, "Shoe");

        let first = &detail.lines[0];
        let urls: Vec<&str> = first.images.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["b.png", "a.png"]);
        assert_eq!(first.attributes[0].value.value, "Red");
    }

    #[test]
    fn inactive_product_is_not_found() {
        let f = storefront();
        set_active(&f.store, ActiveKind::Product, f.product("runner").id, false).unwrap();
        assert!(matches!(
            product_detail(&f.store, "runner").unwrap_err(),
            CatalogError::NotFound { .. }
        ));
    }

    #[test]
    fn category_lists_only_direct_active_products() {
        let f = storefront().with_product("Walker", "walker", "Shoe");
        update_product(
            &f.store,
            f.product("walker").id,
            ProductUpdate {
                category: Some(Some(f.category("Shoes").id)),
                ..Default::default()
            },
        )
        .unwrap();

        let names = |slug: &str| -> Vec<String> {
            products_in_category(&f.store, slug)
                .unwrap()
                .into_iter()
                .map(|p| p.name)
                .collect()
        };
        assert_eq!(names("sneakers"), vec!["Runner"]);
        assert_eq!(names("shoes"), vec!["Walker"]);
        assert!(products_in_category(&f.store, "boots").is_err());
    }
}

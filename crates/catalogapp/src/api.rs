//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single entry
//! point for catalog operations, whatever the client.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Checks the schema once**: [`CatalogApi::new`] runs [`validate_schema`], so no
//!   operation can run against a bad ordinal or relation declaration
//! - **Dispatches** to the appropriate command function
//! - **Returns structured types**: records, reports and views, never strings
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: That belongs in `commands/*.rs`
//! - **I/O operations**: No stdout, stderr, or formatting
//! - **Retries**: a `Conflict` is returned as is; see [`CatalogError::is_retryable`]
//!
//! ## Generic Over DataStore
//!
//! `CatalogApi<S: DataStore>` is generic over the storage backend:
//! - Production: `CatalogApi<FileStore>`
//! - Testing: `CatalogApi<InMemoryStore>`
//!
//! Every method takes `&self`. The store serializes commits, so one API value may be
//! shared between threads when `S` allows it.
//!
//! [`CatalogError::is_retryable`]: crate::error::CatalogError::is_retryable

use crate::commands::attributes;
use crate::commands::bindings::{self, BindingRecord, BoundValue, CarrierKind};
use crate::commands::detail::{self, ProductDetail};
use crate::commands::doctor::{self, DoctorReport};
use crate::commands::listing::{self, ActiveKind, ListFilter, Listing};
use crate::commands::products::{self, NewProduct, ProductUpdate};
use crate::commands::siblings::{
    self, ImageUpdate, LineUpdate, NewProductImage, NewProductLine, Sibling, SiblingPayload,
};
use crate::commands::tree_nodes::{self, TreeEntry, TreeKind};
use crate::error::Result;
use crate::model::{
    Attribute, AttributeValue, Brand, Product, ProductImage, ProductLine, ProductTypeAttribute,
};
use crate::schema::validate_schema;
use crate::store::{DataStore, DeleteReport};
use std::path::PathBuf;
use uuid::Uuid;

/// The main API facade for catalog operations.
pub struct CatalogApi<S: DataStore> {
    store: S,
}

impl<S: DataStore> CatalogApi<S> {
    /// Wraps `store` after checking the static schema declarations.
    pub fn new(store: S) -> Result<Self> {
        validate_schema()?;
        Ok(Self { store })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn location(&self) -> PathBuf {
        self.store.location()
    }

    // --- Siblings ---

    pub fn create_sibling(&self, payload: SiblingPayload, scope_key: Uuid) -> Result<Sibling> {
        siblings::create_sibling(&self.store, payload, scope_key)
    }

    pub fn create_line(&self, product: Uuid, new: NewProductLine) -> Result<ProductLine> {
        siblings::create_line(&self.store, product, new)
    }

    pub fn create_image(&self, product_line: Uuid, new: NewProductImage) -> Result<ProductImage> {
        siblings::create_image(&self.store, product_line, new)
    }

    pub fn update_product_line(&self, id: Uuid, update: LineUpdate) -> Result<ProductLine> {
        siblings::update_product_line(&self.store, id, update)
    }

    pub fn update_product_image(&self, id: Uuid, update: ImageUpdate) -> Result<ProductImage> {
        siblings::update_product_image(&self.store, id, update)
    }

    pub fn delete_product_line(&self, id: Uuid) -> Result<DeleteReport> {
        siblings::delete_product_line(&self.store, id)
    }

    pub fn delete_product_image(&self, id: Uuid) -> Result<DeleteReport> {
        siblings::delete_product_image(&self.store, id)
    }

    pub fn product_lines(&self, product: Uuid) -> Result<Vec<ProductLine>> {
        siblings::product_lines(&self.store, product)
    }

    pub fn lookup_line(&self, key: &str) -> Result<ProductLine> {
        siblings::lookup_line(&self.store, key)
    }

    // --- Bindings ---

    pub fn create_binding(
        &self,
        carrier_kind: CarrierKind,
        carrier: Uuid,
        attribute_value: Uuid,
    ) -> Result<BindingRecord> {
        bindings::create_binding(&self.store, carrier_kind, carrier, attribute_value)
    }

    pub fn rebind(
        &self,
        carrier_kind: CarrierKind,
        binding: Uuid,
        attribute_value: Uuid,
    ) -> Result<BindingRecord> {
        bindings::rebind(&self.store, carrier_kind, binding, attribute_value)
    }

    pub fn delete_binding(&self, carrier_kind: CarrierKind, binding: Uuid) -> Result<DeleteReport> {
        bindings::delete_binding(&self.store, carrier_kind, binding)
    }

    pub fn carrier_values(&self, carrier_kind: CarrierKind, carrier: Uuid) -> Result<Vec<BoundValue>> {
        bindings::carrier_values(&self.store, carrier_kind, carrier)
    }

    // --- Trees ---

    pub fn add_tree_node(
        &self,
        kind: TreeKind,
        name: &str,
        slug: Option<&str>,
        parent: Option<Uuid>,
    ) -> Result<TreeEntry> {
        tree_nodes::add_tree_node(&self.store, kind, name, slug, parent)
    }

    pub fn rename_tree_node(&self, kind: TreeKind, id: Uuid, new_name: &str) -> Result<TreeEntry> {
        tree_nodes::rename_tree_node(&self.store, kind, id, new_name)
    }

    pub fn move_tree_node(&self, kind: TreeKind, id: Uuid, parent: Option<Uuid>) -> Result<TreeEntry> {
        tree_nodes::move_tree_node(&self.store, kind, id, parent)
    }

    pub fn delete_tree_node(&self, kind: TreeKind, id: Uuid) -> Result<DeleteReport> {
        tree_nodes::delete_tree_node(&self.store, kind, id)
    }

    pub fn list_tree_children(&self, kind: TreeKind, parent: Option<Uuid>) -> Result<Vec<TreeEntry>> {
        tree_nodes::list_tree_children(&self.store, kind, parent)
    }

    pub fn lookup_tree_node(&self, kind: TreeKind, key: &str) -> Result<TreeEntry> {
        tree_nodes::lookup_tree_node(&self.store, kind, key)
    }

    pub fn tree_path(&self, kind: TreeKind, id: Uuid) -> Result<Vec<String>> {
        tree_nodes::tree_path(&self.store, kind, id)
    }

    // --- Brands and products ---

    pub fn create_brand(&self, name: &str, is_active: bool) -> Result<Brand> {
        products::create_brand(&self.store, name, is_active)
    }

    pub fn delete_brand(&self, id: Uuid) -> Result<DeleteReport> {
        products::delete_brand(&self.store, id)
    }

    pub fn lookup_brand(&self, key: &str) -> Result<Brand> {
        products::lookup_brand(&self.store, key)
    }

    pub fn create_product(&self, new: NewProduct) -> Result<Product> {
        products::create_product(&self.store, new)
    }

    pub fn update_product(&self, id: Uuid, update: ProductUpdate) -> Result<Product> {
        products::update_product(&self.store, id, update)
    }

    pub fn delete_product(&self, id: Uuid) -> Result<DeleteReport> {
        products::delete_product(&self.store, id)
    }

    pub fn lookup_product(&self, key: &str) -> Result<Product> {
        products::lookup_product(&self.store, key)
    }

    // --- Attributes ---

    pub fn create_attribute(&self, name: &str, description: &str) -> Result<Attribute> {
        attributes::create_attribute(&self.store, name, description)
    }

    pub fn create_attribute_value(&self, attribute: Uuid, value: &str) -> Result<AttributeValue> {
        attributes::create_attribute_value(&self.store, attribute, value)
    }

    pub fn delete_attribute(&self, id: Uuid) -> Result<DeleteReport> {
        attributes::delete_attribute(&self.store, id)
    }

    pub fn delete_attribute_value(&self, id: Uuid) -> Result<DeleteReport> {
        attributes::delete_attribute_value(&self.store, id)
    }

    pub fn link_type_attribute(
        &self,
        product_type: Uuid,
        attribute: Uuid,
    ) -> Result<ProductTypeAttribute> {
        attributes::link_type_attribute(&self.store, product_type, attribute)
    }

    pub fn type_attributes(&self, product_type: Uuid) -> Result<Vec<Attribute>> {
        attributes::type_attributes(&self.store, product_type)
    }

    pub fn attribute_values(&self, attribute: Uuid) -> Result<Vec<AttributeValue>> {
        attributes::attribute_values(&self.store, attribute)
    }

    pub fn lookup_attribute(&self, key: &str) -> Result<Attribute> {
        attributes::lookup_attribute(&self.store, key)
    }

    pub fn lookup_attribute_value(&self, attribute: &str, value: &str) -> Result<AttributeValue> {
        attributes::lookup_attribute_value(&self.store, attribute, value)
    }

    // --- Reads ---

    pub fn list_active(&self, kind: ActiveKind, filters: &[ListFilter]) -> Result<Listing> {
        listing::list_active(&self.store, kind, filters)
    }

    pub fn set_active(&self, kind: ActiveKind, id: Uuid, active: bool) -> Result<bool> {
        listing::set_active(&self.store, kind, id, active)
    }

    pub fn product_detail(&self, slug: &str) -> Result<ProductDetail> {
        detail::product_detail(&self.store, slug)
    }

    pub fn products_in_category(&self, slug: &str) -> Result<Vec<Product>> {
        detail::products_in_category(&self.store, slug)
    }

    pub fn doctor(&self) -> Result<DoctorReport> {
        doctor::run(&self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use rust_decimal::Decimal;

    fn api() -> CatalogApi<InMemoryStore> {
        CatalogApi::new(InMemoryStore::new()).unwrap()
    }

    #[test]
    fn new_accepts_the_built_in_schema() {
        let api = api();
        assert_eq!(api.location(), PathBuf::from("memory://catalog"));
    }

    #[test]
    fn siblings_are_numbered_through_the_facade() {
        let api = api();
        let shoe = api
            .add_tree_node(TreeKind::ProductType, "Shoe", None, None)
            .unwrap();
        let product = api.create_product(NewProduct::new("Runner", shoe.id)).unwrap();

        let first = api
            .create_sibling(
                SiblingPayload::Line(NewProductLine::new("R1", Decimal::new(1000, 2))),
                product.id,
            )
            .unwrap();
        let second = api
            .create_line(product.id, NewProductLine::new("R2", Decimal::new(1000, 2)))
            .unwrap();

        match first {
            Sibling::Line(line) => assert_eq!(line.order, 1),
            other => panic!("expected a line, got {other:?}"),
        }
        assert_eq!(second.order, 2);
        assert_eq!(api.product_lines(product.id).unwrap().len(), 2);
    }

    #[test]
    fn doctor_on_empty_store_is_clean() {
        let report = api().doctor().unwrap();
        assert!(report.is_clean());
        assert_eq!(report.revision, 0);
    }
}

use super::catalog_store::CatalogStore;
use super::mem_backend::MemBackend;

pub type InMemoryStore = CatalogStore<MemBackend>;

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        CatalogStore::with_backend(MemBackend::new())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::{
        Attribute, AttributeValue, Brand, Category, Product, ProductLine, ProductType,
    };
    use crate::store::{DataStore, Record, Transaction};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    /// Builder for a populated in-memory store. Each `with_*` call commits.
    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
            }
        }

        fn write(self, f: impl FnOnce(&mut Transaction)) -> Self {
            let mut txn = self.store.begin().unwrap();
            f(&mut txn);
            self.store.commit(txn).unwrap();
            self
        }

        fn read<T>(&self, f: impl FnOnce(&Transaction) -> T) -> T {
            let txn = self.store.begin().unwrap();
            f(&txn)
        }

        pub fn with_category(self, name: &str, parent: Option<&str>, active: bool) -> Self {
            let parent = parent.map(|p| self.category(p).id);
            self.write(|txn| {
                let mut category = Category::new(name, crate::validation::slugify(name));
                category.parent = parent;
                category.is_active = active;
                txn.create(category).unwrap();
            })
        }

        pub fn with_product_type(self, name: &str, parent: Option<&str>) -> Self {
            let parent = parent.map(|p| self.product_type(p).id);
            self.write(|txn| {
                let mut product_type = ProductType::new(name);
                product_type.parent = parent;
                product_type.is_active = true;
                txn.create(product_type).unwrap();
            })
        }

        pub fn with_brand(self, name: &str) -> Self {
            self.write(|txn| {
                let mut brand = Brand::new(name);
                brand.is_active = true;
                txn.create(brand).unwrap();
            })
        }

        /// Adds an active product, creating its product type on first use.
        pub fn with_product(self, name: &str, slug: &str, type_name: &str) -> Self {
            let existing = self.find_product_type(type_name);
            self.write(|txn| {
                let type_id = match existing {
                    Some(id) => id,
                    None => {
                        let mut product_type = ProductType::new(type_name);
                        product_type.is_active = true;
                        txn.create(product_type).unwrap()
                    }
                };
                let mut product = Product::new(name, slug, type_id);
                product.is_active = true;
                txn.create(product).unwrap();
            })
        }

        /// Adds an active line with an explicit ordinal.
        pub fn with_line(self, product_slug: &str, sku: &str, order: u32) -> Self {
            let product = self.product(product_slug);
            self.write(|txn| {
                txn.create(ProductLine {
                    id: Uuid::new_v4(),
                    product: product.id,
                    product_type: product.product_type,
                    sku: sku.to_string(),
                    price: Decimal::new(1000, 2),
                    stock_qty: 10,
                    is_active: true,
                    order,
                })
                .unwrap();
            })
        }

        pub fn with_attribute(self, name: &str, values: &[&str]) -> Self {
            self.write(|txn| {
                let attribute = Attribute::new(name, "");
                let attribute_id = txn.create(attribute).unwrap();
                for value in values {
                    txn.create(AttributeValue::new(attribute_id, *value))
                        .unwrap();
                }
            })
        }

        fn find_product_type(&self, name: &str) -> Option<Uuid> {
            self.read(|txn| {
                txn.find::<ProductType>(|t| t.name == name)
                    .first()
                    .map(|t| t.id())
            })
        }

        fn one<R: Record>(&self, what: &str, predicate: impl Fn(&R) -> bool) -> R {
            self.read(|txn| {
                txn.find::<R>(predicate)
                    .first()
                    .map(|r| (*r).clone())
                    .unwrap_or_else(|| panic!("fixture has no {} '{}'", R::KIND, what))
            })
        }

        pub fn category(&self, name: &str) -> Category {
            self.one(name, |c: &Category| c.name == name)
        }

        pub fn product_type(&self, name: &str) -> ProductType {
            self.one(name, |t: &ProductType| t.name == name)
        }

        pub fn brand(&self, name: &str) -> Brand {
            self.one(name, |b: &Brand| b.name == name)
        }

        pub fn product(&self, slug: &str) -> Product {
            self.one(slug, |p: &Product| p.slug == slug)
        }

        pub fn line(&self, sku: &str) -> ProductLine {
            self.one(sku, |l: &ProductLine| l.sku == sku)
        }

        pub fn attribute(&self, name: &str) -> Attribute {
            self.one(name, |a: &Attribute| a.name == name)
        }

        pub fn attribute_value(&self, attribute: &str, value: &str) -> AttributeValue {
            let attribute = self.attribute(attribute).id;
            self.one(value, |v: &AttributeValue| {
                v.attribute == attribute && v.value == value
            })
        }
    }
}

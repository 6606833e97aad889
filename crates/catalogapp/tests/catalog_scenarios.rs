use catalogapp::api::CatalogApi;
use catalogapp::commands::bindings::CarrierKind;
use catalogapp::commands::listing::{ActiveKind, Listing};
use catalogapp::commands::products::NewProduct;
use catalogapp::commands::siblings::{NewProductLine, Sibling, SiblingPayload};
use catalogapp::commands::tree_nodes::TreeKind;
use catalogapp::error::CatalogError;
use catalogapp::model::{Product, ProductLine};
use catalogapp::store::FileStore;
use rust_decimal::Decimal;
use std::fs;
use tempfile::TempDir;

fn setup() -> (TempDir, CatalogApi<FileStore>) {
    let dir = TempDir::new().unwrap();
    let api = CatalogApi::new(FileStore::open(dir.path().to_path_buf())).unwrap();
    (dir, api)
}

fn product(api: &CatalogApi<FileStore>) -> Product {
    let shoe = api
        .add_tree_node(TreeKind::ProductType, "Shoe", None, None)
        .unwrap();
    api.create_product(NewProduct::new("Runner", shoe.id)).unwrap()
}

fn line(api: &CatalogApi<FileStore>, product: &Product, sku: &str) -> ProductLine {
    match api
        .create_sibling(
            SiblingPayload::Line(NewProductLine::new(sku, Decimal::new(4999, 2))),
            product.id,
        )
        .unwrap()
    {
        Sibling::Line(line) => line,
        other => panic!("expected a line, got {other:?}"),
    }
}

#[test]
fn lines_are_numbered_from_one() {
    let (_dir, api) = setup();
    let runner = product(&api);

    assert_eq!(line(&api, &runner, "L1").order, 1);
    assert_eq!(line(&api, &runner, "L2").order, 2);
}

#[test]
fn explicit_duplicate_ordinal_is_rejected() {
    let (_dir, api) = setup();
    let runner = product(&api);
    line(&api, &runner, "L1");
    line(&api, &runner, "L2");

    let err = api
        .create_line(
            runner.id,
            NewProductLine::new("L3", Decimal::new(4999, 2)).with_order(1),
        )
        .unwrap_err();
    assert!(matches!(err, CatalogError::DuplicateOrderValue { order: 1, .. }));
    assert_eq!(api.product_lines(runner.id).unwrap().len(), 2);
}

#[test]
fn one_color_per_line_and_rebinding_is_idempotent() {
    let (_dir, api) = setup();
    let runner = product(&api);
    let l1 = line(&api, &runner, "L1");
    let color = api.create_attribute("Color", "").unwrap();
    let red = api.create_attribute_value(color.id, "Red").unwrap();
    let blue = api.create_attribute_value(color.id, "Blue").unwrap();

    api.create_binding(CarrierKind::ProductLine, l1.id, red.id)
        .unwrap();
    let err = api
        .create_binding(CarrierKind::ProductLine, l1.id, blue.id)
        .unwrap_err();
    assert!(matches!(err, CatalogError::DuplicateAttributeBinding { .. }));
    let again = api
        .create_binding(CarrierKind::ProductLine, l1.id, red.id)
        .unwrap();
    assert!(!again.created);
}

#[test]
fn inactive_child_is_listed_as_child_but_not_as_active() {
    let (_dir, api) = setup();
    let shoes = api
        .add_tree_node(TreeKind::Category, "Shoes", None, None)
        .unwrap();
    api.set_active(ActiveKind::Category, shoes.id, true).unwrap();
    api.add_tree_node(TreeKind::Category, "Sneakers", None, Some(shoes.id))
        .unwrap();

    match api.list_active(ActiveKind::Category, &[]).unwrap() {
        Listing::Categories(active) => {
            let names: Vec<&str> = active.iter().map(|c| c.name.as_str()).collect();
            assert_eq!(names, vec!["Shoes"]);
        }
        other => panic!("unexpected listing {other:?}"),
    }
    let children = api
        .list_tree_children(TreeKind::Category, Some(shoes.id))
        .unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name, "Sneakers");
}

#[test]
fn protected_parent_delete_leaves_the_file_untouched() {
    let (dir, api) = setup();
    let shoes = api
        .add_tree_node(TreeKind::Category, "Shoes", None, None)
        .unwrap();
    api.add_tree_node(TreeKind::Category, "Sneakers", None, Some(shoes.id))
        .unwrap();
    let before = fs::read_to_string(dir.path().join("catalog.json")).unwrap();

    let err = api.delete_tree_node(TreeKind::Category, shoes.id).unwrap_err();
    assert!(matches!(err, CatalogError::ProtectedDelete { .. }));

    let after = fs::read_to_string(dir.path().join("catalog.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn names_are_unique_across_the_whole_tree() {
    let (_dir, api) = setup();
    let shoes = api
        .add_tree_node(TreeKind::Category, "Shoes", None, None)
        .unwrap();
    let apparel = api
        .add_tree_node(TreeKind::Category, "Apparel", None, None)
        .unwrap();
    api.add_tree_node(TreeKind::Category, "Sale", None, Some(shoes.id))
        .unwrap();

    let err = api
        .add_tree_node(TreeKind::Category, "Sale", Some("apparel-sale"), Some(apparel.id))
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::UniqueConstraintViolation { field: "name", .. }
    ));
}

#[test]
fn reparenting_under_a_descendant_is_a_cycle() {
    let (_dir, api) = setup();
    let a = api.add_tree_node(TreeKind::ProductType, "A", None, None).unwrap();
    let b = api
        .add_tree_node(TreeKind::ProductType, "B", None, Some(a.id))
        .unwrap();
    let c = api
        .add_tree_node(TreeKind::ProductType, "C", None, Some(b.id))
        .unwrap();

    let err = api
        .move_tree_node(TreeKind::ProductType, a.id, Some(c.id))
        .unwrap_err();
    assert!(matches!(err, CatalogError::Cycle { .. }));
    assert_eq!(api.tree_path(TreeKind::ProductType, c.id).unwrap(), vec!["A", "B", "C"]);
}

#[test]
fn deleting_a_line_takes_its_images_and_bindings() {
    let (_dir, api) = setup();
    let runner = product(&api);
    let l1 = line(&api, &runner, "L1");
    let size = api.create_attribute("Size", "").unwrap();
    let large = api.create_attribute_value(size.id, "L").unwrap();
    api.create_binding(CarrierKind::ProductLine, l1.id, large.id)
        .unwrap();
    api.create_image(
        l1.id,
        catalogapp::commands::siblings::NewProductImage::new("front.png"),
    )
    .unwrap();

    let report = api.delete_product_line(l1.id).unwrap();
    assert_eq!(report.deleted.len(), 3);
    assert!(api.doctor().unwrap().is_clean());
    // The value is free again.
    api.delete_attribute_value(large.id).unwrap();
}

//! Command handlers for the catalog CLI.
//!
//! A handler turns one parsed subcommand into API calls and returns an [`Output`]. It
//! resolves the human keys typed on the command line (names, slugs, skus) to ids, and
//! never prints. Printing is left to `render.rs` (text) or serde (JSON).
//!
//! Every handler may run more than once: when a commit loses a race with another
//! writer, [`AppState::retrying`] runs the whole handler again against fresh data.

use super::setup::{
    AttributeCommands, BindArgs, BrandCommands, Commands, ImageCommands, LineCommands,
    ProductAddArgs, ProductCommands, TreeCommands,
};
use anyhow::Result;
use catalogapp::api::CatalogApi;
use catalogapp::commands::bindings::{BindingRecord, CarrierKind};
use catalogapp::commands::detail::ProductDetail;
use catalogapp::commands::doctor::DoctorReport;
use catalogapp::commands::listing::{ActiveKind, ListFilter, Listing};
use catalogapp::commands::products::{NewProduct, ProductUpdate};
use catalogapp::commands::siblings::{LineUpdate, NewProductImage, NewProductLine};
use catalogapp::commands::tree_nodes::{TreeEntry, TreeKind};
use catalogapp::error::CatalogError;
use catalogapp::model::{
    Attribute, AttributeValue, Brand, EntityKind, Product, ProductImage, ProductLine,
    ProductTypeAttribute,
};
use catalogapp::store::{DeleteReport, FileStore};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

/// What a command produced, ready for either renderer.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Output {
    Node(TreeEntry),
    Nodes(Vec<TreeEntry>),
    Path(Vec<String>),
    Brand(Brand),
    Product(Product),
    Products(Vec<Product>),
    Detail(Box<ProductDetail>),
    Line(ProductLine),
    Image(ProductImage),
    Attribute(Attribute),
    Value(AttributeValue),
    TypeLink(ProductTypeAttribute),
    Binding(BindingRecord),
    Deleted(DeleteReport),
    Listing(Listing),
    Toggled(Toggle),
    Doctor(DoctorReport),
}

#[derive(Debug, Serialize)]
pub struct Toggle {
    pub kind: ActiveKind,
    pub id: Uuid,
    pub name: String,
    pub was_active: bool,
    pub is_active: bool,
}

/// Shared state handed to every handler.
pub struct AppState {
    pub api: CatalogApi<FileStore>,
    conflict_retries: u32,
}

impl AppState {
    pub fn new(api: CatalogApi<FileStore>, conflict_retries: u32) -> Self {
        Self {
            api,
            conflict_retries,
        }
    }

    /// Runs `op`, re-running it while it fails with a retryable error, up to the
    /// configured number of extra attempts.
    pub fn retrying<T>(&self, mut op: impl FnMut(&CatalogApi<FileStore>) -> Result<T>) -> Result<T> {
        let mut attempt = 0;
        loop {
            match op(&self.api) {
                Err(err) if attempt < self.conflict_retries && is_retryable(&err) => {
                    attempt += 1;
                    warn!(attempt, error = %err, "commit lost a race, retrying");
                }
                other => return other,
            }
        }
    }
}

fn is_retryable(err: &anyhow::Error) -> bool {
    err.downcast_ref::<CatalogError>()
        .is_some_and(CatalogError::is_retryable)
}

pub fn dispatch(state: &AppState, command: &Commands) -> Result<Output> {
    debug!(?command, "dispatching");
    state.retrying(|api| match command {
        Commands::Category { action } => tree(api, TreeKind::Category, action),
        Commands::ProductType { action } => tree(api, TreeKind::ProductType, action),
        Commands::Brand { action } => brand(api, action),
        Commands::Product { action } => product(api, action),
        Commands::Line { action } => line(api, action),
        Commands::Image { action } => image(api, action),
        Commands::Attribute { action } => attribute(api, action),
        Commands::Bind(args) => bind(api, args),
        Commands::Unbind {
            carrier_kind,
            carrier,
            attribute,
        } => unbind(api, *carrier_kind, carrier, attribute),
        Commands::List { kind, filters } => {
            let filters: Vec<ListFilter> = filters
                .iter()
                .map(|(field, id)| ListFilter::new(field.clone(), *id))
                .collect();
            Ok(Output::Listing(api.list_active(*kind, &filters)?))
        }
        Commands::Doctor => Ok(Output::Doctor(api.doctor()?)),
    })
}

fn tree_active_kind(kind: TreeKind) -> ActiveKind {
    match kind {
        TreeKind::Category => ActiveKind::Category,
        TreeKind::ProductType => ActiveKind::ProductType,
    }
}

fn tree(api: &CatalogApi<FileStore>, kind: TreeKind, action: &TreeCommands) -> Result<Output> {
    let node = |key: &str| api.lookup_tree_node(kind, key);
    let out = match action {
        TreeCommands::Add { name, slug, parent } => {
            let parent = parent.as_deref().map(node).transpose()?.map(|p| p.id);
            Output::Node(api.add_tree_node(kind, name, slug.as_deref(), parent)?)
        }
        TreeCommands::Rename { node: key, new_name } => {
            let entry = node(key)?;
            Output::Node(api.rename_tree_node(kind, entry.id, new_name)?)
        }
        TreeCommands::Move { node: key, parent } => {
            let entry = node(key)?;
            let parent = parent.as_deref().map(node).transpose()?.map(|p| p.id);
            Output::Node(api.move_tree_node(kind, entry.id, parent)?)
        }
        TreeCommands::Delete { node: key } => {
            let entry = node(key)?;
            Output::Deleted(api.delete_tree_node(kind, entry.id)?)
        }
        TreeCommands::Children { node: key } => {
            let parent = key.as_deref().map(node).transpose()?.map(|p| p.id);
            Output::Nodes(api.list_tree_children(kind, parent)?)
        }
        TreeCommands::Path { node: key } => {
            let entry = node(key)?;
            Output::Path(api.tree_path(kind, entry.id)?)
        }
        TreeCommands::Activate { node: key } | TreeCommands::Deactivate { node: key } => {
            let entry = node(key)?;
            let active = matches!(action, TreeCommands::Activate { .. });
            toggle(api, tree_active_kind(kind), entry.id, entry.name, active)?
        }
    };
    Ok(out)
}

fn toggle(
    api: &CatalogApi<FileStore>,
    kind: ActiveKind,
    id: Uuid,
    name: String,
    active: bool,
) -> Result<Output> {
    let was_active = api.set_active(kind, id, active)?;
    Ok(Output::Toggled(Toggle {
        kind,
        id,
        name,
        was_active,
        is_active: active,
    }))
}

fn brand(api: &CatalogApi<FileStore>, action: &BrandCommands) -> Result<Output> {
    match action {
        BrandCommands::Add { name, active } => Ok(Output::Brand(api.create_brand(name, *active)?)),
        BrandCommands::Delete { brand } => {
            let brand = api.lookup_brand(brand)?;
            Ok(Output::Deleted(api.delete_brand(brand.id)?))
        }
    }
}

fn product(api: &CatalogApi<FileStore>, action: &ProductCommands) -> Result<Output> {
    match action {
        ProductCommands::Add(args) => add_product(api, args),
        ProductCommands::Update {
            product,
            name,
            slug,
            product_type,
            description,
        } => {
            let product = api.lookup_product(product)?;
            let product_type = product_type
                .as_deref()
                .map(|key| api.lookup_tree_node(TreeKind::ProductType, key))
                .transpose()?;
            let update = ProductUpdate {
                name: name.clone(),
                slug: slug.clone(),
                product_type: product_type.map(|t| t.id),
                description: description.clone(),
                ..ProductUpdate::default()
            };
            Ok(Output::Product(api.update_product(product.id, update)?))
        }
        ProductCommands::Show { slug } => Ok(Output::Detail(Box::new(api.product_detail(slug)?))),
        ProductCommands::Browse { category_slug } => {
            Ok(Output::Products(api.products_in_category(category_slug)?))
        }
        ProductCommands::Delete { product } => {
            let product = api.lookup_product(product)?;
            Ok(Output::Deleted(api.delete_product(product.id)?))
        }
        ProductCommands::Activate { product } | ProductCommands::Deactivate { product } => {
            let product = api.lookup_product(product)?;
            let active = matches!(action, ProductCommands::Activate { .. });
            toggle(api, ActiveKind::Product, product.id, product.name, active)
        }
    }
}

fn add_product(api: &CatalogApi<FileStore>, args: &ProductAddArgs) -> Result<Output> {
    let product_type = api.lookup_tree_node(TreeKind::ProductType, &args.product_type)?;
    let brand = args
        .brand
        .as_deref()
        .map(|key| api.lookup_brand(key))
        .transpose()?;
    let category = args
        .category
        .as_deref()
        .map(|key| api.lookup_tree_node(TreeKind::Category, key))
        .transpose()?;

    let mut new = NewProduct::new(args.name.clone(), product_type.id);
    new.slug = args.slug.clone();
    new.description = args.description.clone();
    new.is_digital = args.digital;
    new.is_active = args.active;
    new.brand = brand.map(|b| b.id);
    new.category = category.map(|c| c.id);
    Ok(Output::Product(api.create_product(new)?))
}

fn line(api: &CatalogApi<FileStore>, action: &LineCommands) -> Result<Output> {
    match action {
        LineCommands::Add {
            product,
            sku,
            price,
            stock,
            order,
            inactive,
        } => {
            let product = api.lookup_product(product)?;
            let mut new = NewProductLine::new(sku.clone(), *price).with_stock(*stock);
            if let Some(order) = order {
                new = new.with_order(*order);
            }
            new.is_active = !inactive;
            Ok(Output::Line(api.create_line(product.id, new)?))
        }
        LineCommands::Update {
            line,
            sku,
            price,
            stock,
            order,
        } => {
            let line = api.lookup_line(line)?;
            let update = LineUpdate {
                sku: sku.clone(),
                price: *price,
                stock_qty: *stock,
                order: *order,
                ..LineUpdate::default()
            };
            Ok(Output::Line(api.update_product_line(line.id, update)?))
        }
        LineCommands::Delete { line } => {
            let line = api.lookup_line(line)?;
            Ok(Output::Deleted(api.delete_product_line(line.id)?))
        }
        LineCommands::Activate { line } | LineCommands::Deactivate { line } => {
            let line = api.lookup_line(line)?;
            let active = matches!(action, LineCommands::Activate { .. });
            toggle(api, ActiveKind::ProductLine, line.id, line.sku, active)
        }
    }
}

fn image(api: &CatalogApi<FileStore>, action: &ImageCommands) -> Result<Output> {
    match action {
        ImageCommands::Add {
            line,
            url,
            alt,
            order,
        } => {
            let line = api.lookup_line(line)?;
            let mut new = NewProductImage::new(url.clone());
            new.alternative_text = alt.clone();
            new.order = *order;
            Ok(Output::Image(api.create_image(line.id, new)?))
        }
        ImageCommands::Delete { image } => Ok(Output::Deleted(api.delete_product_image(*image)?)),
    }
}

fn attribute(api: &CatalogApi<FileStore>, action: &AttributeCommands) -> Result<Output> {
    match action {
        AttributeCommands::Add { name, description } => {
            Ok(Output::Attribute(api.create_attribute(name, description)?))
        }
        AttributeCommands::Value { attribute, value } => {
            let attribute = api.lookup_attribute(attribute)?;
            Ok(Output::Value(api.create_attribute_value(attribute.id, value)?))
        }
        AttributeCommands::Link {
            product_type,
            attribute,
        } => {
            let product_type = api.lookup_tree_node(TreeKind::ProductType, product_type)?;
            let attribute = api.lookup_attribute(attribute)?;
            Ok(Output::TypeLink(
                api.link_type_attribute(product_type.id, attribute.id)?,
            ))
        }
    }
}

fn carrier_id(api: &CatalogApi<FileStore>, kind: CarrierKind, key: &str) -> Result<Uuid> {
    Ok(match kind {
        CarrierKind::Product => api.lookup_product(key)?.id,
        CarrierKind::ProductLine => api.lookup_line(key)?.id,
    })
}

fn bind(api: &CatalogApi<FileStore>, args: &BindArgs) -> Result<Output> {
    let carrier = carrier_id(api, args.carrier_kind, &args.carrier)?;
    let value = api.lookup_attribute_value(&args.attribute, &args.value)?;
    Ok(Output::Binding(
        api.create_binding(args.carrier_kind, carrier, value.id)?,
    ))
}

fn unbind(
    api: &CatalogApi<FileStore>,
    kind: CarrierKind,
    carrier: &str,
    attribute: &str,
) -> Result<Output> {
    let carrier_id = carrier_id(api, kind, carrier)?;
    let attribute = api.lookup_attribute(attribute)?;
    let bound = api
        .carrier_values(kind, carrier_id)?
        .into_iter()
        .find(|bv| bv.attribute.id == attribute.id)
        .ok_or_else(|| {
            CatalogError::not_found(
                EntityKind::AttributeValue,
                format!("{} on {kind} {carrier}", attribute.name),
            )
        })?;
    Ok(Output::Deleted(api.delete_binding(kind, bound.binding)?))
}

use catalogapp::commands::bindings::CarrierKind;
use catalogapp::commands::listing::ActiveKind;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "catalog",
    bin_name = "catalog",
    version,
    disable_help_subcommand = true,
    about = "Administer a product catalog: trees, products, lines and attributes",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory (defaults to $CATALOG_DATA, then the OS data directory)
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true, help_heading = "Options")]
    pub json: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the category tree
    #[command(display_order = 1)]
    Category {
        #[command(subcommand)]
        action: TreeCommands,
    },

    /// Manage the product-type tree
    #[command(name = "type", display_order = 2)]
    ProductType {
        #[command(subcommand)]
        action: TreeCommands,
    },

    /// Manage brands
    #[command(display_order = 3)]
    Brand {
        #[command(subcommand)]
        action: BrandCommands,
    },

    /// Manage products
    #[command(display_order = 4)]
    Product {
        #[command(subcommand)]
        action: ProductCommands,
    },

    /// Manage product lines (the sellable variants of a product)
    #[command(display_order = 5)]
    Line {
        #[command(subcommand)]
        action: LineCommands,
    },

    /// Manage product line images
    #[command(display_order = 6)]
    Image {
        #[command(subcommand)]
        action: ImageCommands,
    },

    /// Manage attributes and their values
    #[command(display_order = 7)]
    Attribute {
        #[command(subcommand)]
        action: AttributeCommands,
    },

    /// Bind an attribute value to a product or line
    #[command(display_order = 8)]
    Bind(BindArgs),

    /// Remove a product's or line's value for an attribute
    #[command(display_order = 9)]
    Unbind {
        /// product or line
        carrier_kind: CarrierKind,
        /// Product id/slug/pid, or line id/sku
        carrier: String,
        /// Attribute id or name
        attribute: String,
    },

    /// List active records of a kind
    #[command(alias = "ls", display_order = 10)]
    List {
        /// categories, types, brands, products or lines
        kind: ActiveKind,

        /// Only records whose reference field points at an id (e.g. product=<uuid>)
        #[arg(long = "filter", value_name = "FIELD=ID", value_parser = parse_filter)]
        filters: Vec<(String, uuid::Uuid)>,
    },

    /// Scan the data file for inconsistencies (read-only)
    #[command(display_order = 11)]
    Doctor,
}

#[derive(Subcommand, Debug)]
pub enum TreeCommands {
    /// Add a node
    Add {
        name: String,
        /// Category slug (derived from the name when omitted)
        #[arg(long)]
        slug: Option<String>,
        /// Parent node (id, name or slug)
        #[arg(long)]
        parent: Option<String>,
    },

    /// Rename a node
    Rename { node: String, new_name: String },

    /// Move a node under another parent, or to the root without --parent
    Move {
        node: String,
        #[arg(long)]
        parent: Option<String>,
    },

    /// Delete a node
    #[command(alias = "rm")]
    Delete { node: String },

    /// List the children of a node, or the roots
    Children { node: Option<String> },

    /// Show the path from the root to a node
    Path { node: String },

    /// Mark a node active
    Activate { node: String },

    /// Mark a node inactive
    Deactivate { node: String },
}

#[derive(Subcommand, Debug)]
pub enum BrandCommands {
    /// Add a brand
    Add {
        name: String,
        #[arg(long)]
        active: bool,
    },

    /// Delete a brand; its products keep existing without one
    #[command(alias = "rm")]
    Delete { brand: String },
}

#[derive(Subcommand, Debug)]
pub enum ProductCommands {
    /// Add a product
    Add(ProductAddArgs),

    /// Change a product's name, slug, type or description
    Update {
        /// Product id, slug or pid
        product: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        slug: Option<String>,
        /// Product type (id or name)
        #[arg(long = "type")]
        product_type: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    /// Show an active product with its lines, images and attributes
    Show { slug: String },

    /// List active products filed directly under a category
    Browse { category_slug: String },

    /// Delete a product (its lines must be deleted first)
    #[command(alias = "rm")]
    Delete { product: String },

    /// Mark a product active
    Activate { product: String },

    /// Mark a product inactive
    Deactivate { product: String },
}

#[derive(Args, Debug)]
pub struct ProductAddArgs {
    pub name: String,

    /// Product type (id or name)
    #[arg(long = "type")]
    pub product_type: String,

    #[arg(long)]
    pub slug: Option<String>,

    /// Brand (id or name)
    #[arg(long)]
    pub brand: Option<String>,

    /// Category (id, name or slug)
    #[arg(long)]
    pub category: Option<String>,

    #[arg(long, default_value = "")]
    pub description: String,

    #[arg(long)]
    pub digital: bool,

    #[arg(long)]
    pub active: bool,
}

#[derive(Subcommand, Debug)]
pub enum LineCommands {
    /// Add a line to a product; the ordinal is assigned unless --order is given
    Add {
        /// Product id, slug or pid
        product: String,
        sku: String,
        price: Decimal,
        #[arg(long, default_value_t = 0)]
        stock: i32,
        #[arg(long)]
        order: Option<u32>,
        #[arg(long)]
        inactive: bool,
    },

    /// Change fields of a line
    Update {
        /// Line id or sku
        line: String,
        #[arg(long)]
        sku: Option<String>,
        #[arg(long)]
        price: Option<Decimal>,
        #[arg(long)]
        stock: Option<i32>,
        #[arg(long)]
        order: Option<u32>,
    },

    /// Delete a line with its images and bindings
    #[command(alias = "rm")]
    Delete { line: String },

    /// Mark a line active
    Activate { line: String },

    /// Mark a line inactive
    Deactivate { line: String },
}

#[derive(Subcommand, Debug)]
pub enum ImageCommands {
    /// Add an image to a line
    Add {
        /// Line id or sku
        line: String,
        url: String,
        #[arg(long, default_value = "")]
        alt: String,
        #[arg(long)]
        order: Option<u32>,
    },

    /// Delete an image by id
    #[command(alias = "rm")]
    Delete { image: uuid::Uuid },
}

#[derive(Subcommand, Debug)]
pub enum AttributeCommands {
    /// Add an attribute
    Add {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Add a value to an attribute
    Value { attribute: String, value: String },

    /// Declare that a product type offers an attribute
    Link {
        /// Product type (id or name)
        product_type: String,
        attribute: String,
    },
}

#[derive(Args, Debug)]
pub struct BindArgs {
    /// product or line
    pub carrier_kind: CarrierKind,
    /// Product id/slug/pid, or line id/sku
    pub carrier: String,
    /// Attribute id or name
    pub attribute: String,
    pub value: String,
}

fn parse_filter(raw: &str) -> Result<(String, uuid::Uuid), String> {
    let (field, id) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=ID, got '{raw}'"))?;
    let id = uuid::Uuid::parse_str(id.trim()).map_err(|e| format!("bad id '{id}': {e}"))?;
    Ok((field.trim().to_string(), id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_nested_tree_command() {
        let cli = Cli::try_parse_from([
            "catalog", "--json", "category", "add", "Sneakers", "--parent", "shoes",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Category {
                action: TreeCommands::Add { name, parent, slug },
            } => {
                assert_eq!(name, "Sneakers");
                assert_eq!(parent.as_deref(), Some("shoes"));
                assert!(slug.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_price_and_kinds() {
        let cli = Cli::try_parse_from(["catalog", "line", "add", "runner", "R1", "49.99"]).unwrap();
        match cli.command {
            Commands::Line {
                action: LineCommands::Add { price, order, .. },
            } => {
                assert_eq!(price, Decimal::new(4999, 2));
                assert!(order.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }

        let cli = Cli::try_parse_from(["catalog", "list", "lines"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::List {
                kind: ActiveKind::ProductLine,
                ..
            }
        ));
    }

    #[test]
    fn filter_needs_field_and_id() {
        assert!(parse_filter("product").is_err());
        assert!(parse_filter("product=nope").is_err());
        let id = uuid::Uuid::new_v4();
        assert_eq!(
            parse_filter(&format!("product={id}")).unwrap(),
            ("product".to_string(), id)
        );
    }
}

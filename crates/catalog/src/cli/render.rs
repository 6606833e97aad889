//! Text rendering for command outputs.
//!
//! Every function here builds a `String`; nothing prints. `--json` bypasses this file
//! entirely and serializes the [`Output`] as is.

use super::handlers::{Output, Toggle};
use super::styles;
use catalogapp::commands::bindings::{BindingRecord, BoundValue};
use catalogapp::commands::detail::ProductDetail;
use catalogapp::commands::doctor::DoctorReport;
use catalogapp::commands::listing::Listing;
use catalogapp::commands::tree_nodes::TreeEntry;
use catalogapp::commands::{CmdMessage, MessageLevel};
use catalogapp::model::{Product, ProductImage, ProductLine};
use catalogapp::store::DeleteReport;
use std::fmt::Write;

pub fn render(output: &Output) -> String {
    match output {
        Output::Node(node) => tree_entry(node),
        Output::Nodes(nodes) => lines_or_empty(nodes.iter().map(tree_entry), "No nodes."),
        Output::Path(path) => path.join(" > "),
        Output::Brand(brand) => named(&brand.name, &brand.id.to_string(), brand.is_active),
        Output::Product(product) => product_row(product),
        Output::Products(products) => {
            lines_or_empty(products.iter().map(product_row), "No products.")
        }
        Output::Detail(detail) => product_detail(detail),
        Output::Line(line) => line_row(line),
        Output::Image(image) => image_row(image),
        Output::Attribute(attr) => format!(
            "{} {}",
            styles::name().apply_to(&attr.name),
            styles::id().apply_to(attr.id)
        ),
        Output::Value(value) => format!(
            "{} {}",
            styles::key().apply_to(&value.value),
            styles::id().apply_to(value.id)
        ),
        Output::TypeLink(link) => format!(
            "Linked attribute {} to type {}",
            styles::id().apply_to(link.attribute),
            styles::id().apply_to(link.product_type)
        ),
        Output::Binding(binding) => binding_row(binding),
        Output::Deleted(report) => delete_report(report),
        Output::Listing(listing) => listing_rows(listing),
        Output::Toggled(toggle) => toggled(toggle),
        Output::Doctor(report) => doctor(report),
    }
}

fn lines_or_empty(rows: impl Iterator<Item = String>, empty: &str) -> String {
    let rows: Vec<String> = rows.collect();
    if rows.is_empty() {
        styles::info().apply_to(empty).to_string()
    } else {
        rows.join("\n")
    }
}

fn named(name: &str, id: &str, active: bool) -> String {
    let name = if active {
        styles::name().apply_to(name).to_string()
    } else {
        format!(
            "{} {}",
            styles::name().apply_to(name),
            styles::inactive().apply_to("(inactive)")
        )
    };
    format!("{name} {}", styles::id().apply_to(id))
}

fn tree_entry(node: &TreeEntry) -> String {
    let mut out = named(&node.name, &node.id.to_string(), node.is_active);
    if let Some(slug) = &node.slug {
        let _ = write!(out, " {}", styles::key().apply_to(slug));
    }
    out
}

fn product_row(product: &Product) -> String {
    format!(
        "{} {}",
        named(&product.name, &product.pid, product.is_active),
        styles::key().apply_to(&product.slug)
    )
}

fn line_row(line: &ProductLine) -> String {
    let mut out = format!(
        "{:>3}. {} {}",
        styles::ordinal().apply_to(line.order),
        styles::key().apply_to(&line.sku),
        styles::price().apply_to(line.price)
    );
    let _ = write!(out, " stock {}", line.stock_qty);
    if !line.is_active {
        let _ = write!(out, " {}", styles::inactive().apply_to("(inactive)"));
    }
    out
}

fn image_row(image: &ProductImage) -> String {
    let mut out = format!(
        "{:>3}. {}",
        styles::ordinal().apply_to(image.order),
        image.url
    );
    if !image.alternative_text.is_empty() {
        let _ = write!(out, " \"{}\"", image.alternative_text);
    }
    let _ = write!(out, " {}", styles::id().apply_to(image.id));
    out
}

fn bound_value(bound: &BoundValue) -> String {
    format!(
        "{}: {}",
        styles::name().apply_to(&bound.attribute.name),
        styles::key().apply_to(&bound.value.value)
    )
}

fn binding_row(binding: &BindingRecord) -> String {
    let verb = if binding.created {
        "Bound"
    } else {
        "Already bound"
    };
    format!(
        "{verb} value {} to {} {}",
        styles::id().apply_to(binding.attribute_value),
        binding.carrier_kind,
        styles::id().apply_to(binding.carrier)
    )
}

fn product_detail(detail: &ProductDetail) -> String {
    let product = &detail.product;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}",
        styles::heading().apply_to(&product.name),
        styles::id().apply_to(&product.pid)
    );
    if let Some(brand) = &detail.brand {
        let _ = writeln!(out, "Brand: {}", brand.name);
    }
    if !detail.category_path.is_empty() {
        let _ = writeln!(out, "Category: {}", detail.category_path.join(" > "));
    }
    let _ = writeln!(out, "Type: {}", detail.product_type.name);
    if !product.description.is_empty() {
        let _ = writeln!(out, "\n{}", product.description);
    }
    for bound in &detail.attributes {
        let _ = writeln!(out, "  {}", bound_value(bound));
    }
    for line in &detail.lines {
        let _ = writeln!(out, "\n{}", line_row(&line.line));
        for bound in &line.attributes {
            let _ = writeln!(out, "       {}", bound_value(bound));
        }
        for image in &line.images {
            let _ = writeln!(out, "     {}", image_row(image));
        }
    }
    out.trim_end().to_string()
}

fn delete_report(report: &DeleteReport) -> String {
    let mut out = format!("Deleted {} record(s)", report.deleted.len());
    for record in &report.deleted {
        let _ = write!(out, "\n  {} {}", record.kind, styles::id().apply_to(record.id));
    }
    for cleared in &report.nullified {
        let _ = write!(
            out,
            "\n  cleared {}.{} on {}",
            cleared.record.kind,
            cleared.field,
            styles::id().apply_to(cleared.record.id)
        );
    }
    out
}

fn listing_rows(listing: &Listing) -> String {
    let empty = "Nothing active.";
    match listing {
        Listing::Categories(rows) => lines_or_empty(
            rows.iter()
                .map(|c| format!("{} {}", styles::name().apply_to(&c.name), styles::key().apply_to(&c.slug))),
            empty,
        ),
        Listing::ProductTypes(rows) => lines_or_empty(
            rows.iter().map(|t| styles::name().apply_to(&t.name).to_string()),
            empty,
        ),
        Listing::Brands(rows) => lines_or_empty(
            rows.iter().map(|b| styles::name().apply_to(&b.name).to_string()),
            empty,
        ),
        Listing::Products(rows) => lines_or_empty(rows.iter().map(product_row), empty),
        Listing::ProductLines(rows) => lines_or_empty(rows.iter().map(line_row), empty),
    }
}

fn toggled(toggle: &Toggle) -> String {
    let state = if toggle.is_active { "active" } else { "inactive" };
    if toggle.was_active == toggle.is_active {
        format!("{} {} was already {state}", toggle.kind, toggle.name)
    } else {
        format!("{} {} is now {state}", toggle.kind, toggle.name)
    }
}

fn message(msg: &CmdMessage) -> String {
    match msg.level {
        MessageLevel::Success => styles::success().apply_to(&msg.content).to_string(),
        MessageLevel::Warning => styles::warning().apply_to(&msg.content).to_string(),
        MessageLevel::Info => styles::info().apply_to(&msg.content).to_string(),
    }
}

fn doctor(report: &DoctorReport) -> String {
    let mut out = format!("Catalog revision {}", report.revision);
    for msg in &report.messages {
        let _ = write!(out, "\n{}", message(msg));
    }
    out
}

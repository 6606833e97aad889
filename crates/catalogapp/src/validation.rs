//! Field rules for catalog records.
//!
//! Every rule returns `CatalogError::InvalidField` naming the kind and field, so the
//! caller can report exactly what was rejected. Uniqueness is not checked here; the
//! store owns it.
//!
//! | Field | Rule |
//! |-------|------|
//! | names | non-empty, at most 100 characters |
//! | slugs | 1 to 255 ASCII letters, digits, `-` or `_` |
//! | sku | non-empty, at most 100 characters |
//! | attribute value | non-empty, at most 100 characters |
//! | price | not negative, at most 8 integer digits and 2 decimal places |

use crate::error::{CatalogError, Result};
use crate::model::EntityKind;
use rust_decimal::Decimal;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_SLUG_LEN: usize = 255;
pub const MAX_SKU_LEN: usize = 100;
pub const MAX_VALUE_LEN: usize = 100;
pub const PRICE_MAX_DIGITS: u32 = 10;
pub const PRICE_DECIMAL_PLACES: u32 = 2;

fn bounded_text(
    kind: EntityKind,
    field: &'static str,
    text: &str,
    max_len: usize,
) -> Result<()> {
    if text.trim().is_empty() {
        return Err(CatalogError::invalid(kind, field, "cannot be empty"));
    }
    let len = text.chars().count();
    if len > max_len {
        return Err(CatalogError::invalid(
            kind,
            field,
            format!("is {len} characters long, at most {max_len} allowed"),
        ));
    }
    Ok(())
}

pub fn validate_name(kind: EntityKind, name: &str) -> Result<()> {
    bounded_text(kind, "name", name, MAX_NAME_LEN)
}

pub fn validate_sku(sku: &str) -> Result<()> {
    bounded_text(EntityKind::ProductLine, "sku", sku, MAX_SKU_LEN)
}

pub fn validate_value(value: &str) -> Result<()> {
    bounded_text(EntityKind::AttributeValue, "value", value, MAX_VALUE_LEN)
}

/// Validates a URL slug.
///
/// # Examples
/// ```
/// use catalogapp::model::EntityKind;
/// use catalogapp::validation::validate_slug;
///
/// assert!(validate_slug(EntityKind::Category, "running-shoes").is_ok());
/// assert!(validate_slug(EntityKind::Category, "shoes_2").is_ok());
///
/// assert!(validate_slug(EntityKind::Category, "").is_err());
/// assert!(validate_slug(EntityKind::Category, "running shoes").is_err());
/// ```
pub fn validate_slug(kind: EntityKind, slug: &str) -> Result<()> {
    if slug.is_empty() {
        return Err(CatalogError::invalid(kind, "slug", "cannot be empty"));
    }
    if slug.len() > MAX_SLUG_LEN {
        return Err(CatalogError::invalid(
            kind,
            "slug",
            format!("at most {MAX_SLUG_LEN} characters allowed"),
        ));
    }
    if let Some(ch) = slug.chars().find(|ch| !is_slug_char(*ch)) {
        return Err(CatalogError::invalid(
            kind,
            "slug",
            format!("invalid character '{ch}'"),
        ));
    }
    Ok(())
}

fn is_slug_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

/// Derives a slug from a display name.
///
/// ```
/// use catalogapp::validation::slugify;
///
/// assert_eq!(slugify("Running Shoes"), "running-shoes");
/// assert_eq!(slugify("  T-Shirts & Tops "), "t-shirts-tops");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch == '-' || ch.is_whitespace() || ch.is_ascii_punctuation() {
            pending_dash = true;
        }
    }
    slug
}

/// Price is fixed-point with at most 10 digits, 2 of them after the point.
pub fn validate_price(price: Decimal) -> Result<()> {
    let kind = EntityKind::ProductLine;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(CatalogError::invalid(kind, "price", "cannot be negative"));
    }
    if price.normalize().scale() > PRICE_DECIMAL_PLACES {
        return Err(CatalogError::invalid(
            kind,
            "price",
            format!("at most {PRICE_DECIMAL_PLACES} decimal places allowed"),
        ));
    }
    let integer_limit = Decimal::from(10u64.pow(PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES));
    if price >= integer_limit {
        return Err(CatalogError::invalid(
            kind,
            "price",
            format!("at most {PRICE_MAX_DIGITS} digits allowed"),
        ));
    }
    Ok(())
}

//! # Ordinal Assignment
//!
//! Product lines are numbered within their product and images within their product
//! line. The scope of each ordered kind is declared once, as an [`OrderField`] on its
//! [`Ordered`] impl, and checked by [`check_order_field`] when the schema is validated.
//!
//! Assignment happens on the write path, inside the transaction that will persist the
//! record:
//!
//! 1. An explicit ordinal from the caller is kept as is.
//! 2. Otherwise the next ordinal is `max + 1` over the siblings sharing the scope key,
//!    or `1` for an empty scope. Records without a scope key count as one scope of
//!    their own.
//!
//! Uniqueness of `(scope, order)` is enforced twice: by [`ensure_unique_order`] before
//! the write, and by the store's ordinal key on every create. Two writers that read the
//! same maximum both pass these checks on their own snapshot; the second commit fails
//! with `Conflict` and the retry sees the first writer's line.

use crate::error::{CatalogError, Result};
use crate::model::{EntityKind, ProductImage, ProductLine};
use crate::schema::OrderField;
use crate::store::{Record, Transaction};
use uuid::Uuid;

/// A record numbered within a sibling scope.
pub trait Ordered: Record {
    const ORDER_FIELD: OrderField;

    fn order(&self) -> u32;
}

impl Ordered for ProductLine {
    const ORDER_FIELD: OrderField = OrderField::unique_for("product");

    fn order(&self) -> u32 {
        self.order
    }
}

impl Ordered for ProductImage {
    const ORDER_FIELD: OrderField = OrderField::unique_for("product_line");

    fn order(&self) -> u32 {
        self.order
    }
}

/// Scope key of `record`, read through its declared scope field.
pub fn scope_of<R: Ordered>(record: &R) -> Option<Uuid> {
    R::ORDER_FIELD
        .unique_for_field
        .and_then(|field| record.reference(field))
}

/// Schema check for one ordered kind.
pub fn check_order_field<R: Ordered>() -> Result<()> {
    check_declaration(R::KIND, R::FIELDS, R::ORDER_FIELD)
}

fn check_declaration(
    kind: EntityKind,
    fields: &[&'static str],
    declared: OrderField,
) -> Result<()> {
    let Some(scope_field) = declared.unique_for_field else {
        return Err(CatalogError::MissingScopeConfiguration {
            kind,
            reason: "no unique_for_field declared".to_string(),
        });
    };
    if !fields.contains(&scope_field) {
        return Err(CatalogError::MissingScopeConfiguration {
            kind,
            reason: format!("scope field '{scope_field}' is not a field of {kind}"),
        });
    }
    Ok(())
}

/// Ordinal for a new record of kind `R` in `scope_key`.
pub fn assign_order<R: Ordered>(
    txn: &Transaction,
    requested: Option<u32>,
    scope_key: Option<Uuid>,
) -> Result<u32> {
    if let Some(order) = requested {
        tracing::debug!(kind = %R::KIND, order, "keeping explicit ordinal");
        return Ok(order);
    }
    let next = match txn.max::<R, _>(|r| r.order(), |r| scope_of(r) == scope_key) {
        Some(max) => max.checked_add(1).ok_or_else(|| {
            CatalogError::invalid(R::KIND, "order", "no ordinal left in this scope")
        })?,
        None => 1,
    };
    tracing::debug!(kind = %R::KIND, scope = ?scope_key, order = next, "assigned ordinal");
    Ok(next)
}

/// Rejects `candidate` if another record in its scope already holds its ordinal.
pub fn ensure_unique_order<R: Ordered>(txn: &Transaction, candidate: &R) -> Result<()> {
    let Some(scope) = scope_of(candidate) else {
        return Ok(());
    };
    let order = candidate.order();
    let id = candidate.id();
    let taken = txn.exists::<R>(|r| {
        r.id() != id && r.order() == order && scope_of(r) == Some(scope)
    });
    if taken {
        return Err(CatalogError::DuplicateOrderValue {
            kind: R::KIND,
            scope,
            order,
        });
    }
    Ok(())
}

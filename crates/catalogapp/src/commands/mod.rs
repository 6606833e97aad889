//! # Command Layer
//!
//! This module contains the **core business logic** of the catalog. Each family of
//! operations lives in its own submodule as plain functions generic over
//! [`DataStore`].
//!
//! ## Role and Responsibilities
//!
//! Every write operation follows the same pipeline, inside one transaction:
//!
//! 1. Resolve and load the records it touches (`NotFound` on a dangling id).
//! 2. Validate field rules ([`crate::validation`]).
//! 3. Fill in computed values ([`crate::ordering::assign_order`]).
//! 4. Run the invariant checks ([`crate::binding::validate_binding`],
//!    [`crate::ordering::ensure_unique_order`], the tree rules).
//! 5. Write to the transaction, which re-checks references and unique keys.
//! 6. Commit. A lost race surfaces as `Conflict`, never retried here.
//!
//! Any failure before step 6 drops the transaction, so nothing is written.
//!
//! ## What Commands Do NOT Do
//!
//! - **Any I/O** beyond the store: no stdout, stderr, or terminal concerns
//! - **Argument parsing**: that's the CLI layer's job
//! - **Retries**: `Conflict` goes back to the caller, who may re-run the operation
//!
//! ## Testing Strategy
//!
//! **This is where the lion's share of testing lives.** Command tests use
//! `InMemoryStore` and the store fixtures.
//!
//! ## Command Modules
//!
//! - [`siblings`]: product lines and images, with ordinal assignment
//! - [`bindings`]: attribute values bound to products and lines
//! - [`tree_nodes`]: category and product-type trees
//! - [`products`]: brands and products
//! - [`attributes`]: attributes, their values, and product-type links
//! - [`listing`]: active-only listings and visibility flags
//! - [`detail`]: storefront reads (product detail, category contents)
//! - [`doctor`]: read-only integrity scan

use crate::error::Result;
use crate::store::{DataStore, Transaction};
use serde::Serialize;
use uuid::Uuid;

pub mod attributes;
pub mod bindings;
pub mod detail;
pub mod doctor;
pub mod listing;
pub mod products;
pub mod siblings;
pub mod tree_nodes;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }
}

/// Runs `f` in one transaction and commits whatever it wrote.
pub(crate) fn in_transaction<S, T, F>(store: &S, f: F) -> Result<T>
where
    S: DataStore,
    F: FnOnce(&mut Transaction) -> Result<T>,
{
    let mut txn = store.begin()?;
    let output = f(&mut txn)?;
    store.commit(txn)?;
    Ok(output)
}

/// Parses `key` as a record id, if it is one.
pub(crate) fn parse_id(key: &str) -> Option<Uuid> {
    Uuid::parse_str(key.trim()).ok()
}

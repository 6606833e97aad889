//! # Category and Product-Type Trees
//!
//! Both trees are arenas addressed by id: a node stores its parent as an optional id
//! of the same kind, and every traversal is an explicit lookup in the transaction.
//!
//! ## Rules
//!
//! - **Global uniqueness**: a node's name (and a category's slug) is unique across the
//!   whole tree, not only among siblings. The store's unique keys enforce it on every
//!   create and update.
//! - **Acyclic**: a node may not become its own ancestor. Placing a node under a parent
//!   walks the chain from that parent up to the root; meeting the node rejects the
//!   move with `Cycle`. The walk gives up after [`MAX_DEPTH`] hops, which only corrupt
//!   data reaches, and reports `Cycle` as well.
//! - **Sibling order**: children are returned sorted by name, case-insensitively, with
//!   the exact name as tie-break. The order is computed on read and never stored.
//! - **Visibility**: `is_active` belongs to the node alone. [`active_subset`] looks at
//!   nothing but each node's own flag.
//! - **Deletes**: a node that is a parent, or that a product or line points at, is
//!   protected. Products in a deleted category lose their category instead.

use crate::error::{CatalogError, Result};
use crate::model::{Activatable, Category, EntityKind, ProductType};
use crate::store::{DeleteReport, Record, Transaction};
use crate::validation::{slugify, validate_name, validate_slug};
use std::cmp::Ordering;
use uuid::Uuid;

/// Safety limit for parent-chain walks.
pub const MAX_DEPTH: usize = 1000;

/// A record that lives in a self-referential tree.
pub trait TreeNode: Record + Activatable {
    /// Builds a detached, inactive node.
    fn build(name: &str, slug: Option<&str>) -> Result<Self>;
    fn name(&self) -> &str;
    fn set_name(&mut self, name: String);
    fn slug(&self) -> Option<&str> {
        None
    }
    fn parent(&self) -> Option<Uuid>;
    fn set_parent(&mut self, parent: Option<Uuid>);
}

impl TreeNode for Category {
    fn build(name: &str, slug: Option<&str>) -> Result<Self> {
        let slug = match slug {
            Some(slug) => slug.to_string(),
            None => slugify(name),
        };
        validate_slug(EntityKind::Category, &slug)?;
        Ok(Category::new(name, slug))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn slug(&self) -> Option<&str> {
        Some(&self.slug)
    }

    fn parent(&self) -> Option<Uuid> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<Uuid>) {
        self.parent = parent;
    }
}

impl TreeNode for ProductType {
    fn build(name: &str, slug: Option<&str>) -> Result<Self> {
        if slug.is_some() {
            return Err(CatalogError::invalid(
                EntityKind::ProductType,
                "slug",
                "product types have no slug",
            ));
        }
        Ok(ProductType::new(name))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn parent(&self) -> Option<Uuid> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<Uuid>) {
        self.parent = parent;
    }
}

/// Sibling order: case-insensitive name, then exact name.
pub fn sibling_order<N: TreeNode>(a: &N, b: &N) -> Ordering {
    a.name()
        .to_lowercase()
        .cmp(&b.name().to_lowercase())
        .then_with(|| a.name().cmp(b.name()))
}

/// Creates a node under `parent` (or as a root).
pub fn add_node<N: TreeNode>(
    txn: &mut Transaction,
    name: &str,
    slug: Option<&str>,
    parent: Option<Uuid>,
) -> Result<N> {
    validate_name(N::KIND, name)?;
    let mut node = N::build(name, slug)?;
    if let Some(parent) = parent {
        ensure_acyclic::<N>(txn, node.id(), parent)?;
    }
    node.set_parent(parent);
    txn.create(node.clone())?;
    tracing::info!(kind = %N::KIND, id = %node.id(), name, "tree node added");
    Ok(node)
}

/// Renames a node; uniqueness is re-checked against the whole tree.
pub fn rename<N: TreeNode>(txn: &mut Transaction, id: Uuid, new_name: &str) -> Result<N> {
    validate_name(N::KIND, new_name)?;
    let mut node = txn.get::<N>(id)?.clone();
    node.set_name(new_name.to_string());
    txn.update(node.clone())?;
    tracing::info!(kind = %N::KIND, %id, name = new_name, "tree node renamed");
    Ok(node)
}

/// Moves a node under `new_parent`, or to the root when `None`.
pub fn reparent<N: TreeNode>(
    txn: &mut Transaction,
    id: Uuid,
    new_parent: Option<Uuid>,
) -> Result<N> {
    let mut node = txn.get::<N>(id)?.clone();
    if node.parent() == new_parent {
        return Ok(node);
    }
    if let Some(parent) = new_parent {
        ensure_acyclic::<N>(txn, id, parent)?;
    }
    node.set_parent(new_parent);
    txn.update(node.clone())?;
    tracing::info!(kind = %N::KIND, %id, parent = ?new_parent, "tree node moved");
    Ok(node)
}

/// Deletes a node. Children and protect-on-delete references block it.
pub fn delete_node<N: TreeNode>(txn: &mut Transaction, id: Uuid) -> Result<DeleteReport> {
    let report = txn.delete::<N>(id)?;
    tracing::info!(kind = %N::KIND, %id, nullified = report.nullified.len(), "tree node deleted");
    Ok(report)
}

/// Children of `parent` in sibling order, regardless of their active flag.
pub fn children<N: TreeNode>(txn: &Transaction, parent: Uuid) -> Vec<N> {
    sorted(txn.find::<N>(|n| n.parent() == Some(parent)))
}

/// Nodes without a parent, in sibling order.
pub fn roots<N: TreeNode>(txn: &Transaction) -> Vec<N> {
    sorted(txn.find::<N>(|n| n.parent().is_none()))
}

fn sorted<N: TreeNode>(nodes: Vec<&N>) -> Vec<N> {
    let mut nodes: Vec<N> = nodes.into_iter().cloned().collect();
    nodes.sort_by(sibling_order);
    nodes
}

/// Ancestors of `id`, nearest first.
pub fn ancestors<N: TreeNode>(txn: &Transaction, id: Uuid) -> Result<Vec<N>> {
    let mut chain = Vec::new();
    let mut current = txn.get::<N>(id)?.parent();
    while let Some(parent_id) = current {
        if chain.len() >= MAX_DEPTH {
            return Err(CatalogError::Cycle {
                kind: N::KIND,
                node: id,
                parent: parent_id,
            });
        }
        let parent = txn.get::<N>(parent_id)?;
        current = parent.parent();
        chain.push(parent.clone());
    }
    Ok(chain)
}

/// Keeps the nodes whose own flag is set.
pub fn active_subset<N: Activatable>(nodes: impl IntoIterator<Item = N>) -> Vec<N> {
    nodes.into_iter().filter(|n| n.is_active()).collect()
}

/// Rejects placing `node` under `parent` if `node` is `parent` or one of its ancestors.
fn ensure_acyclic<N: TreeNode>(txn: &Transaction, node: Uuid, parent: Uuid) -> Result<()> {
    let cycle = || CatalogError::Cycle {
        kind: N::KIND,
        node,
        parent,
    };
    let mut current = Some(parent);
    let mut hops = 0;
    while let Some(id) = current {
        if id == node {
            return Err(cycle());
        }
        hops += 1;
        if hops > MAX_DEPTH {
            return Err(cycle());
        }
        current = txn.get::<N>(id)?.parent();
    }
    Ok(())
}

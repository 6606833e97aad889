//! Category and product-type tree operations.
//!
//! Both trees share one set of operations, selected by [`TreeKind`]. Results come back
//! as [`TreeEntry`] views so callers need not care which tree they asked.

use super::{in_transaction, parse_id};
use crate::error::{CatalogError, Result};
use crate::model::{Category, EntityKind, ProductType};
use crate::store::{DataStore, DeleteReport, Transaction};
use crate::tree::{self, TreeNode};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeKind {
    Category,
    ProductType,
}

impl TreeKind {
    pub fn entity_kind(&self) -> EntityKind {
        match self {
            TreeKind::Category => EntityKind::Category,
            TreeKind::ProductType => EntityKind::ProductType,
        }
    }
}

impl fmt::Display for TreeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.entity_kind(), f)
    }
}

/// A tree node, independent of its tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    pub kind: TreeKind,
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub parent: Option<Uuid>,
    pub is_active: bool,
}

/// Maps a tree node type to its [`TreeKind`].
pub trait TreeNodeKind: TreeNode {
    const TREE: TreeKind;

    fn entry(&self) -> TreeEntry {
        TreeEntry {
            kind: Self::TREE,
            id: self.id(),
            name: self.name().to_string(),
            slug: self.slug().map(str::to_string),
            parent: self.parent(),
            is_active: self.is_active(),
        }
    }
}

impl TreeNodeKind for Category {
    const TREE: TreeKind = TreeKind::Category;
}

impl TreeNodeKind for ProductType {
    const TREE: TreeKind = TreeKind::ProductType;
}

/// Runs `$body` with `$N` bound to the node type of `$kind`.
macro_rules! with_tree {
    ($kind:expr, $N:ident => $body:expr) => {
        match $kind {
            TreeKind::Category => {
                type $N = Category;
                $body
            }
            TreeKind::ProductType => {
                type $N = ProductType;
                $body
            }
        }
    };
}

pub fn add_tree_node<S: DataStore>(
    store: &S,
    kind: TreeKind,
    name: &str,
    slug: Option<&str>,
    parent: Option<Uuid>,
) -> Result<TreeEntry> {
    in_transaction(store, |txn| {
        with_tree!(kind, N => tree::add_node::<N>(txn, name, slug, parent).map(|n| n.entry()))
    })
}

pub fn rename_tree_node<S: DataStore>(
    store: &S,
    kind: TreeKind,
    id: Uuid,
    new_name: &str,
) -> Result<TreeEntry> {
    in_transaction(store, |txn| {
        with_tree!(kind, N => tree::rename::<N>(txn, id, new_name).map(|n| n.entry()))
    })
}

/// Moves a node under `parent`, or to the root when `None`.
pub fn move_tree_node<S: DataStore>(
    store: &S,
    kind: TreeKind,
    id: Uuid,
    parent: Option<Uuid>,
) -> Result<TreeEntry> {
    in_transaction(store, |txn| {
        with_tree!(kind, N => tree::reparent::<N>(txn, id, parent).map(|n| n.entry()))
    })
}

pub fn delete_tree_node<S: DataStore>(store: &S, kind: TreeKind, id: Uuid) -> Result<DeleteReport> {
    in_transaction(store, |txn| with_tree!(kind, N => tree::delete_node::<N>(txn, id)))
}

/// Children of `parent` in name order, or the roots when `parent` is `None`.
/// Inactive nodes are included.
pub fn list_tree_children<S: DataStore>(
    store: &S,
    kind: TreeKind,
    parent: Option<Uuid>,
) -> Result<Vec<TreeEntry>> {
    let txn = store.begin()?;
    with_tree!(kind, N => children_of::<N>(&txn, parent))
}

fn children_of<N: TreeNodeKind>(txn: &Transaction, parent: Option<Uuid>) -> Result<Vec<TreeEntry>> {
    let nodes = match parent {
        Some(parent) => {
            txn.get::<N>(parent)?;
            tree::children::<N>(txn, parent)
        }
        None => tree::roots::<N>(txn),
    };
    Ok(nodes.iter().map(TreeNodeKind::entry).collect())
}

/// Finds a node by id, exact name, or (categories only) slug.
pub fn lookup_tree_node<S: DataStore>(store: &S, kind: TreeKind, key: &str) -> Result<TreeEntry> {
    let txn = store.begin()?;
    with_tree!(kind, N => lookup::<N>(&txn, key).map(|n| n.entry()))
}

pub(crate) fn lookup<N: TreeNodeKind>(txn: &Transaction, key: &str) -> Result<N> {
    if let Some(id) = parse_id(key) {
        if let Ok(node) = txn.get::<N>(id) {
            return Ok(node.clone());
        }
    }
    txn.find::<N>(|n| n.name() == key || n.slug() == Some(key))
        .first()
        .map(|n| (*n).clone())
        .ok_or_else(|| CatalogError::not_found(N::KIND, key))
}

/// Names from the root down to `id`, inclusive.
pub fn tree_path<S: DataStore>(store: &S, kind: TreeKind, id: Uuid) -> Result<Vec<String>> {
    let txn = store.begin()?;
    with_tree!(kind, N => path_of::<N>(&txn, id))
}

pub(crate) fn path_of<N: TreeNode>(txn: &Transaction, id: Uuid) -> Result<Vec<String>> {
    let node = txn.get::<N>(id)?;
    let mut path: Vec<String> = tree::ancestors::<N>(txn, id)?
        .iter()
        .rev()
        .map(|n| n.name().to_string())
        .collect();
    path.push(node.name().to_string());
    Ok(path)
}

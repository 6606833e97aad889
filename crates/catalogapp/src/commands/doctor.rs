//! Read-only integrity scan.
//!
//! The write path keeps the store consistent, so on a healthy store `doctor` finds
//! nothing. It exists for data files edited by hand or written by older builds. It
//! reports and never repairs.

use super::CmdMessage;
use crate::error::{CatalogError, Result};
use crate::model::{Category, EntityKind, ProductType};
use crate::schema::RELATIONS;
use crate::store::{DataStore, Record, Tables};
use crate::tree::{TreeNode, MAX_DEPTH};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    DuplicateKey,
    DuplicateOrder,
    DuplicateBinding,
    Cycle,
    DanglingReference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoctorIssue {
    pub issue: IssueKind,
    pub kind: EntityKind,
    pub id: Uuid,
    pub detail: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DoctorReport {
    pub revision: u64,
    pub issues: Vec<DoctorIssue>,
    pub messages: Vec<CmdMessage>,
}

impl DoctorReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

pub fn run<S: DataStore>(store: &S) -> Result<DoctorReport> {
    let txn = store.begin()?;
    let tables = txn.tables();

    let mut issues = Vec::new();
    duplicate_keys(tables, &mut issues);
    duplicate_bindings(tables, &mut issues);
    cycles::<Category>(tables, &mut issues);
    cycles::<ProductType>(tables, &mut issues);
    dangling_references(tables, &mut issues);

    let mut messages = Vec::new();
    if issues.is_empty() {
        messages.push(CmdMessage::success("No inconsistencies found."));
    } else {
        for issue in &issues {
            messages.push(CmdMessage::warning(format!(
                "{} {}: {}",
                issue.kind, issue.id, issue.detail
            )));
        }
        messages.push(CmdMessage::info(format!(
            "{} issue(s) found. Nothing was changed.",
            issues.len()
        )));
    }

    Ok(DoctorReport {
        revision: txn.base_revision(),
        issues,
        messages,
    })
}

fn duplicate_keys(tables: &Tables, issues: &mut Vec<DoctorIssue>) {
    for kind in EntityKind::ALL {
        for (first, second, err) in tables.duplicate_keys(kind) {
            let issue = if matches!(err, CatalogError::DuplicateOrderValue { .. }) {
                IssueKind::DuplicateOrder
            } else {
                IssueKind::DuplicateKey
            };
            issues.push(DoctorIssue {
                issue,
                kind,
                id: second,
                detail: format!("{err} (also held by {first})"),
            });
        }
    }
}

fn duplicate_bindings(tables: &Tables, issues: &mut Vec<DoctorIssue>) {
    let value_attribute: HashMap<Uuid, Uuid> = tables
        .attribute_values
        .values()
        .map(|v| (v.id, v.attribute))
        .collect();

    let product_pairs: Vec<(Uuid, Uuid)> = tables
        .product_attribute_values
        .values()
        .map(|b| (b.product, b.attribute_value))
        .collect();
    let line_pairs: Vec<(Uuid, Uuid)> = tables
        .product_line_attribute_values
        .values()
        .map(|b| (b.product_line, b.attribute_value))
        .collect();

    for (carrier_kind, pairs) in [
        (EntityKind::Product, product_pairs),
        (EntityKind::ProductLine, line_pairs),
    ] {
        let mut seen: BTreeMap<(Uuid, Uuid), usize> = BTreeMap::new();
        for (carrier, value) in pairs {
            if let Some(attribute) = value_attribute.get(&value) {
                *seen.entry((carrier, *attribute)).or_default() += 1;
            }
        }
        for ((carrier, attribute), count) in seen {
            if count > 1 {
                issues.push(DoctorIssue {
                    issue: IssueKind::DuplicateBinding,
                    kind: carrier_kind,
                    id: carrier,
                    detail: format!("{count} values bound for attribute {attribute}"),
                });
            }
        }
    }
}

fn cycles<N: TreeNode>(tables: &Tables, issues: &mut Vec<DoctorIssue>) {
    let table = N::table(tables);
    for node in table.values() {
        let mut current = node.parent();
        let mut hops = 0;
        while let Some(parent) = current {
            if parent == node.id() || hops >= MAX_DEPTH {
                issues.push(DoctorIssue {
                    issue: IssueKind::Cycle,
                    kind: N::KIND,
                    id: node.id(),
                    detail: format!("'{}' is its own ancestor", node.name()),
                });
                break;
            }
            hops += 1;
            current = table.get(&parent).and_then(TreeNode::parent);
        }
    }
}

fn dangling_references(tables: &Tables, issues: &mut Vec<DoctorIssue>) {
    for relation in RELATIONS {
        for id in tables.ids(relation.from) {
            if let Some(target) = tables.reference_of(relation.from, id, relation.field) {
                if !tables.contains(relation.to, target) {
                    issues.push(DoctorIssue {
                        issue: IssueKind::DanglingReference,
                        kind: relation.from,
                        id,
                        detail: format!(
                            "{} points at missing {} {}",
                            relation.field, relation.to, target
                        ),
                    });
                }
            }
        }
    }
}

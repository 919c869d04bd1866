//! Mapping resolver
//!
//! Walks a mapping tree and a record's coercion entry together, writing one
//! row into one record.
//!
//! ## Flow
//!
//! ```text
//! fill(row, Branch "Customer", &mut Customer)
//!   ├─ Leaf Name    → entry[Name]    → parse text   → customer.name
//!   ├─ Leaf Join    → entry[Join]    → parse time   → customer.join
//!   └─ Branch Sub   → entry[Sub]     → fill(row, children, &mut customer.sub)
//! ```
//!
//! Nodes are applied in tree order and the first failure aborts the row.
//! Whatever was written before the failure stays written; the caller is
//! expected to discard the record.

use crate::cache::{CoercionCache, CoercionEntry, Coercer};
use crate::error::{EngineResult, MappingError, MappingResult};
use crate::mapping::MappingNode;
use crate::reflect::Record;

impl CoercionCache {
    /// Fill `target` from `row` according to `mapping`.
    ///
    /// A branch root applies its children to `target` (its own name is not
    /// checked); a leaf root applies just that leaf.
    pub fn fill<R: Record>(
        &self,
        row: &[String],
        mapping: &MappingNode,
        target: &mut R,
    ) -> MappingResult<()> {
        self.fill_nodes(row, root_nodes(mapping), target)
    }

    /// Validate `mapping` against `R` without touching any row: every leaf
    /// must name a scalar field, every branch a nested record field, all the
    /// way down.
    pub fn check<R: Record>(&self, mapping: &MappingNode) -> MappingResult<()> {
        self.check_nodes::<R>(root_nodes(mapping))
    }

    pub(crate) fn fill_nodes<R: Record>(
        &self,
        row: &[String],
        nodes: &[MappingNode],
        target: &mut R,
    ) -> MappingResult<()> {
        let entry = self.entry::<R>()?;
        for node in nodes {
            apply(self, &entry, row, node, target)?;
        }
        Ok(())
    }

    pub(crate) fn check_nodes<R: Record>(&self, nodes: &[MappingNode]) -> MappingResult<()> {
        let entry = self.entry::<R>()?;
        for node in nodes {
            match (node, lookup(&entry, node)?) {
                (MappingNode::Leaf(_), Coercer::Scalar(_)) => {}
                (MappingNode::Branch(branch), Coercer::Nested { check, .. }) => {
                    check(self, &branch.children)?;
                }
                (node, _) => return Err(mismatch(&entry, node)),
            }
        }
        Ok(())
    }
}

fn root_nodes(mapping: &MappingNode) -> &[MappingNode] {
    match mapping {
        MappingNode::Branch(branch) => &branch.children,
        MappingNode::Leaf(_) => std::slice::from_ref(mapping),
    }
}

fn lookup<'e, R>(entry: &'e CoercionEntry<R>, node: &MappingNode) -> MappingResult<&'e Coercer<R>> {
    entry
        .coercer(node.target())
        .ok_or_else(|| MappingError::UnknownField {
            record: entry.record(),
            field: node.target().to_string(),
        })
}

fn mismatch<R>(entry: &CoercionEntry<R>, node: &MappingNode) -> MappingError {
    MappingError::ShapeMismatch {
        record: entry.record(),
        field: node.target().to_string(),
        // A leaf hit a nested field, or a branch hit a scalar one
        expected: match node {
            MappingNode::Leaf(_) => "branch",
            MappingNode::Branch(_) => "leaf",
        },
    }
}

fn apply<R>(
    cache: &CoercionCache,
    entry: &CoercionEntry<R>,
    row: &[String],
    node: &MappingNode,
    target: &mut R,
) -> MappingResult<()> {
    match (node, lookup(entry, node)?) {
        (MappingNode::Leaf(leaf), Coercer::Scalar(write)) => write(row, target, leaf),
        (MappingNode::Branch(branch), Coercer::Nested { write, .. }) => {
            write(cache, row, target, branch)
        }
        (node, _) => Err(mismatch(entry, node)),
    }
}

// Entry points stored in nested-record binders.

pub(crate) fn fill_nested<R: Record>(
    cache: &CoercionCache,
    row: &[String],
    nodes: &[MappingNode],
    target: &mut R,
) -> MappingResult<()> {
    cache.fill_nodes(row, nodes, target)
}

pub(crate) fn check_nested<R: Record>(
    cache: &CoercionCache,
    nodes: &[MappingNode],
) -> MappingResult<()> {
    cache.check_nodes::<R>(nodes)
}

pub(crate) fn prepare_nested<R: Record>(cache: &CoercionCache) -> EngineResult<()> {
    cache.entry::<R>().map(|_| ())
}

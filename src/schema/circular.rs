//! Per-branch detection of schema cycles.

use super::SchemaId;

/// Nodes on the current traversal branch, root first.
///
/// A node is circular when it is already on the branch that leads to it. Siblings do
/// not see each other: a node reached twice through different branches (a shared,
/// non-recursive `$ref`) is expanded both times.
#[derive(Debug, Default)]
pub struct AncestorStack {
    branch: Vec<SchemaId>,
}

impl AncestorStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` is one of its own ancestors on this branch
    pub fn is_circular(&self, id: SchemaId) -> bool {
        self.branch.contains(&id)
    }

    /// Enter a node before visiting its children
    pub fn push(&mut self, id: SchemaId) {
        self.branch.push(id);
    }

    /// Leave the node entered last
    pub fn pop(&mut self) {
        self.branch.pop();
    }

    /// Number of nodes on the branch
    pub fn depth(&self) -> usize {
        self.branch.len()
    }
}

//! Reducing tree check states into extraction instructions.

use crate::app::tree::SelectionTree;
use crate::domain::model::{CheckState, InstructionKind, NodeId, SelectionInstruction};

/// Walk the top level of `tree` and emit the smallest instruction list covering the selection.
///
/// A checked directory collapses into one [`SelectionInstruction::subtree`] and is not
/// descended into; partially checked directories are recursed; unchecked nodes are skipped
/// along with everything below them.
pub fn collect_instructions(tree: &SelectionTree) -> Vec<SelectionInstruction> {
    let mut out = Vec::new();
    visit(tree, tree.root_id(), &mut out);
    out
}

fn visit(tree: &SelectionTree, id: NodeId, out: &mut Vec<SelectionInstruction>) {
    for &child in tree.children(id) {
        let node = tree.node(child);
        match node.state() {
            CheckState::Checked if node.is_dir() => {
                out.push(SelectionInstruction::subtree(node.path()));
            }
            CheckState::Checked => {
                out.push(SelectionInstruction::file(node.path()));
            }
            CheckState::PartiallyChecked => {
                debug_assert!(node.is_loaded(), "partially checked node was never loaded");
                if !node.is_loaded() {
                    tracing::warn!(path = %node.path().display(), "partially checked node was never loaded");
                }
                visit(tree, child, out);
            }
            CheckState::Unchecked => {}
        }
    }
}

/// Size of the collapsed selection as `(whole directories, single files)`.
pub fn checked_counts(tree: &SelectionTree) -> (usize, usize) {
    collect_instructions(tree)
        .iter()
        .fold((0, 0), |(dirs, files), instruction| match instruction.kind {
            InstructionKind::WholeSubtree => (dirs + 1, files),
            InstructionKind::SingleFile => (dirs, files + 1),
        })
}

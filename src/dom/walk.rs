//! Pure traversal helpers over the document tree.
//!
//! Kept independent of any specific exclusion policy so the walkers can be
//! exercised against synthetic trees; the engine supplies its own predicate
//! (skip script/style/noscript subtrees and existing highlight markers).

use super::{Document, NodeId, BLOCK_TAGS};

/// Ordered text-bearing leaf nodes under `root`, excluding any node for
/// which `exclude` returns true.
pub fn collect_leaf_text_nodes<F>(doc: &Document, root: NodeId, exclude: F) -> Vec<NodeId>
where
    F: Fn(&Document, NodeId) -> bool,
{
    doc.subtree(root)
        .into_iter()
        .filter(|&n| doc.is_text(n) && !exclude(doc, n))
        .collect()
}

/// Nearest ancestor element with a block-level tag, if any.
pub fn nearest_block_ancestor(doc: &Document, id: NodeId) -> Option<NodeId> {
    doc.ancestors(id)
        .find(|&a| doc.tag(a).map_or(false, |t| BLOCK_TAGS.contains(&t)))
}

/// Group leaf text nodes by their nearest block ancestor, preserving the
/// document order of both blocks and members. Leaves with no block ancestor
/// are dropped (nothing to anchor a highlight to).
pub fn group_by_block(doc: &Document, leaves: &[NodeId]) -> Vec<(NodeId, Vec<NodeId>)> {
    let mut blocks: Vec<(NodeId, Vec<NodeId>)> = Vec::new();
    for &leaf in leaves {
        let block = match nearest_block_ancestor(doc, leaf) {
            Some(b) => b,
            None => continue,
        };
        match blocks.iter_mut().find(|(b, _)| *b == block) {
            Some((_, members)) => members.push(leaf),
            None => blocks.push((block, vec![leaf])),
        }
    }
    blocks
}

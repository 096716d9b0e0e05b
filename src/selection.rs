//! Extracting the user's current text selection.
//!
//! When a selection exists, the critique runs over it instead of the whole
//! page. A selection is two (text node, byte offset) endpoints; the browser
//! does not guarantee which end comes first in document order, so both
//! orientations are accepted.

use crate::dom::{collect_leaf_text_nodes, Document, NodeId, SKIP_TAGS};
use crate::locate::is_engine_ui;

/// A possibly backwards range between two positions in text nodes.
#[derive(Debug, Clone, Copy)]
pub struct Selection {
    pub anchor: NodeId,
    pub anchor_offset: usize,
    pub focus: NodeId,
    pub focus_offset: usize,
}

impl Selection {
    pub fn caret(node: NodeId, offset: usize) -> Self {
        Self {
            anchor: node,
            anchor_offset: offset,
            focus: node,
            focus_offset: offset,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus && self.anchor_offset == self.focus_offset
    }
}

/// The selected text, trimmed. Empty for a collapsed selection or when an
/// endpoint does not sit in a live page text node. Highlight markers are
/// transparent here; engine chrome and skip tags are not selectable content.
pub fn selected_text(doc: &Document, selection: &Selection) -> String {
    if selection.is_collapsed() {
        return String::new();
    }
    let leaves = collect_leaf_text_nodes(doc, doc.body(), |doc, id| {
        is_engine_ui(doc, id)
            || doc
                .ancestors(id)
                .any(|a| doc.tag(a).map_or(false, |t| SKIP_TAGS.contains(&t)))
    });
    let anchor_idx = leaves.iter().position(|&n| n == selection.anchor);
    let focus_idx = leaves.iter().position(|&n| n == selection.focus);
    let (anchor_idx, focus_idx) = match (anchor_idx, focus_idx) {
        (Some(a), Some(f)) => (a, f),
        _ => return String::new(),
    };

    let forward = (anchor_idx, selection.anchor_offset) <= (focus_idx, selection.focus_offset);
    let ((first, first_off), (last, last_off)) = if forward {
        (
            (anchor_idx, selection.anchor_offset),
            (focus_idx, selection.focus_offset),
        )
    } else {
        (
            (focus_idx, selection.focus_offset),
            (anchor_idx, selection.anchor_offset),
        )
    };

    let mut out = String::new();
    for (idx, &node) in leaves.iter().enumerate().take(last + 1).skip(first) {
        let text = match doc.text(node) {
            Some(t) => t,
            None => continue,
        };
        let start = if idx == first { floor_char_boundary(text, first_off) } else { 0 };
        let end = if idx == last { floor_char_boundary(text, last_off) } else { text.len() };
        if start < end {
            out.push_str(&text[start..end]);
        }
    }
    out.trim().to_string()
}

/// Host offsets are not trusted: clamp past-the-end offsets and walk back to
/// the nearest char boundary so a mid-character offset slices a whole char
/// short instead of panicking.
fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

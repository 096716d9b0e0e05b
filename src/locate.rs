//! Re-anchoring a normalized quote onto live text nodes.
//!
//! The model saw a flattened projection of the page; by the time its quote
//! comes back, the only thing connecting it to the DOM is normalized text
//! equality. The locator walks text-bearing leaves in document order, groups
//! them under their nearest block ancestor, pre-filters blocks by normalized
//! containment, and projects the first match in each qualifying block back
//! onto per-node byte ranges. Every qualifying block yields its own span, so
//! one quote can highlight several disjoint places on the page.

use tracing::debug;

use crate::dom::{collect_leaf_text_nodes, group_by_block, Document, NodeId, SKIP_TAGS};
use crate::normalize::{normalize, NormalizedText};
use crate::style::{MARKER_CLASS, OVERLAY_CONTAINER_ID, TOOLTIP_CLASS};

/// True when `id` sits inside engine-created chrome (the tooltip or the
/// overlay container) rather than page content.
pub fn is_engine_ui(doc: &Document, id: NodeId) -> bool {
    doc.ancestors(id).any(|a| {
        doc.element(a).map_or(false, |el| {
            el.has_class(TOOLTIP_CLASS) || el.attr("id") == Some(OVERLAY_CONTAINER_ID)
        })
    })
}

/// A contiguous byte range within one live text node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanSegment {
    pub node: NodeId,
    /// Byte offset into the node's text where the match starts.
    pub start: usize,
    /// Byte offset (exclusive) where the match ends.
    pub end: usize,
}

impl SpanSegment {
    /// True when the segment covers the node's entire text.
    pub fn covers_whole_node(&self, doc: &Document) -> bool {
        self.start == 0 && doc.text(self.node).map_or(false, |t| t.len() == self.end)
    }
}

/// One located occurrence of a quote: ordered segments whose concatenated
/// normalized text equals the normalized search text. Computed fresh per
/// render pass and never cached across DOM mutations.
#[derive(Debug, Clone)]
pub struct ResolvedSpan {
    pub block: NodeId,
    pub segments: Vec<SpanSegment>,
}

/// Default matching exclusion: skip text under script/style/noscript, text
/// already inside a highlight marker, and engine chrome.
pub fn default_exclusion(doc: &Document, id: NodeId) -> bool {
    is_engine_ui(doc, id)
        || doc.ancestors(id).any(|a| {
            doc.element(a).map_or(false, |el| {
                SKIP_TAGS.contains(&el.tag.as_str()) || el.has_class(MARKER_CLASS)
            })
        })
}

/// Locate every occurrence of `search_raw` in the document, one span per
/// qualifying block. An empty result is a skip condition, never an error.
pub fn locate_all(doc: &Document, search_raw: &str) -> Vec<ResolvedSpan> {
    let search = normalize(search_raw);
    if search.is_empty() {
        return Vec::new();
    }
    let leaves = collect_leaf_text_nodes(doc, doc.body(), default_exclusion);
    let blocks = group_by_block(doc, &leaves);
    let mut spans = Vec::new();
    for (block, members) in blocks {
        if let Some(span) = locate_in_block(doc, block, &members, &search) {
            debug!(
                block = ?block,
                segments = span.segments.len(),
                "matched block for search text"
            );
            spans.push(span);
        }
    }
    spans
}

/// Match within one block. The block's member nodes are concatenated raw
/// (text nodes within a block are textually adjacent, so whitespace
/// collapses across node boundaries exactly as it does in the flattened
/// projection), then the first normalized occurrence is projected back to
/// per-node byte offsets.
fn locate_in_block(
    doc: &Document,
    block: NodeId,
    members: &[NodeId],
    search: &str,
) -> Option<ResolvedSpan> {
    let mut combined = String::new();
    let mut bounds: Vec<(NodeId, usize, usize)> = Vec::with_capacity(members.len());
    for &node in members {
        let text = doc.text(node)?;
        bounds.push((node, combined.len(), text.len()));
        combined.push_str(text);
    }

    let norm = NormalizedText::of(&combined);
    // Cheap containment pre-filter and the actual hit are the same scan.
    let hit = norm.text().find(search)?;
    let (raw_start, raw_end) = norm.raw_range(hit, hit + search.len());

    let mut segments = Vec::new();
    for (node, offset, len) in bounds {
        let seg_start = raw_start.max(offset);
        let seg_end = raw_end.min(offset + len);
        if seg_start < seg_end {
            segments.push(SpanSegment {
                node,
                start: seg_start - offset,
                end: seg_end - offset,
            });
        }
    }
    if segments.is_empty() {
        return None;
    }
    Some(ResolvedSpan { block, segments })
}

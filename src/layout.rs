//! Geometry source for overlay rendering and tooltip placement.
//!
//! Rendering never computes coordinates itself; it asks a [`LayoutProvider`]
//! where a resolved range lands on the page. In a browser the provider wraps
//! `getClientRects`, in tests [`MonospaceLayout`] lays blocks out on a fixed
//! character grid so every rectangle is predictable.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::dom::{collect_leaf_text_nodes, group_by_block, Document, NodeId, SKIP_TAGS};
use crate::geometry::{Rect, Size};
use crate::locate::SpanSegment;
use crate::normalize::NormalizedText;

/// Where things are on the page, in document coordinates.
pub trait LayoutProvider {
    /// Rectangles covering the given segments, one per visual line fragment,
    /// in document coordinates. Empty when the segments' nodes are detached
    /// or otherwise have no geometry.
    fn segment_rects(&self, doc: &Document, segments: &[SpanSegment]) -> Vec<Rect>;

    /// Rendered size of a tooltip body wrapped to at most `max_width`.
    fn measure_text(&self, text: &str, max_width: f64) -> Size;
}

/// Deterministic layout: every block of text is flowed onto a character grid
/// `columns` cells wide, blocks stacked top to bottom in document order.
/// Wide (CJK) graphemes take two cells, everything else one.
#[derive(Debug, Clone)]
pub struct MonospaceLayout {
    pub char_width: f64,
    pub line_height: f64,
    pub columns: usize,
    /// Vertical gap between consecutive blocks.
    pub block_gap: f64,
}

impl Default for MonospaceLayout {
    fn default() -> Self {
        MonospaceLayout {
            char_width: 8.0,
            line_height: 16.0,
            columns: 40,
            block_gap: 8.0,
        }
    }
}

/// Grid position of one normalized char: line number and cell range on it.
#[derive(Debug, Clone, Copy)]
struct CharCell {
    line: usize,
    col: usize,
    width: usize,
}

impl MonospaceLayout {
    /// Flow normalized text onto the grid, one entry per char. Returns the
    /// cells and the number of lines used (at least 1).
    fn flow(&self, text: &str) -> (Vec<CharCell>, usize) {
        let mut cells = Vec::with_capacity(text.chars().count());
        let mut line = 0;
        let mut col = 0;
        for grapheme in text.graphemes(true) {
            let width = UnicodeWidthStr::width(grapheme).max(1);
            if col + width > self.columns && col > 0 {
                line += 1;
                col = 0;
            }
            // Every char of a multi-char grapheme shares the cluster's cell.
            for _ in grapheme.chars() {
                cells.push(CharCell { line, col, width });
            }
            col += width;
        }
        (cells, line + 1)
    }

    /// All blocks in document order, each with its member leaf text nodes.
    /// Skip-tag subtrees and engine chrome (tooltip, overlay container) are
    /// out of flow; highlight wrappers are inline and their text still
    /// occupies grid cells.
    fn blocks(&self, doc: &Document) -> Vec<(NodeId, Vec<NodeId>)> {
        let leaves = collect_leaf_text_nodes(doc, doc.body(), |doc, id| {
            crate::locate::is_engine_ui(doc, id)
                || doc
                    .ancestors(id)
                    .any(|a| doc.tag(a).map_or(false, |t| SKIP_TAGS.contains(&t)))
        });
        group_by_block(doc, &leaves)
    }

    /// Y coordinate of a block's first line, or None if the block is not in
    /// the current flow.
    fn block_origin(&self, doc: &Document, block: NodeId) -> Option<(f64, Vec<NodeId>)> {
        let mut y = 0.0;
        for (candidate, members) in self.blocks(doc) {
            if candidate == block {
                return Some((y, members));
            }
            let combined: String = members
                .iter()
                .filter_map(|&m| doc.text(m))
                .collect();
            let (_, lines) = self.flow(NormalizedText::of(&combined).text());
            y += lines as f64 * self.line_height + self.block_gap;
        }
        None
    }
}

impl LayoutProvider for MonospaceLayout {
    fn segment_rects(&self, doc: &Document, segments: &[SpanSegment]) -> Vec<Rect> {
        let first = match segments.first() {
            Some(seg) => seg,
            None => return Vec::new(),
        };
        let block = match crate::dom::nearest_block_ancestor(doc, first.node) {
            Some(block) => block,
            None => return Vec::new(),
        };
        let (block_y, members) = match self.block_origin(doc, block) {
            Some(found) => found,
            None => return Vec::new(),
        };

        // Raw byte offset of each member node within the block's combined text.
        let mut offsets = Vec::with_capacity(members.len());
        let mut combined = String::new();
        for &member in &members {
            offsets.push(combined.len());
            if let Some(text) = doc.text(member) {
                combined.push_str(text);
            }
        }

        let norm = NormalizedText::of(&combined);
        let (cells, _) = self.flow(norm.text());

        // Collect the grid cells each segment occupies, then merge per line.
        let mut covered: Vec<CharCell> = Vec::new();
        for seg in segments {
            let member_idx = match members.iter().position(|&m| m == seg.node) {
                Some(idx) => idx,
                None => return Vec::new(),
            };
            let base = offsets[member_idx];
            if let Some((start, end)) = norm.chars_for_raw(base + seg.start, base + seg.end) {
                covered.extend_from_slice(&cells[start..end]);
            }
        }
        covered.sort_by_key(|c| (c.line, c.col));

        let mut rects: Vec<Rect> = Vec::new();
        for cell in covered {
            let x = cell.col as f64 * self.char_width;
            let right = (cell.col + cell.width) as f64 * self.char_width;
            let y = block_y + cell.line as f64 * self.line_height;
            match rects.last_mut() {
                Some(last) if last.y == y && last.right() >= x => {
                    last.width = right - last.x;
                }
                _ => rects.push(Rect::new(x, y, right - x, self.line_height)),
            }
        }
        rects
    }

    fn measure_text(&self, text: &str, max_width: f64) -> Size {
        let columns = (max_width / self.char_width).floor().max(1.0) as usize;
        let mut lines = 0usize;
        let mut widest = 0usize;
        for paragraph in text.split('\n') {
            let mut col = 0;
            let mut used = 1;
            for grapheme in paragraph.graphemes(true) {
                let width = UnicodeWidthStr::width(grapheme).max(1);
                if col + width > columns && col > 0 {
                    used += 1;
                    col = 0;
                }
                col += width;
                widest = widest.max(col);
            }
            lines += used;
        }
        Size {
            width: widest as f64 * self.char_width,
            height: lines.max(1) as f64 * self.line_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::locate_all;

    fn layout() -> MonospaceLayout {
        MonospaceLayout {
            char_width: 10.0,
            line_height: 20.0,
            columns: 10,
            block_gap: 0.0,
        }
    }

    #[test]
    fn rect_for_span_inside_first_line() {
        let doc = Document::from_body_markup("<p>hello world</p>").unwrap();
        let spans = locate_all(&doc, "hello");
        let rects = layout().segment_rects(&doc, &spans[0].segments);
        assert_eq!(rects, vec![Rect::new(0.0, 0.0, 50.0, 20.0)]);
    }

    #[test]
    fn wrapped_span_yields_one_rect_per_line() {
        // Columns = 10, so "hello worl" fills line 0 and "d again" wraps.
        let doc = Document::from_body_markup("<p>hello world again</p>").unwrap();
        let spans = locate_all(&doc, "world again");
        let rects = layout().segment_rects(&doc, &spans[0].segments);
        assert_eq!(rects.len(), 2);
        assert_eq!(rects[0].y, 0.0);
        assert_eq!(rects[1].y, 20.0);
        assert_eq!(rects[1].x, 0.0);
    }

    #[test]
    fn second_block_is_offset_by_first_block_height() {
        let doc = Document::from_body_markup("<p>first</p><p>second</p>").unwrap();
        let spans = locate_all(&doc, "second");
        let rects = layout().segment_rects(&doc, &spans[0].segments);
        assert_eq!(rects, vec![Rect::new(0.0, 20.0, 60.0, 20.0)]);
    }

    #[test]
    fn cross_node_span_produces_contiguous_rect() {
        let doc = Document::from_body_markup("<p>ab <b>cd</b> ef</p>").unwrap();
        let spans = locate_all(&doc, "ab cd");
        let rects = layout().segment_rects(&doc, &spans[0].segments);
        assert_eq!(rects, vec![Rect::new(0.0, 0.0, 50.0, 20.0)]);
    }

    #[test]
    fn detached_segment_has_no_rects() {
        let mut doc = Document::from_body_markup("<p>hello</p>").unwrap();
        let spans = locate_all(&doc, "hello");
        let paragraph = doc.children(doc.body())[0];
        doc.detach(paragraph);
        assert!(layout().segment_rects(&doc, &spans[0].segments).is_empty());
    }

    #[test]
    fn measure_wraps_to_max_width() {
        let size = layout().measure_text("twelve chars", 60.0);
        assert_eq!(size.height, 40.0);
        assert!(size.width <= 60.0);
    }
}

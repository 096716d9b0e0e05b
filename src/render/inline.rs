//! Inline markers: the matched text itself is wrapped in `<span>` elements.
//!
//! Wrapping must be content-preserving. Segments that cover only part of a
//! text node split that node at the match boundaries first, so the wrapper
//! contains exactly the matched bytes and nothing else. Clearing is the
//! inverse: unwrap every marker, then merge the split text nodes back
//! together so repeated apply/clear cycles don't shred the DOM.

use crate::descriptor::Category;
use crate::dom::{Document, NodeId};
use crate::locate::ResolvedSpan;
use crate::style::MARKER_CLASS;

/// Attribute tying a marker element back to the descriptor it renders.
pub const INSTANCE_ATTR: &str = "data-critic-id";

/// Wrap every segment of `span` in a marker element carrying the base marker
/// class, the category class, and the instance id. Returns the created
/// marker elements in document order.
pub fn wrap_span(
    doc: &mut Document,
    span: &ResolvedSpan,
    category: Category,
    instance: usize,
) -> Vec<NodeId> {
    let mut wrappers = Vec::with_capacity(span.segments.len());
    for seg in &span.segments {
        let mut node = seg.node;
        let mut end = seg.end;
        if seg.start > 0 {
            // split_text returns the suffix node, which now holds the match.
            node = doc.split_text(node, seg.start);
            end -= seg.start;
        }
        let len = doc.text(node).map_or(0, |t| t.len());
        if end < len {
            doc.split_text(node, end);
        }
        let wrapper = doc.create_element("span");
        {
            let el = doc.element_mut(wrapper).unwrap();
            el.add_class(MARKER_CLASS);
            el.add_class(&category.highlight_class());
            el.set_attr(INSTANCE_ATTR, instance.to_string());
        }
        doc.wrap(node, wrapper);
        wrappers.push(wrapper);
    }
    wrappers
}

/// All marker elements currently in the document, in document order.
pub fn markers(doc: &Document) -> Vec<NodeId> {
    doc.find_all(doc.body(), |doc, id| {
        doc.element(id).map_or(false, |el| el.has_class(MARKER_CLASS))
    })
}

/// Instance id stored on a marker element, if `id` is one.
pub fn marker_instance(doc: &Document, id: NodeId) -> Option<usize> {
    let el = doc.element(id)?;
    if !el.has_class(MARKER_CLASS) {
        return None;
    }
    el.attr(INSTANCE_ATTR)?.parse().ok()
}

/// Unwrap every marker element and re-merge the text nodes the wrapping
/// split apart. Returns the number of markers removed.
pub fn clear_markers(doc: &mut Document) -> usize {
    let found = markers(doc);
    for &marker in &found {
        doc.unwrap(marker);
    }
    let body = doc.body();
    doc.merge_adjacent_text(body);
    found.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::locate_all;

    #[test]
    fn wrapping_preserves_text_content() {
        let mut doc = Document::from_body_markup("<p>one two three</p>").unwrap();
        let spans = locate_all(&doc, "two");
        wrap_span(&mut doc, &spans[0], Category::Fluff, 0);
        let body = doc.body();
        assert_eq!(doc.text_content(body), "one two three");
        assert_eq!(
            doc.body_markup(),
            "<p>one <span class=\"critic-highlight highlight-fluff\" data-critic-id=\"0\">two</span> three</p>"
        );
    }

    #[test]
    fn cross_node_match_gets_one_wrapper_per_segment() {
        let mut doc = Document::from_body_markup("<p>hello <b>world</b>, it is</p>").unwrap();
        let spans = locate_all(&doc, "world, it");
        let wrappers = wrap_span(&mut doc, &spans[0], Category::Fallacy, 3);
        assert_eq!(wrappers.len(), 2);
        let body = doc.body();
        assert_eq!(doc.text_content(body), "hello world, it is");
        for w in wrappers {
            assert_eq!(marker_instance(&doc, w), Some(3));
        }
    }

    #[test]
    fn clear_restores_original_markup() {
        let mut doc = Document::from_body_markup("<p>alpha beta gamma</p>").unwrap();
        let spans = locate_all(&doc, "beta");
        wrap_span(&mut doc, &spans[0], Category::Assumption, 0);
        assert_eq!(clear_markers(&mut doc), 1);
        assert_eq!(doc.body_markup(), "<p>alpha beta gamma</p>");
        let paragraph = doc.children(doc.body())[0];
        // merge_adjacent_text folded the three split nodes back into one.
        assert_eq!(doc.children(paragraph).len(), 1);
    }

    #[test]
    fn wrapped_text_is_excluded_from_later_matching() {
        let mut doc = Document::from_body_markup("<p>repeat</p>").unwrap();
        let spans = locate_all(&doc, "repeat");
        wrap_span(&mut doc, &spans[0], Category::Fluff, 0);
        assert!(locate_all(&doc, "repeat").is_empty());
    }

    #[test]
    fn clear_on_clean_document_is_a_no_op() {
        let mut doc = Document::from_body_markup("<p>nothing here</p>").unwrap();
        assert_eq!(clear_markers(&mut doc), 0);
        assert_eq!(doc.body_markup(), "<p>nothing here</p>");
    }
}

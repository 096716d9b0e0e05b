//! Overlay rendering: positioned boxes in a dedicated container, the page's
//! own text nodes untouched.
//!
//! Each highlight becomes an [`OverlayBox`] remembering the quote it was
//! anchored to. Because overlay geometry goes stale the moment the page
//! reflows, [`OverlayLayer::refresh`] re-locates every box from its stored
//! quote and repaints; a box whose quote no longer resolves is hidden, not
//! dropped, so it reappears if the text comes back.

use tracing::debug;

use crate::descriptor::Category;
use crate::dom::{Document, NodeId};
use crate::geometry::Rect;
use crate::layout::LayoutProvider;
use crate::locate::locate_all;
use crate::render::INSTANCE_ATTR;
use crate::style::{OVERLAY_BOX_CLASS, OVERLAY_CONTAINER_ID};

/// One overlay highlight: the quote it anchors to, which occurrence of that
/// quote it covers, and the box elements currently painted for it.
#[derive(Debug)]
pub struct OverlayBox {
    pub instance: usize,
    pub source_text: String,
    pub category: Category,
    /// Which of the quote's resolved occurrences this box covers.
    pub occurrence: usize,
    pub rects: Vec<Rect>,
    pub visible: bool,
    elements: Vec<NodeId>,
}

/// The overlay container and every box painted into it.
#[derive(Debug, Default)]
pub struct OverlayLayer {
    container: Option<NodeId>,
    boxes: Vec<OverlayBox>,
}

impl OverlayLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boxes(&self) -> &[OverlayBox] {
        &self.boxes
    }

    /// The container element, appended to `<body>` on first use.
    fn container(&mut self, doc: &mut Document) -> NodeId {
        if let Some(id) = self.container {
            if doc.parent(id).is_some() {
                return id;
            }
        }
        let container = doc.create_element("div");
        doc.element_mut(container)
            .unwrap()
            .set_attr("id", OVERLAY_CONTAINER_ID);
        let body = doc.body();
        doc.append_child(body, container);
        self.container = Some(container);
        container
    }

    /// Register and paint boxes for every occurrence of `source_text`.
    /// Returns the number of occurrences that resolved.
    pub fn add(
        &mut self,
        doc: &mut Document,
        layout: &dyn LayoutProvider,
        source_text: &str,
        category: Category,
        instance: usize,
    ) -> usize {
        let spans = locate_all(doc, source_text);
        for (occurrence, span) in spans.iter().enumerate() {
            let rects = layout.segment_rects(doc, &span.segments);
            let mut overlay_box = OverlayBox {
                instance,
                source_text: source_text.to_string(),
                category,
                occurrence,
                rects: Vec::new(),
                visible: false,
                elements: Vec::new(),
            };
            self.paint(doc, &mut overlay_box, rects);
            self.boxes.push(overlay_box);
        }
        spans.len()
    }

    /// Re-locate every box from its stored quote and repaint its rects.
    /// Boxes whose quote no longer resolves (or resolves to fewer
    /// occurrences) are hidden.
    pub fn refresh(&mut self, doc: &mut Document, layout: &dyn LayoutProvider) {
        let mut boxes = std::mem::take(&mut self.boxes);
        for overlay_box in &mut boxes {
            let spans = locate_all(doc, &overlay_box.source_text);
            let rects = match spans.get(overlay_box.occurrence) {
                Some(span) => layout.segment_rects(doc, &span.segments),
                None => Vec::new(),
            };
            if rects.is_empty() {
                debug!(text = %overlay_box.source_text, "overlay box no longer resolves, hiding");
            }
            self.paint(doc, overlay_box, rects);
        }
        self.boxes = boxes;
    }

    /// Replace a box's painted elements with one div per rect. An empty rect
    /// list hides the box.
    fn paint(&mut self, doc: &mut Document, overlay_box: &mut OverlayBox, rects: Vec<Rect>) {
        for &el in &overlay_box.elements {
            doc.detach(el);
        }
        overlay_box.elements.clear();
        overlay_box.visible = !rects.is_empty();
        let container = self.container(doc);
        for rect in &rects {
            let el = doc.create_element("div");
            {
                let data = doc.element_mut(el).unwrap();
                data.add_class(OVERLAY_BOX_CLASS);
                data.add_class(&overlay_box.category.highlight_class());
                data.set_attr(INSTANCE_ATTR, overlay_box.instance.to_string());
                data.set_attr(
                    "style",
                    format!(
                        "left:{}px;top:{}px;width:{}px;height:{}px",
                        rect.x, rect.y, rect.width, rect.height
                    ),
                );
            }
            doc.append_child(container, el);
            overlay_box.elements.push(el);
        }
        overlay_box.rects = rects;
    }

    /// Remove every box and the container itself.
    pub fn clear(&mut self, doc: &mut Document) {
        if let Some(container) = self.container.take() {
            doc.detach(container);
        }
        self.boxes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::MonospaceLayout;

    fn layout() -> MonospaceLayout {
        MonospaceLayout {
            char_width: 10.0,
            line_height: 20.0,
            columns: 40,
            block_gap: 0.0,
        }
    }

    #[test]
    fn add_paints_boxes_without_touching_page_text() {
        let mut doc = Document::from_body_markup("<p>hello world</p>").unwrap();
        let mut layer = OverlayLayer::new();
        let resolved = layer.add(&mut doc, &layout(), "world", Category::Fluff, 0);
        assert_eq!(resolved, 1);
        assert_eq!(layer.boxes().len(), 1);
        assert_eq!(layer.boxes()[0].rects, vec![Rect::new(60.0, 0.0, 50.0, 20.0)]);
        // The paragraph's own markup is untouched.
        let paragraph = doc.children(doc.body())[0];
        assert_eq!(crate::dom::serialize_node(&doc, paragraph), "<p>hello world</p>");
    }

    #[test]
    fn refresh_hides_boxes_whose_text_went_away() {
        let mut doc = Document::from_body_markup("<p>soon gone</p>").unwrap();
        let mut layer = OverlayLayer::new();
        layer.add(&mut doc, &layout(), "gone", Category::Fallacy, 0);
        assert!(layer.boxes()[0].visible);

        let paragraph = doc.children(doc.body())[0];
        let text = doc.children(paragraph)[0];
        doc.set_text(text, "soon replaced");
        layer.refresh(&mut doc, &layout());
        assert!(!layer.boxes()[0].visible);

        doc.set_text(text, "soon gone");
        layer.refresh(&mut doc, &layout());
        assert!(layer.boxes()[0].visible);
    }

    #[test]
    fn clear_removes_the_container() {
        let mut doc = Document::from_body_markup("<p>text here</p>").unwrap();
        let mut layer = OverlayLayer::new();
        layer.add(&mut doc, &layout(), "text", Category::Assumption, 0);
        layer.clear(&mut doc);
        let body = doc.body();
        assert!(doc
            .find_all(body, |doc, id| doc
                .element(id)
                .map_or(false, |el| el.attr("id") == Some(OVERLAY_CONTAINER_ID)))
            .is_empty());
        assert!(layer.boxes().is_empty());
    }
}

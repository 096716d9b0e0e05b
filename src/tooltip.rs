//! The single shared tooltip and its hover lifecycle.
//!
//! One tooltip element serves every highlight. It is created lazily on the
//! first show, repopulated per highlight, and positioned in viewport
//! coordinates near the highlight's anchor rect. Hiding is deferred by a
//! short grace period so the pointer can travel from the highlight into the
//! tooltip without it vanishing underneath; time is passed in explicitly so
//! the whole lifecycle is testable without a real clock.

use crate::descriptor::HighlightDescriptor;
use crate::dom::{Document, NodeId};
use crate::geometry::{Point, Rect, Size, Viewport};
use crate::layout::LayoutProvider;
use crate::style::TOOLTIP_CLASS;

/// Milliseconds the pointer may be outside both the highlight and the
/// tooltip before the tooltip hides.
pub const HIDE_GRACE_MS: u64 = 100;

/// Minimum distance kept between the tooltip and every viewport edge.
const EDGE_MARGIN: f64 = 5.0;

/// Gap between the anchor rect and the tooltip.
const ANCHOR_GAP: f64 = 8.0;

const MAX_WIDTH: f64 = 300.0;

#[derive(Debug, Default)]
pub struct TooltipController {
    element: Option<NodeId>,
    active_instance: Option<usize>,
    visible: bool,
    hide_deadline: Option<u64>,
}

impl TooltipController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Instance id of the highlight currently shown, if any.
    pub fn active_instance(&self) -> Option<usize> {
        self.active_instance
    }

    fn ensure_element(&mut self, doc: &mut Document) -> NodeId {
        if let Some(id) = self.element {
            if doc.parent(id).is_some() {
                return id;
            }
        }
        let el = doc.create_element("div");
        doc.element_mut(el).unwrap().add_class(TOOLTIP_CLASS);
        let body = doc.body();
        doc.append_child(body, el);
        self.element = Some(el);
        el
    }

    /// Populate and show the tooltip for a highlight anchored at `anchor`
    /// (document coordinates). Cancels any pending hide.
    pub fn show(
        &mut self,
        doc: &mut Document,
        layout: &dyn LayoutProvider,
        viewport: &Viewport,
        descriptor: &HighlightDescriptor,
        instance: usize,
        anchor: Rect,
    ) {
        let el = self.ensure_element(doc);
        for child in doc.children(el).to_vec() {
            doc.detach(child);
        }

        let badge = doc.create_element("span");
        {
            let data = doc.element_mut(badge).unwrap();
            data.add_class("critic-tooltip-badge");
            data.add_class(&descriptor.category.tooltip_class());
        }
        let badge_text = doc.create_text(descriptor.category.badge_label());
        doc.append_child(badge, badge_text);
        doc.append_child(el, badge);

        let explanation = doc.create_element("div");
        doc.element_mut(explanation)
            .unwrap()
            .add_class("critic-tooltip-explanation");
        let explanation_text = doc.create_text(descriptor.explanation.clone());
        doc.append_child(explanation, explanation_text);
        doc.append_child(el, explanation);

        if let Some(suggestion) = &descriptor.suggestion {
            let block = doc.create_element("div");
            doc.element_mut(block)
                .unwrap()
                .add_class("critic-tooltip-suggestion");
            let text = doc.create_text(suggestion.clone());
            doc.append_child(block, text);
            doc.append_child(el, block);
        }

        let body = format!(
            "{}\n{}{}",
            descriptor.category.badge_label(),
            descriptor.explanation,
            descriptor
                .suggestion
                .as_deref()
                .map(|s| format!("\n{}", s))
                .unwrap_or_default()
        );
        let size = layout.measure_text(&body, MAX_WIDTH);
        let at = place(viewport.to_viewport(anchor), size, viewport);
        {
            let data = doc.element_mut(el).unwrap();
            data.set_attr("style", format!("left:{}px;top:{}px", at.x, at.y));
            data.add_class("visible");
        }

        self.active_instance = Some(instance);
        self.visible = true;
        self.hide_deadline = None;
    }

    /// The pointer left the highlight (or the tooltip). Hiding is deferred
    /// by the grace period.
    pub fn pointer_left(&mut self, now: u64) {
        if self.visible && self.hide_deadline.is_none() {
            self.hide_deadline = Some(now + HIDE_GRACE_MS);
        }
    }

    /// The pointer entered the tooltip or re-entered the highlight before
    /// the grace period elapsed.
    pub fn pointer_entered(&mut self) {
        self.hide_deadline = None;
    }

    /// Advance time; hides the tooltip once the grace deadline passes.
    pub fn tick(&mut self, doc: &mut Document, now: u64) {
        if let Some(deadline) = self.hide_deadline {
            if now >= deadline {
                self.hide(doc);
            }
        }
    }

    pub fn hide(&mut self, doc: &mut Document) {
        if let Some(el) = self.element {
            if let Some(data) = doc.element_mut(el) {
                data.remove_class("visible");
            }
        }
        self.visible = false;
        self.active_instance = None;
        self.hide_deadline = None;
    }

    /// Remove the tooltip element entirely; it is recreated on next show.
    pub fn teardown(&mut self, doc: &mut Document) {
        self.hide(doc);
        if let Some(el) = self.element.take() {
            doc.detach(el);
        }
    }
}

/// Viewport position for a tooltip of `size` next to `anchor` (both in
/// viewport coordinates): below the anchor and left-aligned with it, flipped
/// above when it would run past the bottom edge, right-aligned when it would
/// run past the right edge, and always clamped inside the edge margin.
pub fn place(anchor: Rect, size: Size, viewport: &Viewport) -> Point {
    let mut x = anchor.left();
    if x + size.width > viewport.width - EDGE_MARGIN {
        x = anchor.right() - size.width;
    }
    x = x.max(EDGE_MARGIN);

    let mut y = anchor.bottom() + ANCHOR_GAP;
    if y + size.height > viewport.height - EDGE_MARGIN {
        y = anchor.top() - size.height - ANCHOR_GAP;
    }
    y = y.max(EDGE_MARGIN);

    Point { x, y }
}

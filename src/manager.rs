//! Batch lifecycle: take a set of descriptors, paint them, own the fallout.
//!
//! The manager is the only writer of highlight state. `apply` is
//! replace-not-merge: it clears whatever the previous batch painted before
//! rendering the new one, processes descriptors in order, and skips (with a
//! warning) any descriptor that no longer anchors, so one stale quote never
//! sinks the batch. It also owns the hover plumbing that connects markers to
//! the shared tooltip.

use tracing::{debug, warn};

use crate::descriptor::HighlightDescriptor;
use crate::dom::{Document, NodeId};
use crate::error::SkipReason;
use crate::geometry::{Rect, Viewport};
use crate::layout::LayoutProvider;
use crate::locate::{locate_all, SpanSegment};
use crate::normalize::normalize;
use crate::render::{
    clear_markers, highlight_instance, marker_instance, markers, wrap_span, OverlayLayer,
    RenderMode,
};
use crate::style::inject_stylesheet;
use crate::tooltip::TooltipController;

/// Owns the currently rendered highlight set and every piece of chrome it
/// created. One manager per document.
pub struct HighlightSetManager<L: LayoutProvider> {
    layout: L,
    mode: RenderMode,
    viewport: Viewport,
    descriptors: Vec<HighlightDescriptor>,
    overlay: OverlayLayer,
    tooltip: TooltipController,
    /// Re-entrancy guard: DOM mutation observers must not trigger a nested
    /// apply while one is in flight.
    applying: bool,
}

impl<L: LayoutProvider> HighlightSetManager<L> {
    pub fn new(layout: L, viewport: Viewport) -> Self {
        Self {
            layout,
            mode: RenderMode::default(),
            viewport,
            descriptors: Vec::new(),
            overlay: OverlayLayer::new(),
            tooltip: TooltipController::new(),
            applying: false,
        }
    }

    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn descriptors(&self) -> &[HighlightDescriptor] {
        &self.descriptors
    }

    pub fn descriptor(&self, instance: usize) -> Option<&HighlightDescriptor> {
        self.descriptors.get(instance)
    }

    /// Replace the rendered set with `descriptors`. Returns the number of
    /// spans that actually rendered; descriptors that fail to anchor are
    /// skipped and logged, never fatal.
    pub fn apply(&mut self, doc: &mut Document, descriptors: Vec<HighlightDescriptor>) -> usize {
        debug_assert!(!self.applying, "apply re-entered while a batch is in flight");
        self.applying = true;
        inject_stylesheet(doc);
        self.clear(doc);
        self.descriptors = descriptors;

        let mut rendered = 0;
        for instance in 0..self.descriptors.len() {
            let descriptor = self.descriptors[instance].clone();
            if normalize(&descriptor.text).is_empty() {
                warn!(
                    reason = %SkipReason::EmptyNormalizedText,
                    text = %descriptor.text,
                    "skipping descriptor"
                );
                continue;
            }
            let spans_rendered = match self.mode {
                RenderMode::Inline => {
                    let spans = locate_all(doc, &descriptor.text);
                    for span in &spans {
                        wrap_span(doc, span, descriptor.category, instance);
                    }
                    spans.len()
                }
                RenderMode::Overlay => self.overlay.add(
                    doc,
                    &self.layout,
                    &descriptor.text,
                    descriptor.category,
                    instance,
                ),
            };
            if spans_rendered == 0 {
                warn!(
                    reason = %SkipReason::NotFound,
                    text = %descriptor.text,
                    "skipping descriptor"
                );
            } else {
                debug!(%instance, spans = spans_rendered, "descriptor rendered");
                rendered += spans_rendered;
            }
        }
        self.applying = false;
        rendered
    }

    /// Remove everything this manager painted, tooltip included. The
    /// injected stylesheet stays; it is inert without markers.
    pub fn clear(&mut self, doc: &mut Document) {
        clear_markers(doc);
        self.overlay.clear(doc);
        self.tooltip.teardown(doc);
        self.descriptors.clear();
    }

    /// The page scrolled or resized: remember the new viewport and, in
    /// overlay mode, repaint every box from its stored quote.
    pub fn viewport_changed(&mut self, doc: &mut Document, viewport: Viewport) {
        self.viewport = viewport;
        if self.mode == RenderMode::Overlay {
            self.overlay.refresh(doc, &self.layout);
        }
    }

    /// Document-coordinate rect anchoring the tooltip for `instance`.
    fn anchor_rect(&self, doc: &Document, instance: usize) -> Option<Rect> {
        match self.mode {
            RenderMode::Inline => {
                let mut segments = Vec::new();
                for marker in markers(doc) {
                    if marker_instance(doc, marker) != Some(instance) {
                        continue;
                    }
                    for child in doc.children(marker) {
                        if let Some(text) = doc.text(*child) {
                            segments.push(SpanSegment {
                                node: *child,
                                start: 0,
                                end: text.len(),
                            });
                        }
                    }
                }
                self.layout.segment_rects(doc, &segments).first().copied()
            }
            RenderMode::Overlay => self
                .overlay
                .boxes()
                .iter()
                .find(|b| b.instance == instance && b.visible)
                .and_then(|b| b.rects.first().copied()),
        }
    }

    /// The pointer entered the element `target`. Shows the tooltip when the
    /// target is (or sits inside) a highlight of this set.
    pub fn pointer_over(&mut self, doc: &mut Document, target: NodeId) {
        let hit = doc
            .closest(target, |doc, id| highlight_instance(doc, id).is_some())
            .and_then(|element| highlight_instance(doc, element));
        let instance = match hit {
            Some(instance) => instance,
            None => return,
        };
        if self.tooltip.active_instance() == Some(instance) {
            self.tooltip.pointer_entered();
            return;
        }
        let descriptor = match self.descriptors.get(instance) {
            Some(d) => d.clone(),
            None => return,
        };
        let anchor = match self.anchor_rect(doc, instance) {
            Some(rect) => rect,
            None => {
                debug!(%instance, reason = %SkipReason::GeometryUnavailable, "tooltip not shown");
                return;
            }
        };
        self.tooltip.show(
            doc,
            &self.layout,
            &self.viewport,
            &descriptor,
            instance,
            anchor,
        );
    }

    /// The pointer left a highlight or the tooltip.
    pub fn pointer_out(&mut self, now: u64) {
        self.tooltip.pointer_left(now);
    }

    /// The pointer entered the tooltip itself.
    pub fn pointer_over_tooltip(&mut self) {
        self.tooltip.pointer_entered();
    }

    /// Advance time-driven state (the tooltip hide grace period).
    pub fn tick(&mut self, doc: &mut Document, now: u64) {
        self.tooltip.tick(doc, now);
    }

    pub fn tooltip_visible(&self) -> bool {
        self.tooltip.is_visible()
    }
}

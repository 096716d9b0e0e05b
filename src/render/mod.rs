//! Turning resolved spans into something visible.
//!
//! Two strategies: [`inline`] wraps the matched text nodes in marker `<span>`
//! elements (splitting text nodes at the match boundaries), [`overlay`] keeps
//! the page's text untouched and paints absolutely positioned boxes over it.

mod inline;
mod overlay;

pub use inline::{clear_markers, marker_instance, markers, wrap_span, INSTANCE_ATTR};
pub use overlay::{OverlayBox, OverlayLayer};

use crate::dom::{Document, NodeId};
use crate::style::{MARKER_CLASS, OVERLAY_BOX_CLASS};

/// Instance id stored on a highlight element of either strategy: an inline
/// marker span or an overlay box div. Hover hit-testing goes through this so
/// both strategies reach the same tooltip.
pub fn highlight_instance(doc: &Document, id: NodeId) -> Option<usize> {
    let el = doc.element(id)?;
    if !el.has_class(MARKER_CLASS) && !el.has_class(OVERLAY_BOX_CLASS) {
        return None;
    }
    el.attr(INSTANCE_ATTR)?.parse().ok()
}

/// How highlights are painted onto the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Wrap matched text in marker spans inside the page's own flow.
    Inline,
    /// Draw positioned boxes in a separate container above the page.
    Overlay,
}

impl Default for RenderMode {
    fn default() -> Self {
        RenderMode::Inline
    }
}

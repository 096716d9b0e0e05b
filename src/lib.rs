//! Re-anchor model-quoted text onto a live page and render it as highlights.
//!
//! A language model critiques the visible text of a page and answers with
//! verbatim quotes. By the time those quotes come back the page may have
//! reflowed, re-rendered, or been partially edited, so nothing but the text
//! itself links a quote to the DOM. This crate rebuilds that link:
//!
//! - [`normalize`] - Whitespace/tag/comment-insensitive text projection with
//!   offset maps back into the raw input
//! - [`locate_all`] - Re-anchors a quote onto per-text-node byte ranges,
//!   block by block
//! - [`wrap_span`] / [`OverlayLayer`] - Inline marker and overlay box
//!   rendering strategies
//! - [`TooltipController`] - The single shared tooltip and its hover grace
//!   period
//! - [`HighlightSetManager`] - Batch lifecycle: apply, clear, refresh, hover
//! - [`TranslationSession`] - In-place page translation with full revert
//!
//! The [`dom`] module is an owned document tree with just enough of the DOM
//! surface (split, wrap, unwrap, tree walks) for the engine to operate on;
//! hosts embedding the engine in a browser supply a [`LayoutProvider`] for
//! real geometry, while tests use the deterministic [`MonospaceLayout`].

pub mod dom;

mod descriptor;
mod error;
mod geometry;
mod layout;
mod locate;
mod manager;
mod normalize;
mod render;
mod selection;
mod style;
mod tooltip;
mod translate;

pub use descriptor::{Category, HighlightDescriptor};
pub use dom::{Document, MarkupError, NodeId};
pub use error::SkipReason;
pub use geometry::{Point, Rect, Size, Viewport};
pub use layout::{LayoutProvider, MonospaceLayout};
pub use locate::{default_exclusion, is_engine_ui, locate_all, ResolvedSpan, SpanSegment};
pub use manager::HighlightSetManager;
pub use normalize::{normalize, NormalizedText};
pub use render::{
    clear_markers, highlight_instance, marker_instance, markers, wrap_span, OverlayBox,
    OverlayLayer, RenderMode,
    INSTANCE_ATTR,
};
pub use selection::{selected_text, Selection};
pub use style::{
    inject_stylesheet, MARKER_CLASS, OVERLAY_BOX_CLASS, OVERLAY_CONTAINER_ID, STYLE_ELEMENT_ID,
    TOOLTIP_CLASS, TRANSLATED_CLASS,
};
pub use tooltip::{place, TooltipController, HIDE_GRACE_MS};
pub use translate::{entry_key, CollectOptions, TranslationSession};

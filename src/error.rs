//! Error and skip taxonomy.
//!
//! Per-descriptor failures are skip reasons, not errors: a batch always
//! runs to completion and reports how many spans actually rendered.

use thiserror::Error;

/// Why a descriptor (or one refresh of an overlay box) produced nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// The quote does not occur anywhere in the current document.
    #[error("text not found in document")]
    NotFound,
    /// The quote normalizes to an empty string.
    #[error("descriptor text is empty after normalization")]
    EmptyNormalizedText,
    /// The overlay strategy could not compute a rectangle this cycle; the
    /// box is hidden, not removed, and may reappear on the next layout pass.
    #[error("no geometry available for the resolved range")]
    GeometryUnavailable,
}

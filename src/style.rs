//! Class-name contract and injected stylesheet.
//!
//! The engine only assigns class names; every color and hover treatment
//! lives in this one injected stylesheet so hosts can override it wholesale.

use once_cell::sync::Lazy;

use crate::descriptor::Category;
use crate::dom::Document;

/// Base class carried by every inline marker element. Text under an element
/// with this class is excluded from matching, which is what prevents
/// re-highlighting already-highlighted content.
pub const MARKER_CLASS: &str = "critic-highlight";

/// Class carried by every tooltip element.
pub const TOOLTIP_CLASS: &str = "critic-tooltip";

/// Id and class of the single overlay container.
pub const OVERLAY_CONTAINER_ID: &str = "critic-overlay";

/// Class carried by each overlay box.
pub const OVERLAY_BOX_CLASS: &str = "critic-overlay-box";

/// Class added to parents of translated text nodes.
pub const TRANSLATED_CLASS: &str = "critic-translated";

/// Id of the injected `<style>` element, used as the idempotency check.
pub const STYLE_ELEMENT_ID: &str = "critic-style";

static STYLESHEET: Lazy<String> = Lazy::new(|| {
    let mut css = String::from(concat!(
        ".critic-highlight { position: relative; padding: 2px 0; border-radius: 2px; ",
        "display: inline; cursor: help; }\n",
        "#critic-overlay { position: absolute; top: 0; left: 0; pointer-events: none; }\n",
        ".critic-overlay-box { position: absolute; pointer-events: auto; border-radius: 2px; }\n",
        ".critic-tooltip { position: fixed; background: white; border: 1px solid #ddd; ",
        "border-radius: 4px; padding: 12px 16px; max-width: 300px; opacity: 0; ",
        "pointer-events: none; }\n",
        ".critic-tooltip.visible { opacity: 1; pointer-events: auto; }\n",
    ));
    for category in &Category::ALL {
        css.push_str(&format!(
            ".{class} {{ background-color: var(--critic-{name}-bg); border-bottom: 2px solid var(--critic-{name}-edge); }}\n",
            class = category.highlight_class(),
            name = category.as_str(),
        ));
        css.push_str(&format!(
            ".{class} {{ background-color: var(--critic-{name}-badge-bg); color: var(--critic-{name}-badge-fg); }}\n",
            class = category.tooltip_class(),
            name = category.as_str(),
        ));
    }
    css
});

/// Append the engine stylesheet to `<head>` unless it is already present.
/// Returns true when a new element was injected.
pub fn inject_stylesheet(doc: &mut Document) -> bool {
    let head = doc.head();
    let already = doc
        .children(head)
        .iter()
        .any(|&c| doc.element(c).and_then(|el| el.attr("id")) == Some(STYLE_ELEMENT_ID));
    if already {
        return false;
    }
    let style = doc.create_element("style");
    doc.element_mut(style)
        .expect("just-created element")
        .set_attr("id", STYLE_ELEMENT_ID);
    let text = doc.create_text(STYLESHEET.as_str());
    doc.append_child(style, text);
    doc.append_child(head, style);
    true
}

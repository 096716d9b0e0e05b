//! Anchoring fidelity against the messy markup quotes actually come back
//! from: inline tags splitting the match, entity-ridden whitespace, dynamic
//! edits between critique and render.

use crate::dom::Document;
use crate::{locate_all, normalize, Category, HighlightDescriptor, HighlightSetManager};
use crate::{MonospaceLayout, Viewport};

fn manager() -> HighlightSetManager<MonospaceLayout> {
    HighlightSetManager::new(MonospaceLayout::default(), Viewport::new(1024.0, 768.0))
}

#[test]
fn quote_straddling_an_inline_tag_boundary() {
    let doc = Document::from_body_markup("<p>hello <b>world</b>, it is fine</p>").unwrap();
    let spans = locate_all(&doc, "world, it");
    assert_eq!(spans.len(), 1);
    let segs = &spans[0].segments;
    assert_eq!(segs.len(), 2);
    assert_eq!((segs[0].start, segs[0].end), (0, 5));
    assert_eq!((segs[1].start, segs[1].end), (0, 4));
}

#[test]
fn quote_with_collapsed_whitespace_and_newlines() {
    let doc =
        Document::from_body_markup("<p>too   many\n\t spaces   in here</p>").unwrap();
    let spans = locate_all(&doc, "too many spaces");
    assert_eq!(spans.len(), 1);
    // The raw segment reaches exactly through "spaces", trailing whitespace
    // excluded.
    let seg = spans[0].segments[0];
    let text = doc.text(seg.node).unwrap();
    assert_eq!(normalize(&text[seg.start..seg.end]), "too many spaces");
}

#[test]
fn quote_matching_in_several_blocks_at_once() {
    let doc = Document::from_body_markup(
        "<p>the usual caveats apply</p><div>notes</div><p>the usual caveats apply</p>",
    )
    .unwrap();
    let spans = locate_all(&doc, "the usual caveats apply");
    assert_eq!(spans.len(), 2);
    assert_ne!(spans[0].block, spans[1].block);
}

#[test]
fn match_is_case_sensitive_after_normalization() {
    let doc = Document::from_body_markup("<p>Sensitive Case</p>").unwrap();
    assert!(locate_all(&doc, "sensitive case").is_empty());
    assert_eq!(locate_all(&doc, "Sensitive Case").len(), 1);
}

#[test]
fn edits_between_critique_and_render_degrade_gracefully() {
    let mut doc =
        Document::from_body_markup("<p>keep this line</p><p>drop this line</p>").unwrap();
    let descriptors = vec![
        HighlightDescriptor::new("keep this line", Category::Fluff, "kept"),
        HighlightDescriptor::new("drop this line", Category::Fluff, "gone"),
    ];

    // Simulate the page rewriting the second paragraph before render.
    let second = doc.children(doc.body())[1];
    let text = doc.children(second)[0];
    doc.set_text(text, "entirely new words");

    let mut mgr = manager();
    assert_eq!(mgr.apply(&mut doc, descriptors), 1);
    assert!(doc.body_markup().contains(">keep this line</span>"));
}

#[test]
fn multibyte_text_anchors_on_char_boundaries() {
    let mut doc =
        Document::from_body_markup("<p>voil\u{e0} un r\u{e9}sultat net</p>").unwrap();
    let mut mgr = manager();
    let rendered = mgr.apply(
        &mut doc,
        vec![HighlightDescriptor::new(
            "un r\u{e9}sultat",
            Category::Inconsistency,
            "accented",
        )],
    );
    assert_eq!(rendered, 1);
    let body = doc.body();
    assert_eq!(doc.text_content(body), "voil\u{e0} un r\u{e9}sultat net");
}

//! Full batch lifecycle over realistic page markup: apply a critique,
//! hover, translate, clear, and leave the page exactly as it started.

use std::collections::HashMap;

use crate::dom::{serialize_node, Document};
use crate::{
    Category, CollectOptions, HighlightDescriptor, HighlightSetManager, MonospaceLayout,
    RenderMode, TranslationSession, Viewport,
};

const ARTICLE: &str = concat!(
    "<article>",
    "<h1>On the state of things</h1>",
    "<p>It goes without saying that our approach is, in every meaningful sense, ",
    "the <b>best</b> one available.</p>",
    "<p>Everyone agrees that the results speak for themselves.</p>",
    "<script>var tracking = true;</script>",
    "</article>"
);

fn manager() -> HighlightSetManager<MonospaceLayout> {
    HighlightSetManager::new(MonospaceLayout::default(), Viewport::new(1024.0, 768.0))
}

fn critique() -> Vec<HighlightDescriptor> {
    vec![
        HighlightDescriptor::new(
            "It goes without saying",
            Category::Fluff,
            "Filler that asserts obviousness instead of arguing it.",
        )
        .with_suggestion("Delete the phrase."),
        HighlightDescriptor::new(
            "Everyone agrees",
            Category::Fallacy,
            "Appeal to popularity.",
        ),
        HighlightDescriptor::new(
            "this text is not on the page",
            Category::Assumption,
            "Should be skipped.",
        ),
    ]
}

#[test]
fn apply_hover_clear_round_trip() {
    let mut doc = Document::from_body_markup(ARTICLE).unwrap();
    let mut mgr = manager();

    let rendered = mgr.apply(&mut doc, critique());
    assert_eq!(rendered, 2);

    let markup = doc.body_markup();
    assert!(markup.contains("highlight-fluff"));
    assert!(markup.contains("highlight-fallacy"));
    // The page still reads the same.
    let body = doc.body();
    assert!(doc
        .text_content(body)
        .contains("It goes without saying that our approach"));

    // Hover the first highlight, then let the grace period run out.
    let marker = crate::markers(&doc)[0];
    let inner = doc.children(marker)[0];
    mgr.pointer_over(&mut doc, inner);
    assert!(mgr.tooltip_visible());
    mgr.pointer_out(10_000);
    mgr.tick(&mut doc, 10_100);
    assert!(!mgr.tooltip_visible());

    mgr.clear(&mut doc);
    let article = doc.children(doc.body())[0];
    assert_eq!(serialize_node(&doc, article), ARTICLE);
}

#[test]
fn reapplying_the_same_critique_is_stable() {
    let mut doc = Document::from_body_markup(ARTICLE).unwrap();
    let mut mgr = manager();

    assert_eq!(mgr.apply(&mut doc, critique()), 2);
    let first = doc.body_markup();
    // Re-apply replaces rather than stacking: same count, same markup.
    assert_eq!(mgr.apply(&mut doc, critique()), 2);
    assert_eq!(doc.body_markup(), first);
}

#[test]
fn overlay_mode_never_mutates_page_markup() {
    let mut doc = Document::from_body_markup(ARTICLE).unwrap();
    let mut mgr = manager().with_mode(RenderMode::Overlay);

    assert_eq!(mgr.apply(&mut doc, critique()), 2);
    let article = doc.children(doc.body())[0];
    assert_eq!(serialize_node(&doc, article), ARTICLE);

    mgr.clear(&mut doc);
    assert_eq!(doc.body_markup(), ARTICLE);
}

#[test]
fn translation_coexists_with_highlights_and_reverts() {
    let mut doc =
        Document::from_body_markup("<p>Good morning to all</p><p>Short note</p>").unwrap();

    let mut session = TranslationSession::collect(&doc, &CollectOptions::default());
    let payload: HashMap<String, String> = vec![
        ("t0".to_string(), "Bonjour a tous".to_string()),
        ("t1".to_string(), "Petite note".to_string()),
    ]
    .into_iter()
    .collect();
    assert_eq!(session.apply(&mut doc, &payload), 2);

    // Highlights anchor against the translated text.
    let mut mgr = manager();
    let rendered = mgr.apply(
        &mut doc,
        vec![HighlightDescriptor::new(
            "Bonjour a tous",
            Category::Fluff,
            "greeting",
        )],
    );
    assert_eq!(rendered, 1);

    mgr.clear(&mut doc);
    assert_eq!(session.revert(&mut doc), 2);
    assert_eq!(
        doc.body_markup(),
        "<p>Good morning to all</p><p>Short note</p>"
    );
}

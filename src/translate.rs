//! In-place page translation with full revert.
//!
//! A session snapshots the translatable text nodes of a document, hands them
//! out under stable `t<N>` ids, swaps translated text back in, and can
//! restore every original. The session pins the node ids it collected; apply
//! after a structural rewrite of those nodes is the caller's problem, but a
//! node whose text merely changed still reverts cleanly.

use std::collections::HashMap;

use tracing::warn;

use crate::dom::{collect_leaf_text_nodes, Document, NodeId};
use crate::locate::default_exclusion;
use crate::normalize::normalize;
use crate::style::TRANSLATED_CLASS;

/// Which text nodes a session picks up.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Minimum length of the node's normalized text, in chars.
    pub min_chars: usize,
    /// Skip nodes with no alphabetic content (numbers, punctuation runs).
    pub skip_non_alphabetic: bool,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            min_chars: 2,
            skip_non_alphabetic: true,
        }
    }
}

#[derive(Debug)]
struct Entry {
    node: NodeId,
    original: String,
    translated: bool,
}

/// One translation pass over a document: collected originals keyed `t0`,
/// `t1`, ... in document order.
#[derive(Debug, Default)]
pub struct TranslationSession {
    entries: Vec<Entry>,
}

/// Key for the entry at `index` ("t0", "t1", ...).
pub fn entry_key(index: usize) -> String {
    format!("t{}", index)
}

fn parse_key(key: &str) -> Option<usize> {
    key.strip_prefix('t')?.parse().ok()
}

impl TranslationSession {
    /// Snapshot the translatable text nodes of `doc` in document order.
    pub fn collect(doc: &Document, options: &CollectOptions) -> Self {
        let leaves = collect_leaf_text_nodes(doc, doc.body(), default_exclusion);
        let entries = leaves
            .into_iter()
            .filter_map(|node| {
                let original = doc.text(node)?.to_string();
                let normalized = normalize(&original);
                if normalized.chars().count() < options.min_chars {
                    return None;
                }
                if options.skip_non_alphabetic && !normalized.chars().any(char::is_alphabetic) {
                    return None;
                }
                Some(Entry {
                    node,
                    original,
                    translated: false,
                })
            })
            .collect();
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Keyed originals in document order, ready to serialize into a request.
    pub fn originals(&self) -> impl Iterator<Item = (String, &str)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (entry_key(i), e.original.as_str()))
    }

    /// Swap translated text into the collected nodes. Keys are applied in
    /// numeric order regardless of map iteration order; unknown keys are
    /// logged and skipped. Parents of translated nodes get the translated
    /// class. Returns the number of nodes updated.
    pub fn apply(&mut self, doc: &mut Document, translations: &HashMap<String, String>) -> usize {
        let mut keyed: Vec<(usize, &String)> = translations
            .iter()
            .filter_map(|(key, text)| match parse_key(key) {
                Some(index) if index < self.entries.len() => Some((index, text)),
                _ => {
                    warn!(%key, "ignoring unknown translation key");
                    None
                }
            })
            .collect();
        keyed.sort_by_key(|(index, _)| *index);

        let mut updated = 0;
        for (index, text) in keyed {
            let entry = &mut self.entries[index];
            doc.set_text(entry.node, text.clone());
            entry.translated = true;
            updated += 1;
            if let Some(parent) = doc.parent(entry.node) {
                if let Some(el) = doc.element_mut(parent) {
                    el.add_class(TRANSLATED_CLASS);
                }
            }
        }
        updated
    }

    /// Restore every translated node to its original text and remove the
    /// translated class from its parent. Returns the number restored.
    pub fn revert(&mut self, doc: &mut Document) -> usize {
        let mut restored = 0;
        for entry in &mut self.entries {
            if !entry.translated {
                continue;
            }
            doc.set_text(entry.node, entry.original.clone());
            entry.translated = false;
            restored += 1;
            if let Some(parent) = doc.parent(entry.node) {
                if let Some(el) = doc.element_mut(parent) {
                    el.remove_class(TRANSLATED_CLASS);
                }
            }
        }
        restored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translations(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn collects_in_document_order_with_stable_keys() {
        let doc =
            Document::from_body_markup("<p>Hello there</p><p>Second one</p>").unwrap();
        let session = TranslationSession::collect(&doc, &CollectOptions::default());
        let originals: Vec<_> = session.originals().collect();
        assert_eq!(
            originals,
            vec![
                ("t0".to_string(), "Hello there"),
                ("t1".to_string(), "Second one"),
            ]
        );
    }

    #[test]
    fn short_and_non_alphabetic_nodes_are_skipped() {
        let doc = Document::from_body_markup("<p>a</p><p>42</p><p>real text</p>").unwrap();
        let session = TranslationSession::collect(&doc, &CollectOptions::default());
        let originals: Vec<_> = session.originals().collect();
        assert_eq!(originals, vec![("t0".to_string(), "real text")]);
    }

    #[test]
    fn apply_then_revert_round_trips() {
        let mut doc = Document::from_body_markup("<p>Hello there</p>").unwrap();
        let mut session = TranslationSession::collect(&doc, &CollectOptions::default());
        let updated = session.apply(&mut doc, &translations(&[("t0", "Bonjour")]));
        assert_eq!(updated, 1);
        assert_eq!(
            doc.body_markup(),
            "<p class=\"critic-translated\">Bonjour</p>"
        );

        let restored = session.revert(&mut doc);
        assert_eq!(restored, 1);
        assert_eq!(doc.body_markup(), "<p>Hello there</p>");
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut doc = Document::from_body_markup("<p>Hello there</p>").unwrap();
        let mut session = TranslationSession::collect(&doc, &CollectOptions::default());
        let updated = session.apply(
            &mut doc,
            &translations(&[("t0", "Bonjour"), ("t99", "nope"), ("junk", "nope")]),
        );
        assert_eq!(updated, 1);
    }

    #[test]
    fn keys_apply_in_numeric_not_lexical_order() {
        let markup: String = (0..11).map(|i| format!("<p>node number {}</p>", i)).collect();
        let mut doc = Document::from_body_markup(&markup).unwrap();
        let mut session = TranslationSession::collect(&doc, &CollectOptions::default());
        assert_eq!(session.len(), 11);
        // "t10" sorts before "t2" lexically; both must land on their nodes.
        let updated = session.apply(&mut doc, &translations(&[("t10", "ten"), ("t2", "two")]));
        assert_eq!(updated, 2);
        let markup = doc.body_markup();
        assert!(markup.contains(">two</p>"));
        assert!(markup.contains(">ten</p>"));
    }
}

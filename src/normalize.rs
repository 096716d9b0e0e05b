//! Text canonicalization shared by the locator and the block pre-filter.
//!
//! A quote extracted from a flattened document and the live DOM disagree on
//! whitespace and markup boundaries; both sides are funneled through the
//! same normalization so substring matching is exact afterwards. The rules
//! are deliberately narrow: comments and tag-like runs are stripped
//! (defensive; text nodes should carry neither), whitespace runs collapse to
//! a single space, and the ends are trimmed. Case and punctuation are left
//! alone — a near-miss quote is a non-match by design.

use once_cell::sync::Lazy;
use regex::Regex;

static COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern compiles"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern compiles"));

/// Canonicalize a string. Pure, total, and idempotent.
pub fn normalize(raw: &str) -> String {
    NormalizedText::of(raw).into_text()
}

/// A normalized string that remembers, for every normalized character, the
/// raw byte range it came from. This is what lets a match found in
/// normalized space be projected back onto live text nodes at character
/// precision (a collapsed whitespace run maps to its first raw character).
#[derive(Debug, Clone)]
pub struct NormalizedText {
    text: String,
    // One entry per normalized char: (raw_start_byte, raw_end_byte).
    spans: Vec<(usize, usize)>,
}

impl NormalizedText {
    pub fn of(raw: &str) -> Self {
        let removed = removed_ranges(raw);
        let mut text = String::new();
        let mut spans: Vec<(usize, usize)> = Vec::new();
        // A whitespace run is held back until the next kept character proves
        // it is interior; trailing runs are dropped, which implements trim.
        let mut pending_space: Option<(usize, usize)> = None;

        let mut removed_iter = removed.iter().peekable();
        for (byte, ch) in raw.char_indices() {
            while let Some(&&(_, end)) = removed_iter.peek() {
                if end <= byte {
                    removed_iter.next();
                } else {
                    break;
                }
            }
            if let Some(&&(start, end)) = removed_iter.peek() {
                if byte >= start && byte < end {
                    continue;
                }
            }
            let char_end = byte + ch.len_utf8();
            if ch.is_whitespace() {
                if pending_space.is_none() {
                    pending_space = Some((byte, char_end));
                }
            } else {
                if let Some(space_span) = pending_space.take() {
                    if !text.is_empty() {
                        text.push(' ');
                        spans.push(space_span);
                    }
                }
                text.push(ch);
                spans.push((byte, char_end));
            }
        }

        Self { text, spans }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Project a byte range of the normalized text back onto the raw input,
    /// returning raw `(start_byte, end_byte)`. The range must lie on char
    /// boundaries of the normalized text and be non-empty.
    pub fn raw_range(&self, norm_start: usize, norm_end: usize) -> (usize, usize) {
        debug_assert!(norm_start < norm_end && norm_end <= self.text.len());
        let char_start = self.text[..norm_start].chars().count();
        let char_end = char_start + self.text[norm_start..norm_end].chars().count();
        (self.spans[char_start].0, self.spans[char_end - 1].1)
    }

    /// Inverse projection: the normalized char index range whose raw spans
    /// intersect `[raw_start, raw_end)`. None when the raw range fell
    /// entirely into stripped or collapsed content.
    pub fn chars_for_raw(&self, raw_start: usize, raw_end: usize) -> Option<(usize, usize)> {
        let mut first = None;
        let mut last = None;
        for (idx, &(start, end)) in self.spans.iter().enumerate() {
            if end > raw_start && start < raw_end {
                if first.is_none() {
                    first = Some(idx);
                }
                last = Some(idx);
            }
        }
        Some((first?, last? + 1))
    }
}

/// Byte ranges of the raw input covered by comments or tag-like runs,
/// sorted and non-overlapping.
fn removed_ranges(raw: &str) -> Vec<(usize, usize)> {
    let mut ranges: Vec<(usize, usize)> = COMMENT_RE
        .find_iter(raw)
        .map(|m| (m.start(), m.end()))
        .collect();

    // Tag-like runs are matched against the comment-stripped text so a tag
    // interrupted by a comment is still recognized, then mapped back.
    let mut stripped = String::with_capacity(raw.len());
    let mut stripped_to_raw: Vec<usize> = Vec::with_capacity(raw.len());
    let mut range_iter = ranges.iter().peekable();
    for (byte, ch) in raw.char_indices() {
        while let Some(&&(_, end)) = range_iter.peek() {
            if end <= byte {
                range_iter.next();
            } else {
                break;
            }
        }
        let in_comment = range_iter
            .peek()
            .map_or(false, |&&(start, end)| byte >= start && byte < end);
        if !in_comment {
            stripped.push(ch);
            for offset in 0..ch.len_utf8() {
                stripped_to_raw.push(byte + offset);
            }
        }
    }

    for m in TAG_RE.find_iter(&stripped) {
        let raw_start = stripped_to_raw[m.start()];
        let raw_end = stripped_to_raw[m.end() - 1] + 1;
        ranges.push((raw_start, raw_end));
    }
    ranges.sort();
    ranges
}

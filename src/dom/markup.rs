//! Minimal markup parser and serializer for the subset of HTML the engine
//! and its tests need: elements with quoted attributes, text, comments, and
//! void elements. Not a spec-compliant HTML5 parser; malformed close tags
//! are tolerated the way browsers tolerate them (stray closers are dropped,
//! unclosed elements end at their ancestor's close).

use thiserror::Error;

use super::{Document, NodeData, NodeId};

const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "meta", "link", "wbr"];

#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("unexpected end of input inside {context} starting at byte {at}")]
    UnexpectedEof { context: &'static str, at: usize },
    #[error("malformed tag at byte {at}")]
    MalformedTag { at: usize },
}

/// Parse a markup fragment and append the resulting nodes under `parent`.
pub fn parse_fragment(
    doc: &mut Document,
    parent: NodeId,
    input: &str,
) -> Result<(), MarkupError> {
    let mut stack: Vec<NodeId> = vec![parent];
    let bytes = input.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] == b'<' {
            if input[pos..].starts_with("<!--") {
                let end = input[pos..]
                    .find("-->")
                    .ok_or(MarkupError::UnexpectedEof {
                        context: "comment",
                        at: pos,
                    })?;
                let text = &input[pos + 4..pos + end];
                let node = doc.create_comment(text);
                let top = *stack.last().expect("fragment stack is never empty");
                doc.append_child(top, node);
                pos += end + 3;
            } else if input[pos..].starts_with("</") {
                let end = input[pos..]
                    .find('>')
                    .ok_or(MarkupError::UnexpectedEof {
                        context: "close tag",
                        at: pos,
                    })?;
                let name = input[pos + 2..pos + end].trim().to_ascii_lowercase();
                // Pop to the matching open element; ignore stray closers.
                if let Some(depth) = stack
                    .iter()
                    .rposition(|&id| doc.tag(id) == Some(name.as_str()))
                {
                    if depth > 0 {
                        stack.truncate(depth);
                    }
                }
                pos += end + 1;
            } else {
                let end = input[pos..]
                    .find('>')
                    .ok_or(MarkupError::UnexpectedEof {
                        context: "open tag",
                        at: pos,
                    })?;
                let raw = &input[pos + 1..pos + end];
                let self_closing = raw.ends_with('/');
                let raw = raw.trim_end_matches('/');
                let (name, attrs) = parse_tag_body(raw, pos)?;
                let node = doc.create_element(name.clone());
                for (attr_name, attr_value) in attrs {
                    doc.element_mut(node)
                        .expect("just-created element")
                        .set_attr(&attr_name, attr_value);
                }
                let top = *stack.last().expect("fragment stack is never empty");
                doc.append_child(top, node);
                if !self_closing && !VOID_TAGS.contains(&name.as_str()) {
                    stack.push(node);
                }
                pos += end + 1;
            }
        } else {
            let end = input[pos..]
                .find('<')
                .map(|i| pos + i)
                .unwrap_or_else(|| input.len());
            let text = decode_entities(&input[pos..end]);
            let node = doc.create_text(text);
            let top = *stack.last().expect("fragment stack is never empty");
            doc.append_child(top, node);
            pos = end;
        }
    }
    Ok(())
}

fn parse_tag_body(raw: &str, at: usize) -> Result<(String, Vec<(String, String)>), MarkupError> {
    let name_end = raw
        .find(|c: char| c.is_whitespace())
        .unwrap_or_else(|| raw.len());
    let name = raw[..name_end].trim().to_ascii_lowercase();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(MarkupError::MalformedTag { at });
    }

    let mut attrs = Vec::new();
    let rest = &raw[name_end..];
    let mut p = 0;
    let bytes = rest.as_bytes();
    while p < bytes.len() {
        while p < bytes.len() && bytes[p].is_ascii_whitespace() {
            p += 1;
        }
        if p >= bytes.len() {
            break;
        }
        let attr_start = p;
        while p < bytes.len() && !bytes[p].is_ascii_whitespace() && bytes[p] != b'=' {
            p += 1;
        }
        let attr_name = rest[attr_start..p].to_ascii_lowercase();
        if attr_name.is_empty() {
            return Err(MarkupError::MalformedTag { at });
        }
        while p < bytes.len() && bytes[p].is_ascii_whitespace() {
            p += 1;
        }
        if p < bytes.len() && bytes[p] == b'=' {
            p += 1;
            while p < bytes.len() && bytes[p].is_ascii_whitespace() {
                p += 1;
            }
            if p < bytes.len() && (bytes[p] == b'"' || bytes[p] == b'\'') {
                let quote = bytes[p];
                p += 1;
                let value_start = p;
                while p < bytes.len() && bytes[p] != quote {
                    p += 1;
                }
                if p >= bytes.len() {
                    return Err(MarkupError::UnexpectedEof {
                        context: "attribute value",
                        at,
                    });
                }
                attrs.push((attr_name, decode_entities(&rest[value_start..p])));
                p += 1;
            } else {
                let value_start = p;
                while p < bytes.len() && !bytes[p].is_ascii_whitespace() {
                    p += 1;
                }
                attrs.push((attr_name, rest[value_start..p].to_string()));
            }
        } else {
            attrs.push((attr_name, String::new()));
        }
    }
    Ok((name, attrs))
}

fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(idx) = rest.find('&') {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];
        let replaced = [
            ("&amp;", "&"),
            ("&lt;", "<"),
            ("&gt;", ">"),
            ("&quot;", "\""),
            ("&#39;", "'"),
            ("&apos;", "'"),
            ("&nbsp;", "\u{a0}"),
        ]
        .iter()
        .find(|(entity, _)| rest.starts_with(entity));
        match replaced {
            Some((entity, replacement)) => {
                out.push_str(replacement);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn encode_text(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn encode_attr(input: &str) -> String {
    encode_text(input).replace('"', "&quot;")
}

/// Serialize a node and its subtree back to markup.
pub fn serialize_node(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, id, &mut out);
    out
}

fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    match doc.data(id) {
        NodeData::Text(t) => out.push_str(&encode_text(t)),
        NodeData::Comment(c) => {
            out.push_str("<!--");
            out.push_str(c);
            out.push_str("-->");
        }
        NodeData::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (name, value) in el.attrs() {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&encode_attr(value));
                out.push('"');
            }
            out.push('>');
            if VOID_TAGS.contains(&el.tag.as_str()) {
                return;
            }
            for &child in doc.children(id) {
                write_node(doc, child, out);
            }
            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
    }
}

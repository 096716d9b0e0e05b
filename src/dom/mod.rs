//! Arena-backed document tree.
//!
//! The engine never touches a live browser DOM directly; it operates on this
//! owned tree so every operation (splitting text nodes, wrapping matches,
//! unwrapping markers) is unit-testable against a synthetic document. Hosts
//! mirror the resulting mutations onto their real DOM, or feed serialized
//! markup through the wasm surface.

mod markup;
mod walk;

pub use markup::{parse_fragment, serialize_node, MarkupError};
pub use walk::{collect_leaf_text_nodes, group_by_block, nearest_block_ancestor};

/// Stable handle into a [`Document`] arena. Ids are never reused, so a
/// detached node's id stays valid (and inert) for the document's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Element tags treated as block-level ancestors when grouping text nodes.
pub const BLOCK_TAGS: &[&str] = &[
    "p", "div", "article", "section", "main", "aside", "nav", "header", "footer", "li", "td",
    "th", "h1", "h2", "h3", "h4", "h5", "h6",
];

/// Element tags whose text content is never rendered and never matched.
pub const SKIP_TAGS: &[&str] = &["script", "style", "noscript"];

/// Payload of a single tree node.
#[derive(Debug, Clone)]
pub enum NodeData {
    Element(ElementData),
    Text(String),
    Comment(String),
}

/// Tag name plus ordered attribute list for an element node.
#[derive(Debug, Clone)]
pub struct ElementData {
    pub tag: String,
    attrs: Vec<(String, String)>,
}

impl ElementData {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(slot) = self.attrs.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value;
        } else {
            self.attrs.push((name.to_string(), value));
        }
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let mut current = self.attr("class").unwrap_or("").to_string();
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(class);
        self.set_attr("class", current);
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(n, _)| n != name);
    }

    pub fn remove_class(&mut self, class: &str) {
        let remaining: Vec<&str> = self.classes().filter(|c| *c != class).collect();
        if remaining.is_empty() {
            self.remove_attr("class");
        } else {
            self.set_attr("class", remaining.join(" "));
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// An owned document tree with `html > head + body` scaffolding.
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("node_count", &self.nodes.len())
            .finish()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
        };
        let root = doc.alloc(NodeData::Element(ElementData::new("html")));
        let head = doc.alloc(NodeData::Element(ElementData::new("head")));
        let body = doc.alloc(NodeData::Element(ElementData::new("body")));
        doc.root = root;
        doc.head = head;
        doc.body = body;
        doc.append_child(root, head);
        doc.append_child(root, body);
        doc
    }

    /// Build a document whose body contains the parsed markup fragment.
    pub fn from_body_markup(input: &str) -> Result<Self, MarkupError> {
        let mut doc = Self::new();
        let body = doc.body();
        parse_fragment(&mut doc, body, input)?;
        Ok(doc)
    }

    /// Serialized body children, the inverse of [`Document::from_body_markup`].
    pub fn body_markup(&self) -> String {
        self.children(self.body)
            .iter()
            .map(|&c| serialize_node(self, c))
            .collect()
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Element(ElementData::new(tag)))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Comment(text.into()))
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Text(t) => Some(t.as_str()),
            _ => None,
        }
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        if let NodeData::Text(t) = &mut self.nodes[id.0].data {
            *t = text.into();
        }
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].data, NodeData::Text(_))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Ancestor chain from the node's parent up to the root.
    pub fn ancestors<'a>(&'a self, id: NodeId) -> impl Iterator<Item = NodeId> + 'a {
        let mut current = self.parent(id);
        std::iter::from_fn(move || {
            let next = current?;
            current = self.parent(next);
            Some(next)
        })
    }

    /// First ancestor (or the node itself) satisfying the predicate.
    pub fn closest<F>(&self, id: NodeId, pred: F) -> Option<NodeId>
    where
        F: Fn(&Document, NodeId) -> bool,
    {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&n| pred(self, n))
    }

    /// Detach a node from its parent; the subtree stays intact.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Insert `new` as a child of `parent` immediately before `reference`.
    pub fn insert_before(&mut self, parent: NodeId, new: NodeId, reference: NodeId) {
        self.detach(new);
        let idx = self.nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == reference)
            .unwrap_or_else(|| self.nodes[parent.0].children.len());
        self.nodes[new.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(idx, new);
    }

    /// Preorder traversal of the subtree rooted at `id`, `id` first.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            for &child in self.children(next).iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// All nodes in the subtree matching the predicate, in document order.
    pub fn find_all<F>(&self, root: NodeId, pred: F) -> Vec<NodeId>
    where
        F: Fn(&Document, NodeId) -> bool,
    {
        self.subtree(root)
            .into_iter()
            .filter(|&n| pred(self, n))
            .collect()
    }

    /// Concatenated text of all descendant text nodes, in document order.
    pub fn text_content(&self, id: NodeId) -> String {
        self.subtree(id)
            .into_iter()
            .filter_map(|n| self.text(n))
            .collect()
    }

    /// Split a text node at `byte_offset`, keeping the prefix in place and
    /// inserting a new text node with the suffix immediately after.
    ///
    /// `byte_offset` must lie on a char boundary strictly inside the text.
    pub fn split_text(&mut self, id: NodeId, byte_offset: usize) -> NodeId {
        let (prefix, suffix) = match &self.nodes[id.0].data {
            NodeData::Text(t) => {
                let (a, b) = t.split_at(byte_offset);
                (a.to_string(), b.to_string())
            }
            _ => panic!("split_text on a non-text node"),
        };
        self.set_text(id, prefix);
        let suffix_id = self.create_text(suffix);
        if let Some(parent) = self.parent(id) {
            let idx = self.nodes[parent.0]
                .children
                .iter()
                .position(|&c| c == id)
                .expect("child listed under parent");
            self.nodes[suffix_id.0].parent = Some(parent);
            self.nodes[parent.0].children.insert(idx + 1, suffix_id);
        }
        suffix_id
    }

    /// Insert `wrapper` at the node's position and move the node inside it.
    pub fn wrap(&mut self, id: NodeId, wrapper: NodeId) {
        let parent = self.parent(id).expect("wrap target must have a parent");
        self.insert_before(parent, wrapper, id);
        self.append_child(wrapper, id);
    }

    /// Replace an element with its own children, preserving their order.
    pub fn unwrap(&mut self, id: NodeId) {
        let parent = match self.parent(id) {
            Some(p) => p,
            None => return,
        };
        let children: Vec<NodeId> = self.children(id).to_vec();
        for child in children {
            self.insert_before(parent, child, id);
        }
        self.detach(id);
    }

    /// Merge adjacent sibling text nodes and drop empty ones, recursively.
    ///
    /// This is the inverse of repeated `split_text`/`unwrap`, used to restore
    /// the original tree shape after highlight teardown.
    pub fn merge_adjacent_text(&mut self, root: NodeId) {
        let elements: Vec<NodeId> = self
            .subtree(root)
            .into_iter()
            .filter(|&n| self.element(n).is_some())
            .collect();
        for el in elements {
            let children = self.children(el).to_vec();
            let mut previous_text: Option<NodeId> = None;
            for child in children {
                match self.text(child).map(|t| t.to_string()) {
                    Some(t) if t.is_empty() => {
                        self.detach(child);
                    }
                    Some(t) => match previous_text {
                        Some(prev) => {
                            let mut merged = self.text(prev).unwrap_or("").to_string();
                            merged.push_str(&t);
                            self.set_text(prev, merged);
                            self.detach(child);
                        }
                        None => previous_text = Some(child),
                    },
                    None => previous_text = None,
                }
            }
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaffolding() {
        let doc = Document::new();
        assert_eq!(doc.tag(doc.root()), Some("html"));
        assert_eq!(doc.children(doc.root()), &[doc.head(), doc.body()]);
    }

    #[test]
    fn test_text_content_in_document_order() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        let t1 = doc.create_text("Hello ");
        let b = doc.create_element("b");
        let t2 = doc.create_text("world");
        let body = doc.body();
        doc.append_child(body, p);
        doc.append_child(p, t1);
        doc.append_child(p, b);
        doc.append_child(b, t2);
        assert_eq!(doc.text_content(p), "Hello world");
    }

    #[test]
    fn test_split_text_preserves_content() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        let t = doc.create_text("abcdef");
        let body = doc.body();
        doc.append_child(body, p);
        doc.append_child(p, t);

        let suffix = doc.split_text(t, 3);
        assert_eq!(doc.text(t), Some("abc"));
        assert_eq!(doc.text(suffix), Some("def"));
        assert_eq!(doc.children(p), &[t, suffix]);
        assert_eq!(doc.text_content(p), "abcdef");
    }

    #[test]
    fn test_wrap_then_unwrap_roundtrip() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        let t = doc.create_text("target");
        let body = doc.body();
        doc.append_child(body, p);
        doc.append_child(p, t);

        let wrapper = doc.create_element("span");
        doc.wrap(t, wrapper);
        assert_eq!(doc.children(p), &[wrapper]);
        assert_eq!(doc.children(wrapper), &[t]);

        doc.unwrap(wrapper);
        assert_eq!(doc.children(p), &[t]);
        assert_eq!(doc.parent(wrapper), None);
    }

    #[test]
    fn test_merge_adjacent_text() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        let body = doc.body();
        doc.append_child(body, p);
        for part in &["ab", "", "cd", "ef"] {
            let t = doc.create_text(*part);
            doc.append_child(p, t);
        }
        doc.merge_adjacent_text(body);
        assert_eq!(doc.children(p).len(), 1);
        assert_eq!(doc.text_content(p), "abcdef");
    }

    #[test]
    fn test_class_helpers() {
        let mut doc = Document::new();
        let el = doc.create_element("span");
        doc.element_mut(el).unwrap().add_class("critic-highlight");
        doc.element_mut(el).unwrap().add_class("highlight-fluff");
        doc.element_mut(el).unwrap().add_class("highlight-fluff");
        let el_ref = doc.element(el).unwrap();
        assert!(el_ref.has_class("critic-highlight"));
        assert_eq!(el_ref.attr("class"), Some("critic-highlight highlight-fluff"));
    }
}

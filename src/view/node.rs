use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A node of the declarative tree.
///
/// Attributes live in a `BTreeMap` so equal trees also serialize to equal
/// JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Element {
        tag: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        attrs: BTreeMap<String, String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<Node>,
    },
    Text {
        text: String,
    },
}

impl Node {
    pub fn element(tag: impl Into<String>) -> Self {
        Node::Element {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Node::Text { text: text.into() }
    }

    /// Set an attribute. No-op on text nodes.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Node::Element { attrs, .. } = &mut self {
            attrs.insert(key.into(), value.into());
        }
        self
    }

    /// Set an attribute only when `condition` holds (e.g. `disabled`).
    pub fn attr_if(self, condition: bool, key: impl Into<String>, value: impl Into<String>) -> Self {
        if condition {
            self.attr(key, value)
        } else {
            self
        }
    }

    /// Append a child. No-op on text nodes.
    pub fn child(mut self, child: Node) -> Self {
        if let Node::Element { children, .. } = &mut self {
            children.push(child);
        }
        self
    }

    /// Append several children.
    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        if let Node::Element { children, .. } = &mut self {
            children.extend(nodes);
        }
        self
    }

    /// Shorthand for an element whose only child is a text node.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.child(Node::text(text))
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            Node::Element { tag, .. } => Some(tag),
            Node::Text { .. } => None,
        }
    }

    pub fn get_attr(&self, key: &str) -> Option<&str> {
        match self {
            Node::Element { attrs, .. } => attrs.get(key).map(String::as_str),
            Node::Text { .. } => None,
        }
    }

    /// Depth-first search for the element whose `id` attribute is `id`.
    pub fn find_by_id(&self, id: &str) -> Option<&Node> {
        if self.get_attr("id") == Some(id) {
            return Some(self);
        }
        match self {
            Node::Element { children, .. } => {
                children.iter().find_map(|child| child.find_by_id(id))
            }
            Node::Text { .. } => None,
        }
    }

    /// Concatenated text of this node and all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text { text } => out.push_str(text),
            Node::Element { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Node {
        Node::element("div")
            .attr("id", "root")
            .child(Node::element("p").attr("id", "greeting").with_text("Hello"))
            .child(Node::element("button").attr("onClick", "greet").with_text(" there"))
    }

    #[test]
    fn find_by_id_searches_depth_first() {
        let tree = sample();
        let greeting = tree.find_by_id("greeting").unwrap();
        assert_eq!(greeting.tag(), Some("p"));
        assert_eq!(greeting.text_content(), "Hello");
        assert!(tree.find_by_id("missing").is_none());
    }

    #[test]
    fn text_content_concatenates() {
        assert_eq!(sample().text_content(), "Hello there");
    }

    #[test]
    fn attr_if_skips_when_false() {
        let enabled = Node::element("button").attr_if(false, "disabled", "true");
        let disabled = Node::element("button").attr_if(true, "disabled", "true");
        assert_eq!(enabled.get_attr("disabled"), None);
        assert_eq!(disabled.get_attr("disabled"), Some("true"));
    }

    #[test]
    fn text_nodes_ignore_builders() {
        let node = Node::text("x").attr("id", "y").child(Node::text("z"));
        assert_eq!(node, Node::text("x"));
    }

    #[test]
    fn serialization_is_tagged_and_ordered() {
        let node = Node::element("input")
            .attr("value", "a")
            .attr("id", "name-input");
        let encoded = serde_json::to_string(&node).unwrap();
        assert_eq!(
            encoded,
            r#"{"kind":"element","tag":"input","attrs":{"id":"name-input","value":"a"}}"#
        );
        let decoded: Node = serde_json::from_value(json!({"kind": "text", "text": "hi"})).unwrap();
        assert_eq!(decoded, Node::text("hi"));
    }
}

//! Node storage types.
//!
//! Nodes live in the [`Document`](crate::Document) arena and are addressed by
//! [`NodeId`]. Class lists and inline styles are not stored separately: like
//! the browser DOM they are views over the `class` and `style` attributes.

use slotmap::new_key_type;

use crate::event::Listener;

new_key_type! {
    /// A stable handle to a node in a [`Document`](crate::Document).
    ///
    /// `NodeId`s stay valid while the node is moved around the tree and
    /// become invalid once the node is destroyed.
    pub struct NodeId;
}

impl NodeId {
    /// Convert the NodeId to a raw u64 value.
    #[inline]
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }
}

/// XML namespace URI for HTML elements.
pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// XML namespace URI for SVG elements.
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// The namespace an element was created in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Namespace {
    /// An HTML element.
    #[default]
    Html,
    /// An SVG element.
    Svg,
}

impl Namespace {
    /// The namespace URI.
    pub fn uri(self) -> &'static str {
        match self {
            Self::Html => HTML_NAMESPACE,
            Self::Svg => SVG_NAMESPACE,
        }
    }
}

/// Element payload: tag, namespace and attributes in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Tag name. HTML tags are stored lowercase.
    pub tag: String,
    /// The element's namespace.
    pub namespace: Namespace,
    /// Attributes in insertion order.
    pub attributes: Vec<(String, String)>,
}

impl ElementData {
    /// Create an element with no attributes.
    pub fn new(tag: impl Into<String>, namespace: Namespace) -> Self {
        let tag = tag.into();
        let tag = match namespace {
            Namespace::Html => tag.to_ascii_lowercase(),
            Namespace::Svg => tag,
        };
        Self {
            tag,
            namespace,
            attributes: Vec::new(),
        }
    }

    /// Look up an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// Remove an attribute. Returns `true` if it was present.
    pub fn remove_attribute(&mut self, name: &str) -> bool {
        let before = self.attributes.len();
        self.attributes
            .retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        self.attributes.len() != before
    }

    /// Iterate the whitespace-separated tokens of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attribute("class")
            .unwrap_or_default()
            .split_ascii_whitespace()
    }

    /// Check whether the tag matches, ignoring ASCII case.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }
}

/// What a node holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An element node.
    Element(ElementData),
    /// A text node.
    Text(String),
}

/// Internal data stored in the arena for each node.
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) listeners: Vec<Listener>,
}

impl NodeData {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
        }
    }

    pub(crate) fn element(&self) -> Option<&ElementData> {
        match &self.kind {
            NodeKind::Element(data) => Some(data),
            NodeKind::Text(_) => None,
        }
    }

    pub(crate) fn element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.kind {
            NodeKind::Element(data) => Some(data),
            NodeKind::Text(_) => None,
        }
    }
}

/// Parse an inline `style` attribute into `(property, value)` pairs.
pub(crate) fn parse_inline_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            let name = name.trim();
            let value = value.trim();
            (!name.is_empty()).then(|| (name.to_ascii_lowercase(), value.to_string()))
        })
        .collect()
}

/// Serialize `(property, value)` pairs back into an inline `style` attribute.
pub(crate) fn format_inline_style(declarations: &[(String, String)]) -> String {
    declarations
        .iter()
        .map(|(name, value)| format!("{name}: {value};"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_tags_are_lowercased() {
        let data = ElementData::new("IMG", Namespace::Html);
        assert_eq!(data.tag, "img");

        let data = ElementData::new("foreignObject", Namespace::Svg);
        assert_eq!(data.tag, "foreignObject");
    }

    #[test]
    fn set_attribute_replaces_in_place() {
        let mut data = ElementData::new("div", Namespace::Html);
        data.set_attribute("id", "a");
        data.set_attribute("class", "x");
        data.set_attribute("ID", "b");
        assert_eq!(data.attributes.len(), 2);
        assert_eq!(data.attributes[0], ("id".to_string(), "b".to_string()));
        assert!(data.remove_attribute("class"));
        assert!(!data.remove_attribute("class"));
    }

    #[test]
    fn inline_style_round_trips_order() {
        let parsed = parse_inline_style("width: 904px; height:auto;;color : red");
        assert_eq!(
            parsed,
            vec![
                ("width".to_string(), "904px".to_string()),
                ("height".to_string(), "auto".to_string()),
                ("color".to_string(), "red".to_string()),
            ]
        );
        assert_eq!(
            format_inline_style(&parsed),
            "width: 904px; height: auto; color: red;"
        );
    }
}

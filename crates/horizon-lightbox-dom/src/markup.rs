//! Building documents from markup.
//!
//! Markup is read with `quick-xml` in a forgiving, HTML-flavoured mode:
//! unquoted and valueless attributes are accepted, void elements such as
//! `<img>` need no closing tag, and stray end tags are ignored. Elements
//! under an `<svg>` element are created in the SVG namespace until a
//! `<foreignObject>` switches back to HTML.

use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::logging::{DocumentTreeDebug, TreeFormatOptions, targets};
use crate::node::Namespace;
use crate::{Document, Error, NodeId, Result};

/// HTML elements that never have content or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

impl Document {
    /// Create a document whose body holds the parsed markup.
    pub fn from_markup(markup: &str) -> Result<Self> {
        let mut document = Self::new();
        let body = document.body();
        document.append_markup(body, markup)?;
        Ok(document)
    }

    /// Read a markup file into a new document.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let markup = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_markup(&markup)
    }

    /// Parse markup and append the resulting nodes to `parent`.
    ///
    /// Returns the top-level nodes created, in order. On error, nodes parsed
    /// before the error stay attached.
    pub fn append_markup(&mut self, parent: NodeId, markup: &str) -> Result<Vec<NodeId>> {
        let parent_namespace = self.namespace(parent).ok_or(Error::NotAnElement)?;

        let mut reader = Reader::from_str(markup);
        let config = reader.config_mut();
        config.trim_text(true);
        config.check_end_names = false;
        config.allow_unmatched_ends = true;

        // Open elements: (node, tag, namespace for children).
        let mut open: Vec<(NodeId, String, Namespace)> = Vec::new();
        let mut created = Vec::new();

        loop {
            let event = reader
                .read_event()
                .map_err(|e| Error::markup(e.to_string(), reader.error_position()))?;

            let (current, namespace) = open
                .last()
                .map(|(node, _, ns)| (*node, *ns))
                .unwrap_or((parent, child_namespace(self, parent, parent_namespace)));

            match event {
                Event::Start(start) => {
                    let (node, tag, ns) = self.element_from_tag(&start, namespace, &reader)?;
                    self.attach(current, node, parent, &mut created)?;
                    let void = ns == Namespace::Html && VOID_ELEMENTS.contains(&tag.as_str());
                    if !void {
                        let inner = child_namespace(self, node, ns);
                        open.push((node, tag, inner));
                    }
                }
                Event::Empty(start) => {
                    let (node, _, _) = self.element_from_tag(&start, namespace, &reader)?;
                    self.attach(current, node, parent, &mut created)?;
                }
                Event::End(end) => {
                    let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                    if let Some(index) = open
                        .iter()
                        .rposition(|(_, tag, _)| tag.eq_ignore_ascii_case(&name))
                    {
                        open.truncate(index);
                    } else {
                        tracing::debug!(target: targets::MARKUP, tag = %name, "ignoring stray end tag");
                    }
                }
                Event::Text(text) => {
                    let content = text
                        .unescape()
                        .map_err(|e| Error::markup(e.to_string(), reader.buffer_position()))?;
                    if !content.is_empty() {
                        let node = self.create_text(content.into_owned());
                        self.attach(current, node, parent, &mut created)?;
                    }
                }
                Event::CData(cdata) => {
                    let node = self.create_text(String::from_utf8_lossy(&cdata).into_owned());
                    self.attach(current, node, parent, &mut created)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some((_, tag, _)) = open.last() {
            tracing::debug!(target: targets::MARKUP, %tag, "unclosed element at end of markup");
        }
        tracing::debug!(target: targets::MARKUP, ?parent, nodes = created.len(), "markup appended");
        if tracing::enabled!(target: targets::MARKUP, tracing::Level::TRACE) {
            let tree = DocumentTreeDebug::with_options(TreeFormatOptions::minimal())
                .format_subtree(self, parent);
            tracing::trace!(target: targets::MARKUP, "parsed tree:\n{tree}");
        }
        Ok(created)
    }

    fn element_from_tag(
        &mut self,
        start: &BytesStart<'_>,
        inherited: Namespace,
        reader: &Reader<&[u8]>,
    ) -> Result<(NodeId, String, Namespace)> {
        let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let namespace = if tag.eq_ignore_ascii_case("svg") {
            Namespace::Svg
        } else {
            inherited
        };

        let node = self.create_element_ns(&tag, namespace);
        for attribute in start.html_attributes() {
            let attribute =
                attribute.map_err(|e| Error::markup(e.to_string(), reader.buffer_position()))?;
            let name = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(|e| Error::markup(e.to_string(), reader.buffer_position()))?;
            self.set_attribute(node, &name, &value)?;
        }

        let tag = self.tag_name(node).unwrap_or_default().to_string();
        Ok((node, tag, namespace))
    }

    fn attach(
        &mut self,
        current: NodeId,
        node: NodeId,
        parent: NodeId,
        created: &mut Vec<NodeId>,
    ) -> Result<()> {
        self.append_child(current, node)?;
        if current == parent {
            created.push(node);
        }
        Ok(())
    }
}

/// Namespace for children of `node`: SVG content switches back to HTML
/// inside `<foreignObject>`.
fn child_namespace(document: &Document, node: NodeId, namespace: Namespace) -> Namespace {
    match namespace {
        Namespace::Svg
            if document
                .tag_name(node)
                .is_some_and(|tag| tag.eq_ignore_ascii_case("foreignObject")) =>
        {
            Namespace::Html
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeKind;

    #[test]
    fn parses_nested_elements_into_body() {
        let doc = Document::from_markup(r#"<div id="a"><span class="x">hi</span></div>"#).unwrap();
        let div = doc.get_element_by_id("a").unwrap();
        assert_eq!(doc.parent(div), Some(doc.body()));
        assert_eq!(doc.text_content(div), "hi");
        assert_eq!(doc.element_children(div).len(), 1);
    }

    #[test]
    fn void_elements_need_no_end_tag() {
        let doc = Document::from_markup(r#"<figure><img src="a.png" alt=A><figcaption>A</figcaption></figure>"#)
            .unwrap();
        let img = doc.query_selector("img").unwrap().unwrap();
        assert!(doc.children(img).is_empty());
        assert_eq!(doc.attribute(img, "alt"), Some("A"));
        assert_eq!(doc.query_selector_all("figure > *").unwrap().len(), 2);
    }

    #[test]
    fn valueless_attributes_are_present() {
        let doc = Document::from_markup("<button data-close-lightbox>x</button>").unwrap();
        let button = doc.query_selector("button").unwrap().unwrap();
        assert_eq!(doc.attribute(button, "data-close-lightbox"), Some(""));
    }

    #[test]
    fn svg_subtrees_use_the_svg_namespace() {
        let doc = Document::from_markup(
            r#"<div><svg viewBox="0 0 10 10"><g><rect/></g><foreignObject><p>t</p></foreignObject></svg></div>"#,
        )
        .unwrap();
        let svg = doc.query_selector("svg").unwrap().unwrap();
        let rect = doc.query_selector("rect").unwrap().unwrap();
        let p = doc.query_selector("p").unwrap().unwrap();
        let div = doc.query_selector("div").unwrap().unwrap();

        assert_eq!(doc.namespace(svg), Some(Namespace::Svg));
        assert_eq!(doc.namespace(rect), Some(Namespace::Svg));
        assert_eq!(doc.namespace(p), Some(Namespace::Html));
        assert_eq!(doc.namespace(div), Some(Namespace::Html));
        assert_eq!(doc.attribute(svg, "viewBox"), Some("0 0 10 10"));
    }

    #[test]
    fn whitespace_only_text_is_dropped() {
        let doc = Document::from_markup("<ul>\n  <li>one</li>\n  <li>two</li>\n</ul>").unwrap();
        let ul = doc.query_selector("ul").unwrap().unwrap();
        assert_eq!(doc.children(ul).len(), 2);
        assert!(
            doc.children(ul)
                .iter()
                .all(|&c| matches!(doc.kind(c), Some(NodeKind::Element(_))))
        );
    }

    #[test]
    fn append_markup_returns_top_level_nodes() {
        let mut doc = Document::new();
        let body = doc.body();
        let created = doc.append_markup(body, "<p>a</p><p>b</p>text").unwrap();
        assert_eq!(created.len(), 3);
        assert_eq!(doc.children(body), created.as_slice());
    }

    #[test]
    fn stray_end_tags_are_ignored() {
        let doc = Document::from_markup("<div></span><p></p></div>").unwrap();
        let div = doc.query_selector("div").unwrap().unwrap();
        assert_eq!(doc.element_children(div).len(), 1);

        let doc =
            Document::from_markup("<section><div></b></i></div><img src=\"x.png\"></section><p/>")
                .unwrap();
        let section = doc.query_selector("section").unwrap().unwrap();
        assert_eq!(doc.element_children(section).len(), 2);
        assert_eq!(doc.element_children(doc.body()).len(), 2);
    }

    #[test]
    fn malformed_markup_is_an_error() {
        let err = Document::from_markup(r#"<div class="unterminated></div>"#).unwrap_err();
        assert!(matches!(err, Error::Markup { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Document::from_file(dir.path().join("missing.html")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn reads_markup_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, r#"<div id="lightbox" class="hidden"></div>"#).unwrap();
        let doc = Document::from_file(&path).unwrap();
        assert!(doc.get_element_by_id("lightbox").is_some());
    }
}

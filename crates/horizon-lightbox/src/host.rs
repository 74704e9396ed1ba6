//! The page the lightbox runs against.
//!
//! [`MediaDom`] is the seam between the widget logic and a concrete DOM.
//! The in-memory [`Document`] implements it here; the browser implementation
//! lives in the `web` module behind the `web` feature.

use std::fmt;

use horizon_lightbox_dom::{Document, Namespace, NodeId, Viewport};

use crate::error::{LightboxError, Result};
use crate::logging::targets;
use crate::media::MediaKind;

/// DOM access needed by the lightbox.
///
/// Lookups that take a selector report unparsable selectors as
/// [`LightboxError::Selector`]; mutations report failures from the
/// underlying DOM.
pub trait MediaDom {
    /// Handle to an element.
    type Element: Clone + PartialEq + fmt::Debug;

    /// Find an element by `id`.
    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    /// All elements in the page matching a selector, in document order.
    fn query_all(&self, selector: &str) -> Result<Vec<Self::Element>>;

    /// The first descendant of `scope` matching a selector.
    fn query_within(&self, scope: &Self::Element, selector: &str) -> Result<Option<Self::Element>>;

    /// Classify an element as visual media, or `None` if it is not media.
    fn media_kind(&self, element: &Self::Element) -> Option<MediaKind>;

    /// Whether the element can act as a close control (an HTML element).
    fn is_interactive(&self, element: &Self::Element) -> bool;

    /// Whether the element still exists and exposes a focus operation.
    fn can_focus(&self, element: &Self::Element) -> bool;

    /// Read an attribute.
    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;

    /// Write an attribute.
    fn set_attribute(&mut self, element: &Self::Element, name: &str, value: &str) -> Result<()>;

    /// Remove an attribute if present.
    fn remove_attribute(&mut self, element: &Self::Element, name: &str) -> Result<()>;

    /// Check the class list.
    fn has_class(&self, element: &Self::Element, class: &str) -> bool;

    /// Add a class if absent.
    fn add_class(&mut self, element: &Self::Element, class: &str) -> Result<()>;

    /// Remove a class if present.
    fn remove_class(&mut self, element: &Self::Element, class: &str) -> Result<()>;

    /// Set one inline style property.
    fn set_style(&mut self, element: &Self::Element, property: &str, value: &str) -> Result<()>;

    /// Deep-copy an element. The copy has no listeners and is not attached.
    fn deep_clone(&mut self, element: &Self::Element) -> Result<Self::Element>;

    /// Replace every child of `slot` with `content`, or empty it for `None`.
    /// Removed children are discarded.
    fn replace_content(&mut self, slot: &Self::Element, content: Option<Self::Element>) -> Result<()>;

    /// The focused element, or `None` when focus rests on the body.
    fn active_element(&self) -> Option<Self::Element>;

    /// Move focus to an element.
    fn focus(&mut self, element: &Self::Element);

    /// Remove focus from an element.
    fn blur(&mut self, element: &Self::Element);

    /// The `<body>` element.
    fn body(&self) -> Option<Self::Element>;

    /// The current viewport size.
    fn viewport(&self) -> Viewport;
}

impl MediaDom for Document {
    type Element = NodeId;

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.get_element_by_id(id)
    }

    fn query_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        self.query_selector_all(selector)
            .map_err(LightboxError::Selector)
    }

    fn query_within(&self, scope: &NodeId, selector: &str) -> Result<Option<NodeId>> {
        self.query_selector_within(*scope, selector)
            .map_err(LightboxError::Selector)
    }

    fn media_kind(&self, element: &NodeId) -> Option<MediaKind> {
        let data = self.element(*element)?;
        match data.namespace {
            Namespace::Svg => Some(MediaKind::VectorGraphic),
            Namespace::Html if data.has_tag("img") => Some(MediaKind::Raster),
            Namespace::Html => None,
        }
    }

    fn is_interactive(&self, element: &NodeId) -> bool {
        self.namespace(*element) == Some(Namespace::Html)
    }

    fn can_focus(&self, element: &NodeId) -> bool {
        self.is_element(*element)
    }

    fn attribute(&self, element: &NodeId, name: &str) -> Option<String> {
        Document::attribute(self, *element, name).map(str::to_string)
    }

    fn set_attribute(&mut self, element: &NodeId, name: &str, value: &str) -> Result<()> {
        Ok(Document::set_attribute(self, *element, name, value)?)
    }

    fn remove_attribute(&mut self, element: &NodeId, name: &str) -> Result<()> {
        Document::remove_attribute(self, *element, name)?;
        Ok(())
    }

    fn has_class(&self, element: &NodeId, class: &str) -> bool {
        Document::has_class(self, *element, class)
    }

    fn add_class(&mut self, element: &NodeId, class: &str) -> Result<()> {
        Ok(Document::add_class(self, *element, class)?)
    }

    fn remove_class(&mut self, element: &NodeId, class: &str) -> Result<()> {
        Ok(Document::remove_class(self, *element, class)?)
    }

    fn set_style(&mut self, element: &NodeId, property: &str, value: &str) -> Result<()> {
        Ok(self.set_style_property(*element, property, value)?)
    }

    fn deep_clone(&mut self, element: &NodeId) -> Result<NodeId> {
        Ok(Document::deep_clone(self, *element)?)
    }

    fn replace_content(&mut self, slot: &NodeId, content: Option<NodeId>) -> Result<()> {
        for child in self.remove_children(*slot)? {
            self.destroy(child)?;
        }
        if let Some(content) = content {
            self.append_child(*slot, content)?;
        }
        tracing::trace!(target: targets::HOST, ?slot, ?content, "content replaced");
        Ok(())
    }

    fn active_element(&self) -> Option<NodeId> {
        Document::active_element(self)
    }

    fn focus(&mut self, element: &NodeId) {
        if !Document::focus(self, *element) {
            tracing::trace!(target: targets::HOST, ?element, "element did not take focus");
        }
    }

    fn blur(&mut self, element: &NodeId) {
        Document::blur(self, *element);
    }

    fn body(&self) -> Option<NodeId> {
        Some(Document::body(self))
    }

    fn viewport(&self) -> Viewport {
        Document::viewport(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_media() {
        let doc = Document::from_markup(
            r#"<img id="raster" src="a.png"><svg id="vector"><g id="group"/></svg><div id="plain"></div>"#,
        )
        .unwrap();
        let id = |name| doc.get_element_by_id(name).unwrap();

        assert_eq!(doc.media_kind(&id("raster")), Some(MediaKind::Raster));
        assert_eq!(doc.media_kind(&id("vector")), Some(MediaKind::VectorGraphic));
        assert_eq!(doc.media_kind(&id("group")), Some(MediaKind::VectorGraphic));
        assert_eq!(doc.media_kind(&id("plain")), None);
    }

    #[test]
    fn svg_elements_are_not_interactive() {
        let doc = Document::from_markup(r##"<svg><a id="link" href="#"/></svg><span id="s"/>"##).unwrap();
        assert!(!doc.is_interactive(&doc.get_element_by_id("link").unwrap()));
        assert!(doc.is_interactive(&doc.get_element_by_id("s").unwrap()));
    }

    #[test]
    fn replace_content_discards_previous_children() {
        let mut doc = Document::from_markup(r#"<div id="slot"><p>old</p></div>"#).unwrap();
        let slot = doc.get_element_by_id("slot").unwrap();
        let old = doc.children(slot)[0];
        let fresh = doc.create_element("img");

        MediaDom::replace_content(&mut doc, &slot, Some(fresh)).unwrap();
        assert_eq!(doc.children(slot), &[fresh]);
        assert!(!doc.contains(old));

        MediaDom::replace_content(&mut doc, &slot, None).unwrap();
        assert!(doc.children(slot).is_empty());
        assert!(!doc.contains(fresh));
    }

    #[test]
    fn invalid_selectors_map_to_selector_errors() {
        let doc = Document::new();
        assert!(matches!(
            doc.query_all("img >"),
            Err(LightboxError::Selector(_))
        ));
    }
}

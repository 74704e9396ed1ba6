//! The in-memory document.
//!
//! A [`Document`] owns every node in a slot-map arena. Nodes are created
//! detached and become part of the page once appended under the root. The
//! document also tracks keyboard focus, the viewport size and the event
//! listeners registered on nodes and on the document itself.
//!
//! # Example
//!
//! ```
//! use horizon_lightbox_dom::{Document, EventKind};
//!
//! let mut doc = Document::from_markup(r#"<button id="go">Go</button>"#).unwrap();
//! let button = doc.get_element_by_id("go").unwrap();
//!
//! doc.add_event_listener(button, EventKind::Click, |doc, event| {
//!     let target = event.target();
//!     doc.set_attribute(target, "aria-pressed", "true").unwrap();
//! })
//! .unwrap();
//!
//! doc.click(button);
//! assert_eq!(doc.attribute(button, "aria-pressed"), Some("true"));
//! assert_eq!(doc.active_element(), Some(button));
//! ```

use std::sync::Arc;

use slotmap::SlotMap;

use crate::event::{DispatchOutcome, DomEvent, EventCallback, EventKind, Listener, ListenerId};
use crate::logging::{span_names, targets};
use crate::node::{
    ElementData, Namespace, NodeData, NodeId, NodeKind, format_inline_style, parse_inline_style,
};
use crate::selector::{SelectorList, SelectorMatcher, parse_selector_list};
use crate::{Error, Result};

/// The size of the visible area, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Inner width.
    pub width: f64,
    /// Inner height.
    pub height: f64,
}

impl Viewport {
    /// Create a viewport.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

/// An in-memory document: `<html><body>…</body></html>` plus focus, viewport
/// and listener state.
pub struct Document {
    nodes: SlotMap<NodeId, NodeData>,
    root: NodeId,
    body: NodeId,
    focused: Option<NodeId>,
    viewport: Viewport,
    document_listeners: Vec<Listener>,
    next_listener_id: u64,
}

impl Document {
    /// Create an empty document with an `<html>` root and a `<body>`.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(NodeData::new(NodeKind::Element(ElementData::new(
            "html",
            Namespace::Html,
        ))));
        let body = nodes.insert(NodeData::new(NodeKind::Element(ElementData::new(
            "body",
            Namespace::Html,
        ))));
        nodes[body].parent = Some(root);
        nodes[root].children.push(body);

        Self {
            nodes,
            root,
            body,
            focused: None,
            viewport: Viewport::default(),
            document_listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    /// The `<html>` element.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The `<body>` element.
    #[inline]
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// The current viewport size.
    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Resize the viewport.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Number of live nodes, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // =========================================================================
    // Node creation
    // =========================================================================

    /// Create a detached HTML element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.create_element_ns(tag, Namespace::Html)
    }

    /// Create a detached SVG element.
    pub fn create_svg_element(&mut self, tag: &str) -> NodeId {
        self.create_element_ns(tag, Namespace::Svg)
    }

    /// Create a detached element in the given namespace.
    pub fn create_element_ns(&mut self, tag: &str, namespace: Namespace) -> NodeId {
        let id = self
            .nodes
            .insert(NodeData::new(NodeKind::Element(ElementData::new(tag, namespace))));
        tracing::trace!(target: targets::DOCUMENT, ?id, tag, ?namespace, "created element");
        id
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.nodes.insert(NodeData::new(NodeKind::Text(text.into())))
    }

    // =========================================================================
    // Node inspection
    // =========================================================================

    /// Check if a node exists.
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    /// Get a node's payload.
    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.nodes.get(node).map(|data| &data.kind)
    }

    /// Get a node's element payload, or `None` for text nodes and unknown IDs.
    pub fn element(&self, node: NodeId) -> Option<&ElementData> {
        self.nodes.get(node).and_then(NodeData::element)
    }

    /// Check if a node is a live element.
    pub fn is_element(&self, node: NodeId) -> bool {
        self.element(node).is_some()
    }

    /// The element's tag name.
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.tag.as_str())
    }

    /// The element's namespace.
    pub fn namespace(&self, node: NodeId) -> Option<Namespace> {
        self.element(node).map(|e| e.namespace)
    }

    /// Get the parent of a node.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|data| data.parent)
    }

    /// Get the children of a node (empty for unknown IDs).
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node)
            .map(|data| data.children.as_slice())
            .unwrap_or_default()
    }

    /// Get the element children of a node.
    pub fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .filter(|&child| self.is_element(child))
            .collect()
    }

    /// Get the element immediately before this node among its siblings.
    pub fn previous_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|&s| s == node)?;
        siblings[..index]
            .iter()
            .rev()
            .copied()
            .find(|&s| self.is_element(s))
    }

    /// Zero-based index among element siblings and the element sibling count.
    pub fn element_position(&self, node: NodeId) -> Option<(usize, usize)> {
        let parent = self.parent(node)?;
        let siblings = self.element_children(parent);
        let index = siblings.iter().position(|&s| s == node)?;
        Some((index, siblings.len()))
    }

    /// Get all ancestors from immediate parent to root.
    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = self.parent(node);
        while let Some(id) = current {
            result.push(id);
            current = self.parent(id);
        }
        result
    }

    /// Check whether the node is attached under the document root.
    pub fn is_connected(&self, node: NodeId) -> bool {
        node == self.root || self.ancestors(node).last() == Some(&self.root)
    }

    /// All descendants in document (pre-)order, excluding the node itself.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        result
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut text = String::new();
        if let Some(NodeKind::Text(value)) = self.kind(node) {
            text.push_str(value);
        }
        for descendant in self.descendants(node) {
            if let Some(NodeKind::Text(value)) = self.kind(descendant) {
                text.push_str(value);
            }
        }
        text
    }

    // =========================================================================
    // Tree mutation
    // =========================================================================

    /// Append `child` as the last child of `parent`, moving it if attached elsewhere.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if !self.contains(child) {
            return Err(Error::NodeNotFound);
        }
        if self.element(parent).is_none() {
            return Err(if self.contains(parent) {
                Error::NotAnElement
            } else {
                Error::NodeNotFound
            });
        }
        if parent == child || self.ancestors(parent).contains(&child) {
            return Err(Error::HierarchyRequest);
        }

        self.detach(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        tracing::trace!(target: targets::DOCUMENT, ?parent, ?child, "appended child");
        Ok(())
    }

    /// Remove `child` from `parent`. The child stays alive, detached.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.parent(child) != Some(parent) {
            return Err(Error::NodeNotFound);
        }
        self.detach(child);
        Ok(())
    }

    /// Detach every child of `parent` and return them in order.
    pub fn remove_children(&mut self, parent: NodeId) -> Result<Vec<NodeId>> {
        let data = self.nodes.get_mut(parent).ok_or(Error::NodeNotFound)?;
        let children = std::mem::take(&mut data.children);
        for &child in &children {
            self.nodes[child].parent = None;
        }
        self.drop_focus_if_disconnected();
        Ok(children)
    }

    /// Destroy a node and all its descendants, detaching it first.
    pub fn destroy(&mut self, node: NodeId) -> Result<()> {
        if !self.contains(node) {
            return Err(Error::NodeNotFound);
        }
        if node == self.root || node == self.body {
            return Err(Error::HierarchyRequest);
        }
        self.detach(node);
        let mut doomed = self.descendants(node);
        doomed.push(node);
        tracing::trace!(target: targets::DOCUMENT, ?node, count = doomed.len(), "destroying subtree");
        for id in doomed {
            self.nodes.remove(id);
        }
        Ok(())
    }

    /// Deep-copy a node and its subtree. Listeners are not copied and the
    /// copy is detached.
    pub fn deep_clone(&mut self, node: NodeId) -> Result<NodeId> {
        let kind = self.kind(node).ok_or(Error::NodeNotFound)?.clone();
        let copy = self.nodes.insert(NodeData::new(kind));
        let children = self.children(node).to_vec();
        for child in children {
            let child_copy = self.deep_clone(child)?;
            self.nodes[child_copy].parent = Some(copy);
            self.nodes[copy].children.push(child_copy);
        }
        Ok(copy)
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(old_parent) = self.nodes.get(node).and_then(|d| d.parent) {
            if let Some(parent_data) = self.nodes.get_mut(old_parent) {
                parent_data.children.retain(|&c| c != node);
            }
            self.nodes[node].parent = None;
        }
        self.drop_focus_if_disconnected();
    }

    fn drop_focus_if_disconnected(&mut self) {
        if let Some(focused) = self.focused {
            if !self.is_connected(focused) {
                tracing::trace!(target: targets::DOCUMENT, ?focused, "focused node detached");
                self.focused = None;
            }
        }
    }

    // =========================================================================
    // Attributes, classes and inline style
    // =========================================================================

    /// Get an attribute value.
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node).and_then(|e| e.attribute(name))
    }

    /// Set an attribute.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        self.element_mut(node)?.set_attribute(name, value);
        Ok(())
    }

    /// Remove an attribute. Returns `true` if it was present.
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<bool> {
        Ok(self.element_mut(node)?.remove_attribute(name))
    }

    /// Get the element's class list.
    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.element(node)
            .map(|e| e.classes().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Check if the element has a class.
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node)
            .is_some_and(|e| e.classes().any(|c| c == class))
    }

    /// Add a class if not already present.
    pub fn add_class(&mut self, node: NodeId, class: &str) -> Result<()> {
        let element = self.element_mut(node)?;
        if element.classes().any(|c| c == class) {
            return Ok(());
        }
        let mut classes: Vec<&str> = element.classes().collect();
        classes.push(class);
        let joined = classes.join(" ");
        element.set_attribute("class", joined);
        Ok(())
    }

    /// Remove every occurrence of a class.
    pub fn remove_class(&mut self, node: NodeId, class: &str) -> Result<()> {
        let element = self.element_mut(node)?;
        if !element.classes().any(|c| c == class) {
            return Ok(());
        }
        let joined = element
            .classes()
            .filter(|&c| c != class)
            .collect::<Vec<_>>()
            .join(" ");
        element.set_attribute("class", joined);
        Ok(())
    }

    /// Read one property from the inline `style` attribute.
    pub fn style_property(&self, node: NodeId, property: &str) -> Option<String> {
        let style = self.attribute(node, "style")?;
        parse_inline_style(style)
            .into_iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(property))
            .map(|(_, value)| value)
    }

    /// Set one property in the inline `style` attribute, keeping the others.
    pub fn set_style_property(&mut self, node: NodeId, property: &str, value: &str) -> Result<()> {
        let element = self.element_mut(node)?;
        let mut declarations = parse_inline_style(element.attribute("style").unwrap_or_default());
        match declarations
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(property))
        {
            Some(entry) => entry.1 = value.to_string(),
            None => declarations.push((property.to_ascii_lowercase(), value.to_string())),
        }
        element.set_attribute("style", format_inline_style(&declarations));
        Ok(())
    }

    fn element_mut(&mut self, node: NodeId) -> Result<&mut ElementData> {
        let data = self.nodes.get_mut(node).ok_or(Error::NodeNotFound)?;
        data.element_mut().ok_or(Error::NotAnElement)
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Find the first connected element with the given `id` attribute.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .find(|&node| self.attribute(node, "id") == Some(id))
    }

    /// All connected elements matching a selector list, in document order.
    pub fn query_selector_all(&self, selectors: &str) -> Result<Vec<NodeId>> {
        let list = parse_selector_list(selectors)?;
        let mut hits = Vec::new();
        if SelectorMatcher::matches_list(&list, self, self.root) {
            hits.push(self.root);
        }
        hits.extend(self.select_within(self.root, &list));
        Ok(hits)
    }

    /// The first connected element matching a selector list.
    pub fn query_selector(&self, selectors: &str) -> Result<Option<NodeId>> {
        Ok(self.query_selector_all(selectors)?.into_iter().next())
    }

    /// The first descendant of `scope` matching a selector list.
    pub fn query_selector_within(&self, scope: NodeId, selectors: &str) -> Result<Option<NodeId>> {
        let list = parse_selector_list(selectors)?;
        Ok(self.select_within(scope, &list).into_iter().next())
    }

    /// All descendants of `scope` matching an already-parsed selector list.
    pub fn select_within(&self, scope: NodeId, list: &SelectorList) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&node| SelectorMatcher::matches_list(list, self, node))
            .collect()
    }

    /// Check whether a node matches a selector list.
    pub fn matches(&self, node: NodeId, selectors: &str) -> Result<bool> {
        let list = parse_selector_list(selectors)?;
        Ok(SelectorMatcher::matches_list(&list, self, node))
    }

    // =========================================================================
    // Focus
    // =========================================================================

    /// Check whether an element can take keyboard focus.
    ///
    /// Form controls, links with `href`, `<summary>` and any element with a
    /// numeric `tabindex` are focusable; disabled form controls are not.
    pub fn is_focusable(&self, node: NodeId) -> bool {
        let Some(element) = self.element(node) else {
            return false;
        };

        let form_control = matches!(
            element.tag.to_ascii_lowercase().as_str(),
            "button" | "input" | "select" | "textarea"
        ) && element.namespace == Namespace::Html;

        if form_control && element.attribute("disabled").is_some() {
            return false;
        }

        if element
            .attribute("tabindex")
            .is_some_and(|t| t.trim().parse::<i32>().is_ok())
        {
            return true;
        }

        match element.namespace {
            Namespace::Html => {
                form_control
                    || element.has_tag("summary")
                    || ((element.has_tag("a") || element.has_tag("area"))
                        && element.attribute("href").is_some())
            }
            Namespace::Svg => element.has_tag("a") && element.attribute("href").is_some(),
        }
    }

    /// Move focus to a node. Returns `false` (and leaves focus unchanged)
    /// when the node is detached or not focusable.
    pub fn focus(&mut self, node: NodeId) -> bool {
        if !self.is_connected(node) || !self.is_focusable(node) {
            return false;
        }
        if self.focused != Some(node) {
            tracing::trace!(target: targets::DOCUMENT, ?node, previous = ?self.focused, "focus moved");
            self.focused = Some(node);
        }
        true
    }

    /// Remove focus from a node if it has it.
    pub fn blur(&mut self, node: NodeId) {
        if self.focused == Some(node) {
            tracing::trace!(target: targets::DOCUMENT, ?node, "blurred");
            self.focused = None;
        }
    }

    /// The focused element, if any. `None` means focus rests on the body.
    #[inline]
    pub fn active_element(&self) -> Option<NodeId> {
        self.focused
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Register a listener on a node.
    pub fn add_event_listener<F>(
        &mut self,
        node: NodeId,
        kind: EventKind,
        callback: F,
    ) -> Result<ListenerId>
    where
        F: Fn(&mut Document, &mut DomEvent) + Send + Sync + 'static,
    {
        if !self.contains(node) {
            return Err(Error::NodeNotFound);
        }
        let listener = self.make_listener(kind, Arc::new(callback));
        let id = listener.id;
        self.nodes[node].listeners.push(listener);
        tracing::trace!(target: targets::EVENT, ?node, %kind, ?id, "listener added");
        Ok(id)
    }

    /// Register a listener on the document itself. Document listeners run
    /// after every node on the bubble path.
    pub fn add_document_listener<F>(&mut self, kind: EventKind, callback: F) -> ListenerId
    where
        F: Fn(&mut Document, &mut DomEvent) + Send + Sync + 'static,
    {
        let listener = self.make_listener(kind, Arc::new(callback));
        let id = listener.id;
        self.document_listeners.push(listener);
        tracing::trace!(target: targets::EVENT, %kind, ?id, "document listener added");
        id
    }

    fn make_listener(&mut self, kind: EventKind, callback: EventCallback) -> Listener {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        Listener { id, kind, callback }
    }

    /// Remove a listener wherever it is registered. Returns `true` if found.
    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        let before = self.document_listeners.len();
        self.document_listeners.retain(|l| l.id != id);
        if self.document_listeners.len() != before {
            return true;
        }
        for (_, data) in self.nodes.iter_mut() {
            let before = data.listeners.len();
            data.listeners.retain(|l| l.id != id);
            if data.listeners.len() != before {
                return true;
            }
        }
        false
    }

    /// Number of listeners of a kind registered on a node.
    pub fn listener_count(&self, node: NodeId, kind: EventKind) -> usize {
        self.nodes
            .get(node)
            .map(|data| data.listeners.iter().filter(|l| l.kind == kind).count())
            .unwrap_or(0)
    }

    /// Number of listeners of a kind registered on the document.
    pub fn document_listener_count(&self, kind: EventKind) -> usize {
        self.document_listeners
            .iter()
            .filter(|l| l.kind == kind)
            .count()
    }

    /// Dispatch an event along its bubble path.
    ///
    /// The path (target, ancestors, document) is fixed before the first
    /// listener runs. Nodes destroyed by an earlier listener are skipped.
    pub fn dispatch_event(&mut self, event: &mut DomEvent) -> DispatchOutcome {
        let target = event.target();
        if !self.contains(target) {
            return DispatchOutcome::TargetNotFound;
        }

        let kind = event.kind();
        let _span =
            tracing::trace_span!(target: targets::EVENT, span_names::DISPATCH, %kind, ?target)
                .entered();

        let mut path = vec![target];
        path.extend(self.ancestors(target));

        for node in path {
            let callbacks: Vec<EventCallback> = match self.nodes.get(node) {
                Some(data) => data
                    .listeners
                    .iter()
                    .filter(|l| l.kind == kind)
                    .map(|l| Arc::clone(&l.callback))
                    .collect(),
                None => continue,
            };

            event.set_current_target(Some(node));
            for callback in callbacks {
                callback(self, event);
            }

            if event.is_propagation_stopped() {
                tracing::trace!(target: targets::EVENT, ?node, "propagation stopped");
                return Self::outcome(event);
            }
        }

        let callbacks: Vec<EventCallback> = self
            .document_listeners
            .iter()
            .filter(|l| l.kind == kind)
            .map(|l| Arc::clone(&l.callback))
            .collect();
        event.set_current_target(None);
        for callback in callbacks {
            callback(self, event);
        }

        Self::outcome(event)
    }

    fn outcome(event: &DomEvent) -> DispatchOutcome {
        if event.is_default_prevented() {
            DispatchOutcome::DefaultPrevented
        } else {
            DispatchOutcome::Completed
        }
    }

    /// Simulate a pointer click: focus moves to the nearest focusable
    /// inclusive ancestor (or leaves the page if there is none), then a
    /// click event is dispatched to `node`.
    pub fn click(&mut self, node: NodeId) -> DispatchOutcome {
        if !self.contains(node) {
            return DispatchOutcome::TargetNotFound;
        }
        let focus_target = std::iter::once(node)
            .chain(self.ancestors(node))
            .find(|&n| self.is_focusable(n));
        match focus_target {
            Some(target) => {
                self.focus(target);
            }
            None => self.focused = None,
        }
        let mut event = DomEvent::click(node);
        self.dispatch_event(&mut event)
    }

    /// Simulate a key press on the focused element, or on the body when
    /// nothing is focused.
    pub fn key_down(&mut self, key: &str) -> DispatchOutcome {
        let target = self
            .focused
            .filter(|&n| self.contains(n))
            .unwrap_or(self.body);
        self.key_down_on(target, key)
    }

    /// Dispatch a key press to a specific node.
    pub fn key_down_on(&mut self, node: NodeId, key: &str) -> DispatchOutcome {
        let mut event = DomEvent::key_down(node, key);
        self.dispatch_event(&mut event)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.len())
            .field("focused", &self.focused)
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}

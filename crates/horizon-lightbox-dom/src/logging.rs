//! Logging and debugging facilities for the document model.
//!
//! The crate is instrumented with `tracing`. Install a subscriber in the
//! host application to see the output:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_lightbox_dom::event=trace")
//!     .init();
//! ```
//!
//! [`DocumentTreeDebug`] renders a document (or any subtree) as an indented
//! tree, which is handy when a selector does not match what you expect.

use std::fmt::{self, Write as FmtWrite};

use crate::node::{Namespace, NodeKind};
use crate::{Document, NodeId};

/// Span names used for tracing.
pub mod span_names {
    /// Event dispatch span.
    pub const DISPATCH: &str = "dispatch";
}

/// Target names for log filtering.
pub mod targets {
    /// Tree mutation, focus and lookup.
    pub const DOCUMENT: &str = "horizon_lightbox_dom::document";
    /// Event listeners and dispatch.
    pub const EVENT: &str = "horizon_lightbox_dom::event";
    /// Markup loading.
    pub const MARKUP: &str = "horizon_lightbox_dom::markup";
    /// Selector parsing.
    pub const SELECTOR: &str = "horizon_lightbox_dom::selector";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show node IDs.
    pub show_ids: bool,
    /// Whether to show attributes.
    pub show_attributes: bool,
    /// Whether to show text nodes.
    pub show_text: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: false,
            show_attributes: true,
            show_text: true,
            max_depth: None,
        }
    }
}

impl TreeFormatOptions {
    /// Tags only.
    pub fn minimal() -> Self {
        Self {
            show_attributes: false,
            show_text: false,
            ..Default::default()
        }
    }
}

/// Renders a document subtree as an indented tree.
#[derive(Debug, Clone, Default)]
pub struct DocumentTreeDebug {
    options: TreeFormatOptions,
}

impl DocumentTreeDebug {
    /// Create a visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format the whole document from the `<html>` root.
    pub fn format_document(&self, document: &Document) -> String {
        self.format_subtree(document, document.root())
    }

    /// Format a subtree starting from `root`.
    pub fn format_subtree(&self, document: &Document, root: NodeId) -> String {
        let mut output = String::new();
        if self.write_node(document, root, &mut Vec::new(), &mut output).is_err() {
            output.push_str("(formatting failed)");
        }
        output
    }

    fn write_node(
        &self,
        document: &Document,
        node: NodeId,
        last_flags: &mut Vec<bool>,
        output: &mut String,
    ) -> fmt::Result {
        let depth = last_flags.len();
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }

        let Some(kind) = document.kind(node) else {
            return Ok(());
        };

        match kind {
            NodeKind::Text(text) => {
                if !self.options.show_text {
                    return Ok(());
                }
                self.write_prefix(last_flags, output)?;
                write!(output, "{text:?}")?;
            }
            NodeKind::Element(element) => {
                self.write_prefix(last_flags, output)?;
                write!(output, "<{}", element.tag)?;
                if element.namespace == Namespace::Svg && element.has_tag("svg") {
                    output.push_str(" ns=svg");
                }
                if self.options.show_attributes {
                    for (name, value) in &element.attributes {
                        write!(output, " {name}=\"{value}\"")?;
                    }
                }
                output.push('>');
            }
        }

        if self.options.show_ids {
            write!(output, " [{node:?}]")?;
        }
        if document.active_element() == Some(node) {
            output.push_str(" (focused)");
        }
        output.push('\n');

        let children: Vec<NodeId> = document
            .children(node)
            .iter()
            .copied()
            .filter(|&c| self.options.show_text || document.is_element(c))
            .collect();
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            last_flags.push(i + 1 == count);
            self.write_node(document, child, last_flags, output)?;
            last_flags.pop();
        }
        Ok(())
    }

    fn write_prefix(&self, last_flags: &[bool], output: &mut String) -> fmt::Result {
        let Some((&is_last, ancestors)) = last_flags.split_last() else {
            return Ok(());
        };
        let (branch, tee, corner) = match self.options.style {
            TreeStyle::Ascii => ("|   ", "+-- ", "`-- "),
            TreeStyle::Unicode => ("\u{2502}   ", "\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} "),
        };
        for &ancestor_last in ancestors {
            output.write_str(if ancestor_last { "    " } else { branch })?;
        }
        output.write_str(if is_last { corner } else { tee })
    }
}

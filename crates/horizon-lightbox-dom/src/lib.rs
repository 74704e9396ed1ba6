//! In-memory document model for Horizon Lightbox.
//!
//! This crate provides the small slice of the browser DOM that the lightbox
//! widget needs, without a browser:
//!
//! - **Tree**: elements and text nodes in a slot-map arena, HTML and SVG namespaces
//! - **Attributes**: class lists and inline styles as views over attributes
//! - **Selectors**: type, class, ID, attribute, structural pseudo-classes and combinators
//! - **Focus**: an active element with browser-like focusability rules
//! - **Events**: click and keydown dispatch with bubbling, `stopPropagation`
//!   and `preventDefault`
//! - **Markup**: build a document from an HTML-like fragment
//!
//! # Example
//!
//! ```
//! use horizon_lightbox_dom::Document;
//!
//! let doc = Document::from_markup(
//!     r#"<article class="prose"><img src="a.png"><svg viewBox="0 0 10 10"></svg></article>"#,
//! )
//! .unwrap();
//!
//! let media = doc.query_selector_all(".prose img, .prose svg").unwrap();
//! assert_eq!(media.len(), 2);
//! ```

mod document;
mod error;
mod event;
pub mod logging;
mod markup;
mod node;
pub mod selector;

pub use document::{Document, Viewport};
pub use error::{Error, Result};
pub use event::{DispatchOutcome, DomEvent, EventCallback, EventKind, ListenerId};
pub use node::{ElementData, HTML_NAMESPACE, Namespace, NodeId, NodeKind, SVG_NAMESPACE};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::{
        DispatchOutcome, Document, DomEvent, EventKind, ListenerId, Namespace, NodeId, NodeKind,
        Viewport,
    };
    pub use crate::logging::{DocumentTreeDebug, TreeFormatOptions, TreeStyle};
    pub use crate::selector::{SelectorList, parse_selector_list};
}

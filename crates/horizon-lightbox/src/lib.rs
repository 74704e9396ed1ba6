//! Accessible media lightbox.
//!
//! Click (or press Enter/Space on) an image or SVG diagram to see an
//! enlarged copy in a modal overlay. The lightbox:
//!
//! - **Binds** each matching target once, adding a pointer class, `role`,
//!   `tabindex` and `aria-label` only where the author left them out
//! - **Resizes** SVG copies to fit the viewport while keeping the `viewBox`
//!   aspect ratio
//! - **Manages focus**: the close control takes focus on open and the
//!   previously focused element gets it back on close
//! - **Locks scrolling** with a body class while open
//! - **Dismisses** on Escape, on the close control, or on a backdrop click
//!
//! The widget logic is written against the [`MediaDom`] trait. The
//! in-memory [`Document`](horizon_lightbox_dom::Document) host is always
//! available; the browser host is behind the `web` feature and exported to
//! JavaScript as `initMediaLightbox`.
//!
//! # Expected markup
//!
//! ```html
//! <div id="media-lightbox" class="hidden" aria-hidden="true">
//!   <div id="media-lightbox-content"></div>
//!   <button type="button" data-close-lightbox>Close</button>
//! </div>
//! ```
//!
//! # Example
//!
//! ```
//! use horizon_lightbox::prelude::*;
//!
//! let mut doc = Document::from_markup(r#"
//!     <div id="media-lightbox" class="hidden" aria-hidden="true">
//!       <div id="media-lightbox-content"></div>
//!       <button data-close-lightbox>Close</button>
//!     </div>
//!     <svg class="diagram" viewBox="0 0 400 200" width="400" height="200"></svg>
//! "#).unwrap();
//! doc.set_viewport(Viewport::new(1000.0, 800.0));
//!
//! let options = LightboxOptions::new("svg.diagram", "media-lightbox", "media-lightbox-content");
//! let lightbox = init_media_lightbox(&mut doc, &options).unwrap();
//!
//! let diagram = doc.query_selector("svg.diagram").unwrap().unwrap();
//! lightbox.open(&mut doc, diagram).unwrap();
//!
//! let copy = doc.children(lightbox.content())[0];
//! assert_eq!(doc.style_property(copy, "width").as_deref(), Some("904px"));
//! assert_eq!(doc.style_property(copy, "height").as_deref(), Some("452px"));
//! ```

mod error;
mod host;
mod init;
mod lightbox;
pub mod logging;
mod media;
mod options;
pub mod sizing;

#[cfg(feature = "web")]
pub mod web;

pub use error::{ConfigError, LightboxError, Result};
pub use host::MediaDom;
pub use init::{LightboxHandle, init_media_lightbox, try_init_media_lightbox};
pub use lightbox::{
    EventResponse, KeyAction, Lightbox, LightboxState, bind_media_element, prepare,
};
pub use media::MediaKind;
pub use options::{
    BOUND_ATTR, ConfigFormat, DEFAULT_CLOSE_SELECTOR, INITIALIZED_ATTR, LightboxOptions,
    MarkupConventions,
};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::{
        LightboxError, LightboxHandle, LightboxOptions, LightboxState, MarkupConventions,
        MediaDom, MediaKind, init_media_lightbox, try_init_media_lightbox,
    };
    pub use horizon_lightbox_dom::{Document, EventKind, NodeId, Viewport};
}

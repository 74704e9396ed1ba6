//! Attaching the lightbox to an in-memory [`Document`].
//!
//! ```
//! use horizon_lightbox::{LightboxOptions, init_media_lightbox};
//! use horizon_lightbox_dom::Document;
//!
//! let mut doc = Document::from_markup(r#"
//!     <div id="lightbox" class="hidden" aria-hidden="true">
//!       <div id="lightbox-content"></div>
//!       <button data-close-lightbox>Close</button>
//!     </div>
//!     <article class="prose"><img src="diagram.png" alt="Diagram"></article>
//! "#).unwrap();
//!
//! let options = LightboxOptions::new(".prose img", "lightbox", "lightbox-content");
//! let lightbox = init_media_lightbox(&mut doc, &options).unwrap();
//!
//! let image = doc.query_selector(".prose img").unwrap().unwrap();
//! doc.click(image);
//! assert!(lightbox.is_open());
//!
//! doc.key_down("Escape");
//! assert!(!lightbox.is_open());
//! assert_eq!(doc.active_element(), Some(image));
//! ```

use std::sync::Arc;

use horizon_lightbox_dom::{Document, DomEvent, EventKind, NodeId};
use parking_lot::Mutex;

use crate::error::Result;
use crate::lightbox::{EventResponse, Lightbox, LightboxState, bind_media_element, prepare};
use crate::logging::targets;
use crate::options::LightboxOptions;

type SharedLightbox = Arc<Mutex<Lightbox<NodeId>>>;

/// Initialize the lightbox, logging and swallowing any failure.
///
/// Missing markup, a second initialization of the same overlay and invalid
/// selectors all leave the page untouched and return `None`.
pub fn init_media_lightbox(document: &mut Document, options: &LightboxOptions) -> Option<LightboxHandle> {
    match try_init_media_lightbox(document, options) {
        Ok(handle) => Some(handle),
        Err(error) => {
            tracing::debug!(target: targets::INIT, %error, "media lightbox not initialized");
            None
        }
    }
}

/// Initialize the lightbox, reporting why it could not be set up.
pub fn try_init_media_lightbox(
    document: &mut Document,
    options: &LightboxOptions,
) -> Result<LightboxHandle> {
    options.validate()?;
    let (lightbox, targets) = prepare(document, options)?;
    let overlay = *lightbox.overlay();
    let close_control = *lightbox.close_control();
    let handle = LightboxHandle {
        shared: Arc::new(Mutex::new(lightbox)),
    };

    let shared = Arc::clone(&handle.shared);
    document.add_document_listener(EventKind::KeyDown, move |doc, event| {
        let Some(key) = event.key().map(str::to_string) else {
            return;
        };
        let response = shared.lock().handle_document_key(doc, &key);
        apply_response(event, response);
    });

    let shared = Arc::clone(&handle.shared);
    document.add_event_listener(close_control, EventKind::Click, move |doc, event| {
        let response = shared.lock().handle_close_click(doc);
        apply_response(event, response);
    })?;

    let shared = Arc::clone(&handle.shared);
    document.add_event_listener(overlay, EventKind::Click, move |doc, event| {
        let target = event.target();
        let response = shared.lock().handle_overlay_click(doc, &target);
        apply_response(event, response);
    })?;

    let mut bound = 0;
    for target in targets {
        if handle.bind(document, target)? {
            bound += 1;
        }
    }
    tracing::debug!(target: targets::INIT, bound, "media lightbox ready");

    Ok(handle)
}

fn apply_response(event: &mut DomEvent, response: Result<EventResponse>) {
    match response {
        Ok(response) => {
            if response.stop_propagation {
                event.stop_propagation();
            }
            if response.prevent_default {
                event.prevent_default();
            }
        }
        Err(error) => {
            tracing::warn!(target: targets::LIGHTBOX, %error, kind = %event.kind(), "lightbox handler failed");
        }
    }
}

/// A live lightbox attached to a [`Document`].
///
/// Cloning the handle shares the same lightbox.
#[derive(Clone)]
pub struct LightboxHandle {
    shared: SharedLightbox,
}

impl LightboxHandle {
    /// Check if the overlay is open.
    pub fn is_open(&self) -> bool {
        self.shared.lock().is_open()
    }

    /// The element focus returns to on close, if open.
    pub fn last_focused(&self) -> Option<NodeId> {
        self.shared.lock().last_focused().copied()
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> LightboxState<NodeId> {
        self.shared.lock().state().clone()
    }

    /// The overlay root.
    pub fn overlay(&self) -> NodeId {
        *self.shared.lock().overlay()
    }

    /// The content slot.
    pub fn content(&self) -> NodeId {
        *self.shared.lock().content()
    }

    /// The close control.
    pub fn close_control(&self) -> NodeId {
        *self.shared.lock().close_control()
    }

    /// Open the lightbox on `target` programmatically.
    pub fn open(&self, document: &mut Document, target: NodeId) -> Result<()> {
        self.shared.lock().open(document, &target)
    }

    /// Close the lightbox. Returns `false` if it was already closed.
    pub fn close(&self, document: &mut Document) -> Result<bool> {
        self.shared.lock().close(document)
    }

    /// Bind one more element, for content added after initialization.
    ///
    /// Returns `false` if the element is not media or is already bound.
    pub fn bind(&self, document: &mut Document, element: NodeId) -> Result<bool> {
        let conventions = self.shared.lock().conventions().clone();
        if !bind_media_element(document, &element, &conventions)? {
            return Ok(false);
        }

        let shared = Arc::clone(&self.shared);
        document.add_event_listener(element, EventKind::Click, move |doc, event| {
            let response = shared.lock().handle_target_click(doc, &element);
            apply_response(event, response);
        })?;

        let shared = Arc::clone(&self.shared);
        document.add_event_listener(element, EventKind::KeyDown, move |doc, event| {
            let Some(key) = event.key().map(str::to_string) else {
                return;
            };
            let response = shared.lock().handle_target_key(doc, &element, &key);
            apply_response(event, response);
        })?;

        Ok(true)
    }
}

impl std::fmt::Debug for LightboxHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LightboxHandle")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

//! The lightbox state machine.
//!
//! [`Lightbox`] owns no DOM. Every operation takes the page as a
//! [`MediaDom`] so the same logic drives the in-memory document and the
//! browser. Event handlers return an [`EventResponse`] telling the host
//! which event flags to set, since only the host holds the live event.
//!
//! # State
//!
//! ```text
//!            activate target
//!   Closed ─────────────────────▶ Open { last_focused }
//!     ▲                              │
//!     └──────────────────────────────┘
//!       Escape / close control / backdrop click
//! ```

use crate::error::{LightboxError, Result};
use crate::host::MediaDom;
use crate::logging::targets;
use crate::media::MediaKind;
use crate::options::{BOUND_ATTR, INITIALIZED_ATTR, LightboxOptions, MarkupConventions};
use crate::sizing::{ViewBox, fit_vector_graphic};

/// Whether the overlay is showing, and what to refocus when it closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LightboxState<E> {
    /// Overlay hidden.
    Closed,
    /// Overlay showing.
    Open {
        /// Element that had focus before the overlay opened.
        last_focused: E,
    },
}

impl<E> Default for LightboxState<E> {
    fn default() -> Self {
        Self::Closed
    }
}

impl<E> LightboxState<E> {
    /// Check if the overlay is open.
    #[inline]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    /// The element to refocus on close, if open.
    pub fn last_focused(&self) -> Option<&E> {
        match self {
            Self::Open { last_focused } => Some(last_focused),
            Self::Closed => None,
        }
    }
}

/// Flags a handler wants set on the event it handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventResponse {
    /// Stop the event from bubbling further.
    pub stop_propagation: bool,
    /// Cancel the browser default action.
    pub prevent_default: bool,
}

impl EventResponse {
    /// Leave the event alone.
    pub const IGNORED: Self = Self {
        stop_propagation: false,
        prevent_default: false,
    };

    /// Stop propagation only.
    pub const STOP: Self = Self {
        stop_propagation: true,
        prevent_default: false,
    };

    /// Cancel the default action only.
    pub const PREVENT_DEFAULT: Self = Self {
        stop_propagation: false,
        prevent_default: true,
    };
}

/// What a key press means to the lightbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Enter: open, keep the default action.
    Activate,
    /// Space: open and suppress page scrolling.
    ActivateWithoutScroll,
    /// Escape: close.
    Dismiss,
}

impl KeyAction {
    /// Map a `KeyboardEvent.key` value, including legacy spellings.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Enter" => Some(Self::Activate),
            " " | "Spacebar" => Some(Self::ActivateWithoutScroll),
            "Escape" | "Esc" => Some(Self::Dismiss),
            _ => None,
        }
    }
}

/// One overlay and its session state.
#[derive(Debug, Clone)]
pub struct Lightbox<E> {
    overlay: E,
    content: E,
    close_control: E,
    conventions: MarkupConventions,
    state: LightboxState<E>,
}

impl<E: Clone + PartialEq + std::fmt::Debug> Lightbox<E> {
    /// Create a closed lightbox over already-resolved elements.
    pub fn new(overlay: E, content: E, close_control: E, conventions: MarkupConventions) -> Self {
        Self {
            overlay,
            content,
            close_control,
            conventions,
            state: LightboxState::Closed,
        }
    }

    /// The overlay root.
    pub fn overlay(&self) -> &E {
        &self.overlay
    }

    /// The content slot.
    pub fn content(&self) -> &E {
        &self.content
    }

    /// The close control.
    pub fn close_control(&self) -> &E {
        &self.close_control
    }

    /// Class names and labels in use.
    pub fn conventions(&self) -> &MarkupConventions {
        &self.conventions
    }

    /// Current state.
    pub fn state(&self) -> &LightboxState<E> {
        &self.state
    }

    /// Check if the overlay is open.
    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    /// The element to refocus on close, if open.
    pub fn last_focused(&self) -> Option<&E> {
        self.state.last_focused()
    }

    /// Show an enlarged copy of `target`.
    ///
    /// The focused element is recorded on the first open; reopening while
    /// open replaces the content and keeps the recorded element.
    pub fn open<D>(&mut self, dom: &mut D, target: &E) -> Result<()>
    where
        D: MediaDom<Element = E>,
    {
        let kind = dom.media_kind(target);
        let copy = match kind {
            Some(MediaKind::VectorGraphic) => self.vector_copy(dom, target)?,
            Some(MediaKind::Raster) | None => dom.deep_clone(target)?,
        };

        let last_focused = match &self.state {
            LightboxState::Open { last_focused } => last_focused.clone(),
            LightboxState::Closed => dom.active_element().unwrap_or_else(|| target.clone()),
        };

        // State follows the hidden class, so it only changes once the overlay
        // is revealed.
        dom.replace_content(&self.content, Some(copy))?;
        dom.remove_class(&self.overlay, &self.conventions.hidden_class)?;
        self.state = LightboxState::Open { last_focused };
        dom.set_attribute(&self.overlay, "aria-hidden", "false")?;
        if let Some(body) = dom.body() {
            dom.add_class(&body, &self.conventions.scroll_lock_class)?;
        }
        dom.focus(&self.close_control);

        tracing::debug!(
            target: targets::LIGHTBOX,
            element = ?target,
            kind = ?kind,
            last_focused = ?self.state.last_focused(),
            "lightbox opened"
        );
        Ok(())
    }

    fn vector_copy<D>(&self, dom: &mut D, target: &E) -> Result<E>
    where
        D: MediaDom<Element = E>,
    {
        let copy = dom.deep_clone(target)?;
        dom.remove_attribute(&copy, "width")?;
        dom.remove_attribute(&copy, "height")?;

        let view_box = dom
            .attribute(&copy, "viewBox")
            .as_deref()
            .and_then(ViewBox::parse);
        let size = fit_vector_graphic(dom.viewport(), view_box);
        dom.set_style(&copy, "width", &size.width_css())?;
        dom.set_style(&copy, "height", &size.height_css())?;

        tracing::trace!(target: targets::LIGHTBOX, ?view_box, ?size, "sized vector copy");
        Ok(copy)
    }

    /// Hide the overlay and restore focus.
    ///
    /// Returns `false` without touching the page if the overlay is already
    /// hidden.
    pub fn close<D>(&mut self, dom: &mut D) -> Result<bool>
    where
        D: MediaDom<Element = E>,
    {
        if dom.has_class(&self.overlay, &self.conventions.hidden_class) {
            return Ok(false);
        }

        dom.add_class(&self.overlay, &self.conventions.hidden_class)?;
        let previous = std::mem::take(&mut self.state);
        dom.set_attribute(&self.overlay, "aria-hidden", "true")?;
        dom.replace_content(&self.content, None)?;
        if let Some(body) = dom.body() {
            dom.remove_class(&body, &self.conventions.scroll_lock_class)?;
        }

        if let LightboxState::Open { last_focused } = &previous {
            if dom.can_focus(last_focused) {
                dom.focus(last_focused);
            }
        }
        dom.blur(&self.close_control);

        tracing::debug!(
            target: targets::LIGHTBOX,
            restored = ?previous.last_focused(),
            "lightbox closed"
        );
        Ok(true)
    }

    /// Click on a bound target: open it and keep the click away from the
    /// backdrop handler.
    pub fn handle_target_click<D>(&mut self, dom: &mut D, target: &E) -> Result<EventResponse>
    where
        D: MediaDom<Element = E>,
    {
        self.open(dom, target)?;
        Ok(EventResponse::STOP)
    }

    /// Key press on a bound target.
    pub fn handle_target_key<D>(&mut self, dom: &mut D, target: &E, key: &str) -> Result<EventResponse>
    where
        D: MediaDom<Element = E>,
    {
        match KeyAction::from_key(key) {
            Some(KeyAction::Activate) => {
                self.open(dom, target)?;
                Ok(EventResponse::IGNORED)
            }
            Some(KeyAction::ActivateWithoutScroll) => {
                self.open(dom, target)?;
                Ok(EventResponse::PREVENT_DEFAULT)
            }
            Some(KeyAction::Dismiss) | None => Ok(EventResponse::IGNORED),
        }
    }

    /// Key press anywhere in the document.
    pub fn handle_document_key<D>(&mut self, dom: &mut D, key: &str) -> Result<EventResponse>
    where
        D: MediaDom<Element = E>,
    {
        if KeyAction::from_key(key) == Some(KeyAction::Dismiss) {
            self.close(dom)?;
        }
        Ok(EventResponse::IGNORED)
    }

    /// Click that bubbled to the overlay. Only a click aimed at the overlay
    /// itself (the backdrop) closes it.
    pub fn handle_overlay_click<D>(&mut self, dom: &mut D, event_target: &E) -> Result<EventResponse>
    where
        D: MediaDom<Element = E>,
    {
        if *event_target == self.overlay {
            self.close(dom)?;
        }
        Ok(EventResponse::IGNORED)
    }

    /// Click on the close control.
    pub fn handle_close_click<D>(&mut self, dom: &mut D) -> Result<EventResponse>
    where
        D: MediaDom<Element = E>,
    {
        self.close(dom)?;
        Ok(EventResponse::IGNORED)
    }
}

/// Resolve the overlay, content slot, close control and targets, then mark
/// the overlay initialized.
///
/// Every check (including selector parsing) runs before the overlay is
/// marked, so a failure leaves the page untouched.
pub fn prepare<D: MediaDom>(
    dom: &mut D,
    options: &LightboxOptions,
) -> Result<(Lightbox<D::Element>, Vec<D::Element>)> {
    let overlay = dom
        .element_by_id(&options.lightbox_id)
        .ok_or_else(|| LightboxError::OverlayNotFound {
            id: options.lightbox_id.clone(),
        })?;

    let content = dom
        .element_by_id(&options.content_id)
        .ok_or_else(|| LightboxError::ContentNotFound {
            id: options.content_id.clone(),
        })?;

    let close_selector = options.close_selector();
    let close_control = dom.query_within(&overlay, close_selector)?.ok_or_else(|| {
        LightboxError::CloseControlNotFound {
            selector: close_selector.to_string(),
        }
    })?;
    if !dom.is_interactive(&close_control) {
        return Err(LightboxError::CloseControlNotInteractive);
    }

    if dom.attribute(&overlay, INITIALIZED_ATTR).is_some() {
        return Err(LightboxError::AlreadyInitialized);
    }

    let targets = dom.query_all(&options.target_selector)?;

    dom.set_attribute(&overlay, INITIALIZED_ATTR, "true")?;
    tracing::debug!(
        target: targets::INIT,
        overlay = %options.lightbox_id,
        targets = targets.len(),
        "overlay initialized"
    );

    let lightbox = Lightbox::new(
        overlay,
        content,
        close_control,
        options.conventions.clone(),
    );
    Ok((lightbox, targets))
}

/// Mark a target as bound and add its affordances.
///
/// Returns `true` if the caller should attach listeners. Non-media elements
/// and elements bound earlier return `false` and are left untouched.
/// Author-supplied `role`, `tabindex` and `aria-label` values are kept.
pub fn bind_media_element<D: MediaDom>(
    dom: &mut D,
    element: &D::Element,
    conventions: &MarkupConventions,
) -> Result<bool> {
    let Some(kind) = dom.media_kind(element) else {
        tracing::trace!(target: targets::INIT, ?element, "skipping non-media element");
        return Ok(false);
    };
    if dom.attribute(element, BOUND_ATTR).is_some() {
        tracing::trace!(target: targets::INIT, ?element, "already bound");
        return Ok(false);
    }

    dom.set_attribute(element, BOUND_ATTR, "true")?;
    if !dom.has_class(element, &conventions.cursor_class) {
        dom.add_class(element, &conventions.cursor_class)?;
    }
    let affordances = [
        ("role", "button"),
        ("tabindex", "0"),
        ("aria-label", conventions.aria_label.as_str()),
    ];
    for (name, value) in affordances {
        if dom.attribute(element, name).is_none() {
            dom.set_attribute(element, name, value)?;
        }
    }

    tracing::trace!(target: targets::INIT, ?element, %kind, "bound media element");
    Ok(true)
}

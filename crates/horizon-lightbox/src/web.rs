//! Browser host over `web-sys`.
//!
//! Build with the `web` feature for `wasm32-unknown-unknown` and call the
//! exported function once the page has loaded:
//!
//! ```js
//! import init, { initMediaLightbox } from "./horizon_lightbox.js";
//!
//! await init();
//! initMediaLightbox({
//!   targetSelector: ".prose img, .prose svg",
//!   lightboxId: "media-lightbox",
//!   contentId: "media-lightbox-content",
//! });
//! ```
//!
//! Listeners live as long as the page, so their closures are leaked.

use std::cell::RefCell;
use std::rc::Rc;

use horizon_lightbox_dom::{SVG_NAMESPACE, Viewport};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::convert::FromWasmAbi;
use web_sys::{Element, Event, HtmlElement, KeyboardEvent, MouseEvent, SvgElement};

use crate::error::{LightboxError, Result};
use crate::host::MediaDom;
use crate::lightbox::{EventResponse, Lightbox, bind_media_element, prepare};
use crate::logging::targets;
use crate::media::MediaKind;
use crate::options::LightboxOptions;

fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|error| String::from(error.message()))
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

fn host_error(operation: &'static str) -> impl Fn(JsValue) -> LightboxError {
    move |value| LightboxError::host(operation, js_message(&value))
}

/// [`MediaDom`] over the live browser document.
#[derive(Debug, Clone)]
pub struct WebDom {
    window: web_sys::Window,
    document: web_sys::Document,
}

impl WebDom {
    /// Wrap the current window's document.
    pub fn from_window() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| LightboxError::host("window", "no global window"))?;
        let document = window
            .document()
            .ok_or_else(|| LightboxError::host("document", "window has no document"))?;
        Ok(Self { window, document })
    }

    fn selector_error(selector: &str, value: &JsValue) -> LightboxError {
        LightboxError::Selector(horizon_lightbox_dom::Error::invalid_selector(
            selector,
            js_message(value),
        ))
    }
}

impl MediaDom for WebDom {
    type Element = Element;

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn query_all(&self, selector: &str) -> Result<Vec<Element>> {
        let list = self
            .document
            .query_selector_all(selector)
            .map_err(|e| Self::selector_error(selector, &e))?;
        Ok((0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect())
    }

    fn query_within(&self, scope: &Element, selector: &str) -> Result<Option<Element>> {
        scope
            .query_selector(selector)
            .map_err(|e| Self::selector_error(selector, &e))
    }

    fn media_kind(&self, element: &Element) -> Option<MediaKind> {
        if element.namespace_uri().as_deref() == Some(SVG_NAMESPACE) {
            Some(MediaKind::VectorGraphic)
        } else if element.is_instance_of::<web_sys::HtmlImageElement>() {
            Some(MediaKind::Raster)
        } else {
            None
        }
    }

    fn is_interactive(&self, element: &Element) -> bool {
        element.is_instance_of::<HtmlElement>()
    }

    fn can_focus(&self, element: &Element) -> bool {
        element.is_connected()
            && (element.is_instance_of::<HtmlElement>() || element.is_instance_of::<SvgElement>())
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn set_attribute(&mut self, element: &Element, name: &str, value: &str) -> Result<()> {
        element
            .set_attribute(name, value)
            .map_err(host_error("setAttribute"))
    }

    fn remove_attribute(&mut self, element: &Element, name: &str) -> Result<()> {
        element
            .remove_attribute(name)
            .map_err(host_error("removeAttribute"))
    }

    fn has_class(&self, element: &Element, class: &str) -> bool {
        element.class_list().contains(class)
    }

    fn add_class(&mut self, element: &Element, class: &str) -> Result<()> {
        element
            .class_list()
            .add_1(class)
            .map_err(host_error("classList.add"))
    }

    fn remove_class(&mut self, element: &Element, class: &str) -> Result<()> {
        element
            .class_list()
            .remove_1(class)
            .map_err(host_error("classList.remove"))
    }

    fn set_style(&mut self, element: &Element, property: &str, value: &str) -> Result<()> {
        let style = if let Some(html) = element.dyn_ref::<HtmlElement>() {
            html.style()
        } else if let Some(svg) = element.dyn_ref::<SvgElement>() {
            svg.style()
        } else {
            return Err(LightboxError::host("style", "element has no inline style"));
        };
        style
            .set_property(property, value)
            .map_err(host_error("style.setProperty"))
    }

    fn deep_clone(&mut self, element: &Element) -> Result<Element> {
        element
            .clone_node_with_deep(true)
            .map_err(host_error("cloneNode"))?
            .dyn_into::<Element>()
            .map_err(|_| LightboxError::host("cloneNode", "clone is not an element"))
    }

    fn replace_content(&mut self, slot: &Element, content: Option<Element>) -> Result<()> {
        while let Some(child) = slot.first_child() {
            slot.remove_child(&child).map_err(host_error("removeChild"))?;
        }
        if let Some(content) = content {
            slot.append_child(&content).map_err(host_error("appendChild"))?;
        }
        Ok(())
    }

    fn active_element(&self) -> Option<Element> {
        let active = self.document.active_element()?;
        let body = self.document.body().map(Element::from);
        (Some(&active) != body.as_ref()).then_some(active)
    }

    fn focus(&mut self, element: &Element) {
        let result = if let Some(html) = element.dyn_ref::<HtmlElement>() {
            html.focus()
        } else if let Some(svg) = element.dyn_ref::<SvgElement>() {
            svg.focus()
        } else {
            Ok(())
        };
        if let Err(value) = result {
            tracing::trace!(target: targets::WEB, error = %js_message(&value), "focus failed");
        }
    }

    fn blur(&mut self, element: &Element) {
        let result = if let Some(html) = element.dyn_ref::<HtmlElement>() {
            html.blur()
        } else if let Some(svg) = element.dyn_ref::<SvgElement>() {
            svg.blur()
        } else {
            Ok(())
        };
        if let Err(value) = result {
            tracing::trace!(target: targets::WEB, error = %js_message(&value), "blur failed");
        }
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn viewport(&self) -> Viewport {
        let dimension = |value: std::result::Result<JsValue, JsValue>| {
            value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
        };
        Viewport::new(
            dimension(self.window.inner_width()),
            dimension(self.window.inner_height()),
        )
    }
}

type SharedLightbox = Rc<RefCell<Lightbox<Element>>>;

/// Initialize the lightbox from JavaScript.
///
/// Accepts `{ targetSelector, lightboxId, contentId, closeSelector? }`.
/// Never throws: failures are logged and the page is left as it was.
#[wasm_bindgen(js_name = initMediaLightbox)]
pub fn init_media_lightbox_js(options: JsValue) {
    let result = options_from_js(&options).and_then(|options| try_init_web(&options));
    if let Err(error) = result {
        tracing::debug!(target: targets::INIT, %error, "media lightbox not initialized");
    }
}

fn options_from_js(options: &JsValue) -> Result<LightboxOptions> {
    let json = js_sys::JSON::stringify(options)
        .map_err(host_error("JSON.stringify"))?
        .as_string();
    options_from_json(json)
}

/// Parse the `JSON.stringify` output of the options argument.
///
/// `None` is what `stringify` yields for `undefined` and functions.
fn options_from_json(json: Option<String>) -> Result<LightboxOptions> {
    let json =
        json.ok_or_else(|| LightboxError::host("JSON.stringify", "options are not serializable"))?;
    Ok(LightboxOptions::from_json_str(&json)?)
}

/// Initialize the lightbox against the browser document.
pub fn try_init_web(options: &LightboxOptions) -> Result<()> {
    options.validate()?;
    let mut dom = WebDom::from_window()?;
    let (lightbox, targets) = prepare(&mut dom, options)?;
    let overlay = lightbox.overlay().clone();
    let close_control = lightbox.close_control().clone();
    let conventions = lightbox.conventions().clone();
    let shared: SharedLightbox = Rc::new(RefCell::new(lightbox));

    listen::<KeyboardEvent>(&dom.document, "keydown", {
        let (shared, mut dom) = (Rc::clone(&shared), dom.clone());
        move |event| {
            let key = event.key();
            with_lightbox(&shared, &event, |lightbox| lightbox.handle_document_key(&mut dom, &key));
        }
    })?;

    listen::<MouseEvent>(&close_control, "click", {
        let (shared, mut dom) = (Rc::clone(&shared), dom.clone());
        move |event| {
            with_lightbox(&shared, &event, |lightbox| lightbox.handle_close_click(&mut dom));
        }
    })?;

    listen::<MouseEvent>(&overlay, "click", {
        let (shared, mut dom) = (Rc::clone(&shared), dom.clone());
        move |event| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            with_lightbox(&shared, &event, |lightbox| {
                lightbox.handle_overlay_click(&mut dom, &target)
            });
        }
    })?;

    for target in targets {
        if !bind_media_element(&mut dom, &target, &conventions)? {
            continue;
        }

        listen::<MouseEvent>(&target, "click", {
            let (shared, mut dom, element) = (Rc::clone(&shared), dom.clone(), target.clone());
            move |event| {
                with_lightbox(&shared, &event, |lightbox| {
                    lightbox.handle_target_click(&mut dom, &element)
                });
            }
        })?;

        listen::<KeyboardEvent>(&target, "keydown", {
            let (shared, mut dom, element) = (Rc::clone(&shared), dom.clone(), target.clone());
            move |event| {
                let key = event.key();
                with_lightbox(&shared, &event, |lightbox| {
                    lightbox.handle_target_key(&mut dom, &element, &key)
                });
            }
        })?;
    }

    tracing::debug!(target: targets::INIT, "media lightbox ready");
    Ok(())
}

/// Attach a listener for the page lifetime.
fn listen<T>(
    target: &web_sys::EventTarget,
    kind: &str,
    handler: impl FnMut(T) + 'static,
) -> Result<()>
where
    T: FromWasmAbi + 'static,
{
    let closure = Closure::<dyn FnMut(T)>::new(handler);
    target
        .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
        .map_err(host_error("addEventListener"))?;
    closure.forget();
    Ok(())
}

/// Run a handler against the shared lightbox and apply its response.
fn with_lightbox<F>(shared: &SharedLightbox, event: &Event, handler: F)
where
    F: FnOnce(&mut Lightbox<Element>) -> Result<EventResponse>,
{
    let Ok(mut lightbox) = shared.try_borrow_mut() else {
        tracing::trace!(target: targets::WEB, kind = %event.type_(), "lightbox busy, event ignored");
        return;
    };
    match handler(&mut lightbox) {
        Ok(response) => {
            if response.stop_propagation {
                event.stop_propagation();
            }
            if response.prevent_default {
                event.prevent_default();
            }
        }
        Err(error) => {
            tracing::warn!(target: targets::WEB, %error, kind = %event.type_(), "lightbox handler failed");
        }
    }
}

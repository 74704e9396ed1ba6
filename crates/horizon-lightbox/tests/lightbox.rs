//! End-to-end behavior of the lightbox against the in-memory document.

use horizon_lightbox::prelude::*;
use horizon_lightbox::{BOUND_ATTR, INITIALIZED_ATTR, bind_media_element};
use horizon_lightbox_dom::logging::{DocumentTreeDebug, TreeFormatOptions, TreeStyle};

fn setup() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("horizon_lightbox=trace")
        .with_test_writer()
        .try_init();
}

const PAGE: &str = r#"
<div id="lightbox" class="hidden fixed" aria-hidden="true">
  <div id="lightbox-content"></div>
  <button id="close" type="button" data-close-lightbox>Close</button>
</div>
<button id="before">Before</button>
<article class="prose">
  <img id="photo" src="photo.png" alt="Photo">
  <img id="labelled" src="chart.png" role="img" tabindex="-1" aria-label="Sales chart">
  <svg id="diagram" viewBox="0 0 400 200" width="400" height="200"><rect width="400" height="200"/></svg>
  <svg id="sketch" width="50" height="50"><circle r="5"/></svg>
  <p id="prose-text">Not media</p>
</article>
"#;

struct Page {
    doc: Document,
    lightbox: LightboxHandle,
}

impl Page {
    fn new() -> Self {
        Self::with_viewport(Viewport::new(1000.0, 800.0))
    }

    fn with_viewport(viewport: Viewport) -> Self {
        setup();
        let mut doc = Document::from_markup(PAGE).unwrap();
        doc.set_viewport(viewport);
        let lightbox = init_media_lightbox(&mut doc, &options()).unwrap();
        Self { doc, lightbox }
    }

    fn id(&self, id: &str) -> NodeId {
        self.doc.get_element_by_id(id).unwrap()
    }

    fn overlay(&self) -> NodeId {
        self.id("lightbox")
    }

    fn content(&self) -> NodeId {
        self.id("lightbox-content")
    }

    fn displayed(&self) -> Vec<NodeId> {
        self.doc.children(self.content()).to_vec()
    }

    fn body_locked(&self) -> bool {
        self.doc.has_class(self.doc.body(), "overflow-hidden")
    }

    fn overlay_hidden(&self) -> bool {
        self.doc.has_class(self.overlay(), "hidden")
    }

    /// The overlay subtree, for assertion messages.
    fn overlay_tree(&self) -> String {
        DocumentTreeDebug::with_options(TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..TreeFormatOptions::default()
        })
        .format_subtree(&self.doc, self.overlay())
    }
}

fn options() -> LightboxOptions {
    LightboxOptions::new(".prose img, .prose svg, .prose p", "lightbox", "lightbox-content")
}

#[test]
fn binds_media_targets_only() {
    let page = Page::new();
    for id in ["photo", "labelled", "diagram", "sketch"] {
        let node = page.id(id);
        assert_eq!(page.doc.attribute(node, BOUND_ATTR), Some("true"), "{id}");
        assert_eq!(page.doc.listener_count(node, EventKind::Click), 1, "{id}");
        assert_eq!(page.doc.listener_count(node, EventKind::KeyDown), 1, "{id}");
    }

    let text = page.id("prose-text");
    assert_eq!(page.doc.attribute(text, BOUND_ATTR), None);
    assert_eq!(page.doc.listener_count(text, EventKind::Click), 0);
    assert_eq!(page.doc.attribute(page.overlay(), INITIALIZED_ATTR), Some("true"));
}

#[test]
fn affordances_are_added_without_clobbering() {
    let page = Page::new();
    let photo = page.id("photo");
    assert_eq!(page.doc.attribute(photo, "role"), Some("button"));
    assert_eq!(page.doc.attribute(photo, "tabindex"), Some("0"));
    assert_eq!(page.doc.attribute(photo, "aria-label"), Some("Enlarge media"));
    assert!(page.doc.has_class(photo, "cursor-zoom-in"));

    let labelled = page.id("labelled");
    assert_eq!(page.doc.attribute(labelled, "role"), Some("img"));
    assert_eq!(page.doc.attribute(labelled, "tabindex"), Some("-1"));
    assert_eq!(page.doc.attribute(labelled, "aria-label"), Some("Sales chart"));
    assert!(page.doc.has_class(labelled, "cursor-zoom-in"));
}

#[test]
fn binding_twice_attaches_one_listener() {
    let mut page = Page::new();
    let photo = page.id("photo");

    assert!(!page.lightbox.bind(&mut page.doc, photo).unwrap());
    assert!(
        !bind_media_element(&mut page.doc, &photo, &MarkupConventions::default()).unwrap()
    );
    assert_eq!(page.doc.listener_count(photo, EventKind::Click), 1);
}

#[test]
fn second_initialization_is_a_no_op() {
    let mut page = Page::new();
    let photo = page.id("photo");
    let listeners = page.doc.document_listener_count(EventKind::KeyDown);

    assert!(init_media_lightbox(&mut page.doc, &options()).is_none());
    assert!(matches!(
        try_init_media_lightbox(&mut page.doc, &options()),
        Err(LightboxError::AlreadyInitialized)
    ));
    assert_eq!(page.doc.document_listener_count(EventKind::KeyDown), listeners);
    assert_eq!(page.doc.listener_count(photo, EventKind::Click), 1);
}

#[test]
fn overlapping_overlays_bind_each_target_once() {
    setup();
    let markup = format!(
        r#"{PAGE}
        <div id="second" class="hidden" aria-hidden="true">
          <div id="second-content"></div>
          <button data-close-lightbox>Close</button>
        </div>"#
    );
    let mut doc = Document::from_markup(&markup).unwrap();
    let first = init_media_lightbox(&mut doc, &options()).unwrap();
    let second = init_media_lightbox(
        &mut doc,
        &LightboxOptions::new(".prose img", "second", "second-content"),
    )
    .unwrap();

    let photo = doc.get_element_by_id("photo").unwrap();
    assert_eq!(doc.listener_count(photo, EventKind::Click), 1);

    doc.click(photo);
    assert!(first.is_open());
    assert!(!second.is_open());
}

#[test]
fn click_opens_with_a_copy_and_locks_scroll() {
    let mut page = Page::new();
    let photo = page.id("photo");

    page.doc.click(photo);

    assert!(page.lightbox.is_open());
    assert!(!page.overlay_hidden());
    assert!(page.doc.has_class(page.overlay(), "fixed"));
    assert_eq!(page.doc.attribute(page.overlay(), "aria-hidden"), Some("false"));
    assert!(page.body_locked());
    assert_eq!(page.doc.active_element(), Some(page.id("close")));

    let shown = page.displayed();
    assert_eq!(shown.len(), 1, "{}", page.overlay_tree());
    assert_ne!(shown[0], photo);
    assert_eq!(page.doc.attribute(shown[0], "src"), Some("photo.png"));
    assert_eq!(page.doc.listener_count(shown[0], EventKind::Click), 0);
    assert_eq!(page.doc.parent(photo).and_then(|p| page.doc.tag_name(p)), Some("article"));
}

#[test]
fn raster_copies_are_not_resized() {
    let mut page = Page::new();
    page.doc.click(page.id("photo"));
    let copy = page.displayed()[0];
    assert_eq!(page.doc.attribute(copy, "style"), None);
}

#[test]
fn vector_copy_fits_width() {
    let mut page = Page::new();
    let original = page.id("diagram");
    page.doc.click(original);

    let shown = page.displayed();
    assert_eq!(shown.len(), 1, "{}", page.overlay_tree());
    let copy = shown[0];
    assert_ne!(copy, original);
    assert_eq!(page.doc.namespace(copy), Some(horizon_lightbox_dom::Namespace::Svg));
    assert_eq!(page.doc.attribute(copy, "width"), None);
    assert_eq!(page.doc.attribute(copy, "height"), None);
    assert_eq!(page.doc.style_property(copy, "width").as_deref(), Some("904px"));
    assert_eq!(page.doc.style_property(copy, "height").as_deref(), Some("452px"));
    assert_eq!(page.doc.children(copy).len(), 1);

    assert_eq!(page.doc.attribute(original, "width"), Some("400"));
    assert_eq!(page.doc.attribute(original, "height"), Some("200"));
    assert_eq!(page.doc.attribute(original, "style"), None);
}

#[test]
fn vector_copy_falls_back_to_height() {
    let mut page = Page::with_viewport(Viewport::new(1000.0, 300.0));
    page.doc.click(page.id("diagram"));

    let copy = page.displayed()[0];
    assert_eq!(page.doc.style_property(copy, "width").as_deref(), Some("480px"));
    assert_eq!(page.doc.style_property(copy, "height").as_deref(), Some("240px"));
}

#[test]
fn vector_copy_without_view_box_gets_max_width() {
    let mut page = Page::with_viewport(Viewport::new(1000.0, 300.0));
    page.doc.click(page.id("sketch"));

    let copy = page.displayed()[0];
    assert_eq!(page.doc.attribute(copy, "width"), None);
    assert_eq!(page.doc.style_property(copy, "width").as_deref(), Some("904px"));
    assert_eq!(page.doc.style_property(copy, "height").as_deref(), Some("auto"));
}

#[test]
fn focus_cycle_restores_the_activated_target() {
    let mut page = Page::new();
    let photo = page.id("photo");

    page.doc.click(photo);
    assert_eq!(page.lightbox.last_focused(), Some(photo));

    page.doc.key_down("Escape");
    assert!(!page.lightbox.is_open());
    assert_eq!(page.lightbox.last_focused(), None);
    assert_eq!(page.doc.active_element(), Some(photo));
    assert!(page.overlay_hidden());
    assert_eq!(page.doc.attribute(page.overlay(), "aria-hidden"), Some("true"));
    assert!(!page.body_locked());
    assert!(page.displayed().is_empty(), "{}", page.overlay_tree());
}

#[test]
fn keyboard_activation() {
    let mut page = Page::new();
    let photo = page.id("photo");
    let diagram = page.id("diagram");

    page.doc.focus(photo);
    let outcome = page.doc.key_down("Enter");
    assert!(page.lightbox.is_open());
    assert!(outcome.should_run_default());
    page.doc.key_down("Escape");

    page.doc.focus(diagram);
    let outcome = page.doc.key_down(" ");
    assert!(page.lightbox.is_open());
    assert!(!outcome.should_run_default());
    assert_eq!(page.lightbox.last_focused(), Some(diagram));

    page.doc.key_down("Esc");
    assert!(!page.lightbox.is_open());
    assert_eq!(page.doc.active_element(), Some(diagram));
}

#[test]
fn other_keys_do_nothing() {
    let mut page = Page::new();
    page.doc.focus(page.id("photo"));
    page.doc.key_down("a");
    page.doc.key_down("Tab");
    assert!(!page.lightbox.is_open());
}

#[test]
fn close_control_closes() {
    let mut page = Page::new();
    let photo = page.id("photo");
    let close = page.id("close");

    page.doc.click(photo);
    page.doc.click(close);

    assert!(!page.lightbox.is_open());
    assert_eq!(page.doc.active_element(), Some(photo));
}

#[test]
fn backdrop_click_closes_but_content_click_does_not() {
    let mut page = Page::new();
    page.doc.click(page.id("photo"));

    let copy = page.displayed()[0];
    page.doc.click(copy);
    assert!(page.lightbox.is_open());

    page.doc.click(page.content());
    assert!(page.lightbox.is_open());

    page.doc.click(page.overlay());
    assert!(!page.lightbox.is_open());
}

#[test]
fn target_click_does_not_reach_the_backdrop() {
    setup();
    let markup = r#"
        <div id="lightbox" class="hidden" aria-hidden="true">
          <div id="lightbox-content"></div>
          <button data-close-lightbox>Close</button>
          <img id="inside" src="inside.png">
        </div>"#;
    let mut doc = Document::from_markup(markup).unwrap();
    let lightbox = init_media_lightbox(
        &mut doc,
        &LightboxOptions::new("#inside", "lightbox", "lightbox-content"),
    )
    .unwrap();

    let inside = doc.get_element_by_id("inside").unwrap();
    doc.click(inside);
    assert!(lightbox.is_open());
    doc.click(inside);
    assert!(lightbox.is_open());
}

#[test]
fn double_close_is_safe() {
    let mut page = Page::new();
    let before = page.id("before");
    let photo = page.id("photo");

    page.doc.focus(before);
    page.lightbox.open(&mut page.doc, photo).unwrap();
    assert_eq!(page.lightbox.last_focused(), Some(before));
    assert!(page.lightbox.close(&mut page.doc).unwrap());
    assert_eq!(page.doc.active_element(), Some(before));

    page.doc.add_class(page.doc.body(), "overflow-hidden").unwrap();
    let content = page.content();
    let marker = page.doc.create_element("span");
    page.doc.append_child(content, marker).unwrap();

    page.doc.click(page.overlay());
    page.doc.focus(photo);
    assert!(!page.lightbox.close(&mut page.doc).unwrap());
    page.doc.key_down("Escape");

    assert!(page.body_locked());
    assert_eq!(page.doc.children(content), &[marker]);
    assert_eq!(page.doc.active_element(), Some(photo));
}

#[test]
fn reopening_replaces_content_and_keeps_return_focus() {
    let mut page = Page::new();
    let photo = page.id("photo");
    let diagram = page.id("diagram");

    page.doc.click(photo);
    page.lightbox.open(&mut page.doc, diagram).unwrap();

    let shown = page.displayed();
    assert_eq!(shown.len(), 1, "{}", page.overlay_tree());
    assert_eq!(page.doc.tag_name(shown[0]), Some("svg"));
    assert_eq!(page.lightbox.last_focused(), Some(photo));
    assert_eq!(page.doc.active_element(), Some(page.id("close")));

    page.doc.key_down("Escape");
    assert_eq!(page.doc.active_element(), Some(photo));
}

#[test]
fn failed_open_leaves_the_lightbox_closed() {
    let mut page = Page::new();
    let photo = page.id("photo");
    let before = page.id("before");
    page.doc.focus(before);
    page.doc.destroy(page.content()).unwrap();

    assert!(page.lightbox.open(&mut page.doc, photo).is_err());
    assert!(!page.lightbox.is_open());
    assert_eq!(page.lightbox.last_focused(), None);
    assert!(page.overlay_hidden());
    assert!(!page.body_locked());
    assert_eq!(page.doc.active_element(), Some(before));
}

#[test]
fn open_without_focus_records_the_target() {
    let mut page = Page::new();
    let diagram = page.id("diagram");
    assert_eq!(page.doc.active_element(), None);

    page.lightbox.open(&mut page.doc, diagram).unwrap();
    assert_eq!(page.lightbox.last_focused(), Some(diagram));
}

#[test]
fn focus_is_not_restored_to_a_removed_element() {
    let mut page = Page::new();
    let photo = page.id("photo");

    page.doc.click(photo);
    page.doc.destroy(photo).unwrap();
    page.doc.key_down("Escape");

    assert!(!page.lightbox.is_open());
    assert_eq!(page.doc.active_element(), None);
}

#[test]
fn missing_markup_is_silent() {
    setup();
    let mut doc = Document::from_markup(PAGE).unwrap();
    let photo = doc.get_element_by_id("photo").unwrap();

    let cases = [
        LightboxOptions::new(".prose img", "missing", "lightbox-content"),
        LightboxOptions::new(".prose img", "lightbox", "missing"),
        LightboxOptions::new(".prose img", "lightbox", "lightbox-content")
            .with_close_selector("[data-missing]"),
    ];
    for options in &cases {
        assert!(init_media_lightbox(&mut doc, options).is_none());
    }

    let err = try_init_media_lightbox(&mut doc, &cases[0]).unwrap_err();
    assert!(matches!(err, LightboxError::OverlayNotFound { ref id } if id == "missing"));
    assert!(err.is_missing_markup());

    assert_eq!(doc.document_listener_count(EventKind::KeyDown), 0);
    assert_eq!(doc.listener_count(photo, EventKind::Click), 0);
    assert_eq!(doc.attribute(photo, BOUND_ATTR), None);
    let overlay = doc.get_element_by_id("lightbox").unwrap();
    assert_eq!(doc.attribute(overlay, INITIALIZED_ATTR), None);
}

#[test]
fn svg_close_control_is_rejected() {
    setup();
    let markup = r#"
        <div id="lightbox" class="hidden">
          <div id="lightbox-content"></div>
          <svg><g data-close-lightbox/></svg>
        </div>"#;
    let mut doc = Document::from_markup(markup).unwrap();
    let err = try_init_media_lightbox(
        &mut doc,
        &LightboxOptions::new("img", "lightbox", "lightbox-content"),
    )
    .unwrap_err();
    assert!(matches!(err, LightboxError::CloseControlNotInteractive));
}

#[test]
fn invalid_selectors_leave_the_page_untouched() {
    setup();
    let mut doc = Document::from_markup(PAGE).unwrap();
    let overlay = doc.get_element_by_id("lightbox").unwrap();

    let bad_target = LightboxOptions::new(".prose >", "lightbox", "lightbox-content");
    assert!(matches!(
        try_init_media_lightbox(&mut doc, &bad_target),
        Err(LightboxError::Selector(_))
    ));

    let bad_close =
        LightboxOptions::new(".prose img", "lightbox", "lightbox-content").with_close_selector("[");
    assert!(matches!(
        try_init_media_lightbox(&mut doc, &bad_close),
        Err(LightboxError::Selector(_))
    ));

    assert_eq!(doc.attribute(overlay, INITIALIZED_ATTR), None);
    assert!(init_media_lightbox(&mut doc, &options()).is_some());
}

#[test]
fn huge_nth_child_offsets_select_without_overflow() {
    setup();
    let mut doc = Document::from_markup(PAGE).unwrap();
    let options = LightboxOptions::new(
        ".prose img:nth-child(2n -99999999999)",
        "lightbox",
        "lightbox-content",
    );
    assert!(init_media_lightbox(&mut doc, &options).is_some());

    let photo = doc.get_element_by_id("photo").unwrap();
    let labelled = doc.get_element_by_id("labelled").unwrap();
    assert_eq!(doc.attribute(photo, BOUND_ATTR), None);
    assert_eq!(doc.attribute(labelled, BOUND_ATTR), Some("true"));
}

#[test]
fn blank_options_are_rejected() {
    setup();
    let mut doc = Document::from_markup(PAGE).unwrap();
    let err = try_init_media_lightbox(&mut doc, &LightboxOptions::new(" ", "lightbox", "lightbox-content"))
        .unwrap_err();
    assert!(matches!(err, LightboxError::Config(_)));
}

#[test]
fn custom_conventions_are_used() {
    setup();
    let markup = r##"
        <div id="lb" class="is-hidden" aria-hidden="true">
          <div id="lb-content"></div>
          <a class="close" href="#close">Close</a>
        </div>
        <img id="photo" src="a.png">"##;
    let mut doc = Document::from_markup(markup).unwrap();
    let conventions = MarkupConventions {
        hidden_class: "is-hidden".into(),
        scroll_lock_class: "no-scroll".into(),
        cursor_class: "zoomable".into(),
        aria_label: "Zoom".into(),
    };
    let options = LightboxOptions::new("#photo", "lb", "lb-content")
        .with_close_selector("a.close")
        .with_conventions(conventions);
    let lightbox = init_media_lightbox(&mut doc, &options).unwrap();
    let photo = doc.get_element_by_id("photo").unwrap();

    assert!(doc.has_class(photo, "zoomable"));
    assert_eq!(doc.attribute(photo, "aria-label"), Some("Zoom"));

    doc.click(photo);
    assert!(doc.has_class(doc.body(), "no-scroll"));
    assert_eq!(doc.active_element(), Some(lightbox.close_control()));

    doc.click(lightbox.close_control());
    assert!(!lightbox.is_open());
    assert!(doc.has_class(lightbox.overlay(), "is-hidden"));
    assert!(!doc.has_class(doc.body(), "no-scroll"));
}

//! Interactive element picker
//!
//! A [`PickerSession`] captures all pointer and key input while it is open. Pointer
//! moves update a highlight around the hovered element, a click resolves the session
//! with a selector for the clicked element, and Escape cancels it. Whatever ends the
//! session, including dropping it, releases the input capture exactly once.

use crate::dom::{BoundingBox, LiveDocument, NodeHandle};
use crate::input::{InputEvent, Key};
use crate::selector::{Selector, SelectorSynthesizer};

/// Class carried by every element of the picker's own overlay UI
pub const DEFAULT_OVERLAY_CLASS: &str = "element-picker-overlay";

/// Class put on the document body while picking is active
pub const DEFAULT_PICKING_MARKER_CLASS: &str = "element-picker-active";

/// Elements closer than this to the top of the viewport get their info box below them
const INFO_BOX_MIN_TOP: f64 = 120.0;
const INFO_BOX_ABOVE_OFFSET: f64 = 40.0;
const INFO_BOX_BELOW_OFFSET: f64 = 10.0;

/// Capabilities the host grants to a picker session
///
/// `acquire_capture` routes all pointer and key input to the session before any
/// application handler; `release_capture` undoes it.
pub trait PickerHost {
    fn acquire_capture(&mut self);

    fn release_capture(&mut self);

    /// Add or remove the "picking active" marker class on the body
    fn set_picking_marker(&mut self, class_name: &str, active: bool);

    fn render_highlight(&mut self, highlight: &Highlight);

    fn clear_highlight(&mut self);
}

/// Where the selector info box is drawn relative to the hovered element
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InfoAnchor {
    Above { y: f64 },
    Below { y: f64 },
}

/// Presentation of the hovered element
#[derive(Debug, Clone, PartialEq)]
pub struct Highlight {
    pub selector: Selector,
    pub tag_name: String,
    pub bounds: BoundingBox,
    /// "W × H"
    pub dimension_label: String,
    /// First class of the element, shown next to the tag name
    pub class_badge: Option<String>,
    pub info_anchor: InfoAnchor,
}

impl Highlight {
    fn new(selector: Selector, tag_name: &str, bounds: BoundingBox, first_class: Option<&str>) -> Self {
        let info_anchor = if bounds.top() > INFO_BOX_MIN_TOP {
            InfoAnchor::Above {
                y: bounds.top() - INFO_BOX_ABOVE_OFFSET,
            }
        } else {
            InfoAnchor::Below {
                y: bounds.bottom() + INFO_BOX_BELOW_OFFSET,
            }
        };

        Self {
            selector,
            tag_name: tag_name.to_string(),
            dimension_label: bounds.dimension_label(),
            bounds,
            class_badge: first_class.map(str::to_string),
            info_anchor,
        }
    }
}

/// How a picker session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerOutcome {
    Selected(Selector),
    Cancelled,
}

impl PickerOutcome {
    pub fn selector(&self) -> Option<&Selector> {
        match self {
            PickerOutcome::Selected(selector) => Some(selector),
            PickerOutcome::Cancelled => None,
        }
    }
}

/// Picker settings
#[derive(Debug, Clone)]
pub struct PickerOptions {
    pub overlay_class: String,
    pub picking_marker_class: String,
    pub synthesizer: SelectorSynthesizer,
}

impl Default for PickerOptions {
    fn default() -> Self {
        Self {
            overlay_class: DEFAULT_OVERLAY_CLASS.to_string(),
            picking_marker_class: DEFAULT_PICKING_MARKER_CLASS.to_string(),
            synthesizer: SelectorSynthesizer::default(),
        }
    }
}

/// One interactive pick
///
/// The session borrows its host mutably for its whole life, so a host can never run
/// two sessions at once.
pub struct PickerSession<'h, H: PickerHost> {
    host: &'h mut H,
    options: PickerOptions,
    hovered: Option<NodeHandle>,
    hovered_selector: Option<Selector>,
    outcome: Option<PickerOutcome>,
    released: bool,
}

impl<'h, H: PickerHost> PickerSession<'h, H> {
    /// Open a session: take the input capture and mark the body as picking
    pub fn start(host: &'h mut H, options: PickerOptions) -> Self {
        host.acquire_capture();
        host.set_picking_marker(&options.picking_marker_class, true);
        log::debug!("Element picker started");

        Self {
            host,
            options,
            hovered: None,
            hovered_selector: None,
            outcome: None,
            released: false,
        }
    }

    /// Feed one input event; returns the outcome when this event resolves the session
    ///
    /// Events arriving after the session resolved are ignored.
    pub fn handle<D: LiveDocument + ?Sized>(&mut self, doc: &D, event: &InputEvent) -> Option<PickerOutcome> {
        if self.outcome.is_some() {
            return None;
        }

        match event {
            InputEvent::PointerMove { target } => {
                if !self.is_own_overlay(doc, *target) {
                    self.hover(doc, *target);
                }
                None
            }
            InputEvent::Click { target } => {
                if self.is_own_overlay(doc, *target) {
                    return None;
                }
                match self.options.synthesizer.synthesize(doc, *target) {
                    Ok(selector) => self.finish(PickerOutcome::Selected(selector)),
                    Err(e) => {
                        log::warn!("Picker could not build a selector for the clicked element: {}", e);
                        None
                    }
                }
            }
            InputEvent::KeyDown { key: Key::Escape } => self.finish(PickerOutcome::Cancelled),
            InputEvent::KeyDown { .. } => None,
        }
    }

    /// Cancel from the overlay's own cancel control
    pub fn cancel(&mut self) -> Option<PickerOutcome> {
        if self.outcome.is_some() {
            return None;
        }
        self.finish(PickerOutcome::Cancelled)
    }

    pub fn is_resolved(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<&PickerOutcome> {
        self.outcome.as_ref()
    }

    /// Consume the session, returning its outcome (if any) and releasing the host
    pub fn into_outcome(mut self) -> Option<PickerOutcome> {
        self.outcome.take()
    }

    pub fn hovered(&self) -> Option<NodeHandle> {
        self.hovered
    }

    pub fn hovered_selector(&self) -> Option<&Selector> {
        self.hovered_selector.as_ref()
    }

    fn is_own_overlay<D: LiveDocument + ?Sized>(&self, doc: &D, target: NodeHandle) -> bool {
        doc.is_within_class(target, &self.options.overlay_class)
    }

    fn hover<D: LiveDocument + ?Sized>(&mut self, doc: &D, target: NodeHandle) {
        let selector = match self.options.synthesizer.synthesize(doc, target) {
            Ok(selector) => selector,
            Err(e) => {
                log::debug!("Ignoring hover over unknown element: {}", e);
                return;
            }
        };

        self.hovered = Some(target);
        self.hovered_selector = Some(selector.clone());

        // Collapsed elements (display: none, empty wrappers) have nothing to outline
        let bounds = doc.bounding_box_of(target).filter(BoundingBox::is_visible);
        match (doc.tag_name(target), bounds) {
            (Some(tag_name), Some(bounds)) => {
                let classes = doc.class_list(target);
                let highlight = Highlight::new(selector, tag_name, bounds, classes.first().copied());
                self.host.render_highlight(&highlight);
            }
            _ => self.host.clear_highlight(),
        }
    }

    fn finish(&mut self, outcome: PickerOutcome) -> Option<PickerOutcome> {
        log::debug!("Element picker resolved: {:?}", outcome);
        self.outcome = Some(outcome.clone());
        self.release();
        Some(outcome)
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.host.clear_highlight();
        self.host
            .set_picking_marker(&self.options.picking_marker_class, false);
        self.host.release_capture();
    }
}

impl<H: PickerHost> Drop for PickerSession<'_, H> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{DomTree, ElementNode};

    #[derive(Default)]
    struct RecordingHost {
        captured: bool,
        acquisitions: usize,
        releases: usize,
        marker_active: bool,
        highlights: Vec<Highlight>,
        cleared: usize,
    }

    impl PickerHost for RecordingHost {
        fn acquire_capture(&mut self) {
            self.captured = true;
            self.acquisitions += 1;
        }

        fn release_capture(&mut self) {
            self.captured = false;
            self.releases += 1;
        }

        fn set_picking_marker(&mut self, class_name: &str, active: bool) {
            assert_eq!(class_name, DEFAULT_PICKING_MARKER_CLASS);
            self.marker_active = active;
        }

        fn render_highlight(&mut self, highlight: &Highlight) {
            self.highlights.push(highlight.clone());
        }

        fn clear_highlight(&mut self) {
            self.cleared += 1;
        }
    }

    fn page() -> DomTree {
        DomTree::new(
            ElementNode::new("body")
                .with_child(
                    ElementNode::new("button")
                        .with_id("save")
                        .with_classes(&["btn", "primary"])
                        .with_bounding_box(10.0, 200.0, 120.0, 40.0),
                )
                .with_child(
                    ElementNode::new("input")
                        .with_attribute("data-guide-step", "quantity-input")
                        .with_bounding_box(10.0, 20.0, 80.0, 24.0),
                )
                .with_child(
                    ElementNode::new("span")
                        .with_id("collapsed")
                        .with_bounding_box(10.0, 80.0, 0.0, 0.0),
                )
                .with_child(
                    ElementNode::new("div")
                        .with_classes(&[DEFAULT_OVERLAY_CLASS])
                        .with_child(ElementNode::new("button").with_id("picker-cancel")),
                ),
        )
    }

    #[test]
    fn test_start_acquires_capture() {
        let mut host = RecordingHost::default();
        {
            let session = PickerSession::start(&mut host, PickerOptions::default());
            assert!(!session.is_resolved());
        }
        assert_eq!(host.acquisitions, 1);
        assert_eq!(host.releases, 1);
    }

    #[test]
    fn test_hover_renders_highlight() {
        let doc = page();
        let save = doc.query_first("#save").unwrap().unwrap();
        let input = doc.query_first("input").unwrap().unwrap();
        let mut host = RecordingHost::default();

        let mut session = PickerSession::start(&mut host, PickerOptions::default());
        assert_eq!(session.handle(&doc, &InputEvent::pointer_move(save)), None);
        assert_eq!(session.hovered(), Some(save));
        assert_eq!(session.hovered_selector().unwrap().as_str(), "#save");
        assert_eq!(session.handle(&doc, &InputEvent::pointer_move(input)), None);
        drop(session);

        assert_eq!(host.highlights.len(), 2);
        let first = &host.highlights[0];
        assert_eq!(first.tag_name, "button");
        assert_eq!(first.dimension_label, "120 × 40");
        assert_eq!(first.class_badge.as_deref(), Some("btn"));
        assert_eq!(first.info_anchor, InfoAnchor::Above { y: 160.0 });
        assert_eq!(host.highlights[1].info_anchor, InfoAnchor::Below { y: 54.0 });
    }

    #[test]
    fn test_collapsed_element_is_pickable_without_highlight() {
        let doc = page();
        let collapsed = doc.query_first("#collapsed").unwrap().unwrap();
        let mut host = RecordingHost::default();

        let mut session = PickerSession::start(&mut host, PickerOptions::default());
        session.handle(&doc, &InputEvent::pointer_move(collapsed));
        assert_eq!(session.hovered_selector().unwrap().as_str(), "#collapsed");
        let outcome = session.handle(&doc, &InputEvent::click(collapsed));
        drop(session);

        assert_eq!(outcome, Some(PickerOutcome::Selected(Selector::new("#collapsed"))));
        assert!(host.highlights.is_empty());
        assert!(host.cleared >= 2);
    }

    #[test]
    fn test_click_resolves_with_selector() {
        let doc = page();
        let input = doc.query_first("input").unwrap().unwrap();
        let mut host = RecordingHost::default();

        let mut session = PickerSession::start(&mut host, PickerOptions::default());
        let outcome = session.handle(&doc, &InputEvent::click(input));
        assert_eq!(
            outcome,
            Some(PickerOutcome::Selected(Selector::new("[data-guide-step=\"quantity-input\"]")))
        );
        assert!(session.is_resolved());
        drop(session);

        assert!(!host.captured);
        assert!(!host.marker_active);
        assert_eq!(host.releases, 1);
    }

    #[test]
    fn test_overlay_events_are_ignored() {
        let doc = page();
        let cancel_button = doc.query_first("#picker-cancel").unwrap().unwrap();
        let mut host = RecordingHost::default();

        let mut session = PickerSession::start(&mut host, PickerOptions::default());
        assert_eq!(session.handle(&doc, &InputEvent::pointer_move(cancel_button)), None);
        assert_eq!(session.handle(&doc, &InputEvent::click(cancel_button)), None);
        assert!(!session.is_resolved());
        assert_eq!(session.hovered(), None);
        drop(session);

        assert!(host.highlights.is_empty());
    }

    #[test]
    fn test_escape_cancels() {
        let doc = page();
        let mut host = RecordingHost::default();

        let mut session = PickerSession::start(&mut host, PickerOptions::default());
        assert_eq!(session.handle(&doc, &InputEvent::key("a")), None);
        assert_eq!(
            session.handle(&doc, &InputEvent::key("Escape")),
            Some(PickerOutcome::Cancelled)
        );
        assert!(session.is_resolved());
        drop(session);

        assert!(!host.captured);
        assert_eq!(host.releases, 1);
    }

    #[test]
    fn test_resolves_exactly_once() {
        let doc = page();
        let save = doc.query_first("#save").unwrap().unwrap();
        let input = doc.query_first("input").unwrap().unwrap();
        let mut host = RecordingHost::default();

        let mut session = PickerSession::start(&mut host, PickerOptions::default());
        assert!(session.handle(&doc, &InputEvent::click(save)).is_some());
        assert_eq!(session.handle(&doc, &InputEvent::pointer_move(input)), None);
        assert_eq!(session.handle(&doc, &InputEvent::click(input)), None);
        assert_eq!(session.handle(&doc, &InputEvent::key("Escape")), None);
        assert_eq!(session.cancel(), None);
        assert_eq!(
            session.outcome().and_then(PickerOutcome::selector).map(Selector::as_str),
            Some("#save")
        );
        drop(session);

        assert!(host.highlights.is_empty());
        assert_eq!(host.releases, 1);
        assert_eq!(host.acquisitions, 1);
    }

    #[test]
    fn test_explicit_cancel_and_into_outcome() {
        let mut host = RecordingHost::default();

        let mut session = PickerSession::start(&mut host, PickerOptions::default());
        assert_eq!(session.cancel(), Some(PickerOutcome::Cancelled));
        assert_eq!(session.into_outcome(), Some(PickerOutcome::Cancelled));

        assert_eq!(host.releases, 1);
    }

    #[test]
    fn test_drop_while_pending_releases() {
        let doc = page();
        let save = doc.query_first("#save").unwrap().unwrap();
        let mut host = RecordingHost::default();

        let mut session = PickerSession::start(&mut host, PickerOptions::default());
        session.handle(&doc, &InputEvent::pointer_move(save));
        drop(session);

        assert!(!host.captured);
        assert!(!host.marker_active);
        assert_eq!(host.releases, 1);
        assert!(host.cleared >= 1);
    }

    #[test]
    fn test_unknown_click_target_keeps_session_open() {
        let doc = page();
        let mut host = RecordingHost::default();

        let mut session = PickerSession::start(&mut host, PickerOptions::default());
        assert_eq!(session.handle(&doc, &InputEvent::click(NodeHandle::from_raw(999))), None);
        assert!(!session.is_resolved());
    }
}

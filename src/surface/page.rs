//! In-memory page of display elements.
//!
//! A [`Page`] is the headless stand-in for the document hosting the widgets:
//! elements carry attributes, classes, a text buffer, and a scroll offset.
//! Widgets and status surfaces are just elements with the right attributes,
//! so they can be inserted or removed at any time and the next dispatch sees
//! the change.

// ============================================================================
// Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::identifiers::ElementId;

use super::SEND_ATTR;
use super::status::STATUS_ATTR;
use super::widget::WidgetBinding;
use super::{Document, WidgetDescriptor};

// ============================================================================
// Types
// ============================================================================

/// A page shared between the monitor task and its readers.
pub type SharedPage = Arc<Mutex<Page>>;

// ============================================================================
// Element
// ============================================================================

/// A display element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    attributes: FxHashMap<String, String>,
    classes: Vec<String>,
    text: String,
    scroll_top: usize,
}

impl Element {
    /// Creates an empty element.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an element flagged as a status surface.
    #[must_use]
    pub fn status() -> Self {
        Self::new().with_attr(STATUS_ATTR, "")
    }

    /// Creates a send button carrying a JSON payload.
    #[must_use]
    pub fn send_button(payload: impl Into<String>) -> Self {
        Self::new().with_attr(SEND_ATTR, payload)
    }

    /// Sets an attribute.
    #[inline]
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Adds a class.
    #[inline]
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.add_class(class);
        self
    }

    /// Sets the initial text.
    #[inline]
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    // ------------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------------

    /// Returns an attribute value.
    #[inline]
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Returns `true` if the attribute is present (even if empty).
    #[inline]
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Sets an attribute.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Removes an attribute.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    // ------------------------------------------------------------------------
    // Classes
    // ------------------------------------------------------------------------

    /// Returns `true` if the element has the class.
    #[inline]
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Adds a class if not already present.
    pub fn add_class(&mut self, class: impl Into<String>) {
        let class = class.into();
        if !self.has_class(&class) {
            self.classes.push(class);
        }
    }

    /// Removes a class.
    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Returns the classes in insertion order.
    #[inline]
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    // ------------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------------

    /// Returns the text buffer.
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Mutable access to the text buffer.
    #[inline]
    pub fn text_mut(&mut self) -> &mut String {
        &mut self.text
    }

    /// Replaces the text buffer.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Height of the content in lines.
    #[must_use]
    pub fn scroll_height(&self) -> usize {
        if self.text.is_empty() {
            0
        } else {
            self.text.lines().count()
        }
    }

    /// Current scroll offset in lines.
    #[inline]
    #[must_use]
    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    /// Sets the scroll offset, clamped to the content height.
    pub fn set_scroll_top(&mut self, line: usize) {
        self.scroll_top = line.min(self.scroll_height());
    }

    /// Scrolls to the bottom of the content.
    pub fn scroll_to_bottom(&mut self) {
        self.scroll_top = self.scroll_height();
    }

    /// Returns `true` if the view is at the bottom of the content.
    #[inline]
    #[must_use]
    pub fn is_scrolled_to_bottom(&self) -> bool {
        self.scroll_top == self.scroll_height()
    }
}

// ============================================================================
// Page
// ============================================================================

/// An ordered collection of elements.
#[derive(Debug, Default)]
pub struct Page {
    elements: BTreeMap<ElementId, Element>,
    next_id: u64,
}

impl Page {
    /// Creates an empty page.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty page ready to be shared with a monitor.
    #[inline]
    #[must_use]
    pub fn shared() -> SharedPage {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Appends an element and returns its id.
    pub fn insert(&mut self, element: Element) -> ElementId {
        let id = ElementId::new(self.next_id);
        self.next_id += 1;
        self.elements.insert(id, element);
        id
    }

    /// Appends a widget element built from a binding.
    pub fn insert_widget(&mut self, binding: &WidgetBinding) -> ElementId {
        self.insert(binding.to_element())
    }

    /// Removes an element.
    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        self.elements.remove(&id)
    }

    /// Returns an element.
    #[inline]
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// Returns an element mutably.
    #[inline]
    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    /// Returns the text of an element, if present.
    #[must_use]
    pub fn text_of(&self, id: ElementId) -> Option<&str> {
        self.get(id).map(Element::text)
    }

    /// Returns ids of elements matching a predicate, in document order.
    pub fn query(&self, predicate: impl Fn(&Element) -> bool) -> Vec<ElementId> {
        self.elements
            .iter()
            .filter(|(_, el)| predicate(el))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the page holds no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

// ============================================================================
// Document Implementations
// ============================================================================

impl Document for Page {
    fn widgets(&self) -> Vec<WidgetDescriptor> {
        self.elements
            .iter()
            .filter_map(|(id, el)| {
                WidgetBinding::from_element(el).map(|binding| WidgetDescriptor { id: *id, binding })
            })
            .collect()
    }

    fn status_surfaces(&self) -> Vec<ElementId> {
        self.query(|el| el.has_attr(STATUS_ATTR))
    }

    fn with_element(&mut self, id: ElementId, update: &mut dyn FnMut(&mut Element)) -> bool {
        match self.elements.get_mut(&id) {
            Some(element) => {
                update(element);
                true
            }
            None => false,
        }
    }
}

impl Document for SharedPage {
    fn widgets(&self) -> Vec<WidgetDescriptor> {
        self.lock().widgets()
    }

    fn status_surfaces(&self) -> Vec<ElementId> {
        self.lock().status_surfaces()
    }

    fn with_element(&mut self, id: ElementId, update: &mut dyn FnMut(&mut Element)) -> bool {
        self.lock().with_element(id, update)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RenderMode;

    #[test]
    fn test_insert_assigns_increasing_ids() {
        let mut page = Page::new();
        let a = page.insert(Element::new());
        let b = page.insert(Element::new());
        assert!(a < b);
        assert_eq!(page.len(), 2);
    }

    #[test]
    fn test_removed_ids_are_not_reused() {
        let mut page = Page::new();
        let a = page.insert(Element::new());
        page.remove(a);
        let b = page.insert(Element::new());
        assert_ne!(a, b);
        assert!(page.get(a).is_none());
    }

    #[test]
    fn test_classes_deduplicate() {
        let mut el = Element::new().with_class("x").with_class("x");
        assert_eq!(el.classes(), ["x".to_string()]);
        el.remove_class("x");
        assert!(!el.has_class("x"));
    }

    #[test]
    fn test_scroll_to_bottom_tracks_lines() {
        let mut el = Element::new().with_text("a\nb\nc");
        assert_eq!(el.scroll_top(), 0);
        el.scroll_to_bottom();
        assert_eq!(el.scroll_top(), 3);
        assert!(el.is_scrolled_to_bottom());
        el.set_scroll_top(10);
        assert_eq!(el.scroll_top(), 3);
    }

    #[test]
    fn test_document_lists_widgets_and_status() {
        let mut page = Page::new();
        page.insert(Element::new().with_text("plain"));
        let widget = page.insert_widget(&WidgetBinding::new("log", "").mode(RenderMode::Replace));
        let status = page.insert(Element::status());

        let widgets = page.widgets();
        assert_eq!(widgets.len(), 1);
        assert_eq!(widgets[0].id, widget);
        assert_eq!(widgets[0].binding.mode, RenderMode::Replace);
        assert_eq!(page.status_surfaces(), vec![status]);
    }

    #[test]
    fn test_with_element_on_removed_is_noop() {
        let mut page = Page::new();
        let id = page.insert(Element::new());
        page.remove(id);
        let mut called = false;
        assert!(!page.with_element(id, &mut |_| called = true));
        assert!(!called);
    }

    #[test]
    fn test_shared_page_document() {
        let mut shared = Page::shared();
        let id = shared.lock().insert(Element::status());
        assert_eq!(shared.status_surfaces(), vec![id]);
        assert!(shared.with_element(id, &mut |el| el.set_text("ONLINE")));
        assert_eq!(shared.lock().text_of(id), Some("ONLINE"));
    }
}

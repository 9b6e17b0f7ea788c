//! The host surface the inputs attach to.
//!
//! [`Document`] and [`Element`] model just enough of a browser DOM for the
//! interaction layer: element lookup by id, element- and document-scope
//! listeners, bubbling from an element to its document, attributes and the
//! style offset of absolutely positioned elements. A browser host forwards
//! its native events through [`Element::dispatch`] and [`Document::dispatch`]
//! and mirrors attribute writes back to the page.
use std::{
  cell::{Cell, RefCell},
  collections::HashMap,
  rc::{Rc, Weak},
};

use tracing::trace;

use crate::{
  error::{Error, Result},
  event::{DomEvent, EventKind},
  geometry::{ClientRect, Point},
  subject::Subscribers,
};

type Listener = Rc<dyn Fn(&DomEvent)>;

/// Identifies a registered listener for removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListenerId {
  kind: EventKind,
  id: usize,
}

#[derive(Default)]
struct Listeners {
  by_kind: HashMap<EventKind, Subscribers<Listener>>,
}

impl Listeners {
  fn add(&mut self, kind: EventKind, listener: Listener) -> ListenerId {
    let id = self.by_kind.entry(kind).or_default().add(listener);
    ListenerId { kind, id }
  }

  fn remove(&mut self, listener: ListenerId) -> bool {
    self
      .by_kind
      .get_mut(&listener.kind)
      .and_then(|subs| subs.remove(listener.id))
      .is_some()
  }

  fn count(&self, kind: EventKind) -> usize { self.by_kind.get(&kind).map_or(0, Subscribers::len) }
}

/// Call every listener registered for the event's kind. Listeners added
/// during the dispatch wait for the next event; listeners removed before
/// their turn are skipped.
fn dispatch_to(listeners: &RefCell<Listeners>, event: &DomEvent) {
  let kind = event.kind();
  let snapshot = match listeners.borrow().by_kind.get(&kind) {
    Some(subs) => subs.snapshot(),
    None => return,
  };
  for (id, listener) in snapshot {
    let registered =
      listeners.borrow().by_kind.get(&kind).is_some_and(|subs| subs.contains(id));
    if registered {
      listener(event);
    }
  }
}

struct DocumentInner {
  elements: RefCell<HashMap<String, Element>>,
  listeners: RefCell<Listeners>,
}

#[derive(Clone)]
pub struct Document(Rc<DocumentInner>);

impl Default for Document {
  fn default() -> Self { Self::new() }
}

impl Document {
  pub fn new() -> Self {
    Document(Rc::new(DocumentInner {
      elements: RefCell::new(HashMap::new()),
      listeners: RefCell::new(Listeners::default()),
    }))
  }

  /// Create an element and attach it to this document. An element already
  /// registered under `id` is detached and replaced.
  pub fn create_element(&self, id: impl Into<String>) -> Element {
    let id = id.into();
    let element = Element(Rc::new(ElementInner {
      id: id.clone(),
      document: Rc::downgrade(&self.0),
      connected: Cell::new(true),
      listeners: RefCell::new(Listeners::default()),
      attributes: RefCell::new(HashMap::new()),
      offset: Cell::new(Point::ZERO),
      client_rect: Cell::new(None),
    }));
    if let Some(previous) = self.0.elements.borrow_mut().insert(id, element.clone()) {
      previous.0.connected.set(false);
    }
    element
  }

  /// Look an element up by id.
  pub fn element(&self, id: &str) -> Result<Element> {
    self
      .0
      .elements
      .borrow()
      .get(id)
      .cloned()
      .ok_or_else(|| Error::ElementNotFound { id: id.to_owned() })
  }

  /// Detach an element. Its listeners stay registered but events dispatched
  /// on it no longer bubble to the document.
  pub fn remove_element(&self, id: &str) -> Option<Element> {
    let removed = self.0.elements.borrow_mut().remove(id);
    if let Some(element) = &removed {
      element.0.connected.set(false);
    }
    removed
  }

  pub fn add_event_listener(&self, kind: EventKind, listener: impl Fn(&DomEvent) + 'static) -> ListenerId {
    self.0.listeners.borrow_mut().add(kind, Rc::new(listener))
  }

  /// Returns `false` when the listener was not registered.
  pub fn remove_event_listener(&self, listener: ListenerId) -> bool {
    self.0.listeners.borrow_mut().remove(listener)
  }

  pub fn listener_count(&self, kind: EventKind) -> usize { self.0.listeners.borrow().count(kind) }

  /// Deliver an event that happened outside any tracked element.
  pub fn dispatch(&self, event: &DomEvent) {
    trace!(kind = event.kind().as_str(), "document event");
    dispatch_to(&self.0.listeners, event);
  }
}

struct ElementInner {
  id: String,
  document: Weak<DocumentInner>,
  connected: Cell<bool>,
  listeners: RefCell<Listeners>,
  attributes: RefCell<HashMap<String, String>>,
  offset: Cell<Point>,
  client_rect: Cell<Option<ClientRect>>,
}

#[derive(Clone)]
pub struct Element(Rc<ElementInner>);

impl Element {
  pub fn id(&self) -> &str { &self.0.id }

  /// True while the element belongs to a live document.
  pub fn is_connected(&self) -> bool {
    self.0.connected.get() && self.0.document.strong_count() > 0
  }

  /// The owning document; fails once the element is detached.
  pub fn document(&self) -> Result<Document> {
    match self.0.document.upgrade() {
      Some(doc) if self.0.connected.get() => Ok(Document(doc)),
      _ => Err(Error::Detached { id: self.0.id.clone() }),
    }
  }

  pub fn add_event_listener(&self, kind: EventKind, listener: impl Fn(&DomEvent) + 'static) -> ListenerId {
    self.0.listeners.borrow_mut().add(kind, Rc::new(listener))
  }

  pub fn remove_event_listener(&self, listener: ListenerId) -> bool {
    self.0.listeners.borrow_mut().remove(listener)
  }

  pub fn listener_count(&self, kind: EventKind) -> usize { self.0.listeners.borrow().count(kind) }

  /// Deliver an event targeted at this element, then bubble it to the
  /// document.
  pub fn dispatch(&self, event: &DomEvent) {
    trace!(element = %self.0.id, kind = event.kind().as_str(), "element event");
    dispatch_to(&self.0.listeners, event);
    if let Ok(document) = self.document() {
      dispatch_to(&document.0.listeners, event);
    }
  }

  pub fn set_attribute(&self, name: &str, value: impl Into<String>) {
    self.0.attributes.borrow_mut().insert(name.to_owned(), value.into());
  }

  pub fn attribute(&self, name: &str) -> Option<String> { self.0.attributes.borrow().get(name).cloned() }

  /// The `left`/`top` style offset of an absolutely positioned element.
  pub fn offset(&self) -> Point { self.0.offset.get() }

  pub fn set_offset(&self, offset: Point) { self.0.offset.set(offset) }

  /// The layout box last reported by the host, if any.
  pub fn client_rect(&self) -> Option<ClientRect> { self.0.client_rect.get() }

  /// Hosts call this on layout and resize.
  pub fn set_client_rect(&self, rect: ClientRect) { self.0.client_rect.set(Some(rect)) }
}

impl PartialEq for Element {
  fn eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.0, &other.0) }
}

impl std::fmt::Debug for Element {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Element")
      .field("id", &self.0.id)
      .field("connected", &self.is_connected())
      .finish()
  }
}

/// Anything native listeners can be attached to.
pub trait EventTarget: Clone {
  fn add_event_listener(&self, kind: EventKind, listener: impl Fn(&DomEvent) + 'static) -> ListenerId;
  fn remove_event_listener(&self, listener: ListenerId) -> bool;
}

impl EventTarget for Document {
  fn add_event_listener(&self, kind: EventKind, listener: impl Fn(&DomEvent) + 'static) -> ListenerId {
    Document::add_event_listener(self, kind, listener)
  }

  fn remove_event_listener(&self, listener: ListenerId) -> bool {
    Document::remove_event_listener(self, listener)
  }
}

impl EventTarget for Element {
  fn add_event_listener(&self, kind: EventKind, listener: impl Fn(&DomEvent) + 'static) -> ListenerId {
    Element::add_event_listener(self, kind, listener)
  }

  fn remove_event_listener(&self, listener: ListenerId) -> bool {
    Element::remove_event_listener(self, listener)
  }
}

/// The listeners one owner attached to one target, detached together.
pub struct ListenerSet<T: EventTarget> {
  target: RefCell<Option<T>>,
  ids: RefCell<Vec<ListenerId>>,
}

impl<T: EventTarget> Default for ListenerSet<T> {
  fn default() -> Self { Self { target: RefCell::new(None), ids: RefCell::new(Vec::new()) } }
}

impl<T: EventTarget> ListenerSet<T> {
  pub fn attach(&self, target: &T, kind: EventKind, listener: impl Fn(&DomEvent) + 'static) {
    let id = target.add_event_listener(kind, listener);
    self.ids.borrow_mut().push(id);
    *self.target.borrow_mut() = Some(target.clone());
  }

  /// Remove every listener attached through this set. No-op when empty.
  pub fn detach_all(&self) {
    let ids = std::mem::take(&mut *self.ids.borrow_mut());
    if let Some(target) = self.target.borrow_mut().take() {
      for id in ids {
        target.remove_event_listener(id);
      }
    }
  }

  pub fn is_attached(&self) -> bool { !self.ids.borrow().is_empty() }
}

use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use super::{ClientSubscription, Clients, Handlers, Input, Phase};
use crate::{
  dom::{Document, Element, ListenerSet},
  error::Result,
  event::{DomEvent, EventKind, Pointer, TouchEvent},
};

/// Reports touch drags made with an exact number of fingers.
///
/// A `touchstart` on the element with exactly `fingers` active touches
/// starts tracking at document scope. Every callback receives the whole
/// active touch list; `up` receives the touches still on the surface.
pub struct TouchDragInput {
  inner: Rc<TouchState>,
}

struct TouchState {
  element: Element,
  fingers: usize,
  clients: Clients<[Pointer]>,
  element_listeners: ListenerSet<Element>,
  tracking: ListenerSet<Document>,
}

fn pointers(event: &TouchEvent) -> Vec<Pointer> { event.touches.iter().map(Pointer::from).collect() }

impl TouchDragInput {
  /// Fails when `element` is not attached to a document.
  pub fn new(element: &Element, fingers: usize) -> Result<Self> {
    element.document()?;
    let input = TouchDragInput {
      inner: Rc::new(TouchState {
        element: element.clone(),
        fingers,
        clients: Clients::default(),
        element_listeners: ListenerSet::default(),
        tracking: ListenerSet::default(),
      }),
    };
    input.enable();
    Ok(input)
  }

  pub fn fingers(&self) -> usize { self.inner.fingers }

  pub fn is_dragging(&self) -> bool { self.inner.tracking.is_attached() }
}

impl TouchState {
  fn on_touch_start(self: &Rc<Self>, event: &TouchEvent) {
    if event.touches.len() != self.fingers {
      return;
    }
    let document = match self.element.document() {
      Ok(document) => document,
      Err(err) => {
        warn!(%err, "touch drag ignored");
        return;
      }
    };
    self.tracking.detach_all();
    let weak = Rc::downgrade(self);
    self.tracking.attach(&document, EventKind::TouchMove, move |e| {
      with_touch(&weak, e, TouchState::on_touch_move)
    });
    let weak = Rc::downgrade(self);
    self.tracking.attach(&document, EventKind::TouchEnd, move |e| {
      with_touch(&weak, e, TouchState::on_touch_end)
    });
    debug!(element = self.element.id(), fingers = self.fingers, "touch drag started");
    self.clients.emit(Phase::Down, &pointers(event));
  }

  fn on_touch_move(self: &Rc<Self>, event: &TouchEvent) {
    self.clients.emit(Phase::Move, &pointers(event));
  }

  fn on_touch_end(self: &Rc<Self>, event: &TouchEvent) {
    self.tracking.detach_all();
    debug!(element = self.element.id(), "touch drag ended");
    self.clients.emit(Phase::Up, &pointers(event));
  }
}

fn with_touch(state: &Weak<TouchState>, event: &DomEvent, f: fn(&Rc<TouchState>, &TouchEvent)) {
  if let (Some(state), Some(event)) = (state.upgrade(), event.as_touch()) {
    f(&state, event);
  }
}

impl Input for TouchDragInput {
  type Event = [Pointer];

  fn subscribe(&self, handlers: Handlers<[Pointer]>) -> ClientSubscription<[Pointer]> {
    self.inner.clients.subscribe(handlers)
  }

  fn enable(&self) {
    self.disable();
    let weak = Rc::downgrade(&self.inner);
    self.inner.element_listeners.attach(&self.inner.element, EventKind::TouchStart, move |e| {
      with_touch(&weak, e, TouchState::on_touch_start)
    });
  }

  fn disable(&self) {
    self.inner.element_listeners.detach_all();
    self.inner.tracking.detach_all();
  }

  fn is_enabled(&self) -> bool { self.inner.element_listeners.is_attached() }
}

impl Drop for TouchDragInput {
  fn drop(&mut self) { self.disable() }
}

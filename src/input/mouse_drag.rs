use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use super::{ClientSubscription, Clients, Handlers, Input, Phase};
use crate::{
  dom::{Document, Element, ListenerSet},
  error::Result,
  event::{DomEvent, EventKind, MouseButton, MouseEvent, Pointer},
};

/// Reports mouse drags that start on an element.
///
/// Once the configured button goes down on the element, move and up are
/// tracked at document scope so the drag continues outside the element.
/// Clients receive one-pointer slices: `down`, then `move` repeatedly, then
/// `up` once.
pub struct MouseDragInput {
  inner: Rc<DragState>,
}

struct DragState {
  element: Element,
  button: MouseButton,
  clients: Clients<[Pointer]>,
  element_listeners: ListenerSet<Element>,
  tracking: ListenerSet<Document>,
}

impl MouseDragInput {
  /// Fails when `element` is not attached to a document.
  pub fn new(element: &Element, button: MouseButton) -> Result<Self> {
    element.document()?;
    let input = MouseDragInput {
      inner: Rc::new(DragState {
        element: element.clone(),
        button,
        clients: Clients::default(),
        element_listeners: ListenerSet::default(),
        tracking: ListenerSet::default(),
      }),
    };
    input.enable();
    Ok(input)
  }

  /// True between a `down` and its `up`.
  pub fn is_dragging(&self) -> bool { self.inner.tracking.is_attached() }
}

impl DragState {
  fn on_mouse_down(self: &Rc<Self>, event: &MouseEvent) {
    if event.button != self.button {
      return;
    }
    let document = match self.element.document() {
      Ok(document) => document,
      Err(err) => {
        warn!(%err, "drag ignored");
        return;
      }
    };
    // A missed mouseup (released outside the window) leaves tracking
    // attached; never stack a second set.
    self.tracking.detach_all();
    let weak = Rc::downgrade(self);
    self.tracking.attach(&document, EventKind::MouseMove, move |e| {
      with_mouse(&weak, e, DragState::on_mouse_move)
    });
    let weak = Rc::downgrade(self);
    self.tracking.attach(&document, EventKind::MouseUp, move |e| {
      with_mouse(&weak, e, DragState::on_mouse_up)
    });
    debug!(element = self.element.id(), "mouse drag started");
    self.clients.emit(Phase::Down, &[Pointer::from(event)]);
  }

  fn on_mouse_move(self: &Rc<Self>, event: &MouseEvent) {
    self.clients.emit(Phase::Move, &[Pointer::from(event)]);
  }

  fn on_mouse_up(self: &Rc<Self>, event: &MouseEvent) {
    self.tracking.detach_all();
    debug!(element = self.element.id(), "mouse drag ended");
    self.clients.emit(Phase::Up, &[Pointer::from(event)]);
  }
}

fn with_mouse(state: &Weak<DragState>, event: &DomEvent, f: fn(&Rc<DragState>, &MouseEvent)) {
  if let (Some(state), Some(event)) = (state.upgrade(), event.as_mouse()) {
    f(&state, event);
  }
}

impl Input for MouseDragInput {
  type Event = [Pointer];

  fn subscribe(&self, handlers: Handlers<[Pointer]>) -> ClientSubscription<[Pointer]> {
    self.inner.clients.subscribe(handlers)
  }

  fn enable(&self) {
    self.disable();
    let weak = Rc::downgrade(&self.inner);
    self.inner.element_listeners.attach(&self.inner.element, EventKind::MouseDown, move |e| {
      with_mouse(&weak, e, DragState::on_mouse_down)
    });
  }

  fn disable(&self) {
    self.inner.element_listeners.detach_all();
    self.inner.tracking.detach_all();
  }

  fn is_enabled(&self) -> bool { self.inner.element_listeners.is_attached() }
}

impl Drop for MouseDragInput {
  fn drop(&mut self) { self.disable() }
}

use std::rc::Rc;

use tracing::{debug, trace};

use super::{ClientSubscription, Clients, Handlers, Input, Phase};
use crate::{
  dom::{Element, ListenerSet},
  error::Result,
  event::{EventKind, WheelEvent},
};

/// Reports every wheel event on an element as a `delta`.
pub struct MouseWheelInput {
  inner: Rc<WheelState>,
}

struct WheelState {
  element: Element,
  clients: Clients<WheelEvent>,
  listeners: ListenerSet<Element>,
}

impl MouseWheelInput {
  /// Fails when `element` is not attached to a document.
  pub fn new(element: &Element) -> Result<Self> {
    element.document()?;
    let input = MouseWheelInput {
      inner: Rc::new(WheelState {
        element: element.clone(),
        clients: Clients::default(),
        listeners: ListenerSet::default(),
      }),
    };
    input.enable();
    Ok(input)
  }
}

impl Input for MouseWheelInput {
  type Event = WheelEvent;

  fn subscribe(&self, handlers: Handlers<WheelEvent>) -> ClientSubscription<WheelEvent> {
    self.inner.clients.subscribe(handlers)
  }

  fn enable(&self) {
    self.disable();
    let weak = Rc::downgrade(&self.inner);
    self.inner.listeners.attach(&self.inner.element, EventKind::Wheel, move |e| {
      let (Some(state), Some(event)) = (weak.upgrade(), e.as_wheel()) else { return };
      trace!(delta_y = event.delta_y, "wheel");
      state.clients.emit(Phase::Delta, event);
    });
    debug!(element = self.inner.element.id(), "wheel input enabled");
  }

  fn disable(&self) {
    if self.inner.listeners.is_attached() {
      self.inner.listeners.detach_all();
      debug!(element = self.inner.element.id(), "wheel input disabled");
    }
  }

  fn is_enabled(&self) -> bool { self.inner.listeners.is_attached() }
}

impl Drop for MouseWheelInput {
  fn drop(&mut self) { self.disable() }
}

use std::rc::Rc;

use tracing::debug;

use super::{ClientSubscription, Clients, Handlers, Input, Phase};
use crate::{
  dom::{Element, ListenerSet},
  error::Result,
  event::{DomEvent, EventKind, MouseButton, MouseEvent},
};

/// Reports `down`, `up` and `click` of one mouse button on an element.
pub struct MouseClickInput {
  inner: Rc<ClickState>,
}

struct ClickState {
  element: Element,
  button: MouseButton,
  clients: Clients<MouseEvent>,
  listeners: ListenerSet<Element>,
}

impl MouseClickInput {
  /// Fails when `element` is not attached to a document.
  pub fn new(element: &Element, button: MouseButton) -> Result<Self> {
    element.document()?;
    let input = MouseClickInput {
      inner: Rc::new(ClickState {
        element: element.clone(),
        button,
        clients: Clients::default(),
        listeners: ListenerSet::default(),
      }),
    };
    input.enable();
    Ok(input)
  }

  pub fn button(&self) -> MouseButton { self.inner.button }
}

impl Input for MouseClickInput {
  type Event = MouseEvent;

  fn subscribe(&self, handlers: Handlers<MouseEvent>) -> ClientSubscription<MouseEvent> {
    self.inner.clients.subscribe(handlers)
  }

  fn enable(&self) {
    self.disable();
    for (kind, phase) in
      [(EventKind::MouseDown, Phase::Down), (EventKind::MouseUp, Phase::Up), (EventKind::Click, Phase::Click)]
    {
      let weak = Rc::downgrade(&self.inner);
      self.inner.listeners.attach(&self.inner.element, kind, move |e: &DomEvent| {
        let (Some(state), Some(event)) = (weak.upgrade(), e.as_mouse()) else { return };
        if event.button == state.button {
          state.clients.emit(phase, event);
        }
      });
    }
    debug!(element = self.inner.element.id(), "click input enabled");
  }

  fn disable(&self) {
    if self.inner.listeners.is_attached() {
      self.inner.listeners.detach_all();
      debug!(element = self.inner.element.id(), "click input disabled");
    }
  }

  fn is_enabled(&self) -> bool { self.inner.listeners.is_attached() }
}

impl Drop for MouseClickInput {
  fn drop(&mut self) { self.disable() }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;
  use crate::dom::Document;

  #[choropleth_controls_macro::test]
  fn filters_by_button() {
    let doc = Document::new();
    let marker = doc.create_element("marker");
    let input = MouseClickInput::new(&marker, MouseButton::Right).unwrap();
    let log = Rc::new(RefCell::new(Vec::new()));
    let (c, d) = (log.clone(), log.clone());
    let _sub = input.subscribe(
      Handlers::new()
        .on_click(move |e: &MouseEvent| c.borrow_mut().push(("click", e.client_x)))
        .on_down(move |e: &MouseEvent| d.borrow_mut().push(("down", e.client_x))),
    );

    marker.dispatch(&DomEvent::Click(MouseEvent::left(1., 0.)));
    marker.dispatch(&DomEvent::MouseDown(MouseEvent::new(MouseButton::Right, 2., 0.)));
    marker.dispatch(&DomEvent::Click(MouseEvent::new(MouseButton::Right, 3., 0.)));
    assert_eq!(*log.borrow(), vec![("down", 2.), ("click", 3.)]);
  }

  #[choropleth_controls_macro::test]
  fn re_enable_never_duplicates_listeners() {
    let doc = Document::new();
    let marker = doc.create_element("marker");
    let input = MouseClickInput::new(&marker, MouseButton::Left).unwrap();
    input.enable();
    assert_eq!(marker.listener_count(EventKind::Click), 1);
    input.disable();
    input.disable();
    assert_eq!(marker.listener_count(EventKind::Click), 0);
    assert!(!input.is_enabled());
  }
}

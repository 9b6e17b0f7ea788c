use std::{cell::Cell, rc::Rc};

use tracing::{debug, trace};

use super::{Binding, Controller};
use crate::{dom::Element, event::Pointer, geometry::Point, input::Handlers, view::View};

#[derive(Clone, Copy)]
struct Grab {
  start: Point,
  origin: Point,
}

/// Drags an absolutely positioned element around with the pointer.
///
/// The offset is always `origin + (pointer - start)`, where `origin` is the
/// element's offset when the drag began, so no rounding error builds up over
/// a long drag.
pub struct ElementDragController<V> {
  binding: Binding<V>,
  element: Element,
  grab: Rc<Cell<Option<Grab>>>,
}

impl<V: View<Event = [Pointer]>> ElementDragController<V> {
  /// The controller starts enabled.
  pub fn new(view: V, element: &Element) -> Self {
    let controller =
      ElementDragController { binding: Binding::new(view), element: element.clone(), grab: Rc::default() };
    controller.enable();
    controller
  }

  pub fn view(&self) -> &V { self.binding.view() }
}

impl<V: View<Event = [Pointer]>> Controller for ElementDragController<V> {
  fn enable(&self) {
    let (element, grab) = (self.element.clone(), self.grab.clone());
    let on_down = move |p: &[Pointer]| {
      if let Some(pointer) = p.first() {
        grab.set(Some(Grab { start: pointer.client(), origin: element.offset() }));
        debug!(element = element.id(), "element drag started");
      }
    };
    let (element, grab) = (self.element.clone(), self.grab.clone());
    let on_move = move |p: &[Pointer]| {
      if let (Some(Grab { start, origin }), Some(pointer)) = (grab.get(), p.first()) {
        let offset = origin + (pointer.client() - start);
        trace!(x = offset.x, y = offset.y, "element moved");
        element.set_offset(offset);
      }
    };
    let grab = self.grab.clone();
    let on_up = move |_: &[Pointer]| grab.set(None);
    self.binding.bind(Handlers::new().on_down(on_down).on_move(on_move).on_up(on_up));
  }

  fn disable(&self) {
    self.binding.unbind();
    self.grab.set(None);
  }

  fn is_enabled(&self) -> bool { self.binding.is_bound() }
}

use std::{cell::RefCell, rc::Rc};

use tracing::debug;

use super::{Binding, Controller};
use crate::{event::MouseEvent, input::Handlers, view::View};

type OnClick = Rc<RefCell<dyn FnMut(&MouseEvent)>>;

/// Calls a callback for every click the view reports.
pub struct ClickController<V> {
  binding: Binding<V>,
  on_click: OnClick,
}

impl<V: View<Event = MouseEvent>> ClickController<V> {
  /// The controller starts enabled.
  pub fn new(view: V, on_click: impl FnMut(&MouseEvent) + 'static) -> Self {
    let controller = ClickController { binding: Binding::new(view), on_click: Rc::new(RefCell::new(on_click)) };
    controller.enable();
    controller
  }

  pub fn view(&self) -> &V { self.binding.view() }
}

impl<V: View<Event = MouseEvent>> Controller for ClickController<V> {
  fn enable(&self) {
    let on_click = self.on_click.clone();
    self.binding.bind(Handlers::new().on_click(move |e: &MouseEvent| {
      debug!(x = e.client_x, y = e.client_y, "click");
      let mut on_click = on_click.borrow_mut();
      (*on_click)(e)
    }));
  }

  fn disable(&self) { self.binding.unbind() }

  fn is_enabled(&self) -> bool { self.binding.is_bound() }
}

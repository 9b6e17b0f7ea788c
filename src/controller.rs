//! Controllers turn view events into model mutations.
//!
//! Every controller holds at most one view subscription. `enable` always
//! releases the current one before subscribing again, so enabling twice
//! never doubles the mutations; `disable` releases it and cancels any timer
//! the controller started.
use std::cell::RefCell;

use crate::{
  input::Handlers,
  subscription::{IntoBoxedSubscription, SubscriptionSlot},
  view::View,
};

mod click;
mod element_drag;
mod pan;
mod zoom;

pub use click::ClickController;
pub use element_drag::ElementDragController;
pub use pan::{ease_in_out_cubic, InertiaConfig, PanController, PanDirection, PanOptions};
pub use zoom::{
  ExponentialZoom, DEFAULT_ZOOM_STEP, StepZoomController, ZoomController, ZoomCurve, ZoomFocusController,
};

pub trait Controller {
  fn enable(&self);

  fn disable(&self);

  fn is_enabled(&self) -> bool;
}

/// A view plus the controller's single subscription to it.
pub(crate) struct Binding<V> {
  view: V,
  subscription: RefCell<SubscriptionSlot>,
}

impl<V: View> Binding<V> {
  pub(crate) fn new(view: V) -> Self { Self { view, subscription: RefCell::default() } }

  pub(crate) fn view(&self) -> &V { &self.view }

  /// Drop the current subscription, then subscribe `handlers`.
  pub(crate) fn bind(&self, handlers: Handlers<V::Event>) {
    let mut slot = self.subscription.borrow_mut();
    slot.clear();
    slot.replace(self.view.subscribe(handlers).into_boxed());
  }

  pub(crate) fn unbind(&self) { self.subscription.borrow_mut().clear() }

  pub(crate) fn is_bound(&self) -> bool { self.subscription.borrow().is_active() }
}

impl<V> Drop for Binding<V> {
  fn drop(&mut self) { self.subscription.get_mut().clear() }
}

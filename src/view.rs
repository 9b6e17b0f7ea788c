//! Views relay input events to controllers.
//!
//! Controllers depend on [`View`] rather than on a concrete input, so a
//! coordinate transform or a filter can later be put between the two without
//! touching controller code. [`PassThroughView`] is the transparent relay.
use crate::{
  input::{ClientSubscription, Handlers, Input},
  subscription::Subscription,
};

pub trait View {
  type Event: ?Sized + 'static;
  type Unsub: Subscription + 'static;

  fn subscribe(&self, handlers: Handlers<Self::Event>) -> Self::Unsub;
}

/// Forwards `subscribe` to the wrapped input and returns its handle as is.
pub struct PassThroughView<I> {
  input: I,
}

impl<I: Input> PassThroughView<I> {
  pub fn new(input: I) -> Self { Self { input } }

  pub fn input(&self) -> &I { &self.input }

  pub fn enable(&self) { self.input.enable() }

  pub fn disable(&self) { self.input.disable() }
}

impl<I: Input> View for PassThroughView<I> {
  type Event = I::Event;
  type Unsub = ClientSubscription<I::Event>;

  #[inline]
  fn subscribe(&self, handlers: Handlers<I::Event>) -> Self::Unsub { self.input.subscribe(handlers) }
}

impl<V: View> View for std::rc::Rc<V> {
  type Event = V::Event;
  type Unsub = V::Unsub;

  #[inline]
  fn subscribe(&self, handlers: Handlers<V::Event>) -> V::Unsub { (**self).subscribe(handlers) }
}

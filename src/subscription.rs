//! Subscription handles.
//!
//! Every `subscribe` in this crate returns a handle implementing
//! [`Subscription`]. Unsubscribing consumes the handle, so a subscription can
//! only be released once; releasing an already closed one is a no-op.
mod boxed;

pub use boxed::{BoxedSubscription, IntoBoxedSubscription};

/// A handle to an active registration (subject subscriber, input client,
/// scheduled task...).
pub trait Subscription {
  /// Release the registration. Calling it on a closed handle does nothing.
  fn unsubscribe(self);

  fn is_closed(&self) -> bool;
}

impl Subscription for () {
  #[inline]
  fn unsubscribe(self) {}

  #[inline]
  fn is_closed(&self) -> bool { true }
}

impl<A: Subscription, B: Subscription> Subscription for (A, B) {
  fn unsubscribe(self) {
    self.0.unsubscribe();
    self.1.unsubscribe();
  }

  fn is_closed(&self) -> bool { self.0.is_closed() && self.1.is_closed() }
}

impl<T: Subscription> Subscription for Vec<T> {
  fn unsubscribe(self) {
    for s in self {
      s.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool { self.iter().all(Subscription::is_closed) }
}

impl<T: Subscription> Subscription for Option<T> {
  fn unsubscribe(self) {
    if let Some(s) = self {
      s.unsubscribe()
    }
  }

  fn is_closed(&self) -> bool { self.as_ref().is_none_or(Subscription::is_closed) }
}

/// Activates "RAII" behavior for a subscription: `unsubscribe()` is called
/// as soon as the guard goes out of scope.
///
/// **Attention:** if you don't bind the guard to a variable the subscription
/// is released immediately.
#[must_use]
pub struct SubscriptionGuard<T: Subscription>(Option<T>);

impl<T: Subscription> SubscriptionGuard<T> {
  pub fn new(subscription: T) -> Self { Self(Some(subscription)) }

  /// Give the subscription back without releasing it.
  pub fn into_inner(mut self) -> T {
    self
      .0
      .take()
      .unwrap_or_else(|| unreachable!("guard is only emptied on drop"))
  }
}

impl<T: Subscription> Drop for SubscriptionGuard<T> {
  fn drop(&mut self) {
    if let Some(s) = self.0.take() {
      s.unsubscribe()
    }
  }
}

/// Holds at most one live subscription. Storing a new one releases the
/// previous one first, which is how controllers keep exactly one active view
/// subscription.
pub struct SubscriptionSlot<T: Subscription = BoxedSubscription>(Option<T>);

impl<T: Subscription> Default for SubscriptionSlot<T> {
  fn default() -> Self { Self(None) }
}

impl<T: Subscription> SubscriptionSlot<T> {
  /// Release the current subscription, if any, then keep `subscription`.
  pub fn replace(&mut self, subscription: T) {
    self.clear();
    self.0 = Some(subscription);
  }

  /// Release the current subscription. No-op when empty.
  pub fn clear(&mut self) {
    if let Some(s) = self.0.take() {
      s.unsubscribe();
    }
  }

  /// True while a subscription is held and still open.
  pub fn is_active(&self) -> bool { self.0.as_ref().is_some_and(|s| !s.is_closed()) }
}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, rc::Rc};

  use super::*;

  struct Counting(Rc<Cell<u32>>);

  impl Subscription for Counting {
    fn unsubscribe(self) { self.0.set(self.0.get() + 1) }

    fn is_closed(&self) -> bool { false }
  }

  #[choropleth_controls_macro::test]
  fn guard_releases_on_drop() {
    let hits = Rc::new(Cell::new(0));
    {
      let _guard = SubscriptionGuard::new(Counting(hits.clone()));
      assert_eq!(hits.get(), 0);
    }
    assert_eq!(hits.get(), 1);
  }

  #[choropleth_controls_macro::test]
  fn guard_into_inner_keeps_subscription() {
    let hits = Rc::new(Cell::new(0));
    let inner = SubscriptionGuard::new(Counting(hits.clone())).into_inner();
    assert_eq!(hits.get(), 0);
    inner.unsubscribe();
    assert_eq!(hits.get(), 1);
  }

  #[choropleth_controls_macro::test]
  fn slot_releases_previous_on_replace() {
    let hits = Rc::new(Cell::new(0));
    let mut slot = SubscriptionSlot::default();
    slot.replace(Counting(hits.clone()));
    slot.replace(Counting(hits.clone()));
    assert_eq!(hits.get(), 1);
    assert!(slot.is_active());

    slot.clear();
    slot.clear();
    assert_eq!(hits.get(), 2);
    assert!(!slot.is_active());
  }
}

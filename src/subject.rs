//! A minimal publish-only multicast primitive.
//!
//! [`Subject`] keeps an ordered list of callbacks and calls each of them,
//! synchronously and in subscription order, on every [`Subject::next`].
//! There is no buffering and no replay for late subscribers.
//!
//! ## Dispatch rules
//!
//! - A callback subscribed during an emission does not see that emission.
//! - A callback unsubscribed during an emission, before its turn, is skipped.
//! - A callback that re-enters the subject it is subscribed to may emit to the
//!   other subscribers; it is itself skipped for the nested emission.
//! - Dispatch is unguarded: a panicking callback unwinds through `next` and
//!   the remaining callbacks of that emission are not called.
mod subscribers;

use std::{
  cell::RefCell,
  rc::{Rc, Weak},
};

pub use subscribers::Subscribers;
use tracing::warn;

use crate::subscription::Subscription;

type Callback<T> = Rc<RefCell<dyn FnMut(&T)>>;
type Observers<T> = Rc<RefCell<Subscribers<Callback<T>>>>;

pub struct Subject<T> {
  observers: Observers<T>,
}

impl<T> Clone for Subject<T> {
  fn clone(&self) -> Self { Self { observers: self.observers.clone() } }
}

impl<T> Default for Subject<T> {
  fn default() -> Self { Self { observers: Rc::new(RefCell::new(Subscribers::default())) } }
}

impl<T: 'static> Subject<T> {
  pub fn new() -> Self { Self::default() }

  /// Register `callback`; it is called with every value emitted from now on
  /// until the returned subscription is released.
  pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> SubjectSubscription<T> {
    let callback: Callback<T> = Rc::new(RefCell::new(callback));
    let id = self.observers.borrow_mut().add(callback);
    SubjectSubscription { observers: Rc::downgrade(&self.observers), id }
  }

  /// Emit `value` to every current subscriber.
  pub fn next(&self, value: &T) {
    let snapshot = self.observers.borrow().snapshot();
    for (id, callback) in snapshot {
      if !self.observers.borrow().contains(id) {
        continue;
      }
      match callback.try_borrow_mut() {
        Ok(mut callback) => (*callback)(value),
        Err(_) => warn!(subscriber = id, "skipping re-entrant emission to a running subscriber"),
      }
    }
  }

  pub fn observer_count(&self) -> usize { self.observers.borrow().len() }
}

/// Handle returned by [`Subject::subscribe`].
///
/// It holds the subject weakly, so keeping a subscription around never keeps
/// a dropped subject alive.
pub struct SubjectSubscription<T> {
  observers: Weak<RefCell<Subscribers<Callback<T>>>>,
  id: usize,
}

impl<T> Subscription for SubjectSubscription<T> {
  fn unsubscribe(self) {
    if let Some(observers) = self.observers.upgrade() {
      let removed = observers.borrow_mut().remove(self.id);
      // Drop the callback after the borrow ends; its captures may touch the
      // subject again.
      drop(removed);
    }
  }

  fn is_closed(&self) -> bool {
    self
      .observers
      .upgrade()
      .is_none_or(|observers| !observers.borrow().contains(self.id))
  }
}

#[cfg(test)]
mod tests {
  use std::cell::{Cell, RefCell};

  use super::*;

  #[choropleth_controls_macro::test]
  fn emits_in_subscription_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let subject = Subject::<i32>::new();
    for tag in ["a", "b", "c"] {
      let log = log.clone();
      subject.subscribe(move |v| log.borrow_mut().push(format!("{tag}{v}")));
    }

    subject.next(&1);
    subject.next(&2);

    assert_eq!(*log.borrow(), vec!["a1", "b1", "c1", "a2", "b2", "c2"]);
  }

  #[choropleth_controls_macro::test]
  fn unsubscribe_removes_exactly_one() {
    let a = Rc::new(Cell::new(0));
    let b = Rc::new(Cell::new(0));
    let subject = Subject::<i32>::new();
    let c_a = a.clone();
    let sub_a = subject.subscribe(move |v| c_a.set(c_a.get() + v));
    let c_b = b.clone();
    let _sub_b = subject.subscribe(move |v| c_b.set(c_b.get() + v));

    subject.next(&1);
    assert!(!sub_a.is_closed());
    sub_a.unsubscribe();
    subject.next(&10);
    subject.next(&100);

    assert_eq!(a.get(), 1);
    assert_eq!(b.get(), 111);
    assert_eq!(subject.observer_count(), 1);
  }

  #[choropleth_controls_macro::test]
  fn late_subscriber_gets_no_replay() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let subject = Subject::<i32>::new();
    subject.next(&1);
    let c_seen = seen.clone();
    subject.subscribe(move |v| c_seen.borrow_mut().push(*v));
    subject.next(&2);
    assert_eq!(*seen.borrow(), vec![2]);
  }

  #[choropleth_controls_macro::test]
  fn unsubscribe_during_emission_skips_later_subscriber() {
    let hits = Rc::new(Cell::new(0));
    let subject = Subject::<()>::new();
    let victim: Rc<RefCell<Option<SubjectSubscription<()>>>> = Rc::default();

    let c_victim = victim.clone();
    subject.subscribe(move |_| {
      if let Some(s) = c_victim.borrow_mut().take() {
        s.unsubscribe();
      }
    });
    let c_hits = hits.clone();
    *victim.borrow_mut() = Some(subject.subscribe(move |_| c_hits.set(c_hits.get() + 1)));

    subject.next(&());
    subject.next(&());
    assert_eq!(hits.get(), 0);
  }

  #[choropleth_controls_macro::test]
  fn subscribe_during_emission_waits_for_next_value() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let subject = Subject::<i32>::new();
    let c_subject = subject.clone();
    let c_seen = seen.clone();
    let armed = Cell::new(true);
    subject.subscribe(move |_| {
      if armed.replace(false) {
        let c_seen = c_seen.clone();
        c_subject.subscribe(move |v| c_seen.borrow_mut().push(*v));
      }
    });

    subject.next(&1);
    subject.next(&2);
    assert_eq!(*seen.borrow(), vec![2]);
  }

  #[choropleth_controls_macro::test]
  fn reentrant_emission_reaches_other_subscribers() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let subject = Subject::<i32>::new();
    let c_subject = subject.clone();
    subject.subscribe(move |v| {
      if *v == 1 {
        c_subject.next(&2);
      }
    });
    let c_seen = seen.clone();
    subject.subscribe(move |v| c_seen.borrow_mut().push(*v));

    subject.next(&1);
    assert_eq!(*seen.borrow(), vec![2, 1]);
  }

  #[choropleth_controls_macro::test]
  fn subscription_closes_when_subject_dropped() {
    let subject = Subject::<i32>::new();
    let sub = subject.subscribe(|_| {});
    drop(subject);
    assert!(sub.is_closed());
    sub.unsubscribe();
  }
}

//! Input sources: adapters from native events to a uniform client contract.
//!
//! A client registers a [`Handlers`] bundle, any subset of `down`, `move`,
//! `up`, `delta` and `click`. Every input is bound to one element, enables
//! itself on construction, and can be disabled and re-enabled at will;
//! enabling always detaches first, so listeners are never registered twice.
use std::{cell::RefCell, rc::Rc};

use tracing::warn;

use crate::{
  subject::Subscribers,
  subscription::Subscription,
};

mod mouse_click;
mod mouse_drag;
mod mouse_wheel;
mod touch_drag;

pub use mouse_click::MouseClickInput;
pub use mouse_drag::MouseDragInput;
pub use mouse_wheel::MouseWheelInput;
pub use touch_drag::TouchDragInput;

type Callback<E> = Box<dyn FnMut(&E)>;

/// The callback names an input emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
  Down,
  Move,
  Up,
  Delta,
  Click,
}

/// A partial set of named callbacks. Phases without a callback are ignored.
pub struct Handlers<E: ?Sized> {
  down: Option<Callback<E>>,
  moved: Option<Callback<E>>,
  up: Option<Callback<E>>,
  delta: Option<Callback<E>>,
  click: Option<Callback<E>>,
}

impl<E: ?Sized> Default for Handlers<E> {
  fn default() -> Self { Self { down: None, moved: None, up: None, delta: None, click: None } }
}

impl<E: ?Sized> Handlers<E> {
  pub fn new() -> Self { Self::default() }

  pub fn on_down(mut self, f: impl FnMut(&E) + 'static) -> Self {
    self.down = Some(Box::new(f));
    self
  }

  pub fn on_move(mut self, f: impl FnMut(&E) + 'static) -> Self {
    self.moved = Some(Box::new(f));
    self
  }

  pub fn on_up(mut self, f: impl FnMut(&E) + 'static) -> Self {
    self.up = Some(Box::new(f));
    self
  }

  pub fn on_delta(mut self, f: impl FnMut(&E) + 'static) -> Self {
    self.delta = Some(Box::new(f));
    self
  }

  pub fn on_click(mut self, f: impl FnMut(&E) + 'static) -> Self {
    self.click = Some(Box::new(f));
    self
  }

  fn get_mut(&mut self, phase: Phase) -> Option<&mut Callback<E>> {
    match phase {
      Phase::Down => self.down.as_mut(),
      Phase::Move => self.moved.as_mut(),
      Phase::Up => self.up.as_mut(),
      Phase::Delta => self.delta.as_mut(),
      Phase::Click => self.click.as_mut(),
    }
  }
}

type Client<E> = Rc<RefCell<Handlers<E>>>;

/// The subscription capability every input and view delegates to.
pub struct Clients<E: ?Sized> {
  inner: Rc<RefCell<Subscribers<Client<E>>>>,
}

impl<E: ?Sized> Clone for Clients<E> {
  fn clone(&self) -> Self { Self { inner: self.inner.clone() } }
}

impl<E: ?Sized> Default for Clients<E> {
  fn default() -> Self { Self { inner: Rc::new(RefCell::new(Subscribers::default())) } }
}

impl<E: ?Sized + 'static> Clients<E> {
  pub fn subscribe(&self, handlers: Handlers<E>) -> ClientSubscription<E> {
    let id = self.inner.borrow_mut().add(Rc::new(RefCell::new(handlers)));
    ClientSubscription { clients: Rc::downgrade(&self.inner), id }
  }

  /// Call the `phase` callback of every client, in subscription order.
  pub fn emit(&self, phase: Phase, event: &E) {
    let snapshot = self.inner.borrow().snapshot();
    for (id, client) in snapshot {
      if !self.inner.borrow().contains(id) {
        continue;
      }
      let Ok(mut handlers) = client.try_borrow_mut() else {
        warn!(client = id, ?phase, "skipping re-entrant input event");
        continue;
      };
      if let Some(callback) = handlers.get_mut(phase) {
        callback(event);
      }
    }
  }

  pub fn len(&self) -> usize { self.inner.borrow().len() }

  pub fn is_empty(&self) -> bool { self.inner.borrow().is_empty() }
}

/// Handle returned by [`Clients::subscribe`].
pub struct ClientSubscription<E: ?Sized> {
  clients: std::rc::Weak<RefCell<Subscribers<Client<E>>>>,
  id: usize,
}

impl<E: ?Sized> Subscription for ClientSubscription<E> {
  fn unsubscribe(self) {
    if let Some(clients) = self.clients.upgrade() {
      let removed = clients.borrow_mut().remove(self.id);
      drop(removed);
    }
  }

  fn is_closed(&self) -> bool {
    self
      .clients
      .upgrade()
      .is_none_or(|clients| !clients.borrow().contains(self.id))
  }
}

/// A source of input events.
pub trait Input {
  /// What callbacks receive: a pointer slice for drags, the native event
  /// otherwise.
  type Event: ?Sized + 'static;

  fn subscribe(&self, handlers: Handlers<Self::Event>) -> ClientSubscription<Self::Event>;

  /// Attach native listeners, detaching any previous ones first.
  fn enable(&self);

  /// Detach native listeners. No-op when not enabled.
  fn disable(&self);

  fn is_enabled(&self) -> bool;
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;

  use super::*;

  #[choropleth_controls_macro::test]
  fn partial_handlers_ignore_missing_phases() {
    let clients = Clients::<i32>::default();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    let _sub = clients.subscribe(Handlers::new().on_up(move |v| s.borrow_mut().push(*v)));

    clients.emit(Phase::Down, &1);
    clients.emit(Phase::Up, &2);
    clients.emit(Phase::Click, &3);
    assert_eq!(*seen.borrow(), vec![2]);
  }

  #[choropleth_controls_macro::test]
  fn unsubscribing_one_client_keeps_the_others() {
    let clients = Clients::<i32>::default();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    let first = clients.subscribe(Handlers::new().on_delta(move |v| s.borrow_mut().push(("a", *v))));
    let s = seen.clone();
    let _second = clients.subscribe(Handlers::new().on_delta(move |v| s.borrow_mut().push(("b", *v))));

    clients.emit(Phase::Delta, &1);
    first.unsubscribe();
    clients.emit(Phase::Delta, &2);
    assert_eq!(*seen.borrow(), vec![("a", 1), ("b", 1), ("b", 2)]);
    assert_eq!(clients.len(), 1);
  }
}

//! Cancellable timers.
//!
//! Controllers never call host timer APIs directly. They ask a [`Scheduler`]
//! for a task and keep the returned [`TaskHandle`]; cancelling the handle is
//! idempotent and guarantees the task body never runs again.
//!
//! Two schedulers ship with the crate:
//!
//! - [`TestScheduler`]: thread-local virtual time, advanced explicitly.
//! - [`LocalScheduler`]: real time, on a `futures` `LocalPool` natively or
//!   the browser event loop on wasm32.
use std::{
  cell::{Cell, RefCell},
  rc::Rc,
  task::Waker,
};

pub use std::time::Duration;
#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;

#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;

use crate::subscription::Subscription;

#[cfg(any(target_arch = "wasm32", feature = "timer"))]
mod local_scheduler;
mod test_scheduler;

#[cfg(any(target_arch = "wasm32", feature = "timer"))]
pub use local_scheduler::LocalScheduler;
pub use test_scheduler::TestScheduler;

/// Shortest period [`Scheduler::interval`] repeats at. A zero period would
/// keep rescheduling the task at the same instant.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// What a task wants after one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskState {
  /// Done; the handle becomes closed.
  Finished,
  /// Run again after the given duration.
  Sleeping(Duration),
}

/// An object that orders tasks in time and runs them later on the current
/// thread.
pub trait Scheduler: Clone + 'static {
  /// Time elapsed on this scheduler's clock. Only differences are
  /// meaningful.
  fn now(&self) -> Duration;

  /// Run `task` after `delay`, then again for as long as it returns
  /// [`TaskState::Sleeping`].
  fn schedule(&self, delay: Duration, task: impl FnMut() -> TaskState + 'static) -> TaskHandle;

  /// Run `f` once after `delay`.
  fn timeout(&self, delay: Duration, f: impl FnOnce() + 'static) -> TaskHandle {
    let mut f = Some(f);
    self.schedule(delay, move || {
      if let Some(f) = f.take() {
        f();
      }
      TaskState::Finished
    })
  }

  /// Run `f` every `period`, first after one period, until it returns
  /// `false`. Periods below [`MIN_INTERVAL`] are raised to it.
  fn interval(&self, period: Duration, mut f: impl FnMut() -> bool + 'static) -> TaskHandle {
    let period = period.max(MIN_INTERVAL);
    self.schedule(period, move || {
      if f() { TaskState::Sleeping(period) } else { TaskState::Finished }
    })
  }
}

#[derive(Default)]
struct HandleState {
  cancelled: Cell<bool>,
  finished: Cell<bool>,
  waker: RefCell<Option<Waker>>,
}

/// Handle to a scheduled task.
///
/// Clones share state: cancelling through any clone cancels the task.
#[derive(Clone, Default)]
pub struct TaskHandle {
  state: Rc<HandleState>,
}

impl TaskHandle {
  pub(crate) fn new() -> Self { Self::default() }

  /// Stop the task. Calling it again, or after the task finished, does
  /// nothing.
  pub fn cancel(&self) {
    if self.state.cancelled.replace(true) {
      return;
    }
    if let Some(waker) = self.state.waker.borrow_mut().take() {
      waker.wake();
    }
  }

  pub fn is_cancelled(&self) -> bool { self.state.cancelled.get() }

  pub fn is_finished(&self) -> bool { self.state.finished.get() }

  pub(crate) fn mark_finished(&self) { self.state.finished.set(true) }

  pub(crate) fn register_waker(&self, waker: &Waker) {
    *self.state.waker.borrow_mut() = Some(waker.clone());
  }
}

impl Subscription for TaskHandle {
  fn unsubscribe(self) { self.cancel() }

  fn is_closed(&self) -> bool { self.is_cancelled() || self.is_finished() }
}

/// A slot holding the handle of at most one pending task. Arming it cancels
/// whatever was pending, so two timers of the same kind never overlap.
#[derive(Default)]
pub struct TaskSlot(Option<TaskHandle>);

impl TaskSlot {
  pub fn arm(&mut self, handle: TaskHandle) {
    self.cancel();
    self.0 = Some(handle);
  }

  pub fn cancel(&mut self) {
    if let Some(handle) = self.0.take() {
      handle.cancel();
    }
  }

  pub fn is_pending(&self) -> bool { self.0.as_ref().is_some_and(|h| !h.is_closed()) }
}

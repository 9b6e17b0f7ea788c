//! Virtual clock for gesture and animation tests.
//!
//! Time stands still until a test moves it, so an inertia glide, the
//! hold-to-stop timer or timeline playback can be checked tick by tick.
//!
//! ```rust
//! use choropleth_controls::scheduler::{Duration, Scheduler, TestScheduler};
//!
//! TestScheduler::init();
//! let handle = TestScheduler.timeout(Duration::from_millis(100), || {});
//! TestScheduler::advance_by(Duration::from_millis(100));
//! assert!(handle.is_finished());
//! ```
//!
//! The clock and its queue are thread-local: every test thread gets its own.

use std::{
  cell::RefCell,
  cmp::{Ordering, Reverse},
  collections::BinaryHeap,
};

use super::{Duration, Scheduler, TaskHandle, TaskState};
use crate::subscription::Subscription;

#[derive(Default)]
struct Clock {
  now: Duration,
  queue: BinaryHeap<Reverse<Pending>>,
  seq: u64,
  ready: bool,
}

impl Clock {
  fn push(&mut self, delay: Duration, task: Box<dyn FnMut() -> TaskState>, handle: TaskHandle) {
    let due = (self.now + delay, self.seq);
    self.seq += 1;
    self.queue.push(Reverse(Pending { due, task, handle }));
  }

  /// Pop the next task due no later than `until`, moving the clock to it.
  fn pop_due(&mut self, until: Option<Duration>) -> Option<Pending> {
    let next = self.queue.peek()?;
    if until.is_some_and(|limit| next.0.due.0 > limit) {
      return None;
    }
    let Reverse(pending) = self.queue.pop()?;
    self.now = pending.due.0;
    Some(pending)
  }
}

/// A queued task, ordered by due time then by insertion.
struct Pending {
  due: (Duration, u64),
  task: Box<dyn FnMut() -> TaskState>,
  handle: TaskHandle,
}

impl PartialEq for Pending {
  fn eq(&self, other: &Self) -> bool { self.due == other.due }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for Pending {
  fn cmp(&self, other: &Self) -> Ordering { self.due.cmp(&other.due) }
}

thread_local! {
  static CLOCK: RefCell<Clock> = RefCell::new(Clock::default());
}

fn with_clock<R>(f: impl FnOnce(&mut Clock) -> R) -> R {
  CLOCK.with(|clock| {
    let mut clock = clock.borrow_mut();
    assert!(clock.ready, "TestScheduler::init() must be called before using the scheduler");
    f(&mut clock)
  })
}

/// Virtual time scheduler.
///
/// Zero sized: every value on a thread drives the same clock.
#[derive(Clone, Copy, Default, Debug)]
pub struct TestScheduler;

impl TestScheduler {
  /// Reset the clock to zero and drop every queued task.
  ///
  /// Everything else panics until this has run on the current thread.
  pub fn init() {
    CLOCK.with(|clock| *clock.borrow_mut() = Clock { ready: true, ..Clock::default() });
  }

  pub fn now() -> Duration { with_clock(|c| c.now) }

  /// Queued tasks, counting cancelled ones that were not popped yet.
  pub fn pending_count() -> usize { with_clock(|c| c.queue.len()) }

  pub fn is_empty() -> bool { with_clock(|c| c.queue.is_empty()) }

  /// Move the clock forward by `duration`, running due tasks in time order
  /// on the way.
  pub fn advance_by(duration: Duration) {
    let target = with_clock(|c| c.now + duration);
    Self::run_until(Some(target));
    with_clock(|c| c.now = target);
  }

  /// Run until the queue is empty, jumping the clock from task to task.
  ///
  /// Never returns while some task keeps rescheduling itself.
  pub fn flush() { Self::run_until(None) }

  fn run_until(until: Option<Duration>) {
    // The clock is not borrowed while a task runs: tasks schedule and cancel.
    while let Some(Pending { mut task, handle, .. }) = with_clock(|c| c.pop_due(until)) {
      if handle.is_closed() {
        continue;
      }
      match task() {
        TaskState::Finished => handle.mark_finished(),
        TaskState::Sleeping(_) if handle.is_closed() => {}
        TaskState::Sleeping(delay) => with_clock(|c| c.push(delay, task, handle)),
      }
    }
  }
}

impl Scheduler for TestScheduler {
  fn now(&self) -> Duration { TestScheduler::now() }

  fn schedule(&self, delay: Duration, task: impl FnMut() -> TaskState + 'static) -> TaskHandle {
    let handle = TaskHandle::new();
    with_clock(|c| c.push(delay, Box::new(task), handle.clone()));
    handle
  }
}

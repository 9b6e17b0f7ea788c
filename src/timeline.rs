//! The date scrubber under the map.
//!
//! A [`Timeline`] holds a position in `0..=max` (one step per dataset date)
//! and emits it whenever it changes. Playing advances one step per interval
//! and stops by itself on the last step.
use std::{
  cell::{Cell, RefCell},
  rc::{Rc, Weak},
};

use tracing::{debug, trace};

use crate::{
  scheduler::{Duration, Scheduler, TaskSlot},
  subject::{Subject, SubjectSubscription},
};

struct TimelineState<S> {
  max: usize,
  index: Cell<usize>,
  interval: Duration,
  scheduler: S,
  positions: Subject<usize>,
  playing: Subject<bool>,
  player: RefCell<TaskSlot>,
}

impl<S: Scheduler> TimelineState<S> {
  fn seek(&self, index: usize) -> usize {
    let index = index.min(self.max);
    self.index.set(index);
    trace!(index, "timeline position");
    self.positions.next(&index);
    index
  }

  fn stop(&self) {
    self.player.borrow_mut().cancel();
    debug!(index = self.index.get(), "timeline paused");
    self.playing.next(&false);
  }

  fn tick(&self) -> bool {
    let index = self.seek(self.index.get().saturating_add(1));
    if index == self.max {
      // `is_playing` must already read false inside the callbacks below.
      self.player.borrow_mut().cancel();
      debug!("timeline reached the last date");
      self.playing.next(&false);
      return false;
    }
    true
  }
}

pub struct Timeline<S> {
  state: Rc<TimelineState<S>>,
}

impl<S: Scheduler> Timeline<S> {
  /// A timeline over `0..=max` starting at 0, advancing every `interval`
  /// while playing.
  pub fn new(max: usize, interval: Duration, scheduler: S) -> Self {
    Timeline {
      state: Rc::new(TimelineState {
        max,
        index: Cell::new(0),
        interval,
        scheduler,
        positions: Subject::new(),
        playing: Subject::new(),
        player: RefCell::default(),
      }),
    }
  }

  pub fn index(&self) -> usize { self.state.index.get() }

  pub fn max(&self) -> usize { self.state.max }

  /// Called with every new position.
  pub fn subscribe(&self, callback: impl FnMut(&usize) + 'static) -> SubjectSubscription<usize> {
    self.state.positions.subscribe(callback)
  }

  /// Called with `true` when playback starts and `false` when it stops,
  /// for the play/pause button.
  pub fn subscribe_playing(&self, callback: impl FnMut(&bool) + 'static) -> SubjectSubscription<bool> {
    self.state.playing.subscribe(callback)
  }

  /// Move to `index`, clamped to the last step, and emit it. Returns the
  /// position actually reached.
  pub fn seek(&self, index: usize) -> usize { self.state.seek(index) }

  /// Emit the current position again.
  pub fn refresh(&self) { self.state.positions.next(&self.state.index.get()) }

  pub fn step_backward(&self) -> usize { self.state.seek(self.state.index.get().saturating_sub(1)) }

  pub fn step_forward(&self) -> usize { self.state.seek(self.state.index.get().saturating_add(1)) }

  pub fn is_playing(&self) -> bool { self.state.player.borrow().is_pending() }

  /// Start playing, or pause when already playing.
  pub fn toggle_play(&self) {
    if self.is_playing() {
      self.state.stop();
      return;
    }
    let weak: Weak<TimelineState<S>> = Rc::downgrade(&self.state);
    let handle = self
      .state
      .scheduler
      .interval(self.state.interval, move || weak.upgrade().is_some_and(|state| state.tick()));
    self.state.player.borrow_mut().arm(handle);
    debug!(index = self.index(), "timeline playing");
    self.state.playing.next(&true);
  }
}

impl<S> Drop for Timeline<S> {
  fn drop(&mut self) { self.state.player.borrow_mut().cancel() }
}

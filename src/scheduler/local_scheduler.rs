//! Real-time scheduler for the current thread.
//!
//! Natively, tasks are spawned on a `futures` [`LocalPool`] that the host
//! drives (`run`, `run_until_stalled`) and sleep through `futures-time`. On
//! wasm32 they are spawned on the browser event loop and sleep through
//! `gloo-timers`.
//!
//! [`LocalPool`]: futures::executor::LocalPool
use std::{
  future::Future,
  pin::Pin,
  task::{Context, Poll},
};

#[cfg(not(target_arch = "wasm32"))]
use futures::{executor::LocalSpawner, task::LocalSpawnExt};
use pin_project_lite::pin_project;
#[cfg(not(target_arch = "wasm32"))]
use tracing::warn;

use super::{Duration, Instant, Scheduler, TaskHandle, TaskState};
use crate::subscription::Subscription;

#[derive(Clone)]
pub struct LocalScheduler {
  #[cfg(not(target_arch = "wasm32"))]
  spawner: LocalSpawner,
  epoch: Instant,
}

impl LocalScheduler {
  /// A scheduler spawning its timers on the pool behind `spawner`.
  #[cfg(not(target_arch = "wasm32"))]
  pub fn new(spawner: LocalSpawner) -> Self { Self { spawner, epoch: Instant::now() } }

  /// A scheduler spawning its timers on the browser event loop.
  #[cfg(target_arch = "wasm32")]
  pub fn new() -> Self { Self { epoch: Instant::now() } }

  #[cfg(not(target_arch = "wasm32"))]
  fn spawn(&self, future: impl Future<Output = ()> + 'static, handle: &TaskHandle) {
    if let Err(err) = self.spawner.spawn_local(future) {
      warn!(%err, "timer could not be spawned, the pool is gone");
      handle.mark_finished();
    }
  }

  #[cfg(target_arch = "wasm32")]
  fn spawn(&self, future: impl Future<Output = ()> + 'static, _handle: &TaskHandle) {
    wasm_bindgen_futures::spawn_local(future);
  }
}

#[cfg(target_arch = "wasm32")]
impl Default for LocalScheduler {
  fn default() -> Self { Self::new() }
}

#[cfg(not(target_arch = "wasm32"))]
fn sleep(duration: Duration) -> impl Future<Output = ()> {
  let sleep = futures_time::task::sleep(futures_time::time::Duration::from(duration));
  async move {
    sleep.await;
  }
}

#[cfg(target_arch = "wasm32")]
fn sleep(duration: Duration) -> impl Future<Output = ()> {
  let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
  gloo_timers::future::TimeoutFuture::new(millis)
}

pin_project! {
  /// Resolves to `true` when `inner` completes, or to `false` as soon as the
  /// handle is cancelled, whichever comes first.
  struct Cancellable<F> {
    #[pin]
    inner: F,
    handle: TaskHandle,
  }
}

impl<F: Future<Output = ()>> Future for Cancellable<F> {
  type Output = bool;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let this = self.project();
    if this.handle.is_closed() {
      return Poll::Ready(false);
    }
    match this.inner.poll(cx) {
      Poll::Ready(()) => Poll::Ready(true),
      Poll::Pending => {
        this.handle.register_waker(cx.waker());
        Poll::Pending
      }
    }
  }
}

impl Scheduler for LocalScheduler {
  fn now(&self) -> Duration { self.epoch.elapsed() }

  fn schedule(&self, delay: Duration, mut task: impl FnMut() -> TaskState + 'static) -> TaskHandle {
    let handle = TaskHandle::new();
    let task_handle = handle.clone();
    let future = async move {
      let mut delay = delay;
      loop {
        let elapsed = Cancellable { inner: sleep(delay), handle: task_handle.clone() }.await;
        if !elapsed || task_handle.is_closed() {
          break;
        }
        match task() {
          TaskState::Finished => {
            task_handle.mark_finished();
            break;
          }
          TaskState::Sleeping(next) => delay = next,
        }
      }
    };
    self.spawn(future, &handle);
    handle
  }
}

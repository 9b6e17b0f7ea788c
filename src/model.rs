//! Observable values.
//!
//! A [`MutableModel`] owns one value, mutates it in place through
//! [`MutableModel::apply`] and notifies its subscribers synchronously after
//! every change. [`focus`] and [`watch_all`] build read-only derived
//! [`Model`]s that recompute whenever their sources emit.
//!
//! There is no isolation between mutators: everything runs on one thread.
//! An `apply` issued by a subscriber while the model is notifying is queued
//! and runs, with its own notification, once the current one is over.
use std::{
  cell::{Cell, RefCell},
  collections::VecDeque,
  fmt::Display,
  ops::Deref,
  rc::{Rc, Weak},
};

use tracing::{trace, warn};

type Mutator<T> = Box<dyn FnOnce(&mut T)>;

use crate::{
  error::{Error, Result},
  subject::{Subject, SubjectSubscription},
  subscription::{BoxedSubscription, IntoBoxedSubscription, Subscription},
};

struct ModelInner<T> {
  value: RefCell<T>,
  subject: Subject<T>,
  notifying: Cell<bool>,
  queued: RefCell<VecDeque<Mutator<T>>>,
  upstream: RefCell<Option<BoxedSubscription>>,
}

impl<T: 'static> ModelInner<T> {
  fn notify(&self) {
    let was_notifying = self.notifying.replace(true);
    self.subject.next(&self.value.borrow());
    self.notifying.set(was_notifying);
  }

  /// Run `mutator` and notify, or queue it while a notification is under
  /// way. The outermost call drains the queue in order.
  fn mutate(&self, mutator: Mutator<T>) {
    if self.notifying.get() {
      trace!("mutation queued behind the current notification");
      self.queued.borrow_mut().push_back(mutator);
      return;
    }
    let mut next = Some(mutator);
    while let Some(mutator) = next {
      mutator(&mut self.value.borrow_mut());
      self.notify();
      next = self.queued.borrow_mut().pop_front();
    }
  }

  fn release_upstream(&self) {
    let upstream = self.upstream.borrow_mut().take();
    if let Some(upstream) = upstream {
      upstream.unsubscribe();
    }
  }
}

/// A read-only observable value. Cloning shares the value.
pub struct Model<T> {
  inner: Rc<ModelInner<T>>,
}

impl<T> Clone for Model<T> {
  fn clone(&self) -> Self { Self { inner: self.inner.clone() } }
}

impl<T: 'static> Model<T> {
  fn from_value(value: T) -> Self {
    Model {
      inner: Rc::new(ModelInner {
        value: RefCell::new(value),
        subject: Subject::new(),
        notifying: Cell::new(false),
        queued: RefCell::default(),
        upstream: RefCell::new(None),
      }),
    }
  }

  fn downgrade(&self) -> Weak<ModelInner<T>> { Rc::downgrade(&self.inner) }

  /// Called with the value after every change.
  pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> SubjectSubscription<T> {
    self.inner.subject.subscribe(callback)
  }

  /// A copy of the current value.
  pub fn get(&self) -> T
  where
    T: Clone,
  {
    self.inner.value.borrow().clone()
  }

  /// Borrow the current value.
  pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R { f(&self.inner.value.borrow()) }

  pub fn observer_count(&self) -> usize { self.inner.subject.observer_count() }

  /// Stop following the source models. The value keeps its last state;
  /// other models derived from the same sources are unaffected. No-op on a
  /// model that derives from nothing.
  pub fn disconnect(&self) { self.inner.release_upstream() }

  /// True while this derived model still follows its sources.
  pub fn is_connected(&self) -> bool {
    self.inner.upstream.borrow().as_ref().is_some_and(|s| !s.is_closed())
  }
}

/// A model whose value can be changed.
///
/// Derefs to [`Model`] for subscription and reads.
pub struct MutableModel<T> {
  model: Model<T>,
}

impl<T> Clone for MutableModel<T> {
  fn clone(&self) -> Self { Self { model: self.model.clone() } }
}

impl<T: Default + 'static> Default for MutableModel<T> {
  fn default() -> Self { Self::new(T::default()) }
}

impl<T> Deref for MutableModel<T> {
  type Target = Model<T>;

  fn deref(&self) -> &Model<T> { &self.model }
}

impl<T: 'static> MutableModel<T> {
  pub fn new(value: T) -> Self { Self { model: Model::from_value(value) } }

  /// A read-only handle sharing this model's value.
  pub fn model(&self) -> Model<T> { self.model.clone() }

  /// Mutate the value in place, then notify every subscriber.
  ///
  /// Called from a subscriber of this model, the mutation waits until every
  /// subscriber saw the current value, then runs and notifies in turn.
  pub fn apply(&self, mutator: impl FnOnce(&mut T) + 'static) {
    self.model.inner.mutate(Box::new(mutator))
  }

  /// Run a fallible mutator on a copy of the value. The copy is committed
  /// and subscribers are notified only when the mutator succeeds; on failure
  /// the value is left untouched and nobody is notified.
  ///
  /// Unlike [`apply`](Self::apply) this can't wait for a running
  /// notification, since the caller needs the outcome: it fails with
  /// [`Error::Mutation`] instead.
  pub fn try_apply<E: Display>(&self, mutator: impl FnOnce(&mut T) -> Result<(), E>) -> Result<()>
  where
    T: Clone,
  {
    let inner = &self.model.inner;
    if inner.notifying.get() {
      warn!("try_apply ignored: model is notifying its subscribers");
      return Err(Error::Mutation("model is notifying its subscribers".to_owned()));
    }
    let mut scratch = inner.value.borrow().clone();
    mutator(&mut scratch).map_err(|e| Error::Mutation(e.to_string()))?;
    *inner.value.borrow_mut() = scratch;
    inner.notify();
    Ok(())
  }

  /// Notify subscribers again without changing the value.
  pub fn touch(&self) { self.model.inner.mutate(Box::new(|_| {})) }
}

/// A model holding `extractor(source)`, recomputed on every emission of
/// `source`.
pub fn focus<T, U>(source: &Model<T>, extractor: impl Fn(&T) -> U + 'static) -> Model<U>
where
  T: 'static,
  U: 'static,
{
  let derived = Model::from_value(source.with(&extractor));
  let target = derived.downgrade();
  let upstream = source.subscribe(move |value| {
    let Some(target) = target.upgrade() else { return };
    trace!("focus recomputed");
    *target.value.borrow_mut() = extractor(value);
    target.notify();
  });
  *derived.inner.upstream.borrow_mut() = Some(upstream.into_boxed());
  derived
}

/// A model holding the current values of every source, in order, gathered
/// again whenever any source emits.
///
/// The derived model keeps its sources alive until it is disconnected or
/// dropped, so the aggregate always has one entry per source.
pub fn watch_all<T: Clone + 'static>(sources: &[Model<T>]) -> Model<Vec<T>> {
  let derived = Model::from_value(sources.iter().map(Model::get).collect::<Vec<_>>());
  let sources: Rc<[Model<T>]> = sources.iter().cloned().collect();
  let upstream: Vec<BoxedSubscription> = sources
    .iter()
    .map(|source| {
      let target = derived.downgrade();
      let all = sources.clone();
      source
        .subscribe(move |_| {
          let Some(target) = target.upgrade() else { return };
          let values = all.iter().map(Model::get).collect();
          *target.value.borrow_mut() = values;
          target.notify();
        })
        .into_boxed()
    })
    .collect();
  *derived.inner.upstream.borrow_mut() = Some(upstream.into_boxed());
  derived
}

impl<T> Drop for ModelInner<T> {
  fn drop(&mut self) {
    if let Some(upstream) = self.upstream.get_mut().take() {
      upstream.unsubscribe();
    }
  }
}

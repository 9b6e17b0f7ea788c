use smallvec::SmallVec;

/// Ordered, id-addressed storage for subscribers.
///
/// This is the one publish/subscribe capability shared by subjects, input
/// sources and host listeners. Each owner holds a `Subscribers` and delegates
/// to it instead of inheriting a base implementation.
///
/// - Items keep insertion order, which is the emission order.
/// - Ids are never reused, so a stale handle can't remove a newer item.
/// - `SmallVec<[_; 2]>` avoids a heap allocation for the common case of one
///   or two subscribers.
pub struct Subscribers<Ob> {
  next_id: usize,
  items: SmallVec<[(usize, Ob); 2]>,
}

impl<Ob> Default for Subscribers<Ob> {
  fn default() -> Self { Self { next_id: 0, items: SmallVec::new() } }
}

impl<Ob> Subscribers<Ob> {
  /// Add an item and return its unique id.
  #[inline]
  pub fn add(&mut self, item: Ob) -> usize {
    let id = self.next_id;
    self.next_id += 1;
    self.items.push((id, item));
    id
  }

  /// Remove an item by id.
  pub fn remove(&mut self, id: usize) -> Option<Ob> {
    self
      .items
      .iter()
      .position(|(i, _)| *i == id)
      .map(|pos| self.items.remove(pos).1)
  }

  #[inline]
  pub fn contains(&self, id: usize) -> bool { self.items.iter().any(|(i, _)| *i == id) }

  #[inline]
  pub fn len(&self) -> usize { self.items.len() }

  #[inline]
  pub fn is_empty(&self) -> bool { self.items.is_empty() }

  /// Drain all items in order.
  #[inline]
  pub fn drain(&mut self) -> impl Iterator<Item = Ob> + '_ {
    self.items.drain(..).map(|(_, item)| item)
  }

  #[inline]
  pub fn iter(&self) -> impl Iterator<Item = &Ob> { self.items.iter().map(|(_, item)| item) }
}

impl<Ob: Clone> Subscribers<Ob> {
  /// Copy out `(id, item)` pairs so callers can dispatch without holding a
  /// borrow of the container. Items are usually `Rc`s, so this is cheap.
  pub fn snapshot(&self) -> SmallVec<[(usize, Ob); 2]> { self.items.clone() }
}

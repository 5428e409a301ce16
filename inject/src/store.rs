//! An insertion-ordered map backing the object graph.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::iter::FusedIterator;

use generational_arena::{Arena, Index};

#[derive(Debug)]
struct Node<K> {
  // `None` only for the sentinel.
  key: Option<K>,
  prev: Index,
  next: Index,
}

/// A map that remembers the order in which keys were first inserted.
///
/// Nodes live in an arena and form a circular doubly-linked list anchored on a
/// sentinel node. When the list is empty the sentinel points at itself; otherwise
/// its `next` is the head and its `prev` is the tail. Two hash indices sit beside
/// the list: key to node for O(1) unlinking, and key to value for O(1) lookups.
///
/// Updating an existing key keeps its position. Removing a key and setting it
/// again appends it at the tail.
pub struct OrderedStore<K, V> {
  nodes: Arena<Node<K>>,
  sentinel: Index,
  positions: HashMap<K, Index>,
  values: HashMap<K, V>,
}

impl<K: Eq + Hash + Clone, V> OrderedStore<K, V> {
  pub fn new() -> Self {
    let mut nodes = Arena::new();
    let sentinel = nodes.insert_with(|idx| Node {
      key: None,
      prev: idx,
      next: idx,
    });
    Self {
      nodes,
      sentinel,
      positions: HashMap::new(),
      values: HashMap::new(),
    }
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  /// Sets `key` to `value`, returning the previous value if there was one.
  ///
  /// A new key is appended at the tail. An existing key keeps its position.
  pub fn set(&mut self, key: K, value: V) -> Option<V> {
    if let Some(slot) = self.values.get_mut(&key) {
      return Some(std::mem::replace(slot, value));
    }
    let tail = self.nodes[self.sentinel].prev;
    let sentinel = self.sentinel;
    let index = self.nodes.insert(Node {
      key: Some(key.clone()),
      prev: tail,
      next: sentinel,
    });
    self.nodes[tail].next = index;
    self.nodes[sentinel].prev = index;
    self.positions.insert(key.clone(), index);
    self.values.insert(key, value);
    None
  }

  pub fn get<Q>(&self, key: &Q) -> Option<&V>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    self.values.get(key)
  }

  pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    self.values.get_mut(key)
  }

  pub fn contains_key<Q>(&self, key: &Q) -> bool
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    self.values.contains_key(key)
  }

  /// Removes `key`, returning its value. Removing an absent key does nothing.
  pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    let value = self.values.remove(key)?;
    if let Some(index) = self.positions.remove(key) {
      self.unlink(index);
      self.nodes.remove(index);
    }
    Some(value)
  }

  pub fn clear(&mut self) {
    self.values.clear();
    for (_, index) in self.positions.drain() {
      self.nodes.remove(index);
    }
    let sentinel = self.sentinel;
    self.nodes[sentinel].prev = sentinel;
    self.nodes[sentinel].next = sentinel;
  }

  /// Iterates entries from the oldest to the newest insertion.
  pub fn iter(&self) -> Iter<'_, K, V> {
    let sentinel = &self.nodes[self.sentinel];
    Iter {
      store: self,
      front: sentinel.next,
      back: sentinel.prev,
      remaining: self.len(),
    }
  }

  /// Iterates entries from the newest to the oldest insertion.
  pub fn iter_rev(&self) -> std::iter::Rev<Iter<'_, K, V>> {
    self.iter().rev()
  }

  pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + '_ {
    self.iter().map(|(k, _)| k)
  }

  // Detaches a node from its neighbours without touching the arena or indices.
  fn unlink(&mut self, index: Index) {
    let (prev, next) = {
      let node = &self.nodes[index];
      (node.prev, node.next)
    };
    self.nodes[prev].next = next;
    self.nodes[next].prev = prev;
  }

  fn entry_at(&self, index: Index) -> (&K, &V) {
    let key = self.nodes[index]
      .key
      .as_ref()
      .expect("sentinel yielded as an entry");
    let value = self
      .values
      .get(key)
      .expect("linked key missing from the value index");
    (key, value)
  }
}

impl<K: Eq + Hash + Clone, V> Default for OrderedStore<K, V> {
  fn default() -> Self {
    Self::new()
  }
}

impl<K: Eq + Hash + Clone, V> FromIterator<(K, V)> for OrderedStore<K, V> {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    let mut store = Self::new();
    store.extend(iter);
    store
  }
}

impl<K: Eq + Hash + Clone, V> Extend<(K, V)> for OrderedStore<K, V> {
  fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
    for (key, value) in iter {
      self.set(key, value);
    }
  }
}

impl<K: Eq + Hash + Clone + fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedStore<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("OrderedStore")?;
    f.debug_map().entries(self.iter()).finish()
  }
}

impl<'a, K: Eq + Hash + Clone, V> IntoIterator for &'a OrderedStore<K, V> {
  type Item = (&'a K, &'a V);
  type IntoIter = Iter<'a, K, V>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

/// Ordered iterator over an [`OrderedStore`]. Each call to `iter` starts a
/// fresh traversal.
pub struct Iter<'a, K, V> {
  store: &'a OrderedStore<K, V>,
  front: Index,
  back: Index,
  remaining: usize,
}

impl<'a, K: Eq + Hash + Clone, V> Iterator for Iter<'a, K, V> {
  type Item = (&'a K, &'a V);

  fn next(&mut self) -> Option<Self::Item> {
    if self.remaining == 0 {
      return None;
    }
    let index = self.front;
    self.front = self.store.nodes[index].next;
    self.remaining -= 1;
    Some(self.store.entry_at(index))
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    (self.remaining, Some(self.remaining))
  }
}

impl<K: Eq + Hash + Clone, V> DoubleEndedIterator for Iter<'_, K, V> {
  fn next_back(&mut self) -> Option<Self::Item> {
    if self.remaining == 0 {
      return None;
    }
    let index = self.back;
    self.back = self.store.nodes[index].prev;
    self.remaining -= 1;
    Some(self.store.entry_at(index))
  }
}

impl<K: Eq + Hash + Clone, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K: Eq + Hash + Clone, V> FusedIterator for Iter<'_, K, V> {}

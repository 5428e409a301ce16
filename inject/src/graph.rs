//! The main `Graph` struct and its associated methods.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::builder::GraphBuilder;
use crate::component::Component;
use crate::core::{Entry, TypeInfo};
use crate::error::{GraphError, Result};
use crate::logger::Diagnostics;
use crate::registry::ImplementationRegistry;
use crate::render;
use crate::resolver::{Resolver, Store};

pub(crate) struct Settings {
  pub(crate) registry: Arc<ImplementationRegistry>,
  pub(crate) log: Diagnostics,
  pub(crate) slow_start_threshold: Duration,
}

/// A registry of named objects that wires their fields from each other.
///
/// Registration runs under the graph's write lock for the whole recursive
/// resolution, including any `start` hooks, so the graph is never observed
/// half-built. Lookups take the read lock.
pub struct Graph {
  store: RwLock<Store>,
  settings: Settings,
}

impl Default for Graph {
  fn default() -> Self {
    Self::new()
  }
}

impl Graph {
  /// Creates an empty graph that logs through `tracing` and owns a fresh
  /// implementation registry.
  pub fn new() -> Self {
    GraphBuilder::default().build()
  }

  pub fn builder() -> GraphBuilder {
    GraphBuilder::default()
  }

  pub(crate) fn from_settings(settings: Settings) -> Self {
    Self {
      store: RwLock::new(Store::new()),
      settings,
    }
  }

  /// The implementation registry this graph consults for contract fields.
  pub fn registry(&self) -> &Arc<ImplementationRegistry> {
    &self.settings.registry
  }

  // --- Registration ---

  fn register_with<C: Component>(
    &self,
    name: &str,
    value: Option<C>,
    singleton: bool,
    skip_fill: bool,
  ) -> Result<Arc<C>> {
    let mut store = self.store.write();
    Resolver::new(&mut store, &self.settings).register_component(name, value, singleton, skip_fill)
  }

  /// Registers a component and fills its injectable fields.
  ///
  /// `None` makes the graph allocate a default instance. A supplied instance
  /// keeps every field that already holds a value. An empty `name` falls back
  /// to the component's canonical type name.
  pub fn register<C: Component>(&self, name: &str, value: Option<C>) -> Result<Arc<C>> {
    self.register_with(name, value, false, false)
  }

  /// Like [`register`](Self::register), and also indexes the component under
  /// its canonical type name.
  pub fn register_single<C: Component>(&self, name: &str, value: Option<C>) -> Result<Arc<C>> {
    self.register_with(name, value, true, false)
  }

  /// Registers a supplied component without touching its fields. `None` is
  /// still allocated and filled.
  pub fn register_no_fill<C: Component>(&self, name: &str, value: Option<C>) -> Result<Arc<C>> {
    self.register_with(name, value, false, true)
  }

  pub fn register_single_no_fill<C: Component>(&self, name: &str, value: Option<C>) -> Result<Arc<C>> {
    self.register_with(name, value, true, true)
  }

  /// Registers a plain value, such as a number or a configuration struct.
  pub fn register_value<V: Any + Send + Sync>(&self, name: &str, value: V) -> Result<Arc<V>> {
    let mut store = self.store.write();
    Resolver::new(&mut store, &self.settings).register_value(name, value)
  }

  // --- Abort-on-error registration ---
  //
  // A graph that failed to build is never used: these log the error and abort.

  pub fn register_or_fail<C: Component>(&self, name: &str, value: Option<C>) -> Arc<C> {
    let result = self.register(name, value);
    self.or_fail(name, result)
  }

  pub fn register_single_or_fail<C: Component>(&self, name: &str, value: Option<C>) -> Arc<C> {
    let result = self.register_single(name, value);
    self.or_fail(name, result)
  }

  pub fn register_no_fill_or_fail<C: Component>(&self, name: &str, value: Option<C>) -> Arc<C> {
    let result = self.register_no_fill(name, value);
    self.or_fail(name, result)
  }

  pub fn register_single_no_fill_or_fail<C: Component>(&self, name: &str, value: Option<C>) -> Arc<C> {
    let result = self.register_single_no_fill(name, value);
    self.or_fail(name, result)
  }

  pub fn register_value_or_fail<V: Any + Send + Sync>(&self, name: &str, value: V) -> Arc<V> {
    let result = self.register_value(name, value);
    self.or_fail(name, result)
  }

  fn or_fail<T>(&self, name: &str, result: Result<T>) -> T {
    match result {
      Ok(value) => value,
      Err(err) => {
        self.settings.log.error(&format!("register failed: name={}, err={}", name, err));
        crate::error::abort(&err)
      }
    }
  }

  // --- Lookup ---

  pub fn find(&self, name: &str) -> Option<Arc<Entry>> {
    self.store.read().get(name).cloned()
  }

  /// Finds the entry indexed under a type's canonical name.
  pub fn find_by_type(&self, ty: &TypeInfo) -> Option<Arc<Entry>> {
    self.find(&ty.canonical_name())
  }

  /// Finds a singleton component by its type.
  pub fn find_component<C: Component>(&self) -> Option<Arc<C>> {
    self.find_by_type(&TypeInfo::component::<C>())?.downcast::<C>()
  }

  /// Finds `name` and returns it as `Arc<T>` if it has that concrete type.
  pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
    self.find(name)?.downcast::<T>()
  }

  /// Finds `name` and returns it as the contract `I`.
  ///
  /// Works for values registered as `Arc<I>` and for components whose type is
  /// declared as implementing `I` in the graph's registry.
  pub fn get_contract<I: ?Sized + Send + Sync + 'static>(&self, name: &str) -> Option<Arc<I>> {
    let entry = self.find(name)?;
    match entry.value().downcast_ref::<Arc<I>>() {
      Some(shared) => Some(Arc::clone(shared)),
      None => self.settings.registry.upcast::<I>(&entry),
    }
  }

  pub fn contains(&self, name: &str) -> bool {
    self.store.read().contains_key(name)
  }

  /// Number of keys in the graph. A singleton counts twice: once under its
  /// name and once under its type.
  pub fn len(&self) -> usize {
    self.store.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.store.read().is_empty()
  }

  /// Keys in registration order.
  pub fn keys(&self) -> Vec<String> {
    self.store.read().keys().cloned().collect()
  }

  // --- Introspection ---

  /// A flat JSON-like listing of every key and its object.
  pub fn render(&self) -> String {
    render::flat(&self.store.read())
  }

  /// The graph drawn as a tree of owners and their injected dependencies.
  pub fn render_tree(&self) -> String {
    render::tree(&self.store.read())
  }

  // --- Teardown ---

  /// Closes every object in reverse registration order and empties the graph.
  ///
  /// Each close hook runs at most once. Calling `close` again does nothing.
  pub fn close(&self) {
    let mut store = self.store.write();
    if store.is_empty() {
      return;
    }
    let log = &self.settings.log;
    log.info(&format!("close objects {}", render::flat(&store)));

    let keys: Vec<String> = store.keys().rev().cloned().collect();
    for key in &keys {
      let Some(entry) = store.get(key.as_str()) else {
        continue;
      };
      if entry.close() && log.is_debug_enabled() {
        log.debug(&format!("closed: {}", entry));
      }
    }
    for key in &keys {
      store.remove(key.as_str());
    }

    log.info("inject graph closed all");
  }
}

impl fmt::Display for Graph {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.render())
  }
}

impl fmt::Debug for Graph {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Graph")
      .field("keys", &self.keys())
      .field("slow_start_threshold", &self.settings.slow_start_threshold)
      .finish_non_exhaustive()
  }
}

/// Abort-on-error policy for any graph result.
///
/// ```no_run
/// use fibre_inject::{Graph, OrFail};
///
/// let graph = Graph::new();
/// let port = graph.register_value("port", 8080u16).or_fail();
/// assert_eq!(*port, 8080);
/// ```
pub trait OrFail<T> {
  /// Returns the value, or logs the error and aborts the process.
  fn or_fail(self) -> T;
}

impl<T> OrFail<T> for std::result::Result<T, GraphError> {
  fn or_fail(self) -> T {
    match self {
      Ok(value) => value,
      Err(err) => {
        tracing::error!(target: "fibre_inject", error = %err, "graph operation failed");
        crate::error::abort(&err)
      }
    }
  }
}

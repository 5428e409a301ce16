//! Contract name to implementation lookup, used when a field asks for a trait object.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::component::Component;
use crate::core::{Entry, TypeInfo};
use crate::resolver::{register_fresh, Registrar};

type ErasedUpcast = Arc<dyn Any + Send + Sync>;

// Stored type-erased in `TypeDescriptor::upcasts`, keyed by `TypeId::of::<I>()`.
struct Upcast<I: ?Sized> {
  cast: Box<dyn Fn(Arc<dyn Any + Send + Sync>) -> Option<Arc<I>> + Send + Sync>,
}

/// Describes a concrete type that may be offered for a contract.
#[derive(Clone)]
pub struct TypeDescriptor {
  info: TypeInfo,
  register: Option<Registrar>,
  upcasts: HashMap<TypeId, ErasedUpcast>,
}

impl TypeDescriptor {
  /// Describes a component type. Only component descriptors are accepted by
  /// [`ImplementationRegistry::add`].
  pub fn component<C: Component>() -> Self {
    Self {
      info: TypeInfo::component::<C>(),
      register: Some(register_fresh::<C> as Registrar),
      upcasts: HashMap::new(),
    }
  }

  /// Describes any other type.
  pub fn value<V: Any>() -> Self {
    Self {
      info: TypeInfo::value::<V>(),
      register: None,
      upcasts: HashMap::new(),
    }
  }

  /// Declares that the described component can stand in for `I`.
  ///
  /// ```
  /// use std::sync::Arc;
  /// use fibre_inject::{Component, TypeDescriptor};
  ///
  /// trait Storage: Send + Sync {}
  ///
  /// #[derive(Default)]
  /// struct DiskStorage;
  /// impl Storage for DiskStorage {}
  /// impl Component for DiskStorage {}
  ///
  /// let descriptor = TypeDescriptor::component::<DiskStorage>()
  ///   .implements::<DiskStorage, dyn Storage>(|disk| disk);
  /// assert!(descriptor.is_assignable_to::<dyn Storage>());
  /// ```
  pub fn implements<C, I>(mut self, cast: fn(Arc<C>) -> Arc<I>) -> Self
  where
    C: Component,
    I: ?Sized + Send + Sync + 'static,
  {
    if self.info.id() != TypeId::of::<C>() {
      tracing::debug!(
        target: "fibre_inject",
        descriptor = self.info.type_name(),
        cast_from = std::any::type_name::<C>(),
        "ignoring upcast declared for a different type"
      );
      return self;
    }
    let upcast = Upcast::<I> {
      cast: Box::new(move |value: Arc<dyn Any + Send + Sync>| value.downcast::<C>().ok().map(cast)),
    };
    self.upcasts.insert(TypeId::of::<I>(), Arc::new(upcast));
    self
  }

  pub fn type_info(&self) -> TypeInfo {
    self.info
  }

  /// Whether an instance of the described type can fill an `Arc<I>` field.
  pub fn is_assignable_to<I: ?Sized + 'static>(&self) -> bool {
    self.upcasts.contains_key(&TypeId::of::<I>())
  }

  pub(crate) fn is_assignable_to_id(&self, contract: TypeId) -> bool {
    self.upcasts.contains_key(&contract)
  }

  pub(crate) fn registrar(&self) -> Option<Registrar> {
    self.register
  }

  fn upcast<I: ?Sized + 'static>(&self, value: &Arc<dyn Any + Send + Sync>) -> Option<Arc<I>> {
    let erased = self.upcasts.get(&TypeId::of::<I>())?;
    let upcast = erased.downcast_ref::<Upcast<I>>()?;
    (upcast.cast)(Arc::clone(value))
  }
}

impl fmt::Debug for TypeDescriptor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TypeDescriptor")
      .field("type", &self.info.canonical_name())
      .field("contracts", &self.upcasts.len())
      .finish()
  }
}

impl fmt::Display for TypeDescriptor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(&self.info, f)
  }
}

/// A thread-safe table from contract names to candidate implementations.
///
/// Candidates are kept in insertion order and duplicates are allowed; when a
/// graph needs an implementation it takes the first candidate assignable to
/// the field. A registry is shared by `Arc` between the graphs that use it.
#[derive(Default)]
pub struct ImplementationRegistry {
  contracts: RwLock<HashMap<String, Vec<TypeDescriptor>>>,
}

impl ImplementationRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Appends `descriptor` to the candidates for `contract`.
  ///
  /// Descriptors that are not components, and empty contract names, are ignored.
  pub fn add(&self, contract: &str, descriptor: TypeDescriptor) {
    if contract.is_empty() || !descriptor.info.is_component() {
      tracing::debug!(
        target: "fibre_inject",
        contract,
        descriptor = %descriptor,
        "implementation rejected: only components can be registered"
      );
      return;
    }

    let mut contracts = self.contracts.write();
    let candidates = contracts.entry(contract.to_string()).or_default();
    if !candidates.is_empty() {
      tracing::info!(
        target: "fibre_inject",
        contract,
        descriptor = %descriptor,
        index = candidates.len(),
        existing = ?candidates,
        "appending another implementation"
      );
    }
    candidates.push(descriptor);
  }

  /// Shorthand for adding a component that implements `I`.
  pub fn add_component<C, I>(&self, contract: &str, cast: fn(Arc<C>) -> Arc<I>)
  where
    C: Component,
    I: ?Sized + Send + Sync + 'static,
  {
    self.add(contract, TypeDescriptor::component::<C>().implements(cast));
  }

  /// A copy of the candidates for `contract`, oldest first.
  pub fn get(&self, contract: &str) -> Vec<TypeDescriptor> {
    if contract.is_empty() {
      return Vec::new();
    }
    self
      .contracts
      .read()
      .get(contract)
      .cloned()
      .unwrap_or_default()
  }

  /// A snapshot of every contract and its candidates.
  pub fn get_all(&self) -> HashMap<String, Vec<TypeDescriptor>> {
    self
      .contracts
      .read()
      .iter()
      .filter(|(_, candidates)| !candidates.is_empty())
      .map(|(name, candidates)| (name.clone(), candidates.clone()))
      .collect()
  }

  /// Converts a stored component into `Arc<I>` using any descriptor that
  /// describes the entry's concrete type and declares `I`.
  pub fn upcast<I: ?Sized + 'static>(&self, entry: &Entry) -> Option<Arc<I>> {
    let concrete = entry.type_info().id();
    let contracts = self.contracts.read();
    contracts
      .values()
      .flatten()
      .filter(|descriptor| descriptor.info.id() == concrete)
      .find_map(|descriptor| descriptor.upcast::<I>(entry.value()))
  }
}

impl fmt::Debug for ImplementationRegistry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_map().entries(self.contracts.read().iter()).finish()
  }
}

//! Type descriptions, lifecycle capabilities and the graph's stored entries.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::coerce;
use crate::component::Component;

/// Broad classification of a registered or declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
  /// A wirable type implementing [`Component`]. Shared as `Arc<C>`.
  Component,
  /// An abstract contract, i.e. a trait object type.
  Contract,
  /// A primitive integer.
  Integer,
  /// A primitive float.
  Float,
  /// Any other concrete value.
  Value,
}

/// Runtime identity of a type plus the name the graph uses for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeInfo {
  id: TypeId,
  type_name: &'static str,
  kind: TypeKind,
}

impl TypeInfo {
  pub fn component<C: Component>() -> Self {
    Self {
      id: TypeId::of::<C>(),
      type_name: type_name::<C>(),
      kind: TypeKind::Component,
    }
  }

  pub fn contract<I: ?Sized + 'static>() -> Self {
    Self {
      id: TypeId::of::<I>(),
      type_name: type_name::<I>(),
      kind: TypeKind::Contract,
    }
  }

  pub fn value<V: Any>() -> Self {
    let id = TypeId::of::<V>();
    let kind = if coerce::is_integer(id) {
      TypeKind::Integer
    } else if coerce::is_float(id) {
      TypeKind::Float
    } else {
      TypeKind::Value
    };
    Self {
      id,
      type_name: type_name::<V>(),
      kind,
    }
  }

  pub fn id(&self) -> TypeId {
    self.id
  }

  pub fn type_name(&self) -> &'static str {
    self.type_name
  }

  pub fn kind(&self) -> TypeKind {
    self.kind
  }

  pub fn is_component(&self) -> bool {
    self.kind == TypeKind::Component
  }

  /// The key a type is looked up under when no explicit name is given.
  ///
  /// Components are shared behind a pointer, so their name carries a `*` prefix.
  pub fn canonical_name(&self) -> String {
    match self.kind {
      TypeKind::Component => format!("*{}", self.type_name),
      _ => self.type_name.to_string(),
    }
  }
}

impl fmt::Display for TypeInfo {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.kind {
      TypeKind::Component => write!(f, "*{}", self.type_name),
      _ => f.write_str(self.type_name),
    }
  }
}

/// Which lifecycle hooks a component takes part in.
///
/// Declared once per type and captured when the component is registered, so the
/// graph never has to probe a value for its capabilities again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
  #[default]
  Plain,
  Startable,
  Closeable,
  Both,
}

impl Lifecycle {
  pub fn starts(self) -> bool {
    matches!(self, Lifecycle::Startable | Lifecycle::Both)
  }

  pub fn closes(self) -> bool {
    matches!(self, Lifecycle::Closeable | Lifecycle::Both)
  }
}

pub(crate) type CloseHook = fn(&(dyn Any + Send + Sync));

pub(crate) fn close_hook<C: Component>(value: &(dyn Any + Send + Sync)) {
  if let Some(component) = value.downcast_ref::<C>() {
    component.close();
  }
}

/// One object owned by a graph.
pub struct Entry {
  name: String,
  ty: TypeInfo,
  value: Arc<dyn Any + Send + Sync>,
  lifecycle: Lifecycle,
  close_hook: Option<CloseHook>,
  dependencies: Vec<String>,
  closed: AtomicBool,
}

impl Entry {
  pub(crate) fn new(
    name: String,
    ty: TypeInfo,
    value: Arc<dyn Any + Send + Sync>,
    lifecycle: Lifecycle,
    close_hook: Option<CloseHook>,
    dependencies: Vec<String>,
  ) -> Self {
    Self {
      name,
      ty,
      value,
      lifecycle,
      close_hook,
      dependencies,
      closed: AtomicBool::new(false),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn type_info(&self) -> TypeInfo {
    self.ty
  }

  pub fn value(&self) -> &Arc<dyn Any + Send + Sync> {
    &self.value
  }

  /// Returns the stored object as `Arc<T>` if it has that concrete type.
  pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
    Arc::clone(&self.value).downcast::<T>().ok()
  }

  pub fn lifecycle(&self) -> Lifecycle {
    self.lifecycle
  }

  /// Lookup keys of the injectable fields, in declaration order.
  pub fn dependencies(&self) -> &[String] {
    &self.dependencies
  }

  pub fn is_closed(&self) -> bool {
    self.closed.load(Ordering::Acquire)
  }

  /// Runs the close hook unless it already ran. Returns whether it ran now.
  pub(crate) fn close(&self) -> bool {
    if !self.lifecycle.closes() {
      return false;
    }
    let Some(hook) = self.close_hook else {
      return false;
    };
    if self.closed.swap(true, Ordering::AcqRel) {
      return false;
    }
    hook(&*self.value);
    true
  }

  /// The address of the stored object, used when rendering the graph.
  pub(crate) fn address(&self) -> *const () {
    Arc::as_ptr(&self.value) as *const ()
  }
}

// Only components are shared by pointer, so only they render an address.
impl fmt::Display for Entry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.ty.is_component() {
      write!(
        f,
        r#"{{"name":"{}","type":"{}","value":"{:p}"}}"#,
        self.name,
        self.ty,
        self.address()
      )
    } else {
      write!(f, r#"{{"name":"{}","type":"{}"}}"#, self.name, self.ty)
    }
  }
}

impl fmt::Debug for Entry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Entry")
      .field("name", &self.name)
      .field("type", &self.ty.canonical_name())
      .field("lifecycle", &self.lifecycle)
      .field("closed", &self.is_closed())
      .finish_non_exhaustive()
  }
}

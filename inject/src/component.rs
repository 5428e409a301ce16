//! The metadata a type provides to become wirable.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::coerce;
use crate::core::{Entry, Lifecycle, TypeInfo};
use crate::error::{BoxError, GraphError, Result};
use crate::registry::ImplementationRegistry;
use crate::resolver::{register_fresh, Registrar};
use crate::tag::Markers;

/// A type the graph can allocate, fill and manage.
///
/// `fields` is the explicit injection table for the type: one [`Field`] per
/// slot the graph may write, with its markers. The graph allocates missing
/// instances through `Default`.
///
/// ```
/// use std::sync::Arc;
/// use fibre_inject::{Component, Field, Graph};
///
/// #[derive(Default)]
/// struct Pool {
///   size: i64,
/// }
///
/// impl Component for Pool {
///   fn fields() -> Vec<Field<Self>> {
///     vec![Field::value("size", |p: &mut Pool| &mut p.size).inject("pool_size")]
///   }
/// }
///
/// #[derive(Default)]
/// struct Repo {
///   pool: Option<Arc<Pool>>,
/// }
///
/// impl Component for Repo {
///   fn fields() -> Vec<Field<Self>> {
///     vec![Field::component("pool", |r: &mut Repo| &mut r.pool).by_type()]
///   }
/// }
///
/// let graph = Graph::new();
/// graph.register_value("pool_size", 8i32).unwrap();
/// let repo = graph.register::<Repo>("repo", None).unwrap();
/// assert_eq!(repo.pool.as_ref().unwrap().size, 8);
/// ```
pub trait Component: Default + Send + Sync + 'static {
  /// The injection table for this type. Fields not listed are never touched.
  fn fields() -> Vec<Field<Self>> {
    Vec::new()
  }

  /// Which of `start` and `close` the graph should call.
  fn lifecycle() -> Lifecycle {
    Lifecycle::Plain
  }

  /// Called once after every field is filled, before the object is shared.
  fn start(&mut self) -> std::result::Result<(), BoxError> {
    Ok(())
  }

  /// Called once when the owning graph is closed.
  fn close(&self) {}
}

type ZeroCheck<T> = Box<dyn Fn(&mut T) -> bool>;
type Assign<T> = Box<dyn Fn(&mut T, &Entry, &ImplementationRegistry) -> bool>;

pub(crate) enum Target<T> {
  /// An embedded part of the owner; there is nothing the graph can write.
  Embedded,
  Slot {
    declared: TypeInfo,
    register: Option<Registrar>,
    is_zero: ZeroCheck<T>,
    assign: Assign<T>,
  },
}

/// One row of a component's injection table.
pub struct Field<T> {
  name: &'static str,
  markers: Markers,
  tag: Option<&'static str>,
  pub(crate) target: Target<T>,
}

impl<T: 'static> Field<T> {
  /// A field holding another component, declared as `Option<Arc<C>>`.
  ///
  /// When nothing satisfies it the graph allocates and registers a fresh `C`.
  pub fn component<C: Component>(name: &'static str, access: fn(&mut T) -> &mut Option<Arc<C>>) -> Self {
    Self::slot(
      name,
      TypeInfo::component::<C>(),
      Some(register_fresh::<C> as Registrar),
      Box::new(move |owner: &mut T| access(owner).is_none()),
      Box::new(move |owner: &mut T, entry: &Entry, _: &ImplementationRegistry| {
        match entry.downcast::<C>() {
          Some(found) => {
            *access(owner) = Some(found);
            true
          }
          None => false,
        }
      }),
    )
  }

  /// A field holding an abstract contract, declared as `Option<Arc<dyn I>>`.
  ///
  /// When nothing satisfies it the graph asks the implementation registry for
  /// the first type registered under the field's key that implements `I`.
  pub fn contract<I>(name: &'static str, access: fn(&mut T) -> &mut Option<Arc<I>>) -> Self
  where
    I: ?Sized + Send + Sync + 'static,
  {
    Self::slot(
      name,
      TypeInfo::contract::<I>(),
      None,
      Box::new(move |owner: &mut T| access(owner).is_none()),
      Box::new(move |owner: &mut T, entry: &Entry, registry: &ImplementationRegistry| {
        let found = match entry.value().downcast_ref::<Arc<I>>() {
          Some(shared) => Some(Arc::clone(shared)),
          None => registry.upcast::<I>(entry),
        };
        match found {
          Some(found) => {
            *access(owner) = Some(found);
            true
          }
          None => false,
        }
      }),
    )
  }

  /// A field holding a plain value. Its default value counts as "unset".
  ///
  /// Integer fields accept any registered integer type and float fields any
  /// float type.
  pub fn value<V>(name: &'static str, access: fn(&mut T) -> &mut V) -> Self
  where
    V: Any + Clone + Default + PartialEq + Send + Sync,
  {
    Self::slot(
      name,
      TypeInfo::value::<V>(),
      None,
      Box::new(move |owner: &mut T| *access(owner) == V::default()),
      Box::new(move |owner: &mut T, entry: &Entry, _: &ImplementationRegistry| {
        let raw: &dyn Any = &**entry.value();
        let found = match raw.downcast_ref::<V>() {
          Some(exact) => Some(exact.clone()),
          None => coerce::coerce::<V>(raw),
        };
        match found {
          Some(found) => {
            *access(owner) = found;
            true
          }
          None => false,
        }
      }),
    )
  }

  /// An embedded part of the owner. It may be listed for documentation, but
  /// marking it injectable is an error.
  pub fn embedded(name: &'static str) -> Self {
    Self {
      name,
      markers: Markers::default(),
      tag: None,
      target: Target::Embedded,
    }
  }

  fn slot(
    name: &'static str,
    declared: TypeInfo,
    register: Option<Registrar>,
    is_zero: ZeroCheck<T>,
    assign: Assign<T>,
  ) -> Self {
    Self {
      name,
      markers: Markers::default(),
      tag: None,
      target: Target::Slot {
        declared,
        register,
        is_zero,
        assign,
      },
    }
  }

  /// Resolve this field by `key` first.
  pub fn inject(mut self, key: impl Into<String>) -> Self {
    self.markers.inject = Some(key.into());
    self
  }

  /// Resolve this field by its declared type.
  pub fn by_type(self) -> Self {
    self.inject("")
  }

  /// On a miss by key, also look the field's type up, and register any
  /// dependency created for it as a singleton.
  pub fn singleton(mut self) -> Self {
    self.markers.singleton = true;
    self
  }

  /// Leave the field unset instead of failing when nothing resolves it.
  pub fn nilable(mut self) -> Self {
    self.markers.nilable = true;
    self
  }

  /// Sets markers from a tag string such as `inject:"db" singleton:"true"`.
  ///
  /// The string is parsed when the owner is registered.
  pub fn tag(mut self, tag: &'static str) -> Self {
    self.tag = Some(tag);
    self
  }

  pub fn name(&self) -> &'static str {
    self.name
  }

  /// The markers the graph will act on: those set by the builder methods, with
  /// any tag string layered on top.
  pub fn markers(&self) -> Result<Markers> {
    match self.tag {
      None => Ok(self.markers.clone()),
      Some(tag) => self
        .markers
        .clone()
        .merge_tag(tag)
        .map_err(|reason| GraphError::MalformedTag {
          field: self.name,
          reason,
        }),
    }
  }
}

impl<T> fmt::Debug for Field<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let declared = match &self.target {
      Target::Embedded => None,
      Target::Slot { declared, .. } => Some(declared),
    };
    f.debug_struct("Field")
      .field("name", &self.name)
      .field("markers", &self.markers)
      .field("tag", &self.tag)
      .field("declared", &declared)
      .finish()
  }
}

//! The recursive registration algorithm.
//!
//! A [`Resolver`] borrows a graph's store mutably, so it only exists while the
//! graph's write lock is held. It has no lock of its own.

use std::any::{type_name, Any};
use std::sync::Arc;
use std::time::Instant;

use crate::component::{Component, Target};
use crate::core::{close_hook, Entry, TypeInfo, TypeKind};
use crate::error::{GraphError, Result};
use crate::graph::Settings;
use crate::store::OrderedStore;

/// Registers a freshly allocated instance of some component type under a name,
/// with the given singleton and skip-fill flags.
pub(crate) type Registrar = fn(&mut Resolver<'_>, &str, bool, bool) -> Result<()>;

pub(crate) type Store = OrderedStore<String, Arc<Entry>>;

pub(crate) fn register_fresh<C: Component>(
  resolver: &mut Resolver<'_>,
  name: &str,
  singleton: bool,
  skip_fill: bool,
) -> Result<()> {
  resolver
    .register_component::<C>(name, None, singleton, skip_fill)
    .map(|_| ())
}

pub(crate) struct Resolver<'g> {
  store: &'g mut Store,
  settings: &'g Settings,
  // Names currently being built, outermost first.
  resolving: Vec<String>,
}

impl<'g> Resolver<'g> {
  pub(crate) fn new(store: &'g mut Store, settings: &'g Settings) -> Self {
    Self {
      store,
      settings,
      resolving: Vec::new(),
    }
  }

  fn find(&self, name: &str) -> Option<Arc<Entry>> {
    self.store.get(name).cloned()
  }

  fn find_by_type(&self, ty: &TypeInfo) -> Option<Arc<Entry>> {
    self.find(&ty.canonical_name())
  }

  // Explicit key first; by type when the key is empty, or as a fallback for
  // singleton-preferring component fields.
  fn lookup(&self, key: &str, declared: &TypeInfo, singleton: bool) -> Option<Arc<Entry>> {
    if key.is_empty() {
      return self.find_by_type(declared);
    }
    self.find(key).or_else(|| {
      if singleton && declared.is_component() {
        self.find_by_type(declared)
      } else {
        None
      }
    })
  }

  fn ensure_vacant(&self, name: &str, ty: &TypeInfo) -> Result<()> {
    match self.find(name) {
      Some(found) => Err(GraphError::DuplicateRegistration {
        name: name.to_string(),
        type_name: ty.type_name(),
        found: found.to_string(),
      }),
      None => Ok(()),
    }
  }

  // A singleton may take over the type key from another singleton's alias, but
  // never from an object registered under that key as its own name.
  fn ensure_type_key_free(&self, name: &str, ty: &TypeInfo) -> Result<()> {
    let key = ty.canonical_name();
    if key == name {
      return Ok(());
    }
    match self.find(&key) {
      Some(found) if found.name() == key => Err(GraphError::DuplicateRegistration {
        name: key,
        type_name: ty.type_name(),
        found: found.to_string(),
      }),
      _ => Ok(()),
    }
  }

  /// Registers a component, allocating it when `value` is `None`.
  ///
  /// Fields are filled when the instance was allocated here, or when
  /// `skip_fill` is false.
  pub(crate) fn register_component<C: Component>(
    &mut self,
    name: &str,
    value: Option<C>,
    singleton: bool,
    skip_fill: bool,
  ) -> Result<Arc<C>> {
    let ty = TypeInfo::component::<C>();
    let name = if name.is_empty() {
      ty.canonical_name()
    } else {
      name.to_string()
    };
    self.ensure_vacant(&name, &ty)?;
    if singleton {
      self.ensure_type_key_free(&name, &ty)?;
    }

    if self.resolving.contains(&name) {
      let mut path = self.resolving.clone();
      path.push(name);
      return Err(GraphError::CircularDependency { path });
    }

    let allocated = value.is_none();
    let mut object = value.unwrap_or_default();

    if allocated || !skip_fill {
      self.resolving.push(name.clone());
      let filled = self.fill(&name, &mut object, skip_fill);
      self.resolving.pop();
      filled?;
      // Filling may have registered more objects.
      if singleton {
        self.ensure_type_key_free(&name, &ty)?;
      }
    }

    let lifecycle = C::lifecycle();
    if lifecycle.starts() {
      let started = Instant::now();
      let result = object.start();
      let elapsed = started.elapsed();
      if elapsed > self.settings.slow_start_threshold {
        self.settings.log.warn(&format!(
          "object start took too long: name={}, elapsed={:?}, failed={}",
          name,
          elapsed,
          result.is_err()
        ));
      }
      result.map_err(|source| GraphError::Startup {
        name: name.clone(),
        source,
      })?;
    }

    let shared = Arc::new(object);
    let value: Arc<dyn Any + Send + Sync> = Arc::clone(&shared) as Arc<dyn Any + Send + Sync>;
    let entry = Entry::new(
      name,
      ty,
      value,
      lifecycle,
      Some(close_hook::<C>),
      dependency_keys::<C>(),
    );
    self.commit(entry, singleton);
    Ok(shared)
  }

  /// Registers a plain value. Values are never filled and need a name.
  pub(crate) fn register_value<V: Any + Send + Sync>(&mut self, name: &str, value: V) -> Result<Arc<V>> {
    let ty = TypeInfo::value::<V>();
    if name.is_empty() {
      return Err(GraphError::Naming {
        type_name: ty.type_name(),
      });
    }
    self.ensure_vacant(name, &ty)?;

    let shared = Arc::new(value);
    let value: Arc<dyn Any + Send + Sync> = Arc::clone(&shared) as Arc<dyn Any + Send + Sync>;
    let entry = Entry::new(name.to_string(), ty, value, Default::default(), None, Vec::new());
    self.commit(entry, false);
    Ok(shared)
  }

  fn fill<C: Component>(&mut self, owner: &str, object: &mut C, skip_fill: bool) -> Result<()> {
    for field in C::fields() {
      let markers = field.markers()?;
      let Some(key) = markers.inject.as_deref() else {
        continue;
      };

      let (declared, register, is_zero, assign) = match &field.target {
        Target::Embedded => {
          return Err(GraphError::UnsettableField {
            field: field.name(),
            owner: type_name::<C>(),
          })
        }
        Target::Slot {
          declared,
          register,
          is_zero,
          assign,
        } => (declared, register, is_zero, assign),
      };

      // Manual wiring wins.
      if !is_zero(object) {
        continue;
      }

      let mut found = self.lookup(key, declared, markers.singleton);
      if found.is_none() {
        if markers.nilable {
          continue;
        }

        let registrar = match register {
          Some(register) => *register,
          None => self
            .settings
            .registry
            .get(key)
            .into_iter()
            .find(|candidate| candidate.is_assignable_to_id(declared.id()))
            .and_then(|candidate| candidate.registrar())
            .ok_or_else(|| GraphError::MissingDependency {
              field: field.name(),
              key: key.to_string(),
              owner: owner.to_string(),
              owner_type: type_name::<C>(),
            })?,
        };
        registrar(self, key, markers.singleton, skip_fill)?;

        found = self.lookup(key, declared, markers.singleton);
      }

      let Some(found) = found else {
        return Err(GraphError::InternalConsistency {
          field: field.name(),
          owner: owner.to_string(),
        });
      };

      if !assign(object, &found, &self.settings.registry) {
        return Err(GraphError::TypeMismatch {
          field: field.name(),
          expected: declared.type_name(),
          found: found.type_info().type_name(),
          owner: owner.to_string(),
        });
      }
    }
    Ok(())
  }

  fn commit(&mut self, entry: Entry, singleton: bool) {
    let entry = Arc::new(entry);
    let ty = entry.type_info();
    let name = entry.name().to_string();

    if self.settings.log.is_debug_enabled() {
      self.settings.log.debug(&format!("registered: {}", entry));
    }

    self.store.set(name, Arc::clone(&entry));
    if singleton && ty.kind() == TypeKind::Component {
      self.store.set(ty.canonical_name(), entry);
    }
  }
}

// Lookup keys of every injectable field, used to draw the dependency tree.
fn dependency_keys<C: Component>() -> Vec<String> {
  C::fields()
    .iter()
    .filter_map(|field| {
      let markers = field.markers().ok()?;
      let key = markers.inject?;
      match &field.target {
        Target::Embedded => None,
        Target::Slot { declared, .. } if key.is_empty() => Some(declared.canonical_name()),
        Target::Slot { .. } => Some(key),
      }
    })
    .collect()
}

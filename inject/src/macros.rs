//! Public macros for ergonomic lookups.

/// Looks an object up in a graph, returning an `Option`.
///
/// ```
/// use fibre_inject::{maybe_resolve_from, Graph};
///
/// let graph = Graph::new();
/// graph.register_value("answer", 42u32).unwrap();
///
/// assert_eq!(maybe_resolve_from!(&graph, u32, "answer").map(|v| *v), Some(42));
/// assert!(maybe_resolve_from!(&graph, u32, "missing").is_none());
/// ```
#[macro_export]
macro_rules! maybe_resolve_from {
  // A trait object by name: maybe_resolve_from!(graph, trait MyTrait, "name")
  ($graph:expr, trait $trait_ident:ident, $name:expr) => {
    $graph.get_contract::<dyn $trait_ident>($name)
  };

  // A singleton component by type: maybe_resolve_from!(graph, MyComponent)
  ($graph:expr, $type:ty) => {
    $graph.find_component::<$type>()
  };

  // Any object by name: maybe_resolve_from!(graph, MyType, "name")
  ($graph:expr, $type:ty, $name:expr) => {
    $graph.get::<$type>($name)
  };
}

/// Looks an object up in a graph, panicking if it is missing.
///
/// # Panics
///
/// Panics if nothing of the requested type is registered under the key. Use
/// [`maybe_resolve_from!`] for a non-panicking version.
#[macro_export]
macro_rules! resolve_from {
  ($graph:expr, trait $trait_ident:ident, $name:expr) => {
    $crate::maybe_resolve_from!($graph, trait $trait_ident, $name).unwrap_or_else(|| {
      panic!(
        "Failed to resolve required contract with name '{}': {}",
        $name,
        std::any::type_name::<dyn $trait_ident>()
      )
    })
  };

  ($graph:expr, $type:ty) => {
    $crate::maybe_resolve_from!($graph, $type).unwrap_or_else(|| {
      panic!(
        "Failed to resolve required component: {}",
        std::any::type_name::<$type>()
      )
    })
  };

  ($graph:expr, $type:ty, $name:expr) => {
    $crate::maybe_resolve_from!($graph, $type, $name).unwrap_or_else(|| {
      panic!(
        "Failed to resolve required object with name '{}': {}",
        $name,
        std::any::type_name::<$type>()
      )
    })
  };
}

/// Looks an object up in the global graph, returning an `Option`.
#[macro_export]
macro_rules! maybe_resolve {
  (trait $trait_ident:ident, $name:expr) => {
    $crate::maybe_resolve_from!($crate::global(), trait $trait_ident, $name)
  };
  ($type:ty) => {
    $crate::maybe_resolve_from!($crate::global(), $type)
  };
  ($type:ty, $name:expr) => {
    $crate::maybe_resolve_from!($crate::global(), $type, $name)
  };
}

/// Looks an object up in the global graph, panicking if it is missing.
///
/// # Panics
///
/// Panics if the object cannot be found. For a non-panicking version, use
/// [`maybe_resolve!`].
///
/// # Examples
///
/// ```
/// use fibre_inject::{global, resolve};
///
/// global().register_value("motd", String::from("hello")).unwrap();
/// let message = resolve!(String, "motd");
/// assert_eq!(*message, "hello");
/// ```
#[macro_export]
macro_rules! resolve {
  (trait $trait_ident:ident, $name:expr) => {
    $crate::resolve_from!($crate::global(), trait $trait_ident, $name)
  };
  ($type:ty) => {
    $crate::resolve_from!($crate::global(), $type)
  };
  ($type:ty, $name:expr) => {
    $crate::resolve_from!($crate::global(), $type, $name)
  };
}

use thiserror::Error;

/// Error type produced by user supplied lifecycle hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Everything that can go wrong while registering into a [`Graph`](crate::Graph).
#[derive(Debug, Error)]
pub enum GraphError {
  /// A plain value was registered without a name. Only components can fall back
  /// to their canonical type name.
  #[error("name can not be empty for a value of type {type_name}")]
  Naming { type_name: &'static str },

  /// The name already holds an entry.
  #[error("already registered: name={name}, type={type_name}, found={found}")]
  DuplicateRegistration {
    name: String,
    type_name: &'static str,
    found: String,
  },

  /// An injection marker was placed on a field the graph cannot write to.
  #[error("inject marker must be on a settable field: field={field}, owner={owner}")]
  UnsettableField {
    field: &'static str,
    owner: &'static str,
  },

  /// Nothing in the graph or the implementation registry satisfies the field.
  #[error("dependency field={field}, key={key} not found in object {owner}:{owner_type}")]
  MissingDependency {
    field: &'static str,
    key: String,
    owner: String,
    owner_type: &'static str,
  },

  /// The resolved value cannot be assigned to the field, even after numeric coercion.
  #[error("dependency field={field}, type={expected} not valid in object {owner}: found {found}")]
  TypeMismatch {
    field: &'static str,
    expected: &'static str,
    found: &'static str,
    owner: String,
  },

  /// The component's `start` hook returned an error.
  #[error("start object failed: name={name}")]
  Startup {
    name: String,
    #[source]
    source: BoxError,
  },

  /// A dependency was registered recursively but could not be found right after.
  #[error("dependency {field} of {owner} missing right after it was registered")]
  InternalConsistency { field: &'static str, owner: String },

  /// A field's tag string could not be parsed.
  #[error("malformed tag on field {field}: {reason}")]
  MalformedTag { field: &'static str, reason: String },

  /// Resolving a name required resolving that same name again.
  #[error("circular dependency: {}", path.join(" -> "))]
  CircularDependency { path: Vec<String> },
}

/// A specialized `Result` type for graph operations.
pub type Result<T, E = GraphError> = std::result::Result<T, E>;

// Ends the process after a registration failure. A partially built graph is
// never handed back to the caller.
pub(crate) fn abort(err: &GraphError) -> ! {
  eprintln!("fibre_inject: aborting after graph failure: {}", err);
  std::process::abort()
}

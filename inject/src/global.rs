//! The process-wide default graph and access functions.

use crate::graph::Graph;
use once_cell::sync::Lazy;

// Created on first access, logging through `tracing`, with its own registry.
static GLOBAL_GRAPH: Lazy<Graph> = Lazy::new(Graph::new);

/// Provides a reference to the process-wide default graph.
///
/// Useful for applications that build one object graph at startup and close it
/// at shutdown. Libraries and tests should prefer their own [`Graph`].
///
/// # Examples
///
/// ```
/// use fibre_inject::global;
///
/// global().register_value("greeting", String::from("Hello from global!")).unwrap();
/// assert_eq!(*global().get::<String>("greeting").unwrap(), "Hello from global!");
/// ```
pub fn global() -> &'static Graph {
  &GLOBAL_GRAPH
}

//! Tests for the lookup macros:
//! - `maybe_resolve_from!` / `resolve_from!` against an explicit graph
//! - `maybe_resolve!` / `resolve!` against the global graph

use fibre_inject::{global, maybe_resolve, maybe_resolve_from, resolve, resolve_from, Component, Field, Graph};
use serial_test::serial;
use std::sync::Arc;

// --- Test Fixtures ---

trait Greeter: Send + Sync {
  fn greet(&self) -> String;
}

#[derive(Default)]
struct EnglishGreeter;
impl Greeter for EnglishGreeter {
  fn greet(&self) -> String {
    "Hello!".to_string()
  }
}

#[derive(Default)]
struct MacroTestService {
  value: i64,
}

impl Component for MacroTestService {
  fn fields() -> Vec<Field<Self>> {
    vec![Field::value("value", |s: &mut MacroTestService| &mut s.value).inject("macro_value")]
  }
}

#[derive(Default)]
struct Unregistered;
impl Component for Unregistered {}

fn populated_graph() -> Graph {
  let graph = Graph::new();
  graph.register_value("macro_value", 11i32).unwrap();
  graph.register_single::<MacroTestService>("service", None).unwrap();
  graph
    .register_value("greeter", Arc::new(EnglishGreeter) as Arc<dyn Greeter>)
    .unwrap();
  graph
}

// --- Explicit Graph Tests ---

#[test]
fn test_maybe_resolve_from_finds_registered_objects() {
  // Arrange
  let graph = populated_graph();

  // Act
  let by_type = maybe_resolve_from!(&graph, MacroTestService);
  let by_name = maybe_resolve_from!(&graph, MacroTestService, "service");
  let greeter = maybe_resolve_from!(&graph, trait Greeter, "greeter");

  // Assert
  assert_eq!(by_type.unwrap().value, 11);
  assert_eq!(by_name.unwrap().value, 11);
  assert_eq!(greeter.unwrap().greet(), "Hello!");
}

#[test]
fn test_maybe_resolve_from_returns_none_when_missing() {
  let graph = populated_graph();

  assert!(maybe_resolve_from!(&graph, Unregistered).is_none());
  assert!(maybe_resolve_from!(&graph, MacroTestService, "missing").is_none());
  // Present, but of another type.
  assert!(maybe_resolve_from!(&graph, String, "service").is_none());
  assert!(maybe_resolve_from!(&graph, trait Greeter, "service").is_none());
}

#[test]
fn test_resolve_from_returns_the_shared_instance() {
  // Arrange
  let graph = populated_graph();

  // Act
  let first = resolve_from!(&graph, MacroTestService);
  let second = resolve_from!(&graph, MacroTestService, "service");

  // Assert
  assert!(Arc::ptr_eq(&first, &second));
  assert_eq!(resolve_from!(&graph, trait Greeter, "greeter").greet(), "Hello!");
}

#[test]
#[should_panic(expected = "Failed to resolve required component")]
fn test_resolve_from_panics_on_missing_type() {
  let graph = Graph::new();
  let _ = resolve_from!(&graph, Unregistered);
}

#[test]
#[should_panic(expected = "Failed to resolve required object with name 'missing'")]
fn test_resolve_from_panics_on_missing_name() {
  let graph = Graph::new();
  let _ = resolve_from!(&graph, u32, "missing");
}

#[test]
#[should_panic(expected = "Failed to resolve required contract with name 'missing'")]
fn test_resolve_from_panics_on_missing_contract() {
  let graph = Graph::new();
  let _ = resolve_from!(&graph, trait Greeter, "missing");
}

// --- Global Graph Tests ---

#[test]
#[serial]
fn test_resolve_from_global_graph() {
  // Arrange
  global()
    .register_value("macros_global_greeter", Arc::new(EnglishGreeter) as Arc<dyn Greeter>)
    .unwrap();
  global().register_value("macros_global_port", 8080u16).unwrap();

  // Act
  let greeter = resolve!(trait Greeter, "macros_global_greeter");
  let port = resolve!(u16, "macros_global_port");

  // Assert
  assert_eq!(greeter.greet(), "Hello!");
  assert_eq!(*port, 8080);
  assert!(maybe_resolve!(u16, "macros_global_missing").is_none());
  assert!(maybe_resolve!(Unregistered).is_none());
}

#[test]
#[serial]
#[should_panic(expected = "Failed to resolve required object with name 'macros_global_absent'")]
fn test_resolve_panics_on_missing_global_object() {
  let _ = resolve!(String, "macros_global_absent");
}

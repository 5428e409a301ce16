use fibre_inject::{Component, Field, Graph, GraphError, Lifecycle, OrFail, TypeInfo};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::process::Command;
use std::sync::Arc;

// --- Test Fixtures ---

#[derive(Default)]
struct Dep {
  target: i64,
}

impl Component for Dep {
  fn fields() -> Vec<Field<Self>> {
    vec![Field::value("target", |d: &mut Dep| &mut d.target).inject("cfg")]
  }
}

#[derive(Default)]
struct Owner {
  dep: Option<Arc<Dep>>,
  label: String,
}

impl Component for Owner {
  fn fields() -> Vec<Field<Self>> {
    vec![
      Field::component("dep", |o: &mut Owner| &mut o.dep).inject("dep"),
      Field::value("label", |o: &mut Owner| &mut o.label)
        .inject("owner_label")
        .nilable(),
    ]
  }
}

#[derive(Default)]
struct Ratio {
  value: f64,
}

impl Component for Ratio {
  fn fields() -> Vec<Field<Self>> {
    vec![Field::value("value", |r: &mut Ratio| &mut r.value).inject("ratio")]
  }
}

#[derive(Default)]
struct Endpoint {
  host: String,
  port: i64,
}

impl Component for Endpoint {
  fn fields() -> Vec<Field<Self>> {
    vec![
      Field::value("host", |e: &mut Endpoint| &mut e.host).inject("host"),
      Field::value("port", |e: &mut Endpoint| &mut e.port).inject("port"),
    ]
  }
}

type CloseLog = Arc<Mutex<Vec<String>>>;

// Records its label into a shared log when closed.
#[derive(Default)]
struct Tracked {
  label: String,
  log: CloseLog,
}

impl Tracked {
  fn new(label: &str, log: &CloseLog) -> Self {
    Self {
      label: label.to_string(),
      log: Arc::clone(log),
    }
  }
}

impl Component for Tracked {
  fn lifecycle() -> Lifecycle {
    Lifecycle::Closeable
  }

  fn close(&self) {
    self.log.lock().push(self.label.clone());
  }
}

#[derive(Default)]
struct Engine {
  started: bool,
}

impl Component for Engine {
  fn lifecycle() -> Lifecycle {
    Lifecycle::Startable
  }

  fn start(&mut self) -> Result<(), fibre_inject::BoxError> {
    self.started = true;
    Ok(())
  }
}

#[derive(Default)]
struct Broken;

impl Component for Broken {
  fn lifecycle() -> Lifecycle {
    Lifecycle::Both
  }

  fn start(&mut self) -> Result<(), fibre_inject::BoxError> {
    Err("boom".into())
  }
}

fn canonical<C: Component>() -> String {
  TypeInfo::component::<C>().canonical_name()
}

// --- Registration Tests ---

#[test]
fn test_value_then_singleton_resolves_value() {
  // Arrange
  let graph = Graph::new();
  graph.register_value("cfg", 42i32).unwrap();

  // Act
  let dep = graph.register_single::<Dep>("dep", None).unwrap();

  // Assert
  assert_eq!(dep.target, 42);
  assert_eq!(graph.keys(), vec!["cfg".to_string(), "dep".to_string(), canonical::<Dep>()]);
  let by_type = graph.find_component::<Dep>().expect("singleton is indexed by type");
  assert!(Arc::ptr_eq(&dep, &by_type));
}

#[test]
fn test_missing_component_is_allocated_and_filled() {
  // Arrange
  let graph = Graph::new();
  graph.register_value("cfg", 7i64).unwrap();

  // Act
  let owner = graph.register::<Owner>("owner", None).unwrap();

  // Assert
  let dep = owner.dep.as_ref().expect("dep is created on the fly");
  assert_eq!(dep.target, 7);
  // The nilable field stays at its default.
  assert_eq!(owner.label, "");
  // Dependencies are committed before their owner.
  assert_eq!(graph.keys(), vec!["cfg", "dep", "owner"]);
  assert!(Arc::ptr_eq(dep, &graph.get::<Dep>("dep").unwrap()));
}

#[test]
fn test_existing_dependency_is_shared() {
  // Arrange
  let graph = Graph::new();
  graph.register_value("cfg", 1i64).unwrap();
  let dep = graph.register::<Dep>("dep", None).unwrap();

  // Act
  let first = graph.register::<Owner>("first", None).unwrap();
  let second = graph.register::<Owner>("second", None).unwrap();

  // Assert
  assert!(Arc::ptr_eq(&dep, first.dep.as_ref().unwrap()));
  assert!(Arc::ptr_eq(&dep, second.dep.as_ref().unwrap()));
}

#[test]
fn test_supplied_instance_keeps_preset_fields() {
  // Arrange
  let graph = Graph::new();
  let manual = Arc::new(Dep { target: 99 });
  let owner = Owner {
    dep: Some(Arc::clone(&manual)),
    label: "preset".to_string(),
  };

  // Act
  let owner = graph.register::<Owner>("owner", Some(owner)).unwrap();

  // Assert
  assert!(Arc::ptr_eq(&manual, owner.dep.as_ref().unwrap()));
  assert_eq!(owner.label, "preset");
  assert_eq!(graph.keys(), vec!["owner"]);
}

#[test]
fn test_supplied_instance_fills_only_unset_fields() {
  // Arrange
  let graph = Graph::new();
  graph.register_value("host", String::from("remote")).unwrap();
  graph.register_value("port", 8080i32).unwrap();
  let endpoint = Endpoint {
    host: "localhost".to_string(),
    port: 0,
  };

  // Act
  let endpoint = graph.register::<Endpoint>("endpoint", Some(endpoint)).unwrap();

  // Assert
  assert_eq!(endpoint.host, "localhost");
  assert_eq!(endpoint.port, 8080);
}

#[test]
fn test_no_fill_leaves_supplied_fields_alone() {
  // Arrange
  let graph = Graph::new();

  // Act
  let owner = graph.register_no_fill::<Owner>("owner", Some(Owner::default())).unwrap();

  // Assert
  assert!(owner.dep.is_none());
  assert_eq!(graph.len(), 1);
}

#[test]
fn test_no_fill_still_fills_allocated_instances() {
  // Arrange
  let graph = Graph::new();
  graph.register_value("cfg", 5i64).unwrap();

  // Act
  let owner = graph.register_single_no_fill::<Owner>("owner", None).unwrap();

  // Assert
  assert_eq!(owner.dep.as_ref().unwrap().target, 5);
  assert!(graph.find_component::<Owner>().is_some());
}

#[test]
fn test_empty_component_name_uses_type_name() {
  // Arrange
  let graph = Graph::new();

  // Act
  graph.register::<Dep>("", Some(Dep { target: 3 })).unwrap();

  // Assert
  assert_eq!(graph.keys(), vec![canonical::<Dep>()]);
  assert_eq!(graph.find_component::<Dep>().unwrap().target, 3);
}

#[test]
fn test_empty_value_name_is_rejected() {
  // Arrange
  let graph = Graph::new();

  // Act
  let result = graph.register_value("", 5u8);

  // Assert
  assert!(matches!(result, Err(GraphError::Naming { type_name: "u8" })));
  assert!(graph.is_empty());
}

#[test]
fn test_duplicate_registration_leaves_graph_unchanged() {
  // Arrange
  let graph = Graph::new();
  graph.register_value("cfg", 1i32).unwrap();
  graph.register_value("dep_target", 2i32).unwrap();

  // Act
  let value = graph.register_value("cfg", 2i32);
  let component = graph.register::<Dep>("cfg", Some(Dep { target: 4 }));

  // Assert
  match value {
    Err(GraphError::DuplicateRegistration { name, found, .. }) => {
      assert_eq!(name, "cfg");
      assert!(found.starts_with(r#"{"name":"cfg","type":"i32""#));
    }
    other => panic!("expected a duplicate registration error, got {:?}", other),
  }
  assert!(matches!(component, Err(GraphError::DuplicateRegistration { .. })));
  assert_eq!(*graph.get::<i32>("cfg").unwrap(), 1);
  assert_eq!(graph.keys(), vec!["cfg", "dep_target"]);
}

#[test]
fn test_singleton_cannot_displace_registration_under_type_name() {
  // Arrange
  let graph = Graph::new();
  let log = CloseLog::default();
  let first = graph.register::<Tracked>("", Some(Tracked::new("first", &log))).unwrap();

  // Act
  let second = graph.register_single::<Tracked>("second", Some(Tracked::new("second", &log)));

  // Assert
  match second {
    Err(GraphError::DuplicateRegistration { name, .. }) => assert_eq!(name, canonical::<Tracked>()),
    other => panic!("expected a duplicate registration, got {:?}", other.map(|_| ())),
  }
  assert!(!graph.contains("second"));
  assert!(Arc::ptr_eq(&first, &graph.find_component::<Tracked>().unwrap()));

  graph.close();
  assert_eq!(*log.lock(), vec!["first"]);
}

#[test]
fn test_singleton_replaces_another_singletons_type_alias() {
  // Arrange
  let graph = Graph::new();
  let log = CloseLog::default();
  graph.register_single("a", Some(Tracked::new("a", &log))).unwrap();

  // Act
  let b = graph.register_single("b", Some(Tracked::new("b", &log))).unwrap();

  // Assert
  assert!(Arc::ptr_eq(&b, &graph.find_component::<Tracked>().unwrap()));
  assert_eq!(graph.keys(), vec!["a".to_string(), canonical::<Tracked>(), "b".to_string()]);

  // Both stay registered under their names, so both are closed.
  graph.close();
  assert_eq!(*log.lock(), vec!["b", "a"]);
}

// --- Value Field Tests ---

#[test]
fn test_integer_values_are_widened() {
  // Arrange
  let graph = Graph::new();
  graph.register_value("cfg", 30u16).unwrap();

  // Act
  let dep = graph.register::<Dep>("dep", None).unwrap();

  // Assert
  assert_eq!(dep.target, 30);
}

#[test]
fn test_float_values_are_converted() {
  // Arrange
  let graph = Graph::new();
  graph.register_value("ratio", 0.5f32).unwrap();

  // Act
  let ratio = graph.register::<Ratio>("r", None).unwrap();

  // Assert
  assert_eq!(ratio.value, 0.5);
}

#[test]
fn test_incompatible_value_is_a_type_mismatch() {
  // Arrange
  let graph = Graph::new();
  graph.register_value("cfg", String::from("not a number")).unwrap();

  // Act
  let result = graph.register::<Dep>("dep", None);

  // Assert
  match result {
    Err(GraphError::TypeMismatch {
      field,
      expected,
      found,
      owner,
    }) => {
      assert_eq!(field, "target");
      assert_eq!(expected, "i64");
      assert_eq!(found, std::any::type_name::<String>());
      assert_eq!(owner, "dep");
    }
    other => panic!("expected a type mismatch, got {:?}", other.map(|_| ())),
  }
  assert_eq!(graph.keys(), vec!["cfg"]);
}

#[test]
fn test_missing_value_is_reported() {
  // Arrange
  let graph = Graph::new();

  // Act
  let result = graph.register::<Owner>("owner", None);

  // Assert
  match result {
    Err(GraphError::MissingDependency { field, key, owner, .. }) => {
      assert_eq!(field, "target");
      assert_eq!(key, "cfg");
      assert_eq!(owner, "dep");
    }
    other => panic!("expected a missing dependency, got {:?}", other.map(|_| ())),
  }
  // Nothing half-built is left behind.
  assert!(graph.is_empty());
}

// --- Lifecycle Tests ---

#[test]
fn test_start_runs_before_registration_returns() {
  // Arrange
  let graph = Graph::new();

  // Act
  let engine = graph.register::<Engine>("engine", None).unwrap();

  // Assert
  assert!(engine.started);
}

#[test]
fn test_failed_start_is_not_registered() {
  // Arrange
  let graph = Graph::new();

  // Act
  let result = graph.register::<Broken>("broken", None);

  // Assert
  let err = match result {
    Err(err) => err,
    Ok(_) => panic!("start should have failed"),
  };
  assert!(matches!(&err, GraphError::Startup { name, .. } if name == "broken"));
  let source = std::error::Error::source(&err).expect("start error is kept as source");
  assert_eq!(source.to_string(), "boom");
  assert!(!graph.contains("broken"));
}

#[test]
fn test_close_runs_in_reverse_order_once() {
  // Arrange
  let graph = Graph::new();
  let log = CloseLog::default();
  graph.register_no_fill("a", Some(Tracked::new("a", &log))).unwrap();
  graph.register_no_fill("b", Some(Tracked::new("b", &log))).unwrap();
  graph.register_value("plain", 1u8).unwrap();
  graph.register_no_fill("c", Some(Tracked::new("c", &log))).unwrap();

  // Act
  graph.close();
  graph.close();

  // Assert
  assert_eq!(*log.lock(), vec!["c", "b", "a"]);
  assert!(graph.is_empty());
}

#[test]
fn test_singleton_is_closed_once() {
  // Arrange
  let graph = Graph::new();
  let log = CloseLog::default();
  graph
    .register_single_no_fill("only", Some(Tracked::new("only", &log)))
    .unwrap();
  assert_eq!(graph.len(), 2);

  // Act
  graph.close();

  // Assert
  assert_eq!(*log.lock(), vec!["only"]);
}

#[test]
fn test_graph_is_reusable_after_close() {
  // Arrange
  let graph = Graph::new();
  graph.register_value("cfg", 1i32).unwrap();
  graph.close();

  // Act
  graph.register_value("cfg", 2i32).unwrap();

  // Assert
  assert_eq!(*graph.get::<i32>("cfg").unwrap(), 2);
}

// --- Abort-on-error Tests ---

// Set in a re-run of this test binary that is expected to abort.
const ABORT_CHILD: &str = "FIBRE_INJECT_ABORT_CHILD";

// Re-runs a single test of this binary with the child marker set.
fn run_child(test_name: &str) -> std::process::Output {
  let exe = std::env::current_exe().expect("test binary path");
  Command::new(exe)
    .args(["--exact", test_name, "--nocapture", "--test-threads=1"])
    .env(ABORT_CHILD, "1")
    .output()
    .expect("spawn test binary")
}

#[test]
fn test_or_fail_variants_return_values_on_success() {
  // Arrange
  let graph = Graph::new();
  let log = CloseLog::default();

  // Act
  let port = graph.register_value_or_fail("port", 8080i32);
  let dep = graph.register_or_fail::<Dep>("dep", Some(Dep { target: 1 }));
  let single = graph.register_single_or_fail::<Engine>("engine", None);
  let kept = graph.register_no_fill_or_fail("kept", Some(Tracked::new("kept", &log)));
  let only = graph.register_single_no_fill_or_fail::<Ratio>("ratio", Some(Ratio { value: 2.0 }));
  let cfg = graph.register_value("cfg", 3i64).or_fail();

  // Assert
  assert_eq!(*port, 8080);
  assert_eq!(dep.target, 1);
  assert!(single.started);
  assert_eq!(kept.label, "kept");
  assert_eq!(only.value, 2.0);
  assert_eq!(*cfg, 3);
  assert!(graph.find_component::<Engine>().is_some());
  assert!(graph.find_component::<Ratio>().is_some());
}

#[test]
fn test_register_or_fail_aborts_on_error() {
  if std::env::var_os(ABORT_CHILD).is_some() {
    let graph = Graph::builder().without_logger().build();
    graph.register_value_or_fail("", 1u8);
    // Reaching this point means the process was not aborted.
    return;
  }

  // Act
  let output = run_child("test_register_or_fail_aborts_on_error");

  // Assert
  assert!(!output.status.success());
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("register failed: name="), "{}", stderr);
  assert!(stderr.contains("name can not be empty for a value of type u8"), "{}", stderr);
}

#[test]
fn test_or_fail_trait_aborts_on_error() {
  if std::env::var_os(ABORT_CHILD).is_some() {
    let graph = Graph::new();
    graph.register_value("cfg", 1i32).unwrap();
    let _ = graph.register_value("cfg", 2i32).or_fail();
    return;
  }

  // Act
  let output = run_child("test_or_fail_trait_aborts_on_error");

  // Assert
  assert!(!output.status.success());
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("aborting after graph failure: already registered: name=cfg"), "{}", stderr);
}

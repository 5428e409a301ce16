use fibre_inject::{resolve_from, Component, Field, Graph, ImplementationRegistry};
use std::sync::Arc;

// The abstraction a service depends on.
trait Notifier: Send + Sync {
  fn notify(&self, message: &str);
}

#[derive(Default)]
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
  fn notify(&self, message: &str) {
    println!("[notify] {}", message);
  }
}

impl Component for ConsoleNotifier {}

#[derive(Default)]
struct Alerts {
  notifier: Option<Arc<dyn Notifier>>,
}

impl Component for Alerts {
  fn fields() -> Vec<Field<Self>> {
    vec![Field::contract("notifier", |a: &mut Alerts| &mut a.notifier).inject("notifier")]
  }
}

fn main() {
  // Declare which concrete types may stand in for `dyn Notifier`.
  let registry = Arc::new(ImplementationRegistry::new());
  registry.add_component::<ConsoleNotifier, dyn Notifier>("notifier", |n| n);

  let graph = Graph::builder().registry(registry).build();
  if let Err(err) = graph.register::<Alerts>("alerts", None) {
    eprintln!("failed to wire alerts: {}", err);
    return;
  }

  let alerts = resolve_from!(&graph, Alerts, "alerts");
  if let Some(notifier) = &alerts.notifier {
    notifier.notify("disk almost full");
  }

  // The created implementation is reachable as the contract too.
  let notifier = resolve_from!(&graph, trait Notifier, "notifier");
  notifier.notify("bye");

  graph.close();
}

use fibre_inject::{Component, Field, Graph, Lifecycle, OrFail};
use std::sync::Arc;

// A configuration value object, filled from plain values in the graph.
#[derive(Default)]
struct Settings {
  url: String,
  pool_size: i64,
}

impl Component for Settings {
  fn fields() -> Vec<Field<Self>> {
    vec![
      Field::value("url", |s: &mut Settings| &mut s.url).inject("database_url"),
      Field::value("pool_size", |s: &mut Settings| &mut s.pool_size).inject("pool_size"),
    ]
  }
}

// Opens its "connection" on start and releases it on close.
#[derive(Default)]
struct Database {
  settings: Option<Arc<Settings>>,
  connected: bool,
}

impl Component for Database {
  fn fields() -> Vec<Field<Self>> {
    vec![Field::component("settings", |d: &mut Database| &mut d.settings).by_type()]
  }

  fn lifecycle() -> Lifecycle {
    Lifecycle::Both
  }

  fn start(&mut self) -> Result<(), fibre_inject::BoxError> {
    let settings = self.settings.as_ref().ok_or("settings were not injected")?;
    println!("connecting to {} with {} connections", settings.url, settings.pool_size);
    self.connected = true;
    Ok(())
  }

  fn close(&self) {
    println!("database closed");
  }
}

#[derive(Default)]
struct UserService {
  db: Option<Arc<Database>>,
}

impl Component for UserService {
  fn fields() -> Vec<Field<Self>> {
    vec![Field::component("db", |u: &mut UserService| &mut u.db).inject("db").singleton()]
  }
}

impl UserService {
  fn describe(&self) -> String {
    match &self.db {
      Some(db) if db.connected => "user service ready".to_string(),
      _ => "user service offline".to_string(),
    }
  }
}

fn main() {
  let graph = Graph::new();

  // --- Registration ---

  graph.register_value("database_url", String::from("postgres://localhost/app")).or_fail();
  graph.register_value("pool_size", 8u32).or_fail();
  graph.register_single::<Settings>("", None).or_fail();

  // `Database` is created, filled and started on demand.
  let users = graph.register::<UserService>("users", None).or_fail();
  println!("{}", users.describe());

  // --- Introspection ---

  println!("{}", graph.render_tree());

  // --- Teardown ---

  graph.close();
}

//! # Fibre Inject
//!
//! A runtime object-graph container for Rust.
//!
//! Fibre Inject builds a fully wired object graph from named values and
//! per-field injection markers. Each registered component has its injectable
//! fields resolved from the graph, missing dependencies are created on the fly,
//! startup hooks run once everything is in place, and `close` tears objects down
//! in reverse registration order.
//!
//! ## Core Concepts
//!
//! - **Graph**: A name to object registry that resolves fields recursively.
//! - **Component**: A type with an explicit injection table (`fields`) and an
//!   optional lifecycle (`start` / `close`).
//! - **Singleton**: A registration that is also indexed under its canonical
//!   type name, so later dependents can find it by type alone.
//! - **ImplementationRegistry**: Lists, per contract name, the concrete
//!   components that can be created to fill a trait object field.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_inject::{Component, Field, Graph, Lifecycle};
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Config {
//!   target: i64,
//! }
//!
//! impl Component for Config {
//!   fn fields() -> Vec<Field<Self>> {
//!     vec![Field::value("target", |c: &mut Config| &mut c.target).inject("target")]
//!   }
//! }
//!
//! #[derive(Default)]
//! struct Service {
//!   config: Option<Arc<Config>>,
//!   stopped: AtomicBool,
//! }
//!
//! impl Component for Service {
//!   fn fields() -> Vec<Field<Self>> {
//!     vec![Field::component("config", |s: &mut Service| &mut s.config).inject("config")]
//!   }
//!
//!   fn lifecycle() -> Lifecycle {
//!     Lifecycle::Closeable
//!   }
//!
//!   fn close(&self) {
//!     self.stopped.store(true, Ordering::SeqCst);
//!   }
//! }
//!
//! let graph = Graph::new();
//! graph.register_value("target", 123i32).unwrap();
//!
//! // `Config` is created and filled on the fly.
//! let service = graph.register::<Service>("service", None).unwrap();
//! assert_eq!(service.config.as_ref().unwrap().target, 123);
//!
//! graph.close();
//! assert!(service.stopped.load(Ordering::SeqCst));
//! ```

mod builder;
mod coerce;
mod component;
mod core;
mod error;
mod global;
mod graph;
mod logger;
mod macros;
mod registry;
mod render;
mod resolver;
mod store;
mod tag;

pub use builder::{GraphBuilder, DEFAULT_SLOW_START_THRESHOLD};
pub use component::{Component, Field};
pub use crate::core::{Entry, Lifecycle, TypeInfo, TypeKind};
pub use error::{BoxError, GraphError, Result};
pub use global::global;
pub use graph::{Graph, OrFail};
pub use logger::{Logger, TracingLogger};
pub use registry::{ImplementationRegistry, TypeDescriptor};
pub use store::{Iter, OrderedStore};
pub use tag::Markers;

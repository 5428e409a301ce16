use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::graph::{Graph, Settings};
use crate::logger::{Diagnostics, Logger, TracingLogger};
use crate::registry::ImplementationRegistry;

/// How long a `start` hook may run before the graph logs a warning about it.
pub const DEFAULT_SLOW_START_THRESHOLD: Duration = Duration::from_secs(5);

/// A builder for [`Graph`] instances.
pub struct GraphBuilder {
  logger: Option<Arc<dyn Logger>>,
  registry: Option<Arc<ImplementationRegistry>>,
  slow_start_threshold: Duration,
}

impl fmt::Debug for GraphBuilder {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("GraphBuilder")
      .field("has_logger", &self.logger.is_some())
      .field("shared_registry", &self.registry.is_some())
      .field("slow_start_threshold", &self.slow_start_threshold)
      .finish()
  }
}

impl Default for GraphBuilder {
  fn default() -> Self {
    Self {
      logger: Some(Arc::new(TracingLogger)),
      registry: None,
      slow_start_threshold: DEFAULT_SLOW_START_THRESHOLD,
    }
  }
}

impl GraphBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Sets the logger the graph reports through. Defaults to [`TracingLogger`].
  pub fn logger<L>(mut self, logger: L) -> Self
  where
    L: Logger + 'static,
  {
    self.logger = Some(Arc::new(logger));
    self
  }

  /// Uses an already shared logger.
  pub fn shared_logger(mut self, logger: Arc<dyn Logger>) -> Self {
    self.logger = Some(logger);
    self
  }

  /// Drops the logger. Diagnostics are then written as plain text to
  /// stdout and stderr.
  pub fn without_logger(mut self) -> Self {
    self.logger = None;
    self
  }

  /// Sets the implementation registry consulted for contract fields.
  ///
  /// Without one the graph gets a fresh, empty registry of its own.
  pub fn registry(mut self, registry: Arc<ImplementationRegistry>) -> Self {
    self.registry = Some(registry);
    self
  }

  /// Sets how long a `start` hook may take before a warning is logged.
  pub fn slow_start_threshold(mut self, threshold: Duration) -> Self {
    self.slow_start_threshold = threshold;
    self
  }

  pub fn build(self) -> Graph {
    Graph::from_settings(Settings {
      registry: self.registry.unwrap_or_default(),
      log: Diagnostics::new(self.logger),
      slow_start_threshold: self.slow_start_threshold,
    })
  }
}

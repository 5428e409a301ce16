//! The logging collaborator a graph reports through.

use std::sync::Arc;

/// Leveled sink for graph diagnostics.
///
/// Plug in an application logger with [`GraphBuilder::logger`](crate::GraphBuilder::logger).
pub trait Logger: Send + Sync {
  fn is_debug_enabled(&self) -> bool;
  fn debug(&self, message: &str);
  fn info(&self, message: &str);
  fn warn(&self, message: &str) {
    self.error(message);
  }
  fn error(&self, message: &str);
}

/// Forwards graph diagnostics to `tracing` under the `fibre_inject` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
  fn is_debug_enabled(&self) -> bool {
    tracing::enabled!(target: "fibre_inject", tracing::Level::DEBUG)
  }

  fn debug(&self, message: &str) {
    tracing::debug!(target: "fibre_inject", "{}", message);
  }

  fn info(&self, message: &str) {
    tracing::info!(target: "fibre_inject", "{}", message);
  }

  fn warn(&self, message: &str) {
    tracing::warn!(target: "fibre_inject", "{}", message);
  }

  fn error(&self, message: &str) {
    tracing::error!(target: "fibre_inject", "{}", message);
  }
}

// Without a logger, info goes to stdout and warnings/errors to stderr.
#[derive(Clone, Default)]
pub(crate) struct Diagnostics {
  logger: Option<Arc<dyn Logger>>,
}

impl Diagnostics {
  pub(crate) fn new(logger: Option<Arc<dyn Logger>>) -> Self {
    Self { logger }
  }

  pub(crate) fn is_debug_enabled(&self) -> bool {
    self.logger.as_ref().is_some_and(|l| l.is_debug_enabled())
  }

  pub(crate) fn debug(&self, message: &str) {
    if let Some(logger) = &self.logger {
      logger.debug(message);
    }
  }

  pub(crate) fn info(&self, message: &str) {
    match &self.logger {
      Some(logger) => logger.info(message),
      None => println!("{}", message),
    }
  }

  pub(crate) fn warn(&self, message: &str) {
    match &self.logger {
      Some(logger) => logger.warn(message),
      None => eprintln!("{}", message),
    }
  }

  pub(crate) fn error(&self, message: &str) {
    match &self.logger {
      Some(logger) => logger.error(message),
      None => eprintln!("{}", message),
    }
  }
}

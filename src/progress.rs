//! Injected progress/logging reporter.
//!
//! The original implementation logs ad hoc to stderr and drives a
//! home-grown progress bar. Rather than hard-code either, long operations
//! (frame iteration, chunk export, mesh extraction) report through this
//! trait so headless embedders and tests can mute it.

/// Receives progress notifications from long-running stages.
pub trait ProgressReporter: Send + Sync {
  /// Called once at the start of a stage with the total unit count.
  fn begin(&self, total: u64, label: &str);

  /// Called as units complete. May be called many times per stage.
  fn advance(&self, n: u64);

  /// Called once when the stage completes.
  fn finish(&self);
}

/// Reports nothing. Default for tests and silent embedders.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressReporter for NullProgress {
  fn begin(&self, _total: u64, _label: &str) {}
  fn advance(&self, _n: u64) {}
  fn finish(&self) {}
}

/// Reports through `tracing` at `info!`/`debug!` granularity.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
  fn begin(&self, total: u64, label: &str) {
    tracing::info!(total, label, "stage started");
  }

  fn advance(&self, n: u64) {
    tracing::debug!(n, "stage advanced");
  }

  fn finish(&self) {
    tracing::info!("stage finished");
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn null_progress_is_a_true_no_op() {
    let p = NullProgress;
    p.begin(10, "test");
    p.advance(5);
    p.finish();
  }
}

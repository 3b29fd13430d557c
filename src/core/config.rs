/*!

Tunables for a scheduling run. There is no configuration file; the embedding program builds a `SchedulerConfig` and
hands it to the `Scheduler`.

*/

use crate::{
  log::set_global_logging_threshold,
  DEFAULT_CUTOFF_COUNT
};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct SchedulerConfig {
  /// The most pairwise-incomparable self-loop matrices a single vertex may accumulate during call graph completion.
  /// One more and the vertex is reported as failing termination. This is an engineering limit, not part of the
  /// termination criterion, and exceeding it is never reported as "unknown".
  pub cutoff_count           : usize,
  /// Try the lexicographic search on a single recursive function's own calls before completing its call graph.
  pub single_vertex_fast_path: bool,
  /// If set, applied as the global logging threshold when the scheduler is created.
  pub logging_threshold      : Option<u8>,
}

impl Default for SchedulerConfig {
  fn default() -> Self {
    SchedulerConfig {
      cutoff_count           : DEFAULT_CUTOFF_COUNT,
      single_vertex_fast_path: true,
      logging_threshold      : None,
    }
  }
}

impl SchedulerConfig {
  pub fn with_cutoff_count(mut self, cutoff_count: usize) -> Self {
    self.cutoff_count = cutoff_count;
    self
  }

  pub fn with_single_vertex_fast_path(mut self, enabled: bool) -> Self {
    self.single_vertex_fast_path = enabled;
    self
  }

  pub fn with_logging_threshold(mut self, threshold: u8) -> Self {
    self.logging_threshold = Some(threshold);
    self
  }

  pub(crate) fn apply_logging_threshold(&self) {
    if let Some(threshold) = self.logging_threshold {
      set_global_logging_threshold(threshold);
    }
  }
}

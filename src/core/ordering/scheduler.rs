/*!

The entry points. A `Scheduler` owns the `DefinitionTable` and runs batches over it: each batch orders the
definitions reachable from its roots, type checks them through a `TypecheckingListener`, and then either reports every
diagnostic the batch produced or, if the batch was cancelled, rolls the table back to where it was before the batch
started and reports nothing.

*/

use std::fmt::{Display, Formatter};

use crate::{
  api::{
    collaborators::Collaborators,
    DefId,
    DefinitionTable
  },
  core::{
    config::SchedulerConfig,
    ordering::{
      dependency_order::DependencyOrder,
      typechecking::TypecheckingListener
    }
  },
  info
};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum BatchOutcome {
  Completed,
  /// The batch was cancelled. Every definition it touched is `NeedsCheck` again.
  Cancelled,
}

impl Display for BatchOutcome {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      BatchOutcome::Completed => write!(f, "completed"),
      BatchOutcome::Cancelled => write!(f, "cancelled"),
    }
  }
}

#[derive(Clone, Debug, Default)]
pub struct Scheduler {
  table : DefinitionTable,
  config: SchedulerConfig,
}

impl Scheduler {
  pub fn new(table: DefinitionTable, config: SchedulerConfig) -> Scheduler {
    config.apply_logging_threshold();
    Scheduler { table, config }
  }

  #[inline(always)]
  pub fn table(&self) -> &DefinitionTable {
    &self.table
  }

  /// For registering definitions between batches.
  #[inline(always)]
  pub fn table_mut(&mut self) -> &mut DefinitionTable {
    &mut self.table
  }

  #[inline(always)]
  pub fn config(&self) -> &SchedulerConfig {
    &self.config
  }

  pub fn into_table(self) -> DefinitionTable {
    self.table
  }

  pub fn order<D>(&mut self, definition: DefId, collaborators: Collaborators<'_, D>) -> BatchOutcome {
    self.order_batch(&[definition], collaborators)
  }

  pub fn order_batch<D>(&mut self, definitions: &[DefId], collaborators: Collaborators<'_, D>) -> BatchOutcome {
    let Collaborators { provider, headers, bodies, dependencies, reporter, cancellation } = collaborators;
    info!(1, "ordering a batch of {} definitions", definitions.len());

    let snapshot  = self.table.snapshot();
    let mut order = DependencyOrder::new(&self.table, dependencies, cancellation);
    let mut listener = TypecheckingListener::new(
      &mut self.table,
      &self.config,
      provider,
      headers,
      bodies,
      cancellation
    );

    let result      = order.order_batch(definitions, &mut listener);
    let diagnostics = listener.into_diagnostics();

    match result {
      Ok(()) => {
        info!(1, "batch completed with {} diagnostics", diagnostics.len());
        for diagnostic in diagnostics {
          reporter.report(diagnostic);
        }
        BatchOutcome::Completed
      }
      Err(interrupted) => {
        let reverted = self.table.restore(&snapshot);
        info!(1, "{}: batch rolled back, {} definitions reset", interrupted, reverted.len());
        BatchOutcome::Cancelled
      }
    }
  }
}

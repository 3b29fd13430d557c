/*!

Definition scheduling and size-change termination checking for the elaborator of a dependently typed language.

Given a table of mutually referencing definitions, the `Scheduler` finds the cycles of the dependency graph, checks
every definition in two phases (header, then body) in an order that lets the members of a recursive group see one
another's headers before any of their bodies is checked, and decides for each recursive group whether its recursion
is well-founded.

The parts of the elaborator that actually parse, resolve, and type check declarations are collaborators, reached
through the traits in `api::collaborators`.

*/

pub mod api;
pub mod abstractions;
pub mod core;

// We re-export abstractions that are meant to be used publicly.
pub use abstractions::{
  log,
  IString
};

pub use api::{
  collaborators::Collaborators,
  DefId,
  DefinitionKind,
  DefinitionStatus,
  DefinitionTable,
  Diagnostic
};
pub use crate::core::{
  config::SchedulerConfig,
  ordering::{BatchOutcome, Scheduler},
  termination::{TerminationChecker, TerminationResult}
};

// Configuration

/// The most pairwise-incomparable self-loops a vertex may accumulate during call graph completion before the vertex
/// is reported as failing termination.
pub const DEFAULT_CUTOFF_COUNT: usize = 100;

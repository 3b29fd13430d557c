/*!

Errors and diagnostics. `Diagnostic`s are what the scheduler reports to the `ErrorReporter`; they are always a
deterministic function of the input program. `ComputationInterrupted` is not a diagnostic at all: it unwinds a batch,
the batch is rolled back, and nothing is reported.

*/

use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

use crate::{
  abstractions::join_string,
  api::{DefId, DefinitionTable}
};

/// Returned by a cancellation check once the batch has been cancelled.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct ComputationInterrupted;

impl Display for ComputationInterrupted {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "computation interrupted")
  }
}

impl Debug for ComputationInterrupted {
  fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
    Display::fmt(self, f)
  }
}

impl Error for ComputationInterrupted {}

/// A failure reported by a header or body checker. Surfaced unchanged in `Diagnostic::Header`/`Diagnostic::Body`.
#[derive(Clone, Eq, PartialEq)]
pub struct CheckError {
  pub message: String,
}

impl CheckError {
  pub fn new(message: impl Into<String>) -> CheckError {
    CheckError { message: message.into() }
  }
}

impl Display for CheckError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.message)
  }
}

impl Debug for CheckError {
  fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
    Display::fmt(self, f)
  }
}

impl Error for CheckError {}

#[derive(Clone, Eq, PartialEq)]
pub enum Diagnostic {
  /// A cycle containing a definition that cannot be recursive. Reported once per cycle.
  Cycle {
    members       : Vec<DefId>,
    /// Instances among the members; resolving an instance is the usual hidden source of such a cycle.
    instance_hints: Vec<DefId>,
  },
  /// A recursive group whose recursion could not be shown to be well-founded.
  Termination {
    vertices: Vec<DefId>,
  },
  Header {
    definition: DefId,
    error     : CheckError,
  },
  Body {
    definition: DefId,
    error     : CheckError,
  },
}

impl Diagnostic {
  /// Renders the diagnostic with definition names looked up in `table`.
  pub fn describe(&self, table: &DefinitionTable) -> String {
    let names = |ids: &[DefId]| join_string(ids.iter().map(|id| table.name(*id)), ", ");
    match self {

      Diagnostic::Cycle { members, instance_hints } => {
        if instance_hints.is_empty() {
          format!("cyclic dependency between {}", names(members))
        } else {
          format!(
            "cyclic dependency between {} (possibly through instances {})",
            names(members),
            names(instance_hints)
          )
        }
      }

      Diagnostic::Termination { vertices } => {
        format!("termination check failed for {}", names(vertices))
      }

      Diagnostic::Header { definition, error } => {
        format!("header of {}: {}", table.name(*definition), error)
      }

      Diagnostic::Body { definition, error } => {
        format!("body of {}: {}", table.name(*definition), error)
      }

    } // end match on `Diagnostic`
  }
}

impl Display for Diagnostic {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Diagnostic::Cycle { members, .. } => {
        write!(f, "cyclic dependency between {}", join_string(members.iter(), ", "))
      }
      Diagnostic::Termination { vertices } => {
        write!(f, "termination check failed for {}", join_string(vertices.iter(), ", "))
      }
      Diagnostic::Header { definition, error } => write!(f, "header of {}: {}", definition, error),
      Diagnostic::Body { definition, error }   => write!(f, "body of {}: {}", definition, error),
    }
  }
}

impl Debug for Diagnostic {
  fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
    Display::fmt(self, f)
  }
}

impl Error for Diagnostic {}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::DefinitionKind;

  #[test]
  fn describe_uses_names() {
    let mut table = DefinitionTable::new();
    let list = table.register("List", DefinitionKind::Data);
    let show = table.register("ShowList", DefinitionKind::Instance);

    let cycle = Diagnostic::Cycle { members: vec![list, show], instance_hints: vec![show] };
    assert_eq!(
      cycle.describe(&table),
      "cyclic dependency between List, ShowList (possibly through instances ShowList)"
    );
    assert_eq!(cycle.to_string(), "cyclic dependency between #0, #1");

    let header = Diagnostic::Header { definition: list, error: CheckError::new("universe too large") };
    assert_eq!(header.describe(&table), "header of List: universe too large");
  }
}

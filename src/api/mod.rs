/*!

The public vocabulary of the library: definition identities and their lifecycle, the elimination-form bodies the
termination checker walks, the collaborator interfaces the scheduler consumes, and the listener contract it drives.

*/

pub mod definition;
pub mod expression;
pub mod collaborators;
pub mod diagnostic;
pub mod listener;

use std::fmt::{Display, Formatter};

pub use definition::{
  Definition,
  DefinitionFlag,
  DefinitionFlags,
  DefinitionKind,
  DefinitionStatus,
  DefinitionTable,
  StatusSnapshot
};
pub use diagnostic::{CheckError, ComputationInterrupted, Diagnostic};
pub use listener::OrderingListener;

/// The stable identity of a registered definition. Ids are dense indices into the `DefinitionTable` assigned at
/// registration time, so per-run state can be kept in plain vectors and `NatSet`s.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct DefId(pub(crate) u32);

impl DefId {
  #[inline(always)]
  pub fn index(self) -> usize {
    self.0 as usize
  }

  /// Reconstructs an id from an index previously obtained from `DefId::index`.
  #[inline(always)]
  pub fn from_index(index: usize) -> DefId {
    DefId(index as u32)
  }
}

impl Display for DefId {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "#{}", self.0)
  }
}

/// A local variable of a compiled body: a formal parameter, a pattern variable bound by a case branch, or a variable
/// bound by a `Lambda`/`Let`. Ids are only meaningful within one body.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct VarId(pub u32);

impl Display for VarId {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "v{}", self.0)
  }
}

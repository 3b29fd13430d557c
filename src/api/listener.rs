/*!

The callback contract between the ordering (which finds units and cycles in the dependency graph) and whoever acts on
them. The ordering guarantees:

 - every definition reached is delivered exactly once, by exactly one of `unit_found`, `cycle_found`, or
   `header_found` followed later by `bodies_found`;
 - everything a definition depends on outside its own cycle is delivered before it;
 - for a cycle of functions, `header_found` is called for every member before `bodies_found` is called, exactly once,
   with the same member list.

Each callback may fail with `ComputationInterrupted`, which aborts the ordering immediately.

*/

use crate::api::{ComputationInterrupted, DefId};

pub trait OrderingListener {
  /// A definition that is not part of any cycle. `recursive` is `true` for a function that refers to itself.
  fn unit_found(&mut self, definition: DefId, recursive: bool) -> Result<(), ComputationInterrupted>;

  /// A cycle that contains a definition which cannot be recursive (a data type, a class, ...).
  fn cycle_found(&mut self, definitions: &[DefId]) -> Result<(), ComputationInterrupted>;

  /// One member of a cycle of functions, delivered for its header phase.
  fn header_found(&mut self, definition: DefId) -> Result<(), ComputationInterrupted>;

  /// All members of a cycle of functions, once every one of their headers has been delivered.
  fn bodies_found(&mut self, definitions: &[DefId]) -> Result<(), ComputationInterrupted>;
}

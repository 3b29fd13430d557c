/*!

A `RecursiveBehavior` is the diagonal of a self-loop: for each parameter, what happens to it when the function calls
itself. The lexicographic search looks for an order of parameters `i1, i2, ...` such that every recursive call either
decreases `i1`, or keeps `i1` equal and decreases `i2`, or keeps both equal and decreases `i3`, and so on. This is
multiple-argument lexicographic descent, and single-argument structural recursion is the special case of an order of
length one.

The search picks a column in which no behavior is `Unknown` and some behavior is `LessThan`, discards the behaviors
that are `LessThan` there (they are satisfied), and continues on the rest with the column removed. It succeeds once no
behaviors remain, and fails when no remaining column can be picked.

The search is greedy. A column that can be picked for some set of behaviors can still be picked for any subset of
it, so picking a column never rules out an order that would otherwise exist.

*/

use std::fmt::{Display, Formatter};

use crate::{
  abstractions::{join_string, IString},
  core::termination::{
    call_matrix::CallMatrix,
    relation::Relation
  }
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecursiveBehavior {
  pub behavior: Vec<Relation>,
  pub labels  : Vec<IString>,
}

impl RecursiveBehavior {
  /// The diagonal of a self-loop matrix, labelled by the loop's parameter names.
  pub fn from_self_loop(matrix: &CallMatrix) -> RecursiveBehavior {
    let behavior = matrix.diagonal();
    let labels   = matrix.row_labels().iter().take(behavior.len()).cloned().collect();
    RecursiveBehavior { behavior, labels }
  }

  #[inline(always)]
  pub fn len(&self) -> usize {
    self.behavior.len()
  }

  #[inline(always)]
  pub fn is_empty(&self) -> bool {
    self.behavior.is_empty()
  }
}

impl Display for RecursiveBehavior {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let entries = self.behavior
                      .iter()
                      .zip(self.labels.iter())
                      .map(|(relation, label)| format!("{}{}", relation, label));
    write!(f, "({})", join_string(entries, ", "))
  }
}

/// Finds a lexicographic order of parameter indices under which every behavior decreases. All behaviors must have
/// the same length. Returns `None` if there is no such order.
pub fn find_lexicographic_order(behaviors: &[RecursiveBehavior]) -> Option<Vec<usize>> {
  let arity = behaviors.first().map_or(0, |b| b.len());
  debug_assert!(behaviors.iter().all(|b| b.len() == arity), "behaviors of different arity");

  let mut pending: Vec<&RecursiveBehavior> = behaviors.iter().collect();
  let mut columns: Vec<usize> = (0..arity).collect();
  let mut order = Vec::with_capacity(arity);

  while !pending.is_empty() {
    let position = columns.iter().position(|&column| {
      pending.iter().all(|b| b.behavior[column] != Relation::Unknown)
          && pending.iter().any(|b| b.behavior[column] == Relation::LessThan)
    })?;
    let column = columns.remove(position);
    pending.retain(|b| b.behavior[column] == Relation::Equal);
    order.push(column);
  }

  Some(order)
}

/*!

Decides whether a recursive group terminates. There are two separate procedures.

The single-vertex fast path applies when the group has exactly one member. It looks for a lexicographic order on the
parameters under which every self-loop of that member decreases. If one is found the group terminates and the call
graph is never completed. If none is found the general path decides.

The general path seeds a `CallGraph` with every call matrix of the group, completes it, and then inspects the
self-loops of every vertex. A loop *fails* if it has no `LessThan` on its diagonal and either contains no `LessThan`
at all or is idempotent. A vertex with a failing loop, or a vertex that exceeded the cutoff during completion, makes
the whole group fail.

*/

use std::fmt::{Display, Formatter};

use crate::{
  abstractions::join_string,
  api::{
    collaborators::CancellationToken,
    ComputationInterrupted,
    DefId
  },
  core::{
    config::SchedulerConfig,
    termination::{
      behavior::{find_lexicographic_order, RecursiveBehavior},
      call_graph::{CallGraph, Completion},
      call_matrix::CallMatrix
    }
  },
  debug,
  info
};

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum TerminationResult {
  Ok,
  /// The vertices that may not terminate, in increasing order.
  Fail(Vec<DefId>),
}

impl TerminationResult {
  #[inline(always)]
  pub fn is_ok(&self) -> bool {
    matches!(self, TerminationResult::Ok)
  }
}

impl Display for TerminationResult {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      TerminationResult::Ok              => write!(f, "ok"),
      TerminationResult::Fail(vertices) => write!(f, "fail({})", join_string(vertices.iter(), ", ")),
    }
  }
}

/// The single-vertex fast path: is there a lexicographic order under which every one of `loops` decreases?
pub fn check_self_loops(vertex: DefId, loops: &[CallMatrix]) -> bool {
  let behaviors: Vec<RecursiveBehavior> = loops.iter().map(RecursiveBehavior::from_self_loop).collect();
  match find_lexicographic_order(&behaviors) {
    Some(order) => {
      let labels = behaviors.first().map(|b| b.labels.clone()).unwrap_or_default();
      debug!(
        2,
        "{} terminates by lexicographic order ({})",
        vertex,
        join_string(order.iter().filter_map(|column| labels.get(*column)), ", ")
      );
      true
    }
    None => false,
  }
}

/// A self-loop that never certifies a decrease, even after composing it with itself.
fn is_failing_loop(matrix: &CallMatrix) -> bool {
  !matrix.has_decreasing_diagonal() && (!matrix.contains_less_than() || matrix.is_idempotent())
}

/// The general path, for a graph that has already been completed.
pub fn check_completed_graph(graph: &CallGraph) -> TerminationResult {
  let failing: Vec<DefId> = graph.vertices()
                                 .into_iter()
                                 .filter(|vertex| graph.self_loops(*vertex).iter().any(is_failing_loop))
                                 .collect();
  if failing.is_empty() {
    TerminationResult::Ok
  } else {
    TerminationResult::Fail(failing)
  }
}

#[derive(Copy, Clone, Debug)]
pub struct TerminationChecker {
  cutoff_count           : usize,
  single_vertex_fast_path: bool,
}

impl Default for TerminationChecker {
  fn default() -> Self {
    TerminationChecker::new(&SchedulerConfig::default())
  }
}

impl TerminationChecker {
  pub fn new(config: &SchedulerConfig) -> TerminationChecker {
    TerminationChecker {
      cutoff_count           : config.cutoff_count,
      single_vertex_fast_path: config.single_vertex_fast_path,
    }
  }

  /// Checks the group `members` whose calls to one another are `seeds`.
  pub fn check_group(
    &self,
    members: &[DefId],
    seeds  : Vec<CallMatrix>,
    token  : &dyn CancellationToken,
  ) -> Result<TerminationResult, ComputationInterrupted>
  {
    token.check_cancelled()?;

    if self.single_vertex_fast_path {
      if let [vertex] = members {
        let loops: Vec<CallMatrix> = seeds.iter().filter(|m| m.is_self_loop()).cloned().collect();
        if check_self_loops(*vertex, &loops) {
          return Ok(TerminationResult::Ok);
        }
        debug!(3, "no lexicographic order for {}; completing its call graph", vertex);
      }
    }

    let mut graph = match CallGraph::from_seeds(seeds, self.cutoff_count) {
      Ok(graph)   => graph,
      Err(vertex) => {
        info!(2, "termination check failed: {} exploded while seeding", vertex);
        return Ok(TerminationResult::Fail(vec![vertex]));
      }
    };

    let result = match graph.complete(token)? {
      Completion::Complete         => check_completed_graph(&graph),
      Completion::Exploded(vertex) => TerminationResult::Fail(vec![vertex]),
    };
    info!(2, "termination check for {}: {}", join_string(members.iter(), ", "), result);
    Ok(result)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    api::collaborators::{CancellationFlag, NeverCancelled},
    core::termination::relation::Relation::{self, *},
  };

  const F: DefId = DefId(0);
  const G: DefId = DefId(1);

  fn loop_of(rows: &[&[Relation]]) -> CallMatrix {
    CallMatrix::from_rows(F, F, rows)
  }

  #[test]
  fn single_decreasing_recursion() {
    let checker = TerminationChecker::default();
    let result  = checker.check_group(&[F], vec![loop_of(&[&[LessThan]])], &NeverCancelled).unwrap();
    assert_eq!(result, TerminationResult::Ok);
    assert!(check_self_loops(F, &[loop_of(&[&[LessThan]])]));
  }

  #[test]
  fn mutual_descent_through_completion() {
    let seeds = vec![
      CallMatrix::from_rows(F, G, &[&[LessThan]]),
      CallMatrix::from_rows(G, F, &[&[LessThan]]),
    ];
    let checker = TerminationChecker::default();
    assert_eq!(checker.check_group(&[F, G], seeds, &NeverCancelled).unwrap(), TerminationResult::Ok);
  }

  #[test]
  fn unchanged_argument_fails() {
    let seeds = vec![loop_of(&[&[Equal]])];
    for fast_path in [true, false] {
      let config  = SchedulerConfig::default().with_single_vertex_fast_path(fast_path);
      let checker = TerminationChecker::new(&config);
      let result  = checker.check_group(&[F], seeds.clone(), &NeverCancelled).unwrap();
      assert_eq!(result, TerminationResult::Fail(vec![F]));
    }
  }

  #[test]
  fn one_unchanged_branch_fails_despite_a_decreasing_one() {
    // f(zero) = f(n), f(succ(m)) = f(m)
    let seeds = vec![loop_of(&[&[LessThan]]), loop_of(&[&[Equal]])];
    for fast_path in [true, false] {
      let config  = SchedulerConfig::default().with_single_vertex_fast_path(fast_path);
      let checker = TerminationChecker::new(&config);
      let result  = checker.check_group(&[F], seeds.clone(), &NeverCancelled).unwrap();
      assert_eq!(result, TerminationResult::Fail(vec![F]));

      let mut reversed = seeds.clone();
      reversed.reverse();
      let result = checker.check_group(&[F], reversed, &NeverCancelled).unwrap();
      assert_eq!(result, TerminationResult::Fail(vec![F]));
    }
  }

  #[test]
  fn mutual_recursion_without_descent_fails() {
    let seeds = vec![
      CallMatrix::from_rows(F, G, &[&[Equal]]),
      CallMatrix::from_rows(G, F, &[&[Unknown]]),
    ];
    let result = TerminationChecker::default().check_group(&[F, G], seeds, &NeverCancelled).unwrap();
    assert_eq!(result, TerminationResult::Fail(vec![F, G]));
  }

  #[test]
  fn ackermann_shape() {
    let seeds = vec![
      loop_of(&[&[LessThan, Unknown], &[Unknown, Unknown]]),
      loop_of(&[&[Equal, Unknown], &[Unknown, LessThan]]),
    ];
    let fast = TerminationChecker::default();
    assert!(fast.check_group(&[F], seeds.clone(), &NeverCancelled).unwrap().is_ok());

    let general = TerminationChecker::new(&SchedulerConfig::default().with_single_vertex_fast_path(false));
    assert!(general.check_group(&[F], seeds, &NeverCancelled).unwrap().is_ok());
  }

  #[test]
  fn swapped_arguments_terminate_by_composition() {
    // f(x, y) = f(y, x') with x' < x: no lexicographic order, but the completed loop decreases on the diagonal.
    let seeds = vec![loop_of(&[&[Unknown, LessThan], &[Equal, Unknown]])];
    assert!(!check_self_loops(F, &seeds));
    assert!(TerminationChecker::default().check_group(&[F], seeds, &NeverCancelled).unwrap().is_ok());
  }

  #[test]
  fn loop_criterion() {
    assert!(is_failing_loop(&loop_of(&[&[Equal]])));
    assert!(is_failing_loop(&loop_of(&[&[Unknown]])));
    assert!(!is_failing_loop(&loop_of(&[&[LessThan]])));
    // A `<` off the diagonal shows up on the diagonal after squaring, so the loop is not idempotent.
    assert!(!is_failing_loop(&loop_of(&[&[Unknown, LessThan], &[Unknown, Unknown]])));
  }

  /// One `LessThan` at a different position per matrix makes every pair incomparable.
  fn incomparable_loops(count: usize) -> Vec<CallMatrix> {
    let size = 11;
    (0..count).map(|k| {
      let mut matrix = CallMatrix::from_rows(F, F, &vec![&[Unknown; 11][..]; size]);
      matrix.set(k / size, k % size, LessThan);
      matrix
    }).collect()
  }

  #[test]
  fn explosion_guard_fails_the_vertex() {
    let seeds = incomparable_loops(101);
    assert_eq!(seeds.len(), 101);
    let config  = SchedulerConfig::default().with_single_vertex_fast_path(false);
    let checker = TerminationChecker::new(&config);
    assert_eq!(checker.check_group(&[F], seeds, &NeverCancelled).unwrap(), TerminationResult::Fail(vec![F]));
  }

  #[test]
  fn cancellation_interrupts_the_check() {
    let flag = CancellationFlag::default();
    flag.cancel();
    let result = TerminationChecker::default().check_group(&[F], vec![loop_of(&[&[LessThan]])], &flag);
    assert_eq!(result, Err(ComputationInterrupted));
  }
}

/*!

The call graph of a recursive group: vertices are definitions, and the edges from `u` to `v` are the call matrices of
(sequences of) calls from `u` to `v`. Between any two vertices only the least informative matrices are kept: a
matrix is dropped when some other matrix for the same pair is at most as informative at every entry. A matrix that
is more informative than another can only hide a failing loop the other one exposes. There are finitely many
matrices of a given shape, so this bounds the graph.

## Completion

Completion computes the compositional closure of the graph: whenever `u → v` and `v → w` are edges, so is their
composition `u → w`. It is a worklist algorithm. Every edge starts out on the worklist. Popping an edge composes it
with every edge leaving its codomain and every edge entering its domain; whatever survives dominance pruning is new
information and goes back onto the worklist. Nothing survives pruning forever, so the worklist drains.

## The Explosion Guard

The number of pairwise-incomparable matrices for one vertex pair can still grow exponentially in the number of
parameters. If a vertex ever holds more than `cutoff_count` self-loops, completion stops and reports that vertex.
The caller treats this exactly like a termination failure.

*/

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::{
  abstractions::join_string,
  api::{
    collaborators::CancellationToken,
    ComputationInterrupted,
    DefId
  },
  core::{
    format::{FormatStyle, Formattable},
    termination::call_matrix::CallMatrix
  },
  debug,
  trace,
  warning
};

/// What happened to a matrix offered to `CallGraph::insert`.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Insertion {
  /// The matrix is new information. Existing matrices that dominate it were removed.
  Added,
  /// It dominates an existing matrix, which already covers every loop it could take part in. The graph is unchanged.
  Subsumed,
  /// The matrix was added and pushed the vertex's self-loop count past the cutoff.
  Exploded(DefId),
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Completion {
  Complete,
  /// Completion stopped early because this vertex exceeded the self-loop cutoff.
  Exploded(DefId),
}

#[derive(Clone, Debug, PartialEq)]
pub struct CallGraph {
  /// domain → codomain → pairwise-incomparable matrices
  edges       : BTreeMap<DefId, BTreeMap<DefId, Vec<CallMatrix>>>,
  cutoff_count: usize,
}

impl CallGraph {
  pub fn new(cutoff_count: usize) -> CallGraph {
    CallGraph {
      edges: BTreeMap::new(),
      cutoff_count,
    }
  }

  /// Builds a graph from seed matrices. Stops at the first seed that makes a vertex explode.
  pub fn from_seeds(seeds: impl IntoIterator<Item = CallMatrix>, cutoff_count: usize) -> Result<CallGraph, DefId> {
    let mut graph = CallGraph::new(cutoff_count);
    for seed in seeds {
      if let Insertion::Exploded(vertex) = graph.insert(seed) {
        return Err(vertex);
      }
    }
    Ok(graph)
  }

  #[inline(always)]
  pub fn cutoff_count(&self) -> usize {
    self.cutoff_count
  }

  /// Inserts `matrix` unless it dominates an existing matrix for the same vertex pair, removing any existing
  /// matrices that dominate it.
  pub fn insert(&mut self, matrix: CallMatrix) -> Insertion {
    let (domain, codomain) = (matrix.domain, matrix.codomain);
    let slot = self.edges
                   .entry(domain)
                   .or_default()
                   .entry(codomain)
                   .or_default();

    if slot.iter().any(|existing| matrix.dominates(existing)) {
      return Insertion::Subsumed;
    }
    slot.retain(|existing| !existing.dominates(&matrix));
    trace!(4, "call graph edge {}", matrix);
    slot.push(matrix);

    if domain == codomain && slot.len() > self.cutoff_count {
      Insertion::Exploded(domain)
    } else {
      Insertion::Added
    }
  }

  /// The matrices from `domain` to `codomain`.
  pub fn edges(&self, domain: DefId, codomain: DefId) -> &[CallMatrix] {
    self.edges
        .get(&domain)
        .and_then(|targets| targets.get(&codomain))
        .map(|slot| slot.as_slice())
        .unwrap_or(&[])
  }

  pub fn self_loops(&self, vertex: DefId) -> &[CallMatrix] {
    self.edges(vertex, vertex)
  }

  /// Every vertex that is the domain or codomain of some edge, in increasing order.
  pub fn vertices(&self) -> Vec<DefId> {
    let mut vertices = BTreeSet::new();
    for (domain, targets) in self.edges.iter() {
      for (codomain, slot) in targets.iter() {
        if !slot.is_empty() {
          vertices.insert(*domain);
          vertices.insert(*codomain);
        }
      }
    }
    vertices.into_iter().collect()
  }

  /// Iterates over all matrices, ordered by domain, then codomain, then insertion.
  pub fn iter(&self) -> impl Iterator<Item = &CallMatrix> {
    self.edges.values().flat_map(|targets| targets.values()).flatten()
  }

  pub fn edge_count(&self) -> usize {
    self.iter().count()
  }

  fn contains(&self, matrix: &CallMatrix) -> bool {
    self.edges(matrix.domain, matrix.codomain).contains(matrix)
  }

  fn outgoing(&self, vertex: DefId) -> Vec<CallMatrix> {
    self.edges
        .get(&vertex)
        .map(|targets| targets.values().flatten().cloned().collect())
        .unwrap_or_default()
  }

  fn incoming(&self, vertex: DefId) -> Vec<CallMatrix> {
    self.edges
        .values()
        .filter_map(|targets| targets.get(&vertex))
        .flatten()
        .cloned()
        .collect()
  }

  /// Computes the compositional closure of the graph in place. Checks for cancellation before every step.
  pub fn complete(&mut self, token: &dyn CancellationToken) -> Result<Completion, ComputationInterrupted> {
    let mut worklist: VecDeque<CallMatrix> = self.iter().cloned().collect();
    let mut steps = 0usize;

    while let Some(edge) = worklist.pop_front() {
      token.check_cancelled()?;
      // A matrix that has since been replaced by a weaker one has nothing to add.
      if !self.contains(&edge) {
        continue;
      }
      steps += 1;

      let mut discovered = Vec::new();
      for next in self.outgoing(edge.codomain) {
        discovered.push(edge.compose(&next));
      }
      for previous in self.incoming(edge.domain) {
        discovered.push(previous.compose(&edge));
      }

      for matrix in discovered {
        match self.insert(matrix.clone()) {
          Insertion::Added      => worklist.push_back(matrix),
          Insertion::Subsumed   => {}
          Insertion::Exploded(vertex) => {
            warning!(
              1,
              "call graph completion exceeded {} self-loops at {}; treating it as non-terminating",
              self.cutoff_count,
              vertex
            );
            return Ok(Completion::Exploded(vertex));
          }
        }
      }
    }

    debug!(3, "call graph completed after {} steps with {} edges", steps, self.edge_count());
    Ok(Completion::Complete)
  }
}

impl Formattable for CallGraph {
  fn repr(&self, style: FormatStyle) -> String {
    let separator = match style {
      FormatStyle::Simple => ", ",
      _                   => "\n",
    };
    join_string(self.iter().map(|matrix| matrix.repr(style)), separator)
  }
}

#[cfg(test)]
mod tests {
  use rand::{rngs::StdRng, Rng, SeedableRng};
  use super::*;
  use crate::{
    api::collaborators::{CancellationFlag, NeverCancelled},
    core::termination::relation::Relation::{self, *},
    abstractions::IString,
  };

  const F: DefId = DefId(0);
  const G: DefId = DefId(1);
  const H: DefId = DefId(2);

  #[test]
  fn insertion_keeps_the_least_informative_matrices() {
    let mut graph = CallGraph::new(100);
    assert_eq!(graph.insert(CallMatrix::from_rows(F, F, &[&[Equal, Unknown]])), Insertion::Added);
    assert_eq!(graph.insert(CallMatrix::from_rows(F, F, &[&[Unknown, LessThan]])), Insertion::Added);
    assert_eq!(graph.self_loops(F).len(), 2);

    // More informative than both existing matrices.
    assert_eq!(graph.insert(CallMatrix::from_rows(F, F, &[&[LessThan, LessThan]])), Insertion::Subsumed);
    // An equal matrix adds nothing.
    assert_eq!(graph.insert(CallMatrix::from_rows(F, F, &[&[Equal, Unknown]])), Insertion::Subsumed);
    // Less informative than both existing matrices and replaces them.
    assert_eq!(graph.insert(CallMatrix::from_rows(F, F, &[&[Unknown, Unknown]])), Insertion::Added);
    assert_eq!(graph.self_loops(F), &[CallMatrix::from_rows(F, F, &[&[Unknown, Unknown]])]);
  }

  #[test]
  fn a_decreasing_loop_does_not_hide_a_non_decreasing_one() {
    let mut graph = CallGraph::new(100);
    assert_eq!(graph.insert(CallMatrix::from_rows(F, F, &[&[LessThan]])), Insertion::Added);
    assert_eq!(graph.insert(CallMatrix::from_rows(F, F, &[&[Equal]])), Insertion::Added);
    assert_eq!(graph.self_loops(F), &[CallMatrix::from_rows(F, F, &[&[Equal]])]);

    let mut graph = CallGraph::new(100);
    assert_eq!(graph.insert(CallMatrix::from_rows(F, F, &[&[Equal]])), Insertion::Added);
    assert_eq!(graph.insert(CallMatrix::from_rows(F, F, &[&[LessThan]])), Insertion::Subsumed);
    assert_eq!(graph.self_loops(F), &[CallMatrix::from_rows(F, F, &[&[Equal]])]);
  }

  #[test]
  fn mutual_descent_closes_into_decreasing_self_loops() {
    let seeds = vec![
      CallMatrix::from_rows(F, G, &[&[LessThan]]),
      CallMatrix::from_rows(G, F, &[&[LessThan]]),
    ];
    let mut graph = CallGraph::from_seeds(seeds, 100).unwrap();
    assert_eq!(graph.complete(&NeverCancelled), Ok(Completion::Complete));

    assert_eq!(graph.self_loops(F), &[CallMatrix::from_rows(F, F, &[&[LessThan]])]);
    assert_eq!(graph.self_loops(G), &[CallMatrix::from_rows(G, G, &[&[LessThan]])]);
    assert_eq!(graph.vertices(), vec![F, G]);
  }

  #[test]
  fn closure_reaches_transitive_pairs() {
    let seeds = vec![
      CallMatrix::from_rows(F, G, &[&[Equal]]),
      CallMatrix::from_rows(G, H, &[&[LessThan]]),
      CallMatrix::from_rows(H, F, &[&[Equal]]),
    ];
    let mut graph = CallGraph::from_seeds(seeds, 100).unwrap();
    graph.complete(&NeverCancelled).unwrap();
    for vertex in [F, G, H] {
      assert_eq!(graph.self_loops(vertex).len(), 1);
      assert!(graph.self_loops(vertex)[0].has_decreasing_diagonal());
    }
    assert_eq!(graph.edges(F, H), &[CallMatrix::from_rows(F, H, &[&[LessThan]])]);
  }

  fn random_relation(rng: &mut StdRng) -> Relation {
    match rng.gen_range(0..3) {
      0 => LessThan,
      1 => Equal,
      _ => Unknown,
    }
  }

  #[test]
  fn completing_a_complete_graph_changes_nothing() {
    let mut rng = StdRng::seed_from_u64(17);
    let arities = [1usize, 2, 3];
    let vertices = [F, G, H];

    for _ in 0..50 {
      let mut seeds = Vec::new();
      for _ in 0..rng.gen_range(1..6) {
        let (from, to) = (rng.gen_range(0..3), rng.gen_range(0..3));
        let mut matrix = CallMatrix::new(
          vertices[from],
          vertices[to],
          (0..arities[from]).map(|i| IString::from(format!("x{}", i))).collect(),
          (0..arities[to]).map(|i| IString::from(format!("y{}", i))).collect(),
        );
        for x in 0..arities[from] {
          for y in 0..arities[to] {
            matrix.set(x, y, random_relation(&mut rng));
          }
        }
        seeds.push(matrix);
      }

      let mut graph = CallGraph::from_seeds(seeds, 10_000).unwrap();
      assert_eq!(graph.complete(&NeverCancelled), Ok(Completion::Complete));
      let completed = graph.clone();
      assert_eq!(graph.complete(&NeverCancelled), Ok(Completion::Complete));
      assert_eq!(graph, completed);
    }
  }

  /// One `LessThan` at a different position per matrix makes every pair incomparable.
  fn incomparable_self_loops(vertex: DefId, count: usize) -> Vec<CallMatrix> {
    let size = 11;
    (0..count).map(|k| {
      let mut matrix = CallMatrix::from_rows(vertex, vertex, &vec![&[Unknown; 11][..]; size]);
      matrix.set(k / size, k % size, LessThan);
      matrix
    }).collect()
  }

  #[test]
  fn seeding_past_the_cutoff_explodes() {
    assert!(CallGraph::from_seeds(incomparable_self_loops(F, 100), 100).is_ok());
    assert_eq!(CallGraph::from_seeds(incomparable_self_loops(F, 101), 100), Err(F));
  }

  #[test]
  fn completion_explodes_early() {
    let seeds = vec![
      CallMatrix::from_rows(F, G, &[&[Equal, Unknown], &[Unknown, Equal]]),
      CallMatrix::from_rows(G, F, &[&[LessThan, Unknown], &[Unknown, Equal]]),
      CallMatrix::from_rows(G, F, &[&[Equal, Unknown], &[Unknown, LessThan]]),
    ];
    let mut graph = CallGraph::from_seeds(seeds, 1).unwrap();
    assert_eq!(graph.complete(&NeverCancelled), Ok(Completion::Exploded(F)));
    assert_eq!(graph.self_loops(F).len(), 2);
  }

  #[test]
  fn completion_observes_cancellation() {
    let seeds = vec![
      CallMatrix::from_rows(F, G, &[&[LessThan]]),
      CallMatrix::from_rows(G, F, &[&[LessThan]]),
    ];
    let mut graph = CallGraph::from_seeds(seeds, 100).unwrap();
    let token = CancellationFlag::new();
    token.cancel();
    assert_eq!(graph.complete(&token), Err(ComputationInterrupted));
  }
}

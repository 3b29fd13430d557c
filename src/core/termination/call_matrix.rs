/*!

A `CallMatrix` records, for one call from a caller (the *domain*) to a callee (the *codomain*), how every caller
parameter relates to every argument the call passes: entry `(x, y)` is the `Relation` between caller parameter `x` and
the argument given for callee parameter `y`.

Matrices compose like ordinary matrices over the relation semiring: sequencing replaces multiplication and "most
informative" (`min`) replaces addition. A matrix *dominates* another for the same pair of vertices if it is at least
as informative at every entry; the call graph keeps only matrices that dominate no other matrix.

Row and column labels (parameter names) are carried for diagnostics only and play no part in equality or hashing.

*/

use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};

use crate::{
  abstractions::{join_string, IString},
  api::DefId,
  core::{
    format::{FormatStyle, Formattable},
    termination::relation::Relation
  }
};

#[derive(Clone)]
pub struct CallMatrix {
  pub domain  : DefId,
  pub codomain: DefId,
  rows        : usize,
  cols        : usize,
  /// Row major, `rows * cols` entries.
  table       : Vec<Relation>,
  row_labels  : Vec<IString>,
  col_labels  : Vec<IString>,
}

impl CallMatrix {
  /// A matrix of `Unknown`s with one row per caller parameter and one column per callee parameter.
  pub fn new(domain: DefId, codomain: DefId, row_labels: Vec<IString>, col_labels: Vec<IString>) -> CallMatrix {
    let rows = row_labels.len();
    let cols = col_labels.len();
    CallMatrix {
      domain,
      codomain,
      rows,
      cols,
      table: vec![Relation::Unknown; rows * cols],
      row_labels,
      col_labels,
    }
  }

  /// Builds a matrix from explicit rows, labelling parameters `p0`, `p1`, ... All rows must have the same length.
  pub fn from_rows(domain: DefId, codomain: DefId, rows: &[&[Relation]]) -> CallMatrix {
    let cols = rows.first().map_or(0, |row| row.len());
    let mut matrix = CallMatrix::new(domain, codomain, default_labels(rows.len()), default_labels(cols));
    for (x, row) in rows.iter().enumerate() {
      assert_eq!(row.len(), cols, "ragged rows in call matrix");
      for (y, relation) in row.iter().enumerate() {
        matrix.set(x, y, *relation);
      }
    }
    matrix
  }

  #[inline(always)]
  pub fn rows(&self) -> usize {
    self.rows
  }

  #[inline(always)]
  pub fn cols(&self) -> usize {
    self.cols
  }

  #[inline(always)]
  pub fn get(&self, row: usize, col: usize) -> Relation {
    self.table[row * self.cols + col]
  }

  #[inline(always)]
  pub fn set(&mut self, row: usize, col: usize, relation: Relation) {
    self.table[row * self.cols + col] = relation;
  }

  pub fn row_labels(&self) -> &[IString] {
    &self.row_labels
  }

  pub fn col_labels(&self) -> &[IString] {
    &self.col_labels
  }

  #[inline(always)]
  pub fn is_self_loop(&self) -> bool {
    self.domain == self.codomain
  }

  /// The matrix of the call sequence `self` then `next`: entry `(x, z)` is the most informative
  /// `self[x, y].compose(next[y, z])` over all `y`.
  pub fn compose(&self, next: &CallMatrix) -> CallMatrix {
    assert_eq!(self.codomain, next.domain, "composed call matrices do not share a vertex");
    assert_eq!(self.cols, next.rows, "composed call matrices disagree on the arity of the shared vertex");

    let mut result = CallMatrix::new(self.domain, next.codomain, self.row_labels.clone(), next.col_labels.clone());
    for x in 0..self.rows {
      for z in 0..next.cols {
        let relation = (0..self.cols)
            .map(|y| self.get(x, y).compose(next.get(y, z)))
            .min()
            .unwrap_or(Relation::Unknown);
        result.set(x, z, relation);
      }
    }
    result
  }

  /// Is `self` at least as informative as `other` at every entry? Matrices for different vertex pairs never dominate
  /// each other.
  pub fn dominates(&self, other: &CallMatrix) -> bool {
    self.domain == other.domain
        && self.codomain == other.codomain
        && self.rows == other.rows
        && self.cols == other.cols
        && self.table.iter().zip(other.table.iter()).all(|(mine, theirs)| mine.refines(*theirs))
  }

  /// The diagonal of a self-loop: how each parameter relates to the value passed back in its own position.
  pub fn diagonal(&self) -> Vec<Relation> {
    (0..self.rows.min(self.cols)).map(|i| self.get(i, i)).collect()
  }

  pub fn has_decreasing_diagonal(&self) -> bool {
    (0..self.rows.min(self.cols)).any(|i| self.get(i, i).is_less_than())
  }

  pub fn contains_less_than(&self) -> bool {
    self.table.iter().any(|relation| relation.is_less_than())
  }

  /// Is composing this self-loop with itself a no-op?
  pub fn is_idempotent(&self) -> bool {
    self.is_self_loop() && self.rows == self.cols && self.compose(self) == *self
  }
}

fn default_labels(count: usize) -> Vec<IString> {
  (0..count).map(|i| IString::from(format!("p{}", i))).collect()
}

impl PartialEq for CallMatrix {
  fn eq(&self, other: &Self) -> bool {
    self.rows == other.rows && self.cols == other.cols && self.table == other.table
  }
}

impl Eq for CallMatrix {}

impl Hash for CallMatrix {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.rows.hash(state);
    self.cols.hash(state);
    self.table.hash(state);
  }
}

impl Formattable for CallMatrix {
  fn repr(&self, style: FormatStyle) -> String {
    let row_text = |x: usize| (0..self.cols).map(|y| self.get(x, y).symbol()).collect::<String>();
    match style {

      FormatStyle::Simple => {
        format!(
          "{} -> {} [{}]",
          self.domain,
          self.codomain,
          join_string((0..self.rows).map(row_text), "; ")
        )
      }

      FormatStyle::Default => {
        let mut text = format!("{} -> {}\n", self.domain, self.codomain);
        for x in 0..self.rows {
          text.push_str(&format!("  {}\n", join_string(row_text(x).chars(), " ")));
        }
        text
      }

      FormatStyle::Debug => {
        let width = self.row_labels.iter().map(|label| label.chars().count()).max().unwrap_or(0);
        let mut text = format!(
          "{} -> {}\n  {:width$} {}\n",
          self.domain,
          self.codomain,
          "",
          join_string(self.col_labels.iter(), " "),
          width = width
        );
        for x in 0..self.rows {
          text.push_str(&format!(
            "  {:width$} {}\n",
            &*self.row_labels[x],
            join_string(row_text(x).chars(), " "),
            width = width
          ));
        }
        text
      }

    } // end match on `FormatStyle`
  }
}

impl Display for CallMatrix {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.repr(FormatStyle::Simple))
  }
}

impl Debug for CallMatrix {
  fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
    Display::fmt(self, f)
  }
}

#[cfg(test)]
mod tests {
  use rand::{rngs::StdRng, Rng, SeedableRng};
  use super::*;
  use Relation::*;

  const F: DefId = DefId(0);
  const G: DefId = DefId(1);
  const H: DefId = DefId(2);
  const K: DefId = DefId(3);

  fn random_matrix(rng: &mut StdRng, domain: DefId, codomain: DefId, rows: usize, cols: usize) -> CallMatrix {
    let mut matrix = CallMatrix::new(domain, codomain, default_labels(rows), default_labels(cols));
    for x in 0..rows {
      for y in 0..cols {
        let relation = match rng.gen_range(0..3) {
          0 => LessThan,
          1 => Equal,
          _ => Unknown,
        };
        matrix.set(x, y, relation);
      }
    }
    matrix
  }

  #[test]
  fn composition_picks_most_informative_midpoint() {
    // f(x, y) calls g(y, x), g(a, b) calls h(pred a)
    let f_to_g = CallMatrix::from_rows(F, G, &[&[Unknown, Equal], &[Equal, Unknown]]);
    let g_to_h = CallMatrix::from_rows(G, H, &[&[LessThan], &[Unknown]]);
    let f_to_h = f_to_g.compose(&g_to_h);

    assert_eq!(f_to_h.domain, F);
    assert_eq!(f_to_h.codomain, H);
    assert_eq!(f_to_h, CallMatrix::from_rows(F, H, &[&[Unknown], &[LessThan]]));
  }

  #[test]
  fn composition_is_associative() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..200 {
      // The shared vertices need at least one parameter: with none, `LessThan.compose(_)` has no midpoint to act on.
      let (x, y, z, w) = (rng.gen_range(0..4), rng.gen_range(1..4), rng.gen_range(1..4), rng.gen_range(0..4));
      let a = random_matrix(&mut rng, F, G, x, y);
      let b = random_matrix(&mut rng, G, H, y, z);
      let c = random_matrix(&mut rng, H, K, z, w);
      assert_eq!(a.compose(&b).compose(&c), a.compose(&b.compose(&c)));
    }
  }

  #[test]
  #[should_panic(expected = "do not share a vertex")]
  fn composition_requires_shared_vertex() {
    let a = CallMatrix::from_rows(F, G, &[&[Equal]]);
    let b = CallMatrix::from_rows(H, F, &[&[Equal]]);
    let _ = a.compose(&b);
  }

  #[test]
  fn dominance() {
    let strong = CallMatrix::from_rows(F, F, &[&[LessThan, Equal]]);
    let weak   = CallMatrix::from_rows(F, F, &[&[Equal, Unknown]]);
    let other  = CallMatrix::from_rows(F, F, &[&[Unknown, LessThan]]);

    assert!(strong.dominates(&weak));
    assert!(!weak.dominates(&strong));
    assert!(strong.dominates(&strong));
    assert!(!strong.dominates(&other) && !other.dominates(&strong));
    assert!(!CallMatrix::from_rows(F, G, &[&[LessThan, LessThan]]).dominates(&weak));
  }

  #[test]
  fn labels_do_not_affect_equality() {
    let mut labelled = CallMatrix::new(F, F, vec![IString::from("n")], vec![IString::from("n")]);
    labelled.set(0, 0, LessThan);
    assert_eq!(labelled, CallMatrix::from_rows(F, F, &[&[LessThan]]));
    assert_eq!(labelled.repr(FormatStyle::Simple), "#0 -> #0 [<]");
    assert_eq!(labelled.repr(FormatStyle::Debug), "#0 -> #0\n    n\n  n <\n");
  }

  #[test]
  fn loop_predicates() {
    let equal_loop = CallMatrix::from_rows(F, F, &[&[Equal]]);
    assert!(equal_loop.is_idempotent());
    assert!(!equal_loop.has_decreasing_diagonal());
    assert!(!equal_loop.contains_less_than());

    let swap = CallMatrix::from_rows(F, F, &[&[Unknown, Equal], &[Equal, Unknown]]);
    assert!(!swap.is_idempotent());
    assert_eq!(swap.compose(&swap).diagonal(), vec![Equal, Equal]);
    assert!(swap.compose(&swap).is_idempotent());
  }
}

/*!

The three-valued relation between a caller's parameter and an argument it passes.

|             | meaning                                                      |
|:------------|:-------------------------------------------------------------|
| `LessThan`  | the argument is a strict structural sub-term of the parameter |
| `Equal`     | the argument is the parameter itself                          |
| `Unknown`   | nothing is known                                              |

Relations are ordered by how much they say: `LessThan ⊑ Equal ⊑ Unknown`. The derived `Ord` is exactly this order,
so `min` picks the most informative of two relations and `Unknown` is the top element.

*/

use std::fmt::{Display, Formatter};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub enum Relation {
  LessThan,
  Equal,
  #[default]
  Unknown,
}

impl Relation {
  /// Sequences two relations: `self` relates `x` to `y`, `next` relates `y` to `z`.
  ///
  /// `compose(LessThan, _) = LessThan`, `compose(Equal, r) = r`, `compose(Unknown, _) = Unknown`. Associative, not
  /// commutative.
  #[inline(always)]
  pub fn compose(self, next: Relation) -> Relation {
    match self {
      Relation::LessThan => Relation::LessThan,
      Relation::Equal    => next,
      Relation::Unknown  => Relation::Unknown,
    }
  }

  /// Is `self` at least as informative as `other`?
  #[inline(always)]
  pub fn refines(self, other: Relation) -> bool {
    self <= other
  }

  #[inline(always)]
  pub fn is_less_than(self) -> bool {
    self == Relation::LessThan
  }

  pub fn symbol(self) -> char {
    match self {
      Relation::LessThan => '<',
      Relation::Equal    => '=',
      Relation::Unknown  => '?',
    }
  }
}

impl Display for Relation {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.symbol())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use Relation::*;

  const ALL: [Relation; 3] = [LessThan, Equal, Unknown];

  #[test]
  fn composition_table() {
    assert_eq!(LessThan.compose(Unknown), LessThan);
    assert_eq!(Unknown.compose(LessThan), Unknown);
    assert_eq!(Equal.compose(Equal), Equal);
    assert_eq!(Equal.compose(LessThan), LessThan);
    assert_eq!(Equal.compose(Unknown), Unknown);
  }

  #[test]
  fn composition_is_associative_but_not_commutative() {
    for a in ALL {
      for b in ALL {
        for c in ALL {
          assert_eq!(a.compose(b).compose(c), a.compose(b.compose(c)), "{} {} {}", a, b, c);
        }
      }
    }
    assert_ne!(LessThan.compose(Unknown), Unknown.compose(LessThan));
  }

  #[test]
  fn order_and_min() {
    assert!(LessThan < Equal && Equal < Unknown);
    assert_eq!(Equal.min(LessThan), LessThan);
    assert_eq!(Unknown.min(Equal), Equal);
    assert!(LessThan.refines(Unknown));
    assert!(!Unknown.refines(Equal));
    assert_eq!(Relation::default(), Unknown);
  }
}

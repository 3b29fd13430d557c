/*!

The elimination form of a compiled function body. The elaborator desugars pattern-matching clauses into a tree of
case splits (`Body::Case`) with ordinary expressions at the leaves; the call extractor walks this tree, refining what
it knows about each variable at every split.

Nested patterns become nested case splits, so a branch pattern only ever binds variables for the immediate
sub-positions of the value being split.

*/

use crate::{
  abstractions::IString,
  api::{DefId, VarId}
};

/// A formal parameter of a function. The `variable` is how the parameter is referred to inside the body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
  pub name    : IString,
  pub variable: VarId,
}

impl Parameter {
  pub fn new(name: impl Into<IString>, variable: VarId) -> Parameter {
    Parameter { name: name.into(), variable }
  }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Body {
  Leaf(Expr),
  Case {
    scrutinee: Expr,
    branches : Vec<Branch>,
  },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Branch {
  pub pattern: BranchPattern,
  pub body   : Body,
}

/// A variable bound by a constructor pattern.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PatternArgument {
  pub variable : VarId,
  /// Whether the argument's type is a recursive occurrence of the inductive family being matched. Descending into a
  /// non-recursive argument (an element of some other, nested type) does not count as getting smaller.
  pub recursive: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum BranchPattern {
  Constructor {
    constructor: DefId,
    arguments  : Vec<PatternArgument>,
  },
  /// Splits a tuple or sigma value into its components.
  Tuple(Vec<VarId>),
  /// Splits a class instance into (some of) its fields.
  Record(Vec<(DefId, VarId)>),
  /// The endpoints of the interval. These bind nothing.
  IntervalLeft,
  IntervalRight,
  /// An impossible case. Binds nothing.
  Absurd,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
  Var(VarId),
  /// A reference to a global definition that is not in call position.
  Reference(DefId),
  Call {
    target   : DefId,
    arguments: Vec<Expr>,
  },
  App {
    function: Box<Expr>,
    argument: Box<Expr>,
  },
  Proj {
    expr : Box<Expr>,
    index: usize,
  },
  PathAt {
    path : Box<Expr>,
    point: Box<Expr>,
  },
  FieldCall {
    field: DefId,
    expr : Box<Expr>,
  },
  Lambda {
    parameter: VarId,
    body     : Box<Expr>,
  },
  Let {
    variable: VarId,
    value   : Box<Expr>,
    body    : Box<Expr>,
  },
  Tuple(Vec<Expr>),
  Constructor {
    constructor: DefId,
    arguments  : Vec<Expr>,
  },
  Case(Box<Body>),
  IntervalLeft,
  IntervalRight,
  Literal(i64),
  /// Anything else the elaborator produces (type annotations, universes, ...). Only the children are inspected.
  Opaque(Vec<Expr>),
}

impl Expr {
  pub fn var(id: u32) -> Expr {
    Expr::Var(VarId(id))
  }

  pub fn call(target: DefId, arguments: Vec<Expr>) -> Expr {
    Expr::Call { target, arguments }
  }

  pub fn app(function: Expr, argument: Expr) -> Expr {
    Expr::App { function: Box::new(function), argument: Box::new(argument) }
  }

  pub fn proj(expr: Expr, index: usize) -> Expr {
    Expr::Proj { expr: Box::new(expr), index }
  }

  pub fn path_at(path: Expr, point: Expr) -> Expr {
    Expr::PathAt { path: Box::new(path), point: Box::new(point) }
  }

  pub fn field_call(field: DefId, expr: Expr) -> Expr {
    Expr::FieldCall { field, expr: Box::new(expr) }
  }

  pub fn constructor(constructor: DefId, arguments: Vec<Expr>) -> Expr {
    Expr::Constructor { constructor, arguments }
  }

  /// Is this a literal endpoint of the interval?
  pub fn is_interval_endpoint(&self) -> bool {
    matches!(self, Expr::IntervalLeft | Expr::IntervalRight)
  }

  /// Splits an application spine `((h a) b) c` into its head `h` and arguments `[a, b, c]`.
  pub fn spine(&self) -> (&Expr, Vec<&Expr>) {
    let mut head      = self;
    let mut arguments = Vec::new();
    while let Expr::App { function, argument } = head {
      arguments.push(argument.as_ref());
      head = function.as_ref();
    }
    arguments.reverse();
    (head, arguments)
  }
}

/*!

What the extractor knows about the variables of a body at some point in the elimination tree. Every variable that is
derived from a formal parameter by pattern matching has a `Position`: the parameter it came from and the chain of
eliminations (constructor arguments, tuple projections, class fields, path endpoints) that lead from the parameter to
the variable. Each case split extends the positions of the variables it binds by one more elimination.

An argument expression is classified by stripping the eliminations wrapped around it, finding the position of the
variable at its core, and looking at the whole chain:

 - no eliminations at all: the argument *is* the parameter, `Equal`;
 - at least one descent into a recursive constructor argument or a path endpoint, and no descent into a
   non-recursive (nested) type: a strict sub-term, `LessThan`;
 - anything else: `Unknown`.

*/

use std::collections::HashMap;

use crate::{
  api::{
    expression::{BranchPattern, Expr, Parameter, PatternArgument},
    DefId,
    VarId
  },
  core::termination::relation::Relation
};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Elimination {
  ConstructorArgument {
    constructor: DefId,
    index      : usize,
    recursive  : bool,
  },
  Projection(usize),
  Field(DefId),
  /// A path applied to a literal endpoint of the interval.
  PathEndpoint,
  /// A path applied to anything else.
  PathApplication,
  /// A function-valued sub-term applied to an argument.
  Application,
}

impl Elimination {
  /// Does this elimination certainly produce a strictly smaller value?
  pub fn is_descent(self) -> bool {
    matches!(
      self,
      Elimination::ConstructorArgument { recursive: true, .. } | Elimination::PathEndpoint
    )
  }

  /// Does this elimination step into a type outside the family being recursed on?
  pub fn leaves_family(self) -> bool {
    matches!(self, Elimination::ConstructorArgument { recursive: false, .. })
  }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Position {
  /// Index of the formal parameter this position is rooted at.
  pub parameter: usize,
  pub path     : Vec<Elimination>,
}

impl Position {
  pub fn whole(parameter: usize) -> Position {
    Position { parameter, path: Vec::new() }
  }

  pub fn extended(&self, elimination: Elimination) -> Position {
    let mut path = self.path.clone();
    path.push(elimination);
    Position { parameter: self.parameter, path }
  }

  /// How a value at this position relates to the whole parameter.
  pub fn relation(&self) -> Relation {
    if self.path.is_empty() {
      Relation::Equal
    } else if self.path.iter().any(|e| e.leaves_family()) {
      Relation::Unknown
    } else if self.path.iter().any(|e| e.is_descent()) {
      Relation::LessThan
    } else {
      Relation::Unknown
    }
  }
}

/// A constructor pattern matched at a known position, remembered so that rebuilding the same constructor from the
/// same variables can be recognized as the matched value itself.
#[derive(Clone, Debug)]
struct MatchedConstructor {
  position   : Position,
  constructor: DefId,
  arguments  : Vec<PatternArgument>,
}

#[derive(Clone, Debug, Default)]
pub struct PatternContext {
  positions: HashMap<VarId, Position>,
  matched  : Vec<MatchedConstructor>,
}

impl PatternContext {
  /// The context at the root of a body: each parameter is at its own whole position.
  pub fn for_parameters(parameters: &[Parameter]) -> PatternContext {
    let positions = parameters.iter()
                              .enumerate()
                              .map(|(i, parameter)| (parameter.variable, Position::whole(i)))
                              .collect();
    PatternContext { positions, matched: Vec::new() }
  }

  pub fn position(&self, variable: VarId) -> Option<&Position> {
    self.positions.get(&variable)
  }

  /// Binds `variable` to `position`, or shadows whatever it was bound to if `position` is `None`.
  pub fn bind(&mut self, variable: VarId, position: Option<Position>) {
    match position {
      Some(position) => { self.positions.insert(variable, position); }
      None           => { self.positions.remove(&variable); }
    }
  }

  /// Strips eliminations off `expr` and resolves the core to a position, if it has one.
  pub fn resolve(&self, expr: &Expr) -> Option<Position> {
    let mut popped = Vec::new();
    let mut core   = expr;
    loop {
      match core {
        Expr::Proj { expr, index } => {
          popped.push(Elimination::Projection(*index));
          core = expr.as_ref();
        }
        Expr::App { function, .. } => {
          popped.push(Elimination::Application);
          core = function.as_ref();
        }
        Expr::PathAt { path, point } => {
          popped.push(
            if point.is_interval_endpoint() { Elimination::PathEndpoint } else { Elimination::PathApplication }
          );
          core = path.as_ref();
        }
        Expr::FieldCall { field, expr } => {
          popped.push(Elimination::Field(*field));
          core = expr.as_ref();
        }
        _ => break,
      }
    }

    let mut position = match core {
      Expr::Var(variable) => self.positions.get(variable)?.clone(),
      Expr::Constructor { constructor, arguments } => self.rebuilt(*constructor, arguments)?,
      _ => return None,
    };
    // Eliminations were popped outermost first.
    position.path.extend(popped.into_iter().rev());
    Some(position)
  }

  /// If `constructor` applied to `arguments` rebuilds exactly a value that was matched earlier, its position.
  fn rebuilt(&self, constructor: DefId, arguments: &[Expr]) -> Option<Position> {
    self.matched
        .iter()
        .rev()
        .find(|matched| {
          matched.constructor == constructor
              && matched.arguments.len() == arguments.len()
              && matched.arguments.iter().zip(arguments.iter()).enumerate().all(|(index, (pattern, argument))| {
                let expected = matched.position.extended(Elimination::ConstructorArgument {
                  constructor,
                  index,
                  recursive: pattern.recursive,
                });
                matches!(argument, Expr::Var(v) if *v == pattern.variable && self.positions.get(v) == Some(&expected))
              })
        })
        .map(|matched| matched.position.clone())
  }

  /// The context inside the branch of a case split on `scrutinee` with the given pattern.
  pub fn refine(&self, scrutinee: &Expr, pattern: &BranchPattern) -> PatternContext {
    let mut refined = self.clone();
    let base = self.resolve(scrutinee);
    let extend = |elimination: Elimination| base.as_ref().map(|position| position.extended(elimination));

    match pattern {

      BranchPattern::Constructor { constructor, arguments } => {
        for (index, argument) in arguments.iter().enumerate() {
          let elimination = Elimination::ConstructorArgument {
            constructor: *constructor,
            index,
            recursive  : argument.recursive,
          };
          refined.bind(argument.variable, extend(elimination));
        }
        if let Some(position) = base.clone() {
          refined.matched.push(MatchedConstructor {
            position,
            constructor: *constructor,
            arguments  : arguments.clone(),
          });
        }
      }

      BranchPattern::Tuple(variables) => {
        for (index, variable) in variables.iter().enumerate() {
          refined.bind(*variable, extend(Elimination::Projection(index)));
        }
      }

      BranchPattern::Record(fields) => {
        for (field, variable) in fields.iter() {
          refined.bind(*variable, extend(Elimination::Field(*field)));
        }
      }

      BranchPattern::IntervalLeft
      | BranchPattern::IntervalRight
      | BranchPattern::Absurd => {}

    } // end match on `BranchPattern`

    refined
  }
}

/*!

Extracts the call matrices of a recursive group. For every call, inside the body of a group member, to a definition in
the same group, one `CallMatrix` is produced whose rows are the caller's parameters and whose columns are the callee's
parameters.

Calls are recognized in three forms: an explicit `Call`, an application spine whose head is a `Reference` to a member,
and a bare `Reference` to a member (a recursive function used as a value), which is treated as a call with no
arguments, every entry `Unknown`.

*/

use std::collections::BTreeMap;

use crate::{
  abstractions::{IString, NatSet},
  api::{
    expression::{Body, Expr, Parameter},
    DefId
  },
  core::termination::{
    call_matrix::CallMatrix,
    pattern_context::PatternContext
  },
  debug,
  trace
};

/// The compiled body of one group member together with its formal parameters.
#[derive(Copy, Clone, Debug)]
pub struct FunctionSource<'a> {
  pub definition: DefId,
  pub parameters: &'a [Parameter],
  pub body      : &'a Body,
}

pub struct CallExtractor {
  members   : NatSet,
  /// Parameter names of every member. Column labels, and the arity of each possible callee.
  signatures: BTreeMap<DefId, Vec<IString>>,
}

impl CallExtractor {
  pub fn new(sources: &[FunctionSource<'_>]) -> CallExtractor {
    let members    = sources.iter().map(|source| source.definition.index()).collect();
    let signatures = sources.iter()
                            .map(|source| (source.definition, labels(source.parameters)))
                            .collect();
    CallExtractor { members, signatures }
  }

  #[inline(always)]
  pub fn is_member(&self, definition: DefId) -> bool {
    self.members.contains(definition.index())
  }

  /// The call matrices of every call in `source` to a group member, in the order the calls occur.
  pub fn extract(&self, source: &FunctionSource<'_>) -> Vec<CallMatrix> {
    let mut walk = Walk {
      extractor : self,
      caller    : source.definition,
      row_labels: labels(source.parameters),
      calls     : Vec::new(),
    };
    walk.body(source.body, &PatternContext::for_parameters(source.parameters));
    debug!(3, "extracted {} recursive calls from {}", walk.calls.len(), source.definition);
    walk.calls
  }

  pub fn extract_all(&self, sources: &[FunctionSource<'_>]) -> Vec<CallMatrix> {
    sources.iter().flat_map(|source| self.extract(source)).collect()
  }
}

fn labels(parameters: &[Parameter]) -> Vec<IString> {
  parameters.iter().map(|parameter| parameter.name.clone()).collect()
}

struct Walk<'e> {
  extractor : &'e CallExtractor,
  caller    : DefId,
  row_labels: Vec<IString>,
  calls     : Vec<CallMatrix>,
}

impl<'e> Walk<'e> {
  fn body(&mut self, body: &Body, context: &PatternContext) {
    match body {
      Body::Leaf(expr) => self.expr(expr, context),
      Body::Case { scrutinee, branches } => {
        self.expr(scrutinee, context);
        for branch in branches {
          let refined = context.refine(scrutinee, &branch.pattern);
          self.body(&branch.body, &refined);
        }
      }
    }
  }

  fn expr(&mut self, expr: &Expr, context: &PatternContext) {
    match expr {

      Expr::Var(_)
      | Expr::IntervalLeft
      | Expr::IntervalRight
      | Expr::Literal(_) => {}

      Expr::Reference(target) => {
        if self.extractor.is_member(*target) {
          self.record(*target, &[], context);
        }
      }

      Expr::Call { target, arguments } => {
        if self.extractor.is_member(*target) {
          let arguments: Vec<&Expr> = arguments.iter().collect();
          self.record(*target, &arguments, context);
        }
        for argument in arguments {
          self.expr(argument, context);
        }
      }

      Expr::App { .. } => {
        let (head, arguments) = expr.spine();
        match head {
          Expr::Reference(target) if self.extractor.is_member(*target) => {
            self.record(*target, &arguments, context);
          }
          _ => self.expr(head, context),
        }
        for argument in arguments {
          self.expr(argument, context);
        }
      }

      Expr::Proj { expr, .. }
      | Expr::FieldCall { expr, .. } => self.expr(expr, context),

      Expr::PathAt { path, point } => {
        self.expr(path, context);
        self.expr(point, context);
      }

      Expr::Lambda { parameter, body } => {
        let mut inner = context.clone();
        inner.bind(*parameter, None);
        self.expr(body, &inner);
      }

      Expr::Let { variable, value, body } => {
        self.expr(value, context);
        let mut inner = context.clone();
        inner.bind(*variable, context.resolve(value));
        self.expr(body, &inner);
      }

      Expr::Tuple(items)
      | Expr::Opaque(items)
      | Expr::Constructor { arguments: items, .. } => {
        for item in items {
          self.expr(item, context);
        }
      }

      Expr::Case(body) => self.body(body, context),

    } // end match on `Expr`
  }

  fn record(&mut self, target: DefId, arguments: &[&Expr], context: &PatternContext) {
    let Some(col_labels) = self.extractor.signatures.get(&target) else {
      return;
    };
    let mut matrix = CallMatrix::new(self.caller, target, self.row_labels.clone(), col_labels.clone());

    // Missing arguments (partial application) stay `Unknown`; surplus arguments have no column.
    for (column, argument) in arguments.iter().take(col_labels.len()).enumerate() {
      if let Some(position) = context.resolve(argument) {
        if position.parameter < matrix.rows() {
          matrix.set(position.parameter, column, position.relation());
        }
      }
    }

    trace!(4, "call {}", matrix);
    self.calls.push(matrix);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    api::{
      expression::{Branch, BranchPattern, PatternArgument},
      VarId
    },
    core::termination::relation::Relation::*,
  };

  const F   : DefId = DefId(0);
  const G   : DefId = DefId(1);
  const ACK : DefId = DefId(2);
  const ZERO: DefId = DefId(10);
  const SUCC: DefId = DefId(11);
  const NIL : DefId = DefId(12);
  const CONS: DefId = DefId(13);
  const OTHER: DefId = DefId(30);

  fn v(id: u32) -> VarId {
    VarId(id)
  }

  /// `case n { zero => zero_case, succ(m) => succ_case }`
  fn split_nat(n: Expr, m: VarId, zero_case: Body, succ_case: Body) -> Body {
    Body::Case {
      scrutinee: n,
      branches : vec![
        Branch {
          pattern: BranchPattern::Constructor { constructor: ZERO, arguments: vec![] },
          body   : zero_case,
        },
        Branch {
          pattern: BranchPattern::Constructor {
            constructor: SUCC,
            arguments  : vec![PatternArgument { variable: m, recursive: true }],
          },
          body   : succ_case,
        },
      ],
    }
  }

  fn extract_one(definition: DefId, parameters: &[Parameter], body: &Body) -> Vec<CallMatrix> {
    let source = FunctionSource { definition, parameters, body };
    CallExtractor::new(&[source]).extract(&source)
  }

  #[test]
  fn structural_descent_on_nat() {
    let parameters = [Parameter::new("n", v(0))];
    let body = split_nat(
      Expr::Var(v(0)),
      v(1),
      Body::Leaf(Expr::Literal(0)),
      Body::Leaf(Expr::call(F, vec![Expr::Var(v(1))])),
    );
    let calls = extract_one(F, &parameters, &body);
    assert_eq!(calls, vec![CallMatrix::from_rows(F, F, &[&[LessThan]])]);
    assert_eq!(calls[0].row_labels(), &[IString::from("n")]);
  }

  #[test]
  fn unchanged_and_arbitrary_arguments() {
    let parameters = [Parameter::new("n", v(0))];
    let body = Body::Leaf(Expr::Opaque(vec![
      Expr::call(F, vec![Expr::Var(v(0))]),
      Expr::call(F, vec![Expr::call(OTHER, vec![Expr::Var(v(0))])]),
    ]));
    let calls = extract_one(F, &parameters, &body);
    assert_eq!(
      calls,
      vec![
        CallMatrix::from_rows(F, F, &[&[Equal]]),
        CallMatrix::from_rows(F, F, &[&[Unknown]]),
      ]
    );
  }

  #[test]
  fn list_tail_but_not_head() {
    // f(xs) = case xs { nil => 0, cons(h, t) => f(t) + f(h) }
    let parameters = [Parameter::new("xs", v(0))];
    let body = Body::Case {
      scrutinee: Expr::Var(v(0)),
      branches : vec![
        Branch {
          pattern: BranchPattern::Constructor { constructor: NIL, arguments: vec![] },
          body   : Body::Leaf(Expr::Literal(0)),
        },
        Branch {
          pattern: BranchPattern::Constructor {
            constructor: CONS,
            arguments  : vec![
              PatternArgument { variable: v(1), recursive: false },
              PatternArgument { variable: v(2), recursive: true },
            ],
          },
          body   : Body::Leaf(Expr::Opaque(vec![
            Expr::call(F, vec![Expr::Var(v(2))]),
            Expr::call(F, vec![Expr::Var(v(1))]),
          ])),
        },
      ],
    };
    let calls = extract_one(F, &parameters, &body);
    assert_eq!(calls[0], CallMatrix::from_rows(F, F, &[&[LessThan]]));
    assert_eq!(calls[1], CallMatrix::from_rows(F, F, &[&[Unknown]]));
  }

  #[test]
  fn mutual_calls_use_callee_columns() {
    // f(a, b) = case a { zero => 0, succ(m) => g(m) }   g(c) = f(c, c)
    let f_parameters = [Parameter::new("a", v(0)), Parameter::new("b", v(1))];
    let f_body = split_nat(
      Expr::Var(v(0)),
      v(2),
      Body::Leaf(Expr::Literal(0)),
      Body::Leaf(Expr::call(G, vec![Expr::Var(v(2))])),
    );
    let g_parameters = [Parameter::new("c", v(0))];
    let g_body = Body::Leaf(Expr::call(F, vec![Expr::Var(v(0)), Expr::Var(v(0))]));

    let sources = [
      FunctionSource { definition: F, parameters: &f_parameters, body: &f_body },
      FunctionSource { definition: G, parameters: &g_parameters, body: &g_body },
    ];
    let calls = CallExtractor::new(&sources).extract_all(&sources);
    assert_eq!(
      calls,
      vec![
        CallMatrix::from_rows(F, G, &[&[LessThan], &[Unknown]]),
        CallMatrix::from_rows(G, F, &[&[Equal, Equal]]),
      ]
    );
    assert_eq!(calls[1].col_labels(), &[IString::from("a"), IString::from("b")]);
  }

  #[test]
  fn ackermann_recognizes_rebuilt_patterns() {
    // ack(m, n) = case m { zero => succ(n),
    //                      succ(p) => case n { zero => ack(p, 1), succ(q) => ack(p, ack(succ(p), q)) } }
    let parameters = [Parameter::new("m", v(0)), Parameter::new("n", v(1))];
    let (p, q) = (v(2), v(3));
    let inner = split_nat(
      Expr::Var(v(1)),
      q,
      Body::Leaf(Expr::call(ACK, vec![Expr::Var(p), Expr::Literal(1)])),
      Body::Leaf(Expr::call(ACK, vec![
        Expr::Var(p),
        Expr::call(ACK, vec![Expr::constructor(SUCC, vec![Expr::Var(p)]), Expr::Var(q)]),
      ])),
    );
    let body = split_nat(
      Expr::Var(v(0)),
      p,
      Body::Leaf(Expr::constructor(SUCC, vec![Expr::Var(v(1))])),
      inner,
    );
    let calls = extract_one(ACK, &parameters, &body);
    assert_eq!(
      calls,
      vec![
        CallMatrix::from_rows(ACK, ACK, &[&[LessThan, Unknown], &[Unknown, Unknown]]),
        CallMatrix::from_rows(ACK, ACK, &[&[LessThan, Unknown], &[Unknown, Unknown]]),
        CallMatrix::from_rows(ACK, ACK, &[&[Equal, Unknown], &[Unknown, LessThan]]),
      ]
    );
  }

  #[test]
  fn spines_partial_application_and_bare_references() {
    let parameters = [Parameter::new("x", v(0)), Parameter::new("y", v(1))];
    let body = Body::Leaf(Expr::Opaque(vec![
      Expr::app(Expr::Reference(F), Expr::Var(v(1))),
      Expr::call(OTHER, vec![Expr::Reference(F)]),
    ]));
    let calls = extract_one(F, &parameters, &body);
    assert_eq!(
      calls,
      vec![
        CallMatrix::from_rows(F, F, &[&[Unknown, Unknown], &[Equal, Unknown]]),
        CallMatrix::from_rows(F, F, &[&[Unknown, Unknown], &[Unknown, Unknown]]),
      ]
    );
  }

  #[test]
  fn binders_shadow_and_let_aliases() {
    // f(n) = case n { zero => 0, succ(m) => (λm. f(m)) (let k = m in f(k)) }
    let parameters = [Parameter::new("n", v(0))];
    let m = v(1);
    let body = split_nat(
      Expr::Var(v(0)),
      m,
      Body::Leaf(Expr::Literal(0)),
      Body::Leaf(Expr::app(
        Expr::Lambda { parameter: m, body: Box::new(Expr::call(F, vec![Expr::Var(m)])) },
        Expr::Let {
          variable: v(2),
          value   : Box::new(Expr::Var(m)),
          body    : Box::new(Expr::call(F, vec![Expr::Var(v(2))])),
        },
      )),
    );
    let calls = extract_one(F, &parameters, &body);
    assert_eq!(
      calls,
      vec![
        CallMatrix::from_rows(F, F, &[&[Unknown]]),
        CallMatrix::from_rows(F, F, &[&[LessThan]]),
      ]
    );
  }

  #[test]
  fn nested_calls_are_all_recorded() {
    // f(n) = case n { zero => 0, succ(m) => f(f(m)) }
    let parameters = [Parameter::new("n", v(0))];
    let body = split_nat(
      Expr::Var(v(0)),
      v(1),
      Body::Leaf(Expr::Literal(0)),
      Body::Leaf(Expr::call(F, vec![Expr::call(F, vec![Expr::Var(v(1))])])),
    );
    let calls = extract_one(F, &parameters, &body);
    assert_eq!(
      calls,
      vec![
        CallMatrix::from_rows(F, F, &[&[Unknown]]),
        CallMatrix::from_rows(F, F, &[&[LessThan]]),
      ]
    );
  }
}

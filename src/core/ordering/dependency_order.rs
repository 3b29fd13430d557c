/*!

Splits the dependency graph reachable from a batch of roots into strongly connected components with Tarjan's
algorithm and delivers each component to an `OrderingListener` as soon as it is complete. Tarjan's algorithm closes a
component only after every component it depends on has been closed, so dependencies are always delivered first.

A component is delivered as

 - `unit_found(d, false)` if it is a single definition that does not refer to itself,
 - `unit_found(d, true)` if it is a single function-like definition that refers to itself,
 - `cycle_found(members)` if any member cannot be recursive (a data type referring to itself included),
 - `header_found(m)` for each member and then `bodies_found(members)` otherwise.

Members are always listed in increasing id order, and dependencies are visited in increasing id order, so the event
sequence is a function of the dependency graph alone.

Definitions that are not `NeedsCheck` when the order is created are *settled*: they are treated as already delivered
and never traversed.

*/

use crate::{
  abstractions::{join_string, NatSet},
  api::{
    collaborators::{CancellationToken, DependencyCollector},
    ComputationInterrupted,
    DefId,
    DefinitionKind,
    DefinitionStatus,
    DefinitionTable,
    OrderingListener
  },
  debug,
  trace,
  warning
};

/// A definition whose dependencies are being visited.
struct Frame {
  definition  : DefId,
  dependencies: Vec<DefId>,
  /// The next dependency to visit.
  next        : usize,
}

pub struct DependencyOrder<'a> {
  dependencies    : &'a dyn DependencyCollector,
  cancellation    : &'a dyn CancellationToken,
  kinds           : Vec<DefinitionKind>,
  settled         : NatSet,

  // Tarjan state, indexed by `DefId::index`
  indices         : Vec<Option<usize>>,
  lowlinks        : Vec<usize>,
  stack           : Vec<DefId>,
  on_stack        : NatSet,
  next_index      : usize,
  /// Definitions that list themselves among their own dependencies.
  self_referential: NatSet,
}

impl<'a> DependencyOrder<'a> {
  pub fn new(
    table       : &DefinitionTable,
    dependencies: &'a dyn DependencyCollector,
    cancellation: &'a dyn CancellationToken,
  ) -> DependencyOrder<'a>
  {
    let kinds   = table.iter().map(|(_, definition)| definition.kind).collect();
    let settled = table.iter()
                       .filter(|(_, definition)| definition.status != DefinitionStatus::NeedsCheck)
                       .map(|(id, _)| id.index())
                       .collect();
    let count = table.len();

    DependencyOrder {
      dependencies,
      cancellation,
      kinds,
      settled,
      indices         : vec![None; count],
      lowlinks        : vec![0; count],
      stack           : Vec::new(),
      on_stack        : NatSet::new(),
      next_index      : 0,
      self_referential: NatSet::new(),
    }
  }

  #[inline(always)]
  fn is_registered(&self, definition: DefId) -> bool {
    definition.index() < self.kinds.len()
  }

  /// Has `definition` been delivered, or is it being traversed right now?
  #[inline(always)]
  fn is_reached(&self, definition: DefId) -> bool {
    self.settled.contains(definition.index()) || self.indices[definition.index()].is_some()
  }

  /// Delivers every component reachable from `root` that has not been delivered yet.
  pub fn order(&mut self, root: DefId, listener: &mut dyn OrderingListener) -> Result<(), ComputationInterrupted> {
    if !self.is_registered(root) {
      warning!(1, "ignoring unregistered definition {}", root);
      return Ok(());
    }
    if self.is_reached(root) {
      return Ok(());
    }
    self.connect(root, listener)
  }

  pub fn order_batch(&mut self, roots: &[DefId], listener: &mut dyn OrderingListener)
    -> Result<(), ComputationInterrupted>
  {
    for root in roots {
      self.order(*root, listener)?;
    }
    Ok(())
  }

  /// The registered, unsettled dependencies of `definition`, sorted and without duplicates. A self-reference is
  /// recorded and left out.
  fn dependencies_of(&mut self, definition: DefId) -> Vec<DefId> {
    let mut dependencies = self.dependencies.direct_dependencies(definition);
    dependencies.sort();
    dependencies.dedup();

    let mut result = Vec::with_capacity(dependencies.len());
    for dependency in dependencies {
      if dependency == definition {
        self.self_referential.insert(definition.index());
      } else if !self.is_registered(dependency) {
        warning!(1, "{} depends on unregistered definition {}; ignoring it", definition, dependency);
      } else if !self.settled.contains(dependency.index()) {
        result.push(dependency);
      }
    }
    result
  }

  /// Numbers `definition` and pushes it onto the component stack.
  fn enter(&mut self, definition: DefId) -> Frame {
    let v = definition.index();
    self.indices[v]  = Some(self.next_index);
    self.lowlinks[v] = self.next_index;
    self.next_index += 1;
    self.stack.push(definition);
    self.on_stack.insert(v);

    Frame {
      definition,
      dependencies: self.dependencies_of(definition),
      next        : 0,
    }
  }

  /// Tarjan's algorithm with an explicit stack of frames in place of recursion, so that long dependency chains
  /// cannot exhaust the call stack.
  fn connect(&mut self, root: DefId, listener: &mut dyn OrderingListener) -> Result<(), ComputationInterrupted> {
    let mut frames = vec![self.enter(root)];

    while let Some(frame) = frames.last_mut() {
      let v = frame.definition.index();

      if let Some(&dependency) = frame.dependencies.get(frame.next) {
        frame.next += 1;
        let w = dependency.index();
        match self.indices[w] {
          None => {
            let child = self.enter(dependency);
            frames.push(child);
          }
          Some(index) if self.on_stack.contains(w) => {
            self.lowlinks[v] = self.lowlinks[v].min(index);
          }
          // Already delivered as part of an earlier component.
          Some(_) => {}
        }
        continue;
      }

      // Every dependency of `definition` has been visited.
      let definition = frame.definition;
      frames.pop();
      if let Some(parent) = frames.last() {
        let p = parent.definition.index();
        self.lowlinks[p] = self.lowlinks[p].min(self.lowlinks[v]);
      }

      if Some(self.lowlinks[v]) == self.indices[v] {
        let mut members = Vec::new();
        while let Some(member) = self.stack.pop() {
          self.on_stack.remove(member.index());
          members.push(member);
          if member == definition {
            break;
          }
        }
        members.sort();
        self.deliver(&members, listener)?;
      }
    }
    Ok(())
  }

  fn deliver(&self, members: &[DefId], listener: &mut dyn OrderingListener) -> Result<(), ComputationInterrupted> {
    self.cancellation.check_cancelled()?;

    let all_function_like = members.iter().all(|member| self.kinds[member.index()].is_function_like());

    match members {

      [definition] => {
        let recursive = self.self_referential.contains(definition.index());
        if recursive && !all_function_like {
          debug!(2, "illegal self-reference: {}", definition);
          listener.cycle_found(members)
        } else {
          debug!(2, "unit {}{}", definition, if recursive { " (recursive)" } else { "" });
          listener.unit_found(*definition, recursive)
        }
      }

      _ if !all_function_like => {
        debug!(2, "illegal cycle: {}", join_string(members.iter(), ", "));
        listener.cycle_found(members)
      }

      _ => {
        debug!(2, "recursive group: {}", join_string(members.iter(), ", "));
        for member in members {
          trace!(3, "header of {}", member);
          listener.header_found(*member)?;
        }
        listener.bodies_found(members)
      }

    } // end match on `members`
  }
}

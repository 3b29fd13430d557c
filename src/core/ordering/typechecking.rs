/*!

The `OrderingListener` that drives type checking. It runs the header and body checkers in the order the dependency
order delivers definitions, keeps the suspended state of cycle members between their header and body phases, runs the
termination check on every recursive group, and commits the outcome to the `DefinitionTable`.

Diagnostics are collected, not reported: the scheduler hands them to the reporter only if the whole batch completes.

## Commitment rules

 - A header failure marks the definition `HeaderError`. Inside a cycle of functions, a member whose header failed
   keeps `HeaderError` and every other member of the group becomes `BodyError` without its body being checked.
 - A body failure or a termination failure on any member of a recursive group marks every member `BodyError`. Headers
   that were checked are kept; compiled bodies are discarded.
 - A cycle containing a definition that cannot be recursive marks every member `BodyError` before anything is
   checked, and produces one `Diagnostic::Cycle`.

*/

use std::collections::BTreeMap;

use crate::{
  abstractions::join_string,
  api::{
    collaborators::{
      BodyChecker,
      CancellationToken,
      CompiledBody,
      ConcreteProvider,
      HeaderChecker,
      TypedHeader
    },
    CheckError,
    ComputationInterrupted,
    DefId,
    DefinitionFlag,
    DefinitionKind,
    DefinitionStatus,
    DefinitionTable,
    Diagnostic,
    OrderingListener
  },
  core::{
    config::SchedulerConfig,
    termination::{CallExtractor, FunctionSource, TerminationChecker, TerminationResult}
  },
  debug,
  info,
  trace
};

/// The state of a cycle member between its header and body phases.
struct Suspension<D> {
  declaration: D,
  header     : TypedHeader,
}

pub struct TypecheckingListener<'t, 'c, D> {
  table       : &'t mut DefinitionTable,
  termination : TerminationChecker,
  provider    : &'c dyn ConcreteProvider<D>,
  headers     : &'c mut dyn HeaderChecker<D>,
  bodies      : &'c mut dyn BodyChecker<D>,
  cancellation: &'c dyn CancellationToken,
  suspensions : BTreeMap<DefId, Suspension<D>>,
  diagnostics : Vec<Diagnostic>,
}

impl<'t, 'c, D> TypecheckingListener<'t, 'c, D> {
  pub fn new(
    table       : &'t mut DefinitionTable,
    config      : &SchedulerConfig,
    provider    : &'c dyn ConcreteProvider<D>,
    headers     : &'c mut dyn HeaderChecker<D>,
    bodies      : &'c mut dyn BodyChecker<D>,
    cancellation: &'c dyn CancellationToken,
  ) -> Self
  {
    TypecheckingListener {
      table,
      termination: TerminationChecker::new(config),
      provider,
      headers,
      bodies,
      cancellation,
      suspensions: BTreeMap::new(),
      diagnostics: Vec::new(),
    }
  }

  /// The diagnostics produced so far, in the order they were produced.
  pub fn diagnostics(&self) -> &[Diagnostic] {
    &self.diagnostics
  }

  pub fn into_diagnostics(self) -> Vec<Diagnostic> {
    self.diagnostics
  }

  fn fail(&mut self, definition: DefId, status: DefinitionStatus) {
    self.table.set_status(definition, status);
    if let Some(entry) = self.table.get_mut(definition) {
      entry.body = None;
    }
  }

  /// Runs the header phase. On success the header is stored and returned with the declaration it was checked from.
  fn check_header(&mut self, definition: DefId) -> Option<(D, TypedHeader)> {
    let Some(declaration) = self.provider.get_declaration(definition) else {
      self.table.set_status(definition, DefinitionStatus::HeaderError);
      self.diagnostics.push(Diagnostic::Header {
        definition,
        error: CheckError::new("no declaration available"),
      });
      return None;
    };

    match self.headers.check_header(definition, &declaration) {
      Ok(header) => {
        trace!(3, "header of {} checked", definition);
        if let Some(entry) = self.table.get_mut(definition) {
          entry.header = Some(header.clone());
          entry.status = DefinitionStatus::HeaderOk;
        }
        Some((declaration, header))
      }
      Err(error) => {
        debug!(2, "header of {} failed: {}", definition, error);
        self.table.set_status(definition, DefinitionStatus::HeaderError);
        self.diagnostics.push(Diagnostic::Header { definition, error });
        None
      }
    }
  }

  fn check_body(&mut self, definition: DefId, declaration: &D, header: &TypedHeader) -> Option<CompiledBody> {
    match self.bodies.check_body(definition, declaration, header) {
      Ok(body) => Some(body),
      Err(error) => {
        debug!(2, "body of {} failed: {}", definition, error);
        self.diagnostics.push(Diagnostic::Body { definition, error });
        None
      }
    }
  }

  /// Runs the termination check on a recursive group whose bodies have all been checked.
  fn check_termination(&mut self, group: &[(DefId, TypedHeader, CompiledBody)])
    -> Result<TerminationResult, ComputationInterrupted>
  {
    let sources: Vec<FunctionSource<'_>> = group.iter()
                                                .filter_map(|(definition, header, body)| {
                                                  body.clauses.as_ref().map(|clauses| FunctionSource {
                                                    definition: *definition,
                                                    parameters: &header.parameters,
                                                    body      : clauses,
                                                  })
                                                })
                                                .collect();
    let members: Vec<DefId> = group.iter().map(|(definition, _, _)| *definition).collect();
    let seeds = CallExtractor::new(&sources).extract_all(&sources);

    let result = self.termination.check_group(&members, seeds, self.cancellation)?;
    for member in members.iter() {
      self.table.insert_flags(*member, DefinitionFlag::TerminationChecked);
    }
    if let TerminationResult::Fail(vertices) = &result {
      self.diagnostics.push(Diagnostic::Termination { vertices: vertices.clone() });
    }
    Ok(result)
  }

  /// Commits a recursive group: either every member gets its body, or every member is `BodyError`.
  fn commit_group(&mut self, group: Vec<(DefId, TypedHeader, CompiledBody)>, terminates: bool) {
    for (definition, _, body) in group {
      if terminates {
        if let Some(entry) = self.table.get_mut(definition) {
          entry.body   = Some(body);
          entry.status = DefinitionStatus::BodyOk;
        }
      } else {
        self.fail(definition, DefinitionStatus::BodyError);
      }
    }
  }
}

impl<'t, 'c, D> OrderingListener for TypecheckingListener<'t, 'c, D> {
  fn unit_found(&mut self, definition: DefId, recursive: bool) -> Result<(), ComputationInterrupted> {
    let Some((declaration, header)) = self.check_header(definition) else {
      return Ok(());
    };
    let Some(body) = self.check_body(definition, &declaration, &header) else {
      self.fail(definition, DefinitionStatus::BodyError);
      return Ok(());
    };

    if !recursive {
      if let Some(entry) = self.table.get_mut(definition) {
        entry.body   = Some(body);
        entry.status = DefinitionStatus::BodyOk;
      }
      return Ok(());
    }

    self.table.insert_flags(definition, DefinitionFlag::Recursive);
    let group  = vec![(definition, header, body)];
    let result = self.check_termination(&group)?;
    self.commit_group(group, result.is_ok());
    Ok(())
  }

  fn cycle_found(&mut self, definitions: &[DefId]) -> Result<(), ComputationInterrupted> {
    info!(2, "illegal cycle between {}", join_string(definitions.iter(), ", "));
    for definition in definitions {
      self.table.insert_flags(*definition, DefinitionFlag::CycleMember);
      self.fail(*definition, DefinitionStatus::BodyError);
    }
    let instance_hints = definitions.iter()
                                    .copied()
                                    .filter(|definition| self.table.kind(*definition) == Some(DefinitionKind::Instance))
                                    .collect();
    self.diagnostics.push(Diagnostic::Cycle { members: definitions.to_vec(), instance_hints });
    Ok(())
  }

  fn header_found(&mut self, definition: DefId) -> Result<(), ComputationInterrupted> {
    self.table.insert_flags(definition, DefinitionFlag::CycleMember | DefinitionFlag::Recursive);
    if let Some((declaration, header)) = self.check_header(definition) {
      self.table.insert_flags(definition, DefinitionFlag::Suspended);
      self.suspensions.insert(definition, Suspension { declaration, header });
    }
    Ok(())
  }

  fn bodies_found(&mut self, definitions: &[DefId]) -> Result<(), ComputationInterrupted> {
    let mut suspended = Vec::with_capacity(definitions.len());
    for definition in definitions {
      self.table.remove_flags(*definition, DefinitionFlag::Suspended);
      if let Some(suspension) = self.suspensions.remove(definition) {
        suspended.push((*definition, suspension));
      }
    }

    // A member whose header failed poisons the group. It keeps `HeaderError`.
    if suspended.len() < definitions.len() {
      debug!(2, "a header failed in group {}; skipping bodies", join_string(definitions.iter(), ", "));
      for (definition, _) in suspended {
        self.fail(definition, DefinitionStatus::BodyError);
      }
      return Ok(());
    }

    let mut group    = Vec::with_capacity(suspended.len());
    let mut poisoned  = false;
    for (definition, Suspension { declaration, header }) in suspended {
      match self.check_body(definition, &declaration, &header) {
        Some(body) => group.push((definition, header, body)),
        None       => poisoned = true,
      }
    }

    if poisoned {
      for definition in definitions {
        self.fail(*definition, DefinitionStatus::BodyError);
      }
      return Ok(());
    }

    let result = self.check_termination(&group)?;
    self.commit_group(group, result.is_ok());
    Ok(())
  }
}

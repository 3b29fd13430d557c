/*!

The interfaces through which the scheduler talks to the rest of the elaborator. None of these are implemented here:
parsing and resolving declarations, checking a signature or a body against the type theory, and finding the references
a declaration makes all belong to other layers. The scheduler only decides *when* each of them runs and what to do with
the outcome.

The declaration type `D` is whatever the concrete syntax layer hands out; the scheduler never looks inside it.

*/

use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
  abstractions::IString,
  api::{
    expression::{Body, Parameter},
    CheckError,
    ComputationInterrupted,
    DefId,
    Diagnostic
  }
};

/// The partially typed form produced by a successful header check.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TypedHeader {
  /// The formal parameters, in order. Call matrices are indexed by these.
  pub parameters       : Vec<Parameter>,
  /// Universe level parameters the header introduced. Carried through a suspension untouched.
  pub universe_variables: Vec<IString>,
}

/// The result of a successful body check.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompiledBody {
  /// The elimination tree of a function body. Definitions without clauses (data types, classes, ...) have `None`.
  pub clauses: Option<Body>,
}

/// Source of declaration bodies and signatures.
pub trait ConcreteProvider<D> {
  fn get_declaration(&self, definition: DefId) -> Option<D>;
}

pub trait HeaderChecker<D> {
  fn check_header(&mut self, definition: DefId, declaration: &D) -> Result<TypedHeader, CheckError>;
}

pub trait BodyChecker<D> {
  fn check_body(&mut self, definition: DefId, declaration: &D, header: &TypedHeader)
    -> Result<CompiledBody, CheckError>;
}

pub trait DependencyCollector {
  /// The definitions directly referenced by the signature or body of `definition`.
  fn direct_dependencies(&self, definition: DefId) -> Vec<DefId>;
}

pub trait ErrorReporter {
  fn report(&mut self, diagnostic: Diagnostic);
}

pub trait CancellationToken {
  fn check_cancelled(&self) -> Result<(), ComputationInterrupted>;
}

/// A token that is never cancelled.
#[derive(Copy, Clone, Debug, Default)]
pub struct NeverCancelled;

impl CancellationToken for NeverCancelled {
  fn check_cancelled(&self) -> Result<(), ComputationInterrupted> {
    Ok(())
  }
}

/// A token another thread (or a callback) can trip. Once cancelled it stays cancelled until `reset`.
#[derive(Debug, Default)]
pub struct CancellationFlag {
  cancelled: AtomicBool,
}

impl CancellationFlag {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn cancel(&self) {
    self.cancelled.store(true, Ordering::SeqCst);
  }

  pub fn reset(&self) {
    self.cancelled.store(false, Ordering::SeqCst);
  }

  pub fn is_cancelled(&self) -> bool {
    self.cancelled.load(Ordering::SeqCst)
  }
}

impl CancellationToken for CancellationFlag {
  fn check_cancelled(&self) -> Result<(), ComputationInterrupted> {
    if self.is_cancelled() {
      Err(ComputationInterrupted)
    } else {
      Ok(())
    }
  }
}

/// The six external interfaces a batch needs, bundled so the entry points take one argument.
pub struct Collaborators<'c, D> {
  pub provider    : &'c dyn ConcreteProvider<D>,
  pub headers     : &'c mut dyn HeaderChecker<D>,
  pub bodies      : &'c mut dyn BodyChecker<D>,
  pub dependencies: &'c dyn DependencyCollector,
  pub reporter    : &'c mut dyn ErrorReporter,
  pub cancellation: &'c dyn CancellationToken,
}

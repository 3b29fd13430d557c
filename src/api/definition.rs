/*!

Every declaration the scheduler knows about is a `Definition` registered in a `DefinitionTable`. The table is an
arena: registration hands out a `DefId` that indexes straight into it, and all per-run state (status, flags, the typed
header, the compiled body) lives in the entry.

## Lifecycle

```txt
NeedsCheck ──header fails──▶ HeaderError
     │
     └─header ok──▶ HeaderOk ──body ok, terminates──▶ BodyOk
                       │
                       └──body fails / does not terminate / cycle poisoned──▶ BodyError
```

A definition in a cycle with a non-function member goes straight from `NeedsCheck` to `BodyError`. A cancelled batch
restores every definition that was `NeedsCheck` when the batch started, see `DefinitionTable::restore`.

*/

use std::fmt::{Display, Formatter};
use enumflags2::{bitflags, BitFlags};

use crate::{
  abstractions::IString,
  api::{
    collaborators::{CompiledBody, TypedHeader},
    DefId
  }
};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DefinitionKind {
  Function,
  Data,
  Constructor,
  Class,
  Field,
  Instance,
  MetaDefinition,
}

impl DefinitionKind {
  /// Only function-like definitions may be (mutually) recursive. Data types and classes cannot.
  pub fn is_function_like(self) -> bool {
    matches!(self, DefinitionKind::Function | DefinitionKind::Instance)
  }
}

impl Display for DefinitionKind {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      DefinitionKind::Function       => write!(f, "function"),
      DefinitionKind::Data           => write!(f, "data"),
      DefinitionKind::Constructor    => write!(f, "constructor"),
      DefinitionKind::Class          => write!(f, "class"),
      DefinitionKind::Field          => write!(f, "field"),
      DefinitionKind::Instance       => write!(f, "instance"),
      DefinitionKind::MetaDefinition => write!(f, "meta"),
    }
  }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum DefinitionStatus {
  #[default]
  NeedsCheck,
  HeaderOk,
  HeaderError,
  BodyOk,
  BodyError,
}

#[bitflags]
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum DefinitionFlag {
  /// The definition refers to itself, directly or through a cycle.
  Recursive,
  /// The header is checked and the body is waiting for sibling headers.
  Suspended,
  /// The definition took part in a termination check.
  TerminationChecked,
  /// The definition was delivered as part of a multi-member cycle.
  CycleMember,
}
pub type DefinitionFlags = BitFlags<DefinitionFlag>;

#[derive(Clone, Debug)]
pub struct Definition {
  pub name  : IString,
  pub kind  : DefinitionKind,
  pub status: DefinitionStatus,
  pub flags : DefinitionFlags,
  /// Present once the header phase succeeds. Survives a body or termination failure.
  pub header: Option<TypedHeader>,
  /// Present only once the body phase has been committed as `BodyOk`.
  pub body  : Option<CompiledBody>,
}

impl Definition {
  fn new(name: IString, kind: DefinitionKind) -> Definition {
    Definition {
      name,
      kind,
      status: DefinitionStatus::NeedsCheck,
      flags : DefinitionFlags::empty(),
      header: None,
      body  : None,
    }
  }
}

/// The `(status, flags)` of every registered definition at some instant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusSnapshot(Vec<(DefinitionStatus, DefinitionFlags)>);

#[derive(Clone, Debug, Default)]
pub struct DefinitionTable {
  definitions: Vec<Definition>,
}

impl DefinitionTable {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register(&mut self, name: impl Into<IString>, kind: DefinitionKind) -> DefId {
    let id = DefId::from_index(self.definitions.len());
    self.definitions.push(Definition::new(name.into(), kind));
    id
  }

  #[inline(always)]
  pub fn len(&self) -> usize {
    self.definitions.len()
  }

  #[inline(always)]
  pub fn is_empty(&self) -> bool {
    self.definitions.is_empty()
  }

  #[inline(always)]
  pub fn contains(&self, id: DefId) -> bool {
    id.index() < self.definitions.len()
  }

  pub fn get(&self, id: DefId) -> Option<&Definition> {
    self.definitions.get(id.index())
  }

  pub(crate) fn get_mut(&mut self, id: DefId) -> Option<&mut Definition> {
    self.definitions.get_mut(id.index())
  }

  /// Iterates over all definitions in registration order.
  pub fn iter(&self) -> impl Iterator<Item = (DefId, &Definition)> {
    self.definitions.iter().enumerate().map(|(i, d)| (DefId::from_index(i), d))
  }

  pub fn name(&self, id: DefId) -> IString {
    self.get(id).map_or_else(|| IString::from(id.to_string()), |d| d.name.clone())
  }

  /// The kind of a definition, or `None` for an unregistered id.
  pub fn kind(&self, id: DefId) -> Option<DefinitionKind> {
    self.get(id).map(|d| d.kind)
  }

  /// The status of a definition. Unregistered ids report `NeedsCheck`.
  pub fn status(&self, id: DefId) -> DefinitionStatus {
    self.get(id).map_or(DefinitionStatus::NeedsCheck, |d| d.status)
  }

  pub fn flags(&self, id: DefId) -> DefinitionFlags {
    self.get(id).map_or(DefinitionFlags::empty(), |d| d.flags)
  }

  pub(crate) fn set_status(&mut self, id: DefId, status: DefinitionStatus) {
    if let Some(definition) = self.get_mut(id) {
      definition.status = status;
    }
  }

  pub(crate) fn insert_flags(&mut self, id: DefId, flags: impl Into<DefinitionFlags>) {
    if let Some(definition) = self.get_mut(id) {
      definition.flags.insert(flags.into());
    }
  }

  pub(crate) fn remove_flags(&mut self, id: DefId, flags: impl Into<DefinitionFlags>) {
    if let Some(definition) = self.get_mut(id) {
      definition.flags.remove(flags.into());
    }
  }

  pub fn snapshot(&self) -> StatusSnapshot {
    StatusSnapshot(self.definitions.iter().map(|d| (d.status, d.flags)).collect())
  }

  /// Resets every definition that was `NeedsCheck` in `snapshot` to its snapshot state and drops whatever header or
  /// body it acquired since. Definitions registered after the snapshot was taken are reset as well. Returns the ids
  /// that actually changed.
  pub fn restore(&mut self, snapshot: &StatusSnapshot) -> Vec<DefId> {
    let mut reverted = Vec::new();
    for (i, definition) in self.definitions.iter_mut().enumerate() {
      let (status, flags) = snapshot.0
                                    .get(i)
                                    .copied()
                                    .unwrap_or((DefinitionStatus::NeedsCheck, DefinitionFlags::empty()));
      if status != DefinitionStatus::NeedsCheck {
        continue;
      }
      let changed = definition.status != status
          || definition.flags != flags
          || definition.header.is_some()
          || definition.body.is_some();
      if changed {
        definition.status = status;
        definition.flags  = flags;
        definition.header = None;
        definition.body   = None;
        reverted.push(DefId::from_index(i));
      }
    }
    reverted
  }
}

use super::ids::LibraryId;
use super::ids::MemberId;
use super::ids::TypeId;
use super::kind::Kind;
use super::kind::Modifiers;
use crate::docs::Documentation;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// Key and optional value types of an `iterable<K, V>` declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Iterable {
  pub key: TypeId,
  pub value: Option<TypeId>,
}

/// A node of the type graph. Created and mutated only through [`super::Model`].
#[derive(Clone, Debug)]
pub struct Type {
  pub(crate) name: String,
  pub(crate) kind: Kind,
  pub(crate) modifiers: Modifiers,
  pub(crate) library: Option<LibraryId>,
  pub(crate) super_type: Option<TypeId>,
  // Implemented mixins, union branches, or generic arguments.
  pub(crate) types: Vec<TypeId>,
  pub(crate) implemented_by: Vec<TypeId>,
  pub(crate) properties: BTreeMap<String, MemberId>,
  pub(crate) operations: BTreeMap<String, MemberId>,
  pub(crate) constructors: Vec<MemberId>,
  pub(crate) enum_literals: Vec<String>,
  pub(crate) referenced_by: BTreeSet<MemberId>,
  pub(crate) iterable: Option<Iterable>,
  pub(crate) documentation: Option<Documentation>,
}

impl Type {
  pub(crate) fn new(name: impl Into<String>, kind: Kind) -> Type {
    Type {
      name: name.into(),
      kind,
      modifiers: Modifiers::empty(),
      library: None,
      super_type: None,
      types: Vec::new(),
      implemented_by: Vec::new(),
      properties: BTreeMap::new(),
      operations: BTreeMap::new(),
      constructors: Vec::new(),
      enum_literals: Vec::new(),
      referenced_by: BTreeSet::new(),
      iterable: None,
      documentation: None,
    }
  }

  /// For composite types this is the rendered form, e.g. `long?[]` or `(Node or DOMString)`.
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn kind(&self) -> Kind {
    self.kind
  }

  pub fn modifiers(&self) -> Modifiers {
    self.modifiers
  }

  /// `None` only for types not yet added to any library, or removed with
  /// [`super::Model::delete_type`].
  pub fn library(&self) -> Option<LibraryId> {
    self.library
  }

  /// Inherited type, alias target, or wrapped element type depending on the kind.
  pub fn super_type(&self) -> Option<TypeId> {
    self.super_type
  }

  pub fn types(&self) -> &[TypeId] {
    &self.types
  }

  pub fn implemented_by(&self) -> &[TypeId] {
    &self.implemented_by
  }

  pub fn properties(&self) -> impl Iterator<Item = MemberId> + '_ {
    self.properties.values().copied()
  }

  pub fn operations(&self) -> impl Iterator<Item = MemberId> + '_ {
    self.operations.values().copied()
  }

  pub fn constructors(&self) -> &[MemberId] {
    &self.constructors
  }

  pub fn enum_literals(&self) -> &[String] {
    &self.enum_literals
  }

  pub fn referenced_by(&self) -> &BTreeSet<MemberId> {
    &self.referenced_by
  }

  pub fn iterable(&self) -> Option<Iterable> {
    self.iterable
  }

  pub fn documentation(&self) -> Option<&Documentation> {
    self.documentation.as_ref()
  }
}

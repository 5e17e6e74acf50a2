use super::ids::TypeId;
use super::kind::Modifiers;
use super::kind::Specials;
use crate::docs::Documentation;

#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
  pub name: String,
  pub ty: TypeId,
  pub modifiers: Modifiers,
}

impl Parameter {
  pub fn new(name: impl Into<String>, ty: TypeId, modifiers: Modifiers) -> Parameter {
    Parameter {
      name: name.into(),
      ty,
      modifiers,
    }
  }

  pub fn is_optional(&self) -> bool {
    self.modifiers.contains(Modifiers::OPTIONAL)
  }

  pub fn is_variadic(&self) -> bool {
    self.modifiers.contains(Modifiers::VARIADIC)
  }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Property {
  /// Raw initializer text for consts and dictionary defaults. Never evaluated.
  pub initial_value: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Operation {
  pub parameters: Vec<Parameter>,
  pub specials: Specials,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MemberKind {
  Property(Property),
  Operation(Operation),
}

/// A property, operation or constructor.
///
/// Members are built detached by the parser and only enter the arena when attached to an owner
/// with [`super::Model::add_property`], [`super::Model::add_operation`] or
/// [`super::Model::add_constructor`].
#[derive(Clone, Debug, PartialEq)]
pub struct Member {
  pub(crate) name: String,
  pub(crate) ty: Option<TypeId>,
  pub(crate) modifiers: Modifiers,
  pub(crate) owner: Option<TypeId>,
  pub(crate) documentation: Option<Documentation>,
  pub(crate) kind: MemberKind,
}

impl Member {
  pub fn property(
    name: impl Into<String>,
    ty: TypeId,
    modifiers: Modifiers,
    initial_value: Option<String>,
  ) -> Member {
    Member {
      name: name.into(),
      ty: Some(ty),
      modifiers,
      owner: None,
      documentation: None,
      kind: MemberKind::Property(Property { initial_value }),
    }
  }

  /// `ty` is `None` for `void`.
  pub fn operation(name: impl Into<String>, ty: Option<TypeId>, modifiers: Modifiers) -> Member {
    Member {
      name: name.into(),
      ty,
      modifiers,
      owner: None,
      documentation: None,
      kind: MemberKind::Operation(Operation::default()),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn ty(&self) -> Option<TypeId> {
    self.ty
  }

  pub fn modifiers(&self) -> Modifiers {
    self.modifiers
  }

  pub fn owner(&self) -> Option<TypeId> {
    self.owner
  }

  pub fn documentation(&self) -> Option<&Documentation> {
    self.documentation.as_ref()
  }

  pub fn kind(&self) -> &MemberKind {
    &self.kind
  }

  pub fn as_operation(&self) -> Option<&Operation> {
    match &self.kind {
      MemberKind::Operation(op) => Some(op),
      MemberKind::Property(_) => None,
    }
  }

  pub fn as_property(&self) -> Option<&Property> {
    match &self.kind {
      MemberKind::Property(prop) => Some(prop),
      MemberKind::Operation(_) => None,
    }
  }

  pub(crate) fn as_operation_mut(&mut self) -> Option<&mut Operation> {
    match &mut self.kind {
      MemberKind::Operation(op) => Some(op),
      MemberKind::Property(_) => None,
    }
  }

  pub fn parameters(&self) -> &[Parameter] {
    self.as_operation().map_or(&[], |op| &op.parameters)
  }

  pub fn is_constructor(&self) -> bool {
    self.modifiers.contains(Modifiers::CONSTRUCTOR)
  }

  /// Appends a parameter to a detached operation. No-op for properties.
  pub fn push_parameter(&mut self, param: Parameter) {
    if let Some(op) = self.as_operation_mut() {
      op.parameters.push(param);
    }
  }

  pub fn set_name(&mut self, name: impl Into<String>) {
    self.name = name.into();
  }

  pub fn add_specials(&mut self, specials: Specials) {
    if let Some(op) = self.as_operation_mut() {
      op.specials |= specials;
    }
  }

  /// Every type this member mentions: its own type followed by parameter types.
  pub(crate) fn referenced_types(&self) -> Vec<TypeId> {
    self
      .ty
      .into_iter()
      .chain(self.parameters().iter().map(|p| p.ty))
      .collect()
  }
}

/// Unifies two parameter lists position by position into one conservative signature.
///
/// A parameter present on one side only becomes optional. When both sides have one, their
/// modifiers are combined, differing types degrade to `any`, and names are joined with `_`
/// unless one contains the other.
pub fn merge_parameters(existing: &[Parameter], incoming: &[Parameter], any: TypeId) -> Vec<Parameter> {
  let len = existing.len().max(incoming.len());
  (0..len)
    .map(|i| match (existing.get(i), incoming.get(i)) {
      (Some(a), Some(b)) => {
        let name = if a.name.contains(b.name.as_str()) || b.name.contains(a.name.as_str()) {
          a.name.clone()
        } else {
          format!("{}_{}", a.name, b.name)
        };
        let ty = if a.ty == b.ty { a.ty } else { any };
        Parameter::new(name, ty, a.modifiers | b.modifiers)
      }
      (Some(p), None) | (None, Some(p)) => {
        Parameter::new(p.name.clone(), p.ty, p.modifiers | Modifiers::OPTIONAL)
      }
      (None, None) => unreachable!(),
    })
    .collect()
}

use super::ids::TypeId;
use crate::docs::DocumentationProvider;
use crate::error::ModelError;
use std::collections::BTreeMap;
use std::fmt;

pub const GLOBAL_TYPE_NAME: &str = "(Global)";

/// The types declared by one source document, keyed by name.
pub struct Library {
  pub(crate) name: String,
  pub(crate) read_only: bool,
  pub(crate) types: BTreeMap<String, TypeId>,
  // Holds free top level consts. Not part of `types`.
  pub(crate) globals: TypeId,
  pub(crate) docs: Box<dyn DocumentationProvider>,
}

impl Library {
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn is_read_only(&self) -> bool {
    self.read_only
  }

  pub fn globals(&self) -> TypeId {
    self.globals
  }

  pub fn documentation_provider(&self) -> &dyn DocumentationProvider {
    self.docs.as_ref()
  }

  /// Name lookup within this library only. `(Global)` yields the globals type.
  pub fn get_type(&self, name: &str) -> Option<TypeId> {
    if name == GLOBAL_TYPE_NAME {
      Some(self.globals)
    } else {
      self.types.get(name).copied()
    }
  }

  /// Registered types in name order.
  pub fn types(&self) -> impl Iterator<Item = TypeId> + '_ {
    self.types.values().copied()
  }

  pub fn type_names(&self) -> impl Iterator<Item = &str> + '_ {
    self.types.keys().map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.types.len()
  }

  pub fn is_empty(&self) -> bool {
    self.types.is_empty()
  }

  /// Registers `id` under `name`. Registering the same type again is a no-op; a different type
  /// under an occupied name is a genuine duplicate declaration.
  pub(crate) fn add_type(&mut self, name: &str, id: TypeId) -> Result<(), ModelError> {
    match self.types.get(name) {
      Some(&existing) if existing != id => Err(ModelError::DuplicateType {
        library: self.name.clone(),
        name: name.to_string(),
      }),
      Some(_) => Ok(()),
      None => {
        self.types.insert(name.to_string(), id);
        Ok(())
      }
    }
  }

  /// Unregisters `name` if it currently maps to `id`.
  pub(crate) fn remove_type(&mut self, name: &str, id: TypeId) -> bool {
    if self.types.get(name) == Some(&id) {
      self.types.remove(name);
      true
    } else {
      false
    }
  }
}

impl fmt::Debug for Library {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Library")
      .field("name", &self.name)
      .field("read_only", &self.read_only)
      .field("types", &self.types.len())
      .finish_non_exhaustive()
  }
}

use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MemberId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LibraryId(pub u32);

impl TypeId {
  pub(crate) fn index(self) -> usize {
    self.0 as usize
  }
}

impl MemberId {
  pub(crate) fn index(self) -> usize {
    self.0 as usize
  }
}

impl LibraryId {
  pub(crate) fn index(self) -> usize {
    self.0 as usize
  }
}

/// Refers to anything documentation can be attached to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ArtifactId {
  Library(LibraryId),
  Type(TypeId),
  Member(MemberId),
}

impl From<TypeId> for ArtifactId {
  fn from(id: TypeId) -> Self {
    ArtifactId::Type(id)
  }
}

impl From<MemberId> for ArtifactId {
  fn from(id: MemberId) -> Self {
    ArtifactId::Member(id)
  }
}

impl From<LibraryId> for ArtifactId {
  fn from(id: LibraryId) -> Self {
    ArtifactId::Library(id)
  }
}

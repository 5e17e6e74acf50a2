use serde::Serialize;
use std::fmt;

/// Identifies a declared type or member to a [`DocumentationProvider`] independently of the
/// model's arena.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArtifactPath {
  pub library: String,
  /// The owning type's name, for members.
  pub owner: Option<String>,
  pub name: String,
}

impl ArtifactPath {
  pub fn of_type(library: impl Into<String>, name: impl Into<String>) -> ArtifactPath {
    ArtifactPath {
      library: library.into(),
      owner: None,
      name: name.into(),
    }
  }

  pub fn of_member(
    library: impl Into<String>,
    owner: impl Into<String>,
    name: impl Into<String>,
  ) -> ArtifactPath {
    ArtifactPath {
      library: library.into(),
      owner: Some(owner.into()),
      name: name.into(),
    }
  }
}

/// `Library/Type` or `Library/Type.member`.
impl fmt::Display for ArtifactPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.owner {
      Some(owner) => write!(f, "{}/{}.{}", self.library, owner, self.name),
      None => write!(f, "{}/{}", self.library, self.name),
    }
  }
}

/// Supplies summaries and links for the artifacts declared while a library is parsed.
///
/// Providers usually wrap the scraped source document; scraping itself happens before parsing.
pub trait DocumentationProvider {
  fn title(&self) -> &str;
  fn summary(&self, artifact: &ArtifactPath) -> Option<String>;
  fn link(&self, artifact: &ArtifactPath) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct NoDocumentation;

impl DocumentationProvider for NoDocumentation {
  fn title(&self) -> &str {
    ""
  }

  fn summary(&self, _artifact: &ArtifactPath) -> Option<String> {
    None
  }

  fn link(&self, _artifact: &ArtifactPath) -> Option<String> {
    None
  }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Documentation {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub summary: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub link: Option<String>,
}

impl Documentation {
  /// Asks `provider` about `artifact`. Returns `None` when it knows nothing.
  pub fn lookup(provider: &dyn DocumentationProvider, artifact: &ArtifactPath) -> Option<Self> {
    let doc = Documentation {
      summary: provider.summary(artifact),
      link: provider.link(artifact),
    };
    (doc.summary.is_some() || doc.link.is_some()).then_some(doc)
  }
}

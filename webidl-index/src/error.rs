use crate::token::TT;
use core::fmt;
use core::fmt::Debug;
use core::fmt::Display;
use core::fmt::Formatter;
use thiserror::Error;

/// A stable classification of syntax errors produced by the IDL parser.
///
/// Diagnostic codes (prefix `IDL`) are assigned per variant and are stable:
/// - `IDL0001`: [`SyntaxErrorType::RequiredTokenNotFound`]
/// - `IDL0002`: [`SyntaxErrorType::ExpectedKeyword`]
/// - `IDL0003`: [`SyntaxErrorType::ExpectedSyntax`]
/// - `IDL0004`: [`SyntaxErrorType::UnknownExtendedAttribute`]
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SyntaxErrorType {
  RequiredTokenNotFound(TT),
  ExpectedKeyword(&'static str),
  ExpectedSyntax(&'static str),
  UnknownExtendedAttribute,
}

impl SyntaxErrorType {
  /// Stable diagnostic code for this syntax error variant.
  pub fn code(&self) -> &'static str {
    match self {
      SyntaxErrorType::RequiredTokenNotFound(_) => "IDL0001",
      SyntaxErrorType::ExpectedKeyword(_) => "IDL0002",
      SyntaxErrorType::ExpectedSyntax(_) => "IDL0003",
      SyntaxErrorType::UnknownExtendedAttribute => "IDL0004",
    }
  }

  pub fn message(&self) -> String {
    match self {
      SyntaxErrorType::RequiredTokenNotFound(tt) => format!("expected token {tt:?}"),
      SyntaxErrorType::ExpectedKeyword(kw) => format!("expected `{kw}`"),
      SyntaxErrorType::ExpectedSyntax(expected) => format!("expected {expected}"),
      SyntaxErrorType::UnknownExtendedAttribute => "unrecognized extended attribute".into(),
    }
  }
}

/// A fatal parse failure. There is no recovery: the library being ingested should be discarded.
#[derive(Clone, PartialEq, Eq)]
pub struct SyntaxError {
  pub typ: SyntaxErrorType,
  /// Name of the library being ingested. Empty until the parser attaches it.
  pub library: String,
  /// 1-based.
  pub line: usize,
  /// 1-based, in characters.
  pub column: usize,
  /// Text of the offending token.
  pub token: String,
  pub actual: TT,
  /// The source line up to and including the offending token.
  pub context: String,
}

impl SyntaxError {
  pub fn with_library(mut self, library: impl Into<String>) -> SyntaxError {
    self.library = library.into();
    self
  }
}

impl Debug for SyntaxError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{} [{:?}]", self, self.context)
  }
}

impl Display for SyntaxError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    if !self.library.is_empty() {
      write!(f, "error parsing {}: ", self.library)?;
    }
    write!(
      f,
      "{} at {}:{}, found {:?} {:?} ({})",
      self.typ.message(),
      self.line,
      self.column,
      self.actual,
      self.token,
      self.typ.code(),
    )
  }
}

impl std::error::Error for SyntaxError {}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
  #[error("library {library} already contains a different type named {name}")]
  DuplicateType { library: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdlError {
  #[error(transparent)]
  Syntax(#[from] SyntaxError),
  #[error(transparent)]
  Model(#[from] ModelError),
}

pub type IdlResult<T> = Result<T, IdlError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn codes_are_stable() {
    assert_eq!(
      SyntaxErrorType::RequiredTokenNotFound(TT::Semicolon).code(),
      "IDL0001"
    );
    assert_eq!(SyntaxErrorType::ExpectedKeyword("enum").code(), "IDL0002");
    assert_eq!(SyntaxErrorType::ExpectedSyntax("type").code(), "IDL0003");
    assert_eq!(SyntaxErrorType::UnknownExtendedAttribute.code(), "IDL0004");
  }

  #[test]
  fn display_names_library_and_position() {
    let err = SyntaxError {
      typ: SyntaxErrorType::RequiredTokenNotFound(TT::Semicolon),
      library: String::new(),
      line: 3,
      column: 7,
      token: "}".into(),
      actual: TT::BraceClose,
      context: "  long x }".into(),
    }
    .with_library("dom");
    let msg = err.to_string();
    assert!(msg.starts_with("error parsing dom: "), "{msg}");
    assert!(msg.contains("3:7"), "{msg}");
    assert!(msg.contains("BraceClose"), "{msg}");
    assert!(msg.contains("IDL0001"), "{msg}");
  }
}

use crate::error::IdlError;
use crate::error::IdlResult;
use crate::error::SyntaxErrorType;
use crate::lex::lex_next;
use crate::lex::Lexer;
use crate::model::LibraryId;
use crate::model::Model;
use crate::token::Token;
use crate::token::TT;
use tracing::debug_span;

pub mod ext_attrs;
pub mod interface;
#[cfg(test)]
mod tests;
pub mod toplevel;
pub mod types;

/// Recursive descent over one IDL blob, mutating the model as declarations are recognized.
///
/// The first failure aborts the parse. Anything already registered in the library stays there;
/// callers should discard the library rather than keep using it.
pub struct IdlParser<'a, 'm> {
  lexer: Lexer<'a>,
  // One token of lookahead.
  token: Token,
  model: &'m mut Model,
  lib: LibraryId,
}

impl<'a, 'm> IdlParser<'a, 'm> {
  pub fn new(model: &'m mut Model, lib: LibraryId, source: &'a str) -> IdlParser<'a, 'm> {
    let mut lexer = Lexer::new(source);
    let token = lex_next(&mut lexer);
    IdlParser {
      lexer,
      token,
      model,
      lib,
    }
  }

  pub fn model(&self) -> &Model {
    &*self.model
  }

  pub fn parse(mut self) -> IdlResult<()> {
    let library = self.model.library(self.lib).name().to_string();
    let _span = debug_span!("parse_idl", library = library.as_str()).entered();
    self.parse_module_body()?;
    self.require(TT::EOF)?;
    Ok(())
  }

  fn library_name(&self) -> &str {
    self.model.library(self.lib).name()
  }

  /// A fatal error at the current token.
  pub(crate) fn error(&self, typ: SyntaxErrorType) -> IdlError {
    self.error_at(&self.token, typ)
  }

  pub(crate) fn error_at(&self, token: &Token, typ: SyntaxErrorType) -> IdlError {
    IdlError::Syntax(self.lexer.error(token, typ).with_library(self.library_name()))
  }

  pub(crate) fn peek(&self) -> Token {
    self.token
  }

  pub(crate) fn peek_typ(&self) -> TT {
    self.token.typ
  }

  /// Text of the current token; string literals without their quotes.
  pub(crate) fn sval(&self) -> &'a str {
    self.lexer.sval(&self.token)
  }

  pub(crate) fn raw(&self, token: &Token) -> &'a str {
    let source = self.lexer.source();
    &source[token.loc.0..token.loc.1]
  }

  pub(crate) fn consume(&mut self) -> Token {
    let t = self.token;
    self.token = lex_next(&mut self.lexer);
    t
  }

  pub(crate) fn consume_if(&mut self, typ: TT) -> bool {
    let matched = self.token.typ == typ;
    if matched {
      self.consume();
    }
    matched
  }

  pub(crate) fn is_keyword(&self, keyword: &str) -> bool {
    self.token.typ == TT::Word && self.sval() == keyword
  }

  pub(crate) fn is_any_keyword(&self, keywords: &[&str]) -> bool {
    self.token.typ == TT::Word && keywords.contains(&self.sval())
  }

  pub(crate) fn consume_if_keyword(&mut self, keyword: &str) -> bool {
    let matched = self.is_keyword(keyword);
    if matched {
      self.consume();
    }
    matched
  }

  pub(crate) fn require(&mut self, typ: TT) -> IdlResult<Token> {
    if self.token.typ != typ {
      return Err(self.error(SyntaxErrorType::RequiredTokenNotFound(typ)));
    }
    Ok(self.consume())
  }

  pub(crate) fn require_keyword(&mut self, keyword: &'static str) -> IdlResult<()> {
    if !self.is_keyword(keyword) {
      return Err(self.error(SyntaxErrorType::ExpectedKeyword(keyword)));
    }
    self.consume();
    Ok(())
  }

  /// Any word, keywords included.
  pub(crate) fn require_identifier(&mut self) -> IdlResult<&'a str> {
    let t = self.require(TT::Word)?;
    Ok(self.lexer.sval(&t))
  }

  /// Joins the raw text of every token up to (not including) the next `;` with single spaces.
  pub(crate) fn raw_until_semicolon(&mut self) -> String {
    let mut parts = Vec::new();
    while !matches!(self.peek_typ(), TT::Semicolon | TT::EOF) {
      let t = self.consume();
      parts.push(self.raw(&t));
    }
    parts.join(" ")
  }

  /// Skips tokens until one of `stops` appears outside any bracket pair. The stop token is left
  /// in place.
  pub(crate) fn skip_balanced_until(&mut self, stops: &[TT]) -> IdlResult<()> {
    let mut depth = 0usize;
    loop {
      let typ = self.peek_typ();
      if depth == 0 && stops.contains(&typ) {
        return Ok(());
      }
      match typ {
        TT::EOF => {
          return Err(self.error(SyntaxErrorType::ExpectedSyntax("end of bracketed section")));
        }
        TT::BraceOpen | TT::BracketOpen | TT::ParenthesisOpen | TT::ChevronLeft => depth += 1,
        TT::BraceClose | TT::BracketClose | TT::ParenthesisClose | TT::ChevronRight => {
          if depth == 0 {
            return Err(self.error(SyntaxErrorType::ExpectedSyntax("balanced brackets")));
          }
          depth -= 1;
        }
        _ => {}
      };
      self.consume();
    }
  }

  /// Skips a parenthesized group, which must start at the current token.
  pub(crate) fn skip_parenthesized(&mut self) -> IdlResult<()> {
    self.require(TT::ParenthesisOpen)?;
    self.skip_balanced_until(&[TT::ParenthesisClose])?;
    self.require(TT::ParenthesisClose)?;
    Ok(())
  }
}

use super::IdlParser;
use crate::error::IdlResult;
use crate::error::SyntaxErrorType;
use crate::model::Kind;
use crate::model::Member;
use crate::model::Modifiers;
use crate::model::TypeId;
use crate::token::TT;
use tracing::trace;

impl<'a, 'm> IdlParser<'a, 'm> {
  /// Declarations up to the end of input or the `}` closing a `module`.
  pub fn parse_module_body(&mut self) -> IdlResult<()> {
    while !matches!(self.peek_typ(), TT::EOF | TT::BraceClose) {
      if self.peek_typ() == TT::BracketOpen
        || self.is_any_keyword(&[
          "dictionary",
          "exception",
          "partial",
          "callback",
          "interface",
          "class",
        ])
      {
        self.parse_classifier()?;
      } else if self.is_keyword("typedef") {
        self.parse_typedef()?;
      } else if self.is_keyword("valuetype") {
        self.parse_value_type()?;
      } else if self.is_keyword("module") {
        self.parse_module()?;
      } else if self.is_keyword("const") {
        let constant = self.parse_const()?;
        let globals = self.model.library(self.lib).globals();
        let id = self.model.add_property(globals, constant);
        self.model.document(self.lib, id);
      } else if self.is_keyword("enum") {
        self.parse_enum()?;
      } else if self.peek_typ() == TT::Word {
        self.parse_implements()?;
      } else {
        return Err(self.error(SyntaxErrorType::ExpectedSyntax(
          "dictionary, callback, exception, interface, typedef, valuetype, module or const",
        )));
      }
    }
    Ok(())
  }

  /// Resolves or creates the type a declaration introduces and registers it in this library.
  ///
  /// Reopening with `partial` reuses a type this library already owns. A type owned elsewhere
  /// gets a partial shim here whose super type is the original. Without any existing type the
  /// declared kind is used.
  pub fn parse_new_type_name(&mut self, kind: Kind, partial: bool) -> IdlResult<TypeId> {
    let name = self.require_identifier()?;
    let existing = self
      .model
      .library(self.lib)
      .get_type(name)
      .or_else(|| self.model.get_type(name));

    if partial {
      if let Some(original) = existing {
        if self.model.ty(original).library() == Some(self.lib) {
          return Ok(original);
        }
        let shim = self.model.new_type(name, Kind::Partial);
        self.model.add_type(self.lib, shim)?;
        self.model.document(self.lib, shim);
        self.model.set_super_type(shim, original);
        trace!(name, "created partial shim");
        return Ok(shim);
      }
    }

    let t = match existing {
      Some(t) => t,
      None => self.model.new_type(name, kind),
    };
    self.model.set_kind(t, kind);
    self.model.add_type(self.lib, t)?;
    self.model.document(self.lib, t);
    Ok(t)
  }

  /// `typedef [..]? Type Name ;`
  pub fn parse_typedef(&mut self) -> IdlResult<()> {
    self.require_keyword("typedef")?;
    self.skip_extended_attributes()?;
    let target = self.parse_type()?;
    let alias = self.parse_new_type_name(Kind::Alias, false)?;
    if target != alias {
      self.model.set_super_type(alias, target);
    }
    self.require(TT::Semicolon)?;
    Ok(())
  }

  /// Legacy `valuetype Name Type ;`, a primitive alias.
  pub fn parse_value_type(&mut self) -> IdlResult<()> {
    self.require_keyword("valuetype")?;
    let t = self.parse_new_type_name(Kind::Primitive, false)?;
    let target = self.parse_type()?;
    if target != t {
      self.model.set_super_type(t, target);
    }
    self.require(TT::Semicolon)?;
    Ok(())
  }

  /// Legacy `module name { ... };`. The module name is not recorded.
  pub fn parse_module(&mut self) -> IdlResult<()> {
    self.require_keyword("module")?;
    self.require_identifier()?;
    self.require(TT::BraceOpen)?;
    self.parse_module_body()?;
    self.require(TT::BraceClose)?;
    self.require(TT::Semicolon)?;
    Ok(())
  }

  /// `enum Name { "a", "b", } ;`
  pub fn parse_enum(&mut self) -> IdlResult<()> {
    self.require_keyword("enum")?;
    let t = self.parse_new_type_name(Kind::Enum, false)?;
    self.require(TT::BraceOpen)?;
    while self.peek_typ() != TT::BraceClose {
      let literal = self.require(TT::String)?;
      let literal = self.lexer.sval(&literal);
      self.model.add_enum_literal(t, literal);
      if !self.consume_if(TT::Comma) {
        break;
      }
    }
    self.require(TT::BraceClose)?;
    self.require(TT::Semicolon)?;
    Ok(())
  }

  /// `A implements B ;` or `A includes B ;`
  pub fn parse_implements(&mut self) -> IdlResult<()> {
    let target = self.parse_type()?;
    if !self.consume_if_keyword("implements") && !self.consume_if_keyword("includes") {
      return Err(self.error(SyntaxErrorType::ExpectedKeyword("implements")));
    }
    let mixin = self.parse_type()?;
    self.model.add_implements(target, mixin);
    self.require(TT::Semicolon)?;
    Ok(())
  }

  /// `Name = ReturnType (args) ;` after `callback`. The type owns one operation of the same
  /// name describing the call signature.
  pub fn parse_callback_function(&mut self) -> IdlResult<TypeId> {
    let t = self.parse_new_type_name(Kind::CallbackFunction, false)?;
    self.require(TT::Equals)?;
    let ty = if self.consume_if_keyword("void") {
      None
    } else {
      Some(self.parse_type()?)
    };
    let name = self.model.type_name(t).to_string();
    let mut operation = Member::operation(name, ty, Modifiers::empty());
    self.parse_parameter_list(&mut operation)?;
    self.require(TT::Semicolon)?;
    let id = self.model.add_operation(t, operation);
    self.model.document(self.lib, id);
    Ok(t)
  }
}

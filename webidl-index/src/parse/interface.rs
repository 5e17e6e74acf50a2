use super::IdlParser;
use crate::error::IdlResult;
use crate::error::SyntaxErrorType;
use crate::model::Kind;
use crate::model::Member;
use crate::model::Modifiers;
use crate::model::Parameter;
use crate::model::Specials;
use crate::model::TypeId;
use crate::token::TT;
use tracing::trace;

const SPECIAL_KEYWORDS: &[&str] = &["getter", "setter", "deleter", "creator", "legacycaller"];

impl<'a, 'm> IdlParser<'a, 'm> {
  /// Declarations that may carry extended attributes: interfaces, callbacks, exceptions and
  /// dictionaries, optionally `partial`.
  pub fn parse_classifier(&mut self) -> IdlResult<()> {
    let attrs = self.parse_extended_attributes()?;
    let mut kind = attrs.kind.unwrap_or(Kind::Interface);
    let partial = self.consume_if_keyword("partial");
    if self.consume_if_keyword("callback") {
      if !self.is_keyword("interface") {
        let t = self.parse_callback_function()?;
        self.finish_classifier(t, attrs.constructors, attrs.modifiers);
        return Ok(());
      }
      kind = Kind::CallbackInterface;
    }
    let t = if self.is_any_keyword(&["interface", "class"]) {
      self.parse_interface(kind, partial)?
    } else if self.is_keyword("exception") {
      self.parse_exception()?
    } else if self.is_keyword("dictionary") {
      self.parse_dictionary(partial)?
    } else {
      return Err(self.error(SyntaxErrorType::ExpectedSyntax(
        "interface, callback, exception or dictionary",
      )));
    };
    self.finish_classifier(t, attrs.constructors, attrs.modifiers);
    Ok(())
  }

  fn finish_classifier(&mut self, t: TypeId, constructors: Vec<Member>, modifiers: Modifiers) {
    for mut ctor in constructors {
      if ctor.name().is_empty() {
        ctor.set_name(self.model.type_name(t).to_string());
      }
      let id = self.model.add_constructor(t, ctor);
      self.model.document(self.lib, id);
    }
    if !modifiers.is_empty() {
      self.model.add_modifiers(t, modifiers);
    }
  }

  pub fn parse_interface(&mut self, mut kind: Kind, partial: bool) -> IdlResult<TypeId> {
    self.consume();
    if self.consume_if_keyword("mixin") {
      kind = Kind::NoInterfaceObject;
    }
    let t = self.parse_new_type_name(kind, partial)?;
    if self.consume_if(TT::Colon) || self.consume_if_keyword("extends") {
      let super_type = self.parse_type()?;
      self.model.set_super_type(t, super_type);
    }
    if self.is_keyword("implements") || self.peek_typ() == TT::Comma {
      loop {
        self.consume();
        let base = self.parse_type()?;
        self.model.add_implements(t, base);
        if self.peek_typ() != TT::Comma {
          break;
        }
      }
    }
    // Forward declaration.
    if self.consume_if(TT::Semicolon) {
      return Ok(t);
    }

    self.require(TT::BraceOpen)?;
    while !self.consume_if(TT::BraceClose) {
      if self.peek_typ() == TT::EOF {
        return Err(self.error(SyntaxErrorType::RequiredTokenNotFound(TT::BraceClose)));
      }
      self.parse_interface_member(t)?;
    }
    self.consume_if(TT::Semicolon);
    Ok(t)
  }

  fn parse_interface_member(&mut self, t: TypeId) -> IdlResult<()> {
    let mut modifiers = self.parse_member_attributes()?;
    if self.consume_if_keyword("static") {
      modifiers |= Modifiers::STATIC;
    }
    if self.consume_if_keyword("stringifier") && self.consume_if(TT::Semicolon) {
      return Ok(());
    }
    self.consume_if_keyword("inherit");

    if self.is_any_keyword(&["readonly", "attribute"]) {
      let property = self.parse_property(modifiers)?;
      let id = self.model.add_property(t, property);
      self.model.document(self.lib, id);
    } else if self.is_keyword("const") {
      let mut constant = self.parse_const()?;
      constant.modifiers |= modifiers;
      let id = self.model.add_property(t, constant);
      self.model.document(self.lib, id);
    } else if self.is_keyword("serializer") {
      self.consume();
      self.skip_balanced_until(&[TT::Semicolon])?;
      self.require(TT::Semicolon)?;
    } else if self.is_keyword("typedef") {
      self.parse_typedef()?;
    } else if self.consume_if_keyword("constructor") {
      let name = self.model.type_name(t).to_string();
      let mut ctor = Member::operation(name, None, Modifiers::CONSTRUCTOR);
      self.parse_parameter_list(&mut ctor)?;
      self.require(TT::Semicolon)?;
      let id = self.model.add_constructor(t, ctor);
      self.model.document(self.lib, id);
    } else if let Some(operation) = self.parse_operation(modifiers)? {
      match self.model.operation(t, operation.name()) {
        Some(existing) => self.model.merge_operation(existing, operation),
        None => {
          let id = self.model.add_operation(t, operation);
          self.model.document(self.lib, id);
        }
      }
    }
    Ok(())
  }

  /// `readonly? attribute Type name (raises(E))? ;`
  pub fn parse_property(&mut self, mut modifiers: Modifiers) -> IdlResult<Member> {
    if self.consume_if_keyword("readonly") {
      modifiers |= Modifiers::READ_ONLY;
    }
    self.require_keyword("attribute")?;
    let ty = self.parse_type()?;
    let name = self.require_identifier()?;
    // SVG style exception annotations.
    if self.consume_if_keyword("setraises") || self.consume_if_keyword("raises") {
      self.require(TT::ParenthesisOpen)?;
      self.require_identifier()?;
      self.require(TT::ParenthesisClose)?;
    }
    self.require(TT::Semicolon)?;
    Ok(Member::property(name, ty, modifiers, None))
  }

  /// `const Type NAME = value ;` with the value kept as raw text.
  pub fn parse_const(&mut self) -> IdlResult<Member> {
    self.require_keyword("const")?;
    let ty = self.parse_type()?;
    let name = self.require_identifier()?;
    self.require(TT::Equals)?;
    let value = self.raw_until_semicolon();
    self.require(TT::Semicolon)?;
    Ok(Member::property(name, ty, Modifiers::CONSTANT, Some(value)))
  }

  /// Returns `None` for `iterable<...>;`, which declares no member.
  pub fn parse_operation(&mut self, modifiers: Modifiers) -> IdlResult<Option<Member>> {
    let mut special = Vec::new();
    let mut specials = Specials::empty();
    while self.is_any_keyword(SPECIAL_KEYWORDS) {
      let keyword = self.require_identifier()?;
      match keyword {
        "getter" => specials |= Specials::GETTER,
        "setter" => specials |= Specials::SETTER,
        _ => {}
      };
      special.push(keyword);
    }

    let ty = if self.consume_if_keyword("void") {
      None
    } else {
      Some(self.parse_type()?)
    };
    if ty.is_some_and(|ty| self.model.ty(ty).iterable().is_some()) {
      trace!("skipped iterable declaration");
      self.require(TT::Semicolon)?;
      return Ok(None);
    }

    let name = if self.peek_typ() == TT::ParenthesisOpen && !special.is_empty() {
      special.join(" ")
    } else {
      self.require_identifier()?.to_string()
    };
    let mut operation = Member::operation(name, ty, modifiers);
    operation.add_specials(specials);
    self.parse_parameter_list(&mut operation)?;
    self.require(TT::Semicolon)?;
    Ok(Some(operation))
  }

  /// `( [..]? optional? (in|out|inout)? [..]? Type ...? name (= default)?, ... ) raises(T)?`
  pub fn parse_parameter_list(&mut self, operation: &mut Member) -> IdlResult<()> {
    self.require(TT::ParenthesisOpen)?;
    while self.peek_typ() != TT::ParenthesisClose {
      let mut modifiers = self.parse_member_attributes()?;
      if self.consume_if_keyword("optional") {
        modifiers |= Modifiers::OPTIONAL;
      }
      if self.is_any_keyword(&["in", "out", "inout"]) {
        self.consume();
      }
      modifiers |= self.parse_member_attributes()?;

      let ty = self.parse_type()?;
      if self.consume_if(TT::DotDotDot) {
        modifiers |= Modifiers::VARIADIC;
      }
      let name = self.require_identifier()?;
      if self.consume_if(TT::Equals) {
        self.skip_balanced_until(&[TT::Comma, TT::ParenthesisClose])?;
      }
      operation.push_parameter(Parameter::new(name, ty, modifiers));

      if !self.consume_if(TT::Comma) && self.peek_typ() != TT::ParenthesisClose {
        return Err(self.error(SyntaxErrorType::ExpectedSyntax("`,` or `)`")));
      }
    }
    self.require(TT::ParenthesisClose)?;
    if self.consume_if_keyword("raises") {
      self.require(TT::ParenthesisOpen)?;
      self.parse_type()?;
      self.require(TT::ParenthesisClose)?;
    }
    Ok(())
  }

  /// `exception Name (: Base)? { (const ... | Type name ;)* } ;`
  pub fn parse_exception(&mut self) -> IdlResult<TypeId> {
    self.require_keyword("exception")?;
    let t = self.parse_new_type_name(Kind::Exception, false)?;
    if self.consume_if(TT::Colon) {
      let super_type = self.parse_type()?;
      self.model.set_super_type(t, super_type);
    }
    self.require(TT::BraceOpen)?;
    while !matches!(self.peek_typ(), TT::BraceClose | TT::EOF) {
      let field = if self.is_keyword("const") {
        self.parse_const()?
      } else {
        let ty = self.parse_type()?;
        let name = self.require_identifier()?;
        self.require(TT::Semicolon)?;
        Member::property(name, ty, Modifiers::empty(), None)
      };
      let id = self.model.add_property(t, field);
      self.model.document(self.lib, id);
    }
    self.require(TT::BraceClose)?;
    self.require(TT::Semicolon)?;
    Ok(t)
  }

  /// `dictionary Name (: Base)? { ([..]? required? Type name (= default)? ;)* } ;`
  pub fn parse_dictionary(&mut self, partial: bool) -> IdlResult<TypeId> {
    self.require_keyword("dictionary")?;
    let t = self.parse_new_type_name(Kind::Dictionary, partial)?;
    if self.consume_if(TT::Colon) {
      let super_type = self.parse_type()?;
      self.model.set_super_type(t, super_type);
    }
    self.require(TT::BraceOpen)?;
    while !self.consume_if(TT::BraceClose) {
      if self.peek_typ() == TT::EOF {
        return Err(self.error(SyntaxErrorType::RequiredTokenNotFound(TT::BraceClose)));
      }
      self.skip_extended_attributes()?;
      self.consume_if_keyword("required");
      let ty = self.parse_type()?;
      let name = self.require_identifier()?;
      let default = if self.consume_if(TT::Equals) {
        Some(self.raw_until_semicolon())
      } else {
        None
      };
      self.require(TT::Semicolon)?;
      let id = self
        .model
        .add_property(t, Member::property(name, ty, Modifiers::empty(), default));
      self.model.document(self.lib, id);
    }
    self.require(TT::Semicolon)?;
    Ok(t)
  }
}

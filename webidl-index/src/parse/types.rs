use super::IdlParser;
use crate::error::IdlResult;
use crate::model::Iterable;
use crate::model::Kind;
use crate::model::TypeId;
use crate::token::TT;

impl<'a, 'm> IdlParser<'a, 'm> {
  /// Parses a type reference, resolving named types and allocating composite wrappers.
  ///
  /// `?` is checked both before and after an array suffix, so `T?[]?` wraps twice in nullable.
  pub fn parse_type(&mut self) -> IdlResult<TypeId> {
    if self.peek_typ() == TT::ParenthesisOpen {
      return self.parse_union_type();
    }

    let mut name = loop {
      let segment = if self.consume_if_keyword("unrestricted") {
        format!("unrestricted {}", self.require_identifier()?)
      } else if self.consume_if_keyword("unsigned") {
        if self.peek_typ() == TT::Question {
          "unsigned int".to_string()
        } else {
          format!("unsigned {}", self.require_identifier()?)
        }
      } else {
        self.require_identifier()?.to_string()
      };
      // Only the last segment of a scoped name is kept.
      if !self.consume_if(TT::ColonColon) {
        break segment;
      }
    };
    if name.ends_with("long") && self.consume_if_keyword("long") {
      name.push_str(" long");
    }

    let mut ty = if name == "sequence" {
      self.require(TT::ChevronLeft)?;
      let element = self.parse_type()?;
      self.require(TT::ChevronRight)?;
      let rendered = format!("sequence<{}>", self.model.type_name(element));
      self.model.new_synthesized(rendered, Kind::Sequence, Some(element))
    } else if self.peek_typ() == TT::ChevronLeft {
      self.parse_generic_type(&name)?
    } else {
      let mut ty = self.resolve_type_name(&name);
      if self.consume_if(TT::Question) {
        ty = self.nullable(ty);
      }
      if self.consume_if(TT::BracketOpen) {
        self.require(TT::BracketClose)?;
        ty = self.array(ty);
      }
      ty
    };
    if self.consume_if(TT::Question) {
      ty = self.nullable(ty);
    }
    Ok(ty)
  }

  /// `Name<A, B>`. `iterable<K[, V]>` additionally fills the iterable slot.
  fn parse_generic_type(&mut self, name: &str) -> IdlResult<TypeId> {
    self.require(TT::ChevronLeft)?;
    let mut args = Vec::new();
    loop {
      args.push(self.parse_type()?);
      if !self.consume_if(TT::Comma) {
        break;
      }
    }
    self.require(TT::ChevronRight)?;
    let rendered = format!(
      "{}<{}>",
      name,
      args
        .iter()
        .map(|&a| self.model.type_name(a))
        .collect::<Vec<_>>()
        .join(", ")
    );
    let ty = self
      .model
      .new_synthesized(rendered, Kind::Generic, args.last().copied());
    for &arg in &args {
      self.model.push_type_argument(ty, arg);
    }
    if name == "iterable" {
      self.model.set_iterable(ty, Iterable {
        key: args[0],
        value: args.get(1).copied(),
      });
    }
    Ok(ty)
  }

  /// `(A or B or ...)`. A trailing `?` is accepted and dropped.
  fn parse_union_type(&mut self) -> IdlResult<TypeId> {
    let mut branches = Vec::new();
    self.require(TT::ParenthesisOpen)?;
    loop {
      branches.push(self.parse_type()?);
      if !self.consume_if_keyword("or") {
        break;
      }
    }
    self.require(TT::ParenthesisClose)?;
    self.consume_if(TT::Question);
    let rendered = format!(
      "({})",
      branches
        .iter()
        .map(|&b| self.model.type_name(b))
        .collect::<Vec<_>>()
        .join(" or ")
    );
    let union = self.model.new_synthesized(rendered, Kind::Union, None);
    for branch in branches {
      self.model.push_type_argument(union, branch);
    }
    Ok(union)
  }

  fn nullable(&mut self, inner: TypeId) -> TypeId {
    let rendered = format!("{}?", self.model.type_name(inner));
    self.model.new_synthesized(rendered, Kind::Nullable, Some(inner))
  }

  fn array(&mut self, inner: TypeId) -> TypeId {
    let rendered = format!("{}[]", self.model.type_name(inner));
    self.model.new_synthesized(rendered, Kind::Array, Some(inner))
  }

  /// Current library first, then the model's tiers, then a new hidden placeholder. Partial
  /// shims in the current library are passed over in favor of the type they reopen.
  pub fn resolve_type_name(&mut self, name: &str) -> TypeId {
    let local = self
      .model
      .library(self.lib)
      .get_type(name)
      .filter(|&t| self.model.ty(t).kind() != Kind::Partial);
    let found = local.or_else(|| self.model.get_type(name));
    match found {
      Some(t) => t,
      None => self.model.add_hidden_type(name),
    }
  }
}

use super::IdlParser;
use crate::error::IdlResult;
use crate::error::SyntaxErrorType;
use crate::model::Kind;
use crate::model::Member;
use crate::model::Modifiers;
use crate::token::TT;
use ahash::HashMap;
use ahash::HashMapExt;
use once_cell::sync::Lazy;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtAttrAction {
  /// Sets a modifier bit. Member level blocks only honor `Unforgeable`.
  Modifier(Modifiers),
  NoInterfaceObject,
  /// Optionally followed by `=` and one name or a parenthesized list of names, all discarded.
  Global { primary: bool },
  /// `Constructor` or `Constructor(args)`.
  Constructor,
  /// `Name=Ctor` or `Name=Ctor(args)`.
  NamedConstructor,
  /// `Exposed=Name` or `Exposed=(A, B)`, discarded.
  Exposed,
  Ignore,
  /// Optional `=` value, optionally continued with `&`/`|` joined identifiers.
  IgnoreWithValue,
  /// Optional parenthesized argument list.
  IgnoreWithArgs,
}

#[rustfmt::skip]
pub static EXTENDED_ATTRIBUTES: Lazy<HashMap<&'static str, ExtAttrAction>> = Lazy::new(|| {
  use ExtAttrAction::*;
  let mut map = HashMap::<&'static str, ExtAttrAction>::new();
  map.insert("ArrayClass", Modifier(Modifiers::ARRAY_CLASS));
  map.insert("OverrideBuiltins", Modifier(Modifiers::OVERRIDE_BUILTINS));
  map.insert("LegacyOverrideBuiltIns", Modifier(Modifiers::OVERRIDE_BUILTINS));
  map.insert("Unforgeable", Modifier(Modifiers::UNFORGEABLE));
  map.insert("LegacyUnforgeable", Modifier(Modifiers::UNFORGEABLE));

  map.insert("NoInterfaceObject", NoInterfaceObject);
  map.insert("LegacyNoInterfaceObject", NoInterfaceObject);
  map.insert("Global", Global { primary: false });
  map.insert("PrimaryGlobal", Global { primary: true });
  map.insert("Constructor", Constructor);
  map.insert("NamedConstructor", NamedConstructor);
  map.insert("LegacyFactoryFunction", NamedConstructor);
  map.insert("Exposed", Exposed);

  for name in [
    "ActiveDOMObject",
    "CEReactions",
    "CheckSecurity",
    "CrossOriginIsolated",
    "CustomToV8",
    "DedicatedWorker",
    "DependentLifetime",
    "HTMLConstructor",
    "LegacyTreatNonObjectAsNull",
    "LegacyUnenumerableNamedProperties",
    "NoHeader",
    "SecureContext",
    "Serializable",
    "SharedWorker",
    "Supplemental",
    "Transferable",
    "TreatNonCallableAsNull",
    "TreatNonObjectAsNull",
    "Worker",
  ] {
    map.insert(name, Ignore);
  }
  for name in [
    "Callback",
    "Conditional",
    "DoNotCheckConstants",
    "ImplementedAs",
    "LegacyNamespace",
    "LegacyWindowAlias",
    "MeasureAs",
    "RuntimeEnabled",
    "SetWrapperReferenceFrom",
    "SetWrapperReferenceTo",
  ] {
    map.insert(name, IgnoreWithValue);
  }
  for name in [
    "ConstructorCallWith",
    "CustomConstructor",
    "RaisesException",
  ] {
    map.insert(name, IgnoreWithArgs);
  }
  map
});

/// What a declaration level `[...]` block asked for.
#[derive(Debug, Default)]
pub struct ExtAttrs {
  pub kind: Option<Kind>,
  pub modifiers: Modifiers,
  /// Detached constructor operations. Anonymous ones are named after the type when attached.
  pub constructors: Vec<Member>,
}

impl<'a, 'm> IdlParser<'a, 'm> {
  /// Parses any number of consecutive declaration level `[...]` blocks through the attribute
  /// table. Unknown names are fatal.
  pub fn parse_extended_attributes(&mut self) -> IdlResult<ExtAttrs> {
    let mut attrs = ExtAttrs::default();
    while self.consume_if(TT::BracketOpen) {
      loop {
        let name_token = self.peek();
        let name = self.require_identifier()?;
        let Some(&action) = EXTENDED_ATTRIBUTES.get(name) else {
          return Err(self.error_at(&name_token, SyntaxErrorType::UnknownExtendedAttribute));
        };
        self.apply_extended_attribute(action, &mut attrs)?;
        if !self.consume_if(TT::Comma) {
          break;
        }
      }
      self.require(TT::BracketClose)?;
    }
    Ok(attrs)
  }

  fn apply_extended_attribute(
    &mut self,
    action: ExtAttrAction,
    attrs: &mut ExtAttrs,
  ) -> IdlResult<()> {
    match action {
      ExtAttrAction::Modifier(m) => attrs.modifiers |= m,
      ExtAttrAction::NoInterfaceObject => {
        if attrs.kind != Some(Kind::Global) {
          attrs.kind = Some(Kind::NoInterfaceObject);
        }
      }
      ExtAttrAction::Global { primary } => {
        attrs.kind = Some(Kind::Global);
        if primary {
          attrs.modifiers |= Modifiers::PRIMARY_GLOBAL;
        }
        if self.consume_if(TT::Equals) {
          self.skip_name_or_list()?;
        }
      }
      ExtAttrAction::Constructor => {
        let mut ctor = Member::operation("", None, Modifiers::CONSTRUCTOR);
        if self.peek_typ() == TT::ParenthesisOpen {
          self.parse_parameter_list(&mut ctor)?;
        }
        attrs.constructors.push(ctor);
      }
      ExtAttrAction::NamedConstructor => {
        self.require(TT::Equals)?;
        let name = self.require_identifier()?;
        let mut ctor = Member::operation(name, None, Modifiers::CONSTRUCTOR);
        if self.peek_typ() == TT::ParenthesisOpen {
          self.parse_parameter_list(&mut ctor)?;
        }
        attrs.constructors.push(ctor);
      }
      ExtAttrAction::Exposed => {
        self.require(TT::Equals)?;
        self.skip_name_or_list()?;
      }
      ExtAttrAction::Ignore => {}
      ExtAttrAction::IgnoreWithValue => {
        if self.consume_if(TT::Equals) {
          self.skip_attribute_value()?;
          while self.consume_if(TT::Ampersand) || self.consume_if(TT::Bar) {
            self.skip_attribute_value()?;
          }
        }
      }
      ExtAttrAction::IgnoreWithArgs => {
        if self.peek_typ() == TT::ParenthesisOpen {
          self.skip_parenthesized()?;
        }
      }
    };
    Ok(())
  }

  /// `Name` or `(A, B, ...)`.
  fn skip_name_or_list(&mut self) -> IdlResult<()> {
    if self.consume_if(TT::ParenthesisOpen) {
      loop {
        self.require_identifier()?;
        if !self.consume_if(TT::Comma) {
          break;
        }
      }
      self.require(TT::ParenthesisClose)?;
    } else {
      self.require_identifier()?;
    }
    Ok(())
  }

  fn skip_attribute_value(&mut self) -> IdlResult<()> {
    match self.peek_typ() {
      TT::ParenthesisOpen => self.skip_parenthesized(),
      TT::Word | TT::String | TT::Number => {
        self.consume();
        Ok(())
      }
      _ => Err(self.error(SyntaxErrorType::ExpectedSyntax("extended attribute value"))),
    }
  }

  /// Member and parameter level `[...]` blocks. Only `Unforgeable` is recorded; every other
  /// entry, known or not, is skipped with its value.
  pub fn parse_member_attributes(&mut self) -> IdlResult<Modifiers> {
    let mut modifiers = Modifiers::empty();
    while self.consume_if(TT::BracketOpen) {
      while !self.consume_if(TT::BracketClose) {
        if self.peek_typ() == TT::Word {
          if let Some(ExtAttrAction::Modifier(m)) = EXTENDED_ATTRIBUTES.get(self.sval()) {
            modifiers |= *m & Modifiers::UNFORGEABLE;
          }
        }
        self.skip_balanced_until(&[TT::Comma, TT::BracketClose])?;
        self.consume_if(TT::Comma);
      }
    }
    Ok(modifiers)
  }

  /// Dictionary member and typedef `[...]` blocks carry nothing the model records.
  pub fn skip_extended_attributes(&mut self) -> IdlResult<()> {
    while self.consume_if(TT::BracketOpen) {
      self.skip_balanced_until(&[TT::BracketClose])?;
      self.require(TT::BracketClose)?;
    }
    Ok(())
  }
}

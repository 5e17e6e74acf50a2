use bitflags::bitflags;
use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Kind {
  Interface,
  /// At most one global is expected to also carry [`Modifiers::PRIMARY_GLOBAL`].
  Global,
  NoInterfaceObject,
  Primitive,
  Exception,
  Dictionary,
  Alias,
  Union,
  Enum,
  Sequence,
  Array,
  Nullable,
  /// Reopens a type declared in another library. Members added here land on the super type.
  Partial,
  CallbackFunction,
  CallbackInterface,
  Generic,
}

impl Kind {
  /// Whether a super type edge of this kind is an is-a relationship, and so is mirrored in the
  /// super type's `implemented_by`.
  pub fn registers_implemented_by(self) -> bool {
    !matches!(self, Kind::Union | Kind::Sequence | Kind::Nullable)
  }

  /// Composite types are allocated per occurrence and never registered by name.
  pub fn is_synthesized(self) -> bool {
    match self {
      Kind::Array | Kind::Sequence | Kind::Nullable | Kind::Union | Kind::Generic => true,
      Kind::Interface
      | Kind::Global
      | Kind::NoInterfaceObject
      | Kind::Primitive
      | Kind::Exception
      | Kind::Dictionary
      | Kind::Alias
      | Kind::Enum
      | Kind::Partial
      | Kind::CallbackFunction
      | Kind::CallbackInterface => false,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Kind::Interface => "interface",
      Kind::Global => "global",
      Kind::NoInterfaceObject => "no interface object",
      Kind::Primitive => "primitive",
      Kind::Exception => "exception",
      Kind::Dictionary => "dictionary",
      Kind::Alias => "alias",
      Kind::Union => "union",
      Kind::Enum => "enum",
      Kind::Sequence => "sequence",
      Kind::Array => "array",
      Kind::Nullable => "nullable",
      Kind::Partial => "partial",
      Kind::CallbackFunction => "callback function",
      Kind::CallbackInterface => "callback interface",
      Kind::Generic => "generic",
    }
  }
}

bitflags! {
  /// Qualifiers on members and parameters, plus a few that only apply to types.
  #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
  pub struct Modifiers: u16 {
    const CONSTANT = 1 << 0;
    const CONSTRUCTOR = 1 << 1;
    const OPTIONAL = 1 << 2;
    const READ_ONLY = 1 << 3;
    const STATIC = 1 << 4;
    const VARIADIC = 1 << 5;
    const UNFORGEABLE = 1 << 6;
    // Type level.
    const ARRAY_CLASS = 1 << 8;
    const OVERRIDE_BUILTINS = 1 << 9;
    const PRIMARY_GLOBAL = 1 << 10;
  }
}

impl Modifiers {
  /// Lowercase names of the set flags, for display and serialization.
  pub fn names(self) -> Vec<String> {
    self
      .iter_names()
      .map(|(name, _)| name.to_ascii_lowercase())
      .collect()
  }
}

bitflags! {
  /// Only `getter` and `setter` are tracked. `deleter`, `creator` and `legacycaller` contribute
  /// to an operation's name but carry no marker.
  #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
  pub struct Specials: u8 {
    const GETTER = 1 << 0;
    const SETTER = 1 << 1;
  }
}

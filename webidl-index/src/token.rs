use crate::loc::Loc;
use serde::Serialize;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub enum TT {
  // Special token used to represent the end of the source code. An unterminated string literal also
  // ends the stream.
  EOF,
  // Any character the grammar never uses. The token is always one character long.
  Other,
  // These are only used by lexer.
  CommentMultiline,
  CommentShell,
  CommentSingle,
  LiteralNumberHex,
  Whitespace,

  Ampersand,
  Asterisk,
  Bar,
  BraceClose,
  BraceOpen,
  BracketClose,
  BracketOpen,
  ChevronLeft,
  ChevronLeftEquals,
  ChevronRight,
  ChevronRightEquals,
  Colon,
  ColonColon,
  Comma,
  Dot,
  DotDotDot,
  Equals,
  EqualsEquals,
  Exclamation,
  ExclamationEquals,
  Hyphen,
  Number,
  ParenthesisClose,
  ParenthesisOpen,
  Plus,
  Question,
  Semicolon,
  Slash,
  String,
  Word,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
  pub loc: Loc,
  pub typ: TT,
}

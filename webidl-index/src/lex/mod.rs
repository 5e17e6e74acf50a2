use crate::char::is_whitespace;
use crate::char::CharFilter;
use crate::char::DIGIT;
use crate::char::DIGIT_HEX;
use crate::char::ID_CONTINUE;
use crate::char::ID_START;
use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::loc::Loc;
use crate::token::Token;
use crate::token::TT;
use ahash::HashMap;
use ahash::HashMapExt;
use aho_corasick::AhoCorasick;
use aho_corasick::AhoCorasickBuilder;
use aho_corasick::AhoCorasickKind;
use aho_corasick::Anchored;
use aho_corasick::Input;
use aho_corasick::MatchKind;
use aho_corasick::StartKind;
use core::ops::Index;
use memchr::memchr;
use memchr::memmem;
use once_cell::sync::Lazy;


#[derive(Copy, Clone)]
pub struct LexerCheckpoint {
  next: usize,
}

// Contains the match length.
#[derive(Copy, Clone)]
struct Match(usize);

impl Match {
  pub fn len(&self) -> usize {
    self.0
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

struct PatternMatcher {
  patterns: Vec<TT>,
  matcher: AhoCorasick,
}

impl PatternMatcher {
  pub fn new<D: AsRef<str>>(patterns: Vec<(TT, D)>) -> Self {
    let (tts, syns): (Vec<_>, Vec<_>) = patterns.into_iter().unzip();
    let byte_syns: Vec<Vec<u8>> = syns.iter().map(|s| s.as_ref().as_bytes().to_vec()).collect();
    let matcher = AhoCorasickBuilder::new()
      .start_kind(StartKind::Anchored)
      .kind(Some(AhoCorasickKind::DFA))
      .match_kind(MatchKind::LeftmostLongest)
      .build(byte_syns)
      .expect("static lexer pattern set must build");
    PatternMatcher {
      patterns: tts,
      matcher,
    }
  }

  pub fn find(&self, lexer: &Lexer) -> Option<(TT, Match)> {
    self
      .matcher
      .find(Input::new(&lexer.source[lexer.next..]).anchored(Anchored::Yes))
      .map(|m| (self.patterns[m.pattern().as_usize()], Match(m.end())))
  }
}

/// Lexer over a single IDL blob.
///
/// Keywords are not reserved at this level: `interface`, `long` and friends are plain
/// [`TT::Word`] tokens and the parser compares their text.
pub struct Lexer<'a> {
  source: &'a str,
  next: usize,
}

impl<'a> Lexer<'a> {
  pub fn new(code: &'a str) -> Lexer<'a> {
    Lexer {
      source: code,
      next: 0,
    }
  }

  pub fn next(&self) -> usize {
    self.next
  }

  pub fn source(&self) -> &'a str {
    self.source
  }

  fn end(&self) -> usize {
    self.source.len()
  }

  fn remaining(&self) -> usize {
    self.end() - self.next
  }

  fn eof_range(&self) -> Loc {
    Loc(self.end(), self.end())
  }

  fn at_end(&self) -> bool {
    self.next >= self.end()
  }

  fn peek_or_eof(&self, n: usize) -> Option<char> {
    self.source[self.next..].chars().nth(n)
  }

  pub fn checkpoint(&self) -> LexerCheckpoint {
    LexerCheckpoint { next: self.next }
  }

  pub fn since_checkpoint(&self, checkpoint: LexerCheckpoint) -> Loc {
    Loc(checkpoint.next, self.next)
  }

  fn if_char(&self, c: char) -> Match {
    match self.peek_or_eof(0) {
      Some(first) if first == c => Match(c.len_utf8()),
      _ => Match(0),
    }
  }

  fn through_char(&self, c: u8) -> Option<Match> {
    memchr(c, self.source[self.next..].as_bytes()).map(|pos| Match(pos + 1))
  }

  fn through_char_or_end(&self, c: u8) -> Match {
    self.through_char(c).unwrap_or(Match(self.remaining()))
  }

  fn through_str_or_end(&self, needle: &str) -> Match {
    memmem::find(self.source[self.next..].as_bytes(), needle.as_bytes())
      .map(|pos| Match(pos + needle.len()))
      .unwrap_or(Match(self.remaining()))
  }

  fn while_chars(&self, chars: &CharFilter) -> Match {
    let mut len = 0;
    for ch in self.source[self.next..].chars() {
      if chars.has(ch) {
        len += ch.len_utf8();
      } else {
        break;
      }
    }
    Match(len)
  }

  fn while_chars_fn(&self, pred: impl Fn(char) -> bool) -> Match {
    Match(
      self.source[self.next..]
        .find(|c: char| !pred(c))
        .unwrap_or(self.remaining()),
    )
  }

  fn consume(&mut self, m: Match) -> Match {
    self.next += m.len();
    m
  }

  fn skip_expect(&mut self, n: usize) {
    debug_assert!(self.next + n <= self.end());
    self.next += n;
  }

  fn drive(&mut self, f: impl FnOnce(&mut Self) -> TT) -> Token {
    let cp = self.checkpoint();
    let typ = f(self);
    Token {
      loc: self.since_checkpoint(cp),
      typ,
    }
  }

  /// The token's value as the parser sees it: the raw text, or the contents between the quotes
  /// for a string literal.
  pub fn sval(&self, token: &Token) -> &'a str {
    match token.typ {
      TT::EOF => "",
      TT::String if token.loc.len() >= 2 => &self.source[token.loc.0 + 1..token.loc.1 - 1],
      _ => &self.source[token.loc.0..token.loc.1],
    }
  }

  /// The numeric value of a [`TT::Number`] token. Malformed numbers degrade to zero.
  pub fn nval(&self, token: &Token) -> f64 {
    if token.typ != TT::Number {
      return 0.0;
    }
    let raw = self.sval(token);
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
      Some(hex) => u64::from_str_radix(hex, 16).map_or(0.0, |v| v as f64),
      None => raw.parse::<f64>().unwrap_or(0.0),
    }
  }

  /// Builds a diagnostic pointing at `token`. The library name is attached by the caller.
  pub fn error(&self, token: &Token, typ: SyntaxErrorType) -> SyntaxError {
    let pos = token.loc.position(self.source);
    SyntaxError {
      typ,
      library: String::new(),
      line: pos.line,
      column: pos.column,
      token: self[token.loc].to_string(),
      actual: token.typ,
      context: token.loc.context(self.source).to_string(),
    }
  }
}

impl<'a> Index<Loc> for Lexer<'a> {
  type Output = str;

  fn index(&self, index: Loc) -> &Self::Output {
    &self.source[index.0..index.1]
  }
}

#[rustfmt::skip]
pub static OPERATORS_MAPPING: Lazy<HashMap<TT, &'static str>> = Lazy::new(|| {
  let mut map = HashMap::<TT, &'static str>::new();
  map.insert(TT::Ampersand, "&");
  map.insert(TT::Asterisk, "*");
  map.insert(TT::Bar, "|");
  map.insert(TT::BraceClose, "}");
  map.insert(TT::BraceOpen, "{");
  map.insert(TT::BracketClose, "]");
  map.insert(TT::BracketOpen, "[");
  map.insert(TT::ChevronLeft, "<");
  map.insert(TT::ChevronLeftEquals, "<=");
  map.insert(TT::ChevronRight, ">");
  map.insert(TT::ChevronRightEquals, ">=");
  map.insert(TT::Colon, ":");
  map.insert(TT::ColonColon, "::");
  map.insert(TT::Comma, ",");
  map.insert(TT::Dot, ".");
  map.insert(TT::DotDotDot, "...");
  map.insert(TT::Equals, "=");
  map.insert(TT::EqualsEquals, "==");
  map.insert(TT::Exclamation, "!");
  map.insert(TT::ExclamationEquals, "!=");
  map.insert(TT::Hyphen, "-");
  map.insert(TT::ParenthesisClose, ")");
  map.insert(TT::ParenthesisOpen, "(");
  map.insert(TT::Plus, "+");
  map.insert(TT::Question, "?");
  map.insert(TT::Semicolon, ";");
  map.insert(TT::Slash, "/");
  map
});

static SIG: Lazy<PatternMatcher> = Lazy::new(|| {
  let mut patterns: Vec<(TT, String)> = Vec::new();
  for (&k, &v) in OPERATORS_MAPPING.iter() {
    patterns.push((k, v.into()));
  }
  for c in ID_START.iter() {
    patterns.push((TT::Word, c.to_string()));
  }
  for c in DIGIT.iter() {
    patterns.push((TT::Number, c.to_string()));
  }
  patterns.push((TT::LiteralNumberHex, "0x".into()));
  patterns.push((TT::LiteralNumberHex, "0X".into()));
  patterns.push((TT::String, "\"".into()));
  patterns.push((TT::String, "'".into()));
  PatternMatcher::new(patterns)
});

static INSIG: Lazy<PatternMatcher> = Lazy::new(|| {
  let mut patterns: Vec<(TT, String)> = ('\0'..=' ')
    .map(|c| (TT::Whitespace, c.to_string()))
    .collect();
  patterns.push((TT::CommentMultiline, "/*".into()));
  patterns.push((TT::CommentSingle, "//".into()));
  patterns.push((TT::CommentShell, "#".into()));
  PatternMatcher::new(patterns)
});

fn lex_identifier(lexer: &mut Lexer<'_>) -> TT {
  lexer.consume(lexer.while_chars(&ID_CONTINUE));
  TT::Word
}

fn lex_number(lexer: &mut Lexer<'_>) -> TT {
  lexer.consume(lexer.while_chars(&DIGIT));
  if !lexer.consume(lexer.if_char('.')).is_empty() {
    lexer.consume(lexer.while_chars(&DIGIT));
  }
  if matches!(lexer.peek_or_eof(0), Some('e' | 'E')) {
    // An `e` without digits after it is not an exponent; it starts the next word.
    let sign = matches!(lexer.peek_or_eof(1), Some('+' | '-')) as usize;
    if lexer.peek_or_eof(1 + sign).is_some_and(|c| DIGIT.has(c)) {
      lexer.skip_expect(1 + sign);
      lexer.consume(lexer.while_chars(&DIGIT));
    }
  }
  TT::Number
}

fn lex_hex_number(lexer: &mut Lexer<'_>) -> TT {
  lexer.skip_expect(2);
  lexer.consume(lexer.while_chars(&DIGIT_HEX));
  TT::Number
}

/// Strings have no escapes; everything up to the matching quote is taken verbatim.
fn lex_string(lexer: &mut Lexer<'_>, quote: u8) -> TT {
  lexer.skip_expect(1);
  match lexer.through_char(quote) {
    Some(m) => {
      lexer.consume(m);
      TT::String
    }
    None => {
      lexer.consume(Match(lexer.remaining()));
      TT::EOF
    }
  }
}

fn skip_insignificant(lexer: &mut Lexer<'_>) {
  while let Some((tt, mat)) = INSIG.find(lexer) {
    lexer.consume(mat);
    match tt {
      TT::Whitespace => {
        lexer.consume(lexer.while_chars_fn(is_whitespace));
      }
      TT::CommentMultiline => {
        lexer.consume(lexer.through_str_or_end("*/"));
      }
      TT::CommentSingle | TT::CommentShell => {
        lexer.consume(lexer.through_char_or_end(b'\n'));
      }
      _ => unreachable!(),
    };
  }
}

pub fn lex_next(lexer: &mut Lexer<'_>) -> Token {
  skip_insignificant(lexer);

  if lexer.at_end() {
    return Token {
      loc: lexer.eof_range(),
      typ: TT::EOF,
    };
  };

  lexer.drive(|lexer| match SIG.find(lexer) {
    Some((TT::Word, _)) => lex_identifier(lexer),
    Some((TT::Number, _)) => lex_number(lexer),
    Some((TT::LiteralNumberHex, _)) => lex_hex_number(lexer),
    Some((TT::String, m)) => {
      let quote = lexer.source.as_bytes()[lexer.next];
      debug_assert_eq!(m.len(), 1);
      lex_string(lexer, quote)
    }
    Some((tt, m)) => {
      lexer.consume(m);
      tt
    }
    None => {
      // Unknown characters pass through one at a time so the parser can report them.
      let c = lexer.peek_or_eof(0).unwrap_or('\0');
      lexer.skip_expect(c.len_utf8());
      TT::Other
    }
  })
}

use memchr::memchr_iter;
use memchr::memrchr;
use std::cmp::max;
use std::cmp::min;
use std::ops::Add;
use std::ops::AddAssign;

/// A location within the current IDL blob expressed as UTF-8 byte offsets.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Loc(pub usize, pub usize);

impl Loc {
  pub fn is_empty(&self) -> bool {
    self.0 >= self.1
  }

  pub fn len(&self) -> usize {
    self.1.saturating_sub(self.0)
  }

  pub fn extend(&mut self, other: Loc) {
    self.0 = min(self.0, other.0);
    self.1 = max(self.1, other.1);
  }

  /// Resolves the start of this range to a 1-based line and column.
  pub fn position(&self, source: &str) -> LineCol {
    LineCol::of(source, self.0)
  }

  /// The source line containing the start of this range, cut off after the end of the range.
  ///
  /// Used as the context snippet in diagnostics.
  pub fn context<'a>(&self, source: &'a str) -> &'a str {
    let bytes = source.as_bytes();
    let start = min(self.0, bytes.len());
    let end = min(max(self.1, start), bytes.len());
    let line_start = memrchr(b'\n', &bytes[..start]).map_or(0, |p| p + 1);
    source
      .get(line_start..end)
      .unwrap_or_default()
      .trim_end_matches(['\r', '\n'])
  }
}

impl Add for Loc {
  type Output = Loc;

  fn add(self, rhs: Self) -> Self::Output {
    let mut new = self;
    new.extend(rhs);
    new
  }
}

impl AddAssign for Loc {
  fn add_assign(&mut self, rhs: Self) {
    self.extend(rhs);
  }
}

/// 1-based line and column.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct LineCol {
  pub line: usize,
  pub column: usize,
}

impl LineCol {
  pub fn of(source: &str, offset: usize) -> LineCol {
    let bytes = source.as_bytes();
    let offset = min(offset, bytes.len());
    let before = &bytes[..offset];
    let line = memchr_iter(b'\n', before).count() + 1;
    let line_start = memrchr(b'\n', before).map_or(0, |p| p + 1);
    // Columns count characters, not bytes.
    let column = source
      .get(line_start..offset)
      .map_or(offset - line_start, |s| s.chars().count())
      + 1;
    LineCol { line, column }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn positions_are_one_based() {
    let src = "interface A {\n  attribute long x\n};";
    assert_eq!(LineCol::of(src, 0), LineCol { line: 1, column: 1 });
    let x = src.find('x').unwrap();
    assert_eq!(LineCol::of(src, x), LineCol { line: 2, column: 18 });
    assert_eq!(LineCol::of(src, src.len()).line, 3);
  }

  #[test]
  fn context_is_line_prefix_through_token() {
    let src = "dictionary D {\n  long a\n  long b;\n};";
    let b = src.rfind("long").unwrap();
    let loc = Loc(b, b + 4);
    assert_eq!(loc.context(src), "  long");
    assert_eq!(Loc(0, 10).context(src), "dictionary");
  }

  #[test]
  fn extend_covers_both_ranges() {
    assert_eq!(Loc(4, 6) + Loc(1, 2), Loc(1, 6));
    let mut loc = Loc(3, 3);
    assert!(loc.is_empty());
    loc += Loc(3, 9);
    assert_eq!(loc.len(), 6);
  }
}

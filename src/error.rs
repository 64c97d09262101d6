//! Shared error type used across the compilation pipeline.
//!
//! Every failure is a structured value: the variant names the failure kind
//! and its fields carry the offending token or identifier. Rendering against
//! the source happens only at the binary boundary, in a style reminiscent of
//! chibicc that points at the offending byte with a caret.

use snafu::Snafu;

use crate::arena::ArenaError;
use crate::tokenizer::TokenKind;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CompileError {
  /// The tokenizer met a character that starts no token.
  #[snafu(display("invalid character '{ch}'"))]
  InvalidCharacter { ch: char, loc: usize },

  /// A token does not fit the grammar production being parsed.
  #[snafu(display("expected {expected}, but got {found}"))]
  UnexpectedToken {
    expected: String,
    found: String,
    loc: usize,
  },

  /// A closing `)` or `;` is missing.
  #[snafu(display("expected '{missing}' to close {construct}, but got {found}"))]
  Unterminated {
    missing: TokenKind,
    construct: &'static str,
    found: String,
    loc: usize,
  },

  /// An identifier or literal token arrived without its text.
  #[snafu(display("{kind} token is missing its text"))]
  MissingTokenText { kind: TokenKind, loc: usize },

  /// An identifier or literal token whose text is not a valid lexeme.
  #[snafu(display("malformed {kind} token {text:?}"))]
  MalformedToken {
    kind: TokenKind,
    text: String,
    loc: usize,
  },

  #[snafu(display("identifier '{name}' is already declared"))]
  DuplicateDeclaration { name: String },

  #[snafu(display("undeclared identifier '{name}'"))]
  UndeclaredIdentifier { name: String },

  /// A node the grammar declares but the generator cannot lower.
  #[snafu(display("{construct} is not supported"))]
  UnsupportedConstruct { construct: &'static str },

  #[snafu(context(false), display("{source}"))]
  Arena { source: ArenaError },
}

impl CompileError {
  /// Byte offset of the offending token, when the failure has one.
  pub fn loc(&self) -> Option<usize> {
    match self {
      Self::InvalidCharacter { loc, .. }
      | Self::UnexpectedToken { loc, .. }
      | Self::Unterminated { loc, .. }
      | Self::MissingTokenText { loc, .. }
      | Self::MalformedToken { loc, .. } => Some(*loc),
      Self::DuplicateDeclaration { .. }
      | Self::UndeclaredIdentifier { .. }
      | Self::UnsupportedConstruct { .. }
      | Self::Arena { .. } => None,
    }
  }

  /// Format the error against the source it was produced from.
  ///
  /// Located errors print the source line prefixed with its line number and
  /// a caret under the offending column; the rest print the message alone.
  pub fn render(&self, source: &str) -> String {
    let Some(loc) = self.loc() else {
      return format!("error: {self}");
    };

    let mut safe_loc = loc.min(source.len());
    while !source.is_char_boundary(safe_loc) {
      safe_loc -= 1;
    }
    let line_start = source[..safe_loc].rfind('\n').map_or(0, |i| i + 1);
    let line_end = source[safe_loc..]
      .find('\n')
      .map_or(source.len(), |i| safe_loc + i);
    let line_no = source[..line_start].matches('\n').count() + 1;
    let column = source[line_start..safe_loc].chars().count();

    let prefix = format!("{line_no}: ");
    let marker = format!("{}^", " ".repeat(prefix.len() + column));
    format!("{prefix}{}\n{marker} {self}", &source[line_start..line_end])
  }
}

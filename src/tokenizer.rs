//! Lexical analysis: turns the raw input string into a vector of tokens.
//!
//! The tokenizer knows nothing about the grammar beyond recognising the two
//! keywords, identifiers, integer literals and four punctuators. Positions
//! are kept only so diagnostics can point back into the source.

use std::fmt;

use crate::error::{CompileResult, InvalidCharacterSnafu};

/// Kinds of tokens recognised by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
  Exit,
  Var,
  Ident,
  IntLit,
  Semi,
  OpenParen,
  CloseParen,
  Eq,
}

impl fmt::Display for TokenKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let text = match self {
      TokenKind::Exit => "exit",
      TokenKind::Var => "var",
      TokenKind::Ident => "identifier",
      TokenKind::IntLit => "integer literal",
      TokenKind::Semi => ";",
      TokenKind::OpenParen => "(",
      TokenKind::CloseParen => ")",
      TokenKind::Eq => "=",
    };
    f.write_str(text)
  }
}

/// A lexical token. `text` is present for identifiers and literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
  pub kind: TokenKind,
  pub text: Option<String>,
  pub loc: usize,
  pub len: usize,
}

impl Token {
  /// Token without literal text, e.g. a keyword or punctuator.
  pub fn new(kind: TokenKind, loc: usize, len: usize) -> Self {
    Self {
      kind,
      text: None,
      loc,
      len,
    }
  }

  pub fn with_text(kind: TokenKind, text: impl Into<String>, loc: usize) -> Self {
    let text = text.into();
    Self {
      kind,
      len: text.len(),
      text: Some(text),
      loc,
    }
  }

  /// Byte offset just past the token.
  pub fn end(&self) -> usize {
    self.loc + self.len
  }
}

fn is_ident_start(c: u8) -> bool {
  c.is_ascii_alphabetic() || c == b'_'
}

fn is_ident_continue(c: u8) -> bool {
  c.is_ascii_alphanumeric() || c == b'_'
}

/// Whether `text` is a valid lexeme for an identifier or integer literal.
/// Tokens of any other kind carry no text.
pub fn is_well_formed(kind: TokenKind, text: &str) -> bool {
  let bytes = text.as_bytes();
  match kind {
    TokenKind::Ident => match bytes.split_first() {
      Some((&first, rest)) => is_ident_start(first) && rest.iter().all(|&c| is_ident_continue(c)),
      None => false,
    },
    TokenKind::IntLit => !bytes.is_empty() && bytes.iter().all(u8::is_ascii_digit),
    _ => false,
  }
}

/// Lex the input into a flat vector of tokens.
pub fn tokenize(input: &str) -> CompileResult<Vec<Token>> {
  let mut tokens = Vec::new();
  let bytes = input.as_bytes();
  let mut i = 0;

  while i < bytes.len() {
    let c = bytes[i];
    if c.is_ascii_whitespace() {
      i += 1;
      continue;
    }

    if is_ident_start(c) {
      let start = i;
      i += 1;
      while i < bytes.len() && is_ident_continue(bytes[i]) {
        i += 1;
      }
      let word = &input[start..i];
      let token = match word {
        "exit" => Token::new(TokenKind::Exit, start, word.len()),
        "var" => Token::new(TokenKind::Var, start, word.len()),
        _ => Token::with_text(TokenKind::Ident, word, start),
      };
      tokens.push(token);
      continue;
    }

    if c.is_ascii_digit() {
      let start = i;
      i += 1;
      while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
      }
      tokens.push(Token::with_text(TokenKind::IntLit, &input[start..i], start));
      continue;
    }

    let punct = match c {
      b';' => Some(TokenKind::Semi),
      b'(' => Some(TokenKind::OpenParen),
      b')' => Some(TokenKind::CloseParen),
      b'=' => Some(TokenKind::Eq),
      _ => None,
    };
    if let Some(kind) = punct {
      tokens.push(Token::new(kind, i, 1));
      i += 1;
      continue;
    }

    let ch = input[i..].chars().next().unwrap_or('\0');
    return InvalidCharacterSnafu { ch, loc: i }.fail();
  }

  Ok(tokens)
}

/// Human-friendly description used in diagnostics.
pub fn describe_token(token: Option<&Token>) -> String {
  match token {
    Some(Token {
      text: Some(text), ..
    }) => format!("\"{text}\""),
    Some(t) => format!("'{}'", t.kind),
    None => "end of input".to_string(),
  }
}

//! Recursive-descent parser building the AST inside an [`Arena`].
//!
//! ```text
//! program   := statement*
//! statement := "exit" "(" expr ")" ";"
//!            | "var" identifier "=" expr ";"
//! expr      := integer-literal | identifier
//! ```
//!
//! Parsing is fail-fast: the first token that does not fit aborts the whole
//! parse with a structured error and no partial program is returned.

use snafu::{OptionExt, ensure};

use crate::arena::{Arena, NodeId};
use crate::ast::{Expr, Program, Stmt, StmtExit, StmtVar};
use crate::error::{
  CompileError, CompileResult, MalformedTokenSnafu, MissingTokenTextSnafu, UnexpectedTokenSnafu,
  UnterminatedSnafu,
};
use crate::tokenizer::{Token, TokenKind, describe_token, is_well_formed};

/// Parse a whole token sequence into a program.
pub fn parse(tokens: Vec<Token>, arena: &mut Arena) -> CompileResult<Program> {
  Parser::new(tokens, arena).parse_program()
}

pub struct Parser<'a> {
  stream: TokenStream,
  arena: &'a mut Arena,
}

impl<'a> Parser<'a> {
  /// Take ownership of the tokens; every node is allocated from `arena`.
  pub fn new(tokens: Vec<Token>, arena: &'a mut Arena) -> Self {
    Self {
      stream: TokenStream::new(tokens),
      arena,
    }
  }

  /// Parse statements until the token stream is exhausted.
  pub fn parse_program(&mut self) -> CompileResult<Program> {
    let mut program = Program::default();
    while !self.stream.is_eof() {
      let stmt = self.parse_stmt()?;
      program.stmts.push(stmt);
    }
    Ok(program)
  }

  fn parse_stmt(&mut self) -> CompileResult<NodeId<Stmt>> {
    match self.stream.peek_kind(0) {
      Some(TokenKind::Exit) => self.parse_exit(),
      Some(TokenKind::Var) => self.parse_var(),
      _ => Err(self.stream.unexpected("a statement")),
    }
  }

  fn parse_exit(&mut self) -> CompileResult<NodeId<Stmt>> {
    self.stream.next();
    self.stream.skip(TokenKind::OpenParen)?;
    let expr = self.parse_expr()?;
    self.stream.close(TokenKind::CloseParen, "exit call")?;
    self.stream.close(TokenKind::Semi, "exit statement")?;

    Ok(self.arena.alloc(Stmt::Exit(StmtExit { expr }))?)
  }

  fn parse_var(&mut self) -> CompileResult<NodeId<Stmt>> {
    self.stream.next();
    let name = self.stream.get_ident()?;
    self.stream.skip(TokenKind::Eq)?;
    let expr = self.parse_expr()?;
    self.stream.close(TokenKind::Semi, "variable declaration")?;

    Ok(self.arena.alloc(Stmt::Var(StmtVar { name, expr }))?)
  }

  fn parse_expr(&mut self) -> CompileResult<NodeId<Expr>> {
    let expr = match self.stream.peek_kind(0) {
      Some(TokenKind::IntLit) => Expr::IntLit {
        text: self.stream.take_text()?,
      },
      Some(TokenKind::Ident) => Expr::Ident {
        name: self.stream.take_text()?,
      },
      _ => return Err(self.stream.unexpected("an expression")),
    };

    Ok(self.arena.alloc(expr)?)
  }
}

/// Lightweight cursor over the token vector.
struct TokenStream {
  tokens: Vec<Token>,
  pos: usize,
}

impl TokenStream {
  fn new(tokens: Vec<Token>) -> Self {
    Self { tokens, pos: 0 }
  }

  /// Look `offset` tokens ahead without consuming anything.
  fn peek(&self, offset: usize) -> Option<&Token> {
    self.tokens.get(self.pos + offset)
  }

  fn peek_kind(&self, offset: usize) -> Option<TokenKind> {
    self.peek(offset).map(|token| token.kind)
  }

  fn next(&mut self) -> Option<&Token> {
    let token = self.tokens.get(self.pos)?;
    self.pos += 1;
    Some(token)
  }

  fn is_eof(&self) -> bool {
    self.peek(0).is_none()
  }

  /// Location of the current token, or just past the last one at end of input.
  fn loc(&self) -> usize {
    match self.peek(0) {
      Some(token) => token.loc,
      None => self.tokens.last().map_or(0, Token::end),
    }
  }

  fn unexpected(&self, expected: &str) -> CompileError {
    UnexpectedTokenSnafu {
      expected,
      found: describe_token(self.peek(0)),
      loc: self.loc(),
    }
    .build()
  }

  /// Consume the current token if it has the given kind.
  fn equal(&mut self, kind: TokenKind) -> bool {
    if self.peek_kind(0) == Some(kind) {
      self.pos += 1;
      return true;
    }
    false
  }

  fn skip(&mut self, kind: TokenKind) -> CompileResult<()> {
    if self.equal(kind) {
      Ok(())
    } else {
      Err(self.unexpected(&format!("'{kind}'")))
    }
  }

  /// Like `skip`, but for a token that closes `construct`.
  fn close(&mut self, kind: TokenKind, construct: &'static str) -> CompileResult<()> {
    if self.equal(kind) {
      return Ok(());
    }
    UnterminatedSnafu {
      missing: kind,
      construct,
      found: describe_token(self.peek(0)),
      loc: self.loc(),
    }
    .fail()
  }

  fn get_ident(&mut self) -> CompileResult<String> {
    if self.peek_kind(0) == Some(TokenKind::Ident) {
      return self.take_text();
    }
    Err(self.unexpected("an identifier"))
  }

  /// Consume the current token and return its literal text.
  fn take_text(&mut self) -> CompileResult<String> {
    let Some(token) = self.peek(0) else {
      return Err(self.unexpected("a token"));
    };
    let text = token.text.clone().context(MissingTokenTextSnafu {
      kind: token.kind,
      loc: token.loc,
    })?;
    // Tokens may come from outside the tokenizer; their text is pasted into
    // the listing, so it has to be a real lexeme.
    ensure!(
      is_well_formed(token.kind, &text),
      MalformedTokenSnafu {
        kind: token.kind,
        text: &text,
        loc: token.loc,
      }
    );
    self.pos += 1;
    Ok(text)
  }
}

use std::mem;

use darkstar::CompileError;
use darkstar::arena::{Arena, ArenaError};
use darkstar::ast::{Expr, Stmt, StmtExit, StmtVar};
use darkstar::parser::{Parser, parse};
use darkstar::tokenizer::{Token, TokenKind, tokenize};

fn parse_source(source: &str, arena: &mut Arena) -> Result<darkstar::ast::Program, CompileError> {
  let tokens = tokenize(source).expect("source tokenizes");
  parse(tokens, arena)
}

#[test]
fn parses_statements_in_source_order() {
  let mut arena = Arena::new(4096);
  let program = parse_source("var x = 5; exit(x);", &mut arena).expect("valid program");
  assert_eq!(program.len(), 2);

  let Stmt::Var(StmtVar { name, expr }) = arena.get(program.stmts[0]).expect("live") else {
    panic!("first statement should be a declaration");
  };
  assert_eq!(name, "x");
  assert_eq!(
    arena.get(*expr).expect("live"),
    &Expr::IntLit {
      text: "5".to_string()
    }
  );

  let Stmt::Exit(StmtExit { expr }) = arena.get(program.stmts[1]).expect("live") else {
    panic!("second statement should be an exit");
  };
  assert_eq!(
    arena.get(*expr).expect("live"),
    &Expr::Ident {
      name: "x".to_string()
    }
  );
}

#[test]
fn every_node_lives_in_the_arena() {
  let mut arena = Arena::new(4096);
  let program = parse_source("var a = 1; var b = a; exit(b);", &mut arena).expect("valid");
  assert_eq!(program.len(), 3);
  assert_eq!(arena.node_count::<Stmt>(), 3);
  assert_eq!(arena.node_count::<Expr>(), 3);
  assert!(arena.used() >= 3 * (mem::size_of::<Stmt>() + mem::size_of::<Expr>()));
}

#[test]
fn empty_token_stream_is_an_empty_program() {
  let mut arena = Arena::new(0);
  let program = parse(Vec::new(), &mut arena).expect("empty program is valid");
  assert!(program.is_empty());
  assert_eq!(arena.used(), 0);
}

#[test]
fn parser_accepts_hand_built_tokens() {
  let tokens = vec![
    Token::new(TokenKind::Exit, 0, 4),
    Token::new(TokenKind::OpenParen, 4, 1),
    Token::with_text(TokenKind::IntLit, "42", 5),
    Token::new(TokenKind::CloseParen, 7, 1),
    Token::new(TokenKind::Semi, 8, 1),
  ];
  let mut arena = Arena::new(4096);
  let program = Parser::new(tokens, &mut arena)
    .parse_program()
    .expect("exit(42);");
  assert_eq!(program.len(), 1);
}

#[test]
fn statement_must_start_with_a_keyword() {
  let mut arena = Arena::new(4096);
  let err = parse_source("x = 1;", &mut arena).expect_err("no keyword");
  assert!(matches!(
    err,
    CompileError::UnexpectedToken { ref expected, ref found, loc: 0 }
      if expected == "a statement" && found == "\"x\""
  ));
}

#[test]
fn exit_requires_open_paren() {
  let mut arena = Arena::new(4096);
  let err = parse_source("exit 1;", &mut arena).expect_err("missing '('");
  assert!(matches!(
    err,
    CompileError::UnexpectedToken { ref expected, ref found, loc: 5 }
      if expected == "'('" && found == "\"1\""
  ));
}

#[test]
fn exit_requires_close_paren() {
  let mut arena = Arena::new(4096);
  let err = parse_source("exit(1;", &mut arena).expect_err("missing ')'");
  assert!(matches!(
    err,
    CompileError::Unterminated {
      missing: TokenKind::CloseParen,
      construct: "exit call",
      ref found,
      loc: 6,
    } if found == "';'"
  ));
}

#[test]
fn missing_semicolon_at_end_of_input_points_past_last_token() {
  let mut arena = Arena::new(4096);
  let err = parse_source("exit(1)", &mut arena).expect_err("missing ';'");
  assert!(matches!(
    err,
    CompileError::Unterminated {
      missing: TokenKind::Semi,
      construct: "exit statement",
      ref found,
      loc: 7,
    } if found == "end of input"
  ));
}

#[test]
fn declaration_requires_identifier_equals_and_semicolon() {
  let mut arena = Arena::new(4096);

  let err = parse_source("var 1 = 2;", &mut arena).expect_err("missing name");
  assert!(matches!(
    err,
    CompileError::UnexpectedToken { ref expected, .. } if expected == "an identifier"
  ));

  let err = parse_source("var x 2;", &mut arena).expect_err("missing '='");
  assert!(matches!(
    err,
    CompileError::UnexpectedToken { ref expected, .. } if expected == "'='"
  ));

  let err = parse_source("var x = 2 exit(x);", &mut arena).expect_err("missing ';'");
  assert!(matches!(
    err,
    CompileError::Unterminated {
      missing: TokenKind::Semi,
      construct: "variable declaration",
      ..
    }
  ));
}

#[test]
fn expression_must_be_literal_or_identifier() {
  let mut arena = Arena::new(4096);
  let err = parse_source("exit(;", &mut arena).expect_err("no expression");
  assert!(matches!(
    err,
    CompileError::UnexpectedToken { ref expected, ref found, .. }
      if expected == "an expression" && found == "';'"
  ));
}

#[test]
fn failure_after_valid_statements_returns_no_program() {
  let mut arena = Arena::new(4096);
  let result = parse_source("var a = 1; exit(a); exit(", &mut arena);
  assert!(matches!(
    result,
    Err(CompileError::UnexpectedToken { ref found, .. }) if found == "end of input"
  ));
}

#[test]
fn literal_token_without_text_is_rejected() {
  let tokens = vec![
    Token::new(TokenKind::Exit, 0, 4),
    Token::new(TokenKind::OpenParen, 4, 1),
    Token::new(TokenKind::IntLit, 5, 2),
    Token::new(TokenKind::CloseParen, 7, 1),
    Token::new(TokenKind::Semi, 8, 1),
  ];
  let mut arena = Arena::new(4096);
  let err = parse(tokens, &mut arena).expect_err("literal has no text");
  assert!(matches!(
    err,
    CompileError::MissingTokenText {
      kind: TokenKind::IntLit,
      loc: 5
    }
  ));
}

fn exit_tokens(literal: Token) -> Vec<Token> {
  vec![
    Token::new(TokenKind::Exit, 0, 4),
    Token::new(TokenKind::OpenParen, 4, 1),
    literal,
    Token::new(TokenKind::CloseParen, 7, 1),
    Token::new(TokenKind::Semi, 8, 1),
  ]
}

#[test]
fn literal_token_with_non_digit_text_is_rejected() {
  let mut arena = Arena::new(4096);
  let literal = Token::with_text(TokenKind::IntLit, "rsp\nsyscall", 5);
  let err = parse(exit_tokens(literal), &mut arena).expect_err("not a number");
  assert!(matches!(
    err,
    CompileError::MalformedToken {
      kind: TokenKind::IntLit,
      ref text,
      loc: 5,
    } if text == "rsp\nsyscall"
  ));
  assert_eq!(arena.node_count::<Expr>(), 0);

  let empty = Token::with_text(TokenKind::IntLit, "", 5);
  let err = parse(exit_tokens(empty), &mut arena).expect_err("empty literal");
  assert!(matches!(
    err,
    CompileError::MalformedToken {
      kind: TokenKind::IntLit,
      ..
    }
  ));
}

#[test]
fn identifier_token_must_be_a_valid_name() {
  for bad in ["", "1x", "a b", "x;"] {
    let tokens = vec![
      Token::new(TokenKind::Var, 0, 3),
      Token::with_text(TokenKind::Ident, bad, 4),
      Token::new(TokenKind::Eq, 6, 1),
      Token::with_text(TokenKind::IntLit, "1", 8),
      Token::new(TokenKind::Semi, 9, 1),
    ];
    let mut arena = Arena::new(4096);
    let err = parse(tokens, &mut arena).expect_err("malformed name");
    assert!(
      matches!(
        err,
        CompileError::MalformedToken { kind: TokenKind::Ident, ref text, loc: 4 } if text == bad
      ),
      "{bad:?} gave {err:?}"
    );
  }

  let mut arena = Arena::new(4096);
  let name = Token::with_text(TokenKind::Ident, "_tmp9", 5);
  let program = parse(exit_tokens(name), &mut arena).expect("well-formed name parses");
  assert_eq!(program.len(), 1);
}

#[test]
fn arena_smaller_than_a_node_fails_on_first_allocation() {
  let mut arena = Arena::new(1);
  let err = parse_source("exit(42);", &mut arena).expect_err("arena too small");
  assert!(matches!(
    err,
    CompileError::Arena {
      source: ArenaError::Exhausted {
        used: 0,
        capacity: 1,
        ..
      }
    }
  ));
}

#[test]
fn arena_exhaustion_mid_program_aborts_the_parse() {
  let node_bytes = mem::size_of::<Expr>() + mem::size_of::<Stmt>();
  let mut arena = Arena::new(node_bytes + mem::size_of::<Expr>());
  let err = parse_source("exit(1); exit(2);", &mut arena).expect_err("second stmt does not fit");
  assert!(matches!(
    err,
    CompileError::Arena {
      source: ArenaError::Exhausted { .. }
    }
  ));
}

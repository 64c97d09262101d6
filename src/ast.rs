//! Syntax tree produced by the parser.
//!
//! Nodes are stored in an [`Arena`](crate::arena::Arena); links between
//! nodes are [`NodeId`] handles, never owning pointers.

use crate::arena::NodeId;

/// Binary operators the grammar reserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
  Add,
  Sub,
  Mul,
  Div,
}

/// Additive or multiplicative expression.
///
/// The parser never builds one and the generator rejects it; the shape is
/// kept so every consumer has to account for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryExpr {
  pub op: BinaryOp,
  pub lhs: NodeId<Expr>,
  pub rhs: NodeId<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
  /// Integer literal, kept as its source digits.
  IntLit { text: String },
  Ident { name: String },
  Binary(BinaryExpr),
}

/// `exit(<expr>);`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StmtExit {
  pub expr: NodeId<Expr>,
}

/// `var <name> = <expr>;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StmtVar {
  pub name: String,
  pub expr: NodeId<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
  Exit(StmtExit),
  Var(StmtVar),
}

/// Statements in source order, which is also execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
  pub stmts: Vec<NodeId<Stmt>>,
}

impl Program {
  pub fn len(&self) -> usize {
    self.stmts.len()
  }

  pub fn is_empty(&self) -> bool {
    self.stmts.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = NodeId<Stmt>> + '_ {
    self.stmts.iter().copied()
  }
}

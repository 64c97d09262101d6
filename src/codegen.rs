//! Code generation: lower the parsed program into NASM x86-64 assembly.
//!
//! The emitter is a simple stack machine: every expression leaves a single
//! value on the stack. Variables are never stored anywhere else; each one is
//! the stack slot its initializer was pushed into, and reading it copies that
//! slot back onto the top of the stack.

use std::collections::HashMap;

use snafu::{OptionExt, ensure};

use crate::arena::{Arena, NodeId};
use crate::ast::{Expr, Program, Stmt, StmtExit, StmtVar};
use crate::error::{
  CompileResult, DuplicateDeclarationSnafu, UndeclaredIdentifierSnafu, UnsupportedConstructSnafu,
};

/// Bytes per stack slot.
const SLOT_SIZE: usize = 8;
const SYS_EXIT: u32 = 60;

/// Lowers a parsed [`Program`] whose nodes live in `arena`.
pub struct Generator<'a> {
  program: &'a Program,
  arena: &'a Arena,
}

impl<'a> Generator<'a> {
  pub fn new(program: &'a Program, arena: &'a Arena) -> Self {
    Self { program, arena }
  }

  /// Emit the full listing. Each call starts from a fresh context, so the
  /// output for a given program is always the same.
  pub fn generate(&self) -> CompileResult<String> {
    let mut ctx = Emitter::new(self.arena);
    ctx.line("global _start");
    ctx.line("_start:");

    for stmt in self.program.iter() {
      ctx.emit_stmt(stmt)?;
    }

    ctx.instr(&format!("mov rax, {SYS_EXIT}"));
    ctx.instr("mov rdi, 0");
    ctx.instr("syscall");

    Ok(ctx.asm)
  }
}

/// Distance, in slots, from the top of a stack `stack_size` deep down to
/// the slot recorded at `stack_loc`. Callers guarantee `stack_loc < stack_size`.
pub(crate) fn slot_offset(stack_size: usize, stack_loc: usize) -> usize {
  stack_size - stack_loc - 1
}

#[derive(Debug, Clone, Copy)]
struct Var {
  stack_loc: usize,
}

/// Per-run generation state.
struct Emitter<'a> {
  arena: &'a Arena,
  asm: String,
  stack_size: usize,
  vars: HashMap<String, Var>,
}

impl<'a> Emitter<'a> {
  fn new(arena: &'a Arena) -> Self {
    Self {
      arena,
      asm: String::new(),
      stack_size: 0,
      vars: HashMap::new(),
    }
  }

  fn line(&mut self, text: &str) {
    self.asm.push_str(text);
    self.asm.push('\n');
  }

  fn instr(&mut self, text: &str) {
    self.asm.push_str("    ");
    self.line(text);
  }

  fn push(&mut self, operand: &str) {
    self.instr(&format!("push {operand}"));
    self.stack_size += 1;
  }

  fn pop(&mut self, reg: &str) {
    self.instr(&format!("pop {reg}"));
    self.stack_size -= 1;
  }

  /// A declared name is visible only after its initializer, so `var x = x;`
  /// is an undeclared identifier.
  fn emit_stmt(&mut self, id: NodeId<Stmt>) -> CompileResult<()> {
    let arena = self.arena;
    match arena.get(id)? {
      Stmt::Exit(StmtExit { expr }) => {
        self.emit_expr(*expr)?;
        self.instr(&format!("mov rax, {SYS_EXIT}"));
        self.pop("rdi");
        self.instr("syscall");
      }
      Stmt::Var(StmtVar { name, expr }) => {
        ensure!(
          !self.vars.contains_key(name),
          DuplicateDeclarationSnafu { name }
        );
        // The slot is the depth before the initializer is pushed. The name
        // only becomes visible once that push has been emitted.
        let var = Var {
          stack_loc: self.stack_size,
        };
        self.emit_expr(*expr)?;
        self.vars.insert(name.clone(), var);
      }
    }
    Ok(())
  }

  fn emit_expr(&mut self, id: NodeId<Expr>) -> CompileResult<()> {
    let arena = self.arena;
    match arena.get(id)? {
      Expr::IntLit { text } => {
        self.instr(&format!("mov rax, {text}"));
        self.push("rax");
      }
      Expr::Ident { name } => {
        let var = *self
          .vars
          .get(name)
          .context(UndeclaredIdentifierSnafu { name })?;
        let offset = slot_offset(self.stack_size, var.stack_loc) * SLOT_SIZE;
        self.push(&format!("QWORD [rsp + {offset}]"));
      }
      Expr::Binary(_) => {
        return UnsupportedConstructSnafu {
          construct: "binary expression",
        }
        .fail();
      }
    }
    Ok(())
  }
}

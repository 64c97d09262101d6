//! Crate root: wires together the compilation pipeline.
//!
//! - `tokenizer` performs lexical analysis and produces a flat token stream.
//! - `parser` owns all syntactic knowledge and builds the AST in an `arena`.
//! - `codegen` lowers the parsed program into NASM x86-64 assembly.
//! - `error` holds the structured diagnostics shared by the other modules.

pub mod arena;
pub mod ast;
pub mod codegen;
pub mod error;
pub mod parser;
pub mod tokenizer;

pub use arena::{Arena, ArenaError, NodeId};
pub use codegen::Generator;
pub use error::{CompileError, CompileResult};
pub use parser::Parser;

/// Arena size used when nothing else is configured.
pub const DEFAULT_ARENA_CAPACITY: usize = 4 * 1024 * 1024;

/// Knobs for a single compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
  /// Bytes available to the AST arena.
  pub arena_capacity: usize,
}

impl Default for CompileOptions {
  fn default() -> Self {
    Self {
      arena_capacity: DEFAULT_ARENA_CAPACITY,
    }
  }
}

/// Compile a source string into assembly with the given options.
pub fn compile(source: &str, options: &CompileOptions) -> CompileResult<String> {
  let tokens = tokenizer::tokenize(source)?;
  let mut arena = Arena::new(options.arena_capacity);
  let program = parser::parse(tokens, &mut arena)?;
  Generator::new(&program, &arena).generate()
}

/// Compile a source string into assembly with default options.
pub fn generate_assembly(source: &str) -> CompileResult<String> {
  compile(source, &CompileOptions::default())
}

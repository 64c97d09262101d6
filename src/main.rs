use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use darkstar::{CompileError, CompileOptions, DEFAULT_ARENA_CAPACITY};
use snafu::{IntoError, ResultExt, Snafu};

/// Compile a darkstar source file into NASM x86-64 assembly.
#[derive(Debug, Parser)]
#[command(name = "darkstar", version, about)]
struct Cli {
  /// Source file to compile.
  input: PathBuf,

  /// Write the listing here instead of stdout.
  #[arg(short, long)]
  output: Option<PathBuf>,

  /// Bytes reserved for the syntax tree arena.
  #[arg(long, default_value_t = DEFAULT_ARENA_CAPACITY)]
  arena_bytes: usize,
}

#[derive(Debug, Snafu)]
enum CliError {
  #[snafu(display("cannot read {}: {source}", path.display()))]
  ReadInput {
    path: PathBuf,
    source: std::io::Error,
  },

  #[snafu(display("cannot write {}: {source}", path.display()))]
  WriteOutput {
    path: PathBuf,
    source: std::io::Error,
  },

  #[snafu(display("{rendered}"))]
  Compile {
    rendered: String,
    source: CompileError,
  },
}

fn run(cli: &Cli) -> Result<(), CliError> {
  let source = fs::read_to_string(&cli.input).context(ReadInputSnafu { path: &cli.input })?;
  let options = CompileOptions {
    arena_capacity: cli.arena_bytes,
  };

  let asm = darkstar::compile(&source, &options).map_err(|err| {
    let rendered = err.render(&source);
    CompileSnafu { rendered }.into_error(err)
  })?;

  match &cli.output {
    Some(path) => fs::write(path, asm).context(WriteOutputSnafu { path }),
    None => {
      print!("{asm}");
      Ok(())
    }
  }
}

fn main() {
  let cli = Cli::parse();
  if let Err(err) = run(&cli) {
    eprintln!("{err}");
    process::exit(1);
  }
}

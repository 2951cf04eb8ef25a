//! Crate root: wires together the compiler and the tape machine.
//!
//! - `parser` turns expression text into a tree.
//! - `eval` computes the tree's value directly.
//! - `codegen` lowers the tree into a tape-machine program that prints the
//!   name and the value.
//! - `machine` loads and executes tape-machine programs.
//! - `error` holds the diagnostics shared by the other modules.

pub mod codegen;
pub mod error;
pub mod eval;
pub mod machine;
pub mod parser;

use snafu::OptionExt;
use tracing::warn;

pub use codegen::GeneratorConfig;
pub use error::{CompileError, CompileResult, MachineError, MachineResult};
pub use machine::{Machine, MachineConfig, Program};

use error::MissingSeparatorSnafu;

/// Output of a successful compilation.
#[derive(Debug, Clone)]
pub struct Compilation {
  /// Name printed in front of the result.
  pub name: String,
  /// Generated tape-machine program.
  pub program: String,
  /// Ordinary integer value of the expression, `None` if it overflows `i64`.
  pub value: Option<i64>,
  /// Value left in the result cell, which is also the value printed.
  pub byte: u8,
  /// Cells the expression needs, starting at the result cell.
  pub footprint: usize,
}

/// Compile a `NAME=EXPRESSION` line. Surrounding whitespace is trimmed;
/// whitespace inside the expression is rejected.
pub fn compile_line(line: &str, config: &GeneratorConfig) -> CompileResult<Compilation> {
  let line = line.trim();
  let split = line.find('=').context(MissingSeparatorSnafu { line })?;
  let name = &line[..split];
  let node = parser::parse_at(line, split + 1)?;

  let value = eval::evaluate(&node);
  let byte = eval::evaluate_byte(&node);
  if value != Some(i64::from(byte)) {
    warn!(?value, byte, "result does not fit in a tape cell, printing the wrapped byte");
  }

  let program = codegen::generate(name, &node, &byte.to_string(), config);

  Ok(Compilation {
    name: name.to_string(),
    program,
    value,
    byte,
    footprint: codegen::footprint(&node),
  })
}

/// Load and run a program on a fresh machine, returning the bytes it prints.
pub fn execute(code: impl Into<Vec<u8>>, config: MachineConfig) -> MachineResult<Vec<u8>> {
  let program = Program::parse(code)?;
  let mut machine = Machine::new(config);
  let mut out = Vec::new();
  machine.run(&program, &mut out)?;
  Ok(out)
}

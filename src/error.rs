//! Error types shared by the compiler and the tape machine.
//!
//! Compiler diagnostics point at the offending byte with a caret, in the
//! same style for every parse failure. Machine errors are raised by the
//! bracket-matching pre-pass before any instruction runs, or by the output
//! sink while the program is executing.

use std::io;

use snafu::Snafu;

pub type CompileResult<T> = Result<T, CompileError>;
pub type MachineResult<T> = Result<T, MachineError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CompileError {
  #[snafu(display("{expr_line}\n{marker} {message}"))]
  MalformedExpression {
    expr_line: String,
    marker: String,
    message: String,
    loc: usize,
  },

  #[snafu(display("expected NAME=EXPRESSION, but '{line}' has no '='"))]
  MissingSeparator { line: String },
}

impl CompileError {
  /// Construct a parse error anchored at a specific byte offset in the source.
  pub fn at(expr: &str, loc: usize, message: impl Into<String>) -> Self {
    let expr_line = format!("'{expr}'");
    let mut safe_loc = loc.min(expr.len());
    while !expr.is_char_boundary(safe_loc) {
      safe_loc -= 1;
    }
    let char_offset = expr[..safe_loc].chars().count() + 1; // account for opening quote
    let marker = format!("{}^", " ".repeat(char_offset));
    Self::MalformedExpression {
      expr_line,
      marker,
      message: message.into(),
      loc: safe_loc,
    }
  }

  /// Byte offset of the failure, when the error is tied to one.
  pub fn location(&self) -> Option<usize> {
    match self {
      Self::MalformedExpression { loc, .. } => Some(*loc),
      Self::MissingSeparator { .. } => None,
    }
  }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum MachineError {
  #[snafu(display("unbalanced loop: '{bracket}' at offset {offset} has no partner"))]
  UnbalancedLoop { bracket: char, offset: usize },

  #[snafu(display("failed to write program output"))]
  Output { source: io::Error },
}

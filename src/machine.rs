//! The tape machine: instruction alphabet, loaded programs and the executor.
//!
//! A program is kept as the raw byte stream it was read from. Only the seven
//! bytes in [`Op`] mean anything; every other byte is a comment. Loop
//! brackets are paired once, up front, so a structurally broken program is
//! rejected before it can produce any output.

use std::io::Write;
use std::num::NonZeroUsize;

use snafu::ResultExt;
use tracing::debug;

use crate::error::{MachineResult, OutputSnafu, UnbalancedLoopSnafu};

/// Tape length used when nothing else is configured.
pub const DEFAULT_TAPE_LEN: NonZeroUsize = NonZeroUsize::new(30_000).unwrap();

/// Primitive tape-machine instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
  Right,
  Left,
  Inc,
  Dec,
  Open,
  Close,
  Output,
}

impl Op {
  pub fn decode(byte: u8) -> Option<Op> {
    match byte {
      b'>' => Some(Op::Right),
      b'<' => Some(Op::Left),
      b'+' => Some(Op::Inc),
      b'-' => Some(Op::Dec),
      b'[' => Some(Op::Open),
      b']' => Some(Op::Close),
      b'.' => Some(Op::Output),
      _ => None,
    }
  }

  pub fn symbol(self) -> char {
    match self {
      Op::Right => '>',
      Op::Left => '<',
      Op::Inc => '+',
      Op::Dec => '-',
      Op::Open => '[',
      Op::Close => ']',
      Op::Output => '.',
    }
  }
}

/// A program with its loop brackets resolved.
#[derive(Debug, Clone)]
pub struct Program {
  code: Vec<u8>,
  // For every bracket, the offset of its partner. Other slots are unused.
  jumps: Vec<usize>,
}

impl Program {
  /// Pair every `[` with its `]`. Fails on the first `]` without an open
  /// loop, or on the innermost `[` left open at the end.
  pub fn parse(code: impl Into<Vec<u8>>) -> MachineResult<Self> {
    let code = code.into();
    let mut jumps = vec![0; code.len()];
    let mut open = Vec::new();

    for (offset, &byte) in code.iter().enumerate() {
      match Op::decode(byte) {
        Some(Op::Open) => open.push(offset),
        Some(Op::Close) => {
          let Some(start) = open.pop() else {
            return UnbalancedLoopSnafu {
              bracket: ']',
              offset,
            }
            .fail();
          };
          jumps[start] = offset;
          jumps[offset] = start;
        }
        _ => {}
      }
    }

    if let Some(&offset) = open.last() {
      return UnbalancedLoopSnafu {
        bracket: '[',
        offset,
      }
      .fail();
    }

    debug!(len = code.len(), "loop brackets resolved");
    Ok(Self { code, jumps })
  }

  /// Offset of the bracket paired with the one at `offset`.
  pub fn partner(&self, offset: usize) -> Option<usize> {
    match self.code.get(offset).copied().and_then(Op::decode) {
      Some(Op::Open | Op::Close) => Some(self.jumps[offset]),
      _ => None,
    }
  }
}

/// Fixed-length ring of byte cells with a single cursor.
#[derive(Debug, Clone)]
pub struct Tape {
  cells: Box<[u8]>,
  cursor: usize,
}

impl Tape {
  pub fn new(len: NonZeroUsize) -> Self {
    Self {
      cells: vec![0; len.get()].into_boxed_slice(),
      cursor: 0,
    }
  }

  pub fn len(&self) -> usize {
    self.cells.len()
  }

  pub fn cursor(&self) -> usize {
    self.cursor
  }

  pub fn cells(&self) -> &[u8] {
    &self.cells
  }

  pub fn get(&self) -> u8 {
    self.cells[self.cursor]
  }

  pub fn move_right(&mut self) {
    self.cursor += 1;
    if self.cursor == self.cells.len() {
      self.cursor = 0;
    }
  }

  pub fn move_left(&mut self) {
    self.cursor = match self.cursor {
      0 => self.cells.len() - 1,
      n => n - 1,
    };
  }

  pub fn inc(&mut self) {
    let cell = &mut self.cells[self.cursor];
    *cell = cell.wrapping_add(1);
  }

  pub fn dec(&mut self) {
    let cell = &mut self.cells[self.cursor];
    *cell = cell.wrapping_sub(1);
  }
}

#[derive(Debug, Clone, Copy)]
pub struct MachineConfig {
  pub tape_len: NonZeroUsize,
}

impl Default for MachineConfig {
  fn default() -> Self {
    Self {
      tape_len: DEFAULT_TAPE_LEN,
    }
  }
}

/// Executes programs against a tape owned by this machine.
pub struct Machine {
  tape: Tape,
}

impl Machine {
  pub fn new(config: MachineConfig) -> Self {
    Self {
      tape: Tape::new(config.tape_len),
    }
  }

  pub fn tape(&self) -> &Tape {
    &self.tape
  }

  /// Run `program` to completion, writing each `.` byte to `out`.
  ///
  /// There is no step limit: a loop whose cell never reaches zero runs
  /// forever.
  pub fn run<W: Write>(&mut self, program: &Program, out: &mut W) -> MachineResult<()> {
    let code = &program.code;
    let mut ip = 0;
    let mut steps: u64 = 0;

    while ip < code.len() {
      match Op::decode(code[ip]) {
        Some(Op::Right) => self.tape.move_right(),
        Some(Op::Left) => self.tape.move_left(),
        Some(Op::Inc) => self.tape.inc(),
        Some(Op::Dec) => self.tape.dec(),
        Some(Op::Open) => {
          if self.tape.get() == 0 {
            ip = program.jumps[ip];
          }
        }
        Some(Op::Close) => {
          if self.tape.get() != 0 {
            ip = program.jumps[ip];
          }
        }
        Some(Op::Output) => out.write_all(&[self.tape.get()]).context(OutputSnafu)?,
        None => {}
      }
      ip += 1;
      steps += 1;
    }

    out.flush().context(OutputSnafu)?;
    debug!(steps, "program finished");
    Ok(())
  }
}

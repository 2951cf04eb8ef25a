//! Code generation: lower the expression tree into tape-machine instructions.
//!
//! Every node is generated into a *target cell* and may use the cells to its
//! right as scratch, never anything to its left. A binary node puts its left
//! operand in `target`, its right operand in `target + 1`, and then folds the
//! right cell into the left one. Multiplication borrows two more cells: an
//! accumulator at `target + 2` and a restore buffer at `target + 3`.
//!
//! The generator tracks where the cursor is, so every move is emitted as the
//! straight run of `>` or `<` from the current cell to the next one.

use tracing::debug;

use crate::eval::literal_byte;
use crate::machine::Op;
use crate::parser::{AstNode, BinaryOp};

pub type Cell = usize;

/// Cell the root expression is generated into.
pub const RESULT_CELL: Cell = 0;

/// Cell used to spell out the `NAME=` prefix and the result digits.
pub const DEFAULT_DISPLAY_CELL: Cell = 10;

#[derive(Debug, Clone, Copy)]
pub struct GeneratorConfig {
  pub display_cell: Cell,
}

impl Default for GeneratorConfig {
  fn default() -> Self {
    Self {
      display_cell: DEFAULT_DISPLAY_CELL,
    }
  }
}

/// Number of cells, counting the target, that generating `node` touches.
pub fn footprint(node: &AstNode) -> usize {
  match node {
    AstNode::Num { .. } => 1,
    AstNode::Binary { op, lhs, rhs } => {
      let window = match op {
        BinaryOp::Add | BinaryOp::Sub => 2,
        BinaryOp::Mul => 4,
      };
      footprint(lhs).max(1 + footprint(rhs)).max(window)
    }
  }
}

/// Emit the complete program: print `NAME=`, compute `node` into
/// [`RESULT_CELL`], then print `result`.
pub fn generate(name: &str, node: &AstNode, result: &str, config: &GeneratorConfig) -> String {
  let mut generator = Generator::new();

  generator.emit_text(config.display_cell, name);
  generator.emit_text(config.display_cell, "=");
  generator.emit_expr(node, RESULT_CELL);
  generator.emit_text(config.display_cell, result);

  debug!(
    cells = footprint(node),
    len = generator.code.len(),
    "program generated"
  );
  generator.finish()
}

/// Instruction buffer plus the cursor position the emitted code will have
/// reached at the end of the buffer.
#[derive(Debug, Default)]
pub struct Generator {
  code: String,
  cursor: Cell,
  high_water: Cell,
}

impl Generator {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn cursor(&self) -> Cell {
    self.cursor
  }

  /// Highest cell any emitted instruction has visited.
  pub fn high_water(&self) -> Cell {
    self.high_water
  }

  pub fn finish(self) -> String {
    self.code
  }

  /// Leave the value of `node`, modulo 256, in `target` with the cursor on it.
  pub fn emit_expr(&mut self, node: &AstNode, target: Cell) {
    match node {
      AstNode::Num { value } => {
        self.move_to(target);
        self.zero();
        self.inc(literal_byte(*value));
      }
      AstNode::Binary { op, lhs, rhs } => {
        self.emit_expr(lhs, target);
        self.emit_expr(rhs, target + 1);
        match op {
          BinaryOp::Add => self.emit_transfer(target + 1, target, Op::Inc),
          BinaryOp::Sub => self.emit_transfer(target + 1, target, Op::Dec),
          BinaryOp::Mul => self.emit_mul(target, target + 1, target + 2, target + 3),
        }
      }
    }
  }

  /// Print each byte of `text` by rebuilding it from zero in `cell`.
  pub fn emit_text(&mut self, cell: Cell, text: &str) {
    for byte in text.bytes() {
      self.move_to(cell);
      self.zero();
      self.inc(byte);
      self.op(Op::Output);
    }
  }

  fn op(&mut self, op: Op) {
    self.code.push(op.symbol());
  }

  fn move_to(&mut self, cell: Cell) {
    while self.cursor < cell {
      self.op(Op::Right);
      self.cursor += 1;
    }
    while self.cursor > cell {
      self.op(Op::Left);
      self.cursor -= 1;
    }
    self.high_water = self.high_water.max(cell);
  }

  fn zero(&mut self) {
    self.op(Op::Open);
    self.op(Op::Dec);
    self.op(Op::Close);
  }

  fn inc(&mut self, count: u8) {
    for _ in 0..count {
      self.op(Op::Inc);
    }
  }

  /// `[ body ]` governed by `cell`. The body starts on `cell` and the cursor
  /// is brought back to it before the closing bracket.
  fn emit_loop(&mut self, cell: Cell, body: impl FnOnce(&mut Self)) {
    self.move_to(cell);
    self.op(Op::Open);
    body(self);
    self.move_to(cell);
    self.op(Op::Close);
  }

  /// Drain `src` into `dst`, applying `step` to `dst` once per unit.
  fn emit_transfer(&mut self, src: Cell, dst: Cell, step: Op) {
    self.emit_loop(src, |g| {
      g.op(Op::Dec);
      g.move_to(dst);
      g.op(step);
    });
    self.move_to(dst);
  }

  /// `a = a * b` by repeated addition. Each pass of the outer loop drains
  /// `b` into both `res` and `tmp`, then drains `tmp` back into `b`.
  fn emit_mul(&mut self, a: Cell, b: Cell, res: Cell, tmp: Cell) {
    self.move_to(res);
    self.zero();
    self.move_to(tmp);
    self.zero();

    self.emit_loop(a, |g| {
      g.op(Op::Dec);
      g.emit_loop(b, |g| {
        g.op(Op::Dec);
        g.move_to(res);
        g.op(Op::Inc);
        g.move_to(tmp);
        g.op(Op::Inc);
      });
      g.emit_loop(tmp, |g| {
        g.op(Op::Dec);
        g.move_to(b);
        g.op(Op::Inc);
      });
    });

    self.emit_transfer(res, a, Op::Inc);
  }
}

//! Direct evaluation of the expression tree.
//!
//! Two views of the same tree are offered. `evaluate` is ordinary signed
//! integer arithmetic and may go negative. `evaluate_byte` follows the tape
//! machine, where every intermediate result is an unsigned byte that wraps
//! modulo 256.

use crate::parser::{AstNode, BinaryOp};

/// Ordinary integer value of the expression, or `None` if it overflows `i64`.
pub fn evaluate(node: &AstNode) -> Option<i64> {
  match node {
    AstNode::Num { value } => i64::try_from(*value).ok(),
    AstNode::Binary { op, lhs, rhs } => {
      let lhs = evaluate(lhs)?;
      let rhs = evaluate(rhs)?;
      match op {
        BinaryOp::Add => lhs.checked_add(rhs),
        BinaryOp::Sub => lhs.checked_sub(rhs),
        BinaryOp::Mul => lhs.checked_mul(rhs),
      }
    }
  }
}

/// Value a compiled program leaves in its result cell.
pub fn evaluate_byte(node: &AstNode) -> u8 {
  match node {
    AstNode::Num { value } => literal_byte(*value),
    AstNode::Binary { op, lhs, rhs } => {
      let lhs = evaluate_byte(lhs);
      let rhs = evaluate_byte(rhs);
      match op {
        BinaryOp::Add => lhs.wrapping_add(rhs),
        BinaryOp::Sub => lhs.wrapping_sub(rhs),
        BinaryOp::Mul => lhs.wrapping_mul(rhs),
      }
    }
  }
}

/// A literal as it lands on the tape: its value modulo 256.
pub fn literal_byte(value: u64) -> u8 {
  (value % 256) as u8
}

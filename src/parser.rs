//! Recursive-descent parser producing the arithmetic expression tree.
//!
//! The grammar is small enough to parse straight off the characters, so
//! there is no separate token pass:
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := factor ('*' factor)*
//! factor := '(' expr ')' | digits
//! ```
//!
//! Whitespace is not skipped. The caller trims the whole input line, and any
//! blank left inside the expression is reported as malformed.

use crate::error::{CompileError, CompileResult};

/// Binary operators recognised by the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
  Add,
  Sub,
  Mul,
}

impl BinaryOp {
  pub fn symbol(self) -> char {
    match self {
      Self::Add => '+',
      Self::Sub => '-',
      Self::Mul => '*',
    }
  }
}

/// Expression tree produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AstNode {
  Num {
    value: u64,
  },
  Binary {
    op: BinaryOp,
    lhs: Box<AstNode>,
    rhs: Box<AstNode>,
  },
}

impl AstNode {
  pub fn number(value: u64) -> Self {
    Self::Num { value }
  }

  pub fn binary(op: BinaryOp, lhs: AstNode, rhs: AstNode) -> Self {
    Self::Binary {
      op,
      lhs: Box::new(lhs),
      rhs: Box::new(rhs),
    }
  }
}

/// Deepest expression tree, and deepest parenthesis nesting, the parser
/// accepts. Every later pass walks the tree recursively, so anything deeper
/// is rejected as malformed instead of exhausting the stack.
pub const MAX_DEPTH: usize = 256;

/// Parse a complete expression. Every character of `source` must be consumed.
pub fn parse(source: &str) -> CompileResult<AstNode> {
  parse_at(source, 0)
}

/// Parse the expression that starts at byte `start` and runs to the end of
/// `source`. Diagnostics are anchored in the full `source` text.
pub fn parse_at(source: &str, start: usize) -> CompileResult<AstNode> {
  if !source.is_char_boundary(start) {
    return Err(CompileError::at(
      source,
      start,
      "expression does not start on a character boundary",
    ));
  }

  let mut parser = Parser::new(source, start);

  if parser.is_eof() {
    return Err(CompileError::at(source, start, "expression is empty"));
  }

  let node = parser.parse_expr()?;

  if let Some(c) = parser.peek() {
    let message = if c == ')' {
      "unmatched ')'".to_string()
    } else {
      format!("unexpected character '{}'", c.escape_debug())
    };
    return Err(CompileError::at(source, parser.pos(), message));
  }

  Ok(node)
}

/// Character cursor over the source. The position only ever moves forward.
pub(crate) struct Parser<'a> {
  source: &'a str,
  pos: usize,
  nesting: usize,
}

impl<'a> Parser<'a> {
  /// `pos` must lie on a character boundary of `source`.
  pub(crate) fn new(source: &'a str, pos: usize) -> Self {
    Self {
      source,
      pos: pos.min(source.len()),
      nesting: 0,
    }
  }

  /// Byte offset just past the input consumed so far.
  pub(crate) fn pos(&self) -> usize {
    self.pos
  }

  /// Parse one `expr` production, stopping at the first character that
  /// cannot continue it.
  pub(crate) fn parse_expr(&mut self) -> CompileResult<AstNode> {
    self.expr().map(|(node, _)| node)
  }

  // Each production returns the node together with the depth of its tree.
  fn expr(&mut self) -> CompileResult<(AstNode, usize)> {
    let (mut node, mut depth) = self.term()?;

    loop {
      let op = match self.peek() {
        Some('+') => BinaryOp::Add,
        Some('-') => BinaryOp::Sub,
        _ => break,
      };

      let at = self.pos;
      self.bump();
      let (rhs, rhs_depth) = self.term()?;
      depth = self.deepen(depth.max(rhs_depth), at)?;
      node = AstNode::binary(op, node, rhs);
    }

    Ok((node, depth))
  }

  fn term(&mut self) -> CompileResult<(AstNode, usize)> {
    let (mut node, mut depth) = self.factor()?;

    loop {
      let at = self.pos;
      if !self.equal('*') {
        break;
      }
      let (rhs, rhs_depth) = self.factor()?;
      depth = self.deepen(depth.max(rhs_depth), at)?;
      node = AstNode::binary(BinaryOp::Mul, node, rhs);
    }

    Ok((node, depth))
  }

  fn factor(&mut self) -> CompileResult<(AstNode, usize)> {
    let at = self.pos;
    if self.equal('(') {
      self.nesting += 1;
      if self.nesting > MAX_DEPTH {
        return Err(self.too_deep(at));
      }
      let parsed = self.expr()?;
      self.skip(')')?;
      self.nesting -= 1;
      return Ok(parsed);
    }

    let value = self.get_number()?;
    Ok((AstNode::number(value), 1))
  }

  /// Depth of a binary node whose deeper operand has depth `depth`.
  fn deepen(&self, depth: usize, at: usize) -> CompileResult<usize> {
    let depth = depth + 1;
    if depth > MAX_DEPTH {
      return Err(self.too_deep(at));
    }
    Ok(depth)
  }

  fn too_deep(&self, at: usize) -> CompileError {
    CompileError::at(
      self.source,
      at,
      format!("expression nested too deeply (limit {MAX_DEPTH})"),
    )
  }

  fn peek(&self) -> Option<char> {
    self.source[self.pos..].chars().next()
  }

  fn bump(&mut self) {
    if let Some(c) = self.peek() {
      self.pos += c.len_utf8();
    }
  }

  fn is_eof(&self) -> bool {
    self.pos >= self.source.len()
  }

  /// Consume the current character if it matches `expected`.
  fn equal(&mut self, expected: char) -> bool {
    if self.peek() == Some(expected) {
      self.bump();
      return true;
    }
    false
  }

  fn skip(&mut self, expected: char) -> CompileResult<()> {
    if self.equal(expected) {
      return Ok(());
    }
    Err(CompileError::at(
      self.source,
      self.pos,
      format!("expected \"{expected}\", but got \"{}\"", self.describe()),
    ))
  }

  /// Consume a run of ASCII digits as an unsigned decimal literal.
  fn get_number(&mut self) -> CompileResult<u64> {
    let start = self.pos;
    let digits = self.source[start..]
      .bytes()
      .take_while(u8::is_ascii_digit)
      .count();

    if digits == 0 {
      let message = if self.is_eof() {
        "expected a number, but reached end of input".to_string()
      } else {
        format!("expected a number, but got \"{}\"", self.describe())
      };
      return Err(CompileError::at(self.source, start, message));
    }

    let text = &self.source[start..start + digits];
    let value = text
      .parse::<u64>()
      .map_err(|err| CompileError::at(self.source, start, format!("invalid number: {err}")))?;
    self.pos += digits;
    Ok(value)
  }

  /// Human-friendly description of the current character for diagnostics.
  fn describe(&self) -> String {
    match self.peek() {
      Some(c) => c.escape_debug().to_string(),
      None => "EOF".to_string(),
    }
  }
}

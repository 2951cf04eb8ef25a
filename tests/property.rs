use std::num::NonZeroUsize;

use proptest::prelude::*;
use tapecalc::codegen::{Generator, RESULT_CELL, footprint};
use tapecalc::eval::{evaluate, evaluate_byte};
use tapecalc::machine::{Op, Tape};
use tapecalc::parser::{AstNode, BinaryOp, parse};
use tapecalc::{
  CompileError, GeneratorConfig, Machine, MachineConfig, MachineError, Program, compile_line,
  execute,
};

const MAX_PROGRAM_BYTES: usize = 64;

fn arb_expr(ops: Vec<BinaryOp>, max_literal: u64) -> impl Strategy<Value = AstNode> {
  let leaf = (0..=max_literal).prop_map(AstNode::number);
  leaf.prop_recursive(4, 16, 2, move |inner| {
    (proptest::sample::select(ops.clone()), inner.clone(), inner)
      .prop_map(|(op, lhs, rhs)| AstNode::binary(op, lhs, rhs))
  })
}

/// Source text for `node`, parenthesising every binary node.
fn render(node: &AstNode) -> String {
  match node {
    AstNode::Num { value } => value.to_string(),
    AstNode::Binary { op, lhs, rhs } => {
      format!("({}{}{})", render(lhs), op.symbol(), render(rhs))
    }
  }
}

/// Whether every `[` in `code` has a matching `]`, computed without a stack.
fn balanced(code: &[u8]) -> bool {
  let mut depth: i64 = 0;
  for &byte in code {
    match byte {
      b'[' => depth += 1,
      b']' => {
        depth -= 1;
        if depth < 0 {
          return false;
        }
      }
      _ => {}
    }
  }
  depth == 0
}

proptest! {
  #[test]
  fn printed_value_matches_evaluator_when_representable(
    node in arb_expr(vec![BinaryOp::Add, BinaryOp::Mul], 15)
  ) {
    let value = evaluate(&node);
    prop_assume!(matches!(value, Some(v) if v < 256));
    let value = value.unwrap();

    let line = format!("v={}", render(&node));
    let compilation = compile_line(&line, &GeneratorConfig::default()).unwrap();
    let out = execute(compilation.program, MachineConfig::default()).unwrap();
    prop_assert_eq!(String::from_utf8(out).unwrap(), format!("v={value}"));
  }

  #[test]
  fn result_cell_holds_wrapped_value(
    node in arb_expr(vec![BinaryOp::Add, BinaryOp::Sub, BinaryOp::Mul], 40)
  ) {
    let mut generator = Generator::new();
    generator.emit_expr(&node, RESULT_CELL);
    prop_assert_eq!(generator.cursor(), RESULT_CELL);
    prop_assert_eq!(generator.high_water() + 1, footprint(&node));

    let program = Program::parse(generator.finish()).unwrap();
    let mut machine = Machine::new(MachineConfig::default());
    machine.run(&program, &mut std::io::sink()).unwrap();
    prop_assert_eq!(machine.tape().cells()[RESULT_CELL], evaluate_byte(&node));
  }

  #[test]
  fn rendered_trees_parse_back(
    node in arb_expr(vec![BinaryOp::Add, BinaryOp::Sub, BinaryOp::Mul], 1000)
  ) {
    prop_assert_eq!(parse(&render(&node)).unwrap(), node);
  }

  #[test]
  fn printed_result_round_trips(
    node in arb_expr(vec![BinaryOp::Add, BinaryOp::Mul], 1000)
  ) {
    let value = evaluate(&node);
    prop_assume!(value.is_some());
    let value = value.unwrap();
    let reparsed = parse(&value.to_string()).unwrap();
    prop_assert_eq!(evaluate(&reparsed), Some(value));
  }

  #[test]
  fn bracket_matching_is_all_or_nothing(
    code in proptest::collection::vec(
      proptest::sample::select(b"<>+-[].x ".to_vec()),
      0..=MAX_PROGRAM_BYTES,
    )
  ) {
    match Program::parse(code.clone()) {
      Ok(program) => {
        prop_assert!(balanced(&code));
        for (offset, &byte) in code.iter().enumerate() {
          match Op::decode(byte) {
            Some(Op::Open | Op::Close) => {
              let partner = program.partner(offset).unwrap();
              prop_assert_eq!(program.partner(partner), Some(offset));
              prop_assert_ne!(code[offset], code[partner]);
            }
            _ => {
              prop_assert_eq!(program.partner(offset), None);
            }
          }
        }
      }
      Err(MachineError::UnbalancedLoop { .. }) => {
        prop_assert!(!balanced(&code));
      }
      Err(err) => {
        prop_assert!(false, "unexpected error: {}", err);
      }
    }
  }

  #[test]
  fn full_laps_return_cursor_to_origin(
    len in 1usize..64,
    start in 0usize..64,
    laps in 1usize..4,
  ) {
    let mut tape = Tape::new(NonZeroUsize::new(len).unwrap());
    for _ in 0..start % len {
      tape.move_right();
    }
    let origin = tape.cursor();
    prop_assert_eq!(tape.len(), len);

    for _ in 0..tape.len() * laps {
      tape.move_right();
    }
    prop_assert_eq!(tape.cursor(), origin);

    for _ in 0..tape.len() * laps {
      tape.move_left();
    }
    prop_assert_eq!(tape.cursor(), origin);
  }

  #[test]
  fn stray_characters_are_rejected(
    node in arb_expr(vec![BinaryOp::Add, BinaryOp::Sub, BinaryOp::Mul], 99),
    stray in proptest::sample::select(vec!['a', 'Z', ' ', '/', '.', '%', '=']),
    at in any::<proptest::sample::Index>(),
  ) {
    let mut source = render(&node);
    // Inserting at the very end could put a blank where trimming removes it.
    let offset = at.index(source.len());
    source.insert(offset, stray);

    let err = compile_line(&format!("v={source}"), &GeneratorConfig::default()).unwrap_err();
    prop_assert!(matches!(err, CompileError::MalformedExpression { .. }), "unexpected error: {:?}", err);
  }
}

//! End-to-end deterministic parse of a small arithmetic grammar: precedence
//! climbing via `%left`/`%right`, a unary-minus/exponent interaction, and
//! the expected-token set reported on a truncated input.
use radlr_core::{
  grammar::{Assoc, Constructor},
  journal::Journal,
  lr::build_table,
  types::{SymbolId, Token},
};
use radlr_rust_runtime::{Driver, HandlerTable};
use radlr_test_suite::GrammarBuilder;

fn value(slot: &radlr_rust_runtime::AstSlot<i64>) -> i64 {
  match slot {
    radlr_rust_runtime::AstSlot::Value(v) => *v,
    other => panic!("expected a reduced value, found {other:?}"),
  }
}

fn build_calculator() -> (radlr_core::lr::ParseTable, SymbolId, SymbolId, SymbolId, SymbolId, SymbolId, SymbolId, SymbolId) {
  let mut b = GrammarBuilder::new();
  let plus = b.term("+");
  let star = b.term("*");
  let caret = b.term("^");
  let minus = b.term("-");
  let lparen = b.term("(");
  let rparen = b.term(")");
  let num = b.term("NUM");
  let e = b.nt("E");

  // Lowest to highest precedence, per spec §3/§4.5 declaration order.
  b.precedence(Assoc::Left, &[plus]);
  b.precedence(Assoc::Left, &[star]);
  b.precedence(Assoc::Left, &[minus]);
  b.precedence(Assoc::Right, &[caret]);

  b.rule_all_captured(e, vec![e, plus, e], Constructor::Message("add".to_string()));
  b.rule_all_captured(e, vec![e, star, e], Constructor::Message("mul".to_string()));
  b.rule_all_captured(e, vec![e, caret, e], Constructor::Message("pow".to_string()));
  b.rule(e, vec![minus, e], vec![false, true], Constructor::Message("neg".to_string()), None);
  b.rule(e, vec![lparen, e, rparen], vec![false, true, false], Constructor::StackOffset(1), None);
  b.rule(e, vec![num], vec![true], Constructor::StackOffset(0), None);

  let grammar = b.build(e);
  let mut journal = Journal::new(None);
  let table = build_table(&grammar, &mut journal).expect("calculator grammar should build cleanly");
  (table, plus, star, caret, minus, lparen, rparen, num)
}

fn handlers() -> HandlerTable<i64> {
  let mut h = HandlerTable::new();
  h.register("add", |slots, _span| value(&slots[0]) + value(&slots[2]));
  h.register("mul", |slots, _span| value(&slots[0]) * value(&slots[2]));
  h.register("pow", |slots, _span| value(&slots[0]).pow(value(&slots[2]) as u32));
  h.register("neg", |slots, _span| -value(&slots[1]));
  h
}

#[test]
fn addition_respects_multiplication_precedence() {
  let (table, plus, star, _caret, _minus, _lparen, _rparen, num) = build_calculator();
  let handlers = handlers();
  let mut driver = Driver::new(&table, &handlers, 0).unwrap();

  driver.feed(num, Token::new(0, 1, 0, 0, 1), Some(2)).unwrap();
  driver.feed(plus, Token::new(1, 2, 0, 1, 2), None).unwrap();
  driver.feed(num, Token::new(2, 3, 0, 2, 3), Some(3)).unwrap();
  driver.feed(star, Token::new(3, 4, 0, 3, 4), None).unwrap();
  driver.feed(num, Token::new(4, 5, 0, 4, 5), Some(4)).unwrap();

  assert_eq!(driver.finish().unwrap(), 14);
}

#[test]
fn unary_minus_binds_weaker_than_right_assoc_exponent() {
  let (table, _plus, _star, caret, minus, _lparen, _rparen, num) = build_calculator();
  let handlers = handlers();
  let mut driver = Driver::new(&table, &handlers, 0).unwrap();

  driver.feed(minus, Token::new(0, 1, 0, 0, 1), None).unwrap();
  driver.feed(num, Token::new(1, 2, 0, 1, 2), Some(1)).unwrap();
  driver.feed(caret, Token::new(2, 3, 0, 2, 3), None).unwrap();
  driver.feed(num, Token::new(3, 4, 0, 3, 4), Some(2)).unwrap();

  // -1^2 == -(1^2) == -1, not (-1)^2 == 1.
  assert_eq!(driver.finish().unwrap(), -1);
}

#[test]
fn truncated_input_reports_the_expected_terminal_set() {
  let (table, plus, _star, _caret, _minus, lparen, _rparen, num) = build_calculator();
  let handlers = handlers();
  let mut driver = Driver::new(&table, &handlers, 0).unwrap();

  driver.feed(lparen, Token::new(0, 1, 0, 0, 1), None).unwrap();
  driver.feed(num, Token::new(1, 2, 0, 1, 2), Some(5)).unwrap();
  driver.feed(plus, Token::new(2, 3, 0, 2, 3), None).unwrap();

  let err = driver.finish().unwrap_err();
  match err {
    radlr_core::types::RadlrError::UnexpectedEndOfInput { expected } => {
      assert!(!expected.is_empty(), "expected set should name at least one viable terminal");
    }
    other => panic!("expected UnexpectedEndOfInput, got {other:?}"),
  }
}

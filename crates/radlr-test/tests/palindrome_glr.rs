//! A palindrome grammar is the textbook example of a language no fixed-`k`
//! LR table can decide (the midpoint can't be spotted without looking
//! arbitrarily far ahead), so this exercises the fork table / GLR driver
//! instead of the deterministic one.
use radlr_core::{grammar::Constructor, journal::Journal, lr::build_fork_table, types::{SymbolId, Token}};
use radlr_rust_runtime::{AstSlot, GlrDriver, GlrOutcome};
use radlr_test_suite::GrammarBuilder;

fn build_palindrome_grammar() -> (radlr_core::grammar::Grammar, SymbolId, SymbolId) {
  let mut b = GrammarBuilder::new();
  let a = b.term("a");
  let bt = b.term("b");
  let s = b.nt("S");

  b.rule(s, vec![a, s, a], vec![false, true, false], Constructor::Message("wrap_a".to_string()), None);
  b.rule(s, vec![bt, s, bt], vec![false, true, false], Constructor::Message("wrap_b".to_string()), None);
  b.rule(s, vec![a], vec![true], Constructor::StackOffset(0), None);
  b.rule(s, vec![bt], vec![true], Constructor::StackOffset(0), None);
  b.rule(s, vec![], vec![], Constructor::DefaultTuple, None);
  b.nondeterministic_all();

  (b.build(s), a, bt)
}

fn value(slot: &AstSlot<String>) -> String {
  match slot {
    AstSlot::Value(v) => v.clone(),
    AstSlot::Token(_) => panic!("unreduced token where a value was expected"),
    AstSlot::None => String::new(),
  }
}

fn run(input: &[char], a: SymbolId, bt: SymbolId, table: &radlr_core::lr::ForkTable) -> GlrOutcome<String> {
  let tokens: Vec<(SymbolId, Token, Option<String>)> = input
    .iter()
    .enumerate()
    .map(|(i, &c)| {
      let sym = if c == 'a' { a } else { bt };
      (sym, Token::new(i, i + 1, 0, i as u32, i as u32 + 1), Some(c.to_string()))
    })
    .collect();

  let driver = GlrDriver::new(table);
  driver.parse(
    0,
    &tokens,
    |name, slots, _span| match name {
      "wrap_a" => Ok(format!("a{}a", value(&slots[1]))),
      "wrap_b" => Ok(format!("b{}b", value(&slots[1]))),
      other => Err(radlr_core::types::RadlrError::Text(format!("no handler named {other}"))),
    },
    |_captured, _span| Ok(String::new()),
  )
}

#[test]
fn accepts_even_length_palindrome() {
  let (grammar, a, bt) = build_palindrome_grammar();
  let mut journal = Journal::new(None);
  let table = build_fork_table(&grammar, &mut journal).expect("palindrome grammar should build a fork table");

  let input: Vec<char> = "abba".chars().collect();
  match run(&input, a, bt, &table) {
    GlrOutcome::Accepted(values) => {
      assert!(values.iter().any(|v| v == "abba"), "expected one derivation to reconstruct `abba`, got {values:?}");
    }
    GlrOutcome::Rejected(errors) => panic!("expected `abba` to be accepted, got errors: {errors:?}"),
  }
}

#[test]
fn rejects_non_palindrome() {
  let (grammar, a, bt) = build_palindrome_grammar();
  let mut journal = Journal::new(None);
  let table = build_fork_table(&grammar, &mut journal).expect("palindrome grammar should build a fork table");

  let input: Vec<char> = "abab".chars().collect();
  match run(&input, a, bt, &table) {
    GlrOutcome::Accepted(values) => panic!("`abab` is not a palindrome, but got: {values:?}"),
    GlrOutcome::Rejected(_) => {}
  }
}

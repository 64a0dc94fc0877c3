//! `S -> E S a | b`, `E -> $epsilon$` hides a left-recursive cycle behind a
//! nullable prefix: a naive GSS walk can reduce the empty `E` alternative
//! at the same input position forever. The GLR driver's epsilon-reduction
//! budget must catch this instead of hanging, while the grammar itself
//! still parses correctly (spec §8 scenario 4).
//!
//! Hand-derived language: `S -> b` is the base case, and `S -> E S a`
//! collapses to `S -> S a` once `E` is forced to epsilon, so each
//! application appends one more trailing `a` after an already-built `S`.
//! The language is `b a*`: `"baa"` and `"ba"` accept, `"baab"` rejects
//! (the trailing `b` has no continuation once `S` is already complete).
use radlr_core::{grammar::Constructor, journal::Journal, lr::build_fork_table, types::{SymbolId, Token}};
use radlr_rust_runtime::{AstSlot, GlrDriver, GlrOutcome};
use radlr_test_suite::GrammarBuilder;

fn build_grammar() -> (radlr_core::grammar::Grammar, SymbolId, SymbolId) {
  let mut b = GrammarBuilder::new();
  let s = b.nt("S");
  let e = b.nt("E");
  let bt = b.term("b");
  let at = b.term("a");

  b.rule(s, vec![e, s, at], vec![false, true, false], Constructor::Message("wrap".to_string()), None);
  b.rule(s, vec![bt], vec![true], Constructor::StackOffset(0), None);
  b.rule(e, vec![], vec![], Constructor::DefaultTuple, None);
  b.nondeterministic_all();

  (b.build(s), bt, at)
}

fn value(slot: &AstSlot<String>) -> String {
  match slot {
    AstSlot::Value(v) => v.clone(),
    _ => panic!("expected a reduced value"),
  }
}

fn run(input: &[char], bt: SymbolId, at: SymbolId, table: &radlr_core::lr::ForkTable) -> GlrOutcome<String> {
  let tokens: Vec<(SymbolId, Token, Option<String>)> = input
    .iter()
    .enumerate()
    .map(|(i, &ch)| {
      let sym = if ch == 'b' { bt } else { at };
      (sym, Token::new(i, i + 1, 0, i as u32, i as u32 + 1), Some(ch.to_string()))
    })
    .collect();

  GlrDriver::new(table).parse(
    0,
    &tokens,
    |name, slots, _span| match name {
      "wrap" => Ok(format!("{}a", value(&slots[0]))),
      other => Err(radlr_core::types::RadlrError::Text(format!("no handler named {other}"))),
    },
    |_captured, _span| Ok(String::new()),
  )
}

#[test]
fn two_trailing_as_accept() {
  let (grammar, bt, at) = build_grammar();
  let mut journal = Journal::new(None);
  let table = build_fork_table(&grammar, &mut journal).expect("grammar should build a fork table");

  let input: Vec<char> = "baa".chars().collect();
  match run(&input, bt, at, &table) {
    GlrOutcome::Accepted(values) => assert!(values.iter().any(|v| v == "baa")),
    GlrOutcome::Rejected(errors) => panic!("`baa` should accept via two applications of `S -> E S a`: {errors:?}"),
  }
}

#[test]
fn one_trailing_a_accepts() {
  let (grammar, bt, at) = build_grammar();
  let mut journal = Journal::new(None);
  let table = build_fork_table(&grammar, &mut journal).expect("grammar should build a fork table");

  let input: Vec<char> = "ba".chars().collect();
  match run(&input, bt, at, &table) {
    GlrOutcome::Accepted(values) => assert!(values.iter().any(|v| v == "ba")),
    GlrOutcome::Rejected(errors) => panic!("`ba` should accept via one application of `S -> E S a`: {errors:?}"),
  }
}

#[test]
fn trailing_b_after_a_complete_s_is_rejected() {
  let (grammar, bt, at) = build_grammar();
  let mut journal = Journal::new(None);
  let table = build_fork_table(&grammar, &mut journal).expect("grammar should build a fork table");

  // `baab`: a complete `S` is consumed by `baa`, and the closing `b` has
  // no continuation -- the epsilon-cycle budget must still let the driver
  // reach this rejection promptly rather than hang on the repeated `E`
  // reduction.
  let input: Vec<char> = "baab".chars().collect();
  match run(&input, bt, at, &table) {
    GlrOutcome::Accepted(values) => panic!("`baab` should not parse, but got: {values:?}"),
    GlrOutcome::Rejected(_) => {}
  }
}

//! A statement list where each statement ends in `;` and a malformed
//! statement is swallowed by an explicit `$error$` production (spec §4.6):
//! the driver should resynchronize at the next `;` instead of aborting.
use radlr_core::{
  grammar::Constructor,
  journal::Journal,
  lr::build_table,
  types::{SymbolId, Token},
};
use radlr_rust_runtime::{Driver, HandlerTable};
use radlr_test_suite::GrammarBuilder;

fn value(slot: &radlr_rust_runtime::AstSlot<i32>) -> i32 {
  match slot {
    radlr_rust_runtime::AstSlot::Value(v) => *v,
    other => panic!("expected a reduced value, found {other:?}"),
  }
}

fn build_statement_list() -> (radlr_core::lr::ParseTable, SymbolId, SymbolId, SymbolId) {
  let mut b = GrammarBuilder::new();
  let program = b.nt("Program");
  let stmt = b.nt("Stmt");
  let num = b.term("NUM");
  let semi = b.term(";");

  b.rule_all_captured(program, vec![stmt, program], Constructor::Message("seq".to_string()));
  b.rule(program, vec![], vec![], Constructor::Message("empty".to_string()), None);
  b.rule(stmt, vec![num, semi], vec![true, false], Constructor::Message("good".to_string()), None);
  b.rule(stmt, vec![SymbolId::Error, semi], vec![false, false], Constructor::Message("recovered".to_string()), None);

  let grammar = b.build(program);
  let mut journal = Journal::new(None);
  let table = build_table(&grammar, &mut journal).expect("statement-list grammar should build cleanly");
  (table, num, semi, stmt /* unused placeholder kept for symmetry with other fixtures */)
}

fn handlers() -> HandlerTable<i32> {
  let mut h = HandlerTable::new();
  h.register("seq", |slots, _span| value(&slots[0]) + value(&slots[1]));
  h.register("empty", |_slots, _span| 0);
  h.register("good", |_slots, _span| 1);
  h.register("recovered", |_slots, _span| 1);
  h
}

#[test]
fn resynchronizes_at_the_next_semicolon_after_a_bad_token() {
  let (table, num, semi, _stmt) = build_statement_list();
  // `BAD` never appears in any rule -- it stands in for whatever malformed
  // token the scanner might hand the parser.
  let bad = SymbolId::Terminal(9_999);
  let handlers = handlers();
  let mut driver = Driver::new(&table, &handlers, 0).unwrap();

  let mut pos = 0usize;
  let mut at = |len: usize| {
    let t = Token::new(pos, pos + len, 0, pos as u32, (pos + len) as u32);
    pos += len;
    t
  };

  driver.feed(num, at(1), None).unwrap();
  driver.feed(semi, at(1), None).unwrap();
  driver.feed(bad, at(1), None).unwrap();
  driver.feed(semi, at(1), None).unwrap();
  driver.feed(num, at(1), None).unwrap();
  driver.feed(semi, at(1), None).unwrap();

  assert!(!driver.diagnostics().is_empty(), "the bad token should have been recorded");
  assert_eq!(driver.finish().unwrap(), 3, "two good statements plus one recovered statement");
}

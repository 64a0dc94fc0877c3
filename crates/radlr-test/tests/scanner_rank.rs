//! A higher-ranked literal must win over a lower-ranked general identifier
//! class both at a same-length tie and, per spec §8 scenario 6, even when
//! the identifier class reaches a strictly longer end position.
use radlr_core::regex::{build_scanner_table, ScanConditionDef, ScannerRuleDef};
use radlr_core::types::Token;
use radlr_rust_runtime::ScannerCursor;

const ALPHABET_MAX: u32 = 0x10_FFFF;

fn rule(pattern_src: &str, action: &str, rank: i32) -> ScannerRuleDef {
  ScannerRuleDef { pattern_src: pattern_src.to_string(), action: action.to_string(), rank, conditions: vec![], loc: Token::empty() }
}

#[test]
fn higher_ranked_literal_wins_a_same_length_tie() {
  let conditions = vec![ScanConditionDef { name: "INITIAL".to_string(), includes: vec![] }];
  let rules = vec![rule("foo", "KEYWORD_FOO", 1), rule("[a-z]+", "IDENT", 0)];

  let table = build_scanner_table(&conditions, &rules, &[], ALPHABET_MAX).expect("two non-conflicting patterns should build cleanly");
  let cursor = ScannerCursor::new(&table);

  let m = cursor.scan("foo", 0, "INITIAL", false).expect("`foo` should be scannable");
  assert_eq!(m.action, "KEYWORD_FOO", "rank should prefer the literal over the identifier class at a same-length tie");
  assert_eq!(m.end, 3);
}

#[test]
fn higher_rank_wins_even_against_a_longer_competing_match() {
  let conditions = vec![ScanConditionDef { name: "INITIAL".to_string(), includes: vec![] }];
  let rules = vec![rule("foo", "KEYWORD_FOO", 1), rule("[a-z]+", "IDENT", 0)];

  let table = build_scanner_table(&conditions, &rules, &[], ALPHABET_MAX).expect("two non-conflicting patterns should build cleanly");
  let cursor = ScannerCursor::new(&table);

  // `foobar`: the identifier class matches all six characters, strictly
  // longer than `foo`'s three, but `foo`'s higher rank still wins (spec
  // §8 scenario 6: "first lexeme is `foo`, rank-1 wins despite being
  // shorter").
  let m = cursor.scan("foobar", 0, "INITIAL", false).expect("`foobar` should be scannable");
  assert_eq!(m.action, "KEYWORD_FOO", "rank should override a longer competing match");
  assert_eq!(m.end, 3);
}

//! Shift/reduce precedence and associativity resolution (spec §4.5
//! "Precedence resolution"): a conflict between shifting the lookahead
//! terminal and reducing a rule is settled by comparing the rule's
//! precedence level against the lookahead's, falling back to "prefer shift"
//! only when neither side declares a level.
use crate::{
  grammar::model::{Assoc, Grammar, Rule},
  types::SymbolId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftReduceDecision {
  Shift,
  Reduce,
  /// `%nonassoc`, or a `%bogus` level on either side: using this terminal
  /// adjacent to this rule is a grammar error, not a parser ambiguity.
  Error,
}

/// Resolves a shift/reduce conflict between `rule` (the reduce candidate)
/// and `lookahead` (the terminal that could instead be shifted).
pub fn resolve_shift_reduce(grammar: &Grammar, rule: &Rule, lookahead: SymbolId) -> ShiftReduceDecision {
  let rule_level = rule.precedence_symbol().and_then(|s| grammar.terminal_precedence.get(&s).copied());
  let la_level = grammar.terminal_precedence.get(&lookahead).copied();

  match (rule_level, la_level) {
    (Some(r_idx), Some(l_idx)) => {
      let r = &grammar.precedence_levels[r_idx];
      let l = &grammar.precedence_levels[l_idx];
      if r.assoc == Assoc::Bogus || l.assoc == Assoc::Bogus {
        return ShiftReduceDecision::Error;
      }
      match r_idx.cmp(&l_idx) {
        std::cmp::Ordering::Less => ShiftReduceDecision::Shift,
        std::cmp::Ordering::Greater => ShiftReduceDecision::Reduce,
        std::cmp::Ordering::Equal => match l.assoc {
          Assoc::Left => ShiftReduceDecision::Reduce,
          Assoc::Right => ShiftReduceDecision::Shift,
          Assoc::NonAssoc => ShiftReduceDecision::Error,
          Assoc::Bogus => ShiftReduceDecision::Error,
        },
      }
    }
    // No declared precedence on one or both sides: classic yacc default.
    _ => ShiftReduceDecision::Shift,
  }
}

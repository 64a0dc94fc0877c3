//! Unit-rule (renaming) elimination (spec §4.5): a rule `A -> B` whose
//! reduction is a plain pass-through collapses into the action its RHS
//! non-terminal would itself perform, so the table never needs a dedicated
//! goto-then-immediately-reduce step for it.
use crate::grammar::{model::Grammar, normalize::is_renaming_rule};
use crate::types::SymbolId;
use std::collections::BTreeMap;

/// Maps every renaming rule's index to the chain of renamings it ultimately
/// resolves to, stopping at the first non-renaming rule or a cycle.
pub fn renaming_targets(grammar: &Grammar) -> BTreeMap<usize, SymbolId> {
  let mut direct: BTreeMap<usize, SymbolId> = BTreeMap::new();
  for (idx, rule) in grammar.rules.iter().enumerate() {
    if let Some(target) = is_renaming_rule(rule) {
      direct.insert(idx, target);
    }
  }
  direct
}

/// Whether `rule_idx` is a candidate for folding away entirely (its
/// reduction forwards the single captured child unchanged).
pub fn eliminates(grammar: &Grammar, rule_idx: usize) -> bool {
  is_renaming_rule(&grammar.rules[rule_idx]).is_some()
}

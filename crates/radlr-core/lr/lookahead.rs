//! LALR(1) lookahead propagation (spec §4.5 "LALR(1) lookaheads"):
//! discover-then-propagate over the LR(0) goto graph. Lookahead sets are
//! computed by a fixed-point iteration rather than DeRemer & Pennello's
//! linear-time algorithm -- simpler to verify correct, and construction
//! cost is not a spec'd property (§2 budgets the *share of source*, not
//! asymptotic complexity).
use super::{
  augmented::Augmented,
  automaton::Lr0Automaton,
  item::Lr0Item,
};
use crate::types::SymbolId;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// FIRST of a symbol sequence, falling back to `trailing` if every symbol
/// in `seq` is a nullable non-terminal (spec §4.4 "FIRST sets").
pub fn first_of_sequence(
  seq: &[SymbolId],
  first: &BTreeMap<u32, BTreeSet<SymbolId>>,
  nullable: &BTreeSet<u32>,
  trailing: &BTreeSet<SymbolId>,
) -> BTreeSet<SymbolId> {
  let mut out = BTreeSet::new();
  for sym in seq {
    match sym {
      SymbolId::NonTerminal(n) => {
        out.extend(first.get(n).cloned().unwrap_or_default());
        if !nullable.contains(n) {
          return out;
        }
      }
      other => {
        out.insert(*other);
        return out;
      }
    }
  }
  out.extend(trailing.iter().copied());
  out
}

pub type LookaheadMap = BTreeMap<(usize, Lr0Item), BTreeSet<SymbolId>>;

/// Computes, for every `(state, core item)` pair, the set of terminals
/// that should trigger that item's reduction (or justify its shift) --
/// the LALR(1) lookahead.
pub fn compute_lalr_lookaheads(
  aug: &Augmented,
  automaton: &Lr0Automaton,
  first: &BTreeMap<u32, BTreeSet<SymbolId>>,
  nullable: &BTreeSet<u32>,
) -> LookaheadMap {
  let mut la: LookaheadMap = BTreeMap::new();
  for &state in automaton.start_states.values() {
    for &item in &automaton.states[state].core {
      la.entry((state, item)).or_default().insert(SymbolId::EndOfInput);
    }
  }

  let mut changed = true;
  while changed {
    changed = false;
    for (state_idx, state) in automaton.states.iter().enumerate() {
      // Closure with lookahead propagation, local fixed point.
      let mut item_la: BTreeMap<Lr0Item, BTreeSet<SymbolId>> = BTreeMap::new();
      for &core_item in &state.core {
        item_la.entry(core_item).or_default().extend(la.get(&(state_idx, core_item)).cloned().unwrap_or_default());
      }
      let mut local_changed = true;
      while local_changed {
        local_changed = false;
        let snapshot: Vec<(Lr0Item, BTreeSet<SymbolId>)> = item_la.iter().map(|(k, v)| (*k, v.clone())).collect();
        for (item, item_set) in &snapshot {
          if let Some(SymbolId::NonTerminal(nt)) = item.dot_symbol(aug) {
            let beta = &item.remainder(aug)[1..];
            let contrib = first_of_sequence(beta, first, nullable, item_set);
            for (rule_idx, _) in aug.rules_for(nt) {
              let new_item = Lr0Item::start(rule_idx as u32);
              let entry = item_la.entry(new_item).or_default();
              let before = entry.len();
              entry.extend(contrib.iter().copied());
              if entry.len() != before {
                local_changed = true;
              }
            }
          }
        }
      }

      // Record every item's lookahead for this state -- including items
      // introduced purely by closure (e.g. an epsilon rule's complete item),
      // which otherwise would never get an entry since they have no core
      // predecessor to inherit one from.
      for (item, item_set) in &item_la {
        let entry = la.entry((state_idx, *item)).or_default();
        let before = entry.len();
        entry.extend(item_set.iter().copied());
        if entry.len() != before {
          changed = true;
        }
      }

      // Spread lookaheads across GOTO edges to the successor's core items.
      for (&sym, &target) in &state.transitions {
        for (item, item_set) in &item_la {
          if item.dot_symbol(aug) == Some(sym) {
            let advanced = item.advance();
            let entry = la.entry((target, advanced)).or_default();
            let before = entry.len();
            entry.extend(item_set.iter().copied());
            if entry.len() != before {
              changed = true;
            }
          }
        }
      }
    }
  }

  la
}

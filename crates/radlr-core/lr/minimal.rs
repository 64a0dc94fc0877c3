//! Minimal-LR(1) (spec §4.5 "Minimal-LR(1)"): a table with as few states as
//! LALR(1) wherever LALR's merges are safe, but split wherever merging would
//! introduce a spurious conflict -- without the full cost of canonical
//! LR(1).
//!
//! Two phases, per spec's literal description. Phase 1: build the LR(0)
//! graph, find the states where an LR(0) view is ambiguous (more than one
//! viable action), and propagate that as a *taint* on the non-terminals
//! whose rules introduced the ambiguity, via the same [`bipartite_closure`]
//! used for nullable/well-founded analysis (§4.4). Phase 2: re-run subset
//! construction directly -- items carry a lookahead symbol like canonical
//! LR(1), but the *state-identity key* used to decide whether two item sets
//! are "the same state" drops the lookahead from every item whose rule's
//! non-terminal isn't tainted. Two item sets that agree once untainted
//! lookahead is erased are the same state and are merged (their untainted
//! items' lookaheads unioned, Xmonad-LALR-style) the moment they're
//! discovered, before either is explored further -- so the automaton never
//! grows past what the taint actually demands, and a grammar whose full
//! canonical LR(1) table would explode does not make this construction
//! explode identically, since the canonical automaton is never built as an
//! intermediate step.
use super::{
  augmented::Augmented,
  automaton::{build_lr0, Lr0Automaton},
  canonical::{closure1, Lr1Item, Lr1State},
  item::Lr0Item,
};
use crate::{
  grammar::closure::{bipartite_closure, Conjunct},
  types::SymbolId,
};
use std::collections::{BTreeMap, BTreeSet};

/// Non-terminals whose rules must keep per-item lookahead distinctions
/// rather than being safely folded into an LALR-style merge.
fn seed_conflicted_nonterminals(aug: &Augmented, lr0: &Lr0Automaton) -> BTreeSet<u32> {
  let mut seeds = BTreeSet::new();
  for (idx, _state) in lr0.states.iter().enumerate() {
    let closed = lr0.closure_of(aug, idx);
    let mut complete: Vec<Lr0Item> = Vec::new();
    let mut shiftable_terminals: BTreeSet<SymbolId> = BTreeSet::new();
    for &item in &closed {
      if item.is_complete(aug) {
        complete.push(item);
      } else if let Some(sym @ (SymbolId::Terminal(_) | SymbolId::EndOfInput)) = item.dot_symbol(aug) {
        shiftable_terminals.insert(sym);
      }
    }
    if complete.len() > 1 {
      // reduce/reduce: every contending rule's LHS is lookahead-sensitive here.
      for item in &complete {
        seeds.insert(aug.rule(item.rule).lhs);
      }
    }
    if !complete.is_empty() && !shiftable_terminals.is_empty() {
      // shift/reduce: the reducible rule's LHS may need its own lookahead.
      for item in &complete {
        seeds.insert(aug.rule(item.rule).lhs);
      }
    }
  }
  seeds
}

/// Highest real (non-augmented) non-terminal id in the grammar. Augmented
/// rules use an out-of-band `lhs` (`u32::MAX - start`) and must stay out of
/// this count, or the taint arrays below would try to size themselves to it.
fn max_nonterminal_id(aug: &Augmented) -> u32 {
  let mut max = 0u32;
  for rule in &aug.grammar.rules {
    max = max.max(rule.lhs);
    for sym in &rule.rhs {
      if let SymbolId::NonTerminal(n) = sym {
        max = max.max(*n);
      }
    }
  }
  max
}

/// Propagates taint: if `L` is tainted and some rule `L -> ... R ...` exists,
/// `R` becomes tainted too (its expansions are reached from a
/// lookahead-sensitive context and must not silently lose that context).
fn propagate_taint(aug: &Augmented, seeds: &BTreeSet<u32>) -> BTreeSet<u32> {
  let top = max_nonterminal_id(aug) as usize + 1;
  let mut conjuncts = Vec::new();
  for &s in seeds {
    if (s as usize) < top {
      conjuncts.push(Conjunct { inputs: vec![], output: s as usize });
    }
  }
  for rule in &aug.grammar.rules {
    for sym in &rule.rhs {
      if let SymbolId::NonTerminal(r) = sym {
        conjuncts.push(Conjunct { inputs: vec![rule.lhs as usize], output: *r as usize });
      }
    }
  }
  let active = bipartite_closure(top, &conjuncts);
  active.into_iter().enumerate().filter_map(|(i, on)| on.then_some(i as u32)).collect()
}

/// A state-identity key: lookahead is kept only when the item's rule
/// belongs to a tainted non-terminal, so two item sets that differ solely
/// in an untainted item's lookahead hash and compare equal.
type ReducedKey = BTreeSet<(Lr0Item, Option<SymbolId>)>;

fn reduced_key(aug: &Augmented, tainted: &BTreeSet<u32>, items: &BTreeSet<Lr1Item>) -> ReducedKey {
  items
    .iter()
    .map(|&(item, la)| {
      let lhs = aug.rule(item.rule).lhs;
      if tainted.contains(&lhs) {
        (item, Some(la))
      } else {
        (item, None)
      }
    })
    .collect()
}

#[derive(Debug, Clone, Default)]
pub struct MinimalLr1Automaton {
  pub states:       Vec<Lr1State>,
  pub start_states: BTreeMap<u32, usize>,
}

/// Finds the state whose reduced key matches `closed`'s, merging `closed`'s
/// items into it (and re-enqueueing it, since a grown untainted lookahead
/// can in turn grow a successor state), or creates a fresh state if none
/// exists yet.
fn get_or_merge(
  closed: BTreeSet<Lr1Item>,
  aug: &Augmented,
  tainted: &BTreeSet<u32>,
  key_to_id: &mut BTreeMap<ReducedKey, usize>,
  states: &mut Vec<Lr1State>,
  worklist: &mut Vec<usize>,
) -> usize {
  let key = reduced_key(aug, tainted, &closed);
  if let Some(&id) = key_to_id.get(&key) {
    let before = states[id].items.len();
    states[id].items.extend(closed);
    if states[id].items.len() != before {
      worklist.push(id);
    }
    return id;
  }
  let id = states.len();
  key_to_id.insert(key, id);
  states.push(Lr1State { items: closed, transitions: BTreeMap::new() });
  worklist.push(id);
  id
}

/// Builds minimal-LR(1) directly: LR(0) plus taint (phase 1), then a subset
/// construction over lookahead-carrying items that merges by the reduced
/// key as states are discovered (phase 2) -- canonical LR(1) is never
/// materialized.
pub fn build_minimal_lr1(aug: &Augmented, first: &BTreeMap<u32, BTreeSet<SymbolId>>, nullable: &BTreeSet<u32>) -> MinimalLr1Automaton {
  let lr0 = build_lr0(aug);
  let seeds = seed_conflicted_nonterminals(aug, &lr0);
  let tainted = propagate_taint(aug, &seeds);

  let mut key_to_id: BTreeMap<ReducedKey, usize> = BTreeMap::new();
  let mut states: Vec<Lr1State> = Vec::new();
  let mut worklist: Vec<usize> = Vec::new();
  let mut start_states = BTreeMap::new();

  for &start in &aug.grammar.start_symbols {
    let aug_rule = aug.aug_rule_of[&start];
    let core: BTreeSet<Lr1Item> = std::iter::once((Lr0Item::start(aug_rule as u32), SymbolId::EndOfInput)).collect();
    let closed = closure1(aug, first, nullable, &core);
    let id = get_or_merge(closed, aug, &tainted, &mut key_to_id, &mut states, &mut worklist);
    start_states.insert(start, id);
  }

  while let Some(id) = worklist.pop() {
    let items = states[id].items.clone();
    let mut groups: BTreeMap<SymbolId, BTreeSet<Lr1Item>> = BTreeMap::new();
    for (item, la) in &items {
      if let Some(sym) = item.dot_symbol(aug) {
        groups.entry(sym).or_default().insert((item.advance(), *la));
      }
    }
    for (sym, core) in groups {
      let closed = closure1(aug, first, nullable, &core);
      let target = get_or_merge(closed, aug, &tainted, &mut key_to_id, &mut states, &mut worklist);
      states[id].transitions.insert(sym, target);
    }
  }

  MinimalLr1Automaton { states, start_states }
}

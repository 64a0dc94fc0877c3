//! Canonical LR(1) (spec §4.5 "Canonical LR(1)"): full item triples with
//! per-item lookahead sets; subset construction uses the whole triple set
//! as state identity, so states that LALR would merge may stay split here.
use super::{
  augmented::Augmented,
  item::Lr0Item,
  lookahead::first_of_sequence,
};
use crate::types::SymbolId;
use std::collections::{BTreeMap, BTreeSet};

pub type Lr1Item = (Lr0Item, SymbolId);

#[derive(Debug, Clone)]
pub struct Lr1State {
  pub items:       BTreeSet<Lr1Item>,
  pub transitions: BTreeMap<SymbolId, usize>,
}

#[derive(Debug, Clone, Default)]
pub struct Lr1Automaton {
  pub states:       Vec<Lr1State>,
  pub start_states: BTreeMap<u32, usize>,
}

pub(crate) fn closure1(
  aug: &Augmented,
  first: &BTreeMap<u32, BTreeSet<SymbolId>>,
  nullable: &BTreeSet<u32>,
  core: &BTreeSet<Lr1Item>,
) -> BTreeSet<Lr1Item> {
  let mut set = core.clone();
  let mut stack: Vec<Lr1Item> = core.iter().copied().collect();
  while let Some((item, la)) = stack.pop() {
    if let Some(SymbolId::NonTerminal(nt)) = item.dot_symbol(aug) {
      let beta = &item.remainder(aug)[1..];
      let trailing: BTreeSet<SymbolId> = std::iter::once(la).collect();
      let contrib = first_of_sequence(beta, first, nullable, &trailing);
      for (rule_idx, _) in aug.rules_for(nt) {
        for &b in &contrib {
          let new_item = (Lr0Item::start(rule_idx as u32), b);
          if set.insert(new_item) {
            stack.push(new_item);
          }
        }
      }
    }
  }
  set
}

fn get_or_create(
  closed: BTreeSet<Lr1Item>,
  index: &mut BTreeMap<BTreeSet<Lr1Item>, usize>,
  states: &mut Vec<Lr1State>,
  worklist: &mut Vec<usize>,
) -> usize {
  if let Some(&id) = index.get(&closed) {
    return id;
  }
  let id = states.len();
  index.insert(closed.clone(), id);
  states.push(Lr1State { items: closed, transitions: BTreeMap::new() });
  worklist.push(id);
  id
}

/// Builds the full canonical LR(1) automaton.
pub fn build_canonical_lr1(
  aug: &Augmented,
  first: &BTreeMap<u32, BTreeSet<SymbolId>>,
  nullable: &BTreeSet<u32>,
) -> Lr1Automaton {
  let mut index: BTreeMap<BTreeSet<Lr1Item>, usize> = BTreeMap::new();
  let mut states: Vec<Lr1State> = Vec::new();
  let mut worklist: Vec<usize> = Vec::new();
  let mut start_states = BTreeMap::new();

  for &start in &aug.grammar.start_symbols {
    let aug_rule = aug.aug_rule_of[&start];
    let core: BTreeSet<Lr1Item> = std::iter::once((Lr0Item::start(aug_rule as u32), SymbolId::EndOfInput)).collect();
    let closed = closure1(aug, first, nullable, &core);
    let id = get_or_create(closed, &mut index, &mut states, &mut worklist);
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
      let target = get_or_create(closed, &mut index, &mut states, &mut worklist);
      states[id].transitions.insert(sym, target);
    }
  }

  Lr1Automaton { states, start_states }
}

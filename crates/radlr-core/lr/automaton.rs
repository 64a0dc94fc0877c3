//! The LR(0) graph (spec §4.5 "LR(0) graph"): item-set states, the GOTO
//! function, and the predecessor map every lookahead-propagation pass and
//! the minimal-LR(1) taint pass walk backward over.
use super::{
  augmented::Augmented,
  item::{closure, Lr0Item},
};
use crate::types::SymbolId;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct Lr0State {
  /// The state's core items (dot not necessarily at 0); the closure is
  /// recomputed on demand rather than stored, since every consumer already
  /// holds an `&Augmented`.
  pub core:        Vec<Lr0Item>,
  pub transitions: BTreeMap<SymbolId, usize>,
}

#[derive(Debug, Clone, Default)]
pub struct Lr0Automaton {
  pub states:       Vec<Lr0State>,
  /// `state -> [(predecessor_state, symbol_labeling_the_edge)]`.
  pub predecessors: Vec<Vec<(usize, SymbolId)>>,
  pub start_states: BTreeMap<u32, usize>,
}

impl Lr0Automaton {
  pub fn closure_of(&self, aug: &Augmented, state: usize) -> std::collections::BTreeSet<Lr0Item> {
    closure(aug, &self.states[state].core.iter().copied().collect())
  }
}

fn get_or_create(
  core: Vec<Lr0Item>,
  index: &mut BTreeMap<Vec<Lr0Item>, usize>,
  states: &mut Vec<Lr0State>,
  predecessors: &mut Vec<Vec<(usize, SymbolId)>>,
  worklist: &mut Vec<usize>,
) -> usize {
  let mut sorted = core;
  sorted.sort_unstable();
  sorted.dedup();
  if let Some(&id) = index.get(&sorted) {
    return id;
  }
  let id = states.len();
  states.push(Lr0State { core: sorted.clone(), transitions: BTreeMap::new() });
  predecessors.push(Vec::new());
  index.insert(sorted, id);
  worklist.push(id);
  id
}

/// Builds the LR(0) automaton: one start state per start symbol (the
/// augmented rule's initial item), then GOTO subset construction.
pub fn build_lr0(aug: &Augmented) -> Lr0Automaton {
  let mut index: BTreeMap<Vec<Lr0Item>, usize> = BTreeMap::new();
  let mut states: Vec<Lr0State> = Vec::new();
  let mut predecessors: Vec<Vec<(usize, SymbolId)>> = Vec::new();
  let mut worklist: Vec<usize> = Vec::new();
  let mut start_states = BTreeMap::new();

  for &start in &aug.grammar.start_symbols {
    let aug_rule = aug.aug_rule_of[&start];
    let id = get_or_create(vec![Lr0Item::start(aug_rule as u32)], &mut index, &mut states, &mut predecessors, &mut worklist);
    start_states.insert(start, id);
  }

  while let Some(id) = worklist.pop() {
    let closed = closure(aug, &states[id].core.iter().copied().collect());
    let mut groups: BTreeMap<SymbolId, Vec<Lr0Item>> = BTreeMap::new();
    for item in &closed {
      if let Some(sym) = item.dot_symbol(aug) {
        groups.entry(sym).or_default().push(item.advance());
      }
    }
    for (sym, core) in groups {
      let target = get_or_create(core, &mut index, &mut states, &mut predecessors, &mut worklist);
      states[id].transitions.insert(sym, target);
      predecessors[target].push((id, sym));
    }
  }

  Lr0Automaton { states, predecessors, start_states }
}

//! Subset construction and minimization (spec §4.1 steps 3-4): the DFA
//! state identity is the frozen set of NFA states; accept decisions are
//! resolved by highest rank, then (implicitly, via DFA longest-match) by
//! longest path, then by earliest rule index.
use super::nfa::{Accept, Nfa};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
pub struct DfaState {
  pub trans:              Vec<Option<u32>>,
  pub accept:             Option<Accept>,
  pub is_trailing_marker: bool,
  pub requires_bol:       bool,
}

#[derive(Debug, Clone, Default)]
pub struct Dfa {
  pub states:      Vec<DfaState>,
  pub num_classes: u32,
}

fn epsilon_closure(nfa: &Nfa, seeds: &[usize]) -> BTreeSet<usize> {
  let mut set: BTreeSet<usize> = seeds.iter().copied().collect();
  let mut stack: Vec<usize> = seeds.to_vec();
  while let Some(s) = stack.pop() {
    for &t in &nfa.states[s].eps {
      if set.insert(t) {
        stack.push(t);
      }
    }
  }
  set
}

fn resolve_accept(nfa: &Nfa, set: &BTreeSet<usize>) -> Option<Accept> {
  set
    .iter()
    .filter_map(|&s| nfa.states[s].accept)
    .min_by_key(|a| (-(a.rank as i64), a.rule_id))
}

/// Subset-constructs one shared DFA table reachable from any of `entries`
/// (one NFA seed-set per named entry point -- e.g. two per scan condition,
/// anchored and unanchored). Entry points that are reachable from each
/// other share DFA states, matching the single shared-table output
/// contract of spec §4.1.
pub fn subset_construct_multi(nfa: &Nfa, entries: &[Vec<usize>], num_classes: u32) -> (Dfa, Vec<u32>) {
  let mut state_ids: BTreeMap<BTreeSet<usize>, u32> = BTreeMap::new();
  let mut states: Vec<DfaState> = Vec::new();
  let mut worklist: Vec<BTreeSet<usize>> = Vec::new();

  let mut get_or_create = |set: BTreeSet<usize>, state_ids: &mut BTreeMap<BTreeSet<usize>, u32>, states: &mut Vec<DfaState>, worklist: &mut Vec<BTreeSet<usize>>| -> u32 {
    if let Some(&id) = state_ids.get(&set) {
      return id;
    }
    let id = states.len() as u32;
    states.push(DfaState { trans: vec![None; num_classes as usize], accept: None, is_trailing_marker: false, requires_bol: false });
    state_ids.insert(set.clone(), id);
    worklist.push(set);
    id
  };

  let mut entry_ids = Vec::with_capacity(entries.len());
  for seeds in entries {
    let closure = epsilon_closure(nfa, seeds);
    entry_ids.push(get_or_create(closure, &mut state_ids, &mut states, &mut worklist));
  }

  while let Some(set) = worklist.pop() {
    let id = state_ids[&set];
    let accept = resolve_accept(nfa, &set);
    let is_marker = set.iter().any(|&s| nfa.states[s].is_trailing_marker);
    let requires_bol = set.iter().any(|&s| nfa.states[s].requires_bol);

    let mut moves: Vec<Option<u32>> = vec![None; num_classes as usize];
    for class_id in 0..num_classes {
      let mut targets = Vec::new();
      for &s in &set {
        for &(c, t) in &nfa.states[s].trans {
          if c == class_id {
            targets.push(t);
          }
        }
      }
      if !targets.is_empty() {
        let closure = epsilon_closure(nfa, &targets);
        let next_id = get_or_create(closure, &mut state_ids, &mut states, &mut worklist);
        moves[class_id as usize] = Some(next_id);
      }
    }

    states[id as usize].accept = accept;
    states[id as usize].is_trailing_marker = is_marker;
    states[id as usize].requires_bol = requires_bol;
    states[id as usize].trans = moves;
  }

  (Dfa { states, num_classes }, entry_ids)
}

/// Minimizes `dfa` via partition refinement keyed on accept-label identity
/// and per-class successor partition. Returns the minimized table plus a
/// `old_state -> new_state` remap the caller uses to relocate its own
/// entry-point ids.
pub fn minimize(dfa: &Dfa) -> (Dfa, Vec<u32>) {
  let n = dfa.states.len();
  if n <= 1 {
    return (dfa.clone(), (0..n as u32).collect());
  }

  let mut block_of: Vec<u32> = vec![0; n];
  let mut signature_to_block: BTreeMap<(Option<u32>, bool, bool), u32> = BTreeMap::new();
  for (i, s) in dfa.states.iter().enumerate() {
    let sig = (s.accept.map(|a| a.rule_id), s.is_trailing_marker, s.requires_bol);
    let next_id = signature_to_block.len() as u32;
    let block = *signature_to_block.entry(sig).or_insert(next_id);
    block_of[i] = block;
  }

  loop {
    let mut refined: BTreeMap<Vec<i64>, Vec<usize>> = BTreeMap::new();
    for i in 0..n {
      let mut key: Vec<i64> = vec![block_of[i] as i64];
      for class_id in 0..dfa.num_classes {
        let target_block = dfa.states[i].trans[class_id as usize].map(|t| block_of[t as usize] as i64).unwrap_or(-1);
        key.push(target_block);
      }
      refined.entry(key).or_default().push(i);
    }
    let distinct_before = block_of.iter().collect::<BTreeSet<_>>().len();
    if refined.len() == distinct_before {
      break;
    }
    let mut new_block_of = vec![0u32; n];
    for (block_id, (_, members)) in refined.iter().enumerate() {
      for &m in members {
        new_block_of[m] = block_id as u32;
      }
    }
    if new_block_of == block_of {
      break;
    }
    block_of = new_block_of;
  }

  let num_blocks = block_of.iter().copied().max().unwrap_or(0) + 1;
  let mut representative: Vec<Option<usize>> = vec![None; num_blocks as usize];
  for (i, &b) in block_of.iter().enumerate() {
    representative[b as usize].get_or_insert(i);
  }

  let mut new_states = Vec::with_capacity(num_blocks as usize);
  for b in 0..num_blocks {
    let rep = representative[b as usize].unwrap();
    let old = &dfa.states[rep];
    let trans = old.trans.iter().map(|t| t.map(|t| block_of[t as usize])).collect();
    new_states.push(DfaState { trans, accept: old.accept, is_trailing_marker: old.is_trailing_marker, requires_bol: old.requires_bol });
  }

  (Dfa { states: new_states, num_classes: dfa.num_classes }, block_of)
}

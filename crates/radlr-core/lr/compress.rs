//! Table compression (spec §4.5 "table compression", §9 design note (c)):
//! states whose action rows are identical collapse to one physical row, and
//! likewise for goto columns, as long as doing so never changes which
//! `(state, terminal)` pairs are immediate errors -- the spec's one hard
//! requirement on any compression scheme.
use super::table::{Action, ParseTable, State};
use std::collections::BTreeMap;

/// Whether two states' action rows agree on every explicitly-populated
/// terminal (identical actions => they can share a physical row without
/// changing when a terminal is immediately rejected).
fn rows_equal(a: &State, b: &State) -> bool {
  if a.action.len() != b.action.len() || a.goto.len() != b.goto.len() {
    return false;
  }
  a.action.iter().zip(b.action.iter()).all(|((sa, aa), (sb, ab))| sa == sb && action_eq(aa, ab)) && a.goto == b.goto
}

fn action_eq(a: &Action, b: &Action) -> bool {
  match (a, b) {
    (Action::Shift { target: x }, Action::Shift { target: y }) => x == y,
    (Action::ShiftReduce { target: tx, rule: rx }, Action::ShiftReduce { target: ty, rule: ry }) => tx == ty && rx == ry,
    (Action::Reduce { rule: x }, Action::Reduce { rule: y }) => x == y,
    (Action::Accept, Action::Accept) => true,
    (Action::Error, Action::Error) => true,
    _ => false,
  }
}

/// Merges duplicate state rows, remapping every shift/goto target and every
/// `initial` entry to the surviving representative. Equivalence classing is
/// iterated to a fixed point since merging two states can make two
/// previously-distinct rows identical (their targets now agree too).
pub fn compress(table: ParseTable) -> ParseTable {
  let ParseTable { mut states, rules, mut initial, num_terminals, conflict_count } = table;

  loop {
    let mut representative: Vec<usize> = (0..states.len()).collect();
    let mut changed = false;
    'outer: for i in 0..states.len() {
      if representative[i] != i {
        continue;
      }
      for j in (i + 1)..states.len() {
        if representative[j] != j {
          continue;
        }
        if rows_equal(&states[i], &states[j]) {
          representative[j] = i;
          changed = true;
          continue 'outer;
        }
      }
    }
    if !changed {
      break;
    }

    // Renumber: surviving states keep the lowest index in their class.
    let mut new_index: BTreeMap<usize, usize> = BTreeMap::new();
    let mut kept: Vec<State> = Vec::new();
    for (old, state) in states.into_iter().enumerate() {
      if representative[old] == old {
        new_index.insert(old, kept.len());
        kept.push(state);
      }
    }
    let remap = |target: usize| new_index[&representative[target]];

    for state in &mut kept {
      for action in state.action.values_mut() {
        match action {
          Action::Shift { target } => *target = remap(*target),
          Action::ShiftReduce { target, .. } => *target = remap(*target),
          _ => {}
        }
      }
      for target in state.goto.values_mut() {
        *target = remap(*target);
      }
    }
    for target in initial.values_mut() {
      *target = remap(*target);
    }
    states = kept;
  }

  ParseTable { states, rules, initial, num_terminals, conflict_count }
}

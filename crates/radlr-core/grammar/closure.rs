//! The bipartite AND/OR propagation closure (spec §4.4): a conjunct becomes
//! active when *all* of its inputs are active; a disjunct becomes active
//! when *any* of its inputs is active. Linear in the number of edges.
use std::collections::VecDeque;

/// One AND-node: becomes active once every disjunct in `inputs` is active,
/// at which point `output` becomes a candidate-active disjunct. An empty
/// `inputs` list is active immediately.
#[derive(Debug, Clone)]
pub struct Conjunct {
  pub inputs: Vec<usize>,
  pub output: usize,
}

/// Runs the closure to a fixpoint and returns, for each of `num_disjuncts`
/// OR-nodes, whether it became active.
pub fn bipartite_closure(num_disjuncts: usize, conjuncts: &[Conjunct]) -> Vec<bool> {
  let mut remaining: Vec<usize> = conjuncts.iter().map(|c| c.inputs.len()).collect();
  let mut active_disjunct = vec![false; num_disjuncts];
  let mut conjunct_done = vec![false; conjuncts.len()];

  // Multiset reverse index: a disjunct that appears twice in one conjunct's
  // input list is counted twice here too.
  let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); num_disjuncts];
  for (ci, c) in conjuncts.iter().enumerate() {
    for &d in &c.inputs {
      dependents[d].push(ci);
    }
  }

  let mut conjunct_queue: VecDeque<usize> = VecDeque::new();
  let mut disjunct_queue: VecDeque<usize> = VecDeque::new();

  for (ci, c) in conjuncts.iter().enumerate() {
    if c.inputs.is_empty() {
      conjunct_queue.push_back(ci);
    }
  }

  loop {
    if let Some(ci) = conjunct_queue.pop_front() {
      if conjunct_done[ci] {
        continue;
      }
      conjunct_done[ci] = true;
      let d = conjuncts[ci].output;
      if !active_disjunct[d] {
        active_disjunct[d] = true;
        disjunct_queue.push_back(d);
      }
      continue;
    }
    if let Some(d) = disjunct_queue.pop_front() {
      for &ci in &dependents[d] {
        if remaining[ci] > 0 {
          remaining[ci] -= 1;
          if remaining[ci] == 0 {
            conjunct_queue.push_back(ci);
          }
        }
      }
      continue;
    }
    break;
  }

  active_disjunct
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn idempotent_on_simple_chain() {
    // d0 (no inputs) -> c0 -> d1 -> c1 -> d2
    let conjuncts = vec![Conjunct { inputs: vec![], output: 0 }, Conjunct { inputs: vec![0], output: 1 }, Conjunct { inputs: vec![1], output: 2 }];
    let first = bipartite_closure(3, &conjuncts);
    let second = bipartite_closure(3, &conjuncts);
    assert_eq!(first, second);
    assert_eq!(first, vec![true, true, true]);
  }

  #[test]
  fn conjunct_needs_all_inputs() {
    // d0 active, d1 never active; c0 depends on both -> never fires.
    let conjuncts = vec![Conjunct { inputs: vec![], output: 0 }, Conjunct { inputs: vec![0, 1], output: 2 }];
    let active = bipartite_closure(3, &conjuncts);
    assert_eq!(active, vec![true, false, false]);
  }

  #[test]
  fn multiset_edges_counted_with_multiplicity() {
    // conjunct lists d0 twice; it must still wait for both "copies" even
    // though they resolve to the same disjunct becoming active once.
    let conjuncts = vec![Conjunct { inputs: vec![], output: 0 }, Conjunct { inputs: vec![0, 0], output: 1 }];
    let active = bipartite_closure(2, &conjuncts);
    assert_eq!(active, vec![true, true]);
  }
}

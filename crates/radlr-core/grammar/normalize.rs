//! Grammar normalization (spec §4.3): well-foundedness and reachability
//! (via the bipartite closure helper), nullable/FIRST set computation, and
//! identification of renaming (unit) rules for later elimination in the
//! table builder (spec §4.5).
use super::{
  closure::{bipartite_closure, Conjunct},
  model::{Constructor, Grammar},
};
use crate::types::{RadlrError, RadlrResult, SymbolId};
use std::collections::{BTreeMap, BTreeSet};

/// `non_terminal -> derives epsilon`, computed as a bipartite closure: one
/// conjunct per rule (active once every RHS non-terminal is nullable; a
/// terminal in the RHS makes the rule conjunct permanently unsatisfiable --
/// modeled by adding a never-active extra input), one disjunct per
/// non-terminal (active once any of its rules is active).
pub fn compute_nullable(grammar: &Grammar) -> BTreeSet<u32> {
  let n = grammar.symbols.num_non_terminals() as usize;
  let dead_input = n; // an input that is never active, for rules with a terminal in the RHS.
  let mut conjuncts = Vec::with_capacity(grammar.rules.len());
  for rule in &grammar.rules {
    let mut inputs = Vec::new();
    let mut impossible = false;
    for sym in &rule.rhs {
      match sym {
        SymbolId::NonTerminal(n) => inputs.push(*n as usize),
        _ => impossible = true,
      }
    }
    if impossible {
      inputs.push(dead_input);
    }
    conjuncts.push(Conjunct { inputs, output: rule.lhs as usize });
  }
  let active = bipartite_closure(n + 1, &conjuncts);
  (0..n as u32).filter(|&i| active[i as usize]).collect()
}

/// `non_terminal -> derives some terminal string` (well-founded), computed
/// the same way but seeded by terminals instead of nullability: a rule's
/// conjunct is active once every RHS *non-terminal* is well-founded (RHS
/// terminals and `$error$` positions are "free").
pub fn compute_well_founded(grammar: &Grammar) -> BTreeSet<u32> {
  let n = grammar.symbols.num_non_terminals() as usize;
  let mut conjuncts = Vec::with_capacity(grammar.rules.len());
  for rule in &grammar.rules {
    let inputs: Vec<usize> = rule.rhs.iter().filter_map(|s| s.as_non_terminal().map(|n| n as usize)).collect();
    conjuncts.push(Conjunct { inputs, output: rule.lhs as usize });
  }
  let active = bipartite_closure(n, &conjuncts);
  (0..n as u32).filter(|&i| active[i as usize]).collect()
}

/// Non-terminals reachable from any start symbol, by direct graph traversal
/// (plain reachability needs no AND semantics, so the bipartite closure
/// helper doesn't apply here).
pub fn compute_reachable(grammar: &Grammar) -> BTreeSet<u32> {
  let mut seen: BTreeSet<u32> = grammar.start_symbols.iter().copied().collect();
  let mut stack: Vec<u32> = seen.iter().copied().collect();
  while let Some(nt) = stack.pop() {
    for (_, rule) in grammar.rules_for(nt) {
      for sym in &rule.rhs {
        if let SymbolId::NonTerminal(n) = sym {
          if seen.insert(*n) {
            stack.push(*n);
          }
        }
      }
    }
  }
  seen
}

/// FIRST sets lifted to sets of terminals: not expressible as a plain
/// boolean bipartite closure (spec §4.4's note that FIRST requires "lifting
/// to sets ... propagation is set-union"), so this is a dedicated
/// fixed-point over the same AND/OR shape -- a rule's contribution to
/// `FIRST(lhs)` is the union of `FIRST` of its RHS up to (and including,
/// if all preceding positions are nullable) the first non-nullable symbol.
pub fn compute_first_sets(grammar: &Grammar, nullable: &BTreeSet<u32>) -> BTreeMap<u32, BTreeSet<SymbolId>> {
  let mut first: BTreeMap<u32, BTreeSet<SymbolId>> = (0..grammar.symbols.num_non_terminals()).map(|n| (n, BTreeSet::new())).collect();
  let mut changed = true;
  while changed {
    changed = false;
    for rule in &grammar.rules {
      let mut addition = BTreeSet::new();
      let mut all_nullable_so_far = true;
      for sym in &rule.rhs {
        match sym {
          SymbolId::NonTerminal(n) => {
            addition.extend(first.get(n).cloned().unwrap_or_default());
            if !nullable.contains(n) {
              all_nullable_so_far = false;
              break;
            }
          }
          other => {
            addition.insert(*other);
            all_nullable_so_far = false;
            break;
          }
        }
      }
      let _ = all_nullable_so_far;
      let entry = first.entry(rule.lhs).or_default();
      let before = entry.len();
      entry.extend(addition);
      if entry.len() != before {
        changed = true;
      }
    }
  }
  first
}

/// Validates well-foundedness/reachability against the grammar's
/// non-deterministic exception set (spec §3 invariants), returning
/// aggregated errors if any non-terminal reachable from a start symbol is
/// not well-founded and not explicitly exempted.
pub fn check_well_founded(grammar: &Grammar) -> RadlrResult<()> {
  let well_founded = compute_well_founded(grammar);
  let reachable = compute_reachable(grammar);
  let mut errors = Vec::new();
  for &nt in &reachable {
    if !well_founded.contains(&nt) && !grammar.nondeterminism.permits(nt) {
      errors.push(RadlrError::IllFoundedNonTerminal {
        name: grammar.symbols.name(SymbolId::NonTerminal(nt)).to_string(),
        message: "derives no terminal string (not well-founded)".to_string(),
      });
    }
  }
  if errors.is_empty() {
    Ok(())
  } else {
    Err(RadlrError::Many { message: "grammar is not well-founded".to_string(), errors })
  }
}

/// Reports non-terminals defined but never reached from a start symbol, as
/// warnings rather than failures (spec §4.1 "unreachable rule (warning, not
/// fatal)" generalizes to non-terminals here).
pub fn unreachable_warnings(grammar: &Grammar) -> Vec<RadlrError> {
  let reachable = compute_reachable(grammar);
  let mut out = Vec::new();
  for rule in &grammar.rules {
    if !reachable.contains(&rule.lhs) {
      out.push(RadlrError::UnreachableRule {
        loc: crate::types::Token::empty(),
        message: format!("non-terminal `{}` is unreachable from any start symbol (line {})", grammar.symbols.name(SymbolId::NonTerminal(rule.lhs)), rule.line),
      });
    }
  }
  out
}

/// A rule `A -> B` is a *renaming* (spec §4.3) when it has no semantic
/// content: a single RHS symbol, and a constructor that is either the
/// default tuple over that one position or an explicit stack-offset to it.
pub fn is_renaming_rule(rule: &super::model::Rule) -> Option<SymbolId> {
  if rule.rhs.len() != 1 {
    return None;
  }
  match &rule.constructor {
    Constructor::StackOffset(0) | Constructor::DefaultTuple => Some(rule.rhs[0]),
    _ => None,
  }
}

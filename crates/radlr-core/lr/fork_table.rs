//! The non-deterministic ("fork") table (spec §4.7 "Generalized parsing"):
//! the same automaton construction as [`super::build`], but every
//! shift/reduce and reduce/reduce conflict on a `%nondeterministic`
//! non-terminal is *kept* instead of resolved, so the GLR driver can
//! explore every branch rather than following the single deterministic
//! choice precedence would make.
use super::{
  augmented::Augmented,
  build::{built_states_for_method, BuiltState},
  table::{Action, RuleInfo},
};
use crate::{
  grammar::{
    model::Grammar,
    normalize::{check_well_founded, compute_first_sets, compute_nullable},
  },
  journal::Journal,
  types::{RadlrResult, SymbolId},
};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct ForkState {
  pub actions: BTreeMap<SymbolId, Vec<Action>>,
  pub goto:    BTreeMap<u32, usize>,
}

#[derive(Debug, Clone)]
pub struct ForkTable {
  pub states:  Vec<ForkState>,
  pub rules:   Vec<RuleInfo>,
  pub initial: BTreeMap<u32, usize>,
}

impl ForkTable {
  pub fn actions(&self, state: usize, symbol: SymbolId) -> &[Action] {
    self.states[state].actions.get(&symbol).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn goto(&self, state: usize, non_terminal: u32) -> Option<usize> {
    self.states[state].goto.get(&non_terminal).copied()
  }
}

fn build_row(aug: &Augmented, built: &BuiltState) -> ForkState {
  let mut goto = BTreeMap::new();
  let mut actions: BTreeMap<SymbolId, Vec<Action>> = BTreeMap::new();

  for (&sym, &target) in &built.transitions {
    match sym {
      SymbolId::NonTerminal(nt) => {
        goto.insert(nt, target);
      }
      _ => {
        actions.entry(sym).or_default().push(Action::Shift { target });
      }
    }
  }

  let accepts = built.items.iter().any(|(item, _)| aug.is_augmented_rule(item.rule) && item.is_complete(aug));
  if accepts {
    actions.entry(SymbolId::EndOfInput).or_default().push(Action::Accept);
  }

  for (item, la) in &built.items {
    if item.is_complete(aug) && !aug.is_augmented_rule(item.rule) {
      for &sym in la {
        let row = actions.entry(sym).or_default();
        let action = Action::Reduce { rule: item.rule as usize };
        if !row.contains(&action) {
          row.push(action);
        }
      }
    }
  }

  ForkState { actions, goto }
}

/// Builds the fork table under `journal`'s configured method for the
/// automaton shape, keeping every conflict branch alive.
pub fn build_fork_table(grammar: &Grammar, journal: &mut Journal) -> RadlrResult<ForkTable> {
  grammar.validate_static()?;
  check_well_founded(grammar)?;

  let nullable = compute_nullable(grammar);
  let first = compute_first_sets(grammar, &nullable);
  let aug = Augmented::new(grammar);
  let method = journal.config().method;

  let (built_states, start_states) = built_states_for_method(&aug, grammar, &first, &nullable, method);

  let states = built_states.iter().map(|b| build_row(&aug, b)).collect();
  let rules = grammar
    .rules
    .iter()
    .map(|r| RuleInfo { lhs: r.lhs, rhs_len: r.rhs.len(), constructor: r.constructor.clone(), captured_offsets: r.captured_positions(), line: r.line })
    .collect();

  Ok(ForkTable { states, rules, initial: start_states })
}

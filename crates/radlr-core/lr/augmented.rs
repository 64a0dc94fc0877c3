//! The augmented grammar: one synthetic rule `S' -> S $end` per start
//! symbol (spec §4.5 "Start state per designated start symbol"), so every
//! LR item structure can address rules by a single flat index across both
//! the user's rules and the augmentation.
use crate::{
  grammar::model::{Constructor, Grammar, Rule},
  types::SymbolId,
};
use std::collections::BTreeMap;

pub struct Augmented<'g> {
  pub grammar:     &'g Grammar,
  /// `grammar.rules` followed by one augmented rule per start symbol.
  pub rules:       Vec<Rule>,
  /// Start non-terminal -> index of its augmented rule in `rules`.
  pub aug_rule_of: BTreeMap<u32, usize>,
}

impl<'g> Augmented<'g> {
  pub fn new(grammar: &'g Grammar) -> Self {
    let mut rules = grammar.rules.clone();
    let mut aug_rule_of = BTreeMap::new();
    for &start in &grammar.start_symbols {
      aug_rule_of.insert(start, rules.len());
      rules.push(Rule {
        lhs:          u32::MAX - start, // out-of-band lhs id, never matches a real non-terminal
        rhs:          vec![SymbolId::NonTerminal(start), SymbolId::EndOfInput],
        capture_mask: vec![true, false],
        constructor:  Constructor::StackOffset(0),
        precedence:   None,
        line:         0,
      });
    }
    Self { grammar, rules, aug_rule_of }
  }

  pub fn rule(&self, idx: u32) -> &Rule {
    &self.rules[idx as usize]
  }

  pub fn rules_for(&self, lhs: u32) -> impl Iterator<Item = (usize, &Rule)> {
    self.rules.iter().enumerate().filter(move |(_, r)| r.lhs == lhs)
  }

  pub fn num_rules(&self) -> usize {
    self.rules.len()
  }

  pub fn is_augmented_rule(&self, idx: u32) -> bool {
    idx as usize >= self.grammar.rules.len()
  }
}

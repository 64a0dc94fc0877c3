//! The grammar data model (spec §3): production rules, precedence levels,
//! start symbols, and the non-determinism declaration.
use crate::{
  journal::Nondeterminism,
  types::{RadlrError, RadlrResult, SymbolId, SymbolTable},
};
use std::collections::{BTreeSet, HashMap};

/// How a reduction's message argument list is built from its captured RHS
/// positions (spec §3 "constructor key").
#[derive(Debug, Clone)]
pub enum Constructor {
  /// Invoke the driver's named handler with the captured arguments.
  Message(String),
  /// Pass through the single captured RHS position unchanged.
  StackOffset(usize),
  /// Build a tuple of every captured position, in RHS order.
  DefaultTuple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
  Left,
  Right,
  NonAssoc,
  /// `%bogus` -- a level that never matches a real token (spec §4.5).
  Bogus,
}

#[derive(Debug, Clone)]
pub struct PrecedenceLevel {
  pub assoc: Assoc,
}

/// An immutable production rule (spec §3). RHS positions are captured per
/// `capture_mask`; `rhs` may be empty (an epsilon rule).
#[derive(Debug, Clone)]
pub struct Rule {
  pub lhs:          u32,
  pub rhs:          Vec<SymbolId>,
  pub capture_mask: Vec<bool>,
  pub constructor:  Constructor,
  pub precedence:   Option<SymbolId>,
  pub line:         u32,
}

impl Rule {
  pub fn is_epsilon(&self) -> bool {
    self.rhs.is_empty()
  }

  pub fn captured_positions(&self) -> Vec<usize> {
    self.capture_mask.iter().enumerate().filter_map(|(i, &c)| c.then_some(i)).collect()
  }

  /// The rule's effective precedence symbol: the explicit `%prec` target if
  /// set, else the rightmost terminal in the RHS (spec §4.5).
  pub fn precedence_symbol(&self) -> Option<SymbolId> {
    if self.precedence.is_some() {
      return self.precedence;
    }
    self.rhs.iter().rev().find(|s| s.is_terminal() && !matches!(s, SymbolId::Error)).copied()
  }
}

#[derive(Debug, Clone)]
pub struct Grammar {
  pub symbols:             SymbolTable,
  pub rules:                Vec<Rule>,
  pub start_symbols:        Vec<u32>,
  /// Ordered low -> high, per §3 ("ordered low->high or high->low depending
  /// on declaration order"); we normalize to low->high at load time.
  pub precedence_levels:    Vec<PrecedenceLevel>,
  pub terminal_precedence:  HashMap<SymbolId, usize>,
  pub nondeterminism:       Nondeterminism,
  /// Non-terminals declared with `%void` -- carry no semantic value.
  pub void_symbols:         BTreeSet<SymbolId>,
}

impl Grammar {
  pub fn rules_for(&self, lhs: u32) -> impl Iterator<Item = (usize, &Rule)> {
    self.rules.iter().enumerate().filter(move |(_, r)| r.lhs == lhs)
  }

  pub fn precedence_of(&self, terminal: SymbolId) -> Option<&PrecedenceLevel> {
    self.terminal_precedence.get(&terminal).map(|&lvl| &self.precedence_levels[lvl])
  }

  /// Checks the invariants of spec §3 that can be verified without building
  /// tables: every non-terminal is defined, `$error$` appears only in a
  /// RHS, and start symbols are non-terminals.
  pub fn validate_static(&self) -> RadlrResult<()> {
    let mut errors = Vec::new();
    let defined: BTreeSet<u32> = self.rules.iter().map(|r| r.lhs).collect();
    let mut referenced: BTreeSet<u32> = BTreeSet::new();
    for rule in &self.rules {
      for sym in &rule.rhs {
        if let SymbolId::NonTerminal(n) = sym {
          referenced.insert(*n);
        }
      }
    }
    for n in referenced.difference(&defined) {
      errors.push(RadlrError::IllFoundedNonTerminal {
        name: self.symbols.name(SymbolId::NonTerminal(*n)).to_string(),
        message: "is referenced but has no rule".to_string(),
      });
    }
    for &start in &self.start_symbols {
      if !defined.contains(&start) {
        errors.push(RadlrError::IllFoundedNonTerminal {
          name: self.symbols.name(SymbolId::NonTerminal(start)).to_string(),
          message: "is declared a start symbol but has no rule".to_string(),
        });
      }
    }
    if errors.is_empty() {
      Ok(())
    } else {
      Err(RadlrError::Many { message: "grammar validation failed".to_string(), errors })
    }
  }
}

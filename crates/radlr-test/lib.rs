//! Shared test support: builds `Grammar`s directly from rule literals
//! instead of round-tripping the literate-document front end, the way the
//! teacher's own bootstrap test helpers assemble fixtures in-memory.
use radlr_core::{
  grammar::{Assoc, Constructor, Grammar, PrecedenceLevel, Rule},
  journal::Nondeterminism,
  types::{SymbolId, SymbolTable},
};
use std::collections::{BTreeSet, HashMap};

pub struct GrammarBuilder {
  symbols:             SymbolTable,
  rules:               Vec<Rule>,
  precedence_levels:   Vec<PrecedenceLevel>,
  terminal_precedence: HashMap<SymbolId, usize>,
  nondeterminism:      Nondeterminism,
}

impl Default for GrammarBuilder {
  fn default() -> Self {
    Self::new()
  }
}

impl GrammarBuilder {
  pub fn new() -> Self {
    Self {
      symbols:             SymbolTable::new(),
      rules:               Vec::new(),
      precedence_levels:   Vec::new(),
      terminal_precedence: HashMap::new(),
      nondeterminism:      Nondeterminism::Deterministic,
    }
  }

  pub fn term(&mut self, name: &str) -> SymbolId {
    self.symbols.intern_terminal(name)
  }

  pub fn nt(&mut self, name: &str) -> SymbolId {
    self.symbols.intern_non_terminal(name)
  }

  /// Declares one precedence level (lowest declared = lowest precedence,
  /// per spec §3/§4.5) and assigns it to every terminal in `terms`.
  pub fn precedence(&mut self, assoc: Assoc, terms: &[SymbolId]) {
    let level = self.precedence_levels.len();
    self.precedence_levels.push(PrecedenceLevel { assoc });
    for &t in terms {
      self.terminal_precedence.insert(t, level);
    }
  }

  pub fn nondeterministic_all(&mut self) {
    self.nondeterminism = Nondeterminism::All;
  }

  /// Adds one rule. `capture_mask` must match `rhs`'s length; pass an empty
  /// `precedence` unless the rule carries an explicit `%prec`.
  pub fn rule(&mut self, lhs: SymbolId, rhs: Vec<SymbolId>, capture_mask: Vec<bool>, constructor: Constructor, precedence: Option<SymbolId>) {
    let lhs = lhs.as_non_terminal().expect("rule lhs must be a non-terminal");
    let line = self.rules.len() as u32;
    self.rules.push(Rule { lhs, rhs, capture_mask, constructor, precedence, line });
  }

  /// Adds a rule that captures every RHS position (the common case).
  pub fn rule_all_captured(&mut self, lhs: SymbolId, rhs: Vec<SymbolId>, constructor: Constructor) {
    let mask = vec![true; rhs.len()];
    self.rule(lhs, rhs, mask, constructor, None);
  }

  pub fn build(self, start: SymbolId) -> Grammar {
    let start = start.as_non_terminal().expect("start symbol must be a non-terminal");
    Grammar {
      symbols:             self.symbols,
      rules:               self.rules,
      start_symbols:       vec![start],
      precedence_levels:   self.precedence_levels,
      terminal_precedence: self.terminal_precedence,
      nondeterminism:      self.nondeterminism,
      void_symbols:        BTreeSet::new(),
    }
  }
}

//! The symbol data model (spec §3): every symbol is identified by a small
//! integer and a printable name, and is either a terminal (scanner output)
//! or a non-terminal. Two pseudo-terminals are distinguished: end-of-input
//! and the `$error$` metatoken.
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt::Display};

/// A terminal's identity: either a real terminal produced by a scanner rule,
/// or one of the two pseudo-terminals. `EndOfInput` sorts greater than any
/// real terminal index, and `Error` sorts greater still -- enum declaration
/// order is load-bearing here, since `Ord` is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SymbolId {
  Terminal(u32),
  EndOfInput,
  Error,
  NonTerminal(u32),
}

impl SymbolId {
  pub fn is_terminal(&self) -> bool {
    matches!(self, SymbolId::Terminal(_) | SymbolId::EndOfInput | SymbolId::Error)
  }

  pub fn is_non_terminal(&self) -> bool {
    matches!(self, SymbolId::NonTerminal(_))
  }

  pub fn as_non_terminal(&self) -> Option<u32> {
    match self {
      SymbolId::NonTerminal(i) => Some(*i),
      _ => None,
    }
  }

  /// Maps this symbol onto a dense index over the terminal alphabet
  /// `{0..num_terminals} ∪ {EndOfInput, Error}`, used to index action rows.
  pub fn terminal_index(&self, num_terminals: u32) -> Option<u32> {
    match self {
      SymbolId::Terminal(i) => Some(*i),
      SymbolId::EndOfInput => Some(num_terminals),
      SymbolId::Error => Some(num_terminals + 1),
      SymbolId::NonTerminal(_) => None,
    }
  }
}

impl Display for SymbolId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      SymbolId::Terminal(i) => write!(f, "t{i}"),
      SymbolId::EndOfInput => write!(f, "$end"),
      SymbolId::Error => write!(f, "$error$"),
      SymbolId::NonTerminal(i) => write!(f, "n{i}"),
    }
  }
}

/// A named symbol: the pairing of a [SymbolId] with the printable name used
/// in diagnostics and in grammar-document round-tripping.
#[derive(Debug, Clone)]
pub struct Symbol {
  pub id:   SymbolId,
  pub name: String,
}

/// An interner for [Symbol]s: identity equals index equality, and the same
/// name always resolves to the same id within one table.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
  terminals:     Vec<Symbol>,
  non_terminals: Vec<Symbol>,
  by_name:       HashMap<String, SymbolId>,
}

impl SymbolTable {
  pub fn new() -> Self {
    let mut table = Self::default();
    table.by_name.insert("$end".to_string(), SymbolId::EndOfInput);
    table.by_name.insert("$error$".to_string(), SymbolId::Error);
    table
  }

  pub fn intern_terminal(&mut self, name: &str) -> SymbolId {
    if let Some(id) = self.by_name.get(name) {
      return *id;
    }
    let id = SymbolId::Terminal(self.terminals.len() as u32);
    self.terminals.push(Symbol { id, name: name.to_string() });
    self.by_name.insert(name.to_string(), id);
    id
  }

  pub fn intern_non_terminal(&mut self, name: &str) -> SymbolId {
    if let Some(id) = self.by_name.get(name) {
      return *id;
    }
    let id = SymbolId::NonTerminal(self.non_terminals.len() as u32);
    self.non_terminals.push(Symbol { id, name: name.to_string() });
    self.by_name.insert(name.to_string(), id);
    id
  }

  pub fn lookup(&self, name: &str) -> Option<SymbolId> {
    self.by_name.get(name).copied()
  }

  pub fn name(&self, id: SymbolId) -> &str {
    match id {
      SymbolId::Terminal(i) => &self.terminals[i as usize].name,
      SymbolId::NonTerminal(i) => &self.non_terminals[i as usize].name,
      SymbolId::EndOfInput => "$end",
      SymbolId::Error => "$error$",
    }
  }

  pub fn num_terminals(&self) -> u32 {
    self.terminals.len() as u32
  }

  pub fn num_non_terminals(&self) -> u32 {
    self.non_terminals.len() as u32
  }

  pub fn terminals(&self) -> &[Symbol] {
    &self.terminals
  }

  pub fn non_terminals(&self) -> &[Symbol] {
    &self.non_terminals
  }
}

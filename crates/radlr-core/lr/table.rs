//! The serializable parse table (spec §4.5 "table format", §A.6 in the
//! expanded spec): what the runtime crate actually consumes. Grounded on the
//! teacher's bytecode table (`sherpa-core/types/table.rs`-equivalent
//! structures) but expressed as plain Rust enums/maps instead of a packed
//! bytecode, since this workspace has no VM to target.
use crate::{grammar::model::Constructor, types::SymbolId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry in a state's action row (spec §4.5 "combined shift-reduce
/// instruction"): shift-then-reduce-in-place is folded into a single
/// `ShiftReduce` action for a renaming rule, avoiding a wasted state push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
  Shift { target: usize },
  /// Shift the terminal and immediately reduce by `rule` without visiting an
  /// intermediate state -- only valid when `rule` is a unit/renaming rule.
  ShiftReduce { target: usize, rule: usize },
  Reduce { rule: usize },
  Accept,
  /// Transfer control to the error-recovery machinery (spec §4.6/§7.3); not
  /// a hard parse failure by itself.
  Error,
}

/// A reduction's metadata: enough for the runtime to pop the right number of
/// stack slots, build the constructor call, and report which source rule
/// line it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleInfo {
  pub lhs:              u32,
  pub rhs_len:           usize,
  pub constructor:       Constructor,
  pub captured_offsets:  Vec<usize>,
  pub line:              u32,
}

impl serde::Serialize for Constructor {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      Constructor::Message(name) => serializer.serialize_newtype_variant("Constructor", 0, "Message", name),
      Constructor::StackOffset(i) => serializer.serialize_newtype_variant("Constructor", 1, "StackOffset", i),
      Constructor::DefaultTuple => serializer.serialize_unit_variant("Constructor", 2, "DefaultTuple"),
    }
  }
}

impl<'de> serde::Deserialize<'de> for Constructor {
  fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    #[derive(Deserialize)]
    enum Repr {
      Message(String),
      StackOffset(usize),
      DefaultTuple,
    }
    Ok(match Repr::deserialize(deserializer)? {
      Repr::Message(s) => Constructor::Message(s),
      Repr::StackOffset(i) => Constructor::StackOffset(i),
      Repr::DefaultTuple => Constructor::DefaultTuple,
    })
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State {
  pub action: BTreeMap<SymbolId, Action>,
  pub goto:   BTreeMap<u32, usize>,
}

/// The fully built, compressed parse table: everything the deterministic and
/// GLR drivers need, with no further reference back to the `Grammar` that
/// produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseTable {
  pub states:       Vec<State>,
  pub rules:        Vec<RuleInfo>,
  pub initial:      BTreeMap<u32, usize>,
  pub num_terminals: u32,
  /// Count of shift/reduce and reduce/reduce conflicts resolved during
  /// construction, surfaced for the ambient classification metrics (spec
  /// §B).
  pub conflict_count: usize,
}

impl ParseTable {
  pub fn action(&self, state: usize, symbol: SymbolId) -> Option<&Action> {
    self.states[state].action.get(&symbol)
  }

  pub fn goto(&self, state: usize, non_terminal: u32) -> Option<usize> {
    self.states[state].goto.get(&non_terminal).copied()
  }
}

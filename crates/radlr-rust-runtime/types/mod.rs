//! Value types the drivers move around, grounded on the teacher's
//! `HCObj`/`AstSlots` shape (`sherpa-rust-rt/types/ast.rs`) but trimmed to a
//! single generic slot instead of a closed numeric-type union -- this
//! workspace has no bytecode VM to target, so there is no need for a
//! type-erased runtime value.
use radlr_core::types::{SymbolId, Token};

/// One stack slot: either a reduced AST value or a raw scanned token that
/// hasn't been folded into one yet.
#[derive(Debug, Clone)]
pub enum AstSlot<T> {
  Value(T),
  Token(Token),
  /// A `%void` symbol's slot, or an un-captured RHS position.
  None,
}

impl<T: Clone> AstSlot<T> {
  pub fn token(&self) -> Option<&Token> {
    match self {
      AstSlot::Token(t) => Some(t),
      _ => None,
    }
  }

  pub fn into_value(self) -> Option<T> {
    match self {
      AstSlot::Value(v) => Some(v),
      _ => None,
    }
  }
}

/// One scanner-produced token ready to feed to a parser driver.
#[derive(Debug, Clone)]
pub struct ScannedToken {
  pub symbol: SymbolId,
  pub text:   Token,
}

//! `ParserClassification`-style summary metrics (spec §B), grounded on the
//! teacher's `radlr-core::types::parser_config::ParserClassification`:
//! surfaces *why* a construction mode was needed instead of just producing a
//! table silently.
use radlr_core::{journal::LrMethod, lr::ParseTable};

/// What strength of construction the grammar actually required, and whether
/// generalized (forking) parsing came into play. Bottom-up here always --
/// this workspace has no recursive-descent/peeking mode, unlike the
/// teacher's broader classification, so those fields are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserClassification {
  pub method:          LrMethod,
  /// At least one state has a non-trivial `goto` row -- true for every
  /// grammar with a non-terminal on some rule's RHS, kept for parity with
  /// the teacher's field of the same name.
  pub gotos_present:   bool,
  /// At least one shift/reduce or reduce/reduce conflict had to be resolved
  /// by precedence or rule-order during table construction.
  pub conflicts_present: bool,
  /// The grammar declared `%nondeterministic` productions and a fork table
  /// was built for the GLR driver.
  pub forks_present:   bool,
}

impl std::ops::BitOr for ParserClassification {
  type Output = Self;

  fn bitor(self, rhs: Self) -> Self::Output {
    Self {
      method:            self.method.max(rhs.method),
      gotos_present:     self.gotos_present | rhs.gotos_present,
      conflicts_present: self.conflicts_present | rhs.conflicts_present,
      forks_present:     self.forks_present | rhs.forks_present,
    }
  }
}

/// Classifies a deterministic [`ParseTable`] built without a companion fork
/// table -- `forks_present` is always `false` here; pass `true` explicitly
/// via [`ParserClassification::with_forks`] when a [`radlr_core::lr::ForkTable`]
/// was also built for the same grammar.
pub fn classify(method: LrMethod, table: &ParseTable) -> ParserClassification {
  let gotos_present = table.states.iter().any(|s| !s.goto.is_empty());
  ParserClassification { method, gotos_present, conflicts_present: table.conflict_count > 0, forks_present: false }
}

impl ParserClassification {
  pub fn with_forks(mut self, forks_present: bool) -> Self {
    self.forks_present = forks_present;
    self
  }
}

use std::collections::BTreeSet;

/// Which LR-family construction mode builds the parse tables (spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LrMethod {
  Lr0,
  Lalr1,
  Clr1,
  #[default]
  MinimalLr1,
}

impl LrMethod {
  /// Maps a grammar document's `%method` value (spec §6) onto a construction
  /// mode. Unrecognized names leave the configured default in place.
  pub fn from_name(name: &str) -> Option<Self> {
    match name.to_ascii_uppercase().as_str() {
      "LR0" | "LR(0)" => Some(LrMethod::Lr0),
      "LALR" | "LALR1" | "LALR(1)" => Some(LrMethod::Lalr1),
      "CLR" | "CLR1" | "CLR(1)" | "LR1" | "LR(1)" => Some(LrMethod::Clr1),
      "MINIMAL" | "MINIMALLR1" | "MINIMAL-LR1" => Some(LrMethod::MinimalLr1),
      _ => None,
    }
  }
}

/// The `%nondeterministic [sym...]` declaration (spec §3, §4.7): either the
/// grammar is fully deterministic, every non-terminal may be ambiguous, or
/// only an explicit set may.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Nondeterminism {
  #[default]
  Deterministic,
  All,
  Only(BTreeSet<u32>),
}

impl Nondeterminism {
  pub fn permits(&self, non_terminal: u32) -> bool {
    match self {
      Nondeterminism::Deterministic => false,
      Nondeterminism::All => true,
      Nondeterminism::Only(set) => set.contains(&non_terminal),
    }
  }

  pub fn is_deterministic(&self) -> bool {
    matches!(self, Nondeterminism::Deterministic)
  }
}

/// Construction-time knobs, grounded on the teacher's `ParserConfig`
/// builder (`crates/radlr-core/types/parser_config.rs`) but scoped to the
/// settings spec.md actually names.
#[derive(Debug, Clone)]
pub struct Config {
  pub method: LrMethod,
  pub nondeterminism: Nondeterminism,
  /// Number of consecutive tokens a trial parse must consume before error
  /// recovery commits to it (spec §4.6). Default 3.
  pub trial_parse_commit_threshold: usize,
  /// Number of tokens after a committed recovery during which further
  /// error notifications are suppressed (spec §4.6, §7). Default 3.
  pub quiescence_window: usize,
  /// When false, definition errors below `Critical` severity are dropped
  /// rather than accumulated (keeps diagnostics quiet in embedded use).
  pub report_warnings: bool,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      method: LrMethod::MinimalLr1,
      nondeterminism: Nondeterminism::Deterministic,
      trial_parse_commit_threshold: 3,
      quiescence_window: 3,
      report_warnings: true,
    }
  }
}

impl Config {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_method(mut self, method: LrMethod) -> Self {
    self.method = method;
    self
  }

  pub fn with_nondeterminism(mut self, n: Nondeterminism) -> Self {
    self.nondeterminism = n;
    self
  }
}

//! Error substrate for the whole workspace, grounded on the teacher's
//! hand-rolled `SherpaError`/`SherpaErrorContainer` (`types/error.rs`)
//! rather than `thiserror`/`anyhow`.
use super::Token;
use std::fmt::Display;

pub(crate) mod severity {
  #[bitmask_enum::bitmask]
  /// Severity classification of a [super::RadlrError], mirroring the
  /// teacher's `SherpaErrorSeverity` bitmask.
  pub enum RadlrErrorSeverity {
    Hint     = 0b100,
    Warning  = 0b010,
    Critical = 0b001,
    None     = 0b000,
  }
}

pub use severity::RadlrErrorSeverity;

/// Every error kind the metacompiler or runtime can raise: definition errors
/// (spec §7.1), scan errors (§7.2), parse errors (§7.3), and driver errors
/// (§7.4), plus the common wrapper kinds.
#[derive(Clone, Debug)]
pub enum RadlrError {
  /// A malformed regular-expression pattern.
  MalformedPattern { loc: Token, message: String },
  /// A `{name}` reference that cannot be expanded, or expands recursively.
  UnresolvedNamedSubexpression { loc: Token, name: String, recursive: bool },
  /// Two rules in the same scan-condition have identical patterns but
  /// conflicting explicit ranks.
  ConflictingRank { loc_a: Token, loc_b: Token, pattern: String },
  /// A pattern that is reachable under no scan-condition.
  UnreachableRule { loc: Token, message: String },

  /// A non-terminal that appears nowhere as a rule's LHS, or that is
  /// unreachable / not well-founded from any start symbol.
  IllFoundedNonTerminal { name: String, message: String },
  /// Macro call-site argument count mismatch, or a macro expansion cycle.
  MacroError { loc: Token, message: String },
  /// An unresolved shift/reduce or reduce/reduce conflict (downgraded to a
  /// warning once the default-action rule has been applied).
  UnresolvedConflict { message: String, loc: Token },

  /// The scanner ran out of transitions and could not advance the cursor.
  ScannerStuck { position: usize, condition: String },

  /// No action exists for `(state, terminal)` and no recoverable state was
  /// reachable on the parse stack.
  UnexpectedToken { expected: Vec<String>, found: String, loc: Token },
  /// End of input reached mid-derivation with no accepting state.
  UnexpectedEndOfInput { expected: Vec<String> },

  /// The driver's handler table is missing a name referenced by a
  /// constructor key or scanner action.
  UnknownHandler { name: String },

  /// Several errors collected together, e.g. from a whole construction pass.
  Many { message: String, errors: Vec<RadlrError> },

  IOError(String),
  Text(String),
}

use RadlrError::*;

impl RadlrError {
  pub fn severity(&self) -> RadlrErrorSeverity {
    match self {
      UnreachableRule { .. } | UnresolvedConflict { .. } => RadlrErrorSeverity::Warning,
      _ => RadlrErrorSeverity::Critical,
    }
  }

  pub fn is_critical(&self) -> bool {
    self.severity() == RadlrErrorSeverity::Critical
  }

  pub fn is_warning(&self) -> bool {
    self.severity() == RadlrErrorSeverity::Warning
  }

  pub fn is_hint(&self) -> bool {
    self.severity() == RadlrErrorSeverity::Hint
  }
}

impl From<std::io::Error> for RadlrError {
  fn from(err: std::io::Error) -> Self {
    IOError(err.to_string())
  }
}

impl From<std::fmt::Error> for RadlrError {
  fn from(_: std::fmt::Error) -> Self {
    Text("formatting error".into())
  }
}

impl From<&str> for RadlrError {
  fn from(err: &str) -> Self {
    Text(err.to_string())
  }
}

impl From<String> for RadlrError {
  fn from(err: String) -> Self {
    Text(err)
  }
}

impl Display for RadlrError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      MalformedPattern { loc, message } => {
        write!(f, "malformed pattern at {}: {}", loc.loc_stub(), message)
      }
      UnresolvedNamedSubexpression { loc, name, recursive } => {
        if *recursive {
          write!(f, "recursive named subexpression `{{{name}}}` at {}", loc.loc_stub())
        } else {
          write!(f, "unresolved named subexpression `{{{name}}}` at {}", loc.loc_stub())
        }
      }
      ConflictingRank { loc_a, loc_b, pattern } => write!(
        f,
        "conflicting ranks for identical pattern `{pattern}` at {} and {}",
        loc_a.loc_stub(),
        loc_b.loc_stub()
      ),
      UnreachableRule { loc, message } => write!(f, "unreachable rule at {}: {}", loc.loc_stub(), message),
      IllFoundedNonTerminal { name, message } => write!(f, "non-terminal `{name}` {message}"),
      MacroError { loc, message } => write!(f, "macro error at {}: {}", loc.loc_stub(), message),
      UnresolvedConflict { message, loc } => write!(f, "conflict at {}: {}", loc.loc_stub(), message),
      ScannerStuck { position, condition } => {
        write!(f, "scanner stuck at byte {position} in condition `{condition}`")
      }
      UnexpectedToken { expected, found, loc } => write!(
        f,
        "unexpected token `{found}` at {}, expected one of: {}",
        loc.loc_stub(),
        expected.join(", ")
      ),
      UnexpectedEndOfInput { expected } => {
        write!(f, "unexpected end of input, expected one of: {}", expected.join(", "))
      }
      UnknownHandler { name } => write!(f, "no handler registered for `{name}`"),
      Many { message, errors } => {
        writeln!(f, "{message}")?;
        for e in errors {
          writeln!(f, "  - {e}")?;
        }
        Ok(())
      }
      IOError(s) => write!(f, "IO error: {s}"),
      Text(s) => f.write_str(s),
    }
  }
}

impl std::error::Error for RadlrError {}

pub type RadlrResult<T> = Result<T, RadlrError>;

#[derive(Default, Debug)]
pub struct ErrorGroups {
  pub hints:    Vec<RadlrError>,
  pub warnings: Vec<RadlrError>,
  pub critical: Vec<RadlrError>,
}

/// Grouping/reporting convenience over a collection of errors, grounded on
/// the teacher's `SherpaErrorContainer`.
pub trait RadlrErrorContainer {
  fn get_error_groups(&self) -> ErrorGroups;

  fn get_critical(&self) -> Vec<RadlrError> {
    self.get_error_groups().critical
  }

  fn get_warnings(&self) -> Vec<RadlrError> {
    self.get_error_groups().warnings
  }

  fn have_errors(&self) -> bool;
  fn have_critical(&self) -> bool;
  fn have_warnings(&self) -> bool;
}

impl RadlrErrorContainer for Vec<RadlrError> {
  fn get_error_groups(&self) -> ErrorGroups {
    let mut groups = ErrorGroups::default();
    for error in self {
      match error.severity() {
        RadlrErrorSeverity::Critical => groups.critical.push(error.clone()),
        RadlrErrorSeverity::Warning => groups.warnings.push(error.clone()),
        _ => groups.hints.push(error.clone()),
      }
    }
    groups
  }

  fn have_errors(&self) -> bool {
    !self.is_empty()
  }

  fn have_critical(&self) -> bool {
    self.iter().any(RadlrError::is_critical)
  }

  fn have_warnings(&self) -> bool {
    self.iter().any(RadlrError::is_warning)
  }
}

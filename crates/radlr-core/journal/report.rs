use crate::types::RadlrError;
use std::{
  collections::BTreeMap,
  fmt::{Debug, Display},
  time::{Duration, Instant},
};

/// Discriminates the construction phase a [Report] covers, used both to look
/// reports back up and as the §4.5/§7 diagnostic breadcrumb trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReportType {
  Any,
  ScannerBuild,
  GrammarNormalize,
  Lr0Build,
  LalrBuild,
  ClrBuild,
  MinimalLrBuild,
  TableCompress,
  Parse,
}

impl ReportType {
  pub fn type_matches(&self, other: ReportType) -> bool {
    *self == ReportType::Any || other == ReportType::Any || *self == other
  }
}

#[derive(Clone, Copy)]
struct Timing {
  start:  Instant,
  end:    Option<Instant>,
}

impl Debug for Timing {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self.end {
      Some(end) => write!(f, "{:?}", end.duration_since(self.start)),
      None => write!(f, "<running>"),
    }
  }
}

/// A named, timed diagnostic sink that a table-construction phase writes
/// into: errors/warnings plus start/stop timers for named sub-steps,
/// grounded on the teacher's `Journal`/`Report` substrate
/// (`journal/mod.rs`, `journal/report.rs`), minus the cross-thread global
/// pad (this workspace's construction is single-threaded per spec §5).
#[derive(Debug, Default)]
pub struct Report {
  pub name:        String,
  pub report_type: ReportTypeSlot,
  errors:          Vec<RadlrError>,
  timers:          BTreeMap<String, Timing>,
  create_time:     Option<Instant>,
}

/// Wraps `ReportType` so `Report` can `#[derive(Default)]` (ReportType has
/// no natural zero value).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportTypeSlot(pub ReportType);

impl Default for ReportTypeSlot {
  fn default() -> Self {
    ReportTypeSlot(ReportType::Any)
  }
}

impl Report {
  pub fn new(name: &str, report_type: ReportType) -> Self {
    Self { name: name.to_string(), report_type: ReportTypeSlot(report_type), create_time: Some(Instant::now()), ..Default::default() }
  }

  pub fn add_error(&mut self, error: RadlrError) {
    self.errors.push(error);
  }

  pub fn errors(&self) -> &[RadlrError] {
    &self.errors
  }

  pub fn start_timer(&mut self, label: &str) {
    self.timers.insert(label.to_string(), Timing { start: Instant::now(), end: None });
  }

  pub fn stop_timer(&mut self, label: &str) {
    if let Some(timing) = self.timers.get_mut(label) {
      timing.end = Some(Instant::now());
    }
  }

  pub fn duration(&self, label: &str) -> Option<Duration> {
    self.timers.get(label).and_then(|t| t.end.map(|end| end.duration_since(t.start)))
  }

  pub fn report_duration(&self, label: &str) -> String {
    match self.duration(label) {
      Some(d) => format!("{label}: {d:?}"),
      None => format!("{label}: <not recorded>"),
    }
  }

  pub fn debug_string(&self) -> String {
    let mut out = String::new();
    for (label, _) in &self.timers {
      out.push_str(&self.report_duration(label));
      out.push('\n');
    }
    for err in &self.errors {
      out.push_str(&err.to_string());
      out.push('\n');
    }
    out
  }

  pub fn type_matches(&self, t: ReportType) -> bool {
    self.report_type.0.type_matches(t)
  }
}

impl Display for Report {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.debug_string())
  }
}

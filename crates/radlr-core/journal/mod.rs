//! Configuration, timing, and diagnostics substrate for the metacompiler,
//! grounded on the teacher's `Journal`/`Report`/`Config` (`journal/mod.rs`)
//! rather than `log`/`tracing`. Per spec §5 construction is single-threaded
//! and batch, so unlike the teacher we drop the `Arc<RwLock<ScratchPad>>`
//! global pad and symbol-occlusion tracking -- neither has a counterpart in
//! this spec -- and keep one `Journal` per construction.
pub mod config;
pub mod report;

pub use config::{Config, LrMethod, Nondeterminism};
pub use report::{Report, ReportType};

use crate::types::RadlrError;
use std::{collections::HashMap, time::Instant};

#[derive(Debug)]
pub struct Journal {
  config:       Config,
  reports:      HashMap<ReportType, Report>,
  active:       Option<ReportType>,
  create_time:  Instant,
}

impl Journal {
  pub fn new(config: Option<Config>) -> Self {
    Self { config: config.unwrap_or_default(), reports: HashMap::new(), active: None, create_time: Instant::now() }
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn config_mut(&mut self) -> &mut Config {
    &mut self.config
  }

  /// Sets the active report, creating it if needed, and returns the
  /// previously-active report type.
  pub fn set_active_report(&mut self, name: &str, report_type: ReportType) -> Option<ReportType> {
    self.reports.entry(report_type).or_insert_with(|| Report::new(name, report_type));
    self.active.replace(report_type)
  }

  pub fn report_mut(&mut self) -> &mut Report {
    let active = self.active.unwrap_or(ReportType::Any);
    self.reports.entry(active).or_insert_with(|| Report::new("default", active))
  }

  pub fn report(&self) -> Option<&Report> {
    self.active.and_then(|t| self.reports.get(&t))
  }

  pub fn add_error(&mut self, error: RadlrError) {
    self.report_mut().add_error(error);
  }

  pub fn errors(&self) -> Vec<RadlrError> {
    self.reports.values().flat_map(|r| r.errors().to_vec()).collect()
  }

  pub fn get_reports<T: FnMut(&Report)>(&self, report_type: ReportType, mut closure: T) {
    for report in self.reports.values() {
      if report.type_matches(report_type) {
        closure(report);
      }
    }
  }

  pub fn debug_print_reports(&self, discriminant: ReportType) {
    self.get_reports(discriminant, |report| {
      eprintln!(
        "\n{:=<80}\nReport [{}] at {:?}:\n{}\n{:=<80}",
        "",
        report.name,
        Instant::now().duration_since(self.create_time),
        report.debug_string(),
        ""
      )
    });
  }
}

impl Default for Journal {
  fn default() -> Self {
    Self::new(None)
  }
}

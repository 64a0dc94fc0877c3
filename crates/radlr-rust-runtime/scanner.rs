//! The scanner runtime driver (spec §4.2): leftmost-longest matching over a
//! [ScannerTable], start-condition push/pop, trailing-context backup, and
//! stuck-scanner recovery.
use radlr_core::{
  regex::ScannerTable,
  types::{RadlrError, RadlrResult},
};

/// The outcome of one successful scan: which rule matched, its action name,
/// and the byte range actually consumed (post trailing-context backup).
#[derive(Debug, Clone)]
pub struct ScanMatch {
  pub rule_id: u32,
  pub action:  String,
  pub start:   usize,
  pub end:     usize,
}

/// A scan-condition stack (spec §4.1/§4.2 "push/pop start condition"):
/// `INITIAL` is always the bottom entry and can never be popped.
#[derive(Debug, Clone)]
pub struct ConditionStack {
  stack: Vec<String>,
}

impl Default for ConditionStack {
  fn default() -> Self {
    Self { stack: vec!["INITIAL".to_string()] }
  }
}

impl ConditionStack {
  pub fn push(&mut self, name: &str) {
    self.stack.push(name.to_string());
  }

  pub fn pop(&mut self) {
    if self.stack.len() > 1 {
      self.stack.pop();
    }
  }

  pub fn current(&self) -> &str {
    self.stack.last().map(String::as_str).unwrap_or("INITIAL")
  }
}

pub struct ScannerCursor<'t> {
  table: &'t ScannerTable,
}

impl<'t> ScannerCursor<'t> {
  pub fn new(table: &'t ScannerTable) -> Self {
    Self { table }
  }

  /// Runs the DFA from `start` in `condition`, returning the longest match
  /// reachable. `anchored` selects the condition's begin-of-line entry
  /// point (spec §4.1 `^` anchors).
  pub fn scan(&self, source: &str, start: usize, condition: &str, anchored: bool) -> RadlrResult<ScanMatch> {
    let &(plain_entry, anchored_entry) = self.table.initial.get(condition).ok_or_else(|| RadlrError::ScannerStuck {
      position: start,
      condition: condition.to_string(),
    })?;
    let mut state = if anchored { anchored_entry } else { plain_entry };

    // (end_pos, rule_id, rank, backup_to) snapshotted every time we pass
    // through an accepting state. A later accept only overwrites `best` if
    // its rank is at least as high as the current one's: rank can make a
    // shorter match win over a longer competing one (spec §4.1 "rank
    // breaks ties between rules reaching the same accepting state").
    let mut best: Option<(usize, u32, i32, Option<usize>)> = None;
    let mut marker_pos: Option<usize> = None;
    let mut pos = start;

    loop {
      if let Some(entry) = &self.table.accept[state as usize] {
        if best.map(|(_, _, rank, _)| entry.rank >= rank).unwrap_or(true) {
          let backup_to = if entry.trailing { marker_pos } else { None };
          best = Some((pos, entry.rule_id, entry.rank, backup_to));
        }
      }
      if self.table.trailing_marker[state as usize] {
        marker_pos = Some(pos);
      }

      let Some(ch) = source[pos..].chars().next() else { break };
      let Some(class) = self.table.alphabet_class_of(ch as u32) else { break };
      match self.table.step(state, class) {
        Some(next) => {
          state = next;
          pos += ch.len_utf8();
        }
        None => break,
      }
    }

    match best {
      Some((end, rule_id, _rank, backup_to)) => {
        let end = backup_to.unwrap_or(end);
        let action_id = self.table.rule_actions[rule_id as usize] as usize;
        Ok(ScanMatch { rule_id, action: self.table.action_names[action_id].clone(), start, end })
      }
      None => Err(RadlrError::ScannerStuck { position: start, condition: condition.to_string() }),
    }
  }

  /// Scans repeatedly, recovering from a stuck scanner (spec §4.2) by
  /// skipping one code point and retrying, up to `max_skips` times, so one
  /// malformed character doesn't abort the whole scan.
  pub fn scan_with_recovery(
    &self,
    source: &str,
    mut start: usize,
    condition: &str,
    anchored: bool,
    max_skips: usize,
  ) -> RadlrResult<(ScanMatch, Vec<RadlrError>)> {
    let mut skipped = Vec::new();
    for _ in 0..=max_skips {
      match self.scan(source, start, condition, anchored) {
        Ok(m) => return Ok((m, skipped)),
        Err(e @ RadlrError::ScannerStuck { .. }) => {
          skipped.push(e);
          match source[start..].chars().next() {
            Some(ch) => start += ch.len_utf8(),
            None => break,
          }
        }
        Err(other) => return Err(other),
      }
    }
    Err(RadlrError::ScannerStuck { position: start, condition: condition.to_string() })
  }
}

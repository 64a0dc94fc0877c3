//! The grammar definition document (spec §6): a plain-text document
//! partitioned into named sections (`Definitions`, `Conditions`,
//! `Patterns [condition]`, `Precedence`, `Productions start...`) by headers,
//! whose bodies are fenced code blocks. Non-code text (including everything
//! outside a section) is documentation and ignored. This is the textual
//! front-end short of the literate-markdown `@@` extractor, which is an
//! out-of-scope collaborator per spec §1.
use crate::types::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
  Definitions,
  Conditions,
  Patterns,
  Precedence,
  Productions,
}

#[derive(Debug, Clone)]
pub struct Line {
  pub text: String,
  pub line_no: u32,
}

#[derive(Debug, Clone, Default)]
pub struct GrammarDocument {
  pub definitions: Vec<Line>,
  pub conditions:  Vec<Line>,
  /// `(condition_name_or_none, lines)` -- one entry per `Patterns` header
  /// encountered, since that section may repeat (spec §6: "each section
  /// except `Patterns` should appear at most once per document").
  pub patterns:    Vec<(Option<String>, Vec<Line>)>,
  pub precedence:  Vec<Line>,
  /// Start-symbol names declared on the `Productions` header line.
  pub start_symbols: Vec<String>,
  pub productions: Vec<Line>,
}

fn header_section(line: &str) -> Option<(Section, String)> {
  let trimmed = line.trim_start_matches('#').trim();
  let mut words = trimmed.split_whitespace();
  let keyword = words.next()?;
  let rest: String = words.collect::<Vec<_>>().join(" ");
  let section = match keyword {
    "Definitions" => Section::Definitions,
    "Conditions" => Section::Conditions,
    "Patterns" => Section::Patterns,
    "Precedence" => Section::Precedence,
    "Productions" => Section::Productions,
    _ => return None,
  };
  Some((section, rest))
}

/// A line is a header candidate only if it starts a line (after optional
/// leading `#`/whitespace) with one of the five keywords -- this tolerates
/// both ATX markdown headers (`# Patterns STRING`) and bare keyword lines.
fn looks_like_header(line: &str) -> bool {
  header_section(line).is_some()
}

/// Parses `source` into a [GrammarDocument]. Text outside a fenced code
/// block (```` ``` ````) is documentation and is not scanned for content
/// lines, but headers themselves are recognized outside fences so a
/// section boundary does not require being inside a fence.
pub fn parse_document(source: &str) -> GrammarDocument {
  let mut doc = GrammarDocument::default();
  let mut current: Option<Section> = None;
  let mut in_fence = false;
  let mut current_pattern_cond: Option<String> = None;

  for (i, raw_line) in source.lines().enumerate() {
    let line_no = i as u32;
    let trimmed = raw_line.trim();

    if trimmed.starts_with("```") {
      in_fence = !in_fence;
      continue;
    }

    if !in_fence && looks_like_header(trimmed) {
      let (section, rest) = header_section(trimmed).unwrap();
      current = Some(section);
      if section == Section::Patterns {
        current_pattern_cond = if rest.is_empty() { None } else { Some(rest) };
        doc.patterns.push((current_pattern_cond.clone(), Vec::new()));
      } else if section == Section::Productions {
        doc.start_symbols = rest.split_whitespace().map(|s| s.to_string()).collect();
      }
      continue;
    }

    if !in_fence || trimmed.is_empty() {
      continue;
    }

    let Some(section) = current else { continue };
    let entry = Line { text: raw_line.to_string(), line_no };
    match section {
      Section::Definitions => doc.definitions.push(entry),
      Section::Conditions => doc.conditions.push(entry),
      Section::Patterns => {
        if let Some(last) = doc.patterns.last_mut() {
          last.1.push(entry);
        } else {
          doc.patterns.push((None, vec![entry]));
        }
      }
      Section::Precedence => doc.precedence.push(entry),
      Section::Productions => doc.productions.push(entry),
    }
  }

  doc
}

pub(crate) fn line_token(line: &Line) -> Token {
  Token::new(0, line.text.len(), line.line_no, 0, line.text.len() as u32)
}

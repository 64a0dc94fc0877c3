//! Named-subexpression table (the `Definitions` section, spec §6): each
//! `name regex` line is parsed once topologically, so later definitions may
//! reference earlier ones by `{name}`, and a cycle is rejected defensively.
use super::ast::{parse_pattern, Pattern};
use crate::types::{RadlrError, RadlrResult, Token};
use std::collections::{HashMap, HashSet};

/// Expands a `name -> source` table of definitions into resolved [Pattern]s,
/// in dependency order. Detects direct and indirect cycles.
pub fn expand_named_definitions(defs: &[(String, String, Token)], alphabet_max: u32) -> RadlrResult<HashMap<String, Pattern>> {
  let mut resolved: HashMap<String, Pattern> = HashMap::new();
  let mut in_progress: HashSet<String> = HashSet::new();
  let by_name: HashMap<&str, (&str, &Token)> =
    defs.iter().map(|(n, s, t)| (n.as_str(), (s.as_str(), t))).collect();

  fn resolve_one<'a>(
    name: &str,
    by_name: &HashMap<&'a str, (&'a str, &'a Token)>,
    resolved: &mut HashMap<String, Pattern>,
    in_progress: &mut HashSet<String>,
    alphabet_max: u32,
  ) -> RadlrResult<()> {
    if resolved.contains_key(name) {
      return Ok(());
    }
    if in_progress.contains(name) {
      let loc = by_name.get(name).map(|(_, t)| (*t).clone()).unwrap_or_default();
      return Err(RadlrError::UnresolvedNamedSubexpression { loc, name: name.to_string(), recursive: true });
    }
    let (src, loc) = match by_name.get(name) {
      Some(v) => *v,
      None => return Err(RadlrError::UnresolvedNamedSubexpression { loc: Token::empty(), name: name.to_string(), recursive: false }),
    };
    in_progress.insert(name.to_string());
    for dep in referenced_names(src) {
      resolve_one(&dep, by_name, resolved, in_progress, alphabet_max)?;
    }
    let pattern = parse_pattern(src, resolved, alphabet_max)
      .map_err(|e| if let RadlrError::UnresolvedNamedSubexpression { name: n, .. } = &e {
        RadlrError::UnresolvedNamedSubexpression { loc: loc.clone(), name: n.clone(), recursive: false }
      } else {
        e
      })?;
    in_progress.remove(name);
    resolved.insert(name.to_string(), pattern);
    Ok(())
  }

  for (name, _, _) in defs {
    resolve_one(name, &by_name, &mut resolved, &mut in_progress, alphabet_max)?;
  }
  Ok(resolved)
}

/// Scans a raw pattern source for `{name}` references without fully parsing
/// it -- used to build the dependency order before those names are
/// themselves resolved.
fn referenced_names(src: &str) -> Vec<String> {
  let mut out = Vec::new();
  let chars: Vec<char> = src.chars().collect();
  let mut i = 0;
  while i < chars.len() {
    if chars[i] == '\\' {
      i += 2;
      continue;
    }
    if chars[i] == '{' {
      let start = i + 1;
      let mut j = start;
      while j < chars.len() && chars[j] != '}' {
        j += 1;
      }
      if j < chars.len() && chars[start..j].iter().next().map(|c| !c.is_ascii_digit() && *c != ',').unwrap_or(false) {
        out.push(chars[start..j].iter().collect());
      }
      i = j + 1;
      continue;
    }
    i += 1;
  }
  out
}

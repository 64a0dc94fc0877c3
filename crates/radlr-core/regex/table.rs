//! Scanner-table output contract (spec §4.1 "Output contract", §6
//! "Serialized tables" `scanner` object): number of states, per-condition
//! entry points, `delta`, `accept`, and the alphabet map.
use super::{alphabet::AlphabetMap, ast::parse_pattern, dfa, named::expand_named_definitions, nfa::build_nfa};
use crate::types::{RadlrError, RadlrResult, Token};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone)]
pub struct ScanConditionDef {
  pub name:     String,
  pub includes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ScannerRuleDef {
  pub pattern_src: String,
  pub action:      String,
  pub rank:        i32,
  /// Scan-conditions this rule is active in; empty means `INITIAL` only.
  pub conditions:  Vec<String>,
  pub loc:         Token,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptEntry {
  pub rule_id: u32,
  /// Fixed backup length is unknown for trailing-context rules (it is
  /// recovered at scan time from the marker position); `None` there, and
  /// `Some(0)` for ordinary rules.
  pub backup: Option<u32>,
  pub trailing: bool,
  /// The winning rule's rank, carried through from `ScannerRuleDef::rank`
  /// so the runtime can break a later/longer match's tie against an
  /// earlier, higher-ranked one (spec §4.1 "rank breaks ties").
  pub rank: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerTable {
  pub description:  String,
  pub num_states:   u32,
  /// `condition name -> (enter_state, anchored_enter_state)`
  pub initial:      BTreeMap<String, (u32, u32)>,
  /// `delta[state][alphabet_class] = state`, `u32::MAX` = no transition.
  pub delta:        Vec<Vec<u32>>,
  pub accept:       Vec<Option<AcceptEntry>>,
  pub trailing_marker: Vec<bool>,
  /// `code_point -> alphabet class`, expressed as sorted contiguous blocks.
  pub alphabet_blocks: Vec<(u32, u32)>,
  pub action_names: Vec<String>,
  pub rule_actions: Vec<u32>,
}

pub const NO_TRANSITION: u32 = u32::MAX;

impl ScannerTable {
  pub fn alphabet_class_of(&self, code_point: u32) -> Option<u32> {
    self
      .alphabet_blocks
      .binary_search_by(|&(lo, hi)| {
        if code_point < lo {
          std::cmp::Ordering::Greater
        } else if code_point > hi {
          std::cmp::Ordering::Less
        } else {
          std::cmp::Ordering::Equal
        }
      })
      .ok()
      .map(|i| i as u32)
  }

  pub fn step(&self, state: u32, class: u32) -> Option<u32> {
    let next = self.delta[state as usize][class as usize];
    if next == NO_TRANSITION {
      None
    } else {
      Some(next)
    }
  }
}

/// Computes the include-closure of every scan condition: the set of rules
/// active in `cond` is its own rules plus, transitively, those of every
/// condition it `includes`.
fn condition_rule_sets(
  conditions: &[ScanConditionDef],
  rules: &[ScannerRuleDef],
) -> BTreeMap<String, Vec<usize>> {
  let mut direct: BTreeMap<String, Vec<usize>> = BTreeMap::new();
  for (i, rule) in rules.iter().enumerate() {
    let conds = if rule.conditions.is_empty() { vec!["INITIAL".to_string()] } else { rule.conditions.clone() };
    for c in conds {
      direct.entry(c).or_default().push(i);
    }
  }
  let includes: BTreeMap<&str, &[String]> =
    conditions.iter().map(|c| (c.name.as_str(), c.includes.as_slice())).collect();

  let mut out = BTreeMap::new();
  for cond in std::iter::once("INITIAL".to_string()).chain(conditions.iter().map(|c| c.name.clone())) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut stack = vec![cond.clone()];
    let mut rule_set: HashSet<usize> = HashSet::new();
    while let Some(c) = stack.pop() {
      if !seen.insert(c.clone()) {
        continue;
      }
      if let Some(rs) = direct.get(c.as_str()) {
        rule_set.extend(rs.iter().copied());
      }
      if let Some(inc) = includes.get(c.as_str()) {
        stack.extend(inc.iter().cloned());
      }
    }
    let mut v: Vec<usize> = rule_set.into_iter().collect();
    v.sort_unstable();
    out.insert(cond, v);
  }
  out
}

/// Builds the full scanner table from rule/condition/definition source,
/// covering spec §4.1 steps 1-5.
pub fn build_scanner_table(
  conditions: &[ScanConditionDef],
  rules: &[ScannerRuleDef],
  named_defs: &[(String, String, Token)],
  alphabet_max: u32,
) -> RadlrResult<ScannerTable> {
  let named = expand_named_definitions(named_defs, alphabet_max)?;

  let mut action_names: Vec<String> = Vec::new();
  let mut rule_actions: Vec<u32> = Vec::with_capacity(rules.len());
  let mut patterns = Vec::with_capacity(rules.len());
  for (i, rule) in rules.iter().enumerate() {
    let pattern = parse_pattern(&rule.pattern_src, &named, alphabet_max).map_err(|e| match e {
      RadlrError::MalformedPattern { message, .. } => RadlrError::MalformedPattern { loc: rule.loc.clone(), message },
      other => other,
    })?;
    patterns.push((pattern, rule.rank, i as u32));
    let action_id = action_names.iter().position(|n| n == &rule.action).unwrap_or_else(|| {
      action_names.push(rule.action.clone());
      action_names.len() - 1
    });
    rule_actions.push(action_id as u32);
  }

  // Duplicate-pattern/conflicting-rank check (fatal per spec §4.1 failures).
  for i in 0..rules.len() {
    for j in (i + 1)..rules.len() {
      if rules[i].pattern_src == rules[j].pattern_src && rules[i].rank != rules[j].rank {
        return Err(RadlrError::ConflictingRank {
          loc_a: rules[i].loc.clone(),
          loc_b: rules[j].loc.clone(),
          pattern: rules[i].pattern_src.clone(),
        });
      }
    }
  }

  let mut all_classes = Vec::new();
  for (p, _, _) in &patterns {
    collect_classes(p, &mut all_classes);
  }
  let alphabet = AlphabetMap::build(&all_classes, alphabet_max);

  let (nfa, entries) = build_nfa(&patterns, &alphabet);

  let cond_rules = condition_rule_sets(conditions, rules);
  let mut cond_names: Vec<String> = cond_rules.keys().cloned().collect();
  cond_names.sort();

  let mut entry_seeds: Vec<Vec<usize>> = Vec::new();
  let mut entry_meta: Vec<(usize, bool)> = Vec::new(); // (cond index, anchored)
  for (ci, name) in cond_names.iter().enumerate() {
    let rule_idxs = &cond_rules[name];
    let plain: Vec<usize> = rule_idxs.iter().filter(|&&r| !entries[r].requires_bol).map(|&r| entries[r].start).collect();
    let anchored: Vec<usize> = rule_idxs.iter().map(|&r| entries[r].start).collect();
    entry_seeds.push(plain);
    entry_meta.push((ci, false));
    entry_seeds.push(anchored);
    entry_meta.push((ci, true));
  }

  let (dfa, entry_ids) = dfa::subset_construct_multi(&nfa, &entry_seeds, alphabet.num_classes());
  let (dfa, remap) = dfa::minimize(&dfa);
  let entry_ids: Vec<u32> = entry_ids.into_iter().map(|id| remap[id as usize]).collect();

  let mut initial: BTreeMap<String, (u32, u32)> = BTreeMap::new();
  for (k, &(ci, anchored)) in entry_meta.iter().enumerate() {
    let name = &cond_names[ci];
    let entry = initial.entry(name.clone()).or_insert((0, 0));
    if anchored {
      entry.1 = entry_ids[k];
    } else {
      entry.0 = entry_ids[k];
    }
  }

  let num_states = dfa.states.len() as u32;
  let delta: Vec<Vec<u32>> = dfa
    .states
    .iter()
    .map(|s| s.trans.iter().map(|t| t.unwrap_or(NO_TRANSITION)).collect())
    .collect();
  let accept: Vec<Option<AcceptEntry>> = dfa
    .states
    .iter()
    .map(|s| s.accept.map(|a| AcceptEntry { rule_id: a.rule_id, backup: if a.trailing { None } else { Some(0) }, trailing: a.trailing, rank: a.rank }))
    .collect();
  let trailing_marker: Vec<bool> = dfa.states.iter().map(|s| s.is_trailing_marker).collect();

  Ok(ScannerTable {
    description: "radlr scanner table".to_string(),
    num_states,
    initial,
    delta,
    accept,
    trailing_marker,
    alphabet_blocks: alphabet.blocks().to_vec(),
    action_names,
    rule_actions,
  })
}

fn collect_classes(pattern: &super::ast::Pattern, out: &mut Vec<super::charclass::CharClass>) {
  use super::ast::Pattern::*;
  match pattern {
    Class(c) => out.push(c.clone()),
    Concat(ps) | Union(ps) => ps.iter().for_each(|p| collect_classes(p, out)),
    Star(p) | Plus(p) | Optional(p) | AnchorStart(p) | AnchorEnd(p) => collect_classes(p, out),
    Repeat { inner, .. } => collect_classes(inner, out),
    TrailingContext(a, b) => {
      collect_classes(a, out);
      collect_classes(b, out);
    }
    NamedRef(..) | Epsilon => {}
  }
}

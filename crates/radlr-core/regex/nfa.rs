//! Thompson construction (spec §4.1 step 2): builds an NFA with epsilon
//! transitions over the [Pattern] AST, labeling edges by alphabet class
//! rather than raw code point, and tagging accept states with
//! `(rank, rule_id, has_trailing_context)`.
use super::{alphabet::AlphabetMap, ast::Pattern};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accept {
  pub rank:     i32,
  pub rule_id:  u32,
  pub trailing: bool,
}

#[derive(Debug, Default, Clone)]
pub struct NfaState {
  pub eps:               Vec<usize>,
  /// (alphabet class id, destination state)
  pub trans:             Vec<(u32, usize)>,
  pub accept:            Option<Accept>,
  /// Set on the state reached immediately after the `R1` portion of a
  /// `R1/R2` trailing-context rule -- the scanner records the last position
  /// it passed through such a state as the backup target.
  pub is_trailing_marker: bool,
  /// This state may only be entered at the start of a line (spec `^`).
  pub requires_bol:      bool,
}

#[derive(Debug, Default, Clone)]
pub struct Nfa {
  pub states: Vec<NfaState>,
}

impl Nfa {
  fn new_state(&mut self) -> usize {
    self.states.push(NfaState::default());
    self.states.len() - 1
  }
}

/// Per-rule NFA handle: the entry state and whether the rule requires
/// beginning-of-line to match (common-case anchor handling -- see module
/// docs in `DESIGN.md` for the scoping decision on nested anchors).
#[derive(Debug, Clone, Copy)]
pub struct RuleEntry {
  pub start: usize,
  pub requires_bol: bool,
}

/// Strips a leading `^` and/or trailing `$` anchor at the top level of a
/// rule's pattern, translating `$` into trailing context against
/// end-of-line (`\n`) so the ordinary trailing-context machinery handles it.
fn extract_anchors(pattern: Pattern) -> (bool, Pattern) {
  match pattern {
    Pattern::AnchorStart(inner) => {
      let (_, inner) = extract_anchors(*inner);
      (true, inner)
    }
    Pattern::AnchorEnd(inner) => {
      use super::charclass::CharClass;
      let eol = Pattern::Class(CharClass::single('\n' as u32));
      (false, Pattern::TrailingContext(inner, Box::new(eol)))
    }
    Pattern::Concat(mut parts) => {
      let mut bol = false;
      if let Some(first) = parts.first().cloned() {
        if matches!(first, Pattern::AnchorStart(_)) {
          let (b, stripped) = extract_anchors(first);
          bol = b;
          parts[0] = stripped;
        }
      }
      if let Some(last) = parts.last().cloned() {
        if matches!(last, Pattern::AnchorEnd(_)) {
          let idx = parts.len() - 1;
          let (_, stripped) = extract_anchors(last);
          parts[idx] = stripped;
        }
      }
      (bol, Pattern::Concat(parts))
    }
    other => (false, other),
  }
}

/// Builds the shared NFA for every rule in `patterns` (already alphabet-
/// and named-subexpression-resolved), returning one [RuleEntry] per rule in
/// input order.
pub fn build_nfa(patterns: &[(Pattern, i32, u32)], alphabet: &AlphabetMap) -> (Nfa, Vec<RuleEntry>) {
  let mut nfa = Nfa::default();
  let mut entries = Vec::with_capacity(patterns.len());
  for (pattern, rank, rule_id) in patterns {
    let (requires_bol, pattern) = extract_anchors(pattern.clone());
    let (start, end) = build_fragment(&mut nfa, &pattern, alphabet);
    nfa.states[end].accept = Some(Accept { rank: *rank, rule_id: *rule_id, trailing: contains_trailing(&pattern) });
    entries.push(RuleEntry { start, requires_bol });
  }
  (nfa, entries)
}

fn contains_trailing(pattern: &Pattern) -> bool {
  matches!(pattern, Pattern::TrailingContext(..))
}

/// Returns (start, end) for the fragment recognizing `pattern`, where `end`
/// has no outgoing transitions yet (the caller may still tag it as an
/// accept state or chain more fragments after it).
fn build_fragment(nfa: &mut Nfa, pattern: &Pattern, alphabet: &AlphabetMap) -> (usize, usize) {
  match pattern {
    Pattern::Epsilon => {
      let s = nfa.new_state();
      let e = nfa.new_state();
      nfa.states[s].eps.push(e);
      (s, e)
    }
    Pattern::Class(class) => {
      let s = nfa.new_state();
      let e = nfa.new_state();
      for class_id in alphabet.classes_covering(class) {
        nfa.states[s].trans.push((class_id, e));
      }
      (s, e)
    }
    Pattern::Concat(parts) => {
      let mut iter = parts.iter();
      let (mut start, mut end) = match iter.next() {
        Some(p) => build_fragment(nfa, p, alphabet),
        None => return build_fragment(nfa, &Pattern::Epsilon, alphabet),
      };
      for p in iter {
        let (s2, e2) = build_fragment(nfa, p, alphabet);
        nfa.states[end].eps.push(s2);
        end = e2;
      }
      let _ = &mut start;
      (start, end)
    }
    Pattern::Union(alts) => {
      let s = nfa.new_state();
      let e = nfa.new_state();
      for alt in alts {
        let (s2, e2) = build_fragment(nfa, alt, alphabet);
        nfa.states[s].eps.push(s2);
        nfa.states[e2].eps.push(e);
      }
      (s, e)
    }
    Pattern::Star(inner) => {
      let s = nfa.new_state();
      let e = nfa.new_state();
      let (is2, ie2) = build_fragment(nfa, inner, alphabet);
      nfa.states[s].eps.push(is2);
      nfa.states[s].eps.push(e);
      nfa.states[ie2].eps.push(is2);
      nfa.states[ie2].eps.push(e);
      (s, e)
    }
    Pattern::Plus(inner) => {
      let (s, mid) = build_fragment(nfa, inner, alphabet);
      let e = nfa.new_state();
      let (is2, ie2) = build_fragment(nfa, inner, alphabet);
      nfa.states[mid].eps.push(is2);
      nfa.states[mid].eps.push(e);
      nfa.states[ie2].eps.push(is2);
      nfa.states[ie2].eps.push(e);
      (s, e)
    }
    Pattern::Optional(inner) => {
      let s = nfa.new_state();
      let e = nfa.new_state();
      let (is2, ie2) = build_fragment(nfa, inner, alphabet);
      nfa.states[s].eps.push(is2);
      nfa.states[s].eps.push(e);
      nfa.states[ie2].eps.push(e);
      (s, e)
    }
    Pattern::Repeat { inner, min, max } => {
      let mut copies: Vec<Pattern> = Vec::new();
      for _ in 0..*min {
        copies.push((**inner).clone());
      }
      match max {
        Some(max) => {
          for _ in *min..*max {
            copies.push(Pattern::Optional(inner.clone()));
          }
        }
        None => copies.push(Pattern::Star(inner.clone())),
      }
      if copies.is_empty() {
        build_fragment(nfa, &Pattern::Epsilon, alphabet)
      } else {
        build_fragment(nfa, &Pattern::Concat(copies), alphabet)
      }
    }
    Pattern::TrailingContext(lhs, rhs) => {
      let (s, lhs_end) = build_fragment(nfa, lhs, alphabet);
      let marker = nfa.new_state();
      nfa.states[lhs_end].eps.push(marker);
      nfa.states[marker].is_trailing_marker = true;
      let (rhs_start, rhs_end) = build_fragment(nfa, rhs, alphabet);
      nfa.states[marker].eps.push(rhs_start);
      (s, rhs_end)
    }
    // Top-level anchors are stripped by `extract_anchors` before fragments
    // are built; nested occurrences degrade to their inner pattern.
    Pattern::AnchorStart(inner) | Pattern::AnchorEnd(inner) => build_fragment(nfa, inner, alphabet),
    Pattern::NamedRef(_, _) => {
      // Resolved away during named-subexpression expansion; reaching this
      // indicates a caller skipped that pass.
      build_fragment(nfa, &Pattern::Epsilon, alphabet)
    }
  }
}

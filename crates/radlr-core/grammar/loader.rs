//! Converts a parsed [super::document::GrammarDocument] into a [super::model::Grammar]
//! plus scanner rule/condition definitions (spec §6 section grammars), doing
//! symbol interning, macro expansion, and mid-rule-action lifting (spec §4.3)
//! along the way.
use super::{
  document::{line_token, GrammarDocument, Line},
  model::{Assoc, Constructor, Grammar, PrecedenceLevel, Rule},
};
use crate::{
  journal::Nondeterminism,
  regex::{ScanConditionDef, ScannerRuleDef},
  types::{RadlrError, RadlrResult, SymbolId, SymbolTable, Token},
};
use std::collections::{BTreeSet, HashMap};

/// One parsed RHS element: a plain symbol reference, a quoted terminal
/// literal, the `$error$` metatoken, a macro invocation, or an embedded
/// mid-rule action.
#[derive(Debug, Clone)]
enum RawItem {
  Symbol { captured: bool, name: String },
  Literal { captured: bool, text: String },
  Error,
  MacroCall { captured: bool, name: String, args: Vec<String> },
  MidRuleAction(String),
}

#[derive(Debug, Clone)]
struct RawAlt {
  items:      Vec<RawItem>,
  action:     Option<String>,
  prec:       Option<String>,
  loc:        Token,
}

#[derive(Debug, Clone)]
struct RawMacro {
  params: Vec<String>,
  alts:   Vec<RawAlt>,
}

fn tokenize(line: &str) -> Vec<String> {
  let mut out = Vec::new();
  let mut chars = line.chars().peekable();
  while let Some(&c) = chars.peek() {
    if c.is_whitespace() {
      chars.next();
      continue;
    }
    if c == '\'' || c == '"' {
      let quote = c;
      let mut tok = String::new();
      tok.push(chars.next().unwrap());
      while let Some(&c2) = chars.peek() {
        tok.push(c2);
        chars.next();
        if c2 == quote {
          break;
        }
      }
      out.push(tok);
      continue;
    }
    let mut tok = String::new();
    while let Some(&c2) = chars.peek() {
      if c2.is_whitespace() {
        break;
      }
      tok.push(c2);
      chars.next();
    }
    out.push(tok);
  }
  out
}

const ARROW_CHARS: &str = "-=><:";

fn is_arrow(tok: &str) -> bool {
  !tok.is_empty() && tok.chars().all(|c| ARROW_CHARS.contains(c))
}

/// Splits `tokens` on top-level `|` into alternatives, each further split
/// into its RHS items plus trailing `%prec SYM` and `: action` clauses.
fn parse_alts(tokens: &[String], loc: &Token) -> RadlrResult<Vec<RawAlt>> {
  let mut alts = Vec::new();
  let mut cur: Vec<String> = Vec::new();
  let mut groups: Vec<Vec<String>> = Vec::new();
  for tok in tokens {
    if tok == "|" {
      groups.push(std::mem::take(&mut cur));
    } else {
      cur.push(tok.clone());
    }
  }
  groups.push(cur);

  for group in groups {
    let mut items = Vec::new();
    let mut action = None;
    let mut prec = None;
    let mut i = 0;
    while i < group.len() {
      let tok = &group[i];
      if tok == ":" {
        action = group.get(i + 1).cloned();
        i += 2;
        continue;
      }
      if tok == "%prec" {
        prec = group.get(i + 1).cloned();
        i += 2;
        continue;
      }
      if tok.starts_with('{') && tok.ends_with('}') && tok.len() >= 2 {
        items.push(RawItem::MidRuleAction(tok[1..tok.len() - 1].to_string()));
        i += 1;
        continue;
      }
      let captured = tok.starts_with('.');
      let body = if captured { &tok[1..] } else { tok.as_str() };
      if body == "$error$" {
        items.push(RawItem::Error);
      } else if (body.starts_with('\'') && body.ends_with('\'') && body.len() >= 2)
        || (body.starts_with('"') && body.ends_with('"') && body.len() >= 2)
      {
        items.push(RawItem::Literal { captured, text: body[1..body.len() - 1].to_string() });
      } else if let Some(open) = body.find('(') {
        if body.ends_with(')') {
          let name = body[..open].to_string();
          let arglist = &body[open + 1..body.len() - 1];
          let args = arglist.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
          items.push(RawItem::MacroCall { captured, name, args });
        } else {
          return Err(RadlrError::MalformedPattern { loc: loc.clone(), message: format!("malformed macro call `{tok}`") });
        }
      } else {
        items.push(RawItem::Symbol { captured, name: body.to_string() });
      }
      i += 1;
    }
    alts.push(RawAlt { items, action, prec, loc: loc.clone() });
  }
  Ok(alts)
}

struct ParsedProductions {
  macros:      HashMap<String, RawMacro>,
  productions: Vec<(String, Vec<RawAlt>)>,
}

/// Groups the `Productions` section's physical lines into logical rules:
/// a line beginning with an arrow-bearing LHS starts a new production or
/// macro; subsequent lines whose first token is `|` are continuations of
/// the previous alternative list.
fn parse_productions_section(lines: &[Line]) -> RadlrResult<ParsedProductions> {
  let mut macros = HashMap::new();
  let mut productions: Vec<(String, Vec<RawAlt>)> = Vec::new();

  let mut pending: Option<(String, Option<Vec<String>>, Vec<String>, Token)> = None;

  let flush = |pending: Option<(String, Option<Vec<String>>, Vec<String>, Token)>,
               macros: &mut HashMap<String, RawMacro>,
               productions: &mut Vec<(String, Vec<RawAlt>)>|
   -> RadlrResult<()> {
    if let Some((lhs, params, tokens, loc)) = pending {
      let alts = parse_alts(&tokens, &loc)?;
      match params {
        Some(params) => {
          macros.insert(lhs, RawMacro { params, alts });
        }
        None => productions.push((lhs, alts)),
      }
    }
    Ok(())
  };

  for line in lines {
    let toks = tokenize(&line.text);
    if toks.is_empty() {
      continue;
    }
    let loc = line_token(line);
    if toks[0] == "|" {
      if let Some((_, _, acc, _)) = pending.as_mut() {
        acc.push("|".to_string());
        acc.extend(toks[1..].iter().cloned());
      }
      continue;
    }

    // New rule/macro head: `LHS(params)? arrow RHS...`
    flush(pending.take(), &mut macros, &mut productions)?;

    let head = &toks[0];
    let (lhs, params) = if let Some(open) = head.find('(') {
      if head.ends_with(')') {
        let name = head[..open].to_string();
        let params = head[open + 1..head.len() - 1].split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        (name, Some(params))
      } else {
        (head.clone(), None)
      }
    } else {
      (head.clone(), None)
    };

    let arrow_pos = toks.iter().position(|t| is_arrow(t)).unwrap_or(1);
    let rest: Vec<String> = toks.get(arrow_pos + 1..).map(|s| s.to_vec()).unwrap_or_default();
    pending = Some((lhs, params, rest, loc));
  }
  flush(pending, &mut macros, &mut productions)?;

  Ok(ParsedProductions { macros, productions })
}

/// Expands macro calls to fixpoint over a worklist of call-sites, mangling
/// each distinct `(macro, args...)` pair into one fresh non-terminal name
/// defined exactly once (spec §4.3 "Macro expansion").
fn expand_macros(parsed: &ParsedProductions) -> RadlrResult<Vec<(String, Vec<RawAlt>)>> {
  let mut out: Vec<(String, Vec<RawAlt>)> = Vec::new();
  let mut mangled: HashMap<String, ()> = HashMap::new();
  let mut worklist: Vec<(String, Vec<RawAlt>)> = parsed.productions.clone();
  let mut in_progress: BTreeSet<String> = BTreeSet::new();

  fn mangle(name: &str, args: &[String]) -> String {
    if args.is_empty() {
      name.to_string()
    } else {
      format!("{name}${}", args.join("$"))
    }
  }

  fn substitute(item: &RawItem, params: &[String], args: &[String]) -> RawItem {
    match item {
      RawItem::Symbol { captured, name } => {
        if let Some(pos) = params.iter().position(|p| p == name) {
          RawItem::Symbol { captured: *captured, name: args[pos].clone() }
        } else {
          item.clone()
        }
      }
      RawItem::MacroCall { captured, name, args: call_args } => RawItem::MacroCall {
        captured: *captured,
        name: name.clone(),
        args: call_args
          .iter()
          .map(|a| params.iter().position(|p| p == a).map(|pos| args[pos].clone()).unwrap_or_else(|| a.clone()))
          .collect(),
      },
      other => other.clone(),
    }
  }

  while let Some((lhs, alts)) = worklist.pop() {
    let mut new_alts = Vec::with_capacity(alts.len());
    for alt in alts {
      let mut items = Vec::with_capacity(alt.items.len());
      for item in &alt.items {
        if let RawItem::MacroCall { captured, name, args } = item {
          let key = mangle(name, args);
          if in_progress.contains(&key) {
            return Err(RadlrError::MacroError { loc: alt.loc.clone(), message: format!("macro expansion cycle through `{key}`") });
          }
          let def = parsed
            .macros
            .get(name)
            .ok_or_else(|| RadlrError::MacroError { loc: alt.loc.clone(), message: format!("undefined macro `{name}`") })?;
          if def.params.len() != args.len() {
            return Err(RadlrError::MacroError {
              loc: alt.loc.clone(),
              message: format!("macro `{name}` expects {} argument(s), got {}", def.params.len(), args.len()),
            });
          }
          if !mangled.contains_key(&key) {
            mangled.insert(key.clone(), ());
            in_progress.insert(key.clone());
            let substituted: Vec<RawAlt> = def
              .alts
              .iter()
              .map(|a| RawAlt {
                items: a.items.iter().map(|i| substitute(i, &def.params, args)).collect(),
                action: a.action.clone(),
                prec: a.prec.clone(),
                loc: a.loc.clone(),
              })
              .collect();
            worklist.push((key.clone(), substituted));
            in_progress.remove(&key);
          }
          items.push(RawItem::Symbol { captured: *captured, name: key });
        } else {
          items.push(item.clone());
        }
      }
      new_alts.push(RawAlt { items, action: alt.action.clone(), prec: alt.prec.clone(), loc: alt.loc.clone() });
    }
    out.push((lhs, new_alts));
  }
  Ok(out)
}

struct Builder {
  symbols:          SymbolTable,
  rules:            Vec<Rule>,
  mid_rule_counter: u32,
}

impl Builder {
  fn nt(&mut self, name: &str) -> SymbolId {
    self.symbols.intern_non_terminal(name)
  }

  fn lower_alt(&mut self, lhs: u32, alt: &RawAlt) -> RadlrResult<()> {
    let mut rhs = Vec::new();
    let mut capture_mask = Vec::new();
    let mut single_captured: Option<usize> = None;

    for item in &alt.items {
      match item {
        RawItem::Symbol { captured, name } => {
          let sym = if let Some(existing) = self.symbols.lookup(name) {
            existing
          } else if looks_like_terminal(name) {
            self.symbols.intern_terminal(name)
          } else {
            self.nt(name)
          };
          if *captured {
            single_captured = Some(rhs.len());
          }
          capture_mask.push(*captured);
          rhs.push(sym);
        }
        RawItem::Literal { captured, text } => {
          let sym = self.symbols.intern_terminal(text);
          if *captured {
            single_captured = Some(rhs.len());
          }
          capture_mask.push(*captured);
          rhs.push(sym);
        }
        RawItem::Error => {
          capture_mask.push(false);
          rhs.push(SymbolId::Error);
        }
        RawItem::MacroCall { .. } => unreachable!("macro calls are resolved before lowering"),
        RawItem::MidRuleAction(name) => {
          // Lift to a fresh epsilon non-terminal carrying the action, whose
          // single rule sees the RHS prefix built so far (spec §4.3).
          let fresh_name = format!("$mid_rule_{}", self.mid_rule_counter);
          self.mid_rule_counter += 1;
          let fresh = self.nt(&fresh_name);
          self.rules.push(Rule {
            lhs: fresh.as_non_terminal().unwrap(),
            rhs: Vec::new(),
            capture_mask: Vec::new(),
            constructor: Constructor::Message(name.clone()),
            precedence: None,
            line: alt.loc.line_start,
          });
          capture_mask.push(false);
          rhs.push(fresh);
        }
      }
    }

    let captured_positions: Vec<usize> = capture_mask.iter().enumerate().filter_map(|(i, &c)| c.then_some(i)).collect();
    let constructor = match (&alt.action, captured_positions.len()) {
      (Some(name), _) => Constructor::Message(name.clone()),
      (None, 1) => Constructor::StackOffset(single_captured.unwrap_or(captured_positions[0])),
      (None, _) => Constructor::DefaultTuple,
    };

    let precedence = alt.prec.as_ref().map(|p| self.symbols.intern_terminal(p));

    self.rules.push(Rule { lhs, rhs, capture_mask, constructor, precedence, line: alt.loc.line_start });
    Ok(())
  }
}

fn looks_like_terminal(name: &str) -> bool {
  name.chars().next().map(|c| c.is_uppercase() || !c.is_alphabetic()).unwrap_or(false)
}

/// Parses `Precedence` section lines: `%left|%right|%nonassoc|%bogus sym...`,
/// `%void sym...`, `%method LALR|CLR|LR1`, `%nondeterministic [sym...]`.
fn load_precedence(
  lines: &[Line],
  symbols: &mut SymbolTable,
) -> RadlrResult<(Vec<PrecedenceLevel>, HashMap<SymbolId, usize>, BTreeSet<SymbolId>, Option<String>, Nondeterminism)> {
  let mut levels = Vec::new();
  let mut terminal_precedence = HashMap::new();
  let mut void_symbols = BTreeSet::new();
  let mut method = None;
  let mut nondeterminism = Nondeterminism::Deterministic;

  for line in lines {
    let toks = tokenize(&line.text);
    if toks.is_empty() {
      continue;
    }
    match toks[0].as_str() {
      "%left" | "%right" | "%nonassoc" | "%bogus" => {
        let assoc = match toks[0].as_str() {
          "%left" => Assoc::Left,
          "%right" => Assoc::Right,
          "%nonassoc" => Assoc::NonAssoc,
          _ => Assoc::Bogus,
        };
        let level = levels.len();
        levels.push(PrecedenceLevel { assoc });
        for name in &toks[1..] {
          let sym = symbols.intern_terminal(name.trim_matches('\''));
          terminal_precedence.insert(sym, level);
        }
      }
      "%void" => {
        for name in &toks[1..] {
          void_symbols.insert(symbols.intern_non_terminal(name));
        }
      }
      "%method" => {
        method = toks.get(1).cloned();
      }
      "%nondeterministic" => {
        if toks.len() == 1 {
          nondeterminism = Nondeterminism::All;
        } else {
          nondeterminism = Nondeterminism::Only(toks[1..].iter().map(|n| symbols.intern_non_terminal(n).as_non_terminal().unwrap()).collect());
        }
      }
      _ => {}
    }
  }
  Ok((levels, terminal_precedence, void_symbols, method, nondeterminism))
}

/// Parses the `Definitions` section (`name regex`) into `(name, source,
/// loc)` triples ready for [crate::regex::named::expand_named_definitions].
fn load_definitions(lines: &[Line]) -> Vec<(String, String, Token)> {
  lines
    .iter()
    .filter_map(|line| {
      let trimmed = line.text.trim();
      let mut parts = trimmed.splitn(2, char::is_whitespace);
      let name = parts.next()?.to_string();
      let src = parts.next()?.trim().to_string();
      Some((name, src, line_token(line)))
    })
    .collect()
}

fn load_conditions(lines: &[Line]) -> Vec<ScanConditionDef> {
  lines
    .iter()
    .filter_map(|line| {
      let toks = tokenize(&line.text);
      let name = toks.first()?.clone();
      let includes = toks.get(1..).map(|s| s.to_vec()).unwrap_or_default();
      Some(ScanConditionDef { name, includes })
    })
    .collect()
}

/// Parses one `Patterns [condition]` section's lines: `regex action
/// [:rank]`, with a bare `|` meaning "same action as the next line".
fn load_patterns(cond: &Option<String>, lines: &[Line]) -> RadlrResult<Vec<ScannerRuleDef>> {
  let mut out = Vec::new();
  let mut pending_same_action: Vec<usize> = Vec::new();
  for line in lines {
    let trimmed = line.text.trim();
    if trimmed == "|" {
      pending_same_action.push(out.len());
      out.push(ScannerRuleDef { pattern_src: String::new(), action: String::new(), rank: 0, conditions: cond.clone().into_iter().collect(), loc: line_token(line) });
      continue;
    }
    let toks = tokenize(trimmed);
    if toks.is_empty() {
      continue;
    }
    let pattern_src = toks[0].clone();
    let mut action = String::new();
    let mut rank = 0i32;
    let mut i = 1;
    while i < toks.len() {
      if let Some(stripped) = toks[i].strip_prefix(':') {
        if let Ok(r) = stripped.parse::<i32>() {
          rank = r;
        } else {
          action = if action.is_empty() { stripped.to_string() } else { format!("{action} {stripped}") };
        }
      } else if toks[i].starts_with(':') {
        action = toks[i][1..].to_string();
      } else {
        action = if action.is_empty() { toks[i].clone() } else { format!("{action} {}", toks[i]) };
      }
      i += 1;
    }
    out.push(ScannerRuleDef { pattern_src, action, rank, conditions: cond.clone().into_iter().collect(), loc: line_token(line) });
  }
  // Resolve `|` placeholders to the action of the following concrete rule.
  for &idx in &pending_same_action {
    if let Some(next) = out.get(idx + 1).cloned() {
      out[idx].pattern_src = out[idx].pattern_src.clone();
      out[idx].action = next.action.clone();
      out[idx].rank = next.rank;
    }
  }
  Ok(out)
}

pub struct LoadedDocument {
  pub grammar:     Grammar,
  pub conditions:  Vec<ScanConditionDef>,
  pub scan_rules:  Vec<ScannerRuleDef>,
  pub named_defs:  Vec<(String, String, Token)>,
  pub method:      Option<String>,
}

/// Top-level entry: turns a [GrammarDocument] into a [Grammar] plus the
/// scanner's rule/condition/definition inputs.
pub fn load_document(doc: &GrammarDocument) -> RadlrResult<LoadedDocument> {
  let mut symbols = SymbolTable::new();
  let (levels, terminal_precedence, void_symbols, method, nondeterminism) = load_precedence(&doc.precedence, &mut symbols)?;

  let parsed = parse_productions_section(&doc.productions)?;
  let expanded = expand_macros(&parsed)?;

  let mut builder = Builder { symbols, rules: Vec::new(), mid_rule_counter: 0 };
  let mut start_symbols = Vec::new();
  for (lhs_name, alts) in &expanded {
    let lhs = builder.nt(lhs_name).as_non_terminal().unwrap();
    for alt in alts {
      builder.lower_alt(lhs, alt)?;
    }
  }
  for name in &doc.start_symbols {
    start_symbols.push(builder.nt(name).as_non_terminal().unwrap());
  }

  let grammar = Grammar {
    symbols: builder.symbols,
    rules: builder.rules,
    start_symbols,
    precedence_levels: levels,
    terminal_precedence,
    nondeterminism,
    void_symbols,
  };
  grammar.validate_static()?;

  let named_defs = load_definitions(&doc.definitions);
  let conditions = load_conditions(&doc.conditions);
  let mut scan_rules = Vec::new();
  for (cond, lines) in &doc.patterns {
    scan_rules.extend(load_patterns(cond, lines)?);
  }

  Ok(LoadedDocument { grammar, conditions, scan_rules, named_defs, method })
}

//! The deterministic shift-reduce driver (spec §4.6): `feed`/`finish` over a
//! [ParseTable], combined shift-reduce instructions, `$error$`-production
//! recovery with a trial-parse commit threshold and a post-recovery
//! quiescence window, and expected-token reporting.
use crate::types::AstSlot;
use radlr_core::{
  grammar::Constructor,
  lr::{Action, ParseTable},
  types::{RadlrError, SymbolId, Token},
};
use std::collections::HashMap;

/// A named reduction handler, invoked for `Constructor::Message(name)`
/// rules (spec §3 "constructor key"). Receives the RHS slots in order and
/// the combined span, returns the reduced value.
pub type Handler<T> = fn(&mut [AstSlot<T>], Token) -> T;

/// Builds the value for a `Constructor::DefaultTuple` rule from its
/// captured positions, in RHS order.
pub type DefaultTupleHandler<T> = fn(Vec<T>, Token) -> T;

/// The application-supplied mapping from constructor message names to
/// handler functions, grounded on the teacher's `ReduceFunction<T>` table
/// (`sherpa-rust-rt/types/ast.rs`) but keyed by name instead of state
/// address, since this workspace has no bytecode state table to address
/// into.
#[derive(Default)]
pub struct HandlerTable<T> {
  handlers:      HashMap<String, Handler<T>>,
  default_tuple: Option<DefaultTupleHandler<T>>,
}

impl<T> HandlerTable<T> {
  pub fn new() -> Self {
    Self { handlers: HashMap::new(), default_tuple: None }
  }

  pub fn register(&mut self, name: &str, handler: Handler<T>) {
    self.handlers.insert(name.to_string(), handler);
  }

  pub fn set_default_tuple(&mut self, handler: DefaultTupleHandler<T>) {
    self.default_tuple = Some(handler);
  }

  fn call(&self, name: &str, slots: &mut [AstSlot<T>], span: Token) -> Result<T, RadlrError> {
    let handler = self.handlers.get(name).ok_or_else(|| RadlrError::UnknownHandler { name: name.to_string() })?;
    Ok(handler(slots, span))
  }

  fn call_default_tuple(&self, captured: Vec<T>, span: Token) -> Result<T, RadlrError> {
    let handler = self.default_tuple.ok_or_else(|| RadlrError::UnknownHandler { name: "$default_tuple".to_string() })?;
    Ok(handler(captured, span))
  }
}

struct StackEntry<T> {
  state: usize,
  slot:  AstSlot<T>,
  span:  Token,
}

/// Drives one parse of a token stream to completion. Not reentrant across
/// parses -- construct one per parse.
pub struct Driver<'t, T> {
  table:    &'t ParseTable,
  handlers: &'t HandlerTable<T>,
  stack:    Vec<StackEntry<T>>,

  trial_parse_commit_threshold: usize,
  quiescence_window:            usize,

  /// Set after an `$error$` production has been shifted; further tokens
  /// are discarded until one can actually be shifted/reduced (spec §4.6
  /// "resynchronization").
  discarding:             bool,
  /// Tokens successfully consumed since the last recovery, counted toward
  /// `trial_parse_commit_threshold` before the recovery is considered safe.
  consumed_since_recovery: usize,
  /// Tokens remaining in the post-recovery quiescence window, during which
  /// further errors are recorded but not reported (spec §4.6, §7).
  quiet_budget:           usize,
  diagnostics:            Vec<RadlrError>,
}

impl<'t, T: Clone> Driver<'t, T> {
  pub fn new(table: &'t ParseTable, handlers: &'t HandlerTable<T>, start_symbol: u32) -> Result<Self, RadlrError> {
    Self::with_recovery_config(table, handlers, start_symbol, 3, 3)
  }

  pub fn with_recovery_config(
    table: &'t ParseTable,
    handlers: &'t HandlerTable<T>,
    start_symbol: u32,
    trial_parse_commit_threshold: usize,
    quiescence_window: usize,
  ) -> Result<Self, RadlrError> {
    let state = *table
      .initial
      .get(&start_symbol)
      .ok_or_else(|| RadlrError::Text(format!("no initial state for start symbol {start_symbol}")))?;
    Ok(Self {
      table,
      handlers,
      stack: vec![StackEntry { state, slot: AstSlot::None, span: Token::empty() }],
      trial_parse_commit_threshold,
      quiescence_window,
      discarding: false,
      consumed_since_recovery: 0,
      quiet_budget: 0,
      diagnostics: Vec::new(),
    })
  }

  /// Diagnostics recorded during recoverable errors (parsing continued past
  /// them). Non-empty does not mean the parse ultimately failed.
  pub fn diagnostics(&self) -> &[RadlrError] {
    &self.diagnostics
  }

  fn current_state(&self) -> usize {
    self.stack.last().expect("parse stack never empties").state
  }

  fn expected_terminals(&self, state: usize) -> Vec<String> {
    self.table.states[state].action.keys().map(|s| format!("{s}")).collect()
  }

  fn reduce(&mut self, rule: usize) -> Result<(), RadlrError> {
    let info = &self.table.rules[rule];
    let mut popped = Vec::with_capacity(info.rhs_len);
    for _ in 0..info.rhs_len {
      popped.push(self.stack.pop().expect("rule shorter than remaining stack"));
    }
    popped.reverse();
    let span = popped.iter().fold(Token::empty(), |acc, e| acc.combine(&e.span));

    let mut slots: Vec<AstSlot<T>> = popped.into_iter().map(|e| e.slot).collect();
    let value = match &info.constructor {
      Constructor::Message(name) => self.handlers.call(name, &mut slots, span.clone())?,
      Constructor::StackOffset(i) => match slots.get(*i) {
        Some(AstSlot::Value(v)) => v.clone(),
        _ => return Err(RadlrError::Text(format!("rule {rule} stack-offset slot {i} carries no value"))),
      },
      Constructor::DefaultTuple => {
        let captured: Vec<T> = info
          .captured_offsets
          .iter()
          .filter_map(|&i| slots.get(i).and_then(|s| match s {
            AstSlot::Value(v) => Some(v.clone()),
            _ => None,
          }))
          .collect();
        self.handlers.call_default_tuple(captured, span.clone())?
      }
    };

    let goto_from = self.current_state();
    let target = self
      .table
      .goto(goto_from, info.lhs)
      .ok_or_else(|| RadlrError::Text(format!("missing goto for non-terminal {}", info.lhs)))?;
    self.stack.push(StackEntry { state: target, slot: AstSlot::Value(value), span });
    Ok(())
  }

  fn note_progress(&mut self) {
    if self.discarding {
      return;
    }
    if self.consumed_since_recovery < self.trial_parse_commit_threshold {
      self.consumed_since_recovery += 1;
    }
    self.quiet_budget = self.quiet_budget.saturating_sub(1);
  }

  /// Pops stack frames looking for a state with a shift action on the
  /// `$error$` metatoken, shifts it, and enters discard mode. Returns an
  /// error only when no `$error$` production is reachable at all.
  fn begin_recovery(&mut self, symbol: SymbolId, token_text: Token) -> Result<(), RadlrError> {
    if self.quiet_budget == 0 {
      self.diagnostics.push(RadlrError::UnexpectedToken {
        expected: self.expected_terminals(self.current_state()),
        found: format!("{symbol}"),
        loc: token_text,
      });
      self.quiet_budget = self.quiescence_window;
    }

    let mut depth = self.stack.len();
    while depth > 0 {
      depth -= 1;
      if let Some(Action::Shift { target }) = self.table.action(self.stack[depth].state, SymbolId::Error) {
        let target = *target;
        self.stack.truncate(depth + 1);
        self.stack.push(StackEntry { state: target, slot: AstSlot::None, span: Token::empty() });
        self.discarding = true;
        self.consumed_since_recovery = 0;
        return Ok(());
      }
    }

    Err(RadlrError::UnexpectedToken { expected: self.expected_terminals(self.current_state()), found: format!("{symbol}"), loc: Token::empty() })
  }

  /// Feeds one scanned token through shift/reduce steps until it has been
  /// consumed, possibly after several reductions, or silently swallowed
  /// while resynchronizing after a recorded error.
  pub fn feed(&mut self, symbol: SymbolId, token_text: Token, raw: Option<T>) -> Result<(), RadlrError> {
    if self.discarding {
      match self.table.action(self.current_state(), symbol) {
        Some(Action::Error) | None => return Ok(()), // still resynchronizing; drop this token
        _ => self.discarding = false,
      }
    }

    loop {
      let state = self.current_state();
      match self.table.action(state, symbol).cloned() {
        Some(Action::Shift { target }) => {
          let slot = raw.clone().map(AstSlot::Value).unwrap_or_else(|| AstSlot::Token(token_text.clone()));
          self.stack.push(StackEntry { state: target, slot, span: token_text });
          self.note_progress();
          return Ok(());
        }
        Some(Action::ShiftReduce { target, rule }) => {
          let slot = raw.clone().map(AstSlot::Value).unwrap_or_else(|| AstSlot::Token(token_text.clone()));
          self.stack.push(StackEntry { state: target, slot, span: token_text.clone() });
          self.reduce(rule)?;
          self.note_progress();
          return Ok(());
        }
        Some(Action::Reduce { rule }) => {
          self.reduce(rule)?;
          continue;
        }
        Some(Action::Accept) => return Ok(()),
        Some(Action::Error) | None => return self.begin_recovery(symbol, token_text),
      }
    }
  }

  /// Completes the parse: feeds end-of-input and pops the accepting value.
  pub fn finish(mut self) -> Result<T, RadlrError> {
    self.feed(SymbolId::EndOfInput, Token::empty(), None)?;
    loop {
      let state = self.current_state();
      match self.table.action(state, SymbolId::EndOfInput).cloned() {
        Some(Action::Accept) => break,
        Some(Action::Reduce { rule }) => self.reduce(rule)?,
        _ => return Err(RadlrError::UnexpectedEndOfInput { expected: self.expected_terminals(state) }),
      }
    }
    let top = self.stack.pop().ok_or_else(|| RadlrError::Text("empty parse stack at accept".to_string()))?;
    top.slot.into_value().ok_or_else(|| RadlrError::Text("accepted state carries no value".to_string()))
  }
}

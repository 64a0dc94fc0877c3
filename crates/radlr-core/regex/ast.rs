//! Pattern syntax (spec §4.1): union, concatenation, Kleene star/plus/
//! optional, counted repetition, character classes with `&&`/`^`, named
//! subexpressions, trailing context, and line anchors.
use super::charclass::{named_posix_class, CharClass};
use crate::types::{RadlrError, RadlrResult, Token};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub enum Pattern {
  Class(CharClass),
  Concat(Vec<Pattern>),
  Union(Vec<Pattern>),
  Star(Box<Pattern>),
  Plus(Box<Pattern>),
  Optional(Box<Pattern>),
  Repeat { inner: Box<Pattern>, min: u32, max: Option<u32> },
  /// `{name}` -- resolved against the named-subexpression table before NFA
  /// construction; never survives into the expanded AST.
  NamedRef(String, Token),
  /// `R1/R2` -- `R1` is matched, then `R2` must follow, but only `R1` is
  /// consumed as the lexeme (backed up at accept).
  TrailingContext(Box<Pattern>, Box<Pattern>),
  AnchorStart(Box<Pattern>),
  AnchorEnd(Box<Pattern>),
  Epsilon,
}

struct Parser<'a> {
  chars:       Vec<char>,
  pos:         usize,
  named:       &'a HashMap<String, Pattern>,
  alphabet_max: u32,
}

/// Parses a pattern source string into a [Pattern] AST, expanding `{name}`
/// references against `named` as it goes (one-pass; recursion through
/// `named` is rejected by the caller before this function is invoked, see
/// [super::expand::check_acyclic]).
pub fn parse_pattern(src: &str, named: &HashMap<String, Pattern>, alphabet_max: u32) -> RadlrResult<Pattern> {
  let mut p = Parser { chars: src.chars().collect(), pos: 0, named, alphabet_max };
  let pat = p.parse_trailing_context()?;
  if p.pos != p.chars.len() {
    return Err(RadlrError::MalformedPattern { loc: Token::empty(), message: format!("unexpected trailing input at column {}", p.pos) });
  }
  Ok(pat)
}

impl<'a> Parser<'a> {
  fn peek(&self) -> Option<char> {
    self.chars.get(self.pos).copied()
  }

  fn bump(&mut self) -> Option<char> {
    let c = self.peek();
    if c.is_some() {
      self.pos += 1;
    }
    c
  }

  fn eat(&mut self, c: char) -> bool {
    if self.peek() == Some(c) {
      self.pos += 1;
      true
    } else {
      false
    }
  }

  fn err(&self, message: impl Into<String>) -> RadlrError {
    RadlrError::MalformedPattern { loc: Token::empty(), message: message.into() }
  }

  // R1/R2
  fn parse_trailing_context(&mut self) -> RadlrResult<Pattern> {
    let lhs = self.parse_union()?;
    if self.eat('/') {
      let rhs = self.parse_union()?;
      Ok(Pattern::TrailingContext(Box::new(lhs), Box::new(rhs)))
    } else {
      Ok(lhs)
    }
  }

  // union: concat ('|' concat)*
  fn parse_union(&mut self) -> RadlrResult<Pattern> {
    let mut alts = vec![self.parse_concat()?];
    while self.eat('|') {
      alts.push(self.parse_concat()?);
    }
    if alts.len() == 1 {
      Ok(alts.pop().unwrap())
    } else {
      Ok(Pattern::Union(alts))
    }
  }

  fn parse_concat(&mut self) -> RadlrResult<Pattern> {
    let mut seq = Vec::new();
    while let Some(c) = self.peek() {
      if c == '|' || c == ')' || c == '/' {
        break;
      }
      seq.push(self.parse_postfix()?);
    }
    if seq.is_empty() {
      Ok(Pattern::Epsilon)
    } else if seq.len() == 1 {
      Ok(seq.pop().unwrap())
    } else {
      Ok(Pattern::Concat(seq))
    }
  }

  fn parse_postfix(&mut self) -> RadlrResult<Pattern> {
    let mut atom = self.parse_atom()?;
    loop {
      match self.peek() {
        Some('*') => {
          self.bump();
          atom = Pattern::Star(Box::new(atom));
        }
        Some('+') => {
          self.bump();
          atom = Pattern::Plus(Box::new(atom));
        }
        Some('?') => {
          self.bump();
          atom = Pattern::Optional(Box::new(atom));
        }
        Some('{') if self.looks_like_repeat() => {
          let (min, max) = self.parse_counted_repeat()?;
          atom = Pattern::Repeat { inner: Box::new(atom), min, max };
        }
        _ => break,
      }
    }
    Ok(atom)
  }

  fn looks_like_repeat(&self) -> bool {
    // `{m,n}` vs `{name}` -- a counted repeat starts with a digit or comma.
    matches!(self.chars.get(self.pos + 1), Some(c) if c.is_ascii_digit() || *c == ',')
  }

  fn parse_counted_repeat(&mut self) -> RadlrResult<(u32, Option<u32>)> {
    self.eat('{');
    let min = self.parse_uint()?;
    let max = if self.eat(',') {
      if self.peek() == Some('}') {
        None
      } else {
        Some(self.parse_uint()?)
      }
    } else {
      Some(min)
    };
    if !self.eat('}') {
      return Err(self.err("expected `}` to close counted repetition"));
    }
    Ok((min, max))
  }

  fn parse_uint(&mut self) -> RadlrResult<u32> {
    let start = self.pos;
    while self.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) {
      self.pos += 1;
    }
    if start == self.pos {
      return Err(self.err("expected a number"));
    }
    self.chars[start..self.pos].iter().collect::<String>().parse::<u32>().map_err(|_| self.err("malformed integer"))
  }

  fn parse_atom(&mut self) -> RadlrResult<Pattern> {
    match self.peek() {
      Some('(') => {
        self.bump();
        let inner = self.parse_union()?;
        if !self.eat(')') {
          return Err(self.err("expected `)`"));
        }
        Ok(inner)
      }
      Some('[') => self.parse_class(),
      Some('{') => {
        self.bump();
        let start = self.pos;
        while self.peek().map(|c| c != '}').unwrap_or(false) {
          self.pos += 1;
        }
        let name: String = self.chars[start..self.pos].iter().collect();
        if !self.eat('}') {
          return Err(self.err("expected `}` to close named reference"));
        }
        match self.named.get(&name) {
          Some(pat) => Ok(pat.clone()),
          None => Err(RadlrError::UnresolvedNamedSubexpression { loc: Token::empty(), name, recursive: false }),
        }
      }
      Some('^') => {
        self.bump();
        let inner = self.parse_postfix_in_anchor()?;
        Ok(Pattern::AnchorStart(Box::new(inner)))
      }
      Some('$') => {
        self.bump();
        Ok(Pattern::AnchorEnd(Box::new(Pattern::Epsilon)))
      }
      Some('.') => {
        self.bump();
        Ok(Pattern::Class(CharClass::range(0, self.alphabet_max).difference(&CharClass::single('\n' as u32))))
      }
      Some('\\') => {
        self.bump();
        self.parse_escape()
      }
      Some(c) => {
        self.bump();
        Ok(Pattern::Class(CharClass::single(c as u32)))
      }
      None => Err(self.err("unexpected end of pattern")),
    }
  }

  // After a leading `^`, an end anchor consumes the remainder up to `|`/`)`.
  fn parse_postfix_in_anchor(&mut self) -> RadlrResult<Pattern> {
    self.parse_concat()
  }

  fn parse_escape(&mut self) -> RadlrResult<Pattern> {
    match self.bump() {
      Some('d') => Ok(Pattern::Class(named_posix_class("digit").unwrap())),
      Some('D') => Ok(Pattern::Class(named_posix_class("digit").unwrap().negate(self.alphabet_max))),
      Some('w') => Ok(Pattern::Class(named_posix_class("alnum").unwrap().union(&CharClass::single('_' as u32)))),
      Some('W') => Ok(Pattern::Class(named_posix_class("alnum").unwrap().union(&CharClass::single('_' as u32)).negate(self.alphabet_max))),
      Some('s') => Ok(Pattern::Class(named_posix_class("space").unwrap())),
      Some('S') => Ok(Pattern::Class(named_posix_class("space").unwrap().negate(self.alphabet_max))),
      Some('n') => Ok(Pattern::Class(CharClass::single('\n' as u32))),
      Some('t') => Ok(Pattern::Class(CharClass::single('\t' as u32))),
      Some('r') => Ok(Pattern::Class(CharClass::single('\r' as u32))),
      Some(c) => Ok(Pattern::Class(CharClass::single(c as u32))),
      None => Err(self.err("dangling escape at end of pattern")),
    }
  }

  // [a-z], [^a-z], [a-z&&[^aeiou]]
  fn parse_class(&mut self) -> RadlrResult<Pattern> {
    self.eat('[');
    let negate = self.eat('^');
    let mut class = CharClass::empty();
    while self.peek().map(|c| c != ']').unwrap_or(false) {
      if self.peek() == Some(':') {
        // [:alpha:]-style posix class inside a bracket expression.
        self.bump();
        let start = self.pos;
        while self.peek().map(|c| c != ':').unwrap_or(false) {
          self.pos += 1;
        }
        let name: String = self.chars[start..self.pos].iter().collect();
        self.eat(':');
        match named_posix_class(&name) {
          Some(c) => class = class.union(&c),
          None => return Err(self.err(format!("unknown posix class [:{name}:]"))),
        }
        continue;
      }
      if self.peek() == Some('&') && self.chars.get(self.pos + 1) == Some(&'&') {
        self.pos += 2;
        let rhs = self.parse_bracket_operand()?;
        class = class.intersect(&rhs);
        continue;
      }
      let lo = self.parse_class_char()?;
      let range = if self.peek() == Some('-') && self.chars.get(self.pos + 1) != Some(&']') {
        self.bump();
        let hi = self.parse_class_char()?;
        CharClass::range(lo, hi)
      } else {
        CharClass::single(lo)
      };
      class = class.union(&range);
    }
    if !self.eat(']') {
      return Err(self.err("expected `]` to close character class"));
    }
    // `class&&[^other]` difference idiom, and a standalone `^` after `&&`.
    if self.eat('^') {
      let rhs = self.parse_bracket_operand()?;
      class = class.difference(&rhs);
    }
    if negate {
      class = class.negate(self.alphabet_max);
    }
    Ok(Pattern::Class(class))
  }

  fn parse_bracket_operand(&mut self) -> RadlrResult<CharClass> {
    match self.parse_class()? {
      Pattern::Class(c) => Ok(c),
      _ => unreachable!("parse_class always yields Pattern::Class"),
    }
  }

  fn parse_class_char(&mut self) -> RadlrResult<u32> {
    match self.bump() {
      Some('\\') => match self.bump() {
        Some('n') => Ok('\n' as u32),
        Some('t') => Ok('\t' as u32),
        Some('r') => Ok('\r' as u32),
        Some(c) => Ok(c as u32),
        None => Err(self.err("dangling escape in character class")),
      },
      Some(c) => Ok(c as u32),
      None => Err(self.err("unterminated character class")),
    }
  }
}

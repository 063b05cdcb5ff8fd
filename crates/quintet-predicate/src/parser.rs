use std::fmt;
use std::str::FromStr;

use crate::error::PredicateError;

/// A constant operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Number(f64),
  String(String),
  Bool(bool),
}

impl Value {
  pub(crate) fn type_name(&self) -> &'static str {
    match self {
      Value::Number(_) => "number",
      Value::String(_) => "string",
      Value::Bool(_) => "boolean",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
  Eq,
  Ne,
  Lt,
  Le,
  Gt,
  Ge,
}

impl fmt::Display for CompareOp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let symbol = match self {
      CompareOp::Eq => "==",
      CompareOp::Ne => "!=",
      CompareOp::Lt => "<",
      CompareOp::Le => "<=",
      CompareOp::Gt => ">",
      CompareOp::Ge => ">=",
    };
    f.write_str(symbol)
  }
}

/// Parsed predicate expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
  Literal(Value),
  /// Dotted lookup into the case data, e.g. `order.total`.
  Path(Vec<String>),
  Compare {
    op: CompareOp,
    left: Box<Expr>,
    right: Box<Expr>,
  },
  Not(Box<Expr>),
  And(Box<Expr>, Box<Expr>),
  Or(Box<Expr>, Box<Expr>),
}

impl Expr {
  /// Parse an expression, rejecting trailing input.
  pub fn parse(source: &str) -> Result<Expr, PredicateError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
      tokens,
      pos: 0,
      end: source.len(),
    };
    let expr = parser.or()?;
    match parser.peek() {
      None => Ok(expr),
      Some(token) => Err(syntax(token.offset, format!("unexpected {}", token.kind))),
    }
  }

  /// Variables referenced by the expression, as dotted paths.
  pub fn variables(&self) -> Vec<String> {
    let mut out = Vec::new();
    self.collect_variables(&mut out);
    out.sort();
    out.dedup();
    out
  }

  fn collect_variables(&self, out: &mut Vec<String>) {
    match self {
      Expr::Literal(_) => {}
      Expr::Path(segments) => out.push(segments.join(".")),
      Expr::Compare { left, right, .. } | Expr::And(left, right) | Expr::Or(left, right) => {
        left.collect_variables(out);
        right.collect_variables(out);
      }
      Expr::Not(inner) => inner.collect_variables(out),
    }
  }
}

impl FromStr for Expr {
  type Err = PredicateError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Expr::parse(s)
  }
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
  Number(f64),
  Str(String),
  Ident(String),
  Op(CompareOp),
  And,
  Or,
  Not,
  Dot,
  LParen,
  RParen,
}

impl fmt::Display for TokenKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TokenKind::Number(n) => write!(f, "number {}", n),
      TokenKind::Str(s) => write!(f, "string {:?}", s),
      TokenKind::Ident(name) => write!(f, "identifier '{}'", name),
      TokenKind::Op(op) => write!(f, "operator '{}'", op),
      TokenKind::And => f.write_str("'and'"),
      TokenKind::Or => f.write_str("'or'"),
      TokenKind::Not => f.write_str("'not'"),
      TokenKind::Dot => f.write_str("'.'"),
      TokenKind::LParen => f.write_str("'('"),
      TokenKind::RParen => f.write_str("')'"),
    }
  }
}

#[derive(Debug, Clone)]
struct Token {
  kind: TokenKind,
  offset: usize,
}

fn syntax(position: usize, message: impl Into<String>) -> PredicateError {
  PredicateError::Syntax {
    position,
    message: message.into(),
  }
}

fn tokenize(source: &str) -> Result<Vec<Token>, PredicateError> {
  let mut tokens = Vec::new();
  let mut chars = source.char_indices().peekable();

  while let Some(&(offset, c)) = chars.peek() {
    let kind = match c {
      c if c.is_whitespace() => {
        chars.next();
        continue;
      }
      '(' => {
        chars.next();
        TokenKind::LParen
      }
      ')' => {
        chars.next();
        TokenKind::RParen
      }
      '.' => {
        chars.next();
        TokenKind::Dot
      }
      '\'' | '"' => {
        chars.next();
        let mut value = String::new();
        let mut closed = false;
        for (_, ch) in chars.by_ref() {
          if ch == c {
            closed = true;
            break;
          }
          value.push(ch);
        }
        if !closed {
          return Err(syntax(offset, "unterminated string literal"));
        }
        TokenKind::Str(value)
      }
      '=' | '!' | '<' | '>' => {
        chars.next();
        let followed_by_eq = matches!(chars.peek(), Some((_, '=')));
        if followed_by_eq {
          chars.next();
        }
        match (c, followed_by_eq) {
          ('=', true) => TokenKind::Op(CompareOp::Eq),
          ('!', true) => TokenKind::Op(CompareOp::Ne),
          ('<', true) => TokenKind::Op(CompareOp::Le),
          ('>', true) => TokenKind::Op(CompareOp::Ge),
          ('<', false) => TokenKind::Op(CompareOp::Lt),
          ('>', false) => TokenKind::Op(CompareOp::Gt),
          ('!', false) => TokenKind::Not,
          _ => return Err(syntax(offset, "expected '==' but found a single '='")),
        }
      }
      '&' | '|' => {
        chars.next();
        match chars.next() {
          Some((_, next)) if next == c => {
            if c == '&' {
              TokenKind::And
            } else {
              TokenKind::Or
            }
          }
          _ => return Err(syntax(offset, format!("expected '{c}{c}'"))),
        }
      }
      c if c.is_ascii_digit() || c == '-' => {
        let mut text = String::new();
        text.push(c);
        chars.next();
        while let Some(&(_, d)) = chars.peek() {
          if d.is_ascii_digit() || d == '.' {
            text.push(d);
            chars.next();
          } else {
            break;
          }
        }
        let number = text
          .parse::<f64>()
          .map_err(|_| syntax(offset, format!("invalid number '{}'", text)))?;
        TokenKind::Number(number)
      }
      c if c.is_alphabetic() || c == '_' => {
        let mut word = String::new();
        while let Some(&(_, d)) = chars.peek() {
          if d.is_alphanumeric() || d == '_' {
            word.push(d);
            chars.next();
          } else {
            break;
          }
        }
        match word.as_str() {
          "and" => TokenKind::And,
          "or" => TokenKind::Or,
          "not" => TokenKind::Not,
          _ => TokenKind::Ident(word),
        }
      }
      other => return Err(syntax(offset, format!("unexpected character '{}'", other))),
    };
    tokens.push(Token { kind, offset });
  }

  Ok(tokens)
}

struct Parser {
  tokens: Vec<Token>,
  pos: usize,
  end: usize,
}

impl Parser {
  fn peek(&self) -> Option<&Token> {
    self.tokens.get(self.pos)
  }

  fn advance(&mut self) -> Option<Token> {
    let token = self.tokens.get(self.pos).cloned();
    if token.is_some() {
      self.pos += 1;
    }
    token
  }

  fn eat(&mut self, kind: &TokenKind) -> bool {
    if self.peek().is_some_and(|t| &t.kind == kind) {
      self.pos += 1;
      true
    } else {
      false
    }
  }

  fn or(&mut self) -> Result<Expr, PredicateError> {
    let mut left = self.and()?;
    while self.eat(&TokenKind::Or) {
      let right = self.and()?;
      left = Expr::Or(Box::new(left), Box::new(right));
    }
    Ok(left)
  }

  fn and(&mut self) -> Result<Expr, PredicateError> {
    let mut left = self.unary()?;
    while self.eat(&TokenKind::And) {
      let right = self.unary()?;
      left = Expr::And(Box::new(left), Box::new(right));
    }
    Ok(left)
  }

  fn unary(&mut self) -> Result<Expr, PredicateError> {
    if self.eat(&TokenKind::Not) {
      let inner = self.unary()?;
      return Ok(Expr::Not(Box::new(inner)));
    }
    self.compare()
  }

  fn compare(&mut self) -> Result<Expr, PredicateError> {
    let left = self.primary()?;
    let op = match self.peek() {
      Some(Token {
        kind: TokenKind::Op(op),
        ..
      }) => *op,
      _ => return Ok(left),
    };
    self.pos += 1;
    let right = self.primary()?;
    Ok(Expr::Compare {
      op,
      left: Box::new(left),
      right: Box::new(right),
    })
  }

  fn primary(&mut self) -> Result<Expr, PredicateError> {
    let Some(token) = self.advance() else {
      return Err(syntax(self.end, "unexpected end of expression"));
    };

    match token.kind {
      TokenKind::Number(n) => Ok(Expr::Literal(Value::Number(n))),
      TokenKind::Str(s) => Ok(Expr::Literal(Value::String(s))),
      TokenKind::Ident(name) if name == "true" => Ok(Expr::Literal(Value::Bool(true))),
      TokenKind::Ident(name) if name == "false" => Ok(Expr::Literal(Value::Bool(false))),
      TokenKind::Ident(name) => {
        let mut segments = vec![name];
        while self.eat(&TokenKind::Dot) {
          match self.advance() {
            Some(Token {
              kind: TokenKind::Ident(segment),
              ..
            }) => segments.push(segment),
            Some(other) => {
              return Err(syntax(
                other.offset,
                format!("expected field name after '.', found {}", other.kind),
              ));
            }
            None => return Err(syntax(self.end, "expected field name after '.'")),
          }
        }
        Ok(Expr::Path(segments))
      }
      TokenKind::LParen => {
        let inner = self.or()?;
        if !self.eat(&TokenKind::RParen) {
          let position = self.peek().map(|t| t.offset).unwrap_or(self.end);
          return Err(syntax(position, "expected ')'"));
        }
        Ok(inner)
      }
      other => Err(syntax(token.offset, format!("unexpected {}", other))),
    }
  }
}

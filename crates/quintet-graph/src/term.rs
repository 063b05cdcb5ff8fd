//! Node identifiers, literals and triples.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::vocab;

/// Identifier of a graph node (task, flow, region, signal, instance, or
/// predicate name).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
  pub fn new(id: impl Into<String>) -> Self {
    Self(id.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl Borrow<str> for NodeId {
  fn borrow(&self) -> &str {
    &self.0
  }
}

impl AsRef<str> for NodeId {
  fn as_ref(&self) -> &str {
    &self.0
  }
}

impl From<&str> for NodeId {
  fn from(id: &str) -> Self {
    Self(id.to_string())
  }
}

impl From<String> for NodeId {
  fn from(id: String) -> Self {
    Self(id)
  }
}

impl From<&String> for NodeId {
  fn from(id: &String) -> Self {
    Self(id.clone())
  }
}

impl From<&NodeId> for NodeId {
  fn from(id: &NodeId) -> Self {
    id.clone()
  }
}

impl fmt::Display for NodeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// A literal object value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
  Bool(bool),
  Integer(i64),
  String(String),
}

impl Literal {
  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Literal::Bool(b) => Some(*b),
      _ => None,
    }
  }

  pub fn as_integer(&self) -> Option<i64> {
    match self {
      Literal::Integer(i) => Some(*i),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Literal::String(s) => Some(s),
      _ => None,
    }
  }

  /// Name of the literal's type, for error messages.
  pub fn type_name(&self) -> &'static str {
    match self {
      Literal::Bool(_) => "boolean",
      Literal::Integer(_) => "integer",
      Literal::String(_) => "string",
    }
  }
}

impl fmt::Display for Literal {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Literal::Bool(b) => write!(f, "{}", b),
      Literal::Integer(i) => write!(f, "{}", i),
      Literal::String(s) => write!(f, "{:?}", s),
    }
  }
}

/// The object position of a triple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
  Node(NodeId),
  Literal(Literal),
}

impl Term {
  pub fn node(id: impl Into<NodeId>) -> Self {
    Term::Node(id.into())
  }

  pub fn string(value: impl Into<String>) -> Self {
    Term::Literal(Literal::String(value.into()))
  }

  pub fn integer(value: i64) -> Self {
    Term::Literal(Literal::Integer(value))
  }

  pub fn boolean(value: bool) -> Self {
    Term::Literal(Literal::Bool(value))
  }

  pub fn as_node(&self) -> Option<&NodeId> {
    match self {
      Term::Node(id) => Some(id),
      Term::Literal(_) => None,
    }
  }

  pub fn as_literal(&self) -> Option<&Literal> {
    match self {
      Term::Literal(lit) => Some(lit),
      Term::Node(_) => None,
    }
  }
}

impl fmt::Display for Term {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Term::Node(id) => write!(f, "<{}>", id),
      Term::Literal(lit) => write!(f, "{}", lit),
    }
  }
}

/// An immutable `(subject, predicate, object)` statement.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Triple {
  pub subject: NodeId,
  pub predicate: NodeId,
  pub object: Term,
}

impl Triple {
  pub fn new(subject: impl Into<NodeId>, predicate: impl Into<NodeId>, object: Term) -> Self {
    Self {
      subject: subject.into(),
      predicate: predicate.into(),
      object,
    }
  }

  /// `(node hasToken true)`
  pub fn token(node: impl Into<NodeId>) -> Self {
    Self::new(node, vocab::HAS_TOKEN, Term::boolean(true))
  }

  /// A transaction-stamped marker such as `(node completedAt tx_id)`.
  pub fn marker(node: impl Into<NodeId>, predicate: &str, tx_id: &str) -> Self {
    Self::new(node, predicate, Term::string(tx_id))
  }
}

impl fmt::Display for Triple {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "<{}> <{}> {}", self.subject, self.predicate, self.object)
  }
}

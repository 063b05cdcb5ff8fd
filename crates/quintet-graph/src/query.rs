//! Conjunctive basic-graph-pattern queries.
//!
//! A query is a list of [`TriplePattern`]s whose positions are either fixed
//! terms or `?variables`. Solutions are the variable bindings under which every
//! pattern matches a triple in the graph, found by joining the patterns left
//! to right.

use std::collections::BTreeMap;

use crate::graph::Graph;
use crate::term::{Literal, NodeId, Term, Triple};

/// One solution of a query: variable name (without `?`) to bound term.
pub type Bindings = BTreeMap<String, Term>;

/// A position in a triple pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternTerm {
  Var(String),
  Node(NodeId),
  Literal(Literal),
}

impl PatternTerm {
  /// Parse the shorthand used in tests and lookups: `?x` is a variable,
  /// anything else a node.
  pub fn parse(text: &str) -> Self {
    match text.strip_prefix('?') {
      Some(name) => PatternTerm::Var(name.to_string()),
      None => PatternTerm::Node(NodeId::from(text)),
    }
  }

  pub fn var(name: &str) -> Self {
    PatternTerm::Var(name.to_string())
  }

  pub fn node(id: impl Into<NodeId>) -> Self {
    PatternTerm::Node(id.into())
  }

  pub fn literal(lit: Literal) -> Self {
    PatternTerm::Literal(lit)
  }

  /// Substitute a bound variable, leaving unbound ones in place.
  fn resolve(&self, bindings: &Bindings) -> PatternTerm {
    match self {
      PatternTerm::Var(name) => match bindings.get(name) {
        Some(Term::Node(id)) => PatternTerm::Node(id.clone()),
        Some(Term::Literal(lit)) => PatternTerm::Literal(lit.clone()),
        None => self.clone(),
      },
      _ => self.clone(),
    }
  }
}

/// A `(subject, predicate, object)` pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriplePattern {
  pub subject: PatternTerm,
  pub predicate: PatternTerm,
  pub object: PatternTerm,
}

impl TriplePattern {
  pub fn new(subject: PatternTerm, predicate: PatternTerm, object: PatternTerm) -> Self {
    Self {
      subject,
      predicate,
      object,
    }
  }
}

impl Graph {
  /// Evaluate a basic graph pattern, returning every solution in a
  /// deterministic order.
  pub fn query(&self, patterns: &[TriplePattern]) -> Vec<Bindings> {
    let mut solutions = vec![Bindings::new()];

    for pattern in patterns {
      let mut next = Vec::new();
      for bindings in &solutions {
        for triple in self.candidates(pattern, bindings) {
          if let Some(extended) = bind(pattern, triple, bindings) {
            next.push(extended);
          }
        }
      }
      if next.is_empty() {
        return next;
      }
      solutions = next;
    }

    solutions
  }

  fn candidates(&self, pattern: &TriplePattern, bindings: &Bindings) -> Vec<&Triple> {
    let subject = pattern.subject.resolve(bindings);
    let predicate = pattern.predicate.resolve(bindings);
    let object = pattern.object.resolve(bindings);

    // A literal can never be a subject or predicate.
    let subject = match &subject {
      PatternTerm::Node(id) => Some(id.as_str()),
      PatternTerm::Literal(_) => return Vec::new(),
      PatternTerm::Var(_) => None,
    };
    let predicate = match &predicate {
      PatternTerm::Node(id) => Some(id.as_str()),
      PatternTerm::Literal(_) => return Vec::new(),
      PatternTerm::Var(_) => None,
    };
    let object = match object {
      PatternTerm::Node(id) => Some(Term::Node(id)),
      PatternTerm::Literal(lit) => Some(Term::Literal(lit)),
      PatternTerm::Var(_) => None,
    };

    self.matching(subject, predicate, object.as_ref())
  }
}

/// Extend `bindings` with the variables of `pattern` matched against `triple`.
/// Returns `None` when a variable repeated within the pattern would need two
/// different values.
fn bind(pattern: &TriplePattern, triple: &Triple, bindings: &Bindings) -> Option<Bindings> {
  let mut extended = bindings.clone();
  let positions = [
    (&pattern.subject, Term::Node(triple.subject.clone())),
    (&pattern.predicate, Term::Node(triple.predicate.clone())),
    (&pattern.object, triple.object.clone()),
  ];

  for (position, value) in positions {
    if let PatternTerm::Var(name) = position {
      match extended.get(name) {
        Some(existing) if existing != &value => return None,
        Some(_) => {}
        None => {
          extended.insert(name.clone(), value);
        }
      }
    }
  }

  Some(extended)
}

use std::collections::{BTreeSet, HashMap};

use crate::error::GraphError;
use crate::term::{Literal, NodeId, Term, Triple};
use crate::vocab;

/// In-memory triple set with subject and predicate indexes.
///
/// Cloning a graph yields an independent snapshot; verbs only ever see a
/// shared borrow, so the only writer is whoever owns the graph.
#[derive(Debug, Clone, Default)]
pub struct Graph {
  /// Every triple, in canonical order.
  triples: BTreeSet<Triple>,
  /// subject -> triples with that subject.
  by_subject: HashMap<NodeId, BTreeSet<Triple>>,
  /// predicate -> triples with that predicate.
  by_predicate: HashMap<NodeId, BTreeSet<Triple>>,
  /// Append-only markers in insertion order.
  marker_log: Vec<Triple>,
}

impl Graph {
  pub fn new() -> Self {
    Self::default()
  }

  /// Build a graph from a list of triples (duplicates collapse).
  pub fn from_triples(triples: impl IntoIterator<Item = Triple>) -> Self {
    let mut graph = Self::new();
    for triple in triples {
      graph.insert(triple);
    }
    graph
  }

  /// Insert a triple. Returns `false` when it was already present.
  pub fn insert(&mut self, triple: Triple) -> bool {
    if !self.triples.insert(triple.clone()) {
      return false;
    }

    self
      .by_subject
      .entry(triple.subject.clone())
      .or_default()
      .insert(triple.clone());
    self
      .by_predicate
      .entry(triple.predicate.clone())
      .or_default()
      .insert(triple.clone());

    if vocab::is_append_only(triple.predicate.as_str()) {
      self.marker_log.push(triple);
    }
    true
  }

  /// Remove a triple. Returns `false` when it was not present.
  ///
  /// Markers (`completedAt`, `voidedAt`, `consumed`) are refused even when
  /// they are absent, so a malformed delta fails the same way every time.
  pub fn remove(&mut self, triple: &Triple) -> Result<bool, GraphError> {
    if vocab::is_append_only(triple.predicate.as_str()) {
      return Err(GraphError::AppendOnly {
        triple: triple.clone(),
      });
    }

    if !self.triples.remove(triple) {
      return Ok(false);
    }

    if let Some(set) = self.by_subject.get_mut(&triple.subject) {
      set.remove(triple);
      if set.is_empty() {
        self.by_subject.remove(&triple.subject);
      }
    }
    if let Some(set) = self.by_predicate.get_mut(&triple.predicate) {
      set.remove(triple);
      if set.is_empty() {
        self.by_predicate.remove(&triple.predicate);
      }
    }
    Ok(true)
  }

  pub fn contains(&self, triple: &Triple) -> bool {
    self.triples.contains(triple)
  }

  pub fn len(&self) -> usize {
    self.triples.len()
  }

  pub fn is_empty(&self) -> bool {
    self.triples.is_empty()
  }

  /// All triples in canonical order.
  pub fn iter(&self) -> impl Iterator<Item = &Triple> {
    self.triples.iter()
  }

  /// Enumerate triples matching a `(subject?, predicate?, object?)` pattern.
  ///
  /// Results come back in canonical triple order.
  pub fn matching(
    &self,
    subject: Option<&str>,
    predicate: Option<&str>,
    object: Option<&Term>,
  ) -> Vec<&Triple> {
    let keep = |t: &&Triple| {
      predicate.is_none_or(|p| t.predicate.as_str() == p) && object.is_none_or(|o| &t.object == o)
    };

    match (subject, predicate) {
      (Some(s), _) => self
        .by_subject
        .get(s)
        .map(|set| set.iter().filter(keep).collect())
        .unwrap_or_default(),
      (None, Some(p)) => self
        .by_predicate
        .get(p)
        .map(|set| set.iter().filter(keep).collect())
        .unwrap_or_default(),
      (None, None) => self.triples.iter().filter(keep).collect(),
    }
  }

  /// Objects of every `(subject, predicate, ?)` triple.
  pub fn objects<'a, 'p>(
    &'a self,
    subject: &str,
    predicate: &'p str,
  ) -> impl Iterator<Item = &'a Term> + use<'a, 'p> {
    self
      .by_subject
      .get(subject)
      .into_iter()
      .flatten()
      .filter(move |t| t.predicate.as_str() == predicate)
      .map(|t| &t.object)
  }

  /// Node objects of every `(subject, predicate, ?)` triple.
  pub fn object_nodes<'a, 'p>(
    &'a self,
    subject: &str,
    predicate: &'p str,
  ) -> impl Iterator<Item = &'a NodeId> + use<'a, 'p> {
    self.objects(subject, predicate).filter_map(Term::as_node)
  }

  /// Subjects of every `(?, predicate, object)` triple.
  pub fn subjects<'a, 'o>(
    &'a self,
    predicate: &str,
    object: &'o Term,
  ) -> impl Iterator<Item = &'a NodeId> + use<'a, 'o> {
    self
      .by_predicate
      .get(predicate)
      .into_iter()
      .flatten()
      .filter(move |t| &t.object == object)
      .map(|t| &t.subject)
  }

  /// First literal object of `(subject, predicate, ?)`, in canonical order.
  pub fn literal(&self, subject: &str, predicate: &str) -> Option<&Literal> {
    self
      .objects(subject, predicate)
      .find_map(Term::as_literal)
  }

  /// Integer-valued property; a literal of another type is an error.
  pub fn integer(&self, subject: &str, predicate: &str) -> Result<Option<i64>, GraphError> {
    match self.literal(subject, predicate) {
      None => Ok(None),
      Some(Literal::Integer(i)) => Ok(Some(*i)),
      Some(other) => Err(literal_type(subject, predicate, "integer", other)),
    }
  }

  /// String-valued property; a literal of another type is an error.
  pub fn string(&self, subject: &str, predicate: &str) -> Result<Option<&str>, GraphError> {
    match self.literal(subject, predicate) {
      None => Ok(None),
      Some(Literal::String(s)) => Ok(Some(s.as_str())),
      Some(other) => Err(literal_type(subject, predicate, "string", other)),
    }
  }

  /// Boolean-valued property; a literal of another type is an error.
  pub fn boolean(&self, subject: &str, predicate: &str) -> Result<Option<bool>, GraphError> {
    match self.literal(subject, predicate) {
      None => Ok(None),
      Some(Literal::Bool(b)) => Ok(Some(*b)),
      Some(other) => Err(literal_type(subject, predicate, "boolean", other)),
    }
  }

  /// Whether any triple has `node` as its subject.
  pub fn has_subject(&self, node: &str) -> bool {
    self.by_subject.contains_key(node)
  }

  pub fn has_token(&self, node: &str) -> bool {
    self.contains(&Triple::token(node))
  }

  pub fn is_completed(&self, node: &str) -> bool {
    self.objects(node, vocab::COMPLETED_AT).next().is_some()
  }

  pub fn is_voided(&self, node: &str) -> bool {
    self.objects(node, vocab::VOIDED_AT).next().is_some()
  }

  /// Nodes currently holding a token, in canonical order.
  pub fn token_holders(&self) -> Vec<&NodeId> {
    self
      .subjects(vocab::HAS_TOKEN, &Term::boolean(true))
      .collect::<BTreeSet<_>>()
      .into_iter()
      .collect()
  }

  /// Append-only markers in the order they were written.
  pub fn marker_log(&self) -> &[Triple] {
    &self.marker_log
  }
}

fn literal_type(subject: &str, predicate: &str, expected: &'static str, found: &Literal) -> GraphError {
  GraphError::LiteralType {
    subject: subject.to_string(),
    predicate: predicate.to_string(),
    expected,
    found: found.type_name().to_string(),
  }
}

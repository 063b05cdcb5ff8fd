use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use quintet_graph::{Literal, vocab};
use quintet_ontology::{
  CancellationScope, Cardinality, CompletionStrategy, InstanceBinding, SelectionMode, VerbKind,
};

/// A fully resolved verb for one firing of one task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerbConfig {
  /// Name of the pattern the task resolved to.
  pub pattern: String,
  #[serde(flatten)]
  pub verb: Verb,
}

impl VerbConfig {
  pub fn new(pattern: impl Into<String>, verb: Verb) -> Self {
    Self {
      pattern: pattern.into(),
      verb,
    }
  }

  pub fn kind(&self) -> VerbKind {
    self.verb.kind()
  }

  /// Parameters as a JSON object with sorted keys, the form that is hashed
  /// into receipts.
  pub fn canonical_params(&self) -> Result<String, serde_json::Error> {
    let params: BTreeMap<String, serde_json::Value> = match serde_json::to_value(&self.verb)? {
      serde_json::Value::Object(map) => map.into_iter().filter(|(k, _)| k != "verb").collect(),
      _ => BTreeMap::new(),
    };
    serde_json::to_string(&params)
  }
}

/// The five verbs with their resolved parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "verb")]
pub enum Verb {
  Transmute,
  #[serde(rename_all = "camelCase")]
  Copy {
    cardinality: Cardinality,
    #[serde(skip_serializing_if = "Option::is_none")]
    instance_binding: Option<InstanceBinding>,
    /// Number of instances to spawn; unused for topology cardinality.
    instances: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    completion_strategy: Option<CompletionStrategy>,
  },
  #[serde(rename_all = "camelCase")]
  Filter { selection_mode: SelectionMode },
  #[serde(rename_all = "camelCase")]
  Await {
    threshold: Threshold,
    reset_on_fire: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    trigger: Option<Trigger>,
  },
  #[serde(rename_all = "camelCase")]
  Void { cancellation_scope: CancellationScope },
}

impl Verb {
  pub fn kind(&self) -> VerbKind {
    match self {
      Verb::Transmute => VerbKind::Transmute,
      Verb::Copy { .. } => VerbKind::Copy,
      Verb::Filter { .. } => VerbKind::Filter,
      Verb::Await { .. } => VerbKind::Await,
      Verb::Void { .. } => VerbKind::Void,
    }
  }
}

/// Resolved join threshold. Quorums have been turned into concrete counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum Threshold {
  /// Every incoming source.
  All,
  /// Every incoming source that was ever tokenized in the case.
  Active,
  /// At least `n` sources; `AtLeast(1)` is a discriminator.
  AtLeast(u32),
}

impl fmt::Display for Threshold {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Threshold::All => f.write_str("all"),
      Threshold::Active => f.write_str("active"),
      Threshold::AtLeast(n) => write!(f, "{}", n),
    }
  }
}

impl From<Threshold> for String {
  fn from(value: Threshold) -> Self {
    value.to_string()
  }
}

/// Signal condition for trigger and milestone patterns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
  /// Predicate that must hold on the signal in addition to its completion.
  pub property: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub value: Option<Literal>,
}

impl Trigger {
  pub fn new(property: impl Into<String>, value: Option<Literal>) -> Self {
    Self {
      property: property.into(),
      value,
    }
  }

  /// A persistent trigger stays satisfied once its signal has completed and
  /// is never consumed.
  pub fn is_persistent(&self) -> bool {
    self.property == vocab::COMPLETED_AT
  }
}

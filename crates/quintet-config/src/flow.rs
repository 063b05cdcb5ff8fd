use serde::{Deserialize, Serialize};

/// A directed flow between two tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowDef {
  pub from: String,
  pub to: String,
  /// Guard expression evaluated by choice tasks, e.g. `amount > 1000`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub predicate: Option<String>,
  /// Evaluation order among the flows leaving `from` (ascending).
  #[serde(default)]
  pub ordering: i64,
  /// Taken when no predicate on a sibling flow holds.
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub default: bool,
}

impl FlowDef {
  pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
    Self {
      from: from.into(),
      to: to.into(),
      predicate: None,
      ordering: 0,
      default: false,
    }
  }

  pub fn with_predicate(mut self, predicate: impl Into<String>) -> Self {
    self.predicate = Some(predicate.into());
    self
  }

  pub fn with_ordering(mut self, ordering: i64) -> Self {
    self.ordering = ordering;
    self
  }

  pub fn as_default(mut self) -> Self {
    self.default = true;
    self
  }
}

/// A named cancellation region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionDef {
  pub region_id: String,
  pub members: Vec<String>,
}

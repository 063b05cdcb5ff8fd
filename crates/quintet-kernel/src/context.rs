use quintet_predicate::ContextData;

/// `prev_hash` of the first transaction in every lineage.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Everything a single firing knows about its environment.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionContext {
  /// The case this firing belongs to.
  pub lineage: String,
  /// Unique within the lineage.
  pub tx_id: String,
  pub actor: String,
  /// `merkle_root` of the lineage's last receipt, or [`GENESIS_HASH`].
  pub prev_hash: String,
  /// Case data visible to predicates and data-driven parameters.
  pub data: ContextData,
}

impl TransactionContext {
  /// A context with a fresh transaction id, acting as `system`.
  pub fn new(lineage: impl Into<String>, prev_hash: impl Into<String>) -> Self {
    Self {
      lineage: lineage.into(),
      tx_id: uuid::Uuid::new_v4().to_string(),
      actor: "system".to_string(),
      prev_hash: prev_hash.into(),
      data: ContextData::new(),
    }
  }

  pub fn with_tx_id(mut self, tx_id: impl Into<String>) -> Self {
    self.tx_id = tx_id.into();
    self
  }

  pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
    self.actor = actor.into();
    self
  }

  pub fn with_data(mut self, data: ContextData) -> Self {
    self.data = data;
    self
  }

  pub fn with_value(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
    self.data.insert(key.into(), value);
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_fresh_transaction_ids() {
    let a = TransactionContext::new("case-1", GENESIS_HASH);
    let b = TransactionContext::new("case-1", GENESIS_HASH);
    assert_ne!(a.tx_id, b.tx_id);
    assert_eq!(a.actor, "system");
    assert_eq!(GENESIS_HASH.len(), 64);
  }

  #[test]
  fn test_builders() {
    let ctx = TransactionContext::new("case-1", GENESIS_HASH)
      .with_tx_id("tx-1")
      .with_actor("alice")
      .with_value("amount", serde_json::json!(12));
    assert_eq!(ctx.tx_id, "tx-1");
    assert_eq!(ctx.actor, "alice");
    assert_eq!(ctx.data["amount"], serde_json::json!(12));
  }
}

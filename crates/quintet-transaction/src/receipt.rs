use std::collections::BTreeMap;

use serde::Serialize;

use quintet_graph::NodeId;
use quintet_kernel::{QuadDelta, Stimulus, VerbConfig};

use crate::error::TransactionError;

/// What a transaction executed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operation {
  Verb(VerbConfig),
  Stimulus(Stimulus),
}

impl Operation {
  /// Verb name (`Copy`, `Await`, ...) or stimulus name (`start`, `signal`).
  pub fn name(&self) -> &'static str {
    match self {
      Operation::Verb(config) => config.kind().as_str(),
      Operation::Stimulus(stimulus) => stimulus.name(),
    }
  }

  /// Parameters as sorted-key JSON.
  pub fn canonical_params(&self) -> Result<String, serde_json::Error> {
    match self {
      Operation::Verb(config) => config.canonical_params(),
      Operation::Stimulus(stimulus) => {
        let params: BTreeMap<String, serde_json::Value> = match serde_json::to_value(stimulus)? {
          serde_json::Value::Object(map) => {
            map.into_iter().filter(|(k, _)| k != "stimulus").collect()
          }
          _ => BTreeMap::new(),
        };
        serde_json::to_string(&params)
      }
    }
  }
}

/// One sealed link in a lineage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receipt {
  pub merkle_root: String,
  pub prev_hash: String,
  pub tx_id: String,
  pub lineage: String,
  pub actor: String,
  /// The task that fired; `None` for stimuli.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub task: Option<NodeId>,
  pub verb_executed: String,
  pub operation: Operation,
  pub delta: QuadDelta,
}

impl Receipt {
  pub(crate) fn seal(
    lineage: String,
    prev_hash: String,
    tx_id: String,
    actor: String,
    task: Option<NodeId>,
    operation: Operation,
    delta: QuadDelta,
  ) -> Result<Self, TransactionError> {
    let mut receipt = Self {
      merkle_root: String::new(),
      prev_hash,
      tx_id,
      lineage,
      actor,
      task,
      verb_executed: operation.name().to_string(),
      operation,
      delta,
    };
    receipt.merkle_root = receipt.compute_root()?;
    Ok(receipt)
  }

  /// Recompute the root from the receipt's own fields.
  pub fn compute_root(&self) -> Result<String, TransactionError> {
    let params = self.operation.canonical_params()?;
    Ok(merkle_root(
      &self.prev_hash,
      &self.tx_id,
      self.operation.name(),
      &params,
      self.delta.additions().len(),
      self.delta.removals().len(),
    ))
  }
}

/// BLAKE3 over the chained fields, hex encoded.
///
/// Text fields are length-prefixed so that moving bytes between adjacent
/// fields changes the root.
pub fn merkle_root(
  prev_hash: &str,
  tx_id: &str,
  operation: &str,
  params: &str,
  additions: usize,
  removals: usize,
) -> String {
  let mut hasher = blake3::Hasher::new();
  for field in [prev_hash, tx_id, operation, params] {
    hasher.update(&(field.len() as u64).to_le_bytes());
    hasher.update(field.as_bytes());
  }
  hasher.update(&(additions as u64).to_le_bytes());
  hasher.update(&(removals as u64).to_le_bytes());
  hex::encode(hasher.finalize().as_bytes())
}

#[cfg(test)]
mod tests {
  use super::*;
  use quintet_graph::Triple;
  use quintet_kernel::{GENESIS_HASH, Threshold, Verb};
  use serde_json::json;

  fn discriminator() -> Operation {
    Operation::Verb(VerbConfig::new(
      "StructuredDiscriminator",
      Verb::Await {
        threshold: Threshold::AtLeast(1),
        reset_on_fire: true,
        trigger: None,
      },
    ))
  }

  #[test]
  fn test_root_is_hex_blake3() {
    let root = merkle_root(GENESIS_HASH, "tx-1", "Transmute", "{}", 1, 1);
    assert_eq!(root.len(), 64);
    assert!(root.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(root, merkle_root(GENESIS_HASH, "tx-1", "Transmute", "{}", 1, 1));
  }

  #[test]
  fn test_every_field_changes_the_root() {
    let base = merkle_root(GENESIS_HASH, "tx-1", "Await", "{}", 2, 1);
    assert_ne!(base, merkle_root("ff", "tx-1", "Await", "{}", 2, 1));
    assert_ne!(base, merkle_root(GENESIS_HASH, "tx-2", "Await", "{}", 2, 1));
    assert_ne!(base, merkle_root(GENESIS_HASH, "tx-1", "Copy", "{}", 2, 1));
    assert_ne!(base, merkle_root(GENESIS_HASH, "tx-1", "Await", "{\"a\":1}", 2, 1));
    assert_ne!(base, merkle_root(GENESIS_HASH, "tx-1", "Await", "{}", 3, 1));
    assert_ne!(base, merkle_root(GENESIS_HASH, "tx-1", "Await", "{}", 2, 0));
  }

  #[test]
  fn test_operation_names_and_params() {
    assert_eq!(discriminator().name(), "Await");
    assert_eq!(
      discriminator().canonical_params().unwrap(),
      r#"{"resetOnFire":true,"threshold":"1"}"#
    );

    let start = Operation::Stimulus(Stimulus::Start {
      nodes: vec![NodeId::from("A")],
    });
    assert_eq!(start.name(), "start");
    assert_eq!(start.canonical_params().unwrap(), r#"{"nodes":["A"]}"#);
  }

  #[test]
  fn test_seal_and_serialize() {
    let receipt = Receipt::seal(
      "case".to_string(),
      GENESIS_HASH.to_string(),
      "tx-1".to_string(),
      "system".to_string(),
      Some(NodeId::from("J")),
      discriminator(),
      QuadDelta::new([Triple::token("K")], [Triple::token("J")]),
    )
    .unwrap();
    assert_eq!(receipt.merkle_root, receipt.compute_root().unwrap());
    assert_eq!(receipt.verb_executed, "Await");

    let value = serde_json::to_value(&receipt).unwrap();
    assert_eq!(value["operation"]["kind"], json!("verb"));
    assert_eq!(value["operation"]["pattern"], json!("StructuredDiscriminator"));
    assert_eq!(value["operation"]["verb"], json!("Await"));
    assert_eq!(value["task"], json!("J"));
    assert_eq!(value["delta"]["additions"].as_array().unwrap().len(), 1);
  }
}

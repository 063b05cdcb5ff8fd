use std::collections::HashSet;

use quintet_kernel::GENESIS_HASH;

use crate::error::TransactionError;
use crate::receipt::Receipt;

/// The ordered receipts of one case.
#[derive(Debug, Clone, Default)]
pub struct Lineage {
  id: String,
  receipts: Vec<Receipt>,
  tx_ids: HashSet<String>,
}

impl Lineage {
  pub fn new(id: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      ..Default::default()
    }
  }

  /// Rebuild a lineage from stored receipts. Call [`Lineage::verify`] before
  /// trusting it.
  pub fn from_receipts(id: impl Into<String>, receipts: Vec<Receipt>) -> Self {
    let tx_ids = receipts.iter().map(|r| r.tx_id.clone()).collect();
    Self {
      id: id.into(),
      receipts,
      tx_ids,
    }
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  /// `merkle_root` of the last receipt, or [`GENESIS_HASH`].
  pub fn head(&self) -> &str {
    self
      .receipts
      .last()
      .map(|r| r.merkle_root.as_str())
      .unwrap_or(GENESIS_HASH)
  }

  pub fn receipts(&self) -> &[Receipt] {
    &self.receipts
  }

  pub fn len(&self) -> usize {
    self.receipts.len()
  }

  pub fn is_empty(&self) -> bool {
    self.receipts.is_empty()
  }

  pub fn contains_tx(&self, tx_id: &str) -> bool {
    self.tx_ids.contains(tx_id)
  }

  pub(crate) fn push(&mut self, receipt: Receipt) {
    self.tx_ids.insert(receipt.tx_id.clone());
    self.receipts.push(receipt);
  }

  /// Recompute every root and check that each receipt links to the one
  /// before it, starting from [`GENESIS_HASH`].
  pub fn verify(&self) -> Result<(), TransactionError> {
    let mut expected = GENESIS_HASH;
    let mut seen = HashSet::new();

    for receipt in &self.receipts {
      if receipt.prev_hash != expected {
        return Err(TransactionError::ChainIntegrity {
          lineage: self.id.clone(),
          expected: expected.to_string(),
          found: receipt.prev_hash.clone(),
        });
      }
      if receipt.merkle_root != receipt.compute_root()? {
        return Err(TransactionError::TamperedReceipt {
          lineage: self.id.clone(),
          tx_id: receipt.tx_id.clone(),
        });
      }
      if !seen.insert(receipt.tx_id.as_str()) {
        return Err(TransactionError::DuplicateTransaction {
          lineage: self.id.clone(),
          tx_id: receipt.tx_id.clone(),
        });
      }
      expected = &receipt.merkle_root;
    }
    Ok(())
  }
}

//! Quintet Transaction
//!
//! The transaction manager is the only writer of the case graph. A firing
//! goes through two steps:
//!
//! 1. [`TransactionManager::prepare`] resolves the task, runs its verb against
//!    the current graph and checks the caller's `prev_hash` against the
//!    lineage head. Nothing is mutated.
//! 2. [`TransactionManager::commit`] applies the delta (removals, then
//!    additions), seals a [`Receipt`] and advances the lineage head.
//!
//! [`TransactionManager::fire`] does both. An empty delta commits nothing and
//! leaves the head where it was, so polling a waiting join is harmless.

mod error;
mod lineage;
mod manager;
mod receipt;
mod sink;

pub use error::TransactionError;
pub use lineage::Lineage;
pub use manager::{FireOutcome, PreparedTransaction, TransactionManager};
pub use receipt::{Operation, Receipt, merkle_root};
pub use sink::{ChannelSink, NoopSink, ReceiptSink};

pub use quintet_kernel::GENESIS_HASH;

use thiserror::Error;

use crate::term::Triple;

#[derive(Debug, Error)]
pub enum GraphError {
  /// Attempted to remove a marker triple from the append-only log.
  #[error("triple is append-only and cannot be removed: {triple}")]
  AppendOnly { triple: Triple },

  /// A literal had a different type than the caller required.
  #[error("expected {expected} literal for '{subject} {predicate}', found {found}")]
  LiteralType {
    subject: String,
    predicate: String,
    expected: &'static str,
    found: String,
  },
}

use thiserror::Error;

/// Errors from parsing or evaluating a predicate expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredicateError {
  #[error("syntax error at offset {position}: {message}")]
  Syntax { position: usize, message: String },

  #[error("variable '{name}' is not present in the case data")]
  MissingVariable { name: String },

  #[error("type mismatch: {message}")]
  TypeMismatch { message: String },
}

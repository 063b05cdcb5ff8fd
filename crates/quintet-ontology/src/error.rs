use thiserror::Error;

/// Errors raised while loading or validating a pattern ontology.
#[derive(Debug, Error)]
pub enum OntologyError {
  #[error("failed to read ontology file {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("turtle syntax error: {message}")]
  Turtle { message: String },

  /// Blank nodes and quoted triples have no place in the pattern dataset.
  #[error("unsupported {kind} term in ontology")]
  UnsupportedTerm { kind: String },

  #[error("invalid {datatype} literal: {lexical}")]
  InvalidLiteral { datatype: String, lexical: String },

  #[error("ontology must declare exactly the five verbs, found: {found:?}")]
  VerbSet { found: Vec<String> },

  #[error("invalid pattern mapping '{mapping}': {reason}")]
  InvalidMapping { mapping: String, reason: String },

  #[error("unknown {parameter} value '{value}'")]
  UnknownValue {
    parameter: &'static str,
    value: String,
  },

  #[error("duplicate pattern name: {name}")]
  DuplicatePattern { name: String },

  #[error("expected {expected} pattern mappings, found {found}")]
  MappingCount { expected: usize, found: usize },
}
